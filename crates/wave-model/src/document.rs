//! In-memory document that consumes operations.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use wave_docop::{
    buffer, check_well_formed, debug_to_xml_string, AnnotationBoundaryMap, AttributeUpdate,
    Attributes, BufferedDocOp, DocInitialization, DocOp, DocOpComponent, OperationError,
};

use crate::annotations::{AnnotationStore, RawAnnotationSet, ReadableAnnotationSet};

/// One document item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Character(char),
    ElementStart { tag: String, attributes: Attributes },
    ElementEnd,
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Character(c) => write!(f, "character {c:?}"),
            Item::ElementStart { tag, attributes } => write!(f, "element start {tag} {attributes}"),
            Item::ElementEnd => f.write_str("element end"),
        }
    }
}

/// A document stored as a flat item list plus an annotation store.
///
/// Operations are applied atomically: [`consume`](Self::consume) checks the
/// whole operation against the document before changing anything, so a
/// failed operation leaves the document as it was.
///
/// An operation may stop short of the end of the document; the remaining
/// items are kept unchanged.
#[derive(Debug, Clone, Default)]
pub struct IndexedDocument<A = AnnotationStore<String>> {
    items: Vec<Item>,
    annotations: A,
}

impl IndexedDocument {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A: RawAnnotationSet<String> + Default> IndexedDocument<A> {
    /// Builds a document by consuming `init` into an empty one.
    pub fn from_initialization(init: &DocInitialization) -> Result<Self, OperationError> {
        let mut doc = Self::default();
        doc.consume(init)?;
        Ok(doc)
    }
}

impl<A: RawAnnotationSet<String>> IndexedDocument<A> {
    pub fn with_annotations(annotations: A) -> Self {
        assert_eq!(annotations.size(), 0, "annotation store must start empty");
        Self {
            items: Vec::new(),
            annotations,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, location: usize) -> Option<&Item> {
        self.items.get(location)
    }

    pub fn annotations(&self) -> &A {
        &self.annotations
    }

    /// Applies `op` to the document.
    ///
    /// Fails without changing the document if `op` is ill-formed, reaches
    /// past the end, or deletes or modifies items that do not match.
    pub fn consume<O: DocOp + ?Sized>(&mut self, op: &O) -> Result<(), OperationError> {
        let op = buffer(op);
        check_well_formed(&*op)?;
        let (items, trailing) = self.apply_to_items(&op)?;
        self.items = items;
        self.apply_to_annotations(&op, trailing);
        log::trace!("consumed {op}, document now has {} item(s)", self.items.len());
        Ok(())
    }

    fn item_at(&self, location: usize) -> Result<&Item, OperationError> {
        self.items
            .get(location)
            .ok_or_else(|| OperationError::DocumentTooShort {
                required: location + 1,
                length: self.items.len(),
            })
    }

    fn element_start_at(&self, location: usize) -> Result<(&str, &Attributes), OperationError> {
        match self.item_at(location)? {
            Item::ElementStart { tag, attributes } => Ok((tag.as_str(), attributes)),
            other => Err(mismatch(location, format!("expected an element start, found {other}"))),
        }
    }

    /// The items after `op`, and how many trailing items it left untouched.
    fn apply_to_items(&self, op: &BufferedDocOp) -> Result<(Vec<Item>, usize), OperationError> {
        let mut items = Vec::with_capacity(self.items.len());
        let mut pos: usize = 0;
        for component in op.components() {
            match component {
                DocOpComponent::Retain(n) => {
                    let end = pos
                        .checked_add(*n)
                        .filter(|end| *end <= self.items.len())
                        .ok_or_else(|| OperationError::DocumentTooShort {
                            required: pos.saturating_add(*n),
                            length: self.items.len(),
                        })?;
                    items.extend_from_slice(&self.items[pos..end]);
                    pos = end;
                }
                DocOpComponent::Characters(s) => items.extend(s.chars().map(Item::Character)),
                DocOpComponent::DeleteCharacters(s) => {
                    for expected in s.chars() {
                        match self.item_at(pos)? {
                            Item::Character(c) if *c == expected => pos += 1,
                            other => {
                                return Err(mismatch(
                                    pos,
                                    format!("deleting character {expected:?}, found {other}"),
                                ))
                            }
                        }
                    }
                }
                DocOpComponent::ElementStart { tag, attributes } => items.push(Item::ElementStart {
                    tag: tag.clone(),
                    attributes: attributes.clone(),
                }),
                DocOpComponent::ElementEnd => items.push(Item::ElementEnd),
                DocOpComponent::DeleteElementStart { tag, attributes } => {
                    let (actual_tag, actual_attributes) = self.element_start_at(pos)?;
                    if actual_tag != tag.as_str() || actual_attributes != attributes {
                        return Err(mismatch(
                            pos,
                            format!(
                                "deleting element start {tag} {attributes}, found {actual_tag} {actual_attributes}"
                            ),
                        ));
                    }
                    pos += 1;
                }
                DocOpComponent::DeleteElementEnd => match self.item_at(pos)? {
                    Item::ElementEnd => pos += 1,
                    other => {
                        return Err(mismatch(pos, format!("deleting element end, found {other}")))
                    }
                },
                DocOpComponent::ReplaceAttributes { old, new } => {
                    let (tag, actual) = self.element_start_at(pos)?;
                    if actual != old {
                        return Err(mismatch(
                            pos,
                            format!("replacing attributes {old}, found {actual}"),
                        ));
                    }
                    items.push(Item::ElementStart {
                        tag: tag.to_owned(),
                        attributes: new.clone(),
                    });
                    pos += 1;
                }
                DocOpComponent::UpdateAttributes(update) => {
                    let (tag, actual) = self.element_start_at(pos)?;
                    items.push(Item::ElementStart {
                        tag: tag.to_owned(),
                        attributes: actual.update_with(update)?,
                    });
                    pos += 1;
                }
                DocOpComponent::AnnotationBoundary(_) => {}
            }
        }
        items.extend_from_slice(&self.items[pos..]);
        Ok((items, self.items.len() - pos))
    }

    fn apply_to_annotations(&mut self, op: &BufferedDocOp, trailing: usize) {
        let store = &mut self.annotations;
        store.begin();
        for component in op.components() {
            match component {
                DocOpComponent::Retain(n) => store.skip(*n),
                DocOpComponent::Characters(s) => store.insert(s.chars().count()),
                DocOpComponent::DeleteCharacters(s) => store.delete(s.chars().count()),
                DocOpComponent::ElementStart { .. } | DocOpComponent::ElementEnd => store.insert(1),
                DocOpComponent::DeleteElementStart { .. } | DocOpComponent::DeleteElementEnd => {
                    store.delete(1)
                }
                DocOpComponent::ReplaceAttributes { .. } | DocOpComponent::UpdateAttributes(_) => {
                    store.skip(1)
                }
                DocOpComponent::AnnotationBoundary(map) => {
                    for key in map.ends() {
                        store.end_annotation(key);
                    }
                    for change in map.changes() {
                        store.start_annotation(&change.name, change.new_value.clone());
                    }
                }
            }
        }
        if trailing > 0 {
            store.skip(trailing);
        }
        store.finish();
    }

    /// The operation that builds this document from nothing.
    ///
    /// Adjacent characters share one component; annotation values are
    /// started where they first apply and ended where they stop, with every
    /// key ended at the end of the document.
    pub fn to_initialization(&self) -> DocInitialization {
        let mut components = Vec::new();
        let mut run = String::new();
        let mut open: BTreeMap<String, String> = BTreeMap::new();

        for (location, item) in self.items.iter().enumerate() {
            let mut here = BTreeMap::new();
            self.annotations
                .for_each_annotation_at(location, &mut |key, value| {
                    here.insert(key.to_owned(), value.clone());
                });
            if here != open {
                flush_run(&mut run, &mut components);
                components.push(DocOpComponent::AnnotationBoundary(boundary_between(
                    &open, &here,
                )));
                open = here;
            }
            match item {
                Item::Character(c) => run.push(*c),
                Item::ElementStart { tag, attributes } => {
                    flush_run(&mut run, &mut components);
                    components.push(DocOpComponent::ElementStart {
                        tag: tag.clone(),
                        attributes: attributes.clone(),
                    });
                }
                Item::ElementEnd => {
                    flush_run(&mut run, &mut components);
                    components.push(DocOpComponent::ElementEnd);
                }
            }
        }
        flush_run(&mut run, &mut components);
        if !open.is_empty() {
            components.push(DocOpComponent::AnnotationBoundary(boundary_between(
                &open,
                &BTreeMap::new(),
            )));
        }
        BufferedDocOp::new(components).into_initialization()
    }

    /// Canonical XML form of the document.
    pub fn to_xml_string(&self) -> String {
        debug_to_xml_string(&self.to_initialization())
    }
}

fn mismatch(position: usize, reason: String) -> OperationError {
    OperationError::Mismatch { position, reason }
}

fn flush_run(run: &mut String, components: &mut Vec<DocOpComponent>) {
    if !run.is_empty() {
        components.push(DocOpComponent::Characters(std::mem::take(run)));
    }
}

fn boundary_between(
    before: &BTreeMap<String, String>,
    after: &BTreeMap<String, String>,
) -> AnnotationBoundaryMap {
    let ends = before
        .keys()
        .filter(|key| !after.contains_key(*key))
        .cloned()
        .collect();
    let changes = after
        .iter()
        .filter(|(key, value)| before.get(*key) != Some(*value))
        .map(|(key, value)| AttributeUpdate::new(key.as_str(), None, Some(value.as_str())))
        .collect();
    AnnotationBoundaryMap::new(ends, changes)
}

impl<A: RawAnnotationSet<String>> fmt::Display for IndexedDocument<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml_string())
    }
}

impl<A: ReadableAnnotationSet<String>> ReadableAnnotationSet<String> for IndexedDocument<A> {
    fn size(&self) -> usize {
        self.annotations.size()
    }

    fn get_annotation(&self, location: usize, key: &str) -> Option<&String> {
        self.annotations.get_annotation(location, key)
    }

    fn first_annotation_change(
        &self,
        start: usize,
        end: usize,
        key: &str,
        from_value: Option<&String>,
    ) -> Option<usize> {
        self.annotations
            .first_annotation_change(start, end, key, from_value)
    }

    fn last_annotation_change(
        &self,
        start: usize,
        end: usize,
        key: &str,
        from_value: Option<&String>,
    ) -> Option<usize> {
        self.annotations
            .last_annotation_change(start, end, key, from_value)
    }

    fn known_keys(&self) -> BTreeSet<String> {
        self.annotations.known_keys()
    }

    fn for_each_annotation_at(&self, location: usize, f: &mut dyn FnMut(&str, &String)) {
        self.annotations.for_each_annotation_at(location, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::StubAnnotations;
    use wave_docop::{AttributesUpdate, DocOpBuilder};

    fn paragraph() -> DocInitialization {
        DocOpBuilder::new()
            .element_start("p", Attributes::EMPTY)
            .characters("abc")
            .element_end()
            .build()
            .into_initialization()
    }

    #[test]
    fn consumes_an_initialization() {
        let doc = IndexedDocument::<AnnotationStore<String>>::from_initialization(&paragraph())
            .unwrap();
        assert_eq!(doc.len(), 5);
        assert_eq!(doc.item(1), Some(&Item::Character('a')));
        assert_eq!(doc.to_xml_string(), "<p>abc</p>");
    }

    #[test]
    fn short_operation_keeps_the_rest() {
        let mut doc = IndexedDocument::new();
        doc.consume(&paragraph()).unwrap();
        doc.consume(&DocOpBuilder::new().retain(1).characters("x").build())
            .unwrap();
        assert_eq!(doc.to_xml_string(), "<p>xabc</p>");
    }

    #[test]
    fn failed_operation_changes_nothing() {
        let mut doc = IndexedDocument::new();
        doc.consume(&paragraph()).unwrap();
        let op = DocOpBuilder::new()
            .retain(1)
            .delete_characters("ab")
            .update_attributes(AttributesUpdate::single("a", None, Some("1")))
            .build();
        let err = doc.consume(&op).unwrap_err();
        assert!(matches!(err, OperationError::Mismatch { position: 3, .. }));
        assert_eq!(doc.to_xml_string(), "<p>abc</p>");
        assert_eq!(doc.annotations().size(), 5);
    }

    #[test]
    fn reaching_past_the_end_fails() {
        let mut doc = IndexedDocument::new();
        doc.consume(&paragraph()).unwrap();
        assert_eq!(
            doc.consume(&DocOpBuilder::new().retain(6).build()),
            Err(OperationError::DocumentTooShort {
                required: 6,
                length: 5
            })
        );
    }

    #[test]
    fn huge_retain_fails_without_overflowing() {
        let mut doc = IndexedDocument::new();
        doc.consume(&paragraph()).unwrap();
        let op = DocOpBuilder::new().retain(1).retain(usize::MAX).build_unchecked();
        assert_eq!(
            doc.consume(&op),
            Err(OperationError::DocumentTooShort {
                required: usize::MAX,
                length: 5
            })
        );
        assert_eq!(doc.to_xml_string(), "<p>abc</p>");
    }

    #[test]
    fn back_to_back_boundaries_round_trip() {
        let init = DocOpBuilder::new()
            .characters("a")
            .annotation_boundary(
                AnnotationBoundaryMap::builder()
                    .initialization_values(&[("k", "v")])
                    .build(),
            )
            .annotation_boundary(AnnotationBoundaryMap::builder().end("k").build())
            .characters("b")
            .build()
            .into_initialization();
        let doc = IndexedDocument::<AnnotationStore<String>>::from_initialization(&init).unwrap();
        assert_eq!(doc.to_xml_string(), "ab");
        assert_eq!(debug_to_xml_string(&init), doc.to_xml_string());
    }

    #[test]
    fn ill_formed_operation_is_rejected() {
        let mut doc = IndexedDocument::new();
        let op = DocOpBuilder::new()
            .element_start("p", Attributes::EMPTY)
            .build_unchecked();
        assert!(matches!(
            doc.consume(&op),
            Err(OperationError::IllFormed(_))
        ));
        assert!(doc.is_empty());
    }

    #[test]
    fn initialization_carries_annotations() {
        let init = DocOpBuilder::new()
            .characters("a")
            .annotation_boundary(
                AnnotationBoundaryMap::builder()
                    .initialization_values(&[("k", "v")])
                    .build(),
            )
            .characters("b")
            .characters("c")
            .annotation_boundary(AnnotationBoundaryMap::builder().end("k").build())
            .characters("d")
            .build()
            .into_initialization();
        let doc = IndexedDocument::<AnnotationStore<String>>::from_initialization(&init).unwrap();
        assert_eq!(
            doc.get_annotation(1, "k").map(String::as_str),
            Some("v")
        );
        let expected = DocOpBuilder::new()
            .characters("a")
            .annotation_boundary(
                AnnotationBoundaryMap::builder()
                    .initialization_values(&[("k", "v")])
                    .build(),
            )
            .characters("bc")
            .annotation_boundary(AnnotationBoundaryMap::builder().end("k").build())
            .characters("d")
            .build()
            .into_initialization();
        assert_eq!(doc.to_initialization(), expected);
    }

    #[test]
    fn stub_document_drops_annotations() {
        let init = DocOpBuilder::new()
            .annotation_boundary(
                AnnotationBoundaryMap::builder()
                    .initialization_values(&[("k", "v")])
                    .build(),
            )
            .characters("ab")
            .annotation_boundary(AnnotationBoundaryMap::builder().end("k").build())
            .build()
            .into_initialization();
        let doc = IndexedDocument::<StubAnnotations>::from_initialization(&init).unwrap();
        assert_eq!(doc.to_xml_string(), "ab");
        assert_eq!(doc.size(), 2);
    }
}
