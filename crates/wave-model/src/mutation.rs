//! Document mutations: operations written without old values.
//!
//! A [`DocumentMutation`] says what to do ("delete 3 characters", "set `link`
//! to `x` over the next 5 items") without restating what is being replaced.
//! [`IndexedDocument::resolve_mutation`] reads the missing old values from a
//! document and produces the equivalent normalized operation.

use std::collections::BTreeMap;

use wave_docop::{
    check_well_formed, normalize, AnnotationBoundaryMap, AttributeUpdate, Attributes,
    AttributesUpdate, BufferedDocOp, DocOpBuilder, DocOpComponent, OperationError,
};

use crate::annotations::{RawAnnotationSet, ReadableAnnotationSet};
use crate::document::{IndexedDocument, Item};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationComponent {
    Skip(usize),
    Characters(String),
    ElementStart { tag: String, attributes: Attributes },
    ElementEnd,
    DeleteCharacters(usize),
    DeleteElementStart,
    DeleteElementEnd,
    ReplaceAttributes(Attributes),
    /// New value per key, `None` removing the attribute.
    UpdateAttributes(BTreeMap<String, Option<String>>),
    StartAnnotation { key: String, value: Option<String> },
    EndAnnotation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMutation {
    components: Vec<MutationComponent>,
}

impl DocumentMutation {
    pub fn builder() -> DocumentMutationBuilder {
        DocumentMutationBuilder::default()
    }

    pub fn components(&self) -> &[MutationComponent] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Chained builder for [`DocumentMutation`]. Adjacent skips are merged and
/// empty ones dropped.
#[derive(Debug, Clone, Default)]
pub struct DocumentMutationBuilder {
    components: Vec<MutationComponent>,
}

impl DocumentMutationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[must_use]
    pub fn skip(mut self, count: usize) -> Self {
        self.push_skip(count);
        self
    }

    pub(crate) fn push_skip(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        if let Some(MutationComponent::Skip(n)) = self.components.last_mut() {
            *n = n.saturating_add(count);
        } else {
            self.components.push(MutationComponent::Skip(count));
        }
    }

    pub(crate) fn push(&mut self, component: MutationComponent) {
        self.components.push(component);
    }

    #[must_use]
    pub fn characters(mut self, chars: impl Into<String>) -> Self {
        self.push(MutationComponent::Characters(chars.into()));
        self
    }

    #[must_use]
    pub fn element_start(mut self, tag: impl Into<String>, attributes: Attributes) -> Self {
        self.push(MutationComponent::ElementStart {
            tag: tag.into(),
            attributes,
        });
        self
    }

    #[must_use]
    pub fn element_end(mut self) -> Self {
        self.push(MutationComponent::ElementEnd);
        self
    }

    #[must_use]
    pub fn delete_characters(mut self, count: usize) -> Self {
        self.push(MutationComponent::DeleteCharacters(count));
        self
    }

    #[must_use]
    pub fn delete_element_start(mut self) -> Self {
        self.push(MutationComponent::DeleteElementStart);
        self
    }

    #[must_use]
    pub fn delete_element_end(mut self) -> Self {
        self.push(MutationComponent::DeleteElementEnd);
        self
    }

    #[must_use]
    pub fn replace_attributes(mut self, attributes: Attributes) -> Self {
        self.push(MutationComponent::ReplaceAttributes(attributes));
        self
    }

    #[must_use]
    pub fn update_attributes<'a>(
        mut self,
        updates: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
    ) -> Self {
        let updates = updates
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.map(str::to_owned)))
            .collect();
        self.push(MutationComponent::UpdateAttributes(updates));
        self
    }

    #[must_use]
    pub fn start_annotation(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.push(MutationComponent::StartAnnotation {
            key: key.into(),
            value: value.map(str::to_owned),
        });
        self
    }

    #[must_use]
    pub fn end_annotation(mut self, key: impl Into<String>) -> Self {
        self.push(MutationComponent::EndAnnotation(key.into()));
        self
    }

    pub fn build(self) -> DocumentMutation {
        DocumentMutation {
            components: self.components,
        }
    }

    /// Takes the components built so far, leaving the builder empty.
    pub(crate) fn take(&mut self) -> DocumentMutation {
        DocumentMutation {
            components: std::mem::take(&mut self.components),
        }
    }
}

impl<A: RawAnnotationSet<String>> IndexedDocument<A> {
    /// The operation equivalent to `mutation` on this document.
    ///
    /// Old values (deleted text, replaced attributes, annotation values being
    /// overwritten) are read from the document. The result is normalized.
    pub fn resolve_mutation(
        &self,
        mutation: &DocumentMutation,
    ) -> Result<BufferedDocOp, OperationError> {
        let mut resolver = Resolver {
            doc: self,
            out: DocOpBuilder::new(),
            pos: 0,
            open: BTreeMap::new(),
            ended: Vec::new(),
        };
        for component in mutation.components() {
            resolver.resolve(component)?;
        }
        if let Some(key) = resolver.open.keys().next() {
            return Err(OperationError::InvalidMutation(format!(
                "annotation {key:?} started but never ended"
            )));
        }
        resolver.boundary(|_| None);
        let op = normalize(&resolver.out.build_unchecked());
        check_well_formed(&op)?;
        Ok(op)
    }

    /// Resolves `mutation` and consumes the result, returning the applied
    /// operation.
    pub fn consume_mutation(
        &mut self,
        mutation: &DocumentMutation,
    ) -> Result<BufferedDocOp, OperationError> {
        let op = self.resolve_mutation(mutation)?;
        self.consume(&op)?;
        Ok(op)
    }
}

struct Resolver<'a, A> {
    doc: &'a IndexedDocument<A>,
    out: DocOpBuilder,
    pos: usize,
    /// Annotation values being written, by key.
    open: BTreeMap<String, Option<String>>,
    /// Keys ended since the last item.
    ended: Vec<String>,
}

impl<A: RawAnnotationSet<String>> Resolver<'_, A> {
    fn item(&self) -> Result<&Item, OperationError> {
        self.doc
            .item(self.pos)
            .ok_or_else(|| OperationError::DocumentTooShort {
                required: self.pos + 1,
                length: self.doc.len(),
            })
    }

    fn element_start(&self) -> Result<(&str, &Attributes), OperationError> {
        match self.item()? {
            Item::ElementStart { tag, attributes } => Ok((tag.as_str(), attributes)),
            other => Err(OperationError::Mismatch {
                position: self.pos,
                reason: format!("expected an element start, found {other}"),
            }),
        }
    }

    /// Emits the annotation state for the next item. Redundant boundaries
    /// are removed by normalization.
    fn boundary(&mut self, old_value: impl Fn(&str) -> Option<String>) {
        let mut ends: Vec<String> = std::mem::take(&mut self.ended)
            .into_iter()
            .filter(|key| !self.open.contains_key(key))
            .collect();
        ends.sort();
        ends.dedup();
        let changes = self
            .open
            .iter()
            .map(|(key, value)| AttributeUpdate {
                name: key.clone(),
                old_value: old_value(key.as_str()),
                new_value: value.clone(),
            })
            .collect();
        self.out.push(DocOpComponent::AnnotationBoundary(
            AnnotationBoundaryMap::new(ends, changes),
        ));
    }

    /// Boundary before the document item at the cursor.
    fn boundary_at_cursor(&mut self) {
        let doc = self.doc;
        let pos = self.pos;
        self.boundary(|key| doc.annotations().get_annotation(pos, key).cloned());
    }

    fn resolve(&mut self, component: &MutationComponent) -> Result<(), OperationError> {
        match component {
            MutationComponent::Skip(n) => {
                let fits = self.pos.checked_add(*n).is_some_and(|end| end <= self.doc.len());
                if !fits {
                    return Err(OperationError::DocumentTooShort {
                        required: self.pos.saturating_add(*n),
                        length: self.doc.len(),
                    });
                }
                for _ in 0..*n {
                    self.boundary_at_cursor();
                    self.out.push(DocOpComponent::Retain(1));
                    self.pos += 1;
                }
            }
            MutationComponent::Characters(s) => {
                self.boundary(|_| None);
                self.out.push(DocOpComponent::Characters(s.clone()));
            }
            MutationComponent::ElementStart { tag, attributes } => {
                self.boundary(|_| None);
                self.out.push(DocOpComponent::ElementStart {
                    tag: tag.clone(),
                    attributes: attributes.clone(),
                });
            }
            MutationComponent::ElementEnd => {
                self.boundary(|_| None);
                self.out.push(DocOpComponent::ElementEnd);
            }
            MutationComponent::DeleteCharacters(n) => {
                let mut deleted = String::new();
                for _ in 0..*n {
                    match self.item()? {
                        Item::Character(c) => deleted.push(*c),
                        other => {
                            return Err(OperationError::Mismatch {
                                position: self.pos,
                                reason: format!("deleting a character, found {other}"),
                            })
                        }
                    }
                    self.pos += 1;
                }
                if !deleted.is_empty() {
                    self.out.push(DocOpComponent::DeleteCharacters(deleted));
                }
            }
            MutationComponent::DeleteElementStart => {
                let (tag, attributes) = self.element_start()?;
                let component = DocOpComponent::DeleteElementStart {
                    tag: tag.to_owned(),
                    attributes: attributes.clone(),
                };
                self.out.push(component);
                self.pos += 1;
            }
            MutationComponent::DeleteElementEnd => {
                match self.item()? {
                    Item::ElementEnd => {}
                    other => {
                        return Err(OperationError::Mismatch {
                            position: self.pos,
                            reason: format!("deleting an element end, found {other}"),
                        })
                    }
                }
                self.out.push(DocOpComponent::DeleteElementEnd);
                self.pos += 1;
            }
            MutationComponent::ReplaceAttributes(new) => {
                let old = self.element_start()?.1.clone();
                self.boundary_at_cursor();
                self.out.push(DocOpComponent::ReplaceAttributes {
                    old,
                    new: new.clone(),
                });
                self.pos += 1;
            }
            MutationComponent::UpdateAttributes(new_values) => {
                let current = self.element_start()?.1;
                let update = AttributesUpdate::from_triples(
                    new_values
                        .iter()
                        .map(|(key, new)| (key.as_str(), current.get(key), new.as_deref())),
                );
                self.boundary_at_cursor();
                self.out.push(DocOpComponent::UpdateAttributes(update));
                self.pos += 1;
            }
            MutationComponent::StartAnnotation { key, value } => {
                self.ended.retain(|k| k != key);
                self.open.insert(key.clone(), value.clone());
            }
            MutationComponent::EndAnnotation(key) => {
                if self.open.remove(key).is_none() {
                    return Err(OperationError::InvalidMutation(format!(
                        "annotation {key:?} ended but not started"
                    )));
                }
                self.ended.push(key.clone());
            }
        }
        Ok(())
    }
}
