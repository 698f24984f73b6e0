//! Minimal XML form of a document initialization.
//!
//! Elements render as tags, with childless elements self-closed (`<q/>`).
//! Attributes render as ` k="v"` in key order. Annotation changes render as a
//! processing instruction before the item they start at:
//!
//! ```text
//! <?a "key"="value" "ended"?>
//! ```
//!
//! Entries are sorted by key. A key whose value becomes absent, by an end or
//! by a change to `null`, renders bare. Consecutive boundaries render as one
//! instruction holding their net effect, and a boundary run that leaves every
//! value as it was renders nothing.

use std::collections::{BTreeSet, HashMap};
use std::mem;

use crate::annotation_boundary::AnnotationBoundaryMap;
use crate::attributes::{Attributes, AttributesUpdate};
use crate::error::RenderError;
use crate::op::{DocInitialization, DocOp, DocOpComponentType, DocOpCursor};

use super::{annotation_escape, xml_attr_escape, xml_text_escape, PI_TARGET};

pub fn to_xml_string(init: &DocInitialization) -> Result<String, RenderError> {
    let mut out = String::new();
    build_xml_string(init, &mut out)?;
    Ok(out)
}

/// Appends the XML form of `init` to `out`.
///
/// On error `out` holds the output written up to the offending component.
pub fn build_xml_string(init: &DocInitialization, out: &mut String) -> Result<(), RenderError> {
    let mut builder = XmlStringBuilder::new(out);
    init.apply(&mut builder);
    builder.finish()
}

/// Like [`to_xml_string`], but never fails.
///
/// A broken initialization yields a placeholder naming the value's address,
/// so two broken documents do not compare equal by accident.
pub fn debug_to_xml_string(init: &DocInitialization) -> String {
    match to_xml_string(init) {
        Ok(xml) => xml,
        Err(err) => {
            log::warn!("cannot render document initialization: {err}");
            format!("toXmlString: DocInitialization was internally broken. ({init:p})")
        }
    }
}

/// ` k="v" k2="v2"` for non-empty attributes, empty otherwise.
fn attributes_part(attributes: &Attributes) -> String {
    let mut part = String::new();
    for (key, value) in attributes.iter() {
        part.push(' ');
        part.push_str(key);
        part.push_str("=\"");
        part.push_str(&xml_attr_escape(value));
        part.push('"');
    }
    part
}

fn annotation_literal(s: &str) -> String {
    format!("\"{}\"", xml_text_escape(&annotation_escape(s)))
}

#[derive(Debug)]
enum State {
    Idle,
    /// An element start whose `>` or `/>` depends on what comes next.
    PendingElementOpen(String),
    Broken(RenderError),
}

/// Cursor writing the XML form of the components it sees.
#[derive(Debug)]
pub(crate) struct XmlStringBuilder<'a> {
    out: &'a mut String,
    state: State,
    tags: Vec<String>,
    annotations: HashMap<String, String>,
    /// Values in effect before the current run of boundaries, if any.
    annotations_before: Option<HashMap<String, String>>,
}

impl<'a> XmlStringBuilder<'a> {
    pub(crate) fn new(out: &'a mut String) -> Self {
        Self {
            out,
            state: State::Idle,
            tags: Vec::new(),
            annotations: HashMap::new(),
            annotations_before: None,
        }
    }

    pub(crate) fn finish(mut self) -> Result<(), RenderError> {
        self.flush_annotations();
        match self.state {
            State::Broken(err) => Err(err),
            _ if !self.tags.is_empty() => Err(RenderError::UnclosedElements(self.tags.len())),
            _ => Ok(()),
        }
    }

    /// Right-pads the output written so far with spaces to `width` chars.
    pub(crate) fn pad_to(&mut self, width: usize) {
        let len = self.out.chars().count();
        self.out.extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    }

    pub(crate) fn written_len(&self) -> usize {
        self.out.chars().count()
    }

    fn is_broken(&self) -> bool {
        matches!(self.state, State::Broken(_))
    }

    fn close_pending_open(&mut self) {
        if let State::PendingElementOpen(part) = mem::replace(&mut self.state, State::Idle) {
            self.out.push_str(&part);
            self.out.push('>');
        }
    }

    /// Writes the net change of the pending boundary run as one instruction.
    fn flush_annotations(&mut self) {
        if self.is_broken() {
            return;
        }
        let Some(before) = self.annotations_before.take() else {
            return;
        };
        let keys: BTreeSet<&String> = before.keys().chain(self.annotations.keys()).collect();
        let changes: Vec<(&str, Option<&str>)> = keys
            .into_iter()
            .filter(|key| before.get(*key) != self.annotations.get(*key))
            .map(|key| (key.as_str(), self.annotations.get(key).map(String::as_str)))
            .collect();
        if changes.is_empty() {
            return;
        }

        let mut pi = String::from("<?");
        pi.push_str(PI_TARGET);
        for (key, value) in changes {
            pi.push(' ');
            pi.push_str(&annotation_literal(key));
            if let Some(value) = value {
                pi.push('=');
                pi.push_str(&annotation_literal(value));
            }
        }
        pi.push_str("?>");
        self.close_pending_open();
        self.out.push_str(&pi);
    }

    fn unexpected(&mut self, component: DocOpComponentType) {
        if !self.is_broken() {
            self.state = State::Broken(RenderError::UnexpectedComponent(component.name()));
        }
    }
}

impl DocOpCursor for XmlStringBuilder<'_> {
    fn retain(&mut self, _item_count: usize) {
        self.unexpected(DocOpComponentType::Retain);
    }

    fn characters(&mut self, chars: &str) {
        if self.is_broken() {
            return;
        }
        self.flush_annotations();
        self.close_pending_open();
        self.out.push_str(&xml_text_escape(chars));
    }

    fn delete_characters(&mut self, _chars: &str) {
        self.unexpected(DocOpComponentType::DeleteCharacters);
    }

    fn element_start(&mut self, tag: &str, attributes: &Attributes) {
        if self.is_broken() {
            return;
        }
        self.flush_annotations();
        self.close_pending_open();
        self.state = State::PendingElementOpen(format!("<{tag}{}", attributes_part(attributes)));
        self.tags.push(tag.to_owned());
    }

    fn element_end(&mut self) {
        if self.is_broken() {
            return;
        }
        self.flush_annotations();
        let Some(tag) = self.tags.pop() else {
            self.state = State::Broken(RenderError::UnmatchedElementEnd);
            return;
        };
        match mem::replace(&mut self.state, State::Idle) {
            State::PendingElementOpen(part) => {
                self.out.push_str(&part);
                self.out.push_str("/>");
            }
            _ => {
                self.out.push_str("</");
                self.out.push_str(&tag);
                self.out.push('>');
            }
        }
    }

    fn delete_element_start(&mut self, _tag: &str, _attributes: &Attributes) {
        self.unexpected(DocOpComponentType::DeleteElementStart);
    }

    fn delete_element_end(&mut self) {
        self.unexpected(DocOpComponentType::DeleteElementEnd);
    }

    fn replace_attributes(&mut self, _old: &Attributes, _new: &Attributes) {
        self.unexpected(DocOpComponentType::ReplaceAttributes);
    }

    fn update_attributes(&mut self, _update: &AttributesUpdate) {
        self.unexpected(DocOpComponentType::UpdateAttributes);
    }

    fn annotation_boundary(&mut self, map: &AnnotationBoundaryMap) {
        if self.is_broken() {
            return;
        }
        if self.annotations_before.is_none() {
            self.annotations_before = Some(self.annotations.clone());
        }
        for change in map.changes() {
            match &change.new_value {
                Some(value) => self.annotations.insert(change.name.clone(), value.clone()),
                None => self.annotations.remove(&change.name),
            };
        }
        for key in map.ends() {
            self.annotations.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::DocOpBuilder;

    fn init(builder: DocOpBuilder) -> DocInitialization {
        builder.build_unchecked().into_initialization()
    }

    #[test]
    fn nested_elements_and_text() {
        let doc = init(
            DocOpBuilder::new()
                .element_start("p", Attributes::EMPTY)
                .characters("hi there")
                .element_start("q", Attributes::from_pairs([("a", "1")]))
                .characters("<some>markup&")
                .element_end()
                .element_end(),
        );
        assert_eq!(
            to_xml_string(&doc).unwrap(),
            "<p>hi there<q a=\"1\">&lt;some&gt;markup&amp;</q></p>"
        );
    }

    #[test]
    fn childless_element_self_closes() {
        let doc = init(
            DocOpBuilder::new()
                .element_start("r", Attributes::from_pairs([("a", "3"), ("b", "\\\"'")]))
                .element_end(),
        );
        assert_eq!(to_xml_string(&doc).unwrap(), "<r a=\"3\" b=\"\\&quot;'\"/>");
    }

    #[test]
    fn annotation_instructions() {
        let start = AnnotationBoundaryMap::builder()
            .initialization_values(&[("y", "3"), ("x", "3")])
            .build();
        let mid = AnnotationBoundaryMap::builder()
            .initialization_end(&["x"])
            .change("y", None, Some("3"))
            .change("z", None, Some("a?b"))
            .build();
        let end = AnnotationBoundaryMap::builder()
            .initialization_end(&["y", "z"])
            .build();
        let doc = init(
            DocOpBuilder::new()
                .annotation_boundary(start)
                .characters("abc")
                .annotation_boundary(mid)
                .characters("def")
                .annotation_boundary(end),
        );
        assert_eq!(
            to_xml_string(&doc).unwrap(),
            "<?a \"x\"=\"3\" \"y\"=\"3\"?>abc<?a \"x\" \"z\"=\"a\\qb\"?>def<?a \"y\" \"z\"?>"
        );
    }

    #[test]
    fn instruction_closes_pending_element_open() {
        let link = AnnotationBoundaryMap::builder()
            .initialization_values(&[("link", "1")])
            .build();
        let doc = init(
            DocOpBuilder::new()
                .element_start("r", Attributes::EMPTY)
                .annotation_boundary(link)
                .element_end()
                .annotation_boundary(AnnotationBoundaryMap::builder().end("link").build()),
        );
        assert_eq!(to_xml_string(&doc).unwrap(), "<r><?a \"link\"=\"1\"?></r><?a \"link\"?>");
    }

    #[test]
    fn consecutive_boundaries_render_their_net_change() {
        let set = |value: &str| {
            AnnotationBoundaryMap::builder()
                .initialization_values(&[("k", value)])
                .build()
        };
        let end = || AnnotationBoundaryMap::builder().end("k").build();

        let cancelled = init(
            DocOpBuilder::new()
                .characters("a")
                .annotation_boundary(set("v"))
                .annotation_boundary(end())
                .characters("b"),
        );
        assert_eq!(to_xml_string(&cancelled).unwrap(), "ab");

        let overwritten = init(
            DocOpBuilder::new()
                .annotation_boundary(set("1"))
                .annotation_boundary(set("2"))
                .element_start("q", Attributes::EMPTY)
                .annotation_boundary(end())
                .annotation_boundary(set("2"))
                .element_end()
                .annotation_boundary(end()),
        );
        assert_eq!(
            to_xml_string(&overwritten).unwrap(),
            "<?a \"k\"=\"2\"?><q/><?a \"k\"?>"
        );
    }

    #[test]
    fn empty_document_renders_empty() {
        assert_eq!(to_xml_string(&DocInitialization::default()).unwrap(), "");
    }

    #[test]
    fn reports_broken_initializations() {
        let unclosed = init(DocOpBuilder::new().element_start("p", Attributes::EMPTY));
        assert_eq!(to_xml_string(&unclosed), Err(RenderError::UnclosedElements(1)));

        let unmatched = init(DocOpBuilder::new().element_end());
        assert_eq!(to_xml_string(&unmatched), Err(RenderError::UnmatchedElementEnd));

        let retained = init(DocOpBuilder::new().retain(2));
        assert_eq!(
            to_xml_string(&retained),
            Err(RenderError::UnexpectedComponent("retain"))
        );
    }

    #[test]
    fn debug_rendering_never_fails() {
        let unclosed = init(DocOpBuilder::new().element_start("p", Attributes::EMPTY));
        assert!(debug_to_xml_string(&unclosed)
            .starts_with("toXmlString: DocInitialization was internally broken."));
    }
}
