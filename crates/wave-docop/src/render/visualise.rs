//! Side-by-side view of a document and an operation applied to it.

use crate::annotation_boundary::AnnotationBoundaryMap;
use crate::attributes::{Attributes, AttributesUpdate};
use crate::explode::explode;
use crate::op::{DocInitialization, DocOp, DocOpComponent, DocOpCursor, EvaluatingDocOpCursor};

use super::concise::ConciseStringBuilder;
use super::xml::XmlStringBuilder;

/// Lays out `doc` and `op` in three aligned rows: the document XML, the
/// concise form of `op`, and the index of the document item each component
/// of `op` starts at.
///
/// Each row is padded after every component, so a component of `op` sits
/// directly below the part of the document it covers. Intended for
/// diagnostics; a broken `doc` renders as far as it can.
pub fn visualise_op_with_document<O: DocOp + ?Sized>(
    doc: &DocInitialization,
    op: &O,
) -> [String; 3] {
    let exploded = explode(doc);
    let mut doc_row = String::new();
    let (op_row, index_row) = {
        let mut visualiser = Visualiser {
            doc: XmlStringBuilder::new(&mut doc_row),
            op: ConciseStringBuilder::new(),
            indices: String::new(),
            components: exploded.components(),
            next_component: 0,
            next_item: 0,
        };
        op.apply(&mut visualiser);
        visualiser.render_rest();
        let Visualiser {
            doc,
            op: op_row,
            indices,
            ..
        } = visualiser;
        if let Err(err) = doc.finish() {
            log::debug!("visualised document is broken: {err}");
        }
        (op_row.finish(), indices)
    };
    [doc_row, op_row, index_row]
}

struct Visualiser<'a> {
    doc: XmlStringBuilder<'a>,
    op: ConciseStringBuilder,
    indices: String,
    components: &'a [DocOpComponent],
    next_component: usize,
    next_item: usize,
}

impl Visualiser<'_> {
    /// Renders the next `item_count` document items and any boundaries
    /// before them.
    fn render_items(&mut self, mut item_count: usize) {
        self.indices.push_str(&self.next_item.to_string());
        self.next_item += item_count;
        let components = self.components;
        while item_count > 0 && self.next_component < components.len() {
            let component = &components[self.next_component];
            component.apply_to(&mut self.doc);
            if !matches!(component, DocOpComponent::AnnotationBoundary(_)) {
                item_count -= 1;
            }
            self.next_component += 1;
        }
    }

    fn render_rest(&mut self) {
        let components = self.components;
        for component in &components[self.next_component..] {
            component.apply_to(&mut self.doc);
        }
        self.next_component = components.len();
    }

    fn align(&mut self) {
        let width = self
            .doc
            .written_len()
            .max(self.op.as_str().chars().count())
            .max(self.indices.chars().count());
        self.doc.pad_to(width);
        self.op.pad_to(width);
        let len = self.indices.chars().count();
        self.indices
            .extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    }

    fn step(&mut self, consumed_items: usize) {
        if consumed_items > 0 {
            self.render_items(consumed_items);
        }
        self.align();
    }
}

impl DocOpCursor for Visualiser<'_> {
    fn retain(&mut self, item_count: usize) {
        self.op.retain(item_count);
        self.step(item_count);
    }

    fn characters(&mut self, chars: &str) {
        self.op.characters(chars);
        self.step(0);
    }

    fn delete_characters(&mut self, chars: &str) {
        self.op.delete_characters(chars);
        self.step(chars.chars().count());
    }

    fn element_start(&mut self, tag: &str, attributes: &Attributes) {
        self.op.element_start(tag, attributes);
        self.step(0);
    }

    fn element_end(&mut self) {
        self.op.element_end();
        self.step(0);
    }

    fn delete_element_start(&mut self, tag: &str, attributes: &Attributes) {
        self.op.delete_element_start(tag, attributes);
        self.step(1);
    }

    fn delete_element_end(&mut self) {
        self.op.delete_element_end();
        self.step(1);
    }

    fn replace_attributes(&mut self, old: &Attributes, new: &Attributes) {
        self.op.replace_attributes(old, new);
        self.step(1);
    }

    fn update_attributes(&mut self, update: &AttributesUpdate) {
        self.op.update_attributes(update);
        self.step(1);
    }

    fn annotation_boundary(&mut self, map: &AnnotationBoundaryMap) {
        self.op.annotation_boundary(map);
        self.step(0);
    }
}
