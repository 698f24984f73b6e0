//! Document lengths implied by an operation.
//!
//! Items are characters, element starts and element ends. Annotation
//! boundaries occupy no items.

use crate::annotation_boundary::AnnotationBoundaryMap;
use crate::attributes::{Attributes, AttributesUpdate};
use crate::op::{DocOp, DocOpCursor};

/// Number of items of the document `op` applies to, before application.
pub fn initial_document_length<O: DocOp + ?Sized>(op: &O) -> usize {
    measure(op).initial
}

/// Number of items of the document `op` produces when applied.
pub fn resulting_document_length<O: DocOp + ?Sized>(op: &O) -> usize {
    measure(op).resulting
}

fn measure<O: DocOp + ?Sized>(op: &O) -> LengthCounter {
    let mut counter = LengthCounter::default();
    op.apply(&mut counter);
    counter
}

#[derive(Debug, Default)]
struct LengthCounter {
    initial: usize,
    resulting: usize,
}

impl DocOpCursor for LengthCounter {
    fn retain(&mut self, item_count: usize) {
        self.initial += item_count;
        self.resulting += item_count;
    }

    fn characters(&mut self, chars: &str) {
        self.resulting += chars.chars().count();
    }

    fn delete_characters(&mut self, chars: &str) {
        self.initial += chars.chars().count();
    }

    fn element_start(&mut self, _tag: &str, _attributes: &Attributes) {
        self.resulting += 1;
    }

    fn element_end(&mut self) {
        self.resulting += 1;
    }

    fn delete_element_start(&mut self, _tag: &str, _attributes: &Attributes) {
        self.initial += 1;
    }

    fn delete_element_end(&mut self) {
        self.initial += 1;
    }

    fn replace_attributes(&mut self, _old: &Attributes, _new: &Attributes) {
        self.initial += 1;
        self.resulting += 1;
    }

    fn update_attributes(&mut self, _update: &AttributesUpdate) {
        self.initial += 1;
        self.resulting += 1;
    }

    fn annotation_boundary(&mut self, _map: &AnnotationBoundaryMap) {}
}
