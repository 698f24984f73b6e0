use std::mem;

use crate::annotation_boundary::AnnotationBoundaryMap;
use crate::attributes::{Attributes, AttributesUpdate};
use crate::op::{DocOpCursor, EvaluatingDocOpCursor};

#[derive(Debug, Default)]
enum PendingRange {
    #[default]
    Empty,
    Retain(usize),
    Characters(String),
    DeleteCharacters(String),
}

/// Coalesces adjacent retains, character runs and deleted character runs,
/// and drops empty ones.
#[derive(Debug)]
pub struct RangeNormalizer<C> {
    target: C,
    pending: PendingRange,
}

impl<C: DocOpCursor> RangeNormalizer<C> {
    pub fn new(target: C) -> Self {
        Self {
            target,
            pending: PendingRange::Empty,
        }
    }

    fn flush(&mut self) {
        match mem::take(&mut self.pending) {
            PendingRange::Empty => {}
            PendingRange::Retain(n) => self.target.retain(n),
            PendingRange::Characters(s) => self.target.characters(&s),
            PendingRange::DeleteCharacters(s) => self.target.delete_characters(&s),
        }
    }
}

impl<C: DocOpCursor> DocOpCursor for RangeNormalizer<C> {
    fn retain(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        if let PendingRange::Retain(n) = &mut self.pending {
            *n += item_count;
        } else {
            self.flush();
            self.pending = PendingRange::Retain(item_count);
        }
    }

    fn characters(&mut self, chars: &str) {
        if chars.is_empty() {
            return;
        }
        if let PendingRange::Characters(s) = &mut self.pending {
            s.push_str(chars);
        } else {
            self.flush();
            self.pending = PendingRange::Characters(chars.to_owned());
        }
    }

    fn delete_characters(&mut self, chars: &str) {
        if chars.is_empty() {
            return;
        }
        if let PendingRange::DeleteCharacters(s) = &mut self.pending {
            s.push_str(chars);
        } else {
            self.flush();
            self.pending = PendingRange::DeleteCharacters(chars.to_owned());
        }
    }

    fn element_start(&mut self, tag: &str, attributes: &Attributes) {
        self.flush();
        self.target.element_start(tag, attributes);
    }

    fn element_end(&mut self) {
        self.flush();
        self.target.element_end();
    }

    fn delete_element_start(&mut self, tag: &str, attributes: &Attributes) {
        self.flush();
        self.target.delete_element_start(tag, attributes);
    }

    fn delete_element_end(&mut self) {
        self.flush();
        self.target.delete_element_end();
    }

    fn replace_attributes(&mut self, old: &Attributes, new: &Attributes) {
        self.flush();
        self.target.replace_attributes(old, new);
    }

    fn update_attributes(&mut self, update: &AttributesUpdate) {
        self.flush();
        self.target.update_attributes(update);
    }

    fn annotation_boundary(&mut self, map: &AnnotationBoundaryMap) {
        self.flush();
        self.target.annotation_boundary(map);
    }
}

impl<T, C: EvaluatingDocOpCursor<T>> EvaluatingDocOpCursor<T> for RangeNormalizer<C> {
    fn finish(mut self) -> T {
        self.flush();
        self.target.finish()
    }
}
