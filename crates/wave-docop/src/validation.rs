//! Structural well-formedness of operations.
//!
//! An operation is well-formed when, independently of any document:
//!
//! - retains are at least 1 and character runs are non-empty,
//! - inserted and deleted element starts are closed by the matching kind of
//!   end, in nesting order,
//! - inside an inserted element only insertions appear, inside a deleted
//!   element only deletions (annotation boundaries are allowed anywhere),
//! - only open annotation keys are ended, and every key changed is ended by
//!   the end of the operation.

use std::collections::BTreeSet;

use crate::annotation_boundary::AnnotationBoundaryMap;
use crate::attributes::{Attributes, AttributesUpdate};
use crate::error::WellFormednessError;
use crate::op::{DocOp, DocOpCursor, EvaluatingDocOpCursor};

/// Checks `op` for structural well-formedness, reporting the first problem.
pub fn check_well_formed<O: DocOp + ?Sized>(op: &O) -> Result<(), WellFormednessError> {
    let mut checker = WellFormednessChecker::default();
    op.apply(&mut checker);
    checker.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nesting {
    Insertion,
    Deletion,
}

#[derive(Debug, Default)]
struct WellFormednessChecker {
    index: usize,
    stack: Vec<Nesting>,
    open_annotations: BTreeSet<String>,
    error: Option<WellFormednessError>,
}

impl WellFormednessChecker {
    /// Runs `check` for the current component unless an earlier one failed.
    fn step(&mut self, check: impl FnOnce(&mut Self) -> Result<(), WellFormednessError>) {
        if self.error.is_none() {
            if let Err(err) = check(self) {
                self.error = Some(err);
            }
        }
        self.index += 1;
    }

    fn outside_insertion(&self, component: &'static str) -> Result<(), WellFormednessError> {
        if self.stack.last() == Some(&Nesting::Insertion) {
            return Err(WellFormednessError::InsideInsertion {
                index: self.index,
                component,
            });
        }
        Ok(())
    }

    fn outside_deletion(&self, component: &'static str) -> Result<(), WellFormednessError> {
        if self.stack.last() == Some(&Nesting::Deletion) {
            return Err(WellFormednessError::InsideDeletion {
                index: self.index,
                component,
            });
        }
        Ok(())
    }

    fn non_empty(&self, chars: &str) -> Result<(), WellFormednessError> {
        if chars.is_empty() {
            return Err(WellFormednessError::EmptyCharacters { index: self.index });
        }
        Ok(())
    }
}

impl DocOpCursor for WellFormednessChecker {
    fn retain(&mut self, item_count: usize) {
        self.step(|c| {
            if item_count == 0 {
                return Err(WellFormednessError::ZeroRetain { index: c.index });
            }
            c.outside_insertion("retain")?;
            c.outside_deletion("retain")
        });
    }

    fn characters(&mut self, chars: &str) {
        self.step(|c| {
            c.non_empty(chars)?;
            c.outside_deletion("characters")
        });
    }

    fn delete_characters(&mut self, chars: &str) {
        self.step(|c| {
            c.non_empty(chars)?;
            c.outside_insertion("deleteCharacters")
        });
    }

    fn element_start(&mut self, _tag: &str, _attributes: &Attributes) {
        self.step(|c| {
            c.outside_deletion("elementStart")?;
            c.stack.push(Nesting::Insertion);
            Ok(())
        });
    }

    fn element_end(&mut self) {
        self.step(|c| match c.stack.pop() {
            Some(Nesting::Insertion) => Ok(()),
            _ => Err(WellFormednessError::UnmatchedElementEnd { index: c.index }),
        });
    }

    fn delete_element_start(&mut self, _tag: &str, _attributes: &Attributes) {
        self.step(|c| {
            c.outside_insertion("deleteElementStart")?;
            c.stack.push(Nesting::Deletion);
            Ok(())
        });
    }

    fn delete_element_end(&mut self) {
        self.step(|c| match c.stack.pop() {
            Some(Nesting::Deletion) => Ok(()),
            _ => Err(WellFormednessError::UnmatchedDeleteElementEnd { index: c.index }),
        });
    }

    fn replace_attributes(&mut self, _old: &Attributes, _new: &Attributes) {
        self.step(|c| {
            c.outside_insertion("replaceAttributes")?;
            c.outside_deletion("replaceAttributes")
        });
    }

    fn update_attributes(&mut self, _update: &AttributesUpdate) {
        self.step(|c| {
            c.outside_insertion("updateAttributes")?;
            c.outside_deletion("updateAttributes")
        });
    }

    fn annotation_boundary(&mut self, map: &AnnotationBoundaryMap) {
        self.step(|c| {
            for key in map.ends() {
                if !c.open_annotations.remove(key) {
                    return Err(WellFormednessError::EndOfUnknownAnnotation {
                        index: c.index,
                        key: key.clone(),
                    });
                }
            }
            for change in map.changes() {
                c.open_annotations.insert(change.name.clone());
            }
            Ok(())
        });
    }
}

impl EvaluatingDocOpCursor<Result<(), WellFormednessError>> for WellFormednessChecker {
    fn finish(self) -> Result<(), WellFormednessError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.stack.is_empty() {
            return Err(WellFormednessError::UnclosedElements {
                depth: self.stack.len(),
            });
        }
        if !self.open_annotations.is_empty() {
            return Err(WellFormednessError::UnclosedAnnotations {
                keys: self.open_annotations.into_iter().collect(),
            });
        }
        Ok(())
    }
}
