use std::collections::BTreeMap;
use std::mem;

use crate::annotation_boundary::AnnotationBoundaryMap;
use crate::attributes::{Attributes, AttributesUpdate};
use crate::op::{DocOpCursor, EvaluatingDocOpCursor};
use crate::update_map::AttributeUpdate;

#[derive(Debug, Clone, PartialEq, Eq)]
enum BoundaryEvent {
    End,
    Change {
        old_value: Option<String>,
        new_value: Option<String>,
    },
}

/// Removes redundant annotation boundaries.
///
/// Boundaries are held back until the next item-bearing component, so
/// consecutive boundaries collapse into one (the later event per key wins).
/// When flushed, ends of keys that are not open and changes identical to the
/// change already in effect are dropped; an empty result emits nothing.
/// Empty ranges are dropped too, since they would keep two boundaries apart.
#[derive(Debug)]
pub struct AnnotationsNormalizer<C> {
    target: C,
    in_effect: BTreeMap<String, (Option<String>, Option<String>)>,
    pending: BTreeMap<String, BoundaryEvent>,
}

impl<C: DocOpCursor> AnnotationsNormalizer<C> {
    pub fn new(target: C) -> Self {
        Self {
            target,
            in_effect: BTreeMap::new(),
            pending: BTreeMap::new(),
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut ends = Vec::new();
        let mut changes = Vec::new();
        for (key, event) in mem::take(&mut self.pending) {
            match event {
                BoundaryEvent::End => {
                    if self.in_effect.remove(&key).is_some() {
                        ends.push(key);
                    }
                }
                BoundaryEvent::Change {
                    old_value,
                    new_value,
                } => {
                    let state = (old_value, new_value);
                    if self.in_effect.get(&key) != Some(&state) {
                        changes.push(AttributeUpdate {
                            name: key.clone(),
                            old_value: state.0.clone(),
                            new_value: state.1.clone(),
                        });
                        self.in_effect.insert(key, state);
                    }
                }
            }
        }
        if !ends.is_empty() || !changes.is_empty() {
            self.target
                .annotation_boundary(&AnnotationBoundaryMap::new(ends, changes));
        }
    }
}

impl<C: DocOpCursor> DocOpCursor for AnnotationsNormalizer<C> {
    fn retain(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        self.flush();
        self.target.retain(item_count);
    }

    fn characters(&mut self, chars: &str) {
        if chars.is_empty() {
            return;
        }
        self.flush();
        self.target.characters(chars);
    }

    fn delete_characters(&mut self, chars: &str) {
        if chars.is_empty() {
            return;
        }
        self.flush();
        self.target.delete_characters(chars);
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
        for key in map.ends() {
            self.pending.insert(key.clone(), BoundaryEvent::End);
        }
        for change in map.changes() {
            self.pending.insert(
                change.name.clone(),
                BoundaryEvent::Change {
                    old_value: change.old_value.clone(),
                    new_value: change.new_value.clone(),
                },
            );
        }
    }
}

impl<T, C: EvaluatingDocOpCursor<T>> EvaluatingDocOpCursor<T> for AnnotationsNormalizer<C> {
    fn finish(mut self) -> T {
        self.flush();
        self.target.finish()
    }
}
