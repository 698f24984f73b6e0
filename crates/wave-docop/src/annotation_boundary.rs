//! Annotation boundaries.
//!
//! An [`AnnotationBoundaryMap`] sits between two items of an operation and
//! says which annotation keys stop being touched from here on ("ends") and
//! which keys change value from here on ("changes", with the value the
//! document held before and the value it holds afterwards).

use std::collections::BTreeSet;
use std::fmt;

use crate::error::MergeError;
use crate::render::concise;
use crate::update_map::{compose_updates, sorted_unique, AttributeUpdate, UpdateMap};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AnnotationBoundaryMap {
    ends: Vec<String>,
    changes: Vec<AttributeUpdate>,
}

impl AnnotationBoundaryMap {
    pub fn builder() -> AnnotationBoundaryMapBuilder {
        AnnotationBoundaryMapBuilder::default()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a boundary from sorted, disjoint parts.
    ///
    /// # Panics
    ///
    /// If a key is duplicated or appears both as an end and as a change.
    pub fn new(mut ends: Vec<String>, changes: Vec<AttributeUpdate>) -> Self {
        ends.sort();
        if let Some(pair) = ends.windows(2).find(|w| w[0] == w[1]) {
            panic!("annotation {:?} ended twice in one boundary", pair[0]);
        }
        let changes = sorted_unique(changes);
        for change in &changes {
            if ends.binary_search(&change.name).is_ok() {
                panic!(
                    "annotation {:?} both ended and changed in one boundary",
                    change.name
                );
            }
        }
        Self { ends, changes }
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty() && self.changes.is_empty()
    }

    pub fn end_size(&self) -> usize {
        self.ends.len()
    }

    pub fn end_key(&self, i: usize) -> &str {
        &self.ends[i]
    }

    pub fn ends(&self) -> &[String] {
        &self.ends
    }

    pub fn changes(&self) -> &[AttributeUpdate] {
        &self.changes
    }

    pub fn is_ended(&self, key: &str) -> bool {
        self.ends.iter().any(|k| k == key)
    }

    pub fn change(&self, key: &str) -> Option<&AttributeUpdate> {
        self.changes.iter().find(|c| c.name == key)
    }

    /// Drops every end and change whose key is in `names`.
    pub fn exclude<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let excluded = |key: &str| names.iter().any(|n| n.as_ref() == key);
        Self {
            ends: self.ends.iter().filter(|k| !excluded(k.as_str())).cloned().collect(),
            changes: self
                .changes
                .iter()
                .filter(|c| !excluded(c.name.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Merges `later`, occurring at the same position, into this boundary.
    ///
    /// For every key the later event wins. A key changed by both must chain
    /// (see [`compose_updates`]); a change followed by an end collapses to
    /// the end.
    pub fn compose_with(&self, later: &AnnotationBoundaryMap) -> Result<Self, MergeError> {
        let earlier_changes: Vec<AttributeUpdate> = self
            .changes
            .iter()
            .filter(|c| !later.is_ended(&c.name))
            .cloned()
            .collect();
        let changes = compose_updates(&earlier_changes, &later.changes)?;

        let mut ends: BTreeSet<&String> = self
            .ends
            .iter()
            .filter(|k| later.change(k).is_none())
            .collect();
        ends.extend(later.ends.iter());

        Ok(Self {
            ends: ends.into_iter().cloned().collect(),
            changes,
        })
    }
}

impl UpdateMap for AnnotationBoundaryMap {
    fn change_size(&self) -> usize {
        self.changes.len()
    }

    fn change_key(&self, i: usize) -> &str {
        &self.changes[i].name
    }

    fn old_value(&self, i: usize) -> Option<&str> {
        self.changes[i].old_value.as_deref()
    }

    fn new_value(&self, i: usize) -> Option<&str> {
        self.changes[i].new_value.as_deref()
    }
}

impl fmt::Display for AnnotationBoundaryMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&concise::annotation_boundary_string(self))
    }
}

/// Accumulates ends and changes, validated by [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct AnnotationBoundaryMapBuilder {
    ends: Vec<String>,
    changes: Vec<AttributeUpdate>,
}

impl AnnotationBoundaryMapBuilder {
    /// Changes from "absent" to the given values, as used by initializations.
    pub fn initialization_values(mut self, pairs: &[(&str, &str)]) -> Self {
        for (key, value) in pairs {
            self.changes.push(AttributeUpdate::new(*key, None, Some(*value)));
        }
        self
    }

    pub fn initialization_end(mut self, keys: &[&str]) -> Self {
        self.ends.extend(keys.iter().map(|k| k.to_string()));
        self
    }

    pub fn update_values(mut self, triples: &[(&str, Option<&str>, Option<&str>)]) -> Self {
        for (key, old, new) in triples {
            self.changes.push(AttributeUpdate::new(*key, *old, *new));
        }
        self
    }

    pub fn change(mut self, key: &str, old_value: Option<&str>, new_value: Option<&str>) -> Self {
        self.changes.push(AttributeUpdate::new(key, old_value, new_value));
        self
    }

    pub fn end(mut self, key: &str) -> Self {
        self.ends.push(key.to_owned());
        self
    }

    /// # Panics
    ///
    /// See [`AnnotationBoundaryMap::new`].
    pub fn build(self) -> AnnotationBoundaryMap {
        AnnotationBoundaryMap::new(self.ends, self.changes)
    }
}
