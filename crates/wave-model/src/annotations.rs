//! Annotation stores.
//!
//! A document keeps its annotations in a store implementing
//! [`RawAnnotationSet`]. Every mutation is bracketed:
//!
//! ```text
//! begin() -> (insert | delete | skip | start_annotation | end_annotation)* -> finish()
//! ```
//!
//! The mutation walks the items from the start, like an operation does. Only
//! one bracket may be open at a time; opening a second one, finishing without
//! one, or mutating outside one is a caller bug and panics. [`size`] is exact
//! at every point, mid-mutation included.
//!
//! [`size`]: ReadableAnnotationSet::size

use std::collections::{BTreeMap, BTreeSet};

/// A maximal run of items over which every requested key keeps its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationInterval<V> {
    pub start: usize,
    pub end: usize,
    /// Value of each requested key over the interval, `None` when unset.
    pub annotations: BTreeMap<String, Option<V>>,
}

/// A maximal run of items over which one key keeps one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangedAnnotation<V> {
    pub key: String,
    pub value: Option<V>,
    pub start: usize,
    pub end: usize,
}

/// Query side of an annotation store.
pub trait ReadableAnnotationSet<V> {
    /// Number of items covered by the store.
    fn size(&self) -> usize;

    fn get_annotation(&self, location: usize, key: &str) -> Option<&V>;

    /// First location in `start..end` whose value for `key` differs from
    /// `from_value`.
    fn first_annotation_change(
        &self,
        start: usize,
        end: usize,
        key: &str,
        from_value: Option<&V>,
    ) -> Option<usize>;

    /// One past the last location in `start..end` whose value for `key`
    /// differs from `from_value`.
    fn last_annotation_change(
        &self,
        start: usize,
        end: usize,
        key: &str,
        from_value: Option<&V>,
    ) -> Option<usize>;

    /// Every key that has a value somewhere in the store.
    fn known_keys(&self) -> BTreeSet<String>;

    /// Calls `f` with each key set at `location` and its value.
    fn for_each_annotation_at(&self, location: usize, f: &mut dyn FnMut(&str, &V));

    /// Splits `start..end` into maximal intervals of constant value for
    /// `keys` (all known keys when `None`).
    fn annotation_intervals(
        &self,
        start: usize,
        end: usize,
        keys: Option<&[&str]>,
    ) -> Vec<AnnotationInterval<V>>
    where
        V: Clone,
    {
        let keys = requested_keys(self.known_keys(), keys);
        let mut intervals = Vec::new();
        let mut pos = start;
        while pos < end {
            let mut next = end;
            let mut annotations = BTreeMap::new();
            for key in &keys {
                let value = self.get_annotation(pos, key);
                if let Some(change) = self.first_annotation_change(pos, end, key, value) {
                    next = next.min(change);
                }
                annotations.insert(key.clone(), value.cloned());
            }
            intervals.push(AnnotationInterval {
                start: pos,
                end: next,
                annotations,
            });
            pos = next;
        }
        intervals
    }

    /// Maximal ranges of constant value per key within `start..end`, ordered
    /// by start then key. Unset stretches are reported with a `None` value.
    fn ranged_annotations(
        &self,
        start: usize,
        end: usize,
        keys: Option<&[&str]>,
    ) -> Vec<RangedAnnotation<V>>
    where
        V: Clone,
    {
        let mut ranges = Vec::new();
        for key in requested_keys(self.known_keys(), keys) {
            let mut pos = start;
            while pos < end {
                let value = self.get_annotation(pos, &key);
                let next = self
                    .first_annotation_change(pos, end, &key, value)
                    .unwrap_or(end);
                ranges.push(RangedAnnotation {
                    key: key.clone(),
                    value: value.cloned(),
                    start: pos,
                    end: next,
                });
                pos = next;
            }
        }
        ranges.sort_by(|a, b| (a.start, &a.key).cmp(&(b.start, &b.key)));
        ranges
    }
}

fn requested_keys(known: BTreeSet<String>, keys: Option<&[&str]>) -> BTreeSet<String> {
    match keys {
        Some(keys) => keys.iter().map(|k| k.to_string()).collect(),
        None => known,
    }
}

/// Mutation side of an annotation store.
pub trait RawAnnotationSet<V>: ReadableAnnotationSet<V> {
    /// Opens the mutation bracket.
    ///
    /// # Panics
    ///
    /// If a bracket is already open.
    fn begin(&mut self);

    /// Closes the mutation bracket.
    ///
    /// # Panics
    ///
    /// If no bracket is open.
    fn finish(&mut self);

    /// Inserts `count` items at the cursor, carrying the open annotations.
    fn insert(&mut self, count: usize);

    /// Removes `count` items at the cursor.
    fn delete(&mut self, count: usize);

    /// Moves the cursor over `count` items, applying the open annotations.
    fn skip(&mut self, count: usize);

    /// Sets `key` to `value` for the items the cursor passes from now on.
    fn start_annotation(&mut self, key: &str, value: Option<V>);

    /// Stops setting `key`; items passed from now on keep their value.
    fn end_annotation(&mut self, key: &str);
}

/// Whether a mutation bracket is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationState {
    #[default]
    Idle,
    InMutation,
}

impl MutationState {
    pub fn begin(&mut self) {
        assert!(
            *self == MutationState::Idle,
            "can't make nested modification"
        );
        *self = MutationState::InMutation;
    }

    pub fn finish(&mut self) {
        assert!(
            *self == MutationState::InMutation,
            "can't finish non-existent modification"
        );
        *self = MutationState::Idle;
    }

    pub fn assert_modifying(self) {
        assert!(
            self == MutationState::InMutation,
            "can't make change unless during modification"
        );
    }

    pub fn assert_idle(self) {
        assert!(
            self == MutationState::Idle,
            "can't query annotations during modification"
        );
    }
}

// ── Stub ───────────────────────────────────────────────────────────────────

/// A store for documents that do not track annotations.
///
/// Records no values, so every query reports "unset", but still keeps the
/// item count and enforces the mutation bracket.
#[derive(Debug, Clone, Default)]
pub struct StubAnnotations {
    size: usize,
    state: MutationState,
}

impl StubAnnotations {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V> ReadableAnnotationSet<V> for StubAnnotations {
    fn size(&self) -> usize {
        self.size
    }

    fn get_annotation(&self, _location: usize, _key: &str) -> Option<&V> {
        None
    }

    fn first_annotation_change(
        &self,
        _start: usize,
        _end: usize,
        _key: &str,
        _from_value: Option<&V>,
    ) -> Option<usize> {
        None
    }

    fn last_annotation_change(
        &self,
        _start: usize,
        _end: usize,
        _key: &str,
        _from_value: Option<&V>,
    ) -> Option<usize> {
        None
    }

    fn known_keys(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn for_each_annotation_at(&self, _location: usize, _f: &mut dyn FnMut(&str, &V)) {}
}

impl<V> RawAnnotationSet<V> for StubAnnotations {
    fn begin(&mut self) {
        self.state.begin();
    }

    fn finish(&mut self) {
        self.state.finish();
    }

    fn insert(&mut self, count: usize) {
        self.state.assert_modifying();
        self.size += count;
    }

    fn delete(&mut self, count: usize) {
        self.state.assert_modifying();
        assert!(count <= self.size, "delete of {count} items past the end");
        self.size -= count;
    }

    fn skip(&mut self, _count: usize) {
        self.state.assert_modifying();
    }

    fn start_annotation(&mut self, _key: &str, _value: Option<V>) {
        self.state.assert_modifying();
    }

    fn end_annotation(&mut self, _key: &str) {
        self.state.assert_modifying();
    }
}

// ── Per-item store ─────────────────────────────────────────────────────────

/// A store keeping the annotation values of every item.
#[derive(Debug, Clone)]
pub struct AnnotationStore<V> {
    items: Vec<BTreeMap<String, V>>,
    state: MutationState,
    cursor: usize,
    open: BTreeMap<String, Option<V>>,
}

impl<V> Default for AnnotationStore<V> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: MutationState::Idle,
            cursor: 0,
            open: BTreeMap::new(),
        }
    }
}

impl<V: Clone + PartialEq> AnnotationStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_open(&self, values: &mut BTreeMap<String, V>) {
        for (key, value) in &self.open {
            match value {
                Some(v) => values.insert(key.clone(), v.clone()),
                None => values.remove(key),
            };
        }
    }

    fn value_at(&self, location: usize, key: &str) -> Option<&V> {
        self.state.assert_idle();
        self.items.get(location).and_then(|values| values.get(key))
    }
}

impl<V: Clone + PartialEq> ReadableAnnotationSet<V> for AnnotationStore<V> {
    fn size(&self) -> usize {
        self.items.len()
    }

    fn get_annotation(&self, location: usize, key: &str) -> Option<&V> {
        self.value_at(location, key)
    }

    fn first_annotation_change(
        &self,
        start: usize,
        end: usize,
        key: &str,
        from_value: Option<&V>,
    ) -> Option<usize> {
        (start..end.min(self.items.len())).find(|&i| self.value_at(i, key) != from_value)
    }

    fn last_annotation_change(
        &self,
        start: usize,
        end: usize,
        key: &str,
        from_value: Option<&V>,
    ) -> Option<usize> {
        (start..end.min(self.items.len()))
            .rev()
            .find(|&i| self.value_at(i, key) != from_value)
            .map(|i| i + 1)
    }

    fn known_keys(&self) -> BTreeSet<String> {
        self.state.assert_idle();
        self.items
            .iter()
            .flat_map(|values| values.keys().cloned())
            .collect()
    }

    fn for_each_annotation_at(&self, location: usize, f: &mut dyn FnMut(&str, &V)) {
        self.state.assert_idle();
        if let Some(values) = self.items.get(location) {
            for (key, value) in values {
                f(key, value);
            }
        }
    }
}

impl<V: Clone + PartialEq> RawAnnotationSet<V> for AnnotationStore<V> {
    fn begin(&mut self) {
        self.state.begin();
        self.cursor = 0;
        self.open.clear();
    }

    fn finish(&mut self) {
        self.state.finish();
        self.open.clear();
    }

    fn insert(&mut self, count: usize) {
        self.state.assert_modifying();
        let mut values = BTreeMap::new();
        self.apply_open(&mut values);
        let at = self.cursor;
        self.items
            .splice(at..at, std::iter::repeat(values).take(count));
        self.cursor += count;
    }

    fn delete(&mut self, count: usize) {
        self.state.assert_modifying();
        let end = self.cursor + count;
        assert!(end <= self.items.len(), "delete of {count} items past the end");
        self.items.drain(self.cursor..end);
    }

    fn skip(&mut self, count: usize) {
        self.state.assert_modifying();
        let end = self.cursor + count;
        assert!(end <= self.items.len(), "skip of {count} items past the end");
        if !self.open.is_empty() {
            for i in self.cursor..end {
                let mut values = std::mem::take(&mut self.items[i]);
                self.apply_open(&mut values);
                self.items[i] = values;
            }
        }
        self.cursor = end;
    }

    fn start_annotation(&mut self, key: &str, value: Option<V>) {
        self.state.assert_modifying();
        self.open.insert(key.to_owned(), value);
    }

    fn end_annotation(&mut self, key: &str) {
        self.state.assert_modifying();
        self.open.remove(key);
    }
}
