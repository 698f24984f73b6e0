//! Element attributes and attribute updates.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::OperationError;
use crate::render::concise;
use crate::update_map::{sorted_unique, AttributeUpdate, ImmutableUpdateMap, UpdateMap};

/// An immutable attribute set, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Attributes {
    entries: BTreeMap<String, String>,
}

impl Attributes {
    /// The empty attribute set.
    pub const EMPTY: Attributes = Attributes {
        entries: BTreeMap::new(),
    };

    /// Builds an attribute set from key/value pairs.
    ///
    /// # Panics
    ///
    /// If a key occurs twice.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut entries = BTreeMap::new();
        for (k, v) in pairs {
            let key = k.into();
            if entries.insert(key.clone(), v.into()).is_some() {
                panic!("duplicate attribute {key:?}");
            }
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Applies `update`, returning the new attribute set.
    ///
    /// Every old value in the update must match the current value.
    pub fn update_with(&self, update: &AttributesUpdate) -> Result<Attributes, OperationError> {
        let mut entries = self.entries.clone();
        for change in update.updates() {
            let actual = entries.get(&change.name);
            if actual.map(String::as_str) != change.old_value.as_deref() {
                return Err(OperationError::AttributeMismatch {
                    key: change.name.clone(),
                    expected: change.old_value.clone(),
                    actual: actual.cloned(),
                });
            }
            match &change.new_value {
                Some(v) => entries.insert(change.name.clone(), v.clone()),
                None => entries.remove(&change.name),
            };
        }
        Ok(Self { entries })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&concise::attributes_string(self))
    }
}

/// A sorted list of attribute transitions applied to one element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AttributesUpdate {
    updates: Vec<AttributeUpdate>,
}

impl AttributesUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// An update touching a single key.
    pub fn single(name: impl Into<String>, old_value: Option<&str>, new_value: Option<&str>) -> Self {
        Self {
            updates: vec![AttributeUpdate::new(name, old_value, new_value)],
        }
    }

    /// Builds an update from `(key, old, new)` triples in any order.
    ///
    /// # Panics
    ///
    /// If a key occurs twice.
    pub fn from_triples<'a, I>(triples: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>, Option<&'a str>)>,
    {
        let updates = triples
            .into_iter()
            .map(|(k, old, new)| AttributeUpdate::new(k, old, new))
            .collect();
        Self {
            updates: sorted_unique(updates),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeUpdate> {
        self.updates.iter()
    }
}

impl ImmutableUpdateMap for AttributesUpdate {
    fn updates(&self) -> &[AttributeUpdate] {
        &self.updates
    }

    fn from_sorted_updates(updates: Vec<AttributeUpdate>) -> Self {
        Self { updates }
    }
}

impl UpdateMap for AttributesUpdate {
    fn change_size(&self) -> usize {
        self.updates.len()
    }

    fn change_key(&self, i: usize) -> &str {
        &self.updates[i].name
    }

    fn old_value(&self, i: usize) -> Option<&str> {
        self.updates[i].old_value.as_deref()
    }

    fn new_value(&self, i: usize) -> Option<&str> {
        self.updates[i].new_value.as_deref()
    }
}

impl fmt::Display for AttributesUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&concise::attributes_update_string(self))
    }
}
