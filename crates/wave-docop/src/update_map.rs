//! Sorted key/old/new update maps and their merge algebra.
//!
//! Both attribute updates and the change half of an annotation boundary are
//! lists of [`AttributeUpdate`] triples sorted by key. Chaining two such lists
//! is a lock-step sorted merge ([`compose_updates`]), linear in the size of
//! the inputs and producing a sorted result.

use std::cmp::Ordering;
use std::fmt;

use crate::error::MergeError;

/// One `key: old -> new` transition. `None` means "absent".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeUpdate {
    pub name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl AttributeUpdate {
    pub fn new(name: impl Into<String>, old_value: Option<&str>, new_value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            old_value: old_value.map(str::to_owned),
            new_value: new_value.map(str::to_owned),
        }
    }
}

impl fmt::Display for AttributeUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}: {} -> {}]",
            self.name,
            self.old_value.as_deref().unwrap_or("null"),
            self.new_value.as_deref().unwrap_or("null")
        )
    }
}

/// Indexed read access to a sorted list of key transitions.
pub trait UpdateMap {
    fn change_size(&self) -> usize;
    fn change_key(&self, i: usize) -> &str;
    fn old_value(&self, i: usize) -> Option<&str>;
    fn new_value(&self, i: usize) -> Option<&str>;
}

/// An immutable update map that can be filtered and chained.
pub trait ImmutableUpdateMap: Sized {
    /// The underlying updates, sorted by key with unique keys.
    fn updates(&self) -> &[AttributeUpdate];

    /// Wraps an already sorted, unique-key list.
    fn from_sorted_updates(updates: Vec<AttributeUpdate>) -> Self;

    /// Drops every update whose key is in `names`, preserving order.
    fn exclude<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let kept = self
            .updates()
            .iter()
            .filter(|u| !names.iter().any(|n| n.as_ref() == u.name))
            .cloned()
            .collect();
        Self::from_sorted_updates(kept)
    }

    /// The update equivalent to applying `self` and then `later`.
    fn compose_with(&self, later: &Self) -> Result<Self, MergeError> {
        compose_updates(self.updates(), later.updates()).map(Self::from_sorted_updates)
    }
}

/// Merges two sorted update lists into the list equivalent to applying
/// `earlier` then `later`.
///
/// A key present in both must chain: the earlier new value has to equal the
/// later old value (absent equals absent).
pub fn compose_updates(
    earlier: &[AttributeUpdate],
    later: &[AttributeUpdate],
) -> Result<Vec<AttributeUpdate>, MergeError> {
    let mut out = Vec::with_capacity(earlier.len() + later.len());
    let mut earlier = earlier.iter().peekable();
    'later: for update in later {
        while let Some(prev) = earlier.peek() {
            match update.name.cmp(&prev.name) {
                Ordering::Less => break,
                Ordering::Greater => {
                    out.push((*prev).clone());
                    earlier.next();
                }
                Ordering::Equal => {
                    if prev.new_value != update.old_value {
                        return Err(MergeError::MismatchedOldValue {
                            key: update.name.clone(),
                            earlier_new: prev.new_value.clone(),
                            later_old: update.old_value.clone(),
                        });
                    }
                    out.push(AttributeUpdate {
                        name: update.name.clone(),
                        old_value: prev.old_value.clone(),
                        new_value: update.new_value.clone(),
                    });
                    earlier.next();
                    continue 'later;
                }
            }
        }
        out.push(update.clone());
    }
    out.extend(earlier.cloned());
    Ok(out)
}

/// Sorts `updates` by key.
///
/// # Panics
///
/// If two updates share a key.
pub(crate) fn sorted_unique(mut updates: Vec<AttributeUpdate>) -> Vec<AttributeUpdate> {
    updates.sort_by(|a, b| a.name.cmp(&b.name));
    if let Some(pair) = updates.windows(2).find(|w| w[0].name == w[1].name) {
        panic!("duplicate key {:?} in update map", pair[0].name);
    }
    updates
}
