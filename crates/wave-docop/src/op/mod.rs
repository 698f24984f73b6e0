//! Operation representation and the cursor protocol.
//!
//! # Components
//!
//! An operation is a sequence of [`DocOpComponent`]s walking a document from
//! left to right:
//!
//! - `Retain(n)`: keep `n` items unchanged
//! - `Characters(s)` / `DeleteCharacters(s)`: insert / delete a text run
//! - `ElementStart` / `ElementEnd`: insert an element boundary
//! - `DeleteElementStart` / `DeleteElementEnd`: delete an element boundary
//! - `ReplaceAttributes` / `UpdateAttributes`: change an element start's attributes
//! - `AnnotationBoundary`: annotation ends and changes from this point on
//!
//! Consumers either match on the components of a [`BufferedDocOp`] or
//! implement [`DocOpCursor`] and let [`DocOp::apply`] drive them.

mod buffered;
mod builder;

use std::borrow::Cow;
use std::fmt;

use crate::annotation_boundary::AnnotationBoundaryMap;
use crate::attributes::{Attributes, AttributesUpdate};

pub use buffered::{BufferedDocOp, DocInitialization};
pub use builder::DocOpBuilder;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocOpComponent {
    Retain(usize),
    Characters(String),
    DeleteCharacters(String),
    ElementStart { tag: String, attributes: Attributes },
    ElementEnd,
    DeleteElementStart { tag: String, attributes: Attributes },
    DeleteElementEnd,
    ReplaceAttributes { old: Attributes, new: Attributes },
    UpdateAttributes(AttributesUpdate),
    AnnotationBoundary(AnnotationBoundaryMap),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocOpComponentType {
    Retain,
    Characters,
    DeleteCharacters,
    ElementStart,
    ElementEnd,
    DeleteElementStart,
    DeleteElementEnd,
    ReplaceAttributes,
    UpdateAttributes,
    AnnotationBoundary,
}

impl DocOpComponentType {
    /// Whether the component may appear in a [`DocInitialization`].
    pub fn is_initialization(self) -> bool {
        matches!(
            self,
            DocOpComponentType::Retain
                | DocOpComponentType::Characters
                | DocOpComponentType::ElementStart
                | DocOpComponentType::ElementEnd
                | DocOpComponentType::AnnotationBoundary
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            DocOpComponentType::Retain => "retain",
            DocOpComponentType::Characters => "characters",
            DocOpComponentType::DeleteCharacters => "deleteCharacters",
            DocOpComponentType::ElementStart => "elementStart",
            DocOpComponentType::ElementEnd => "elementEnd",
            DocOpComponentType::DeleteElementStart => "deleteElementStart",
            DocOpComponentType::DeleteElementEnd => "deleteElementEnd",
            DocOpComponentType::ReplaceAttributes => "replaceAttributes",
            DocOpComponentType::UpdateAttributes => "updateAttributes",
            DocOpComponentType::AnnotationBoundary => "annotationBoundary",
        }
    }
}

impl fmt::Display for DocOpComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DocOpComponent {
    pub fn component_type(&self) -> DocOpComponentType {
        match self {
            DocOpComponent::Retain(_) => DocOpComponentType::Retain,
            DocOpComponent::Characters(_) => DocOpComponentType::Characters,
            DocOpComponent::DeleteCharacters(_) => DocOpComponentType::DeleteCharacters,
            DocOpComponent::ElementStart { .. } => DocOpComponentType::ElementStart,
            DocOpComponent::ElementEnd => DocOpComponentType::ElementEnd,
            DocOpComponent::DeleteElementStart { .. } => DocOpComponentType::DeleteElementStart,
            DocOpComponent::DeleteElementEnd => DocOpComponentType::DeleteElementEnd,
            DocOpComponent::ReplaceAttributes { .. } => DocOpComponentType::ReplaceAttributes,
            DocOpComponent::UpdateAttributes(_) => DocOpComponentType::UpdateAttributes,
            DocOpComponent::AnnotationBoundary(_) => DocOpComponentType::AnnotationBoundary,
        }
    }

    /// Number of items this component consumes from the document it is applied to.
    pub fn initial_length(&self) -> usize {
        match self {
            DocOpComponent::Retain(n) => *n,
            DocOpComponent::DeleteCharacters(s) => s.chars().count(),
            DocOpComponent::DeleteElementStart { .. }
            | DocOpComponent::DeleteElementEnd
            | DocOpComponent::ReplaceAttributes { .. }
            | DocOpComponent::UpdateAttributes(_) => 1,
            DocOpComponent::Characters(_)
            | DocOpComponent::ElementStart { .. }
            | DocOpComponent::ElementEnd
            | DocOpComponent::AnnotationBoundary(_) => 0,
        }
    }

    /// Number of items this component produces in the resulting document.
    pub fn resulting_length(&self) -> usize {
        match self {
            DocOpComponent::Retain(n) => *n,
            DocOpComponent::Characters(s) => s.chars().count(),
            DocOpComponent::ElementStart { .. }
            | DocOpComponent::ElementEnd
            | DocOpComponent::ReplaceAttributes { .. }
            | DocOpComponent::UpdateAttributes(_) => 1,
            DocOpComponent::DeleteCharacters(_)
            | DocOpComponent::DeleteElementStart { .. }
            | DocOpComponent::DeleteElementEnd
            | DocOpComponent::AnnotationBoundary(_) => 0,
        }
    }

    /// Replays this component as one cursor call.
    pub fn apply_to<C: DocOpCursor + ?Sized>(&self, cursor: &mut C) {
        match self {
            DocOpComponent::Retain(n) => cursor.retain(*n),
            DocOpComponent::Characters(s) => cursor.characters(s),
            DocOpComponent::DeleteCharacters(s) => cursor.delete_characters(s),
            DocOpComponent::ElementStart { tag, attributes } => cursor.element_start(tag, attributes),
            DocOpComponent::ElementEnd => cursor.element_end(),
            DocOpComponent::DeleteElementStart { tag, attributes } => {
                cursor.delete_element_start(tag, attributes)
            }
            DocOpComponent::DeleteElementEnd => cursor.delete_element_end(),
            DocOpComponent::ReplaceAttributes { old, new } => cursor.replace_attributes(old, new),
            DocOpComponent::UpdateAttributes(update) => cursor.update_attributes(update),
            DocOpComponent::AnnotationBoundary(map) => cursor.annotation_boundary(map),
        }
    }
}

/// Visitor over operation components, one method per component kind.
pub trait DocOpCursor {
    fn retain(&mut self, item_count: usize);
    fn characters(&mut self, chars: &str);
    fn delete_characters(&mut self, chars: &str);
    fn element_start(&mut self, tag: &str, attributes: &Attributes);
    fn element_end(&mut self);
    fn delete_element_start(&mut self, tag: &str, attributes: &Attributes);
    fn delete_element_end(&mut self);
    fn replace_attributes(&mut self, old: &Attributes, new: &Attributes);
    fn update_attributes(&mut self, update: &AttributesUpdate);
    fn annotation_boundary(&mut self, map: &AnnotationBoundaryMap);
}

/// A cursor that produces a value once the operation has been replayed.
pub trait EvaluatingDocOpCursor<T>: DocOpCursor {
    fn finish(self) -> T;
}

/// A replayable operation.
pub trait DocOp {
    /// Replays every component, in order, on `cursor`.
    fn apply(&self, cursor: &mut dyn DocOpCursor);

    /// The eager form of this operation, if it already is one.
    fn as_buffered(&self) -> Option<&BufferedDocOp> {
        None
    }
}

impl<T: DocOp + ?Sized> DocOp for &T {
    fn apply(&self, cursor: &mut dyn DocOpCursor) {
        (**self).apply(cursor)
    }

    fn as_buffered(&self) -> Option<&BufferedDocOp> {
        (**self).as_buffered()
    }
}

/// An operation computed on every replay by a closure.
pub struct LazyDocOp<F> {
    replay: F,
}

impl<F> LazyDocOp<F>
where
    F: Fn(&mut dyn DocOpCursor),
{
    pub fn new(replay: F) -> Self {
        Self { replay }
    }
}

impl<F> DocOp for LazyDocOp<F>
where
    F: Fn(&mut dyn DocOpCursor),
{
    fn apply(&self, cursor: &mut dyn DocOpCursor) {
        (self.replay)(cursor)
    }
}

impl<F> fmt::Debug for LazyDocOp<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyDocOp").finish_non_exhaustive()
    }
}

/// Materializes `op` into its eager form.
///
/// Replays the operation once through a [`DocOpBuilder`]. An operation that is
/// already buffered is returned as-is, without copying.
pub fn buffer<O: DocOp + ?Sized>(op: &O) -> Cow<'_, BufferedDocOp> {
    match op.as_buffered() {
        Some(buffered) => Cow::Borrowed(buffered),
        None => {
            let mut builder = DocOpBuilder::new();
            op.apply(&mut builder);
            Cow::Owned(builder.build_unchecked())
        }
    }
}

/// Views `op` as a document initialization.
///
/// # Panics
///
/// If `op` contains a component outside the initialization-safe set
/// (deletions, attribute replacement or update). Callers must only convert
/// operations that build content.
pub fn as_initialization<O: DocOp + ?Sized>(op: &O) -> DocInitialization {
    buffer(op).into_owned().into_initialization()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BufferedDocOp {
        DocOpBuilder::new()
            .retain(2)
            .delete_characters("ab")
            .characters("xyz")
            .update_attributes(AttributesUpdate::single("a", None, Some("1")))
            .element_start("p", Attributes::EMPTY)
            .element_end()
            .build()
    }

    #[test]
    fn buffering_a_buffered_op_borrows() {
        let op = sample();
        let buffered = buffer(&op);
        assert!(matches!(buffered, Cow::Borrowed(_)));
        assert_eq!(*buffered, op);
    }

    #[test]
    fn buffering_a_lazy_op_replays_once() {
        let source = sample();
        let lazy = LazyDocOp::new(|c: &mut dyn DocOpCursor| source.apply(c));
        let buffered = buffer(&lazy);
        assert!(matches!(buffered, Cow::Owned(_)));
        assert_eq!(*buffered, source);
    }

    #[test]
    fn component_lengths() {
        let op = sample();
        let initial: usize = op.components().iter().map(DocOpComponent::initial_length).sum();
        let resulting: usize = op.components().iter().map(DocOpComponent::resulting_length).sum();
        assert_eq!(initial, 2 + 2 + 1);
        assert_eq!(resulting, 2 + 3 + 1 + 2);
    }

    #[test]
    fn initialization_set() {
        assert!(DocOpComponentType::Characters.is_initialization());
        assert!(DocOpComponentType::Retain.is_initialization());
        assert!(!DocOpComponentType::DeleteCharacters.is_initialization());
        assert!(!DocOpComponentType::UpdateAttributes.is_initialization());
    }

    #[test]
    #[should_panic(expected = "not an initialization")]
    fn as_initialization_rejects_deletions() {
        as_initialization(&sample());
    }
}
