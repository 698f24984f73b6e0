//! Documents and wavelets that consume [`wave_docop`] operations.
//!
//! - [`annotations`]: the annotation store contract, with a store that
//!   records nothing ([`StubAnnotations`]) and one that does
//!   ([`AnnotationStore`]).
//! - [`IndexedDocument`]: an in-memory document that applies operations
//!   atomically and renders itself back as an initialization.
//! - [`DocumentMutation`]: operations written without old values, resolved
//!   against a document.
//! - [`AnnotationBuilder`]: the smallest mutation that sets an annotation
//!   over a range.
//! - [`WaveletData`] and [`WaveletOperation`]: participants plus documents.

pub mod annotation_builder;
pub mod annotations;
pub mod document;
pub mod mutation;
pub mod wavelet;

pub use annotation_builder::AnnotationBuilder;
pub use annotations::{
    AnnotationInterval, AnnotationStore, MutationState, RangedAnnotation, RawAnnotationSet,
    ReadableAnnotationSet, StubAnnotations,
};
pub use document::{IndexedDocument, Item};
pub use mutation::{DocumentMutation, DocumentMutationBuilder, MutationComponent};
pub use wavelet::{FailurePolicy, ParticipantId, WaveletData, WaveletOperation};
