//! Canonical forms of operations.
//!
//! Two operations with the same effect may be written differently: split
//! retains, several boundaries in a row, boundaries that restate what is
//! already in effect. [`normalize`] removes those differences so normalized
//! operations can be compared with `==` or by their rendered string.

mod annotations_normalizer;
mod range_normalizer;

pub use annotations_normalizer::AnnotationsNormalizer;
pub use range_normalizer::RangeNormalizer;

use crate::op::{BufferedDocOp, DocInitialization, DocOp, DocOpBuilder, EvaluatingDocOpCursor};

/// Rewrites `op` into its canonical form.
///
/// Annotation boundaries are normalized first, then adjacent ranges are
/// coalesced. The result has the same effect on every document and
/// normalizing it again is a no-op.
pub fn normalize<O: DocOp + ?Sized>(op: &O) -> BufferedDocOp {
    let mut normalizer = AnnotationsNormalizer::new(RangeNormalizer::new(DocOpBuilder::new()));
    op.apply(&mut normalizer);
    normalizer.finish()
}

pub fn normalize_initialization(init: &DocInitialization) -> DocInitialization {
    normalize(init).into_initialization()
}
