//! Operations over annotated, XML-like documents.
//!
//! A document is a flat sequence of *items* (characters, element starts and
//! element ends) with key/value annotations layered over ranges of items. A
//! [`DocOp`] is a cursor-driven sequence of [`DocOpComponent`]s that walks a
//! document from left to right, retaining, inserting and deleting items and
//! marking annotation boundaries inline.
//!
//! This crate holds the value model and the algorithms that do not need a
//! concrete document:
//!
//! - [`Attributes`], [`AttributesUpdate`] and [`AnnotationBoundaryMap`], and
//!   the sorted merge that chains update maps ([`ImmutableUpdateMap`]).
//! - Buffering ([`buffer`]), initialization views ([`as_initialization`]),
//!   well-formedness checking and document length calculation.
//! - Normalization ([`normalize`]) and the two canonical renderings
//!   ([`to_concise_string`], [`to_xml_string`]).
//!
//! # Example
//!
//! ```
//! use wave_docop::{Attributes, DocOpBuilder, to_xml_string};
//!
//! let init = DocOpBuilder::new()
//!     .element_start("p", Attributes::EMPTY)
//!     .characters("a < b")
//!     .element_end()
//!     .build()
//!     .into_initialization();
//!
//! assert_eq!(to_xml_string(&init).unwrap(), "<p>a &lt; b</p>");
//! ```

pub mod algorithm;
pub mod annotation_boundary;
pub mod attributes;
pub mod error;
pub mod explode;
pub mod length;
pub mod op;
pub mod render;
pub mod update_map;
pub mod validation;

pub use algorithm::{normalize, normalize_initialization};
pub use annotation_boundary::{AnnotationBoundaryMap, AnnotationBoundaryMapBuilder};
pub use attributes::{Attributes, AttributesUpdate};
pub use error::{MergeError, OperationError, RenderError, WellFormednessError};
pub use explode::explode;
pub use length::{initial_document_length, resulting_document_length};
pub use op::{
    as_initialization, buffer, BufferedDocOp, DocInitialization, DocOp, DocOpBuilder,
    DocOpComponent, DocOpComponentType, DocOpCursor, EvaluatingDocOpCursor, LazyDocOp,
};
pub use render::{
    annotation_escape, build_xml_string, debug_to_xml_string, to_concise_string, to_xml_string,
    visualise_op_with_document, xml_attr_escape, xml_text_escape, PI_TARGET,
};
pub use update_map::{AttributeUpdate, ImmutableUpdateMap, UpdateMap};
pub use validation::check_well_formed;
