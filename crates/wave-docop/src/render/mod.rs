//! Canonical string forms of operations and documents.
//!
//! - [`concise`]: a compact, one-line trace of an operation's components.
//! - [`xml`]: the minimal XML form of a document initialization, with
//!   annotation changes written as `<?a ...?>` processing instructions.
//!   Equal documents render to equal strings.
//! - [`visualise`]: a document and an operation laid out in aligned columns.

pub mod concise;
pub mod visualise;
pub mod xml;

pub use concise::to_concise_string;
pub use visualise::visualise_op_with_document;
pub use xml::{build_xml_string, debug_to_xml_string, to_xml_string};

/// Target of the processing instruction carrying annotation changes.
pub const PI_TARGET: &str = "a";

// ── Escapes ────────────────────────────────────────────────────────────────

/// Escapes `&`, `<` and `>` for XML text content.
pub fn xml_text_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes double quotes only; attribute values are always double-quoted.
pub fn xml_attr_escape(value: &str) -> String {
    value.replace('"', "&quot;")
}

/// Escapes annotation keys and values inside the processing instruction.
///
/// `?` becomes `\q` so a value can never close the instruction early.
pub fn annotation_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '?' => out.push_str("\\q"),
            _ => out.push(ch),
        }
    }
    out
}
