//! One-line trace of an operation.
//!
//! Each component renders as a short token followed by `"; "`:
//!
//! | component            | form                      |
//! |----------------------|---------------------------|
//! | retain               | `__3; `                   |
//! | characters           | `++"abc"; `               |
//! | delete characters    | `--"abc"; `               |
//! | element start        | `<< p { a="1" }; `        |
//! | element end          | `>>; `                    |
//! | delete element start | `x< p {}; `               |
//! | delete element end   | `x>; `                    |
//! | replace attributes   | `r@ {} { a="1" }; `       |
//! | update attributes    | `u@ { a: null -> "1" }; ` |
//! | annotation boundary  | `\|\| { "k": null -> "v" }; ` |

use crate::annotation_boundary::AnnotationBoundaryMap;
use crate::attributes::{Attributes, AttributesUpdate};
use crate::op::{DocOp, DocOpCursor, EvaluatingDocOpCursor};
use crate::update_map::UpdateMap;

pub fn to_concise_string<O: DocOp + ?Sized>(op: &O) -> String {
    let mut builder = ConciseStringBuilder::default();
    op.apply(&mut builder);
    builder.finish()
}

/// `{ k="v", k2="v2" }`, or `{}` when empty.
pub fn attributes_string(attributes: &Attributes) -> String {
    if attributes.is_empty() {
        return "{}".to_owned();
    }
    let entries: Vec<String> = attributes
        .iter()
        .map(|(key, value)| format!("{key}={}", literal_string(Some(value))))
        .collect();
    format!("{{ {} }}", entries.join(", "))
}

/// `{ k: "old" -> null }`, or `{}` when empty.
pub fn attributes_update_string(update: &AttributesUpdate) -> String {
    if update.change_size() == 0 {
        return "{}".to_owned();
    }
    let entries: Vec<String> = (0..update.change_size())
        .map(|i| {
            format!(
                "{}: {} -> {}",
                update.change_key(i),
                literal_string(update.old_value(i)),
                literal_string(update.new_value(i))
            )
        })
        .collect();
    format!("{{ {} }}", entries.join(", "))
}

/// `{ "ended", "k": "old" -> "new" }`, or `{}` when empty. Keys are quoted
/// here, unlike attribute keys.
pub fn annotation_boundary_string(map: &AnnotationBoundaryMap) -> String {
    let mut entries: Vec<String> = map
        .ends()
        .iter()
        .map(|key| literal_string(Some(key.as_str())))
        .collect();
    entries.extend(map.changes().iter().map(|change| {
        format!(
            "{}: {} -> {}",
            literal_string(Some(change.name.as_str())),
            literal_string(change.old_value.as_deref()),
            literal_string(change.new_value.as_deref())
        )
    }));
    if entries.is_empty() {
        return "{}".to_owned();
    }
    format!("{{ {} }}", entries.join(", "))
}

/// Double-quoted with `\` and `"` backslash-escaped; absent values are `null`.
fn literal_string(value: Option<&str>) -> String {
    match value {
        None => "null".to_owned(),
        Some(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
    }
}

/// Cursor appending the concise form of each component it sees.
#[derive(Debug, Default)]
pub struct ConciseStringBuilder {
    out: String,
}

impl ConciseStringBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text written so far.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub(crate) fn pad_to(&mut self, width: usize) {
        let len = self.out.chars().count();
        self.out.extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    }
}

impl DocOpCursor for ConciseStringBuilder {
    fn retain(&mut self, item_count: usize) {
        self.out.push_str(&format!("__{item_count}; "));
    }

    fn characters(&mut self, chars: &str) {
        self.out.push_str(&format!("++{}; ", literal_string(Some(chars))));
    }

    fn delete_characters(&mut self, chars: &str) {
        self.out.push_str(&format!("--{}; ", literal_string(Some(chars))));
    }

    fn element_start(&mut self, tag: &str, attributes: &Attributes) {
        self.out.push_str(&format!("<< {tag} {}; ", attributes_string(attributes)));
    }

    fn element_end(&mut self) {
        self.out.push_str(">>; ");
    }

    fn delete_element_start(&mut self, tag: &str, attributes: &Attributes) {
        self.out.push_str(&format!("x< {tag} {}; ", attributes_string(attributes)));
    }

    fn delete_element_end(&mut self) {
        self.out.push_str("x>; ");
    }

    fn replace_attributes(&mut self, old: &Attributes, new: &Attributes) {
        self.out.push_str(&format!(
            "r@ {} {}; ",
            attributes_string(old),
            attributes_string(new)
        ));
    }

    fn update_attributes(&mut self, update: &AttributesUpdate) {
        self.out.push_str(&format!("u@ {}; ", attributes_update_string(update)));
    }

    fn annotation_boundary(&mut self, map: &AnnotationBoundaryMap) {
        self.out.push_str(&format!("|| {}; ", annotation_boundary_string(map)));
    }
}

impl EvaluatingDocOpCursor<String> for ConciseStringBuilder {
    fn finish(self) -> String {
        self.out
    }
}
