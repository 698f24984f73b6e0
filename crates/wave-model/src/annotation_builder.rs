//! Minimal annotation mutations.

use crate::annotations::ReadableAnnotationSet;
use crate::mutation::{DocumentMutation, DocumentMutationBuilder, MutationComponent};

/// Builds the smallest mutation that sets one annotation key over a range.
///
/// The range is walked left to right with [`set_up_to`](Self::set_up_to).
/// Stretches that already hold the requested value are skipped; each maximal
/// stretch that does not is wrapped in one start/end bracket.
///
/// ```
/// use wave_docop::{Attributes, DocOpBuilder};
/// use wave_model::{AnnotationBuilder, IndexedDocument};
///
/// let init = DocOpBuilder::new()
///     .element_start("p", Attributes::EMPTY)
///     .characters("abcd")
///     .element_end()
///     .build()
///     .into_initialization();
/// let doc: IndexedDocument = IndexedDocument::from_initialization(&init).unwrap();
///
/// let mut builder = AnnotationBuilder::new(&doc, 1, 5, "style");
/// builder.set_up_to(Some("bold"), 5);
/// assert!(builder.is_dirty());
/// assert_eq!(builder.build().components().len(), 4);
/// ```
pub struct AnnotationBuilder<'a, D: ReadableAnnotationSet<String> + ?Sized> {
    doc: &'a D,
    key: String,
    out: DocumentMutationBuilder,
    /// Items to skip before the next bracket.
    skip: usize,
    /// Bracket still open for extension: its value and length.
    pending: Option<(Option<String>, usize)>,
    current_pos: usize,
    range_end: usize,
    dirty: bool,
}

impl<'a, D: ReadableAnnotationSet<String> + ?Sized> AnnotationBuilder<'a, D> {
    pub fn new(doc: &'a D, range_start: usize, range_end: usize, key: impl Into<String>) -> Self {
        assert!(
            range_start <= range_end,
            "annotation range {range_start}..{range_end} is reversed"
        );
        Self {
            doc,
            key: key.into(),
            out: DocumentMutationBuilder::new(),
            skip: range_start,
            pending: None,
            current_pos: range_start,
            range_end,
            dirty: false,
        }
    }

    /// Sets the annotation to `value` from the current position up to `end`.
    ///
    /// # Panics
    ///
    /// If `end` is before the current position or past the end of the range.
    pub fn set_up_to(&mut self, value: Option<&str>, end: usize) {
        assert!(
            self.current_pos <= end && end <= self.range_end,
            "set_up_to({end}) outside {}..={}",
            self.current_pos,
            self.range_end
        );
        while self.current_pos < end {
            let current = self.doc.get_annotation(self.current_pos, &self.key);
            let next = self
                .doc
                .first_annotation_change(self.current_pos, end, &self.key, current)
                .unwrap_or(end);
            let size = next - self.current_pos;
            if current.map(String::as_str) == value {
                self.flush();
                self.skip += size;
            } else {
                self.extend(value, size);
            }
            self.current_pos = next;
        }
    }

    fn extend(&mut self, value: Option<&str>, size: usize) {
        if let Some((pending_value, len)) = &mut self.pending {
            if pending_value.as_deref() == value {
                *len += size;
                return;
            }
            self.flush();
        }
        self.pending = Some((value.map(str::to_owned), size));
        self.dirty = true;
    }

    fn flush(&mut self) {
        let Some((value, len)) = self.pending.take() else {
            return;
        };
        self.out.push_skip(self.skip);
        self.skip = 0;
        self.out.push(MutationComponent::StartAnnotation {
            key: self.key.clone(),
            value,
        });
        self.out.push_skip(len);
        self.out.push(MutationComponent::EndAnnotation(self.key.clone()));
    }

    pub fn current_pos(&self) -> usize {
        self.current_pos
    }

    /// Whether anything needs changing so far.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Takes the mutation built so far and starts a new one at the current
    /// position. Trailing skips are left out.
    pub fn build(&mut self) -> DocumentMutation {
        self.flush();
        self.dirty = false;
        self.skip = self.current_pos;
        self.out.take()
    }
}
