use super::{BufferedDocOp, DocOpComponent, DocOpCursor, EvaluatingDocOpCursor};
use crate::annotation_boundary::AnnotationBoundaryMap;
use crate::attributes::{Attributes, AttributesUpdate};
use crate::validation::check_well_formed;

/// The buffering cursor.
///
/// Used either as a chained builder (`DocOpBuilder::new().retain(3).build()`)
/// or as a [`DocOpCursor`] that records whatever is replayed into it.
#[derive(Debug, Clone, Default)]
pub struct DocOpBuilder {
    components: Vec<DocOpComponent>,
}

impl DocOpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, component: DocOpComponent) {
        self.components.push(component);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[must_use]
    pub fn retain(mut self, item_count: usize) -> Self {
        self.push(DocOpComponent::Retain(item_count));
        self
    }

    #[must_use]
    pub fn characters(mut self, chars: impl Into<String>) -> Self {
        self.push(DocOpComponent::Characters(chars.into()));
        self
    }

    #[must_use]
    pub fn delete_characters(mut self, chars: impl Into<String>) -> Self {
        self.push(DocOpComponent::DeleteCharacters(chars.into()));
        self
    }

    #[must_use]
    pub fn element_start(mut self, tag: impl Into<String>, attributes: Attributes) -> Self {
        self.push(DocOpComponent::ElementStart {
            tag: tag.into(),
            attributes,
        });
        self
    }

    #[must_use]
    pub fn element_end(mut self) -> Self {
        self.push(DocOpComponent::ElementEnd);
        self
    }

    #[must_use]
    pub fn delete_element_start(mut self, tag: impl Into<String>, attributes: Attributes) -> Self {
        self.push(DocOpComponent::DeleteElementStart {
            tag: tag.into(),
            attributes,
        });
        self
    }

    #[must_use]
    pub fn delete_element_end(mut self) -> Self {
        self.push(DocOpComponent::DeleteElementEnd);
        self
    }

    #[must_use]
    pub fn replace_attributes(mut self, old: Attributes, new: Attributes) -> Self {
        self.push(DocOpComponent::ReplaceAttributes { old, new });
        self
    }

    #[must_use]
    pub fn update_attributes(mut self, update: AttributesUpdate) -> Self {
        self.push(DocOpComponent::UpdateAttributes(update));
        self
    }

    #[must_use]
    pub fn annotation_boundary(mut self, map: AnnotationBoundaryMap) -> Self {
        self.push(DocOpComponent::AnnotationBoundary(map));
        self
    }

    /// Finishes the operation, asserting that it is well-formed.
    ///
    /// # Panics
    ///
    /// If [`check_well_formed`] rejects the recorded components.
    pub fn build(self) -> BufferedDocOp {
        let op = BufferedDocOp::new(self.components);
        if let Err(err) = check_well_formed(&op) {
            panic!("ill-formed operation {op}: {err}");
        }
        op
    }

    /// Finishes the operation without checking it.
    pub fn build_unchecked(self) -> BufferedDocOp {
        BufferedDocOp::new(self.components)
    }
}

impl DocOpCursor for DocOpBuilder {
    fn retain(&mut self, item_count: usize) {
        self.push(DocOpComponent::Retain(item_count));
    }

    fn characters(&mut self, chars: &str) {
        self.push(DocOpComponent::Characters(chars.to_owned()));
    }

    fn delete_characters(&mut self, chars: &str) {
        self.push(DocOpComponent::DeleteCharacters(chars.to_owned()));
    }

    fn element_start(&mut self, tag: &str, attributes: &Attributes) {
        self.push(DocOpComponent::ElementStart {
            tag: tag.to_owned(),
            attributes: attributes.clone(),
        });
    }

    fn element_end(&mut self) {
        self.push(DocOpComponent::ElementEnd);
    }

    fn delete_element_start(&mut self, tag: &str, attributes: &Attributes) {
        self.push(DocOpComponent::DeleteElementStart {
            tag: tag.to_owned(),
            attributes: attributes.clone(),
        });
    }

    fn delete_element_end(&mut self) {
        self.push(DocOpComponent::DeleteElementEnd);
    }

    fn replace_attributes(&mut self, old: &Attributes, new: &Attributes) {
        self.push(DocOpComponent::ReplaceAttributes {
            old: old.clone(),
            new: new.clone(),
        });
    }

    fn update_attributes(&mut self, update: &AttributesUpdate) {
        self.push(DocOpComponent::UpdateAttributes(update.clone()));
    }

    fn annotation_boundary(&mut self, map: &AnnotationBoundaryMap) {
        self.push(DocOpComponent::AnnotationBoundary(map.clone()));
    }
}

impl EvaluatingDocOpCursor<BufferedDocOp> for DocOpBuilder {
    fn finish(self) -> BufferedDocOp {
        self.build_unchecked()
    }
}
