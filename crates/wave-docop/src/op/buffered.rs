use std::fmt;
use std::ops::Deref;

use super::{DocOp, DocOpComponent, DocOpComponentType, DocOpCursor};
use crate::annotation_boundary::AnnotationBoundaryMap;
use crate::attributes::Attributes;
use crate::render::concise;

/// An operation materialized as a component array with random access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BufferedDocOp {
    components: Vec<DocOpComponent>,
}

impl BufferedDocOp {
    pub fn new(components: Vec<DocOpComponent>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[DocOpComponent] {
        &self.components
    }

    pub fn into_components(self) -> Vec<DocOpComponent> {
        self.components
    }

    pub fn size(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn component(&self, i: usize) -> &DocOpComponent {
        &self.components[i]
    }

    pub fn get_type(&self, i: usize) -> DocOpComponentType {
        self.components[i].component_type()
    }

    /// # Panics
    ///
    /// If component `i` is not a character insertion.
    pub fn characters_string(&self, i: usize) -> &str {
        match &self.components[i] {
            DocOpComponent::Characters(s) => s,
            other => panic!("component {i} is {}, not characters", other.component_type()),
        }
    }

    /// # Panics
    ///
    /// If component `i` is not an element start.
    pub fn element_start_tag(&self, i: usize) -> &str {
        match &self.components[i] {
            DocOpComponent::ElementStart { tag, .. } => tag,
            other => panic!("component {i} is {}, not elementStart", other.component_type()),
        }
    }

    /// # Panics
    ///
    /// If component `i` is not an element start.
    pub fn element_start_attributes(&self, i: usize) -> &Attributes {
        match &self.components[i] {
            DocOpComponent::ElementStart { attributes, .. } => attributes,
            other => panic!("component {i} is {}, not elementStart", other.component_type()),
        }
    }

    /// # Panics
    ///
    /// If component `i` is not an annotation boundary.
    pub fn annotation_boundary(&self, i: usize) -> &AnnotationBoundaryMap {
        match &self.components[i] {
            DocOpComponent::AnnotationBoundary(map) => map,
            other => panic!("component {i} is {}, not annotationBoundary", other.component_type()),
        }
    }

    /// Replays component `i` alone.
    pub fn apply_component(&self, i: usize, cursor: &mut dyn DocOpCursor) {
        self.components[i].apply_to(cursor)
    }

    /// Whether every component is allowed in an initialization.
    pub fn is_initialization(&self) -> bool {
        self.components
            .iter()
            .all(|c| c.component_type().is_initialization())
    }

    /// # Panics
    ///
    /// If a component is not allowed in an initialization; see
    /// [`is_initialization`](Self::is_initialization).
    pub fn into_initialization(self) -> DocInitialization {
        if let Some((i, c)) = self
            .components
            .iter()
            .enumerate()
            .find(|(_, c)| !c.component_type().is_initialization())
        {
            panic!(
                "not an initialization: component {i} is {}: {}",
                c.component_type(),
                self
            );
        }
        DocInitialization(self)
    }
}

impl DocOp for BufferedDocOp {
    fn apply(&self, cursor: &mut dyn DocOpCursor) {
        for component in &self.components {
            component.apply_to(cursor);
        }
    }

    fn as_buffered(&self) -> Option<&BufferedDocOp> {
        Some(self)
    }
}

impl FromIterator<DocOpComponent> for BufferedDocOp {
    fn from_iter<I: IntoIterator<Item = DocOpComponent>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for BufferedDocOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&concise::to_concise_string(self))
    }
}

/// An operation that only builds content, usable as a document snapshot.
///
/// Derefs to the underlying [`BufferedDocOp`] for random access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DocInitialization(BufferedDocOp);

impl DocInitialization {
    pub fn as_op(&self) -> &BufferedDocOp {
        &self.0
    }

    pub fn into_op(self) -> BufferedDocOp {
        self.0
    }
}

impl Deref for DocInitialization {
    type Target = BufferedDocOp;

    fn deref(&self) -> &BufferedDocOp {
        &self.0
    }
}

impl DocOp for DocInitialization {
    fn apply(&self, cursor: &mut dyn DocOpCursor) {
        self.0.apply(cursor)
    }

    fn as_buffered(&self) -> Option<&BufferedDocOp> {
        Some(&self.0)
    }
}

impl fmt::Display for DocInitialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
