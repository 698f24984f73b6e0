use crate::op::{BufferedDocOp, DocOp, DocOpComponent};

/// Splits every inserted or deleted character run into one component per
/// character, so each item-bearing component covers exactly one item.
pub fn explode<O: DocOp + ?Sized>(op: &O) -> BufferedDocOp {
    let mut components = Vec::new();
    for component in crate::op::buffer(op).components() {
        match component {
            DocOpComponent::Characters(s) => components.extend(
                s.chars()
                    .map(|ch| DocOpComponent::Characters(ch.to_string())),
            ),
            DocOpComponent::DeleteCharacters(s) => components.extend(
                s.chars()
                    .map(|ch| DocOpComponent::DeleteCharacters(ch.to_string())),
            ),
            other => components.push(other.clone()),
        }
    }
    BufferedDocOp::new(components)
}
