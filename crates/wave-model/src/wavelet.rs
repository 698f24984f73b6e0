//! Wavelet state and the operations applied to it.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use wave_docop::{to_concise_string, BufferedDocOp, OperationError};

use crate::document::IndexedDocument;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn address(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to do when an operation in a batch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure and return it.
    #[default]
    Abort,
    /// Log the failure and carry on with the next operation.
    LogAndSkip,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WaveletOperation {
    DocumentMutation {
        document_id: String,
        op: BufferedDocOp,
    },
    AddParticipant(ParticipantId),
    RemoveParticipant(ParticipantId),
    NoOp,
}

impl WaveletOperation {
    /// Applies the operation to `wavelet`. A failed operation leaves the
    /// wavelet unchanged.
    pub fn apply(&self, wavelet: &mut WaveletData) -> Result<(), OperationError> {
        match self {
            WaveletOperation::DocumentMutation { document_id, op } => {
                match wavelet.documents.get_mut(document_id) {
                    Some(doc) => doc.consume(op),
                    None => {
                        let mut doc = IndexedDocument::new();
                        doc.consume(op)?;
                        wavelet.documents.insert(document_id.clone(), doc);
                        Ok(())
                    }
                }
            }
            WaveletOperation::AddParticipant(id) => {
                if !wavelet.participants.insert(id.clone()) {
                    return Err(OperationError::DuplicateParticipant(id.to_string()));
                }
                Ok(())
            }
            WaveletOperation::RemoveParticipant(id) => {
                if !wavelet.participants.shift_remove(id) {
                    return Err(OperationError::MissingParticipant(id.to_string()));
                }
                Ok(())
            }
            WaveletOperation::NoOp => Ok(()),
        }
    }
}

impl fmt::Display for WaveletOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveletOperation::DocumentMutation { document_id, op } => {
                write!(f, "DocumentMutation@{document_id} {}", to_concise_string(op))
            }
            WaveletOperation::AddParticipant(id) => write!(f, "AddParticipant {id}"),
            WaveletOperation::RemoveParticipant(id) => write!(f, "RemoveParticipant {id}"),
            WaveletOperation::NoOp => f.write_str("NoOp"),
        }
    }
}

/// Participants in the order they joined, and documents by id.
#[derive(Debug, Clone, Default)]
pub struct WaveletData {
    participants: IndexSet<ParticipantId>,
    documents: IndexMap<String, IndexedDocument>,
}

impl WaveletData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.participants.iter()
    }

    pub fn is_participant(&self, id: &ParticipantId) -> bool {
        self.participants.contains(id)
    }

    pub fn document(&self, id: &str) -> Option<&IndexedDocument> {
        self.documents.get(id)
    }

    pub fn document_ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn apply(&mut self, op: &WaveletOperation) -> Result<(), OperationError> {
        op.apply(self)
    }

    /// Applies `ops` in order. Returns how many were applied.
    pub fn apply_all<'a, I>(&mut self, ops: I, policy: FailurePolicy) -> Result<usize, OperationError>
    where
        I: IntoIterator<Item = &'a WaveletOperation>,
    {
        let mut applied = 0;
        for op in ops {
            match (op.apply(self), policy) {
                (Ok(()), _) => applied += 1,
                (Err(e), FailurePolicy::Abort) => return Err(e),
                (Err(e), FailurePolicy::LogAndSkip) => {
                    log::error!("skipping wavelet operation {op}: {e}");
                }
            }
        }
        Ok(applied)
    }
}
