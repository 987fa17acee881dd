//! Transaction operation and outcome types

use serde::{Deserialize, Serialize};

/// One operation inside an atomic transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Succeeds if the node is missing; its version and content are ignored
    CheckAbsent(String),

    /// Create a persistent node with the given content
    Create { path: String, data: Vec<u8> },
}

impl Op {
    /// Create a node with empty content
    pub fn create_empty(path: impl Into<String>) -> Self {
        Op::Create {
            path: path.into(),
            data: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Op::CheckAbsent(path) => path,
            Op::Create { path, .. } => path,
        }
    }
}

/// Per-operation result of one transaction submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionOutcome {
    /// The operation was applied as requested
    Confirmed,

    /// The node is present
    AlreadyExists,

    /// The node is missing
    Absent,

    /// Not applied because another operation in the batch failed
    DependentFailure,

    /// The operation failed for a reason unrelated to existence
    Rejected(String),
}

impl TransactionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransactionOutcome::Confirmed)
    }
}
