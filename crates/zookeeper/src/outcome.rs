//! Mapping ZooKeeper multi results onto transaction outcomes
//!
//! ZooKeeper has no "check absent" operation. `CheckAbsent(path)` is sent as a
//! version-agnostic `check(path, -1)`, which passes when the node exists, so a
//! passing check means `AlreadyExists` and a `NoNode` failure means `Absent`.
//! A multi stops at its first failing operation: later operations are not
//! evaluated, and earlier writes are rolled back.

use helios_store::{Op, TransactionOutcome};

/// Why the failing operation of a multi failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpFailure {
    NoNode,
    NodeExists,
    Other(String),
}

/// Outcomes for a multi that committed
pub fn committed(ops: &[Op]) -> Vec<TransactionOutcome> {
    ops.iter()
        .map(|op| match op {
            Op::CheckAbsent(_) => TransactionOutcome::AlreadyExists,
            Op::Create { .. } => TransactionOutcome::Confirmed,
        })
        .collect()
}

/// Outcomes for a multi whose operation at `index` failed
pub fn failed_at(ops: &[Op], index: usize, failure: OpFailure) -> Vec<TransactionOutcome> {
    ops.iter()
        .enumerate()
        .map(|(i, op)| match (i.cmp(&index), op) {
            (std::cmp::Ordering::Less, Op::CheckAbsent(_)) => TransactionOutcome::AlreadyExists,
            (std::cmp::Ordering::Less, Op::Create { .. }) => TransactionOutcome::DependentFailure,
            (std::cmp::Ordering::Equal, Op::CheckAbsent(_)) => match &failure {
                OpFailure::NoNode => TransactionOutcome::Absent,
                OpFailure::NodeExists => TransactionOutcome::AlreadyExists,
                OpFailure::Other(reason) => TransactionOutcome::Rejected(reason.clone()),
            },
            (std::cmp::Ordering::Equal, Op::Create { path, .. }) => match &failure {
                OpFailure::NodeExists => TransactionOutcome::AlreadyExists,
                OpFailure::NoNode => {
                    TransactionOutcome::Rejected(format!("parent of {} does not exist", path))
                }
                OpFailure::Other(reason) => TransactionOutcome::Rejected(reason.clone()),
            },
            (std::cmp::Ordering::Greater, _) => TransactionOutcome::DependentFailure,
        })
        .collect()
}
