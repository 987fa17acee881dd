//! Coordination store abstraction
//!
//! This crate defines the capabilities the bootstrap protocol needs from a
//! hierarchical, strongly-consistent store such as ZooKeeper, plus an
//! in-memory implementation for tests and local runs.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod client;
pub mod memory;
pub mod types;

pub use client::MemoryClient;
pub use memory::{Interference, MemoryStore, Trigger};
pub use types::{Op, TransactionOutcome};

/// Store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Timed out after {0:?} while connecting to the store")]
    ConnectionTimeout(Duration),

    #[error("Connection lost: {0}")]
    ConnectionLoss(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Node already exists: {0}")]
    NodeExists(String),

    #[error("Parent node does not exist: {0}")]
    NoParent(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Store error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A live client handle to a coordination store
///
/// Implementations must apply `transaction` atomically: either every
/// operation takes effect or none does. The returned outcomes are positional.
/// `Err` is reserved for request-level failures where nothing is known about
/// the batch.
#[async_trait]
pub trait CoordinationStore: Send + Sync {
    /// Submit a batch of operations as one atomic transaction
    async fn transaction(&self, ops: Vec<Op>) -> Result<Vec<TransactionOutcome>>;

    /// Check whether a node exists
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Create a single node outside of any transaction
    ///
    /// Returns `StoreError::NodeExists` if the node is already there.
    async fn create(&self, path: &str, data: &[u8]) -> Result<()>;
}

/// Validate an absolute node path (`/a/b`, no trailing or empty segments)
pub fn validate_path(path: &str) -> Result<()> {
    let valid = path.starts_with('/')
        && path.len() > 1
        && !path.ends_with('/')
        && path[1..].split('/').all(|seg| !seg.is_empty())
        && !path.contains('\0');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidPath(path.to_string()))
    }
}

/// Parent of an absolute node path; `/` for top-level nodes
pub fn parent_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}
