//! Client handle for the in-memory store
//!
//! Implements [`CoordinationStore`] so the bootstrap protocol runs against
//! `MemoryStore` exactly as it would against a ZooKeeper session.

use crate::{CoordinationStore, MemoryStore, Op, Result, TransactionOutcome};
use async_trait::async_trait;
use std::sync::Arc;

/// Client connected to a [`MemoryStore`]
#[derive(Clone)]
pub struct MemoryClient {
    /// Client name, used in logs
    name: String,

    /// Reference to the shared store
    store: Arc<MemoryStore>,
}

impl MemoryClient {
    /// Create a new client for a store
    pub fn new(name: impl Into<String>, store: Arc<MemoryStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    /// Get the name of this client
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the store this client talks to
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }
}

#[async_trait]
impl CoordinationStore for MemoryClient {
    async fn transaction(&self, ops: Vec<Op>) -> Result<Vec<TransactionOutcome>> {
        self.store.submit_transaction(&self.name, &ops)
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.store.client_exists(&self.name, path)
    }

    async fn create(&self, path: &str, data: &[u8]) -> Result<()> {
        self.store.client_create(&self.name, path, data)
    }
}
