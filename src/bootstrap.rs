//! Namespace bootstrap protocol
//!
//! Creates the skeleton of a Helios namespace with two atomic transactions:
//!
//! 1. A batch of `CheckAbsent` operations over the six namespace nodes. Any
//!    node that already exists is a collision and nothing is written.
//! 2. The shared `/helios` root is ensured outside of any transaction. It
//!    carries no state, so racing creators are harmless.
//! 3. A batch of `Create` operations over the same six nodes. The store applies
//!    all of them or none, so a node created concurrently between the two
//!    batches makes the whole batch fail without leaving partial structure.
//!
//! No step is retried. Correctness rests on the store's transaction semantics;
//! there is no local locking.

use crate::error::{BootstrapError, Result};
use helios_common::{NamespaceId, NamespaceLayout, ROOT_PATH};
use helios_store::{CoordinationStore, Op, StoreError, TransactionOutcome};
use serde::{Deserialize, Serialize};

/// Summary of a successful bootstrap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapReport {
    /// The namespace that was created
    pub namespace: NamespaceId,

    /// Whether this call created the shared `/helios` root
    pub root_created: bool,

    /// Namespace nodes created, in creation order
    pub paths: Vec<String>,
}

/// Runs the bootstrap protocol against a borrowed store client
pub struct Bootstrapper<'a, S: CoordinationStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: CoordinationStore + ?Sized> Bootstrapper<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Create the namespace skeleton
    pub async fn bootstrap(&self, namespace: &NamespaceId) -> Result<BootstrapReport> {
        let layout = NamespaceLayout::new(namespace);

        self.check_absent(&layout).await?;
        let root_created = self.ensure_root().await?;
        self.create_skeleton(&layout).await?;

        tracing::info!("Namespace '{}' has been successfully created", namespace);

        Ok(BootstrapReport {
            namespace: namespace.clone(),
            root_created,
            paths: layout.paths().to_vec(),
        })
    }

    /// Phase 1: every namespace node must be missing
    async fn check_absent(&self, layout: &NamespaceLayout) -> Result<()> {
        let ops = layout
            .paths()
            .iter()
            .cloned()
            .map(Op::CheckAbsent)
            .collect();

        tracing::debug!(
            "Checking namespace '{}' nodes: {}",
            layout.namespace(),
            layout.paths().join(", ")
        );
        let outcomes = self.submit(layout, ops).await?;

        let existing = matching_paths(layout, &outcomes, |outcome| {
            matches!(outcome, TransactionOutcome::AlreadyExists)
        });
        if !existing.is_empty() {
            return Err(BootstrapError::NamespaceCollision {
                namespace: layout.namespace().clone(),
                paths: existing,
            });
        }

        if let Some((path, reason)) = first_rejection(layout, &outcomes) {
            return Err(BootstrapError::StoreUnavailable(format!(
                "existence check of {} was rejected: {}",
                path, reason
            )));
        }

        Ok(())
    }

    /// Phase 2: make sure the shared root exists; returns whether we created it
    async fn ensure_root(&self) -> Result<bool> {
        if self.store.exists(ROOT_PATH).await? {
            return Ok(false);
        }

        match self.store.create(ROOT_PATH, &[]).await {
            Ok(()) => {
                tracing::debug!("Created {}", ROOT_PATH);
                Ok(true)
            }
            Err(StoreError::NodeExists(_)) => {
                tracing::debug!("{} was created concurrently", ROOT_PATH);
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Phase 3: create all namespace nodes in one transaction
    async fn create_skeleton(&self, layout: &NamespaceLayout) -> Result<()> {
        let ops = layout.paths().iter().map(Op::create_empty).collect();

        tracing::debug!("Creating namespace '{}' nodes", layout.namespace());
        let outcomes = self.submit(layout, ops).await?;

        if outcomes.iter().all(TransactionOutcome::is_confirmed) {
            return Ok(());
        }

        let raced = matching_paths(layout, &outcomes, |outcome| {
            matches!(outcome, TransactionOutcome::AlreadyExists)
        });
        if !raced.is_empty() {
            return Err(BootstrapError::CreationRace {
                namespace: layout.namespace().clone(),
                paths: raced,
            });
        }

        // Not a race: the store refused an operation for another reason
        let mut failed = matching_paths(layout, &outcomes, |outcome| {
            matches!(outcome, TransactionOutcome::Rejected(_))
        });
        if failed.is_empty() {
            failed = matching_paths(layout, &outcomes, |outcome| !outcome.is_confirmed());
        }
        Err(BootstrapError::CreationRejected {
            namespace: layout.namespace().clone(),
            paths: failed,
        })
    }

    async fn submit(
        &self,
        layout: &NamespaceLayout,
        ops: Vec<Op>,
    ) -> Result<Vec<TransactionOutcome>> {
        let expected = ops.len();
        let outcomes = self.store.transaction(ops).await?;

        if outcomes.len() != expected {
            return Err(BootstrapError::StoreUnavailable(format!(
                "transaction on namespace '{}' returned {} results for {} operations",
                layout.namespace(),
                outcomes.len(),
                expected
            )));
        }

        Ok(outcomes)
    }
}

/// Bootstrap a namespace with a borrowed client
pub async fn bootstrap<S>(store: &S, namespace: &NamespaceId) -> Result<BootstrapReport>
where
    S: CoordinationStore + ?Sized,
{
    Bootstrapper::new(store).bootstrap(namespace).await
}

fn matching_paths<F>(
    layout: &NamespaceLayout,
    outcomes: &[TransactionOutcome],
    pred: F,
) -> Vec<String>
where
    F: Fn(&TransactionOutcome) -> bool,
{
    layout
        .paths()
        .iter()
        .zip(outcomes)
        .filter(|(_, outcome)| pred(outcome))
        .map(|(path, _)| path.clone())
        .collect()
}

fn first_rejection<'l>(
    layout: &'l NamespaceLayout,
    outcomes: &[TransactionOutcome],
) -> Option<(&'l str, String)> {
    layout
        .paths()
        .iter()
        .zip(outcomes)
        .find_map(|(path, outcome)| match outcome {
            TransactionOutcome::Rejected(reason) => Some((path.as_str(), reason.clone())),
            _ => None,
        })
}
