//! Error types for bootstrapping

use helios_common::NamespaceId;
use helios_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Result type for bootstrap operations
pub type Result<T> = std::result::Result<T, BootstrapError>;

/// Why a bootstrap attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ConnectionTimeout,
    NamespaceCollision,
    CreationRace,
    CreationRejected,
    StoreUnavailable,
}

/// Bootstrap errors
///
/// Every variant is terminal for one invocation; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    #[error("Timed out after {}s while connecting to ZooKeeper", .timeout.as_secs())]
    ConnectionTimeout { timeout: Duration },

    #[error("Aborting, some nodes already exist in namespace '{namespace}': {}", .paths.join(", "))]
    NamespaceCollision {
        namespace: NamespaceId,
        paths: Vec<String>,
    },

    #[error("Aborting, nodes were created concurrently in namespace '{namespace}': {}", .paths.join(", "))]
    CreationRace {
        namespace: NamespaceId,
        paths: Vec<String>,
    },

    #[error("Aborting, couldn't create some nodes in namespace '{namespace}': {}", .paths.join(", "))]
    CreationRejected {
        namespace: NamespaceId,
        paths: Vec<String>,
    },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl BootstrapError {
    pub fn kind(&self) -> FailureKind {
        match self {
            BootstrapError::ConnectionTimeout { .. } => FailureKind::ConnectionTimeout,
            BootstrapError::NamespaceCollision { .. } => FailureKind::NamespaceCollision,
            BootstrapError::CreationRace { .. } => FailureKind::CreationRace,
            BootstrapError::CreationRejected { .. } => FailureKind::CreationRejected,
            BootstrapError::StoreUnavailable(_) => FailureKind::StoreUnavailable,
        }
    }

    /// Paths that conflicted or failed, empty for connection-level errors
    pub fn affected_paths(&self) -> &[String] {
        match self {
            BootstrapError::NamespaceCollision { paths, .. }
            | BootstrapError::CreationRace { paths, .. }
            | BootstrapError::CreationRejected { paths, .. } => paths.as_slice(),
            BootstrapError::ConnectionTimeout { .. } | BootstrapError::StoreUnavailable(_) => &[],
        }
    }
}

impl From<StoreError> for BootstrapError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConnectionTimeout(timeout) => BootstrapError::ConnectionTimeout { timeout },
            other => BootstrapError::StoreUnavailable(other.to_string()),
        }
    }
}
