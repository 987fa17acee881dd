//! Bootstrap of Helios cluster namespaces in ZooKeeper
//!
//! Many Helios clusters can share one ZooKeeper ensemble. Each one lives in its
//! own namespace, `/helios/{id}`, named by a random UUID. This crate creates the
//! structural nodes of a new namespace atomically: either all of them appear or
//! none do, even with concurrent bootstraps or a failing store.
//!
//! The protocol itself is in [`bootstrap`]; it runs against any
//! [`CoordinationStore`], such as `helios_zookeeper::ZooKeeperStore` or the
//! in-memory `helios_store::MemoryClient`.

pub mod bootstrap;
pub mod cli;
pub mod error;
pub mod logging;

pub use bootstrap::{BootstrapReport, Bootstrapper, bootstrap};
pub use cli::{Cli, run};
pub use error::{BootstrapError, FailureKind, Result};

// Re-export the types callers need to drive a bootstrap
pub use helios_common::{NamespaceGenerator, NamespaceId, NamespaceLayout, ROOT_PATH};
pub use helios_store::CoordinationStore;
