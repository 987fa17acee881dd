//! ZooKeeper-backed coordination store
//!
//! Wraps a `zookeeper-client` session in the [`CoordinationStore`] interface.
//! This crate also owns connection setup: [`connect`] turns a
//! [`ConnectConfig`] into a live store handle, bounded by the configured
//! timeout. Dropping the store closes the session.

use async_trait::async_trait;
use helios_store::{CoordinationStore, Op, Result, StoreError, TransactionOutcome};
use zookeeper_client as zk;

pub mod config;
pub mod outcome;

pub use config::{ConnectConfig, DEFAULT_CONNECT_TIMEOUT};
use outcome::OpFailure;

/// Connect to a ZooKeeper ensemble
pub async fn connect(config: &ConnectConfig) -> Result<ZooKeeperStore> {
    if config.endpoints.is_empty() {
        return Err(StoreError::Other("no ZooKeeper endpoints given".to_string()));
    }

    let cluster = config.connection_string();
    tracing::debug!("Using {} as a ZooKeeper connection string", cluster);

    match tokio::time::timeout(config.timeout, zk::Client::connect(&cluster)).await {
        Ok(Ok(client)) => Ok(ZooKeeperStore::new(client)),
        Ok(Err(err)) => Err(StoreError::ConnectionLoss(err.to_string())),
        Err(_) => Err(StoreError::ConnectionTimeout(config.timeout)),
    }
}

/// Coordination store over a live ZooKeeper session
pub struct ZooKeeperStore {
    client: zk::Client,
}

impl ZooKeeperStore {
    /// Wrap an already-connected client
    pub fn new(client: zk::Client) -> Self {
        Self { client }
    }
}

/// Structural nodes are plain persistent nodes with an open ACL
fn create_options() -> zk::CreateOptions<'static> {
    zk::CreateMode::Persistent.with_acls(zk::Acls::anyone_all())
}

fn store_error(err: zk::Error, path: &str) -> StoreError {
    match err {
        zk::Error::NodeExists => StoreError::NodeExists(path.to_string()),
        zk::Error::NoNode => StoreError::NoParent(path.to_string()),
        zk::Error::SessionExpired => StoreError::SessionExpired,
        zk::Error::ConnectionLoss => StoreError::ConnectionLoss(err.to_string()),
        other => StoreError::Other(other.to_string()),
    }
}

fn op_failure(err: zk::Error) -> OpFailure {
    match err {
        zk::Error::NoNode => OpFailure::NoNode,
        zk::Error::NodeExists => OpFailure::NodeExists,
        other => OpFailure::Other(other.to_string()),
    }
}

#[async_trait]
impl CoordinationStore for ZooKeeperStore {
    async fn transaction(&self, ops: Vec<Op>) -> Result<Vec<TransactionOutcome>> {
        if ops.is_empty() {
            return Ok(Vec::new());
        }

        let options = create_options();
        let mut writer = self.client.new_multi_writer();
        for op in &ops {
            let added = match op {
                Op::CheckAbsent(path) => writer.add_check_version(path, -1),
                Op::Create { path, data } => writer.add_create(path, data, &options),
            };
            added.map_err(|err| store_error(err, op.path()))?;
        }

        match writer.commit().await {
            Ok(_) => Ok(outcome::committed(&ops)),
            Err(zk::MultiWriteError::OperationFailed { index, source }) => {
                tracing::debug!("Multi failed at op {} ({}): {}", index, ops[index].path(), source);
                Ok(outcome::failed_at(&ops, index, op_failure(source)))
            }
            Err(zk::MultiWriteError::RequestFailed { source }) => Err(store_error(source, "")),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.client
            .check_stat(path)
            .await
            .map(|stat| stat.is_some())
            .map_err(|err| store_error(err, path))
    }

    async fn create(&self, path: &str, data: &[u8]) -> Result<()> {
        self.client
            .create(path, data, &create_options())
            .await
            .map(|_| ())
            .map_err(|err| store_error(err, path))
    }
}
