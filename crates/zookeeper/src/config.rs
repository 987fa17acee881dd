//! Connection configuration

use std::time::Duration;

/// Default time allowed for establishing a session
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for connecting to a ZooKeeper ensemble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectConfig {
    /// `host:port` endpoints of the ensemble members
    pub endpoints: Vec<String>,

    /// Deadline for the initial connection
    pub timeout: Duration,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            endpoints: vec!["localhost:2181".to_string()],
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ConnectConfig {
    /// Create a new config for the given endpoints
    pub fn new<I, S>(endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            endpoints: endpoints.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Connection string understood by ZooKeeper clients
    pub fn connection_string(&self) -> String {
        self.endpoints.join(",")
    }
}
