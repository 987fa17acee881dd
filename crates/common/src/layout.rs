//! Node layout of a Helios namespace

use crate::NamespaceId;

/// Shared root of every Helios namespace. Holds no data of its own.
pub const ROOT_PATH: &str = "/helios";

/// Relative paths below `/helios/{id}`, parents listed before children.
const SKELETON: [&str; 6] = [
    "",
    "/config",
    "/config/hosts",
    "/config/id",
    "/status",
    "/status/hosts",
];

/// The structural nodes a namespace needs before Helios can run on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceLayout {
    namespace: NamespaceId,
    paths: Vec<String>,
}

impl NamespaceLayout {
    /// Compute the layout for a namespace
    pub fn new(namespace: &NamespaceId) -> Self {
        let base = format!("{}/{}", ROOT_PATH, namespace);
        let paths = SKELETON
            .iter()
            .map(|suffix| format!("{}{}", base, suffix))
            .collect();

        Self {
            namespace: namespace.clone(),
            paths,
        }
    }

    pub fn namespace(&self) -> &NamespaceId {
        &self.namespace
    }

    /// Namespace-scoped paths in creation order
    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}
