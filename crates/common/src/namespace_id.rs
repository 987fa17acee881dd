//! Namespace identifier using UUIDv4
//!
//! Every Helios cluster lives under its own randomly named subtree. The name is
//! drawn from the operating system's CSPRNG so that two independently
//! bootstrapped clusters sharing one store practically never pick the same id.
//! Collisions are still detected by the bootstrap protocol.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Rejection reason for an operator-supplied namespace id
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid namespace '{namespace}': {reason}")]
pub struct InvalidNamespace {
    pub namespace: String,
    pub reason: &'static str,
}

/// Name of a namespace subtree under the Helios root
///
/// Generated ids are canonical lowercase hyphenated UUIDv4 strings. Ids parsed
/// from user input only need to be a single valid path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamespaceId(String);

impl NamespaceId {
    /// Parse an id that will be used as one path segment
    pub fn parse(s: &str) -> Result<Self, InvalidNamespace> {
        let reason = if s.is_empty() {
            Some("must not be empty")
        } else if s.contains('/') {
            Some("must not contain '/'")
        } else if s == "." || s == ".." {
            Some("must not be a relative path component")
        } else if s.contains('\0') {
            Some("must not contain NUL")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InvalidNamespace {
                namespace: s.to_string(),
                reason,
            }),
            None => Ok(Self(s.to_string())),
        }
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NamespaceId {
    type Error = InvalidNamespace;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NamespaceId> for String {
    fn from(id: NamespaceId) -> Self {
        id.0
    }
}

impl From<Uuid> for NamespaceId {
    fn from(uuid: Uuid) -> Self {
        // Hyphenated UUIDs never contain '/', so no validation is needed
        Self(uuid.as_hyphenated().to_string())
    }
}

/// Source of fresh namespace ids
///
/// `uuid` draws v4 values from `getrandom`, i.e. the OS CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceGenerator;

impl NamespaceGenerator {
    /// Generate a new random namespace id
    pub fn generate() -> NamespaceId {
        NamespaceId::from(Uuid::new_v4())
    }
}
