//! Common types for Helios bootstrap
//!
//! This crate defines:
//! - Namespace identifiers (UUIDv4-based) and their generator
//! - The fixed node layout a namespace occupies in the coordination store

mod layout;
mod namespace_id;

pub use layout::{NamespaceLayout, ROOT_PATH};
pub use namespace_id::{InvalidNamespace, NamespaceGenerator, NamespaceId};
