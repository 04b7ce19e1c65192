//! Pylon storage cluster provider
//!
//! Manages NFS exports, quotas and network pools through the cluster's REST
//! API, mapping every request and response through `pylon-core`.
//!
//! ## Module Structure
//!
//! - `client` - Cluster transport and the in-memory cluster
//! - `provider` - StorageProvider, which hands out resource handlers
//! - `resources` - Wire and config models plus a handler per resource kind

pub mod client;
pub mod provider;
pub mod resources;

// Re-export main types
pub use client::{ClientError, ClusterClient, InMemoryCluster};
pub use provider::StorageProvider;
pub use resources::{ResourceKind, SchemaField, find_kind, resource_kinds};
