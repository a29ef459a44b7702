//! Jaeger Storage Operator - Elasticsearch Provisioning
//!
//! Turns the storage section of a Jaeger resource into an Elasticsearch
//! cluster manifest and wires Jaeger pods to that cluster over TLS.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                          Jaeger (storage request)                            │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────┐  ┌─────────────────────────────────┐   │
//! │  │     Cluster Manifest Builder    │  │     Storage-Wiring Injector     │   │
//! │  │  (Elasticsearch CR + ownerRef)  │  │  (flags, env, certs mounts)     │   │
//! │  └────────────────┬────────────────┘  └────────────────┬────────────────┘   │
//! │                   │                                    │                     │
//! │  ┌────────────────┴────────────────┐                   │                     │
//! │  │      Node Topology Planner      │                   │                     │
//! │  │  (combined / split node groups) │                   │                     │
//! │  └────────────────┬────────────────┘                   │                     │
//! │                   └──────────────┬─────────────────────┘                     │
//! │                    ┌─────────────┴─────────────┐                             │
//! │                    │  Replica Shard Calculator │                             │
//! │                    └───────────────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`storage`]: Topology planning, manifest building and storage wiring
//! - [`crd`]: Jaeger and Elasticsearch resource types
//! - [`render`]: YAML loading and rendering for the CLI
//! - [`error`]: Error types and handling

pub mod crd;
pub mod error;
pub mod render;
pub mod storage;

// Re-export commonly used types
pub use crd::{
    Elasticsearch, ElasticsearchClusterSpec, ElasticsearchNode, ElasticsearchSpec, Jaeger,
    JaegerSpec, ManagementState, NodeRole, OwnerIdentity, RedundancyPolicy,
};

pub use error::{Error, ErrorAction, Result};

pub use storage::{
    build_manifest, calculate_replica_shards, inject_index_job_configuration,
    inject_storage_configuration, ElasticsearchDeployment, NodeLayout, StorageWiringConfig,
    Topology,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
