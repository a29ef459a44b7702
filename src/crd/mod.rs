//! Custom Resource Definitions
//!
//! This module contains all CRD types:
//! - Jaeger: the owning tracing deployment (storage section only)
//! - Elasticsearch: the cluster manifest built for the external operator

pub mod elasticsearch;
pub mod jaeger;

pub use elasticsearch::*;
pub use jaeger::*;
