//! Elasticsearch Storage Module
//!
//! Provisions an Elasticsearch cluster for a Jaeger instance and wires the
//! Jaeger components to it.

pub mod inject;
pub mod manifest;
pub mod replicas;
pub mod topology;

pub use inject::*;
pub use manifest::*;
pub use replicas::*;
pub use topology::*;

use k8s_openapi::api::core::v1::PodSpec;

use crate::crd::{Elasticsearch, Jaeger};
use crate::error::Result;

/// Elasticsearch storage for a single Jaeger instance
#[derive(Debug, Clone, Copy)]
pub struct ElasticsearchDeployment<'a> {
    jaeger: &'a Jaeger,
}

impl<'a> ElasticsearchDeployment<'a> {
    pub fn new(jaeger: &'a Jaeger) -> Self {
        Self { jaeger }
    }

    /// The Elasticsearch manifest owned by the Jaeger instance
    pub fn elasticsearch(&self) -> Result<Elasticsearch> {
        build_manifest(self.jaeger)
    }

    /// Wiring settings derived from the Jaeger storage request
    pub fn wiring_config(&self) -> StorageWiringConfig {
        StorageWiringConfig::from(self.jaeger.elasticsearch())
    }

    /// Add storage flags, certs mount and certs volume to a Jaeger pod
    pub fn inject_storage_configuration(&self, pod: &mut PodSpec) {
        inject_storage_configuration(pod, &self.wiring_config());
    }

    /// Add storage env vars, certs mount and certs volume to an index job pod
    pub fn inject_index_job_configuration(&self, pod: &mut PodSpec) {
        inject_index_job_configuration(pod, &self.wiring_config());
    }
}
