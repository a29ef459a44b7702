//! Jaeger CRD
//!
//! Only the storage section of the Jaeger resource is modelled here: it is
//! the input that drives the Elasticsearch manifest and the storage wiring.

use k8s_openapi::api::core::v1::{ResourceRequirements, Toleration};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::elasticsearch::{ElasticsearchStorageSpec, RedundancyPolicy};
use crate::error::{Error, Result};

// =============================================================================
// Jaeger CRD
// =============================================================================

/// A Jaeger tracing deployment.
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "jaegertracing.io",
    version = "v1",
    kind = "Jaeger",
    plural = "jaegers",
    printcolumn = r#"{"name": "Storage", "type": "string", "jsonPath": ".spec.storage.type"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#,
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct JaegerSpec {
    /// Storage backend configuration
    #[serde(default)]
    pub storage: JaegerStorageSpec,
}

// =============================================================================
// Sub-Types
// =============================================================================

/// Storage section of the Jaeger spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JaegerStorageSpec {
    /// Storage backend type
    #[serde(default = "default_storage_type")]
    pub r#type: String,

    /// Self-provisioned Elasticsearch cluster
    #[serde(default)]
    pub elasticsearch: ElasticsearchSpec,
}

impl Default for JaegerStorageSpec {
    fn default() -> Self {
        Self {
            r#type: default_storage_type(),
            elasticsearch: ElasticsearchSpec::default(),
        }
    }
}

/// Requested Elasticsearch cluster for a Jaeger deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElasticsearchSpec {
    /// Logical cluster name; also the service host the collectors connect to
    #[serde(default = "default_cluster_name")]
    pub name: String,

    /// Total number of Elasticsearch nodes
    #[serde(default = "default_node_count")]
    pub node_count: i32,

    #[serde(default)]
    pub redundancy_policy: RedundancyPolicy,

    #[serde(default)]
    pub storage: ElasticsearchStorageSpec,

    #[serde(default)]
    pub node_selector: BTreeMap<String, String>,

    #[serde(default)]
    pub resources: Option<ResourceRequirements>,

    #[serde(default)]
    pub tolerations: Vec<Toleration>,
}

impl Default for ElasticsearchSpec {
    fn default() -> Self {
        Self {
            name: default_cluster_name(),
            node_count: default_node_count(),
            redundancy_policy: RedundancyPolicy::default(),
            storage: ElasticsearchStorageSpec::default(),
            node_selector: BTreeMap::new(),
            resources: None,
            tolerations: Vec::new(),
        }
    }
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_storage_type() -> String {
    "elasticsearch".to_string()
}

fn default_cluster_name() -> String {
    "elasticsearch".to_string()
}

fn default_node_count() -> i32 {
    3
}

// =============================================================================
// Implementations
// =============================================================================

/// Namespace and name of the resource that owns generated manifests
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerIdentity {
    pub namespace: String,
    pub name: String,
}

impl Jaeger {
    /// The requested Elasticsearch cluster
    pub fn elasticsearch(&self) -> &ElasticsearchSpec {
        &self.spec.storage.elasticsearch
    }

    /// Whether this instance stores spans in Elasticsearch
    pub fn uses_elasticsearch(&self) -> bool {
        self.spec.storage.r#type.eq_ignore_ascii_case("elasticsearch")
    }

    /// Namespace and name, both required before any manifest is built
    pub fn owner_identity(&self) -> Result<OwnerIdentity> {
        let name = match self.metadata.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(Error::missing("Jaeger", "metadata.name")),
        };
        let namespace = match self.metadata.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => ns,
            _ => return Err(Error::missing("Jaeger", "metadata.namespace")),
        };

        Ok(OwnerIdentity {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_spec_defaults() {
        let spec: JaegerSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec.storage.r#type, "elasticsearch");
        assert_eq!(spec.storage.elasticsearch.name, "elasticsearch");
        assert_eq!(spec.storage.elasticsearch.node_count, 3);
        assert_eq!(
            spec.storage.elasticsearch.redundancy_policy,
            RedundancyPolicy::Single
        );
        assert_eq!(spec, JaegerSpec::default());
    }

    #[test]
    fn test_spec_parsing() {
        let json = r#"{
            "storage": {
                "type": "elasticsearch",
                "elasticsearch": {
                    "nodeCount": 5,
                    "redundancyPolicy": "FullRedundancy",
                    "storage": { "storageClassName": "gp2", "size": "50Gi" },
                    "tolerations": [
                        { "key": "special", "operator": "Equal", "value": "false", "effect": "NoSchedule" }
                    ]
                }
            }
        }"#;
        let spec: JaegerSpec = serde_json::from_str(json).unwrap();
        let es = &spec.storage.elasticsearch;

        assert_eq!(es.node_count, 5);
        assert_eq!(es.redundancy_policy, RedundancyPolicy::Full);
        assert_eq!(es.storage.storage_class_name.as_deref(), Some("gp2"));
        assert_eq!(es.tolerations.len(), 1);
        assert_eq!(es.tolerations[0].key.as_deref(), Some("special"));
    }

    #[test]
    fn test_owner_identity() {
        let mut jaeger = Jaeger::new("simple-prod", JaegerSpec::default());
        assert_matches!(
            jaeger.owner_identity(),
            Err(Error::MissingField { field, .. }) if field == "metadata.namespace"
        );

        jaeger.metadata.namespace = Some("observability".into());
        let owner = jaeger.owner_identity().unwrap();
        assert_eq!(owner.namespace, "observability");
        assert_eq!(owner.name, "simple-prod");

        jaeger.metadata.name = Some(String::new());
        assert_matches!(
            jaeger.owner_identity(),
            Err(Error::MissingField { field, .. }) if field == "metadata.name"
        );
    }

    #[test]
    fn test_uses_elasticsearch() {
        let mut jaeger = Jaeger::new("tracing", JaegerSpec::default());
        assert!(jaeger.uses_elasticsearch());

        jaeger.spec.storage.r#type = "cassandra".into();
        assert!(!jaeger.uses_elasticsearch());
    }
}
