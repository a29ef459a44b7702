//! Elasticsearch CRD
//!
//! The cluster manifest handed to the external Elasticsearch operator. One
//! instance exists per owning Jaeger resource; this crate only builds it,
//! the external operator reconciles it.

use k8s_openapi::api::core::v1::{ResourceRequirements, Toleration};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// Elasticsearch CRD
// =============================================================================

/// Desired state of a managed Elasticsearch cluster.
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "logging.openshift.io",
    version = "v1",
    kind = "Elasticsearch",
    plural = "elasticsearches",
    shortname = "es",
    printcolumn = r#"{"name": "Management", "type": "string", "jsonPath": ".spec.managementState"}"#,
    printcolumn = r#"{"name": "Redundancy", "type": "string", "jsonPath": ".spec.redundancyPolicy"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#,
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ElasticsearchClusterSpec {
    /// Whether the external operator actively reconciles the cluster
    #[serde(default)]
    pub management_state: ManagementState,

    /// Replication policy applied to every index
    #[serde(default)]
    pub redundancy_policy: RedundancyPolicy,

    /// Defaults shared by every node group
    #[serde(default)]
    pub node_spec: ElasticsearchNodeSpec,

    /// Node groups, in creation order
    #[serde(default)]
    pub nodes: Vec<ElasticsearchNode>,
}

// =============================================================================
// Sub-Types
// =============================================================================

/// Management state of the cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ManagementState {
    #[default]
    Managed,
    Unmanaged,
}

/// How many replica shards each primary shard receives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum RedundancyPolicy {
    /// No replicas
    #[serde(rename = "ZeroRedundancy")]
    Zero,
    /// One replica regardless of cluster size
    #[default]
    #[serde(rename = "SingleRedundancy")]
    Single,
    /// Replicas on roughly half of the data nodes
    #[serde(rename = "MultipleRedundancy")]
    Multiple,
    /// A replica on every data node
    #[serde(rename = "FullRedundancy")]
    Full,
}

impl std::fmt::Display for RedundancyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedundancyPolicy::Zero => write!(f, "ZeroRedundancy"),
            RedundancyPolicy::Single => write!(f, "SingleRedundancy"),
            RedundancyPolicy::Multiple => write!(f, "MultipleRedundancy"),
            RedundancyPolicy::Full => write!(f, "FullRedundancy"),
        }
    }
}

/// Responsibility of a cluster node
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Master,
    Client,
    Data,
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRole::Master => write!(f, "master"),
            NodeRole::Client => write!(f, "client"),
            NodeRole::Data => write!(f, "data"),
        }
    }
}

/// Persistent storage for a node group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElasticsearchStorageSpec {
    /// Storage class for the node volumes; cluster default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,

    /// Volume size (e.g., "50Gi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Quantity>,
}

/// Settings every node group inherits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElasticsearchNodeSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<Toleration>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
}

/// A group of nodes sharing roles and storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElasticsearchNode {
    /// Roles carried by every node in the group
    pub roles: BTreeSet<NodeRole>,

    /// Number of nodes in the group
    pub node_count: i32,

    #[serde(default)]
    pub storage: ElasticsearchStorageSpec,

    /// Stable identifier the external operator uses to name the group's pods
    #[serde(default, rename = "genUUID", skip_serializing_if = "Option::is_none")]
    pub gen_uuid: Option<String>,
}

impl ElasticsearchNode {
    /// Check if the group carries a role
    pub fn has_role(&self, role: NodeRole) -> bool {
        self.roles.contains(&role)
    }
}

impl ElasticsearchClusterSpec {
    /// Total nodes across all groups
    pub fn total_nodes(&self) -> i32 {
        self.nodes.iter().map(|n| n.node_count).sum()
    }

    /// Nodes that hold shards
    pub fn data_nodes(&self) -> i32 {
        self.nodes
            .iter()
            .filter(|n| n.has_role(NodeRole::Data))
            .map(|n| n.node_count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redundancy_policy_wire_names() {
        let json = serde_json::to_string(&RedundancyPolicy::Multiple).unwrap();
        assert_eq!(json, "\"MultipleRedundancy\"");

        let parsed: RedundancyPolicy = serde_json::from_str("\"ZeroRedundancy\"").unwrap();
        assert_eq!(parsed, RedundancyPolicy::Zero);
        assert_eq!(format!("{}", RedundancyPolicy::Full), "FullRedundancy");
    }

    #[test]
    fn test_node_serializes_gen_uuid() {
        let node = ElasticsearchNode {
            roles: [NodeRole::Client, NodeRole::Data].into_iter().collect(),
            node_count: 2,
            storage: ElasticsearchStorageSpec {
                storage_class_name: Some("floppydisk".into()),
                size: None,
            },
            gen_uuid: Some("abc123".into()),
        };

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["genUUID"], "abc123");
        assert_eq!(value["nodeCount"], 2);
        assert_eq!(value["roles"], serde_json::json!(["client", "data"]));
        assert_eq!(value["storage"]["storageClassName"], "floppydisk");
        assert!(value["storage"].get("size").is_none());
    }

    #[test]
    fn test_cluster_counts() {
        let group = |roles: &[NodeRole], count| ElasticsearchNode {
            roles: roles.iter().copied().collect(),
            node_count: count,
            storage: ElasticsearchStorageSpec::default(),
            gen_uuid: None,
        };
        let spec = ElasticsearchClusterSpec {
            management_state: ManagementState::Managed,
            redundancy_policy: RedundancyPolicy::Full,
            node_spec: ElasticsearchNodeSpec::default(),
            nodes: vec![
                group(&[NodeRole::Master], 3),
                group(&[NodeRole::Client, NodeRole::Data], 4),
            ],
        };

        assert_eq!(spec.total_nodes(), 7);
        assert_eq!(spec.data_nodes(), 4);
    }
}
