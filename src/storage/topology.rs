//! Node Topology Planning
//!
//! Splits a requested node count into Elasticsearch node groups. Small
//! clusters run every role on every node; larger ones keep a fixed set of
//! master-eligible nodes and put the remainder in a client/data group.

use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use tracing::debug;

use super::replicas::calculate_replica_shards;
use crate::crd::{
    ElasticsearchNode, ElasticsearchSpec, ElasticsearchStorageSpec, NodeRole, OwnerIdentity,
    RedundancyPolicy,
};
use crate::error::{Error, Result};

// =============================================================================
// Constants
// =============================================================================

/// Largest cluster that runs as a single all-role group
pub const MAX_COMBINED_NODES: u32 = 3;

/// Size of the master-eligible group in a split topology
pub const MASTER_NODE_COUNT: u32 = 3;

/// Qualifier appended to the master group's generated identifier
const MASTER_QUALIFIER: &str = "master";

/// Readable characters kept from namespace and name
const READABLE_PREFIX_LEN: usize = 16;

/// Hex characters of the namespace/name digest
const DIGEST_LEN: usize = 8;

// =============================================================================
// Node Layout
// =============================================================================

/// How many nodes land in each group for a given total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLayout {
    /// One group carrying master, client and data roles
    Combined { nodes: u32 },
    /// Master-eligible group followed by a client/data group
    Split { masters: u32, data: u32 },
}

impl NodeLayout {
    /// Pick the layout for a total node count
    pub fn for_node_count(nodes: u32) -> Self {
        if nodes <= MAX_COMBINED_NODES {
            NodeLayout::Combined { nodes }
        } else {
            NodeLayout::Split {
                masters: MASTER_NODE_COUNT,
                data: nodes - MASTER_NODE_COUNT,
            }
        }
    }

    /// Nodes that hold shards. Master nodes keep the data role in a split
    /// layout, so this is always the full node count.
    pub fn data_nodes(&self) -> u32 {
        match *self {
            NodeLayout::Combined { nodes } => nodes,
            NodeLayout::Split { masters, data } => masters + data,
        }
    }

    pub fn total_nodes(&self) -> u32 {
        match *self {
            NodeLayout::Combined { nodes } => nodes,
            NodeLayout::Split { masters, data } => masters + data,
        }
    }
}

// =============================================================================
// Topology
// =============================================================================

/// Planned node groups for one Elasticsearch cluster
#[derive(Debug, Clone, PartialEq)]
pub enum Topology {
    Combined(ElasticsearchNode),
    Split {
        master: ElasticsearchNode,
        data: ElasticsearchNode,
    },
}

impl Topology {
    /// Plan node groups for the cluster requested by `owner`.
    ///
    /// Fails with [`Error::InvalidArgument`] on a negative node count. A zero
    /// count yields a single empty group.
    pub fn plan(owner: &OwnerIdentity, request: &ElasticsearchSpec) -> Result<Self> {
        let nodes = u32::try_from(request.node_count).map_err(|_| {
            Error::InvalidArgument(format!(
                "nodeCount must not be negative, got {}",
                request.node_count
            ))
        })?;
        let layout = NodeLayout::for_node_count(nodes);

        debug!(
            namespace = %owner.namespace,
            name = %owner.name,
            nodes = nodes,
            layout = ?layout,
            "Planning Elasticsearch topology"
        );

        let group = |roles: &[NodeRole], count: u32, qualifier: Option<&str>| ElasticsearchNode {
            roles: roles.iter().copied().collect::<BTreeSet<_>>(),
            node_count: count as i32,
            storage: ElasticsearchStorageSpec {
                storage_class_name: request.storage.storage_class_name.clone(),
                size: request.storage.size.clone(),
            },
            gen_uuid: Some(generated_id(&owner.namespace, &owner.name, qualifier)),
        };

        let topology = match layout {
            NodeLayout::Combined { nodes } => Topology::Combined(group(
                &[NodeRole::Master, NodeRole::Client, NodeRole::Data],
                nodes,
                None,
            )),
            NodeLayout::Split { masters, data } => Topology::Split {
                master: group(
                    &[NodeRole::Master, NodeRole::Client, NodeRole::Data],
                    masters,
                    Some(MASTER_QUALIFIER),
                ),
                data: group(&[NodeRole::Client, NodeRole::Data], data, None),
            },
        };

        Ok(topology)
    }

    /// Groups in creation order, master group first
    pub fn nodes(&self) -> Vec<&ElasticsearchNode> {
        match self {
            Topology::Combined(node) => vec![node],
            Topology::Split { master, data } => vec![master, data],
        }
    }

    pub fn into_nodes(self) -> Vec<ElasticsearchNode> {
        match self {
            Topology::Combined(node) => vec![node],
            Topology::Split { master, data } => vec![master, data],
        }
    }

    /// Nodes carrying the data role across all groups
    pub fn data_nodes(&self) -> u32 {
        self.nodes()
            .into_iter()
            .filter(|n| n.has_role(NodeRole::Data))
            .map(|n| n.node_count.max(0) as u32)
            .sum()
    }

    /// Replica shards the planned data nodes can host under `policy`
    pub fn replica_shards(&self, policy: RedundancyPolicy) -> u32 {
        calculate_replica_shards(policy, self.data_nodes())
    }
}

// =============================================================================
// Generated Identifiers
// =============================================================================

/// Stable node group identifier for an owner.
///
/// A lowercase alphanumeric prefix of namespace and name keeps the id
/// readable in pod names; the digest keeps ids distinct when the prefixes
/// collide (e.g. `ab`/`c` and `a`/`bc`).
pub fn generated_id(namespace: &str, name: &str, qualifier: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update([0u8]);
    hasher.update(name.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    let mut id: String = namespace
        .chars()
        .chain(name.chars())
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(READABLE_PREFIX_LEN)
        .collect();
    id.push_str(&digest[..DIGEST_LEN]);

    if let Some(qualifier) = qualifier {
        id.push_str(qualifier);
    }
    id
}
