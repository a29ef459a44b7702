//! Replica Shard Calculation
//!
//! Maps a redundancy policy onto the number of replica shards each primary
//! shard receives, bounded by how many data nodes can host a distinct copy.

use crate::crd::RedundancyPolicy;

/// Number of replica shards for `data_nodes` shard-holding nodes.
///
/// | policy   | replicas                     |
/// |----------|------------------------------|
/// | Zero     | 0                            |
/// | Single   | 1, or 0 without data nodes   |
/// | Multiple | (data_nodes - 1) / 2         |
/// | Full     | data_nodes - 1               |
pub fn calculate_replica_shards(policy: RedundancyPolicy, data_nodes: u32) -> u32 {
    match policy {
        RedundancyPolicy::Zero => 0,
        RedundancyPolicy::Single => data_nodes.min(1),
        RedundancyPolicy::Multiple => data_nodes.saturating_sub(1) / 2,
        RedundancyPolicy::Full => data_nodes.saturating_sub(1),
    }
}
