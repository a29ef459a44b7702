//! Storage Wiring
//!
//! Points Jaeger components at the self-provisioned Elasticsearch cluster.
//! Both injectors only append: flags, env vars, mounts and volumes the caller
//! already set are left alone, so repeated calls converge on one wiring.

use k8s_openapi::api::core::v1::{
    Container, EnvVar, PodSpec, SecretVolumeSource, Volume, VolumeMount,
};
use tracing::debug;

use super::replicas::calculate_replica_shards;
use super::topology::NodeLayout;
use crate::crd::{ElasticsearchSpec, RedundancyPolicy};

// =============================================================================
// Constants
// =============================================================================

/// HTTPS port of the Elasticsearch service
pub const ELASTICSEARCH_PORT: u16 = 9200;

/// Flag prefix for the primary span storage
pub const PRIMARY_PREFIX: &str = "es";

/// Flag prefix for the archive storage sharing the same cluster
pub const ARCHIVE_PREFIX: &str = "es-archive";

/// Marker that switches on archive wiring for a container
pub const ARCHIVE_ENABLED_FLAG: &str = "--es-archive.enabled=true";

/// Name shared by the certs volume and its mounts
pub const CERTS_VOLUME_NAME: &str = "certs";

/// Where the certs secret is mounted
pub const CERTS_MOUNT_PATH: &str = "/certs";

pub const CA_PATH: &str = "/certs/ca";
pub const CERT_PATH: &str = "/certs/cert";
pub const KEY_PATH: &str = "/certs/key";

/// Request timeout unless the caller set one
pub const DEFAULT_TIMEOUT: &str = "15s";

/// Prefix of the secret holding the client certificates
pub const SECRET_NAME_PREFIX: &str = "jaeger-";

// =============================================================================
// Wiring Configuration
// =============================================================================

/// What the injectors need to know about the target cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageWiringConfig {
    /// Logical cluster name, used as the service host
    pub cluster_name: String,
    /// Requested node count
    pub node_count: i32,
    pub redundancy_policy: RedundancyPolicy,
}

impl From<&ElasticsearchSpec> for StorageWiringConfig {
    fn from(spec: &ElasticsearchSpec) -> Self {
        Self {
            cluster_name: spec.name.clone(),
            node_count: spec.node_count,
            redundancy_policy: spec.redundancy_policy,
        }
    }
}

impl StorageWiringConfig {
    pub fn server_url(&self) -> String {
        format!("https://{}:{}", self.cluster_name, ELASTICSEARCH_PORT)
    }

    pub fn secret_name(&self) -> String {
        format!("{}{}", SECRET_NAME_PREFIX, self.cluster_name)
    }

    /// Primary shards per index unless the caller set `num-shards`
    pub fn default_shards(&self) -> u32 {
        self.node_count.max(0) as u32
    }

    /// Replica shards per index unless the caller set `num-replicas`
    pub fn default_replicas(&self) -> u32 {
        let layout = NodeLayout::for_node_count(self.default_shards());
        calculate_replica_shards(self.redundancy_policy, layout.data_nodes())
    }

    /// Flag keys and default values, in append order
    fn flag_defaults(&self) -> [(&'static str, String); 8] {
        [
            ("server-urls", self.server_url()),
            ("tls.enabled", "true".to_string()),
            ("tls.ca", CA_PATH.to_string()),
            ("tls.cert", CERT_PATH.to_string()),
            ("tls.key", KEY_PATH.to_string()),
            ("timeout", DEFAULT_TIMEOUT.to_string()),
            ("num-shards", self.default_shards().to_string()),
            ("num-replicas", self.default_replicas().to_string()),
        ]
    }

    /// Environment variables read by the index maintenance jobs, in append order
    fn env_defaults(&self) -> [(&'static str, String); 5] {
        [
            ("ES_SERVER_URLS", self.server_url()),
            ("ES_TLS_ENABLED", "true".to_string()),
            ("ES_TLS_CA", CA_PATH.to_string()),
            ("ES_TLS_CERT", CERT_PATH.to_string()),
            ("ES_TLS_KEY", KEY_PATH.to_string()),
        ]
    }
}

// =============================================================================
// Injectors
// =============================================================================

/// Wire every container in `pod` to the cluster through CLI flags.
///
/// The `es` flag set is always added; the `es-archive` set is added as well
/// for containers already carrying `--es-archive.enabled=true`. A flag is
/// skipped when any existing arg starts with its `--prefix.key=` form.
pub fn inject_storage_configuration(pod: &mut PodSpec, config: &StorageWiringConfig) {
    let defaults = config.flag_defaults();

    for container in pod.containers.iter_mut() {
        let args = container.args.get_or_insert_with(Vec::new);

        let mut prefixes = vec![PRIMARY_PREFIX];
        if args.iter().any(|arg| arg == ARCHIVE_ENABLED_FLAG) {
            prefixes.push(ARCHIVE_PREFIX);
        }

        let mut appended = 0usize;
        for prefix in &prefixes {
            for (key, value) in &defaults {
                let flag = format!("--{}.{}=", prefix, key);
                if !args.iter().any(|arg| arg.starts_with(&flag)) {
                    args.push(format!("{}{}", flag, value));
                    appended += 1;
                }
            }
        }

        debug!(
            container = %container.name,
            prefixes = ?prefixes,
            appended = appended,
            "Wired Elasticsearch storage flags"
        );

        ensure_certs_mount(container);
    }

    ensure_certs_volume(pod, &config.secret_name());
}

/// Wire index cleaner/rollover job containers to the cluster.
///
/// These jobs take their settings from `ES_*` environment variables; a
/// variable is skipped when the container already defines one by that name.
pub fn inject_index_job_configuration(pod: &mut PodSpec, config: &StorageWiringConfig) {
    let defaults = config.env_defaults();

    for container in pod.containers.iter_mut() {
        let env = container.env.get_or_insert_with(Vec::new);

        for (name, value) in &defaults {
            if !env.iter().any(|var| var.name == *name) {
                env.push(EnvVar {
                    name: name.to_string(),
                    value: Some(value.clone()),
                    ..Default::default()
                });
            }
        }

        ensure_certs_mount(container);
    }

    ensure_certs_volume(pod, &config.secret_name());
}

/// Add the read-only certs mount unless one with the same name exists
fn ensure_certs_mount(container: &mut Container) {
    let mounts = container.volume_mounts.get_or_insert_with(Vec::new);
    if mounts.iter().any(|m| m.name == CERTS_VOLUME_NAME) {
        return;
    }
    mounts.push(VolumeMount {
        name: CERTS_VOLUME_NAME.to_string(),
        mount_path: CERTS_MOUNT_PATH.to_string(),
        read_only: Some(true),
        ..Default::default()
    });
}

/// Add the certs volume unless one with the same name exists. An existing
/// volume keeps its secret even if `secret_name` differs.
fn ensure_certs_volume(pod: &mut PodSpec, secret_name: &str) {
    let volumes = pod.volumes.get_or_insert_with(Vec::new);
    if volumes.iter().any(|v| v.name == CERTS_VOLUME_NAME) {
        return;
    }
    volumes.push(Volume {
        name: CERTS_VOLUME_NAME.to_string(),
        secret: Some(SecretVolumeSource {
            secret_name: Some(secret_name.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    });
}
