//! Elasticsearch Manifest Builder
//!
//! Builds the Elasticsearch custom resource for a Jaeger instance. The
//! manifest is rebuilt from scratch on every call; the external operator
//! diffs it against the live object.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::Resource;
use std::collections::BTreeMap;
use tracing::debug;

use super::topology::Topology;
use crate::crd::{
    Elasticsearch, ElasticsearchClusterSpec, ElasticsearchNodeSpec, Jaeger, ManagementState,
    OwnerIdentity,
};
use crate::error::Result;

/// Name of the Elasticsearch resource; one cluster per Jaeger instance
pub const ELASTICSEARCH_NAME: &str = "elasticsearch";

/// Build the Elasticsearch manifest owned by `jaeger`.
pub fn build_manifest(jaeger: &Jaeger) -> Result<Elasticsearch> {
    let owner = jaeger.owner_identity()?;
    let request = jaeger.elasticsearch();
    let topology = Topology::plan(&owner, request)?;

    let spec = ElasticsearchClusterSpec {
        management_state: ManagementState::Managed,
        redundancy_policy: request.redundancy_policy,
        node_spec: ElasticsearchNodeSpec {
            tolerations: request.tolerations.clone(),
            node_selector: request.node_selector.clone(),
            resources: request.resources.clone(),
        },
        nodes: topology.into_nodes(),
    };

    let mut es = Elasticsearch::new(ELASTICSEARCH_NAME, spec);
    es.metadata.namespace = Some(owner.namespace.clone());
    es.metadata.labels = Some(standard_labels(&owner));
    es.metadata.owner_references = Some(vec![owner_reference(jaeger, &owner)]);

    debug!(
        namespace = %owner.namespace,
        owner = %owner.name,
        groups = es.spec.nodes.len(),
        nodes = es.spec.total_nodes(),
        redundancy = %es.spec.redundancy_policy,
        "Built Elasticsearch manifest"
    );

    Ok(es)
}

/// Controller reference back to the owning Jaeger instance
pub fn owner_reference(jaeger: &Jaeger, owner: &OwnerIdentity) -> OwnerReference {
    OwnerReference {
        api_version: Jaeger::api_version(&()).to_string(),
        kind: Jaeger::kind(&()).to_string(),
        name: owner.name.clone(),
        uid: jaeger.metadata.uid.clone().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

/// Labels identifying the cluster as part of a Jaeger instance
pub fn standard_labels(owner: &OwnerIdentity) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(
        "app.kubernetes.io/name".to_string(),
        ELASTICSEARCH_NAME.to_string(),
    );
    labels.insert("app.kubernetes.io/instance".to_string(), owner.name.clone());
    labels.insert("app.kubernetes.io/part-of".to_string(), "jaeger".to_string());
    labels.insert(
        "app.kubernetes.io/managed-by".to_string(),
        "jaeger-operator".to_string(),
    );
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{
        ElasticsearchSpec, ElasticsearchStorageSpec, JaegerSpec, JaegerStorageSpec, NodeRole,
        RedundancyPolicy,
    };
    use crate::error::Error;
    use crate::storage::topology::generated_id;
    use assert_matches::assert_matches;
    use k8s_openapi::api::core::v1::Toleration;

    fn jaeger(namespace: &str, name: &str, es: ElasticsearchSpec) -> Jaeger {
        let mut jaeger = Jaeger::new(
            name,
            JaegerSpec {
                storage: JaegerStorageSpec {
                    elasticsearch: es,
                    ..Default::default()
                },
            },
        );
        jaeger.metadata.namespace = Some(namespace.into());
        jaeger
    }

    fn request(node_count: i32) -> ElasticsearchSpec {
        ElasticsearchSpec {
            node_count,
            redundancy_policy: RedundancyPolicy::Full,
            storage: ElasticsearchStorageSpec {
                storage_class_name: Some("floppydisk".into()),
                size: None,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_small_cluster_manifest() {
        let es = build_manifest(&jaeger("myproject", "foo", request(2))).unwrap();

        assert_eq!(es.metadata.namespace.as_deref(), Some("myproject"));
        assert_eq!(es.metadata.name.as_deref(), Some("elasticsearch"));
        assert_eq!(es.spec.management_state, ManagementState::Managed);
        assert_eq!(es.spec.redundancy_policy, RedundancyPolicy::Full);
        assert_eq!(es.spec.node_spec, ElasticsearchNodeSpec::default());

        assert_eq!(es.spec.nodes.len(), 1);
        let node = &es.spec.nodes[0];
        assert_eq!(node.node_count, 2);
        assert_eq!(node.storage.storage_class_name.as_deref(), Some("floppydisk"));
        assert!(node.has_role(NodeRole::Master));
        assert_eq!(
            node.gen_uuid.as_deref(),
            Some(generated_id("myproject", "foo", None).as_str())
        );
    }

    #[test]
    fn test_split_cluster_manifest() {
        let es = build_manifest(&jaeger("myproject", "foo", request(5))).unwrap();

        let counts: Vec<i32> = es.spec.nodes.iter().map(|n| n.node_count).collect();
        assert_eq!(counts, vec![3, 2]);
        assert_eq!(es.spec.total_nodes(), 5);
        assert_eq!(es.spec.data_nodes(), 5);
        assert!(es.spec.nodes[0].has_role(NodeRole::Master));
        assert!(!es.spec.nodes[1].has_role(NodeRole::Master));
        assert_ne!(es.spec.nodes[0].gen_uuid, es.spec.nodes[1].gen_uuid);
    }

    #[test]
    fn test_owner_reference() {
        for (namespace, name) in [
            ("myproject", "foo"),
            ("myproje&ct", "foo-ba%r"),
            ("mytolerableproject", "tolerations"),
        ] {
            let es = build_manifest(&jaeger(namespace, name, request(5))).unwrap();
            let refs = es.metadata.owner_references.as_ref().unwrap();

            assert_eq!(refs.len(), 1);
            assert_eq!(refs[0].name, name);
            assert_eq!(refs[0].controller, Some(true));
            assert_eq!(refs[0].kind, "Jaeger");
            assert_eq!(refs[0].api_version, "jaegertracing.io/v1");
            assert_eq!(es.metadata.namespace.as_deref(), Some(namespace));
        }
    }

    #[test]
    fn test_owner_uid_is_carried() {
        let mut owner = jaeger("observability", "prod", request(1));
        owner.metadata.uid = Some("3f1c0a52".into());

        let es = build_manifest(&owner).unwrap();
        let refs = es.metadata.owner_references.unwrap();
        assert_eq!(refs[0].uid, "3f1c0a52");
        assert_eq!(refs[0].block_owner_deletion, Some(true));
    }

    #[test]
    fn test_tolerations_pass_through() {
        let toleration = Toleration {
            key: Some("special".into()),
            operator: Some("Equal".into()),
            value: Some("false".into()),
            effect: Some("NoSchedule".into()),
            ..Default::default()
        };
        let mut es_spec = request(2);
        es_spec.tolerations = vec![toleration.clone()];

        let es = build_manifest(&jaeger("mytolerableproject", "tolerations", es_spec)).unwrap();
        assert_eq!(es.spec.node_spec.tolerations, vec![toleration]);
        assert_eq!(es.spec.nodes.len(), 1);
    }

    #[test]
    fn test_manifest_is_deterministic() {
        let owner = jaeger("myproject", "foo", request(7));
        let first = build_manifest(&owner).unwrap();
        let second = build_manifest(&owner).unwrap();

        assert_eq!(first.spec, second.spec);
        assert_eq!(first.metadata, second.metadata);
    }

    #[test]
    fn test_labels() {
        let es = build_manifest(&jaeger("myproject", "foo", request(1))).unwrap();
        let labels = es.metadata.labels.unwrap();
        assert_eq!(labels["app.kubernetes.io/instance"], "foo");
        assert_eq!(labels["app.kubernetes.io/part-of"], "jaeger");
    }

    #[test]
    fn test_invalid_requests() {
        let negative = jaeger("myproject", "foo", request(-2));
        assert_matches!(build_manifest(&negative), Err(Error::InvalidArgument(_)));

        let mut unnamed = jaeger("myproject", "foo", request(1));
        unnamed.metadata.name = None;
        assert_matches!(build_manifest(&unnamed), Err(Error::MissingField { .. }));
    }
}
