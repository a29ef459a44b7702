//! Offline Rendering
//!
//! Loads Jaeger and PodSpec documents from YAML and renders the storage
//! manifests as YAML or JSON. Used by the CLI to preview what the operator
//! would apply.

use k8s_openapi::api::core::v1::PodSpec;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::crd::Jaeger;
use crate::error::{Error, Result};
use crate::storage::ElasticsearchDeployment;

/// Read a YAML document from a file, or stdin when `path` is `-`
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    parse_document(&content)
}

pub fn parse_document<T: DeserializeOwned>(content: &str) -> Result<T> {
    Ok(serde_yaml::from_str(content)?)
}

/// Output encoding for rendered documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::Configuration(format!(
                "unknown output format '{}', expected yaml or json",
                other
            ))),
        }
    }
}

fn encode<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// Ensure the Jaeger instance asks for Elasticsearch storage
fn elasticsearch_storage(jaeger: &Jaeger) -> Result<ElasticsearchDeployment<'_>> {
    if !jaeger.uses_elasticsearch() {
        return Err(Error::Configuration(format!(
            "storage type '{}' is not elasticsearch",
            jaeger.spec.storage.r#type
        )));
    }
    Ok(ElasticsearchDeployment::new(jaeger))
}

/// Render the Elasticsearch manifest for a Jaeger instance
pub fn render_manifest(jaeger: &Jaeger, format: OutputFormat) -> Result<String> {
    let es = elasticsearch_storage(jaeger)?.elasticsearch()?;
    info!(
        namespace = es.metadata.namespace.as_deref().unwrap_or_default(),
        groups = es.spec.nodes.len(),
        "Rendered Elasticsearch manifest"
    );
    encode(&es, format)
}

/// Render `pod` wired to the Jaeger instance's Elasticsearch cluster
pub fn render_injected_pod(
    jaeger: &Jaeger,
    mut pod: PodSpec,
    index_job: bool,
    format: OutputFormat,
) -> Result<String> {
    let deployment = elasticsearch_storage(jaeger)?;
    if index_job {
        deployment.inject_index_job_configuration(&mut pod);
    } else {
        deployment.inject_storage_configuration(&mut pod);
    }
    info!(
        containers = pod.containers.len(),
        index_job = index_job,
        "Rendered wired pod spec"
    );
    encode(&pod, format)
}
