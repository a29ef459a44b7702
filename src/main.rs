//! Jaeger Storage Operator
//!
//! Renders the Elasticsearch manifest for a Jaeger resource, or a pod spec
//! wired to that cluster, without talking to a Kubernetes API server.

use anyhow::Context;
use clap::{Parser, Subcommand};
use k8s_openapi::api::core::v1::PodSpec;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jaeger_storage_operator::render::{
    read_document, render_injected_pod, render_manifest, OutputFormat,
};
use jaeger_storage_operator::Jaeger;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Jaeger Storage Operator - Elasticsearch provisioning for Jaeger
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output format for rendered documents (yaml, json)
    #[arg(long, short, global = true, default_value = "yaml")]
    output: OutputFormat,

    /// Output logs as JSON
    #[arg(long, global = true, env = "LOG_JSON")]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the Elasticsearch manifest for a Jaeger resource
    Manifest {
        /// Jaeger resource YAML ("-" for stdin)
        #[arg(long)]
        jaeger: PathBuf,
    },
    /// Print a pod spec wired to the Jaeger resource's Elasticsearch cluster
    Inject {
        /// Jaeger resource YAML ("-" for stdin)
        #[arg(long)]
        jaeger: PathBuf,

        /// PodSpec YAML ("-" for stdin)
        #[arg(long)]
        pod: PathBuf,

        /// Wire an index maintenance job through env vars instead of flags
        #[arg(long)]
        index_job: bool,
    },
}

// =============================================================================
// Main
// =============================================================================

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("Starting Jaeger Storage Operator");
    info!("  Version: {}", jaeger_storage_operator::VERSION);

    let output = match &args.command {
        Command::Manifest { jaeger } => {
            let jaeger: Jaeger = read_document(jaeger)
                .with_context(|| format!("loading Jaeger from {}", jaeger.display()))?;
            render_manifest(&jaeger, args.output)?
        }
        Command::Inject {
            jaeger,
            pod,
            index_job,
        } => {
            if jaeger.as_os_str() == "-" && pod.as_os_str() == "-" {
                anyhow::bail!("--jaeger and --pod cannot both read from stdin");
            }
            let jaeger: Jaeger = read_document(jaeger)
                .with_context(|| format!("loading Jaeger from {}", jaeger.display()))?;
            let pod: PodSpec = read_document(pod)
                .with_context(|| format!("loading PodSpec from {}", pod.display()))?;
            render_injected_pod(&jaeger, pod, *index_job, args.output)?
        }
    };

    print!("{}", output);
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout carries the rendered document
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
