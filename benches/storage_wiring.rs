//! Benchmark for manifest building and storage wiring
//!
//! Both run on every reconcile of every Jaeger instance.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use jaeger_storage_operator::crd::{ElasticsearchSpec, Jaeger, JaegerSpec, RedundancyPolicy};
use jaeger_storage_operator::storage::{
    build_manifest, inject_storage_configuration, StorageWiringConfig,
};
use k8s_openapi::api::core::v1::{Container, PodSpec};

fn bench_build_manifest(c: &mut Criterion) {
    let mut group = c.benchmark_group("manifest");
    group.throughput(Throughput::Elements(1));

    let mut jaeger = Jaeger::new("simple-prod", JaegerSpec::default());
    jaeger.metadata.namespace = Some("observability".into());
    jaeger.spec.storage.elasticsearch = ElasticsearchSpec {
        node_count: 12,
        redundancy_policy: RedundancyPolicy::Multiple,
        ..Default::default()
    };

    group.bench_function("build_split_manifest", |b| {
        b.iter(|| build_manifest(black_box(&jaeger)));
    });

    group.finish();
}

fn bench_inject(c: &mut Criterion) {
    let mut group = c.benchmark_group("storage_wiring");

    let config = StorageWiringConfig {
        cluster_name: "elasticsearch".into(),
        node_count: 5,
        redundancy_policy: RedundancyPolicy::Full,
    };
    let pod = PodSpec {
        containers: (0..4)
            .map(|i| Container {
                name: format!("jaeger-{}", i),
                args: Some(vec![
                    "--es-archive.enabled=true".into(),
                    "--es.timeout=30s".into(),
                ]),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    group.throughput(Throughput::Elements(pod.containers.len() as u64));

    group.bench_function("inject_fresh_pod", |b| {
        b.iter(|| {
            let mut pod = pod.clone();
            inject_storage_configuration(black_box(&mut pod), &config);
            pod
        });
    });

    let mut wired = pod.clone();
    inject_storage_configuration(&mut wired, &config);
    group.bench_function("inject_already_wired_pod", |b| {
        b.iter(|| {
            let mut pod = wired.clone();
            inject_storage_configuration(black_box(&mut pod), &config);
            pod
        });
    });

    group.finish();
}

criterion_group!(benches, bench_build_manifest, bench_inject);
criterion_main!(benches);
