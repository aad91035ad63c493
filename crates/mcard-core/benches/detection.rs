//! Benchmarks for detection and hashing hot paths.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use mcard_core::{ContentTypeInterpreter, DetectorRegistry, MCard, compute_hash, detect_content_type};

const SAMPLES: &[(&str, &str)] = &[
    ("json", r#"{"name": "demo", "tags": ["a", "b"], "nested": {"ok": true}}"#),
    ("python", "import os\n\ndef main():\n    print(os.getcwd())\n\nif __name__ == \"__main__\":\n    main()\n"),
    ("markdown", "# Title\n\nIntro.\n\n- one\n- two\n\n```\ncode\n```\n"),
    ("csv", "id,name,city\n1,alice,paris\n2,bob,berlin\n3,carol,rome\n"),
    ("xml", "<?xml version=\"1.0\"?>\n<root><item>1</item></root>\n"),
    ("prose", "Just a few sentences of ordinary prose. Nothing to see here.\n"),
];

fn bench_detect_content_type(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_content_type");
    for (name, text) in SAMPLES {
        group.bench_with_input(BenchmarkId::new("text", name), text, |b, t| {
            b.iter(|| detect_content_type(black_box(*t), None))
        });
    }

    let png: Vec<u8> = b"\x89PNG\r\n\x1a\n"
        .iter()
        .copied()
        .chain((0..8192u32).map(|i| (i % 251) as u8))
        .collect();
    group.bench_function("bytes/png_8k", |b| {
        b.iter(|| detect_content_type(black_box(png.as_slice()), None))
    });
    group.finish();
}

fn bench_registry_construction(c: &mut Criterion) {
    c.bench_function("DetectorRegistry::with_builtin", |b| {
        b.iter(DetectorRegistry::with_builtin)
    });
}

fn bench_binary_heuristics(c: &mut Criterion) {
    let interpreter = ContentTypeInterpreter::default();
    let noise: Vec<u8> = (0..32 * 1024u32).map(|i| (i * 31 % 256) as u8).collect();
    c.bench_function("is_unstructured_binary/32k", |b| {
        b.iter(|| interpreter.is_unstructured_binary(black_box(&noise)))
    });
}

fn bench_hashing(c: &mut Criterion) {
    let content = vec![b'a'; 64 * 1024];
    let mut group = c.benchmark_group("compute_hash");
    for algorithm in ["sha1", "sha256", "sha512"] {
        group.bench_with_input(BenchmarkId::new("64k", algorithm), algorithm, |b, a| {
            b.iter(|| compute_hash(black_box(&content), a))
        });
    }
    group.finish();

    c.bench_function("MCard::create/64k", |b| {
        b.iter(|| MCard::create(black_box(&content), "sha256"))
    });
}

criterion_group!(
    benches,
    bench_detect_content_type,
    bench_registry_construction,
    bench_binary_heuristics,
    bench_hashing
);
criterion_main!(benches);
