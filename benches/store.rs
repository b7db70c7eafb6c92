// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use thalia::store::{parse_document, serialize_document};

mod fixtures;

// Benchmark identity (keep stable):
// - Group name in this file: `store.document`
// - Case IDs must remain stable across refactors (e.g. `serialize_large`,
//   `parse_large`).
fn bench_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("store.document");

    let graph = fixtures::chain_graph(1024);
    let text = serialize_document(graph.nodes(), graph.edges()).expect("serialize fixture");

    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("serialize_large", |b| {
        b.iter(|| {
            let text = serialize_document(graph.nodes(), graph.edges()).expect("serialize");
            black_box(text.len())
        });
    });

    group.bench_function("parse_large", |b| {
        b.iter(|| {
            let (nodes, edges) = parse_document(&text).expect("parse");
            black_box(nodes.len() + edges.len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_document);
criterion_main!(benches);
