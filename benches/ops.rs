// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use thalia::model::{DialogueData, IdMinter, NodeData};
use thalia::ops::{apply_ops, GraphOp};

mod fixtures;

// Benchmark identity (keep stable):
// - Group names in this file: `ops.apply`, `ids.mint`
// - Case IDs must remain stable across refactors so results stay comparable
//   over time (e.g. `small`, `large`).
fn update_ops(node_count: usize) -> Vec<GraphOp> {
    (0..node_count)
        .map(|index| GraphOp::UpdateNodeData {
            node_id: fixtures::node_id(index),
            data: NodeData::Dialogue(DialogueData::new(
                format!("Speaker {index}"),
                "rewritten line",
            )),
        })
        .collect()
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("ops.apply");

    for (case, node_count) in [("small", 32usize), ("large", 1024usize)] {
        let graph = fixtures::chain_graph(node_count);
        // Updates address the dialogue nodes only; choice-node updates are
        // kind mismatches and would degrade to no-ops.
        let ops = update_ops(node_count)
            .into_iter()
            .enumerate()
            .filter(|(index, _)| index % 4 != 3)
            .map(|(_, op)| op)
            .collect::<Vec<_>>();

        group.throughput(Throughput::Elements(ops.len() as u64));
        group.bench_function(case, |b| {
            b.iter_batched(
                || graph.clone(),
                |mut graph| {
                    let delta = apply_ops(&mut graph, &ops);
                    black_box(delta.updated.len())
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_mint(c: &mut Criterion) {
    let mut group = c.benchmark_group("ids.mint");
    group.throughput(Throughput::Elements(1024));
    group.bench_function("node_ids_1024", |b| {
        b.iter_batched(
            IdMinter::new,
            |mut minter| {
                let mut acc = 0usize;
                for _ in 0..1024 {
                    acc = acc.wrapping_add(minter.node_id().as_str().len());
                }
                black_box(acc)
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_apply, bench_mint);
criterion_main!(benches);
