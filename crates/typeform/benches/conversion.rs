// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion Benchmark
//!
//! Compares the compiled per-record pipeline against the generic recursive
//! engine, in both directions, on a nested record with collections and dates.

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use typeform::{HookRegistry, Loose, Model, ModelOptions, RecordTypeBuilder, TypeDescriptor, Value};

fn fixture() -> (HookRegistry, std::sync::Arc<Model>, Loose) {
    let line = RecordTypeBuilder::new("Line")
        .field("sku", TypeDescriptor::str())
        .field("qty", TypeDescriptor::int())
        .field("price", TypeDescriptor::float())
        .build()
        .expect("line");
    let order = RecordTypeBuilder::new("Order")
        .field("id", TypeDescriptor::int())
        .field("placed", TypeDescriptor::datetime())
        .field("lines", TypeDescriptor::list(line.descriptor()))
        .field(
            "meta",
            TypeDescriptor::map(TypeDescriptor::str(), TypeDescriptor::str()),
        )
        .field_with_default(
            "note",
            TypeDescriptor::optional(TypeDescriptor::str()),
            Value::None,
        )
        .build()
        .expect("order");

    let registry = HookRegistry::new();
    let model = Model::register_with(order, &registry, ModelOptions::default()).expect("register");

    let lines: Vec<Loose> = (0..20)
        .map(|i| json!({"sku": format!("SKU-{i}"), "qty": i, "price": f64::from(i) * 1.25}))
        .collect();
    let input = json!({
        "id": 42,
        "placed": "2024-03-01T12:00:00+00:00",
        "lines": lines,
        "meta": {"channel": "web", "region": "eu"},
    });
    (registry, model, input)
}

fn bench_structure(c: &mut Criterion) {
    let (registry, model, input) = fixture();
    let desc = model.descriptor();

    let mut group = c.benchmark_group("structure");
    group.bench_function("compiled", |b| {
        b.iter(|| model.from_loose_value(black_box(&input)).expect("compiled"));
    });
    group.bench_function("generic", |b| {
        b.iter(|| registry.structure(&desc, black_box(&input)).expect("generic"));
    });
    group.finish();
}

fn bench_unstructure(c: &mut Criterion) {
    let (registry, model, input) = fixture();
    let record = model.from_loose_value(&input).expect("record");
    let value = Value::Record(record.clone());

    let mut group = c.benchmark_group("unstructure");
    group.bench_function("compiled", |b| {
        b.iter(|| model.to_loose_value(black_box(&record)).expect("compiled"));
    });
    group.bench_function("generic", |b| {
        b.iter(|| registry.unstructure(black_box(&value)).expect("generic"));
    });
    group.finish();
}

fn bench_text(c: &mut Criterion) {
    let (_registry, model, input) = fixture();
    let record = model.from_loose_value(&input).expect("record");
    let text = model.to_text(&record).expect("text");

    c.bench_function("text_round_trip", |b| {
        b.iter(|| {
            let decoded = model.from_text(black_box(&text)).expect("from_text");
            model.to_text(&decoded).expect("to_text")
        });
    });
}

criterion_group!(benches, bench_structure, bench_unstructure, bench_text);
criterion_main!(benches);
