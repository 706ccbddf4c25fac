//! Benchmarks for path template substitution
//!
//! This benchmark measures:
//! - Placeholder extraction from templates
//! - Typed parameter substitution (scalar, camelCase, multi-placeholder)

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde::Serialize;

use typed_api_client::api::todos::{TodoById, TodoId, TodosByUser, UserId};
use typed_api_client::schema::{fill_path, placeholders, ApiPath};

#[derive(Serialize)]
struct Nested {
    org: String,
    project: u64,
    item: u64,
}

const NESTED: &str = "/orgs/{org}/projects/{project}/items/{item}";

fn bench_placeholders(c: &mut Criterion) {
    c.bench_function("placeholders_nested", |b| {
        b.iter(|| placeholders(black_box(NESTED)))
    });
}

fn bench_fill_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_path");

    group.bench_function("single", |b| {
        let params = TodoId { id: 7 };
        b.iter(|| fill_path(black_box(TodoById::TEMPLATE), black_box(&params)).unwrap())
    });

    group.bench_function("camel_case", |b| {
        let params = UserId { user_id: 152 };
        b.iter(|| fill_path(black_box(TodosByUser::TEMPLATE), black_box(&params)).unwrap())
    });

    group.bench_function("three_params", |b| {
        let params = Nested {
            org: "acme".into(),
            project: 42,
            item: 9001,
        };
        b.iter(|| fill_path(black_box(NESTED), black_box(&params)).unwrap())
    });

    group.bench_function("no_params", |b| {
        b.iter(|| fill_path(black_box("/todos/random"), black_box(&())).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_placeholders, bench_fill_path);
criterion_main!(benches);
