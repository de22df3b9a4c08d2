use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use facet_engine::{derive, DatasetRegistry, DimensionCatalogue, FilterState, ViewCache};
use facet_model::{
    ChartKind, ColumnSchema, ColumnType, GroupKey, Measure, Scalar, Table, Transform, ViewRecipe,
};

fn bench_rows() -> usize {
    std::env::var("FACET_RECOMPUTE_BENCH_ROWS")
        .ok()
        .and_then(|v| v.replace('_', "").parse::<usize>().ok())
        .filter(|&v| (10_000..=2_000_000).contains(&v))
        .unwrap_or(200_000)
}

fn build_registry(rows: usize) -> DatasetRegistry {
    let states = 30usize;
    let years = [2022i64, 2023, 2024];
    let quarters = 4usize;

    let mut table = Table::new(
        "transactions",
        vec![
            ColumnSchema::new("state_name", ColumnType::Text),
            ColumnSchema::new("year", ColumnType::Int),
            ColumnSchema::new("quarter", ColumnType::Int),
            ColumnSchema::new("total_amount", ColumnType::Number),
        ],
    )
    .unwrap();
    for i in 0..rows {
        table
            .push_row(vec![
                Scalar::Text(format!("State {:02}", i % states)),
                Scalar::Int(years[i % years.len()]),
                Scalar::Int((i % quarters) as i64 + 1),
                Scalar::Number((i % 1000) as f64),
            ])
            .unwrap();
    }

    let mut registry = DatasetRegistry::new();
    registry.register(table).unwrap();
    registry
}

fn pivot_recipe() -> ViewRecipe {
    ViewRecipe::new(
        "transactions.count_heatmap",
        "State by quarter",
        "transactions",
        Transform::Pivot {
            index: GroupKey::column("state_name"),
            columns: GroupKey::column("quarter"),
            measure: Measure::sum("total_amount"),
            fill: Scalar::Number(0.0),
        },
        ChartKind::Heatmap,
    )
    .with_dimensions(["state_name"])
}

fn period_recipe() -> ViewRecipe {
    ViewRecipe::new(
        "transactions.amount_timeline",
        "Amount over time",
        "transactions",
        Transform::Aggregate {
            keys: vec![GroupKey::period("year", "quarter")],
            measure: Measure::sum("total_amount"),
            sort: None,
        },
        ChartKind::Line,
    )
    .with_dimensions(["state_name"])
}

fn bench_recompute_views(c: &mut Criterion) {
    let rows = bench_rows();
    let registry = build_registry(rows);
    let dimensions = DimensionCatalogue::build(&registry, ["state_name"]);

    // Keep most states selected: filtering cost without much row reduction.
    let mut filtered = FilterState::new();
    let keep: Vec<Scalar> = dimensions
        .scalar_values("state_name")
        .unwrap()
        .into_iter()
        .take(28)
        .collect();
    filtered.set(&dimensions, "state_name", keep).unwrap();

    let mut group = c.benchmark_group("recompute_views");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Elements(rows as u64));

    group.bench_with_input(BenchmarkId::new("pivot_unfiltered", rows), &rows, |b, _| {
        let recipe = pivot_recipe();
        b.iter(|| {
            let table = derive(&registry, &FilterState::new(), &recipe).unwrap();
            black_box(table);
        })
    });

    group.bench_with_input(
        BenchmarkId::new("pivot_filtered_keep_most", rows),
        &rows,
        |b, _| {
            let recipe = pivot_recipe();
            b.iter(|| {
                let table = derive(&registry, &filtered, &recipe).unwrap();
                black_box(table);
            })
        },
    );

    group.bench_with_input(
        BenchmarkId::new("period_aggregate", rows),
        &rows,
        |b, _| {
            let recipe = period_recipe();
            b.iter(|| {
                let table = derive(&registry, &filtered, &recipe).unwrap();
                black_box(table);
            })
        },
    );

    group.bench_with_input(BenchmarkId::new("cache_hit", rows), &rows, |b, _| {
        let recipe = pivot_recipe();
        let mut cache = ViewCache::new();
        cache
            .get_or_recompute(&registry, &filtered, &recipe, None)
            .unwrap();
        b.iter(|| {
            let view = cache
                .get_or_recompute(&registry, &filtered, &recipe, None)
                .unwrap();
            black_box(view.table.row_count());
        })
    });

    group.finish();
}

criterion_group!(benches, bench_recompute_views);
criterion_main!(benches);
