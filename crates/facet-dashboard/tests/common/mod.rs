#![allow(dead_code)]

use facet_dashboard::datasets::{
    self, CATEGORY_TRENDS, DEVICES, ENGAGEMENT, GROWTH, INSURANCE, TRANSACTIONS,
};
use facet_dashboard::Dashboard;
use facet_model::{Scalar, Table};

fn dataset(name: &str, rows: Vec<Vec<Scalar>>) -> Table {
    let schema = datasets::dataset_schema(name).unwrap();
    Table::with_rows(name, schema, rows).unwrap()
}

pub fn transactions() -> Table {
    dataset(
        TRANSACTIONS,
        vec![
            vec!["Delhi".into(), 2023_i64.into(), 1_i64.into(), 10_i64.into(), 100.0.into()],
            vec!["Delhi".into(), 2023_i64.into(), 2_i64.into(), 20_i64.into(), 250.0.into()],
            vec!["Karnataka".into(), 2023_i64.into(), 1_i64.into(), 5_i64.into(), 50.0.into()],
            vec!["Karnataka".into(), 2024_i64.into(), 1_i64.into(), 8_i64.into(), 80.0.into()],
            vec!["Maharashtra".into(), 2024_i64.into(), 2_i64.into(), 4_i64.into(), 40.0.into()],
        ],
    )
}

pub fn devices() -> Table {
    dataset(
        DEVICES,
        vec![
            vec!["Xiaomi".into(), 300_i64.into(), 0.25.into()],
            vec!["Samsung".into(), 200_i64.into(), 0.15.into()],
            vec!["Apple".into(), 100_i64.into(), 0.05.into()],
        ],
    )
}

pub fn insurance() -> Table {
    dataset(
        INSURANCE,
        vec![
            vec!["Delhi".into(), 2023_i64.into(), 1_i64.into(), 3_i64.into(), 30.0.into()],
            vec!["Karnataka".into(), 2024_i64.into(), 1_i64.into(), 6_i64.into(), 60.0.into()],
            vec!["Maharashtra".into(), 2024_i64.into(), 2_i64.into(), 2_i64.into(), 20.0.into()],
        ],
    )
}

pub fn growth() -> Table {
    dataset(
        GROWTH,
        vec![
            vec!["Delhi".into(), 100.0.into(), 150.0.into(), 50.0.into(), 50.0.into()],
            vec!["Karnataka".into(), 200.0.into(), 220.0.into(), 20.0.into(), 10.0.into()],
            vec!["Maharashtra".into(), 50.0.into(), 100.0.into(), 50.0.into(), 100.0.into()],
        ],
    )
}

pub fn engagement() -> Table {
    dataset(
        ENGAGEMENT,
        vec![
            vec!["Delhi".into(), 1000_i64.into(), 5000_i64.into()],
            vec!["Karnataka".into(), 800_i64.into(), 2000_i64.into()],
            vec!["Maharashtra".into(), 600_i64.into(), 1200_i64.into()],
        ],
    )
}

pub fn category_trends() -> Table {
    dataset(
        CATEGORY_TRENDS,
        vec![
            vec!["Recharge".into(), 2023_i64.into(), 10.0.into()],
            vec!["Recharge".into(), 2024_i64.into(), 12.0.into()],
            vec!["Shopping".into(), 2023_i64.into(), 7.0.into()],
        ],
    )
}

pub fn fixture_tables() -> Vec<Table> {
    vec![
        transactions(),
        devices(),
        insurance(),
        growth(),
        engagement(),
        category_trends(),
    ]
}

pub fn dashboard() -> Dashboard {
    Dashboard::new(fixture_tables()).unwrap()
}
