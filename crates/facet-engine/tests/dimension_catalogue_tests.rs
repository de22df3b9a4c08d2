mod common;

use common::{int_col, num_col, registry_with, text_col};
use facet_engine::{DimensionCatalogue, EngineError};
use facet_model::{Scalar, ScalarKey, Table};
use pretty_assertions::assert_eq;

fn transactions() -> Table {
    Table::with_rows(
        "transactions",
        vec![text_col("state_name"), int_col("year"), num_col("total_amount")],
        vec![
            vec!["Kerala".into(), 2023_i64.into(), 10.0.into()],
            vec!["Goa".into(), 2023_i64.into(), 20.0.into()],
            vec![Scalar::Null, 2023_i64.into(), 30.0.into()],
            vec!["Kerala".into(), 2024_i64.into(), 40.0.into()],
        ],
    )
    .unwrap()
}

fn insurance() -> Table {
    Table::with_rows(
        "insurance",
        vec![text_col("state_name"), num_col("total_value")],
        vec![
            vec!["Punjab".into(), 1.5.into()],
            vec!["Goa".into(), 2.5.into()],
        ],
    )
    .unwrap()
}

fn devices() -> Table {
    Table::with_rows(
        "devices",
        vec![text_col("brand"), num_col("avg_percentage_usage")],
        vec![vec!["Xiaomi".into(), 0.25.into()]],
    )
    .unwrap()
}

fn keys(values: &[&str]) -> Vec<ScalarKey> {
    values.iter().map(|v| Scalar::from(*v).to_key()).collect()
}

#[test]
fn values_are_the_sorted_null_free_union_across_tables() {
    let registry = registry_with(vec![transactions(), insurance(), devices()]);
    let catalogue = DimensionCatalogue::build(&registry, ["state_name"]);

    assert_eq!(
        catalogue.values("state_name").unwrap(),
        keys(&["Goa", "Kerala", "Punjab"]).as_slice()
    );
}

#[test]
fn registration_order_does_not_change_the_catalogue() {
    let forwards = registry_with(vec![transactions(), insurance()]);
    let backwards = registry_with(vec![insurance(), transactions()]);

    let a = DimensionCatalogue::build(&forwards, ["state_name"]);
    let b = DimensionCatalogue::build(&backwards, ["state_name"]);
    assert_eq!(a.values("state_name").unwrap(), b.values("state_name").unwrap());
}

#[test]
fn tables_without_the_column_are_skipped() {
    let registry = registry_with(vec![devices(), transactions()]);
    let catalogue = DimensionCatalogue::build(&registry, ["state_name"]);

    // Only the transactions states; the devices table contributes nothing.
    assert_eq!(
        catalogue.values("state_name").unwrap(),
        keys(&["Goa", "Kerala"]).as_slice()
    );
}

#[test]
fn dimension_no_table_has_is_kept_empty() {
    let registry = registry_with(vec![devices()]);
    let catalogue = DimensionCatalogue::build(&registry, ["state_name"]);
    assert_eq!(catalogue.values("state_name").unwrap(), &[]);
}

#[test]
fn unknown_dimension_is_an_error() {
    let registry = registry_with(vec![transactions()]);
    let catalogue = DimensionCatalogue::build(&registry, ["state_name"]);
    let err = catalogue.values("district").unwrap_err();
    assert!(matches!(err, EngineError::UnknownDimension(ref d) if d == "district"));
}

#[test]
fn contains_checks_membership() {
    let registry = registry_with(vec![transactions()]);
    let catalogue = DimensionCatalogue::build(&registry, ["state_name", "year"]);

    assert!(catalogue
        .contains("state_name", &Scalar::from("Kerala").to_key())
        .unwrap());
    assert!(!catalogue
        .contains("state_name", &Scalar::from("Sikkim").to_key())
        .unwrap());
    assert!(catalogue.contains("year", &Scalar::Int(2024).to_key()).unwrap());
}

#[test]
fn int_valued_dimension_values_sort_numerically() {
    let registry = registry_with(vec![transactions()]);
    let catalogue = DimensionCatalogue::build(&registry, ["year"]);
    assert_eq!(
        catalogue.values("year").unwrap(),
        &[ScalarKey::Int(2023), ScalarKey::Int(2024)]
    );
}
