mod common;

use common::{dashboard, fixture_tables};
use facet_dashboard::datasets::{self, TRANSACTIONS};
use facet_dashboard::{load_dataset, Dashboard};
use facet_engine::{CacheStats, EngineError, RecomputeBudget};
use facet_model::{Scalar, Table};
use pretty_assertions::assert_eq;

#[test]
fn startup_builds_and_validates_the_catalogue() {
    let board = dashboard();
    let ids = board.view_ids();
    assert_eq!(ids.len(), 19);
    assert_eq!(ids[0], "transactions.amount_by_year");
    assert_eq!(ids[18], "overview.activity_timeline");

    assert_eq!(
        board.dimension_values("state_name").unwrap(),
        vec![
            Scalar::from("Delhi"),
            Scalar::from("Karnataka"),
            Scalar::from("Maharashtra"),
        ]
    );
    assert_eq!(
        board.dimension_values("category_name").unwrap(),
        vec![Scalar::from("Recharge"), Scalar::from("Shopping")]
    );
    assert!(matches!(
        board.dimension_values("brand"),
        Err(EngineError::UnknownDimension(ref d)) if d == "brand"
    ));
}

#[test]
fn startup_fails_when_a_dataset_misses_a_column() {
    // Rebuild transactions without the amount column the first view sums.
    let schema = datasets::dataset_schema(TRANSACTIONS)
        .unwrap()
        .into_iter()
        .filter(|c| c.name != "total_amount")
        .collect();
    let narrowed = Table::with_rows(
        TRANSACTIONS,
        schema,
        vec![vec!["Delhi".into(), 2023_i64.into(), 1_i64.into(), 10_i64.into()]],
    )
    .unwrap();
    let tables = fixture_tables()
        .into_iter()
        .map(|t| if t.name() == TRANSACTIONS { narrowed.clone() } else { t })
        .collect();

    let err = Dashboard::new(tables).unwrap_err();
    match err {
        EngineError::SchemaMismatch {
            recipe,
            table,
            column,
        } => {
            assert_eq!(recipe, "transactions.amount_by_year");
            assert_eq!(table, "transactions");
            assert_eq!(column, "total_amount");
        }
        other => panic!("expected a schema mismatch, got {other}"),
    }
}

#[test]
fn render_all_returns_every_view_in_declaration_order() {
    let mut board = dashboard();
    let payloads = board.render_all().unwrap();
    let ids: Vec<&str> = payloads.iter().map(|p| p.recipe_id.as_str()).collect();
    assert_eq!(ids, board.view_ids());
    assert_eq!(board.cache_stats(), CacheStats { hits: 0, misses: 19 });
    for payload in &payloads {
        assert!(!payload.columns.is_empty(), "{}", payload.recipe_id);
    }
}

#[test]
fn amount_by_year_collapses_quarters_per_state() {
    let mut board = dashboard();
    let payload = board.view("transactions.amount_by_year").unwrap();
    assert_eq!(payload.columns, vec!["year", "state_name", "total_amount"]);
    assert_eq!(
        payload.rows,
        vec![
            vec![Scalar::from(2023_i64), Scalar::from("Delhi"), Scalar::from(350.0)],
            vec![Scalar::from(2023_i64), Scalar::from("Karnataka"), Scalar::from(50.0)],
            vec![Scalar::from(2024_i64), Scalar::from("Karnataka"), Scalar::from(80.0)],
            vec![Scalar::from(2024_i64), Scalar::from("Maharashtra"), Scalar::from(40.0)],
        ]
    );
}

#[test]
fn state_filter_narrows_views_and_reset_restores_them() {
    let mut board = dashboard();
    board
        .set_filter("state_name", [Scalar::from("Delhi")])
        .unwrap();

    let amounts = board.view("transactions.amount_by_year").unwrap();
    assert_eq!(
        amounts.rows,
        vec![vec![Scalar::from(2023_i64), Scalar::from("Delhi"), Scalar::from(350.0)]]
    );
    let policies = board.view("insurance.policies_by_year").unwrap();
    assert_eq!(
        policies.rows,
        vec![vec![Scalar::from(2023_i64), Scalar::from("Delhi"), Scalar::from(3.0)]]
    );

    board.reset_filter("state_name").unwrap();
    let amounts = board.view("transactions.amount_by_year").unwrap();
    assert_eq!(amounts.rows.len(), 4);
    assert_eq!(
        amounts.rows[0],
        vec![Scalar::from(2023_i64), Scalar::from("Delhi"), Scalar::from(350.0)]
    );
}

#[test]
fn rejected_filter_values_leave_the_selection_in_place() {
    let mut board = dashboard();
    board
        .set_filter("state_name", [Scalar::from("Delhi")])
        .unwrap();

    let err = board
        .set_filter(
            "state_name",
            [Scalar::from("Karnataka"), Scalar::from("Atlantis")],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidFilterValue { ref dimension, .. } if dimension == "state_name"
    ));

    assert_eq!(
        board.selection("state_name"),
        Some(vec![Scalar::from("Delhi")])
    );
    let amounts = board.view("transactions.amount_by_year").unwrap();
    assert_eq!(
        amounts.rows,
        vec![vec![Scalar::from(2023_i64), Scalar::from("Delhi"), Scalar::from(350.0)]]
    );
}

#[test]
fn empty_selection_renders_empty_tables_not_errors() {
    let mut board = dashboard();
    board
        .set_filter("state_name", std::iter::empty())
        .unwrap();

    let amounts = board.view("transactions.amount_by_year").unwrap();
    assert_eq!(amounts.columns, vec!["year", "state_name", "total_amount"]);
    assert!(amounts.rows.is_empty());

    // Views that never listen to state_name keep their full grids.
    let brands = board.view("devices.users_by_brand").unwrap();
    assert_eq!(brands.rows.len(), 3);

    let payloads = board.render_all().unwrap();
    assert_eq!(payloads.len(), 19);
}

#[test]
fn views_without_the_changed_dimension_are_served_from_cache() {
    let mut board = dashboard();
    board.render_all().unwrap();
    let brands_before = board.view("devices.users_by_brand").unwrap();

    board
        .set_filter("state_name", [Scalar::from("Delhi")])
        .unwrap();
    board.render_all().unwrap();

    // Four devices views plus the category trend keep their fingerprints;
    // the fourteen state-scoped views recompute. One hit extra from the
    // explicit devices read above.
    assert_eq!(board.cache_stats(), CacheStats { hits: 6, misses: 33 });
    let brands_after = board.view("devices.users_by_brand").unwrap();
    assert_eq!(brands_after, brands_before);
}

#[test]
fn heatmap_fills_absent_state_quarter_cells() {
    let mut board = dashboard();
    let payload = board.view("transactions.count_heatmap").unwrap();
    assert_eq!(payload.columns, vec!["state_name", "1", "2"]);
    assert_eq!(
        payload.rows,
        vec![
            vec![Scalar::from("Delhi"), Scalar::from(10.0), Scalar::from(20.0)],
            vec![Scalar::from("Karnataka"), Scalar::from(13.0), Scalar::from(0.0)],
            vec![Scalar::from("Maharashtra"), Scalar::from(0.0), Scalar::from(4.0)],
        ]
    );
}

#[test]
fn usage_tiers_order_by_bin_not_alphabet() {
    let mut board = dashboard();
    let payload = board.view("devices.usage_tier_sunburst").unwrap();
    assert_eq!(
        payload.columns,
        vec!["usage_tier", "brand", "total_registered_users"]
    );
    assert_eq!(
        payload.rows,
        vec![
            vec![Scalar::from("Low"), Scalar::from("Apple"), Scalar::from(100.0)],
            vec![Scalar::from("Medium"), Scalar::from("Samsung"), Scalar::from(200.0)],
            vec![Scalar::from("High"), Scalar::from("Xiaomi"), Scalar::from(300.0)],
        ]
    );
}

#[test]
fn activity_timeline_unions_transactions_and_insurance() {
    let mut board = dashboard();
    let payload = board.view("overview.activity_timeline").unwrap();
    assert_eq!(payload.columns, vec!["period", "series", "value"]);
    assert_eq!(
        payload.rows,
        vec![
            vec![Scalar::from("2023-Q1"), Scalar::from("Insurance"), Scalar::from(30.0)],
            vec![Scalar::from("2023-Q1"), Scalar::from("Transactions"), Scalar::from(150.0)],
            vec![Scalar::from("2023-Q2"), Scalar::from("Transactions"), Scalar::from(250.0)],
            vec![Scalar::from("2024-Q1"), Scalar::from("Insurance"), Scalar::from(60.0)],
            vec![Scalar::from("2024-Q1"), Scalar::from("Transactions"), Scalar::from(80.0)],
            vec![Scalar::from("2024-Q2"), Scalar::from("Insurance"), Scalar::from(20.0)],
            vec![Scalar::from("2024-Q2"), Scalar::from("Transactions"), Scalar::from(40.0)],
        ]
    );

    board
        .set_filter("state_name", [Scalar::from("Maharashtra")])
        .unwrap();
    let payload = board.view("overview.activity_timeline").unwrap();
    assert_eq!(
        payload.rows,
        vec![
            vec![Scalar::from("2024-Q2"), Scalar::from("Insurance"), Scalar::from(20.0)],
            vec![Scalar::from("2024-Q2"), Scalar::from("Transactions"), Scalar::from(40.0)],
        ]
    );
}

#[test]
fn row_budget_applies_per_view_after_filtering() {
    let mut board = Dashboard::new(fixture_tables())
        .unwrap()
        .with_budget(RecomputeBudget::new(3));

    let err = board.view("transactions.amount_by_year").unwrap_err();
    match err {
        EngineError::BudgetExceeded { recipe, rows, limit } => {
            assert_eq!(recipe, "transactions.amount_by_year");
            assert_eq!(rows, 5);
            assert_eq!(limit, 3);
        }
        other => panic!("expected a budget error, got {other}"),
    }

    // The three-row devices table fits as-is.
    assert!(board.view("devices.users_by_brand").is_ok());

    // Filtering brings transactions under the budget.
    board
        .set_filter("state_name", [Scalar::from("Delhi")])
        .unwrap();
    let payload = board.view("transactions.amount_by_year").unwrap();
    assert_eq!(
        payload.rows,
        vec![vec![Scalar::from(2023_i64), Scalar::from("Delhi"), Scalar::from(350.0)]]
    );
}

#[test]
fn unknown_views_and_dimensions_are_reported() {
    let mut board = dashboard();
    assert!(matches!(
        board.view("transactions.nope"),
        Err(EngineError::UnknownRecipe(ref id)) if id == "transactions.nope"
    ));
    assert!(matches!(
        board.set_filter("brand", [Scalar::from("Apple")]),
        Err(EngineError::UnknownDimension(ref d)) if d == "brand"
    ));
    assert!(matches!(
        board.reset_filter("brand"),
        Err(EngineError::UnknownDimension(ref d)) if d == "brand"
    ));
}

#[test]
fn csv_loaded_datasets_drive_the_same_views() {
    let transactions = "state_name,year,quarter,total_transactions,total_amount\n\
                        Delhi,2023,1,10,100\n\
                        Delhi,2023,2,20,250\n\
                        Karnataka,2023,1,5,50\n\
                        Karnataka,2024,1,8,80\n\
                        Maharashtra,2024,2,4,40\n";
    // Shuffled header order; columns are matched by name.
    let devices = "avg_percentage_usage,brand,total_registered_users\n\
                   0.25,Xiaomi,300\n\
                   0.15,Samsung,200\n\
                   0.05,Apple,100\n";
    let insurance = "state_name,year,quarter,total_policies_sold,total_value\n\
                     Delhi,2023,1,3,30\n\
                     Karnataka,2024,1,6,60\n\
                     Maharashtra,2024,2,2,20\n";
    let growth = "state_name,previous_tx,current_tx,growth,growth_percent\n\
                  Delhi,100,150,50,50\n\
                  Karnataka,200,220,20,10\n\
                  Maharashtra,50,100,50,100\n";
    let engagement = "state_name,total_registered_users,total_app_opens\n\
                      Delhi,1000,5000\n\
                      Karnataka,800,2000\n\
                      Maharashtra,600,1200\n";
    let categories = "category_name,year,amount\n\
                      Recharge,2023,10\n\
                      Recharge,2024,12\n\
                      Shopping,2023,7\n";

    let tables = vec![
        load_dataset("transactions", transactions.as_bytes()).unwrap(),
        load_dataset("devices", devices.as_bytes()).unwrap(),
        load_dataset("insurance", insurance.as_bytes()).unwrap(),
        load_dataset("growth", growth.as_bytes()).unwrap(),
        load_dataset("engagement", engagement.as_bytes()).unwrap(),
        load_dataset("category_trends", categories.as_bytes()).unwrap(),
    ];
    let mut board = Dashboard::new(tables).unwrap();

    let payload = board.view("transactions.amount_by_year").unwrap();
    assert_eq!(
        payload.rows,
        vec![
            vec![Scalar::from(2023_i64), Scalar::from("Delhi"), Scalar::from(350.0)],
            vec![Scalar::from(2023_i64), Scalar::from("Karnataka"), Scalar::from(50.0)],
            vec![Scalar::from(2024_i64), Scalar::from("Karnataka"), Scalar::from(80.0)],
            vec![Scalar::from(2024_i64), Scalar::from("Maharashtra"), Scalar::from(40.0)],
        ]
    );
    let payload = board.view("devices.users_by_brand").unwrap();
    assert_eq!(
        payload.rows,
        vec![
            vec![Scalar::from("Xiaomi"), Scalar::from(300.0)],
            vec![Scalar::from("Samsung"), Scalar::from(200.0)],
            vec![Scalar::from("Apple"), Scalar::from(100.0)],
        ]
    );
}

#[test]
fn payloads_serialize_with_camel_case_fields() {
    let mut board = dashboard();
    let payload = board.view("devices.user_share_pie").unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&payload.to_json().unwrap()).unwrap();

    assert_eq!(json["recipeId"], "devices.user_share_pie");
    assert_eq!(json["chart"], "pie");
    assert_eq!(json["encoding"]["x"], "brand");
    assert_eq!(
        json["rows"][0],
        serde_json::json!([
            { "type": "text", "value": "Apple" },
            { "type": "number", "value": 100.0 },
        ])
    );
}
