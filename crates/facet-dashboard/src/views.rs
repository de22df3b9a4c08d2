//! The fixed view catalogue: every chart the dashboard renders.
//!
//! Recipes are declared here once and validated at startup. Each declares
//! the dimensions it listens to; the devices views declare none, so state
//! and category filters never touch them.

use facet_engine::{EngineResult, ViewCatalogue};
use facet_model::{
    BinSpec, ChartKind, Encoding, GroupKey, Measure, PeriodSpec, Scalar, SeriesSpec, SortSpec,
    Transform, ViewRecipe,
};

use crate::datasets::{CATEGORY_TRENDS, DEVICES, ENGAGEMENT, GROWTH, INSURANCE, TRANSACTIONS};

/// Builds the complete catalogue. Ids are namespaced by dataset, with the
/// cross-dataset union under `overview`.
pub fn catalogue() -> EngineResult<ViewCatalogue> {
    let mut recipes = Vec::new();
    recipes.extend(transaction_views());
    recipes.extend(category_views());
    recipes.extend(device_views());
    recipes.extend(insurance_views());
    recipes.extend(growth_views());
    recipes.extend(engagement_views());
    recipes.extend(overview_views());
    ViewCatalogue::from_recipes(recipes)
}

fn transaction_views() -> Vec<ViewRecipe> {
    vec![
        ViewRecipe::new(
            "transactions.amount_by_year",
            "Transaction amount by state, yearly",
            TRANSACTIONS,
            Transform::Aggregate {
                keys: vec![GroupKey::column("year"), GroupKey::column("state_name")],
                measure: Measure::sum("total_amount"),
                sort: None,
            },
            ChartKind::Line,
        )
        .with_dimensions(["state_name"])
        .with_encoding(Encoding::xy("year", "total_amount").with_hue("state_name")),
        ViewRecipe::new(
            "transactions.count_by_quarter",
            "Transaction count by state, quarterly",
            TRANSACTIONS,
            Transform::Aggregate {
                keys: vec![GroupKey::column("quarter"), GroupKey::column("state_name")],
                measure: Measure::sum("total_transactions"),
                sort: None,
            },
            ChartKind::Line,
        )
        .with_dimensions(["state_name"])
        .with_encoding(Encoding::xy("quarter", "total_transactions").with_hue("state_name")),
        ViewRecipe::new(
            "transactions.count_heatmap",
            "Transactions by state and quarter",
            TRANSACTIONS,
            Transform::Pivot {
                index: GroupKey::column("state_name"),
                columns: GroupKey::column("quarter"),
                measure: Measure::sum("total_transactions"),
                fill: Scalar::Number(0.0),
            },
            ChartKind::Heatmap,
        )
        .with_dimensions(["state_name"])
        .with_encoding(Encoding::xy("quarter", "state_name")),
        ViewRecipe::new(
            "transactions.amount_per_quarter_stacked",
            "Amount per quarter by state",
            TRANSACTIONS,
            Transform::Aggregate {
                keys: vec![GroupKey::column("quarter"), GroupKey::column("state_name")],
                measure: Measure::sum("total_amount"),
                sort: None,
            },
            ChartKind::BarStacked,
        )
        .with_dimensions(["state_name"])
        .with_encoding(Encoding::xy("quarter", "total_amount").with_hue("state_name")),
    ]
}

fn category_views() -> Vec<ViewRecipe> {
    vec![ViewRecipe::new(
        "categories.amount_trend",
        "Category amounts over the years",
        CATEGORY_TRENDS,
        Transform::Aggregate {
            keys: vec![GroupKey::column("year"), GroupKey::column("category_name")],
            measure: Measure::sum("amount"),
            sort: None,
        },
        ChartKind::Line,
    )
    .with_dimensions(["category_name"])
    .with_encoding(Encoding::xy("year", "amount").with_hue("category_name"))]
}

fn device_views() -> Vec<ViewRecipe> {
    let usage_tiers = BinSpec::new([0.0, 0.1, 0.2, 0.3], ["Low", "Medium", "High"]);
    vec![
        ViewRecipe::new(
            "devices.users_by_brand",
            "Registered users by brand",
            DEVICES,
            Transform::Aggregate {
                keys: vec![GroupKey::column("brand")],
                measure: Measure::sum("total_registered_users"),
                sort: Some(SortSpec::descending("total_registered_users")),
            },
            ChartKind::BarGrouped,
        )
        .with_encoding(Encoding::xy("brand", "total_registered_users")),
        ViewRecipe::new(
            "devices.avg_usage_by_brand",
            "Average usage share by brand",
            DEVICES,
            Transform::Aggregate {
                keys: vec![GroupKey::column("brand")],
                measure: Measure::mean("avg_percentage_usage"),
                sort: None,
            },
            ChartKind::BarGrouped,
        )
        .with_encoding(Encoding::xy("brand", "avg_percentage_usage")),
        ViewRecipe::new(
            "devices.user_share_pie",
            "User share by brand",
            DEVICES,
            Transform::Aggregate {
                keys: vec![GroupKey::column("brand")],
                measure: Measure::sum("total_registered_users"),
                sort: None,
            },
            ChartKind::Pie,
        )
        .with_encoding(Encoding::xy("brand", "total_registered_users")),
        ViewRecipe::new(
            "devices.usage_tier_sunburst",
            "Brands by usage tier",
            DEVICES,
            Transform::Aggregate {
                keys: vec![
                    GroupKey::binned("avg_percentage_usage", usage_tiers, "usage_tier"),
                    GroupKey::column("brand"),
                ],
                measure: Measure::sum("total_registered_users"),
                sort: None,
            },
            ChartKind::Sunburst,
        )
        .with_encoding(Encoding::xy("usage_tier", "total_registered_users").with_hue("brand")),
    ]
}

fn insurance_views() -> Vec<ViewRecipe> {
    vec![
        ViewRecipe::new(
            "insurance.policies_by_year",
            "Policies sold by state, yearly",
            INSURANCE,
            Transform::Aggregate {
                keys: vec![GroupKey::column("year"), GroupKey::column("state_name")],
                measure: Measure::sum("total_policies_sold"),
                sort: None,
            },
            ChartKind::Line,
        )
        .with_dimensions(["state_name"])
        .with_encoding(Encoding::xy("year", "total_policies_sold").with_hue("state_name")),
        ViewRecipe::new(
            "insurance.value_by_year",
            "Insured value by state, yearly",
            INSURANCE,
            Transform::Aggregate {
                keys: vec![GroupKey::column("year"), GroupKey::column("state_name")],
                measure: Measure::sum("total_value"),
                sort: None,
            },
            ChartKind::Line,
        )
        .with_dimensions(["state_name"])
        .with_encoding(Encoding::xy("year", "total_value").with_hue("state_name")),
        ViewRecipe::new(
            "insurance.policies_by_quarter",
            "Policies sold by state, quarterly",
            INSURANCE,
            Transform::Aggregate {
                keys: vec![GroupKey::column("quarter"), GroupKey::column("state_name")],
                measure: Measure::sum("total_policies_sold"),
                sort: None,
            },
            ChartKind::Line,
        )
        .with_dimensions(["state_name"])
        .with_encoding(Encoding::xy("quarter", "total_policies_sold").with_hue("state_name")),
        ViewRecipe::new(
            "insurance.value_growth_area",
            "Insured value growth by state",
            INSURANCE,
            Transform::Pivot {
                index: GroupKey::period("year", "quarter"),
                columns: GroupKey::column("state_name"),
                measure: Measure::sum("total_value"),
                fill: Scalar::Number(0.0),
            },
            ChartKind::AreaStacked,
        )
        .with_dimensions(["state_name"])
        .with_encoding(Encoding::xy("period", "total_value").with_hue("state_name")),
        ViewRecipe::new(
            "insurance.policies_per_quarter_grouped",
            "Policies per quarter by state",
            INSURANCE,
            Transform::Aggregate {
                keys: vec![GroupKey::column("quarter"), GroupKey::column("state_name")],
                measure: Measure::sum("total_policies_sold"),
                sort: None,
            },
            ChartKind::BarGrouped,
        )
        .with_dimensions(["state_name"])
        .with_encoding(Encoding::xy("quarter", "total_policies_sold").with_hue("state_name")),
    ]
}

fn growth_views() -> Vec<ViewRecipe> {
    vec![
        ViewRecipe::new(
            "growth.percent_by_state",
            "Growth percent by state",
            GROWTH,
            Transform::Select {
                columns: vec!["state_name".to_string(), "growth_percent".to_string()],
                sort: Some(SortSpec::descending("growth_percent")),
            },
            ChartKind::BarGrouped,
        )
        .with_dimensions(["state_name"])
        .with_encoding(Encoding::xy("state_name", "growth_percent")),
        ViewRecipe::new(
            "growth.growth_vs_previous_bubble",
            "Growth vs previous transactions",
            GROWTH,
            Transform::Select {
                columns: vec![
                    "state_name".to_string(),
                    "previous_tx".to_string(),
                    "current_tx".to_string(),
                    "growth".to_string(),
                ],
                sort: None,
            },
            ChartKind::Bubble,
        )
        .with_dimensions(["state_name"])
        .with_encoding(
            Encoding::xy("previous_tx", "growth")
                .with_hue("state_name")
                .with_size("current_tx"),
        ),
    ]
}

fn engagement_views() -> Vec<ViewRecipe> {
    vec![
        ViewRecipe::new(
            "engagement.users_vs_opens_scatter",
            "Registered users vs app opens",
            ENGAGEMENT,
            Transform::Select {
                columns: vec![
                    "state_name".to_string(),
                    "total_registered_users".to_string(),
                    "total_app_opens".to_string(),
                ],
                sort: None,
            },
            ChartKind::Scatter,
        )
        .with_dimensions(["state_name"])
        .with_encoding(
            Encoding::xy("total_registered_users", "total_app_opens").with_hue("state_name"),
        ),
        ViewRecipe::new(
            "engagement.opens_bubble",
            "App opens by state",
            ENGAGEMENT,
            Transform::Select {
                columns: vec![
                    "state_name".to_string(),
                    "total_registered_users".to_string(),
                    "total_app_opens".to_string(),
                ],
                sort: None,
            },
            ChartKind::Bubble,
        )
        .with_dimensions(["state_name"])
        .with_encoding(
            Encoding::xy("total_registered_users", "total_app_opens")
                .with_hue("state_name")
                .with_size("total_registered_users"),
        ),
    ]
}

fn overview_views() -> Vec<ViewRecipe> {
    vec![ViewRecipe::concat(
        "overview.activity_timeline",
        "Transaction and insurance activity",
        vec![
            SeriesSpec::new(TRANSACTIONS, Measure::sum("total_amount"), "Transactions"),
            SeriesSpec::new(INSURANCE, Measure::sum("total_value"), "Insurance"),
        ],
        PeriodSpec::new("year", "quarter"),
        ChartKind::AreaStacked,
    )
    .with_dimensions(["state_name"])
    .with_encoding(Encoding::xy("period", "value").with_hue("series"))]
}
