//! View derivation: executing one recipe against the filtered datasets.
//!
//! [`derive`] is a pure function of the registry, the filter state and the
//! recipe; it holds no state of its own and can be re-run for any recipe
//! at any time. Group rows always come out ascending by group-key tuple
//! (the [`ScalarKey`] total order), so two derivations of the same inputs
//! are byte-identical; a recipe's `SortSpec` re-sorts that canonical order
//! for presentation only.
//!
//! Grouping compares keys by exact equality. Null keys are kept as their
//! own group rather than dropped, ordered after every real value.

use std::collections::BTreeMap;

use facet_model::{
    Aggregation, BinSpec, ColumnSchema, ColumnType, GroupKey, Measure, PeriodSpec, Scalar,
    ScalarKey, SeriesSpec, SortSpec, Table, Transform, ViewRecipe,
};
use log::debug;
use ordered_float::OrderedFloat;

use crate::error::{EngineError, EngineResult};
use crate::filter::FilterState;
use crate::registry::DatasetRegistry;

/// Derives the recipe's output table from the registry under the given
/// filter state. Only the recipe's declared dimensions are applied; a
/// selection on a dimension the recipe does not declare is ignored, which
/// is what keeps fingerprint-based memoization sound.
pub fn derive(
    registry: &DatasetRegistry,
    filters: &FilterState,
    recipe: &ViewRecipe,
) -> EngineResult<Table> {
    derive_bounded(registry, filters, recipe, None)
}

/// As [`derive`], but fails with `BudgetExceeded` once the filtered input
/// rows pass `max_input_rows`.
pub(crate) fn derive_bounded(
    registry: &DatasetRegistry,
    filters: &FilterState,
    recipe: &ViewRecipe,
    max_input_rows: Option<usize>,
) -> EngineResult<Table> {
    let table = match &recipe.transform {
        Transform::Select { columns, sort } => {
            let source = single_filtered_source(registry, filters, recipe)?;
            check_budget(recipe, source.row_count(), max_input_rows)?;
            select(recipe, &source, columns, sort.as_ref())?
        }
        Transform::Aggregate {
            keys,
            measure,
            sort,
        } => {
            let source = single_filtered_source(registry, filters, recipe)?;
            check_budget(recipe, source.row_count(), max_input_rows)?;
            aggregate(recipe, &source, keys, measure, sort.as_ref())?
        }
        Transform::Pivot {
            index,
            columns,
            measure,
            fill,
        } => {
            let source = single_filtered_source(registry, filters, recipe)?;
            check_budget(recipe, source.row_count(), max_input_rows)?;
            pivot(recipe, &source, index, columns, measure, fill)?
        }
        Transform::Concat { series, period } => {
            concat(registry, filters, recipe, series, period, max_input_rows)?
        }
    };
    debug!("derived view {}: {} rows", recipe.id, table.row_count());
    Ok(table)
}

fn single_filtered_source(
    registry: &DatasetRegistry,
    filters: &FilterState,
    recipe: &ViewRecipe,
) -> EngineResult<Table> {
    let Some(name) = recipe.source.single() else {
        return Err(invalid(
            recipe,
            "transform reads one table but several sources are declared",
        ));
    };
    let table = registry.get(name)?;
    Ok(filters.apply_dimensions(table, &recipe.dimensions))
}

fn check_budget(
    recipe: &ViewRecipe,
    rows: usize,
    max_input_rows: Option<usize>,
) -> EngineResult<()> {
    match max_input_rows {
        Some(limit) if rows > limit => Err(EngineError::BudgetExceeded {
            recipe: recipe.id.clone(),
            rows,
            limit,
        }),
        _ => Ok(()),
    }
}

fn invalid(recipe: &ViewRecipe, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidRecipe {
        recipe: recipe.id.clone(),
        reason: reason.into(),
    }
}

fn column_position(recipe: &ViewRecipe, table: &Table, column: &str) -> EngineResult<usize> {
    table
        .column_position(column)
        .ok_or_else(|| EngineError::SchemaMismatch {
            recipe: recipe.id.clone(),
            table: table.name().to_string(),
            column: column.to_string(),
        })
}

/// A group key resolved against a concrete table.
enum KeyEval<'a> {
    Column {
        position: usize,
        schema: &'a ColumnSchema,
    },
    Period {
        year: usize,
        quarter: usize,
    },
    Binned {
        position: usize,
        bins: &'a BinSpec,
        label: &'a str,
    },
}

fn resolve_key<'a>(
    recipe: &ViewRecipe,
    table: &'a Table,
    key: &'a GroupKey,
) -> EngineResult<KeyEval<'a>> {
    match key {
        GroupKey::Column { name } => {
            let position = column_position(recipe, table, name)?;
            Ok(KeyEval::Column {
                position,
                schema: &table.schema()[position],
            })
        }
        GroupKey::Period(period) => Ok(KeyEval::Period {
            year: column_position(recipe, table, &period.year)?,
            quarter: column_position(recipe, table, &period.quarter)?,
        }),
        GroupKey::Binned {
            column,
            bins,
            label,
        } => Ok(KeyEval::Binned {
            position: column_position(recipe, table, column)?,
            bins,
            label,
        }),
    }
}

impl KeyEval<'_> {
    fn output_schema(&self) -> ColumnSchema {
        match self {
            KeyEval::Column { schema, .. } => (*schema).clone(),
            KeyEval::Period { .. } => ColumnSchema::new("period", ColumnType::Text),
            KeyEval::Binned { label, .. } => ColumnSchema::new(*label, ColumnType::Text),
        }
    }

    /// Evaluates the key for one row: pushes the sort parts the group
    /// orders by and returns the cell the output row shows.
    ///
    /// A period contributes its `(year, quarter)` value pair to the sort
    /// parts and renders a `"2023-Q4"` label, so periods order by value,
    /// never by label text. A binned key sorts by bucket index, keeping
    /// `Low < Medium < High` regardless of label spelling; out-of-range
    /// values key as null.
    fn eval(&self, row: &[Scalar], sort_parts: &mut Vec<ScalarKey>) -> Scalar {
        match self {
            KeyEval::Column { position, .. } => {
                let cell = &row[*position];
                sort_parts.push(cell.to_key());
                cell.clone()
            }
            KeyEval::Period { year, quarter } => {
                let year = &row[*year];
                let quarter = &row[*quarter];
                sort_parts.push(year.to_key());
                sort_parts.push(quarter.to_key());
                period_label(year, quarter)
            }
            KeyEval::Binned { position, bins, .. } => {
                match row[*position].as_number().and_then(|v| bins.bucket(v)) {
                    Some(bucket) => {
                        sort_parts.push(ScalarKey::Int(bucket as i64));
                        Scalar::Text(bins.labels[bucket].clone())
                    }
                    None => {
                        sort_parts.push(ScalarKey::Null);
                        Scalar::Null
                    }
                }
            }
        }
    }
}

fn period_label(year: &Scalar, quarter: &Scalar) -> Scalar {
    Scalar::Text(format!("{}-Q{}", year.group_label(), quarter.group_label()))
}

/// Running reduction over one group's measure cells. Non-null cells that
/// have no numeric view are counted but otherwise skipped.
struct MeasureAcc {
    agg: Aggregation,
    sum: f64,
    numeric: usize,
    non_null: usize,
    min: Option<OrderedFloat<f64>>,
    max: Option<OrderedFloat<f64>>,
}

impl MeasureAcc {
    fn new(agg: Aggregation) -> Self {
        MeasureAcc {
            agg,
            sum: 0.0,
            numeric: 0,
            non_null: 0,
            min: None,
            max: None,
        }
    }

    fn update(&mut self, cell: &Scalar) {
        if cell.is_null() {
            return;
        }
        self.non_null += 1;
        if let Some(n) = cell.as_number() {
            self.sum += n;
            self.numeric += 1;
            let n = OrderedFloat(n);
            self.min = Some(self.min.map_or(n, |m| m.min(n)));
            self.max = Some(self.max.map_or(n, |m| m.max(n)));
        }
    }

    /// The reduced cell. A sum with no numeric contributions is `0`, an
    /// empty mean/min/max is null, and a count is the non-null cell count.
    fn finish(&self) -> Scalar {
        match self.agg {
            Aggregation::Sum => Scalar::Number(self.sum),
            Aggregation::Mean => {
                if self.numeric == 0 {
                    Scalar::Null
                } else {
                    Scalar::Number(self.sum / self.numeric as f64)
                }
            }
            Aggregation::Count => Scalar::Int(self.non_null as i64),
            Aggregation::Min => self
                .min
                .map_or(Scalar::Null, |m| Scalar::Number(m.into_inner())),
            Aggregation::Max => self
                .max
                .map_or(Scalar::Null, |m| Scalar::Number(m.into_inner())),
        }
    }
}

fn measure_output_type(agg: Aggregation) -> ColumnType {
    match agg {
        Aggregation::Count => ColumnType::Int,
        _ => ColumnType::Number,
    }
}

fn select(
    recipe: &ViewRecipe,
    source: &Table,
    columns: &[String],
    sort: Option<&SortSpec>,
) -> EngineResult<Table> {
    let positions = columns
        .iter()
        .map(|column| column_position(recipe, source, column))
        .collect::<EngineResult<Vec<_>>>()?;
    let schema: Vec<ColumnSchema> = positions
        .iter()
        .map(|p| source.schema()[*p].clone())
        .collect();
    let mut rows: Vec<Vec<Scalar>> = source
        .rows()
        .iter()
        .map(|row| positions.iter().map(|p| row[*p].clone()).collect())
        .collect();
    if let Some(sort) = sort {
        sort_rows(recipe, &schema, &mut rows, sort)?;
    }
    build_output(recipe, schema, rows)
}

fn aggregate(
    recipe: &ViewRecipe,
    source: &Table,
    keys: &[GroupKey],
    measure: &Measure,
    sort: Option<&SortSpec>,
) -> EngineResult<Table> {
    let evals = keys
        .iter()
        .map(|key| resolve_key(recipe, source, key))
        .collect::<EngineResult<Vec<_>>>()?;
    let measure_pos = column_position(recipe, source, &measure.column)?;

    // BTreeMap keyed by the sort-part tuple both groups and orders the
    // output in one pass.
    let mut groups: BTreeMap<Vec<ScalarKey>, (Vec<Scalar>, MeasureAcc)> = BTreeMap::new();
    for row in source.rows() {
        let mut sort_parts = Vec::with_capacity(evals.len() + 1);
        let cells: Vec<Scalar> = evals.iter().map(|e| e.eval(row, &mut sort_parts)).collect();
        let entry = groups
            .entry(sort_parts)
            .or_insert_with(|| (cells, MeasureAcc::new(measure.agg)));
        entry.1.update(&row[measure_pos]);
    }

    let mut schema: Vec<ColumnSchema> = evals.iter().map(KeyEval::output_schema).collect();
    schema.push(ColumnSchema::new(
        measure.output_name(),
        measure_output_type(measure.agg),
    ));
    let mut rows: Vec<Vec<Scalar>> = groups
        .into_values()
        .map(|(mut cells, acc)| {
            cells.push(acc.finish());
            cells
        })
        .collect();
    if let Some(sort) = sort {
        sort_rows(recipe, &schema, &mut rows, sort)?;
    }
    build_output(recipe, schema, rows)
}

fn pivot(
    recipe: &ViewRecipe,
    source: &Table,
    index: &GroupKey,
    columns: &GroupKey,
    measure: &Measure,
    fill: &Scalar,
) -> EngineResult<Table> {
    if !matches!(fill, Scalar::Null | Scalar::Int(_) | Scalar::Number(_)) {
        return Err(invalid(recipe, "pivot fill must be numeric or null"));
    }
    let index_eval = resolve_key(recipe, source, index)?;
    let column_eval = resolve_key(recipe, source, columns)?;
    let measure_pos = column_position(recipe, source, &measure.column)?;

    let mut row_axis: BTreeMap<Vec<ScalarKey>, Scalar> = BTreeMap::new();
    let mut col_axis: BTreeMap<Vec<ScalarKey>, Scalar> = BTreeMap::new();
    let mut cells: BTreeMap<Vec<ScalarKey>, BTreeMap<Vec<ScalarKey>, MeasureAcc>> =
        BTreeMap::new();

    for row in source.rows() {
        let mut row_parts = Vec::new();
        let row_cell = index_eval.eval(row, &mut row_parts);
        let mut col_parts = Vec::new();
        let col_cell = column_eval.eval(row, &mut col_parts);
        row_axis.entry(row_parts.clone()).or_insert(row_cell);
        col_axis.entry(col_parts.clone()).or_insert(col_cell);
        cells
            .entry(row_parts)
            .or_default()
            .entry(col_parts)
            .or_insert_with(|| MeasureAcc::new(measure.agg))
            .update(&row[measure_pos]);
    }

    let mut schema = vec![index_eval.output_schema()];
    for col_cell in col_axis.values() {
        // Value cells are numeric whatever the aggregation, so the fill
        // value and a count both fit.
        schema.push(ColumnSchema::new(col_cell.group_label(), ColumnType::Number));
    }

    let mut rows = Vec::with_capacity(row_axis.len());
    for (row_parts, row_cell) in &row_axis {
        let mut out = Vec::with_capacity(schema.len());
        out.push(row_cell.clone());
        for col_parts in col_axis.keys() {
            let cell = cells
                .get(row_parts)
                .and_then(|by_col| by_col.get(col_parts))
                .map(MeasureAcc::finish)
                .unwrap_or_else(|| fill.clone());
            out.push(cell);
        }
        rows.push(out);
    }
    build_output(recipe, schema, rows)
}

fn concat(
    registry: &DatasetRegistry,
    filters: &FilterState,
    recipe: &ViewRecipe,
    series: &[SeriesSpec],
    period: &PeriodSpec,
    max_input_rows: Option<usize>,
) -> EngineResult<Table> {
    if series.is_empty() {
        return Err(invalid(recipe, "union needs at least one series"));
    }
    let declared: Vec<&str> = recipe.source.names().collect();
    let from_series: Vec<&str> = series.iter().map(|s| s.table.as_str()).collect();
    if declared != from_series {
        return Err(invalid(
            recipe,
            "declared sources do not match the series tables",
        ));
    }

    let mut total_rows = 0usize;
    let mut groups: BTreeMap<Vec<ScalarKey>, (Vec<Scalar>, MeasureAcc)> = BTreeMap::new();
    for spec in series {
        let table = registry.get(&spec.table)?;
        let filtered = filters.apply_dimensions(table, &recipe.dimensions);
        total_rows += filtered.row_count();
        check_budget(recipe, total_rows, max_input_rows)?;

        let year_pos = column_position(recipe, &filtered, &period.year)?;
        let quarter_pos = column_position(recipe, &filtered, &period.quarter)?;
        let measure_pos = column_position(recipe, &filtered, &spec.measure.column)?;

        for row in filtered.rows() {
            let year = &row[year_pos];
            let quarter = &row[quarter_pos];
            let key = vec![
                year.to_key(),
                quarter.to_key(),
                ScalarKey::Text(spec.label.clone()),
            ];
            let entry = groups.entry(key).or_insert_with(|| {
                (
                    vec![period_label(year, quarter), Scalar::Text(spec.label.clone())],
                    MeasureAcc::new(spec.measure.agg),
                )
            });
            entry.1.update(&row[measure_pos]);
        }
    }

    let schema = vec![
        ColumnSchema::new("period", ColumnType::Text),
        ColumnSchema::new("series", ColumnType::Text),
        ColumnSchema::new("value", ColumnType::Number),
    ];
    let rows = groups
        .into_values()
        .map(|(mut cells, acc)| {
            cells.push(acc.finish());
            cells
        })
        .collect();
    build_output(recipe, schema, rows)
}

fn sort_rows(
    recipe: &ViewRecipe,
    schema: &[ColumnSchema],
    rows: &mut [Vec<Scalar>],
    sort: &SortSpec,
) -> EngineResult<()> {
    let Some(position) = schema.iter().position(|c| c.name == sort.column) else {
        return Err(invalid(
            recipe,
            format!("sort column {} is not an output column", sort.column),
        ));
    };
    rows.sort_by(|a, b| {
        let ord = a[position].to_key().cmp(&b[position].to_key());
        if sort.descending {
            ord.reverse()
        } else {
            ord
        }
    });
    Ok(())
}

fn build_output(
    recipe: &ViewRecipe,
    schema: Vec<ColumnSchema>,
    rows: Vec<Vec<Scalar>>,
) -> EngineResult<Table> {
    Ok(Table::with_rows(recipe.id.clone(), schema, rows)?)
}
