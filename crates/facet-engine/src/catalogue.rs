//! View catalogue: the fixed set of recipes a dashboard renders.
//!
//! [`ViewCatalogue::validate`] runs once at startup, before the first
//! derivation, and checks everything about a recipe that does not depend
//! on data: sources exist, every referenced column is present with a
//! usable type, bins are well formed, declared dimensions are known and
//! encodings bind columns the transform can actually produce. A broken
//! recipe is a startup failure naming the recipe, never a silently
//! missing view.

use std::collections::{HashMap, HashSet};

use facet_model::{
    Aggregation, ColumnType, GroupKey, Measure, PeriodSpec, Scalar, SeriesSpec, SortSpec,
    Transform, ViewRecipe,
};
use log::{debug, warn};

use crate::dimensions::DimensionCatalogue;
use crate::error::{EngineError, EngineResult};
use crate::registry::DatasetRegistry;

#[derive(Debug, Default)]
pub struct ViewCatalogue {
    recipes: Vec<ViewRecipe>,
    index: HashMap<String, usize>,
}

impl ViewCatalogue {
    pub fn new() -> Self {
        ViewCatalogue::default()
    }

    pub fn from_recipes(recipes: Vec<ViewRecipe>) -> EngineResult<Self> {
        let mut catalogue = ViewCatalogue::new();
        for recipe in recipes {
            catalogue.add(recipe)?;
        }
        Ok(catalogue)
    }

    /// Adds a recipe; ids are unique across the catalogue.
    pub fn add(&mut self, recipe: ViewRecipe) -> EngineResult<()> {
        if self.index.contains_key(&recipe.id) {
            return Err(EngineError::DuplicateRecipe(recipe.id));
        }
        self.index.insert(recipe.id.clone(), self.recipes.len());
        self.recipes.push(recipe);
        Ok(())
    }

    pub fn get(&self, id: &str) -> EngineResult<&ViewRecipe> {
        self.index
            .get(id)
            .map(|idx| &self.recipes[*idx])
            .ok_or_else(|| EngineError::UnknownRecipe(id.to_string()))
    }

    /// Recipes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ViewRecipe> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Checks every recipe against the registry and the dimension
    /// catalogue, failing on the first broken one.
    pub fn validate(
        &self,
        registry: &DatasetRegistry,
        dimensions: &DimensionCatalogue,
    ) -> EngineResult<()> {
        for recipe in &self.recipes {
            validate_recipe(recipe, registry, dimensions)?;
        }
        debug!("validated {} view recipes", self.recipes.len());
        Ok(())
    }
}

fn validate_recipe(
    recipe: &ViewRecipe,
    registry: &DatasetRegistry,
    dimensions: &DimensionCatalogue,
) -> EngineResult<()> {
    for dimension in &recipe.dimensions {
        if !dimensions.is_dimension(dimension) {
            return Err(invalid(recipe, format!("unknown dimension {dimension}")));
        }
    }
    for table in recipe.source.names() {
        if !registry.contains(table) {
            return Err(invalid(recipe, format!("unknown source table {table}")));
        }
        warn_undeclared_dimensions(recipe, registry, dimensions, table);
    }

    let outputs = match &recipe.transform {
        Transform::Select { columns, sort } => {
            let table = single_source(recipe)?;
            let mut outputs = Vec::new();
            for column in columns {
                require_column(recipe, registry, table, column)?;
                outputs.push(column.clone());
            }
            check_unique_outputs(recipe, &outputs)?;
            check_sort(recipe, sort.as_ref(), &outputs)?;
            outputs
        }
        Transform::Aggregate {
            keys,
            measure,
            sort,
        } => {
            let table = single_source(recipe)?;
            let mut outputs = Vec::new();
            for key in keys {
                outputs.push(validate_key(recipe, registry, table, key)?);
            }
            validate_measure(recipe, registry, table, measure)?;
            outputs.push(measure.output_name().to_string());
            check_unique_outputs(recipe, &outputs)?;
            check_sort(recipe, sort.as_ref(), &outputs)?;
            outputs
        }
        Transform::Pivot {
            index,
            columns,
            measure,
            fill,
        } => {
            let table = single_source(recipe)?;
            let index_output = validate_key(recipe, registry, table, index)?;
            let columns_output = validate_key(recipe, registry, table, columns)?;
            validate_measure(recipe, registry, table, measure)?;
            if !matches!(fill, Scalar::Null | Scalar::Int(_) | Scalar::Number(_)) {
                return Err(invalid(recipe, "pivot fill must be numeric or null"));
            }
            // The value columns of a pivot are data-dependent; encodings
            // can only meaningfully bind the two axes and the measure.
            vec![
                index_output,
                columns_output,
                measure.output_name().to_string(),
            ]
        }
        Transform::Concat { series, period } => {
            validate_concat(recipe, registry, series, period)?;
            vec!["period".to_string(), "series".to_string(), "value".to_string()]
        }
    };

    for bound in recipe.encoding.bound_columns() {
        if !outputs.iter().any(|o| o == bound) {
            return Err(invalid(
                recipe,
                format!("encoding binds unknown output column {bound}"),
            ));
        }
    }
    Ok(())
}

fn single_source<'a>(recipe: &'a ViewRecipe) -> EngineResult<&'a str> {
    recipe.source.single().ok_or_else(|| {
        invalid(
            recipe,
            "transform reads one table but several sources are declared",
        )
    })
}

fn validate_key(
    recipe: &ViewRecipe,
    registry: &DatasetRegistry,
    table: &str,
    key: &GroupKey,
) -> EngineResult<String> {
    match key {
        GroupKey::Column { name } => {
            require_column(recipe, registry, table, name)?;
        }
        GroupKey::Period(PeriodSpec { year, quarter }) => {
            require_column(recipe, registry, table, year)?;
            require_column(recipe, registry, table, quarter)?;
        }
        GroupKey::Binned {
            column,
            bins,
            label: _,
        } => {
            let column_type = require_column(recipe, registry, table, column)?;
            if !is_numeric(column_type) {
                return Err(invalid(
                    recipe,
                    format!(
                        "bin column {table}[{column}] is {}, bins need a numeric column",
                        column_type.as_str()
                    ),
                ));
            }
            bins.validate().map_err(|reason| invalid(recipe, reason))?;
        }
    }
    Ok(key.output_column().to_string())
}

fn validate_measure(
    recipe: &ViewRecipe,
    registry: &DatasetRegistry,
    table: &str,
    measure: &Measure,
) -> EngineResult<()> {
    let column_type = require_column(recipe, registry, table, &measure.column)?;
    if measure.agg != Aggregation::Count && !is_numeric(column_type) {
        return Err(invalid(
            recipe,
            format!(
                "{} needs a numeric measure column, {table}[{}] is {}",
                measure.agg.as_str(),
                measure.column,
                column_type.as_str()
            ),
        ));
    }
    Ok(())
}

fn validate_concat(
    recipe: &ViewRecipe,
    registry: &DatasetRegistry,
    series: &[SeriesSpec],
    period: &PeriodSpec,
) -> EngineResult<()> {
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
    let mut labels = HashSet::new();
    for spec in series {
        if !labels.insert(spec.label.as_str()) {
            return Err(invalid(
                recipe,
                format!("duplicate series label {}", spec.label),
            ));
        }
        require_column(recipe, registry, &spec.table, &period.year)?;
        require_column(recipe, registry, &spec.table, &period.quarter)?;
        validate_measure(recipe, registry, &spec.table, &spec.measure)?;
    }
    Ok(())
}

/// Resolves `table[column]`, returning the column's declared type.
fn require_column(
    recipe: &ViewRecipe,
    registry: &DatasetRegistry,
    table: &str,
    column: &str,
) -> EngineResult<ColumnType> {
    let table = registry.get(table)?;
    table
        .column_type(column)
        .ok_or_else(|| EngineError::SchemaMismatch {
            recipe: recipe.id.clone(),
            table: table.name().to_string(),
            column: column.to_string(),
        })
}

fn check_unique_outputs(recipe: &ViewRecipe, outputs: &[String]) -> EngineResult<()> {
    let mut seen = HashSet::new();
    for output in outputs {
        if !seen.insert(output.as_str()) {
            return Err(invalid(
                recipe,
                format!("output column {output} appears twice"),
            ));
        }
    }
    Ok(())
}

fn check_sort(
    recipe: &ViewRecipe,
    sort: Option<&SortSpec>,
    outputs: &[String],
) -> EngineResult<()> {
    let Some(sort) = sort else {
        return Ok(());
    };
    if !outputs.iter().any(|o| o == &sort.column) {
        return Err(invalid(
            recipe,
            format!("sort column {} is not an output column", sort.column),
        ));
    }
    Ok(())
}

fn warn_undeclared_dimensions(
    recipe: &ViewRecipe,
    registry: &DatasetRegistry,
    dimensions: &DimensionCatalogue,
    table: &str,
) {
    let Ok(table) = registry.get(table) else {
        return;
    };
    for dimension in dimensions.dimension_names() {
        if table.has_column(dimension) && !recipe.dimensions.iter().any(|d| d == dimension) {
            warn!(
                "view {} reads {} but does not declare dimension {dimension}; \
                 that filter will not apply to it",
                recipe.id,
                table.name()
            );
        }
    }
}

fn is_numeric(column_type: ColumnType) -> bool {
    matches!(column_type, ColumnType::Int | ColumnType::Number)
}

fn invalid(recipe: &ViewRecipe, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidRecipe {
        recipe: recipe.id.clone(),
        reason: reason.into(),
    }
}
