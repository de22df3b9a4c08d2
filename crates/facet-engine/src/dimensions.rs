//! Dimension catalogue: the valid values of each filterable dimension.
//!
//! A dimension is a column name shared (by convention, not by schema) by
//! some of the registered tables. Its valid values are the union of that
//! column's non-null values across every table that has the column, held
//! sorted and deduplicated. The union makes filter validation consistent:
//! a value is selectable iff at least one table could produce rows for it.

use std::collections::{BTreeMap, BTreeSet};

use facet_model::{Scalar, ScalarKey};

use crate::error::{EngineError, EngineResult};
use crate::registry::DatasetRegistry;

#[derive(Debug, Default)]
pub struct DimensionCatalogue {
    // Sorted ascending per dimension, so `values` doubles as a binary
    // search index for `contains`.
    values: BTreeMap<String, Vec<ScalarKey>>,
}

impl DimensionCatalogue {
    /// Builds the catalogue for `dimensions` from every table currently in
    /// the registry. A dimension no table has yet is kept with an empty
    /// value list. The result does not depend on registration order.
    pub fn build(
        registry: &DatasetRegistry,
        dimensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut values = BTreeMap::new();
        for dimension in dimensions {
            let dimension = dimension.into();
            let mut union = BTreeSet::new();
            for table in registry.tables() {
                let Some(position) = table.column_position(&dimension) else {
                    continue;
                };
                for row in table.rows() {
                    let cell = &row[position];
                    if !cell.is_null() {
                        union.insert(cell.to_key());
                    }
                }
            }
            values.insert(dimension, union.into_iter().collect());
        }
        DimensionCatalogue { values }
    }

    /// Sorted, deduplicated, null-free values of `dimension`.
    pub fn values(&self, dimension: &str) -> EngineResult<&[ScalarKey]> {
        self.values
            .get(dimension)
            .map(Vec::as_slice)
            .ok_or_else(|| EngineError::UnknownDimension(dimension.to_string()))
    }

    /// The same values as plain scalars, for hosts presenting a picker.
    pub fn scalar_values(&self, dimension: &str) -> EngineResult<Vec<Scalar>> {
        Ok(self.values(dimension)?.iter().map(ScalarKey::to_scalar).collect())
    }

    pub fn contains(&self, dimension: &str, value: &ScalarKey) -> EngineResult<bool> {
        Ok(self.values(dimension)?.binary_search(value).is_ok())
    }

    pub fn is_dimension(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Declared dimension names, sorted.
    pub fn dimension_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
