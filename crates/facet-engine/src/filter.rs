//! Filter state: the user's current dimension selections.
//!
//! Each dimension is either unrestricted (no entry, every row passes) or
//! restricted to an explicit value set. An empty set is a legitimate
//! selection meaning "nothing": applying it yields empty tables, never an
//! error. Selections only change through validate-then-commit [`set`]:
//! offering one invalid value rejects the whole call and keeps the
//! previous selection.
//!
//! [`set`]: FilterState::set

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{BuildHasher, Hash, Hasher};

use facet_model::{Scalar, ScalarKey, Table};

use crate::dimensions::DimensionCatalogue;
use crate::error::{EngineError, EngineResult};

// Fixed seeds keep fingerprints comparable across `FilterState` instances
// within a process run.
const FINGERPRINT_SEEDS: (u64, u64, u64, u64) = (
    0x7c4a_36a1_9d2e_5b08,
    0x04d3_91cf_86e7_21fa,
    0x5df2_76b3_0a81_c94d,
    0x29e8_40d7_f15b_6c32,
);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    selections: BTreeMap<String, BTreeSet<ScalarKey>>,
}

impl FilterState {
    pub fn new() -> Self {
        FilterState::default()
    }

    /// Replaces the selection for `dimension` after validating every value
    /// against the catalogue. The first unknown value rejects the call with
    /// `InvalidFilterValue` and leaves the state untouched.
    pub fn set(
        &mut self,
        catalogue: &DimensionCatalogue,
        dimension: &str,
        values: impl IntoIterator<Item = Scalar>,
    ) -> EngineResult<()> {
        let mut selection = BTreeSet::new();
        for value in values {
            let key = value.to_key();
            if !catalogue.contains(dimension, &key)? {
                return Err(EngineError::InvalidFilterValue {
                    dimension: dimension.to_string(),
                    value,
                });
            }
            selection.insert(key);
        }
        self.selections.insert(dimension.to_string(), selection);
        Ok(())
    }

    /// Removes the restriction on `dimension`, restoring pass-through.
    pub fn clear(&mut self, dimension: &str) {
        self.selections.remove(dimension);
    }

    pub fn clear_all(&mut self) {
        self.selections.clear();
    }

    /// The current selection, or `None` when the dimension is unrestricted.
    pub fn selection(&self, dimension: &str) -> Option<&BTreeSet<ScalarKey>> {
        self.selections.get(dimension)
    }

    pub fn is_restricted(&self, dimension: &str) -> bool {
        self.selections.contains_key(dimension)
    }

    /// Applies the selection for one dimension to `table`. A table without
    /// the dimension's column passes through unchanged.
    pub fn apply(&self, table: &Table, dimension: &str) -> Table {
        let Some(selection) = self.selections.get(dimension) else {
            return table.clone();
        };
        let Some(position) = table.column_position(dimension) else {
            return table.clone();
        };
        table.filtered(|row| selection.contains(&row[position].to_key()))
    }

    /// Applies the selections for the given dimensions in one pass.
    /// Dimension order does not matter; per-row predicates commute.
    pub fn apply_dimensions(&self, table: &Table, dimensions: &[String]) -> Table {
        let active: Vec<(usize, &BTreeSet<ScalarKey>)> = dimensions
            .iter()
            .filter_map(|dimension| {
                let selection = self.selections.get(dimension)?;
                let position = table.column_position(dimension)?;
                Some((position, selection))
            })
            .collect();
        if active.is_empty() {
            return table.clone();
        }
        table.filtered(|row| {
            active
                .iter()
                .all(|(position, selection)| selection.contains(&row[*position].to_key()))
        })
    }

    /// Applies every selection currently held.
    pub fn apply_all(&self, table: &Table) -> Table {
        let dimensions: Vec<String> = self.selections.keys().cloned().collect();
        self.apply_dimensions(table, &dimensions)
    }

    /// Order-stable 64-bit digest of the selections for exactly `dims`.
    ///
    /// Memoization keys on this: two states fingerprint equal for a recipe
    /// iff they agree on every dimension the recipe declared, so changing
    /// an undeclared dimension never invalidates that recipe's cache entry.
    pub fn fingerprint(&self, dims: &[String]) -> u64 {
        let mut sorted: Vec<&String> = dims.iter().collect();
        sorted.sort_unstable();
        sorted.dedup();

        let state = ahash::RandomState::with_seeds(
            FINGERPRINT_SEEDS.0,
            FINGERPRINT_SEEDS.1,
            FINGERPRINT_SEEDS.2,
            FINGERPRINT_SEEDS.3,
        );
        let mut hasher = state.build_hasher();
        for dimension in sorted {
            dimension.hash(&mut hasher);
            match self.selections.get(dimension) {
                None => hasher.write_u8(0),
                Some(selection) => {
                    hasher.write_u8(1);
                    hasher.write_usize(selection.len());
                    for key in selection {
                        key.hash(&mut hasher);
                    }
                }
            }
        }
        hasher.finish()
    }
}
