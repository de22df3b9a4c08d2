//! Recompute support: materialized views, memoization and row budgets.
//!
//! Every filter interaction re-derives the views that depend on the
//! changed dimension; nothing is incrementally maintained. [`ViewCache`]
//! makes the common no-op case cheap: it keys each recipe's last result by
//! a fingerprint of the selections for the dimensions that recipe
//! declared, so touching an unrelated dimension never forces a recompute
//! and a cached result is indistinguishable from a fresh one.

use std::collections::HashMap;
use std::time::Instant;

use facet_model::{ChartKind, Encoding, Table, ViewRecipe};
use log::{debug, warn};

use crate::derive::derive_bounded;
use crate::error::{EngineError, EngineResult};
use crate::filter::FilterState;
use crate::registry::DatasetRegistry;

/// One derived view, ready for a renderer: the recipe identity plus the
/// derived table. Ephemeral; superseded on the next relevant filter
/// change.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterializedView {
    pub recipe_id: String,
    pub title: String,
    pub table: Table,
    pub chart: ChartKind,
    pub encoding: Encoding,
}

/// Upper bound on the filtered input rows a single recompute may read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecomputeBudget {
    pub max_input_rows: usize,
}

impl RecomputeBudget {
    pub fn new(max_input_rows: usize) -> Self {
        RecomputeBudget { max_input_rows }
    }
}

/// Derives `recipe` and wraps the result for rendering.
pub fn recompute(
    registry: &DatasetRegistry,
    filters: &FilterState,
    recipe: &ViewRecipe,
) -> EngineResult<MaterializedView> {
    recompute_bounded(registry, filters, recipe, None)
}

/// As [`recompute`], enforcing `budget` when given.
pub fn recompute_bounded(
    registry: &DatasetRegistry,
    filters: &FilterState,
    recipe: &ViewRecipe,
    budget: Option<RecomputeBudget>,
) -> EngineResult<MaterializedView> {
    let started = Instant::now();
    let table = derive_bounded(
        registry,
        filters,
        recipe,
        budget.map(|b| b.max_input_rows),
    )?;
    if table.is_empty() {
        warn!("view {} derived an empty table", recipe.id);
    }
    debug!("recomputed view {} in {:?}", recipe.id, started.elapsed());
    Ok(MaterializedView {
        recipe_id: recipe.id.clone(),
        title: recipe.title.clone(),
        table,
        chart: recipe.chart,
        encoding: recipe.encoding.clone(),
    })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Per-recipe memo of the last materialized view, keyed by the filter
/// fingerprint over the recipe's declared dimensions.
#[derive(Debug, Default)]
pub struct ViewCache {
    entries: HashMap<String, (u64, MaterializedView)>,
    stats: CacheStats,
}

impl ViewCache {
    pub fn new() -> Self {
        ViewCache::default()
    }

    /// Returns the cached view when the fingerprint still matches,
    /// recomputing (and caching) otherwise. A failed recompute leaves the
    /// previous entry in place; its stale fingerprint keeps it from being
    /// served.
    pub fn get_or_recompute(
        &mut self,
        registry: &DatasetRegistry,
        filters: &FilterState,
        recipe: &ViewRecipe,
        budget: Option<RecomputeBudget>,
    ) -> EngineResult<&MaterializedView> {
        let fingerprint = filters.fingerprint(&recipe.dimensions);
        let fresh = self
            .entries
            .get(&recipe.id)
            .map(|(cached, _)| *cached == fingerprint)
            .unwrap_or(false);
        if fresh {
            self.stats.hits += 1;
            debug!("cache hit for view {}", recipe.id);
        } else {
            self.stats.misses += 1;
            let view = recompute_bounded(registry, filters, recipe, budget)?;
            self.entries.insert(recipe.id.clone(), (fingerprint, view));
        }
        match self.entries.get(&recipe.id) {
            Some((_, view)) => Ok(view),
            None => Err(EngineError::UnknownRecipe(recipe.id.clone())),
        }
    }

    pub fn invalidate(&mut self, recipe_id: &str) {
        self.entries.remove(recipe_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
