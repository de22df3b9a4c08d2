//! The dashboard facade: the one object a host UI talks to.
//!
//! Construction is fail-fast: datasets are registered, the dimension
//! catalogue is built and every view recipe is validated before `new`
//! returns, so a schema drift or a broken recipe surfaces at startup with
//! the offending recipe named, not mid-session as a missing chart. After
//! that the surface is small: adjust filters, ask for payloads. All
//! recomputation flows through the view cache, so repainting views whose
//! dimensions did not change costs a fingerprint comparison.

use facet_engine::{
    CacheStats, DatasetRegistry, DimensionCatalogue, EngineError, EngineResult, FilterState,
    RecomputeBudget, ViewCache, ViewCatalogue,
};
use facet_model::{Scalar, Table};
use log::debug;

use crate::datasets::DIMENSIONS;
use crate::render::ChartPayload;
use crate::views;

#[derive(Debug)]
pub struct Dashboard {
    registry: DatasetRegistry,
    dimensions: DimensionCatalogue,
    catalogue: ViewCatalogue,
    filters: FilterState,
    cache: ViewCache,
    budget: Option<RecomputeBudget>,
}

impl Dashboard {
    /// Builds a dashboard over `tables`, which should be the six datasets
    /// of [`crate::datasets`]. Starts unrestricted: every dimension value
    /// selected.
    pub fn new(tables: Vec<Table>) -> EngineResult<Self> {
        let mut registry = DatasetRegistry::new();
        for table in tables {
            registry.register(table)?;
        }
        let dimensions = DimensionCatalogue::build(&registry, DIMENSIONS);
        let catalogue = views::catalogue()?;
        catalogue.validate(&registry, &dimensions)?;
        debug!(
            "dashboard ready: {} datasets, {} views",
            registry.len(),
            catalogue.len()
        );
        Ok(Dashboard {
            registry,
            dimensions,
            catalogue,
            filters: FilterState::new(),
            cache: ViewCache::new(),
            budget: None,
        })
    }

    /// Caps the filtered input rows any single view may read.
    pub fn with_budget(mut self, budget: RecomputeBudget) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Valid values of a dimension, sorted, for a filter picker.
    pub fn dimension_values(&self, dimension: &str) -> EngineResult<Vec<Scalar>> {
        self.dimensions.scalar_values(dimension)
    }

    /// Restricts `dimension` to `values`. Rejected wholesale if any value
    /// is not in the dimension's catalogue; the previous selection stays.
    pub fn set_filter(
        &mut self,
        dimension: &str,
        values: impl IntoIterator<Item = Scalar>,
    ) -> EngineResult<()> {
        self.filters.set(&self.dimensions, dimension, values)
    }

    /// Restores pass-through for `dimension`.
    pub fn reset_filter(&mut self, dimension: &str) -> EngineResult<()> {
        if !self.dimensions.is_dimension(dimension) {
            return Err(EngineError::UnknownDimension(dimension.to_string()));
        }
        self.filters.clear(dimension);
        Ok(())
    }

    pub fn reset_all_filters(&mut self) {
        self.filters.clear_all();
    }

    /// The current selection for `dimension`: `None` when unrestricted.
    pub fn selection(&self, dimension: &str) -> Option<Vec<Scalar>> {
        self.filters
            .selection(dimension)
            .map(|keys| keys.iter().map(|k| k.to_scalar()).collect())
    }

    /// Renders one view under the current filters.
    pub fn view(&mut self, id: &str) -> EngineResult<ChartPayload> {
        let recipe = self.catalogue.get(id)?;
        let view =
            self.cache
                .get_or_recompute(&self.registry, &self.filters, recipe, self.budget)?;
        Ok(ChartPayload::from_view(view))
    }

    /// Renders every view in catalogue order.
    pub fn render_all(&mut self) -> EngineResult<Vec<ChartPayload>> {
        let mut payloads = Vec::with_capacity(self.catalogue.len());
        for recipe in self.catalogue.iter() {
            let view =
                self.cache
                    .get_or_recompute(&self.registry, &self.filters, recipe, self.budget)?;
            payloads.push(ChartPayload::from_view(view));
        }
        Ok(payloads)
    }

    /// View ids in catalogue order.
    pub fn view_ids(&self) -> Vec<&str> {
        self.catalogue.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
