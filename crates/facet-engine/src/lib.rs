//! Filter-propagation and aggregation engine for Facet dashboards.
//!
//! The engine owns the moving parts between raw datasets and rendered
//! charts: a [`DatasetRegistry`] of read-only tables, a
//! [`DimensionCatalogue`] of valid filter values, the user's
//! [`FilterState`], and [`derive`], which executes a
//! [`facet_model::ViewRecipe`] against the filtered tables. Everything is
//! single-threaded and recomputed per interaction; [`ViewCache`] spares
//! recomputes whose inputs did not change, without ever changing results.

#![forbid(unsafe_code)]

pub mod catalogue;
pub mod derive;
pub mod dimensions;
pub mod error;
pub mod filter;
pub mod recompute;
pub mod registry;

pub use catalogue::ViewCatalogue;
pub use derive::derive;
pub use dimensions::DimensionCatalogue;
pub use error::{EngineError, EngineResult};
pub use filter::FilterState;
pub use recompute::{
    recompute, recompute_bounded, CacheStats, MaterializedView, RecomputeBudget, ViewCache,
};
pub use registry::DatasetRegistry;
