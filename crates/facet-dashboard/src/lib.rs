//! The assembled analytics dashboard: six datasets, two global filter
//! dimensions and a nineteen-view catalogue over the facet engine.
//!
//! [`Dashboard`] is the entry point. Feed it the six tables (usually via
//! [`datasets::load_dataset`]), then drive it with `set_filter` /
//! `reset_filter` and pull [`ChartPayload`]s with `view` or `render_all`.

#![forbid(unsafe_code)]

pub mod dashboard;
pub mod datasets;
pub mod render;
pub mod views;

pub use dashboard::Dashboard;
pub use datasets::{load_dataset, LoadError};
pub use render::ChartPayload;
