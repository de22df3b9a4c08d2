//! Render payloads: the serialized boundary between engine and drawing.
//!
//! A [`ChartPayload`] is everything a frontend needs to draw one view and
//! nothing it does not: identity, chart kind, encoding, and the derived
//! table flattened to column names plus rows. The engine guarantees shape
//! and ordering; what the payload becomes on screen is not its concern.

use facet_engine::MaterializedView;
use facet_model::{ChartKind, Encoding, Scalar};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
    pub recipe_id: String,
    pub title: String,
    pub chart: ChartKind,
    pub encoding: Encoding,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
}

impl ChartPayload {
    pub fn from_view(view: &MaterializedView) -> Self {
        ChartPayload {
            recipe_id: view.recipe_id.clone(),
            title: view.title.clone(),
            chart: view.chart,
            encoding: view.encoding.clone(),
            columns: view.table.column_names().map(str::to_string).collect(),
            rows: view.table.rows().to_vec(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<&MaterializedView> for ChartPayload {
    fn from(view: &MaterializedView) -> Self {
        ChartPayload::from_view(view)
    }
}
