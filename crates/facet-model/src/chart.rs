//! Chart kinds a derived view can be rendered as.

use serde::{Deserialize, Serialize};

/// The visual shape a view renders into. The engine never draws anything;
/// the kind travels with the derived table so a frontend can pick the mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Line,
    BarGrouped,
    BarStacked,
    AreaStacked,
    Heatmap,
    Pie,
    Sunburst,
    Scatter,
    Bubble,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::BarGrouped => "barGrouped",
            ChartKind::BarStacked => "barStacked",
            ChartKind::AreaStacked => "areaStacked",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Pie => "pie",
            ChartKind::Sunburst => "sunburst",
            ChartKind::Scatter => "scatter",
            ChartKind::Bubble => "bubble",
        }
    }

    /// Kinds that plot one mark per source row rather than per group.
    pub fn is_row_level(&self) -> bool {
        matches!(self, ChartKind::Scatter | ChartKind::Bubble)
    }
}
