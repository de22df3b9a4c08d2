//! Declarative view recipes.
//!
//! A [`ViewRecipe`] is the immutable description of one dashboard view:
//! which table(s) it reads, which dimensions it listens to, how the rows
//! are transformed (projection, group-aggregate, cross-tab or multi-table
//! union) and how the result is meant to be drawn. Recipes are plain serde
//! data; resolving and executing them against live tables is the engine's
//! job, which also reports every structural problem a recipe may have
//! (missing columns, malformed bins) before first use.

use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::chart::ChartKind;
use crate::value::Scalar;

/// How a measure column is reduced within each group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Aggregation {
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Count => "count",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }
}

/// A measure: the column to reduce, the reduction, and optionally the name
/// the result column takes in the output (defaults to the source column).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub column: String,
    pub agg: Aggregation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Measure {
    pub fn new(column: impl Into<String>, agg: Aggregation) -> Self {
        Measure {
            column: column.into(),
            agg,
            name: None,
        }
    }

    pub fn sum(column: impl Into<String>) -> Self {
        Measure::new(column, Aggregation::Sum)
    }

    pub fn mean(column: impl Into<String>) -> Self {
        Measure::new(column, Aggregation::Mean)
    }

    pub fn count(column: impl Into<String>) -> Self {
        Measure::new(column, Aggregation::Count)
    }

    pub fn min(column: impl Into<String>) -> Self {
        Measure::new(column, Aggregation::Min)
    }

    pub fn max(column: impl Into<String>) -> Self {
        Measure::new(column, Aggregation::Max)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name the reduced column carries in the derived table.
    pub fn output_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.column)
    }
}

/// Right-closed numeric buckets: bucket `i` is `(edges[i], edges[i + 1]]`.
///
/// A value equal to an inner edge belongs to the bucket below it; a value
/// at or below the first edge, above the last, or NaN falls outside every
/// bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinSpec {
    pub edges: Vec<f64>,
    pub labels: Vec<String>,
}

impl BinSpec {
    pub fn new(
        edges: impl IntoIterator<Item = f64>,
        labels: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        BinSpec {
            edges: edges.into_iter().collect(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Structural check: at least two finite, strictly increasing edges and
    /// one label per bucket.
    pub fn validate(&self) -> Result<(), String> {
        if self.edges.len() < 2 {
            return Err("bins need at least two edges".to_string());
        }
        if self.edges.iter().any(|e| !e.is_finite()) {
            return Err("bin edges must be finite".to_string());
        }
        if self.edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err("bin edges must be strictly increasing".to_string());
        }
        if self.labels.len() + 1 != self.edges.len() {
            return Err(format!(
                "expected {} bin labels for {} edges, got {}",
                self.edges.len() - 1,
                self.edges.len(),
                self.labels.len()
            ));
        }
        Ok(())
    }

    /// Bucket index for `value`, or `None` when it lies outside every
    /// bucket. Assumes [`BinSpec::validate`] has passed.
    pub fn bucket(&self, value: f64) -> Option<usize> {
        let first = *self.edges.first()?;
        let last = *self.edges.last()?;
        if !(value > first && value <= last) {
            return None;
        }
        Some(self.edges[1..].partition_point(|edge| *edge < value))
    }

    /// Label for `value`'s bucket.
    pub fn label_for(&self, value: f64) -> Option<&str> {
        self.bucket(value).map(|i| self.labels[i].as_str())
    }
}

/// The two columns a composite year+quarter period is read from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSpec {
    pub year: String,
    pub quarter: String,
}

impl PeriodSpec {
    pub fn new(year: impl Into<String>, quarter: impl Into<String>) -> Self {
        PeriodSpec {
            year: year.into(),
            quarter: quarter.into(),
        }
    }
}

/// An expression the group-by axes are keyed on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GroupKey {
    /// A column's value, grouped by exact equality.
    Column { name: String },
    /// Composite year+quarter period. Groups order by the `(year, quarter)`
    /// value pair, never by the rendered `"2023-Q4"` label.
    Period(PeriodSpec),
    /// Numeric column mapped through right-closed buckets; `label` is the
    /// output column name.
    Binned {
        column: String,
        bins: BinSpec,
        label: String,
    },
}

impl GroupKey {
    pub fn column(name: impl Into<String>) -> Self {
        GroupKey::Column { name: name.into() }
    }

    pub fn period(year: impl Into<String>, quarter: impl Into<String>) -> Self {
        GroupKey::Period(PeriodSpec::new(year, quarter))
    }

    pub fn binned(column: impl Into<String>, bins: BinSpec, label: impl Into<String>) -> Self {
        GroupKey::Binned {
            column: column.into(),
            bins,
            label: label.into(),
        }
    }

    /// Name of the column this key produces in the derived table.
    pub fn output_column(&self) -> &str {
        match self {
            GroupKey::Column { name } => name,
            GroupKey::Period(_) => "period",
            GroupKey::Binned { label, .. } => label,
        }
    }
}

/// Presentation-only re-sort applied after a transform's canonical output
/// order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(column: impl Into<String>) -> Self {
        SortSpec {
            column: column.into(),
            descending: false,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        SortSpec {
            column: column.into(),
            descending: true,
        }
    }
}

/// One contribution to a multi-table union: a source table, the measure
/// reduced per period, and the label rows carry in the `series` column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    pub table: String,
    pub measure: Measure,
    pub label: String,
}

impl SeriesSpec {
    pub fn new(table: impl Into<String>, measure: Measure, label: impl Into<String>) -> Self {
        SeriesSpec {
            table: table.into(),
            measure,
            label: label.into(),
        }
    }
}

/// How filtered source rows become the view's table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Transform {
    /// Projection of the filtered rows onto `columns`, in source row order
    /// unless re-sorted.
    Select {
        columns: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sort: Option<SortSpec>,
    },
    /// Group by the key tuple, reduce one measure per group. Output rows
    /// ascend by key tuple unless re-sorted.
    Aggregate {
        keys: Vec<GroupKey>,
        measure: Measure,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sort: Option<SortSpec>,
    },
    /// Two-axis cross-tab. Both axes ascend by key; cells with no
    /// contributing rows take `fill`.
    Pivot {
        index: GroupKey,
        columns: GroupKey,
        measure: Measure,
        fill: Scalar,
    },
    /// Union of per-series period aggregates into long
    /// `(period, series, value)` rows, ordered by period then label.
    Concat {
        series: Vec<SeriesSpec>,
        period: PeriodSpec,
    },
}

/// The table (or, for unions, tables) a recipe reads.
///
/// Serializes as a bare string for the common single-table case and as a
/// list otherwise.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceSpec {
    Table(String),
    Tables(Vec<String>),
}

impl SourceSpec {
    /// Every source table name, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            SourceSpec::Table(name) => std::slice::from_ref(name),
            SourceSpec::Tables(names) => names.as_slice(),
        };
        slice.iter().map(String::as_str)
    }

    /// The single source table, when there is exactly one.
    pub fn single(&self) -> Option<&str> {
        match self {
            SourceSpec::Table(name) => Some(name),
            SourceSpec::Tables(names) if names.len() == 1 => Some(&names[0]),
            SourceSpec::Tables(_) => None,
        }
    }
}

impl Serialize for SourceSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SourceSpec::Table(name) => serializer.serialize_str(name),
            SourceSpec::Tables(names) => names.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SourceSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            One(String),
            Many(Vec<String>),
        }
        match Helper::deserialize(deserializer)? {
            Helper::One(name) => Ok(SourceSpec::Table(name)),
            Helper::Many(names) if !names.is_empty() => Ok(SourceSpec::Tables(names)),
            Helper::Many(_) => Err(D::Error::custom("source table list may not be empty")),
        }
    }
}

/// Column bindings the renderer reads from the derived table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl Encoding {
    pub fn xy(x: impl Into<String>, y: impl Into<String>) -> Self {
        Encoding {
            x: Some(x.into()),
            y: Some(y.into()),
            ..Encoding::default()
        }
    }

    pub fn with_hue(mut self, hue: impl Into<String>) -> Self {
        self.hue = Some(hue.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// The bound column names, in `x, y, hue, size` order.
    pub fn bound_columns(&self) -> impl Iterator<Item = &str> {
        [&self.x, &self.y, &self.hue, &self.size]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }
}

/// One dashboard view: identity, sources, the dimensions whose filters it
/// listens to, the transform, and how the result is drawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecipe {
    pub id: String,
    pub title: String,
    pub source: SourceSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<String>,
    pub transform: Transform,
    pub chart: ChartKind,
    #[serde(default)]
    pub encoding: Encoding,
}

impl ViewRecipe {
    /// Single-source recipe with no dimensions and an empty encoding; chain
    /// [`ViewRecipe::with_dimensions`] / [`ViewRecipe::with_encoding`].
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        table: impl Into<String>,
        transform: Transform,
        chart: ChartKind,
    ) -> Self {
        ViewRecipe {
            id: id.into(),
            title: title.into(),
            source: SourceSpec::Table(table.into()),
            dimensions: Vec::new(),
            transform,
            chart,
            encoding: Encoding::default(),
        }
    }

    /// Multi-table union recipe; the source list is taken from the series.
    pub fn concat(
        id: impl Into<String>,
        title: impl Into<String>,
        series: Vec<SeriesSpec>,
        period: PeriodSpec,
        chart: ChartKind,
    ) -> Self {
        let tables = series.iter().map(|s| s.table.clone()).collect();
        ViewRecipe {
            id: id.into(),
            title: title.into(),
            source: SourceSpec::Tables(tables),
            dimensions: Vec::new(),
            transform: Transform::Concat { series, period },
            chart,
            encoding: Encoding::default(),
        }
    }

    pub fn with_dimensions(
        mut self,
        dimensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.dimensions = dimensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}
