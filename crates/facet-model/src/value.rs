//! Scalar cell values and their canonical ordering.
//!
//! Dashboards group, deduplicate and sort cell values constantly, so the
//! ordering rules live here next to the value type instead of being
//! re-derived ad hoc by every consumer. Floats are not `Eq`, which makes
//! `Scalar` unusable as a grouping key directly; [`ScalarKey`] is the
//! hashable mirror that canonicalises the float payload first.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single cell value in a dataset table.
///
/// `Int` and `Number` are kept apart so that integer columns (years,
/// quarters, counts) survive round trips without picking up a fractional
/// representation, but the two still sort together numerically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Scalar {
    Null,
    Int(i64),
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Numeric view of the value, if it has one. `Int` widens to `f64`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Short lowercase name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Int(_) => "int",
            Scalar::Number(_) => "number",
            Scalar::Text(_) => "text",
            Scalar::Date(_) => "date",
        }
    }

    /// Canonical grouping/sorting key for this value.
    pub fn to_key(&self) -> ScalarKey {
        match self {
            Scalar::Null => ScalarKey::Null,
            Scalar::Int(i) => ScalarKey::Int(*i),
            Scalar::Number(n) => ScalarKey::Number(canonical_number_bits(*n)),
            Scalar::Text(s) => ScalarKey::Text(s.clone()),
            Scalar::Date(d) => ScalarKey::Date(*d),
        }
    }

    /// Human-readable rendering, as a table cell would show it. Null is the
    /// empty string here; group axes use [`Scalar::group_label`] instead.
    ///
    /// Whole-valued floats drop the trailing `.0` so a `Number(2023.0)`
    /// year reads the same as an `Int(2023)` one.
    pub fn display_string(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Number(n) => format_number(*n),
            Scalar::Text(s) => s.clone(),
            Scalar::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Axis/legend rendering: like [`Scalar::display_string`] but nulls get
    /// a visible `"(null)"` label so their group is not an unnamed gap.
    pub fn group_label(&self) -> String {
        match self {
            Scalar::Null => "(null)".to_string(),
            other => other.display_string(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.group_label())
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(d: NaiveDate) -> Self {
        Scalar::Date(d)
    }
}

/// Hashable, totally ordered mirror of [`Scalar`].
///
/// Floats are stored as canonical bit patterns so `-0.0` and `0.0` land in
/// the same group and every NaN collapses to one key. The `Ord` impl gives
/// the cross-type order used everywhere values of mixed type meet: numbers
/// first (ints and floats interleaved by magnitude), then dates, then text,
/// with nulls last.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ScalarKey {
    Null,
    Int(i64),
    Number(u64),
    Text(String),
    Date(NaiveDate),
}

impl ScalarKey {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarKey::Null)
    }

    /// Converts the key back into the value it was made from.
    pub fn to_scalar(&self) -> Scalar {
        match self {
            ScalarKey::Null => Scalar::Null,
            ScalarKey::Int(i) => Scalar::Int(*i),
            ScalarKey::Number(bits) => Scalar::Number(f64::from_bits(*bits)),
            ScalarKey::Text(s) => Scalar::Text(s.clone()),
            ScalarKey::Date(d) => Scalar::Date(*d),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            ScalarKey::Int(_) | ScalarKey::Number(_) => 0,
            ScalarKey::Date(_) => 1,
            ScalarKey::Text(_) => 2,
            ScalarKey::Null => 3,
        }
    }

    fn numeric(&self) -> Option<f64> {
        match self {
            ScalarKey::Int(i) => Some(*i as f64),
            ScalarKey::Number(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }
}

impl Ord for ScalarKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = self.kind_rank().cmp(&other.kind_rank());
        if rank != Ordering::Equal {
            return rank;
        }
        match (self, other) {
            (ScalarKey::Int(a), ScalarKey::Int(b)) => a.cmp(b),
            (ScalarKey::Date(a), ScalarKey::Date(b)) => a.cmp(b),
            (ScalarKey::Text(a), ScalarKey::Text(b)) => cmp_text(a, b),
            (ScalarKey::Null, ScalarKey::Null) => Ordering::Equal,
            _ => {
                // Mixed int/float: compare numerically, and when the two are
                // numerically equal keep ints before floats so the order
                // stays total and agrees with Eq.
                let a = self.numeric().unwrap_or(f64::NAN);
                let b = other.numeric().unwrap_or(f64::NAN);
                a.total_cmp(&b).then_with(|| match (self, other) {
                    (ScalarKey::Int(_), ScalarKey::Number(_)) => Ordering::Less,
                    (ScalarKey::Number(_), ScalarKey::Int(_)) => Ordering::Greater,
                    _ => Ordering::Equal,
                })
            }
        }
    }
}

impl PartialOrd for ScalarKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Canonical bit pattern for an `f64` used in keys: `-0.0` maps to `0.0`
/// and every NaN payload maps to the single quiet NaN.
pub fn canonical_number_bits(n: f64) -> u64 {
    if n == 0.0 {
        return 0.0_f64.to_bits();
    }
    if n.is_nan() {
        return f64::NAN.to_bits();
    }
    n.to_bits()
}

/// Case-insensitive text order with a case-sensitive tiebreak, so distinct
/// strings never compare equal.
fn cmp_text(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_uppercase)
        .cmp(b.chars().flat_map(char::to_uppercase));
    folded.then_with(|| a.cmp(b))
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
