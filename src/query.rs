//! Predicate combinators and their translation into the store's query syntax.
//!
//! Handlers build a [`Predicate`] from query-string parameters; the single
//! translation point is [`Predicate::to_search_string`], which renders the
//! RediSearch query executed by `FT.SEARCH`. The in-memory backend evaluates
//! the same combinators directly, so both backends answer identically.

use std::fmt;
use std::str::FromStr;

use crate::error::RolodexError;

/// Distance unit for geo-radius queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Meters,
    Kilometers,
    Miles,
    Feet,
}

impl DistanceUnit {
    /// The unit token used in the store's geo query syntax.
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::Meters => "m",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
            DistanceUnit::Feet => "ft",
        }
    }

    /// Convert a radius in this unit to meters.
    pub fn to_meters(&self, radius: f64) -> f64 {
        match self {
            DistanceUnit::Meters => radius,
            DistanceUnit::Kilometers => radius * 1000.0,
            DistanceUnit::Miles => radius * 1609.344,
            DistanceUnit::Feet => radius * 0.3048,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceUnit {
    type Err = RolodexError;

    /// Accepts the short store tokens and their long names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" => Ok(DistanceUnit::Meters),
            "km" | "kilometer" | "kilometers" => Ok(DistanceUnit::Kilometers),
            "mi" | "mile" | "miles" => Ok(DistanceUnit::Miles),
            "ft" | "foot" | "feet" => Ok(DistanceUnit::Feet),
            other => Err(RolodexError::Validation(format!(
                "unrecognized distance unit {other:?}, expected one of m, km, mi, ft"
            ))),
        }
    }
}

/// A composable query predicate over indexed fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact match on a tag field; on array-valued tag fields this is a
    /// membership test.
    Tag { field: String, value: String },
    /// Inclusive numeric range.
    NumericRange { field: String, min: f64, max: f64 },
    /// Full-text match; every token must occur in the field.
    Text { field: String, query: String },
    /// Radius query around a center point on a geo field.
    GeoRadius {
        field: String,
        longitude: f64,
        latitude: f64,
        radius: f64,
        unit: DistanceUnit,
    },
    /// All sub-predicates must match.
    And(Vec<Predicate>),
    /// At least one sub-predicate must match.
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn tag(field: &str, value: impl Into<String>) -> Self {
        Predicate::Tag {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn numeric_range(field: &str, min: f64, max: f64) -> Self {
        Predicate::NumericRange {
            field: field.to_string(),
            min,
            max,
        }
    }

    pub fn text(field: &str, query: impl Into<String>) -> Self {
        Predicate::Text {
            field: field.to_string(),
            query: query.into(),
        }
    }

    pub fn geo_radius(
        field: &str,
        longitude: f64,
        latitude: f64,
        radius: f64,
        unit: DistanceUnit,
    ) -> Self {
        Predicate::GeoRadius {
            field: field.to_string(),
            longitude,
            latitude,
            radius,
            unit,
        }
    }

    /// Render the predicate in the store's query syntax.
    pub fn to_search_string(&self) -> String {
        match self {
            Predicate::Tag { field, value } => {
                format!("@{field}:{{{}}}", escape_tag(value))
            }
            Predicate::NumericRange { field, min, max } => {
                format!("@{field}:[{min} {max}]")
            }
            Predicate::Text { field, query } => {
                format!("@{field}:({})", escape_text(query))
            }
            Predicate::GeoRadius {
                field,
                longitude,
                latitude,
                radius,
                unit,
            } => {
                format!("@{field}:[{longitude} {latitude} {radius} {unit}]")
            }
            Predicate::And(parts) if parts.is_empty() => "*".to_string(),
            Predicate::And(parts) => {
                let rendered: Vec<String> = parts.iter().map(|p| p.to_search_string()).collect();
                format!("({})", rendered.join(" "))
            }
            Predicate::Or(parts) if parts.is_empty() => "*".to_string(),
            Predicate::Or(parts) => {
                let rendered: Vec<String> = parts.iter().map(|p| p.to_search_string()).collect();
                format!("({})", rendered.join(" | "))
            }
        }
    }
}

/// Escape a tag value: every character outside `[A-Za-z0-9_]` is significant
/// to the query parser and must be backslash-escaped.
fn escape_tag(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape query-syntax characters inside a full-text query while keeping
/// whitespace so multi-word queries still intersect per token.
fn escape_text(query: &str) -> String {
    const SPECIAL: &str = "(){}[]\"'|@!&~*:;,.<>=%^$#+-/\\?";
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        if SPECIAL.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
