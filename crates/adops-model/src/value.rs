// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Bool,
    Category,
}

impl FieldKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Bool => "bool",
            Self::Category => "category",
        }
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
    Category(String),
}

impl FieldValue {
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Number(_) => FieldKind::Number,
            Self::Date(_) => FieldKind::Date,
            Self::Bool(_) => FieldKind::Bool,
            Self::Category(_) => FieldKind::Category,
        }
    }

    /// Canonical string form used for equality, set membership and search.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Text(s) | Self::Category(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Integral values print without a fractional part: `200`, not `200.0`.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`;
/// timestamps contribute their date part.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Result of reading one declared field from one record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRead {
    Value(FieldValue),
    Missing,
    Malformed(String),
}

impl FieldRead {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Value(FieldValue::Text(value.into()))
    }

    pub fn category(value: impl Into<String>) -> Self {
        Self::Value(FieldValue::Category(value.into()))
    }

    #[must_use]
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Self::Value(FieldValue::Number(value))
        } else {
            Self::Malformed(format!("non-finite number {value}"))
        }
    }

    #[must_use]
    pub fn count(value: u64) -> Self {
        Self::number(value as f64)
    }

    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        Self::Value(FieldValue::Bool(value))
    }

    /// Blank input reads as missing; anything unparseable is malformed.
    #[must_use]
    pub fn date(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::Missing;
        }
        match parse_date(raw) {
            Some(date) => Self::Value(FieldValue::Date(date)),
            None => Self::Malformed(format!("unparseable date `{raw}`")),
        }
    }

    #[must_use]
    pub fn optional_text(value: Option<&str>) -> Self {
        value.map_or(Self::Missing, |v| Self::text(v))
    }

    #[must_use]
    pub fn optional_date(value: Option<&str>) -> Self {
        value.map_or(Self::Missing, Self::date)
    }

    /// Ratio as a percentage, 0 when the denominator is 0.
    #[must_use]
    pub fn percentage(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Self::number(0.0)
        } else {
            Self::number(100.0 * numerator / denominator)
        }
    }

    #[must_use]
    pub const fn value(&self) -> Option<&FieldValue> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<FieldValue> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}
