// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use adops_model::{FieldRead, FieldRegistry, FieldValue, Getter};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::query_error::{QueryError, QueryErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(QueryError::validation(format!(
                "sort direction must be asc or desc, got `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Header-click convention: the active field flips direction, any other
    /// field starts ascending.
    #[must_use]
    pub fn toggle(current: Option<&Self>, field: &str) -> Self {
        match current {
            Some(active) if active.field == field => Self {
                field: active.field.clone(),
                direction: active.direction.toggled(),
            },
            _ => Self::asc(field),
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction.as_str())
    }
}

/// `field` or `field:asc|desc`.
impl FromStr for SortSpec {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, direction)) => (field.trim(), direction.parse()?),
            None => (s.trim(), SortDirection::Asc),
        };
        if field.is_empty() {
            return Err(QueryError::validation("sort field must not be empty"));
        }
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
    /// All-digit text such as a numeric identifier, leading zeros stripped.
    Digits(String),
    Text(String),
    Missing,
}

impl SortKey {
    fn from_value(value: FieldValue) -> Self {
        match value {
            FieldValue::Number(n) => Self::Number(n),
            FieldValue::Date(d) => Self::Date(d),
            FieldValue::Bool(b) => Self::Bool(b),
            FieldValue::Text(s) | FieldValue::Category(s) => Self::from_text(&s),
        }
    }

    fn from_text(text: &str) -> Self {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            let trimmed = text.trim_start_matches('0');
            Self::Digits(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
        } else {
            Self::Text(text.to_lowercase())
        }
    }

    fn text_form(&self) -> String {
        match self {
            Self::Number(n) => adops_model::format_number(*n),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Digits(s) | Self::Text(s) => s.clone(),
            Self::Missing => String::new(),
        }
    }
}

fn compare_present(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
        (SortKey::Date(x), SortKey::Date(y)) => x.cmp(y),
        (SortKey::Bool(x), SortKey::Bool(y)) => x.cmp(y),
        // Same length without leading zeros means plain string order is numeric order.
        (SortKey::Digits(x), SortKey::Digits(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
        (SortKey::Digits(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Digits(_)) => Ordering::Greater,
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        _ => a.text_form().cmp(&b.text_form()),
    }
}

/// Stable sort by one field. A field the registry does not declare leaves
/// the input order untouched.
pub struct RecordSorter<R> {
    spec: SortSpec,
    getter: Option<Getter<R>>,
}

impl<R> RecordSorter<R> {
    #[must_use]
    pub fn compile(spec: &SortSpec, registry: &FieldRegistry<R>) -> Self {
        Self {
            spec: spec.clone(),
            getter: registry.get(&spec.field).map(|d| d.getter()),
        }
    }

    #[must_use]
    pub fn spec(&self) -> &SortSpec {
        &self.spec
    }

    #[must_use]
    pub fn is_known_field(&self) -> bool {
        self.getter.is_some()
    }

    /// Missing values go last in both directions. A malformed value aborts
    /// the sort with a comparator error.
    pub fn apply<'a>(&self, records: Vec<&'a R>) -> Result<Vec<&'a R>, QueryError> {
        self.order(records, |r| *r)
    }

    /// Same ordering over positions into `records`.
    pub fn apply_indices(&self, records: &[R], indices: Vec<usize>) -> Result<Vec<usize>, QueryError> {
        self.order(indices, |&i| &records[i])
    }

    fn order<'r, T>(&self, items: Vec<T>, record: impl Fn(&T) -> &'r R) -> Result<Vec<T>, QueryError>
    where
        R: 'r,
    {
        let Some(getter) = &self.getter else {
            return Ok(items);
        };
        let mut keyed = Vec::with_capacity(items.len());
        for item in items {
            let key = match getter(record(&item)) {
                FieldRead::Value(value) => SortKey::from_value(value),
                FieldRead::Missing => SortKey::Missing,
                FieldRead::Malformed(reason) => {
                    return Err(QueryError::new(
                        QueryErrorCode::Comparator,
                        format!("cannot order by `{}`: {reason}", self.spec.field),
                    ));
                }
            };
            keyed.push((key, item));
        }
        let direction = self.spec.direction;
        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
            (SortKey::Missing, _) => Ordering::Greater,
            (_, SortKey::Missing) => Ordering::Less,
            _ => match direction {
                SortDirection::Asc => compare_present(a, b),
                SortDirection::Desc => compare_present(a, b).reverse(),
            },
        });
        Ok(keyed.into_iter().map(|(_, item)| item).collect())
    }
}

/// `apply(records, sortSpec)` against a registry.
pub fn sort_records<'a, R>(
    records: &'a [R],
    spec: &SortSpec,
    registry: &FieldRegistry<R>,
) -> Result<Vec<&'a R>, QueryError> {
    RecordSorter::compile(spec, registry).apply(records.iter().collect())
}
