// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Literal a single-select dropdown uses for "no constraint".
pub const ALL_SENTINEL: &str = "all";

/// Dimension name used by [`FilterSpec::search`].
pub const SEARCH_DIMENSION: &str = "search";

/// The current user selection for one filter dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    /// Case-insensitive substring over one or more fields.
    Search { term: String },
    /// Single-select dropdown.
    Equals {
        #[serde(default)]
        value: Option<String>,
    },
    /// Multi-select; OR within the set.
    AnyOf {
        #[serde(default)]
        values: BTreeSet<String>,
    },
    /// Inclusive bounds as typed into date inputs; empty means absent.
    DateRange {
        #[serde(default)]
        start: Option<String>,
        #[serde(default)]
        end: Option<String>,
    },
    Toggle {
        #[serde(default)]
        value: Option<bool>,
    },
}

impl Selection {
    /// Whether this selection constrains anything at all.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match self {
            Self::Search { term } => !term.trim().is_empty(),
            Self::Equals { value } => value.as_deref().is_some_and(is_constraining),
            Self::AnyOf { values } => !values.is_empty(),
            Self::DateRange { start, end } => {
                present_bound(start).is_some() || present_bound(end).is_some()
            }
            Self::Toggle { value } => value.is_some(),
        }
    }

    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Search { .. } => "search",
            Self::Equals { .. } => "equals",
            Self::AnyOf { .. } => "any_of",
            Self::DateRange { .. } => "date_range",
            Self::Toggle { .. } => "toggle",
        }
    }
}

fn is_constraining(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.eq_ignore_ascii_case(ALL_SENTINEL)
}

/// A date bound that is present after trimming.
pub(crate) fn present_bound(bound: &Option<String>) -> Option<&str> {
    bound.as_deref().map(str::trim).filter(|b| !b.is_empty())
}

/// One filter dimension: which fields it reads and what the user selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub dimension: String,
    /// Fields read by this dimension. Search may list several (empty means
    /// the screen's searchable fields); every other selection reads one.
    #[serde(default)]
    pub fields: Vec<String>,
    pub selection: Selection,
}

impl FilterSpec {
    /// Search box over the screen's searchable fields.
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            dimension: SEARCH_DIMENSION.to_string(),
            fields: Vec::new(),
            selection: Selection::Search { term: term.into() },
        }
    }

    pub fn search_in<I, S>(fields: I, term: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dimension: SEARCH_DIMENSION.to_string(),
            fields: fields.into_iter().map(Into::into).collect(),
            selection: Selection::Search { term: term.into() },
        }
    }

    pub fn equals(field: &str, value: Option<&str>) -> Self {
        Self::single(
            field,
            Selection::Equals {
                value: value.map(str::to_string),
            },
        )
    }

    pub fn any_of<I, S>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::single(
            field,
            Selection::AnyOf {
                values: values.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn date_range(field: &str, start: Option<&str>, end: Option<&str>) -> Self {
        Self::single(
            field,
            Selection::DateRange {
                start: start.map(str::to_string),
                end: end.map(str::to_string),
            },
        )
    }

    pub fn toggle(field: &str, value: Option<bool>) -> Self {
        Self::single(field, Selection::Toggle { value })
    }

    /// Renames the dimension, e.g. two date ranges over different fields.
    #[must_use]
    pub fn named(mut self, dimension: impl Into<String>) -> Self {
        self.dimension = dimension.into();
        self
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.selection.is_active()
    }

    fn single(field: &str, selection: Selection) -> Self {
        Self {
            dimension: field.to_string(),
            fields: vec![field.to_string()],
            selection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equals_treats_all_and_blank_as_unset() {
        assert!(!FilterSpec::equals("status", None).is_active());
        assert!(!FilterSpec::equals("status", Some("")).is_active());
        assert!(!FilterSpec::equals("status", Some("All")).is_active());
        assert!(FilterSpec::equals("status", Some("Active")).is_active());
    }

    #[test]
    fn date_range_needs_one_present_bound() {
        assert!(!FilterSpec::date_range("start_date", None, Some("  ")).is_active());
        assert!(FilterSpec::date_range("start_date", Some("2024-01-01"), None).is_active());
    }

    #[test]
    fn selections_serialize_with_a_kind_tag() {
        let spec = FilterSpec::any_of("status", ["Paused", "Active"]);
        let json = serde_json::to_value(&spec).expect("encode");
        assert_eq!(json["selection"]["kind"], "any_of");
        assert_eq!(json["selection"]["values"], serde_json::json!(["Active", "Paused"]));
    }
}
