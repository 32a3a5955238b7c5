// SPDX-License-Identifier: Apache-2.0

//! Single-dimension predicates.
//!
//! A [`FieldMatcher`] is one [`FilterSpec`] resolved against a field
//! registry. Field names the registry does not declare are not an error:
//! such a dimension fails closed (search reads the field as empty text).

use std::collections::BTreeSet;

use adops_model::{parse_date, FieldRead, FieldRegistry, FieldValue, Getter};
use chrono::NaiveDate;

use crate::filters::{present_bound, FilterSpec, Selection};
use crate::normalize::normalize_text;
use crate::query_error::QueryError;

enum Rule<R> {
    Unconstrained,
    Contains {
        needle: String,
        getters: Vec<Getter<R>>,
    },
    Equals {
        key: String,
        getter: Option<Getter<R>>,
    },
    AnyOf {
        keys: BTreeSet<String>,
        getter: Option<Getter<R>>,
    },
    DateRange {
        start: Bound,
        end: Bound,
        getter: Option<Getter<R>>,
    },
    Toggle {
        value: bool,
        getter: Option<Getter<R>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Absent,
    At(NaiveDate),
    Malformed,
}

impl Bound {
    fn parse(raw: &Option<String>) -> Self {
        match present_bound(raw) {
            None => Self::Absent,
            Some(raw) => parse_date(raw).map_or(Self::Malformed, Self::At),
        }
    }
}

pub struct FieldMatcher<R> {
    dimension: String,
    rule: Rule<R>,
}

impl<R> FieldMatcher<R> {
    pub fn compile(spec: &FilterSpec, registry: &FieldRegistry<R>) -> Result<Self, QueryError> {
        if spec.dimension.trim().is_empty() {
            return Err(QueryError::validation("filter dimension must not be empty"));
        }
        let rule = match &spec.selection {
            Selection::Search { term } => {
                let needle = normalize_text(term.trim());
                if needle.is_empty() {
                    Rule::Unconstrained
                } else {
                    let names = if spec.fields.is_empty() {
                        registry
                            .searchable_fields()
                            .into_iter()
                            .map(|f| f.as_str().to_string())
                            .collect()
                    } else {
                        spec.fields.clone()
                    };
                    let getters = names
                        .iter()
                        .filter_map(|name| registry.get(name).map(|d| d.getter()))
                        .collect();
                    Rule::Contains { needle, getters }
                }
            }
            selection if !selection.is_active() => {
                single_field(spec)?;
                Rule::Unconstrained
            }
            Selection::Equals { value } => Rule::Equals {
                key: value.as_deref().unwrap_or_default().trim().to_string(),
                getter: lookup(registry, single_field(spec)?),
            },
            Selection::AnyOf { values } => Rule::AnyOf {
                keys: values.clone(),
                getter: lookup(registry, single_field(spec)?),
            },
            Selection::DateRange { start, end } => Rule::DateRange {
                start: Bound::parse(start),
                end: Bound::parse(end),
                getter: lookup(registry, single_field(spec)?),
            },
            Selection::Toggle { value } => Rule::Toggle {
                value: value.unwrap_or_default(),
                getter: lookup(registry, single_field(spec)?),
            },
        };
        Ok(Self {
            dimension: spec.dimension.clone(),
            rule,
        })
    }

    #[must_use]
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self.rule, Rule::Unconstrained)
    }

    pub fn matches(&self, record: &R) -> bool {
        match &self.rule {
            Rule::Unconstrained => true,
            Rule::Contains { needle, getters } => getters.iter().any(|getter| {
                match getter(record) {
                    FieldRead::Value(value) => normalize_text(&value.key()).contains(needle),
                    FieldRead::Missing | FieldRead::Malformed(_) => false,
                }
            }),
            Rule::Equals { key, getter } => {
                read_value(getter.as_ref(), record).is_some_and(|v| v.key() == *key)
            }
            Rule::AnyOf { keys, getter } => {
                read_value(getter.as_ref(), record).is_some_and(|v| keys.contains(&v.key()))
            }
            Rule::DateRange { start, end, getter } => {
                let Some(date) = read_value(getter.as_ref(), record).and_then(|v| date_of(&v))
                else {
                    return false;
                };
                within(*start, |bound| date >= bound) && within(*end, |bound| date <= bound)
            }
            Rule::Toggle { value, getter } => {
                read_value(getter.as_ref(), record).and_then(|v| v.as_bool()) == Some(*value)
            }
        }
    }
}

/// `matches(record, filterSpec)` without keeping the compiled matcher.
pub fn matches<R>(
    registry: &FieldRegistry<R>,
    record: &R,
    spec: &FilterSpec,
) -> Result<bool, QueryError> {
    Ok(FieldMatcher::compile(spec, registry)?.matches(record))
}

fn single_field(spec: &FilterSpec) -> Result<&str, QueryError> {
    match spec.fields.as_slice() {
        [field] => Ok(field.as_str()),
        _ => Err(QueryError::validation(format!(
            "{} filter `{}` must name exactly one field",
            spec.selection.kind_str(),
            spec.dimension
        ))),
    }
}

fn lookup<R>(registry: &FieldRegistry<R>, field: &str) -> Option<Getter<R>> {
    registry.get(field).map(|d| d.getter())
}

fn read_value<R>(getter: Option<&Getter<R>>, record: &R) -> Option<FieldValue> {
    getter.and_then(|g| g(record).into_value())
}

fn date_of(value: &FieldValue) -> Option<NaiveDate> {
    match value {
        FieldValue::Date(d) => Some(*d),
        FieldValue::Text(s) | FieldValue::Category(s) => parse_date(s),
        FieldValue::Number(_) | FieldValue::Bool(_) => None,
    }
}

/// A malformed bound matches nothing.
fn within(bound: Bound, check: impl Fn(NaiveDate) -> bool) -> bool {
    match bound {
        Bound::Absent => true,
        Bound::At(b) => check(b),
        Bound::Malformed => false,
    }
}
