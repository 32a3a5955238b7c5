// SPDX-License-Identifier: Apache-2.0

//! Stat-card aggregates.
//!
//! Every statistic is guarded: empty inputs and zero denominators yield 0
//! and no aggregate ever reports NaN or an infinity.

use std::collections::{BTreeMap, BTreeSet};

use adops_model::{FieldRead, FieldRegistry, FieldValue, Getter};
use serde::{Deserialize, Serialize};

use crate::filters::FilterSpec;
use crate::matcher::FieldMatcher;
use crate::query_error::{QueryError, QueryErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateScope {
    /// The records currently visible after filtering.
    #[default]
    Filtered,
    /// The whole record set, ignoring the view's filters.
    Global,
}

/// One side of a percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operand {
    Sum {
        field: String,
        #[serde(default)]
        predicate: Option<FilterSpec>,
    },
    Count {
        #[serde(default)]
        predicate: Option<FilterSpec>,
    },
}

impl Operand {
    pub fn sum(field: impl Into<String>) -> Self {
        Self::Sum {
            field: field.into(),
            predicate: None,
        }
    }

    #[must_use]
    pub fn count() -> Self {
        Self::Count { predicate: None }
    }

    #[must_use]
    pub fn count_where(predicate: FilterSpec) -> Self {
        Self::Count {
            predicate: Some(predicate),
        }
    }

    #[must_use]
    pub fn sum_where(field: impl Into<String>, predicate: FilterSpec) -> Self {
        Self::Sum {
            field: field.into(),
            predicate: Some(predicate),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "statistic", rename_all = "snake_case")]
pub enum Statistic {
    Sum {
        field: String,
    },
    Count,
    Average {
        field: String,
    },
    PercentageOf {
        numerator: Operand,
        denominator: Operand,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub name: String,
    pub statistic: Statistic,
    #[serde(default)]
    pub predicate: Option<FilterSpec>,
    #[serde(default)]
    pub scope: AggregateScope,
}

impl AggregateSpec {
    pub fn sum(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::with(name, Statistic::Sum { field: field.into() })
    }

    pub fn count(name: impl Into<String>) -> Self {
        Self::with(name, Statistic::Count)
    }

    pub fn average(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::with(name, Statistic::Average { field: field.into() })
    }

    pub fn percentage_of(name: impl Into<String>, numerator: Operand, denominator: Operand) -> Self {
        Self::with(
            name,
            Statistic::PercentageOf {
                numerator,
                denominator,
            },
        )
    }

    /// Narrows the records the statistic sees, e.g. count where
    /// `status == "Active"`.
    #[must_use]
    pub fn with_predicate(mut self, predicate: FilterSpec) -> Self {
        self.predicate = Some(predicate);
        self
    }

    #[must_use]
    pub fn global(mut self) -> Self {
        self.scope = AggregateScope::Global;
        self
    }

    fn with(name: impl Into<String>, statistic: Statistic) -> Self {
        Self {
            name: name.into(),
            statistic,
            predicate: None,
            scope: AggregateScope::Filtered,
        }
    }
}

/// Computed values by aggregate name. An absent key means the aggregate was
/// not requested, which is different from a computed zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Aggregates(BTreeMap<String, f64>);

impl Aggregates {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), finite_or_zero(value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[must_use]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `sum / count`, 0 when there is nothing to average.
#[must_use]
pub fn average(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        finite_or_zero(sum / count as f64)
    }
}

/// `100 × numerator / denominator`, 0 when the denominator is 0.
#[must_use]
pub fn percentage_of(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        finite_or_zero(100.0 * numerator / denominator)
    }
}

struct CompiledOperand<R> {
    sum_of: Option<Getter<R>>,
    predicate: Option<FieldMatcher<R>>,
}

enum CompiledStatistic<R> {
    Sum(Getter<R>),
    Count,
    Average(Getter<R>),
    PercentageOf {
        numerator: CompiledOperand<R>,
        denominator: CompiledOperand<R>,
    },
}

struct CompiledAggregate<R> {
    name: String,
    scope: AggregateScope,
    field: Option<String>,
    predicate: Option<FieldMatcher<R>>,
    statistic: CompiledStatistic<R>,
}

/// All aggregates of one view, resolved against the screen registry.
pub struct AggregateCalculator<R> {
    aggregates: Vec<CompiledAggregate<R>>,
}

impl<R> AggregateCalculator<R> {
    /// Unknown and non-numeric aggregate fields are rejected here rather
    /// than silently summing to zero.
    pub fn compile(
        specs: &[AggregateSpec],
        registry: &FieldRegistry<R>,
    ) -> Result<Self, QueryError> {
        let mut names = BTreeSet::new();
        let mut aggregates = Vec::with_capacity(specs.len());
        for spec in specs {
            if spec.name.trim().is_empty() {
                return Err(QueryError::validation("aggregate name must not be empty"));
            }
            if !names.insert(spec.name.as_str()) {
                return Err(QueryError::validation(format!(
                    "aggregate `{}` declared more than once",
                    spec.name
                )));
            }
            let (statistic, field) = match &spec.statistic {
                Statistic::Sum { field } => {
                    (CompiledStatistic::Sum(numeric(registry, field)?), Some(field.clone()))
                }
                Statistic::Count => (CompiledStatistic::Count, None),
                Statistic::Average { field } => (
                    CompiledStatistic::Average(numeric(registry, field)?),
                    Some(field.clone()),
                ),
                Statistic::PercentageOf {
                    numerator,
                    denominator,
                } => (
                    CompiledStatistic::PercentageOf {
                        numerator: operand(registry, numerator)?,
                        denominator: operand(registry, denominator)?,
                    },
                    None,
                ),
            };
            aggregates.push(CompiledAggregate {
                name: spec.name.clone(),
                scope: spec.scope,
                field,
                predicate: predicate(registry, spec.predicate.as_ref())?,
                statistic,
            });
        }
        Ok(Self { aggregates })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    #[must_use]
    pub fn needs_global(&self) -> bool {
        self.aggregates
            .iter()
            .any(|a| a.scope == AggregateScope::Global)
    }

    /// Each aggregate evaluated independently, in declaration order.
    /// `all` is the whole record set, read only by global aggregates.
    pub fn compute_each(&self, visible: &[&R], all: &[&R]) -> Vec<(String, Result<f64, QueryError>)> {
        self.aggregates
            .iter()
            .map(|aggregate| {
                let scope = match aggregate.scope {
                    AggregateScope::Filtered => visible,
                    AggregateScope::Global => all,
                };
                (aggregate.name.clone(), evaluate(aggregate, scope))
            })
            .collect()
    }

    /// `compute(records, aggregateSpecs[])`, failing on the first malformed
    /// numeric value.
    pub fn compute(&self, visible: &[&R], all: &[&R]) -> Result<Aggregates, QueryError> {
        let mut out = Aggregates::new();
        for (name, value) in self.compute_each(visible, all) {
            out.insert(name, value?);
        }
        Ok(out)
    }
}

fn numeric<R>(registry: &FieldRegistry<R>, field: &str) -> Result<Getter<R>, QueryError> {
    let descriptor = registry.get(field).ok_or_else(|| {
        QueryError::new(
            QueryErrorCode::UnknownField,
            format!("aggregate field `{field}` is not declared"),
        )
    })?;
    if !descriptor.kind().is_numeric() {
        return Err(QueryError::validation(format!(
            "aggregate field `{field}` is {}, not numeric",
            descriptor.kind().as_str()
        )));
    }
    Ok(descriptor.getter())
}

fn predicate<R>(
    registry: &FieldRegistry<R>,
    spec: Option<&FilterSpec>,
) -> Result<Option<FieldMatcher<R>>, QueryError> {
    let Some(spec) = spec else {
        return Ok(None);
    };
    let matcher = FieldMatcher::compile(spec, registry)?;
    Ok(matcher.is_active().then_some(matcher))
}

fn operand<R>(registry: &FieldRegistry<R>, op: &Operand) -> Result<CompiledOperand<R>, QueryError> {
    Ok(match op {
        Operand::Sum { field, predicate: p } => CompiledOperand {
            sum_of: Some(numeric(registry, field)?),
            predicate: predicate(registry, p.as_ref())?,
        },
        Operand::Count { predicate: p } => CompiledOperand {
            sum_of: None,
            predicate: predicate(registry, p.as_ref())?,
        },
    })
}

fn evaluate<R>(aggregate: &CompiledAggregate<R>, records: &[&R]) -> Result<f64, QueryError> {
    let in_scope: Vec<&R> = records
        .iter()
        .copied()
        .filter(|r| aggregate.predicate.as_ref().map_or(true, |p| p.matches(r)))
        .collect();
    let field = aggregate.field.as_deref().unwrap_or("");
    let value = match &aggregate.statistic {
        CompiledStatistic::Sum(getter) => sum(getter, &in_scope, &aggregate.name, field)?,
        CompiledStatistic::Count => in_scope.len() as f64,
        CompiledStatistic::Average(getter) => {
            average(sum(getter, &in_scope, &aggregate.name, field)?, in_scope.len())
        }
        CompiledStatistic::PercentageOf {
            numerator,
            denominator,
        } => percentage_of(
            evaluate_operand(numerator, &in_scope, &aggregate.name)?,
            evaluate_operand(denominator, &in_scope, &aggregate.name)?,
        ),
    };
    Ok(finite_or_zero(value))
}

fn evaluate_operand<R>(op: &CompiledOperand<R>, records: &[&R], name: &str) -> Result<f64, QueryError> {
    let narrowed: Vec<&R> = records
        .iter()
        .copied()
        .filter(|r| op.predicate.as_ref().map_or(true, |p| p.matches(r)))
        .collect();
    match &op.sum_of {
        Some(getter) => sum(getter, &narrowed, name, "operand"),
        None => Ok(narrowed.len() as f64),
    }
}

/// Missing values contribute 0.
fn sum<R>(getter: &Getter<R>, records: &[&R], name: &str, field: &str) -> Result<f64, QueryError> {
    let mut total = 0.0;
    for record in records {
        match getter(*record) {
            FieldRead::Value(FieldValue::Number(n)) => total += n,
            FieldRead::Value(_) | FieldRead::Missing => {}
            FieldRead::Malformed(reason) => {
                return Err(QueryError::new(
                    QueryErrorCode::Aggregate,
                    format!("aggregate `{name}` cannot read `{field}`: {reason}"),
                ));
            }
        }
    }
    Ok(finite_or_zero(total))
}
