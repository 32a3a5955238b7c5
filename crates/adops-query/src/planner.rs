// SPDX-License-Identifier: Apache-2.0

use adops_model::FieldRegistry;
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateCalculator, AggregateSpec};
use crate::cost::QueryCost;
use crate::filter::RecordFilter;
use crate::filters::FilterSpec;
use crate::limits::QueryLimits;
use crate::normalize::normalized_query_hash;
use crate::query_error::QueryError;
use crate::sort::{RecordSorter, SortSpec};

/// Everything a screen's controls currently select.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub aggregates: Vec<AggregateSpec>,
}

impl ViewQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filter(mut self, spec: FilterSpec) -> Self {
        self.set_filter(spec);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub fn with_aggregate(mut self, spec: AggregateSpec) -> Self {
        self.aggregates.push(spec);
        self
    }

    /// Replaces the selection of an existing dimension in place, so filter
    /// order stays stable as the user edits controls.
    pub fn set_filter(&mut self, spec: FilterSpec) {
        match self
            .filters
            .iter_mut()
            .find(|f| f.dimension == spec.dimension)
        {
            Some(existing) => *existing = spec,
            None => self.filters.push(spec),
        }
    }

    /// Returns whether the dimension existed.
    pub fn clear_filter(&mut self, dimension: &str) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f.dimension != dimension);
        self.filters.len() != before
    }

    #[must_use]
    pub fn filter(&self, dimension: &str) -> Option<&FilterSpec> {
        self.filters.iter().find(|f| f.dimension == dimension)
    }
}

/// A [`ViewQuery`] resolved against one screen registry.
pub struct QueryPlan<R> {
    filter: RecordFilter<R>,
    sorter: Option<RecordSorter<R>>,
    aggregates: AggregateCalculator<R>,
    query_hash: String,
    cost: QueryCost,
}

impl<R> QueryPlan<R> {
    pub fn compile(
        query: &ViewQuery,
        registry: &FieldRegistry<R>,
        limits: &QueryLimits,
    ) -> Result<Self, QueryError> {
        let filter = RecordFilter::compile(&query.filters, registry, limits)?;
        let sorter = query
            .sort
            .as_ref()
            .map(|spec| RecordSorter::compile(spec, registry));
        let aggregates = AggregateCalculator::compile(&query.aggregates, registry)?;
        let cost = QueryCost {
            active_dimensions: filter.active_dimensions(),
            aggregates: aggregates.len(),
            sorted: sorter.as_ref().is_some_and(RecordSorter::is_known_field),
        };
        Ok(Self {
            filter,
            sorter,
            aggregates,
            query_hash: normalized_query_hash(query)?,
            cost,
        })
    }

    #[must_use]
    pub fn filter(&self) -> &RecordFilter<R> {
        &self.filter
    }

    #[must_use]
    pub fn sorter(&self) -> Option<&RecordSorter<R>> {
        self.sorter.as_ref()
    }

    #[must_use]
    pub fn aggregates(&self) -> &AggregateCalculator<R> {
        &self.aggregates
    }

    #[must_use]
    pub fn query_hash(&self) -> &str {
        &self.query_hash
    }

    #[must_use]
    pub fn cost(&self) -> QueryCost {
        self.cost
    }
}
