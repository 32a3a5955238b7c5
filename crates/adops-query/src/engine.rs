use crate::aggregate::Aggregates;
use crate::planner::QueryPlan;
use crate::query_error::QueryError;

/// Result of one filter → sort → aggregate pass.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome<'a, R> {
    pub records: Vec<&'a R>,
    pub aggregates: Aggregates,
}

impl<'a, R: Clone> QueryOutcome<'a, R> {
    #[must_use]
    pub fn cloned_records(&self) -> Vec<R> {
        self.records.iter().map(|r| (*r).clone()).collect()
    }
}

/// Runs the whole pipeline in its fixed order and stops at the first error.
pub fn execute<'a, R>(records: &'a [R], plan: &QueryPlan<R>) -> Result<QueryOutcome<'a, R>, QueryError> {
    let filtered = plan.filter().apply(records);
    let ordered = match plan.sorter() {
        Some(sorter) => sorter.apply(filtered)?,
        None => filtered,
    };
    let all: Vec<&R> = if plan.aggregates().needs_global() {
        records.iter().collect()
    } else {
        Vec::new()
    };
    let aggregates = plan.aggregates().compute(&ordered, &all)?;
    Ok(QueryOutcome {
        records: ordered,
        aggregates,
    })
}
