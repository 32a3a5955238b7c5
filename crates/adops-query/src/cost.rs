use serde::{Deserialize, Serialize};

/// Work estimate of one recomputation, reported in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryCost {
    pub active_dimensions: usize,
    pub aggregates: usize,
    pub sorted: bool,
}

impl QueryCost {
    /// records × active dimensions, with every record costing at least one
    /// unit so an unfiltered view is not free.
    #[must_use]
    pub fn work_units(&self, records: usize) -> u64 {
        let per_record = self.active_dimensions.max(1) + self.aggregates;
        (records as u64).saturating_mul(per_record as u64)
    }
}
