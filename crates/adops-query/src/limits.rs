use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::filters::{FilterSpec, Selection};
use crate::query_error::QueryError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryLimits {
    /// Characters, not bytes.
    pub max_search_len: usize,
    pub max_selection: usize,
    pub max_filters: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_search_len: 256,
            max_selection: 512,
            max_filters: 32,
        }
    }
}

impl QueryLimits {
    pub fn validate(&self, filters: &[FilterSpec]) -> Result<(), QueryError> {
        if self.max_search_len == 0 || self.max_selection == 0 || self.max_filters == 0 {
            return Err(QueryError::validation("query limits must be non-zero"));
        }
        let mut dimensions = BTreeSet::new();
        for spec in filters {
            if !dimensions.insert(spec.dimension.as_str()) {
                return Err(QueryError::validation(format!(
                    "filter dimension `{}` given more than once",
                    spec.dimension
                )));
            }
            match &spec.selection {
                Selection::Search { term } if term.chars().count() > self.max_search_len => {
                    return Err(QueryError::validation(format!(
                        "search term length exceeds {}",
                        self.max_search_len
                    )));
                }
                Selection::AnyOf { values } if values.len() > self.max_selection => {
                    return Err(QueryError::validation(format!(
                        "selection for `{}` exceeds {} values",
                        spec.dimension, self.max_selection
                    )));
                }
                _ => {}
            }
        }
        let active = filters.iter().filter(|f| f.is_active()).count();
        if active > self.max_filters {
            return Err(QueryError::validation(format!(
                "{active} active filter dimensions exceed {}",
                self.max_filters
            )));
        }
        Ok(())
    }
}
