#![forbid(unsafe_code)]
//! Filter → sort → aggregate over typed record sets.
//!
//! Everything in this crate is synchronous and side-effect free. Callers
//! compile a [`ViewQuery`] against a screen's field registry into a
//! [`QueryPlan`] and either run the whole pipeline with [`execute`] or run
//! the stages one by one.

mod aggregate;
mod cost;
mod engine;
mod filter;
mod filters;
mod limits;
mod matcher;
mod normalize;
mod planner;
mod query_error;
mod sort;

pub use aggregate::{
    average, finite_or_zero, percentage_of, AggregateCalculator, AggregateScope, AggregateSpec,
    Aggregates, Operand, Statistic,
};
pub use cost::QueryCost;
pub use engine::{execute, QueryOutcome};
pub use filter::{apply_filters, RecordFilter};
pub use filters::{FilterSpec, Selection, ALL_SENTINEL, SEARCH_DIMENSION};
pub use limits::QueryLimits;
pub use matcher::{matches, FieldMatcher};
pub use normalize::{normalize_query, normalize_text, normalized_query_hash};
pub use planner::{QueryPlan, ViewQuery};
pub use query_error::{QueryError, QueryErrorCode};
pub use sort::{sort_records, RecordSorter, SortDirection, SortSpec};

pub const CRATE_NAME: &str = "adops-query";
