use std::time::Duration;

use adops_query::QueryLimits;
use serde::{Deserialize, Serialize};

use crate::error::ViewError;

pub const ENV_LOAD_LATENCY_MS: &str = "ADOPS_LOAD_LATENCY_MS";
pub const ENV_SAVE_LATENCY_MS: &str = "ADOPS_SAVE_LATENCY_MS";
pub const ENV_LOAD_TIMEOUT_MS: &str = "ADOPS_LOAD_TIMEOUT_MS";
pub const ENV_MAX_SEARCH_LEN: &str = "ADOPS_MAX_SEARCH_LEN";
pub const ENV_MAX_SELECTION: &str = "ADOPS_MAX_SELECTION";
pub const ENV_MAX_FILTERS: &str = "ADOPS_MAX_FILTERS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewConfig {
    /// Simulated delay before a record source is asked for its records.
    pub load_latency: Duration,
    /// Simulated delay before a save/approve/reject action runs.
    pub save_latency: Duration,
    pub load_timeout: Duration,
    pub limits: QueryLimits,
}

/// The optional JSON config file. Keys it leaves out keep the values they
/// are layered over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub load_latency_ms: Option<u64>,
    pub save_latency_ms: Option<u64>,
    pub load_timeout_ms: Option<u64>,
    pub max_search_len: Option<usize>,
    pub max_selection: Option<usize>,
    pub max_filters: Option<usize>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            load_latency: Duration::from_millis(500),
            save_latency: Duration::from_millis(1_000),
            load_timeout: Duration::from_millis(10_000),
            limits: QueryLimits::default(),
        }
    }
}

impl ViewConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::default().with_overrides(lookup)
    }

    #[must_use]
    pub fn with_file(self, file: &ConfigFile) -> Self {
        let ms = |value: Option<u64>, current: Duration| value.map_or(current, Duration::from_millis);
        Self {
            load_latency: ms(file.load_latency_ms, self.load_latency),
            save_latency: ms(file.save_latency_ms, self.save_latency),
            load_timeout: ms(file.load_timeout_ms, self.load_timeout),
            limits: QueryLimits {
                max_search_len: file.max_search_len.unwrap_or(self.limits.max_search_len),
                max_selection: file.max_selection.unwrap_or(self.limits.max_selection),
                max_filters: file.max_filters.unwrap_or(self.limits.max_filters),
            },
        }
    }

    /// Unset or unparseable variables keep the current values.
    #[must_use]
    pub fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let u64_var = |name: &str, current: u64| {
            lookup(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(current)
        };
        let usize_var = |name: &str, current: usize| {
            lookup(name)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(current)
        };
        let ms = |name: &str, current: Duration| {
            let current = u64::try_from(current.as_millis()).unwrap_or(u64::MAX);
            Duration::from_millis(u64_var(name, current))
        };
        Self {
            load_latency: ms(ENV_LOAD_LATENCY_MS, self.load_latency),
            save_latency: ms(ENV_SAVE_LATENCY_MS, self.save_latency),
            load_timeout: ms(ENV_LOAD_TIMEOUT_MS, self.load_timeout),
            limits: QueryLimits {
                max_search_len: usize_var(ENV_MAX_SEARCH_LEN, self.limits.max_search_len),
                max_selection: usize_var(ENV_MAX_SELECTION, self.limits.max_selection),
                max_filters: usize_var(ENV_MAX_FILTERS, self.limits.max_filters),
            },
        }
    }

    /// Latencies for tests and the command line, where nothing should wait.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            load_latency: Duration::ZERO,
            save_latency: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ViewError> {
        if self.load_timeout.is_zero() {
            return Err(ViewError::validation("load timeout must be > 0"));
        }
        if self.load_latency >= self.load_timeout {
            return Err(ViewError::validation(
                "load latency must be shorter than the load timeout",
            ));
        }
        if self.limits.max_search_len == 0
            || self.limits.max_selection == 0
            || self.limits.max_filters == 0
        {
            return Err(ViewError::validation("query limits must be > 0"));
        }
        Ok(())
    }
}
