use adops_model::FieldRegistry;

use crate::filters::FilterSpec;
use crate::limits::QueryLimits;
use crate::matcher::FieldMatcher;
use crate::query_error::QueryError;

/// AND across dimensions; each matcher already ORs within its own set.
pub struct RecordFilter<R> {
    matchers: Vec<FieldMatcher<R>>,
}

impl<R> RecordFilter<R> {
    pub fn compile(
        specs: &[FilterSpec],
        registry: &FieldRegistry<R>,
        limits: &QueryLimits,
    ) -> Result<Self, QueryError> {
        limits.validate(specs)?;
        let mut matchers = Vec::with_capacity(specs.len());
        for spec in specs {
            let matcher = FieldMatcher::compile(spec, registry)?;
            if matcher.is_active() {
                matchers.push(matcher);
            }
        }
        Ok(Self { matchers })
    }

    #[must_use]
    pub fn active_dimensions(&self) -> usize {
        self.matchers.len()
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.matchers.iter().map(|m| m.dimension())
    }

    pub fn matches(&self, record: &R) -> bool {
        self.matchers.iter().all(|m| m.matches(record))
    }

    /// Keeps input order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a R>
    where
        I: IntoIterator<Item = &'a R>,
        R: 'a,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }

    #[must_use]
    pub fn apply_indices(&self, records: &[R]) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| self.matches(r))
            .map(|(i, _)| i)
            .collect()
    }
}

/// `apply(records, filterSpecs[])` with default limits.
pub fn apply_filters<'a, R>(
    records: &'a [R],
    specs: &[FilterSpec],
    registry: &FieldRegistry<R>,
) -> Result<Vec<&'a R>, QueryError> {
    let filter = RecordFilter::compile(specs, registry, &QueryLimits::default())?;
    Ok(filter.apply(records))
}
