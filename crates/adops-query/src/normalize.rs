use adops_core::canonical;
use unicode_normalization::UnicodeNormalization;

use crate::filters::{FilterSpec, Selection};
use crate::planner::ViewQuery;
use crate::query_error::QueryError;

/// Canonical text form for search: NFKC + Unicode lowercase.
#[must_use]
pub fn normalize_text(input: &str) -> String {
    input.nfkc().collect::<String>().to_lowercase()
}

/// Drops inactive dimensions, orders the rest by dimension and canonicalizes
/// search terms, so equivalent queries hash the same.
#[must_use]
pub fn normalize_query(query: &ViewQuery) -> ViewQuery {
    let mut filters: Vec<FilterSpec> = query
        .filters
        .iter()
        .filter(|f| f.is_active())
        .cloned()
        .map(|mut f| {
            if let Selection::Search { term } = &mut f.selection {
                *term = normalize_text(term.trim());
            }
            f
        })
        .collect();
    filters.sort_by(|a, b| a.dimension.cmp(&b.dimension));
    ViewQuery {
        filters,
        sort: query.sort.clone(),
        aggregates: query.aggregates.clone(),
    }
}

pub fn normalized_query_hash(query: &ViewQuery) -> Result<String, QueryError> {
    let normalized = normalize_query(query);
    Ok(canonical::stable_json_hash(&normalized)?.to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compatibility_forms_fold_together() {
        assert_eq!(normalize_text("ＡＣＭＥ"), "acme");
        assert_eq!(normalize_text("Straße"), "straße");
    }

    #[test]
    fn hash_ignores_inactive_filters_and_order() {
        let a = ViewQuery::new()
            .with_filter(FilterSpec::search("Acme "))
            .with_filter(FilterSpec::any_of("status", ["Active"]))
            .with_filter(FilterSpec::toggle("programmatic", None));
        let b = ViewQuery::new()
            .with_filter(FilterSpec::any_of("status", ["Active"]))
            .with_filter(FilterSpec::search("acme"));
        assert_eq!(
            normalized_query_hash(&a).expect("hash"),
            normalized_query_hash(&b).expect("hash")
        );
    }
}
