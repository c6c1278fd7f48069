//! Composition of the search clause and exact-match facet clauses.

use crate::api::browse::browse_cql::escape_quotes;
use crate::api::browse::normalize::{NormalizedFilters, SearchTerm};


fn facet_clause(name: &str, values: &[&str]) -> String {
    match values {
        [single] => format!("{name}==\"{}\"", escape_quotes(single)),
        _ => {
            let values = values
                .iter()
                .map(|value| format!("\"{}\"", escape_quotes(value)))
                .collect::<Vec<String>>()
                .join(" or ");
            format!("{name}==({values})")
        }
    }
}

/// Joins the clause produced by `search_query` with one clause per active
/// facet. CQL booleans share one precedence level and associate left, so the
/// search clause goes first and any `or` inside it binds before the facets.
pub fn build_filter_query<F>(filters: &NormalizedFilters, search_query: F) -> String
where
    F: Fn(&SearchTerm) -> String,
{
    let mut clauses = vec![search_query(&filters.query)];
    for (name, values) in filters.active_facets() {
        clauses.push(facet_clause(name, &values));
    }
    clauses.join(" and ")
}
