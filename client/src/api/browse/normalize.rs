//! Filter normalization: UI facet keys to server facet names.

use std::collections::BTreeMap;

use common::{browse_config::BrowseConfig, browse_query::FilterSet, search_const::UNDEFINED_AS_STRING};


/// Free-text part of a browse. `Undefined` marks that nothing was typed; the
/// query clause is still built from it once paging moves off the first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    Text(String),
    Undefined,
}

impl SearchTerm {
    pub fn from_query(query: Option<&str>) -> Self {
        match query {
            Some(q) if !q.is_empty() => SearchTerm::Text(q.to_string()),
            _ => SearchTerm::Undefined,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SearchTerm::Text(text) => text,
            SearchTerm::Undefined => UNDEFINED_AS_STRING,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            SearchTerm::Text(text) => Some(text),
            SearchTerm::Undefined => None,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedFilters {
    pub qindex: Option<String>,
    pub query: SearchTerm,
    pub facets: BTreeMap<String, Vec<String>>,
}

impl NormalizedFilters {
    pub fn active_facets(&self) -> impl Iterator<Item = (&str, Vec<&str>)> {
        self.facets.iter().filter_map(|(name, values)| {
            let values = values.iter().map(String::as_str).filter(|v| !v.is_empty()).collect::<Vec<_>>();
            (!values.is_empty()).then_some((name.as_str(), values))
        })
    }
}


pub fn normalize_filters(filters: &FilterSet, config: &BrowseConfig) -> NormalizedFilters {
    let mut facets: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, values) in filters.facets.iter() {
        // two UI keys may share one server facet
        facets
            .entry(config.facet_name(key).to_string())
            .or_default()
            .extend(values.iter().cloned());
    }

    NormalizedFilters {
        qindex: filters.qindex.clone(),
        query: SearchTerm::from_query(filters.query.as_deref()),
        facets,
    }
}
