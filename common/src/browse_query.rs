//! Shared browse filter and page cursor models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};


/// Filter state as the browse screen holds it: selected values per facet,
/// the free-text anchor and the selected search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilterSet {
    pub qindex: Option<String>,
    pub query: Option<String>,
    pub facets: BTreeMap<String, Vec<String>>,
}

impl FilterSet {
    pub fn new(qindex: impl Into<String>) -> Self {
        FilterSet {
            qindex: Some(qindex.into()),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_facet<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facets
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Free-text query, if one was typed.
    pub fn search_query(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }

    /// Non-empty query plus every facet that has at least one value selected.
    /// The search index alone never counts as a filter.
    pub fn active_filter_count(&self) -> usize {
        let query = usize::from(self.search_query().is_some());
        let facets = self
            .facets
            .values()
            .filter(|values| values.iter().any(|v| !v.is_empty()))
            .count();
        query + facets
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filter_count() > 0
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageDirection {
    Prev,
    Next,
}

impl PageDirection {
    pub fn is_prev(self) -> bool {
        self == PageDirection::Prev
    }

    /// Page-number delta applied when moving in this direction.
    pub fn delta(self) -> i64 {
        match self {
            PageDirection::Prev => -1,
            PageDirection::Next => 1,
        }
    }
}

impl std::fmt::Display for PageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageDirection::Prev => write!(f, "prev"),
            PageDirection::Next => write!(f, "next"),
        }
    }
}

impl std::str::FromStr for PageDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prev" => Ok(PageDirection::Prev),
            "next" => Ok(PageDirection::Next),
            other => Err(format!("unknown page direction: {other}")),
        }
    }
}


/// `(pageNumber, direction, anchor)`. The page number is only a cache key
/// discriminant; the anchor is what the server pages from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct PageCursor {
    pub page_number: i64,
    pub direction: Option<PageDirection>,
    pub anchor: Option<String>,
}

impl PageCursor {
    pub fn initial() -> Self {
        PageCursor::default()
    }

    pub fn is_initial(&self) -> bool {
        self.page_number == 0
    }

    /// Cursor one page away from `self` in `direction`, anchored at `anchor`.
    pub fn step(&self, direction: PageDirection, anchor: impl Into<String>) -> Self {
        PageCursor {
            page_number: self.page_number + direction.delta(),
            direction: Some(direction),
            anchor: Some(anchor.into()),
        }
    }
}
