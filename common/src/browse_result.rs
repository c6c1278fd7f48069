use serde::{Deserialize, Serialize};

use crate::browse_query::PageDirection;


/// One page returned by a browse endpoint, plus the anchors of the pages
/// on either side of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct BrowseResult {
    pub items: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_records: Option<u64>,
}

impl BrowseResult {
    /// Result used when nothing is filtered and no request is made.
    pub fn empty() -> Self {
        BrowseResult::default()
    }

    pub fn anchor(&self, direction: PageDirection) -> Option<&str> {
        let anchor = match direction {
            PageDirection::Prev => self.prev.as_deref(),
            PageDirection::Next => self.next.as_deref(),
        };
        anchor.filter(|a| !a.is_empty())
    }

    pub fn has_prev_page(&self) -> bool {
        self.anchor(PageDirection::Prev).is_some()
    }

    pub fn has_next_page(&self) -> bool {
        self.anchor(PageDirection::Next).is_some()
    }
}
