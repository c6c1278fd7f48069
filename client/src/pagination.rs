//! Browse session: filter state, the page cursor and the published view.
//!
//! The cursor starts at page 0 with no direction or anchor. It moves only
//! through [`BrowseSession::on_need_more_data`], which needs the last result
//! to carry the anchor being moved to, and it goes back to page 0 whenever
//! the filters or the search index change.

use std::sync::Arc;

use common::{
    browse_query::{FilterSet, PageCursor, PageDirection},
    browse_result::BrowseResult,
    url_param::UrlParam,
};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::browse::BrowseFetcher;
use crate::error::{BrowseError, Result};


#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaginationState {
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub page_config: PageCursor,
}

/// What a results pane renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BrowseView {
    pub data: Option<Vec<serde_json::Value>>,
    pub is_fetching: bool,
    pub is_loading: bool,
    pub pagination: PaginationState,
    pub total_records: Option<u64>,
}

/// Enough state to resume a browse where it stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseSnapshot {
    pub filters: FilterSet,
    pub cursor: PageCursor,
}


pub struct BrowseSession {
    fetcher: BrowseFetcher,
    namespace: String,
    filters: FilterSet,
    prev_search_index: Option<String>,
    cursor: PageCursor,
    last_result: Option<Arc<BrowseResult>>,
    view_tx: watch::Sender<BrowseView>,
}

impl BrowseSession {
    pub fn new(fetcher: BrowseFetcher, namespace: impl Into<String>) -> Self {
        let (view_tx, _) = watch::channel(BrowseView::default());
        BrowseSession {
            fetcher,
            namespace: namespace.into(),
            filters: FilterSet::default(),
            prev_search_index: None,
            cursor: PageCursor::initial(),
            last_result: None,
            view_tx,
        }
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn prev_search_index(&self) -> Option<&str> {
        self.prev_search_index.as_deref()
    }

    pub fn subscribe(&self) -> watch::Receiver<BrowseView> {
        self.view_tx.subscribe()
    }

    pub fn view(&self) -> BrowseView {
        self.view_tx.borrow().clone()
    }

    /// Replaces the filter set. Any change, including a new search index,
    /// sends the cursor back to the first page.
    pub fn set_filters(&mut self, filters: FilterSet) {
        self.prev_search_index = self.filters.qindex.clone();
        if filters == self.filters {
            return;
        }
        debug!(qindex = ?filters.qindex, "browse filters changed, cursor reset");
        self.filters = filters;
        self.cursor = PageCursor::initial();
        self.publish(false);
    }

    /// Previous page stays on screen while the next one loads, unless the
    /// search index just changed and nothing is filtered.
    pub fn keep_previous_data(&self) -> bool {
        self.filters.qindex == self.prev_search_index || self.filters.has_active_filters()
    }

    /// Fetches the page under the current cursor and publishes it. Without a
    /// search index nothing is requested.
    pub async fn load(&mut self) -> Result<BrowseView> {
        if self.filters.qindex.is_none() {
            self.last_result = None;
            return Ok(self.publish(false));
        }
        if !self.keep_previous_data() {
            self.last_result = None;
        }
        self.publish(true);

        let result = self
            .fetcher
            .browse(&self.namespace, &self.filters, self.prev_search_index.as_deref(), &self.cursor)
            .await;

        match result {
            Ok(page) => {
                self.last_result = Some(page);
                Ok(self.publish(false))
            }
            Err(err) => {
                warn!(error = %err, "browse fetch failed");
                self.publish(false);
                Err(err)
            }
        }
    }

    /// Moves the cursor one page in `direction` using the matching anchor of
    /// the last result. Filters are never touched.
    pub fn on_need_more_data(&mut self, direction: PageDirection) -> Result<PageCursor> {
        let anchor = self
            .last_result
            .as_deref()
            .and_then(|page| page.anchor(direction))
            .ok_or(BrowseError::MissingAnchor(direction))?
            .to_string();

        self.cursor = self.cursor.step(direction, anchor);
        debug!(page_number = self.cursor.page_number, %direction, "browse cursor moved");
        self.publish(false);
        Ok(self.cursor.clone())
    }

    pub async fn turn_page(&mut self, direction: PageDirection) -> Result<BrowseView> {
        self.on_need_more_data(direction)?;
        self.load().await
    }

    pub fn snapshot(&self) -> BrowseSnapshot {
        BrowseSnapshot {
            filters: self.filters.clone(),
            cursor: self.cursor.clone(),
        }
    }

    pub fn resume_token(&self) -> String {
        UrlParam(self.snapshot()).to_string()
    }

    /// Puts filters and cursor back as they were; the cursor is not reset.
    pub fn restore(&mut self, snapshot: BrowseSnapshot) {
        self.prev_search_index = snapshot.filters.qindex.clone();
        self.filters = snapshot.filters;
        self.cursor = snapshot.cursor;
        self.last_result = None;
        self.publish(false);
    }

    pub fn restore_token(&mut self, token: &str) -> Result<()> {
        let snapshot = token
            .parse::<UrlParam<BrowseSnapshot>>()
            .map_err(|e| BrowseError::Config(format!("invalid resume token: {e}")))?;
        self.restore(snapshot.into_inner());
        Ok(())
    }

    fn publish(&self, is_fetching: bool) -> BrowseView {
        let page = self.last_result.as_deref();
        let view = BrowseView {
            data: page.map(|p| p.items.clone()),
            is_fetching,
            is_loading: is_fetching && page.is_none(),
            pagination: PaginationState {
                has_prev_page: page.is_some_and(BrowseResult::has_prev_page),
                has_next_page: page.is_some_and(BrowseResult::has_next_page),
                page_config: self.cursor.clone(),
            },
            total_records: page.and_then(|p| p.total_records),
        };
        self.view_tx.send_replace(view.clone());
        view
    }
}
