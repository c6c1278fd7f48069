//! Paged browse fetch: one GET per distinct filter/cursor combination.

use std::sync::Arc;

use common::{
    browse_config::BrowseConfig,
    browse_query::{FilterSet, PageCursor},
    browse_result::BrowseResult,
};
use tracing::info;

use crate::api::browse::browse_request::build_browse_request;
use crate::error::Result;
use crate::http_utils::{
    okapi_utils::BrowseTransport,
    request_cache::{BrowseCacheKey, RequestCache},
};


#[derive(Clone)]
pub struct BrowseFetcher {
    transport: Arc<dyn BrowseTransport>,
    cache: Arc<RequestCache>,
    config: Arc<BrowseConfig>,
}

impl BrowseFetcher {
    pub fn new(transport: Arc<dyn BrowseTransport>, config: BrowseConfig, cache: Arc<RequestCache>) -> Self {
        BrowseFetcher {
            transport,
            cache,
            config: Arc::new(config),
        }
    }

    /// Empty result, with no request, when nothing is filtered. Errors from
    /// the gateway come back as they are; nothing is retried here.
    pub async fn browse(
        &self,
        namespace: &str,
        filters: &FilterSet,
        prev_search_index: Option<&str>,
        cursor: &PageCursor,
    ) -> Result<Arc<BrowseResult>> {
        let Some(request) = build_browse_request(filters, cursor, &self.config)? else {
            return Ok(Arc::new(BrowseResult::empty()));
        };

        let key = BrowseCacheKey {
            namespace: namespace.to_string(),
            filters: filters.clone(),
            search_index: filters.qindex.clone(),
            prev_search_index: prev_search_index.map(str::to_string),
            cursor: cursor.clone(),
        };

        let transport = self.transport.clone();
        self.cache
            .get_or_fetch(&key, move || async move {
                info!(path = %request.path, query = %request.params.query, "browse request");
                let json = transport.get_json(&request.path, &request.params.to_query_pairs()).await?;
                Ok(serde_json::from_value::<BrowseResult>(json)?)
            })
            .await
    }
}
