//! Content-addressed request cache for browse pages.
//!
//! Entries are keyed by the sha256 digest of the serialized
//! `(namespace, filters, search index, previous search index, cursor)` tuple.
//! Callers asking for a key that is already being fetched wait on the same
//! in-flight future instead of issuing a second request. A finished page is
//! reused until it is older than the stale time (if one is set). Expired pages
//! are swept whenever a new page is stored, and at most `max_entries`
//! finished pages are kept, oldest evicted first. Failures are never stored.

use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use common::{browse_query::{FilterSet, PageCursor}, browse_result::BrowseResult};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowseCacheKey {
    pub namespace: String,
    pub filters: FilterSet,
    pub search_index: Option<String>,
    pub prev_search_index: Option<String>,
    pub cursor: PageCursor,
}

impl BrowseCacheKey {
    pub fn digest(&self) -> Result<String> {
        let serialized = serde_json::to_string(&(
            &self.namespace,
            &self.filters,
            &self.search_index,
            &self.prev_search_index,
            &self.cursor,
        ))?;
        Ok(sha256::digest(serialized))
    }
}


type SharedFetch = Shared<BoxFuture<'static, Result<Arc<BrowseResult>>>>;

enum CacheEntry {
    InFlight { id: u64, fetch: SharedFetch },
    Ready { id: u64, result: Arc<BrowseResult>, fetched_at: Instant },
}

enum Lookup {
    Hit(Arc<BrowseResult>),
    Join(u64, SharedFetch),
    Miss,
}

pub const DEFAULT_MAX_ENTRIES: usize = 256;

pub struct RequestCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    stale_time: Option<Duration>,
    max_entries: usize,
    next_id: AtomicU64,
}

impl Default for RequestCache {
    fn default() -> Self {
        RequestCache::new(None, DEFAULT_MAX_ENTRIES)
    }
}

impl RequestCache {
    /// `max_entries` bounds finished pages only; it is at least one.
    pub fn new(stale_time: Option<Duration>, max_entries: usize) -> Self {
        RequestCache {
            entries: Mutex::new(HashMap::new()),
            stale_time,
            max_entries: max_entries.max(1),
            next_id: AtomicU64::new(0),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, fetched_at: Instant) -> bool {
        self.stale_time.is_none_or(|stale_time| fetched_at.elapsed() < stale_time)
    }

    /// Returns the cached page for `key`, joins a request already running for
    /// it, or starts `fetch`. `fetch` is only called on a miss.
    pub async fn get_or_fetch<F, Fut>(&self, key: &BrowseCacheKey, fetch: F) -> Result<Arc<BrowseResult>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<BrowseResult>> + Send + 'static,
    {
        let digest = key.digest()?;

        let (id, shared) = {
            let mut entries = self.entries();
            let lookup = match entries.get(&digest) {
                Some(CacheEntry::Ready { result, fetched_at, .. }) if self.is_fresh(*fetched_at) => Lookup::Hit(result.clone()),
                Some(CacheEntry::InFlight { id, fetch }) => Lookup::Join(*id, fetch.clone()),
                _ => Lookup::Miss,
            };
            match lookup {
                Lookup::Hit(result) => {
                    debug!(%digest, "browse cache hit");
                    return Ok(result);
                }
                Lookup::Join(id, shared) => {
                    debug!(%digest, "browse request already in flight");
                    (id, shared)
                }
                Lookup::Miss => {
                    debug!(%digest, "browse cache miss");
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let shared = fetch().map(|result| result.map(Arc::new)).boxed().shared();
                    entries.insert(digest.clone(), CacheEntry::InFlight { id, fetch: shared.clone() });
                    (id, shared)
                }
            }
        };

        let outcome = shared.await;

        let mut entries = self.entries();
        let settles_here = matches!(entries.get(&digest), Some(CacheEntry::InFlight { id: current, .. }) if *current == id);
        if settles_here {
            match &outcome {
                Ok(result) => self.store(&mut entries, digest, id, result.clone()),
                Err(_) => {
                    entries.remove(&digest);
                }
            }
        }
        outcome
    }

    fn store(&self, entries: &mut HashMap<String, CacheEntry>, digest: String, id: u64, result: Arc<BrowseResult>) {
        entries.retain(|_, entry| match entry {
            CacheEntry::Ready { fetched_at, .. } => self.is_fresh(*fetched_at),
            CacheEntry::InFlight { .. } => true,
        });
        entries.insert(digest, CacheEntry::Ready { id, result, fetched_at: Instant::now() });

        let mut finished = entries
            .iter()
            .filter_map(|(digest, entry)| match entry {
                CacheEntry::Ready { id, .. } => Some((*id, digest.clone())),
                CacheEntry::InFlight { .. } => None,
            })
            .collect::<Vec<_>>();
        if finished.len() <= self.max_entries {
            return;
        }
        finished.sort();
        let excess = finished.len() - self.max_entries;
        for (_, digest) in finished.into_iter().take(excess) {
            debug!(%digest, "browse cache evicted");
            entries.remove(&digest);
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::error::BrowseError;

    fn key(anchor: Option<&str>) -> BrowseCacheKey {
        let cursor = match anchor {
            Some(anchor) => PageCursor::initial().step(common::browse_query::PageDirection::Next, anchor),
            None => PageCursor::initial(),
        };
        BrowseCacheKey {
            namespace: "inventory".into(),
            filters: FilterSet::new("contributors").with_query("smith"),
            search_index: Some("contributors".into()),
            prev_search_index: Some("contributors".into()),
            cursor,
        }
    }

    fn page(next: &str) -> BrowseResult {
        BrowseResult {
            next: Some(next.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn second_call_with_same_key_is_served_from_cache() {
        let cache = RequestCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let result = cache
                .get_or_fetch(&key(None), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(page("b"))
                })
                .await
                .unwrap();
            assert_eq!(result.next.as_deref(), Some("b"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_request() {
        let cache = RequestCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let (release, gate) = tokio::sync::oneshot::channel::<()>();
        let gate = gate.shared();
        let key = key(None);

        let first = {
            let calls = calls.clone();
            let gate = gate.clone();
            cache.get_or_fetch(&key, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let _ = gate.await;
                Ok(page("b"))
            })
        };
        let second = {
            let calls = calls.clone();
            cache.get_or_fetch(&key, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(page("never"))
            })
        };

        let (a, b, _) = tokio::join!(first, second, async move {
            tokio::task::yield_now().await;
            let _ = release.send(());
        });
        assert_eq!(a.unwrap().next.as_deref(), Some("b"));
        assert_eq!(b.unwrap().next.as_deref(), Some("b"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_fetch_separately() {
        let cache = RequestCache::default();
        cache.get_or_fetch(&key(None), || async { Ok(page("b")) }).await.unwrap();
        let other = cache.get_or_fetch(&key(Some("b")), || async { Ok(page("c")) }).await.unwrap();
        assert_eq!(other.next.as_deref(), Some("c"));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = RequestCache::default();
        let err = cache
            .get_or_fetch(&key(None), || async {
                Err(BrowseError::Http { status: 500, body: "boom".into() })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BrowseError::Http { status: 500, .. }));
        assert!(cache.is_empty());

        let ok = cache.get_or_fetch(&key(None), || async { Ok(page("b")) }).await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn stale_entries_are_refetched() {
        let cache = RequestCache::new(Some(Duration::ZERO), DEFAULT_MAX_ENTRIES);
        cache.get_or_fetch(&key(None), || async { Ok(page("old")) }).await.unwrap();
        let fresh = cache.get_or_fetch(&key(None), || async { Ok(page("new")) }).await.unwrap();
        assert_eq!(fresh.next.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn expired_pages_are_swept_when_a_new_page_is_stored() {
        let cache = RequestCache::new(Some(Duration::ZERO), DEFAULT_MAX_ENTRIES);
        for n in 0..50 {
            let anchor = format!("anchor-{n}");
            cache.get_or_fetch(&key(Some(anchor.as_str())), || async { Ok(page("x")) }).await.unwrap();
        }
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn finished_pages_are_capped_oldest_first() {
        let cache = RequestCache::new(None, 3);
        for n in 0..5 {
            let anchor = format!("anchor-{n}");
            cache.get_or_fetch(&key(Some(anchor.as_str())), || async { Ok(page("x")) }).await.unwrap();
        }
        assert_eq!(cache.len(), 3);

        let calls = Arc::new(AtomicUsize::new(0));
        for n in [4, 0] {
            let anchor = format!("anchor-{n}");
            let calls = calls.clone();
            cache
                .get_or_fetch(&key(Some(anchor.as_str())), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(page("x"))
                })
                .await
                .unwrap();
        }
        // the newest page was still cached, the oldest had been evicted
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn digest_depends_on_every_key_part() {
        let base = key(None);
        let mut other_ns = base.clone();
        other_ns.namespace = "other".into();
        let mut other_prev = base.clone();
        other_prev.prev_search_index = None;

        let digest = base.digest().unwrap();
        assert_eq!(digest, key(None).digest().unwrap());
        assert_ne!(digest, other_ns.digest().unwrap());
        assert_ne!(digest, other_prev.digest().unwrap());
        assert_ne!(digest, key(Some("b")).digest().unwrap());
    }
}
