//! Content store client: the per-page tree cache.
//!
//! Bindings read the cached tree synchronously on every render; only
//! [`ContentStoreClient::fetch`] and [`PageMount::load`] touch the gateway.
//! Locks are never held across an `.await`.

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::gateway::PersistenceGateway;
use pagecraft_types::ContentTree;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// What a read hands back to the caller.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// The fetched tree, or the cached/empty fallback on failure.
    pub tree: Arc<ContentTree>,
    /// Whether another read for the page is still outstanding.
    pub is_loading: bool,
    /// Diagnostic for a failed read. Never meant to block rendering.
    pub error: Option<String>,
}

/// Cache status of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStatus {
    pub is_loading: bool,
    /// Invalidated since the last successful read.
    pub is_stale: bool,
    /// At least one read has succeeded.
    pub fetched: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct PageEntry {
    tree: Arc<ContentTree>,
    fetched: bool,
    stale: bool,
    in_flight: usize,
    error: Option<String>,
    /// Bumped by every invalidation. A read that started under an older
    /// revision must not mark the entry fresh.
    revision: u64,
    mounts: HashSet<u64>,
}

impl PageEntry {
    fn content(&self, error: Option<String>) -> PageContent {
        PageContent {
            tree: Arc::clone(&self.tree),
            is_loading: self.in_flight > 0,
            error,
        }
    }

    fn is_fresh(&self) -> bool {
        self.fetched && !self.stale
    }
}

/// Caches the content tree of each page.
pub struct ContentStoreClient {
    gateway: Arc<dyn PersistenceGateway>,
    config: StoreConfig,
    pages: RwLock<HashMap<String, PageEntry>>,
    next_mount: AtomicU64,
}

impl ContentStoreClient {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, config: StoreConfig) -> Self {
        Self {
            gateway,
            config,
            pages: RwLock::new(HashMap::new()),
            next_mount: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn read_pages(&self) -> RwLockReadGuard<'_, HashMap<String, PageEntry>> {
        self.pages.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_pages(&self) -> RwLockWriteGuard<'_, HashMap<String, PageEntry>> {
        self.pages.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached tree of a page, empty if nothing has been read yet.
    /// A stale tree is still returned until a fresh read replaces it.
    pub fn tree(&self, page_slug: &str) -> Arc<ContentTree> {
        self.read_pages()
            .get(page_slug)
            .map(|entry| Arc::clone(&entry.tree))
            .unwrap_or_default()
    }

    pub fn status(&self, page_slug: &str) -> PageStatus {
        self.read_pages()
            .get(page_slug)
            .map(|entry| PageStatus {
                is_loading: entry.in_flight > 0,
                is_stale: entry.stale,
                fetched: entry.fetched,
                error: entry.error.clone(),
            })
            .unwrap_or_default()
    }

    /// Reads a page through the gateway and caches the result.
    ///
    /// Never fails: on error the cached tree (or an empty one) is returned
    /// with [`PageContent::error`] set.
    pub async fn fetch(&self, page_slug: &str) -> PageContent {
        self.fetch_inner(page_slug, None).await
    }

    /// Reads a page only if it is uncached or stale.
    pub async fn ensure(&self, page_slug: &str) -> PageContent {
        if let Some(content) = self.fresh_content(page_slug) {
            return content;
        }
        self.fetch(page_slug).await
    }

    /// Marks a page stale so the next read goes to the gateway.
    pub fn invalidate(&self, page_slug: &str) {
        let mut pages = self.write_pages();
        let entry = pages.entry(page_slug.to_string()).or_default();
        entry.stale = true;
        entry.revision += 1;
        info!(page = page_slug, revision = entry.revision, "content cache invalidated");
    }

    /// Registers a view of `page_slug`. Reads made through the returned
    /// mount are discarded if it is dropped before they complete.
    pub fn mount(self: &Arc<Self>, page_slug: impl Into<String>) -> PageMount {
        let page_slug = page_slug.into();
        let id = self.next_mount.fetch_add(1, Ordering::Relaxed);
        self.write_pages()
            .entry(page_slug.clone())
            .or_default()
            .mounts
            .insert(id);
        debug!(page = %page_slug, mount = id, "page mounted");
        PageMount {
            client: Arc::clone(self),
            page_slug,
            id,
            loaded_revision: Arc::new(Mutex::new(None)),
        }
    }

    fn unmount(&self, page_slug: &str, id: u64) {
        if let Some(entry) = self.write_pages().get_mut(page_slug) {
            entry.mounts.remove(&id);
        }
        debug!(page = page_slug, mount = id, "page unmounted");
    }

    fn fresh_content(&self, page_slug: &str) -> Option<PageContent> {
        self.read_pages()
            .get(page_slug)
            .filter(|entry| entry.is_fresh())
            .map(|entry| entry.content(None))
    }

    fn revision(&self, page_slug: &str) -> u64 {
        self.read_pages()
            .get(page_slug)
            .map_or(0, |entry| entry.revision)
    }

    fn begin_fetch<'a>(&'a self, page_slug: &'a str) -> PendingRead<'a> {
        let mut pages = self.write_pages();
        let entry = pages.entry(page_slug.to_string()).or_default();
        entry.in_flight += 1;
        PendingRead {
            client: self,
            page_slug,
            revision: entry.revision,
            finished: false,
        }
    }

    async fn fetch_inner(&self, page_slug: &str, mount: Option<u64>) -> PageContent {
        let read = self.begin_fetch(page_slug);
        let revision = read.revision;
        debug!(page = page_slug, revision, "fetching page content");

        let result = match tokio::time::timeout(
            self.config.fetch_timeout(),
            self.gateway.fetch_page_content(page_slug),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        };

        let mut pages = self.write_pages();
        let entry = pages.entry(page_slug.to_string()).or_default();
        read.finish(entry);

        if let Some(id) = mount {
            if !entry.mounts.contains(&id) {
                debug!(page = page_slug, mount = id, "page left during fetch, result discarded");
                return entry.content(None);
            }
        }

        match result {
            Ok(tree) => {
                let tree = Arc::new(tree);
                if entry.revision == revision {
                    entry.tree = Arc::clone(&tree);
                    entry.fetched = true;
                    entry.stale = false;
                    entry.error = None;
                    debug!(page = page_slug, fields = tree.len(), "page content cached");
                } else {
                    debug!(page = page_slug, "page invalidated during fetch, result not cached");
                }
                PageContent {
                    tree,
                    is_loading: entry.in_flight > 0,
                    error: None,
                }
            }
            Err(e) => {
                warn!(page = page_slug, "content fetch failed, serving fallback: {e}");
                let message = e.to_string();
                entry.error = Some(message.clone());
                entry.content(Some(message))
            }
        }
    }
}

/// One outstanding gateway read of a page. Dropping it unfinished (the
/// fetch future was cancelled) still releases the page's loading count.
struct PendingRead<'a> {
    client: &'a ContentStoreClient,
    page_slug: &'a str,
    revision: u64,
    finished: bool,
}

impl PendingRead<'_> {
    /// Releases the loading count under a lock the caller already holds.
    fn finish(mut self, entry: &mut PageEntry) {
        entry.in_flight = entry.in_flight.saturating_sub(1);
        self.finished = true;
    }
}

impl Drop for PendingRead<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Some(entry) = self.client.write_pages().get_mut(self.page_slug) {
            entry.in_flight = entry.in_flight.saturating_sub(1);
        }
        debug!(page = self.page_slug, "page read cancelled");
    }
}

/// One view of a page. Dropping it cancels application of any read still
/// in flight for it.
pub struct PageMount {
    client: Arc<ContentStoreClient>,
    page_slug: String,
    id: u64,
    loaded_revision: Arc<Mutex<Option<u64>>>,
}

impl PageMount {
    pub fn page_slug(&self) -> &str {
        &self.page_slug
    }

    /// Loads the page for this view: one gateway read per mount, plus one
    /// more after each invalidation. Otherwise the cached tree is returned.
    ///
    /// The returned future does not borrow the mount, so it can be spawned
    /// and outlive it; if the mount is dropped first the result is not
    /// applied to the cache.
    pub fn load(&self) -> impl Future<Output = PageContent> + Send + use<> {
        let client = Arc::clone(&self.client);
        let page_slug = self.page_slug.clone();
        let id = self.id;
        let loaded_revision = Arc::clone(&self.loaded_revision);

        async move {
            let revision = client.revision(&page_slug);
            let already_loaded =
                *loaded_revision.lock().unwrap_or_else(PoisonError::into_inner) == Some(revision);
            if already_loaded {
                if let Some(content) = client.fresh_content(&page_slug) {
                    return content;
                }
            }

            let content = client.fetch_inner(&page_slug, Some(id)).await;
            if content.error.is_none() && client.status(&page_slug).fetched {
                *loaded_revision.lock().unwrap_or_else(PoisonError::into_inner) = Some(revision);
            }
            content
        }
    }

    /// The tree currently cached for this page.
    pub fn tree(&self) -> Arc<ContentTree> {
        self.client.tree(&self.page_slug)
    }
}

impl Drop for PageMount {
    fn drop(&mut self) {
        self.client.unmount(&self.page_slug, self.id);
    }
}
