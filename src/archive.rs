//! Archive service: the read paths, cache maintenance and feed repacking.
//!
//! An [`Archive`] wires the four collaborators together:
//!
//! - read paths ([`Archive::list`], [`Archive::article`]) serve from the
//!   cache tier and fall back to rendering, without writing to the cache;
//! - [`Archive::precache_all`] and [`Archive::clear_cache_all`] maintain
//!   the cache tier;
//! - [`Archive::repack_feed`] packs every listed article into buckets in
//!   the durable store, and [`Archive::feed_xml`] reads them back as RSS.
//!
//! Requests arriving from a front end are dispatched through
//! [`Archive::handle`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::feed::{
    assemble_feed, byte_len, commit_buckets, BucketPacker, ChannelInfo, IndexLayout, PackOptions,
};
use crate::journal::{Journal, DEFAULT_JOURNAL_KEY};
use crate::model::Article;
use crate::render::{to_markdown, RenderOptions};
use crate::source::{DocumentSource, ListingSource};
use crate::store::{CacheTier, DurableStore, CACHE_VALUE_LIMIT};

/// Cache key of the document id list.
pub const LIST_CACHE_KEY: &str = "0";

/// Lifetime of cache entries written by pre-caching (6 hours).
pub const CACHE_TTL: Duration = Duration::from_secs(21_600);

/// Number of articles rendered into the cache by one pre-cache run.
pub const PRECACHE_LIMIT: usize = 50;

/// Link template of feed items; `{id}` is replaced with the document id.
pub const DEFAULT_URL_TEMPLATE: &str = "https://docs.google.com/document/d/{id}";

/// Error message returned for unknown or inaccessible documents.
pub const NOT_FOUND_MESSAGE: &str = "Document not found";

/// Archive configuration.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Folder whose documents are published
    pub folder_id: String,

    /// Lifetime of pre-cached entries
    pub cache_ttl: Duration,

    /// Largest article payload written to the cache, in bytes
    pub cache_value_limit: usize,

    /// Number of articles pre-cached per run
    pub precache_limit: usize,

    /// Cache key of the id list
    pub list_cache_key: String,

    /// Storage keys of the bucket index and buckets
    pub index_layout: IndexLayout,

    /// Durable store key of the operation journal
    pub journal_key: String,

    /// Link template of feed items
    pub url_template: String,

    /// Feed channel metadata
    pub channel: ChannelInfo,

    /// Bucket budgets
    pub pack: PackOptions,

    /// Markdown rendering options
    pub render: RenderOptions,

    /// Render documents on the rayon thread pool
    pub parallel: bool,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            folder_id: String::new(),
            cache_ttl: CACHE_TTL,
            cache_value_limit: CACHE_VALUE_LIMIT,
            precache_limit: PRECACHE_LIMIT,
            list_cache_key: LIST_CACHE_KEY.to_string(),
            index_layout: IndexLayout::default(),
            journal_key: DEFAULT_JOURNAL_KEY.to_string(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            channel: ChannelInfo::default(),
            pack: PackOptions::default(),
            render: RenderOptions::default(),
            parallel: true,
        }
    }
}

impl ArchiveOptions {
    /// Create options for a folder with default settings.
    pub fn new(folder_id: impl Into<String>) -> Self {
        Self {
            folder_id: folder_id.into(),
            ..Default::default()
        }
    }

    /// Set the cache entry lifetime.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the largest cached payload.
    pub fn with_cache_value_limit(mut self, bytes: usize) -> Self {
        self.cache_value_limit = bytes;
        self
    }

    /// Set the number of articles pre-cached per run.
    pub fn with_precache_limit(mut self, limit: usize) -> Self {
        self.precache_limit = limit;
        self
    }

    /// Set the bucket index layout.
    pub fn with_index_layout(mut self, layout: IndexLayout) -> Self {
        self.index_layout = layout;
        self
    }

    /// Set the feed item link template.
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Set the feed channel metadata.
    pub fn with_channel(mut self, channel: ChannelInfo) -> Self {
        self.channel = channel;
        self
    }

    /// Set the bucket budgets.
    pub fn with_pack_options(mut self, pack: PackOptions) -> Self {
        self.pack = pack;
        self
    }

    /// Set the rendering options.
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Enable or disable parallel rendering.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Body of a list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    /// Listed document ids
    pub ids: Vec<String>,

    /// Articles that could be served, in id order
    pub article_cache: Vec<Article>,
}

/// Body of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl ErrorResponse {
    /// The response for unknown or inaccessible documents.
    pub fn not_found() -> Self {
        Self {
            error: NOT_FOUND_MESSAGE.to_string(),
        }
    }

    /// Serialize as compact JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| format!(r#"{{"error":"{}"}}"#, NOT_FOUND_MESSAGE))
    }
}

/// An incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Document id
    pub id: Option<String>,

    /// Requested output format; `rss` selects the feed
    pub output: Option<String>,
}

impl Request {
    /// Request the document list.
    pub fn list() -> Self {
        Self::default()
    }

    /// Request one document.
    pub fn article(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            output: None,
        }
    }

    /// Request the RSS feed.
    pub fn feed() -> Self {
        Self {
            id: None,
            output: Some("rss".to_string()),
        }
    }

    fn wants_feed(&self) -> bool {
        self.output.as_deref() == Some("rss")
    }

    fn document_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Content type of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mime {
    /// JSON body
    Json,
    /// XML body
    Xml,
}

impl Mime {
    /// MIME type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mime::Json => "application/json",
            Mime::Xml => "text/xml",
        }
    }
}

/// A response body and its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Serialized body
    pub body: String,

    /// Content type of the body
    pub mime: Mime,
}

impl Response {
    /// Create a JSON response.
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            mime: Mime::Json,
        }
    }

    /// Create an XML response.
    pub fn xml(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            mime: Mime::Xml,
        }
    }
}

/// Result of a pre-cache run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecacheReport {
    /// Documents in the folder
    pub listed: usize,

    /// Articles written to the cache
    pub cached: usize,

    /// Articles left out because their payload exceeds the cache limit
    pub oversized: usize,

    /// Articles that failed to render or store
    pub failed: usize,
}

/// Result of a feed repack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepackReport {
    /// Articles collected for the feed
    pub articles: usize,

    /// Buckets recorded in the new index
    pub buckets: usize,

    /// Items whose content was truncated
    pub truncated: usize,

    /// Items left out of every bucket
    pub dropped: usize,

    /// Whether packing stopped at the total budget
    pub exhausted: bool,

    /// Whether a new index was written
    pub committed: bool,
}

/// The document archive.
pub struct Archive {
    documents: Arc<dyn DocumentSource>,
    listing: Arc<dyn ListingSource>,
    cache: Arc<dyn CacheTier>,
    store: Arc<dyn DurableStore>,
    journal: Journal,
    options: ArchiveOptions,
}

impl Archive {
    /// Create an archive from its collaborators.
    ///
    /// The operation journal is persisted into `store` under
    /// [`ArchiveOptions::journal_key`].
    pub fn new(
        documents: Arc<dyn DocumentSource>,
        listing: Arc<dyn ListingSource>,
        cache: Arc<dyn CacheTier>,
        store: Arc<dyn DurableStore>,
        options: ArchiveOptions,
    ) -> Self {
        let journal = Journal::default().persisted(store.clone(), options.journal_key.clone());
        Self {
            documents,
            listing,
            cache,
            store,
            journal,
            options,
        }
    }

    /// Create an archive over one source that both lists and opens documents.
    pub fn from_source<S>(
        source: Arc<S>,
        cache: Arc<dyn CacheTier>,
        store: Arc<dyn DurableStore>,
        options: ArchiveOptions,
    ) -> Self
    where
        S: DocumentSource + ListingSource + 'static,
    {
        Self::new(source.clone(), source, cache, store, options)
    }

    /// Replace the operation journal.
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Archive configuration.
    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Operation journal.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Dispatch a request.
    ///
    /// `output == "rss"` selects the feed, a non-empty id selects one
    /// document, anything else lists the folder.
    pub fn handle(&self, request: &Request) -> Response {
        if request.wants_feed() {
            return Response::xml(self.feed_xml());
        }
        match request.document_id() {
            Some(id) => Response::json(self.article(id)),
            None => {
                let list = self.list();
                match serde_json::to_string(&list) {
                    Ok(body) => Response::json(body),
                    Err(e) => {
                        log::error!("Failed to serialize list response: {}", e);
                        Response::json(
                            ErrorResponse {
                                error: e.to_string(),
                            }
                            .to_json(),
                        )
                    }
                }
            }
        }
    }

    /// List the folder with every article that can be served.
    ///
    /// Ids come from the cached id list, or the listing source on a miss.
    /// Articles missing from the cache are rendered; those that fail are
    /// logged and left out. Nothing is written to the cache.
    pub fn list(&self) -> ListResponse {
        let ids = match self.cached_ids() {
            Some(ids) => ids,
            None => match self.listing.list_document_ids(&self.options.folder_id) {
                Ok(ids) => ids,
                Err(e) => {
                    log::warn!("Failed to list folder '{}': {}", self.options.folder_id, e);
                    Vec::new()
                }
            },
        };

        let mut cached = self.cached_articles(&ids);
        let misses: Vec<String> = ids
            .iter()
            .filter(|id| !cached.contains_key(*id))
            .cloned()
            .collect();

        for (id, rendered) in self.render_many(&misses) {
            match rendered {
                Ok(article) => {
                    cached.insert(id, article);
                }
                Err(e) => log::warn!("Error fetching article {}: {}", id, e),
            }
        }

        let article_cache = ids.iter().filter_map(|id| cached.remove(id)).collect();
        ListResponse { ids, article_cache }
    }

    /// Serve one article as JSON.
    ///
    /// A cached payload is returned verbatim. Otherwise the document must
    /// belong to the folder and render successfully; every failure answers
    /// `{"error":"Document not found"}`. Nothing is written to the cache.
    pub fn article(&self, id: &str) -> String {
        match self.cache.get(id) {
            Ok(Some(payload)) => return payload,
            Ok(None) => {}
            Err(e) => log::debug!("Cache read for '{}' failed: {}", id, e),
        }

        match self.fetch_article(id).and_then(|a| Ok(serde_json::to_string(&a)?)) {
            Ok(body) => body,
            Err(e) => {
                if e.is_not_found() {
                    log::debug!("Article '{}' not served: {}", id, e);
                } else {
                    log::warn!("Error fetching article {}: {}", id, e);
                }
                ErrorResponse::not_found().to_json()
            }
        }
    }

    /// Check folder membership and render a document.
    pub fn fetch_article(&self, id: &str) -> Result<Article> {
        if !self.listing.contains(&self.options.folder_id, id)? {
            return Err(Error::NotFound(id.to_string()));
        }
        self.render_article(id)
    }

    /// Render a document without any membership check.
    pub fn render_article(&self, id: &str) -> Result<Article> {
        let document = self.documents.document(id)?;
        let markdown = to_markdown(&document.blocks, &self.options.render);
        Ok(Article::new(id, document.title, markdown))
    }

    /// Refresh the cache: the id list plus the first
    /// [`ArchiveOptions::precache_limit`] articles.
    ///
    /// Clears the journal first. Only a listing failure aborts the run;
    /// per-article failures are journaled and skipped.
    pub fn precache_all(&self) -> Result<PrecacheReport> {
        self.journal.clear();
        self.note("Logs cleared");

        let ids = self
            .listing
            .list_document_ids(&self.options.folder_id)
            .inspect_err(|e| self.fail(&format!("Failed to list documents: {}", e)))?;
        let mut report = PrecacheReport {
            listed: ids.len(),
            ..Default::default()
        };

        let list_json = serde_json::to_string(&ids)?;
        if let Err(e) = self
            .cache
            .put(&self.options.list_cache_key, &list_json, self.options.cache_ttl)
        {
            self.fail(&format!("Failed to cache document list: {}", e));
        }

        let limit = self.options.precache_limit.min(ids.len());
        for (id, rendered) in self.render_many(&ids[..limit]) {
            let payload = match rendered.and_then(|a| Ok(serde_json::to_string(&a)?)) {
                Ok(payload) => payload,
                Err(e) => {
                    self.fail(&format!("Error caching article {}: {}", id, e));
                    report.failed += 1;
                    continue;
                }
            };

            let size = byte_len(&payload);
            if size > self.options.cache_value_limit {
                self.note(&format!(
                    "Skipping article {}: {} bytes exceeds cache limit {}",
                    id, size, self.options.cache_value_limit
                ));
                report.oversized += 1;
                continue;
            }

            match self.cache.put(&id, &payload, self.options.cache_ttl) {
                Ok(()) => report.cached += 1,
                Err(e) => {
                    self.fail(&format!("Error caching article {}: {}", id, e));
                    report.failed += 1;
                }
            }
        }

        self.note(&format!(
            "Pre-cached {} of {} articles ({} oversized, {} failed)",
            report.cached, report.listed, report.oversized, report.failed
        ));
        Ok(report)
    }

    /// Remove the id list and every listed article from the cache.
    ///
    /// Returns the number of keys removed.
    pub fn clear_cache_all(&self) -> Result<usize> {
        let ids = match self.listing.list_document_ids(&self.options.folder_id) {
            Ok(ids) => ids,
            Err(e) => {
                log::warn!("Listing failed, clearing cached ids only: {}", e);
                self.cached_ids().unwrap_or_default()
            }
        };

        let mut keys = Vec::with_capacity(ids.len() + 1);
        keys.push(self.options.list_cache_key.clone());
        keys.extend(ids);
        self.cache.remove_all(&keys)?;

        log::info!("Cleared {} cache keys", keys.len());
        Ok(keys.len())
    }

    /// Pack every listed article into buckets in the durable store.
    ///
    /// Works from the cached id list; when it is missing nothing is
    /// written. Articles come from the cache or are rendered; failures are
    /// journaled and skipped. Errors never escape.
    pub fn repack_feed(&self) -> RepackReport {
        let Some(ids) = self.cached_ids() else {
            self.note("RSS Cache: no cached document list, feed left unchanged");
            return RepackReport::default();
        };

        let mut cached = self.cached_articles(&ids);
        let misses: Vec<String> = ids
            .iter()
            .filter(|id| !cached.contains_key(*id))
            .cloned()
            .collect();
        for (id, rendered) in self.render_many(&misses) {
            match rendered {
                Ok(article) => {
                    cached.insert(id, article);
                }
                Err(e) => self.fail(&format!("RSS Cache: Failed to fetch article {}: {}", id, e)),
            }
        }

        let items: Vec<_> = ids
            .iter()
            .filter_map(|id| cached.remove(id))
            .map(|article| article.to_feed_item(&self.options.url_template))
            .collect();

        let mut report = RepackReport {
            articles: items.len(),
            ..Default::default()
        };

        let outcome = BucketPacker::new(self.options.pack).pack(items);
        report.truncated = outcome.truncated;
        report.dropped = outcome.dropped;
        report.exhausted = outcome.exhausted;

        match commit_buckets(self.store.as_ref(), &self.options.index_layout, &outcome.buckets) {
            Ok(index) => {
                report.buckets = index.len();
                report.committed = true;
                self.note(&format!(
                    "RSS Cache: {} articles in {} buckets ({} bytes)",
                    outcome.item_count(),
                    index.len(),
                    outcome.total_bytes
                ));
            }
            Err(e) => self.fail(&format!("RSS Cache Error: {}", e)),
        }

        report
    }

    /// The stored feed as RSS 2.0.
    pub fn feed_xml(&self) -> String {
        assemble_feed(
            self.store.as_ref(),
            &self.options.index_layout.index_key,
            &self.options.channel,
        )
    }

    /// Ids from the cached list, if present and well-formed.
    fn cached_ids(&self) -> Option<Vec<String>> {
        let raw = match self.cache.get(&self.options.list_cache_key) {
            Ok(raw) => raw?,
            Err(e) => {
                log::debug!("Cache read for id list failed: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(ids) => Some(ids),
            Err(e) => {
                log::warn!("Ignoring malformed cached id list: {}", e);
                None
            }
        }
    }

    /// Parse the cached articles among `ids`; unreadable entries count as misses.
    fn cached_articles(&self, ids: &[String]) -> HashMap<String, Article> {
        let payloads = self.cache.get_all(ids).unwrap_or_else(|e| {
            log::debug!("Bulk cache read failed: {}", e);
            HashMap::new()
        });

        payloads
            .into_iter()
            .filter_map(|(id, payload)| match serde_json::from_str::<Article>(&payload) {
                Ok(article) => Some((id, article)),
                Err(e) => {
                    log::debug!("Ignoring malformed cache entry '{}': {}", id, e);
                    None
                }
            })
            .collect()
    }

    /// Render documents, in input order.
    fn render_many(&self, ids: &[String]) -> Vec<(String, Result<Article>)> {
        if self.options.parallel {
            ids.par_iter()
                .map(|id| (id.clone(), self.render_article(id)))
                .collect()
        } else {
            ids.iter()
                .map(|id| (id.clone(), self.render_article(id)))
                .collect()
        }
    }

    fn note(&self, message: &str) {
        log::info!("{}", message);
        self.journal.record(message);
    }

    fn fail(&self, message: &str) {
        log::warn!("{}", message);
        self.journal.record(message);
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("options", &self.options)
            .field("journal", &self.journal)
            .finish()
    }
}
