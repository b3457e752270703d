//! Integration tests for the archive service.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use docfeed::error::{Error, Result};
use docfeed::{
    Archive, ArchiveOptions, Block, CacheTier, DirectorySource, DocumentEntry, DocumentSource,
    DurableStore, FileStore, ListResponse, ListingSource, MemoryStore, Mime, Paragraph, Request,
    SourceDocument,
};

/// Mock document service with one unreadable document.
struct MockSource {
    folder: Vec<DocumentEntry>,
    documents: BTreeMap<String, SourceDocument>,
    locked: Vec<String>,
}

impl MockSource {
    fn new(count: usize) -> Self {
        let mut source = Self {
            folder: Vec::new(),
            documents: BTreeMap::new(),
            locked: Vec::new(),
        };
        for i in 0..count {
            let id = format!("doc{:02}", i);
            source.folder.push(DocumentEntry::new(&id, format!("Post {}", i)));
            source.documents.insert(
                id.clone(),
                SourceDocument {
                    title: format!("Post {}", i),
                    blocks: vec![Paragraph::with_text(format!("Body {}", i)).into()],
                },
            );
        }
        source
    }

    fn lock(mut self, id: &str) -> Self {
        self.locked.push(id.to_string());
        self
    }

    fn get(&self, id: &str) -> Result<&SourceDocument> {
        if self.locked.iter().any(|l| l == id) {
            return Err(Error::AccessDenied(id.to_string()));
        }
        self.documents
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }
}

impl DocumentSource for MockSource {
    fn blocks(&self, id: &str) -> Result<Vec<Block>> {
        Ok(self.get(id)?.blocks.clone())
    }

    fn title(&self, id: &str) -> Result<String> {
        Ok(self.get(id)?.title.clone())
    }
}

impl ListingSource for MockSource {
    fn list_documents(&self, _folder_id: &str) -> Result<Vec<DocumentEntry>> {
        Ok(self.folder.clone())
    }
}

/// Cache that records writes and refuses all of them.
#[derive(Default)]
struct RefusingCache {
    attempts: Mutex<Vec<String>>,
}

impl CacheTier for RefusingCache {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn get_all(&self, _keys: &[String]) -> Result<HashMap<String, String>> {
        Err(Error::Other("cache offline".to_string()))
    }

    fn put(&self, key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        self.attempts.lock().unwrap().push(key.to_string());
        Err(Error::Other("cache offline".to_string()))
    }

    fn remove_all(&self, _keys: &[String]) -> Result<()> {
        Ok(())
    }
}

fn archive_with(source: MockSource) -> (Archive, Arc<MemoryStore>, Arc<MemoryStore>) {
    let cache = Arc::new(MemoryStore::cache());
    let store = Arc::new(MemoryStore::properties());
    let archive = Archive::from_source(
        Arc::new(source),
        cache.clone(),
        store.clone(),
        ArchiveOptions::new("folder"),
    );
    (archive, cache, store)
}

#[test]
fn test_list_skips_failing_documents() {
    let (archive, cache, _) = archive_with(MockSource::new(3).lock("doc01"));
    let list = archive.list();

    assert_eq!(list.ids, vec!["doc00", "doc01", "doc02"]);
    let served: Vec<_> = list.article_cache.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(served, vec!["doc00", "doc02"]);
    assert!(cache.is_empty());
}

#[test]
fn test_list_response_shape() {
    let (archive, _, _) = archive_with(MockSource::new(1));
    let response = archive.handle(&Request::list());
    assert_eq!(response.mime, Mime::Json);
    assert_eq!(
        response.body,
        r#"{"ids":["doc00"],"article_cache":[{"id":"doc00","title":"Post 0","markdown":"Body 0\n"}]}"#
    );
    let parsed: ListResponse = serde_json::from_str(&response.body).unwrap();
    assert_eq!(parsed.article_cache.len(), 1);
}

#[test]
fn test_locked_document_reads_as_not_found() {
    let (archive, _, _) = archive_with(MockSource::new(2).lock("doc00"));
    let response = archive.handle(&Request::article("doc00"));
    assert_eq!(response.body, r#"{"error":"Document not found"}"#);
}

#[test]
fn test_precache_limit_and_failures() {
    let cache = Arc::new(MemoryStore::cache());
    let archive = Archive::from_source(
        Arc::new(MockSource::new(5).lock("doc00")),
        cache.clone(),
        Arc::new(MemoryStore::properties()),
        ArchiveOptions::new("folder").with_precache_limit(3),
    );
    let report = archive.precache_all().unwrap();

    assert_eq!(report.listed, 5);
    assert_eq!(report.cached, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(cache.keys(), vec!["0", "doc01", "doc02"]);
    assert!(archive
        .journal()
        .contents()
        .contains("Error caching article doc00"));
}

#[test]
fn test_cache_failures_never_reach_read_paths() {
    let cache = Arc::new(RefusingCache::default());
    let archive = Archive::from_source(
        Arc::new(MockSource::new(2)),
        cache.clone(),
        Arc::new(MemoryStore::properties()),
        ArchiveOptions::new("folder").with_parallel(false),
    );

    assert_eq!(archive.list().article_cache.len(), 2);
    assert!(archive.article("doc01").contains(r#""title":"Post 1""#));
    assert!(cache.attempts.lock().unwrap().is_empty());

    let report = archive.precache_all().unwrap();
    assert_eq!(report.failed, 2);
    assert_eq!(cache.attempts.lock().unwrap().len(), 3);
}

#[test]
fn test_repack_renders_cache_misses() {
    let (archive, cache, store) = archive_with(MockSource::new(4).lock("doc03"));
    cache
        .put(
            "0",
            r#"["doc00","doc01","doc02","doc03","unknown"]"#,
            Duration::from_secs(60),
        )
        .unwrap();
    cache
        .put(
            "doc00",
            r#"{"id":"doc00","title":"Cached","markdown":"From cache\n"}"#,
            Duration::from_secs(60),
        )
        .unwrap();

    let report = archive.repack_feed();
    assert!(report.committed);
    assert_eq!(report.articles, 3);

    let xml = archive.feed_xml();
    assert!(xml.contains("<title>Cached</title>"));
    assert!(xml.contains("<title>Post 2</title>"));
    assert!(!xml.contains("doc03"));
    assert!(store
        .get_property("DEBUG_LOGS")
        .unwrap()
        .unwrap()
        .contains("RSS Cache: Failed to fetch article doc03"));
}

#[test]
fn test_end_to_end_with_files() {
    let dir = tempfile::tempdir().unwrap();
    let docs = DirectorySource::new(dir.path().join("docs"));
    for (id, title) in [("a", "2024-01"), ("b", "2024-02")] {
        let document = SourceDocument {
            title: title.to_string(),
            blocks: vec![Paragraph::heading(format!("Issue {}", title), 1).into()],
        };
        docs.store("published", id, &document).unwrap();
    }

    let cache_path = dir.path().join("cache.json");
    let store_path = dir.path().join("store.json");
    let open = || {
        Archive::from_source(
            Arc::new(docs.clone()),
            Arc::new(FileStore::open(&cache_path).unwrap()),
            Arc::new(FileStore::open(&store_path).unwrap()),
            ArchiveOptions::new("published"),
        )
    };

    let archive = open();
    archive.precache_all().unwrap();
    archive.repack_feed();

    // A fresh process sees the persisted state.
    let archive = open();
    let list = archive.list();
    assert_eq!(list.ids, vec!["b", "a"]);
    assert_eq!(list.article_cache[0].markdown, "# Issue 2024-02\n");

    let feed = archive.handle(&Request::feed());
    assert_eq!(feed.mime, Mime::Xml);
    assert!(feed.body.contains(r#"<guid isPermaLink="false">a</guid>"#));

    assert_eq!(archive.clear_cache_all().unwrap(), 3);
    let cache = FileStore::open(&cache_path).unwrap();
    assert_eq!(cache.get("0").unwrap(), None);
    let store = FileStore::open(&store_path).unwrap();
    assert!(store.get_property("RSS_DATA").unwrap().is_some());
}
