//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small mock catalog and run the full
//! coordinator/worker cycle against it end-to-end.

use catalog_harvest::config::{parse_config, Config};
use catalog_harvest::crawler::{Collaborators, Coordinator, EndReason};
use catalog_harvest::output::export_records;
use catalog_harvest::page::{BookExtractor, CatalogClassifier, ScopedLinkExtractor};
use catalog_harvest::storage::{FsPageStore, PageStore, SqlitePageStore, StorageResult};
use catalog_harvest::url::SiteScope;
use catalog_harvest::HarvestError;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a test configuration with short idle intervals
fn create_test_config(
    entry_url: &str,
    root: &Path,
    pool: usize,
    offset: u64,
    target: u64,
    backend: &str,
) -> Config {
    let pages = root.join("pages");
    let db = root.join("pages.db");
    parse_config(&format!(
        r#"
[crawler]
pool-size = {pool}
target-count = {target}
counter-offset = {offset}
worker-idle-ms = 20
coordinator-idle-ms = 20
request-timeout-secs = 5

[site]
entry-url = "{entry_url}"

[user-agent]
crawler-name = "TestHarvest"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
backend = "{backend}"
pages-dir = "{pages}"
database-path = "{db}"
"#,
        pages = pages.display(),
        db = db.display(),
    ))
    .expect("Failed to build test config")
}

fn detail(base: &str, id: u32) -> String {
    format!("{}/?uItem={}", base, id)
}

fn anchors(links: &[String]) -> String {
    links
        .iter()
        .map(|link| format!(r#"<a href="{}">link</a>"#, link))
        .collect()
}

/// An item page; `slovak` decides whether it is in scope
fn book_page(title: &str, slovak: bool, links: &[String]) -> String {
    let language = if slovak { "slovenský" } else { "český" };
    format!(
        r#"<html><body>
        <section class="section section--breadcrumbs"><a href="/">Domov</a> Knihy</section>
        <h1 class="product-detail__title">{}</h1>
        <main>
            {}
            <section id="details"><dl><dt>Jazyk</dt><dd>{}</dd></dl></section>
        </main>
        </body></html>"#,
        title,
        anchors(links),
        language
    )
}

/// A listing page; never in scope
fn listing_page(links: &[String]) -> String {
    format!(
        r#"<html><body><nav>menu</nav><main>{}</main></body></html>"#,
        anchors(links)
    )
}

/// Directory store whose saves take a while, so workers overlap in `save`
#[derive(Debug)]
struct SlowStore {
    inner: FsPageStore,
    delay: Duration,
    saves: AtomicUsize,
}

impl PageStore for SlowStore {
    fn save(&self, id: &str, content: &str) -> StorageResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.inner.save(id, content)
    }

    fn list_saved_ids(&self) -> StorageResult<Vec<String>> {
        self.inner.list_saved_ids()
    }

    fn load(&self, id: &str) -> StorageResult<String> {
        self.inner.load(id)
    }

    fn describe(&self) -> String {
        format!("slow {}", self.inner.describe())
    }
}

async fn mount_listing(server: &MockServer, route: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_item(server: &MockServer, id: u32, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("uItem", id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_harvest_until_exhausted() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    // Entry: two items, one listing, one off-site link
    mount_listing(
        &mock_server,
        "/knihy",
        listing_page(&[
            detail(&base, 1),
            detail(&base, 2),
            format!("{}/knihy/novinky", base),
            "https://other.test/?uItem=99".to_string(),
        ]),
        1,
    )
    .await;

    // Listing: one new item, one duplicate, one Czech item, the entry again
    mount_listing(
        &mock_server,
        "/knihy/novinky",
        listing_page(&[
            detail(&base, 3),
            detail(&base, 1),
            detail(&base, 4),
            format!("{}/knihy", base),
        ]),
        1,
    )
    .await;

    mount_item(&mock_server, 1, book_page("Prvá", true, &[]), 1).await;
    mount_item(&mock_server, 2, book_page("Druhá", true, &[]), 1).await;
    mount_item(&mock_server, 3, book_page("Tretia", true, &[]), 1).await;
    mount_item(&mock_server, 4, book_page("Česká", false, &[]), 1).await;

    let config = create_test_config(&format!("{}/knihy", base), tmp.path(), 3, 0, 100, "directory");
    let coordinator = Coordinator::from_config(&config).expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Harvest failed");

    assert_eq!(summary.end_reason, EndReason::Exhausted);
    assert_eq!(summary.final_count, 3);
    assert_eq!(summary.stats.pages_saved, 3);
    assert_eq!(summary.stats.pages_fetched, 5);
    assert_eq!(summary.stats.out_of_scope, 2);
    assert_eq!(summary.stats.fetch_failures, 0);
    // Entry page, one listing, four items
    assert_eq!(summary.explored, 6);

    let store = FsPageStore::open(tmp.path().join("pages")).unwrap();
    let mut ids = store.list_saved_ids().unwrap();
    ids.sort();
    assert_eq!(ids, vec!["1", "2", "3"]);

    // Saved pages feed the record export
    let out = tmp.path().join("records.jsonl");
    let report = export_records(&store, &BookExtractor::new().unwrap(), &out).unwrap();
    assert_eq!(report.written, 3);
    assert_eq!(report.skipped, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stops_at_target_without_extra_saves() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    let items: Vec<String> = (1..=6).map(|id| detail(&base, id)).collect();
    mount_listing(&mock_server, "/knihy", listing_page(&items), 1).await;
    for id in 1..=6 {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("uItem", id.to_string()))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(book_page("Kniha", true, &[])),
            )
            .mount(&mock_server)
            .await;
    }

    // Counter starts at 1400 and the target is 1403
    let config =
        create_test_config(&format!("{}/knihy", base), tmp.path(), 1, 1400, 1403, "directory");
    let coordinator = Coordinator::from_config(&config).expect("Failed to create coordinator");
    let state = coordinator.state().clone();
    let frontier = coordinator.frontier().clone();

    let summary = coordinator.run().await.expect("Harvest failed");

    assert_eq!(summary.end_reason, EndReason::TargetReached);
    assert_eq!(summary.final_count, 1403);
    assert_eq!(summary.stats.pages_saved, 3);
    assert!(state.termination.is_set());
    assert!(!frontier.is_empty(), "unfetched entries should remain");

    let store = FsPageStore::open(tmp.path().join("pages")).unwrap();
    assert_eq!(store.count().unwrap(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_workers_stop_exactly_at_target() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    let items: Vec<String> = (1..=8).map(|id| detail(&base, id)).collect();
    mount_listing(&mock_server, "/knihy", listing_page(&items), 1).await;
    for id in 1..=8 {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("uItem", id.to_string()))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(book_page("Kniha", true, &[])),
            )
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(&format!("{}/knihy", base), tmp.path(), 4, 10, 12, "directory");
    let scope = SiteScope::from_config(&config.site).unwrap();
    let store = Arc::new(SlowStore {
        inner: FsPageStore::open(tmp.path().join("pages")).unwrap(),
        delay: Duration::from_millis(300),
        saves: AtomicUsize::new(0),
    });
    let links = ScopedLinkExtractor::new(&config.site.link_scope, scope.domain()).unwrap();
    let collaborators = Collaborators {
        classifier: Arc::new(CatalogClassifier::from_config(&config.classifier).unwrap()),
        links: Arc::new(links),
        store: store.clone(),
    };

    let summary = Coordinator::new(&config, collaborators)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Harvest failed");

    assert_eq!(summary.end_reason, EndReason::TargetReached);
    assert_eq!(summary.final_count, 12);
    assert_eq!(summary.stats.pages_saved, 2);
    assert_eq!(store.saves.load(Ordering::SeqCst), 2);
    assert_eq!(store.count().unwrap(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_saved_pages_are_not_refetched() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    // Five items saved by an earlier run
    let store = FsPageStore::open(tmp.path().join("pages")).unwrap();
    for id in 1..=5 {
        store.save(&id.to_string(), "<html>earlier</html>").unwrap();
    }

    let items: Vec<String> = (1..=6).map(|id| detail(&base, id)).collect();
    mount_listing(&mock_server, "/knihy", listing_page(&items), 1).await;
    for id in 1..=5 {
        mount_item(&mock_server, id, book_page("Stará", true, &[]), 0).await;
    }
    mount_item(&mock_server, 6, book_page("Nová", true, &[]), 1).await;

    let config = create_test_config(&format!("{}/knihy", base), tmp.path(), 2, 5, 100, "directory");
    let coordinator = Coordinator::from_config(&config).expect("Failed to create coordinator");

    assert_eq!(coordinator.seed_explored().unwrap(), 5);
    assert_eq!(coordinator.state().explored.len(), 5);
    assert!(coordinator.frontier().is_empty());

    let summary = coordinator.run().await.expect("Harvest failed");

    assert_eq!(summary.end_reason, EndReason::Exhausted);
    assert_eq!(summary.stats.pages_saved, 1);
    assert_eq!(summary.stats.urls_enqueued, 1);
    assert_eq!(summary.final_count, 6);
    assert_eq!(store.count().unwrap(), 6);
    assert_eq!(store.load("1").unwrap(), "<html>earlier</html>");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fetch_failures_are_contained() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_listing(
        &mock_server,
        "/knihy",
        listing_page(&[
            // Nothing listens on port 1
            "http://127.0.0.1:1/knihy/broken".to_string(),
            format!("{}/knihy/error", base),
            detail(&base, 1),
            detail(&base, 2),
        ]),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/knihy/error"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_item(&mock_server, 1, book_page("Jedna", true, &[]), 1).await;
    mount_item(&mock_server, 2, book_page("Dva", true, &[]), 1).await;

    let config = create_test_config(&format!("{}/knihy", base), tmp.path(), 2, 0, 100, "directory");
    let summary = Coordinator::from_config(&config)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Harvest failed");

    assert_eq!(summary.end_reason, EndReason::Exhausted);
    assert_eq!(summary.stats.fetch_failures, 2);
    assert_eq!(summary.stats.pages_saved, 2);
    assert_eq!(summary.stats.batches_merged, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_item_linked_from_two_pages_fetched_once() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    let shared = detail(&base, 3);
    mount_listing(
        &mock_server,
        "/knihy",
        listing_page(&[detail(&base, 1), detail(&base, 2)]),
        1,
    )
    .await;
    mount_item(&mock_server, 1, book_page("A", true, &[shared.clone()]), 1).await;
    mount_item(&mock_server, 2, book_page("B", true, &[shared.clone()]), 1).await;
    mount_item(&mock_server, 3, book_page("C", true, &[]), 1).await;

    let config = create_test_config(&format!("{}/knihy", base), tmp.path(), 4, 0, 100, "directory");
    let summary = Coordinator::from_config(&config)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Harvest failed");

    assert_eq!(summary.stats.pages_saved, 3);
    assert_eq!(summary.stats.urls_enqueued, 3);
    assert_eq!(summary.explored, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_page_errors_do_not_stop_workers() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_listing(
        &mock_server,
        "/knihy",
        listing_page(&[detail(&base, 1), detail(&base, 2)]),
        1,
    )
    .await;
    mount_item(&mock_server, 1, String::new(), 1).await;
    mount_item(&mock_server, 2, book_page("Dobrá", true, &[]), 1).await;

    let config = create_test_config(&format!("{}/knihy", base), tmp.path(), 1, 0, 100, "directory");
    let summary = Coordinator::from_config(&config)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Harvest failed");

    assert_eq!(summary.end_reason, EndReason::Exhausted);
    assert_eq!(summary.stats.page_errors, 1);
    assert_eq!(summary.stats.pages_saved, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sqlite_backend() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_listing(
        &mock_server,
        "/knihy",
        listing_page(&[detail(&base, 10), detail(&base, 11)]),
        1,
    )
    .await;
    mount_item(&mock_server, 10, book_page("Desať", true, &[]), 1).await;
    mount_item(&mock_server, 11, book_page("Jedenásť", true, &[]), 1).await;

    let config = create_test_config(&format!("{}/knihy", base), tmp.path(), 2, 0, 100, "sqlite");
    let summary = Coordinator::from_config(&config)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Harvest failed");

    assert_eq!(summary.stats.pages_saved, 2);

    let store = SqlitePageStore::open(&tmp.path().join("pages.db")).unwrap();
    assert_eq!(store.count().unwrap(), 2);
    assert!(store.load("10").unwrap().contains("Desať"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_offset_at_target_fetches_no_items() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    mount_listing(&mock_server, "/knihy", listing_page(&[detail(&base, 1)]), 1).await;
    mount_item(&mock_server, 1, book_page("Nič", true, &[]), 0).await;

    let config = create_test_config(&format!("{}/knihy", base), tmp.path(), 2, 50, 50, "directory");
    let summary = Coordinator::from_config(&config)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Harvest failed");

    assert_eq!(summary.end_reason, EndReason::TargetReached);
    assert_eq!(summary.final_count, 50);
    assert_eq!(summary.stats.pages_fetched, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_entry_page_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let tmp = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/knihy"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/knihy", base), tmp.path(), 2, 0, 10, "directory");
    let result = Coordinator::from_config(&config)
        .expect("Failed to create coordinator")
        .run()
        .await;

    match result {
        Err(HarvestError::EntryFetch { url, reason }) => {
            assert_eq!(url, format!("{}/knihy", base));
            assert_eq!(reason, "HTTP 404");
        }
        other => panic!("expected entry fetch error, got {:?}", other),
    }
}
