use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Worker pool and termination configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of fetch workers running in parallel
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Progress counter value at which the run stops
    #[serde(default = "default_target_count")]
    pub target_count: u64,

    /// Starting value of the progress counter (pages saved by earlier runs)
    #[serde(default = "default_counter_offset")]
    pub counter_offset: u64,

    /// How long an idle worker waits on the frontier before re-checking (milliseconds)
    #[serde(default = "default_worker_idle_ms")]
    pub worker_idle_ms: u64,

    /// How long the coordinator sleeps on an empty discovery channel (milliseconds)
    #[serde(default = "default_coordinator_idle_ms")]
    pub coordinator_idle_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl CrawlerConfig {
    pub fn worker_idle(&self) -> Duration {
        Duration::from_millis(self.worker_idle_ms)
    }

    pub fn coordinator_idle(&self) -> Duration {
        Duration::from_millis(self.coordinator_idle_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            target_count: default_target_count(),
            counter_offset: default_counter_offset(),
            worker_idle_ms: default_worker_idle_ms(),
            coordinator_idle_ms: default_coordinator_idle_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// The catalog site being harvested
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Site root; its host bounds the crawl and its origin prefixes item URLs
    pub entry_url: String,

    /// Query parameter that carries the numeric item id on detail pages
    #[serde(default = "default_detail_param")]
    pub detail_param: String,

    /// Path prefix of catalog listing pages
    #[serde(default = "default_listing_prefix")]
    pub listing_prefix: String,

    /// CSS selector of the element links are extracted from
    #[serde(default = "default_link_scope")]
    pub link_scope: String,
}

/// Keywords the default page classifier looks for
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClassifierConfig {
    /// Must appear in the breadcrumbs section
    #[serde(default = "default_category_keyword")]
    pub category_keyword: String,

    /// Must appear in the item details section
    #[serde(default = "default_language_keyword")]
    pub language_keyword: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            category_keyword: default_category_keyword(),
            language_keyword: default_language_keyword(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Where saved pages go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One file per item id
    Directory,
    /// One row per item id
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,

    /// Directory used by the directory backend
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// Path to the SQLite database file used by the sqlite backend
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_pool_size() -> usize {
    7
}

fn default_target_count() -> u64 {
    10_000
}

fn default_counter_offset() -> u64 {
    1_400
}

fn default_worker_idle_ms() -> u64 {
    2_000
}

fn default_coordinator_idle_ms() -> u64 {
    4_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_detail_param() -> String {
    String::from("uItem")
}

fn default_listing_prefix() -> String {
    String::from("/knihy")
}

fn default_link_scope() -> String {
    String::from("main")
}

fn default_category_keyword() -> String {
    String::from("Knihy")
}

fn default_language_keyword() -> String {
    String::from("slovenský")
}

fn default_backend() -> StorageBackend {
    StorageBackend::Directory
}

fn default_pages_dir() -> String {
    String::from("./pages")
}

fn default_database_path() -> String {
    String::from("./pages.db")
}
