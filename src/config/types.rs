use serde::Deserialize;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36";

/// Main configuration structure for Metro-Prices
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Public site origin, prefixed to relative product URLs in reports
    #[serde(rename = "site-domain")]
    pub site_domain: String,

    /// GraphQL endpoint serving category trees and product catalogs
    #[serde(rename = "graphql-url")]
    pub graphql_url: String,

    /// Endpoint reporting the total number of live stores
    #[serde(rename = "store-count-url")]
    pub store_count_url: String,

    /// Store detail endpoint; the numeric store id is appended
    #[serde(rename = "store-detail-url")]
    pub store_detail_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            site_domain: "https://online.metro-cc.ru".to_string(),
            graphql_url: "https://api.metro-cc.ru/products-api/graph".to_string(),
            store_count_url: "https://www.metro-cc.ru/sxa/search/results/?l=ru-RU&s={0F3B38A3-7330-4544-B95B-81FC80A6BB6F}|{0F3B38A3-7330-4544-B95B-81FC80A6BB6F}&itemid={A59341E8-DDEE-4399-B05A-5B91DB7188EF}&sig=store-locator&g=%7C&o=StoreName%2CAscending&p=20&v=%7BA0897F25-35F9-47F8-A28F-94814E5A0A78%7D".to_string(),
            store_detail_url: "https://api.metro-cc.ru/api/v1/C98BB1B547ECCC17D8AEBEC7116D6/tradecenters/".to_string(),
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Value of the Accept header sent with every request
    pub accept: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Additional attempts after the first failure for transient errors
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: "*/*".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }
}

/// Store discovery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Highest store id probed before discovery gives up
    #[serde(rename = "max-store-id")]
    pub max_store_id: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { max_store_id: 2000 }
    }
}

/// Product catalog paging
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Upper bound on pages fetched for one category
    #[serde(rename = "max-pages")]
    pub max_pages: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: 500,
            max_pages: 1000,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the store directory cache (JSON)
    #[serde(rename = "store-cache-path")]
    pub store_cache_path: String,

    /// Root directory for report artifacts
    #[serde(rename = "report-dir")]
    pub report_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            store_cache_path: "stores.json".to_string(),
            report_dir: "data".to_string(),
        }
    }
}
