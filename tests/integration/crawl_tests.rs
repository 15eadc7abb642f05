//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the chain's REST and GraphQL
//! endpoints and drive discovery and city crawls end-to-end over HTTP.

use chrono::NaiveDate;
use metro_prices::api::CatalogApi;
use metro_prices::config::Config;
use metro_prices::crawler::{build_api, load_directory, run_crawl};
use metro_prices::{
    CategoryResolver, CrawlOrchestrator, JsonReportWriter, MetroError, ReportRecord,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing every endpoint at the mock server
fn create_test_config(base_url: &str, work_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.api.graphql_url = format!("{}/graph", base_url);
    config.api.store_count_url = format!("{}/store-count", base_url);
    config.api.store_detail_url = format!("{}/tradecenters/", base_url);
    config.http.timeout_secs = 5;
    config.http.max_retries = 2;
    config.http.backoff_base_ms = 1;
    config.discovery.max_store_id = 20;
    config.catalog.page_size = 2;
    config.catalog.max_pages = 10;
    config.output.store_cache_path = work_dir
        .path()
        .join("stores.json")
        .to_string_lossy()
        .into_owned();
    config.output.report_dir = work_dir.path().join("data").to_string_lossy().into_owned();
    config
}

fn product(article: &str, price: f64, old_price: Option<f64>, brand: &str) -> Value {
    json!({
        "article": article,
        "name": format!("Product {}", article),
        "url": format!("/products/{}", article),
        "stocks": [{ "prices": { "price": price, "old_price": old_price } }],
        "attributes": [{ "text": brand }]
    })
}

fn products_body(products: Vec<Value>) -> Value {
    json!({ "data": { "category": { "products": products } } })
}

/// Mounts a store count of 2 with a gap at id 2: Moscow store 356 at id 1,
/// Kazan store 10 at id 3
async fn mount_store_directory(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/store-count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Count": 2 })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tradecenters/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "store_id": 356, "name": "Metro Ryazanka", "city": "Москва" }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tradecenters/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tradecenters/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "store_id": 10, "name": "Metro Kazan", "city": "Казань" }
        })))
        .mount(server)
        .await;
}

/// Mounts a category tree with one regular category and one promo root
async fn mount_categories(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/graph"))
        .and(body_string_contains("query Search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "search": {
                    "categories": [
                        { "slug": "molochnye-produkty", "category_type": "category" },
                        { "slug": "aktsii", "category_type": "promo_root" }
                    ]
                }
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_discovery_skips_gaps_and_writes_cache() {
    let mock_server = MockServer::start().await;
    mount_store_directory(&mock_server).await;

    let work_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &work_dir);

    let api = build_api(&config).expect("Failed to build API");
    let directory = load_directory(&config, api, false, CancellationToken::new())
        .await
        .expect("Discovery failed");

    assert_eq!(directory.store_count(), 2);
    assert_eq!(directory.cities(), vec!["Москва", "Казань"]);
    let moscow = directory.stores_in("Москва").expect("Moscow missing");
    assert_eq!(moscow[0].store_id, 356);
    assert_eq!(moscow[0].name, "Metro Ryazanka");

    // The cache is reused on the next run even with the server gone
    assert!(work_dir.path().join("stores.json").exists());
    drop(mock_server);

    let offline_api = build_api(&config).expect("Failed to build API");
    let cached = load_directory(&config, offline_api, false, CancellationToken::new())
        .await
        .expect("Cache load failed");
    assert_eq!(cached, directory);
}

#[tokio::test]
async fn test_unused_store_id_answering_not_found_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store-count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Count": 1 })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tradecenters/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "success": false })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tradecenters/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "store_id": 42, "name": "Metro Tver", "city": "Тверь" }
        })))
        .mount(&mock_server)
        .await;

    let work_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &work_dir);

    let api = build_api(&config).expect("Failed to build API");
    let directory = load_directory(&config, api, false, CancellationToken::new())
        .await
        .expect("Discovery failed");

    assert_eq!(directory.store_count(), 1);
    let tver = directory.stores_in("Тверь").expect("Tver missing");
    assert_eq!(tver[0].store_id, 42);
}

#[tokio::test]
async fn test_store_detail_not_found_without_json_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tradecenters/1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let work_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &work_dir);
    let api = build_api(&config).expect("Failed to build API");

    match api.store_detail(1).await {
        Err(MetroError::UnexpectedStatus { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_store_detail_server_error_is_retried_not_skipped() {
    let mock_server = MockServer::start().await;

    // Initial attempt plus max-retries = 2
    Mock::given(method("GET"))
        .and(path("/tradecenters/1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "success": false })))
        .expect(3)
        .mount(&mock_server)
        .await;

    let work_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &work_dir);
    let api = build_api(&config).expect("Failed to build API");

    match api.store_detail(1).await {
        Err(MetroError::UnexpectedStatus { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_nested_category_tree_is_flattened() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graph"))
        .and(body_string_contains("query Search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "search": {
                    "categories": [
                        {
                            "slug": "molochnye-produkty",
                            "category_type": "category",
                            "children": [
                                { "slug": "moloko", "category_type": "category" },
                                { "slug": "syr", "category_type": "category" }
                            ]
                        },
                        {
                            "slug": "aktsii",
                            "category_type": "promo_root",
                            "children": [
                                { "slug": "skidki", "category_type": "category" }
                            ]
                        }
                    ]
                }
            }
        })))
        .mount(&mock_server)
        .await;

    let work_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &work_dir);
    let resolver = CategoryResolver::new(build_api(&config).expect("Failed to build API"));

    let slugs = resolver
        .resolve_categories(356)
        .await
        .expect("Category resolution failed");

    assert_eq!(slugs, vec!["molochnye-produkty", "moloko", "syr", "skidki"]);
}

#[tokio::test]
async fn test_full_crawl_single_city() {
    let mock_server = MockServer::start().await;
    mount_store_directory(&mock_server).await;
    mount_categories(&mock_server).await;

    // First page is full, second is short and ends pagination
    Mock::given(method("POST"))
        .and(path("/graph"))
        .and(body_string_contains("query Category"))
        .and(body_string_contains("\"from\":0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_body(vec![
            product("10001", 40.0, Some(50.0), "Acme"),
            product("10002", 75.5, Some(0.0), "Prostokvashino"),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/graph"))
        .and(body_string_contains("query Category"))
        .and(body_string_contains("\"from\":2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_body(vec![json!({
            // No stocks: skipped as malformed
            "article": 10003,
            "name": "Broken",
            "url": "/products/10003",
            "stocks": [],
            "attributes": [{ "text": "Nobody" }]
        })])))
        .mount(&mock_server)
        .await;

    let work_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &work_dir);

    let api = build_api(&config).expect("Failed to build API");
    let directory = load_directory(&config, api.clone(), false, CancellationToken::new())
        .await
        .expect("Discovery failed");

    let date = NaiveDate::from_ymd_opt(2023, 10, 5).expect("valid date");
    let writer = Arc::new(JsonReportWriter::new(&config.output.report_dir));
    let orchestrator =
        CrawlOrchestrator::new(directory, api, writer, &config).with_report_date(date);

    let summary = orchestrator.crawl("Москва").await.expect("Crawl failed");

    assert!(summary.is_complete(), "unexpected failures: {:?}", summary.failures);
    assert_eq!(summary.stores, 1);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.skipped_products, 1);
    assert_eq!(summary.reports.len(), 1);

    let report_path = work_dir
        .path()
        .join("data")
        .join("Москва")
        .join("05-10-23")
        .join("Metro Ryazanka")
        .join("molochnye-produkty.json");
    assert_eq!(summary.reports[0], report_path);

    let contents = std::fs::read_to_string(&report_path).expect("Report missing");
    let records: Vec<ReportRecord> = serde_json::from_str(&contents).expect("Invalid report");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].article, "10001");
    assert_eq!(records[0].regular_price, 50.0);
    assert_eq!(records[0].promo_price, Some(40.0));
    assert_eq!(records[0].brand, "Acme");
    assert_eq!(
        records[0].url,
        "https://online.metro-cc.ru/products/10001"
    );
    assert_eq!(records[1].regular_price, 75.5);
    assert_eq!(records[1].promo_price, None);

    // Promo root categories produce no report
    assert!(!report_path.with_file_name("aktsii.json").exists());
}

#[tokio::test]
async fn test_unknown_city_writes_nothing() {
    let mock_server = MockServer::start().await;
    mount_store_directory(&mock_server).await;

    let work_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &work_dir);

    let result = run_crawl(&config, "Атлантида", false, CancellationToken::new()).await;

    match result {
        Err(MetroError::CityNotFound { city, known }) => {
            assert_eq!(city, "Атлантида");
            assert_eq!(known, vec!["Москва", "Казань"]);
        }
        other => panic!("expected CityNotFound, got {:?}", other.map(|s| s.city)),
    }
    assert!(!work_dir.path().join("data").exists());
}

#[tokio::test]
async fn test_transient_server_error_is_retried() {
    let mock_server = MockServer::start().await;

    // The first request fails, the retry succeeds
    Mock::given(method("GET"))
        .and(path("/store-count"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/store-count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Count": 93 })))
        .mount(&mock_server)
        .await;

    let work_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &work_dir);
    let api = build_api(&config).expect("Failed to build API");

    assert_eq!(api.store_count().await.expect("Count failed"), 93);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store-count"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let work_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &work_dir);
    let api = build_api(&config).expect("Failed to build API");

    match api.store_count().await {
        Err(MetroError::UnexpectedStatus { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_graphql_errors_fail_only_that_store() {
    let mock_server = MockServer::start().await;
    mount_store_directory(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/graph"))
        .and(body_string_contains("query Search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "store is closed" }]
        })))
        .mount(&mock_server)
        .await;

    let work_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &work_dir);

    let summary = run_crawl(&config, "Казань", false, CancellationToken::new())
        .await
        .expect("Crawl should complete with failures recorded");

    assert_eq!(summary.stores, 1);
    assert!(summary.reports.is_empty());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].store_id, 10);
    assert_eq!(summary.failures[0].category_slug, None);
    assert!(summary.failures[0].message.contains("store is closed"));
}

#[tokio::test]
async fn test_malformed_json_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store-count"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let work_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &work_dir);
    let api = build_api(&config).expect("Failed to build API");

    assert!(matches!(
        api.store_count().await,
        Err(MetroError::Deserialize { .. })
    ));
}
