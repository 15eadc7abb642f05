//! HTTP implementation of the catalog API
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured headers and timeouts
//! - GET requests against the store count and store detail endpoints
//! - GraphQL POST requests for category trees and product pages
//! - Error classification and retry of transient failures

use crate::api::retry::retry_with_backoff;
use crate::api::types::{
    CategoryData, GraphQlResponse, SearchData, StoreCountResponse, StoreDetailResponse,
};
use crate::api::{CatalogApi, Category, RawProduct};
use crate::config::{ApiConfig, HttpConfig};
use crate::directory::Store;
use crate::{MetroError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// Selects root-level categories only; `children` is decoded when a response
/// carries it and is otherwise empty.
const CATEGORIES_QUERY: &str = r#"
query Search($storeId: Int!, $asTree: Boolean) {
  search(storeId: $storeId) {
    categories(asTree: $asTree) {
      slug
      category_type
    }
  }
}
"#;

const PRODUCTS_QUERY: &str = r#"
query Category($storeId: Int!, $slug: String!, $from: Int!, $size: Int!) {
  category(storeId: $storeId, slug: $slug) {
    products(from: $from, size: $size) {
      name
      stocks {
        prices {
          price
          old_price
        }
      }
      url
      article
      attributes {
        text
      }
    }
  }
}
"#;

/// Builds an HTTP client with the configured user agent, headers and timeouts
///
/// # Example
///
/// ```no_run
/// use metro_prices::api::build_http_client;
/// use metro_prices::config::HttpConfig;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Ok(accept) = HeaderValue::from_str(&config.accept) {
        headers.insert(ACCEPT, accept);
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Catalog API backed by the chain's public REST and GraphQL endpoints
pub struct HttpCatalogApi {
    client: Client,
    endpoints: ApiConfig,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpCatalogApi {
    /// Creates an API client from the endpoint and transport configuration
    pub fn new(endpoints: ApiConfig, http: &HttpConfig) -> Result<Self> {
        let client = build_http_client(http)?;
        Ok(Self {
            client,
            endpoints,
            max_retries: http.max_retries,
            backoff_base_ms: http.backoff_base_ms,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        context: &str,
        policy: StatusPolicy,
    ) -> Result<T> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| classify_request_error(url, e))?;
            parse_response(url, context, response, policy).await
        })
        .await
    }

    async fn post_graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
        context: &str,
    ) -> Result<T> {
        let url = self.endpoints.graphql_url.as_str();
        let body = json!({ "query": query, "variables": variables });
        let body = &body;

        let envelope: GraphQlResponse<T> =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
                let response = self
                    .client
                    .post(url)
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| classify_request_error(url, e))?;
                parse_response(url, context, response, StatusPolicy::Strict).await
            })
            .await?;

        match envelope.data {
            Some(data) => {
                if !envelope.errors.is_empty() {
                    tracing::warn!(
                        "GraphQL returned partial data for {} with {} error(s)",
                        context,
                        envelope.errors.len()
                    );
                }
                Ok(data)
            }
            None => {
                let messages: Vec<&str> =
                    envelope.errors.iter().map(|e| e.message.as_str()).collect();
                Err(MetroError::Api(format!(
                    "{}: no data returned ({})",
                    context,
                    messages.join("; ")
                )))
            }
        }
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn store_count(&self) -> Result<u64> {
        let response: StoreCountResponse = self
            .get_json(
                &self.endpoints.store_count_url,
                "store count",
                StatusPolicy::Strict,
            )
            .await?;
        Ok(response.count)
    }

    async fn store_detail(&self, id: u64) -> Result<Option<Store>> {
        let url = format!("{}{}", self.endpoints.store_detail_url, id);
        // Unused ids may answer 4xx with `{"success": false}`
        let response: StoreDetailResponse = self
            .get_json(
                &url,
                &format!("store detail {}", id),
                StatusPolicy::BodyOnClientError,
            )
            .await?;

        if !response.success {
            return Ok(None);
        }

        // A success flag without a payload is treated like an unused id
        Ok(response.data.map(|detail| Store {
            store_id: detail.store_id,
            name: detail.name,
            city: detail.city,
        }))
    }

    async fn category_tree(&self, store_id: i64) -> Result<Vec<Category>> {
        let variables = json!({ "storeId": store_id, "asTree": true });
        let data: SearchData = self
            .post_graphql(
                CATEGORIES_QUERY,
                variables,
                &format!("categories of store {}", store_id),
            )
            .await?;
        Ok(data.search.categories)
    }

    async fn products_page(
        &self,
        store_id: i64,
        slug: &str,
        from: u32,
        size: u32,
    ) -> Result<Vec<RawProduct>> {
        let variables = json!({
            "storeId": store_id,
            "slug": slug,
            "from": from,
            "size": size,
        });
        let data: CategoryData = self
            .post_graphql(
                PRODUCTS_QUERY,
                variables,
                &format!("products of store {} category '{}'", store_id, slug),
            )
            .await?;
        Ok(data.category.map(|c| c.products).unwrap_or_default())
    }
}

/// Maps a reqwest send error to a crate error, separating timeouts
fn classify_request_error(url: &str, error: reqwest::Error) -> MetroError {
    if error.is_timeout() {
        MetroError::Timeout {
            url: url.to_string(),
        }
    } else {
        MetroError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

/// How a non-2xx status is treated before the body is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusPolicy {
    /// Any non-2xx status is an error
    Strict,
    /// A 4xx (other than 429) whose body decodes is returned as the response
    BodyOnClientError,
}

async fn parse_response<T: DeserializeOwned>(
    url: &str,
    context: &str,
    response: reqwest::Response,
    policy: StatusPolicy,
) -> Result<T> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(MetroError::RateLimited {
            url: url.to_string(),
        });
    }

    let unexpected = || MetroError::UnexpectedStatus {
        status: status.as_u16(),
        url: url.to_string(),
    };

    let body_decides = policy == StatusPolicy::BodyOnClientError && status.is_client_error();
    if !status.is_success() && !body_decides {
        return Err(unexpected());
    }

    let body = response
        .text()
        .await
        .map_err(|e| classify_request_error(url, e))?;

    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(unexpected()),
        Err(e) => Err(MetroError::Deserialize {
            context: context.to_string(),
            source: e,
        }),
    }
}
