//! OpenAlex API client.
//!
//! Provides an async HTTP client with:
//! - Connection pooling via reqwest
//! - Fixed inter-request delay to stay inside the polite-pool rate limit
//! - Response caching with 5-minute TTL
//!
//! Every identifier leaving this module is namespace-normalized (the
//! `https://openalex.org/` prefix is stripped), so callers can compare and
//! intersect ids without caring how the upstream spelled them.

use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;

use crate::config::{Config, api, fields};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Author, EntityPage, Institution, Journal, Topic, Work, WorkPage, normalize_id,
};

/// OpenAlex API client.
#[derive(Clone)]
pub struct OpenAlexClient {
    /// HTTP client.
    client: Client,

    /// Response cache.
    cache: Cache<String, serde_json::Value>,

    /// API base URL.
    base_url: String,

    /// Polite-pool contact email (optional).
    mailto: Option<String>,

    /// Delay between upstream requests.
    rate_limit_delay: Duration,
}

impl OpenAlexClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            client,
            cache,
            base_url: config.base_url.clone(),
            mailto: config.mailto.clone(),
            rate_limit_delay: config.rate_limit_delay,
        })
    }

    /// Check if a polite-pool email is configured.
    #[must_use]
    pub fn has_mailto(&self) -> bool {
        self.mailto.is_some()
    }

    /// Search works with a rendered filter expression.
    ///
    /// `filter` uses the upstream grammar: clauses `,`-joined (conjunctive),
    /// alternatives within a clause `|`-joined. Pages are 1-indexed.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_works(
        &self,
        filter: Option<&str>,
        search: Option<&str>,
        sort: Option<&str>,
        page: usize,
        per_page: usize,
    ) -> ClientResult<WorkPage> {
        let url = format!("{}/works", self.base_url);

        let mut params = vec![
            ("page".to_string(), page.to_string()),
            ("per-page".to_string(), per_page.to_string()),
            ("select".to_string(), fields::WORK.to_string()),
        ];

        if let Some(f) = filter {
            params.push(("filter".to_string(), f.to_string()));
        }

        if let Some(q) = search {
            params.push(("search".to_string(), q.to_string()));
        }

        if let Some(s) = sort {
            params.push(("sort".to_string(), s.to_string()));
        }

        let mut result: WorkPage = self.get(&url, &params).await?;
        for work in &mut result.results {
            normalize_work(work);
        }
        Ok(result)
    }

    /// Get a single work by id, including its outbound reference-id list.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_work(&self, work_id: &str) -> ClientResult<Work> {
        let url = format!("{}/works/{}", self.base_url, normalize_id(work_id));
        let params = vec![("select".to_string(), fields::WORK_WITH_REFERENCES.to_string())];

        let mut work: Work = self.get(&url, &params).await?;
        normalize_work(&mut work);
        Ok(work)
    }

    /// Get multiple works by id in one filtered fetch.
    ///
    /// Response order is upstream-defined; callers that care about order
    /// must reorder by id. An empty id list short-circuits to an empty
    /// result without touching the network.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_works_by_ids(&self, ids: &[String]) -> ClientResult<Vec<Work>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let membership: Vec<String> = ids.iter().map(|id| normalize_id(id)).collect();
        let filter = format!("openalex_id:{}", membership.join("|"));

        let result = self
            .search_works(Some(&filter), None, None, 1, membership.len().max(1))
            .await?;
        Ok(result.results)
    }

    /// Fetch up to `limit` ids of works citing `work_id` (id-only projection).
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_citing_ids(&self, work_id: &str, limit: usize) -> ClientResult<Vec<String>> {
        let url = format!("{}/works", self.base_url);
        let filter = format!("cites:{}", normalize_id(work_id));

        let params = vec![
            ("filter".to_string(), filter),
            ("per-page".to_string(), limit.to_string()),
            ("select".to_string(), fields::ID_ONLY.to_string()),
        ];

        let result: WorkPage = self.get(&url, &params).await?;
        Ok(result.results.iter().map(Work::normalized_id).filter(|id| !id.is_empty()).collect())
    }

    /// Search authors by free text.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_authors(&self, query: &str, per_page: usize) -> ClientResult<Vec<Author>> {
        self.search_entities("authors", query, per_page).await
    }

    /// Search institutions by free text.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_institutions(
        &self,
        query: &str,
        per_page: usize,
    ) -> ClientResult<Vec<Institution>> {
        self.search_entities("institutions", query, per_page).await
    }

    /// Search topics by free text.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_topics(&self, query: &str, per_page: usize) -> ClientResult<Vec<Topic>> {
        self.search_entities("topics", query, per_page).await
    }

    /// Search journals (sources) by free text.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_journals(&self, query: &str, per_page: usize) -> ClientResult<Vec<Journal>> {
        self.search_entities("sources", query, per_page).await
    }

    /// Shared entity search over the author/institution/topic/source endpoints.
    async fn search_entities<T>(
        &self,
        endpoint: &str,
        query: &str,
        per_page: usize,
    ) -> ClientResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        let params = vec![
            ("search".to_string(), query.to_string()),
            ("per-page".to_string(), per_page.to_string()),
        ];

        let result: EntityPage<T> = self.get(&url, &params).await?;
        Ok(result.results)
    }

    /// Make a GET request.
    async fn get<T>(&self, url: &str, params: &[(String, String)]) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        // Check cache
        let cache_key = self.cache_key("GET", url, params);
        if let Some(cached) = self.cache.get(&cache_key).await {
            return serde_json::from_value(cached).map_err(ClientError::from);
        }

        // Rate limit
        tokio::time::sleep(self.rate_limit_delay).await;

        let mut request = self.client.get(url).query(params);
        if let Some(ref mailto) = self.mailto {
            request = request.query(&[("mailto", mailto.as_str())]);
        }

        let response = request.send().await?;
        let response = self.handle_response(response).await?;
        let value: serde_json::Value = response.json().await?;

        // Cache response
        self.cache.insert(cache_key, value.clone()).await;

        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(text))
            }
            400 | 403 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }

    /// Generate cache key.
    fn cache_key(&self, method: &str, url: &str, params: &[(String, String)]) -> String {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(method.as_bytes());
        hasher.update(b"|");
        hasher.update(url.as_bytes());
        hasher.update(b"|");

        for (k, v) in params {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b"&");
        }

        format!("{:x}", hasher.finalize())
    }
}

/// Normalize the id fields of a work in place.
fn normalize_work(work: &mut Work) {
    if let Some(ref id) = work.id {
        work.id = Some(normalize_id(id));
    }
    for id in &mut work.referenced_works {
        *id = normalize_id(id);
    }
}

impl std::fmt::Debug for OpenAlexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAlexClient")
            .field("base_url", &self.base_url)
            .field("has_mailto", &self.has_mailto())
            .finish()
    }
}
