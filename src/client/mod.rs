//! Request orchestration
//!
//! [`ApiClient::call`] ties the token manager and the response cache into a
//! single fault-tolerant GET:
//!
//! - a fresh cached response is returned without any network activity
//! - otherwise a token is obtained and the resource is fetched
//! - on success the payload is written through to the cache
//! - on any failure a cached payload (fresh or stale) is served instead, as
//!   long as caching is enabled for the call
//!
//! Missing credentials and malformed options are returned immediately and
//! never fall back to the cache.

mod meetings;

pub use meetings::{meetings_path, parse_date, MEETINGS_DATE_FORMAT};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::auth::{AccessToken, TokenManager};
use crate::cache::{CacheKey, Freshness, ResponseCache};
use crate::config::{ClientConfig, ConfigKey, Credentials};
use crate::error::ApiError;

/// Options for a single [`ApiClient::call`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Host to query; the configured default host when `None`
    pub host: Option<String>,
    /// Path and query string, e.g. `/Curriculum/Classrooms/v1/Classrooms`
    pub path: String,
    /// Per-call cache override; the client's global toggle when `None`
    pub use_cache: Option<bool>,
}

impl RequestOptions {
    /// Creates options for `path` on the default host
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = Some(use_cache);
        self
    }
}

/// Where a successful payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Fetched from the API just now
    Network,
    /// Served from a fresh cache entry without touching the network
    Cache,
    /// Served from the cache because the API or token endpoint failed
    Fallback,
}

/// A successful call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// The JSON payload
    pub data: Value,
    /// How the payload was obtained
    pub source: ResponseSource,
}

/// Outcome of [`ApiClient::call`]: a payload or a structured error, never both
pub type CallResult = Result<ApiResponse, ApiError>;

/// A validated request
#[derive(Debug)]
struct PreparedRequest {
    key: CacheKey,
    url: String,
    use_cache: bool,
}

/// Client for the API gateway with token management and cache fallback
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    config: ClientConfig,
    tokens: Arc<TokenManager>,
    cache: Arc<ResponseCache>,
    use_cache: AtomicBool,
}

impl ApiClient {
    /// Creates a client with its own token manager and empty cache
    ///
    /// # Returns
    /// * `Ok(ApiClient)` on success
    /// * `Err(ApiError::Network)` if the HTTP client cannot be built
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self, ApiError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Network)?;
        let tokens = Arc::new(TokenManager::new(
            http_client.clone(),
            config.token_url.clone(),
            credentials,
        ));
        Ok(Self::with_parts(
            config,
            http_client,
            tokens,
            Arc::new(ResponseCache::new()),
        ))
    }

    /// Creates a client from explicitly constructed collaborators
    ///
    /// Useful for sharing one cache or token manager between clients.
    pub fn with_parts(
        config: ClientConfig,
        http_client: Client,
        tokens: Arc<TokenManager>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        let use_cache = AtomicBool::new(config.use_cache);
        Self {
            http_client,
            config,
            tokens,
            cache,
            use_cache,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Sets a configuration value by name (`consumerKey` or `consumerSecret`)
    pub fn configure(&self, key: &str, value: impl Into<String>) -> Result<(), ApiError> {
        let key: ConfigKey = key.parse()?;
        self.tokens.configure(key, value);
        Ok(())
    }

    /// Enables or disables the cache for calls that do not override it
    pub fn set_use_cache(&self, use_cache: bool) {
        self.use_cache.store(use_cache, Ordering::Relaxed);
    }

    /// Current value of the global cache toggle
    pub fn uses_cache(&self) -> bool {
        self.use_cache.load(Ordering::Relaxed)
    }

    /// Returns the cache key `options` resolves to
    pub fn cache_key(&self, options: &RequestOptions) -> CacheKey {
        CacheKey::new(self.resolve_host(options), &options.path)
    }

    /// Performs an authenticated GET with cache short-circuit and fallback
    ///
    /// # Returns
    /// * `Ok(ApiResponse)` - from the network, a fresh cache entry, or a
    ///   cached fallback after a failure
    /// * `Err(ApiError::InvalidArgument)` - if `options.path` is empty
    /// * `Err(ApiError)` - the originating failure when no cached payload is
    ///   usable
    #[instrument(skip(self, options), fields(path = %options.path))]
    pub async fn call(&self, options: RequestOptions) -> CallResult {
        let request = self.prepare(&options)?;

        if request.use_cache && self.cache.freshness(&request.key) == Freshness::Fresh {
            if let Some(data) = self.cache.get(&request.key) {
                debug!(key = %request.key, "serving fresh cached response");
                return Ok(ApiResponse {
                    data,
                    source: ResponseSource::Cache,
                });
            }
        }

        let token = match self.tokens.authenticate().await {
            Ok(token) => token,
            Err(e) => return self.fallback(&request, e.into()),
        };

        match self.fetch(&request, &token).await {
            Ok(data) => {
                if request.use_cache {
                    self.cache.put(request.key.clone(), data.clone());
                }
                info!(key = %request.key, "fetched response from API");
                Ok(ApiResponse {
                    data,
                    source: ResponseSource::Network,
                })
            }
            Err(e) => self.fallback(&request, e),
        }
    }

    /// Validates `options` and resolves host, cache key and URL
    fn prepare(&self, options: &RequestOptions) -> Result<PreparedRequest, ApiError> {
        let path = options.path.trim();
        if path.is_empty() {
            return Err(ApiError::InvalidArgument(
                "Please supply a path for your request".to_string(),
            ));
        }

        let host = self.resolve_host(options);
        let key = CacheKey::new(host, path);
        // The key already carries the normalized host + path.
        let url = format!("{}://{}", self.config.scheme, key);

        Ok(PreparedRequest {
            key,
            url,
            use_cache: options.use_cache.unwrap_or_else(|| self.uses_cache()),
        })
    }

    fn resolve_host<'a>(&'a self, options: &'a RequestOptions) -> &'a str {
        options
            .host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .unwrap_or(self.config.default_host.as_str())
    }

    /// Issues the authenticated GET and parses the JSON body
    async fn fetch(&self, request: &PreparedRequest, token: &AccessToken) -> Result<Value, ApiError> {
        let response = self
            .http_client
            .get(&request.url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", token.value()))
            .send()
            .await
            .map_err(ApiError::Network)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::NonSuccessStatus(status));
        }

        let text = response.text().await.map_err(ApiError::Network)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Serves the cached payload for a failed request, or surfaces `error`
    fn fallback(&self, request: &PreparedRequest, error: ApiError) -> CallResult {
        if error.is_fatal() || !request.use_cache {
            warn!(error = %error, "request failed");
            return Err(error);
        }

        let freshness = self.cache.freshness(&request.key);
        if freshness.is_available() {
            if let Some(data) = self.cache.get(&request.key) {
                warn!(
                    key = %request.key,
                    ?freshness,
                    error = %error,
                    "request failed, serving cached response"
                );
                return Ok(ApiResponse {
                    data,
                    source: ResponseSource::Fallback,
                });
            }
        }

        warn!(error = %error, "request failed and nothing is cached");
        Err(error)
    }
}
