//! Bearer token lifecycle
//!
//! `TokenManager` keeps at most one access token. A valid token is handed out
//! without touching the network; an absent or expired one is replaced by a
//! client-credentials exchange against the token endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::{ConfigKey, Credentials};
use crate::error::{AuthError, ErrorKind};

/// Form body sent to the token endpoint
pub const TOKEN_REQUEST_BODY: &str = "grant_type=client_credentials&scope=PRODUCTION";

/// A bearer token and the instant it stops being valid
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// The opaque token string sent as `Authorization: Bearer <value>`
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// A token is valid strictly before its expiry instant
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Lifetime in seconds
    #[serde(deserialize_with = "deserialize_lifetime")]
    expires_in: i64,
}

/// Accepts `3600`, `3600.0` or `"3600"` for `expires_in`
fn deserialize_lifetime<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lifetime {
        Whole(i64),
        Fractional(f64),
        Text(String),
    }

    let seconds = match Lifetime::deserialize(deserializer)? {
        Lifetime::Whole(seconds) => return Ok(seconds),
        Lifetime::Fractional(seconds) => seconds,
        Lifetime::Text(text) => {
            let text = text.trim();
            match text.parse::<i64>() {
                Ok(seconds) => return Ok(seconds),
                Err(_) => text.parse::<f64>().map_err(|_| {
                    <D::Error as serde::de::Error>::custom(format!(
                        "invalid expires_in: '{}'",
                        text
                    ))
                })?,
            }
        }
    };

    if seconds.is_finite() {
        // Saturates; out-of-range lifetimes are rejected when the expiry is computed.
        Ok(seconds.trunc() as i64)
    } else {
        Err(<D::Error as serde::de::Error>::custom("expires_in must be finite"))
    }
}

/// Mutable token state, guarded by the refresh lock
#[derive(Debug, Default)]
struct TokenState {
    current: Option<AccessToken>,
    /// Kind and message of the most recent failed exchange
    last_failure: Option<(ErrorKind, String)>,
}

/// Owns the current access token and refreshes it on demand
#[derive(Debug)]
pub struct TokenManager {
    http_client: Client,
    token_url: String,
    credentials: RwLock<Credentials>,
    /// Held across the exchange so concurrent callers wait for one refresh
    state: Mutex<TokenState>,
    /// Number of failed exchanges so far
    failed_exchanges: AtomicU64,
}

impl TokenManager {
    /// Creates a manager that exchanges `credentials` at `token_url`
    pub fn new(http_client: Client, token_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http_client,
            token_url: token_url.into(),
            credentials: RwLock::new(credentials),
            state: Mutex::new(TokenState::default()),
            failed_exchanges: AtomicU64::new(0),
        }
    }

    /// Sets the consumer key or secret
    ///
    /// Takes effect on the next token exchange; a token that is still valid
    /// keeps being used.
    pub fn configure(&self, key: ConfigKey, value: impl Into<String>) {
        self.credentials.write().set(key, value);
    }

    /// Whether both consumer key and secret are set
    pub fn has_credentials(&self) -> bool {
        self.credentials.read().pair().is_some()
    }

    /// Returns a valid access token, exchanging credentials if needed
    ///
    /// # Returns
    /// * `Ok(AccessToken)` - the cached token if still valid, else a new one
    /// * `Err(AuthError::MissingCredentials)` - before any network call when
    ///   key or secret is unset
    /// * `Err(AuthError)` - if the exchange fails; the previous token is kept
    /// * `Err(AuthError::ExchangeFailed)` - if an exchange that was already
    ///   running when this call started failed; no second attempt is made
    #[instrument(skip(self), fields(token_url = %self.token_url))]
    pub async fn authenticate(&self) -> Result<AccessToken, AuthError> {
        let failures_seen = self.failed_exchanges.load(Ordering::Acquire);
        let mut state = self.state.lock().await;

        if let Some(token) = state.current.as_ref() {
            if token.is_valid_at(Utc::now()) {
                debug!("token valid, and not expired");
                return Ok(token.clone());
            }
            debug!(expired_at = %token.expires_at, "token expired, requesting a new one");
        } else {
            debug!("no token yet, requesting one");
        }

        if self.failed_exchanges.load(Ordering::Acquire) != failures_seen {
            if let Some((kind, message)) = state.last_failure.clone() {
                debug!("exchange failed while waiting, sharing its error");
                return Err(AuthError::ExchangeFailed { kind, message });
            }
        }

        match self.exchange().await {
            Ok(token) => {
                info!(expires_at = %token.expires_at, "obtained new access token");
                state.current = Some(token.clone());
                state.last_failure = None;
                Ok(token)
            }
            Err(e) => {
                warn!(error = %e, "token exchange failed");
                state.last_failure = Some((e.kind(), e.to_string()));
                self.failed_exchanges.fetch_add(1, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Returns the stored token without validating or refreshing it
    pub async fn current_token(&self) -> Option<AccessToken> {
        self.state.lock().await.current.clone()
    }

    /// Drops the stored token so the next call performs an exchange
    pub async fn invalidate(&self) {
        self.state.lock().await.current = None;
    }

    /// Performs the client-credentials grant
    async fn exchange(&self) -> Result<AccessToken, AuthError> {
        let basic = {
            let credentials = self.credentials.read();
            let (key, secret) = credentials.pair().ok_or(AuthError::MissingCredentials)?;
            general_purpose::STANDARD.encode(format!("{}:{}", key, secret))
        };

        let response = self
            .http_client
            .post(&self.token_url)
            .header(AUTHORIZATION, format!("Basic {}", basic))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(TOKEN_REQUEST_BODY)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Status(status));
        }

        let text = response.text().await?;
        let received_at = Utc::now();
        let parsed: TokenResponse = serde_json::from_str(&text)?;

        let expires_at = Duration::try_seconds(parsed.expires_in)
            .and_then(|lifetime| received_at.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::Parse(serde::de::Error::custom(format!(
                    "expires_in out of range: {}",
                    parsed.expires_in
                )))
            })?;

        Ok(AccessToken::new(parsed.access_token, expires_at))
    }
}
