//! Client configuration and credentials

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ApiError;

/// Default API gateway host
pub const DEFAULT_API_HOST: &str = "api-gw.it.umich.edu";

/// Default OAuth2 token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://api-km.it.umich.edu/token";

/// Environment variable holding the consumer key
pub const CONSUMER_KEY_ENV: &str = "UMAPI_CONSUMER_KEY";

/// Environment variable holding the consumer secret
pub const CONSUMER_SECRET_ENV: &str = "UMAPI_CONSUMER_SECRET";

/// Settings for an [`crate::client::ApiClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL scheme used for resource requests
    pub scheme: String,
    /// Host used when a request does not name one
    pub default_host: String,
    /// Full URL of the token endpoint
    pub token_url: String,
    /// Timeout applied to every HTTP request
    pub timeout: Duration,
    /// Initial value of the global cache toggle
    pub use_cache: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            default_host: DEFAULT_API_HOST.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout: Duration::from_secs(30),
            use_cache: true,
        }
    }
}

/// Names of the settings accepted by `configure`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ConsumerKey,
    ConsumerSecret,
}

impl FromStr for ConfigKey {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consumerKey" | "consumer_key" => Ok(ConfigKey::ConsumerKey),
            "consumerSecret" | "consumer_secret" => Ok(ConfigKey::ConsumerSecret),
            other => Err(ApiError::InvalidArgument(format!(
                "unknown configuration key '{}'",
                other
            ))),
        }
    }
}

/// OAuth2 client credentials
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
}

impl Credentials {
    /// Creates a complete credential pair
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: Some(consumer_key.into()),
            consumer_secret: Some(consumer_secret.into()),
        }
    }

    /// Reads credentials from `UMAPI_CONSUMER_KEY` and `UMAPI_CONSUMER_SECRET`
    ///
    /// Unset or empty variables leave the matching field empty; the missing
    /// value is reported when a token is first requested.
    pub fn from_env() -> Self {
        let read = |name: &str| env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            consumer_key: read(CONSUMER_KEY_ENV),
            consumer_secret: read(CONSUMER_SECRET_ENV),
        }
    }

    /// Sets one setting by key
    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        match key {
            ConfigKey::ConsumerKey => self.consumer_key = Some(value.into()),
            ConfigKey::ConsumerSecret => self.consumer_secret = Some(value.into()),
        }
    }

    /// Returns `(key, secret)` if both are present
    pub fn pair(&self) -> Option<(&str, &str)> {
        match (&self.consumer_key, &self.consumer_secret) {
            (Some(key), Some(secret)) => Some((key.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

// Keep the secret out of logs and panics.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field(
                "consumer_secret",
                &self.consumer_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
