//! Canonical cache keys

use std::fmt;

/// Normalized identity of a request, built from its host and path
///
/// Hosts are compared case-insensitively and without a trailing slash, and
/// paths always start with `/`, so `API-GW.example.edu/` + `rooms` and
/// `api-gw.example.edu` + `/rooms` land in the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds the key for `host` and `path`
    pub fn new(host: &str, path: &str) -> Self {
        let host = host.trim().trim_end_matches('/').to_ascii_lowercase();
        let path = path.trim();
        if path.starts_with('/') {
            Self(format!("{}{}", host, path))
        } else {
            Self(format!("{}/{}", host, path))
        }
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
