//! In-memory response cache
//!
//! Stores the last successful JSON response per request identity together
//! with the time it was stored. Entries never expire from storage: freshness
//! is advisory, so a stale entry stays available as a fallback when the API
//! is unavailable.

mod key;
mod manager;

pub use key::CacheKey;
pub use manager::{Freshness, ResponseCache, CACHE_TTL};
