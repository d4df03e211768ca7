//! UM API client library
//!
//! Authenticated GET requests against the U-M API gateway with transparent
//! OAuth2 token management and an in-memory response cache that serves
//! stale data when the API is unavailable.

pub mod auth;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;

pub use client::{ApiClient, ApiResponse, CallResult, RequestOptions, ResponseSource};
pub use error::{ApiError, AuthError, ErrorKind};
