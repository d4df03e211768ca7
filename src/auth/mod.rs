//! OAuth2 client-credentials token handling

mod token;

pub use token::{AccessToken, TokenManager, TOKEN_REQUEST_BODY};
