use anyhow::Result;
use async_trait::async_trait;

use super::{Authenticator, Credentials};
use crate::transport::Headers;

/// Starting point for a new protocol variant, selected by `http_example`.
///
/// It performs no handshake yet, so authenticated requests through it fail
/// with an empty token. Unauthenticated requests work like the base variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExampleAuth;

#[async_trait]
impl Authenticator for ExampleAuth {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<String> {
        Ok(String::new())
    }

    fn apply_token(&self, headers: Headers, _token: &str) -> Headers {
        headers
    }
}
