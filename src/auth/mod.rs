//! Authentication extension point.
//!
//! An [`Authenticator`] performs whatever handshake a protocol needs and then
//! embeds the resulting token in the outgoing headers. Each runner binds one
//! implementation for its whole lifetime:
//!
//! - [`NoAuth`]: base variant, never produces a token
//! - [`ExampleAuth`]: template for new protocol variants
//! - [`BearerAuth`]: username/password exchange for an `Authorization: Bearer` token
//! - [`ApiKeyAuth`]: static key sent in a named header

mod api_key;
mod bearer;
mod example;

pub use api_key::ApiKeyAuth;
pub use bearer::BearerAuth;
pub use example::ExampleAuth;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

use crate::transport::Headers;

/// Credentials handed to an [`Authenticator`]. All-empty means "none
/// configured".
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub auth_url: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(
        auth_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            auth_url: auth_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// `true` when none of the three fields is empty.
    pub fn is_complete(&self) -> bool {
        !self.auth_url.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &str| if s.is_empty() { "" } else { "[REDACTED]" };
        f.debug_struct("Credentials")
            .field("auth_url", &self.auth_url)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .finish()
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Runs the handshake and returns a token. An empty token means the
    /// variant has no real authentication capability.
    async fn authenticate(&self, _credentials: &Credentials) -> Result<String> {
        Ok(String::new())
    }

    /// Returns `headers` with `token` embedded.
    fn apply_token(&self, headers: Headers, _token: &str) -> Headers {
        headers
    }
}

/// Base variant: no handshake, headers pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

#[async_trait]
impl Authenticator for NoAuth {}
