use anyhow::Result;
use async_trait::async_trait;

use super::{Authenticator, Credentials};
use crate::transport::{Headers, set_header};

/// Sends a pre-issued key in a fixed header.
///
/// There is no handshake: the configured password is the key. `auth_url` and
/// `username` still have to be populated for the runner to attempt
/// authentication at all.
#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    pub header_name: String,
}

impl ApiKeyAuth {
    pub const DEFAULT_HEADER: &'static str = "X-Api-Key";

    pub fn new(header_name: impl Into<String>) -> Self {
        Self {
            header_name: header_name.into(),
        }
    }
}

impl Default for ApiKeyAuth {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HEADER)
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuth {
    async fn authenticate(&self, credentials: &Credentials) -> Result<String> {
        Ok(credentials.password.clone())
    }

    fn apply_token(&self, mut headers: Headers, token: &str) -> Headers {
        set_header(&mut headers, &self.header_name, token);
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_password_is_the_key() {
        let auth = ApiKeyAuth::default();
        let token = auth
            .authenticate(&Credentials::new("http://auth", "svc", "k-123"))
            .await
            .unwrap();
        assert_eq!(token, "k-123");
    }

    #[test]
    fn test_apply_token_sets_named_header() {
        let auth = ApiKeyAuth::new("X-Custom-Key");
        let mut headers = Headers::new();
        headers.insert("x-custom-key".to_string(), "stale".to_string());

        let headers = auth.apply_token(headers, "fresh");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["X-Custom-Key"], "fresh");
    }
}
