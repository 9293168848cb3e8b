use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Authenticator, Credentials};
use crate::codec::APPLICATION_JSON;
use crate::transport::{Headers, HttpTransport, Method, TransportRequest, set_header};

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges username and password for a bearer token.
///
/// POSTs `{"username", "password"}` as JSON to `auth_url` and reads the
/// `access_token` field of a 2xx JSON reply. The token is sent back as
/// `Authorization: Bearer <token>`.
pub struct BearerAuth {
    transport: Arc<dyn HttpTransport>,
}

impl BearerAuth {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Authenticator for BearerAuth {
    async fn authenticate(&self, credentials: &Credentials) -> Result<String> {
        let body = serde_json::to_string(&TokenRequest {
            username: &credentials.username,
            password: &credentials.password,
        })?;

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), APPLICATION_JSON.to_string());

        let resp = self
            .transport
            .execute(TransportRequest {
                method: Method::Post,
                url: credentials.auth_url.clone(),
                headers,
                query: Headers::new(),
                body: Some(body),
            })
            .await
            .with_context(|| format!("token request to {} failed", credentials.auth_url))?;

        if !(200..300).contains(&resp.status) {
            bail!(
                "token exchange failed with status {}: {}",
                resp.status,
                resp.text
            );
        }

        let token: TokenResponse =
            serde_json::from_str(&resp.text).context("failed to parse token response")?;

        Ok(token.access_token)
    }

    fn apply_token(&self, mut headers: Headers, token: &str) -> Headers {
        set_header(&mut headers, "Authorization", &format!("Bearer {token}"));
        headers
    }
}
