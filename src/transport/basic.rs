use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;

use super::client::HttpTransport;
use super::{Headers, TransportRequest, TransportResponse};

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }

    /// Builds a client with an overall request timeout and a connect timeout.
    pub fn with_timeouts(timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self(client))
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for BasicClient {
    async fn execute(&self, req: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self.0.request(req.method.into(), &req.url);

        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let headers = flatten_headers(resp.headers());
        let text = resp.text().await?;

        Ok(TransportResponse {
            status,
            headers,
            text,
        })
    }
}

/// Folds a multi-valued header map into one string per name, joining
/// repeated names with `", "`.
fn flatten_headers(headers: &HeaderMap) -> Headers {
    let mut flat = Headers::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match flat.get_mut(name.as_str()) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                flat.insert(name.as_str().to_string(), value);
            }
        }
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_flatten_joins_repeated_headers() {
        let mut map = HeaderMap::new();
        map.append("set-cookie", HeaderValue::from_static("a=1"));
        map.append("set-cookie", HeaderValue::from_static("b=2"));
        map.insert("content-type", HeaderValue::from_static("application/json"));

        let flat = flatten_headers(&map);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat["set-cookie"], "a=1, b=2");
        assert_eq!(flat["content-type"], "application/json");
    }

    #[test]
    fn test_with_timeouts_builds() {
        let client = BasicClient::with_timeouts(Duration::from_secs(5), Duration::from_secs(1));
        assert!(client.is_ok());
    }
}
