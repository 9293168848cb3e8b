//! The request runner: one HTTP call end-to-end.
//!
//! A call moves through
//! `validate -> resolve content type -> authenticate -> encode body ->
//! dispatch -> decode response`; the first failing stage ends the call with a
//! [`RunnerError`]. There are no retries and no partial results.
//!
//! A [`RequestRunner`] only holds configuration fixed at construction
//! (credentials, authenticator, codec registry, transport), so one instance
//! can serve concurrent calls.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::auth::{Authenticator, Credentials};
use crate::codec::{APPLICATION_JSON, CodecRegistry};
use crate::error::RunnerError;
use crate::transport::{
    Headers, HttpTransport, Method, TransportRequest, TransportResponse, header_value, set_header,
};

const CONTENT_TYPE: &str = "Content-Type";

/// Everything needed for one `run_request` call.
///
/// Built fresh per call; every collection starts empty and `authenticate`
/// starts `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: String,
    pub url: String,
    pub content_type: String,
    pub body: Map<String, Value>,
    pub query_params: Headers,
    pub header_params: Headers,
    pub authenticate: bool,
}

impl RequestSpec {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            content_type: String::new(),
            body: Map::new(),
            query_params: Headers::new(),
            header_params: Headers::new(),
            authenticate: true,
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn body(mut self, body: Map<String, Value>) -> Self {
        self.body = body;
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header_params.insert(name.into(), value.into());
        self
    }

    pub fn authenticate(mut self, authenticate: bool) -> Self {
        self.authenticate = authenticate;
        self
    }
}

/// Normalized outcome of a completed call.
///
/// `body` is `None` when the server sent no body at all, which is distinct
/// from `Some` of an empty object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseResult {
    pub body: Option<Value>,
    pub headers: Headers,
    pub status_code: u16,
}

pub struct RequestRunner {
    credentials: Credentials,
    authenticator: Box<dyn Authenticator>,
    codecs: CodecRegistry,
    transport: Arc<dyn HttpTransport>,
}

impl RequestRunner {
    /// Builds a runner with the default JSON codec registry.
    pub fn new(
        credentials: Credentials,
        authenticator: Box<dyn Authenticator>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            credentials,
            authenticator,
            codecs: CodecRegistry::default(),
            transport,
        }
    }

    pub fn with_codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = codecs;
        self
    }

    pub fn supported_methods(&self) -> &'static [Method] {
        &Method::ALL
    }

    pub fn supports_method(&self, method: &str) -> bool {
        method.parse::<Method>().is_ok()
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Runs one HTTP request and normalizes its response.
    ///
    /// # Errors
    ///
    /// - [`RunnerError::InvalidArgument`] for an empty/unsupported method or an
    ///   empty url, and [`RunnerError::MissingContentType`] for a body with no
    ///   resolvable content type. Both are checked before anything else.
    /// - [`RunnerError::MissingCredentials`], [`RunnerError::AuthenticationFailed`]
    ///   and [`RunnerError::EmptyAuthToken`] from the authentication phase.
    /// - [`RunnerError::UnsupportedContentType`], [`RunnerError::Encoding`] and
    ///   [`RunnerError::Decoding`] from the codec registry.
    /// - [`RunnerError::Transport`] for any network-level failure.
    #[tracing::instrument(skip_all, fields(method = %spec.method, url = %spec.url))]
    pub async fn run_request(&self, spec: RequestSpec) -> Result<ResponseResult, RunnerError> {
        let RequestSpec {
            method,
            url,
            mut content_type,
            body,
            query_params,
            mut header_params,
            authenticate,
        } = spec;

        let method: Method = method.parse()?;
        if url.is_empty() {
            return Err(RunnerError::InvalidArgument("url is empty".to_string()));
        }

        if !body.is_empty() && content_type.is_empty() {
            content_type = header_value(&header_params, CONTENT_TYPE)
                .ok_or(RunnerError::MissingContentType)?
                .to_string();
            debug!(%content_type, "content type taken from header params");
        }

        if authenticate {
            header_params = self.authorize(header_params).await?;
        }

        let encoded = if body.is_empty() {
            None
        } else {
            let text = self.codecs.encode(&content_type, &Value::Object(body))?;
            set_header(&mut header_params, CONTENT_TYPE, &content_type);
            debug!(%content_type, bytes = text.len(), "body encoded");
            Some(text)
        };

        let target = url.clone();
        let req = build_transport_request(method, url, header_params, query_params, encoded);
        let resp = self
            .transport
            .execute(req)
            .await
            .map_err(|e| RunnerError::Transport {
                url: target,
                source: e.into(),
            })?;

        self.decode_response(resp)
    }

    async fn authorize(&self, headers: Headers) -> Result<Headers, RunnerError> {
        if !self.credentials.is_complete() {
            return Err(RunnerError::MissingCredentials);
        }

        let token = self
            .authenticator
            .authenticate(&self.credentials)
            .await
            .map_err(|e| RunnerError::AuthenticationFailed(e.into()))?;
        if token.is_empty() {
            return Err(RunnerError::EmptyAuthToken);
        }

        debug!("authenticated");
        Ok(self.authenticator.apply_token(headers, &token))
    }

    fn decode_response(&self, resp: TransportResponse) -> Result<ResponseResult, RunnerError> {
        let TransportResponse {
            status,
            headers,
            text,
        } = resp;

        let body = if text.is_empty() {
            None
        } else {
            let decoded = match header_value(&headers, CONTENT_TYPE) {
                Some(content_type) => self.codecs.decode(content_type, &text)?,
                None => {
                    warn!(status, "response has no Content-Type, assuming JSON");
                    self.codecs.decode(APPLICATION_JSON, &text)?
                }
            };
            Some(decoded)
        };

        debug!(status, has_body = body.is_some(), "response decoded");
        Ok(ResponseResult {
            body,
            headers,
            status_code: status,
        })
    }
}

/// GET and DELETE send query parameters and no body; POST and PUT send the
/// encoded body and no query parameters.
fn build_transport_request(
    method: Method,
    url: String,
    headers: Headers,
    query: Headers,
    body: Option<String>,
) -> TransportRequest {
    if method.sends_body() {
        if !query.is_empty() {
            warn!(%method, "query params ignored");
        }
        TransportRequest {
            method,
            url,
            headers,
            query: Headers::new(),
            body,
        }
    } else {
        if body.is_some() {
            warn!(%method, "body ignored");
        }
        TransportRequest {
            method,
            url,
            headers,
            query,
            body: None,
        }
    }
}
