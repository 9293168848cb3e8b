//! JSON request templates.
//!
//! A template describes one request without its target:
//!
//! ```json
//! {
//!   "method": "post",
//!   "query_params": {"page": 1},
//!   "headers": {"Accept": "application/json"},
//!   "body": {"name": "widget"},
//!   "content_type": "application/json"
//! }
//! ```
//!
//! Only `method` is required. Templates are consumed already rendered; any
//! variable substitution happens before [`RequestTemplate::parse`].

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::codec::APPLICATION_JSON;
use crate::error::RunnerError;
use crate::runner::RequestSpec;
use crate::transport::Headers;

#[derive(Debug, Deserialize)]
struct RawTemplate {
    method: String,
    #[serde(default)]
    query_params: Map<String, Value>,
    #[serde(default)]
    headers: Map<String, Value>,
    body: Option<Value>,
    content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestTemplate {
    pub method: String,
    pub query_params: Headers,
    pub headers: Headers,
    pub body: Map<String, Value>,
    pub content_type: String,
}

impl RequestTemplate {
    /// Parses template JSON.
    ///
    /// `method` is upper-cased but not validated. When a body is present and
    /// no `content_type` is given, `application/json` is assumed.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::InvalidTemplate`] for malformed JSON, a missing
    /// `method`, a non-object `body`, or a nested param value.
    pub fn parse(text: &str) -> Result<Self, RunnerError> {
        let raw: RawTemplate =
            serde_json::from_str(text).map_err(|e| RunnerError::InvalidTemplate(e.to_string()))?;

        let body = match raw.body {
            None => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(RunnerError::InvalidTemplate(format!(
                    "body must be a JSON object, got {other}"
                )));
            }
        };

        let content_type = match raw.content_type {
            Some(content_type) => content_type,
            None if !body.is_empty() => APPLICATION_JSON.to_string(),
            None => String::new(),
        };

        Ok(Self {
            method: raw.method.to_uppercase(),
            query_params: stringify_params("query_params", raw.query_params)?,
            headers: stringify_params("headers", raw.headers)?,
            body,
            content_type,
        })
    }

    /// Binds the template to a target url.
    pub fn into_spec(self, url: impl Into<String>, authenticate: bool) -> RequestSpec {
        RequestSpec {
            method: self.method,
            url: url.into(),
            content_type: self.content_type,
            body: self.body,
            query_params: self.query_params,
            header_params: self.headers,
            authenticate,
        }
    }
}

/// Flattens scalar param values to strings. Nested values are rejected.
fn stringify_params(field: &str, params: Map<String, Value>) -> Result<Headers, RunnerError> {
    params
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(RunnerError::InvalidTemplate(format!(
                        "{field}.{name} must be a string, number or boolean, got {other}"
                    )));
                }
            };
            Ok((name, value))
        })
        .collect()
}
