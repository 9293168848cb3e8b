use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::RunnerError;
use crate::runner::ResponseResult;

/// One row of the run log: what was called, how long it took, and how it
/// ended.
#[derive(Debug, Default, Serialize)]
pub struct RunRecord {
    pub timestamp: DateTime<Utc>,
    pub protocol: Option<String>,
    pub method: Option<String>,
    pub url: Option<String>,
    pub status_code: Option<u16>,
    pub has_body: bool,
    pub elapsed_ms: u64,

    // error tracking
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

impl RunRecord {
    pub fn from_result(result: &ResponseResult, elapsed: Duration) -> Self {
        RunRecord {
            timestamp: Utc::now(),
            status_code: Some(result.status_code),
            has_body: result.body.is_some(),
            elapsed_ms: elapsed_ms(elapsed),
            ..Default::default()
        }
    }

    pub fn from_error(err: &RunnerError, elapsed: Duration) -> Self {
        RunRecord {
            timestamp: Utc::now(),
            elapsed_ms: elapsed_ms(elapsed),
            error_type: Some(err.kind().to_string()),
            error_message: Some(err.to_string()),
            ..Default::default()
        }
    }

    /// Set request metadata
    pub fn with_target(mut self, protocol: &str, method: &str, url: &str) -> Self {
        self.protocol = Some(protocol.to_string());
        self.method = Some(method.to_string());
        self.url = Some(url.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error_type.is_some()
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Headers;
    use serde_json::json;

    #[test]
    fn test_from_result() {
        let result = ResponseResult {
            body: Some(json!({"ok": true})),
            headers: Headers::new(),
            status_code: 201,
        };
        let record = RunRecord::from_result(&result, Duration::from_millis(42))
            .with_target("http", "POST", "http://x/y");

        assert_eq!(record.status_code, Some(201));
        assert!(record.has_body);
        assert_eq!(record.elapsed_ms, 42);
        assert_eq!(record.method.as_deref(), Some("POST"));
        assert!(!record.is_error());
    }

    #[test]
    fn test_from_error() {
        let record = RunRecord::from_error(&RunnerError::MissingCredentials, Duration::ZERO);

        assert_eq!(record.status_code, None);
        assert_eq!(record.error_type.as_deref(), Some("missing_credentials"));
        assert!(record.is_error());
    }
}
