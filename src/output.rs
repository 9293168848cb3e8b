//! Output formatting and persistence for run results.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use tracing::{debug, info};

use crate::record::RunRecord;
use crate::runner::ResponseResult;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a response using Rust's debug pretty-print format.
pub fn print_pretty(result: &ResponseResult) {
    info!("{:#?}", result);
}

/// Logs a response as pretty-printed JSON.
pub fn print_json(result: &ResponseResult) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Appends a [`RunRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &RunRecord) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RunnerError;
    use crate::transport::Headers;
    use serde_json::json;
    use std::env;
    use std::fs;
    use std::time::Duration;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample_result() -> ResponseResult {
        ResponseResult {
            body: Some(json!({"test": "result"})),
            headers: Headers::new(),
            status_code: 200,
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample_result());
    }

    #[test]
    fn test_print_json_renders_absent_body_as_null() {
        let result = ResponseResult {
            body: None,
            headers: Headers::new(),
            status_code: 204,
        };
        print_json(&result).unwrap();
        let rendered = serde_json::to_value(&result).unwrap();
        assert_eq!(rendered["body"], serde_json::Value::Null);
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("api_runner_test_header.csv");
        let _ = fs::remove_file(&path);

        let ok = RunRecord::from_result(&sample_result(), Duration::from_millis(3))
            .with_target("http", "GET", "http://x/y");
        let failed = RunRecord::from_error(&RunnerError::EmptyAuthToken, Duration::ZERO)
            .with_target("http", "GET", "http://x/y");
        append_record(&path, &ok).unwrap();
        append_record(&path, &failed).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().filter(|l| l.contains("timestamp")).count(), 1);
        assert!(lines[2].contains("empty_auth_token"));

        fs::remove_file(&path).unwrap();
    }
}
