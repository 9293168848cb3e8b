//! HTTP transport seam.
//!
//! The runner describes each round-trip as a plain [`TransportRequest`] and
//! gets a plain [`TransportResponse`] back, so the network can be swapped
//! for a stub in tests.

mod basic;
mod client;
mod method;

pub use basic::BasicClient;
pub use client::HttpTransport;
pub use method::Method;

use std::collections::BTreeMap;

/// Header or query parameter map.
pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub query: Headers,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Headers,
    pub text: String,
}

/// Looks up a header by name, ignoring ASCII case.
pub fn header_value<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Sets `name` to `value`, dropping any entries that differ only in case.
pub fn set_header(headers: &mut Headers, name: &str, value: &str) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value_ignores_case() {
        let mut headers = Headers::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        assert_eq!(header_value(&headers, "Content-Type"), Some("application/json"));
        assert_eq!(header_value(&headers, "Accept"), None);
    }

    #[test]
    fn test_set_header_replaces_case_variants() {
        let mut headers = Headers::new();
        headers.insert("content-type".to_string(), "text/plain".to_string());
        headers.insert("CONTENT-TYPE".to_string(), "text/xml".to_string());
        headers.insert("Accept".to_string(), "*/*".to_string());

        set_header(&mut headers, "Content-Type", "application/json");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers["Content-Type"], "application/json");
        assert_eq!(headers["Accept"], "*/*");
    }
}
