//! Content codec registry.
//!
//! Maps a MIME type string to an encode/decode function pair. A registry is
//! assembled once when a runner is built and only read afterwards.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{BoxError, RunnerError};

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_JSON_UTF8: &str = "application/json; charset=UTF-8";

/// Encode/decode pair for one content type.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    pub encode: fn(&Value) -> Result<String, BoxError>,
    pub decode: fn(&str) -> Result<Value, BoxError>,
}

impl Codec {
    pub const JSON: Codec = Codec {
        encode: encode_json,
        decode: decode_json,
    };
}

fn encode_json(data: &Value) -> Result<String, BoxError> {
    Ok(serde_json::to_string(data)?)
}

fn decode_json(text: &str) -> Result<Value, BoxError> {
    Ok(serde_json::from_str(text)?)
}

/// Content-type keyed codec table.
///
/// Keys are matched ASCII case-insensitively and with whitespace around `;`
/// ignored, so `application/json;charset=utf-8` hits the `charset=UTF-8`
/// alias. Any other parameter is a distinct, unregistered key.
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: HashMap<String, (String, Codec)>,
}

impl CodecRegistry {
    /// An empty registry. Every lookup fails until codecs are registered.
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Registers `codec` under `content_type`, replacing any previous entry.
    pub fn with_codec(mut self, content_type: &str, codec: Codec) -> Self {
        self.codecs.insert(
            normalize(content_type),
            (content_type.to_string(), codec),
        );
        self
    }

    /// Registered content types, as originally spelled, sorted.
    pub fn content_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.codecs.values().map(|(k, _)| k.as_str()).collect();
        types.sort_unstable();
        types
    }

    pub fn supports(&self, content_type: &str) -> bool {
        self.lookup(content_type).is_ok()
    }

    pub fn encode(&self, content_type: &str, data: &Value) -> Result<String, RunnerError> {
        let codec = self.lookup(content_type)?;
        (codec.encode)(data).map_err(|source| RunnerError::Encoding {
            content_type: content_type.to_string(),
            source,
        })
    }

    pub fn decode(&self, content_type: &str, text: &str) -> Result<Value, RunnerError> {
        let codec = self.lookup(content_type)?;
        (codec.decode)(text).map_err(|source| RunnerError::Decoding {
            content_type: content_type.to_string(),
            source,
        })
    }

    fn lookup(&self, content_type: &str) -> Result<&Codec, RunnerError> {
        self.codecs
            .get(&normalize(content_type))
            .map(|(_, codec)| codec)
            .ok_or_else(|| RunnerError::UnsupportedContentType(content_type.to_string()))
    }
}

/// Lower-cases `content_type` and rewrites every `;` separator as `"; "`.
fn normalize(content_type: &str) -> String {
    content_type
        .split(';')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("; ")
        .to_ascii_lowercase()
}

impl Default for CodecRegistry {
    /// JSON under both `application/json` and its UTF-8 charset alias.
    fn default() -> Self {
        Self::empty()
            .with_codec(APPLICATION_JSON, Codec::JSON)
            .with_codec(APPLICATION_JSON_UTF8, Codec::JSON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_default_registry_aliases_json() {
        let registry = CodecRegistry::default();
        assert_eq!(
            registry.content_types(),
            vec![APPLICATION_JSON, APPLICATION_JSON_UTF8]
        );

        let data = json!({"a": 1});
        let plain = registry.encode(APPLICATION_JSON, &data).unwrap();
        let charset = registry.encode(APPLICATION_JSON_UTF8, &data).unwrap();
        assert_eq!(plain, charset);
    }

    #[test]
    fn test_lookup_ignores_ascii_case() {
        let registry = CodecRegistry::default();
        assert!(registry.supports("Application/JSON"));
        assert!(registry.supports("application/json; charset=utf-8"));
        assert!(registry.supports("application/json;charset=UTF-8"));
        assert!(registry.supports(" application/json ;  charset=utf-8"));
        assert!(!registry.supports("application/json; charset=ISO-8859-1"));
        assert!(!registry.supports("application/json; version=2"));
    }

    #[test]
    fn test_unknown_content_type_is_rejected() {
        let registry = CodecRegistry::default();
        let err = registry.encode("text/xml", &json!({})).unwrap_err();
        assert!(matches!(err, RunnerError::UnsupportedContentType(ref t) if t == "text/xml"));

        let err = registry.decode("text/xml", "<a/>").unwrap_err();
        assert!(matches!(err, RunnerError::UnsupportedContentType(_)));
    }

    #[test]
    fn test_decode_garbage_is_decoding_error() {
        let registry = CodecRegistry::default();
        let err = registry.decode(APPLICATION_JSON, "{not json").unwrap_err();
        match err {
            RunnerError::Decoding { content_type, .. } => {
                assert_eq!(content_type, APPLICATION_JSON)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_custom_codec_registration() {
        fn encode_text(data: &Value) -> Result<String, BoxError> {
            data.as_str()
                .map(str::to_string)
                .ok_or_else(|| "expected a string".into())
        }
        fn decode_text(text: &str) -> Result<Value, BoxError> {
            Ok(Value::String(text.to_string()))
        }

        let registry = CodecRegistry::empty().with_codec(
            "text/plain",
            Codec {
                encode: encode_text,
                decode: decode_text,
            },
        );

        assert!(!registry.supports(APPLICATION_JSON));
        assert_eq!(registry.decode("text/plain", "hi").unwrap(), json!("hi"));

        let err = registry.encode("text/plain", &json!({"a": 1})).unwrap_err();
        assert!(matches!(err, RunnerError::Encoding { .. }));
    }

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 _\\-\"\\\\]{0,16}".prop_map(Value::from),
        ]
    }

    fn json_value() -> impl Strategy<Value = Value> {
        json_leaf().prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{1,8}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_json_mapping_survives_encode_decode(
            map in prop::collection::btree_map("[a-zA-Z_]{1,10}", json_value(), 0..8)
        ) {
            let registry = CodecRegistry::default();
            let data = Value::Object(map.into_iter().collect());
            let text = registry.encode(APPLICATION_JSON, &data).unwrap();
            let decoded = registry.decode(APPLICATION_JSON_UTF8, &text).unwrap();
            prop_assert_eq!(decoded, data);
        }
    }
}
