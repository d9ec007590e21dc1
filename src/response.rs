use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{ClientError, Result};

/// Outcome of one attempt as seen by the caller.
///
/// The body is kept as raw text; interpretation belongs to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
    /// Attempt number (1-based) that produced this response.
    pub attempt: usize,
    /// Set when the retry budget ran out while the retry predicate still fired.
    pub degraded: bool,
}

impl ResponseEnvelope {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            attempt: 1,
            degraded: false,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `true` when this is the last response of an exhausted retry budget.
    ///
    /// A degraded envelope is still a success; `results: null` must be read
    /// as "no data".
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Parses the body as untyped JSON. Returns `None` for non-JSON bodies.
    pub fn json_value(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Decodes the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            ClientError::Decode(format!(
                "invalid response JSON: {err}; body: {}",
                self.body
            ))
        })
    }

    /// `true` iff the body is a JSON object whose `results` field is present
    /// and explicitly `null`. A missing field does not count.
    pub fn has_null_results(&self) -> bool {
        matches!(
            self.json_value(),
            Some(Value::Object(map)) if matches!(map.get("results"), Some(Value::Null))
        )
    }

    /// Application-level error message carried in the body, if non-empty.
    pub fn status_message(&self) -> Option<String> {
        match self.json_value()? {
            Value::Object(mut map) => match map.remove("status_message")? {
                Value::String(message) if !message.is_empty() => Some(message),
                _ => None,
            },
            _ => None,
        }
    }

    pub(crate) fn into_degraded(mut self) -> Self {
        self.degraded = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use crate::{ClientError, ResponseEnvelope};

    #[test]
    fn null_results_requires_explicit_null() {
        assert!(ResponseEnvelope::new(200, r#"{"results":null}"#).has_null_results());
        assert!(!ResponseEnvelope::new(200, r#"{"results":[]}"#).has_null_results());
        assert!(!ResponseEnvelope::new(200, r#"{"page":1}"#).has_null_results());
        assert!(!ResponseEnvelope::new(200, "null").has_null_results());
        assert!(!ResponseEnvelope::new(200, "not json").has_null_results());
    }

    #[test]
    fn status_message_ignores_empty_and_non_string() {
        assert_eq!(
            ResponseEnvelope::new(500, r#"{"status_message":"boom"}"#).status_message(),
            Some("boom".to_owned())
        );
        assert_eq!(
            ResponseEnvelope::new(200, r#"{"status_message":""}"#).status_message(),
            None
        );
        assert_eq!(
            ResponseEnvelope::new(200, r#"{"status_message":3}"#).status_message(),
            None
        );
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(ResponseEnvelope::new(200, "").is_success());
        assert!(ResponseEnvelope::new(204, "").is_success());
        assert!(!ResponseEnvelope::new(304, "").is_success());
        assert!(!ResponseEnvelope::new(500, "").is_success());
    }

    #[test]
    fn json_decode_error_includes_body() {
        #[derive(Debug, Deserialize)]
        struct Game {
            #[allow(dead_code)]
            id: u64,
        }

        let err = ResponseEnvelope::new(200, "oops")
            .json::<Game>()
            .expect_err("body is not JSON");
        match err {
            ClientError::Decode(message) => assert!(message.contains("oops")),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
