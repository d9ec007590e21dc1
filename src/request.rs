use std::time::Duration;

use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Method,
};
use serde::Serialize;

use crate::{ClientConfig, ClientError, Result};

/// Request payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    /// Sent as `application/json`.
    Json(serde_json::Value),
    /// Sent as `text/plain`.
    Text(String),
}

impl Body {
    fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Json(_) => Some("application/json"),
            Self::Text(_) => Some("text/plain"),
        }
    }

    pub(crate) fn to_bytes(&self) -> Result<Option<Vec<u8>>> {
        match self {
            Self::Empty => Ok(None),
            Self::Json(value) => serde_json::to_vec(value)
                .map(Some)
                .map_err(|err| ClientError::InvalidRequest(format!("invalid JSON body: {err}"))),
            Self::Text(text) => Ok(Some(text.clone().into_bytes())),
        }
    }
}

/// Immutable description of one logical call.
///
/// The same descriptor is re-sent on every retry; it carries no attempt state.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path joined onto the base address, or an absolute `http(s)://` URL.
    pub path: String,
    /// Overrides the client's base address for this call.
    pub base_address: Option<String>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Body,
    /// Overrides the client's per-attempt timeout for this call.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            base_address: None,
            headers: Vec::new(),
            query: Vec::new(),
            body: Body::Empty,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends a query parameter. Repeated keys are sent repeatedly.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Serializes `payload` into a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self> {
        let value = serde_json::to_value(payload)
            .map_err(|err| ClientError::InvalidRequest(format!("invalid JSON body: {err}")))?;
        self.body = Body::Json(value);
        Ok(self)
    }

    /// Sets a raw `text/plain` body.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.body = Body::Text(text.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_address(mut self, base_address: impl Into<String>) -> Self {
        self.base_address = Some(base_address.into());
        self
    }
}

/// Concrete request for a single attempt, built fresh from the descriptor.
///
/// Request interceptors receive and return this value.
#[derive(Clone, Debug)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Body,
    pub timeout: Duration,
    /// 1-based attempt number within the logical call.
    pub attempt: usize,
}

impl PreparedRequest {
    pub(crate) fn from_descriptor(
        descriptor: &RequestDescriptor,
        config: &ClientConfig,
        attempt: usize,
    ) -> Result<Self> {
        let base = descriptor
            .base_address
            .as_deref()
            .unwrap_or(&config.base_address);

        let mut headers = HeaderMap::with_capacity(descriptor.headers.len() + 1);
        for (name, value) in &descriptor.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                ClientError::InvalidRequest(format!("invalid header name '{name}': {err}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|err| {
                ClientError::InvalidRequest(format!("invalid value for header '{name}': {err}"))
            })?;
            headers.append(name, value);
        }
        if let Some(content_type) = descriptor.body.content_type() {
            if !headers.contains_key(header::CONTENT_TYPE) {
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
        }

        let url = ClientConfig::resolve(base, &descriptor.path);
        reqwest::Url::parse(&url)
            .map_err(|err| ClientError::InvalidRequest(format!("invalid url '{url}': {err}")))?;

        Ok(Self {
            method: descriptor.method.clone(),
            url,
            query: descriptor.query.clone(),
            headers,
            body: descriptor.body.clone(),
            timeout: descriptor
                .timeout
                .unwrap_or(Duration::from_millis(config.timeout_ms)),
            attempt,
        })
    }

    /// Returns a header value when it is present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Replaces a header, failing when `value` contains bytes not allowed in
    /// a header.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value).map_err(|err| {
            ClientError::InvalidRequest(format!("invalid value for header '{name}': {err}"))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }
}
