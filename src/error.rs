/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network failure before any response was received (DNS, refused
    /// connection, timeout).
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// A successful response body could not be decoded into the requested type.
    #[error("decode error: {0}")]
    Decode(String),
    /// The request descriptor could not be turned into an outbound request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Client configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns the HTTP status for [`ClientError::Http`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` when the error happened before a response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
