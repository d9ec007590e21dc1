//! Ordered request/response transforms applied around every attempt.
//!
//! Request interceptors run in registration order on the freshly prepared
//! request of each attempt, retries included. Response interceptors run in
//! registration order on every received response, before status
//! classification, so they also see non-2xx responses.

use std::sync::Arc;

use reqwest::header;

use crate::{CredentialStore, Notifier, PreparedRequest, ResponseEnvelope, Result};

/// Transforms a request before it is dispatched.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: PreparedRequest) -> Result<PreparedRequest>;
}

impl<F> RequestInterceptor for F
where
    F: Fn(PreparedRequest) -> Result<PreparedRequest> + Send + Sync,
{
    fn intercept(&self, request: PreparedRequest) -> Result<PreparedRequest> {
        self(request)
    }
}

/// Transforms or observes a response before it is classified.
pub trait ResponseInterceptor: Send + Sync {
    fn intercept(&self, response: ResponseEnvelope) -> Result<ResponseEnvelope>;
}

impl<F> ResponseInterceptor for F
where
    F: Fn(ResponseEnvelope) -> Result<ResponseEnvelope> + Send + Sync,
{
    fn intercept(&self, response: ResponseEnvelope) -> Result<ResponseEnvelope> {
        self(response)
    }
}

/// Sets `Authorization` from the credential store on every attempt.
///
/// The token is looked up fresh each time, so a sign-in or sign-out between
/// retries is honored. Without a well-formed token the header is left unset.
pub struct AuthorizationInterceptor {
    credentials: Arc<dyn CredentialStore>,
}

impl AuthorizationInterceptor {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }
}

impl RequestInterceptor for AuthorizationInterceptor {
    fn intercept(&self, request: PreparedRequest) -> Result<PreparedRequest> {
        match self
            .credentials
            .token()
            .and_then(|token| token.authorization_value())
        {
            Some(value) => request.with_header(header::AUTHORIZATION, &value),
            None => Ok(request),
        }
    }
}

/// Forwards a body's `status_message` to the notifier.
///
/// Pure side effect: the response passes through unchanged.
pub struct StatusMessageInterceptor {
    notifier: Arc<dyn Notifier>,
}

impl StatusMessageInterceptor {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

impl ResponseInterceptor for StatusMessageInterceptor {
    fn intercept(&self, response: ResponseEnvelope) -> Result<ResponseEnvelope> {
        if let Some(message) = response.status_message() {
            self.notifier.notify(&message);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::{
        AuthToken, AuthorizationInterceptor, ClientConfig, NoCredentials, PreparedRequest,
        RequestDescriptor, RequestInterceptor, ResponseEnvelope, ResponseInterceptor,
        SharedCredentials, StatusMessageInterceptor,
    };

    fn prepared() -> PreparedRequest {
        PreparedRequest::from_descriptor(
            &RequestDescriptor::get("games"),
            &ClientConfig::new("http://api", 1_000),
            1,
        )
        .expect("descriptor must prepare")
    }

    #[test]
    fn authorization_uses_exact_concatenation() {
        let store = SharedCredentials::with_token(AuthToken::new("Bearer", "tok"));
        let interceptor = AuthorizationInterceptor::new(Arc::new(store));
        let request = interceptor.intercept(prepared()).expect("must intercept");
        assert_eq!(request.header("authorization"), Some("Bearertok"));
    }

    #[test]
    fn authorization_skipped_without_token() {
        let interceptor = AuthorizationInterceptor::new(Arc::new(NoCredentials));
        let request = interceptor.intercept(prepared()).expect("must intercept");
        assert!(request.header("authorization").is_none());
    }

    #[test]
    fn authorization_skipped_for_half_empty_token() {
        let store = SharedCredentials::with_token(AuthToken::new("Bearer ", ""));
        let interceptor = AuthorizationInterceptor::new(Arc::new(store));
        let request = interceptor.intercept(prepared()).expect("must intercept");
        assert!(request.header("authorization").is_none());
    }

    #[test]
    fn status_message_notifies_and_passes_through() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let interceptor = StatusMessageInterceptor::new(Arc::new(move |message: &str| {
            sink.lock().unwrap().push(message.to_owned())
        }));

        let response = ResponseEnvelope::new(500, r#"{"status_message":"boom"}"#);
        let passed = interceptor
            .intercept(response.clone())
            .expect("must intercept");

        assert_eq!(passed, response);
        assert_eq!(*seen.lock().unwrap(), vec!["boom".to_owned()]);
    }
}
