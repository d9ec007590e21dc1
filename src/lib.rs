//! `storefront-http` is the resilient async HTTP client behind the game
//! storefront UI.
//!
//! Every call goes through [`ApiClient::send`], which:
//! - sets `Authorization` from a [`CredentialStore`] before each attempt,
//! - reports a body's `status_message` through a [`Notifier`],
//! - re-issues a 2xx call whose body has `results: null`, up to the
//!   [`RetryPolicy`] budget, then returns the last response as degraded.
//!
//! Transport failures and non-2xx statuses are returned as [`ClientError`]
//! and never retried.

mod backends;
mod client;
mod credentials;
mod error;
mod interceptor;
mod notify;
mod options;
mod page;
mod policy;
mod request;
mod response;

pub use backends::Backends;
pub use client::{ApiClient, ApiClientBuilder};
pub use credentials::{AuthToken, CredentialStore, NoCredentials, SharedCredentials};
pub use error::ClientError;
pub use interceptor::{
    AuthorizationInterceptor, RequestInterceptor, ResponseInterceptor, StatusMessageInterceptor,
};
#[cfg(feature = "tracing")]
pub use notify::TracingNotifier;
pub use notify::{Notifier, SilentNotifier};
pub use options::{ClientConfig, BACKEND_TIMEOUT_MS, CATALOG_TIMEOUT_MS};
pub use page::Page;
pub use policy::{RetryDecision, RetryPolicy, DEFAULT_MAX_ATTEMPTS};
pub use request::{Body, PreparedRequest, RequestDescriptor};
pub use response::ResponseEnvelope;

pub use reqwest::Method;

pub type Result<T> = std::result::Result<T, ClientError>;
