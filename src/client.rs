use std::{fmt, sync::Arc};

use serde::de::DeserializeOwned;

// tokio::time::sleep is only available on non-WASM targets.
#[cfg(not(target_arch = "wasm32"))]
use tokio::time::sleep;

use crate::{
    AuthorizationInterceptor, ClientConfig, ClientError, CredentialStore, NoCredentials,
    Notifier, Page, PreparedRequest, RequestDescriptor, RequestInterceptor, ResponseEnvelope,
    ResponseInterceptor, Result, RetryDecision, RetryPolicy, SilentNotifier,
    StatusMessageInterceptor,
};

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    http: Option<reqwest::Client>,
    credentials: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    policy: RetryPolicy,
}

impl ApiClientBuilder {
    /// Credential store consulted before every attempt.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Port receiving `status_message` values found in response bodies.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Policy used by [`ApiClient::send`].
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Appends a request interceptor. It runs after the authorization step.
    pub fn request_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.request_interceptors.push(Arc::new(interceptor));
        self
    }

    /// Appends a response interceptor. It runs after the status-message step.
    pub fn response_interceptor(
        mut self,
        interceptor: impl ResponseInterceptor + 'static,
    ) -> Self {
        self.response_interceptors.push(Arc::new(interceptor));
        self
    }

    /// Reuses an existing connection pool.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        self.config.validate()?;

        let mut request_interceptors: Vec<Arc<dyn RequestInterceptor>> =
            Vec::with_capacity(self.request_interceptors.len() + 1);
        request_interceptors.push(Arc::new(AuthorizationInterceptor::new(self.credentials)));
        request_interceptors.extend(self.request_interceptors);

        let mut response_interceptors: Vec<Arc<dyn ResponseInterceptor>> =
            Vec::with_capacity(self.response_interceptors.len() + 1);
        response_interceptors.push(Arc::new(StatusMessageInterceptor::new(self.notifier)));
        response_interceptors.extend(self.response_interceptors);

        Ok(ApiClient {
            http: self.http.unwrap_or_default(),
            config: self.config,
            request_interceptors: request_interceptors.into(),
            response_interceptors: response_interceptors.into(),
            policy: self.policy,
        })
    }
}

#[derive(Clone)]
/// HTTP client that injects credentials, surfaces backend messages and
/// re-issues calls whose 2xx response is semantically empty.
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    request_interceptors: Arc<[Arc<dyn RequestInterceptor>]>,
    response_interceptors: Arc<[Arc<dyn ResponseInterceptor>]>,
    policy: RetryPolicy,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("request_interceptors", &self.request_interceptors.len())
            .field("response_interceptors", &self.response_interceptors.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl ApiClient {
    /// Creates a client without credentials or notifications, using the
    /// default retry policy.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            http: None,
            credentials: Arc::new(NoCredentials),
            notifier: Arc::new(SilentNotifier),
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sends `descriptor` with the client's retry policy.
    ///
    /// Returns the final envelope on 2xx, including a degraded one when the
    /// attempt budget ran out. Fails with [`ClientError::Transport`] or
    /// [`ClientError::Http`]; neither is retried.
    pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<ResponseEnvelope> {
        self.send_with_policy(descriptor, &self.policy).await
    }

    /// Sends `descriptor` with an explicit retry policy.
    ///
    /// Mutating calls should pass [`RetryPolicy::never`].
    pub async fn send_with_policy(
        &self,
        descriptor: &RequestDescriptor,
        policy: &RetryPolicy,
    ) -> Result<ResponseEnvelope> {
        let mut attempt = 1usize;
        loop {
            let response = self.attempt(descriptor, attempt).await?;

            if !response.is_success() {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    status = response.status,
                    path = %descriptor.path,
                    "request failed with http error"
                );
                return Err(ClientError::Http {
                    status: response.status,
                    body: response.body,
                });
            }

            match policy.decide(&response, attempt) {
                RetryDecision::Accept => return Ok(response),
                RetryDecision::GiveUp => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        attempt,
                        path = %descriptor.path,
                        "retry budget exhausted, returning degraded response"
                    );
                    return Ok(response.into_degraded());
                }
                RetryDecision::Retry => {
                    self.wait_before_retry(policy, attempt).await;
                    attempt += 1;
                }
            }
        }
    }

    /// GETs `path` and decodes the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(&RequestDescriptor::get(path)).await?.json()
    }

    /// GETs a catalog list. A degraded or `null`-results response decodes to
    /// an empty page.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Page<T>> {
        let descriptor = query
            .iter()
            .fold(RequestDescriptor::get(path), |descriptor, (key, value)| {
                descriptor.query(*key, value)
            });
        self.send(&descriptor).await?.json()
    }

    /// Runs one attempt: prepare, intercept, dispatch, intercept.
    async fn attempt(
        &self,
        descriptor: &RequestDescriptor,
        attempt: usize,
    ) -> Result<ResponseEnvelope> {
        let mut request = PreparedRequest::from_descriptor(descriptor, &self.config, attempt)?;
        for interceptor in self.request_interceptors.iter() {
            request = interceptor.intercept(request)?;
        }

        let mut response = self.dispatch(request).await?;
        for interceptor in self.response_interceptors.iter() {
            response = interceptor.intercept(response)?;
        }
        Ok(response)
    }

    async fn dispatch(&self, request: PreparedRequest) -> Result<ResponseEnvelope> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            attempt = request.attempt,
            "dispatching request"
        );

        let url = parse_url(&request.url)?;
        let body = request.body.to_bytes()?;
        let mut builder = self
            .http
            .request(request.method, url)
            .headers(request.headers)
            .timeout(request.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(ClientError::Transport)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(ClientError::Transport)?;

        Ok(ResponseEnvelope {
            status,
            headers,
            body,
            attempt: request.attempt,
            degraded: false,
        })
    }

    /// Waits before the next retry attempt.
    ///
    /// On native targets: exponential backoff sleep via `tokio::time::sleep`.
    /// On WASM targets: no-op, `tokio::time::sleep` is not available.
    async fn wait_before_retry(&self, policy: &RetryPolicy, attempt: usize) {
        let delay = policy.delay_after(attempt);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt,
            delay_ms = delay_millis(delay),
            "retry predicate fired, re-issuing request"
        );

        #[cfg(not(target_arch = "wasm32"))]
        if !delay.is_zero() {
            sleep(delay).await;
        }

        // No timer on wasm32; re-issue immediately.
        #[cfg(target_arch = "wasm32")]
        let _ = delay;
    }
}

#[cfg(feature = "tracing")]
fn delay_millis(delay: std::time::Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

fn parse_url(url: &str) -> Result<reqwest::Url> {
    reqwest::Url::parse(url)
        .map_err(|err| ClientError::InvalidRequest(format!("invalid url '{url}': {err}")))
}
