use std::sync::Arc;

use crate::{ApiClient, ClientConfig, CredentialStore, Notifier, Result};

/// The two clients the storefront talks through, built once at startup.
///
/// Both share one credential store and one notifier; their base addresses and
/// timeouts are independent.
#[derive(Clone, Debug)]
pub struct Backends {
    /// Catalog proxy (game lists, details, search).
    pub catalog: ApiClient,
    /// Core backend (accounts, cart, wishlist, support tickets, admin).
    pub core: ApiClient,
}

impl Backends {
    pub fn new(
        catalog: ClientConfig,
        core: ClientConfig,
        credentials: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let catalog = ApiClient::builder(catalog)
            .credentials(Arc::clone(&credentials))
            .notifier(Arc::clone(&notifier))
            .build()?;
        let core = ApiClient::builder(core)
            .credentials(credentials)
            .notifier(notifier)
            .build()?;
        Ok(Self { catalog, core })
    }

    /// Builds both clients from the environment.
    ///
    /// Reads:
    /// - `STOREFRONT_CATALOG_BASE_URL`, optional `STOREFRONT_CATALOG_TIMEOUT_MS` (default 10 000)
    /// - `STOREFRONT_BACKEND_BASE_URL`, optional `STOREFRONT_BACKEND_TIMEOUT_MS` (default 5 000)
    ///
    /// **Not available on `wasm32` targets.**
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env(
        credentials: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let catalog =
            ClientConfig::from_env("STOREFRONT_CATALOG", crate::options::CATALOG_TIMEOUT_MS)?;
        let core = ClientConfig::from_env("STOREFRONT_BACKEND", crate::options::BACKEND_TIMEOUT_MS)?;
        Self::new(catalog, core, credentials, notifier)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{Backends, ClientConfig, ClientError, NoCredentials, SilentNotifier};

    #[test]
    fn clients_keep_independent_timeouts() {
        let backends = Backends::new(
            ClientConfig::catalog_proxy("http://catalog"),
            ClientConfig::backend("http://core"),
            Arc::new(NoCredentials),
            Arc::new(SilentNotifier),
        )
        .expect("configs are valid");

        assert_eq!(backends.catalog.config().timeout_ms, 10_000);
        assert_eq!(backends.core.config().timeout_ms, 5_000);
        assert_eq!(backends.core.config().base_address, "http://core");
    }

    // The only test touching the STOREFRONT_* variables.
    #[test]
    fn from_env_applies_per_backend_default_timeouts() {
        std::env::set_var("STOREFRONT_CATALOG_BASE_URL", "http://catalog");
        std::env::set_var("STOREFRONT_BACKEND_BASE_URL", "http://core");
        std::env::remove_var("STOREFRONT_CATALOG_TIMEOUT_MS");
        std::env::remove_var("STOREFRONT_BACKEND_TIMEOUT_MS");

        let backends = Backends::from_env(Arc::new(NoCredentials), Arc::new(SilentNotifier))
            .expect("base urls are set");

        assert_eq!(
            backends.catalog.config(),
            &ClientConfig::new("http://catalog", 10_000)
        );
        assert_eq!(backends.core.config(), &ClientConfig::new("http://core", 5_000));
    }

    #[test]
    fn invalid_config_fails_construction() {
        let err = Backends::new(
            ClientConfig::catalog_proxy(""),
            ClientConfig::backend("http://core"),
            Arc::new(NoCredentials),
            Arc::new(SilentNotifier),
        )
        .expect_err("empty base address");
        assert!(matches!(err, ClientError::Config(_)));
    }
}
