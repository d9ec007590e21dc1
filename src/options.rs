use crate::{ClientError, Result};

/// Default timeout of the catalog proxy client.
pub const CATALOG_TIMEOUT_MS: u64 = 10_000;
/// Default timeout of the core backend client.
pub const BACKEND_TIMEOUT_MS: u64 = 5_000;

/// Configures the base address and per-attempt timeout of a client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    /// Address every relative request path is joined onto.
    pub base_address: String,
    /// Per-attempt timeout in milliseconds. Retries get the full budget again.
    pub timeout_ms: u64,
}

impl ClientConfig {
    pub fn new(base_address: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            base_address: base_address.into(),
            timeout_ms,
        }
    }

    /// Preset for the catalog proxy (10 s timeout).
    pub fn catalog_proxy(base_address: impl Into<String>) -> Self {
        Self::new(base_address, CATALOG_TIMEOUT_MS)
    }

    /// Preset for the core backend (5 s timeout).
    pub fn backend(base_address: impl Into<String>) -> Self {
        Self::new(base_address, BACKEND_TIMEOUT_MS)
    }

    /// Reads `<PREFIX>_BASE_URL` and the optional `<PREFIX>_TIMEOUT_MS`.
    ///
    /// `default_timeout_ms` is used when the timeout variable is unset.
    ///
    /// **Not available on `wasm32` targets**: environment variables do not
    /// exist in browser runtimes.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env(prefix: &str, default_timeout_ms: u64) -> Result<Self> {
        let url_var = format!("{prefix}_BASE_URL");
        let timeout_var = format!("{prefix}_TIMEOUT_MS");

        let base_address = std::env::var(&url_var)
            .map_err(|_| ClientError::Config(format!("missing {url_var} environment variable")))?;
        let timeout_ms = match std::env::var(&timeout_var) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|err| {
                ClientError::Config(format!("invalid {timeout_var} '{raw}': {err}"))
            })?,
            Err(_) => default_timeout_ms,
        };

        let config = Self::new(base_address, timeout_ms);
        config.validate()?;
        Ok(config)
    }

    /// Rejects an empty or unparseable base address and a zero timeout.
    pub fn validate(&self) -> Result<()> {
        if self.base_address.trim().is_empty() {
            return Err(ClientError::Config("base address is empty".to_owned()));
        }
        reqwest::Url::parse(&self.base_address).map_err(|err| {
            ClientError::Config(format!("invalid base address '{}': {err}", self.base_address))
        })?;
        if self.timeout_ms == 0 {
            return Err(ClientError::Config(
                "timeout must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }

    /// Joins `path` onto the base address. Absolute `http(s)://` paths are
    /// used unchanged.
    pub(crate) fn resolve(base_address: &str, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        let base = base_address.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_owned()
        } else {
            format!("{base}/{path}")
        }
    }
}
