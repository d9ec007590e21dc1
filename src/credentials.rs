use std::{
    fmt,
    sync::{Arc, RwLock},
};

/// Externally owned credential.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    /// Scheme prefix as issued by the backend, e.g. `"Bearer "`.
    pub token_type: String,
    pub access_token: String,
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("token_type", &self.token_type)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl AuthToken {
    pub fn new(token_type: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            token_type: token_type.into(),
            access_token: access_token.into(),
        }
    }

    /// Returns `token_type + access_token` with no separator, or `None` when
    /// either part is empty.
    ///
    /// The backend expects the concatenation byte-for-byte; no space is
    /// inserted.
    pub fn authorization_value(&self) -> Option<String> {
        if self.token_type.is_empty() || self.access_token.is_empty() {
            return None;
        }
        Some(format!("{}{}", self.token_type, self.access_token))
    }
}

/// Read-only lookup of the current credential.
///
/// Called before every attempt; implementations must be cheap and safe for
/// concurrent reads.
pub trait CredentialStore: Send + Sync {
    fn token(&self) -> Option<AuthToken>;
}

impl<F> CredentialStore for F
where
    F: Fn() -> Option<AuthToken> + Send + Sync,
{
    fn token(&self) -> Option<AuthToken> {
        self()
    }
}

/// Store that never has a credential.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCredentials;

impl CredentialStore for NoCredentials {
    fn token(&self) -> Option<AuthToken> {
        None
    }
}

/// Process-wide credential slot written by the login flow and read by clients.
///
/// Clones share the same slot.
#[derive(Clone, Default)]
pub struct SharedCredentials {
    slot: Arc<RwLock<Option<AuthToken>>>,
}

impl fmt::Debug for SharedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCredentials")
            .field("signed_in", &self.token().is_some())
            .finish()
    }
}

impl SharedCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: AuthToken) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    pub fn set(&self, token: AuthToken) {
        // A poisoned slot only means a writer panicked; the value is still usable.
        let mut slot = self.slot.write().unwrap_or_else(|err| err.into_inner());
        *slot = Some(token);
    }

    pub fn clear(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|err| err.into_inner());
        *slot = None;
    }
}

impl CredentialStore for SharedCredentials {
    fn token(&self) -> Option<AuthToken> {
        self.slot
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::{AuthToken, CredentialStore, NoCredentials, SharedCredentials};

    #[test]
    fn authorization_value_concatenates_without_space() {
        let token = AuthToken::new("Bearer", "abc123");
        assert_eq!(token.authorization_value(), Some("Bearerabc123".to_owned()));
    }

    #[test]
    fn authorization_value_requires_both_parts() {
        assert_eq!(AuthToken::new("", "abc").authorization_value(), None);
        assert_eq!(AuthToken::new("Bearer ", "").authorization_value(), None);
    }

    #[test]
    fn debug_redacts_access_token() {
        let debug = format!("{:?}", AuthToken::new("Bearer ", "secret-token"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn shared_credentials_are_visible_to_clones() {
        let store = SharedCredentials::new();
        let reader = store.clone();
        assert_eq!(reader.token(), None);

        store.set(AuthToken::new("Bearer ", "t1"));
        assert_eq!(reader.token(), Some(AuthToken::new("Bearer ", "t1")));

        store.clear();
        assert_eq!(reader.token(), None);
    }

    #[test]
    fn closures_and_empty_store() {
        let closure = || Some(AuthToken::new("Token ", "x"));
        assert!(closure.token().is_some());
        assert!(NoCredentials.token().is_none());
    }
}
