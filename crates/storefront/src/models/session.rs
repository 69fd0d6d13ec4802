//! Session-related types.
//!
//! The visitor's login state is two strings in [`LocalStorage`]: the bearer
//! token and the role the API granted. Nothing is decoded or cached; every
//! request reads them afresh.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use bazar_pepe_core::ADMIN_ROLE;

use crate::storage::{LocalStorage, StorageError};

/// Storage keys for per-visitor state.
pub mod keys {
    /// Key for the bearer token returned by login.
    pub const TOKEN: &str = "token";

    /// Key for the role returned by login.
    pub const ROLE: &str = "role";

    /// Key for the persisted cart snapshot.
    pub const CART: &str = bazar_pepe_core::CART_STORAGE_KEY;
}

/// Login state read from storage for one request.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    token: Option<SecretString>,
    role: Option<String>,
}

impl SessionState {
    /// Build a state from raw stored values.
    #[must_use]
    pub fn new(token: Option<String>, role: Option<String>) -> Self {
        Self {
            token: token.map(SecretString::from),
            role,
        }
    }

    /// Read the token and role from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn load(storage: &impl LocalStorage) -> Result<Self, StorageError> {
        let token = storage.get_item(keys::TOKEN).await?;
        let role = storage.get_item(keys::ROLE).await?;
        Ok(Self::new(token, role))
    }

    /// Persist a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub async fn store_login(
        storage: &impl LocalStorage,
        token: &SecretString,
        role: &str,
    ) -> Result<(), StorageError> {
        storage
            .set_item(keys::TOKEN, token.expose_secret().to_string())
            .await?;
        storage.set_item(keys::ROLE, role.to_string()).await?;
        debug!(role, "Stored login");
        Ok(())
    }

    /// Erase the token and role (logout). The cart is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub async fn clear(storage: &impl LocalStorage) -> Result<(), StorageError> {
        storage.remove_item(keys::TOKEN).await?;
        storage.remove_item(keys::ROLE).await?;
        Ok(())
    }

    /// A token is present and non-empty.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|token| !token.expose_secret().is_empty())
    }

    /// The role is exactly `ADMIN`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }

    /// Token to send as bearer, if any.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_authenticated_requires_non_empty_token() {
        assert!(!SessionState::new(None, None).is_authenticated());
        assert!(!SessionState::new(Some(String::new()), None).is_authenticated());
        assert!(SessionState::new(Some("jwt".to_string()), None).is_authenticated());
    }

    #[test]
    fn test_admin_is_case_sensitive() {
        let admin = |role: &str| SessionState::new(None, Some(role.to_string())).is_admin();

        assert!(admin("ADMIN"));
        assert!(!admin("admin"));
        assert!(!admin("USER"));
        assert!(!SessionState::new(None, None).is_admin());
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let storage = MemoryStorage::new();
        SessionState::store_login(&storage, &SecretString::from("jwt"), "ADMIN")
            .await
            .unwrap();

        let state = SessionState::load(&storage).await.unwrap();
        assert!(state.is_authenticated());
        assert!(state.is_admin());
        assert_eq!(state.token().map(ExposeSecret::expose_secret), Some("jwt"));

        SessionState::clear(&storage).await.unwrap();
        let state = SessionState::load(&storage).await.unwrap();
        assert!(!state.is_authenticated());
        assert!(!state.is_admin());
    }

    #[tokio::test]
    async fn test_logout_keeps_cart() {
        let storage = MemoryStorage::new();
        storage.set_item(keys::CART, "[]".to_string()).await.unwrap();
        SessionState::store_login(&storage, &SecretString::from("jwt"), "USER")
            .await
            .unwrap();

        SessionState::clear(&storage).await.unwrap();
        assert!(storage.contains(keys::CART));
        assert!(!storage.contains(keys::TOKEN));
        assert!(!storage.contains(keys::ROLE));
    }
}
