//! Runtime-mutable client configuration.
//!
//! [`ClientState`] is the only shared mutable value in the crate. Request code
//! never sees it directly: it asks for a [`ConfigSnapshot`] once per call and
//! builds the whole request from that copy.

use crate::consts;
use std::sync::{PoisonError, RwLock};

/// Immutable point-in-time copy of the client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub base_url: String,
    pub api_version: String,
    pub access_token: String,
    pub phone_number_id: String,
    pub business_account_id: String,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            base_url: consts::BASE_URL.to_string(),
            api_version: consts::LOWEST_SUPPORTED_VERSION.to_string(),
            access_token: String::new(),
            phone_number_id: String::new(),
            business_account_id: String::new(),
        }
    }
}

/// Configuration holder guarded by a reader-writer lock.
///
/// Readers run concurrently; each setter takes the write lock for the duration
/// of its update, so a snapshot is either entirely before or entirely after it.
#[derive(Debug, Default)]
pub struct ClientState {
    inner: RwLock<ConfigSnapshot>,
}

impl ClientState {
    pub fn new(config: ConfigSnapshot) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        // writers only assign whole fields, a poisoned lock still holds a valid config
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies several field changes under a single write lock
    pub fn update(&self, apply: impl FnOnce(&mut ConfigSnapshot)) {
        let mut config = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        apply(&mut config);
    }

    pub fn set_access_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.update(|config| config.access_token = token);
    }

    pub fn set_phone_number_id(&self, id: impl Into<String>) {
        let id = id.into();
        self.update(|config| config.phone_number_id = id);
    }

    pub fn set_business_account_id(&self, id: impl Into<String>) {
        let id = id.into();
        self.update(|config| config.business_account_id = id);
    }

    pub fn set_api_version(&self, version: impl Into<String>) {
        let version = version.into();
        self.update(|config| config.api_version = version);
    }

    pub fn set_base_url(&self, base_url: impl Into<String>) {
        let base_url = base_url.into();
        self.update(|config| config.base_url = base_url);
    }
}
