//! Environment configuration for the `wa-cloud` binary.
//!
//! The library never reads the environment. Applications embedding the client
//! either build it by hand or go through [`ClientConfig::client_builder`].

use crate::{client::ClientBuilder, transport::http::ReqwestTransport};
use envconfig::Envconfig;
use std::{sync::Arc, time::Duration};

/// Client settings read from `WHATSAPP_*` variables
#[derive(Envconfig, Clone)]
pub struct ClientConfig {
    #[envconfig(from = "WHATSAPP_BASE_URL", default = "https://graph.facebook.com/")]
    pub base_url: String,

    #[envconfig(from = "WHATSAPP_API_VERSION", default = "v16.0")]
    pub api_version: String,

    /// 🔒 SENSITIVE: system user or temporary access token, never log it
    #[envconfig(from = "WHATSAPP_ACCESS_TOKEN")]
    pub access_token: String,

    #[envconfig(from = "WHATSAPP_PHONE_NUMBER_ID")]
    pub phone_number_id: String,

    #[envconfig(from = "WHATSAPP_BUSINESS_ACCOUNT_ID", default = "")]
    pub business_account_id: String,

    /// Per request timeout enforced by the http client
    #[envconfig(from = "WHATSAPP_REQUEST_TIMEOUT_SECS", default = "30")]
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("access_token", &"<redacted>")
            .field("phone_number_id", &self.phone_number_id)
            .field("business_account_id", &self.business_account_id)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Client builder preloaded with these settings and a reqwest transport
    pub fn client_builder(&self) -> anyhow::Result<ClientBuilder> {
        let transport = ReqwestTransport::with_timeout(self.request_timeout())?;

        Ok(ClientBuilder::default()
            .base_url(&self.base_url)
            .api_version(&self.api_version)
            .access_token(&self.access_token)
            .phone_number_id(&self.phone_number_id)
            .business_account_id(&self.business_account_id)
            .transport(Arc::new(transport)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::init_from_hashmap(&vars(&[
            ("WHATSAPP_ACCESS_TOKEN", "tok"),
            ("WHATSAPP_PHONE_NUMBER_ID", "123"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://graph.facebook.com/");
        assert_eq!(config.api_version, "v16.0");
        assert_eq!(config.business_account_id, "");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_access_token_is_required() {
        let result = ClientConfig::init_from_hashmap(&vars(&[("WHATSAPP_PHONE_NUMBER_ID", "123")]));

        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig::init_from_hashmap(&vars(&[
            ("WHATSAPP_ACCESS_TOKEN", "super-secret"),
            ("WHATSAPP_PHONE_NUMBER_ID", "123"),
            ("WHATSAPP_API_VERSION", "v22.0"),
        ]))
        .unwrap();

        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("v22.0"));
    }

    #[test]
    fn test_client_builder_carries_settings() {
        let config = ClientConfig::init_from_hashmap(&vars(&[
            ("WHATSAPP_ACCESS_TOKEN", "tok"),
            ("WHATSAPP_PHONE_NUMBER_ID", "123"),
            ("WHATSAPP_BUSINESS_ACCOUNT_ID", "waba"),
        ]))
        .unwrap();

        let client = config.client_builder().unwrap().build();
        let snapshot = client.snapshot();

        assert_eq!(snapshot.access_token, "tok");
        assert_eq!(snapshot.phone_number_id, "123");
        assert_eq!(snapshot.business_account_id, "waba");
    }
}
