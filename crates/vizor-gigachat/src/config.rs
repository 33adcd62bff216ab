//! Provider configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

mod defaults {
    pub const SCOPE: &str = "GIGACHAT_API_PERS";
    pub const AUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
    pub const API_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";
    pub const MODEL: &str = "GigaChat-Pro";
    pub const TIMEOUT_SECS: u64 = 60;
}

const MIN_TIMEOUT_SECS: u64 = 1;
const MAX_TIMEOUT_SECS: u64 = 600;

/// Connection settings for the GigaChat API.
///
/// The auth key is the base64 `client_id:client_secret` pair issued by the
/// provider and is sent verbatim in the `Authorization: Basic` header.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "configs do nothing unless you use them"]
pub struct GigaChatConfig {
    /// Base64 authorization key
    #[cfg_attr(
        feature = "config",
        arg(long = "gigachat-auth-key", env = "GIGACHAT_AUTH_KEY", hide_env_values = true)
    )]
    pub gigachat_auth_key: String,

    /// OAuth scope requested for the access token
    #[cfg_attr(
        feature = "config",
        arg(long = "gigachat-scope", env = "GIGACHAT_SCOPE", default_value = defaults::SCOPE)
    )]
    pub gigachat_scope: String,

    /// OAuth endpoint issuing access tokens
    #[cfg_attr(
        feature = "config",
        arg(long = "gigachat-auth-url", env = "GIGACHAT_AUTH_URL", default_value = defaults::AUTH_URL)
    )]
    pub gigachat_auth_url: String,

    /// Base URL of the REST API (files, chat completions)
    #[cfg_attr(
        feature = "config",
        arg(long = "gigachat-api-url", env = "GIGACHAT_API_URL", default_value = defaults::API_URL)
    )]
    pub gigachat_api_url: String,

    /// Model used for both detection stages
    #[cfg_attr(
        feature = "config",
        arg(long = "gigachat-model", env = "GIGACHAT_MODEL", default_value = defaults::MODEL)
    )]
    pub gigachat_model: String,

    /// PEM bundle added to the trusted roots for provider connections
    #[cfg_attr(
        feature = "config",
        arg(long = "gigachat-ca-cert", env = "GIGACHAT_CA_CERT")
    )]
    pub gigachat_ca_cert: Option<PathBuf>,

    /// Timeout for each provider request, in seconds (1-600)
    #[cfg_attr(
        feature = "config",
        arg(long = "gigachat-timeout-secs", env = "GIGACHAT_TIMEOUT_SECS", default_value_t = defaults::TIMEOUT_SECS)
    )]
    pub gigachat_timeout_secs: u64,
}

impl GigaChatConfig {
    /// Creates a configuration with the default endpoints and the given auth key.
    pub fn new(auth_key: impl Into<String>) -> Self {
        Self {
            gigachat_auth_key: auth_key.into(),
            gigachat_scope: defaults::SCOPE.to_owned(),
            gigachat_auth_url: defaults::AUTH_URL.to_owned(),
            gigachat_api_url: defaults::API_URL.to_owned(),
            gigachat_model: defaults::MODEL.to_owned(),
            gigachat_ca_cert: None,
            gigachat_timeout_secs: defaults::TIMEOUT_SECS,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.gigachat_scope = scope.into();
        self
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.gigachat_auth_url = url.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.gigachat_api_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.gigachat_model = model.into();
        self
    }

    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.gigachat_ca_cert = Some(path.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.gigachat_timeout_secs = secs;
        self
    }

    /// Returns the per-request timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.gigachat_timeout_secs)
    }

    /// Returns the API base URL without a trailing slash.
    #[inline]
    pub fn api_base(&self) -> &str {
        self.gigachat_api_url.trim_end_matches('/')
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let auth_key = self.gigachat_auth_key.trim();
        if auth_key.is_empty() {
            return Err(Error::Config("gigachat_auth_key cannot be empty".to_owned()));
        }

        if STANDARD.decode(auth_key).is_err() {
            return Err(Error::Config(
                "gigachat_auth_key must be base64 encoded".to_owned(),
            ));
        }

        if self.gigachat_scope.trim().is_empty() {
            return Err(Error::Config("gigachat_scope cannot be empty".to_owned()));
        }

        for (name, value) in [
            ("gigachat_auth_url", &self.gigachat_auth_url),
            ("gigachat_api_url", &self.gigachat_api_url),
        ] {
            Url::parse(value).map_err(|err| Error::Config(format!("{name} is invalid: {err}")))?;
        }

        if self.gigachat_model.trim().is_empty() {
            return Err(Error::Config("gigachat_model cannot be empty".to_owned()));
        }

        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&self.gigachat_timeout_secs) {
            return Err(Error::Config(format!(
                "gigachat_timeout_secs must be between {MIN_TIMEOUT_SECS} and {MAX_TIMEOUT_SECS}"
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for GigaChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GigaChatConfig")
            .field("gigachat_auth_key", &"***")
            .field("gigachat_scope", &self.gigachat_scope)
            .field("gigachat_auth_url", &self.gigachat_auth_url)
            .field("gigachat_api_url", &self.gigachat_api_url)
            .field("gigachat_model", &self.gigachat_model)
            .field("gigachat_ca_cert", &self.gigachat_ca_cert)
            .field("gigachat_timeout_secs", &self.gigachat_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "dGVzdC1jbGllbnQ6dGVzdC1zZWNyZXQ=";

    #[test]
    fn defaults_point_at_public_endpoints() {
        let config = GigaChatConfig::new(KEY);
        assert_eq!(config.gigachat_scope, "GIGACHAT_API_PERS");
        assert_eq!(config.gigachat_model, "GigaChat-Pro");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn api_base_drops_trailing_slash() {
        let config = GigaChatConfig::new(KEY).with_api_url("http://127.0.0.1:9000/api/v1/");
        assert_eq!(config.api_base(), "http://127.0.0.1:9000/api/v1");
    }

    #[test]
    fn auth_key_is_never_printed() {
        let rendered = format!("{:?}", GigaChatConfig::new(KEY));
        assert!(!rendered.contains(KEY));
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert!(GigaChatConfig::new("").validate().is_err());
        assert!(GigaChatConfig::new("not base64!").validate().is_err());
        assert!(
            GigaChatConfig::new(KEY)
                .with_auth_url("not a url")
                .validate()
                .is_err()
        );
        assert!(GigaChatConfig::new(KEY).with_timeout_secs(0).validate().is_err());
    }
}
