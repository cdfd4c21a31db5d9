//! Configuration structures for Azure ML management clients.
//!
//! This module provides the validated transport configuration for the
//! management API and the per-call workspace credentials.

use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Settings for connecting to the Azure ML management API.
///
/// Every field is optional in serialized form, so an empty document yields the
/// production defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ManagementConfig {
    /// Management base URL replacing `https://{locale}.management.azureml.net`
    #[validate(url)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Optional path to custom CA certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<PathBuf>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

const fn default_tls_verify() -> bool {
    true
}

impl ManagementConfig {
    /// Create a configuration targeting the production regional hosts.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base_url: None,
            tls_verify: default_tls_verify(),
            tls_ca_cert: None,
            request_timeout_secs: None,
        }
    }

    /// Set the management base URL override.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = Some(seconds);
        self
    }

    /// Validate the configuration, returning it unchanged on success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when a field is out of range or the base
    /// URL is not a URL.
    pub fn validated(self) -> Result<Self, Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        Ok(self)
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Parse the base URL override, if any.
    ///
    /// The endpoint path is appended to the override, so it may carry a path
    /// prefix but no query or fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or has a query or fragment.
    pub fn parse_base_url(&self) -> Result<Option<Url>, Error> {
        let Some(raw) = self.base_url.as_deref() else {
            return Ok(None);
        };

        let url = Url::parse(raw)
            .map_err(|e| Error::ConfigError(format!("Invalid management URL: {e}")))?;

        if url.query().is_some() || url.fragment().is_some() {
            return Err(Error::ConfigError(format!(
                "Management URL must not have a query or fragment: {raw}"
            )));
        }

        Ok(Some(url))
    }
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Region, workspace and bearer token sent with every management call.
///
/// Nothing here is validated: malformed values produce a malformed URL.
#[derive(Debug)]
pub struct WorkspaceCredentials {
    /// Azure region, e.g. `ussouthcentral`
    pub locale: String,

    /// Azure ML workspace id
    pub workspace: String,

    token: SecretString,
}

impl WorkspaceCredentials {
    /// Create credentials for a workspace.
    #[must_use]
    pub fn new(
        locale: impl Into<String>,
        workspace: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            locale: locale.into(),
            workspace: workspace.into(),
            token: SecretString::from(token.into()),
        }
    }

    /// The API token used as the bearer credential.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_management_config_default() {
        let config = ManagementConfig::new();
        assert!(config.base_url.is_none());
        assert!(config.tls_verify);
        assert!(config.timeout().is_none());
        assert!(config.parse_base_url().unwrap().is_none());
    }

    #[test]
    fn test_management_config_builder() {
        let config = ManagementConfig::new()
            .with_base_url("https://management.example.net")
            .with_tls_verify(false)
            .with_ca_cert(PathBuf::from("/etc/ssl/azureml.pem"))
            .with_timeout(45)
            .validated()
            .unwrap();

        assert!(!config.tls_verify);
        assert_eq!(config.timeout(), Some(Duration::from_secs(45)));
        assert_eq!(
            config.parse_base_url().unwrap().unwrap().as_str(),
            "https://management.example.net/"
        );
    }

    #[test]
    fn test_management_config_rejects_bad_url() {
        let result = ManagementConfig::new().with_base_url("not a url").validated();
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_management_config_rejects_query_and_fragment() {
        let with_query = ManagementConfig::new().with_base_url("https://mgmt.example.net/?api=1");
        assert!(matches!(
            with_query.parse_base_url(),
            Err(Error::ConfigError(_))
        ));

        let with_fragment = ManagementConfig::new().with_base_url("https://mgmt.example.net/#top");
        assert!(matches!(
            with_fragment.parse_base_url(),
            Err(Error::ConfigError(_))
        ));

        let with_prefix = ManagementConfig::new().with_base_url("https://mgmt.example.net/azureml/");
        assert_eq!(
            with_prefix.parse_base_url().unwrap().unwrap().path(),
            "/azureml/"
        );
    }

    #[test]
    fn test_management_config_rejects_timeout_out_of_range() {
        assert!(ManagementConfig::new().with_timeout(0).validated().is_err());
        assert!(ManagementConfig::new().with_timeout(301).validated().is_err());
        assert!(ManagementConfig::new().with_timeout(300).validated().is_ok());
    }

    #[test]
    fn test_management_config_deserialize_defaults() {
        let config: ManagementConfig = serde_json::from_str("{}").unwrap();
        assert!(config.tls_verify);
        assert!(config.base_url.is_none());
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn test_management_config_serialization_skips_unset() {
        let json = serde_json::to_string(&ManagementConfig::new()).unwrap();
        assert_eq!(json, r#"{"tls_verify":true}"#);
    }

    #[test]
    fn test_credentials_redact_token() {
        let credentials = WorkspaceCredentials::new("ussouthcentral", "ws-1", "s3cr3t");
        assert_eq!(credentials.token(), "s3cr3t");
        assert_eq!(credentials.locale, "ussouthcentral");
        assert_eq!(credentials.workspace, "ws-1");

        let debug = format!("{credentials:?}");
        assert!(!debug.contains("s3cr3t"));
    }
}
