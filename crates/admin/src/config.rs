//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STORE_BASE_URL` - Base URL of the remote document store REST bridge
//! - `STORE_API_KEY` - API key for the document store
//! - `ASSET_HOST_CLOUD_NAME` - Target account for asset uploads
//! - `ASSET_UPLOAD_PRESET` - Server-side upload policy identifier
//!
//! Both asset host variables are required for any mutation that touches an
//! image; the loader treats them as required so misconfiguration surfaces
//! at startup rather than on the first upload.

use std::collections::HashMap;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Remote document store connection settings.
    pub store: RemoteStoreConfig,
    /// Third-party asset host settings.
    pub asset_host: AssetHostConfig,
}

/// Remote document store connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct RemoteStoreConfig {
    /// Base URL of the store's REST bridge, without a trailing slash.
    pub base_url: Url,
    /// API key sent as a bearer token on every request.
    pub api_key: SecretString,
}

impl std::fmt::Debug for RemoteStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStoreConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Third-party asset host settings.
#[derive(Debug, Clone)]
pub struct AssetHostConfig {
    /// Account name at the asset host (path component of the upload URL).
    pub cloud_name: String,
    /// Upload preset naming the server-side upload policy.
    pub upload_preset: String,
}

impl AdminConfig {
    /// Load configuration from process environment variables.
    ///
    /// A `.env` file is loaded first, best-effort, so local development
    /// does not need exported variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Load configuration from an explicit variable map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or
    /// malformed.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let base_url = required(vars, "STORE_BASE_URL")?;
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            ConfigError::InvalidEnvVar("STORE_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            store: RemoteStoreConfig {
                base_url,
                api_key: SecretString::from(required(vars, "STORE_API_KEY")?),
            },
            asset_host: AssetHostConfig {
                cloud_name: required(vars, "ASSET_HOST_CLOUD_NAME")?,
                upload_preset: required(vars, "ASSET_UPLOAD_PRESET")?,
            },
        })
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}
