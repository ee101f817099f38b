//! API credentials lookup.
//!
//! The token comes from `TFE_TOKEN` when set, otherwise from the Terraform
//! CLI credentials file written by `terraform login`
//! (`~/.terraform.d/credentials.tfrc.json`).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, Result, SyncError};

/// Default Terraform Cloud hostname.
pub const DEFAULT_HOSTNAME: &str = "app.terraform.io";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "TFE_TOKEN";

/// Environment variable selecting the hostname.
pub const HOSTNAME_ENV: &str = "TFE_HOSTNAME";

/// Environment variable overriding the full API address.
pub const ADDRESS_ENV: &str = "TFE_ADDRESS";

/// Resolved connection settings for the API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Base address, e.g. `https://app.terraform.io`.
    pub address: String,
    /// Hostname the token belongs to.
    pub hostname: String,
    /// API token.
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("hostname", &self.hostname)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// `credentials.tfrc.json` layout.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    credentials: HashMap<String, HostCredentials>,
}

#[derive(Debug, Deserialize)]
struct HostCredentials {
    token: String,
}

impl Credentials {
    /// Loads credentials from the process environment and the default
    /// credentials file.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is found or the credentials file is
    /// malformed.
    pub fn load() -> Result<Self> {
        Self::resolve(|name| std::env::var(name).ok(), default_credentials_path().as_deref())
    }

    /// Resolves credentials from the given lookup and credentials file.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is found or the credentials file is
    /// malformed.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        credentials_file: Option<&Path>,
    ) -> Result<Self> {
        let hostname = lookup(HOSTNAME_ENV)
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string());

        let address = lookup(ADDRESS_ENV)
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| format!("https://{hostname}"));

        if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.is_empty()) {
            debug!("Using API token from {TOKEN_ENV}");
            return Ok(Self {
                address,
                hostname,
                token,
            });
        }

        let token = match credentials_file {
            Some(path) if path.exists() => read_token(path, &hostname)?,
            _ => None,
        };

        token
            .map(|token| Self {
                address,
                hostname: hostname.clone(),
                token,
            })
            .ok_or_else(|| SyncError::Config(ConfigError::MissingToken { hostname }))
    }
}

/// Returns `~/.terraform.d/credentials.tfrc.json`, if a home directory exists.
#[must_use]
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".terraform.d").join("credentials.tfrc.json"))
}

fn read_token(path: &Path, hostname: &str) -> Result<Option<String>> {
    debug!("Reading credentials from: {}", path.display());

    let invalid = |message: String| {
        SyncError::Config(ConfigError::InvalidCredentials {
            path: path.to_path_buf(),
            message,
        })
    };

    let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let file: CredentialsFile =
        serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;

    Ok(file
        .credentials
        .get(hostname)
        .map(|c| c.token.clone())
        .filter(|t| !t.is_empty()))
}
