//! Workspace file parser.
//!
//! This module loads the workspace file from YAML, applies environment
//! variable overrides and loads an optional `.env` file.

use crate::error::{ConfigError, Result, SyncError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::WorkspaceConfig;

/// Environment variable overriding `organization`.
pub const ORGANIZATION_ENV: &str = "TFSYNC_ORGANIZATION";

/// Environment variable overriding `workspace`.
pub const WORKSPACE_ENV: &str = "TFSYNC_WORKSPACE";

/// Parser for workspace files.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path used to find the `.env` file.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads a workspace file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<WorkspaceConfig> {
        let path = path.as_ref();
        info!("Loading workspace file: {}", path.display());

        if !path.exists() {
            return Err(SyncError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses a workspace file from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<WorkspaceConfig> {
        debug!("Parsing YAML workspace file");

        let config: WorkspaceConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            SyncError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!(
            "Parsed workspace {} with {} variables",
            config.qualified_name(),
            config.variables.len()
        );
        Ok(config)
    }

    /// Loads a workspace file and applies process environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<WorkspaceConfig> {
        let mut config = self.load_file(path)?;
        apply_overrides(&mut config, |name| std::env::var(name).ok());
        Ok(config)
    }

    /// Loads the `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the `.env` file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                SyncError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Applies `TFSYNC_*` overrides using the given lookup.
pub fn apply_overrides(config: &mut WorkspaceConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(organization) = lookup(ORGANIZATION_ENV) {
        debug!("Overriding organization from environment");
        config.organization = organization;
    }

    if let Some(workspace) = lookup(WORKSPACE_ENV) {
        debug!("Overriding workspace from environment");
        config.workspace = workspace;
    }
}

/// Default workspace file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["tfsync.yaml", "tfsync.yml", ".tfsync.yaml"];

/// Finds the workspace file in the given directory or its parents.
///
/// # Errors
///
/// Returns an error if no workspace file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found workspace file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(SyncError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}
