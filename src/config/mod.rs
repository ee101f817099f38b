//! Configuration module for the workspace sync system.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `tfsync.yaml`
//! - Validation of the declared workspace and variables
//! - Resolving API credentials

mod credentials;
mod parser;
mod spec;
mod validator;

pub use credentials::{default_credentials_path, Credentials, DEFAULT_HOSTNAME};
pub use parser::{apply_overrides, find_config_file, ConfigParser};
pub use spec::{VariableSpec, WorkspaceConfig};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
