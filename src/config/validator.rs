//! Workspace file validation.
//!
//! This module checks a workspace file before any remote call is made:
//! names the backend would reject and variable sets the reconciler cannot
//! match unambiguously.

use crate::error::{ConfigError, Result, SyncError};
use std::collections::HashMap;
use tracing::debug;

use super::spec::{VariableSpec, WorkspaceConfig};

/// Maximum workspace name length accepted by Terraform Cloud.
const MAX_WORKSPACE_NAME_LEN: usize = 90;

/// Validator for workspace files.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a workspace file.
    ///
    /// # Errors
    ///
    /// Returns the first validation error if any check fails.
    pub fn validate(&self, config: &WorkspaceConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_identity(config, &mut result);
        Self::validate_variables(&config.variables, &mut result);

        if result.errors.is_empty() {
            debug!("Workspace validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(SyncError::Config(ConfigError::validation(
                first_error.message.clone(),
                first_error.field.clone(),
            )))
        }
    }

    fn validate_identity(config: &WorkspaceConfig, result: &mut ValidationResult) {
        if config.organization.trim().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("organization"),
                message: String::from("Organization cannot be empty"),
            });
        } else if !has_name_chars(&config.organization) {
            result.errors.push(ValidationError {
                field: String::from("organization"),
                message: format!(
                    "Organization name '{}' is invalid. Use letters, numbers, '-' or '_'.",
                    config.organization
                ),
            });
        }

        if config.workspace.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("workspace"),
                message: String::from("Workspace name cannot be empty"),
            });
        } else if !is_valid_workspace_name(&config.workspace) {
            result.errors.push(ValidationError {
                field: String::from("workspace"),
                message: format!(
                    "Workspace name '{}' is invalid. Use at most {MAX_WORKSPACE_NAME_LEN} letters, numbers, '-' or '_'.",
                    config.workspace
                ),
            });
        }
    }

    fn validate_variables(variables: &[VariableSpec], result: &mut ValidationResult) {
        if variables.is_empty() {
            result.warnings.push(String::from(
                "No variables declared: every remote variable will be deleted",
            ));
            return;
        }

        let mut seen: HashMap<&str, &VariableSpec> = HashMap::new();

        for (i, variable) in variables.iter().enumerate() {
            let prefix = format!("variables[{i}]");

            if variable.key.is_empty() {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.key"),
                    message: String::from("Variable key cannot be empty"),
                });
                continue;
            }

            if variable.key.chars().any(char::is_whitespace) {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.key"),
                    message: format!("Variable key '{}' contains whitespace", variable.key),
                });
            }

            // Keys are matched against the remote set by key alone.
            if let Some(previous) = seen.insert(variable.key.as_str(), variable) {
                let message = if previous.category() == variable.category() {
                    format!("Duplicate {} variable key: {}", variable.category(), variable.key)
                } else {
                    format!(
                        "Variable key '{}' is declared as both {} and {}",
                        variable.key,
                        previous.category(),
                        variable.category()
                    )
                };
                result.errors.push(ValidationError {
                    field: format!("{prefix}.key"),
                    message,
                });
            }

            if variable.sensitive && variable.value.is_none() {
                result.warnings.push(format!(
                    "{prefix}: sensitive variable '{}' has no value and will be created empty",
                    variable.key
                ));
            }
        }
    }
}

/// Workspace names may contain letters, numbers, dashes and underscores.
fn is_valid_workspace_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_WORKSPACE_NAME_LEN && has_name_chars(name)
}

fn has_name_chars(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(variables: Vec<VariableSpec>) -> WorkspaceConfig {
        WorkspaceConfig {
            organization: String::from("acme"),
            workspace: String::from("my-workspace"),
            variables,
        }
    }

    #[test]
    fn test_valid_workspace_name() {
        assert!(is_valid_workspace_name("my-workspace"));
        assert!(is_valid_workspace_name("Network_Prod-2"));
        assert!(!is_valid_workspace_name(""));
        assert!(!is_valid_workspace_name("my workspace"));
        assert!(!is_valid_workspace_name("team/app"));
        assert!(!is_valid_workspace_name(&"a".repeat(91)));
    }

    #[test]
    fn test_valid_config() {
        let result = ConfigValidator::new()
            .validate(&config(vec![
                VariableSpec::new("hello", "rosemary"),
                VariableSpec::new("AWS_REGION", "eu-west-1").environment(),
            ]))
            .expect("valid");
        assert!(result.is_valid());
        assert_eq!(result.warning_count(), 0);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = ConfigValidator::new()
            .validate(&config(vec![
                VariableSpec::new("hello", "a"),
                VariableSpec::new("hello", "b"),
            ]))
            .expect_err("duplicate");
        assert!(err.to_string().contains("Duplicate terraform variable key: hello"));
    }

    #[test]
    fn test_key_shared_across_categories_rejected() {
        let err = ConfigValidator::new()
            .validate(&config(vec![
                VariableSpec::new("region", "a"),
                VariableSpec::new("region", "b").environment(),
            ]))
            .expect_err("ambiguous");
        assert!(err.to_string().contains("both terraform and env"));
    }

    #[test]
    fn test_sensitive_without_value_warns() {
        let mut secret = VariableSpec::new("token", "").sensitive();
        secret.value = None;

        let result = ConfigValidator::new()
            .validate(&config(vec![secret]))
            .expect("valid");
        assert_eq!(result.warning_count(), 1);
    }

    #[test]
    fn test_organization_charset_rejected() {
        let mut cfg = config(vec![VariableSpec::new("hello", "rosemary")]);
        cfg.organization = String::from("acme/../admin");

        let err = ConfigValidator::new().validate(&cfg).expect_err("invalid organization");
        assert!(err.to_string().contains("Organization name 'acme/../admin' is invalid"));
    }

    #[test]
    fn test_empty_organization_rejected() {
        let mut cfg = config(vec![]);
        cfg.organization = String::new();
        assert!(ConfigValidator::new().validate(&cfg).is_err());
    }
}
