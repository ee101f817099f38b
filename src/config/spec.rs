//! Workspace specification types.
//!
//! This module defines the structs that map to the `tfsync.yaml` file.
//! They describe the desired state of one remote workspace.

use serde::{Deserialize, Serialize};

use crate::tfc::{NewVariable, VariableCategory};

/// The root of a workspace file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Organization that owns the workspace.
    pub organization: String,
    /// Workspace name.
    pub workspace: String,
    /// Desired variables.
    #[serde(default)]
    pub variables: Vec<VariableSpec>,
}

/// A desired workspace variable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariableSpec {
    /// Variable key.
    pub key: String,
    /// Variable value. Absent values are treated as the empty string.
    #[serde(default)]
    pub value: Option<String>,
    /// Whether the value is write-only once created.
    #[serde(default)]
    pub sensitive: bool,
    /// Whether this is an environment variable rather than a Terraform input.
    #[serde(default, rename = "environment", alias = "is_environment")]
    pub is_environment: bool,
}

impl VariableSpec {
    /// Creates a non-sensitive Terraform variable.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            sensitive: false,
            is_environment: false,
        }
    }

    /// Marks the variable sensitive.
    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Marks the variable as an environment variable.
    #[must_use]
    pub const fn environment(mut self) -> Self {
        self.is_environment = true;
        self
    }

    /// Returns the value used for comparison and creation.
    #[must_use]
    pub fn desired_value(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }

    /// Returns the variable category.
    #[must_use]
    pub const fn category(&self) -> VariableCategory {
        if self.is_environment {
            VariableCategory::Env
        } else {
            VariableCategory::Terraform
        }
    }

    /// Builds the create payload for this variable.
    #[must_use]
    pub fn to_new_variable(&self) -> NewVariable {
        NewVariable {
            key: self.key.clone(),
            value: self.desired_value().to_string(),
            sensitive: self.sensitive,
            category: self.category(),
        }
    }
}

impl WorkspaceConfig {
    /// Returns the qualified `organization/workspace` name.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.organization, self.workspace)
    }

    /// Returns the number of sensitive variables.
    #[must_use]
    pub fn sensitive_count(&self) -> usize {
        self.variables.iter().filter(|v| v.sensitive).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value_is_empty() {
        let spec = VariableSpec {
            key: String::from("from_config_map"),
            value: None,
            sensitive: false,
            is_environment: false,
        };
        assert_eq!(spec.desired_value(), "");
        assert_eq!(spec.to_new_variable().value, "");
    }

    #[test]
    fn test_category_follows_environment_flag() {
        let tf = VariableSpec::new("region", "eu-west-1");
        assert_eq!(tf.category(), VariableCategory::Terraform);

        let env = VariableSpec::new("AWS_REGION", "eu-west-1").environment();
        assert_eq!(env.category(), VariableCategory::Env);
    }

    #[test]
    fn test_new_variable_carries_sensitivity() {
        let spec = VariableSpec::new("token", "s3cr3t").sensitive();
        let payload = spec.to_new_variable();
        assert!(payload.sensitive);
        assert_eq!(payload.value, "s3cr3t");
    }
}
