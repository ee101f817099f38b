//! Terraform Cloud API types and data structures.
//!
//! The public types are the local view of backend state used by the diff
//! engine. The private `*Attributes` types mirror the JSON:API documents the
//! backend speaks and are translated at the client boundary.

use serde::{Deserialize, Serialize};

/// Category of a workspace variable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum VariableCategory {
    /// Terraform input variable.
    #[default]
    Terraform,
    /// Environment variable for the run environment.
    Env,
}

/// A variable as it exists in a remote workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteVariable {
    /// Backend-assigned identifier.
    pub id: String,
    /// Variable key.
    pub key: String,
    /// Variable value. Always empty for sensitive variables.
    pub value: String,
    /// Whether the value is write-only.
    pub sensitive: bool,
    /// Variable category.
    pub category: VariableCategory,
}

/// A remote workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    /// Backend-assigned identifier.
    pub id: String,
    /// Workspace name, unique within an organization.
    pub name: String,
    /// Whether runs are applied automatically.
    pub auto_apply: bool,
}

/// Request payload for creating a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariable {
    /// Variable key.
    pub key: String,
    /// Variable value.
    pub value: String,
    /// Whether the value is write-only.
    pub sensitive: bool,
    /// Variable category.
    pub category: VariableCategory,
}

impl std::fmt::Display for VariableCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Terraform => "terraform",
            Self::Env => "env",
        };
        write!(f, "{s}")
    }
}

/// JSON:API single-resource or collection document.
#[derive(Debug, Deserialize)]
pub(super) struct Document<T> {
    pub data: T,
    #[serde(default)]
    pub meta: Option<Meta>,
}

/// JSON:API resource object.
#[derive(Debug, Deserialize)]
pub(super) struct Resource<A> {
    pub id: String,
    pub attributes: A,
}

/// Collection metadata.
#[derive(Debug, Deserialize)]
pub(super) struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination block of a collection response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct Pagination {
    #[serde(default)]
    pub next_page: Option<u32>,
}

/// Workspace attributes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct WorkspaceAttributes {
    pub name: String,
    #[serde(default)]
    pub auto_apply: bool,
}

/// Variable attributes. The backend sends `null` for sensitive values.
#[derive(Debug, Deserialize)]
pub(super) struct VariableAttributes {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub category: VariableCategory,
}

/// JSON:API error document.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorDocument {
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

/// A single JSON:API error.
#[derive(Debug, Deserialize)]
pub(super) struct ApiError {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl From<Resource<WorkspaceAttributes>> for Workspace {
    fn from(resource: Resource<WorkspaceAttributes>) -> Self {
        Self {
            id: resource.id,
            name: resource.attributes.name,
            auto_apply: resource.attributes.auto_apply,
        }
    }
}

impl From<Resource<VariableAttributes>> for RemoteVariable {
    fn from(resource: Resource<VariableAttributes>) -> Self {
        Self {
            id: resource.id,
            key: resource.attributes.key,
            value: resource.attributes.value.unwrap_or_default(),
            sensitive: resource.attributes.sensitive,
            category: resource.attributes.category,
        }
    }
}

impl ErrorDocument {
    /// Joins all error details into one message.
    pub fn message(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .errors
            .iter()
            .filter_map(|e| e.detail.as_deref().or(e.title.as_deref()))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}
