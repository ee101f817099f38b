//! Remote backend trait definition.
//!
//! This module defines the workspace and variable operations the reconciler
//! needs from a backend. [`TfcClient`](super::TfcClient) implements it over
//! HTTP; tests implement it in memory.

use async_trait::async_trait;

use crate::error::Result;

use super::types::{NewVariable, RemoteVariable, Workspace};

/// Workspace and variable CRUD against a remote backend.
///
/// Every call is a remote round trip with no caching. A missing resource is
/// reported as [`TfcError::NotFound`](crate::error::TfcError::NotFound) so
/// callers can tell "does not exist" apart from other failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Reads a workspace by name.
    async fn read_workspace(&self, organization: &str, name: &str) -> Result<Workspace>;

    /// Creates a workspace with auto-apply enabled.
    async fn create_workspace(&self, organization: &str, name: &str) -> Result<Workspace>;

    /// Deletes a workspace by name.
    async fn delete_workspace(&self, organization: &str, name: &str) -> Result<()>;

    /// Lists every variable of a workspace.
    ///
    /// Implementations page through the collection `page_size` items at a
    /// time and return the complete set.
    async fn list_variables(
        &self,
        organization: &str,
        workspace: &str,
        page_size: u32,
    ) -> Result<Vec<RemoteVariable>>;

    /// Creates a variable in the workspace with the given id.
    async fn create_variable(
        &self,
        workspace_id: &str,
        variable: &NewVariable,
    ) -> Result<RemoteVariable>;

    /// Replaces the value of an existing variable.
    async fn update_variable(&self, id: &str, key: &str, value: &str) -> Result<RemoteVariable>;

    /// Deletes a variable by id.
    async fn delete_variable(&self, id: &str) -> Result<()>;
}
