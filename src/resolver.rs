//! Workspace resolution.
//!
//! Resolving a workspace reads it by name and creates it when, and only
//! when, the backend reports it as not found. Any other read failure is
//! returned unchanged so that an unreachable or unauthorized backend never
//! leads to a workspace being created.

use tracing::{debug, info};

use crate::error::Result;
use crate::tfc::{RemoteBackend, Workspace};

/// Resolver that ensures a named workspace exists.
#[derive(Debug)]
pub struct WorkspaceResolver<'a, B: RemoteBackend + ?Sized> {
    backend: &'a B,
}

/// A resolved workspace and whether this call created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWorkspace {
    /// The workspace.
    pub workspace: Workspace,
    /// True if the workspace did not exist and was created.
    pub created: bool,
}

impl<'a, B: RemoteBackend + ?Sized> WorkspaceResolver<'a, B> {
    /// Creates a resolver over the given backend.
    #[must_use]
    pub const fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Returns the id of the named workspace, creating it if it is missing.
    ///
    /// # Errors
    ///
    /// Returns any read failure other than not-found, or the create failure.
    pub async fn resolve(&self, organization: &str, name: &str) -> Result<String> {
        Ok(self.ensure(organization, name).await?.workspace.id)
    }

    /// Like [`resolve`](Self::resolve) but also reports whether the
    /// workspace was created.
    ///
    /// # Errors
    ///
    /// Returns any read failure other than not-found, or the create failure.
    pub async fn ensure(&self, organization: &str, name: &str) -> Result<ResolvedWorkspace> {
        match self.backend.read_workspace(organization, name).await {
            Ok(workspace) => {
                debug!("Workspace {organization}/{name} exists ({})", workspace.id);
                Ok(ResolvedWorkspace {
                    workspace,
                    created: false,
                })
            }
            Err(err) if err.is_not_found() => {
                info!("Workspace {organization}/{name} not found, creating it");
                let workspace = self.backend.create_workspace(organization, name).await?;
                info!("Created workspace {organization}/{name} ({})", workspace.id);
                Ok(ResolvedWorkspace {
                    workspace,
                    created: true,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Reads the named workspace without creating it.
    ///
    /// Returns `None` if the workspace does not exist.
    ///
    /// # Errors
    ///
    /// Returns any read failure other than not-found.
    pub async fn lookup(&self, organization: &str, name: &str) -> Result<Option<Workspace>> {
        match self.backend.read_workspace(organization, name).await {
            Ok(workspace) => Ok(Some(workspace)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SyncError, TfcError};
    use crate::tfc::MockRemoteBackend;
    use mockall::predicate::eq;

    fn workspace(id: &str, name: &str) -> Workspace {
        Workspace {
            id: id.to_string(),
            name: name.to_string(),
            auto_apply: true,
        }
    }

    #[tokio::test]
    async fn test_existing_workspace_is_not_created() {
        let mut backend = MockRemoteBackend::new();
        backend
            .expect_read_workspace()
            .with(eq("acme"), eq("my-workspace"))
            .times(1)
            .returning(|_, name| Ok(workspace("ws-existing", name)));
        backend.expect_create_workspace().never();

        let id = WorkspaceResolver::new(&backend)
            .resolve("acme", "my-workspace")
            .await
            .expect("resolved");

        assert_eq!(id, "ws-existing");
    }

    #[tokio::test]
    async fn test_missing_workspace_is_created_once() {
        let mut backend = MockRemoteBackend::new();
        backend
            .expect_read_workspace()
            .times(1)
            .returning(|_, name| Err(SyncError::Tfc(TfcError::not_found("workspace", name))));
        backend
            .expect_create_workspace()
            .with(eq("acme"), eq("my-workspace"))
            .times(1)
            .returning(|_, name| Ok(workspace("ws-new", name)));

        let resolved = WorkspaceResolver::new(&backend)
            .ensure("acme", "my-workspace")
            .await
            .expect("resolved");

        assert!(resolved.created);
        assert_eq!(resolved.workspace.id, "ws-new");
        assert!(resolved.workspace.auto_apply);
    }

    #[tokio::test]
    async fn test_other_read_failure_never_creates() {
        let mut backend = MockRemoteBackend::new();
        backend.expect_read_workspace().times(1).returning(|_, _| {
            Err(SyncError::Tfc(TfcError::AuthenticationFailed {
                message: String::from("Invalid or insufficient API token"),
            }))
        });
        backend.expect_create_workspace().never();

        let err = WorkspaceResolver::new(&backend)
            .resolve("acme", "my-workspace")
            .await
            .expect_err("should propagate");

        assert!(matches!(
            err,
            SyncError::Tfc(TfcError::AuthenticationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_failure_propagates() {
        let mut backend = MockRemoteBackend::new();
        backend
            .expect_read_workspace()
            .returning(|_, name| Err(SyncError::Tfc(TfcError::not_found("workspace", name))));
        backend
            .expect_create_workspace()
            .times(1)
            .returning(|_, _| Err(SyncError::Tfc(TfcError::api_error(422, "Name has already been taken"))));

        let err = WorkspaceResolver::new(&backend)
            .resolve("acme", "my-workspace")
            .await
            .expect_err("create fails");

        assert!(matches!(
            err,
            SyncError::Tfc(TfcError::ApiRequestFailed { status: 422, .. })
        ));
    }

    #[tokio::test]
    async fn test_lookup_does_not_create() {
        let mut backend = MockRemoteBackend::new();
        backend
            .expect_read_workspace()
            .returning(|_, name| Err(SyncError::Tfc(TfcError::not_found("workspace", name))));
        backend.expect_create_workspace().never();

        let found = WorkspaceResolver::new(&backend)
            .lookup("acme", "my-workspace")
            .await
            .expect("lookup");

        assert!(found.is_none());
    }
}
