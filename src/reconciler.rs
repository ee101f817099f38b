//! Reconciler for keeping a workspace's variables in the desired state.
//!
//! A reconciliation resolves the workspace (creating it on first use),
//! lists its variables, diffs them against the desired set and applies the
//! resulting plan. Nothing is retried or rolled back: a failed run leaves
//! whatever was already applied, and running again converges because the
//! diff is recomputed from the remote state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::config::VariableSpec;
use crate::error::{ReconcileError, Result, SyncError};
use crate::planner::{DiffEngine, ExecutionResult, PlanExecutor, SyncPlan};
use crate::resolver::WorkspaceResolver;
use crate::tfc::{RemoteBackend, DEFAULT_PAGE_SIZE};

/// Reconciler for workspace variables.
#[derive(Debug)]
pub struct Reconciler<'a, B: RemoteBackend + ?Sized> {
    /// Remote backend.
    backend: &'a B,
    /// Diff engine.
    diff_engine: DiffEngine,
    /// Page size for variable listing.
    page_size: u32,
}

/// Result of a reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationResult {
    /// Workspace name.
    pub workspace: String,
    /// Workspace id.
    pub workspace_id: String,
    /// Whether the workspace was created by this run.
    pub workspace_created: bool,
    /// Number of variables created.
    pub created: usize,
    /// Number of variables updated.
    pub updated: usize,
    /// Number of variables deleted.
    pub deleted: usize,
    /// Number of variables unchanged.
    pub unchanged: usize,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl<'a, B: RemoteBackend + ?Sized> Reconciler<'a, B> {
    /// Creates a new reconciler.
    #[must_use]
    pub const fn new(backend: &'a B) -> Self {
        Self {
            backend,
            diff_engine: DiffEngine::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the page size used when listing variables.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Reconciles the workspace's variables with `desired`.
    ///
    /// Deletions are applied first, then creations, then updates.
    ///
    /// # Errors
    ///
    /// Returns an error if `desired` repeats a key, or the first remote
    /// failure. Operations applied before a failure are not rolled back.
    pub async fn reconcile(
        &self,
        organization: &str,
        workspace: &str,
        desired: &[VariableSpec],
    ) -> Result<ReconciliationResult> {
        let started_at = Utc::now();
        info!("Starting reconciliation for {organization}/{workspace}");

        ensure_unique_keys(workspace, desired)?;

        let resolved = WorkspaceResolver::new(self.backend)
            .ensure(organization, workspace)
            .await?;

        let actual = self
            .backend
            .list_variables(organization, workspace, self.page_size)
            .await?;
        debug!("Found {} existing variables", actual.len());

        let diff = self.diff_engine.compute_diff(desired, &actual);
        info!("Diff: {diff}");

        let plan = SyncPlan::from_diff(workspace, Some(resolved.workspace.id.clone()), diff);
        let unchanged = plan.unchanged;

        let applied = if plan.is_empty() {
            info!("No changes required - workspace is converged");
            ExecutionResult::default()
        } else {
            PlanExecutor::new(self.backend).execute(&plan).await?
        };

        Ok(ReconciliationResult::new(
            workspace,
            resolved.workspace.id,
            resolved.created,
            applied,
            unchanged,
            started_at,
        ))
    }

    /// Creates every desired variable without diffing.
    ///
    /// Meant for the first population of a freshly created workspace; the
    /// workspace is created if missing. The caller guarantees the workspace
    /// holds no variables yet, otherwise the backend may end up with
    /// duplicate keys or reject the creates.
    ///
    /// # Errors
    ///
    /// Returns an error if `desired` repeats a key, or the first remote
    /// failure.
    pub async fn create_all(
        &self,
        organization: &str,
        workspace: &str,
        desired: &[VariableSpec],
    ) -> Result<ReconciliationResult> {
        let started_at = Utc::now();
        info!(
            "Populating {organization}/{workspace} with {} variables",
            desired.len()
        );

        ensure_unique_keys(workspace, desired)?;

        let resolved = WorkspaceResolver::new(self.backend)
            .ensure(organization, workspace)
            .await?;

        let plan = SyncPlan::populate(workspace, resolved.workspace.id.clone(), desired);
        let applied = PlanExecutor::new(self.backend).execute(&plan).await?;

        Ok(ReconciliationResult::new(
            workspace,
            resolved.workspace.id,
            resolved.created,
            applied,
            0,
            started_at,
        ))
    }

    /// Computes the plan a reconciliation would apply, without changing
    /// anything. A missing workspace is not created; its plan creates every
    /// desired variable.
    ///
    /// # Errors
    ///
    /// Returns an error if `desired` repeats a key, or a remote failure.
    pub async fn plan(
        &self,
        organization: &str,
        workspace: &str,
        desired: &[VariableSpec],
    ) -> Result<SyncPlan> {
        ensure_unique_keys(workspace, desired)?;

        let existing = WorkspaceResolver::new(self.backend)
            .lookup(organization, workspace)
            .await?;

        let actual = match &existing {
            Some(_) => {
                self.backend
                    .list_variables(organization, workspace, self.page_size)
                    .await?
            }
            None => {
                info!("Workspace {organization}/{workspace} does not exist yet");
                Vec::new()
            }
        };

        let diff = self.diff_engine.compute_diff(desired, &actual);
        Ok(SyncPlan::from_diff(
            workspace,
            existing.map(|w| w.id),
            diff,
        ))
    }

    /// Deletes the workspace.
    ///
    /// # Errors
    ///
    /// Returns not-found if the workspace does not exist, or another remote
    /// failure.
    pub async fn delete_workspace(&self, organization: &str, workspace: &str) -> Result<()> {
        info!("Deleting workspace {organization}/{workspace}");
        self.backend.delete_workspace(organization, workspace).await
    }
}

/// Rejects desired sets that repeat a key, since keys are the matching axis.
fn ensure_unique_keys(workspace: &str, desired: &[VariableSpec]) -> Result<()> {
    let mut seen = HashSet::with_capacity(desired.len());
    for variable in desired {
        if !seen.insert(variable.key.as_str()) {
            return Err(SyncError::Reconcile(ReconcileError::DuplicateKey {
                key: variable.key.clone(),
                workspace: workspace.to_string(),
            }));
        }
    }
    Ok(())
}

impl ReconciliationResult {
    fn new(
        workspace: &str,
        workspace_id: String,
        workspace_created: bool,
        applied: ExecutionResult,
        unchanged: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            workspace: workspace.to_string(),
            workspace_id,
            workspace_created,
            created: applied.created,
            updated: applied.updated,
            deleted: applied.deleted,
            unchanged,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Returns true if the run changed anything remotely.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.workspace_created || self.created + self.updated + self.deleted > 0
    }
}

impl std::fmt::Display for ReconciliationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Reconciliation of {} ({}):", self.workspace, self.workspace_id)?;
        if self.workspace_created {
            writeln!(f, "  Workspace created")?;
        }
        writeln!(f, "  Created: {}", self.created)?;
        writeln!(f, "  Updated: {}", self.updated)?;
        writeln!(f, "  Deleted: {}", self.deleted)?;
        writeln!(f, "  Unchanged: {}", self.unchanged)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::ActionType;
    use crate::tfc::InMemoryBackend;

    fn desired() -> Vec<VariableSpec> {
        vec![
            VariableSpec::new("hello", "rosemary"),
            VariableSpec::new("second_hello", "to"),
        ]
    }

    fn key_values(backend: &InMemoryBackend, workspace_id: &str) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = backend
            .variables(workspace_id)
            .into_iter()
            .map(|v| (v.key, v.value))
            .collect();
        pairs.sort();
        pairs
    }

    #[tokio::test]
    async fn test_missing_workspace_is_created_and_populated() {
        let backend = InMemoryBackend::new();

        let result = Reconciler::new(&backend)
            .reconcile("acme", "my-workspace", &desired())
            .await
            .expect("reconciled");

        assert!(result.workspace_created);
        assert_eq!(result.created, 2);
        assert_eq!(result.updated + result.deleted, 0);

        let workspace = backend.workspace("acme", "my-workspace").expect("created");
        assert!(workspace.auto_apply);
        assert_eq!(
            key_values(&backend, &workspace.id),
            vec![
                (String::from("hello"), String::from("rosemary")),
                (String::from("second_hello"), String::from("to")),
            ]
        );
    }

    #[tokio::test]
    async fn test_converges_and_is_idempotent() {
        let backend = InMemoryBackend::new();
        let ws = backend.add_workspace("acme", "my-workspace");
        backend.add_variable(&ws, "hello", "old", false);
        backend.add_variable(&ws, "stale", "x", false);

        let reconciler = Reconciler::new(&backend);

        let first = reconciler
            .reconcile("acme", "my-workspace", &desired())
            .await
            .expect("first run");
        assert!(!first.workspace_created);
        assert_eq!((first.created, first.updated, first.deleted), (1, 1, 1));
        assert_eq!(
            backend.calls(),
            vec!["delete stale", "create second_hello", "update hello"]
        );

        let second = reconciler
            .reconcile("acme", "my-workspace", &desired())
            .await
            .expect("second run");
        assert!(!second.has_changes());
        assert_eq!(second.unchanged, 2);

        let plan = reconciler
            .plan("acme", "my-workspace", &desired())
            .await
            .expect("plan");
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_then_rerun_converges() {
        let backend = InMemoryBackend::new();
        let ws = backend.add_workspace("acme", "my-workspace");
        backend.add_variable(&ws, "stale", "x", false);
        backend.fail_create_of("second_hello");

        let mut specs = desired();
        specs.push(VariableSpec::new("AWS_REGION", "eu-west-1").environment());

        let reconciler = Reconciler::new(&backend);
        let err = reconciler
            .reconcile("acme", "my-workspace", &specs)
            .await
            .expect_err("create fails");
        assert!(matches!(err, SyncError::Tfc(_)));

        // The delete and the first create stay applied.
        assert_eq!(
            key_values(&backend, &ws),
            vec![(String::from("hello"), String::from("rosemary"))]
        );

        backend.clear_failures();
        let rerun = reconciler
            .reconcile("acme", "my-workspace", &specs)
            .await
            .expect("rerun");

        assert!(!rerun.workspace_created);
        assert_eq!((rerun.created, rerun.updated, rerun.deleted), (2, 0, 0));
        assert_eq!(rerun.unchanged, 1);
        assert_eq!(
            backend.calls(),
            vec![
                "delete stale",
                "create hello",
                "create second_hello",
                "create second_hello",
                "create AWS_REGION",
            ]
        );
        assert_eq!(
            key_values(&backend, &ws),
            vec![
                (String::from("AWS_REGION"), String::from("eu-west-1")),
                (String::from("hello"), String::from("rosemary")),
                (String::from("second_hello"), String::from("to")),
            ]
        );
        let region = backend
            .variables(&ws)
            .into_iter()
            .find(|v| v.key == "AWS_REGION")
            .expect("env variable");
        assert_eq!(region.category, crate::tfc::VariableCategory::Env);

        let plan = reconciler
            .plan("acme", "my-workspace", &specs)
            .await
            .expect("plan");
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn test_sensitive_variable_without_value_is_stable() {
        let backend = InMemoryBackend::new();
        let ws = backend.add_workspace("acme", "my-workspace");
        backend.add_variable(&ws, "token", "s3cr3t", true);

        let mut token = VariableSpec::new("token", "").sensitive();
        token.value = None;

        let result = Reconciler::new(&backend)
            .reconcile("acme", "my-workspace", &[token])
            .await
            .expect("reconciled");

        assert!(!result.has_changes());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_keys_rejected_before_remote_calls() {
        let backend = InMemoryBackend::new();
        let specs = vec![
            VariableSpec::new("region", "a"),
            VariableSpec::new("region", "b").environment(),
        ];

        let err = Reconciler::new(&backend)
            .reconcile("acme", "my-workspace", &specs)
            .await
            .expect_err("duplicate");

        assert!(matches!(
            err,
            SyncError::Reconcile(ReconcileError::DuplicateKey { .. })
        ));
        assert!(backend.workspace("acme", "my-workspace").is_none());
    }

    #[tokio::test]
    async fn test_create_all_creates_every_variable() {
        let backend = InMemoryBackend::new();
        let specs = vec![
            VariableSpec::new("hello", "rosemary"),
            VariableSpec::new("AWS_REGION", "eu-west-1").environment(),
        ];

        let result = Reconciler::new(&backend)
            .create_all("acme", "fresh", &specs)
            .await
            .expect("populated");

        assert!(result.workspace_created);
        assert_eq!(result.created, 2);
        assert_eq!(
            backend.calls(),
            vec!["create_workspace fresh", "create hello", "create AWS_REGION"]
        );

        let env = backend
            .variables(&result.workspace_id)
            .into_iter()
            .find(|v| v.key == "AWS_REGION")
            .expect("env variable");
        assert_eq!(env.category, crate::tfc::VariableCategory::Env);
    }

    #[tokio::test]
    async fn test_create_all_does_not_deduplicate() {
        let backend = InMemoryBackend::new();
        let ws = backend.add_workspace("acme", "my-workspace");
        backend.add_variable(&ws, "hello", "old", false);

        Reconciler::new(&backend)
            .create_all("acme", "my-workspace", &desired())
            .await
            .expect("populated");

        let hellos = backend
            .variables(&ws)
            .into_iter()
            .filter(|v| v.key == "hello")
            .count();
        assert_eq!(hellos, 2);
    }

    #[tokio::test]
    async fn test_plan_does_not_create_workspace() {
        let backend = InMemoryBackend::new();

        let plan = Reconciler::new(&backend)
            .with_page_size(100)
            .plan("acme", "my-workspace", &desired())
            .await
            .expect("plan");

        assert!(plan.creates_workspace());
        assert_eq!(plan.count(ActionType::Create), 2);
        assert!(backend.workspace("acme", "my-workspace").is_none());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_workspace() {
        let backend = InMemoryBackend::new();
        backend.add_workspace("acme", "my-workspace");
        let reconciler = Reconciler::new(&backend);

        reconciler
            .delete_workspace("acme", "my-workspace")
            .await
            .expect("deleted");
        assert!(backend.workspace("acme", "my-workspace").is_none());

        let err = reconciler
            .delete_workspace("acme", "my-workspace")
            .await
            .expect_err("already gone");
        assert!(err.is_not_found());
    }
}
