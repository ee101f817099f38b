//! Plan executor for applying sync plans.
//!
//! Actions run one at a time in plan order. The first failing action stops
//! execution and its error is returned unchanged; actions that already ran
//! stay applied.

use tracing::{debug, error, info, warn};

use crate::error::{ReconcileError, Result, SyncError};
use crate::tfc::RemoteBackend;

use super::plan::{ActionType, PlannedAction, SyncPlan};

/// Executor for sync plans.
#[derive(Debug)]
pub struct PlanExecutor<'a, B: RemoteBackend + ?Sized> {
    /// Backend the actions are applied to.
    backend: &'a B,
}

/// Result of executing an entire plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Variables created.
    pub created: usize,
    /// Variables updated.
    pub updated: usize,
    /// Variables deleted.
    pub deleted: usize,
}

impl<'a, B: RemoteBackend + ?Sized> PlanExecutor<'a, B> {
    /// Creates a new plan executor.
    #[must_use]
    pub const fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Executes a sync plan.
    ///
    /// # Errors
    ///
    /// Returns the error of the first action that fails, or an abort error
    /// if the plan has creates but no workspace id.
    pub async fn execute(&self, plan: &SyncPlan) -> Result<ExecutionResult> {
        let mut result = ExecutionResult::default();

        if plan.is_empty() {
            debug!("Nothing to apply for workspace {}", plan.workspace);
            return Ok(result);
        }

        info!(
            "Applying {} actions to workspace {}",
            plan.action_count(),
            plan.workspace
        );

        let workspace_id = plan.workspace_id.as_deref();
        if workspace_id.is_none() && plan.count(ActionType::Create) > 0 {
            return Err(SyncError::Reconcile(ReconcileError::Aborted {
                reason: format!("workspace {} has no id to create variables in", plan.workspace),
            }));
        }

        for (index, action) in plan.actions.iter().enumerate() {
            debug!("Executing action {index}: {}", action.description());

            if let Err(err) = self.execute_action(workspace_id.unwrap_or_default(), action).await {
                error!("Action '{action}' failed: {err}");
                if index > 0 {
                    warn!(
                        "{index} of {} actions were applied to workspace {} before the failure",
                        plan.action_count(),
                        plan.workspace
                    );
                }
                return Err(err);
            }

            match action.action_type() {
                ActionType::Create => result.created += 1,
                ActionType::Update => result.updated += 1,
                ActionType::Delete => result.deleted += 1,
            }
        }

        info!(
            "Applied plan to workspace {}: {} created, {} updated, {} deleted",
            plan.workspace, result.created, result.updated, result.deleted
        );

        Ok(result)
    }

    async fn execute_action(&self, workspace_id: &str, action: &PlannedAction) -> Result<()> {
        match action {
            PlannedAction::Delete { variable } => {
                self.backend.delete_variable(&variable.id).await?;
            }
            PlannedAction::Create { variable } => {
                let created = self
                    .backend
                    .create_variable(workspace_id, &variable.to_new_variable())
                    .await?;
                debug!("Created variable {} ({})", created.key, created.id);
            }
            PlannedAction::Update {
                current, new_value, ..
            } => {
                self.backend
                    .update_variable(&current.id, &current.key, new_value)
                    .await?;
            }
        }
        Ok(())
    }
}

impl ExecutionResult {
    /// Returns the total number of applied actions.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}
