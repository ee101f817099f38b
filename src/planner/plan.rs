//! Sync plan types and construction.
//!
//! A plan is the ordered list of variable operations derived from a diff:
//! deletions first, then creations, then updates.

use chrono::{DateTime, Utc};

use crate::config::VariableSpec;
use crate::tfc::{RemoteVariable, VariableCategory};

use super::diff::VariableDiff;

/// A complete sync plan for one workspace.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// When the plan was created.
    pub created_at: DateTime<Utc>,
    /// Workspace name.
    pub workspace: String,
    /// Workspace id, if the workspace exists.
    pub workspace_id: Option<String>,
    /// Planned actions in execution order.
    pub actions: Vec<PlannedAction>,
    /// Number of variables already in the desired state.
    pub unchanged: usize,
}

/// A single planned variable operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    /// Delete a remote variable that is no longer declared.
    Delete {
        /// The remote variable.
        variable: RemoteVariable,
    },
    /// Create a declared variable.
    Create {
        /// The desired variable.
        variable: VariableSpec,
    },
    /// Write a new value to an existing variable.
    Update {
        /// The remote variable.
        current: RemoteVariable,
        /// The value to write.
        new_value: String,
        /// Whether the desired variable is declared sensitive.
        sensitive: bool,
    },
}

/// Types of actions in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    /// Create a variable.
    Create,
    /// Update a variable's value.
    Update,
    /// Delete a variable.
    Delete,
}

impl SyncPlan {
    /// Creates a plan from a diff result.
    #[must_use]
    pub fn from_diff(workspace: &str, workspace_id: Option<String>, diff: VariableDiff) -> Self {
        let mut actions = Vec::with_capacity(diff.total_changes());

        actions.extend(
            diff.to_delete
                .into_iter()
                .map(|variable| PlannedAction::Delete { variable }),
        );
        actions.extend(
            diff.to_create
                .into_iter()
                .map(|variable| PlannedAction::Create { variable }),
        );
        actions.extend(diff.to_update.into_iter().map(|update| PlannedAction::Update {
            current: update.current,
            new_value: update.new_value,
            sensitive: update.sensitive,
        }));

        Self {
            created_at: Utc::now(),
            workspace: workspace.to_string(),
            workspace_id,
            actions,
            unchanged: diff.unchanged.len(),
        }
    }

    /// Creates a plan that creates every desired variable without diffing.
    #[must_use]
    pub fn populate(workspace: &str, workspace_id: String, desired: &[VariableSpec]) -> Self {
        Self {
            created_at: Utc::now(),
            workspace: workspace.to_string(),
            workspace_id: Some(workspace_id),
            actions: desired
                .iter()
                .cloned()
                .map(|variable| PlannedAction::Create { variable })
                .collect(),
            unchanged: 0,
        }
    }

    /// Returns true if the plan is empty (no changes).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the number of actions.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Returns the number of actions of the given type.
    #[must_use]
    pub fn count(&self, action_type: ActionType) -> usize {
        self.actions
            .iter()
            .filter(|a| a.action_type() == action_type)
            .count()
    }

    /// Returns true if the workspace will be created on apply.
    #[must_use]
    pub const fn creates_workspace(&self) -> bool {
        self.workspace_id.is_none()
    }
}

impl PlannedAction {
    /// Returns the action type.
    #[must_use]
    pub const fn action_type(&self) -> ActionType {
        match self {
            Self::Delete { .. } => ActionType::Delete,
            Self::Create { .. } => ActionType::Create,
            Self::Update { .. } => ActionType::Update,
        }
    }

    /// Returns the variable key the action targets.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Delete { variable } | Self::Update { current: variable, .. } => &variable.key,
            Self::Create { variable } => &variable.key,
        }
    }

    /// Returns the category of the targeted variable.
    #[must_use]
    pub const fn category(&self) -> VariableCategory {
        match self {
            Self::Delete { variable } | Self::Update { current: variable, .. } => {
                variable.category
            }
            Self::Create { variable } => variable.category(),
        }
    }

    /// Returns true if the targeted variable is sensitive on either side.
    #[must_use]
    pub const fn is_sensitive(&self) -> bool {
        match self {
            Self::Delete { variable } => variable.sensitive,
            Self::Create { variable } => variable.sensitive,
            Self::Update {
                current, sensitive, ..
            } => current.sensitive || *sensitive,
        }
    }

    /// Returns a human-readable description of the action.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Delete { .. } => format!("Delete variable '{}'", self.key()),
            Self::Create { .. } => format!("Create {} variable '{}'", self.category(), self.key()),
            Self::Update { .. } => format!("Update variable '{}'", self.key()),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.action_type(), self.key())?;
        if self.is_sensitive() {
            write!(f, " (sensitive)")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for SyncPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.actions.is_empty() && !self.creates_workspace() {
            return write!(f, "No changes required");
        }

        if self.creates_workspace() {
            writeln!(f, "Workspace {} will be created", self.workspace)?;
        }

        writeln!(f, "Sync Plan ({} actions):", self.actions.len())?;
        for (i, action) in self.actions.iter().enumerate() {
            writeln!(f, "  {i}. {action}")?;
        }

        Ok(())
    }
}
