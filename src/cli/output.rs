//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats. Sensitive values are never
//! rendered.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{ValidationResult, WorkspaceConfig};
use crate::planner::{ActionType, PlannedAction, SyncPlan};
use crate::reconciler::ReconciliationResult;

use super::commands::OutputFormat;

/// Placeholder rendered instead of sensitive values.
const MASK: &str = "(sensitive)";

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Plan action row for table display.
#[derive(Tabled)]
struct PlanActionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the outcome of validating a workspace file.
    #[must_use]
    pub fn format_validation(
        &self,
        config: &WorkspaceConfig,
        result: &ValidationResult,
        show_warnings: bool,
    ) -> String {
        match self.format {
            OutputFormat::Json => to_json(&serde_json::json!({
                "valid": result.is_valid(),
                "organization": config.organization,
                "workspace": config.workspace,
                "variables": config.variables.len(),
                "sensitive": config.sensitive_count(),
                "warnings": result.warnings,
            })),
            OutputFormat::Text => {
                let mut output = format!("{} Workspace file is valid\n", "✓".green());

                if show_warnings && result.warning_count() > 0 {
                    let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
                    for warning in &result.warnings {
                        let _ = writeln!(output, "   - {warning}");
                    }
                }

                let _ = write!(output, "\nWorkspace: {}\n", config.qualified_name());
                let _ = writeln!(
                    output,
                    "   Variables: {} ({} sensitive)",
                    config.variables.len(),
                    config.sensitive_count()
                );
                output
            }
        }
    }

    /// Formats a sync plan for display.
    #[must_use]
    pub fn format_plan(&self, plan: &SyncPlan) -> String {
        match self.format {
            OutputFormat::Json => to_json(&PlanJson::from(plan)),
            OutputFormat::Text => Self::format_plan_text(plan),
        }
    }

    /// Formats a plan as text.
    fn format_plan_text(plan: &SyncPlan) -> String {
        let mut output = String::new();

        if plan.creates_workspace() {
            let _ = writeln!(
                output,
                "{} Workspace {} does not exist and will be created",
                "+".green(),
                plan.workspace
            );
        }

        if plan.is_empty() {
            let _ = writeln!(
                output,
                "{} No changes required - {} variables are up to date.",
                "✓".green(),
                plan.unchanged
            );
            return output;
        }

        let _ = write!(output, "\nSync Plan for {}\n\n", plan.workspace);

        let rows: Vec<PlanActionRow> = plan
            .actions
            .iter()
            .enumerate()
            .map(|(i, a)| PlanActionRow {
                index: i + 1,
                action: Self::format_action_type(a.action_type()),
                key: a.key().to_string(),
                category: a.category().to_string(),
                value: Self::format_value(a),
            })
            .collect();

        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        let _ = write!(
            output,
            "\nPlan: {} to create, {} to update, {} to delete, {} unchanged\n",
            plan.count(ActionType::Create).to_string().green(),
            plan.count(ActionType::Update).to_string().yellow(),
            plan.count(ActionType::Delete).to_string().red(),
            plan.unchanged
        );

        output
    }

    /// Formats a reconciliation result.
    #[must_use]
    pub fn format_result(&self, result: &ReconciliationResult) -> String {
        match self.format {
            OutputFormat::Json => to_json(result),
            OutputFormat::Text => {
                let status = if result.has_changes() {
                    format!("{} Workspace {} synced", "✓".green(), result.workspace)
                } else {
                    format!(
                        "{} Workspace {} already up to date",
                        "✓".green(),
                        result.workspace
                    )
                };

                let mut output = format!("{status}\n\n");
                if result.workspace_created {
                    let _ = writeln!(output, "   Workspace created: {}", result.workspace_id);
                }
                let _ = writeln!(output, "   Created: {}", result.created);
                let _ = writeln!(output, "   Updated: {}", result.updated);
                let _ = writeln!(output, "   Deleted: {}", result.deleted);
                let _ = writeln!(output, "   Unchanged: {}", result.unchanged);
                let duration = result.finished_at - result.started_at;
                let _ = writeln!(output, "   Took: {}ms", duration.num_milliseconds());
                output
            }
        }
    }

    /// Formats a short status message.
    #[must_use]
    pub fn format_message(&self, message: &str) -> String {
        match self.format {
            OutputFormat::Json => to_json(&serde_json::json!({
                "status": "success",
                "message": message,
            })),
            OutputFormat::Text => format!("{} {message}", "✓".green()),
        }
    }

    /// Formats an action type with color.
    fn format_action_type(action_type: ActionType) -> String {
        match action_type {
            ActionType::Create => "+create".green().to_string(),
            ActionType::Update => "~update".yellow().to_string(),
            ActionType::Delete => "-delete".red().to_string(),
        }
    }

    /// Formats the value an action writes, masking sensitive ones.
    fn format_value(action: &PlannedAction) -> String {
        if action.is_sensitive() {
            return MASK.dimmed().to_string();
        }
        match action {
            PlannedAction::Delete { .. } => String::from("-"),
            PlannedAction::Create { variable } => truncate(variable.desired_value(), 40),
            PlannedAction::Update {
                current, new_value, ..
            } => format!(
                "{} -> {}",
                truncate(&current.value, 18),
                truncate(new_value, 18)
            ),
        }
    }
}

/// Truncates a string to a maximum number of characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

// JSON serialization helpers

#[derive(Serialize)]
struct PlanJson {
    workspace: String,
    workspace_id: Option<String>,
    creates_workspace: bool,
    creates: usize,
    updates: usize,
    deletes: usize,
    unchanged: usize,
    actions: Vec<ActionJson>,
}

#[derive(Serialize)]
struct ActionJson {
    action_type: String,
    key: String,
    category: String,
    sensitive: bool,
    value: Option<String>,
}

impl From<&SyncPlan> for PlanJson {
    fn from(plan: &SyncPlan) -> Self {
        Self {
            workspace: plan.workspace.clone(),
            workspace_id: plan.workspace_id.clone(),
            creates_workspace: plan.creates_workspace(),
            creates: plan.count(ActionType::Create),
            updates: plan.count(ActionType::Update),
            deletes: plan.count(ActionType::Delete),
            unchanged: plan.unchanged,
            actions: plan.actions.iter().map(ActionJson::from).collect(),
        }
    }
}

impl From<&PlannedAction> for ActionJson {
    fn from(action: &PlannedAction) -> Self {
        let value = if action.is_sensitive() {
            None
        } else {
            match action {
                PlannedAction::Delete { .. } => None,
                PlannedAction::Create { variable } => Some(variable.desired_value().to_string()),
                PlannedAction::Update { new_value, .. } => Some(new_value.clone()),
            }
        };

        Self {
            action_type: action.action_type().to_string(),
            key: action.key().to_string(),
            category: action.category().to_string(),
            sensitive: action.is_sensitive(),
            value,
        }
    }
}
