//! Diff engine for comparing desired vs remote variables.
//!
//! Variables are matched by key alone, independent of category and
//! sensitivity, and only values are compared. Remote sensitive variables
//! report an empty value, so a sensitive variable is only updated when its
//! desired value is non-empty.

use std::collections::HashMap;
use tracing::debug;

use crate::config::VariableSpec;
use crate::tfc::RemoteVariable;

/// Engine for computing diffs between desired and remote variables.
#[derive(Debug, Default)]
pub struct DiffEngine;

/// A remote variable whose value must change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableUpdate {
    /// The variable as it exists remotely.
    pub current: RemoteVariable,
    /// The value to write.
    pub new_value: String,
    /// Whether the desired variable is declared sensitive.
    pub sensitive: bool,
}

/// Complete diff result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableDiff {
    /// Desired variables with no remote counterpart, in desired order.
    pub to_create: Vec<VariableSpec>,
    /// Matched variables whose value differs, in desired order.
    pub to_update: Vec<VariableUpdate>,
    /// Remote variables with no desired counterpart, in remote order.
    pub to_delete: Vec<RemoteVariable>,
    /// Keys that already match.
    pub unchanged: Vec<String>,
}

impl DiffEngine {
    /// Creates a new diff engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the diff between desired and remote variables.
    #[must_use]
    pub fn compute_diff(&self, desired: &[VariableSpec], actual: &[RemoteVariable]) -> VariableDiff {
        let desired_by_key: HashMap<&str, &VariableSpec> =
            desired.iter().map(|v| (v.key.as_str(), v)).collect();

        let mut actual_by_key: HashMap<&str, &RemoteVariable> = HashMap::with_capacity(actual.len());
        for variable in actual {
            actual_by_key.entry(variable.key.as_str()).or_insert(variable);
        }

        let mut diff = VariableDiff::default();

        for variable in actual {
            if !desired_by_key.contains_key(variable.key.as_str()) {
                debug!("Variable {} is not declared, deleting", variable.key);
                diff.to_delete.push(variable.clone());
            }
        }

        for spec in desired {
            match actual_by_key.get(spec.key.as_str()) {
                None => {
                    debug!("Variable {} does not exist, creating", spec.key);
                    diff.to_create.push(spec.clone());
                }
                Some(current) if current.value != spec.desired_value() => {
                    debug!("Variable {} has a different value, updating", spec.key);
                    diff.to_update.push(VariableUpdate {
                        current: (*current).clone(),
                        new_value: spec.desired_value().to_string(),
                        sensitive: spec.sensitive,
                    });
                }
                Some(_) => diff.unchanged.push(spec.key.clone()),
            }
        }

        diff
    }
}

impl VariableDiff {
    /// Returns true if there are any changes.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !(self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty())
    }

    /// Returns the total number of changes.
    #[must_use]
    pub fn total_changes(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }
}

impl std::fmt::Display for VariableDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete, {} unchanged",
            self.to_create.len(),
            self.to_update.len(),
            self.to_delete.len(),
            self.unchanged.len()
        )
    }
}
