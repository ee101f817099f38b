//! Planning module for variable operations.
//!
//! This module compares desired and remote variables and turns the result
//! into an ordered plan that the executor applies.

mod diff;
mod executor;
mod plan;

pub use diff::{DiffEngine, VariableDiff, VariableUpdate};
pub use executor::{ExecutionResult, PlanExecutor};
pub use plan::{ActionType, PlannedAction, SyncPlan};
