// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # tfc workspace sync
//!
//! Declarative, idempotent management of Terraform Cloud workspace variables.
//!
//! ## Overview
//!
//! A workspace file names an organization, a workspace and the variables the
//! workspace should hold. Syncing it:
//!
//! - Creates the workspace if it does not exist yet
//! - Creates declared variables that are missing remotely
//! - Updates variables whose value differs
//! - Deletes remote variables that are no longer declared
//!
//! Running a sync twice against an unchanged workspace makes no changes the
//! second time.
//!
//! ## Architecture
//!
//! 1. **Desired State**: Defined in `tfsync.yaml`
//! 2. **Observed State**: Listed from the Terraform Cloud API
//! 3. **Reconciler**: Diffs the two by key and applies deletions, then
//!    creations, then updates
//!
//! ## Modules
//!
//! - [`config`]: Workspace file parsing, validation and credentials
//! - [`tfc`]: Terraform Cloud API client and backend abstraction
//! - [`resolver`]: Find-or-create workspace resolution
//! - [`planner`]: Diff computation, sync plans and plan execution
//! - [`reconciler`]: Reconciliation facade
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! organization: acme
//! workspace: my-workspace
//!
//! variables:
//!   - key: hello
//!     value: rosemary
//!   - key: db_password
//!     value: s3cr3t
//!     sensitive: true
//!   - key: AWS_REGION
//!     value: eu-west-1
//!     environment: true
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod planner;
pub mod reconciler;
pub mod resolver;
pub mod tfc;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, Credentials, VariableSpec, WorkspaceConfig};
pub use error::{Result, SyncError};
pub use planner::{DiffEngine, PlanExecutor, SyncPlan, VariableDiff};
pub use reconciler::{ReconciliationResult, Reconciler};
pub use resolver::{ResolvedWorkspace, WorkspaceResolver};
pub use tfc::{RemoteBackend, RemoteVariable, TfcClient, VariableCategory, Workspace};
