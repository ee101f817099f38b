//! Terraform Cloud API integration module.
//!
//! This module provides the backend abstraction the reconciler runs against
//! and its HTTP implementation for Terraform Cloud and Terraform Enterprise.

mod backend;
mod client;
mod types;

#[cfg(test)]
mod memory;

pub use backend::RemoteBackend;
#[cfg(test)]
pub use backend::MockRemoteBackend;
pub use client::{TfcClient, DEFAULT_ADDRESS, DEFAULT_TIMEOUT_SECS};
#[cfg(test)]
pub use memory::InMemoryBackend;
pub use types::{NewVariable, RemoteVariable, VariableCategory, Workspace};

/// Default page size for variable listing.
pub const DEFAULT_PAGE_SIZE: u32 = 500;
