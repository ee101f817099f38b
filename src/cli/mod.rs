//! CLI module for the tfsync tool.
//!
//! This module provides the command-line interface for syncing
//! Terraform Cloud workspace variables.

mod commands;
mod output;

pub use commands::{Cli, Commands, LogFormat, OutputFormat};
pub use output::OutputFormatter;
