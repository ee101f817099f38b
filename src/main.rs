//! tfsync CLI entrypoint.
//!
//! This is the main entrypoint for the tfsync command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tfc_workspace_sync::cli::{Cli, Commands, LogFormat, OutputFormatter};
use tfc_workspace_sync::config::{
    find_config_file, ConfigParser, ConfigValidator, Credentials, WorkspaceConfig,
};
use tfc_workspace_sync::error::{ReconcileError, Result, SyncError};
use tfc_workspace_sync::reconciler::Reconciler;
use tfc_workspace_sync::tfc::TfcClient;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_format);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system. `RUST_LOG` takes precedence over
/// `--verbose`. Logs go to stderr so stdout stays parseable.
fn init_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);
    let config_path = cli.config.as_ref();

    match cli.command {
        Commands::Validate { warnings } => cmd_validate(config_path, warnings, &formatter),
        Commands::Plan => {
            let config = load_workspace(config_path)?;
            let client = connect(cli.timeout)?;
            let plan = Reconciler::new(&client)
                .with_page_size(cli.page_size)
                .plan(&config.organization, &config.workspace, &config.variables)
                .await?;
            emit(&formatter.format_plan(&plan))
        }
        Commands::Apply => {
            let config = load_workspace(config_path)?;
            let client = connect(cli.timeout)?;
            let result = Reconciler::new(&client)
                .with_page_size(cli.page_size)
                .reconcile(&config.organization, &config.workspace, &config.variables)
                .await?;
            emit(&formatter.format_result(&result))
        }
        Commands::Populate => {
            let config = load_workspace(config_path)?;
            let client = connect(cli.timeout)?;
            let result = Reconciler::new(&client)
                .create_all(&config.organization, &config.workspace, &config.variables)
                .await?;
            emit(&formatter.format_result(&result))
        }
        Commands::Destroy { yes } => cmd_destroy(config_path, yes, cli.timeout, &formatter).await,
        Commands::Check => {
            let config = load_workspace(config_path)?;
            let client = connect(cli.timeout)?;
            client.read_organization(&config.organization).await?;
            emit(&formatter.format_message(&format!(
                "Authenticated to {} with access to organization {}",
                client.address(),
                config.organization
            )))
        }
    }
}

/// Validate the workspace file.
fn cmd_validate(
    config_path: Option<&PathBuf>,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config_file = resolve_config_path(config_path)?;
    info!("Validating workspace file: {}", config_file.display());

    let config = parse_workspace(&config_file)?;
    let result = ConfigValidator::new().validate(&config)?;

    emit(&formatter.format_validation(&config, &result, show_warnings))
}

/// Delete the workspace.
async fn cmd_destroy(
    config_path: Option<&PathBuf>,
    confirmed: bool,
    timeout: u64,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config = load_workspace(config_path)?;

    if !confirmed {
        return Err(SyncError::Reconcile(ReconcileError::Aborted {
            reason: format!(
                "deleting {} is irreversible, pass --yes to confirm",
                config.qualified_name()
            ),
        }));
    }

    let client = connect(timeout)?;
    Reconciler::new(&client)
        .delete_workspace(&config.organization, &config.workspace)
        .await?;

    emit(&formatter.format_message(&format!(
        "Workspace {} deleted",
        config.qualified_name()
    )))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the workspace file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Loads `.env` next to the workspace file, then parses it with
/// environment overrides applied.
fn parse_workspace(config_file: &Path) -> Result<WorkspaceConfig> {
    let parser = ConfigParser::new()
        .with_base_path(config_file.parent().unwrap_or_else(|| Path::new(".")));
    parser.load_dotenv()?;
    parser.load_with_env(config_file)
}

/// Loads and validates the workspace file.
fn load_workspace(config_path: Option<&PathBuf>) -> Result<WorkspaceConfig> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Loading workspace file from: {}", config_file.display());

    let config = parse_workspace(&config_file)?;
    ConfigValidator::new().validate(&config)?;

    info!(
        "Workspace {}: {} variables ({} sensitive)",
        config.qualified_name(),
        config.variables.len(),
        config.sensitive_count()
    );
    Ok(config)
}

/// Creates a Terraform Cloud client from the resolved credentials.
fn connect(timeout_secs: u64) -> Result<TfcClient> {
    let credentials = Credentials::load()?;
    debug!("Using {credentials:?}");
    TfcClient::with_address(&credentials.address, &credentials.token, timeout_secs)
}

/// Writes command output to stdout.
fn emit(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}
