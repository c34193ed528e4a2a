//! `attex export` command implementation.

use std::path::PathBuf;

use attex_config::{CliSettings, Config, RallyConfig};
use attex_export::{ExportOptions, ExportRun, ExportSummary};
use attex_rally::{Credentials, Integration, RallyClient};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Directory to create the export tree under (must not exist).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Workspace object ID to export (overrides config).
    #[arg(short, long)]
    workspace: Option<String>,

    /// WSAPI version string (overrides config).
    #[arg(long)]
    api_version: Option<String>,

    /// Classify and count attachments without writing any files.
    #[arg(long)]
    dry_run: bool,

    /// Path to configuration file (default: auto-discover attex.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose progress logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, connection, or the export
    /// itself fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            output_dir: self.output_dir.clone(),
            workspace: self.workspace.clone(),
            api_version: self.api_version.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let rally = require_rally_config(&config, &output)?;

        output.info(&format!(
            "Connecting to {} as {}...",
            rally.base_url,
            identity(rally)
        ));
        let client = create_client(rally)?;
        output.success("Connected.");

        if self.dry_run {
            output.warning("[dry run] no directories or files will be written");
        }

        let options = ExportOptions {
            output_dir: config.export.output_dir.clone(),
            workspace: rally.workspace.clone(),
            page_size: config.export.page_size,
            dry_run: self.dry_run,
        };
        let summary = ExportRun::new(&client, options).run()?;

        print_summary(&output, &summary);
        Ok(())
    }
}

/// How the session identifies itself in the connection banner.
fn identity(rally: &RallyConfig) -> &str {
    if rally.api_key.is_some() {
        "(api key)"
    } else {
        &rally.username
    }
}

fn require_rally_config<'a>(
    config: &'a Config,
    output: &Output,
) -> Result<&'a RallyConfig, CliError> {
    config.require_rally().map_err(|err| {
        output.error("Error: rally configuration required in attex.toml");
        output.info("\nAdd the following to your attex.toml:");
        output.info("\n[rally]");
        output.info(r#"base_url = "https://rally1.rallydev.com""#);
        output.info(r#"username = "user@example.com""#);
        output.info(r#"password = "${RALLY_PASSWORD}""#);
        output.info(r#"workspace = "12345678910""#);
        err.into()
    })
}

fn create_client(rally: &RallyConfig) -> Result<RallyClient, CliError> {
    let credentials = match &rally.api_key {
        Some(key) => Credentials::ApiKey(key.clone()),
        None => Credentials::Basic {
            username: rally.username.clone(),
            password: rally.password.clone(),
        },
    };
    let client = RallyClient::connect(
        &rally.base_url,
        credentials,
        &rally.api_version,
        Integration::default(),
    )?;
    Ok(client)
}

fn print_summary(output: &Output, summary: &ExportSummary) {
    output.heading("\nExport complete.");
    output.success(&format!(
        "Found a total of {} attachments in all workspaces; total bytes = {}.",
        summary.attachments,
        summary.total_bytes_grouped()
    ));

    if summary.orphaned > 0 {
        output.warning(&format!("Orphaned attachments: {}", summary.orphaned));
    }

    let counts = &summary.workspaces;
    output.info(&format!(
        "Workspaces: {} processed, {} skipped closed, {} skipped without open projects, {} skipped without attachments",
        counts.processed,
        counts.skipped_closed,
        counts.skipped_no_open_projects,
        counts.skipped_no_attachments
    ));

    for (extension, count) in summary.extensions() {
        output.info(&format!("  {extension}: {count}"));
    }
}
