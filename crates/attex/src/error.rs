//! CLI error types.

use attex_config::ConfigError;
use attex_export::ExportError;
use attex_rally::RallyError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Rally(#[from] RallyError),

    #[error("{0}")]
    Export(#[from] ExportError),
}
