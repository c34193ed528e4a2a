//! Error types for the export engine.

use std::path::PathBuf;

use attex_rally::RallyError;

/// Error from an export run. All variants except `Rally` map to the
/// fatal filesystem conditions of the run; soft failures (project
/// counts) never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The export directory is left over from a prior run.
    #[error("export directory already exists: {}", .0.display())]
    DirectoryExists(PathBuf),

    /// A directory could not be created.
    #[error("could not create directory {}: {}", .path.display(), .source)]
    DirectoryCreate {
        /// Directory that failed to create.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A metadata or data file could not be written.
    #[error("could not write {}: {}", .path.display(), .source)]
    Write {
        /// File that failed to write.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configured workspace does not exist or is not visible.
    #[error("workspace {0} not found")]
    WorkspaceNotFound(String),

    /// Rally API error.
    #[error(transparent)]
    Rally(#[from] RallyError),
}
