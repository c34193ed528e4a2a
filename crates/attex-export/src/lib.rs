//! Attachment export engine.
//!
//! Classifies attachments into an output directory tree keyed by their
//! parent record, writes a metadata/data file pair per attachment, and
//! accumulates the run summary. The run itself is strictly sequential:
//! one workspace, one attachment, one file at a time.

mod classify;
mod error;
mod runner;
mod summary;
mod writer;

pub use classify::{Classified, classify, workspace_dir_name};
pub use error::ExportError;
pub use runner::{ExportOptions, ExportRun, WorkspaceOutcome};
pub use summary::{ExportSummary, WorkspaceCounts};
pub use writer::{data_extension, render_metadata};
