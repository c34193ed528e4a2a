//! The sequential export run.
//!
//! One workspace at a time, one attachment at a time, one file at a
//! time. The only mutable state is the run summary; every network and
//! filesystem call blocks until it completes.

use std::path::PathBuf;

use attex_rally::{Attachment, RallyClient, Workspace};
use tracing::{info, warn};

use crate::classify::{classify, workspace_dir_name};
use crate::error::ExportError;
use crate::summary::ExportSummary;
use crate::writer;

/// Outcome of visiting one workspace. Each workspace is visited exactly
/// once; there are no backward transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceOutcome {
    /// Workspace state was `Closed`; nothing was queried.
    SkippedClosed,
    /// No open projects, so the attachment query never ran.
    SkippedNoOpenProjects,
    /// The attachment query returned zero records; no directory was
    /// created.
    SkippedNoAttachments,
    /// Attachments were exported.
    Processed,
}

/// Options for an export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Root directory the export tree is created under. Must not
    /// already exist.
    pub output_dir: PathBuf,
    /// Object ID of the workspace to export.
    pub workspace: String,
    /// Attachment query page size.
    pub page_size: u32,
    /// Classify and count without writing anything.
    pub dry_run: bool,
}

/// A one-shot export over every workspace the resolver yields.
pub struct ExportRun<'a> {
    client: &'a RallyClient,
    options: ExportOptions,
    summary: ExportSummary,
}

impl<'a> ExportRun<'a> {
    /// Set up a run against an established session.
    #[must_use]
    pub fn new(client: &'a RallyClient, options: ExportOptions) -> Self {
        Self {
            client,
            options,
            summary: ExportSummary::default(),
        }
    }

    /// Run the export and return the accumulated summary.
    ///
    /// # Errors
    ///
    /// Fatal conditions abort the run: the workspace not resolving, a
    /// pre-existing export root, directory creation or file write
    /// failures, and attachment query/content errors. A failing
    /// open-project count is soft and only skips its workspace.
    pub fn run(mut self) -> Result<ExportSummary, ExportError> {
        let client = self.client;
        let workspaces = client.find_workspaces(&self.options.workspace)?;
        let total = workspaces.total_result_count();
        if total == 0 {
            return Err(ExportError::WorkspaceNotFound(self.options.workspace.clone()));
        }

        if self.options.dry_run {
            info!("dry run: skipping all directory and file writes");
        } else {
            info!("creating export root {}", self.options.output_dir.display());
            writer::create_new_dir(&self.options.output_dir)?;
        }

        for (index, workspace) in workspaces.enumerate() {
            let workspace = workspace?;
            let outcome = self.visit_workspace(&workspace, index + 1, total)?;
            self.summary.record_outcome(outcome);
        }

        Ok(self.summary)
    }

    /// Visit one workspace, exporting its attachments unless a skip
    /// condition applies.
    fn visit_workspace(
        &mut self,
        workspace: &Workspace,
        ordinal: usize,
        total: u64,
    ) -> Result<WorkspaceOutcome, ExportError> {
        let client = self.client;
        info!(
            "workspace [{ordinal:03} of {total:03}] name={} state={}",
            workspace.name,
            workspace.state.as_deref().unwrap_or("(unknown)")
        );

        if workspace.is_closed() {
            info!("skipping {}: closed", workspace.name);
            return Ok(WorkspaceOutcome::SkippedClosed);
        }

        // A failing count is treated as zero so one broken workspace
        // cannot abort the whole run.
        let open_projects = match client.open_project_count(workspace) {
            Ok(count) => count,
            Err(err) => {
                warn!("open-project count failed for {}: {err}", workspace.name);
                0
            }
        };
        if open_projects < 1 {
            info!("skipping {}: no open projects", workspace.name);
            return Ok(WorkspaceOutcome::SkippedNoOpenProjects);
        }

        let attachments = client.workspace_attachments(workspace, self.options.page_size)?;
        let attachment_total = attachments.total_result_count();
        info!(
            "workspace {} has {attachment_total} attachments",
            workspace.name
        );
        if attachment_total < 1 {
            return Ok(WorkspaceOutcome::SkippedNoAttachments);
        }

        if !self.options.dry_run {
            let workspace_dir = self.options.output_dir.join(workspace_dir_name(ordinal));
            writer::create_new_dir(&workspace_dir)?;
        }

        for (index, attachment) in attachments.enumerate() {
            let attachment = attachment?;
            self.export_attachment(&attachment, ordinal, index + 1)?;
        }

        Ok(WorkspaceOutcome::Processed)
    }

    /// Export one attachment: classify, create its directory, write the
    /// metadata/data pair, record totals.
    fn export_attachment(
        &mut self,
        attachment: &Attachment,
        workspace_ordinal: usize,
        ordinal: usize,
    ) -> Result<(), ExportError> {
        info!(
            "{:>5} - attachment [{ordinal:03}] name={} size={}",
            self.summary.attachments + 1,
            attachment.name,
            attachment.size
        );

        let classified = classify(attachment, workspace_ordinal);
        if classified.orphaned {
            warn!(
                "orphaned attachment {} (no artifact or test case result)",
                attachment.name
            );
            self.summary.record_orphan();
        }

        let extension = writer::data_extension(&attachment.name, attachment.content.is_some());

        if !self.options.dry_run {
            let dir = self.options.output_dir.join(&classified.dir);
            writer::ensure_dir(&dir)?;
            writer::write_metadata(&dir, ordinal, attachment)?;

            let content = match &attachment.content {
                Some(content_ref) => Some(self.client.attachment_content(content_ref)?),
                None => None,
            };
            writer::write_data(&dir, ordinal, &extension, content.as_deref())?;
        }

        self.summary.record_attachment(attachment.size, &extension);
        Ok(())
    }
}
