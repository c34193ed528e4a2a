//! Run totals and the final report.

use std::collections::BTreeMap;

use crate::runner::WorkspaceOutcome;

/// Accumulated totals across all visited workspaces.
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// Attachments exported (or, in a dry run, counted).
    pub attachments: u64,
    /// Sum of declared attachment sizes. This is the record's reported
    /// `Size` field, not bytes written; stale metadata makes the two
    /// diverge.
    pub total_bytes: u64,
    /// Orphaned attachments encountered.
    pub orphaned: u64,
    /// Per-workspace outcome counters.
    pub workspaces: WorkspaceCounts,
    /// Data-file extension histogram, keyed lowercase.
    extensions: BTreeMap<String, u64>,
}

/// Per-workspace outcome counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkspaceCounts {
    /// Workspaces whose attachments were exported.
    pub processed: u64,
    /// Workspaces skipped for being closed.
    pub skipped_closed: u64,
    /// Workspaces skipped for having no open projects.
    pub skipped_no_open_projects: u64,
    /// Workspaces skipped for having no attachments.
    pub skipped_no_attachments: u64,
}

impl ExportSummary {
    /// Record one exported attachment.
    pub fn record_attachment(&mut self, size: u64, extension: &str) {
        self.attachments += 1;
        self.total_bytes += size;
        *self
            .extensions
            .entry(extension.to_ascii_lowercase())
            .or_insert(0) += 1;
    }

    /// Record an orphaned-attachment warning.
    pub fn record_orphan(&mut self) {
        self.orphaned += 1;
    }

    /// Record the outcome of one workspace visit.
    pub fn record_outcome(&mut self, outcome: WorkspaceOutcome) {
        let counts = &mut self.workspaces;
        match outcome {
            WorkspaceOutcome::Processed => counts.processed += 1,
            WorkspaceOutcome::SkippedClosed => counts.skipped_closed += 1,
            WorkspaceOutcome::SkippedNoOpenProjects => counts.skipped_no_open_projects += 1,
            WorkspaceOutcome::SkippedNoAttachments => counts.skipped_no_attachments += 1,
        }
    }

    /// Extension histogram entries, sorted by key.
    pub fn extensions(&self) -> impl Iterator<Item = (&str, u64)> {
        self.extensions.iter().map(|(ext, count)| (ext.as_str(), *count))
    }

    /// Total bytes with thousands separators, e.g. `1,234,567`.
    #[must_use]
    pub fn total_bytes_grouped(&self) -> String {
        group_thousands(self.total_bytes)
    }
}

/// Thousands-separated decimal rendering.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(12_345_678_901), "12,345,678,901");
    }

    #[test]
    fn test_extension_histogram_is_case_insensitive_and_sorted() {
        let mut summary = ExportSummary::default();
        summary.record_attachment(1, ".PNG");
        summary.record_attachment(2, ".png");
        summary.record_attachment(3, ".baz");
        summary.record_attachment(0, ".empty");

        let entries: Vec<(&str, u64)> = summary.extensions().collect();
        assert_eq!(
            entries,
            vec![(".baz", 1), (".empty", 1), (".png", 2)]
        );
        assert_eq!(summary.attachments, 4);
        assert_eq!(summary.total_bytes, 6);
    }

    #[test]
    fn test_record_outcomes() {
        let mut summary = ExportSummary::default();
        summary.record_outcome(WorkspaceOutcome::Processed);
        summary.record_outcome(WorkspaceOutcome::SkippedClosed);
        summary.record_outcome(WorkspaceOutcome::SkippedNoOpenProjects);
        summary.record_outcome(WorkspaceOutcome::SkippedNoAttachments);
        summary.record_outcome(WorkspaceOutcome::Processed);

        assert_eq!(summary.workspaces.processed, 2);
        assert_eq!(summary.workspaces.skipped_closed, 1);
        assert_eq!(summary.workspaces.skipped_no_open_projects, 1);
        assert_eq!(summary.workspaces.skipped_no_attachments, 1);
    }

    #[test]
    fn test_total_bytes_sums_declared_sizes() {
        let mut summary = ExportSummary::default();
        // Declared size, not written bytes, on purpose
        summary.record_attachment(1_000_000, ".png");
        summary.record_attachment(500, ".txt");
        assert_eq!(summary.total_bytes_grouped(), "1,000,500");
    }
}
