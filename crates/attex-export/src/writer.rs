//! Metadata and data file writing.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use attex_rally::Attachment;

use crate::error::ExportError;

/// Placeholder for fields the record does not carry.
const NA: &str = "(n/a)";

/// Column the metadata values start at.
const KEY_WIDTH: usize = 47;

/// Create a directory that must not already exist.
///
/// Used for the export root and per-workspace directories, so a prior
/// run's output is never silently merged into this one.
///
/// # Errors
///
/// Returns [`ExportError::DirectoryExists`] when the path is already
/// present, [`ExportError::DirectoryCreate`] when creation fails.
pub(crate) fn create_new_dir(path: &Path) -> Result<(), ExportError> {
    if path.exists() {
        return Err(ExportError::DirectoryExists(path.to_path_buf()));
    }
    fs::create_dir_all(path).map_err(|source| ExportError::DirectoryCreate {
        path: path.to_path_buf(),
        source,
    })
}

/// Create a directory if missing. Reuse is fine; many attachments
/// share one artifact directory.
///
/// # Errors
///
/// Returns [`ExportError::DirectoryCreate`] when creation fails.
pub(crate) fn ensure_dir(path: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(path).map_err(|source| ExportError::DirectoryCreate {
        path: path.to_path_buf(),
        source,
    })
}

/// File extension for the data file, leading dot included.
///
/// Derived from the last dot-delimited segment of the attachment name;
/// a dotless name yields the whole name as the extension. Attachments
/// with no stored content get `.empty` regardless of name.
#[must_use]
pub fn data_extension(name: &str, has_content: bool) -> String {
    if !has_content {
        return ".empty".to_owned();
    }
    let last = name
        .rsplit('.')
        .find(|segment| !segment.is_empty())
        .unwrap_or(name);
    format!(".{last}")
}

/// Fixed key-value metadata block for one attachment.
///
/// Thirteen lines, keys padded so the values align, `(n/a)` wherever a
/// field is unavailable.
#[must_use]
pub fn render_metadata(attachment: &Attachment) -> String {
    let artifact = attachment.artifact.as_ref();
    let result = attachment.test_case_result.as_ref();
    let user = attachment.user.as_ref();
    let size = attachment.size.to_string();

    let fields: [(&str, Option<&str>); 13] = [
        (
            "Attachment.Artifact.FormattedID",
            artifact.map(|a| a.formatted_id.as_str()),
        ),
        (
            "Attachment.Artifact.CreationDate",
            artifact.and_then(|a| a.creation_date.as_deref()),
        ),
        (
            "Attachment.Artifact.LastUpdateDate",
            artifact.and_then(|a| a.last_update_date.as_deref()),
        ),
        (
            "Attachment.TestCaseResult.Date",
            result.and_then(|r| r.date.as_deref()),
        ),
        (
            "Attachment.TestCaseResult.Build",
            result.and_then(|r| r.build.as_deref()),
        ),
        (
            "Attachment.TestCaseResult.TestCase.FormattedID",
            result
                .and_then(|r| r.test_case.as_ref())
                .map(|tc| tc.formatted_id.as_str()),
        ),
        (
            "Attachment.TestCaseResult.TestSet.FormattedID",
            result
                .and_then(|r| r.test_set.as_ref())
                .map(|ts| ts.formatted_id.as_str()),
        ),
        ("Attachment.ContentType", attachment.content_type.as_deref()),
        ("Attachment.Description", attachment.description.as_deref()),
        ("Attachment.Name", Some(attachment.name.as_str())),
        ("Attachment.Size", Some(size.as_str())),
        (
            "Attachment.User.EmailAddress",
            user.and_then(|u| u.email_address.as_deref()),
        ),
        (
            "Attachment.User.DisplayName",
            user.and_then(|u| u.display_name.as_deref()),
        ),
    ];

    let mut out = String::new();
    for (key, value) in fields {
        let _ = writeln!(out, "{key:<KEY_WIDTH$}: {}", value.unwrap_or(NA));
    }
    out
}

/// Write the metadata file for an attachment. `ordinal` is the 1-based
/// attachment number within its workspace.
///
/// # Errors
///
/// Returns [`ExportError::Write`] when the file cannot be written.
pub(crate) fn write_metadata(
    dir: &Path,
    ordinal: usize,
    attachment: &Attachment,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("attachment-{ordinal:03}.META.txt"));
    fs::write(&path, render_metadata(attachment)).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Write the data file for an attachment. `content` is `None` when the
/// attachment has no stored payload; the placeholder file is created
/// empty.
///
/// # Errors
///
/// Returns [`ExportError::Write`] when the file cannot be written.
pub(crate) fn write_data(
    dir: &Path,
    ordinal: usize,
    extension: &str,
    content: Option<&[u8]>,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("attachment-{ordinal:03}.DATA{extension}"));
    fs::write(&path, content.unwrap_or_default()).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
