//! Attachment records and their parent linkage.

use serde::Deserialize;

/// An attachment record with the linkage and metadata fields the
/// exporter consumes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attachment {
    /// Object identifier.
    #[serde(rename = "ObjectID", default)]
    pub object_id: u64,
    /// File name as uploaded, extension included.
    pub name: String,
    /// Declared size in bytes. May be stale relative to the stored
    /// content.
    #[serde(default)]
    pub size: u64,
    /// MIME content type.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Creation timestamp (ISO 8601 text).
    #[serde(default)]
    pub creation_date: Option<String>,
    /// Last-update timestamp (ISO 8601 text).
    #[serde(default)]
    pub last_update_date: Option<String>,
    /// Work item this attachment hangs off, if any.
    #[serde(default)]
    pub artifact: Option<ArtifactRef>,
    /// Test execution this attachment hangs off, if any.
    #[serde(default)]
    pub test_case_result: Option<TestCaseResultRef>,
    /// Ref to the binary payload. Absent for empty attachments even
    /// when `size` is nonzero.
    #[serde(default)]
    pub content: Option<ContentRef>,
    /// Uploading user.
    #[serde(default)]
    pub user: Option<UserRef>,
}

/// Artifact fields fetched alongside the attachment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArtifactRef {
    /// Human-readable identifier, e.g. `US123`.
    #[serde(rename = "FormattedID")]
    pub formatted_id: String,
    #[serde(default)]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub last_update_date: Option<String>,
}

/// Test-case-result fields fetched alongside the attachment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestCaseResultRef {
    /// Execution date.
    #[serde(default)]
    pub date: Option<String>,
    /// Build label the result was recorded against.
    #[serde(default)]
    pub build: Option<String>,
    /// Test case the result belongs to.
    #[serde(default)]
    pub test_case: Option<TestCaseRef>,
    /// Test set grouping, when the run was part of one.
    #[serde(default)]
    pub test_set: Option<TestSetRef>,
}

/// Test case reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestCaseRef {
    /// Human-readable identifier, e.g. `TC42`.
    #[serde(rename = "FormattedID")]
    pub formatted_id: String,
}

/// Test set reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestSetRef {
    /// Human-readable identifier, e.g. `TS7`.
    #[serde(rename = "FormattedID")]
    pub formatted_id: String,
}

/// Uploading user reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserRef {
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Ref to an `AttachmentContent` object.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentRef {
    /// Absolute URL of the content object.
    #[serde(rename = "_ref")]
    pub ref_url: String,
}

/// What an attachment is linked to.
///
/// At most one link is populated; the artifact link wins if the service
/// ever returns both, so an attachment is never double-classified.
#[derive(Debug, Clone, Copy)]
pub enum Linkage<'a> {
    /// Linked to a work item.
    Artifact(&'a ArtifactRef),
    /// Linked to a test execution.
    TestCaseResult(&'a TestCaseResultRef),
    /// Linked to nothing.
    Orphaned,
}

impl Attachment {
    /// Classify the attachment's parent linkage.
    #[must_use]
    pub fn linkage(&self) -> Linkage<'_> {
        if let Some(artifact) = &self.artifact {
            Linkage::Artifact(artifact)
        } else if let Some(result) = &self.test_case_result {
            Linkage::TestCaseResult(result)
        } else {
            Linkage::Orphaned
        }
    }
}
