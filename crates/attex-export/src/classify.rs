//! Output path classification.
//!
//! Every attachment lands in a subdirectory of its workspace directory
//! named after the parent record: the artifact's FormattedID, the test
//! case's FormattedID (with the test set's appended when present), or
//! the literal orphan directory when the attachment has no parent.

use std::path::PathBuf;

use attex_rally::{Attachment, Linkage};

/// Directory name for attachments with no parent record.
const ORPHAN_DIR: &str = "-Orphaned";

/// Directory name for a workspace ordinal (1-based).
#[must_use]
pub fn workspace_dir_name(ordinal: usize) -> String {
    format!("WS{ordinal:03}")
}

/// Where one attachment's files go, relative to the export root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    /// Directory path relative to the export root, e.g. `WS001/US123`.
    pub dir: PathBuf,
    /// True when the attachment had neither an artifact nor a test
    /// case result to classify by.
    pub orphaned: bool,
}

/// Derive the output directory for an attachment within a workspace.
///
/// The artifact and test-case-result branches are mutually exclusive;
/// an attachment is never double-classified.
#[must_use]
pub fn classify(attachment: &Attachment, workspace_ordinal: usize) -> Classified {
    let base = workspace_dir_name(workspace_ordinal);

    match attachment.linkage() {
        Linkage::Artifact(artifact) => Classified {
            dir: PathBuf::from(base).join(&artifact.formatted_id),
            orphaned: false,
        },
        Linkage::TestCaseResult(result) => match &result.test_case {
            Some(test_case) => {
                let mut name = test_case.formatted_id.clone();
                if let Some(test_set) = &result.test_set {
                    name.push('-');
                    name.push_str(&test_set.formatted_id);
                }
                Classified {
                    dir: PathBuf::from(base).join(name),
                    orphaned: false,
                }
            }
            // A result with no test case leaves nothing to name the
            // directory by.
            None => orphan(base),
        },
        Linkage::Orphaned => orphan(base),
    }
}

fn orphan(base: String) -> Classified {
    Classified {
        dir: PathBuf::from(base).join(ORPHAN_DIR),
        orphaned: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(json: &str) -> Attachment {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_workspace_dir_name_is_zero_padded() {
        assert_eq!(workspace_dir_name(1), "WS001");
        assert_eq!(workspace_dir_name(42), "WS042");
        assert_eq!(workspace_dir_name(1234), "WS1234");
    }

    #[test]
    fn test_artifact_classification() {
        let a = attachment(r#"{"Name": "a.png", "Artifact": {"FormattedID": "US123"}}"#);
        let classified = classify(&a, 1);
        assert_eq!(classified.dir, PathBuf::from("WS001/US123"));
        assert!(!classified.orphaned);
    }

    #[test]
    fn test_test_case_classification_without_test_set() {
        let a = attachment(
            r#"{"Name": "a.log", "TestCaseResult": {"TestCase": {"FormattedID": "TC42"}}}"#,
        );
        let classified = classify(&a, 2);
        assert_eq!(classified.dir, PathBuf::from("WS002/TC42"));
        assert!(!classified.orphaned);
    }

    #[test]
    fn test_test_case_classification_with_test_set() {
        let a = attachment(
            r#"{
                "Name": "a.log",
                "TestCaseResult": {
                    "TestCase": {"FormattedID": "TC42"},
                    "TestSet": {"FormattedID": "TS7"}
                }
            }"#,
        );
        let classified = classify(&a, 1);
        assert_eq!(classified.dir, PathBuf::from("WS001/TC42-TS7"));
    }

    #[test]
    fn test_orphan_classification() {
        let a = attachment(r#"{"Name": "stray.bin"}"#);
        let classified = classify(&a, 3);
        assert_eq!(classified.dir, PathBuf::from("WS003/-Orphaned"));
        assert!(classified.orphaned);
    }

    #[test]
    fn test_result_without_test_case_is_orphaned() {
        let a = attachment(r#"{"Name": "a.log", "TestCaseResult": {"Build": "1.0"}}"#);
        let classified = classify(&a, 1);
        assert_eq!(classified.dir, PathBuf::from("WS001/-Orphaned"));
        assert!(classified.orphaned);
    }

    #[test]
    fn test_never_both_artifact_and_test_suffixes() {
        // Artifact linkage wins; the test-case id must not leak into
        // the path.
        let a = attachment(
            r#"{
                "Name": "both.txt",
                "Artifact": {"FormattedID": "DE9"},
                "TestCaseResult": {"TestCase": {"FormattedID": "TC1"}}
            }"#,
        );
        let classified = classify(&a, 1);
        assert_eq!(classified.dir, PathBuf::from("WS001/DE9"));
    }
}
