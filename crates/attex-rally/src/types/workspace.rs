//! Workspace and project records.

use serde::Deserialize;

/// A Rally workspace: the top-level container for projects and artifacts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Workspace {
    /// Object ref, used to scope downstream queries.
    #[serde(rename = "_ref")]
    pub ref_url: String,
    /// Display name.
    pub name: String,
    /// Lifecycle state, `Open` or `Closed`.
    #[serde(default)]
    pub state: Option<String>,
}

impl Workspace {
    /// Whether the workspace is closed and should not be scanned.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.as_deref() == Some("Closed")
    }
}

/// A Rally project. Consumed only in aggregate (open-project counts).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    /// Display name.
    pub name: String,
    /// Lifecycle state, `Open` or `Closed`.
    #[serde(default)]
    pub state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_workspace_deserialize() {
        let json = r#"{
            "_ref": "https://rally.example.com/slm/webservice/v2.0/workspace/123",
            "_refObjectName": "Engineering",
            "Name": "Engineering",
            "State": "Open"
        }"#;
        let workspace: Workspace = serde_json::from_str(json).unwrap();
        assert_eq!(workspace.name, "Engineering");
        assert_eq!(workspace.state.as_deref(), Some("Open"));
        assert!(!workspace.is_closed());
    }

    #[test]
    fn test_workspace_closed() {
        let json = r#"{"_ref": "x", "Name": "Old", "State": "Closed"}"#;
        let workspace: Workspace = serde_json::from_str(json).unwrap();
        assert!(workspace.is_closed());
    }

    #[test]
    fn test_workspace_missing_state_is_not_closed() {
        let json = r#"{"_ref": "x", "Name": "Odd"}"#;
        let workspace: Workspace = serde_json::from_str(json).unwrap();
        assert!(!workspace.is_closed());
    }
}
