//! Project activity queries.

use super::{QueryRequest, RallyClient};
use crate::error::RallyError;
use crate::types::{Project, Workspace};

impl RallyClient {
    /// Count open projects in a workspace, scoped both up and down the
    /// project hierarchy. Only the total is fetched; no project records
    /// are walked.
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails. Callers deciding whether
    /// a workspace is worth scanning typically treat that as a count of
    /// zero rather than aborting the run.
    pub fn open_project_count(&self, workspace: &Workspace) -> Result<u64, RallyError> {
        let mut request = QueryRequest::new("project");
        request.fetch = "Name".to_owned();
        request.query = Some(r#"(State = "Open")"#.to_owned());
        request.workspace = Some(workspace.ref_url.clone());
        request.project_scope_up = true;
        request.project_scope_down = true;

        let result = self.query::<Project>(request)?;
        Ok(result.total_result_count())
    }
}
