//! Workspace resolution.

use super::{QueryRequest, QueryResult, RallyClient};
use crate::error::RallyError;
use crate::types::Workspace;

impl RallyClient {
    /// Resolve the workspace behind an OID.
    ///
    /// Issues a reference query scoped to the OID's object ref, so the
    /// result is a single-element set; callers iterate it like any
    /// other query result.
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails. No workspace means no
    /// export is possible, so callers treat an empty result as fatal.
    pub fn find_workspaces(&self, oid: &str) -> Result<QueryResult<'_, Workspace>, RallyError> {
        let mut request = QueryRequest::new("workspace");
        request.fetch = "Name,State".to_owned();
        request.workspace = Some(self.workspace_ref(oid));
        self.query(request)
    }
}
