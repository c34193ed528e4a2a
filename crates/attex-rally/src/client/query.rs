//! Generic WSAPI query operation with lazy pagination.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::RallyClient;
use crate::error::RallyError;

/// Default page size for query results.
const DEFAULT_PAGE_SIZE: u32 = 200;

/// Default cap on the number of results walked.
const DEFAULT_LIMIT: u64 = 99_999;

/// A WSAPI query against one record type.
///
/// Mirrors the query options the service accepts; unset options are
/// omitted from the request, except the project-scope flags which are
/// always sent explicitly.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// Record type path segment, e.g. `attachment`, `project`.
    pub record_type: String,
    /// Comma-joined field list to fetch.
    pub fetch: String,
    /// Filter predicate, e.g. `(State = "Open")`.
    pub query: Option<String>,
    /// Workspace object ref to scope the query to.
    pub workspace: Option<String>,
    /// Project object ref to scope the query to.
    pub project: Option<String>,
    /// Include parent projects of the scoped project.
    pub project_scope_up: bool,
    /// Include child projects of the scoped project.
    pub project_scope_down: bool,
    /// Result ordering, e.g. `ObjectID asc`.
    pub order: Option<String>,
    /// Results per page.
    pub page_size: u32,
    /// Upper bound on results iterated.
    pub limit: u64,
}

impl QueryRequest {
    /// New query for a record type with library defaults.
    #[must_use]
    pub fn new(record_type: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            fetch: String::new(),
            query: None,
            workspace: None,
            project: None,
            project_scope_up: false,
            project_scope_down: false,
            order: None,
            page_size: DEFAULT_PAGE_SIZE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of the WSAPI `QueryResult` envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct QueryEnvelope<T> {
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    total_result_count: u64,
    #[serde(default)]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct QueryResponse<T> {
    #[serde(rename = "QueryResult")]
    query_result: QueryEnvelope<T>,
}

/// Lazily paginated query result.
///
/// The first page is fetched when the query is issued so the total
/// count is available before iteration; later pages are fetched on
/// demand. Forward-only; reissue the query to restart.
pub struct QueryResult<'a, T> {
    client: &'a RallyClient,
    request: QueryRequest,
    total_result_count: u64,
    page: std::vec::IntoIter<T>,
    next_start: u64,
    yielded: u64,
    failed: bool,
}

impl<T: DeserializeOwned> QueryResult<'_, T> {
    /// Total number of records matching the query, as reported by the
    /// service. Independent of how many pages have been walked.
    #[must_use]
    pub fn total_result_count(&self) -> u64 {
        self.total_result_count
    }

    fn cap(&self) -> u64 {
        self.request.limit.min(self.total_result_count)
    }
}

impl<T: DeserializeOwned> Iterator for QueryResult<'_, T> {
    type Item = Result<T, RallyError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.yielded >= self.cap() {
            return None;
        }

        if self.page.len() == 0 {
            if self.next_start > self.total_result_count {
                return None;
            }
            match self.client.fetch_page::<T>(&self.request, self.next_start) {
                Ok(envelope) => {
                    // The service promised more rows than it returned;
                    // stop rather than loop on an empty page.
                    if envelope.results.is_empty() {
                        return None;
                    }
                    self.next_start += envelope.results.len() as u64;
                    self.page = envelope.results.into_iter();
                }
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }

        let item = self.page.next()?;
        self.yielded += 1;
        Some(Ok(item))
    }
}

impl RallyClient {
    /// Run a query, fetching the first page eagerly.
    ///
    /// # Errors
    ///
    /// Returns an error when the page request fails or the envelope
    /// carries service-side errors.
    pub fn query<T: DeserializeOwned>(
        &self,
        request: QueryRequest,
    ) -> Result<QueryResult<'_, T>, RallyError> {
        let envelope = self.fetch_page::<T>(&request, 1)?;
        let total = envelope.total_result_count;
        debug!(record_type = %request.record_type, total, "query");

        Ok(QueryResult {
            client: self,
            request,
            total_result_count: total,
            next_start: 1 + envelope.results.len() as u64,
            page: envelope.results.into_iter(),
            yielded: 0,
            failed: false,
        })
    }

    fn fetch_page<T: DeserializeOwned>(
        &self,
        request: &QueryRequest,
        start: u64,
    ) -> Result<QueryEnvelope<T>, RallyError> {
        let url = format!("{}/{}", self.webservice_url(), request.record_type);
        let params = page_params(request, start);

        let response: QueryResponse<T> = self.get_json(&url, &params)?;
        let envelope = response.query_result;

        if !envelope.errors.is_empty() {
            return Err(RallyError::Query(envelope.errors));
        }
        for warning in &envelope.warnings {
            warn!(record_type = %request.record_type, "query warning: {warning}");
        }

        Ok(envelope)
    }
}

/// Query-string parameters for one page request. `start` is 1-based.
fn page_params(request: &QueryRequest, start: u64) -> Vec<(String, String)> {
    let mut params = vec![
        ("start".to_owned(), start.to_string()),
        ("pagesize".to_owned(), request.page_size.to_string()),
    ];
    if !request.fetch.is_empty() {
        params.push(("fetch".to_owned(), request.fetch.clone()));
    }
    if let Some(query) = &request.query {
        params.push(("query".to_owned(), query.clone()));
    }
    if let Some(workspace) = &request.workspace {
        params.push(("workspace".to_owned(), workspace.clone()));
    }
    if let Some(project) = &request.project {
        params.push(("project".to_owned(), project.clone()));
    }
    params.push((
        "projectScopeUp".to_owned(),
        request.project_scope_up.to_string(),
    ));
    params.push((
        "projectScopeDown".to_owned(),
        request.project_scope_down.to_string(),
    ));
    if let Some(order) = &request.order {
        params.push(("order".to_owned(), order.clone()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_page_params_minimal() {
        let request = QueryRequest::new("attachment");
        let params = page_params(&request, 1);

        assert_eq!(param(&params, "start"), Some("1"));
        assert_eq!(param(&params, "pagesize"), Some("200"));
        assert_eq!(param(&params, "projectScopeUp"), Some("false"));
        assert_eq!(param(&params, "projectScopeDown"), Some("false"));
        assert_eq!(param(&params, "query"), None);
        assert_eq!(param(&params, "fetch"), None);
    }

    #[test]
    fn test_page_params_full() {
        let mut request = QueryRequest::new("project");
        request.fetch = "Name".to_owned();
        request.query = Some(r#"(State = "Open")"#.to_owned());
        request.workspace = Some("https://rally.example.com/slm/webservice/v2.0/workspace/1".to_owned());
        request.project_scope_up = true;
        request.project_scope_down = true;
        request.order = Some("ObjectID asc".to_owned());

        let params = page_params(&request, 201);

        assert_eq!(param(&params, "start"), Some("201"));
        assert_eq!(param(&params, "fetch"), Some("Name"));
        assert_eq!(param(&params, "query"), Some(r#"(State = "Open")"#));
        assert_eq!(param(&params, "projectScopeUp"), Some("true"));
        assert_eq!(param(&params, "projectScopeDown"), Some("true"));
        assert_eq!(param(&params, "order"), Some("ObjectID asc"));
    }

    #[test]
    fn test_envelope_deserialize() {
        let json = r#"{
            "QueryResult": {
                "Errors": [],
                "Warnings": ["Please update your client"],
                "TotalResultCount": 3,
                "StartIndex": 1,
                "PageSize": 200,
                "Results": [{"Name": "A", "State": "Open"}]
            }
        }"#;
        let response: QueryResponse<crate::types::Project> = serde_json::from_str(json).unwrap();
        let envelope = response.query_result;

        assert_eq!(envelope.total_result_count, 3);
        assert_eq!(envelope.warnings.len(), 1);
        assert_eq!(envelope.results.len(), 1);
        assert_eq!(envelope.results[0].name, "A");
    }

    #[test]
    fn test_envelope_with_errors() {
        let json = r#"{
            "QueryResult": {
                "Errors": ["Not authorized"],
                "Warnings": [],
                "TotalResultCount": 0,
                "Results": []
            }
        }"#;
        let response: QueryResponse<crate::types::Project> = serde_json::from_str(json).unwrap();
        assert_eq!(response.query_result.errors, vec!["Not authorized"]);
    }
}
