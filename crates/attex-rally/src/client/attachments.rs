//! Attachment operations: enumeration and content download.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use serde::Deserialize;
use tracing::debug;

use super::{QueryRequest, QueryResult, RallyClient};
use crate::error::RallyError;
use crate::types::{Attachment, ContentRef, Workspace};

/// Every attachment field the exporter consumes, including the nested
/// artifact / test-case-result / user fields.
const ATTACHMENT_FETCH: &str = "Artifact,Build,Content,ContentType,CreationDate,Date,\
                                Description,DisplayName,EmailAddress,FormattedID,\
                                LastUpdateDate,Name,ObjectID,Size,TestCase,TestCaseResult,\
                                TestSet,User";

/// Wire shape of an `AttachmentContent` read.
#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(rename = "AttachmentContent")]
    attachment_content: ContentBody,
}

#[derive(Debug, Deserialize)]
struct ContentBody {
    #[serde(rename = "Content", default)]
    content: String,
}

impl RallyClient {
    /// Enumerate every attachment in a workspace.
    ///
    /// Iteration order is whatever the service returns; callers that
    /// number output files by ordinal inherit that nondeterminism.
    ///
    /// # Errors
    ///
    /// Returns an error when the first page request fails.
    pub fn workspace_attachments(
        &self,
        workspace: &Workspace,
        page_size: u32,
    ) -> Result<QueryResult<'_, Attachment>, RallyError> {
        let mut request = QueryRequest::new("attachment");
        request.fetch = ATTACHMENT_FETCH.to_owned();
        request.workspace = Some(workspace.ref_url.clone());
        request.page_size = page_size;
        self.query(request)
    }

    /// Download and decode the binary payload behind an attachment's
    /// content ref.
    ///
    /// The WSAPI serves attachment bodies as base64 text on the
    /// `AttachmentContent` object; the payload may be line-wrapped, so
    /// whitespace is stripped before decoding.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or invalid base64.
    pub fn attachment_content(&self, content: &ContentRef) -> Result<Vec<u8>, RallyError> {
        let response: ContentResponse = self.get_json(&content.ref_url, &[])?;
        let bytes = decode_content(&response.attachment_content.content)?;
        debug!(bytes = bytes.len(), "fetched attachment content");
        Ok(bytes)
    }
}

/// Decode a base64 payload, tolerating line wrapping.
fn decode_content(text: &str) -> Result<Vec<u8>, RallyError> {
    let compact: String = text.split_whitespace().collect();
    Ok(BASE64_STANDARD.decode(compact)?)
}
