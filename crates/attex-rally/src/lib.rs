//! Synchronous Rally Web Services API client.
//!
//! Speaks the JSON query API: one authenticated [`ureq`] agent per
//! session, generic paginated queries over record types, and attachment
//! content download (base64 on the wire, raw bytes out).

mod client;
mod error;
mod types;

pub use client::{Credentials, Integration, QueryRequest, QueryResult, RallyClient};
pub use error::RallyError;
pub use types::{
    ArtifactRef, Attachment, ContentRef, Linkage, Project, TestCaseRef, TestCaseResultRef,
    TestSetRef, UserRef, Workspace,
};
