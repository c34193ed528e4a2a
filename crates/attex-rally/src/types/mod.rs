//! Typed views of WSAPI records.
//!
//! Only the fields the exporter consumes are declared; serde ignores
//! everything else the service sends back.

mod attachment;
mod workspace;

pub use attachment::{
    ArtifactRef, Attachment, ContentRef, Linkage, TestCaseRef, TestCaseResultRef, TestSetRef,
    UserRef,
};
pub use workspace::{Project, Workspace};
