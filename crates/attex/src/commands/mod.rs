//! CLI command implementations.

mod export;

pub(crate) use export::ExportArgs;
