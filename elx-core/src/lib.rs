//! cyber-elx core library
//!
//! Two-way synchronization of theme pages and SPA component groups between
//! a local working directory and an el-x content server.

pub mod cache;
pub mod codec;
pub mod engine;
pub mod models;
pub mod remote;
pub mod store;

pub use cache::{CacheError, SyncCache, CACHE_FILE};
pub use codec::{
    CodecError, CompileError, CompiledTemplate, Component, MarkupCompiler, ParseError, Section,
    TemplateCompiler,
};
pub use engine::{
    AlwaysConfirm, Confirm, GroupReport, GroupStatus, ItemFailure, ItemOutcome, PullReport,
    PushOutcome, PushReport, SyncEngine, SyncError,
};
pub use models::{FileKind, Page, PageKey, PageType, SpaFile, SpaGroup, Timestamp};
pub use remote::{ContentService, HttpContentService, RemoteError};
pub use store::{LocalStore, StoreError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
