//! Download and upload reconciliation between the working directory and
//! the content server.
//!
//! Decisions are made per item from three inputs: the local file, the
//! server's record, and the timestamp cached at the last successful sync.
//! The cache is owned by the caller and passed in explicitly so it can be
//! persisted at the checkpoints between passes.

mod confirm;
mod download;
mod report;
mod upload;

#[cfg(test)]
mod testing;

pub use confirm::{AlwaysConfirm, Confirm};
pub use download::TEMPLATE_KEYS;
pub use report::{
    GroupReport, GroupStatus, ItemFailure, ItemOutcome, ItemReport, PullReport, PushOutcome,
    PushReport, QueuedPage,
};

use crate::codec::{MarkupCompiler, TemplateCompiler};
use crate::remote::{ContentService, RemoteError};
use crate::store::{LocalStore, StoreError};

/// Reason shown when the server copy changed since the last sync.
pub const REASON_REMOTE_MODIFIED: &str = "has been modified on server";

/// Reason shown when a never-synced local file differs from the server.
pub const REASON_LOCAL_DIFFERS: &str = "exists locally with different content";

/// Reason shown when an upload would replace newer server content.
pub const REASON_UPLOAD_CONFLICT: &str = "has been modified on server since last download";

/// Runs sync passes against one working directory and one server.
pub struct SyncEngine<'a, S: ContentService> {
    store: &'a LocalStore,
    service: &'a S,
    confirm: &'a mut dyn Confirm,
    compiler: Box<dyn TemplateCompiler>,
    force: bool,
}

impl<'a, S: ContentService> SyncEngine<'a, S> {
    pub fn new(store: &'a LocalStore, service: &'a S, confirm: &'a mut dyn Confirm) -> Self {
        Self {
            store,
            service,
            confirm,
            compiler: Box::new(MarkupCompiler),
            force: false,
        }
    }

    /// Skips every confirmation and treats the answer as yes.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_compiler(mut self, compiler: Box<dyn TemplateCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    fn allow_overwrite(&mut self, path: &str, reason: &str) -> bool {
        self.force || self.confirm.confirm_overwrite(path, reason)
    }

    fn allow_upload(&mut self, path: &str, reason: &str) -> bool {
        self.force || self.confirm.confirm_upload(path, reason)
    }
}

/// Errors that abort a sync pass.
#[derive(Debug)]
pub enum SyncError {
    /// Working directory could not be read or written
    Store(StoreError),
    /// Server could not be reached or returned an error status
    Remote(RemoteError),
    /// Server answered with `success: false`
    Rejected(String),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Store(e) => write!(f, "{}", e),
            SyncError::Remote(e) => write!(f, "{}", e),
            SyncError::Rejected(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Store(e) => Some(e),
            SyncError::Remote(e) => Some(e),
            SyncError::Rejected(_) => None,
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        SyncError::Store(e)
    }
}

impl From<RemoteError> for SyncError {
    fn from(e: RemoteError) -> Self {
        SyncError::Remote(e)
    }
}

fn rejection(context: &str, message: Option<String>) -> SyncError {
    SyncError::Rejected(format!(
        "{}: {}",
        context,
        message.unwrap_or_else(|| "Unknown error".to_string())
    ))
}
