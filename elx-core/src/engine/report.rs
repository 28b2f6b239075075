//! Results of download and upload passes.

use std::fmt;

use crate::models::SpaGroup;

/// What happened to a single page during a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Created,
    Updated,
    Skipped,
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemOutcome::Created => write!(f, "created"),
            ItemOutcome::Updated => write!(f, "updated"),
            ItemOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    /// Path relative to the working directory.
    pub path: String,
    pub outcome: ItemOutcome,
}

/// A page that could not be written; the rest of the pass went on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub path: String,
    pub message: String,
}

/// Result of downloading pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullReport {
    /// Default pages written, as relative paths.
    pub defaults: Vec<String>,
    pub items: Vec<ItemReport>,
    pub failed: Vec<ItemFailure>,
}

impl PullReport {
    pub fn downloaded(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.outcome != ItemOutcome::Skipped)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.items.len() - self.downloaded()
    }

    pub fn outcome_of(&self, path: &str) -> Option<ItemOutcome> {
        self.items.iter().find(|i| i.path == path).map(|i| i.outcome)
    }
}

/// A local page included in an upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedPage {
    pub path: String,
    pub empty: bool,
}

/// Result of a submitted page batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushReport {
    pub queued: Vec<QueuedPage>,
    pub skipped: Vec<String>,
    /// Pages the server confirmed, as relative paths.
    pub uploaded: Vec<String>,
    /// Keys of the confirmed pages.
    pub uploaded_keys: Vec<String>,
    pub debug: Option<serde_json::Value>,
}

/// Result of uploading pages.
#[derive(Debug, Clone, PartialEq)]
pub enum PushOutcome {
    /// No page files exist locally; nothing was fetched or sent.
    NoLocalPages,
    /// Every local page was excluded; nothing was sent.
    NoChanges { skipped: Vec<String> },
    Submitted(PushReport),
}

/// What happened to one SPA group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupStatus {
    /// Files written or sent, as paths relative to the working directory.
    Synced(Vec<String>),
    /// The user declined the conflict prompt.
    Skipped,
    /// No local files to upload.
    Empty,
    /// The group could not be synchronized; other groups were unaffected.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    pub group: SpaGroup,
    pub status: GroupStatus,
}

impl GroupReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, GroupStatus::Failed(_))
    }
}
