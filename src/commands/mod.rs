mod config_cmd;
mod download;
mod init;
mod upload;

pub use config_cmd::ConfigCommand;
pub use download::DownloadCommand;
pub use init::InitCommand;
pub use upload::UploadCommand;

use std::path::Path;

use cyber_elx_core::{CacheError, GroupReport, GroupStatus, PullReport, SyncCache, SyncError};

use crate::config::ConfigError;
use crate::devdoc;

/// Errors from sync commands
#[derive(Debug)]
pub enum CommandError {
    ConfigError(ConfigError),
    SyncError(SyncError),
    CacheError(CacheError),
    IoError(std::io::Error),
    RuntimeError(String),
    InvalidInput(&'static str),
    /// Some pages could not be written; the rest of the run completed.
    PagesFailed(usize),
    /// Some groups could not be synchronized; the rest of the run completed.
    GroupsFailed(usize),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::ConfigError(e) => write!(f, "{}", e),
            CommandError::SyncError(e) => write!(f, "{}", e),
            CommandError::CacheError(e) => write!(f, "{}", e),
            CommandError::IoError(e) => write!(f, "I/O error: {}", e),
            CommandError::RuntimeError(e) => write!(f, "Runtime error: {}", e),
            CommandError::InvalidInput(msg) => write!(f, "{}", msg),
            CommandError::PagesFailed(count) => write!(
                f,
                "{} page{} could not be downloaded",
                count,
                if *count == 1 { "" } else { "s" }
            ),
            CommandError::GroupsFailed(count) => write!(
                f,
                "{} SPA folder{} could not be synchronized",
                count,
                if *count == 1 { "" } else { "s" }
            ),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::ConfigError(e) => Some(e),
            CommandError::SyncError(e) => Some(e),
            CommandError::CacheError(e) => Some(e),
            CommandError::IoError(e) => Some(e),
            CommandError::RuntimeError(_)
            | CommandError::InvalidInput(_)
            | CommandError::PagesFailed(_)
            | CommandError::GroupsFailed(_) => None,
        }
    }
}

impl From<ConfigError> for CommandError {
    fn from(e: ConfigError) -> Self {
        CommandError::ConfigError(e)
    }
}

impl From<SyncError> for CommandError {
    fn from(e: SyncError) -> Self {
        CommandError::SyncError(e)
    }
}

impl From<CacheError> for CommandError {
    fn from(e: CacheError) -> Self {
        CommandError::CacheError(e)
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        CommandError::IoError(e)
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, CommandError> {
    tokio::runtime::Runtime::new().map_err(|e| CommandError::RuntimeError(e.to_string()))
}

/// Brings `DEV_DOC/` up to date with the bundled docs.
fn refresh_dev_docs(workdir: &Path) -> Result<(), CommandError> {
    for name in devdoc::refresh(workdir)? {
        println!("{}/{} was updated", devdoc::DEV_DOC_DIR, name);
    }
    Ok(())
}

fn save_cache(cache: &SyncCache, workdir: &Path) -> Result<(), CommandError> {
    cache.save(&SyncCache::path_in(workdir))?;
    Ok(())
}

fn page_failures(report: &PullReport) -> Result<(), CommandError> {
    if !report.failed.is_empty() {
        return Err(CommandError::PagesFailed(report.failed.len()));
    }
    Ok(())
}

fn group_failures(reports: &[GroupReport]) -> Result<(), CommandError> {
    let failed = reports.iter().filter(|r| r.is_failure()).count();
    if failed > 0 {
        return Err(CommandError::GroupsFailed(failed));
    }
    Ok(())
}

fn print_skipped_group(report: &GroupReport) {
    if report.status == GroupStatus::Skipped {
        println!("  ⊘ {} (skipped)", report.group.folder());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyber_elx_core::{ItemFailure, SpaGroup};

    #[test]
    fn test_page_failures_set_exit_error() {
        let mut report = PullReport::default();
        assert!(page_failures(&report).is_ok());

        report.failed.push(ItemFailure {
            path: "sections/blog/post.liquid".to_string(),
            message: "'blog/post' cannot be used as a page file name".to_string(),
        });
        let err = page_failures(&report).unwrap_err();
        assert_eq!(err.to_string(), "1 page could not be downloaded");
    }

    #[test]
    fn test_group_failures_counts_failed_groups() {
        let reports: Vec<GroupReport> = SpaGroup::ALL
            .into_iter()
            .enumerate()
            .map(|(i, group)| GroupReport {
                group,
                status: if i == 0 {
                    GroupStatus::Synced(Vec::new())
                } else {
                    GroupStatus::Failed("offline".to_string())
                },
            })
            .collect();
        let failed = SpaGroup::ALL.len() - 1;
        match group_failures(&reports) {
            Err(CommandError::GroupsFailed(count)) => assert_eq!(count, failed),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
