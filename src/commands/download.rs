//! Download pages and SPA folders from the server.

use std::path::Path;

use clap::Args;

use cyber_elx_core::{
    GroupStatus, HttpContentService, ItemOutcome, LocalStore, SyncCache, SyncEngine,
};

use super::{
    group_failures, page_failures, print_skipped_group, refresh_dev_docs, runtime, save_cache,
};
use super::CommandError;
use crate::config::{Config, Settings};
use crate::prompt::TerminalPrompt;

/// Download pages and SPA folders from the server
#[derive(Debug, Args)]
pub struct DownloadCommand {
    /// Overwrite local files without asking
    #[arg(long, short)]
    force: bool,
}

impl DownloadCommand {
    pub fn run(&self, config: &Config, workdir: &Path) -> Result<(), CommandError> {
        let settings = config.validate()?;
        refresh_dev_docs(workdir)?;

        let rt = runtime()?;
        rt.block_on(download(workdir, &settings, self.force))
    }
}

pub(super) async fn download(
    workdir: &Path,
    settings: &Settings,
    force: bool,
) -> Result<(), CommandError> {
    let store = LocalStore::new(workdir);
    let service = HttpContentService::new(&settings.url, &settings.token);
    let mut prompt = TerminalPrompt;
    let mut cache = SyncCache::load(&SyncCache::path_in(workdir));
    let mut engine = SyncEngine::new(&store, &service, &mut prompt).with_force(force);

    println!("Fetching pages from server...");
    let report = match engine.pull_pages(&mut cache).await {
        Ok(report) => report,
        Err(e) => {
            // pages written before the error keep their timestamps
            save_cache(&cache, workdir)?;
            return Err(e.into());
        }
    };

    println!("Downloading default pages (read-only)...");
    for path in &report.defaults {
        println!("  ✓ {}", path);
    }

    println!("\nDownloading custom pages...");
    for item in &report.items {
        match item.outcome {
            ItemOutcome::Skipped => println!("  ⊘ {} (skipped)", item.path),
            outcome => println!("  ✓ {} ({})", item.path, outcome),
        }
    }
    for failure in &report.failed {
        println!("  ✗ {}: {}", failure.path, failure.message);
    }

    save_cache(&cache, workdir)?;
    println!(
        "\nDownload complete: {} downloaded, {} skipped",
        report.downloaded(),
        report.skipped()
    );

    println!("\n--- SPA Folders ---");
    let groups = engine.pull_groups(&mut cache).await;
    for group in &groups {
        println!("\nDownloading {}...", group.group.folder());
        match &group.status {
            GroupStatus::Synced(files) => {
                for file in files {
                    println!("  ✓ {}", file);
                }
            }
            GroupStatus::Failed(e) => {
                println!("  ⚠ Could not download {}: {}", group.group.folder(), e)
            }
            GroupStatus::Skipped => print_skipped_group(group),
            GroupStatus::Empty => {}
        }
    }
    save_cache(&cache, workdir)?;

    page_failures(&report)?;
    group_failures(&groups)
}
