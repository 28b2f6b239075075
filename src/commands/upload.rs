//! Publish local pages and SPA folders.

use std::path::Path;

use clap::Args;

use cyber_elx_core::{
    GroupStatus, HttpContentService, LocalStore, PushOutcome, SyncCache, SyncEngine,
};

use super::{group_failures, print_skipped_group, refresh_dev_docs, runtime, save_cache};
use super::CommandError;
use crate::config::{Config, Settings};
use crate::prompt::TerminalPrompt;

/// Upload local pages and SPA folders to the server
#[derive(Debug, Args)]
pub struct UploadCommand {
    /// Upload without asking about server changes
    #[arg(long, short)]
    force: bool,
}

impl UploadCommand {
    pub fn run(&self, config: &Config, workdir: &Path) -> Result<(), CommandError> {
        let settings = config.validate()?;
        refresh_dev_docs(workdir)?;

        let rt = runtime()?;
        rt.block_on(self.upload(workdir, &settings))
    }

    async fn upload(&self, workdir: &Path, settings: &Settings) -> Result<(), CommandError> {
        let store = LocalStore::new(workdir);
        let service = HttpContentService::new(&settings.url, &settings.token);
        let mut prompt = TerminalPrompt;
        let mut cache = SyncCache::load(&SyncCache::path_in(workdir));
        let mut engine = SyncEngine::new(&store, &service, &mut prompt).with_force(self.force);

        let report = match engine.push_pages(&mut cache).await? {
            PushOutcome::NoLocalPages => {
                println!(
                    "No pages found to upload. Create .liquid files in sections/, templates/ or layouts/ folders."
                );
                return Ok(());
            }
            PushOutcome::NoChanges { skipped } => {
                println!("Checking for conflicts with server...");
                for path in &skipped {
                    println!("  ⊘ {} (skipped)", path);
                }
                println!("\nNo changes to upload.");
                return Ok(());
            }
            PushOutcome::Submitted(report) => report,
        };

        println!("Checking for conflicts with server...");
        for path in &report.skipped {
            println!("  ⊘ {} (skipped)", path);
        }
        for page in &report.queued {
            println!(
                "  → {} (will upload){}",
                page.path,
                if page.empty { " [EMPTY]" } else { "" }
            );
        }

        println!("\nUploading {} page(s)...", report.queued.len());
        for path in &report.uploaded {
            println!("  ✓ {} (uploaded)", path);
        }
        save_cache(&cache, workdir)?;

        println!(
            "\n✓ Upload complete: {} page(s) updated [{}]",
            report.uploaded.len(),
            report.uploaded_keys.join(", ")
        );
        if let Some(debug) = &report.debug {
            println!("Debug info: {}", debug);
        }

        println!("\n--- SPA Folders ---");
        let groups = engine.push_groups(&mut cache).await;
        for group in &groups {
            let folder = group.group.folder();
            println!("\nUploading {}...", folder);
            match &group.status {
                GroupStatus::Synced(files) => {
                    for file in files {
                        println!("  → {}", file);
                    }
                    println!("  ✓ {} uploaded successfully", folder);
                }
                GroupStatus::Empty => println!("  No files found in {}", folder),
                GroupStatus::Failed(e) => println!("  ✗ Could not upload {}: {}", folder, e),
                GroupStatus::Skipped => print_skipped_group(group),
            }
        }
        save_cache(&cache, workdir)?;

        group_failures(&groups)
    }
}
