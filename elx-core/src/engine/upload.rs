//! Upload pass: working directory to server.

use std::collections::HashMap;

use super::download::GroupError;
use super::report::{GroupReport, GroupStatus, PushOutcome, PushReport, QueuedPage};
use super::{rejection, SyncEngine, SyncError, REASON_UPLOAD_CONFLICT};
use crate::cache::SyncCache;
use crate::codec::{self, CodecError};
use crate::models::{Page, PageKey, SpaGroup};
use crate::remote::{ContentService, GroupItem};
use crate::store::LocalSpaFile;

impl<S: ContentService> SyncEngine<'_, S> {
    /// Uploads local pages in one batch.
    ///
    /// A page whose server copy changed since the last sync is only sent if
    /// the user agrees. The cache is updated for exactly the pages the server
    /// reports back.
    pub async fn push_pages(&mut self, cache: &mut SyncCache) -> Result<PushOutcome, SyncError> {
        let local = self.store.list_all()?;
        if local.is_empty() {
            return Ok(PushOutcome::NoLocalPages);
        }

        let listing = self.service.fetch_pages().await?;
        if !listing.success {
            return Err(rejection("Failed to fetch pages", listing.message));
        }
        let remote: HashMap<PageKey, &Page> =
            listing.pages.iter().map(|p| (p.page_key(), p)).collect();

        let mut report = PushReport::default();
        let mut batch = Vec::with_capacity(local.len());

        for page in local {
            let key = page.page_key();
            let path = key.display_path();

            let remote_ts = remote.get(&key).and_then(|p| p.updated_at.as_ref());
            if let (Some(remote_ts), Some(cached_ts)) =
                (remote_ts, cache.page_timestamp(&page.page_type, &page.key))
            {
                if remote_ts.is_newer_than(cached_ts)
                    && !self.allow_upload(&path, REASON_UPLOAD_CONFLICT)
                {
                    report.skipped.push(path);
                    continue;
                }
            }

            report.queued.push(QueuedPage {
                path,
                empty: page.content.is_empty(),
            });
            batch.push(page);
        }

        if batch.is_empty() {
            return Ok(PushOutcome::NoChanges {
                skipped: report.skipped,
            });
        }

        tracing::info!("Uploading {} page(s)", batch.len());
        let response = self.service.submit_pages(&batch).await?;
        if !response.success {
            return Err(rejection("Upload failed", response.message));
        }

        for updated in &response.updated_pages {
            cache.set_page_timestamp(&updated.page_type, &updated.key, updated.updated_at.clone());
            let key = PageKey::new(updated.page_type.clone(), updated.key.clone());
            report.uploaded.push(key.display_path());
            report.uploaded_keys.push(updated.key.clone());
        }

        if let Some(payload) = &response.debug {
            tracing::debug!("Upload debug info: {}", payload);
        }
        report.debug = response.debug;

        Ok(PushOutcome::Submitted(report))
    }

    /// Uploads every SPA group that has local files. A failure is reported
    /// for its group and the remaining groups still run.
    pub async fn push_groups(&mut self, cache: &mut SyncCache) -> Vec<GroupReport> {
        let mut reports = Vec::with_capacity(SpaGroup::ALL.len());
        for group in SpaGroup::ALL {
            let status = match self.push_group(cache, group).await {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!("Could not upload {}: {}", group, e);
                    GroupStatus::Failed(e.to_string())
                }
            };
            reports.push(GroupReport { group, status });
        }
        reports
    }

    async fn push_group(
        &mut self,
        cache: &mut SyncCache,
        group: SpaGroup,
    ) -> Result<GroupStatus, GroupError> {
        let files = self.store.read_group(group)?;
        if files.is_empty() {
            return Ok(GroupStatus::Empty);
        }

        let remote = self.service.fetch_group(group).await?;
        if let (Some(remote_ts), Some(cached_ts)) =
            (&remote.updated_at, cache.group_timestamp(group))
        {
            if remote_ts.is_newer_than(cached_ts)
                && !self.allow_upload(&group.folder(), REASON_UPLOAD_CONFLICT)
            {
                return Ok(GroupStatus::Skipped);
            }
        }

        let mut items = Vec::with_capacity(files.len());
        let mut sent = Vec::with_capacity(files.len());
        for local in &files {
            items.push(self.encode_item(local)?);
            sent.push(format!("{}/{}", group.folder(), local.file.name));
        }

        let response = self.service.submit_group(group, &items).await?;
        if let Some(ts) = response.updated_at {
            cache.set_group_timestamp(group, ts);
        }
        Ok(GroupStatus::Synced(sent))
    }

    /// Builds the wire item for a group file. Component sources are parsed
    /// and compiled; a blank component is sent as `null`.
    fn encode_item(&self, local: &LocalSpaFile) -> Result<GroupItem, GroupError> {
        let file = local.file;
        let data = if !file.kind.is_component() {
            serde_json::Value::String(local.content.clone())
        } else if local.content.trim().is_empty() {
            serde_json::Value::Null
        } else {
            let wrap = |source: CodecError| GroupError::Codec {
                file: file.name,
                source,
            };
            let component = codec::parse(&local.content).map_err(|e| wrap(e.into()))?;
            let component =
                codec::compile(component, self.compiler.as_ref()).map_err(|e| wrap(e.into()))?;
            component.to_value().map_err(|e| wrap(e.into()))?
        };

        Ok(GroupItem {
            name: file.name.to_string(),
            kind: Some(file.kind.wire_name().to_string()),
            data,
        })
    }
}
