//! Download pass: server to working directory.

use std::collections::{HashMap, HashSet};

use futures::future::try_join;

use super::report::{
    GroupReport, GroupStatus, ItemFailure, ItemOutcome, ItemReport, PullReport,
};
use super::{rejection, SyncEngine, SyncError, REASON_LOCAL_DIFFERS, REASON_REMOTE_MODIFIED};
use crate::cache::SyncCache;
use crate::codec::{self, CodecError, Component};
use crate::models::{Page, PageKey, PageType, SpaFile, SpaGroup};
use crate::remote::{ContentService, GroupItem, RemoteError};
use crate::store::{Namespace, StoreError, DEFAULTS_DIR};

/// Template pages every site has, created locally even before the server
/// stores a custom version.
pub const TEMPLATE_KEYS: [&str; 8] = [
    "home_page",
    "courses_page",
    "course_page",
    "about_page",
    "category_page",
    "blogs_page",
    "blog_page",
    "contact_page",
];

impl<S: ContentService> SyncEngine<'_, S> {
    /// Downloads default and custom pages.
    ///
    /// The defaults tree is always replaced. Custom pages are written unless
    /// the user declines an overwrite; the cache records the server
    /// timestamp of every page written.
    pub async fn pull_pages(&mut self, cache: &mut SyncCache) -> Result<PullReport, SyncError> {
        let (pages, defaults) = try_join(
            self.service.fetch_pages(),
            self.service.fetch_default_pages(),
        )
        .await?;

        if !pages.success {
            return Err(rejection("Failed to fetch pages", pages.message));
        }
        if !defaults.success {
            return Err(rejection("Failed to fetch defaults", defaults.message));
        }

        let mut report = PullReport::default();
        self.store.clear_defaults()?;
        self.store.ensure_directories()?;
        for page in &defaults.pages {
            let path = format!("{}/{}", DEFAULTS_DIR, page.page_key().display_path());
            let written = self
                .store
                .write(&page.page_type, &page.key, &page.content, Namespace::Defaults)
                .map_err(SyncError::from);
            match item_result(written)? {
                Ok(()) => report.defaults.push(path),
                Err(message) => report.failed.push(ItemFailure { path, message }),
            }
        }

        let remote: HashMap<PageKey, &Page> =
            pages.pages.iter().map(|p| (p.page_key(), p)).collect();

        for key in candidate_keys(&pages.pages, &defaults.pages) {
            let path = key.display_path();
            match item_result(self.pull_page(cache, &key, remote.get(&key).copied()))? {
                Ok(outcome) => {
                    tracing::debug!("{} {}", key, outcome);
                    report.items.push(ItemReport { path, outcome });
                }
                Err(message) => {
                    tracing::warn!("Could not download {}: {}", key, message);
                    report.failed.push(ItemFailure { path, message });
                }
            }
        }

        Ok(report)
    }

    fn pull_page(
        &mut self,
        cache: &mut SyncCache,
        key: &PageKey,
        remote: Option<&Page>,
    ) -> Result<ItemOutcome, SyncError> {
        let PageKey { page_type, key: name } = key;
        let path = key.display_path();
        let remote_content = remote.map(|p| p.content.as_str()).unwrap_or_default();
        let remote_timestamp = remote.and_then(|p| p.updated_at.clone());

        let Some(local_content) = self.store.read(page_type, name)? else {
            self.store
                .write(page_type, name, remote_content, Namespace::Custom)?;
            if let Some(ts) = remote_timestamp {
                cache.set_page_timestamp(page_type, name, ts);
            }
            return Ok(ItemOutcome::Created);
        };

        let cached = cache.page_timestamp(page_type, name).cloned();

        if let (Some(remote_ts), Some(cached_ts)) = (&remote_timestamp, &cached) {
            if remote_ts.is_newer_than(cached_ts) {
                if !self.allow_overwrite(&path, REASON_REMOTE_MODIFIED) {
                    return Ok(ItemOutcome::Skipped);
                }
                self.store
                    .write(page_type, name, remote_content, Namespace::Custom)?;
                cache.set_page_timestamp(page_type, name, remote_ts.clone());
                return Ok(ItemOutcome::Updated);
            }
        }

        // Never-synced local edits are protected on the first download.
        if local_content != remote_content
            && cached.is_none()
            && !local_content.is_empty()
            && !self.allow_overwrite(&path, REASON_LOCAL_DIFFERS)
        {
            return Ok(ItemOutcome::Skipped);
        }

        self.store
            .write(page_type, name, remote_content, Namespace::Custom)?;
        if let Some(ts) = remote_timestamp {
            cache.set_page_timestamp(page_type, name, ts);
        }
        Ok(ItemOutcome::Updated)
    }

    /// Downloads every SPA group. A failure is reported for its group and
    /// the remaining groups still run.
    pub async fn pull_groups(&mut self, cache: &mut SyncCache) -> Vec<GroupReport> {
        let mut reports = Vec::with_capacity(SpaGroup::ALL.len());
        for group in SpaGroup::ALL {
            let status = match self.pull_group(cache, group).await {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!("Could not download {}: {}", group, e);
                    GroupStatus::Failed(e.to_string())
                }
            };
            reports.push(GroupReport { group, status });
        }
        reports
    }

    async fn pull_group(
        &mut self,
        cache: &mut SyncCache,
        group: SpaGroup,
    ) -> Result<GroupStatus, GroupError> {
        let response = self.service.fetch_group(group).await?;

        if let (Some(remote_ts), Some(cached_ts)) =
            (&response.updated_at, cache.group_timestamp(group))
        {
            if remote_ts.is_newer_than(cached_ts)
                && !self.allow_overwrite(&group.folder(), REASON_REMOTE_MODIFIED)
            {
                return Ok(GroupStatus::Skipped);
            }
        }

        // Decode everything before touching disk so a bad item leaves the
        // group folder as it was.
        let mut contents = Vec::with_capacity(group.files().len());
        for file in group.files() {
            let item = response.items.iter().find(|i| i.name == file.name);
            contents.push((file, decode_item(file, item)?));
        }

        let mut written = Vec::with_capacity(contents.len());
        for (file, content) in contents {
            self.store.write_group_file(group, file, &content)?;
            written.push(format!("{}/{}", group.folder(), file.name));
        }

        if let Some(ts) = response.updated_at {
            cache.set_group_timestamp(group, ts);
        }
        Ok(GroupStatus::Synced(written))
    }
}

/// Separates failures confined to one page, such as a key that is not a
/// usable file name, from errors that end the pass.
fn item_result<T>(result: Result<T, SyncError>) -> Result<Result<T, String>, SyncError> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(SyncError::Store(e @ StoreError::InvalidName(_))) => Ok(Err(e.to_string())),
        Err(e) => Err(e),
    }
}

/// Keys to reconcile: custom pages, the well-known templates, then
/// defaults, without repeats and in that order.
fn candidate_keys(custom: &[Page], defaults: &[Page]) -> Vec<PageKey> {
    let well_known = TEMPLATE_KEYS
        .iter()
        .map(|key| PageKey::new(PageType::Template, *key));

    let mut seen = HashSet::new();
    custom
        .iter()
        .map(Page::page_key)
        .chain(well_known)
        .chain(defaults.iter().map(Page::page_key))
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

/// Turns a group item into file text. Missing and null data become an
/// empty file.
fn decode_item(file: &SpaFile, item: Option<&GroupItem>) -> Result<String, GroupError> {
    let data = match item.map(|i| &i.data) {
        None | Some(serde_json::Value::Null) => return Ok(String::new()),
        Some(data) => data,
    };

    if file.kind.is_component() {
        let component = Component::from_value(data.clone()).map_err(|e| GroupError::Codec {
            file: file.name,
            source: CodecError::Wire(e),
        })?;
        return Ok(codec::serialize(&component));
    }

    Ok(match data {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

/// Failure confined to a single group.
#[derive(Debug)]
pub(super) enum GroupError {
    Sync(SyncError),
    Codec {
        file: &'static str,
        source: CodecError,
    },
}

impl std::fmt::Display for GroupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupError::Sync(e) => write!(f, "{}", e),
            GroupError::Codec { file, source } => write!(f, "{}: {}", file, source),
        }
    }
}

impl From<SyncError> for GroupError {
    fn from(e: SyncError) -> Self {
        GroupError::Sync(e)
    }
}

impl From<StoreError> for GroupError {
    fn from(e: StoreError) -> Self {
        GroupError::Sync(SyncError::Store(e))
    }
}

impl From<RemoteError> for GroupError {
    fn from(e: RemoteError) -> Self {
        GroupError::Sync(SyncError::Remote(e))
    }
}
