//! In-memory server and scripted prompts for engine tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use super::Confirm;
use crate::models::{Page, PageType, SpaGroup, Timestamp};
use crate::remote::{
    ContentService, GroupItem, GroupResponse, PagesResponse, RemoteError, SetGroupResponse,
    UpdatePagesResponse, UpdatedPage,
};
use crate::store::LocalStore;

pub(crate) const SUBMIT_TIMESTAMP: &str = "2024-06-01T00:00:00Z";

struct State {
    pages: PagesResponse,
    defaults: PagesResponse,
    groups: HashMap<SpaGroup, GroupResponse>,
    failing_groups: HashSet<SpaGroup>,
    update_response: Option<UpdatePagesResponse>,
    submitted_pages: Vec<Vec<Page>>,
    submitted_groups: Vec<(SpaGroup, Vec<GroupItem>)>,
}

/// Content server that keeps everything in memory and records submissions.
pub(crate) struct MemoryService {
    state: Mutex<State>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                pages: PagesResponse::ok(Vec::new()),
                defaults: PagesResponse::ok(Vec::new()),
                groups: HashMap::new(),
                failing_groups: HashSet::new(),
                update_response: None,
                submitted_pages: Vec::new(),
                submitted_groups: Vec::new(),
            }),
        }
    }

    pub fn set_pages(&self, pages: Vec<Page>) {
        self.state.lock().unwrap().pages = PagesResponse::ok(pages);
    }

    pub fn set_pages_response(&self, response: PagesResponse) {
        self.state.lock().unwrap().pages = response;
    }

    pub fn set_defaults(&self, pages: Vec<Page>) {
        self.state.lock().unwrap().defaults = PagesResponse::ok(pages);
    }

    /// Replaces the automatic upload answer with a fixed one.
    pub fn set_update_response(&self, response: UpdatePagesResponse) {
        self.state.lock().unwrap().update_response = Some(response);
    }

    pub fn set_group(&self, group: SpaGroup, response: GroupResponse) {
        self.state.lock().unwrap().groups.insert(group, response);
    }

    pub fn fail_group(&self, group: SpaGroup) {
        self.state.lock().unwrap().failing_groups.insert(group);
    }

    pub fn submitted_pages(&self) -> Vec<Vec<Page>> {
        self.state.lock().unwrap().submitted_pages.clone()
    }

    pub fn submitted_groups(&self) -> Vec<(SpaGroup, Vec<GroupItem>)> {
        self.state.lock().unwrap().submitted_groups.clone()
    }

    pub fn page(&self, page_type: PageType, key: &str) -> Option<Page> {
        self.state
            .lock()
            .unwrap()
            .pages
            .pages
            .iter()
            .find(|p| p.page_type == page_type && p.key == key)
            .cloned()
    }
}

#[async_trait]
impl ContentService for MemoryService {
    async fn fetch_pages(&self) -> Result<PagesResponse, RemoteError> {
        Ok(self.state.lock().unwrap().pages.clone())
    }

    async fn fetch_default_pages(&self) -> Result<PagesResponse, RemoteError> {
        Ok(self.state.lock().unwrap().defaults.clone())
    }

    async fn submit_pages(&self, pages: &[Page]) -> Result<UpdatePagesResponse, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.submitted_pages.push(pages.to_vec());
        if let Some(response) = &state.update_response {
            return Ok(response.clone());
        }

        let mut updated = Vec::new();
        for page in pages {
            let stored = page.clone().with_updated_at(SUBMIT_TIMESTAMP);
            let existing = state
                .pages
                .pages
                .iter_mut()
                .find(|p| p.page_type == page.page_type && p.key == page.key);
            match existing {
                Some(existing) => *existing = stored,
                None => state.pages.pages.push(stored),
            }
            updated.push(UpdatedPage {
                page_type: page.page_type.clone(),
                key: page.key.clone(),
                updated_at: Timestamp::from(SUBMIT_TIMESTAMP),
            });
        }

        Ok(UpdatePagesResponse {
            success: true,
            updated_pages: updated,
            message: None,
            debug: None,
        })
    }

    async fn fetch_group(&self, group: SpaGroup) -> Result<GroupResponse, RemoteError> {
        let state = self.state.lock().unwrap();
        if state.failing_groups.contains(&group) {
            return Err(RemoteError::Status {
                status: 500,
                message: "group unavailable".to_string(),
            });
        }
        Ok(state.groups.get(&group).cloned().unwrap_or_default())
    }

    async fn submit_group(
        &self,
        group: SpaGroup,
        items: &[GroupItem],
    ) -> Result<SetGroupResponse, RemoteError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_groups.contains(&group) {
            return Err(RemoteError::Http("connection reset".to_string()));
        }
        state.submitted_groups.push((group, items.to_vec()));
        Ok(SetGroupResponse {
            updated_at: Some(Timestamp::from(SUBMIT_TIMESTAMP)),
        })
    }
}

/// Gives the same answer to every question and records what was asked.
#[derive(Debug, Default)]
pub(crate) struct ScriptedConfirm {
    answer: bool,
    pub asked: Vec<(String, String)>,
}

impl ScriptedConfirm {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Vec::new(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm_overwrite(&mut self, path: &str, reason: &str) -> bool {
        self.asked.push((path.to_string(), reason.to_string()));
        self.answer
    }

    fn confirm_upload(&mut self, path: &str, reason: &str) -> bool {
        self.asked.push((path.to_string(), reason.to_string()));
        self.answer
    }
}

pub(crate) struct Fixture {
    pub dir: TempDir,
    pub store: LocalStore,
    pub service: MemoryService,
}

pub(crate) fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::new(dir.path());
    Fixture {
        dir,
        store,
        service: MemoryService::new(),
    }
}

pub(crate) fn page(page_type: PageType, key: &str, content: &str) -> Page {
    Page::new(page_type, key, content)
}

impl Fixture {
    pub fn write_page(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn read_page(&self, relative: &str) -> String {
        fs::read_to_string(self.dir.path().join(relative)).unwrap()
    }

    /// Every file below the working directory with its content.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        let mut files = BTreeMap::new();
        collect_files(self.dir.path(), self.dir.path(), &mut files);
        files
    }
}

fn collect_files(root: &Path, dir: &Path, files: &mut BTreeMap<String, String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect_files(root, &path, files);
        } else {
            let relative = path.strip_prefix(root).unwrap().to_string_lossy().into_owned();
            files.insert(relative, fs::read_to_string(&path).unwrap());
        }
    }
}
