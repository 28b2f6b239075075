//! Working-directory storage for pages and SPA group files.
//!
//! Layout under the working directory:
//! - `<type>s/<key>.liquid`: editable pages (`templates/`, `sections/`, `layouts/`)
//! - `defaults/<type>s/<key>.liquid`: read-only server defaults
//! - `SPA_<group>/<file>`: SPA group files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::{Page, PageType, SpaFile, SpaGroup};

/// Written in place of an empty page so the file is never zero-length.
pub const EMPTY_FILE_MARKER: &str = "<!-- EMPTY FILE -->";

/// Extension of page files.
pub const PAGE_EXTENSION: &str = "liquid";

/// Folder holding read-only default pages.
pub const DEFAULTS_DIR: &str = "defaults";

/// Which page tree a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Editable pages that are uploaded.
    Custom,
    /// Read-only defaults, replaced on every download.
    Defaults,
}

/// A group file read from disk, tagged with its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSpaFile {
    pub file: SpaFile,
    pub content: String,
}

/// Reads and writes pages and group files below a working directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, namespace: Namespace) -> PathBuf {
        match namespace {
            Namespace::Custom => self.root.clone(),
            Namespace::Defaults => self.root.join(DEFAULTS_DIR),
        }
    }

    /// Returns the file path of a page.
    pub fn page_path(
        &self,
        page_type: &PageType,
        key: &str,
        namespace: Namespace,
    ) -> Result<PathBuf, StoreError> {
        validate_name(page_type.as_str())?;
        validate_name(key)?;
        Ok(self
            .namespace_dir(namespace)
            .join(page_type.folder())
            .join(format!("{}.{}", key, PAGE_EXTENSION)))
    }

    /// Creates the page folders of both namespaces.
    pub fn ensure_directories(&self) -> Result<(), StoreError> {
        for namespace in [Namespace::Custom, Namespace::Defaults] {
            for page_type in PageType::LOCAL {
                let dir = self.namespace_dir(namespace).join(page_type.folder());
                fs::create_dir_all(&dir).map_err(|e| StoreError::Io(dir.clone(), e))?;
            }
        }
        Ok(())
    }

    /// Checks if a custom page exists on disk.
    pub fn exists(&self, page_type: &PageType, key: &str) -> Result<bool, StoreError> {
        Ok(self.page_path(page_type, key, Namespace::Custom)?.exists())
    }

    /// Reads a custom page.
    ///
    /// Returns `Ok(None)` if the file doesn't exist. The empty-file marker
    /// reads back as empty content.
    pub fn read(&self, page_type: &PageType, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.page_path(page_type, key, Namespace::Custom)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(decode_page(content))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(path, e)),
        }
    }

    /// Writes a page, creating its folder if needed.
    pub fn write(
        &self,
        page_type: &PageType,
        key: &str,
        content: &str,
        namespace: Namespace,
    ) -> Result<(), StoreError> {
        let path = self.page_path(page_type, key, namespace)?;
        write_file(&path, encode_page(content))
    }

    /// Lists all custom pages in the template, section and layout folders,
    /// ordered by type then key.
    pub fn list_all(&self) -> Result<Vec<Page>, StoreError> {
        let mut pages = Vec::new();

        for page_type in PageType::LOCAL {
            let dir = self.root.join(page_type.folder());
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::Io(dir, e)),
            };

            let mut found = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|e| StoreError::Io(dir.clone(), e))?;
                let path = entry.path();
                if !path.is_file()
                    || path.extension().and_then(|e| e.to_str()) != Some(PAGE_EXTENSION)
                {
                    continue;
                }
                let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let content =
                    fs::read_to_string(&path).map_err(|e| StoreError::Io(path.clone(), e))?;
                found.push(Page::new(page_type.clone(), key, decode_page(content)));
            }

            found.sort_by(|a, b| a.key.cmp(&b.key));
            pages.extend(found);
        }

        Ok(pages)
    }

    /// Deletes the whole defaults tree.
    pub fn clear_defaults(&self) -> Result<(), StoreError> {
        let dir = self.namespace_dir(Namespace::Defaults);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(dir, e)),
        }
    }

    pub fn group_dir(&self, group: SpaGroup) -> PathBuf {
        self.root.join(group.folder())
    }

    /// Reads the expected files of a group that exist on disk, in declared
    /// order. Missing files are left out rather than read as empty.
    pub fn read_group(&self, group: SpaGroup) -> Result<Vec<LocalSpaFile>, StoreError> {
        let dir = self.group_dir(group);
        let mut files = Vec::new();

        for file in group.files() {
            let path = dir.join(file.name);
            match fs::read_to_string(&path) {
                Ok(content) => files.push(LocalSpaFile {
                    file: *file,
                    content,
                }),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::Io(path, e)),
            }
        }

        Ok(files)
    }

    /// Writes one group file verbatim, creating the group folder if needed.
    pub fn write_group_file(
        &self,
        group: SpaGroup,
        file: &SpaFile,
        content: &str,
    ) -> Result<(), StoreError> {
        let path = self.group_dir(group).join(file.name);
        write_file(&path, content)
    }
}

fn encode_page(content: &str) -> &str {
    if content.is_empty() {
        EMPTY_FILE_MARKER
    } else {
        content
    }
}

fn decode_page(content: String) -> String {
    if content.trim_end() == EMPTY_FILE_MARKER {
        String::new()
    } else {
        content
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::Io(parent.to_path_buf(), e))?;
    }
    fs::write(path, content).map_err(|e| StoreError::Io(path.to_path_buf(), e))
}

/// Keys and types become path components, so they must not escape their folder.
fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Errors that can occur during working-directory operations.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error reading or writing a file.
    Io(PathBuf, io::Error),
    /// A page type or key that cannot be used as a file name.
    InvalidName(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(path, e) => write!(f, "I/O error for {}: {}", path.display(), e),
            StoreError::InvalidName(name) => {
                write!(f, "'{}' cannot be used as a page file name", name)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(_, e) => Some(e),
            StoreError::InvalidName(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (LocalStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new(temp_dir.path());
        (store, temp_dir)
    }

    #[test]
    fn test_page_path_layout() {
        let (store, temp) = test_store();
        let custom = store
            .page_path(&PageType::Template, "home_page", Namespace::Custom)
            .unwrap();
        assert_eq!(custom, temp.path().join("templates").join("home_page.liquid"));

        let default = store
            .page_path(&PageType::Section, "hero", Namespace::Defaults)
            .unwrap();
        assert_eq!(
            default,
            temp.path().join("defaults").join("sections").join("hero.liquid")
        );
    }

    #[test]
    fn test_read_missing_returns_none() {
        let (store, _temp) = test_store();
        assert!(store.read(&PageType::Template, "nope").unwrap().is_none());
        assert!(!store.exists(&PageType::Template, "nope").unwrap());
    }

    #[test]
    fn test_empty_content_roundtrips_through_marker() {
        let (store, _temp) = test_store();
        store
            .write(&PageType::Layout, "blank", "", Namespace::Custom)
            .unwrap();

        let path = store
            .page_path(&PageType::Layout, "blank", Namespace::Custom)
            .unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), EMPTY_FILE_MARKER);
        assert_eq!(
            store.read(&PageType::Layout, "blank").unwrap(),
            Some(String::new())
        );
    }

    #[test]
    fn test_marker_with_trailing_newline_reads_empty() {
        let (store, temp) = test_store();
        let dir = temp.path().join("sections");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("x.liquid"), format!("{}\n", EMPTY_FILE_MARKER)).unwrap();

        assert_eq!(
            store.read(&PageType::Section, "x").unwrap(),
            Some(String::new())
        );
    }

    #[test]
    fn test_write_and_read() {
        let (store, _temp) = test_store();
        store
            .write(&PageType::Template, "home_page", "<h1>Hi</h1>", Namespace::Custom)
            .unwrap();
        assert!(store.exists(&PageType::Template, "home_page").unwrap());
        assert_eq!(
            store.read(&PageType::Template, "home_page").unwrap().as_deref(),
            Some("<h1>Hi</h1>")
        );
    }

    #[test]
    fn test_list_all_scans_known_folders() {
        let (store, temp) = test_store();
        store
            .write(&PageType::Template, "b_page", "B", Namespace::Custom)
            .unwrap();
        store
            .write(&PageType::Template, "a_page", "", Namespace::Custom)
            .unwrap();
        store
            .write(&PageType::Layout, "main", "L", Namespace::Custom)
            .unwrap();
        // ignored: defaults, other extensions, unknown folders
        store
            .write(&PageType::Section, "d", "D", Namespace::Defaults)
            .unwrap();
        fs::write(temp.path().join("templates").join("notes.txt"), "x").unwrap();
        store
            .write(&PageType::from("widget"), "w", "W", Namespace::Custom)
            .unwrap();

        let pages = store.list_all().unwrap();
        let keys: Vec<_> = pages.iter().map(|p| p.page_key().to_string()).collect();
        assert_eq!(keys, vec!["template:a_page", "template:b_page", "layout:main"]);
        assert_eq!(pages[0].content, "");
    }

    #[test]
    fn test_clear_defaults() {
        let (store, temp) = test_store();
        store
            .write(&PageType::Section, "hero", "x", Namespace::Defaults)
            .unwrap();
        store.clear_defaults().unwrap();
        assert!(!temp.path().join("defaults").exists());
        // clearing again is fine
        store.clear_defaults().unwrap();
    }

    #[test]
    fn test_ensure_directories() {
        let (store, temp) = test_store();
        store.ensure_directories().unwrap();
        for dir in ["templates", "sections", "layouts"] {
            assert!(temp.path().join(dir).is_dir());
            assert!(temp.path().join("defaults").join(dir).is_dir());
        }
    }

    #[test]
    fn test_rejects_path_escaping_keys() {
        let (store, _temp) = test_store();
        for key in ["../evil", "a/b", "..", ""] {
            let result = store.write(&PageType::Template, key, "x", Namespace::Custom);
            assert!(matches!(result, Err(StoreError::InvalidName(_))), "{}", key);
        }
    }

    #[test]
    fn test_read_group_skips_missing_and_unlisted() {
        let (store, temp) = test_store();
        let group = SpaGroup::GeneralPages;
        let css = group.file("style.css").unwrap();
        store.write_group_file(group, &css, "body {}").unwrap();
        fs::write(temp.path().join(group.folder()).join("extra.txt"), "x").unwrap();

        let files = store.read_group(group).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file, css);
        assert_eq!(files[0].content, "body {}");
    }

    #[test]
    fn test_group_files_written_verbatim() {
        let (store, _temp) = test_store();
        let group = SpaGroup::StudentDashboard;
        let script = group.file("script.js").unwrap();
        store.write_group_file(group, &script, "").unwrap();

        let files = store.read_group(group).unwrap();
        assert_eq!(files[0].content, "");
        assert_eq!(files[0].file.kind, crate::models::FileKind::Script);
    }
}
