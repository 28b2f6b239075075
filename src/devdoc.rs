//! Developer documentation kept next to the synchronized files.

use std::fs;
use std::io;
use std::path::Path;

pub const DEV_DOC_DIR: &str = "DEV_DOC";

const DOCS: [(&str, &str); 2] = [
    ("ThemeDev.md", include_str!("../DEV_DOC/ThemeDev.md")),
    ("README.md", include_str!("../DEV_DOC/README.md")),
];

/// Writes the bundled docs into `DEV_DOC/` where the local copy differs.
///
/// Returns the names of the files that were written.
pub fn refresh(workdir: &Path) -> io::Result<Vec<&'static str>> {
    let dir = workdir.join(DEV_DOC_DIR);
    fs::create_dir_all(&dir)?;

    let mut updated = Vec::new();
    for (name, content) in DOCS {
        let path = dir.join(name);
        let current = match fs::read_to_string(&path) {
            Ok(current) => Some(current),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };
        if current.as_deref() != Some(content) {
            fs::write(&path, content)?;
            tracing::debug!("wrote {}", path.display());
            updated.push(name);
        }
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_refresh_writes_missing_docs() {
        let temp_dir = tempdir().unwrap();

        let updated = refresh(temp_dir.path()).unwrap();
        assert_eq!(updated, vec!["ThemeDev.md", "README.md"]);
        assert!(temp_dir.path().join("DEV_DOC/README.md").exists());
    }

    #[test]
    fn test_refresh_only_rewrites_changed_docs() {
        let temp_dir = tempdir().unwrap();
        refresh(temp_dir.path()).unwrap();
        assert!(refresh(temp_dir.path()).unwrap().is_empty());

        fs::write(temp_dir.path().join("DEV_DOC/README.md"), "edited").unwrap();
        assert_eq!(refresh(temp_dir.path()).unwrap(), vec!["README.md"]);
    }
}
