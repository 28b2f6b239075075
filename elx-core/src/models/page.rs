use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::Timestamp;

/// Category of a page. The server may introduce new categories; those are
/// carried as `Other` and stored under a pluralized folder name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PageType {
    Template,
    Section,
    Layout,
    Other(String),
}

impl PageType {
    /// Page types whose folders are scanned for local pages.
    pub const LOCAL: [PageType; 3] = [PageType::Template, PageType::Section, PageType::Layout];

    pub fn as_str(&self) -> &str {
        match self {
            PageType::Template => "template",
            PageType::Section => "section",
            PageType::Layout => "layout",
            PageType::Other(name) => name,
        }
    }

    /// Folder holding pages of this type, relative to the working directory.
    pub fn folder(&self) -> String {
        format!("{}s", self.as_str())
    }
}

impl From<String> for PageType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "template" => PageType::Template,
            "section" => PageType::Section,
            "layout" => PageType::Layout,
            _ => PageType::Other(value),
        }
    }
}

impl From<&str> for PageType {
    fn from(value: &str) -> Self {
        PageType::from(value.to_string())
    }
}

impl From<PageType> for String {
    fn from(value: PageType) -> Self {
        match value {
            PageType::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a page: its type plus its key, written `type:key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageKey {
    pub page_type: PageType,
    pub key: String,
}

impl PageKey {
    pub fn new(page_type: PageType, key: impl Into<String>) -> Self {
        Self {
            page_type,
            key: key.into(),
        }
    }

    /// Path of the page file relative to the working directory.
    pub fn display_path(&self) -> String {
        format!("{}/{}.liquid", self.page_type.folder(), self.key)
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page_type, self.key)
    }
}

/// A page as exchanged with the server or read from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "type")]
    pub page_type: PageType,
    pub key: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Page {
    pub fn new(page_type: PageType, key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            page_type,
            key: key.into(),
            content: content.into(),
            updated_at: None,
        }
    }

    pub fn with_updated_at(mut self, updated_at: impl Into<Timestamp>) -> Self {
        self.updated_at = Some(updated_at.into());
        self
    }

    pub fn page_key(&self) -> PageKey {
        PageKey::new(self.page_type.clone(), self.key.clone())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
