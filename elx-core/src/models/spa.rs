//! Single-page-app file groups.
//!
//! Each group is a fixed set of files synchronized as one unit with a single
//! server timestamp. Files not listed here are ignored.

use std::fmt;

/// How a group file is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Component source, converted through the component codec.
    Component,
    /// Raw stylesheet text.
    Stylesheet,
    /// Raw script text.
    Script,
}

impl FileKind {
    /// Name used for the `type` field on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            FileKind::Component => "vue-component",
            FileKind::Stylesheet => "css",
            FileKind::Script => "js",
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self, FileKind::Component)
    }
}

/// An expected file of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpaFile {
    pub name: &'static str,
    pub kind: FileKind,
}

const DEFAULT_FILES: &[SpaFile] = &[
    SpaFile {
        name: "App.js",
        kind: FileKind::Component,
    },
    SpaFile {
        name: "style.css",
        kind: FileKind::Stylesheet,
    },
    SpaFile {
        name: "script.js",
        kind: FileKind::Script,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpaGroup {
    GeneralPages,
    TeacherDashboard,
    StudentDashboard,
}

impl SpaGroup {
    pub const ALL: [SpaGroup; 3] = [
        SpaGroup::GeneralPages,
        SpaGroup::TeacherDashboard,
        SpaGroup::StudentDashboard,
    ];

    /// Identifier used in API paths and as the cache key.
    pub fn id(&self) -> &'static str {
        match self {
            SpaGroup::GeneralPages => "general_pages",
            SpaGroup::TeacherDashboard => "teacher_dashboard",
            SpaGroup::StudentDashboard => "student_dashboard",
        }
    }

    /// Folder holding the group's files, relative to the working directory.
    pub fn folder(&self) -> String {
        format!("SPA_{}", self.id())
    }

    pub fn files(&self) -> &'static [SpaFile] {
        DEFAULT_FILES
    }

    pub fn file(&self, name: &str) -> Option<SpaFile> {
        self.files().iter().copied().find(|f| f.name == name)
    }
}

impl fmt::Display for SpaGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.folder())
    }
}
