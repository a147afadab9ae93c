//! Drive-side data: resource identifiers and discovered entries.

use serde::Serialize;
use std::fmt;

pub const DRIVE_BASE_URL: &str = "https://drive.google.com";

/// Mime type Drive uses for folders in embedded page data.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceKind {
    File,
    Folder,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::File => f.write_str("file"),
            ResourceKind::Folder => f.write_str("folder"),
        }
    }
}

/// A file or folder id extracted from a share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentifier {
    pub kind: ResourceKind,
    pub id: String,
    /// False for `open?id=` links: the kind is a guess (Folder) until the page is probed.
    pub kind_confirmed: bool,
}

impl ResourceIdentifier {
    pub fn folder(id: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Folder,
            id: id.into(),
            kind_confirmed: true,
        }
    }

    pub fn file(id: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::File,
            id: id.into(),
            kind_confirmed: true,
        }
    }

    /// An id whose kind is unknown; treated as a folder until probed.
    pub fn unprobed(id: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Folder,
            id: id.into(),
            kind_confirmed: false,
        }
    }

    /// The public page the listing engine fetches for this resource.
    pub fn page_url(&self) -> String {
        match self.kind {
            ResourceKind::Folder => folder_url(&self.id),
            ResourceKind::File => file_url(&self.id),
        }
    }
}

pub fn folder_url(id: &str) -> String {
    format!("{DRIVE_BASE_URL}/drive/folders/{id}")
}

pub fn file_url(id: &str) -> String {
    format!("{DRIVE_BASE_URL}/file/d/{id}/view")
}

/// One file or folder discovered by the listing engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriveEntry {
    pub id: String,
    pub name: String,
    pub kind: ResourceKind,
    pub size_bytes: Option<u64>,
    /// Folder names from the traversal root down to the folder holding this entry.
    pub path: Vec<String>,
}

impl DriveEntry {
    pub fn is_folder(&self) -> bool {
        self.kind == ResourceKind::Folder
    }

    pub fn display_path(&self) -> String {
        self.path.join("/")
    }
}

/// Human readable size with one decimal, e.g. `2.0 KB`; `Unknown` when absent.
pub fn format_size(size_bytes: Option<u64>) -> String {
    let Some(bytes) = size_bytes else {
        return "Unknown".to_string();
    };
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} PB")
}
