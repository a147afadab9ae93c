//! Filesystem and terminal output: where manifests go, where inputs are found, and
//! how a listing is shown.

use anyhow::{Context, Result};
use mpcfill_drive_core::drive::{format_size, DriveEntry};
use mpcfill_drive_core::manifest::Manifest;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// True when `path` is a plain file name with no directory part.
fn is_bare(path: &Path) -> bool {
    path.parent().map_or(true, |parent| parent.as_os_str().is_empty())
}

/// Bare output names are placed in `output_dir`; anything with a directory is used as given.
pub fn resolve_output(path: &Path, output_dir: &Path) -> PathBuf {
    if is_bare(path) {
        output_dir.join(path)
    } else {
        path.to_path_buf()
    }
}

/// Finds an input manifest: the path itself, else a bare name inside `output_dir`.
pub fn resolve_input(path: &Path, output_dir: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if is_bare(path) {
        let candidate = output_dir.join(path);
        if candidate.is_file() {
            debug!(input = %path.display(), resolved = %candidate.display(), "Resolved input in output directory");
            return Some(candidate);
        }
    }
    None
}

/// Serializes `manifest` to `path`, creating parent directories.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    let xml = manifest.to_xml()?;
    fs::write(path, xml).with_context(|| format!("Failed to write manifest {}", path.display()))?;
    info!(
        path = %path.display(),
        slots = manifest.slots.len(),
        cards = manifest.card_count(),
        bracket = manifest.bracket,
        "Manifest written"
    );
    Ok(())
}

/// Folders first, then files, each with id, location and size, followed by totals.
pub fn render_listing(entries: &[DriveEntry]) -> String {
    let folders: Vec<&DriveEntry> = entries.iter().filter(|e| e.is_folder()).collect();
    let files: Vec<&DriveEntry> = entries.iter().filter(|e| !e.is_folder()).collect();
    let mut out = String::new();

    if !folders.is_empty() {
        let _ = writeln!(out, "Folders ({}):", folders.len());
        for folder in &folders {
            let _ = writeln!(out, "  [folder] {}", folder.name);
            let _ = writeln!(out, "      id: {}", folder.id);
            if !folder.path.is_empty() {
                let _ = writeln!(out, "      path: {}", folder.display_path());
            }
        }
        out.push('\n');
    }

    if !files.is_empty() {
        let _ = writeln!(out, "Files ({}):", files.len());
        for file in &files {
            let _ = writeln!(out, "  [file] {}", file.name);
            let _ = writeln!(out, "      id: {}", file.id);
            if !file.path.is_empty() {
                let _ = writeln!(out, "      path: {}", file.display_path());
            }
            let _ = writeln!(out, "      size: {}", format_size(file.size_bytes));
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "Total: {} items ({} folders, {} files)",
        entries.len(),
        folders.len(),
        files.len()
    );
    out
}
