//! Listing engine: one Drive page -> ordered entries.
//!
//! A folder page is fetched once (no pagination) and handed to every extraction
//! strategy in [`strategies`]. Their candidates are merged by id in extraction order:
//! the first candidate for an id fixes its position, later ones only fill fields that
//! are still missing. Nothing here fails on odd HTML; the only error is a failed fetch.

pub mod strategies;

use scraper::Html;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::contract::PageFetcher;
use crate::drive::{file_url, folder_url, DriveEntry, ResourceIdentifier, ResourceKind};
use crate::error::DriveError;
use crate::identity::is_drive_id;

/// A partially known entry produced by one strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub name: Option<String>,
    pub kind: Option<ResourceKind>,
    pub size_bytes: Option<u64>,
}

impl Candidate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// Fills fields that are still missing from a later candidate for the same id.
    fn absorb(&mut self, later: Candidate) {
        if self.name.is_none() {
            self.name = later.name;
        }
        if self.kind.is_none() {
            self.kind = later.kind;
        }
        if self.size_bytes.is_none() {
            self.size_bytes = later.size_bytes;
        }
    }
}

/// Lists the children of a folder, or the single entry for a file.
pub async fn list<F>(fetcher: &F, target: &ResourceIdentifier) -> Result<Vec<DriveEntry>, DriveError>
where
    F: PageFetcher + ?Sized,
{
    match target.kind {
        ResourceKind::Folder => {
            let url = folder_url(&target.id);
            info!(id = %target.id, url = %url, "Fetching folder page");
            let page = fetcher.fetch(&url).await?;
            if !target.kind_confirmed {
                if let Some(entry) = probe_single_file(&page, &target.id) {
                    info!(id = %target.id, name = %entry.name, "Link resolved to a single file");
                    return Ok(vec![entry]);
                }
            }
            let entries = extract_folder_entries(&page, &target.id);
            info!(id = %target.id, entries = entries.len(), "Folder listed");
            Ok(entries)
        }
        ResourceKind::File => {
            let url = file_url(&target.id);
            info!(id = %target.id, url = %url, "Fetching file page");
            let page = fetcher.fetch(&url).await?;
            Ok(vec![extract_file_entry(&page, &target.id)])
        }
    }
}

/// Runs all strategies over a folder page and merges the result.
/// The folder's own id is never reported as one of its children.
pub fn extract_folder_entries(page: &str, folder_id: &str) -> Vec<DriveEntry> {
    let html = Html::parse_document(page);
    let batches = strategies::run_all(&html);
    merge_candidates(batches)
        .into_iter()
        .filter(|entry| entry.id != folder_id)
        .collect()
}

/// Builds the entry for a single-file page; the id is used as name when the page has none.
pub fn extract_file_entry(page: &str, id: &str) -> DriveEntry {
    let html = Html::parse_document(page);
    let name = strategies::page_title(&html).unwrap_or_else(|| id.to_string());
    DriveEntry {
        id: id.to_string(),
        name,
        kind: ResourceKind::File,
        size_bytes: None,
        path: Vec::new(),
    }
}

fn probe_single_file(page: &str, id: &str) -> Option<DriveEntry> {
    let html = Html::parse_document(page);
    let file_id = strategies::single_file_id(&html)?;
    if file_id != id {
        return None;
    }
    let name = strategies::page_title(&html).unwrap_or_else(|| id.to_string());
    Some(DriveEntry {
        id: file_id,
        name,
        kind: ResourceKind::File,
        size_bytes: None,
        path: Vec::new(),
    })
}

/// Merges strategy outputs (given in strategy order) into deduplicated entries.
///
/// Candidates with an id that is not Drive-shaped are dropped, as are ids for which no
/// strategy produced a usable name. Kind defaults to [`ResourceKind::File`].
pub fn merge_candidates(batches: Vec<Vec<Candidate>>) -> Vec<DriveEntry> {
    let mut order: Vec<Candidate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut dropped = 0usize;

    for candidate in batches.into_iter().flatten() {
        if !is_drive_id(&candidate.id) {
            dropped += 1;
            continue;
        }
        let candidate = Candidate {
            name: candidate.name.as_deref().and_then(usable_name),
            ..candidate
        };
        match index.get(&candidate.id) {
            Some(&position) => order[position].absorb(candidate),
            None => {
                index.insert(candidate.id.clone(), order.len());
                order.push(candidate);
            }
        }
    }

    let entries: Vec<DriveEntry> = order
        .into_iter()
        .filter_map(|candidate| {
            let name = candidate.name?;
            Some(DriveEntry {
                id: candidate.id,
                name,
                kind: candidate.kind.unwrap_or(ResourceKind::File),
                size_bytes: candidate.size_bytes,
                path: Vec::new(),
            })
        })
        .collect();

    debug!(entries = entries.len(), dropped, "Merged strategy candidates");
    entries
}

/// Trims a scraped name and rejects ones that are clearly script data or noise.
fn usable_name(raw: &str) -> Option<String> {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let looks_like_script = name.starts_with("window.")
        || name.starts_with("AF_initDataCallback")
        || name.starts_with("%.@.")
        || name.contains("null,null,null")
        || name.matches('"').count() > 10;
    if name.chars().count() < 2 || name.len() > 1000 || looks_like_script {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usable_name_collapses_whitespace_and_rejects_noise() {
        assert_eq!(usable_name("  card  one.png \n").as_deref(), Some("card one.png"));
        assert_eq!(usable_name("x"), None);
        assert_eq!(usable_name("window._DRIVE_ivd = ..."), None);
        assert_eq!(usable_name("[null,null,null,1]"), None);
    }
}
