//! Recursive traversal over a folder tree.
//!
//! Depth-first, driven by an explicit work stack so the nesting depth of the tree
//! never becomes call-stack depth. Requests are strictly sequential.
//!
//! Ordering: a folder's own listing is appended first, then the complete subtree of
//! its first eligible subfolder, then the next one, and so on.

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::contract::PageFetcher;
use crate::drive::{DriveEntry, ResourceIdentifier};
use crate::error::DriveError;
use crate::listing;

/// Everything one traversal found, including the subfolders it could not read.
#[derive(Debug, Default)]
pub struct Traversal {
    pub entries: Vec<DriveEntry>,
    pub failures: Vec<FolderFailure>,
    /// Number of pages fetched, root included.
    pub folders_listed: usize,
}

impl Traversal {
    pub fn files(&self) -> impl Iterator<Item = &DriveEntry> {
        self.entries.iter().filter(|entry| !entry.is_folder())
    }

    pub fn folders(&self) -> impl Iterator<Item = &DriveEntry> {
        self.entries.iter().filter(|entry| entry.is_folder())
    }
}

/// A subfolder whose page could not be fetched. Its siblings were still traversed.
#[derive(Debug)]
pub struct FolderFailure {
    pub id: String,
    pub name: String,
    pub path: Vec<String>,
    pub error: DriveError,
}

struct PendingFolder {
    id: String,
    name: String,
    depth: u32,
    path: Vec<String>,
}

/// Lists `root` and, up to `max_depth` levels below it, every subfolder not named in
/// `excluded` (exact, case-sensitive). `max_depth == 0` lists the root only.
///
/// A root failure is returned as an error; subfolder failures are collected in
/// [`Traversal::failures`]. No folder id is fetched twice.
pub async fn traverse<F>(
    fetcher: &F,
    root: &ResourceIdentifier,
    max_depth: u32,
    excluded: &HashSet<String>,
) -> Result<Traversal, DriveError>
where
    F: PageFetcher + ?Sized,
{
    info!(root = %root.id, max_depth, excluded = excluded.len(), "Starting traversal");

    let mut visited: HashSet<String> = HashSet::from([root.id.clone()]);
    let mut stack: Vec<PendingFolder> = Vec::new();
    let mut traversal = Traversal::default();

    let root_entries = listing::list(fetcher, root).await?;
    traversal.folders_listed += 1;
    push_subfolders(&mut stack, &root_entries, 0, &[], max_depth, excluded);
    traversal.entries.extend(root_entries);

    while let Some(folder) = stack.pop() {
        if !visited.insert(folder.id.clone()) {
            debug!(id = %folder.id, name = %folder.name, "Folder already visited, skipping");
            continue;
        }
        debug!(id = %folder.id, name = %folder.name, depth = folder.depth, "Descending into subfolder");

        let target = ResourceIdentifier::folder(folder.id.as_str());
        match listing::list(fetcher, &target).await {
            Ok(mut entries) => {
                traversal.folders_listed += 1;
                for entry in &mut entries {
                    entry.path = folder.path.clone();
                }
                push_subfolders(&mut stack, &entries, folder.depth, &folder.path, max_depth, excluded);
                traversal.entries.extend(entries);
            }
            Err(error) => {
                warn!(
                    id = %folder.id,
                    name = %folder.name,
                    error = %error,
                    "Could not list subfolder, continuing with siblings"
                );
                traversal.failures.push(FolderFailure {
                    id: folder.id,
                    name: folder.name,
                    path: folder.path,
                    error,
                });
            }
        }
    }

    info!(
        entries = traversal.entries.len(),
        folders_listed = traversal.folders_listed,
        failures = traversal.failures.len(),
        "Traversal complete"
    );
    Ok(traversal)
}

/// Queues the eligible subfolders of one listing so they pop in listing order.
fn push_subfolders(
    stack: &mut Vec<PendingFolder>,
    entries: &[DriveEntry],
    depth: u32,
    parent_path: &[String],
    max_depth: u32,
    excluded: &HashSet<String>,
) {
    if depth >= max_depth {
        return;
    }
    let children: Vec<PendingFolder> = entries
        .iter()
        .filter(|entry| entry.is_folder())
        .filter(|entry| {
            let skip = excluded.contains(&entry.name);
            if skip {
                debug!(name = %entry.name, "Skipping excluded folder");
            }
            !skip
        })
        .map(|entry| {
            let mut path = parent_path.to_vec();
            path.push(entry.name.clone());
            PendingFolder {
                id: entry.id.clone(),
                name: entry.name.clone(),
                depth: depth + 1,
                path,
            }
        })
        .collect();
    stack.extend(children.into_iter().rev());
}
