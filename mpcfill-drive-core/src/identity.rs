//! Identity extraction: share link -> [`ResourceIdentifier`].
//!
//! Supported shapes, tried in order:
//! 1. `.../drive/folders/<ID>` and `.../drive/u/<n>/folders/<ID>` (folder)
//! 2. `.../file/d/<ID>` (file)
//! 3. `...?id=<ID>`, e.g. `open?id=` (kind unknown, probed later)

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::drive::{ResourceIdentifier, DRIVE_BASE_URL};
use crate::error::DriveError;

static FOLDER_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/drive/(?:u/\d+/)?folders/([A-Za-z0-9_-]{10,})").expect("folder path regex")
});
static FILE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/file/d/([A-Za-z0-9_-]{10,})").expect("file path regex"));
static ID_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{10,}$").expect("id token regex"));

/// Extracts the resource id from an absolute http(s) Drive link.
pub fn extract(url: &str) -> Result<ResourceIdentifier, DriveError> {
    let parsed = Url::parse(url.trim()).map_err(|_| DriveError::InvalidUrl(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DriveError::InvalidUrl(url.to_string()));
    }
    match_url(&parsed).ok_or_else(|| DriveError::InvalidUrl(url.to_string()))
}

/// Like [`extract`], but also accepts hrefs relative to drive.google.com.
/// Links to other hosts yield `None`.
pub fn from_href(href: &str) -> Option<ResourceIdentifier> {
    let base = Url::parse(DRIVE_BASE_URL).ok()?;
    let parsed = base.join(href.trim()).ok()?;
    match parsed.host_str() {
        Some(host) if host == "drive.google.com" || host.ends_with(".drive.google.com") => {}
        _ => return None,
    }
    match_url(&parsed)
}

/// True when `id` has the shape of a Drive id.
pub fn is_drive_id(id: &str) -> bool {
    ID_TOKEN.is_match(id)
}

fn match_url(url: &Url) -> Option<ResourceIdentifier> {
    let path = url.path();
    if let Some(caps) = FOLDER_PATH.captures(path) {
        return Some(ResourceIdentifier::folder(&caps[1]));
    }
    if let Some(caps) = FILE_PATH.captures(path) {
        return Some(ResourceIdentifier::file(&caps[1]));
    }
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|id| is_drive_id(id))
        .map(ResourceIdentifier::unprobed)
}
