#![allow(dead_code)]

use mpcfill_drive_core::contract::{FetchError, MockPageFetcher};
use mpcfill_drive_core::drive::folder_url;

/// Builds a minimal folder page with one `data-id` row per item.
pub fn folder_page(items: &[(&str, &str, bool)]) -> String {
    let rows: String = items
        .iter()
        .map(|(id, name, is_folder)| {
            let target = if *is_folder { "folder" } else { "file" };
            format!(r#"<div data-id="{id}" data-target="{target}"><span>{name}</span></div>"#)
        })
        .collect();
    format!("<html><head><title>Cards - Google Drive</title></head><body>{rows}</body></html>")
}

/// A fetcher that serves each folder page exactly once and panics on any other request.
pub fn serve_folders(pages: Vec<(&str, Result<String, FetchError>)>) -> MockPageFetcher {
    let mut fetcher = MockPageFetcher::new();
    for (id, response) in pages {
        let url = folder_url(id);
        fetcher
            .expect_fetch()
            .withf(move |requested| requested.to_string() == url)
            .times(1)
            .returning(move |_| response.clone());
    }
    fetcher
}
