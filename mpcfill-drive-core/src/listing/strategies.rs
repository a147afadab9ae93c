//! Independent extraction strategies over a parsed Drive page.
//!
//! Each strategy is a pure function `&Html -> Vec<Candidate>` and knows nothing about
//! the others. When Drive changes one part of its markup the remaining strategies still
//! contribute; merging happens in [`super::merge_candidates`].

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::Candidate;
use crate::drive::{ResourceKind, FOLDER_MIME_TYPE};
use crate::identity::{self, is_drive_id};

static SCRIPT_PAYLOADS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?s)window\._DRIVE_ivd\s*=\s*(\[.*?\]);",
        r"(?s)window\._DRIVE_ivd\s*=\s*(\{.*?\});",
        r"(?s)AF_initDataCallback\s*\(\s*\{.*?data:\s*(\[.*?\])\s*,\s*sideChannel",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("script payload regex"))
    .collect()
});

/// `window['_DRIVE_ivd'] = '...'` carries the listing as a JS-escaped string literal.
static ESCAPED_IVD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)_DRIVE_ivd'\]\s*=\s*'(.*?)';"#).expect("escaped ivd regex")
});

/// Runs every strategy in order: script data, data attributes, links, meta tags.
pub fn run_all(html: &Html) -> Vec<Vec<Candidate>> {
    let batches = vec![
        script_data(html),
        data_attributes(html),
        links(html),
        meta_tags(html),
    ];
    debug!(
        script = batches[0].len(),
        data_attributes = batches[1].len(),
        links = batches[2].len(),
        meta = batches[3].len(),
        "Strategy candidate counts"
    );
    batches
}

/// (a) JSON-like structures embedded in `<script>` tags.
pub fn script_data(html: &Html) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for script in select(html, "script") {
        let body: String = script.text().collect();
        for pattern in SCRIPT_PAYLOADS.iter() {
            for caps in pattern.captures_iter(&body) {
                if let Ok(value) = serde_json::from_str::<Value>(&caps[1]) {
                    walk_json(&value, &mut candidates);
                }
            }
        }
        for caps in ESCAPED_IVD.captures_iter(&body) {
            let decoded = unescape_js(&caps[1]);
            if let Ok(value) = serde_json::from_str::<Value>(&decoded) {
                walk_json(&value, &mut candidates);
            }
        }
    }
    candidates
}

/// (b) Elements carrying the id in a data attribute.
pub fn data_attributes(html: &Html) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for element in select(html, "[data-id], [data-file-id], [data-folder-id]") {
        let attrs = element.value();
        let Some(id) = attrs
            .attr("data-id")
            .or_else(|| attrs.attr("data-file-id"))
            .or_else(|| attrs.attr("data-folder-id"))
        else {
            continue;
        };
        let mut candidate = Candidate::new(id);
        candidate.name = first_non_empty([
            attrs.attr("data-name").map(str::to_string),
            attrs.attr("title").map(str::to_string),
            Some(element_text(&element)),
        ]);
        candidate.kind = element_kind(&element);
        candidate.size_bytes = attrs.attr("data-size").and_then(|s| s.trim().parse().ok());
        candidates.push(candidate);
    }
    candidates
}

/// (c) Anchors whose href points at a Drive file or folder.
pub fn links(html: &Html) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for anchor in select(html, "a[href]") {
        let Some(target) = anchor.value().attr("href").and_then(identity::from_href) else {
            continue;
        };
        let mut candidate = Candidate::new(target.id);
        candidate.name = first_non_empty([
            Some(element_text(&anchor)),
            anchor.value().attr("title").map(str::to_string),
            anchor.value().attr("aria-label").map(str::to_string),
        ]);
        candidate.kind = target.kind_confirmed.then_some(target.kind);
        candidates.push(candidate);
    }
    candidates
}

/// (d) JSON-LD and Open Graph metadata, which is what single-file pages carry.
pub fn meta_tags(html: &Html) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for script in select(html, r#"script[type="application/ld+json"]"#) {
        let body: String = script.text().collect();
        let Ok(Value::Object(data)) = serde_json::from_str::<Value>(&body) else {
            continue;
        };
        let Some(name) = data.get("name").and_then(Value::as_str) else {
            continue;
        };
        let id = data
            .get("identifier")
            .and_then(Value::as_str)
            .filter(|id| is_drive_id(id))
            .map(str::to_string)
            .or_else(|| {
                data.get("url")
                    .and_then(Value::as_str)
                    .and_then(identity::from_href)
                    .map(|target| target.id)
            });
        let Some(id) = id else {
            continue;
        };
        let mut candidate = Candidate::new(id).with_name(name);
        if data.get("@type").and_then(Value::as_str) == Some("Folder") {
            candidate.kind = Some(ResourceKind::Folder);
        }
        candidate.size_bytes = data.get("contentSize").and_then(size_value);
        candidates.push(candidate);
    }

    if let Some(id) = single_file_id(html) {
        let mut candidate = Candidate::new(id).with_kind(ResourceKind::File);
        candidate.name = page_title(html);
        candidates.push(candidate);
    }

    candidates
}

/// The file id a page describes, if its `og:url` or canonical link is a `/file/d/` link.
pub fn single_file_id(html: &Html) -> Option<String> {
    let og_url = select(html, r#"meta[property="og:url"]"#)
        .into_iter()
        .filter_map(|meta| meta.value().attr("content"));
    let canonical = select(html, r#"link[rel="canonical"]"#)
        .into_iter()
        .filter_map(|link| link.value().attr("href"));
    og_url
        .chain(canonical)
        .filter_map(identity::from_href)
        .find(|target| target.kind == ResourceKind::File && target.kind_confirmed)
        .map(|target| target.id)
}

/// `og:title`, else `<title>` without the " - Google Drive" suffix.
pub fn page_title(html: &Html) -> Option<String> {
    let og_title = select(html, r#"meta[property="og:title"]"#)
        .into_iter()
        .find_map(|meta| meta.value().attr("content").map(str::to_string));
    let title = og_title.or_else(|| {
        select(html, "title")
            .into_iter()
            .next()
            .map(|title| title.text().collect::<String>())
    })?;
    let title = title.trim();
    let title = title.strip_suffix(" - Google Drive").unwrap_or(title).trim();
    (!title.is_empty()).then(|| title.to_string())
}

fn select<'a>(html: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => html.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_non_empty<const N: usize>(options: [Option<String>; N]) -> Option<String> {
    options
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Folder/file markers Drive puts on grid items; `None` when nothing says either way.
fn element_kind(element: &ElementRef<'_>) -> Option<ResourceKind> {
    let attrs = element.value();
    match attrs.attr("data-target") {
        Some("folder") => return Some(ResourceKind::Folder),
        Some("file") | Some("doc") => return Some(ResourceKind::File),
        _ => {}
    }
    if attrs.attr("data-folder-id").is_some() {
        return Some(ResourceKind::Folder);
    }
    if attrs.attr("data-file-id").is_some() {
        return Some(ResourceKind::File);
    }

    let parent = element.parent().and_then(ElementRef::wrap);
    let labels = [
        attrs.attr("data-tooltip"),
        attrs.attr("aria-label"),
        parent.and_then(|p| p.value().attr("aria-label")),
    ];
    for label in labels.into_iter().flatten() {
        let label = label.to_lowercase();
        if label.contains("folder") || label.contains("directory") {
            return Some(ResourceKind::Folder);
        }
        if label.contains("image") || label.contains("file") || label.contains("document") {
            return Some(ResourceKind::File);
        }
    }
    if attrs.classes().any(|class| class.to_lowercase().contains("folder")) {
        return Some(ResourceKind::Folder);
    }
    let has_preview = !select_within(element, "img").is_empty()
        || parent.is_some_and(|p| !select_within(&p, "img").is_empty());
    has_preview.then_some(ResourceKind::File)
}

fn select_within<'a>(element: &ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => element.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Collects candidates from keyed objects (`{"id", "name", "mimeType", ...}`) and from
/// Drive's positional rows (`[id, [parents], name, mimeType, ...]`).
fn walk_json(value: &Value, out: &mut Vec<Candidate>) {
    match value {
        Value::Object(map) => {
            if let (Some(id), Some(name)) = (
                map.get("id").and_then(Value::as_str),
                map.get("name").and_then(Value::as_str),
            ) {
                let mut candidate = Candidate::new(id).with_name(name);
                let mime = map.get("mimeType").and_then(Value::as_str);
                let is_folder = map.get("isFolder").and_then(Value::as_bool) == Some(true);
                candidate.kind = match mime {
                    _ if is_folder => Some(ResourceKind::Folder),
                    Some(FOLDER_MIME_TYPE) => Some(ResourceKind::Folder),
                    Some(mime) if mime.contains('/') => Some(ResourceKind::File),
                    _ => None,
                };
                candidate.size_bytes = map.get("size").and_then(size_value);
                out.push(candidate);
            }
            for nested in map.values() {
                walk_json(nested, out);
            }
        }
        Value::Array(items) => {
            if let Some(candidate) = positional_row(items) {
                out.push(candidate);
            }
            for nested in items {
                walk_json(nested, out);
            }
        }
        _ => {}
    }
}

fn positional_row(items: &[Value]) -> Option<Candidate> {
    let id = items.first()?.as_str().filter(|id| is_drive_id(id))?;
    let name = items.get(2)?.as_str()?;
    let mime = items.get(3)?.as_str().filter(|mime| mime.contains('/'))?;
    let kind = if mime == FOLDER_MIME_TYPE {
        ResourceKind::Folder
    } else {
        ResourceKind::File
    };
    Some(Candidate::new(id).with_name(name).with_kind(kind))
}

fn size_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decodes the escapes Drive uses inside its JS string literals.
fn unescape_js(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    // `\xNN` runs are UTF-8 bytes.
    let mut bytes: Vec<u8> = Vec::new();
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'x') {
            chars.next();
            let hex: String = chars.by_ref().take(2).collect();
            if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                bytes.push(byte);
                continue;
            }
            flush_bytes(&mut bytes, &mut out);
            out.push_str("\\x");
            out.push_str(&hex);
            continue;
        }
        flush_bytes(&mut bytes, &mut out);
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            // Left for serde_json to decode.
            Some('u') => out.push_str("\\u"),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    flush_bytes(&mut bytes, &mut out);
    out
}

fn flush_bytes(bytes: &mut Vec<u8>, out: &mut String) {
    if bytes.is_empty() {
        return;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => out.push_str(text),
        Err(_) => out.extend(bytes.iter().map(|&byte| char::from(byte))),
    }
    bytes.clear();
}
