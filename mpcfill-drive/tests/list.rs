use mpcfill_drive::cli::{list_with, ListArgs};
use mpcfill_drive_core::config::Config;
use mpcfill_drive_core::contract::{FetchError, MockPageFetcher};
use mpcfill_drive_core::drive::folder_url;
use mpcfill_drive_core::manifest::Manifest;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

const ROOT: &str = "1RootFolderAbCdEf";
const TOKENS: &str = "1TokensFolderAbCd";

fn page(items: &[(&str, &str, bool)]) -> String {
    let rows: String = items
        .iter()
        .map(|(id, name, is_folder)| {
            let target = if *is_folder { "folder" } else { "file" };
            format!(r#"<div data-id="{id}" data-target="{target}">{name}</div>"#)
        })
        .collect();
    format!("<html><body>{rows}</body></html>")
}

fn serve(fetcher: &mut MockPageFetcher, id: &str, response: Result<String, FetchError>) {
    let expected = folder_url(id);
    fetcher
        .expect_fetch()
        .withf(move |requested| requested.to_string() == expected)
        .times(1)
        .returning(move |_| response.clone());
}

fn config_in(dir: &std::path::Path) -> Config {
    Config {
        output_dir: dir.to_path_buf(),
        ..Config::default()
    }
}

fn args(url: String) -> ListArgs {
    ListArgs {
        url,
        ..ListArgs::default()
    }
}

#[tokio::test]
async fn writes_a_manifest_with_directives_applied() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut fetcher = MockPageFetcher::new();
    serve(
        &mut fetcher,
        ROOT,
        Ok(page(&[
            ("1FrontCardAbCdEfG", "front.png", false),
            ("1BackCardAbCdEfGh", "back.png", false),
            ("1BoltCardAbCdEfGh", "bolt.png", false),
            ("1SkipCardAbCdEfGh", "skip.png", false),
        ])),
    );
    let args = ListArgs {
        output: Some(PathBuf::from("deck.xml")),
        exclude: vec!["skip.png".to_string()],
        double_sided: Some("front.png|back.png".to_string()),
        card_multiples: Some("bolt.png|2".to_string()),
        stock: Some("(S33) Superior Smooth".to_string()),
        foil: true,
        ..args(folder_url(ROOT))
    };

    let written = list_with(&fetcher, &config_in(dir.path()), &args)
        .await
        .expect("list should succeed")
        .expect("a manifest path");

    assert_eq!(written, dir.path().join("deck.xml"));
    let manifest = Manifest::from_xml(&std::fs::read_to_string(&written).unwrap()).unwrap();
    let fronts: Vec<&str> = manifest.slots.iter().map(|s| s.front.name.as_str()).collect();
    assert_eq!(fronts, vec!["front.png", "bolt.png", "bolt.png"]);
    assert_eq!(manifest.back_count(), 1);
    assert_eq!(manifest.stock, "(S33) Superior Smooth");
    assert!(manifest.foil);
    assert_eq!(manifest.bracket, 18);
}

#[tokio::test]
async fn recursive_listing_skips_excluded_folders() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut fetcher = MockPageFetcher::new();
    serve(
        &mut fetcher,
        ROOT,
        Ok(page(&[
            (TOKENS, "Tokens", true),
            ("1RootCardAbCdEfGh", "root.png", false),
        ])),
    );
    let args = ListArgs {
        recursive: true,
        exclude: vec!["Tokens".to_string()],
        output: Some(PathBuf::from("deck.xml")),
        ..args(folder_url(ROOT))
    };

    let written = list_with(&fetcher, &config_in(dir.path()), &args)
        .await
        .expect("list should succeed")
        .expect("a manifest path");

    let manifest = Manifest::from_xml(&std::fs::read_to_string(written).unwrap()).unwrap();
    assert_eq!(manifest.slots.len(), 1);
}

#[tokio::test]
async fn file_exclusion_ignores_case() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut fetcher = MockPageFetcher::new();
    serve(
        &mut fetcher,
        ROOT,
        Ok(page(&[
            ("1KeepCardAbCdEfGh", "keep.png", false),
            ("1SkipCardAbCdEfGh", "skip.png", false),
            ("1LoudCardAbCdEfGh", "Loud.JPG", false),
        ])),
    );
    let args = ListArgs {
        exclude: vec!["SKIP.png".to_string(), "loud.jpg".to_string()],
        output: Some(PathBuf::from("deck.xml")),
        ..args(folder_url(ROOT))
    };

    let written = list_with(&fetcher, &config_in(dir.path()), &args)
        .await
        .expect("list should succeed")
        .expect("a manifest path");

    let manifest = Manifest::from_xml(&std::fs::read_to_string(written).unwrap()).unwrap();
    let fronts: Vec<&str> = manifest.slots.iter().map(|s| s.front.name.as_str()).collect();
    assert_eq!(fronts, vec!["keep.png"]);
}

#[tokio::test]
async fn without_output_nothing_is_written() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut fetcher = MockPageFetcher::new();
    serve(&mut fetcher, ROOT, Ok(page(&[])));

    let written = list_with(&fetcher, &config_in(dir.path()), &args(folder_url(ROOT)))
        .await
        .expect("an empty folder is not an error");

    assert_eq!(written, None);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn invalid_directives_fail_before_fetching() {
    let dir = tempfile::tempdir().expect("temp dir");
    let fetcher = MockPageFetcher::new();
    let args = ListArgs {
        card_multiples: Some("bolt.png|0".to_string()),
        ..args(folder_url(ROOT))
    };

    let err = list_with(&fetcher, &config_in(dir.path()), &args)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("count must be at least 1"), "{err:#}");
}

#[tokio::test]
async fn root_fetch_failure_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut fetcher = MockPageFetcher::new();
    serve(
        &mut fetcher,
        ROOT,
        Err(FetchError::Status {
            url: folder_url(ROOT),
            status: 404,
        }),
    );

    let err = list_with(&fetcher, &config_in(dir.path()), &args(folder_url(ROOT)))
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("404"), "{err:#}");
}
