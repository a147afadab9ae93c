mod common;

use pretty_assertions::assert_eq;
use std::collections::HashSet;

use common::{folder_page, serve_folders};
use mpcfill_drive_core::contract::FetchError;
use mpcfill_drive_core::drive::ResourceIdentifier;
use mpcfill_drive_core::error::DriveError;
use mpcfill_drive_core::traverse::traverse;

const ROOT: &str = "1RootFolderAbCdEf";
const BASICS: &str = "1BasicsFolderAbCd";
const LANDS: &str = "1LandsFolderAbCdE";
const TOKENS: &str = "1TokensFolderAbCd";

fn names(entries: &[mpcfill_drive_core::drive::DriveEntry]) -> Vec<(String, String)> {
    entries
        .iter()
        .map(|entry| (entry.display_path(), entry.name.clone()))
        .collect()
}

#[tokio::test]
async fn lists_depth_first_in_listing_order() {
    let fetcher = serve_folders(vec![
        (
            ROOT,
            Ok(folder_page(&[
                ("1RootCardAbCdEfGh", "root.png", false),
                (BASICS, "Basics", true),
                (TOKENS, "Tokens", true),
            ])),
        ),
        (
            BASICS,
            Ok(folder_page(&[
                (LANDS, "Lands", true),
                ("1BasicCardAbCdEfG", "bolt.png", false),
            ])),
        ),
        (LANDS, Ok(folder_page(&[("1LandCardAbCdEfGh", "forest.png", false)]))),
        (TOKENS, Ok(folder_page(&[("1TokenCardAbCdEfG", "goblin.png", false)]))),
    ]);

    let traversal = traverse(&fetcher, &ResourceIdentifier::folder(ROOT), 5, &HashSet::new())
        .await
        .expect("traversal should succeed");

    assert_eq!(
        names(&traversal.entries),
        vec![
            (String::new(), "root.png".to_string()),
            (String::new(), "Basics".to_string()),
            (String::new(), "Tokens".to_string()),
            ("Basics".to_string(), "Lands".to_string()),
            ("Basics".to_string(), "bolt.png".to_string()),
            ("Basics/Lands".to_string(), "forest.png".to_string()),
            ("Tokens".to_string(), "goblin.png".to_string()),
        ]
    );
    assert_eq!(traversal.folders_listed, 4);
    assert_eq!(traversal.files().count(), 4);
    assert_eq!(traversal.folders().count(), 3);
    assert!(traversal.failures.is_empty());
}

#[tokio::test]
async fn cycles_fetch_each_folder_once() {
    // Each folder links back to the other; the mock fails if a page is requested twice.
    let fetcher = serve_folders(vec![
        (
            ROOT,
            Ok(folder_page(&[
                (BASICS, "Basics", true),
                ("1RootCardAbCdEfGh", "root.png", false),
            ])),
        ),
        (
            BASICS,
            Ok(folder_page(&[
                (ROOT, "Back to root", true),
                (BASICS, "Basics", true),
                ("1BasicCardAbCdEfG", "bolt.png", false),
            ])),
        ),
    ]);

    let traversal = traverse(&fetcher, &ResourceIdentifier::folder(ROOT), 10, &HashSet::new())
        .await
        .expect("traversal should succeed");

    assert_eq!(traversal.folders_listed, 2);
    assert_eq!(traversal.files().count(), 2);
}

#[tokio::test]
async fn max_depth_zero_lists_only_the_root() {
    let fetcher = serve_folders(vec![(
        ROOT,
        Ok(folder_page(&[
            (BASICS, "Basics", true),
            ("1RootCardAbCdEfGh", "root.png", false),
        ])),
    )]);

    let traversal = traverse(&fetcher, &ResourceIdentifier::folder(ROOT), 0, &HashSet::new())
        .await
        .expect("traversal should succeed");

    assert_eq!(traversal.folders_listed, 1);
    assert_eq!(
        names(&traversal.entries),
        vec![
            (String::new(), "Basics".to_string()),
            (String::new(), "root.png".to_string()),
        ]
    );
}

#[tokio::test]
async fn max_depth_limits_descent() {
    let fetcher = serve_folders(vec![
        (ROOT, Ok(folder_page(&[(BASICS, "Basics", true)]))),
        (BASICS, Ok(folder_page(&[(LANDS, "Lands", true)]))),
    ]);

    let traversal = traverse(&fetcher, &ResourceIdentifier::folder(ROOT), 1, &HashSet::new())
        .await
        .expect("traversal should succeed");

    assert_eq!(traversal.folders_listed, 2);
    assert_eq!(traversal.folders().count(), 2);
}

#[tokio::test]
async fn excluded_folders_are_listed_but_not_entered() {
    let fetcher = serve_folders(vec![
        (
            ROOT,
            Ok(folder_page(&[
                (BASICS, "Basics", true),
                (TOKENS, "Tokens", true),
                (LANDS, "tokens", true),
            ])),
        ),
        (BASICS, Ok(folder_page(&[("1BasicCardAbCdEfG", "bolt.png", false)]))),
        // Matching is case-sensitive, so "tokens" is still entered.
        (LANDS, Ok(folder_page(&[("1LandCardAbCdEfGh", "forest.png", false)]))),
    ]);
    let excluded = HashSet::from(["Tokens".to_string()]);

    let traversal = traverse(&fetcher, &ResourceIdentifier::folder(ROOT), 5, &excluded)
        .await
        .expect("traversal should succeed");

    assert_eq!(traversal.folders_listed, 3);
    let files: Vec<&str> = traversal.files().map(|entry| entry.name.as_str()).collect();
    assert_eq!(files, vec!["bolt.png", "forest.png"]);
    assert!(traversal.folders().any(|entry| entry.name == "Tokens"));
}

#[tokio::test]
async fn subfolder_failure_does_not_stop_siblings() {
    let fetcher = serve_folders(vec![
        (
            ROOT,
            Ok(folder_page(&[
                (BASICS, "Basics", true),
                (TOKENS, "Tokens", true),
            ])),
        ),
        (
            BASICS,
            Err(FetchError::Timeout {
                url: "https://drive.google.com/drive/folders/1BasicsFolderAbCd".to_string(),
            }),
        ),
        (TOKENS, Ok(folder_page(&[("1TokenCardAbCdEfG", "goblin.png", false)]))),
    ]);

    let traversal = traverse(&fetcher, &ResourceIdentifier::folder(ROOT), 5, &HashSet::new())
        .await
        .expect("root listing succeeded");

    assert_eq!(traversal.failures.len(), 1);
    let failure = &traversal.failures[0];
    assert_eq!(failure.id, BASICS);
    assert_eq!(failure.path, vec!["Basics".to_string()]);
    assert!(matches!(
        failure.error,
        DriveError::Fetch(FetchError::Timeout { .. })
    ));
    let files: Vec<&str> = traversal.files().map(|entry| entry.name.as_str()).collect();
    assert_eq!(files, vec!["goblin.png"]);
}

#[tokio::test]
async fn root_failure_is_an_error() {
    let fetcher = serve_folders(vec![(
        ROOT,
        Err(FetchError::Status {
            url: "https://drive.google.com/drive/folders/1RootFolderAbCdEf".to_string(),
            status: 403,
        }),
    )]);

    let result = traverse(&fetcher, &ResourceIdentifier::folder(ROOT), 5, &HashSet::new()).await;

    assert!(matches!(
        result,
        Err(DriveError::Fetch(FetchError::Status { status: 403, .. }))
    ));
}
