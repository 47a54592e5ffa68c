mod common;

use common::{FakeSite, run_config};
use rcloud_engine::catalog::{CATALOG_ATTEMPTS, load_catalog};
use rcloud_engine::config::Command;
use rcloud_engine::error::RunError;
use std::path::Path;
use std::time::Duration;

fn titles(catalog: &rcloud_engine::catalog::Catalog) -> Vec<&str> {
    catalog
        .recordings
        .iter()
        .map(|r| r.title.as_str())
        .collect()
}

#[tokio::test]
async fn test_mixed_listing() {
    let mut site = FakeSite::new();
    site.add_standard("Jazz Night", "01.02.2024", Some("/download/jazz.mp3"))
        .add_hidden("Ghost")
        .add_series(&[("Episode 1", "02.02.2024"), ("Episode 2", "03.02.2024")])
        .add_broken("No Date")
        .add_compact(&[
            ("Morning Show | Live", None),
            ("04.02.2024", None),
            ("recorded", None),
            ("", Some("/download/morning.mp3")),
        ])
        .add_compact(&[
            ("05.02.2024", None),
            ("Late Show", None),
            ("", Some("/download/late.mp3")),
        ]);
    let config = run_config(Command::List, Path::new("."), None);

    let catalog = load_catalog(&mut site, &config).await.unwrap();

    assert_eq!(
        titles(&catalog),
        vec![
            "Jazz Night",
            "Episode 1",
            "Episode 2",
            "Morning Show | Live",
            "Late Show"
        ]
    );
    assert_eq!(catalog.skipped, 2);
    assert_eq!(catalog.dropped, 1);

    let jazz = &catalog.recordings[0];
    assert_eq!(jazz.date, "01.02.2024");
    assert_eq!(jazz.duration.as_deref(), Some("60 min"));
    assert_eq!(
        jazz.download_link.as_ref().map(|u| u.as_str()),
        Some("https://radio.test/download/jazz.mp3")
    );
    assert!(!jazz.is_compact_variant);

    let morning = &catalog.recordings[3];
    assert!(morning.is_compact_variant);
    assert_eq!(morning.date, "04.02.2024");
    assert_eq!(morning.file_name(), "Morning_Show_Live_04.02.2024.mp3");

    let late = &catalog.recordings[4];
    assert_eq!(late.date, "05.02.2024");
    assert_eq!(
        late.download_link.as_ref().map(|u| u.as_str()),
        Some("https://radio.test/download/late.mp3")
    );
}

#[tokio::test]
async fn test_browser_error_inside_one_item_drops_only_that_item() {
    let mut site = FakeSite::new();
    site.add_standard("A", "01.02.2024", None)
        .add_standard("B", "02.02.2024", None)
        .add_standard("C", "03.02.2024", None);
    site.unreadable_texts.push("B".to_string());
    let config = run_config(Command::List, Path::new("."), None);

    let catalog = load_catalog(&mut site, &config).await.unwrap();

    assert_eq!(titles(&catalog), vec!["A", "C"]);
    assert_eq!(catalog.dropped, 1);
}

#[tokio::test]
async fn test_recording_still_in_progress_has_no_link() {
    let mut site = FakeSite::new();
    site.add_standard("Live Now", "06.02.2024", None);
    let config = run_config(Command::List, Path::new("."), None);

    let catalog = load_catalog(&mut site, &config).await.unwrap();

    assert_eq!(catalog.recordings.len(), 1);
    assert!(catalog.recordings[0].download_link.is_none());
}

#[tokio::test]
async fn test_empty_listing_is_not_an_error() {
    let mut site = FakeSite::new();
    let config = run_config(Command::List, Path::new("."), None);

    let catalog = load_catalog(&mut site, &config).await.unwrap();

    assert!(catalog.recordings.is_empty());
    assert_eq!(catalog.dropped, 0);
}

#[tokio::test(start_paused = true)]
async fn test_container_appears_after_retries() {
    let mut site = FakeSite::new();
    site.container_misses = 2;
    site.add_standard("Jazz Night", "01.02.2024", None);
    let config = run_config(Command::List, Path::new("."), None);

    let catalog = load_catalog(&mut site, &config).await.unwrap();

    assert_eq!(titles(&catalog), vec!["Jazz Night"]);
    assert_eq!(site.navigations.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_missing_container_is_fatal_after_four_attempts() {
    let mut site = FakeSite::new();
    site.container_missing = true;
    let config = run_config(Command::List, Path::new("."), None);
    let started = tokio::time::Instant::now();

    let err = load_catalog(&mut site, &config).await.unwrap_err();

    assert!(matches!(
        err,
        RunError::CatalogUnavailable { attempts, .. } if attempts == CATALOG_ATTEMPTS
    ));
    // One pause between each pair of attempts.
    assert_eq!(
        started.elapsed(),
        config.timing.catalog_retry_delay() * (CATALOG_ATTEMPTS - 1)
    );
    assert!(started.elapsed() >= Duration::from_secs(3));
}
