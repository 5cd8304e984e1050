use crate::downloader::test_helpers::{create_test_downloader, demo_show, render_rss};
use crate::filename;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Episode page body carrying the release marker and an og:image tag
fn released_page(thumb_url: &str) -> String {
    format!(
        r#"<html><head><meta property="og:image" content="{thumb_url}"/></head>
        <body>Video verfügbar bis 01.06.2024</body></html>"#
    )
}

fn season() -> String {
    filename::current_season_token()
}

fn read_to_string(path: &Path) -> String {
    std::fs::read_to_string(path).expect("file should exist")
}

#[tokio::test]
async fn demo_scenario_acquires_episode_end_to_end() {
    let server = MockServer::start().await;
    let ep_link = format!("{}/ep/1", server.uri());

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(render_rss(&[(
            "Ep1",
            &ep_link,
            "Wed, 10 Jan 2024 20:15:00 +0100",
        )])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ep/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(released_page(&format!("{}/thumb.jpg", server.uri()))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/thumb.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8]))
        .mount(&server)
        .await;

    let folder = TempDir::new().unwrap();
    let show = demo_show(folder.path(), &format!("{}/feed", server.uri()));
    let (downloader, fetcher, _state) =
        create_test_downloader(vec![show.clone()], Some("verfügbar bis".into())).await;

    downloader.check_show(&show).await.unwrap();

    let stem = format!("Demo S{}E01", season());

    // Media file was produced through the downloader with the right template
    let calls = fetcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, ep_link);
    assert!(calls[0].1.ends_with(&format!("{stem}.%(ext)s")));
    assert!(folder.path().join(format!("{stem}.mp4")).exists());

    // Metadata sidecar
    let nfo = read_to_string(&folder.path().join(format!("{stem}.nfo")));
    assert!(nfo.contains("<title>Ep1</title>"));
    assert!(nfo.contains("<plot>About Ep1</plot>"));
    assert!(nfo.contains("<aired>2024-01-10</aired>"));
    assert!(nfo.contains(&format!("<season>{}</season>", season().parse::<u32>().unwrap())));
    assert!(nfo.contains("<episode>1</episode>"));

    // Thumbnail
    let thumb = std::fs::read(folder.path().join(format!("{stem}-thumb.jpg"))).unwrap();
    assert_eq!(thumb, vec![0xFF, 0xD8]);

    // History records the source link
    assert!(downloader.db.is_in_history(&ep_link).await.unwrap());
}

#[tokio::test]
async fn second_poll_with_same_entry_is_a_noop() {
    let server = MockServer::start().await;
    let ep_link = format!("{}/ep/1", server.uri());

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(render_rss(&[(
            "Ep1",
            &ep_link,
            "Wed, 10 Jan 2024 20:15:00 +0100",
        )])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ep/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(released_page(&format!("{}/thumb.jpg", server.uri()))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/thumb.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF]))
        .mount(&server)
        .await;

    let folder = TempDir::new().unwrap();
    let show = demo_show(folder.path(), &format!("{}/feed", server.uri()));
    let (downloader, fetcher, _state) =
        create_test_downloader(vec![show.clone()], Some("verfügbar bis".into())).await;

    downloader.check_show(&show).await.unwrap();
    let files_after_first: Vec<_> = std::fs::read_dir(folder.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();

    downloader.check_show(&show).await.unwrap();
    let files_after_second: Vec<_> = std::fs::read_dir(folder.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();

    assert_eq!(fetcher.call_count(), 1, "known episode must not re-download");
    assert_eq!(files_after_first.len(), files_after_second.len());
}

#[tokio::test]
async fn failed_download_stays_out_of_history_and_is_retried() {
    let server = MockServer::start().await;
    let ep_link = format!("{}/ep/1", server.uri());

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(render_rss(&[(
            "Ep1",
            &ep_link,
            "Wed, 10 Jan 2024 20:15:00 +0100",
        )])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ep/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(released_page(&format!("{}/thumb.jpg", server.uri()))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/thumb.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF]))
        .mount(&server)
        .await;

    let folder = TempDir::new().unwrap();
    let show = demo_show(folder.path(), &format!("{}/feed", server.uri()));
    let (downloader, fetcher, _state) =
        create_test_downloader(vec![show.clone()], Some("verfügbar bis".into())).await;

    fetcher.fail_for(&ep_link);
    downloader.check_show(&show).await.unwrap();

    let stem = format!("Demo S{}E01", season());
    assert!(
        !downloader.db.is_in_history(&ep_link).await.unwrap(),
        "failed download must not be recorded"
    );
    assert!(!folder.path().join(format!("{stem}.mp4")).exists());
    // Sidecars are written before the download attempt and stay in place
    assert!(folder.path().join(format!("{stem}.nfo")).exists());

    // Next poll retries and succeeds
    fetcher.succeed_for(&ep_link);
    downloader.check_show(&show).await.unwrap();

    assert_eq!(fetcher.call_count(), 2);
    assert!(downloader.db.is_in_history(&ep_link).await.unwrap());
    assert!(folder.path().join(format!("{stem}.mp4")).exists());
}

#[tokio::test]
async fn newest_first_feed_is_numbered_in_publication_order() {
    let server = MockServer::start().await;
    let links: Vec<String> = (1..=3).map(|i| format!("{}/ep/{i}", server.uri())).collect();

    // Feed lists newest first, as broadcasters do
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(render_rss(&[
            ("Ep3", &links[2], "Wed, 24 Jan 2024 20:15:00 +0100"),
            ("Ep2", &links[1], "Wed, 17 Jan 2024 20:15:00 +0100"),
            ("Ep1", &links[0], "Wed, 10 Jan 2024 20:15:00 +0100"),
        ])))
        .mount(&server)
        .await;
    for i in 1..=3 {
        Mock::given(method("GET"))
            .and(path(format!("/ep/{i}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("Video verfügbar bis 01.06.2024"),
            )
            .mount(&server)
            .await;
    }

    let folder = TempDir::new().unwrap();
    let show = demo_show(folder.path(), &format!("{}/feed", server.uri()));
    let (downloader, fetcher, _state) =
        create_test_downloader(vec![show.clone()], Some("verfügbar bis".into())).await;

    downloader.check_show(&show).await.unwrap();

    // Oldest entry downloaded first
    let fetched: Vec<String> = fetcher.calls().into_iter().map(|(url, _)| url).collect();
    assert_eq!(fetched, links);

    // Episode numbers ascend in publication order
    for (i, title) in [(1, "Ep1"), (2, "Ep2"), (3, "Ep3")] {
        let stem = format!("Demo S{}E0{i}", season());
        assert!(folder.path().join(format!("{stem}.mp4")).exists());
        let nfo = read_to_string(&folder.path().join(format!("{stem}.nfo")));
        assert!(
            nfo.contains(&format!("<title>{title}</title>")),
            "episode {i} should hold {title}"
        );
        assert!(nfo.contains(&format!("<episode>{i}</episode>")));
    }
}

#[tokio::test]
async fn missing_thumbnail_degrades_gracefully() {
    let server = MockServer::start().await;
    let ep_link = format!("{}/ep/1", server.uri());

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(render_rss(&[(
            "Ep1",
            &ep_link,
            "Wed, 10 Jan 2024 20:15:00 +0100",
        )])))
        .mount(&server)
        .await;
    // Page is released but carries no og:image tag
    Mock::given(method("GET"))
        .and(path("/ep/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Video verfügbar bis 01.06.2024"))
        .mount(&server)
        .await;

    let folder = TempDir::new().unwrap();
    let show = demo_show(folder.path(), &format!("{}/feed", server.uri()));
    let (downloader, _fetcher, _state) =
        create_test_downloader(vec![show.clone()], Some("verfügbar bis".into())).await;

    downloader.check_show(&show).await.unwrap();

    let stem = format!("Demo S{}E01", season());
    assert!(!folder.path().join(format!("{stem}-thumb.jpg")).exists());
    assert!(folder.path().join(format!("{stem}.nfo")).exists());
    assert!(folder.path().join(format!("{stem}.mp4")).exists());
    assert!(downloader.db.is_in_history(&ep_link).await.unwrap());
}

#[tokio::test]
async fn disabled_release_marker_skips_the_release_check() {
    let server = MockServer::start().await;
    let ep_link = format!("{}/ep/1", server.uri());

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(render_rss(&[(
            "Ep1",
            &ep_link,
            "Wed, 10 Jan 2024 20:15:00 +0100",
        )])))
        .mount(&server)
        .await;
    // No page mock: the unmatched episode page 404s, which only costs the
    // thumbnail. With release checking disabled the entry is still taken.

    let folder = TempDir::new().unwrap();
    let show = demo_show(folder.path(), &format!("{}/feed", server.uri()));
    let (downloader, fetcher, _state) = create_test_downloader(vec![show.clone()], None).await;

    downloader.check_show(&show).await.unwrap();

    assert_eq!(fetcher.call_count(), 1);
    assert!(downloader.db.is_in_history(&ep_link).await.unwrap());
}

#[tokio::test]
async fn one_failing_show_does_not_abort_the_others() {
    let server = MockServer::start().await;
    let ep_link = format!("{}/ep/1", server.uri());

    // First show's feed is broken
    Mock::given(method("GET"))
        .and(path("/broken-feed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(render_rss(&[(
            "Ep1",
            &ep_link,
            "Wed, 10 Jan 2024 20:15:00 +0100",
        )])))
        .mount(&server)
        .await;

    let broken_folder = TempDir::new().unwrap();
    let folder = TempDir::new().unwrap();
    let mut broken = demo_show(broken_folder.path(), &format!("{}/broken-feed", server.uri()));
    broken.name = "Broken".into();
    broken.download.filename_prefix = "Broken".into();
    let show = demo_show(folder.path(), &format!("{}/feed", server.uri()));

    let (downloader, fetcher, _state) = create_test_downloader(vec![broken, show], None).await;

    downloader.check_all_shows().await;

    assert_eq!(fetcher.call_count(), 1, "healthy show must still be processed");
    assert!(downloader.db.is_in_history(&ep_link).await.unwrap());
}

#[tokio::test]
async fn missing_download_folder_fails_the_show() {
    let folder = TempDir::new().unwrap();
    let mut show = demo_show(folder.path(), "https://example.com/feed");
    show.download.folder = folder.path().join("does-not-exist");
    let (downloader, _fetcher, _state) = create_test_downloader(vec![show.clone()], None).await;

    let result = downloader.check_show(&show).await;

    assert!(matches!(result, Err(crate::error::Error::Config { .. })));
}

#[tokio::test]
async fn malformed_existing_filename_aborts_the_show() {
    let server = MockServer::start().await;
    let ep_link = format!("{}/ep/1", server.uri());

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(render_rss(&[(
            "Ep1",
            &ep_link,
            "Wed, 10 Jan 2024 20:15:00 +0100",
        )])))
        .mount(&server)
        .await;

    let folder = TempDir::new().unwrap();
    // A media file that carries the prefix but not the naming pattern
    std::fs::write(folder.path().join("Demo special.mp4"), b"").unwrap();

    let show = demo_show(folder.path(), &format!("{}/feed", server.uri()));
    let (downloader, fetcher, _state) = create_test_downloader(vec![show.clone()], None).await;

    let result = downloader.check_show(&show).await;

    assert!(matches!(result, Err(crate::error::Error::Filename(_))));
    assert_eq!(fetcher.call_count(), 0, "no download may happen on corrupted state");
    assert!(!downloader.db.is_in_history(&ep_link).await.unwrap());
}
