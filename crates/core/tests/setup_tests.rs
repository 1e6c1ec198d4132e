//! End-to-end orchestration with in-memory collaborators.

mod support;

use setup_mandrel_core::{Error, MandrelSetup};
use std::path::PathBuf;
use std::sync::Arc;
use support::{FakeUpstream, MemoryCache, RecordingFetcher, linux_amd64};

struct Harness {
    upstream: Arc<FakeUpstream>,
    fetcher: Arc<RecordingFetcher>,
    cache: Arc<MemoryCache>,
    setup: MandrelSetup,
}

fn harness(upstream: FakeUpstream, fetcher: RecordingFetcher) -> Harness {
    let upstream = Arc::new(upstream);
    let fetcher = Arc::new(fetcher);
    let cache = Arc::new(MemoryCache::default());
    let setup = MandrelSetup::new(
        linux_amd64(),
        upstream.clone(),
        upstream.clone(),
        fetcher.clone(),
        cache.clone(),
    );
    Harness {
        upstream,
        fetcher,
        cache,
        setup,
    }
}

#[tokio::test]
async fn test_set_up_toolchain_downloads_resolved_artifact() {
    let h = harness(
        FakeUpstream::with_tags(&["mandrel-23.1.0.0-Final", "mandrel-23.1.2.0-Final"]),
        RecordingFetcher::default(),
    );

    let home = h.setup.set_up_toolchain("23.1", "21").await.unwrap();

    assert_eq!(
        home,
        PathBuf::from("/opt/hostedtoolcache/mandrel-java21-linux/23.1.2.0/x64")
    );
    assert_eq!(
        *h.fetcher.urls.lock().unwrap(),
        vec![
            "https://github.com/graalvm/mandrel/releases/download/mandrel-23.1.2.0/mandrel-java21-linux-amd64-23.1.2.0.tar.gz"
        ]
    );
}

#[tokio::test]
async fn test_second_install_reuses_cache() {
    let h = harness(FakeUpstream::default(), RecordingFetcher::default());

    let first = h.setup.install("23.1.2.0-Final", "17").await.unwrap();
    let second = h.setup.install("23.1.2.0-Final", "17").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(h.cache.fetch_count(), 1);
    assert_eq!(h.fetcher.urls.lock().unwrap().len(), 1);
    assert_eq!(h.upstream.lookups(), 0);
}

#[tokio::test]
async fn test_install_reports_coordinates() {
    let h = harness(FakeUpstream::default(), RecordingFetcher::default());

    let installed = h.setup.install("21.3.0.0-Final", "17").await.unwrap();

    assert_eq!(installed.version(), "21.3.0.0-Final");
    assert_eq!(
        installed.coordinates.identifier,
        "mandrel-java17-linux-amd64-21.3.0.0-Final"
    );
    assert_eq!(installed.coordinates.tool_name, "mandrel-java17-linux");
    assert_eq!(installed.bin_dir(), installed.home.join("bin"));
}

#[tokio::test]
async fn test_download_failure_is_tagged_with_specifier_and_version() {
    let h = harness(
        FakeUpstream::with_latest("mandrel-23.1.2.0-Final"),
        RecordingFetcher {
            fail: true,
            ..RecordingFetcher::default()
        },
    );

    let err = h.setup.set_up_toolchain("latest", "21").await.unwrap_err();

    match &err {
        Error::AcquisitionFailed {
            specifier,
            version,
            message,
        } => {
            assert_eq!(specifier, "latest");
            assert_eq!(version, "23.1.2.0");
            assert!(message.contains("404"), "{message}");
        }
        other => panic!("expected AcquisitionFailed, got {other:?}"),
    }
    assert!(!err.is_resolution_error());
}

#[tokio::test]
async fn test_resolution_failure_skips_download() {
    let h = harness(FakeUpstream::with_tags(&[]), RecordingFetcher::default());

    let err = h.setup.set_up_toolchain("9.9", "21").await.unwrap_err();

    assert!(matches!(err, Error::VersionNotFound { .. }));
    assert!(err.is_resolution_error());
    assert!(h.fetcher.urls.lock().unwrap().is_empty());
    assert_eq!(h.cache.fetch_count(), 0);
}

#[tokio::test]
async fn test_path_like_version_is_rejected_before_download() {
    let h = harness(FakeUpstream::default(), RecordingFetcher::default());

    let err = h
        .setup
        .set_up_toolchain("1.2.3/../../../victim", "21")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidSpecifier { .. }), "{err:?}");
    assert!(h.fetcher.urls.lock().unwrap().is_empty());
    assert_eq!(h.cache.fetch_count(), 0);
    assert_eq!(h.upstream.lookups(), 0);
}

#[tokio::test]
async fn test_locate_does_not_download() {
    let h = harness(
        FakeUpstream::with_latest("mandrel-24.1.1.0-Final"),
        RecordingFetcher::default(),
    );

    let coords = h.setup.locate("mandrel-latest", "22").await.unwrap();

    assert_eq!(coords.version, "24.1.1.0");
    assert_eq!(coords.tool_name, "mandrel-java22-linux");
    assert!(h.fetcher.urls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_resolve_only() {
    let h = harness(
        FakeUpstream::with_tags(&["mandrel-22.3.4.0-Final"]),
        RecordingFetcher::default(),
    );

    assert_eq!(h.setup.resolve("22").await.unwrap(), "22.3.4.0");
}
