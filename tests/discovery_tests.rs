// Ordered strategy search and predicate filtering

use gosdk::discovery::{self, Discovery, discover_using};
use gosdk::{ErrorKind, Sdk, SdkError, is_max_version, is_min_version, is_version};
use semver::Version;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn sdk(version: &str) -> Sdk {
    Sdk {
        version: gosdk::version::parse_tolerant(version).unwrap(),
        os: "linux".to_string(),
        arch: "amd64".to_string(),
        root: PathBuf::from(format!("/sdk/{}", version)),
        binary: PathBuf::from(format!("/sdk/{}/bin/go", version)),
    }
}

/// A strategy that counts how often it was asked.
fn counting(
    name: &str,
    calls: Arc<AtomicUsize>,
    result: fn() -> gosdk::Result<Vec<Sdk>>,
) -> Box<dyn Discovery> {
    Box::new(discovery::from_fn(name, move || {
        calls.fetch_add(1, Ordering::SeqCst);
        result()
    }))
}

#[tokio::test]
async fn test_first_matching_strategy_wins() {
    let calls: Vec<Arc<AtomicUsize>> = (0..4).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let discoveries = vec![
        counting("a", calls[0].clone(), || Err(SdkError::NoSdk)),
        counting("b", calls[1].clone(), || Ok(vec![sdk("1.10")])),
        counting("c", calls[2].clone(), || Ok(vec![sdk("1.16")])),
        counting("d", calls[3].clone(), || Ok(vec![sdk("1.18")])),
    ];

    let found = discover_using(&discoveries, &[is_min_version("1.14")])
        .await
        .unwrap();

    assert_eq!(found.version, Version::new(1, 16, 0));
    let counts: Vec<usize> = calls.iter().map(|c| c.load(Ordering::SeqCst)).collect();
    assert_eq!(counts, vec![1, 1, 1, 0]);
}

#[tokio::test]
async fn test_candidates_in_order() {
    let discoveries: Vec<Box<dyn Discovery>> = vec![Box::new(discovery::from_fn("a", || {
        Ok(vec![sdk("1.10"), sdk("1.16")])
    }))];

    let found = discover_using(&discoveries, &[is_min_version("1.14")])
        .await
        .unwrap();
    assert_eq!(found.version, Version::new(1, 16, 0));
}

#[tokio::test]
async fn test_non_recoverable_error_aborts() {
    let calls = Arc::new(AtomicUsize::new(0));
    let discoveries = vec![
        counting("broken", Arc::new(AtomicUsize::new(0)), || {
            Err(SdkError::Layout {
                path: PathBuf::from("/sdk/bin/go"),
            })
        }),
        counting("never", calls.clone(), || Ok(vec![sdk("1.16")])),
    ];

    let err = discover_using(&discoveries, &[]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Layout);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_nothing_matches() {
    let discoveries: Vec<Box<dyn Discovery>> = vec![
        Box::new(discovery::from_fn("a", || Err(SdkError::NoSdk))),
        Box::new(discovery::from_fn("b", || Ok(vec![sdk("1.10")]))),
        Box::new(discovery::from_fn("c", || Ok(Vec::new()))),
    ];

    let err = discover_using(&discoveries, &[is_version("1.16")])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoSdk);
}

#[tokio::test]
async fn test_version_window() {
    let discoveries: Vec<Box<dyn Discovery>> = vec![Box::new(discovery::from_fn("a", || {
        Ok(vec![sdk("1.13"), sdk("1.22.1"), sdk("1.19.3"), sdk("1.20")])
    }))];

    let found = discover_using(
        &discoveries,
        &[is_min_version("1.14"), is_max_version("1.20")],
    )
    .await
    .unwrap();
    assert_eq!(found.version, Version::new(1, 19, 3));
}

#[tokio::test]
async fn test_default_discoveries_order() {
    let settings = gosdk::Settings::new("/cache");
    let discoveries =
        discovery::default_discoveries(&settings, Arc::new(gosdk::http::Pipeline::new())).unwrap();
    let names: Vec<&str> = discoveries.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["PATH", "GOROOT", "download"]);
}

#[tokio::test]
async fn test_default_discoveries_reject_bad_version() {
    let mut settings = gosdk::Settings::new("/cache");
    settings.version = "tip".to_string();
    let err = discovery::default_discoveries(&settings, Arc::new(gosdk::http::Pipeline::new()))
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Parse);
}
