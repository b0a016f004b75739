use clap::error::ErrorKind;
use sitemap_verifier::commands::command_argument_builder;
use sitemap_verifier::handlers::*;
use std::path::PathBuf;
use std::time::Duration;

fn parse(args: &[&str]) -> Result<clap::ArgMatches, clap::Error> {
    let mut argv = vec!["sitemap-verifier"];
    argv.extend_from_slice(args);
    command_argument_builder().try_get_matches_from(argv)
}

// ============================================================================
// Argument count / usage Tests
// ============================================================================

#[test]
fn test_no_arguments_is_a_usage_error() {
    let err = parse(&[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    assert!(err.to_string().contains("Usage"));
}

#[test]
fn test_two_arguments_is_a_usage_error() {
    let err = parse(&[
        "https://example.test/sitemap.xml",
        "https://example.test/other.xml",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownArgument);
}

#[test]
fn test_malformed_url_is_rejected() {
    let err = parse(&["not a url"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}

#[test]
fn test_non_http_scheme_is_rejected() {
    let err = parse(&["ftp://example.test/sitemap.xml"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}

#[test]
fn test_zero_concurrency_is_rejected() {
    let err = parse(&["-c", "0", "https://example.test/sitemap.xml"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}

// ============================================================================
// Option mapping Tests
// ============================================================================

#[test]
fn test_defaults() {
    let matches = parse(&["https://example.test/sitemap.xml"]).unwrap();
    let options = options_from_matches(&matches);

    assert_eq!(options.sitemap_url, "https://example.test/sitemap.xml");
    assert_eq!(options.concurrency, 30);
    assert_eq!(options.max_depth, 3);
    assert_eq!(options.fetch.timeout, Duration::from_secs(10));
    assert_eq!(options.fetch.connect_timeout, Duration::from_secs(5));
    assert_eq!(options.fetch.max_retries, 2);
    assert!(!options.fetch.accept_invalid_certs);
    assert!(!options.show_progress_bars);
    assert_eq!(output_dir_from_matches(&matches), None);
}

#[test]
fn test_all_flags() {
    let matches = parse(&[
        "--concurrency",
        "8",
        "-t",
        "3",
        "--connect-timeout",
        "1",
        "-r",
        "0",
        "-d",
        "1",
        "--insecure",
        "--quiet",
        "-o",
        "/tmp/results",
        "http://example.test/sitemap_index.xml",
    ])
    .unwrap();
    let options = options_from_matches(&matches);

    assert_eq!(options.sitemap_url, "http://example.test/sitemap_index.xml");
    assert_eq!(options.concurrency, 8);
    assert_eq!(options.max_depth, 1);
    assert_eq!(options.fetch.timeout, Duration::from_secs(3));
    assert_eq!(options.fetch.connect_timeout, Duration::from_secs(1));
    assert_eq!(options.fetch.max_retries, 0);
    assert!(options.fetch.accept_invalid_certs);
    assert!(options.show_progress_bars);
    assert_eq!(
        output_dir_from_matches(&matches),
        Some(PathBuf::from("/tmp/results"))
    );
}

#[test]
fn test_init_tracing_twice_is_harmless() {
    init_tracing(false);
    init_tracing(true);
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_handle_verify_writes_empty_report_for_unreachable_sitemap() {
    let dir = tempfile::TempDir::new().unwrap();

    // Nothing listens on port 9 on loopback; the sitemap is simply absent
    let matches = parse(&[
        "--quiet",
        "-r",
        "0",
        "-o",
        dir.path().to_str().unwrap(),
        "http://127.0.0.1:9/sitemap.xml",
    ])
    .unwrap();

    let path = handle_verify(&matches).await.unwrap();

    assert_eq!(path.parent(), Some(dir.path()));
    assert!(
        path.file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("127.0.0.1_")
    );
    assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
}

#[tokio::test]
async fn test_handle_verify_reports_unwritable_output() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("missing");

    let matches = parse(&[
        "--quiet",
        "-r",
        "0",
        "-o",
        missing.to_str().unwrap(),
        "http://127.0.0.1:9/sitemap.xml",
    ])
    .unwrap();

    let err = handle_verify(&matches).await.unwrap_err();
    assert!(err.to_string().contains("Failed to write"));
}
