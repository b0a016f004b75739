use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use sitemap_verifier_core::report::{generate_summary, output_path, save_json_report};
use sitemap_verifier_core::verify::{
    SitemapProgressCallback, VerifyOptions, VerifyResultCallback, execute_verification,
};
use sitemap_verifier_scanner::{FetchConfig, VerificationRecord};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use url::Url;

/// Install the stderr log subscriber; later calls are no-ops
pub fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build pipeline options from parsed command-line arguments
pub fn options_from_matches(matches: &ArgMatches) -> VerifyOptions {
    let sitemap_url = matches
        .get_one::<Url>("SITEMAP_URL")
        .map(|url| url.as_str().to_string())
        .unwrap_or_default();

    let defaults = FetchConfig::default();
    let fetch = FetchConfig {
        timeout: matches
            .get_one::<u64>("timeout")
            .map(|s| Duration::from_secs(*s))
            .unwrap_or(defaults.timeout),
        connect_timeout: matches
            .get_one::<u64>("connect-timeout")
            .map(|s| Duration::from_secs(*s))
            .unwrap_or(defaults.connect_timeout),
        max_retries: matches
            .get_one::<usize>("retries")
            .copied()
            .unwrap_or(defaults.max_retries),
        accept_invalid_certs: matches.get_flag("insecure"),
    };

    let mut options = VerifyOptions::new(sitemap_url);
    options.fetch = fetch;
    options.show_progress_bars = matches.get_flag("quiet");
    if let Some(concurrency) = matches.get_one::<u64>("concurrency") {
        options.concurrency = *concurrency as usize;
    }
    if let Some(max_depth) = matches.get_one::<usize>("max-depth") {
        options.max_depth = *max_depth;
    }
    options
}

pub fn output_dir_from_matches(matches: &ArgMatches) -> Option<PathBuf> {
    matches.get_one::<PathBuf>("output-dir").cloned()
}

fn print_record(record: &VerificationRecord) {
    match serde_json::to_string(record) {
        Ok(line) => println!("{}", line),
        Err(_) => println!("{:?}", record),
    }
}

fn colorize_summary_line(line: &str) -> String {
    let trimmed = line.trim_start();
    let colored = if trimmed.starts_with("Verified") {
        line.green()
    } else if trimmed.starts_with("Unverified") {
        line.red()
    } else if let Some(status) = trimmed.strip_prefix("HTTP ") {
        match status.chars().next() {
            Some('2') => line.green(),
            Some('3') => line.cyan(),
            Some('4') => line.yellow(),
            Some('5') => line.red(),
            _ => line.normal(),
        }
    } else {
        line.bold()
    };
    colored.to_string()
}

fn print_summary(records: &[VerificationRecord]) {
    println!();
    for line in generate_summary(records).lines() {
        println!("{}", colorize_summary_line(line));
    }
}

/// Run the whole pipeline and persist the results, returning the file written
pub async fn handle_verify(matches: &ArgMatches) -> Result<PathBuf> {
    let quiet = matches.get_flag("quiet");
    init_tracing(matches.get_flag("verbose"));

    let sitemap_url = matches
        .get_one::<Url>("SITEMAP_URL")
        .context("a sitemap URL is required")?
        .clone();
    let options = options_from_matches(matches);

    let sitemap_callback = (!quiet).then(|| {
        Arc::new(|url: String| {
            println!("Getting urls from: {}", url);
        }) as SitemapProgressCallback
    });
    let result_callback = (!quiet).then(|| {
        Arc::new(|record: VerificationRecord| {
            print_record(&record);
        }) as VerifyResultCallback
    });

    let records = execute_verification(options, sitemap_callback, result_callback)
        .await
        .with_context(|| format!("Failed to verify {}", sitemap_url))?;

    let path = output_path(output_dir_from_matches(matches).as_deref(), &sitemap_url);
    save_json_report(&records, &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if !quiet {
        print_summary(&records);
    }

    Ok(path)
}
