use crate::CLAP_STYLING;
use clap::arg;
use sitemap_verifier_core::verify::parse_sitemap_url;
use url::Url;

fn sitemap_url_parser(raw: &str) -> Result<Url, String> {
    parse_sitemap_url(raw).map_err(|e| e.to_string())
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitemap-verifier")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitemap-verifier")
        .about("Expand a sitemap tree and check that every URL it lists responds")
        .styles(CLAP_STYLING)
        .arg(
            arg!(<SITEMAP_URL>)
                .help("Absolute http(s) URL of the sitemap or sitemap index")
                .value_parser(sitemap_url_parser),
        )
        .arg(
            arg!(-c --"concurrency" <N>)
                .required(false)
                .help("Maximum number of URLs verified in parallel per wave")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("30"),
        )
        .arg(
            arg!(-t --"timeout" <SECONDS>)
                .required(false)
                .help("Deadline for each request attempt in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("10"),
        )
        .arg(
            arg!(--"connect-timeout" <SECONDS>)
                .required(false)
                .help("Deadline for opening a connection in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("5"),
        )
        .arg(
            arg!(-r --"retries" <N>)
                .required(false)
                .help("Extra attempts after a timeout or TLS handshake failure")
                .value_parser(clap::value_parser!(usize))
                .default_value("2"),
        )
        .arg(
            arg!(-d --"max-depth" <N>)
                .required(false)
                .help("Levels of nested sitemap indexes followed beyond the root's child sitemaps")
                .value_parser(clap::value_parser!(usize))
                .default_value("3"),
        )
        .arg(
            arg!(-k --"insecure")
                .required(false)
                .help("Skip TLS certificate validation (checks availability only)")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-o --"output-dir" <PATH>)
                .required(false)
                .help("Directory for the JSON results file (default: current directory)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(-q --"quiet")
                .required(false)
                .help("Suppress per-URL diagnostic output and show a progress bar instead")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-v --"verbose")
                .required(false)
                .help("Emit debug logs on stderr")
                .action(clap::ArgAction::SetTrue),
        )
}
