use sitemap_verifier::commands::command_argument_builder;
use sitemap_verifier::handle_verify;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let matches = cmd.get_matches();

    match handle_verify(&matches).await {
        // Last line of output is always the results file
        Ok(path) => println!("{}", path.display()),
        Err(e) => {
            eprintln!("✗ {:#}", e);
            std::process::exit(1);
        }
    }
}
