// Entrypoint for the CLI application.
// - Keeps `main` small: resolve credentials, build the API client, run
//   the authentication probe, then hand off to the menu loop.
// - Returns `anyhow::Result` so setup errors print with context.

use anyhow::Result;
use repoman_cli::{api::GitHubClient, ui};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let credentials = ui::acquire_credentials()?;

    // Base URL comes from `GITHUB_API_URL` or defaults to the public
    // endpoint. See `api::GitHubClient::from_env`.
    let client = GitHubClient::from_env(&credentials.token)?;

    // Authentication probe: a failing profile fetch means the token is
    // bad, which is fatal for the session.
    match client.get_user() {
        Ok(profile) => println!("\nAuthentication successful! Logged in as {}.", profile.login),
        Err(err) => {
            eprintln!("Authentication failed. Please check your token. ({})", err);
            std::process::exit(1);
        }
    }

    // Start the interactive menu. This call blocks until the user exits.
    ui::main_menu(client, credentials.username)?;
    Ok(())
}
