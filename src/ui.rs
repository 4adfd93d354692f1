// UI layer: provides a simple interactive menu using `dialoguer`.
// The functions are small and synchronous to make the flow easy to follow.
// Every prompt happens here; the sync engine only ever sees fully
// resolved parameters.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{GitHubClient, RepositoryRef};
use crate::config::{self, Credentials};
use crate::sync::{CancelToken, FileResult, SyncEngine, SyncReport, SyncRequest};

/// Main interactive menu. Receives the authenticated client and the
/// account name (used as repository owner) and runs a select loop until
/// the user chooses "Exit".
///
/// Note: `Select::interact()` is keyboard-driven: arrow keys and Enter
/// choose an option.
pub fn main_menu(client: GitHubClient, username: String) -> Result<()> {
    loop {
        let items = vec![
            "Create repository",
            "Upload single file",
            "Upload project directory",
            "Delete remote file",
            "List repositories",
            "View profile",
            "Exit",
        ];
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => handle_create_repository(&client)?,
            1 => handle_upload_file(&client, &username)?,
            2 => handle_upload_tree(&client, &username)?,
            3 => handle_delete_file(&client, &username)?,
            4 => handle_list_repositories(&client)?,
            5 => handle_profile(&client)?,
            6 => break,
            _ => {}
        }
    }
    Ok(())
}

/// Load saved credentials (after a confirmation) or prompt for new ones
/// and persist them for future runs.
pub fn acquire_credentials() -> Result<Credentials> {
    let path = config::default_path();
    if let Some(saved) = Credentials::load(&path)? {
        println!("Found saved configuration for user: {}", saved.username);
        if Confirm::new()
            .with_prompt("Use it?")
            .default(true)
            .interact()?
        {
            return Ok(saved);
        }
    }

    // `Password` hides the token while it is typed.
    let token: String = Password::new()
        .with_prompt("GitHub personal access token")
        .interact()?;
    let username: String = Input::new()
        .with_prompt("GitHub username")
        .interact_text()?;

    let credentials = Credentials { token, username };
    credentials.save(&path)?;
    println!("Configuration saved!");
    Ok(credentials)
}

fn handle_create_repository(client: &GitHubClient) -> Result<()> {
    let name: String = Input::new().with_prompt("Repository name").interact_text()?;
    let description: String = Input::new()
        .with_prompt("Description")
        .allow_empty(true)
        .interact_text()?;
    let private = Confirm::new()
        .with_prompt("Make it private?")
        .default(false)
        .interact()?;

    let pb = spinner("Creating repository...");
    let result = client.create_repository(&name, &description, private);
    pb.finish_and_clear();

    match result {
        Ok(created) => {
            println!("Repository created successfully!");
            println!("URL: {}", created.html_url);
        }
        Err(err) => println!("Failed to create repository: {}", err),
    }
    Ok(())
}

fn handle_upload_file(client: &GitHubClient, username: &str) -> Result<()> {
    let repo = prompt_repository(username)?;
    let file_path: String = Input::new().with_prompt("File path").interact_text()?;
    let remote_path: String = Input::new()
        .with_prompt("Remote path (leave empty to use the file name)")
        .allow_empty(true)
        .interact_text()?;
    let message: String = Input::new().with_prompt("Commit message").interact_text()?;

    let request = SyncRequest::SingleFileUpload {
        local_path: PathBuf::from(file_path),
        remote_path: if remote_path.is_empty() {
            None
        } else {
            Some(remote_path)
        },
        message,
    };

    let pb = spinner("Uploading...");
    let result = SyncEngine::new(client).run(&repo, request, &CancelToken::new());
    pb.finish_and_clear();

    match result {
        Ok(report) => {
            if let Some(outcome) = report.succeeded.first() {
                println!("File uploaded successfully: {}", outcome.remote_path);
            }
        }
        Err(err) => println!("Upload failed: {}", err),
    }
    Ok(())
}

fn handle_upload_tree(client: &GitHubClient, username: &str) -> Result<()> {
    let repo = prompt_repository(username)?;
    let dir_path: String = Input::new()
        .with_prompt("Project directory path")
        .interact_text()?;
    let message: String = Input::new().with_prompt("Commit message").interact_text()?;

    let request = SyncRequest::TreeUpload {
        root: PathBuf::from(dir_path),
        message,
    };

    let pb = spinner("Uploading directory...");
    let result = SyncEngine::new(client).run(&repo, request, &CancelToken::new());
    pb.finish_and_clear();

    match result {
        Ok(report) => print_report(&report),
        Err(err) => println!("Upload failed: {}", err),
    }
    Ok(())
}

fn handle_delete_file(client: &GitHubClient, username: &str) -> Result<()> {
    let repo = prompt_repository(username)?;
    let remote_path: String = Input::new()
        .with_prompt("Remote file path to delete")
        .interact_text()?;
    let message: String = Input::new().with_prompt("Commit message").interact_text()?;

    let request = SyncRequest::SingleFileDelete {
        remote_path: remote_path.clone(),
        message,
    };

    let pb = spinner("Deleting...");
    let result = SyncEngine::new(client).run(&repo, request, &CancelToken::new());
    pb.finish_and_clear();

    match result {
        Ok(_) => println!("File deleted successfully: {}", remote_path),
        Err(err) => println!("Delete failed: {}", err),
    }
    Ok(())
}

fn handle_list_repositories(client: &GitHubClient) -> Result<()> {
    let pb = spinner("Fetching repositories...");
    let result = client.list_repositories();
    pb.finish_and_clear();

    match result {
        Ok(repos) => {
            println!("\nYour repositories:");
            println!("==================");
            for repo in repos {
                println!("Name: {}", repo.name);
                println!("Description: {}", repo.description.as_deref().unwrap_or("-"));
                println!("URL: {}", repo.html_url);
                println!("Private: {}", if repo.private { "Yes" } else { "No" });
                println!("------------------");
            }
        }
        Err(err) => println!("Failed to list repositories: {}", err),
    }
    Ok(())
}

fn handle_profile(client: &GitHubClient) -> Result<()> {
    let pb = spinner("Fetching profile...");
    let result = client.get_user();
    pb.finish_and_clear();

    match result {
        Ok(profile) => {
            println!("\nUser information:");
            println!("Username: {}", profile.login);
            println!("Name: {}", profile.name.as_deref().unwrap_or("-"));
            println!("Email: {}", profile.email.as_deref().unwrap_or("-"));
            println!("Public repos: {}", profile.public_repos);
            println!("Followers: {}", profile.followers);
            println!("Following: {}", profile.following);
        }
        Err(err) => println!("Failed to fetch profile: {}", err),
    }
    Ok(())
}

/// The account name doubles as the repository owner; only the
/// repository name is prompted for.
fn prompt_repository(username: &str) -> Result<RepositoryRef> {
    let name: String = Input::new().with_prompt("Repository name").interact_text()?;
    Ok(RepositoryRef {
        owner: username.to_string(),
        name,
    })
}

fn print_report(report: &SyncReport) {
    println!("\nUpload complete!");
    println!("Success: {} files", report.succeeded.len());
    println!("Failed: {} files", report.failed.len());
    for outcome in &report.failed {
        if let FileResult::Failed(reason) = &outcome.result {
            println!("  {}: {}", outcome.remote_path, reason);
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
