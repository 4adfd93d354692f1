// Credential storage: a small JSON dot-file in the user's home
// directory holding the personal access token and the account name.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = ".repoman_config.json";

/// Saved credentials for the GitHub API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub username: String,
}

/// Default location of the credential file: the home directory, falling
/// back to the working directory.
pub fn default_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(CONFIG_FILE)
}

impl Credentials {
    /// Load credentials from `path`. `Ok(None)` when no file has been
    /// saved yet.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).context("reading credential file"),
        };
        let credentials = serde_json::from_str(&data).context("parsing credential file")?;
        Ok(Some(credentials))
    }

    /// Write credentials to `path` as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data).context("writing credential file")?;
        Ok(())
    }
}
