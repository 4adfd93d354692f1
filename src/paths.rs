// Path mapping: turns a local filesystem entry into the remote path it
// should occupy inside the repository's content tree.

use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("cannot map {0:?} to a remote path")]
    Invalid(PathBuf),
}

/// Compute the remote path for `entry` relative to `root`: forward-slash
/// separated, no leading slash, independent of the platform separator.
/// Entries outside the root, empty relative paths and non-UTF-8 names
/// are all invalid.
pub fn to_remote_path(root: &Path, entry: &Path) -> Result<String, PathError> {
    let invalid = || PathError::Invalid(entry.to_path_buf());
    let relative = entry.strip_prefix(root).map_err(|_| invalid())?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                parts.push(part.to_str().ok_or_else(invalid)?);
            }
            // `..`, roots and drive prefixes all leave the upload root
            _ => return Err(invalid()),
        }
    }

    if parts.is_empty() {
        return Err(invalid());
    }
    Ok(parts.join("/"))
}
