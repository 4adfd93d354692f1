// Tree walker: lazy enumeration of the regular files under a root
// directory. Directories are traversed but never yielded, and symlinks
// are not followed, so a finite tree always produces a finite walk.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("root directory not found: {0:?}")]
    RootNotFound(PathBuf),
    #[error("failed to read directory entry: {0}")]
    Entry(#[from] walkdir::Error),
}

/// A single regular file discovered under the walk root.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Path usable for reading the file, as discovered from the root.
    pub local_path: PathBuf,
    /// The same file relative to the walk root.
    pub relative_path: PathBuf,
}

/// Single forward pass over the regular files under a root. A second
/// sync needs a new walk.
pub struct TreeWalk {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

/// Start a walk over `root`. Fails when `root` does not exist or is not
/// a directory. Entries come out in file-name order per directory, so
/// the sequence is deterministic for a given tree.
pub fn walk(root: &Path) -> Result<TreeWalk, WalkError> {
    if !root.is_dir() {
        return Err(WalkError::RootNotFound(root.to_path_buf()));
    }
    let inner = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();
    Ok(TreeWalk {
        root: root.to_path_buf(),
        inner,
    })
}

impl Iterator for TreeWalk {
    type Item = Result<FileEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err.into())),
            };
            // Only regular files; symlinks keep their own file type
            // because the walk does not follow them.
            if !entry.file_type().is_file() {
                continue;
            }
            let relative_path = match entry.path().strip_prefix(&self.root) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => continue,
            };
            return Some(Ok(FileEntry {
                local_path: entry.into_path(),
                relative_path,
            }));
        }
    }
}
