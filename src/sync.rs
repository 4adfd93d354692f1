// Sync engine: drives one upload or delete operation against the
// remote. All prompting lives in the UI layer; the engine receives
// fully resolved parameters and returns structured results.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiError, GitHubClient, RepositoryRef};
use crate::codec;
use crate::paths::{self, PathError};
use crate::walker::{self, WalkError};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("local file not found: {0:?}")]
    LocalFileNotFound(PathBuf),
    #[error("no remote content at {0}")]
    RemoteFileNotFound(String),
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One fully resolved request from the UI layer, consumed exactly once.
#[derive(Debug)]
pub enum SyncRequest {
    SingleFileUpload {
        local_path: PathBuf,
        /// Defaults to the local file name when absent.
        remote_path: Option<String>,
        message: String,
    },
    TreeUpload {
        root: PathBuf,
        message: String,
    },
    SingleFileDelete {
        remote_path: String,
        message: String,
    },
}

/// One planned change to a single remote path. Updates and deletes
/// carry the sha observed on the remote, proving the current version
/// was read before mutating it.
#[derive(Debug)]
pub enum ContentOperation {
    Create {
        remote_path: String,
        message: String,
        content: Vec<u8>,
    },
    Update {
        remote_path: String,
        message: String,
        content: Vec<u8>,
        prior_sha: String,
    },
    Delete {
        remote_path: String,
        message: String,
        prior_sha: String,
    },
}

/// Result of one file attempt inside a tree upload.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub remote_path: String,
    pub result: FileResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileResult {
    Ok,
    Failed(String),
}

/// Aggregate outcome of a sync request. Every file the walk produced
/// lands in exactly one of the two lists; nothing is dropped silently.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub succeeded: Vec<FileOutcome>,
    pub failed: Vec<FileOutcome>,
}

impl SyncReport {
    fn single(remote_path: String) -> Self {
        let mut report = SyncReport::default();
        report.record_ok(remote_path);
        report
    }

    fn record_ok(&mut self, remote_path: String) {
        self.succeeded.push(FileOutcome {
            remote_path,
            result: FileResult::Ok,
        });
    }

    fn record_failure(&mut self, remote_path: String, reason: String) {
        warn!(path = %remote_path, %reason, "file sync failed");
        self.failed.push(FileOutcome {
            remote_path,
            result: FileResult::Failed(reason),
        });
    }
}

/// Cooperative cancellation flag shared between the engine and the
/// caller. Checked between files, never mid-transfer.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Orchestrates the codec, walker, path mapper and API client for one
/// request at a time. Holds no state of its own beyond the client.
pub struct SyncEngine<'a> {
    client: &'a GitHubClient,
}

impl<'a> SyncEngine<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        SyncEngine { client }
    }

    /// Dispatch one fully resolved request. Single-file requests surface
    /// their first error directly; a tree upload always returns the
    /// aggregate report instead.
    pub fn run(
        &self,
        repo: &RepositoryRef,
        request: SyncRequest,
        cancel: &CancelToken,
    ) -> Result<SyncReport, SyncError> {
        match request {
            SyncRequest::SingleFileUpload {
                local_path,
                remote_path,
                message,
            } => {
                let uploaded =
                    self.upload_file(repo, &local_path, remote_path.as_deref(), &message)?;
                Ok(SyncReport::single(uploaded))
            }
            SyncRequest::TreeUpload { root, message } => {
                self.upload_tree(repo, &root, &message, cancel)
            }
            SyncRequest::SingleFileDelete {
                remote_path,
                message,
            } => {
                self.delete_file(repo, &remote_path, &message)?;
                Ok(SyncReport::single(remote_path))
            }
        }
    }

    /// Upload one local file and return the remote path it landed on.
    /// The remote path defaults to the file name when no override is
    /// given.
    pub fn upload_file(
        &self,
        repo: &RepositoryRef,
        local_path: &Path,
        remote_path: Option<&str>,
        message: &str,
    ) -> Result<String, SyncError> {
        let remote_path = match remote_path {
            Some(path) => path.to_string(),
            None => file_name_of(local_path)?,
        };
        let operation = self.plan_upload(repo, local_path, &remote_path, message)?;
        self.execute(repo, operation)?;
        Ok(remote_path)
    }

    /// Upload every regular file under `root`, preserving relative
    /// paths. Each file is attempted independently; a failure is
    /// recorded in the report and the walk moves on.
    pub fn upload_tree(
        &self,
        repo: &RepositoryRef,
        root: &Path,
        message: &str,
        cancel: &CancelToken,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        for entry in walker::walk(root)? {
            if cancel.is_cancelled() {
                info!("tree upload cancelled");
                break;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    report.record_failure(root.display().to_string(), err.to_string());
                    continue;
                }
            };
            let remote_path = match paths::to_remote_path(root, &entry.local_path) {
                Ok(path) => path,
                Err(err) => {
                    report.record_failure(
                        entry.relative_path.display().to_string(),
                        err.to_string(),
                    );
                    continue;
                }
            };
            let attempt = self
                .plan_upload(repo, &entry.local_path, &remote_path, message)
                .and_then(|operation| self.execute(repo, operation));
            match attempt {
                Ok(()) => report.record_ok(remote_path),
                Err(err) => report.record_failure(remote_path, err.to_string()),
            }
        }
        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "tree upload finished"
        );
        Ok(report)
    }

    /// Delete one remote file. The current sha is resolved first; a
    /// path with no remote content cannot be deleted and no write call
    /// is issued for it.
    pub fn delete_file(
        &self,
        repo: &RepositoryRef,
        remote_path: &str,
        message: &str,
    ) -> Result<(), SyncError> {
        let metadata = self
            .client
            .get_metadata(repo, remote_path)?
            .ok_or_else(|| SyncError::RemoteFileNotFound(remote_path.to_string()))?;
        self.execute(
            repo,
            ContentOperation::Delete {
                remote_path: remote_path.to_string(),
                message: message.to_string(),
                prior_sha: metadata.sha,
            },
        )
    }

    /// Read, then resolve the prior sha for one file. Reading a missing
    /// local file fails before any remote call is made.
    fn plan_upload(
        &self,
        repo: &RepositoryRef,
        local_path: &Path,
        remote_path: &str,
        message: &str,
    ) -> Result<ContentOperation, SyncError> {
        let content = std::fs::read(local_path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => SyncError::LocalFileNotFound(local_path.to_path_buf()),
            _ => SyncError::Read {
                path: local_path.to_path_buf(),
                source: err,
            },
        })?;
        let operation = match self.client.get_metadata(repo, remote_path)? {
            Some(metadata) => ContentOperation::Update {
                remote_path: remote_path.to_string(),
                message: message.to_string(),
                content,
                prior_sha: metadata.sha,
            },
            None => ContentOperation::Create {
                remote_path: remote_path.to_string(),
                message: message.to_string(),
                content,
            },
        };
        Ok(operation)
    }

    /// Execute one planned operation against the remote.
    fn execute(&self, repo: &RepositoryRef, operation: ContentOperation) -> Result<(), SyncError> {
        match operation {
            ContentOperation::Create {
                remote_path,
                message,
                content,
            } => {
                self.client
                    .put_content(repo, &remote_path, &codec::encode(&content), &message, None)?;
                info!(path = %remote_path, "created remote file");
            }
            ContentOperation::Update {
                remote_path,
                message,
                content,
                prior_sha,
            } => {
                self.client.put_content(
                    repo,
                    &remote_path,
                    &codec::encode(&content),
                    &message,
                    Some(&prior_sha),
                )?;
                info!(path = %remote_path, "updated remote file");
            }
            ContentOperation::Delete {
                remote_path,
                message,
                prior_sha,
            } => {
                self.client
                    .delete_content(repo, &remote_path, &message, &prior_sha)?;
                info!(path = %remote_path, "deleted remote file");
            }
        }
        Ok(())
    }
}

fn file_name_of(local_path: &Path) -> Result<String, SyncError> {
    local_path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
        .ok_or_else(|| SyncError::Path(PathError::Invalid(local_path.to_path_buf())))
}
