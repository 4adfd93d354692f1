// API client module: contains a small blocking HTTP client that talks to
// the GitHub REST API. It is intentionally small and synchronous; one
// request is in flight at a time.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const ACCEPT_VERSION: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = concat!("repoman-cli/", env!("CARGO_PKG_VERSION"));

/// Every remote call is bounded; a hung connection surfaces as a
/// transport error instead of suspending the session.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Identifies a repository on the remote by owner and name.
#[derive(Debug, Clone)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The remote understood and declined the request (stale or missing
    /// sha, validation failure, bad credentials). Retrying after a fresh
    /// metadata read is the expected recovery.
    #[error("remote rejected the request ({0})")]
    Rejected(String),
    /// Network failure, timeout, or a status outside what the endpoint
    /// is expected to produce.
    #[error("transport error: {0}")]
    Transport(String),
    /// HTTP success whose body did not carry the fields this client
    /// relies on. Kept distinct from transport failures so a misbehaving
    /// endpoint is reported as such.
    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Metadata the contents endpoint reports for an existing file. Only
/// the hash is decoded; it is what authorizes a later update or delete.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentMetadata {
    pub sha: String,
}

/// One entry in the authenticated user's repository listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    pub private: bool,
}

/// The authenticated user's profile. Also serves as the startup
/// credential probe: if this cannot be fetched, the token is bad.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
}

/// Confirmation for a newly created repository; the presence of `id`
/// is what proves creation succeeded.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRepository {
    pub id: u64,
    pub name: String,
    pub html_url: String,
}

#[derive(Serialize)]
struct PutContentRequest<'a> {
    message: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Serialize)]
struct DeleteContentRequest<'a> {
    message: &'a str,
    sha: &'a str,
}

#[derive(Serialize)]
struct CreateRepositoryRequest<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    auto_init: bool,
}

#[derive(Deserialize)]
struct PutResponse {
    content: PutConfirmation,
}

#[derive(Deserialize)]
struct PutConfirmation {
    sha: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Blocking GitHub API client. Holds a reqwest client configured with
/// the fixed header set every request needs: the token, the v3 accept
/// marker, a JSON content type and a client identifier.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    /// Build a client for the given base URL and personal access token.
    pub fn new(base_url: impl Into<String>, token: &str) -> Result<Self, ApiError> {
        let mut auth = HeaderValue::from_str(&format!("token {}", token))
            .map_err(|err| ApiError::Rejected(format!("token is not a valid header: {}", err)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let base_url = base_url.into();
        Ok(GitHubClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client configured from the environment variable
    /// `GITHUB_API_URL` or fallback to the public GitHub endpoint.
    pub fn from_env(token: &str) -> Result<Self, ApiError> {
        let base_url =
            std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Self::new(base_url, token)
    }

    fn contents_url(&self, repo: &RepositoryRef, remote_path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url, repo.owner, repo.name, remote_path
        )
    }

    /// Fetch the current metadata for a remote path. `Ok(None)` means
    /// the path has no content yet, which is how a create is told apart
    /// from an update; it is never folded into transport failures.
    pub fn get_metadata(
        &self,
        repo: &RepositoryRef,
        remote_path: &str,
    ) -> Result<Option<ContentMetadata>, ApiError> {
        let url = self.contents_url(repo, remote_path);
        debug!(%url, "fetching content metadata");
        let res = self.client.get(&url).send()?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let res = check_status(res)?;
        let metadata = decode_body::<ContentMetadata>(res, "content metadata")?;
        Ok(Some(metadata))
    }

    /// Create or update a file. `prior_sha` must carry the hash from a
    /// previous `get_metadata` call whenever the path already has
    /// content; the remote rejects blind overwrites.
    pub fn put_content(
        &self,
        repo: &RepositoryRef,
        remote_path: &str,
        encoded_content: &str,
        message: &str,
        prior_sha: Option<&str>,
    ) -> Result<(), ApiError> {
        let url = self.contents_url(repo, remote_path);
        debug!(%url, update = prior_sha.is_some(), "uploading content");
        let body = PutContentRequest {
            message,
            content: encoded_content,
            sha: prior_sha,
        };
        let res = self.client.put(&url).json(&body).send()?;
        let res = check_status(res)?;
        let confirmed = decode_body::<PutResponse>(res, "upload confirmation")?;
        debug!(sha = %confirmed.content.sha, "upload confirmed");
        Ok(())
    }

    /// Delete a file. The sha is mandatory; resolve it with
    /// `get_metadata` first.
    pub fn delete_content(
        &self,
        repo: &RepositoryRef,
        remote_path: &str,
        message: &str,
        sha: &str,
    ) -> Result<(), ApiError> {
        let url = self.contents_url(repo, remote_path);
        debug!(%url, "deleting content");
        let body = DeleteContentRequest { message, sha };
        let res = self.client.delete(&url).json(&body).send()?;
        check_status(res)?;
        Ok(())
    }

    /// Create a repository under the authenticated user, initialized
    /// with a first commit so the contents endpoint works right away.
    pub fn create_repository(
        &self,
        name: &str,
        description: &str,
        private: bool,
    ) -> Result<CreatedRepository, ApiError> {
        let url = format!("{}/user/repos", self.base_url);
        debug!(%url, name, "creating repository");
        let body = CreateRepositoryRequest {
            name,
            description,
            private,
            auto_init: true,
        };
        let res = self.client.post(&url).json(&body).send()?;
        let res = check_status(res)?;
        decode_body(res, "created repository")
    }

    /// List the authenticated user's repositories.
    pub fn list_repositories(&self) -> Result<Vec<RepositorySummary>, ApiError> {
        let url = format!("{}/user/repos", self.base_url);
        debug!(%url, "listing repositories");
        let res = self.client.get(&url).send()?;
        let res = check_status(res)?;
        decode_body(res, "repository listing")
    }

    /// Fetch the authenticated user's profile.
    pub fn get_user(&self) -> Result<UserProfile, ApiError> {
        let url = format!("{}/user", self.base_url);
        debug!(%url, "fetching user profile");
        let res = self.client.get(&url).send()?;
        let res = check_status(res)?;
        decode_body(res, "user profile")
    }
}

/// Map a non-success response into the error taxonomy: a 4xx means the
/// remote understood and declined the request, anything else is a
/// transport-level failure.
fn check_status(res: Response) -> Result<Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let detail = error_detail(res);
    if status.is_client_error() {
        Err(ApiError::Rejected(format!("{}: {}", status, detail)))
    } else {
        Err(ApiError::Transport(format!("{}: {}", status, detail)))
    }
}

/// Pull the server's `message` field out of an error body, falling back
/// to the raw text.
fn error_detail(res: Response) -> String {
    let body = res.text().unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.message,
        Err(_) => body,
    }
}

/// Decode a success body into its typed shape. A success status with a
/// body this client cannot read is its own error kind, not a transport
/// failure.
fn decode_body<T: DeserializeOwned>(res: Response, what: &str) -> Result<T, ApiError> {
    let body = res.text()?;
    serde_json::from_str(&body)
        .map_err(|err| ApiError::UnexpectedResponse(format!("{}: {}", what, err)))
}
