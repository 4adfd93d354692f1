// Shared helpers for the integration suite. The client under test is
// blocking while wiremock needs a tokio runtime, so client calls are
// bridged through `spawn_blocking`.

use repoman_cli::api::RepositoryRef;

pub async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

pub fn repo() -> RepositoryRef {
    RepositoryRef {
        owner: "octo".into(),
        name: "demo".into(),
    }
}
