// End-to-end engine behavior: tree uploads over real temp directories,
// the read-hash-then-write protocol, partial failure and cancellation.

mod common;

use std::fs;
use std::path::Path;

use repoman_cli::api::GitHubClient;
use repoman_cli::codec;
use repoman_cli::sync::{CancelToken, FileResult, SyncEngine, SyncError, SyncRequest};
use serde_json::json;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn put_ok() -> ResponseTemplate {
    ResponseTemplate::new(201).set_body_json(json!({
        "content": { "sha": "fresh" },
        "commit": { "sha": "c1" },
    }))
}

fn succeeded_paths(report: &repoman_cli::sync::SyncReport) -> Vec<String> {
    report
        .succeeded
        .iter()
        .map(|outcome| outcome.remote_path.clone())
        .collect()
}

#[tokio::test]
async fn tree_upload_pushes_every_file_with_encoded_content() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("proj");
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("a.txt"), "hi").unwrap();
    let binary: Vec<u8> = (0u8..=255).collect();
    fs::write(root.join("sub/b.bin"), &binary).unwrap();

    let server = MockServer::start().await;
    // Empty remote: every metadata read misses.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/octo/demo/contents/a.txt"))
        .and(body_json(json!({
            "message": "init",
            "content": "aGk=",
        })))
        .respond_with(put_ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/octo/demo/contents/sub/b.bin"))
        .and(body_json(json!({
            "message": "init",
            "content": codec::encode(&binary),
        })))
        .respond_with(put_ok())
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let report = common::blocking(move || {
        let client = GitHubClient::new(uri, "t0ken").unwrap();
        let request = SyncRequest::TreeUpload {
            root,
            message: "init".into(),
        };
        SyncEngine::new(&client).run(&common::repo(), request, &CancelToken::new())
    })
    .await
    .unwrap();

    assert_eq!(succeeded_paths(&report), vec!["a.txt", "sub/b.bin"]);
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn one_rejected_file_does_not_stop_the_walk() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"] {
        fs::write(dir.path().join(name), name).unwrap();
    }

    let server = MockServer::start().await;
    // The rejection for c.txt is mounted first so it wins over the
    // catch-all success.
    Mock::given(method("PUT"))
        .and(path("/repos/octo/demo/contents/c.txt"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Validation Failed",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(put_ok())
        .expect(4)
        .mount(&server)
        .await;

    let uri = server.uri();
    let root = dir.path().to_path_buf();
    let report = common::blocking(move || {
        let client = GitHubClient::new(uri, "t0ken").unwrap();
        SyncEngine::new(&client).upload_tree(&common::repo(), &root, "sync", &CancelToken::new())
    })
    .await
    .unwrap();

    assert_eq!(
        succeeded_paths(&report),
        vec!["a.txt", "b.txt", "d.txt", "e.txt"]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].remote_path, "c.txt");
    match &report.failed[0].result {
        FileResult::Failed(reason) => {
            assert!(reason.contains("Validation Failed"), "reason: {}", reason)
        }
        FileResult::Ok => panic!("c.txt should have failed"),
    }
}

#[tokio::test]
async fn updates_carry_the_sha_from_the_metadata_read() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("a.txt");
    fs::write(&local, "hi").unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/a.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "oldsha"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/octo/demo/contents/a.txt"))
        .and(body_json(json!({
            "message": "tweak",
            "content": "aGk=",
            "sha": "oldsha",
        })))
        .respond_with(put_ok())
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let uploaded = common::blocking(move || {
        let client = GitHubClient::new(uri, "t0ken").unwrap();
        SyncEngine::new(&client).upload_file(&common::repo(), &local, None, "tweak")
    })
    .await
    .unwrap();

    assert_eq!(uploaded, "a.txt");
}

#[tokio::test]
async fn single_upload_honors_the_remote_path_override() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("x.txt");
    fs::write(&local, "hi").unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/octo/demo/contents/docs/readme.md"))
        .respond_with(put_ok())
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let report = common::blocking(move || {
        let client = GitHubClient::new(uri, "t0ken").unwrap();
        let request = SyncRequest::SingleFileUpload {
            local_path: local,
            remote_path: Some("docs/readme.md".into()),
            message: "add readme".into(),
        };
        SyncEngine::new(&client).run(&common::repo(), request, &CancelToken::new())
    })
    .await
    .unwrap();

    assert_eq!(succeeded_paths(&report), vec!["docs/readme.md"]);
}

#[tokio::test]
async fn missing_local_file_fails_fast_without_remote_calls() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.txt");

    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = common::blocking(move || {
        let client = GitHubClient::new(uri, "t0ken").unwrap();
        SyncEngine::new(&client).upload_file(&common::repo(), &missing, None, "init")
    })
    .await
    .unwrap_err();

    assert!(matches!(err, SyncError::LocalFileNotFound(_)), "got {:?}", err);
}

#[tokio::test]
async fn tree_upload_of_a_missing_root_is_root_not_found() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = common::blocking(move || {
        let client = GitHubClient::new(uri, "t0ken").unwrap();
        SyncEngine::new(&client).upload_tree(
            &common::repo(),
            Path::new("/definitely/not/here"),
            "sync",
            &CancelToken::new(),
        )
    })
    .await
    .unwrap_err();

    assert!(matches!(err, SyncError::Walk(_)), "got {:?}", err);
}

#[tokio::test]
async fn delete_resolves_the_sha_before_deleting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/old.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "s9"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/repos/octo/demo/contents/old.txt"))
        .and(body_json(json!({
            "message": "bye",
            "sha": "s9",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commit": { "sha": "c2" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let report = common::blocking(move || {
        let client = GitHubClient::new(uri, "t0ken").unwrap();
        let request = SyncRequest::SingleFileDelete {
            remote_path: "old.txt".into(),
            message: "bye".into(),
        };
        SyncEngine::new(&client).run(&common::repo(), request, &CancelToken::new())
    })
    .await
    .unwrap();

    assert_eq!(succeeded_paths(&report), vec!["old.txt"]);
}

#[tokio::test]
async fn delete_of_a_missing_remote_file_issues_no_write() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = common::blocking(move || {
        let client = GitHubClient::new(uri, "t0ken").unwrap();
        SyncEngine::new(&client).delete_file(&common::repo(), "ghost.txt", "bye")
    })
    .await
    .unwrap_err();

    assert!(
        matches!(err, SyncError::RemoteFileNotFound(ref p) if p == "ghost.txt"),
        "got {:?}",
        err
    );
}

#[tokio::test]
async fn cancelled_tree_upload_attempts_no_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hi").unwrap();

    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    let root = dir.path().to_path_buf();
    let report = common::blocking(move || {
        let client = GitHubClient::new(uri, "t0ken").unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        SyncEngine::new(&client).upload_tree(&common::repo(), &root, "sync", &cancel)
    })
    .await
    .unwrap();

    assert!(report.succeeded.is_empty());
    assert!(report.failed.is_empty());
}
