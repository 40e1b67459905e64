use crate::{
    BackupOptions, BackupState, BlobStore, CancellationToken, CpanelClient, CpanelError,
    CpanelResult, ErrorKind,
};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Mutex;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

#[derive(Default)]
struct MemoryStore {
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upload(
        &self,
        name: &str,
        mut reader: Box<dyn AsyncRead + Send + Unpin>,
    ) -> CpanelResult<()> {
        let mut contents = Vec::new();
        reader
            .read_to_end(&mut contents)
            .await
            .map_err(|e| CpanelError::Upload(e.to_string()))?;
        self.uploads.lock().await.push((name.to_string(), contents));
        Ok(())
    }
}

struct FailingStore;

#[async_trait]
impl BlobStore for FailingStore {
    async fn upload(&self, _: &str, _: Box<dyn AsyncRead + Send + Unpin>) -> CpanelResult<()> {
        Err(CpanelError::Upload("bucket not found".to_string()))
    }
}

fn client_for(server: &MockServer) -> CpanelClient {
    CpanelClient::builder()
        .host("127.0.0.1")
        .unwrap()
        .api_port(server.address().port())
        .unwrap()
        .credentials("bob", "hunter2")
        .unwrap()
        .secure(false)
        .build()
        .unwrap()
}

fn options(home_root: &Path) -> BackupOptions {
    BackupOptions {
        dial_timeout: Duration::from_secs(1),
        grace_delay: Duration::ZERO,
        poll_interval: Duration::from_millis(20),
        max_wait: Duration::from_secs(5),
        home_root: home_root.to_path_buf(),
    }
}

fn home_with_backup(file: &str, contents: &[u8]) -> tempfile::TempDir {
    let home = tempfile::tempdir().unwrap();
    std::fs::create_dir(home.path().join("bob")).unwrap();
    std::fs::write(home.path().join("bob").join(file), contents).unwrap();
    home
}

fn listing(entries: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "cpanelresult": {
            "event": {"result": 1},
            "data": entries
        }
    }))
}

async fn mount_backup_request(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/execute/Backup/fullbackup_to_homedir"))
        .and(query_param("email", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 1,
            "errors": null,
            "messages": null,
            "data": {"pid": "4242"}
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_listings(server: &MockServer, before: serde_json::Value, after: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/json-api/cpanel"))
        .and(query_param("cpanel_jsonapi_func", "listfullbackups"))
        .respond_with(listing(before))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/json-api/cpanel"))
        .and(query_param("cpanel_jsonapi_func", "listfullbackups"))
        .respond_with(listing(after))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_backup_end_to_end() {
    let server = MockServer::start().await;
    mount_backup_request(&server).await;
    mount_listings(
        &server,
        serde_json::json!([]),
        serde_json::json!([
            {"status": "complete", "file": "backup-1.tar.gz", "time": "1700000000", "localtime": "Tue Nov 14", "result": 1}
        ]),
    )
    .await;

    let home = home_with_backup("backup-1.tar.gz", b"tarball");
    let client = client_for(&server);

    let mut service = client.backup_service(options(home.path()));
    let mut artifact = service.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(service.state(), BackupState::Complete);
    assert_eq!(artifact.file_name(), "backup-1.tar.gz");
    let mut contents = Vec::new();
    artifact.file_mut().read_to_end(&mut contents).await.unwrap();
    assert_eq!(contents, b"tarball");
}

#[tokio::test]
async fn test_full_backup_skips_existing_backups() {
    let server = MockServer::start().await;
    mount_backup_request(&server).await;
    mount_listings(
        &server,
        serde_json::json!([{"status": "complete", "file": "backup-old.tar.gz"}]),
        serde_json::json!([
            {"status": "complete", "file": "backup-old.tar.gz"},
            {"status": "complete", "file": "backup-new.tar.gz"}
        ]),
    )
    .await;

    let home = home_with_backup("backup-new.tar.gz", b"new");
    let artifact = client_for(&server)
        .full_backup(options(home.path()), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(artifact.file_name(), "backup-new.tar.gz");
}

#[tokio::test]
async fn test_backup_to_blob_store() {
    let server = MockServer::start().await;
    mount_backup_request(&server).await;
    mount_listings(
        &server,
        serde_json::json!([]),
        serde_json::json!([{"status": "complete", "file": "backup-1.tar.gz"}]),
    )
    .await;

    let home = home_with_backup("backup-1.tar.gz", b"tarball");
    let store = MemoryStore::default();

    let name = client_for(&server)
        .backup_to(&store, options(home.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(name, "backup-1.tar.gz");
    let uploads = store.uploads.lock().await;
    assert_eq!(
        *uploads,
        vec![("backup-1.tar.gz".to_string(), b"tarball".to_vec())]
    );
}

#[tokio::test]
async fn test_backup_to_reports_upload_failure() {
    let server = MockServer::start().await;
    mount_backup_request(&server).await;
    mount_listings(
        &server,
        serde_json::json!([]),
        serde_json::json!([{"status": "complete", "file": "backup-1.tar.gz"}]),
    )
    .await;

    let home = home_with_backup("backup-1.tar.gz", b"tarball");
    let err = client_for(&server)
        .backup_to(&FailingStore, options(home.path()), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upload);
}

#[tokio::test]
async fn test_full_backup_request_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/execute/Backup/fullbackup_to_homedir"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 0,
            "errors": ["You do not have the feature \"backup\"."],
            "data": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/json-api/cpanel"))
        .respond_with(listing(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let mut service = client_for(&server).backup_service(options(home.path()));
    let err = service.run(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, CpanelError::Workflow(ref m) if m.contains("feature")));
    assert_eq!(service.state(), BackupState::Failed);
}

#[tokio::test]
async fn test_full_backup_request_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/execute/Backup/fullbackup_to_homedir"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/json-api/cpanel"))
        .respond_with(listing(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let mut service = client_for(&server).backup_service(options(home.path()));
    let err = service.run(&CancellationToken::new()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(matches!(err, CpanelError::HttpStatus { status: 401, .. }));
    assert_eq!(service.state(), BackupState::Failed);
}

#[tokio::test]
async fn test_full_backup_tolerates_null_listing() {
    let server = MockServer::start().await;
    mount_backup_request(&server).await;
    Mock::given(method("GET"))
        .and(path("/json-api/cpanel"))
        .and(query_param("cpanel_jsonapi_func", "listfullbackups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cpanelresult": null
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/json-api/cpanel"))
        .and(query_param("cpanel_jsonapi_func", "listfullbackups"))
        .respond_with(listing(serde_json::json!([{"status": "inprogress"}])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/json-api/cpanel"))
        .and(query_param("cpanel_jsonapi_func", "listfullbackups"))
        .respond_with(listing(serde_json::json!([
            {"status": "complete", "file": "backup-1.tar.gz"}
        ])))
        .mount(&server)
        .await;

    let home = home_with_backup("backup-1.tar.gz", b"tarball");
    let artifact = client_for(&server)
        .full_backup(options(home.path()), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(artifact.file_name(), "backup-1.tar.gz");
}

#[tokio::test]
async fn test_full_backup_times_out() {
    let server = MockServer::start().await;
    mount_backup_request(&server).await;
    Mock::given(method("GET"))
        .and(path("/json-api/cpanel"))
        .respond_with(listing(serde_json::json!([
            {"status": "complete", "file": "backup-old.tar.gz"}
        ])))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let options = BackupOptions {
        max_wait: Duration::from_millis(200),
        ..options(home.path())
    };

    let err = client_for(&server)
        .full_backup(options, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CpanelError::PollTimeout(_)));
}

#[tokio::test]
async fn test_full_backup_cancelled() {
    let server = MockServer::start().await;
    mount_backup_request(&server).await;
    Mock::given(method("GET"))
        .and(path("/json-api/cpanel"))
        .respond_with(listing(serde_json::json!([])))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let options = BackupOptions {
        grace_delay: Duration::from_secs(60),
        ..options(home.path())
    };

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = client_for(&server)
        .full_backup(options, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, CpanelError::Cancelled));
}
