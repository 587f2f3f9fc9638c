//! End-to-end tests: the router is served on an ephemeral port and driven
//! with real multipart requests. Mail goes to an in-memory outbox.

use std::path::Path;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, header};
use tempfile::TempDir;

use zipmail::TempStorage;
use zipmail::http::{AppState, create_router};
use zipmail::mail::Outbox;
use zipmail::models::ArchiveInfo;
use zipmail::service::{ArchiveService, MailService};

const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    outbox: Outbox,
    temp_dir: TempDir,
}

impl TestApp {
    async fn spawn() -> Self {
        Self::spawn_with_limit(4 * 1024 * 1024).await
    }

    async fn spawn_with_limit(upload_limit: usize) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = TempStorage::new(temp_dir.path());
        let outbox = Outbox::new();
        let mail = MailService::new(
            storage.clone(),
            Arc::new(outbox.clone()),
            "robot@example.com".parse().unwrap(),
        );
        let state = AppState::new(ArchiveService::new(storage), mail, upload_limit);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            outbox,
            temp_dir,
        }
    }

    async fn post(&self, path: &str, form: Form) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }

    fn temp_dir_is_empty(&self) -> bool {
        dir_is_empty(self.temp_dir.path())
    }
}

fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

fn file_part(name: &str, mime: &str, data: &[u8]) -> Part {
    Part::bytes(data.to_vec())
        .file_name(name.to_string())
        .mime_str(mime)
        .unwrap()
}

/// Assert an XML error response and return its body.
async fn expect_error(resp: reqwest::Response, status: StatusCode, message: &str) -> String {
    assert_eq!(resp.status(), status);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "application/xml"
    );
    let body = resp.text().await.unwrap();
    assert!(
        body.contains(&format!("<message>{}</message>", message)),
        "unexpected body: {}",
        body
    );
    assert!(body.contains(&format!("<code>{}</code>", status.as_u16())));
    body
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::spawn().await;
    let resp = app
        .client
        .get(format!("{}/health", app.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_archive_then_inspect_it() {
    let app = TestApp::spawn().await;
    let report = "quarterly numbers ".repeat(50);

    let form = Form::new()
        .part("files[]", file_part("report.pdf", "application/pdf", report.as_bytes()))
        .part("files[]", file_part("logo.png", "image/png", b"\x89PNG\r\n\x1a\n"))
        .part("files[]", file_part("letter.docx", DOCX, b"PK fake docx"));
    let resp = app.post("/api/archive/files", form).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=archive.zip"
    );
    let archive = resp.bytes().await.unwrap().to_vec();
    assert_eq!(&archive[0..4], b"PK\x03\x04");
    assert!(app.temp_dir_is_empty());

    let form = Form::new().part(
        "file",
        file_part("archive.zip", "application/zip", &archive),
    );
    let resp = app.post("/api/archive/information", form).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let info: ArchiveInfo = resp.json().await.unwrap();
    assert_eq!(info.filename, "archive.zip");
    assert_eq!(info.archive_size, archive.len() as u64);
    assert_eq!(info.total_files, 3);
    assert_eq!(info.total_size, (report.len() + 8 + 12) as u64);

    let listed: Vec<(&str, &str)> = info
        .files
        .iter()
        .map(|f| (f.file_path.as_str(), f.mime_type.as_str()))
        .collect();
    assert_eq!(
        listed,
        [
            ("report.pdf", "application/pdf"),
            ("logo.png", "image/png"),
            ("letter.docx", DOCX),
        ]
    );
    assert!(app.temp_dir_is_empty());
}

#[tokio::test]
async fn test_information_requires_exactly_one_zip() {
    let app = TestApp::spawn().await;

    let resp = app
        .post("/api/archive/information", Form::new().text("note", "nothing"))
        .await;
    expect_error(resp, StatusCode::BAD_REQUEST, "No files uploaded").await;

    let form = Form::new()
        .part("file", file_part("a.zip", "application/zip", b"a"))
        .part("file", file_part("b.zip", "application/zip", b"b"));
    let resp = app.post("/api/archive/information", form).await;
    expect_error(resp, StatusCode::BAD_REQUEST, "Too many files").await;

    let form = Form::new().part("file", file_part("notes.txt", "text/plain", b"hi"));
    let resp = app.post("/api/archive/information", form).await;
    expect_error(resp, StatusCode::BAD_REQUEST, "Invalid file type").await;

    assert!(app.temp_dir_is_empty());
}

#[tokio::test]
async fn test_information_rejects_corrupt_archive() {
    let app = TestApp::spawn().await;

    let form = Form::new().part(
        "file",
        file_part("broken.zip", "application/zip", b"this is not a zip archive"),
    );
    let resp = app.post("/api/archive/information", form).await;
    let body = expect_error(resp, StatusCode::BAD_REQUEST, "Failed to process archive").await;
    assert!(body.contains("not a valid ZIP archive"));
    assert!(app.temp_dir_is_empty());
}

#[tokio::test]
async fn test_create_archive_rejects_unsupported_types() {
    let app = TestApp::spawn().await;

    let resp = app
        .post("/api/archive/files", Form::new().text("files", "none"))
        .await;
    expect_error(resp, StatusCode::BAD_REQUEST, "No files uploaded").await;

    let form = Form::new()
        .part("files[]", file_part("ok.pdf", "application/pdf", b"%PDF"))
        .part("files[]", file_part("notes.txt", "text/plain", b"text"))
        .part("files[]", file_part("run.exe", "application/octet-stream", b"MZ"));
    let resp = app.post("/api/archive/files", form).await;
    let body = expect_error(
        resp,
        StatusCode::BAD_REQUEST,
        "Invalid file formats for: [notes.txt run.exe]",
    )
    .await;
    assert!(body.contains("Some files have unsupported formats."));
    assert!(app.temp_dir_is_empty());
}

#[tokio::test]
async fn test_mail_file_sends_to_every_recipient() {
    let app = TestApp::spawn().await;

    let form = Form::new()
        .part("file", file_part("contract.pdf", "application/pdf", b"%PDF-1.7 contract"))
        .text("emails", "alice@example.com, bob@example.org");
    let resp = app.post("/api/mail/file", form).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "Email sent successfully");

    let sent = app.outbox.messages();
    assert_eq!(sent.len(), 1);
    let recipients: Vec<String> = sent[0].envelope().to().iter().map(ToString::to_string).collect();
    assert_eq!(recipients, ["alice@example.com", "bob@example.org"]);

    let raw = String::from_utf8(sent[0].formatted()).unwrap();
    assert!(raw.contains("filename=\"contract.pdf\""));
    assert!(raw.contains("Content-Type: application/pdf"));
    assert!(app.temp_dir_is_empty());
}

#[tokio::test]
async fn test_mail_file_uses_first_file_part() {
    let app = TestApp::spawn().await;

    let form = Form::new()
        .part("file", file_part("first.pdf", "application/pdf", b"%PDF first"))
        .part("file", file_part("second.pdf", "application/pdf", b"%PDF second"))
        .text("emails", "alice@example.com");
    let resp = app.post("/api/mail/file", form).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let sent = app.outbox.messages();
    assert_eq!(sent.len(), 1);
    let raw = String::from_utf8(sent[0].formatted()).unwrap();
    assert!(raw.contains("filename=\"first.pdf\""));
    assert!(!raw.contains("second.pdf"));
    assert!(app.temp_dir_is_empty());
}

#[tokio::test]
async fn test_mail_file_validation() {
    let app = TestApp::spawn().await;

    let resp = app
        .post("/api/mail/file", Form::new().text("emails", "a@example.com"))
        .await;
    expect_error(resp, StatusCode::BAD_REQUEST, "Failed to read file").await;

    let form = Form::new()
        .part("file", file_part("photo.png", "image/png", b"png"))
        .text("emails", "a@example.com");
    let resp = app.post("/api/mail/file", form).await;
    let body = expect_error(resp, StatusCode::BAD_REQUEST, "Invalid file type").await;
    assert!(body.contains("File type image/png is not allowed"));

    let form = Form::new().part("file", file_part("cv.docx", DOCX, b"docx"));
    let resp = app.post("/api/mail/file", form).await;
    expect_error(resp, StatusCode::BAD_REQUEST, "Emails are required").await;

    let form = Form::new()
        .part("file", file_part("cv.docx", DOCX, b"docx"))
        .text("emails", "a@example.com,not-an-email");
    let resp = app.post("/api/mail/file", form).await;
    expect_error(resp, StatusCode::BAD_REQUEST, "Invalid email address").await;

    assert!(app.outbox.messages().is_empty());
    assert!(app.temp_dir_is_empty());
}

#[tokio::test]
async fn test_wrong_method_and_unknown_route() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(format!("{}/api/archive/files", app.base_url))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").await;

    let resp = app
        .client
        .get(format!("{}/api/nothing", app.base_url))
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::NOT_FOUND, "Not found").await;

    let resp = app
        .client
        .post(format!("{}/health", app.base_url))
        .send()
        .await
        .unwrap();
    let body = expect_error(resp, StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").await;
    assert!(body.contains("Only GET method"));
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = TestApp::spawn_with_limit(1024).await;

    let form = Form::new().part(
        "files[]",
        file_part("big.pdf", "application/pdf", &vec![b'x'; 16 * 1024]),
    );
    let resp = app.post("/api/archive/files", form).await;
    expect_error(resp, StatusCode::PAYLOAD_TOO_LARGE, "Upload too large").await;
    assert!(app.temp_dir_is_empty());
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(format!("{}/api/archive/information", app.base_url))
        .header(header::CONTENT_TYPE, "application/json")
        .body("{}")
        .send()
        .await
        .unwrap();
    expect_error(resp, StatusCode::BAD_REQUEST, "Failed to parse multipart form").await;
}
