//! End-to-end tests driving the router in-process.

use axum::body::Body;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::Router;
use filelines::config::GatewayConfig;
use filelines::files::{FileIndex, FileStorage};
use filelines::gateway::{build_router, AppState};
use http_body_util::BodyExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "filelines-test-boundary";

struct TestApp {
    _tmp: TempDir,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(&GatewayConfig::default())
    }

    fn with_config(config: &GatewayConfig) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let index = FileIndex::new(tmp.path()).unwrap();
        let storage = FileStorage::new(tmp.path().join("files"));
        let state = AppState::new(storage, index, StdRng::seed_from_u64(42));
        let router = build_router(state, config);
        Self { _tmp: tmp, router }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, body.to_vec())
    }

    async fn get(&self, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn get_with_accept(&self, uri: &str, accept: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let request = Request::get(uri)
            .header(ACCEPT, accept)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn upload(&self, filename: &str, data: &[u8]) -> i64 {
        let (status, _, body) = self
            .send(multipart("file", filename, Some("text/plain"), data))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        json(&body)["id"].as_i64().unwrap()
    }
}

fn multipart(field: &str, filename: &str, content_type: Option<&str>, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    if let Some(ct) = content_type {
        body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/upload")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn form_field(name: &str, value: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
    );
    Request::post("/upload")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

fn text(body: &[u8]) -> String {
    String::from_utf8(body.to_vec()).unwrap()
}

fn lengths(value: &Value) -> Vec<usize> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l.as_str().unwrap().chars().count())
        .collect()
}

#[tokio::test]
async fn health_reports_version() {
    let app = TestApp::new();
    let (status, _, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["healthy"], true);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn upload_txt_returns_created_with_id_and_filename() {
    let app = TestApp::new();
    let (status, _, body) = app
        .send(multipart("file", "sample.txt", Some("text/plain"), b"line 1\nline 2\n"))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let body = json(&body);
    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["filename"], "sample.txt");
}

#[tokio::test]
async fn upload_csv_is_rejected() {
    let app = TestApp::new();
    let (status, _, body) = app
        .send(multipart("file", "sample.csv", Some("text/plain"), b"a,b\n"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["file"][0], "Only .txt files are allowed.");
}

#[tokio::test]
async fn upload_with_wrong_content_type_is_rejected() {
    let app = TestApp::new();
    let (status, _, body) = app
        .send(multipart("file", "sample.txt", Some("image/png"), b"x\n"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["file"][0], "Only text/plain files are allowed.");
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let app = TestApp::new();
    let (status, _, body) = app.send(form_field("note", "hello")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["file"][0], "No file was submitted.");
}

#[tokio::test]
async fn upload_without_multipart_body_is_rejected() {
    let app = TestApp::new();
    let request = Request::post("/upload")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_over_size_limit_is_payload_too_large() {
    let app = TestApp::with_config(&GatewayConfig {
        max_upload_bytes: 64,
        ..GatewayConfig::default()
    });
    let (status, _, _) = app
        .send(multipart("file", "a.txt", Some("text/plain"), &[b'a'; 500]))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, _, body) = app.get("/longest-100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!([]));
}

#[tokio::test]
async fn random_line_without_files_is_not_found() {
    let app = TestApp::new();
    let (status, _, _) = app.get("/random-line").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn random_line_defaults_to_json() {
    let app = TestApp::new();
    app.upload("sample.txt", b"alpha\nbeta\ngamma\n").await;

    let (status, content_type, body) = app.get("/random-line").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let line = json(&body)["random_line"].as_str().unwrap().to_string();
    assert!(["alpha", "beta", "gamma"].contains(&line.as_str()));
}

#[tokio::test]
async fn random_line_accept_text_plain() {
    let app = TestApp::new();
    app.upload("sample.txt", b"hello\n").await;

    let (status, content_type, body) = app.get_with_accept("/random-line", "text/plain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain"));
    assert_eq!(text(&body), "random_line:hello");
}

#[tokio::test]
async fn random_line_accept_xml() {
    let app = TestApp::new();
    app.upload("sample.txt", b"hello\n").await;

    let (status, content_type, body) = app
        .get_with_accept("/random-line", "application/xml")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().contains("application/xml"));
    assert!(text(&body).contains("<response><random_line>hello</random_line></response>"));
}

#[tokio::test]
async fn random_line_query_param_overrides_header() {
    let app = TestApp::new();
    app.upload("sample.txt", b"hello\n").await;

    let (status, content_type, body) = app
        .get_with_accept("/random-line?accept=text/plain", "application/json")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain"));
    assert_eq!(text(&body), "random_line:hello");
}

#[tokio::test]
async fn random_line_unknown_preference_returns_full_record() {
    let app = TestApp::new();
    app.upload("sample.txt", b"hello world\n").await;

    let (status, content_type, body) = app.get_with_accept("/random-line", "*/*").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let body = json(&body);
    assert_eq!(body["line_number"], 1);
    assert_eq!(body["file_name"], "sample.txt");
    assert_eq!(body["line"], "hello world");
    assert_eq!(body["most_common_letter"], "l");
    assert!(body.get("random_line").is_none());
}

#[tokio::test]
async fn random_line_backwards_reverses_characters() {
    let app = TestApp::new();
    app.upload("sample.txt", b"abc\n").await;

    let (status, content_type, body) = app.get_with_accept("/random-line-backwards", "text/plain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(json(&body)["line_backwards"], "cba");
}

#[tokio::test]
async fn random_line_over_non_utf8_file_is_server_error() {
    let app = TestApp::new();
    app.upload("broken.txt", &[0x61, 0xff, 0xfe, 0x0a]).await;

    let (status, _, _) = app.get("/random-line").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn longest_100_ranks_across_all_files() {
    let app = TestApp::new();
    let file_a = format!("short\nmedium length\n{}\n", "x".repeat(120));
    let file_b = format!("tiny\n{}\n{}\n", "y".repeat(200), "z".repeat(5));
    app.upload("a.txt", file_a.as_bytes()).await;
    app.upload("b.txt", file_b.as_bytes()).await;

    let (status, _, body) = app.get("/longest-100").await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert!(body.as_array().unwrap().len() <= 100);
    assert_eq!(body[0], "y".repeat(200));
    assert_eq!(body[1], "x".repeat(120));
    let lens = lengths(&body);
    assert!(lens.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn longest_100_without_files_is_empty() {
    let app = TestApp::new();
    let (status, _, body) = app.get("/longest-100/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!([]));
}

#[tokio::test]
async fn longest_20_of_one_file() {
    let app = TestApp::new();
    let solo = format!("a\nbbb\ncc\n{}\nee\n{}\n", "d".repeat(50), "f".repeat(25));
    let id = app.upload("solo.txt", solo.as_bytes()).await;
    app.upload("other.txt", "g".repeat(500).as_bytes()).await;

    let (status, _, body) = app.get(&format!("/longest-20/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    let lines = body.as_array().unwrap();
    assert!(lines.len() <= 20);
    assert_eq!(lines[0], "d".repeat(50));
    assert!(lines.contains(&Value::from("bbb")));
    assert!(!lines.contains(&Value::from("g".repeat(500))));
}

#[tokio::test]
async fn longest_20_unknown_file_is_not_found() {
    let app = TestApp::new();
    app.upload("solo.txt", b"one line\n").await;

    let (status, _, body) = app.get("/longest-20/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json(&body)["detail"].as_str().unwrap().contains("9999"));
}

#[tokio::test]
async fn longest_20_with_malformed_id_is_not_found() {
    let app = TestApp::new();
    app.upload("solo.txt", b"one line\n").await;

    for id in ["abc", "99999999999999999999", "-"] {
        let (status, content_type, body) = app.get(&format!("/longest-20/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "id {id}");
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert!(json(&body)["detail"].as_str().unwrap().contains(id));
    }
}
