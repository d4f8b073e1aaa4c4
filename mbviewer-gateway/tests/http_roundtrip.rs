//! Integration tests for the HTTP gateway
//!
//! Each test starts a one-shot HTTP server on a loopback port, lets the
//! client make a single request against it, and checks both the request the
//! server saw and how the client decoded the canned response.

use mbviewer_gateway::*;
use mbviewer_io::{PointCloudSource, TransferProgress};
use serde_json::{json, Value};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as received by the loopback server
#[derive(Debug)]
struct ReceivedRequest {
    method: String,
    path: String,
    headers: String,
    body: Vec<u8>,
}

impl ReceivedRequest {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn header_value<'a>(headers: &'a str, name: &str) -> Option<&'a str> {
    headers.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

/// Accept one connection, record its request and answer with `body`
async fn serve_once(body: &'static str) -> (String, JoinHandle<ReceivedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find(&buf, b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
        let (request_line, headers) = head.split_once("\r\n").unwrap();
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap().to_string();
        let path = parts.next().unwrap().to_string();
        let headers = headers.to_string();

        let chunked = header_value(&headers, "transfer-encoding")
            .map(|v| v.eq_ignore_ascii_case("chunked"))
            .unwrap_or(false);
        let content_length = header_value(&headers, "content-length").map(|v| v.parse::<usize>().unwrap());

        loop {
            let received = buf.len() - header_end;
            let complete = match content_length {
                Some(len) => received >= len,
                None if chunked => buf[header_end..].ends_with(b"0\r\n\r\n"),
                None => true,
            };
            if complete {
                break;
            }
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();

        ReceivedRequest {
            method,
            path,
            headers,
            body: buf[header_end..].to_vec(),
        }
    });

    (base_url, handle)
}

fn backend_at(base_url: &str) -> HttpBackend {
    HttpBackend::new(BackendConfig {
        base_url: base_url.to_string(),
        upload_url: base_url.to_string(),
        timeout_secs: Some(10),
    })
    .unwrap()
}

#[tokio::test]
async fn test_list_lod_file_names() {
    let (base_url, server) = serve_once(r#"["mb_raw", "survey_2024"]"#).await;

    let names = backend_at(&base_url).list_lod_file_names().await.unwrap();

    assert_eq!(names, vec!["mb_raw", "survey_2024"]);
    let request = server.await.unwrap();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/get-lod-file-names");
}

#[tokio::test]
async fn test_list_raw_file_names() {
    let (base_url, server) = serve_once("[]").await;

    let names = backend_at(&base_url).list_raw_file_names().await.unwrap();

    assert!(names.is_empty());
    let request = server.await.unwrap();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/get-raw-file-names");
}

#[tokio::test]
async fn test_process_file_posts_settings() {
    let (base_url, server) = serve_once("true").await;
    let settings = ProcessingSettings {
        filename: "mb_raw.xyz".to_string(),
        sep: ";".to_string(),
        to_utm: true,
    };

    assert!(backend_at(&base_url).process_file(&settings).await.unwrap());

    let request = server.await.unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/post-process-file/");
    assert_eq!(request.json(), json!({"filename": "mb_raw.xyz", "sep": ";", "to_utm": true}));
}

#[tokio::test]
async fn test_execute_scripts_posts_flags() {
    let (base_url, server) = serve_once("false").await;
    let settings = ScriptSettings {
        stat_based: false,
        k_means: true,
        ml: true,
        filename: "mb_raw".to_string(),
    };

    assert!(!backend_at(&base_url).execute_scripts(&settings).await.unwrap());

    let request = server.await.unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/post-execute-script/");
    assert_eq!(
        request.json(),
        json!({"stat_based": false, "k_means": true, "ml": true, "filename": "mb_raw"})
    );
}

#[tokio::test]
async fn test_delete_file_posts_name() {
    let (base_url, server) = serve_once("true").await;

    assert!(backend_at(&base_url).delete_file("mb_raw.xyz").await.unwrap());

    let request = server.await.unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/post-file-delete/");
    assert_eq!(request.json(), json!({"file_name": "mb_raw.xyz"}));
}

#[tokio::test]
async fn test_upload_file_sends_multipart_file_field() {
    let (base_url, server) = serve_once("").await;

    backend_at(&base_url)
        .upload_file("survey.xyz", b"1.0,2.0,-3.5\n".to_vec())
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/");
    assert!(header_value(&request.headers, "content-type")
        .unwrap()
        .starts_with("multipart/form-data"));
    let body = request.body_text();
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="survey.xyz""#));
    assert!(body.contains("1.0,2.0,-3.5"));
}

#[tokio::test]
async fn test_non_json_response_is_an_http_error() {
    let (base_url, server) = serve_once("not json").await;

    let result = backend_at(&base_url).list_lod_file_names().await;

    assert!(matches!(result, Err(mbviewer_core::Error::Http(_))));
    server.await.unwrap();
}

#[tokio::test]
async fn test_point_cloud_source_reports_progress() {
    let (base_url, server) = serve_once("VERSION 0.7").await;
    let updates = Mutex::new(Vec::new());

    let bytes = HttpPointCloudSource::new()
        .fetch(&format!("{}mb_raw_lod_10.pcd", base_url), &|progress: TransferProgress| {
            updates.lock().push(progress)
        })
        .await
        .unwrap();

    assert_eq!(bytes, b"VERSION 0.7");
    let updates = updates.into_inner();
    assert_eq!(updates.last(), Some(&TransferProgress { loaded: 11, total: 11 }));
    assert_eq!(server.await.unwrap().path, "/mb_raw_lod_10.pcd");
}
