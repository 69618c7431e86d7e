//! Failed catalog calls are logged once, at error level, before they propagate.

use paper_catalog::api::{ApiClient, PaperApi};
use paper_catalog::config::ApiConfig;
use std::io::Write;
use std::sync::{Arc, Mutex};

const FAILURE_MESSAGE: &str = "catalog API request failed";

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn failure_lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .filter(|line| line.contains(FAILURE_MESSAGE))
            .map(str::to_string)
            .collect()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capture() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::ERROR)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}

fn client_for(server: &mockito::ServerGuard) -> ApiClient {
    ApiClient::new(&ApiConfig::with_base_url(server.url())).unwrap()
}

#[tokio::test]
async fn test_status_failure_is_logged_once() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/search")
        .with_status(500)
        .with_body(r#"{"detail":"index unavailable"}"#)
        .create_async()
        .await;

    let (logs, _guard) = capture();
    let result = client_for(&server).search_external_index("resnet", 5).await;
    assert!(result.is_err());

    let lines = logs.failure_lines();
    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].contains("ERROR"));
    assert!(lines[0].contains("POST"));
    assert!(lines[0].contains("/search"));
    assert!(lines[0].contains("index unavailable"));
}

#[tokio::test]
async fn test_validation_failure_is_logged_once() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/papers/")
        .with_status(200)
        .with_body(r#"[{"id": 1, "title": ""}]"#)
        .create_async()
        .await;

    let (logs, _guard) = capture();
    assert!(client_for(&server).list_papers().await.is_err());

    let lines = logs.failure_lines();
    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].contains("GET"));
    assert!(lines[0].contains("/papers/"));
}

#[tokio::test]
async fn test_delete_and_import_failures_are_logged() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/papers/3")
        .with_status(404)
        .with_body(r#"{"detail":"Paper not found"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/papers/from-openalex")
        .with_status(400)
        .with_body(r#"{"detail":"Paper already exists"}"#)
        .create_async()
        .await;

    let (logs, _guard) = capture();
    let api = client_for(&server);
    assert!(api.delete_paper(3).await.is_err());
    assert!(api.import_from_external_index("W1", "").await.is_err());

    let lines = logs.failure_lines();
    assert_eq!(lines.len(), 2, "{:?}", lines);
    assert!(lines[0].contains("DELETE") && lines[0].contains("/papers/3"));
    assert!(lines[1].contains("/papers/from-openalex"));
}

#[tokio::test]
async fn test_success_is_not_logged_as_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/papers/")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let (logs, _guard) = capture();
    client_for(&server).list_papers().await.unwrap();
    assert!(logs.failure_lines().is_empty());
}
