use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use staffroom::config::ServerConfig;
use staffroom::controller::ControllerEvent;
use staffroom::view::NullView;
use staffroom::{ChatBackend, ChatController, HttpBackend};
use tokio::sync::mpsc;

/// Server configuration pointing at a wiremock base URL
#[allow(dead_code)]
pub fn server_config(base_url: &str) -> ServerConfig {
    ServerConfig {
        base_url: base_url.to_string(),
        timeout_seconds: Some(5),
        ..ServerConfig::default()
    }
}

/// HTTP backend pointing at a wiremock base URL
#[allow(dead_code)]
pub fn http_backend(base_url: &str) -> HttpBackend {
    HttpBackend::new(server_config(base_url)).expect("failed to build http backend")
}

/// Controller over HTTP that renders nothing
#[allow(dead_code)]
pub fn http_controller(base_url: &str) -> (ChatController, mpsc::UnboundedReceiver<ControllerEvent>) {
    let backend: Arc<dyn ChatBackend> = Arc::new(http_backend(base_url));
    ChatController::new(backend, Box::new(NullView))
}

/// Write a document into a fresh temporary directory
#[allow(dead_code)]
pub fn temp_document(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let path = temp_dir.path().join(name);
    fs::write(&path, contents).expect("failed to write document");
    (temp_dir, path)
}

/// Base URL of a port nobody is listening on
#[allow(dead_code)]
pub async fn closed_server_uri() -> String {
    let server = wiremock::MockServer::start().await;
    let uri = server.uri();
    drop(server);
    uri
}
