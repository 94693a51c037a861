//! Test utilities for Staffroom
//!
//! Temporary document fixtures, a controller wired to a scripted backend,
//! and assertion helpers.

use crate::api::{ChatBackend, FakeBackend};
use crate::controller::{ChatController, ControllerEvent};
use crate::view::NullView;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Controller that renders nothing, backed by `backend`
pub fn fake_controller(
    backend: &Arc<FakeBackend>,
) -> (ChatController, mpsc::UnboundedReceiver<ControllerEvent>) {
    let backend: Arc<dyn ChatBackend> = backend.clone();
    ChatController::new(backend, Box::new(NullView))
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: crate::error::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
server:
  base_url: http://127.0.0.1:8000
  chat_path: /api/chat
  upload_path: /api/upload-document
  timeout_seconds: 15
ui:
  show_timestamps: false
  history_size: 50
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::StaffroomError;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "data.json", "{}");
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: crate::error::Result<()> =
            Err(StaffroomError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    fn test_test_config_yaml() {
        let config = Config::from_yaml(&test_config_yaml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.ui.history_size, 50);
    }

    #[tokio::test]
    async fn test_fake_controller_starts_empty() {
        let backend = Arc::new(FakeBackend::new());
        let (controller, _events) = fake_controller(&backend);
        assert!(controller.panel().log().is_empty());
        assert_eq!(controller.conversation_id(), None);
    }
}
