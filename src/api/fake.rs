//! In-process fake backend for controller tests
//!
//! [`FakeBackend`] answers from queues of scripted replies and records every
//! request it receives, so tests can check both what the controller rendered
//! and what it sent.
//!
//! An empty queue answers with an HTTP error, which the controller treats
//! like any other transport failure.
//!
//! # Example
//!
//! ```
//! use staffroom::api::{ChatBackend, ChatRequest, ChatResponse, FakeBackend};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let backend = FakeBackend::new();
//! backend.push_chat_reply(ChatResponse::new("abc", "hi"));
//!
//! let reply = backend.chat(&ChatRequest::new("hello", None)).await.unwrap();
//! assert_eq!(reply.message, "hi");
//! assert_eq!(backend.chat_requests()[0].message, "hello");
//! # }
//! ```

use super::{ChatBackend, ChatRequest, ChatResponse, UploadResult};
use crate::error::{Result, StaffroomError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Document received by [`FakeBackend::upload_document`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    /// File name sent with the multipart field
    pub file_name: String,
    /// File contents
    pub contents: Vec<u8>,
}

type Scripted<T> = std::result::Result<T, String>;

/// Scripted [`ChatBackend`]
#[derive(Debug, Default)]
pub struct FakeBackend {
    chat_replies: Mutex<VecDeque<Scripted<ChatResponse>>>,
    upload_replies: Mutex<VecDeque<Scripted<UploadResult>>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    uploads: Mutex<Vec<RecordedUpload>>,
}

impl FakeBackend {
    /// Create a fake with no scripted replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful chat reply
    pub fn push_chat_reply(&self, response: ChatResponse) {
        lock(&self.chat_replies).push_back(Ok(response));
    }

    /// Queue a failed chat request
    pub fn push_chat_failure(&self, error: impl Into<String>) {
        lock(&self.chat_replies).push_back(Err(error.into()));
    }

    /// Queue an upload reply
    pub fn push_upload_reply(&self, result: UploadResult) {
        lock(&self.upload_replies).push_back(Ok(result));
    }

    /// Queue a failed upload request
    pub fn push_upload_failure(&self, error: impl Into<String>) {
        lock(&self.upload_replies).push_back(Err(error.into()));
    }

    /// Chat requests received so far, in arrival order
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        lock(&self.chat_requests).clone()
    }

    /// Uploads received so far, in arrival order
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        lock(&self.uploads).clone()
    }
}

// A poisoned lock only means another test thread panicked; the data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn unscripted(kind: &str) -> anyhow::Error {
    StaffroomError::Http(format!("no scripted {} reply", kind)).into()
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        lock(&self.chat_requests).push(request.clone());
        match lock(&self.chat_replies).pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(e)) => Err(StaffroomError::Http(e).into()),
            None => Err(unscripted("chat")),
        }
    }

    async fn upload_document(&self, file_name: &str, contents: Vec<u8>) -> Result<UploadResult> {
        lock(&self.uploads).push(RecordedUpload {
            file_name: file_name.to_string(),
            contents,
        });
        match lock(&self.upload_replies).pop_front() {
            Some(Ok(result)) => Ok(result),
            Some(Err(e)) => Err(StaffroomError::Http(e).into()),
            None => Err(unscripted("upload")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_are_served_in_order() {
        let backend = FakeBackend::new();
        backend.push_chat_reply(ChatResponse::new("t1", "first"));
        backend.push_chat_reply(ChatResponse::new("t1", "second"));

        let a = backend.chat(&ChatRequest::new("a", None)).await.unwrap();
        let b = backend.chat(&ChatRequest::new("b", None)).await.unwrap();
        assert_eq!(a.message, "first");
        assert_eq!(b.message, "second");
    }

    #[tokio::test]
    async fn test_empty_queue_is_an_error() {
        let backend = FakeBackend::new();
        let err = backend.chat(&ChatRequest::new("a", None)).await.unwrap_err();
        assert!(err.to_string().contains("no scripted chat reply"));
        assert_eq!(backend.chat_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let backend = FakeBackend::new();
        backend.push_upload_failure("connection reset");
        let err = backend
            .upload_document("data.json", b"{}".to_vec())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_records_uploads() {
        let backend = FakeBackend::new();
        backend.push_upload_reply(UploadResult::accepted("ok"));
        backend
            .upload_document("data.json", b"[1,2]".to_vec())
            .await
            .unwrap();

        let uploads = backend.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].file_name, "data.json");
        assert_eq!(uploads[0].contents, b"[1,2]".to_vec());
    }
}
