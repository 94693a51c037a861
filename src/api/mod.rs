//! Assistant server API
//!
//! Wire types for the two endpoints the client talks to and the
//! [`ChatBackend`] trait the controller depends on.
//!
//! - [`http::HttpBackend`] talks to a real server with reqwest
//! - [`fake::FakeBackend`] returns scripted replies for tests

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod fake;
pub mod http;

pub use fake::FakeBackend;
pub use http::HttpBackend;

/// Body of `POST /api/chat`
///
/// `conversation_id` is sent as JSON `null` until the server has assigned
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User message text
    pub message: String,
    /// Conversation to continue, or `null` to start a new one
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    /// Build a chat request
    pub fn new(message: impl Into<String>, conversation_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id,
        }
    }
}

/// Reply from `POST /api/chat`
///
/// The server also sends `success` and `timestamp`; they are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Conversation the reply belongs to
    pub conversation_id: String,
    /// Assistant reply text
    pub message: String,
}

impl ChatResponse {
    /// Build a chat response
    pub fn new(conversation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            message: message.into(),
        }
    }
}

/// Reply from `POST /api/upload-document`
///
/// `success: false` is an application-level failure. It may arrive with an
/// error status as well as with HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Whether the server accepted the document
    pub success: bool,
    /// Human-readable outcome supplied by the server
    pub message: String,
}

impl UploadResult {
    /// Accepted upload
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Rejected upload
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Remote operations used by the chat controller
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one chat turn
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Upload a document as the multipart field `file`
    async fn upload_document(&self, file_name: &str, contents: Vec<u8>) -> Result<UploadResult>;
}
