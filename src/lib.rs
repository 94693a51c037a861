//! Staffroom - terminal client library for the Teacher's AI Assistant
//!
//! This library provides a chat controller that talks to the assistant's
//! HTTP API: one endpoint for chat turns and one for uploading JSON
//! documents into the assistant's knowledge base.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Wire types, the `ChatBackend` trait and its HTTP implementation
//! - `controller`: The chat controller owning conversation and page state
//! - `message`: Messages, the append-only log and the conversation id slot
//! - `view`: Banners and terminal rendering
//! - `commands`: Interactive session, single question and upload handlers
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use staffroom::{ChatController, Config, HttpBackend};
//! use staffroom::view::NullView;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let backend = Arc::new(HttpBackend::new(config.server.clone())?);
//!     let (mut controller, mut events) = ChatController::new(backend, Box::new(NullView));
//!     controller.submit_user_message("Where is the safeguarding policy?");
//!     controller.run_until_idle(&mut events).await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod message;
pub mod view;

// Re-export commonly used types
pub use api::{ChatBackend, HttpBackend};
pub use config::Config;
pub use controller::{ChatController, ControllerEvent};
pub use error::{Result, StaffroomError};
pub use message::{ConversationSlot, Message, MessageLog, Role};
pub use view::{Banner, Severity};

#[cfg(test)]
pub mod test_utils;
