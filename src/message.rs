//! Session data model
//!
//! Messages shown in the chat log, the append-only log itself, and the
//! slot holding the server-assigned conversation id.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a rendered message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person at the terminal
    User,
    /// Reply from the assistant server
    Assistant,
    /// Generated locally, e.g. request failure notices
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
        }
    }
}

/// A single entry of the chat log
///
/// Messages are created once and never mutated. The timestamp is the local
/// wall clock at the moment the message is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Text of the message
    pub content: String,
    /// Who produced the message
    pub role: Role,
    /// Local time the message was rendered
    pub timestamp: DateTime<Local>,
}

impl Message {
    /// Create a message stamped with the current local time
    ///
    /// # Examples
    ///
    /// ```
    /// use staffroom::message::{Message, Role};
    ///
    /// let msg = Message::new("Hello", Role::User);
    /// assert_eq!(msg.content, "Hello");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn new(content: impl Into<String>, role: Role) -> Self {
        Self {
            content: content.into(),
            role,
            timestamp: Local::now(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Role::User)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(content, Role::Assistant)
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(content, Role::System)
    }

    /// Local time formatted as `HH:MM:SS`
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// Append-only, creation-ordered list of messages
///
/// Entries cannot be removed or edited.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the end of the log
    pub fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Number of messages in the log
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterate messages in creation order
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Most recently appended message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages with the given role
    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Holder for the server-assigned conversation id
///
/// Empty until the first successful chat reply that carries a non-empty id.
/// Once filled, the id never changes for the rest of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationSlot {
    id: Option<String>,
}

impl ConversationSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot that already holds an id (e.g. `ask --conversation-id`)
    pub fn with_id(id: impl Into<String>) -> Self {
        let mut slot = Self::new();
        slot.adopt(id);
        slot
    }

    /// Current id, if the server has assigned one
    pub fn get(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Whether an id has been assigned
    pub fn is_set(&self) -> bool {
        self.id.is_some()
    }

    /// Store `id` if the slot is still empty
    ///
    /// Returns `true` if the id was adopted, `false` if an id was already
    /// present (in which case the stored id is left untouched). An empty id
    /// counts as no id: it is not stored and the slot stays open.
    ///
    /// # Examples
    ///
    /// ```
    /// use staffroom::message::ConversationSlot;
    ///
    /// let mut slot = ConversationSlot::new();
    /// assert!(slot.adopt("abc"));
    /// assert!(!slot.adopt("xyz"));
    /// assert_eq!(slot.get(), Some("abc"));
    /// ```
    pub fn adopt(&mut self, id: impl Into<String>) -> bool {
        if self.id.is_some() {
            return false;
        }
        let id = id.into();
        if id.is_empty() {
            return false;
        }
        self.id = Some(id);
        true
    }
}
