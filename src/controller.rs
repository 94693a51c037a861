//! Chat UI controller
//!
//! [`ChatController`] owns the whole page state: the conversation id, the
//! message log, the text input, the typing placeholders, the file selector
//! and the upload banner. User actions are synchronous methods that update
//! that state and, when a request is needed, spawn it as an independent task.
//! Each task reports back through a [`ControllerEvent`] which the session's
//! event loop hands to [`ChatController::handle_event`].
//!
//! Nothing blocks a second chat turn while one is outstanding. Completions
//! are applied in the order they arrive, and the first successful reply
//! fixes the conversation id for the rest of the session.
//!
//! Request failures never leave the controller: they are logged with
//! `tracing` and turned into a system message or a danger banner.

use crate::api::{ChatBackend, ChatRequest, ChatResponse, UploadResult};
use crate::error::Result;
use crate::message::{ConversationSlot, Message, MessageLog};
use crate::view::{Banner, ChatView};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// System message appended when a chat turn fails
pub const CHAT_ERROR_MESSAGE: &str =
    "Sorry, there was an error processing your request. Please try again.";

/// Danger banner text for a failed upload request
pub const UPLOAD_ERROR_MESSAGE: &str = "Error uploading document. Please try again.";

/// Warning banner text when the upload form is submitted without a file
pub const NO_FILE_MESSAGE: &str = "Please select a file to upload";

/// Warning banner text when the selected file is not a `.json` file
pub const NOT_JSON_MESSAGE: &str = "Please upload a JSON file";

/// Info banner text while an upload is in flight
pub const UPLOADING_MESSAGE: &str = "Uploading document...";

/// Completion of a spawned request
#[derive(Debug)]
pub enum ControllerEvent {
    /// A chat turn finished
    ChatCompleted(Result<ChatResponse>),
    /// An upload finished
    UploadCompleted(Result<UploadResult>),
}

/// Renderable page state
#[derive(Debug, Default)]
pub struct ChatPanel {
    log: MessageLog,
    typing: usize,
    input: String,
    selected_file: Option<PathBuf>,
    banner: Option<Banner>,
}

impl ChatPanel {
    /// Messages shown so far
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Number of typing placeholders currently shown
    pub fn typing(&self) -> usize {
        self.typing
    }

    /// Whether any typing placeholder is shown
    pub fn is_typing(&self) -> bool {
        self.typing > 0
    }

    /// Current text input contents
    pub fn input(&self) -> &str {
        &self.input
    }

    /// File currently in the selector
    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    /// Current upload banner
    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }
}

/// The chat controller
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use staffroom::api::{ChatResponse, FakeBackend};
/// use staffroom::controller::ChatController;
/// use staffroom::view::NullView;
///
/// # #[tokio::main]
/// # async fn main() {
/// let backend = Arc::new(FakeBackend::new());
/// backend.push_chat_reply(ChatResponse::new("abc", "hi"));
///
/// let (mut controller, mut events) = ChatController::new(backend, Box::new(NullView));
/// assert!(controller.submit_user_message("hello"));
/// controller.run_until_idle(&mut events).await;
///
/// assert_eq!(controller.conversation_id(), Some("abc"));
/// assert_eq!(controller.panel().log().len(), 2);
/// # }
/// ```
pub struct ChatController {
    backend: Arc<dyn ChatBackend>,
    conversation: ConversationSlot,
    panel: ChatPanel,
    view: Box<dyn ChatView>,
    events: mpsc::UnboundedSender<ControllerEvent>,
    in_flight: usize,
}

impl ChatController {
    /// Create a controller and the receiver its requests report to
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        view: Box<dyn ChatView>,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            backend,
            conversation: ConversationSlot::new(),
            panel: ChatPanel::default(),
            view,
            events,
            in_flight: 0,
        };
        (controller, rx)
    }

    /// Start from a known conversation instead of an empty slot
    pub fn with_conversation(mut self, conversation: ConversationSlot) -> Self {
        self.conversation = conversation;
        self
    }

    /// Conversation id assigned by the server, if any
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation.get()
    }

    /// Current page state
    pub fn panel(&self) -> &ChatPanel {
        &self.panel
    }

    /// Requests spawned whose completion has not been handled yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Replace the text input contents
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.panel.input = text.into();
    }

    /// Send action: submit whatever is in the text input
    pub fn send_clicked(&mut self) -> bool {
        let text = self.panel.input.clone();
        self.submit_user_message(&text)
    }

    /// Submit a chat message
    ///
    /// Whitespace-only text is ignored. Otherwise the message is appended as
    /// a `user` entry right away, the input is cleared, a typing placeholder
    /// is shown and the chat request is spawned.
    ///
    /// Returns whether a request was dispatched.
    pub fn submit_user_message(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        self.append(Message::user(text));
        self.panel.input.clear();
        self.set_typing(self.panel.typing + 1);

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let message = text.to_string();
        let conversation_id = self.conversation.get().map(str::to_string);
        self.in_flight += 1;
        tracing::debug!(
            conversation_id = ?conversation_id,
            in_flight = self.in_flight,
            "Dispatching chat request"
        );

        tokio::spawn(async move {
            let result = chat_request(backend.as_ref(), message, conversation_id).await;
            if events.send(ControllerEvent::ChatCompleted(result)).is_err() {
                tracing::debug!("Chat reply arrived after the session ended");
            }
        });

        true
    }

    /// Put a file in the selector
    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        self.panel.selected_file = Some(path.into());
        self.view
            .file_selection_changed(self.panel.selected_file.as_deref());
    }

    /// Submit the upload form
    ///
    /// The selection must exist and its name must end in `.json`; otherwise
    /// a warning banner is shown and nothing is sent.
    ///
    /// Returns whether a request was dispatched.
    pub fn upload_document(&mut self) -> bool {
        let path = match self.panel.selected_file.clone() {
            Some(path) => path,
            None => {
                self.set_banner(Banner::warning(NO_FILE_MESSAGE));
                return false;
            }
        };

        let file_name = file_name_of(&path);
        if !file_name.ends_with(".json") {
            self.set_banner(Banner::warning(NOT_JSON_MESSAGE));
            return false;
        }

        self.set_banner(Banner::info(UPLOADING_MESSAGE));

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        self.in_flight += 1;
        tracing::debug!("Dispatching upload of {}", path.display());

        tokio::spawn(async move {
            let result = upload_request(backend.as_ref(), &path, &file_name).await;
            if events.send(ControllerEvent::UploadCompleted(result)).is_err() {
                tracing::debug!("Upload result arrived after the session ended");
            }
        });

        true
    }

    /// Apply a completed request to the page state
    pub fn handle_event(&mut self, event: ControllerEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match event {
            ControllerEvent::ChatCompleted(result) => self.finish_chat(result),
            ControllerEvent::UploadCompleted(result) => self.finish_upload(result),
        }
    }

    /// Handle events until every spawned request has completed
    pub async fn run_until_idle(&mut self, events: &mut mpsc::UnboundedReceiver<ControllerEvent>) {
        while self.in_flight > 0 {
            match events.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
    }

    fn finish_chat(&mut self, result: Result<ChatResponse>) {
        self.set_typing(self.panel.typing.saturating_sub(1));
        match result {
            Ok(response) => {
                if self.conversation.adopt(response.conversation_id.clone()) {
                    tracing::info!(conversation_id = %response.conversation_id, "Started conversation");
                }
                self.append(Message::assistant(response.message));
            }
            Err(e) => {
                tracing::error!("Error sending message: {:#}", e);
                self.append(Message::system(CHAT_ERROR_MESSAGE));
            }
        }
    }

    fn finish_upload(&mut self, result: Result<UploadResult>) {
        match result {
            Ok(UploadResult {
                success: true,
                message,
            }) => {
                self.set_banner(Banner::success(message));
                self.panel.selected_file = None;
                self.view.file_selection_changed(None);
            }
            Ok(UploadResult {
                success: false,
                message,
            }) => {
                tracing::warn!("Server rejected document: {}", message);
                self.set_banner(Banner::danger(message));
            }
            Err(e) => {
                tracing::error!("Error uploading document: {:#}", e);
                self.set_banner(Banner::danger(UPLOAD_ERROR_MESSAGE));
            }
        }
    }

    fn append(&mut self, message: Message) {
        let message = self.panel.log.push(message);
        self.view.message_appended(message);
    }

    fn set_typing(&mut self, typing: usize) {
        self.panel.typing = typing;
        self.view.typing_changed(typing);
    }

    fn set_banner(&mut self, banner: Banner) {
        self.view.banner_changed(&banner);
        self.panel.banner = Some(banner);
    }
}

/// Send one chat turn
pub async fn chat_request(
    backend: &dyn ChatBackend,
    text: String,
    conversation_id: Option<String>,
) -> Result<ChatResponse> {
    let request = ChatRequest::new(text, conversation_id);
    backend.chat(&request).await
}

/// Read the selected file and post it
async fn upload_request(
    backend: &dyn ChatBackend,
    path: &Path,
    file_name: &str,
) -> Result<UploadResult> {
    let contents = tokio::fs::read(path).await?;
    backend.upload_document(file_name, contents).await
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FakeBackend;
    use crate::message::Role;
    use crate::test_utils::{create_test_file, fake_controller, temp_dir};
    use crate::view::Severity;

    #[tokio::test]
    async fn test_submit_appends_user_message_before_reply() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_chat_reply(ChatResponse::new("abc", "hi"));
        let (mut controller, mut events) = fake_controller(&backend);

        assert!(controller.submit_user_message("  hello  "));

        let log = controller.panel().log();
        assert_eq!(log.len(), 1);
        assert_eq!(log.last().unwrap().role, Role::User);
        assert_eq!(log.last().unwrap().content, "hello");
        assert!(controller.panel().is_typing());
        assert_eq!(controller.in_flight(), 1);

        controller.run_until_idle(&mut events).await;
        assert_eq!(controller.panel().log().len(), 2);
    }

    #[tokio::test]
    async fn test_whitespace_input_is_ignored() {
        let backend = Arc::new(FakeBackend::new());
        let (mut controller, _events) = fake_controller(&backend);

        assert!(!controller.submit_user_message(""));
        assert!(!controller.submit_user_message("   \t\n"));

        tokio::task::yield_now().await;
        assert!(controller.panel().log().is_empty());
        assert!(!controller.panel().is_typing());
        assert_eq!(controller.in_flight(), 0);
        assert!(backend.chat_requests().is_empty());
    }

    #[tokio::test]
    async fn test_reply_adopts_conversation_id() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_chat_reply(ChatResponse::new("abc", "hi"));
        let (mut controller, mut events) = fake_controller(&backend);

        controller.submit_user_message("hello");
        controller.run_until_idle(&mut events).await;

        assert_eq!(controller.conversation_id(), Some("abc"));
        let last = controller.panel().log().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "hi");
        assert!(!controller.panel().is_typing());
        assert_eq!(backend.chat_requests()[0].conversation_id, None);
    }

    #[tokio::test]
    async fn test_empty_conversation_id_is_adopted_later() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_chat_reply(ChatResponse::new("", "hi"));
        backend.push_chat_reply(ChatResponse::new("abc", "again"));
        let (mut controller, mut events) = fake_controller(&backend);

        controller.submit_user_message("hello");
        controller.run_until_idle(&mut events).await;
        assert_eq!(controller.conversation_id(), None);

        controller.submit_user_message("follow up");
        controller.run_until_idle(&mut events).await;

        assert_eq!(controller.conversation_id(), Some("abc"));
        assert_eq!(backend.chat_requests()[1].conversation_id, None);
        assert_eq!(controller.panel().log().count_role(Role::Assistant), 2);
    }

    #[tokio::test]
    async fn test_second_turn_sends_adopted_id() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_chat_reply(ChatResponse::new("abc", "hi"));
        backend.push_chat_reply(ChatResponse::new("ignored", "again"));
        let (mut controller, mut events) = fake_controller(&backend);

        controller.submit_user_message("hello");
        controller.run_until_idle(&mut events).await;
        controller.submit_user_message("follow up");
        controller.run_until_idle(&mut events).await;

        let requests = backend.chat_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].conversation_id.as_deref(), Some("abc"));
        assert_eq!(controller.conversation_id(), Some("abc"));
    }

    #[tokio::test]
    async fn test_transport_failure_appends_system_message() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_chat_failure("connection refused");
        let (mut controller, mut events) = fake_controller(&backend);

        controller.submit_user_message("hello");
        controller.run_until_idle(&mut events).await;

        let log = controller.panel().log();
        assert_eq!(log.count_role(Role::System), 1);
        assert_eq!(log.last().unwrap().content, CHAT_ERROR_MESSAGE);
        assert!(!controller.panel().is_typing());
        assert_eq!(controller.conversation_id(), None);
    }

    #[tokio::test]
    async fn test_failure_does_not_block_next_turn() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_chat_failure("timeout");
        backend.push_chat_reply(ChatResponse::new("t7", "recovered"));
        let (mut controller, mut events) = fake_controller(&backend);

        controller.submit_user_message("one");
        controller.run_until_idle(&mut events).await;
        controller.submit_user_message("two");
        controller.run_until_idle(&mut events).await;

        assert_eq!(controller.conversation_id(), Some("t7"));
        assert_eq!(backend.chat_requests().len(), 2);
        assert_eq!(backend.chat_requests()[1].conversation_id, None);
    }

    #[tokio::test]
    async fn test_overlapping_turns_are_not_blocked() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_chat_reply(ChatResponse::new("first", "a"));
        backend.push_chat_reply(ChatResponse::new("second", "b"));
        let (mut controller, mut events) = fake_controller(&backend);

        assert!(controller.submit_user_message("one"));
        assert!(controller.submit_user_message("two"));
        assert_eq!(controller.panel().typing(), 2);
        assert_eq!(controller.panel().log().count_role(Role::User), 2);

        let first = events.recv().await.unwrap();
        let first_id = match &first {
            ControllerEvent::ChatCompleted(Ok(resp)) => resp.conversation_id.clone(),
            other => panic!("unexpected event: {:?}", other),
        };
        controller.handle_event(first);
        assert_eq!(controller.panel().typing(), 1);
        controller.run_until_idle(&mut events).await;

        // Both turns went out before any id existed; the first reply wins.
        assert!(backend
            .chat_requests()
            .iter()
            .all(|r| r.conversation_id.is_none()));
        assert_eq!(controller.conversation_id(), Some(first_id.as_str()));
        assert_eq!(controller.panel().typing(), 0);
        assert_eq!(controller.panel().log().count_role(Role::Assistant), 2);
    }

    #[tokio::test]
    async fn test_send_clicked_uses_and_clears_input() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_chat_reply(ChatResponse::new("abc", "hi"));
        let (mut controller, mut events) = fake_controller(&backend);

        controller.set_input("What is the uniform policy?");
        assert!(controller.send_clicked());
        assert_eq!(controller.panel().input(), "");
        controller.run_until_idle(&mut events).await;

        assert_eq!(
            backend.chat_requests()[0].message,
            "What is the uniform policy?"
        );
    }

    #[tokio::test]
    async fn test_send_clicked_with_blank_input_keeps_input() {
        let backend = Arc::new(FakeBackend::new());
        let (mut controller, _events) = fake_controller(&backend);

        controller.set_input("   ");
        assert!(!controller.send_clicked());
        assert_eq!(controller.panel().input(), "   ");
    }

    #[tokio::test]
    async fn test_with_conversation_sends_existing_id() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_chat_reply(ChatResponse::new("other", "ok"));
        let (controller, mut events) = fake_controller(&backend);
        let mut controller = controller.with_conversation(ConversationSlot::with_id("known"));

        controller.submit_user_message("hi");
        controller.run_until_idle(&mut events).await;

        assert_eq!(
            backend.chat_requests()[0].conversation_id.as_deref(),
            Some("known")
        );
        assert_eq!(controller.conversation_id(), Some("known"));
    }

    #[tokio::test]
    async fn test_upload_without_selection_warns() {
        let backend = Arc::new(FakeBackend::new());
        let (mut controller, _events) = fake_controller(&backend);

        assert!(!controller.upload_document());
        let banner = controller.panel().banner().unwrap();
        assert_eq!(banner.severity, Severity::Warning);
        assert_eq!(banner.text, NO_FILE_MESSAGE);
        assert!(backend.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_upload_non_json_warns_without_request() {
        let backend = Arc::new(FakeBackend::new());
        let (mut controller, _events) = fake_controller(&backend);

        controller.select_file("report.txt");
        assert!(!controller.upload_document());

        tokio::task::yield_now().await;
        let banner = controller.panel().banner().unwrap();
        assert_eq!(banner.severity, Severity::Warning);
        assert_eq!(banner.text, NOT_JSON_MESSAGE);
        assert!(backend.uploads().is_empty());
        assert_eq!(controller.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_upload_extension_check_is_case_sensitive() {
        let backend = Arc::new(FakeBackend::new());
        let (mut controller, _events) = fake_controller(&backend);

        controller.select_file("DATA.JSON");
        assert!(!controller.upload_document());
        assert_eq!(controller.panel().banner().unwrap().text, NOT_JSON_MESSAGE);
    }

    #[tokio::test]
    async fn test_upload_success_clears_selector() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "data.json", r#"[{"title": "Attendance"}]"#);

        let backend = Arc::new(FakeBackend::new());
        backend.push_upload_reply(UploadResult::accepted("Loaded 10 records"));
        let (mut controller, mut events) = fake_controller(&backend);

        controller.select_file(&path);
        assert!(controller.upload_document());
        assert_eq!(
            controller.panel().banner().unwrap(),
            &Banner::info(UPLOADING_MESSAGE)
        );

        controller.run_until_idle(&mut events).await;

        let banner = controller.panel().banner().unwrap();
        assert_eq!(banner.severity, Severity::Success);
        assert!(banner.text.contains("Loaded 10 records"));
        assert!(controller.panel().selected_file().is_none());

        let uploads = backend.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].file_name, "data.json");
        assert_eq!(uploads[0].contents, br#"[{"title": "Attendance"}]"#.to_vec());
    }

    #[tokio::test]
    async fn test_upload_rejection_keeps_selector() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "data.json", "{}");

        let backend = Arc::new(FakeBackend::new());
        backend.push_upload_reply(UploadResult::rejected("Bad schema"));
        let (mut controller, mut events) = fake_controller(&backend);

        controller.select_file(&path);
        controller.upload_document();
        controller.run_until_idle(&mut events).await;

        let banner = controller.panel().banner().unwrap();
        assert_eq!(banner.severity, Severity::Danger);
        assert!(banner.text.contains("Bad schema"));
        assert_eq!(controller.panel().selected_file(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_upload_transport_failure_shows_generic_banner() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "data.json", "{}");

        let backend = Arc::new(FakeBackend::new());
        backend.push_upload_failure("connection reset");
        let (mut controller, mut events) = fake_controller(&backend);

        controller.select_file(&path);
        controller.upload_document();
        controller.run_until_idle(&mut events).await;

        assert_eq!(
            controller.panel().banner().unwrap(),
            &Banner::danger(UPLOAD_ERROR_MESSAGE)
        );
        assert_eq!(controller.panel().selected_file(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_upload_unreadable_file_shows_generic_banner() {
        let dir = temp_dir();
        let path = dir.path().join("missing.json");

        let backend = Arc::new(FakeBackend::new());
        let (mut controller, mut events) = fake_controller(&backend);

        controller.select_file(&path);
        assert!(controller.upload_document());
        controller.run_until_idle(&mut events).await;

        assert_eq!(
            controller.panel().banner().unwrap(),
            &Banner::danger(UPLOAD_ERROR_MESSAGE)
        );
        assert!(backend.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_upload_retry_reuses_selection() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "data.json", "{}");

        let backend = Arc::new(FakeBackend::new());
        backend.push_upload_reply(UploadResult::rejected("Bad schema"));
        backend.push_upload_reply(UploadResult::accepted("Loaded 1 records"));
        let (mut controller, mut events) = fake_controller(&backend);

        controller.select_file(&path);
        controller.upload_document();
        controller.run_until_idle(&mut events).await;
        assert!(controller.upload_document());
        controller.run_until_idle(&mut events).await;

        assert_eq!(backend.uploads().len(), 2);
        assert_eq!(
            controller.panel().banner().unwrap().severity,
            Severity::Success
        );
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of(Path::new("/tmp/docs/data.json")), "data.json");
        assert_eq!(file_name_of(Path::new("report.txt")), "report.txt");
    }
}
