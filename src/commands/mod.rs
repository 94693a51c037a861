/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`: interactive chat session
- `ask`: send a single question
- `upload`: upload a single document

All three drive a `ChatController`.
*/

use crate::api::{ChatBackend, HttpBackend};
use crate::config::Config;
use crate::controller::ChatController;
use crate::error::{Result, StaffroomError};
use crate::message::{ConversationSlot, Role};
use crate::view::{Banner, ChatView, ReplyView, Severity, TerminalView};
use std::path::PathBuf;
use std::sync::Arc;

// Special commands parser for the interactive session
pub mod special_commands;

fn http_backend(config: &Config) -> Result<Arc<dyn ChatBackend>> {
    Ok(Arc::new(HttpBackend::new(config.server.clone())?))
}

// Chat command handler
pub mod chat {
    //! Interactive chat session.
    //!
    //! Lines are read with rustyline on a dedicated thread and forwarded to
    //! the async event loop, which also receives request completions from the
    //! controller. The prompt therefore stays usable while replies are
    //! outstanding.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::{DefaultEditor, ExternalPrinter};
    use tokio::sync::{mpsc, oneshot};

    type Printer = Box<dyn ExternalPrinter + Send>;

    /// Input delivered by the line-reader thread
    #[derive(Debug)]
    enum InputLine {
        Line(String),
        Interrupted,
        Eof,
        Failed(String),
    }

    /// Whether the session should keep reading input
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LoopControl {
        /// Keep going
        Continue,
        /// Leave the session
        Exit,
    }

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client or the line editor cannot be created
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat session");

        print_welcome_banner(&config);

        let backend = http_backend(&config)?;
        let (mut lines, printer) = spawn_line_reader(config.ui.history_size);
        let mut view = TerminalView::new(config.ui.show_timestamps);
        match printer.await {
            Ok(Some(printer)) => view = view.with_printer(printer),
            _ => tracing::debug!("No prompt printer available, rendering to stdout"),
        }
        let (mut controller, mut events) = ChatController::new(backend, Box::new(view));

        loop {
            tokio::select! {
                Some(event) = events.recv() => controller.handle_event(event),
                input = lines.recv() => match input {
                    Some(InputLine::Line(line)) => {
                        if dispatch_line(&mut controller, &line) == LoopControl::Exit {
                            break;
                        }
                    }
                    Some(InputLine::Interrupted) => {
                        println!("CTRL-C");
                        break;
                    }
                    Some(InputLine::Eof) | None => {
                        println!("CTRL-D");
                        break;
                    }
                    Some(InputLine::Failed(err)) => {
                        tracing::error!("Readline error: {}", err);
                        return Err(StaffroomError::Config(format!(
                            "Failed to read terminal input: {}",
                            err
                        ))
                        .into());
                    }
                },
            }
        }

        if controller.in_flight() > 0 {
            tracing::debug!(
                "Leaving with {} request(s) still outstanding",
                controller.in_flight()
            );
        }
        println!("Goodbye!");
        Ok(())
    }

    /// Route one line of input to the controller
    ///
    /// Special commands act on the session; everything else is submitted as
    /// a chat message.
    pub fn dispatch_line(controller: &mut ChatController, line: &str) -> LoopControl {
        match parse_special_command(line) {
            Ok(SpecialCommand::Upload(path)) => {
                if let Some(path) = path {
                    controller.select_file(path);
                }
                controller.upload_document();
            }
            Ok(SpecialCommand::SelectFile(path)) => controller.select_file(path),
            Ok(SpecialCommand::ShowStatus) => print_status(controller),
            Ok(SpecialCommand::Help) => print_help(),
            Ok(SpecialCommand::Exit) => return LoopControl::Exit,
            Ok(SpecialCommand::None) => {
                controller.set_input(line);
                controller.send_clicked();
            }
            Err(e) => eprintln!("{}", e.to_string().red()),
        }
        LoopControl::Continue
    }

    /// Start the line reader thread
    ///
    /// Also yields the editor's external printer once the editor exists, or
    /// `None` when the terminal does not support one (e.g. piped input).
    fn spawn_line_reader(
        history_size: usize,
    ) -> (mpsc::UnboundedReceiver<InputLine>, oneshot::Receiver<Option<Printer>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (printer_tx, printer_rx) = oneshot::channel();

        // A plain thread: readline blocks and must not hold up runtime shutdown.
        std::thread::spawn(move || {
            let mut rl = match editor(history_size) {
                Ok(rl) => rl,
                Err(e) => {
                    let _ = printer_tx.send(None);
                    let _ = tx.send(InputLine::Failed(e.to_string()));
                    return;
                }
            };

            let printer = match rl.create_external_printer() {
                Ok(printer) => Some(Box::new(printer) as Printer),
                Err(e) => {
                    tracing::debug!("External printer unavailable: {}", e);
                    None
                }
            };
            let _ = printer_tx.send(printer);

            loop {
                let input = match rl.readline("> ") {
                    Ok(line) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        if let Err(e) = rl.add_history_entry(trimmed) {
                            tracing::debug!("Failed to record history: {}", e);
                        }
                        InputLine::Line(line)
                    }
                    Err(ReadlineError::Interrupted) => InputLine::Interrupted,
                    Err(ReadlineError::Eof) => InputLine::Eof,
                    Err(err) => InputLine::Failed(err.to_string()),
                };

                let last = !matches!(input, InputLine::Line(_));
                if tx.send(input).is_err() || last {
                    break;
                }
            }
        });

        (rx, printer_rx)
    }

    fn editor(history_size: usize) -> Result<DefaultEditor> {
        let config = rustyline::Config::builder()
            .max_history_size(history_size)?
            .auto_add_history(false)
            .build();
        Ok(DefaultEditor::with_config(config)?)
    }

    /// Display welcome banner at the start of the session
    fn print_welcome_banner(config: &Config) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║        Staffroom - Teacher's AI Assistant                    ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Server: {}", config.server.base_url.cyan());
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Display conversation and upload state
    fn print_status(controller: &ChatController) {
        let panel = controller.panel();
        println!();
        println!("{}", "Session status".bold());
        println!(
            "  Conversation:  {}",
            controller
                .conversation_id()
                .map(|id| id.cyan().to_string())
                .unwrap_or_else(|| "not started".dimmed().to_string())
        );
        println!("  Messages:      {}", panel.log().len());
        println!("  Awaiting:      {} repl(ies)", panel.typing());
        println!(
            "  Selected file: {}",
            panel
                .selected_file()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        if let Some(banner) = panel.banner() {
            println!("  Upload status: {}", banner.colored());
        }
        println!();
    }
}

// Single question handler
pub mod ask {
    //! One chat turn from the command line.

    use super::*;

    /// Ask one question against the configured server and print the reply
    ///
    /// # Errors
    ///
    /// Returns error if the message is empty or the chat request fails
    pub async fn run_ask(
        config: Config,
        message: String,
        conversation_id: Option<String>,
    ) -> Result<()> {
        let backend = http_backend(&config)?;
        let view = ReplyView;
        let conversation = ask(backend, Box::new(view), &message, conversation_id).await?;
        eprintln!(
            "conversation: {} (continue with --conversation-id {})",
            conversation, conversation
        );
        Ok(())
    }

    /// Run a single chat turn through a controller
    ///
    /// Returns the conversation id the turn belongs to.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank input and an HTTP error when the
    /// turn ended with the system error message.
    pub async fn ask(
        backend: Arc<dyn ChatBackend>,
        view: Box<dyn ChatView>,
        message: &str,
        conversation_id: Option<String>,
    ) -> Result<String> {
        let (controller, mut events) = ChatController::new(backend, view);
        let mut controller = match conversation_id {
            Some(id) => controller.with_conversation(ConversationSlot::with_id(id)),
            None => controller,
        };

        if !controller.submit_user_message(message) {
            return Err(StaffroomError::Validation("Message cannot be empty".to_string()).into());
        }
        controller.run_until_idle(&mut events).await;

        let replied = controller
            .panel()
            .log()
            .last()
            .map(|m| m.role == Role::Assistant)
            .unwrap_or(false);
        if !replied {
            return Err(StaffroomError::Http("Chat request failed".to_string()).into());
        }
        Ok(controller.conversation_id().unwrap_or_default().to_string())
    }
}

// Single upload handler
pub mod upload {
    //! One document upload from the command line.

    use super::*;

    /// Upload one document to the configured server
    ///
    /// # Errors
    ///
    /// Returns error unless the server accepted the document
    pub async fn run_upload(config: Config, file: PathBuf) -> Result<()> {
        let backend = http_backend(&config)?;
        let view = TerminalView::new(false);
        upload(backend, Box::new(view), file).await?;
        Ok(())
    }

    /// Submit a document through a controller's upload form
    ///
    /// Returns the final banner when it is a success banner.
    ///
    /// # Errors
    ///
    /// Returns a validation error for warning banners and an HTTP error for
    /// danger banners; the banner text is carried in the error.
    pub async fn upload(
        backend: Arc<dyn ChatBackend>,
        view: Box<dyn ChatView>,
        file: PathBuf,
    ) -> Result<Banner> {
        let (mut controller, mut events) = ChatController::new(backend, view);
        controller.select_file(file);
        controller.upload_document();
        controller.run_until_idle(&mut events).await;

        let banner = controller
            .panel()
            .banner()
            .cloned()
            .ok_or_else(|| StaffroomError::Http("Upload produced no status".to_string()))?;

        match banner.severity {
            Severity::Success | Severity::Info => Ok(banner),
            Severity::Warning => Err(StaffroomError::Validation(banner.text).into()),
            Severity::Danger => Err(StaffroomError::Http(banner.text).into()),
        }
    }
}
