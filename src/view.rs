//! Rendering of controller state
//!
//! The controller owns the page state; a [`ChatView`] is told about every
//! visible change so it can draw it. [`TerminalView`] draws with colors,
//! [`ReplyView`] prints bare replies, [`NullView`] draws nothing.

use crate::message::{Message, Role};
use colored::Colorize;
use rustyline::ExternalPrinter;
use std::fmt;
use std::path::Path;

/// Severity of an upload status banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Progress notice
    Info,
    /// Upload accepted
    Success,
    /// Input rejected before sending
    Warning,
    /// Upload failed
    Danger,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Danger => write!(f, "danger"),
        }
    }
}

/// Status message shown in the upload area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    /// How the banner is styled
    pub severity: Severity,
    /// Banner text
    pub text: String,
}

impl Banner {
    /// Create a banner
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    /// Info banner
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, text)
    }

    /// Success banner
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Severity::Success, text)
    }

    /// Warning banner
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, text)
    }

    /// Danger banner
    pub fn danger(text: impl Into<String>) -> Self {
        Self::new(Severity::Danger, text)
    }

    /// Banner text colored by severity
    pub fn colored(&self) -> String {
        match self.severity {
            Severity::Info => self.text.cyan().to_string(),
            Severity::Success => self.text.green().to_string(),
            Severity::Warning => self.text.yellow().to_string(),
            Severity::Danger => self.text.red().to_string(),
        }
    }
}

/// Receiver of visible state changes
///
/// Every method has a no-op default so views only implement what they draw.
pub trait ChatView: Send {
    /// A message was appended to the log
    fn message_appended(&mut self, _message: &Message) {}

    /// The number of typing placeholders changed
    fn typing_changed(&mut self, _pending: usize) {}

    /// The upload banner was replaced
    fn banner_changed(&mut self, _banner: &Banner) {}

    /// The file selector changed
    fn file_selection_changed(&mut self, _path: Option<&Path>) {}
}

/// View that renders nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl ChatView for NullView {}

/// Where a [`TerminalView`] writes its lines
enum Output {
    Stdout,
    /// Printed above an active rustyline prompt
    Prompt(Box<dyn ExternalPrinter + Send>),
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "Stdout"),
            Self::Prompt(_) => write!(f, "Prompt"),
        }
    }
}

/// Colored renderer for the interactive session
#[derive(Debug)]
pub struct TerminalView {
    show_timestamps: bool,
    typing: usize,
    output: Output,
}

impl TerminalView {
    /// Create a terminal view that prints to stdout
    pub fn new(show_timestamps: bool) -> Self {
        Self {
            show_timestamps,
            typing: 0,
            output: Output::Stdout,
        }
    }

    /// Route output through a rustyline printer so the prompt line is
    /// redrawn below every rendered line
    pub fn with_printer(mut self, printer: Box<dyn ExternalPrinter + Send>) -> Self {
        self.output = Output::Prompt(printer);
        self
    }

    /// Render a message as a single line
    ///
    /// # Examples
    ///
    /// ```
    /// use staffroom::message::Message;
    /// use staffroom::view::TerminalView;
    ///
    /// colored::control::set_override(false);
    /// let view = TerminalView::new(false);
    /// assert_eq!(view.format_message(&Message::user("hi")), "user: hi");
    /// ```
    pub fn format_message(&self, message: &Message) -> String {
        let label = match message.role {
            Role::User => "user".blue().bold(),
            Role::Assistant => "assistant".green().bold(),
            Role::System => "system".red().bold(),
        };
        if self.show_timestamps {
            format!(
                "{} {}: {}",
                format!("[{}]", message.time_label()).dimmed(),
                label,
                message.content
            )
        } else {
            format!("{}: {}", label, message.content)
        }
    }

    /// Indicator line for a new placeholder count
    ///
    /// Only a rising count produces a line; a reply arriving while others
    /// are still pending does not repeat the indicator.
    fn typing_line(&mut self, pending: usize) -> Option<String> {
        let rising = pending > self.typing;
        self.typing = pending;
        if !rising {
            return None;
        }
        let line = if pending > 1 {
            format!("... ({} replies pending)", pending)
        } else {
            "...".to_string()
        };
        Some(line.dimmed().to_string())
    }

    fn emit(&mut self, line: String) {
        match &mut self.output {
            Output::Stdout => println!("{}", line),
            Output::Prompt(printer) => {
                if let Err(e) = printer.print(line.clone()) {
                    tracing::debug!("External printer failed: {}", e);
                    println!("{}", line);
                }
            }
        }
    }
}

impl ChatView for TerminalView {
    fn message_appended(&mut self, message: &Message) {
        // The user's own line is already on screen from the prompt.
        if message.role != Role::User {
            let line = self.format_message(message);
            self.emit(line);
        }
    }

    fn typing_changed(&mut self, pending: usize) {
        if let Some(line) = self.typing_line(pending) {
            self.emit(line);
        }
    }

    fn banner_changed(&mut self, banner: &Banner) {
        self.emit(banner.colored());
    }

    fn file_selection_changed(&mut self, path: Option<&Path>) {
        if let Some(path) = path {
            self.emit(format!("Selected {}", path.display()).cyan().to_string());
        }
    }
}

/// Plain renderer for one-shot questions
///
/// Assistant replies go to stdout as bare text so the output can be piped.
/// System messages go to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplyView;

impl ChatView for ReplyView {
    fn message_appended(&mut self, message: &Message) {
        match message.role {
            Role::Assistant => println!("{}", message.content),
            Role::System => eprintln!("{}", message.content.red()),
            Role::User => {}
        }
    }
}
