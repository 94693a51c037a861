//! Special commands parser for interactive chat mode
//!
//! Lines starting with `/` (plus the bare words `exit` and `quit`) control
//! the session instead of being sent to the assistant:
//! - Select and upload documents
//! - View session status
//! - Display help information
//! - Exit the session
//!
//! Command names are case-insensitive; file path arguments keep their case.

use colored::Colorize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Submit the upload form
    ///
    /// With a path the file is selected first; without one the current
    /// selection is uploaded again.
    Upload(Option<PathBuf>),

    /// Put a file in the selector without uploading it
    SelectFile(PathBuf),

    /// Display conversation and upload status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent as a chat message.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is not
/// a valid command, and `CommandError::MissingArgument` if `/file` is given
/// no path.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use staffroom::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/upload docs/Policies.json").unwrap();
/// assert_eq!(cmd, SpecialCommand::Upload(Some(PathBuf::from("docs/Policies.json"))));
///
/// let cmd = parse_special_command("hello assistant").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, arg)) => (name.to_lowercase(), Some(arg.trim())),
        None => (lower.clone(), None),
    };
    let arg = arg.filter(|a| !a.is_empty());

    match name.as_str() {
        "/upload" => Ok(SpecialCommand::Upload(arg.map(PathBuf::from))),
        "/file" => match arg {
            Some(path) => Ok(SpecialCommand::SelectFile(PathBuf::from(path))),
            None => Err(CommandError::MissingArgument {
                command: "/file".to_string(),
                usage: "/file <path>".to_string(),
            }),
        },
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print help for the interactive session
pub fn print_help() {
    println!();
    println!("{}", "Staffroom interactive chat".bold());
    println!();
    println!("Type a question and press Enter to ask the assistant.");
    println!();
    println!("{}", "Commands:".bold());
    println!("  {:<20} Select a JSON document and upload it", "/upload <path>");
    println!("  {:<20} Upload the currently selected document again", "/upload");
    println!("  {:<20} Select a document without uploading", "/file <path>");
    println!("  {:<20} Show conversation and upload status", "/status");
    println!("  {:<20} Show this help", "/help");
    println!("  {:<20} Leave the session (or Ctrl-D)", "exit, quit");
    println!();
}
