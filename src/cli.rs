//! Command-line interface definition for Staffroom
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, single questions and
//! document uploads.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Staffroom - terminal client for the Teacher's AI Assistant
///
/// Chat with the assistant about school policies and procedures, and upload
/// JSON documents to its knowledge base.
#[derive(Parser, Debug, Clone)]
#[command(name = "staffroom")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the assistant server base URL
    #[arg(short, long, env = "STAFFROOM_SERVER_URL")]
    pub server: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Staffroom
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Ask a single question and print the reply
    Ask {
        /// Message to send to the assistant
        message: String,

        /// Continue an existing conversation
        #[arg(long)]
        conversation_id: Option<String>,
    },

    /// Upload a JSON document to the assistant's knowledge base
    Upload {
        /// Path to the document (must end in .json)
        file: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            server: None,
            command: Commands::Chat,
        }
    }
}
