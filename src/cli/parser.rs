//! Command-line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// policy-rag: retrieval-augmented question answering over insurance and
/// legal policy documents.
#[derive(Parser, Debug)]
#[command(name = "policy-rag")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a TOML configuration file overlaying the defaults.
    #[arg(short, long, env = "POLICY_RAG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer one or more questions about a document.
    Ask {
        /// URL of the source document (PDF, DOCX, email, or HTML).
        #[arg(short, long)]
        url: String,

        /// A question to ask. May be repeated.
        #[arg(short, long = "question")]
        questions: Vec<String>,

        /// Path to a file with one question per line, in addition to any
        /// `--question` flags.
        #[arg(long)]
        questions_file: Option<PathBuf>,

        /// OpenAI-compatible model name (requires the `llm-openai` feature).
        #[arg(long, default_value = "gpt-4o-mini")]
        model: String,
    },
}
