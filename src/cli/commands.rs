//! CLI command implementations.

use crate::cache::InMemoryCache;
use crate::cli::output::{OutputFormat, format_answers};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::embedding::create_embedder;
use crate::error::{ParseError, Result};
use crate::fetch::ReqwestFetcher;
use crate::llm::{LlmClient, LlmDriver, ScriptedLlmClient};
use crate::orchestrator::Orchestrator;
use std::fs;
use std::time::Duration;

#[cfg(feature = "llm-openai")]
fn build_llm_client(model: &str) -> Box<dyn LlmClient> {
    Box::new(crate::llm::OpenAiLlmClient::new(model))
}

#[cfg(not(feature = "llm-openai"))]
fn build_llm_client(_model: &str) -> Box<dyn LlmClient> {
    Box::new(ScriptedLlmClient::single(
        "This build has no real LLM backend configured; rebuild with `--features llm-openai` \
         and set OPENAI_API_KEY to get real answers.",
    ))
}

/// Executes the parsed CLI command, returning the text to print on success.
///
/// # Errors
///
/// Returns an error if the configuration file is invalid, the questions
/// file cannot be read, or document processing fails outright.
pub async fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let config = load_config(cli)?;

    match &cli.command {
        Commands::Ask { url, questions, questions_file, model } => {
            let mut all_questions = questions.clone();
            if let Some(path) = questions_file {
                let contents = fs::read_to_string(path)
                    .map_err(|e| ParseError::FetchFailed(format!("reading {}: {e}", path.display())))?;
                all_questions.extend(contents.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string));
            }

            let orchestrator = build_orchestrator(&config, model)?;
            let answers = orchestrator.process(url, &all_questions).await?;
            Ok(format_answers(&all_questions, &answers, format))
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| ParseError::FetchFailed(format!("reading {}: {e}", path.display())))?;
            Config::from_toml(&text).map_err(|e| ParseError::DecodeFailed(e.to_string()).into())
        }
        None => Ok(Config::default()),
    }
}

fn build_orchestrator(config: &Config, model: &str) -> Result<Orchestrator<Box<dyn LlmClient>>> {
    let index = create_embedder().map(crate::embedding::InMemoryIndex::new)?;
    let fetcher = ReqwestFetcher::new(
        Duration::from_secs(config.fetch_total_timeout_secs),
        Duration::from_secs(config.fetch_connect_timeout_secs),
        config.max_document_bytes,
    )?;
    let cache = InMemoryCache::new();
    let llm = LlmDriver::new(build_llm_client(model), config.llm_rate_limit_per_minute, config.max_tokens_per_day);

    Ok(Orchestrator::new(config.clone(), Box::new(index), Box::new(fetcher), Box::new(cache), llm))
}
