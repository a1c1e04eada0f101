//! Ask command handler.
//!
//! Runs the full gated pipeline for one question.

use super::request_time;
use chrono::{DateTime, Utc};
use civic_core::{config::AppConfig, AppResult};
use civic_retrieval::{AnswerKind, AnswerRequest, Assistant};
use clap::Args;

/// Ask a city's assistant a question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// City (tenant key)
    #[arg(long)]
    pub city: String,

    /// Access token for the city
    #[arg(long, env = "CIVIC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Evaluate the access window at this RFC 3339 time instead of now
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,

    /// The question to ask
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(city = %self.city, "Executing ask command");

        let assistant = Assistant::from_config(config)?;
        let request = AnswerRequest::new(
            &self.city,
            self.token.clone(),
            request_time(self.at),
            &self.question,
        );

        let answer = assistant.answer(&request).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
            return Ok(());
        }

        println!("{}:", answer.persona_name);
        println!("{}", answer.text);

        if answer.kind == AnswerKind::Generated && !answer.sources.is_empty() {
            println!();
            println!("Sources:");
            for source in &answer.sources {
                println!("  - {} (score {:.2})", source.file_name, source.score);
            }
        }

        Ok(())
    }
}
