//! Search command handler.

use super::request_time;
use chrono::{DateTime, Utc};
use civic_core::{config::AppConfig, AppResult};
use civic_retrieval::{AnswerRequest, Retriever};
use clap::Args;

/// Rank a city's documents for a query without generating an answer
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// City (tenant key)
    #[arg(long)]
    pub city: String,

    /// Access token for the city
    #[arg(long, env = "CIVIC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Evaluate the access window at this RFC 3339 time instead of now
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,

    /// Query text
    pub query: String,

    /// Also print the assembled context block
    #[arg(long)]
    pub context: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(city = %self.city, "Executing search command");

        let retriever = Retriever::from_config(config)?;
        let request = AnswerRequest::new(
            &self.city,
            self.token.clone(),
            request_time(self.at),
            &self.query,
        );

        let result = retriever.search(&request)?;

        if self.json {
            let mut output = serde_json::json!({
                "city": result.pass.tenant_key,
                "query": self.query,
                "results": result.ranked,
            });
            if self.context {
                output["context"] = serde_json::to_value(&result.context)?;
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        if result.ranked.is_empty() {
            println!("No documents for {}", result.pass.tenant_key);
            return Ok(());
        }

        println!("Results for '{}' in {}:", self.query, result.pass.tenant_key);
        for (i, scored) in result.ranked.iter().enumerate() {
            println!("{:>3}. {:>7.2}  {}", i + 1, scored.score, scored.file_name);
        }

        if self.context {
            println!();
            println!(
                "Context ({} of {} documents):",
                result.context.sources.len(),
                result.ranked.len()
            );
            print!("{}", result.context.text);
        }

        Ok(())
    }
}
