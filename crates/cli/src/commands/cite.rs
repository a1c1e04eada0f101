//! Cite command handler.

use civic_core::{config::AppConfig, AppError, AppResult};
use civic_retrieval::Retriever;
use clap::Args;
use std::io::Read;

/// Rewrite [file.txt] citations into article labels
#[derive(Args, Debug)]
pub struct CiteCommand {
    /// City (tenant key) whose citation index to use
    #[arg(long)]
    pub city: String,

    /// Text to rewrite; read from stdin when omitted
    pub text: Option<String>,
}

impl CiteCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(city = %self.city, "Executing cite command");

        let text = match &self.text {
            Some(text) => text.clone(),
            None => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                buffer
            }
        };

        if text.trim().is_empty() {
            return Err(AppError::Config("No text provided".to_string()));
        }

        let retriever = Retriever::from_config(config)?;
        print!("{}", retriever.rewrite_citations(&self.city, &text)?);
        if !text.ends_with('\n') {
            println!();
        }

        Ok(())
    }
}
