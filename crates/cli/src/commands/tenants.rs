//! Tenants command handler.
//!
//! Lists configured cities. Tokens are never printed.

use chrono::{DateTime, SecondsFormat, Utc};
use civic_access::{AccessGate, ActiveWindow};
use civic_core::{config::AppConfig, AppResult};
use clap::Args;

/// List configured cities
#[derive(Args, Debug)]
pub struct TenantsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl TenantsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing tenants command");

        let gate = AccessGate::from_config(config)?;
        let now = Utc::now();

        if self.json {
            let tenants: Vec<_> = gate
                .tenants()
                .iter()
                .map(|tenant| {
                    serde_json::json!({
                        "key": tenant.key(),
                        "personaName": tenant.persona_name(),
                        "window": tenant.window(),
                        "activeNow": tenant.is_active_at(now),
                    })
                })
                .collect();
            let output = serde_json::json!({
                "accessEnabled": gate.switch().is_enabled(),
                "tenants": tenants,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        if gate.tenants().is_empty() {
            println!("No cities configured");
            return Ok(());
        }

        if !gate.switch().is_enabled() {
            println!("Runtime access is disabled");
        }

        for tenant in gate.tenants().iter() {
            let status = if tenant.is_active_at(now) {
                "active"
            } else {
                "inactive"
            };
            println!(
                "{:<20} {:<20} {:<8} {}",
                tenant.key(),
                tenant.persona_name(),
                status,
                describe_window(tenant.window())
            );
        }

        Ok(())
    }
}

fn describe_window(window: Option<&ActiveWindow>) -> String {
    let Some(window) = window else {
        return "always".to_string();
    };

    let fmt = |t: Option<DateTime<Utc>>| {
        t.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| "..".to_string())
    };
    format!("{} to {}", fmt(window.start), fmt(window.end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_describe_window() {
        assert_eq!(describe_window(None), "always");

        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let window = ActiveWindow::new(Some(start), None).unwrap().unwrap();
        assert_eq!(describe_window(Some(&window)), "2026-01-01T00:00:00Z to ..");
    }
}
