//! `accounts` command handler

use anyhow::{Context, Result};
use colored::*;

use crate::api::{AnalyticsClient, MetricsService};
use crate::config::Config;

pub async fn handle_accounts_command(config: &Config) -> Result<()> {
    let client = AnalyticsClient::new(config.api_config(), config.access_token()?)?;
    let accounts = client
        .account_summaries()
        .await
        .context("Failed to fetch account summaries")?;

    if accounts.is_empty() {
        println!("No accounts available for this token");
        return Ok(());
    }

    for account in &accounts {
        println!("{} {}", account.id.bright_green().bold(), account.name);
        for property in &account.web_properties {
            println!("  {} {}", property.id.cyan(), property.name);
        }
    }
    Ok(())
}
