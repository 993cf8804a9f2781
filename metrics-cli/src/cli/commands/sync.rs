//! `sync` command handler

use anyhow::{Context, Result, bail};
use colored::*;
use dialoguer::{Input, Select};
use is_terminal::IsTerminal;

use super::workflow;
use crate::api::{AccountSummary, AnalyticsClient, MetricsService, PropertyTarget};
use crate::cli::SyncCommands;
use crate::config::Config;
use crate::source::slot::MAX_SLOTS;
use crate::sync::{ExecuteOptions, SyncReport, export_report_to_excel, render_report};

pub async fn handle_sync_command(config: &Config, args: SyncCommands) -> Result<()> {
    let flow = workflow(config, &args.table);

    // The table is read once; a bad table fails before any prompt or remote call
    let desired = flow.load_desired()?;

    let client = AnalyticsClient::new(config.api_config(), config.access_token()?)?;
    let interactive = std::io::stdin().is_terminal();

    let target = resolve_target(&client, &args, interactive).await?;
    let limit = resolve_limit(&args, interactive)?;
    log::info!("Syncing slots 1..={} on {}", limit, target);

    let report = if args.dry_run {
        let plan = flow.plan(&client, &target, &desired, limit).await?;
        SyncReport::from_plan(&plan)
    } else {
        flow.reconcile(
            &client,
            &target,
            &desired,
            limit,
            ExecuteOptions {
                fail_fast: args.fail_fast,
            },
        )
        .await?
    };

    print!("{}", render_report(&report));

    if let Some(path) = &args.report {
        export_report_to_excel(&report, &path.to_string_lossy())?;
        println!(
            "Report saved to: {}",
            path.display().to_string().bright_green()
        );
    }

    let failures = report.failures();
    if !failures.is_empty() {
        for failure in &failures {
            log::error!("{}", failure);
        }
        bail!("{} of {} slots failed", failures.len(), report.outcomes.len());
    }
    Ok(())
}

async fn resolve_target(
    service: &dyn MetricsService,
    args: &SyncCommands,
    interactive: bool,
) -> Result<PropertyTarget> {
    if let (Some(account), Some(property)) = (&args.account, &args.property) {
        return Ok(PropertyTarget::new(account.clone(), property.clone()));
    }
    if !interactive {
        bail!("--account and --property are required when not running interactively");
    }

    let accounts = service
        .account_summaries()
        .await
        .context("Failed to fetch account summaries")?;
    let account = match &args.account {
        Some(id) => accounts
            .iter()
            .find(|a| &a.id == id)
            .with_context(|| format!("Account {} is not accessible with this token", id))?,
        None => select_account(&accounts)?,
    };

    let property_id = match &args.property {
        Some(id) => id.clone(),
        None => select_property(account)?,
    };
    Ok(PropertyTarget::new(account.id.clone(), property_id))
}

fn select_account(accounts: &[AccountSummary]) -> Result<&AccountSummary> {
    if accounts.is_empty() {
        bail!("No accounts available for this token");
    }
    let labels: Vec<String> = accounts
        .iter()
        .map(|a| format!("{} ({})", a.name, a.id))
        .collect();
    let choice = Select::new()
        .with_prompt("Select account")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(&accounts[choice])
}

fn select_property(account: &AccountSummary) -> Result<String> {
    if account.web_properties.is_empty() {
        bail!("Account {} has no web properties", account.id);
    }
    let labels: Vec<String> = account
        .web_properties
        .iter()
        .map(|p| format!("{} ({})", p.name, p.id))
        .collect();
    let choice = Select::new()
        .with_prompt(format!("Select property of {}", account.name))
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(account.web_properties[choice].id.clone())
}

fn resolve_limit(args: &SyncCommands, interactive: bool) -> Result<usize> {
    if let Some(limit) = args.limit {
        return Ok(limit as usize);
    }
    if !interactive {
        bail!("--limit is required when not running interactively");
    }
    let limit: usize = Input::new()
        .with_prompt(format!("Number of slots to process (1-{})", MAX_SLOTS))
        .default(MAX_SLOTS)
        .validate_with(|value: &usize| -> Result<(), String> {
            if (1..=MAX_SLOTS).contains(value) {
                Ok(())
            } else {
                Err(format!("Enter a number between 1 and {}", MAX_SLOTS))
            }
        })
        .interact_text()?;
    Ok(limit)
}
