//! Read-only dashboard views (`overview`, `leads`, `projects`, `bots`, `watch`).

use std::time::Duration;

use anyhow::{Result, bail};
use chrono::Utc;
use console::{Term, style};
use tokio::sync::mpsc;

use pipeline_control::config::PipelineConfig;
use pipeline_control::dashboard::ProjectStatus;
use pipeline_control::server::refresh::{RefreshOutcome, RefreshTask};
use pipeline_control::ui::dashboard as views;

use super::{build_service, print_json};

pub async fn cmd_overview(config: &PipelineConfig, json: bool) -> Result<()> {
    let service = build_service(config);
    let overview = service.overview().await?;
    if json {
        print_json(&overview)?;
    } else {
        print!("{}", views::overview(&overview));
    }
    service.shutdown().await;
    Ok(())
}

pub async fn cmd_leads(config: &PipelineConfig, board: bool, json: bool) -> Result<()> {
    let service = build_service(config);
    if board {
        let board = service.lead_board().await?;
        if json {
            print_json(&board)?;
        } else {
            print!("{}", views::lead_board(&board));
        }
    } else {
        let leads = service.list_leads().await?;
        if json {
            print_json(&leads)?;
        } else {
            print!("{}", views::lead_table(&leads));
        }
    }
    service.shutdown().await;
    Ok(())
}

pub async fn cmd_projects(
    config: &PipelineConfig,
    status: &str,
    summary: bool,
    json: bool,
) -> Result<()> {
    let filter = match status {
        "all" => None,
        s => match s.parse::<ProjectStatus>() {
            Ok(status) => Some(status),
            Err(e) => bail!("{}. Valid values: all, active, paused, completed, on-hold", e),
        },
    };

    let service = build_service(config);
    let projects = service.list_projects(filter.as_ref()).await?;
    if json {
        print_json(&projects)?;
    } else {
        print!("{}", views::project_cards(&projects));
        if summary {
            let summary = pipeline_control::dashboard::mapper::summarize_projects(&projects);
            print!("{}", views::project_summary(&summary));
        }
    }
    service.shutdown().await;
    Ok(())
}

pub fn cmd_bots(config: &PipelineConfig, json: bool) -> Result<()> {
    let service = build_service(config);
    let grid = service.bots();
    if json {
        print_json(&grid)?;
    } else {
        print!("{}", views::bot_grid(&grid, Utc::now()));
    }
    Ok(())
}

/// Redraw the overview every `interval` until Ctrl+C.
pub async fn cmd_watch(config: &PipelineConfig, interval: Option<u64>) -> Result<()> {
    let period = interval
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| config.refresh_interval());
    let service = build_service(config);
    let (tx, mut rx) = mpsc::channel(4);
    let task = RefreshTask::spawn(service.clone(), period, tx);
    let term = Term::stdout();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            outcome = rx.recv() => {
                let Some(outcome) = outcome else { break };
                let _ = term.clear_screen();
                match outcome {
                    RefreshOutcome::Refreshed(overview) => print!("{}", views::overview(&overview)),
                    RefreshOutcome::Failed(error) => {
                        println!("{} {}", style("Refresh failed:").red().bold(), error);
                    }
                }
                println!();
                println!(
                    "{}",
                    style(format!("Refreshing every {}s. Press Ctrl+C to stop.", period.as_secs())).dim()
                );
            }
        }
    }

    task.stop().await;
    service.shutdown().await;
    Ok(())
}
