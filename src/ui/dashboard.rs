//! Plain terminal views of the dashboard: metric tiles, the lead board,
//! project cards and the bot grid.
//!
//! Every function returns a `String` so callers decide where it goes.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use console::style;

use super::icons::{BOT, CHART, CLOCK, DONE, IN_PROGRESS, LEADS, MONEY, PENDING, PROJECTS};
use crate::dashboard::bots::format_last_activity;
use crate::dashboard::models::{
    BotGrid, BotState, Lead, LeadBoard, Overview, Project, ProjectStatus, ProjectSummary,
    StageStatus,
};

const BAR_WIDTH: usize = 20;

/// Whole-dollar amount with thousands separators: `$14,200`.
pub fn format_currency(value: f64) -> String {
    let dollars = value.round().max(0.0) as u64;
    let digits = dollars.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("${}", out)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// `[██████░░░░] 60%`
pub fn progress_bar(progress: u8) -> String {
    let filled = (progress.min(100) as usize * BAR_WIDTH + 50) / 100;
    format!(
        "[{}{}] {}%",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        progress
    )
}

fn stage_icon(stage: StageStatus) -> String {
    match stage {
        StageStatus::Completed => DONE.to_string(),
        StageStatus::InProgress => IN_PROGRESS.to_string(),
        StageStatus::Pending => PENDING.to_string(),
    }
}

fn project_status_label(status: &ProjectStatus) -> String {
    let label = status.as_str().to_uppercase();
    match status {
        ProjectStatus::Active => style(label).green().to_string(),
        ProjectStatus::Paused | ProjectStatus::OnHold => style(label).yellow().to_string(),
        ProjectStatus::Completed => style(label).blue().to_string(),
        ProjectStatus::Unrecognized(_) => style(label).dim().to_string(),
    }
}

pub fn overview(overview: &Overview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style("InnMotion Pipeline Control").bold());
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {}Total Leads      {}",
        LEADS,
        style(overview.total_leads).bold()
    );
    let _ = writeln!(
        out,
        "     New {}  Qualified {}  Contacted {}  Converted {}",
        overview.leads.new, overview.leads.qualified, overview.leads.contacted, overview.leads.converted
    );
    let _ = writeln!(
        out,
        "  {}Active Projects  {}",
        PROJECTS,
        style(overview.active_projects).bold()
    );
    let _ = writeln!(
        out,
        "  {}Pipeline Value   {}",
        MONEY,
        style(format_currency(overview.pipeline_value)).green().bold()
    );
    let _ = writeln!(
        out,
        "  {}Conversion Rate  {}",
        CHART,
        style(format_percent(overview.conversion_rate)).bold()
    );
    let _ = writeln!(
        out,
        "  {}Last Updated     {}",
        CLOCK,
        style(overview.last_updated.format("%Y-%m-%d %H:%M:%S UTC")).dim()
    );
    out
}

pub fn lead_table(leads: &[Lead]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        style(format!(
            "{:<20} {:<28} {:<20} {:<18} {:<10}",
            "ID", "Business", "Trade", "Location", "Status"
        ))
        .bold()
    );
    for lead in leads {
        let _ = writeln!(
            out,
            "{:<20} {:<28} {:<20} {:<18} {:<10}",
            lead.id, lead.business_name, lead.trade, lead.location, lead.status
        );
    }
    let _ = writeln!(out, "{}", style(format!("{} leads", leads.len())).dim());
    out
}

pub fn lead_board(board: &LeadBoard) -> String {
    let mut out = String::new();
    for column in &board.columns {
        let _ = writeln!(
            out,
            "{} {}",
            style(&column.title).bold().cyan(),
            style(format!("({})", column.count)).dim()
        );
        if column.leads.is_empty() {
            let _ = writeln!(out, "  {}", style("No leads").dim());
        }
        for lead in &column.leads {
            let _ = writeln!(
                out,
                "  {}  {} · {} · {}",
                style(&lead.id).dim(),
                lead.business_name,
                lead.trade,
                lead.location
            );
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(
        out,
        "Total {}  Conversion {}",
        board.total_leads,
        format_percent(board.conversion_rate)
    );
    out
}

pub fn project_cards(projects: &[Project]) -> String {
    let mut out = String::new();
    if projects.is_empty() {
        let _ = writeln!(out, "{}", style("No projects found").dim());
        return out;
    }
    for project in projects {
        let _ = writeln!(
            out,
            "{}  {}  {}",
            style(&project.id).dim(),
            style(&project.client_name).bold(),
            project_status_label(&project.status)
        );
        let _ = writeln!(
            out,
            "  {} · due {} · {}",
            project.trade,
            project.due_date,
            format_currency(project.value)
        );
        let _ = writeln!(out, "  {}", progress_bar(project.progress));
        let _ = writeln!(
            out,
            "  Website {}  SEO {}  Chatbot {}  Deploy {}",
            stage_icon(project.stages.website),
            stage_icon(project.stages.seo),
            stage_icon(project.stages.chatbot),
            stage_icon(project.stages.deployment)
        );
        if !project.assigned_bots.is_empty() {
            let _ = writeln!(out, "  Bots: {}", project.assigned_bots.join(", "));
        }
        if !project.notes.is_empty() {
            let _ = writeln!(out, "  {}", style(&project.notes).italic());
        }
        let _ = writeln!(out);
    }
    out
}

pub fn project_summary(summary: &ProjectSummary) -> String {
    format!(
        "Total value {}  Active {}  Completed {}  Avg progress {:.0}%\n",
        format_currency(summary.total_value),
        summary.active_projects,
        summary.completed_projects,
        summary.avg_progress
    )
}

pub fn bot_grid(grid: &BotGrid, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for bot in &grid.bots {
        let state = match bot.status {
            BotState::Active => style("active").green(),
            BotState::Idle => style("idle").yellow(),
            BotState::Error => style("error").red(),
            BotState::Offline => style("offline").dim(),
        };
        let _ = writeln!(out, "{}{}  {}", BOT, style(&bot.name).bold(), state);
        let _ = writeln!(out, "  {}", bot.current_task);
        let _ = writeln!(
            out,
            "  {} tasks · avg {}m · up {} · {}",
            bot.tasks_completed,
            bot.avg_task_time,
            bot.uptime,
            format_last_activity(bot.last_activity, now)
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{}/{} active · {} tasks completed · avg uptime {}",
        grid.summary.active_bots,
        grid.summary.total_bots,
        grid.summary.total_tasks_completed,
        grid.summary.avg_uptime
    );
    out
}
