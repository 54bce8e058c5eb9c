//! Pure row ↔ record mapping and dashboard aggregates. No I/O here.
//!
//! Missing cells fall back to defaults and malformed numbers degrade to 0,
//! so one bad row never fails a whole dashboard query.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::models::*;
use crate::sheets::Row;

/// Lead Gen Tracker columns.
pub mod lead_columns {
    pub const ID: &str = "Lead ID";
    pub const SOURCE: &str = "Lead Source";
    pub const BUSINESS_NAME: &str = "Business Name";
    pub const TRADE: &str = "Trade";
    pub const LOCATION: &str = "Location";
    pub const PHONE: &str = "Phone";
    pub const EMAIL: &str = "Email";
    pub const STATUS: &str = "Status";
    pub const DATE_ADDED: &str = "Date Added";
    pub const NOTES: &str = "Notes";
    pub const LAST_UPDATED: &str = "Last Updated";

    pub const ALL: [&str; 11] = [
        ID,
        SOURCE,
        BUSINESS_NAME,
        TRADE,
        LOCATION,
        PHONE,
        EMAIL,
        STATUS,
        DATE_ADDED,
        NOTES,
        LAST_UPDATED,
    ];
}

/// Pipeline Master columns. `Progress` and `Notes` are optional.
pub mod project_columns {
    pub const ID: &str = "Project ID";
    pub const CLIENT_NAME: &str = "Client Name";
    pub const TRADE: &str = "Trade";
    pub const STATUS: &str = "Status";
    pub const ASSIGNED_BOT: &str = "Assigned Bot";
    pub const DUE_DATE: &str = "Due Date";
    pub const VALUE: &str = "Project Value";
    pub const WEBSITE_STATUS: &str = "Website Status";
    pub const SEO_STATUS: &str = "SEO Status";
    pub const CHATBOT_STATUS: &str = "Chatbot Status";
    pub const DEPLOYMENT_STATUS: &str = "Deployment Status";
    pub const PROGRESS: &str = "Progress";
    pub const NOTES: &str = "Notes";

    pub const ALL: [&str; 13] = [
        ID,
        CLIENT_NAME,
        TRADE,
        STATUS,
        ASSIGNED_BOT,
        DUE_DATE,
        VALUE,
        WEBSITE_STATUS,
        SEO_STATUS,
        CHATBOT_STATUS,
        DEPLOYMENT_STATUS,
        PROGRESS,
        NOTES,
    ];
}

static LEAD_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^LM-(\d+)$").unwrap());

pub const DEFAULT_LEAD_SOURCE: &str = "DASHBOARD";
pub const DEFAULT_LEAD_NOTES: &str = "Added via dashboard";

fn text(row: &Row, column: &str) -> String {
    row.get(column).unwrap_or_default().to_string()
}

pub fn row_to_lead(row: &Row) -> Lead {
    use lead_columns::*;
    Lead {
        id: row
            .get(ID)
            .map(str::to_string)
            .unwrap_or_else(|| format!("LEAD_{}", Utc::now().timestamp_millis())),
        business_name: text(row, BUSINESS_NAME),
        trade: text(row, TRADE),
        location: text(row, LOCATION),
        phone: text(row, PHONE),
        email: text(row, EMAIL),
        status: LeadStatus::from_cell(row.get(STATUS)),
        source: text(row, SOURCE),
        date_added: text(row, DATE_ADDED),
        notes: text(row, NOTES),
        last_updated: text(row, LAST_UPDATED),
        row_index: row.row_index(),
    }
}

pub fn row_to_project(row: &Row) -> Project {
    use project_columns::*;
    Project {
        id: text(row, ID),
        client_name: text(row, CLIENT_NAME),
        trade: text(row, TRADE),
        status: ProjectStatus::from_cell(row.get(STATUS)),
        due_date: text(row, DUE_DATE),
        value: parse_money(row.get(VALUE)),
        stages: ProjectStages {
            website: StageStatus::from_cell(row.get(WEBSITE_STATUS)),
            seo: StageStatus::from_cell(row.get(SEO_STATUS)),
            chatbot: StageStatus::from_cell(row.get(CHATBOT_STATUS)),
            deployment: StageStatus::from_cell(row.get(DEPLOYMENT_STATUS)),
        },
        assigned_bots: row
            .get(ASSIGNED_BOT)
            .map(|cell| {
                cell.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        progress: parse_progress(row.get(PROGRESS)),
        notes: text(row, NOTES),
        row_index: row.row_index(),
    }
}

/// Parse a currency cell such as `4500`, `$4,500.00` or ` 4500 `.
/// Anything unparseable, negative or non-finite is 0.
pub fn parse_money(cell: Option<&str>) -> f64 {
    let Some(raw) = cell else { return 0.0 };
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// Parse a 0–100 progress cell; `%` suffix allowed, out-of-range values clamp.
pub fn parse_progress(cell: Option<&str>) -> u8 {
    cell.and_then(|raw| raw.trim().trim_end_matches('%').trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0).round() as u8)
        .unwrap_or(0)
}

/// Pipeline rows counted as active: Status cell exactly `ACTIVE` or `IN_PROGRESS`.
pub fn is_active_project_row(row: &Row) -> bool {
    matches!(
        row.get(project_columns::STATUS),
        Some("ACTIVE") | Some("IN_PROGRESS")
    )
}

pub fn compute_overview(leads: &[Lead], active_projects: &[Project], now: DateTime<Utc>) -> Overview {
    let counts = count_by_status(leads);
    let total_leads = leads.len();
    Overview {
        leads: counts,
        active_projects: active_projects.len(),
        pipeline_value: active_projects.iter().map(|p| p.value).sum(),
        total_leads,
        conversion_rate: conversion_rate(counts.converted, total_leads),
        last_updated: now,
    }
}

/// Unrecognized statuses fall in no bucket.
pub fn count_by_status(leads: &[Lead]) -> LeadCounts {
    let mut counts = LeadCounts::default();
    for lead in leads {
        match lead.status {
            LeadStatus::New => counts.new += 1,
            LeadStatus::Qualified => counts.qualified += 1,
            LeadStatus::Contacted => counts.contacted += 1,
            LeadStatus::Converted => counts.converted += 1,
            LeadStatus::Unrecognized(_) => {}
        }
    }
    counts
}

/// Converted share of all leads as a percentage; 0 when there are no leads.
pub fn conversion_rate(converted: usize, total: usize) -> f64 {
    converted as f64 / total.max(1) as f64 * 100.0
}

pub fn build_board(leads: Vec<Lead>) -> LeadBoard {
    let counts = count_by_status(&leads);
    let total_leads = leads.len();
    let mut columns: Vec<BoardColumn> = LeadStatus::ALL
        .iter()
        .map(|status| BoardColumn {
            status: status.clone(),
            title: status.title().to_string(),
            count: counts.get(status),
            leads: Vec::new(),
        })
        .collect();
    for lead in leads {
        if let Some(column) = columns.iter_mut().find(|c| c.status == lead.status) {
            column.leads.push(lead);
        }
    }
    LeadBoard {
        columns,
        total_leads,
        conversion_rate: conversion_rate(counts.converted, total_leads),
    }
}

pub fn summarize_projects(projects: &[Project]) -> ProjectSummary {
    let avg_progress = if projects.is_empty() {
        0.0
    } else {
        projects.iter().map(|p| p.progress as f64).sum::<f64>() / projects.len() as f64
    };
    ProjectSummary {
        total_value: projects.iter().map(|p| p.value).sum(),
        active_projects: projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Active)
            .count(),
        completed_projects: projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Completed)
            .count(),
        avg_progress,
    }
}

/// Cells for a new Lead Gen Tracker row. Status is always NEW.
pub fn new_lead_fields(id: &str, input: &NewLead, today: &str) -> Vec<(&'static str, String)> {
    use lead_columns::*;
    let or_empty = |v: &Option<String>| v.clone().unwrap_or_default();
    vec![
        (ID, id.to_string()),
        (
            SOURCE,
            input
                .source
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LEAD_SOURCE.to_string()),
        ),
        (BUSINESS_NAME, input.business_name.clone()),
        (TRADE, input.trade.clone()),
        (LOCATION, or_empty(&input.location)),
        (PHONE, or_empty(&input.phone)),
        (EMAIL, or_empty(&input.email)),
        (STATUS, LeadStatus::New.as_str().to_string()),
        (DATE_ADDED, today.to_string()),
        (
            NOTES,
            input
                .notes
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LEAD_NOTES.to_string()),
        ),
    ]
}

/// Numeric part of an `LM-###` identifier.
pub fn lead_sequence(id: &str) -> Option<u32> {
    LEAD_ID_REGEX
        .captures(id.trim())
        .and_then(|caps| caps[1].parse().ok())
}

/// Largest sequence that still fits the three-digit `LM-###` form.
pub const MAX_LEAD_SEQUENCE: u32 = 999;

pub fn format_lead_id(sequence: u32) -> String {
    format!("LM-{:03}", sequence)
}

/// Pick the sequence for the next lead id.
///
/// Continues after `highest` while that stays within `LM-###`, then falls
/// back to the lowest number in 1..=999 not in `used`. `None` once all of
/// them are taken.
pub fn next_lead_sequence(highest: u32, used: &BTreeSet<u32>) -> Option<u32> {
    highest
        .checked_add(1)
        .filter(|next| *next <= MAX_LEAD_SEQUENCE)
        .or_else(|| (1..=MAX_LEAD_SEQUENCE).find(|n| !used.contains(n)))
}
