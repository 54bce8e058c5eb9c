//! Bot roster shown on the dashboard.
//!
//! Bot status is not read from the spreadsheet yet; these are fixed
//! placeholders with timestamps relative to the time of the request.
// TODO: read bot status from the "* Bot Input" tabs once the bots write heartbeats there.

use chrono::{DateTime, Duration, Utc};

use super::models::{BotGrid, BotState, BotStatus, BotSummary};

const AVG_UPTIME: &str = "2d 13h";

pub fn roster(now: DateTime<Utc>) -> Vec<BotStatus> {
    let bot = |id: &str,
               name: &str,
               status: BotState,
               task: &str,
               completed: u32,
               avg: u32,
               minutes_ago: i64,
               uptime: &str| BotStatus {
        id: id.to_string(),
        name: name.to_string(),
        status,
        current_task: task.to_string(),
        tasks_completed: completed,
        avg_task_time: avg,
        last_activity: now - Duration::minutes(minutes_ago),
        uptime: uptime.to_string(),
    };

    vec![
        bot(
            "MAX",
            "Max (Lead Gen)",
            BotState::Active,
            "Qualifying 5 new leads from Google Maps",
            47,
            12,
            0,
            "2d 14h",
        ),
        bot(
            "IVY",
            "Ivy (Website Builder)",
            BotState::Active,
            "Building website for Sydney Plumbing Co",
            23,
            45,
            5,
            "2d 14h",
        ),
        bot(
            "SAGE",
            "Sage (SEO Specialist)",
            BotState::Idle,
            "Awaiting website completion",
            31,
            25,
            15,
            "2d 10h",
        ),
        bot(
            "RIVER",
            "River (Chatbot Builder)",
            BotState::Active,
            "Configuring chatbot for Elite Kitchens",
            19,
            20,
            2,
            "2d 14h",
        ),
        bot(
            "PARKER",
            "Parker (Integration Bot)",
            BotState::Active,
            "Deploying Pro Electricians website",
            12,
            35,
            1,
            "2d 12h",
        ),
    ]
}

pub fn summarize(bots: &[BotStatus]) -> BotSummary {
    BotSummary {
        active_bots: bots.iter().filter(|b| b.status == BotState::Active).count(),
        total_bots: bots.len(),
        total_tasks_completed: bots.iter().map(|b| b.tasks_completed).sum(),
        avg_uptime: AVG_UPTIME.to_string(),
    }
}

pub fn grid(now: DateTime<Utc>) -> BotGrid {
    let bots = roster(now);
    let summary = summarize(&bots);
    BotGrid { bots, summary }
}

/// Human label for time since `then`: "Just now", "5m ago", "3h ago", "2d ago".
pub fn format_last_activity(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    format!("{}d ago", hours / 24)
}
