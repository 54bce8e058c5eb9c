use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── Lead status ──────────────────────────────────────────────────────

/// Position of a lead in the sales funnel.
///
/// The progression NEW → QUALIFIED → CONTACTED → CONVERTED is advisory:
/// any status may replace any other. Values stored in the sheet that are
/// not one of the four are kept as `Unrecognized` so they round-trip, but
/// they are never counted or placed on the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum LeadStatus {
    #[default]
    New,
    Qualified,
    Contacted,
    Converted,
    Unrecognized(String),
}

impl LeadStatus {
    /// The four recognized statuses in funnel order.
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::New,
        LeadStatus::Qualified,
        LeadStatus::Contacted,
        LeadStatus::Converted,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "NEW",
            Self::Qualified => "QUALIFIED",
            Self::Contacted => "CONTACTED",
            Self::Converted => "CONVERTED",
            Self::Unrecognized(s) => s,
        }
    }

    /// Read-side conversion: never fails, empty means NEW.
    ///
    /// Matches the stored text exactly. Other spellings such as `new` or
    /// ` Converted ` stay `Unrecognized`; only [`FromStr`] normalizes.
    pub fn from_cell(value: Option<&str>) -> Self {
        match value {
            None => Self::New,
            Some("NEW") => Self::New,
            Some("QUALIFIED") => Self::Qualified,
            Some("CONTACTED") => Self::Contacted,
            Some("CONVERTED") => Self::Converted,
            Some(other) => Self::Unrecognized(other.to_string()),
        }
    }

    /// Column title used on the Kanban board.
    pub fn title(&self) -> &str {
        match self {
            Self::New => "New Leads",
            Self::Qualified => "Qualified",
            Self::Contacted => "Contacted",
            Self::Converted => "Converted",
            Self::Unrecognized(s) => s,
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write-side parse: only the four recognized values are accepted.
impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEW" => Ok(Self::New),
            "QUALIFIED" => Ok(Self::Qualified),
            "CONTACTED" => Ok(Self::Contacted),
            "CONVERTED" => Ok(Self::Converted),
            _ => Err(format!("Invalid lead status: {}", s)),
        }
    }
}

impl Serialize for LeadStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LeadStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_cell(Some(&s)))
    }
}

// ── Project status ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectStatus {
    Active,
    Paused,
    Completed,
    OnHold,
    Unrecognized(String),
}

impl ProjectStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::OnHold => "on-hold",
            Self::Unrecognized(s) => s,
        }
    }

    /// Sheet cells use upper snake case (`ACTIVE`, `IN_PROGRESS`, `ON_HOLD`);
    /// the dashboard uses lower kebab case. Both are accepted, and
    /// `IN_PROGRESS` counts as active.
    pub fn from_cell(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::Unrecognized(String::new());
        };
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "active" | "in-progress" => Self::Active,
            "paused" => Self::Paused,
            "completed" => Self::Completed,
            "on-hold" => Self::OnHold,
            _ => Self::Unrecognized(raw.to_string()),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from_cell(Some(s)) {
            Self::Unrecognized(_) => Err(format!("Invalid project status: {}", s)),
            status => Ok(status),
        }
    }
}

impl Serialize for ProjectStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProjectStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_cell(Some(&s)))
    }
}

/// Delivery sub-stage status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Lenient read: anything unrecognized (including empty) is pending.
    pub fn from_cell(value: Option<&str>) -> Self {
        match value
            .map(|v| v.trim().to_ascii_lowercase().replace(['_', ' '], "-"))
            .as_deref()
        {
            Some("in-progress") => Self::InProgress,
            Some("completed") | Some("complete") | Some("done") => Self::Completed,
            _ => Self::Pending,
        }
    }
}

// ── Records ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub business_name: String,
    pub trade: String,
    pub location: String,
    pub phone: String,
    pub email: String,
    pub status: LeadStatus,
    pub source: String,
    pub date_added: String,
    pub notes: String,
    pub last_updated: String,
    /// Sheet row this lead was read from; needed for in-place updates.
    pub row_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectStages {
    pub website: StageStatus,
    pub seo: StageStatus,
    pub chatbot: StageStatus,
    pub deployment: StageStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub client_name: String,
    pub trade: String,
    pub status: ProjectStatus,
    pub due_date: String,
    pub value: f64,
    pub stages: ProjectStages,
    pub assigned_bots: Vec<String>,
    /// Stored separately from `stages`; the two are not reconciled.
    pub progress: u8,
    pub notes: String,
    pub row_index: usize,
}

// ── Aggregates ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeadCounts {
    pub new: usize,
    pub qualified: usize,
    pub contacted: usize,
    pub converted: usize,
}

impl LeadCounts {
    pub fn get(&self, status: &LeadStatus) -> usize {
        match status {
            LeadStatus::New => self.new,
            LeadStatus::Qualified => self.qualified,
            LeadStatus::Contacted => self.contacted,
            LeadStatus::Converted => self.converted,
            LeadStatus::Unrecognized(_) => 0,
        }
    }
}

/// Point-in-time dashboard snapshot, recomputed on every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub leads: LeadCounts,
    pub active_projects: usize,
    pub pipeline_value: f64,
    pub total_leads: usize,
    pub conversion_rate: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardColumn {
    pub status: LeadStatus,
    pub title: String,
    pub count: usize,
    pub leads: Vec<Lead>,
}

/// Kanban view of the lead funnel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadBoard {
    pub columns: Vec<BoardColumn>,
    pub total_leads: usize,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub total_value: f64,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub avg_progress: f64,
}

// ── Bots ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotState {
    Active,
    Idle,
    Error,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStatus {
    pub id: String,
    pub name: String,
    pub status: BotState,
    pub current_task: String,
    pub tasks_completed: u32,
    /// Average task duration in minutes.
    pub avg_task_time: u32,
    pub last_activity: DateTime<Utc>,
    pub uptime: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotSummary {
    pub active_bots: usize,
    pub total_bots: usize,
    pub total_tasks_completed: u32,
    pub avg_uptime: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotGrid {
    pub bots: Vec<BotStatus>,
    pub summary: BotSummary,
}

// ── Command payloads ─────────────────────────────────────────────────

/// Fields accepted by `add_lead`. Business name and trade are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub trade: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub success: bool,
    pub lead_id: String,
    pub new_status: LeadStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesUpdateResult {
    pub success: bool,
    pub lead_id: String,
    pub notes: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeadResult {
    pub success: bool,
    pub lead_id: String,
    pub row_index: usize,
    pub lead: Lead,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_status_parse_is_strict_and_case_insensitive() {
        assert_eq!("qualified".parse::<LeadStatus>().unwrap(), LeadStatus::Qualified);
        assert_eq!(" CONVERTED ".parse::<LeadStatus>().unwrap(), LeadStatus::Converted);
        assert!("ARCHIVED".parse::<LeadStatus>().is_err());
        assert!("".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn test_lead_status_from_cell_keeps_unknown_values() {
        assert_eq!(LeadStatus::from_cell(None), LeadStatus::New);
        assert_eq!(LeadStatus::from_cell(Some("CONTACTED")), LeadStatus::Contacted);
        let odd = LeadStatus::from_cell(Some("Lost"));
        assert_eq!(odd, LeadStatus::Unrecognized("Lost".into()));
        assert_eq!(odd.as_str(), "Lost");
    }

    #[test]
    fn test_lead_status_from_cell_is_exact() {
        assert_eq!(
            LeadStatus::from_cell(Some("new")),
            LeadStatus::Unrecognized("new".into())
        );
        assert_eq!(
            LeadStatus::from_cell(Some(" Converted ")),
            LeadStatus::Unrecognized(" Converted ".into())
        );
    }

    #[test]
    fn test_lead_status_serializes_as_plain_string() {
        let json = serde_json::to_string(&LeadStatus::Converted).unwrap();
        assert_eq!(json, "\"CONVERTED\"");
        let odd = serde_json::to_string(&LeadStatus::Unrecognized("Lost".into())).unwrap();
        assert_eq!(odd, "\"Lost\"");
    }

    #[test]
    fn test_project_status_accepts_sheet_and_dashboard_spellings() {
        assert_eq!(ProjectStatus::from_cell(Some("ACTIVE")), ProjectStatus::Active);
        assert_eq!(ProjectStatus::from_cell(Some("IN_PROGRESS")), ProjectStatus::Active);
        assert_eq!(ProjectStatus::from_cell(Some("ON_HOLD")), ProjectStatus::OnHold);
        assert_eq!(ProjectStatus::from_cell(Some("on-hold")), ProjectStatus::OnHold);
        assert_eq!(ProjectStatus::from_cell(Some("COMPLETED")), ProjectStatus::Completed);
        assert!(matches!(
            ProjectStatus::from_cell(Some("ARCHIVED")),
            ProjectStatus::Unrecognized(_)
        ));
        assert!("bogus".parse::<ProjectStatus>().is_err());
        assert_eq!("paused".parse::<ProjectStatus>().unwrap(), ProjectStatus::Paused);
    }

    #[test]
    fn test_stage_status_lenient_read() {
        assert_eq!(StageStatus::from_cell(Some("In Progress")), StageStatus::InProgress);
        assert_eq!(StageStatus::from_cell(Some("COMPLETED")), StageStatus::Completed);
        assert_eq!(StageStatus::from_cell(Some("whatever")), StageStatus::Pending);
        assert_eq!(StageStatus::from_cell(None), StageStatus::Pending);
        assert_eq!(
            serde_json::to_string(&StageStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
    }

    #[test]
    fn test_lead_serializes_camel_case() {
        let lead = Lead {
            id: "LM-001".into(),
            business_name: "Sydney Plumbing Co".into(),
            trade: "Plumber".into(),
            location: "Sydney, NSW".into(),
            phone: String::new(),
            email: String::new(),
            status: LeadStatus::New,
            source: String::new(),
            date_added: "2026-02-16".into(),
            notes: String::new(),
            last_updated: String::new(),
            row_index: 2,
        };
        let json = serde_json::to_value(&lead).unwrap();
        assert_eq!(json["businessName"], "Sydney Plumbing Co");
        assert_eq!(json["dateAdded"], "2026-02-16");
        assert_eq!(json["rowIndex"], 2);
        assert_eq!(json["status"], "NEW");
    }

    #[test]
    fn test_new_lead_deserializes_with_missing_optionals() {
        let req: NewLead =
            serde_json::from_str(r#"{"businessName":"Acme","trade":"Plumber"}"#).unwrap();
        assert_eq!(req.business_name, "Acme");
        assert!(req.source.is_none());
    }
}
