use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Local, Utc};
use tokio::sync::Mutex;

use super::bots;
use super::mapper::{self, lead_columns};
use super::models::*;
use crate::errors::DashboardError;
use crate::sheets::{Row, SheetStore};

/// Tab titles and row bounds used by [`DashboardService`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub leads_tab: String,
    pub pipeline_tab: String,
    /// Lead rows read for the overview aggregate.
    pub overview_lead_limit: usize,
    /// Pipeline rows read for the overview and project lists.
    pub project_limit: usize,
    /// Lead rows returned by `list_leads` and the board.
    pub list_lead_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            leads_tab: "Lead Gen Tracker".to_string(),
            pipeline_tab: "Pipeline Master".to_string(),
            overview_lead_limit: 1000,
            project_limit: 100,
            list_lead_limit: 500,
        }
    }
}

/// Dashboard queries and commands over a [`SheetStore`].
///
/// Every call re-reads the rows it needs. Lookups by lead id and id
/// allocation scan the whole leads tab; only the list views are bounded.
pub struct DashboardService {
    store: Arc<dyn SheetStore>,
    config: ServiceConfig,
    /// Highest `LM-###` number this process has issued.
    last_lead_number: Mutex<u32>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn SheetStore>, config: ServiceConfig) -> Self {
        Self {
            store,
            config,
            last_lead_number: Mutex::new(0),
        }
    }

    async fn load(&self, tab: &str, limit: usize) -> Result<Vec<Row>, DashboardError> {
        self.store.load_rows(tab, limit).await.map_err(|e| {
            tracing::error!(tab, error = %e, "failed to load rows");
            DashboardError::from(e)
        })
    }

    async fn active_projects(&self) -> Result<Vec<Project>, DashboardError> {
        let rows = self
            .load(&self.config.pipeline_tab, self.config.project_limit)
            .await?;
        Ok(rows
            .iter()
            .filter(|row| mapper::is_active_project_row(row))
            .map(mapper::row_to_project)
            .collect())
    }

    /// Lead counts, active-project count and value, conversion rate.
    pub async fn overview(&self) -> Result<Overview, DashboardError> {
        let lead_rows = self
            .load(&self.config.leads_tab, self.config.overview_lead_limit)
            .await?;
        let leads: Vec<Lead> = lead_rows.iter().map(mapper::row_to_lead).collect();
        let projects = self.active_projects().await?;
        let overview = mapper::compute_overview(&leads, &projects, Utc::now());
        tracing::debug!(
            total_leads = overview.total_leads,
            active_projects = overview.active_projects,
            "overview computed"
        );
        Ok(overview)
    }

    pub async fn list_leads(&self) -> Result<Vec<Lead>, DashboardError> {
        let rows = self
            .load(&self.config.leads_tab, self.config.list_lead_limit)
            .await?;
        Ok(rows.iter().map(mapper::row_to_lead).collect())
    }

    pub async fn list_active_projects(&self) -> Result<Vec<Project>, DashboardError> {
        self.active_projects().await
    }

    /// All pipeline projects, optionally narrowed to one status.
    pub async fn list_projects(
        &self,
        status: Option<&ProjectStatus>,
    ) -> Result<Vec<Project>, DashboardError> {
        let rows = self
            .load(&self.config.pipeline_tab, self.config.project_limit)
            .await?;
        Ok(rows
            .iter()
            .map(mapper::row_to_project)
            .filter(|p| status.is_none_or(|s| &p.status == s))
            .collect())
    }

    pub async fn project_summary(&self) -> Result<ProjectSummary, DashboardError> {
        let projects = self.list_projects(None).await?;
        Ok(mapper::summarize_projects(&projects))
    }

    pub async fn lead_board(&self) -> Result<LeadBoard, DashboardError> {
        Ok(mapper::build_board(self.list_leads().await?))
    }

    pub fn bots(&self) -> BotGrid {
        bots::grid(Utc::now())
    }

    async fn all_lead_rows(&self) -> Result<Vec<Row>, DashboardError> {
        let tab = self.config.leads_tab.as_str();
        self.store.load_all_rows(tab).await.map_err(|e| {
            tracing::error!(tab, error = %e, "failed to load rows");
            DashboardError::from(e)
        })
    }

    async fn find_lead_row(&self, lead_id: &str) -> Result<Row, DashboardError> {
        self.all_lead_rows()
            .await?
            .into_iter()
            .find(|row| row.get(lead_columns::ID) == Some(lead_id))
            .ok_or_else(|| DashboardError::NotFound {
                lead_id: lead_id.to_string(),
            })
    }

    async fn save(&self, row: &Row) -> Result<(), DashboardError> {
        self.store.save_row(row).await.map_err(|e| {
            tracing::error!(row_index = row.row_index(), error = %e, "failed to save row");
            DashboardError::from(e)
        })
    }

    /// Set a lead's status. Any recognized status may replace any other;
    /// concurrent updates to the same lead are last-write-wins.
    pub async fn update_lead_status(
        &self,
        lead_id: &str,
        new_status: &str,
    ) -> Result<UpdateResult, DashboardError> {
        let status: LeadStatus = new_status
            .parse()
            .map_err(|_| DashboardError::InvalidStatus(new_status.to_string()))?;

        let mut row = self.find_lead_row(lead_id).await?;
        row.set(lead_columns::STATUS, status.as_str());
        row.set(lead_columns::LAST_UPDATED, today());
        self.save(&row).await?;

        tracing::info!(lead_id, status = %status, row_index = row.row_index(), "lead status updated");
        Ok(UpdateResult {
            success: true,
            lead_id: lead_id.to_string(),
            new_status: status,
            updated_at: Utc::now(),
        })
    }

    pub async fn update_lead_notes(
        &self,
        lead_id: &str,
        notes: &str,
    ) -> Result<NotesUpdateResult, DashboardError> {
        let mut row = self.find_lead_row(lead_id).await?;
        row.set(lead_columns::NOTES, notes);
        row.set(lead_columns::LAST_UPDATED, today());
        self.save(&row).await?;

        tracing::info!(lead_id, row_index = row.row_index(), "lead notes updated");
        Ok(NotesUpdateResult {
            success: true,
            lead_id: lead_id.to_string(),
            notes: notes.to_string(),
            updated_at: Utc::now(),
        })
    }

    /// Append a NEW lead with the next `LM-###` id.
    ///
    /// The sheet is rescanned on every add, so ids written by other
    /// processes are never reissued. The counter lock is held across the
    /// append so two adds from this process can never share an id.
    pub async fn add_lead(&self, input: NewLead) -> Result<NewLeadResult, DashboardError> {
        if input.business_name.trim().is_empty() {
            return Err(DashboardError::BadRequest("businessName is required".into()));
        }
        if input.trade.trim().is_empty() {
            return Err(DashboardError::BadRequest("trade is required".into()));
        }

        let mut last = self.last_lead_number.lock().await;
        let used = self.used_lead_numbers().await?;
        let highest = used.last().copied().unwrap_or(0).max(*last);
        let next = mapper::next_lead_sequence(highest, &used).ok_or_else(|| {
            tracing::error!(highest, "lead id space exhausted");
            DashboardError::LeadIdsExhausted {
                max: mapper::MAX_LEAD_SEQUENCE,
            }
        })?;
        let lead_id = mapper::format_lead_id(next);

        let fields = mapper::new_lead_fields(&lead_id, &input, &today());
        let row = self
            .store
            .append_row(&self.config.leads_tab, &fields)
            .await
            .map_err(|e| {
                tracing::error!(lead_id = %lead_id, error = %e, "failed to append lead");
                DashboardError::from(e)
            })?;
        *last = (*last).max(next);

        tracing::info!(lead_id = %lead_id, row_index = row.row_index(), "lead added");
        Ok(NewLeadResult {
            success: true,
            lead_id,
            row_index: row.row_index(),
            lead: mapper::row_to_lead(&row),
        })
    }

    async fn used_lead_numbers(&self) -> Result<BTreeSet<u32>, DashboardError> {
        Ok(self
            .all_lead_rows()
            .await?
            .iter()
            .filter_map(|row| row.get(lead_columns::ID).and_then(mapper::lead_sequence))
            .collect())
    }

    pub async fn shutdown(&self) {
        self.store.shutdown().await;
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
