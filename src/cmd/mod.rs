//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module      | Commands handled                                  |
//! |-------------|---------------------------------------------------|
//! | `serve`     | `Serve`                                           |
//! | `dashboard` | `Overview`, `Leads`, `Projects`, `Bots`, `Watch`  |
//! | `leads`     | `AddLead`, `SetStatus`, `SetNotes`                |
//! | `config`    | `Config`                                          |

pub mod config;
pub mod dashboard;
pub mod leads;
pub mod serve;

pub use config::cmd_config;
pub use dashboard::{cmd_bots, cmd_leads, cmd_overview, cmd_projects, cmd_watch};
pub use leads::{cmd_add_lead, cmd_set_notes, cmd_set_status};
pub use serve::cmd_serve;

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use pipeline_control::config::{PipelineConfig, StoreKind};
use pipeline_control::dashboard::{DashboardService, demo_store};
use pipeline_control::sheets::{GoogleSheetsClient, SheetStore};

/// Build the query service over the configured store.
pub fn build_service(config: &PipelineConfig) -> Arc<DashboardService> {
    let service_config = config.service_config();
    let store: Arc<dyn SheetStore> = match config.store {
        StoreKind::Google => Arc::new(GoogleSheetsClient::new(config.sheets_config())),
        StoreKind::Memory => Arc::new(demo_store(&service_config)),
    };
    tracing::debug!(store = %config.store, spreadsheet_id = %config.spreadsheet_id, "store selected");
    Arc::new(DashboardService::new(store, service_config))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
