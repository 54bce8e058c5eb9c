//! Dashboard domain: records, row mapping, aggregates and the query service.
//!
//! ```text
//!   server / cmd
//!        │
//!        ▼
//!   DashboardService ── mapper (pure) ── models
//!        │
//!        ▼
//!   dyn SheetStore (Google Sheets or in-memory)
//! ```

pub mod bots;
pub mod mapper;
pub mod models;
pub mod service;

pub use models::{Lead, LeadStatus, NewLead, Overview, Project, ProjectStatus};
pub use service::{DashboardService, ServiceConfig};

use mapper::{lead_columns, project_columns};

use crate::sheets::MemorySheetStore;

/// In-memory store seeded with sample leads and projects for `--store memory`.
pub fn demo_store(config: &ServiceConfig) -> MemorySheetStore {
    let store = MemorySheetStore::new()
        .with_tab(&config.leads_tab, &lead_columns::ALL)
        .with_tab(&config.pipeline_tab, &project_columns::ALL);

    let leads: [[&str; 11]; 6] = [
        ["LM-001", "GOOGLE_MAPS", "Sydney Plumbing Co", "Plumber", "Sydney, NSW", "0412 345 678", "", "NEW", "2026-02-16", "", ""],
        ["LM-002", "GOOGLE_MAPS", "Elite Kitchens", "Kitchen Renovation", "Melbourne, VIC", "0423 456 789", "", "QUALIFIED", "2026-02-15", "", ""],
        ["LM-003", "GOOGLE_MAPS", "Pro Electricians", "Electrician", "Brisbane, QLD", "0434 567 890", "", "CONTACTED", "2026-02-14", "", ""],
        ["LM-004", "REFERRAL", "Master Builders", "Builder", "Perth, WA", "0445 678 901", "", "CONVERTED", "2026-02-13", "", ""],
        ["LM-005", "GOOGLE_MAPS", "Quick Fix Plumbing", "Plumber", "Adelaide, SA", "0456 789 012", "", "NEW", "2026-02-16", "", ""],
        ["LM-006", "GOOGLE_MAPS", "Dream Kitchens", "Kitchen Renovation", "Gold Coast, QLD", "0467 890 123", "", "QUALIFIED", "2026-02-15", "", ""],
    ];
    for lead in &leads {
        store.push_values(&config.leads_tab, lead);
    }

    let projects: [[&str; 13]; 5] = [
        ["PRJ-001", "Sydney Plumbing Co", "Plumber", "ACTIVE", "IVY", "2026-02-20", "2500", "in-progress", "pending", "pending", "pending", "35", "Rush job - client needs website live by end of week"],
        ["PRJ-002", "Elite Kitchens", "Kitchen Renovation", "ACTIVE", "SAGE, RIVER", "2026-02-25", "3200", "completed", "in-progress", "pending", "pending", "60", "High-end client, needs premium design elements"],
        ["PRJ-003", "Pro Electricians", "Electrician", "PAUSED", "PARKER", "2026-02-18", "1800", "completed", "completed", "completed", "in-progress", "85", "DNS configuration issues - waiting for client"],
        ["PRJ-004", "Master Builders", "Builder", "COMPLETED", "", "2026-02-10", "4500", "completed", "completed", "completed", "completed", "100", "Successfully delivered ahead of schedule"],
        ["PRJ-005", "Quick Fix Plumbing", "Plumber", "ACTIVE", "MAX", "2026-03-01", "2200", "pending", "pending", "pending", "pending", "5", "Just started - gathering requirements"],
    ];
    for project in &projects {
        store.push_values(&config.pipeline_tab, project);
    }

    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_demo_store_overview() {
        let config = ServiceConfig::default();
        let service = DashboardService::new(Arc::new(demo_store(&config)), config);
        let overview = service.overview().await.unwrap();
        assert_eq!(overview.total_leads, 6);
        assert_eq!(overview.leads.new, 2);
        assert_eq!(overview.leads.qualified, 2);
        assert_eq!(overview.leads.converted, 1);
        assert_eq!(overview.active_projects, 3);
        assert_eq!(overview.pipeline_value, 2500.0 + 3200.0 + 2200.0);
    }

    #[tokio::test]
    async fn test_demo_store_next_lead_id() {
        let config = ServiceConfig::default();
        let service = DashboardService::new(Arc::new(demo_store(&config)), config);
        let result = service
            .add_lead(NewLead {
                business_name: "Bright Sparks".into(),
                trade: "Electrician".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.lead_id, "LM-007");
        assert_eq!(result.row_index, 8);
    }
}
