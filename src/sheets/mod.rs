//! Spreadsheet access layer.
//!
//! The dashboard treats a Google Sheets spreadsheet as its database. Every
//! read and write goes through the [`SheetStore`] trait so the query service
//! never sees HTTP, credentials or cell ranges:
//!
//! ```text
//! DashboardService ──> Arc<dyn SheetStore>
//!                          ├─ client.rs  GoogleSheetsClient (Sheets API v4)
//!                          │     └─ auth.rs  service-account JWT → access token
//!                          └─ memory.rs  MemorySheetStore (tests, demo mode)
//! ```
//!
//! Rows are addressed by tab title and header name; see [`Row`].

pub mod auth;
pub mod client;
pub mod memory;
pub mod row;

use async_trait::async_trait;

use crate::errors::SheetsError;

pub use client::GoogleSheetsClient;
pub use memory::MemorySheetStore;
pub use row::{Row, RowRef};

/// Row-level access to named tabs of a spreadsheet.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Load up to `limit` data rows (header excluded) from `tab`, in sheet order.
    async fn load_rows(&self, tab: &str, limit: usize) -> Result<Vec<Row>, SheetsError>;

    /// Load every data row in `tab`, however many there are.
    async fn load_all_rows(&self, tab: &str) -> Result<Vec<Row>, SheetsError>;

    /// Append a row to `tab`. Fields are matched to header names; names the
    /// sheet has no column for are ignored.
    async fn append_row(&self, tab: &str, fields: &[(&str, String)]) -> Result<Row, SheetsError>;

    /// Persist a row's current values in place.
    ///
    /// Writes are not atomic across cells from the caller's point of view:
    /// a concurrent writer to the same row wins or loses as a whole row, and
    /// the last save wins.
    async fn save_row(&self, row: &Row) -> Result<(), SheetsError>;

    /// Release any cached connection state. The next call re-initializes.
    async fn shutdown(&self) {}

    /// Load the row behind `reference`, apply `fields`, and save it.
    async fn update_row(
        &self,
        reference: &RowRef,
        fields: &[(&str, String)],
    ) -> Result<Row, SheetsError> {
        let rows = self.load_rows(&reference.tab, reference.row_index).await?;
        let mut row = rows
            .into_iter()
            .find(|r| r.row_index() == reference.row_index)
            .ok_or_else(|| SheetsError::RowNotFound {
                tab: reference.tab.clone(),
                row_index: reference.row_index,
            })?;
        for (column, value) in fields {
            row.set(column, value.clone());
        }
        self.save_row(&row).await?;
        Ok(row)
    }
}
