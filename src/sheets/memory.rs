use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Row, RowRef, SheetStore};
use crate::errors::SheetsError;

#[derive(Debug, Default, Clone)]
struct Tab {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// In-process spreadsheet with the same row semantics as the Google client.
///
/// Used by tests and by `--store memory`. Row indices follow the sheet
/// convention: header on row 1, first data row on row 2.
#[derive(Debug, Default)]
pub struct MemorySheetStore {
    tabs: Mutex<HashMap<String, Tab>>,
    unavailable: Mutex<Option<String>>,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or replace) a tab with the given header row.
    pub fn with_tab(self, title: &str, headers: &[&str]) -> Self {
        self.add_tab(title, headers);
        self
    }

    pub fn add_tab(&self, title: &str, headers: &[&str]) {
        let tab = Tab {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        };
        self.lock_tabs().insert(title.to_string(), tab);
    }

    /// Push a raw row of values (header order) without going through the trait.
    pub fn push_values(&self, title: &str, values: &[&str]) {
        if let Some(tab) = self.lock_tabs().get_mut(title) {
            tab.rows.push(values.iter().map(|v| v.to_string()).collect());
        }
    }

    /// Make every subsequent call fail with a connection error, or clear it.
    pub fn set_unavailable(&self, reason: Option<&str>) {
        *self
            .unavailable
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = reason.map(str::to_string);
    }

    fn lock_tabs(&self) -> std::sync::MutexGuard<'_, HashMap<String, Tab>> {
        self.tabs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_available(&self) -> Result<(), SheetsError> {
        match self
            .unavailable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            Some(reason) => Err(SheetsError::Connection(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn load_rows(&self, tab: &str, limit: usize) -> Result<Vec<Row>, SheetsError> {
        self.check_available()?;
        let tabs = self.lock_tabs();
        let sheet = tabs
            .get(tab)
            .ok_or_else(|| SheetsError::TabNotFound(tab.to_string()))?;
        Ok(sheet
            .rows
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, values)| Row::new(RowRef::new(tab, i + 2), &sheet.headers, values))
            .collect())
    }

    async fn load_all_rows(&self, tab: &str) -> Result<Vec<Row>, SheetsError> {
        self.load_rows(tab, usize::MAX).await
    }

    async fn append_row(&self, tab: &str, fields: &[(&str, String)]) -> Result<Row, SheetsError> {
        self.check_available()?;
        let mut tabs = self.lock_tabs();
        let sheet = tabs
            .get_mut(tab)
            .ok_or_else(|| SheetsError::TabNotFound(tab.to_string()))?;
        let mut row = Row::new(
            RowRef::new(tab, sheet.rows.len() + 2),
            &sheet.headers,
            &[],
        );
        for (column, value) in fields {
            row.set(column, value.clone());
        }
        sheet.rows.push(row.values());
        Ok(row)
    }

    async fn save_row(&self, row: &Row) -> Result<(), SheetsError> {
        self.check_available()?;
        let reference = row.reference();
        let mut tabs = self.lock_tabs();
        let sheet = tabs
            .get_mut(&reference.tab)
            .ok_or_else(|| SheetsError::TabNotFound(reference.tab.clone()))?;
        let slot = reference
            .row_index
            .checked_sub(2)
            .and_then(|i| sheet.rows.get_mut(i))
            .ok_or_else(|| SheetsError::RowNotFound {
                tab: reference.tab.clone(),
                row_index: reference.row_index,
            })?;
        *slot = row.values();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemorySheetStore {
        MemorySheetStore::new().with_tab("Leads", &["Lead ID", "Status"])
    }

    #[tokio::test]
    async fn test_load_rows_respects_limit_and_row_numbers() {
        let store = store();
        store.push_values("Leads", &["LM-001", "NEW"]);
        store.push_values("Leads", &["LM-002", "QUALIFIED"]);
        store.push_values("Leads", &["LM-003", "CONTACTED"]);

        let rows = store.load_rows("Leads", 2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_index(), 2);
        assert_eq!(rows[1].get("Lead ID"), Some("LM-002"));

        let all = store.load_all_rows("Leads").await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].row_index(), 4);
    }

    #[tokio::test]
    async fn test_append_ignores_unknown_columns() {
        let store = store();
        let row = store
            .append_row(
                "Leads",
                &[("Lead ID", "LM-010".into()), ("Bogus", "x".into())],
            )
            .await
            .unwrap();
        assert_eq!(row.row_index(), 2);
        assert_eq!(row.get("Lead ID"), Some("LM-010"));
        assert_eq!(row.get("Status"), None);
    }

    #[tokio::test]
    async fn test_save_row_persists_in_place() {
        let store = store();
        store.push_values("Leads", &["LM-001", "NEW"]);
        let mut row = store.load_rows("Leads", 10).await.unwrap().remove(0);
        row.set("Status", "CONVERTED");
        store.save_row(&row).await.unwrap();

        let reloaded = store.load_rows("Leads", 10).await.unwrap();
        assert_eq!(reloaded[0].get("Status"), Some("CONVERTED"));
    }

    #[tokio::test]
    async fn test_update_row_via_reference() {
        let store = store();
        store.push_values("Leads", &["LM-001", "NEW"]);
        store.push_values("Leads", &["LM-002", "NEW"]);

        let updated = store
            .update_row(&RowRef::new("Leads", 3), &[("Status", "QUALIFIED".into())])
            .await
            .unwrap();
        assert_eq!(updated.get("Lead ID"), Some("LM-002"));

        let err = store
            .update_row(&RowRef::new("Leads", 9), &[("Status", "NEW".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, SheetsError::RowNotFound { row_index: 9, .. }));
    }

    #[tokio::test]
    async fn test_unknown_tab_and_unavailable_store() {
        let store = store();
        assert!(matches!(
            store.load_rows("Nope", 1).await,
            Err(SheetsError::TabNotFound(_))
        ));

        store.set_unavailable(Some("offline"));
        assert!(matches!(
            store.load_rows("Leads", 1).await,
            Err(SheetsError::Connection(_))
        ));
        store.set_unavailable(None);
        assert!(store.load_rows("Leads", 1).await.is_ok());
    }
}
