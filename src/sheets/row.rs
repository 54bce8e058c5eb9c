use serde::{Deserialize, Serialize};

/// Opaque handle back to a spreadsheet row, used for in-place updates.
///
/// `row_index` is the 1-based row number in the sheet (the header is row 1,
/// so the first data row is 2), matching what the Sheets UI shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRef {
    pub tab: String,
    pub row_index: usize,
}

impl RowRef {
    pub fn new(tab: impl Into<String>, row_index: usize) -> Self {
        Self {
            tab: tab.into(),
            row_index,
        }
    }
}

/// A single spreadsheet row with values addressed by header name.
///
/// Cells are kept in header order so the row can be written back as a
/// contiguous range.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    reference: RowRef,
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn new(reference: RowRef, headers: &[String], values: &[String]) -> Self {
        let cells = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), values.get(i).cloned().unwrap_or_default()))
            .collect();
        Self { reference, cells }
    }

    pub fn reference(&self) -> &RowRef {
        &self.reference
    }

    pub fn row_index(&self) -> usize {
        self.reference.row_index
    }

    /// Value of a named column. Empty cells and unknown columns read as `None`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == column)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Set a named column. Returns false if the sheet has no such column;
    /// the value is dropped in that case, as the spreadsheet has nowhere to
    /// store it.
    pub fn set(&mut self, column: &str, value: impl Into<String>) -> bool {
        match self.cells.iter_mut().find(|(h, _)| h == column) {
            Some((_, v)) => {
                *v = value.into();
                true
            }
            None => false,
        }
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    /// Cell values in header order.
    pub fn values(&self) -> Vec<String> {
        self.cells.iter().map(|(_, v)| v.clone()).collect()
    }
}
