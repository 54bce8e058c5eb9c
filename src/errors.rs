//! Typed error hierarchy for Pipeline Control.
//!
//! Two top-level enums cover the two layers:
//! - `SheetsError` - spreadsheet adapter failures (auth, transport, API)
//! - `DashboardError` - query-service failures surfaced to the presentation layer

use thiserror::Error;

/// Errors from the spreadsheet adapter.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Spreadsheet unreachable: {0}")]
    Connection(String),

    #[error("Invalid service-account credentials at {path}: {message}")]
    Credentials {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Sheet tab '{0}' not found in spreadsheet")]
    TabNotFound(String),

    #[error("Sheets API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode Sheets response: {0}")]
    Decode(String),

    #[error("Row {row_index} not found in tab '{tab}'")]
    RowNotFound { tab: String, row_index: usize },
}

impl SheetsError {
    /// Whether the failure means the spreadsheet could not be opened at all
    /// (as opposed to a failed read or write against an open spreadsheet).
    pub fn is_connection(&self) -> bool {
        matches!(self, SheetsError::Connection(_) | SheetsError::Credentials { .. })
    }
}

impl From<reqwest::Error> for SheetsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SheetsError::Decode(err.to_string())
        } else {
            SheetsError::Connection(err.to_string())
        }
    }
}

/// Errors from the dashboard query service.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Spreadsheet connection failed: {0}")]
    Connection(#[source] SheetsError),

    #[error("Spreadsheet read/write failed: {0}")]
    UpstreamUnavailable(#[source] SheetsError),

    #[error("Lead {lead_id} not found")]
    NotFound { lead_id: String },

    #[error("Invalid lead status '{0}': expected NEW, QUALIFIED, CONTACTED or CONVERTED")]
    InvalidStatus(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("No free lead ids left: LM-001 through LM-{max:03} are all in use")]
    LeadIdsExhausted { max: u32 },
}

impl From<SheetsError> for DashboardError {
    fn from(err: SheetsError) -> Self {
        if err.is_connection() {
            DashboardError::Connection(err)
        } else {
            DashboardError::UpstreamUnavailable(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_map_to_dashboard_connection() {
        let err: DashboardError = SheetsError::Connection("dns failure".into()).into();
        assert!(matches!(err, DashboardError::Connection(_)));

        let err: DashboardError = SheetsError::Credentials {
            path: "/nope/creds.json".into(),
            message: "missing".into(),
        }
        .into();
        assert!(matches!(err, DashboardError::Connection(_)));
    }

    #[test]
    fn api_errors_map_to_upstream_unavailable() {
        let err: DashboardError = SheetsError::Api {
            status: 503,
            message: "backend error".into(),
        }
        .into();
        assert!(matches!(err, DashboardError::UpstreamUnavailable(_)));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn not_found_carries_lead_id() {
        let err = DashboardError::NotFound {
            lead_id: "LM-042".into(),
        };
        match &err {
            DashboardError::NotFound { lead_id } => assert_eq!(lead_id, "LM-042"),
            _ => panic!("Expected NotFound"),
        }
        assert!(err.to_string().contains("LM-042"));
    }

    #[test]
    fn tab_not_found_is_not_a_connection_error() {
        let err = SheetsError::TabNotFound("Lead Gen Tracker".into());
        assert!(!err.is_connection());
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&SheetsError::TabNotFound("x".into()));
        assert_std_error(&DashboardError::InvalidStatus("x".into()));
    }
}
