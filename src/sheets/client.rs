use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use super::auth::TokenProvider;
use super::{Row, RowRef, SheetStore};
use crate::errors::SheetsError;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Connection settings for [`GoogleSheetsClient`].
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub credentials_path: PathBuf,
    /// Tab titles resolved when the session opens. Missing tabs are logged,
    /// and only fail when something tries to read or write them.
    pub tabs: Vec<String>,
    pub api_base: String,
}

impl SheetsConfig {
    pub fn new(spreadsheet_id: impl Into<String>, credentials_path: PathBuf) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            credentials_path,
            tabs: Vec::new(),
            api_base: SHEETS_API_BASE.to_string(),
        }
    }
}

/// An opened spreadsheet: tab titles resolved to sheet ids.
#[derive(Debug)]
struct Session {
    tabs: HashMap<String, i64>,
}

// ── Sheets API response shapes ───────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: AppendUpdates,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: String,
}

/// Google Sheets v4 implementation of [`SheetStore`].
///
/// The spreadsheet is opened lazily on first use and the session is shared
/// by every later call until [`SheetStore::shutdown`]. A failed open is not
/// cached, so the next call tries again.
pub struct GoogleSheetsClient {
    config: SheetsConfig,
    http: reqwest::Client,
    tokens: TokenProvider,
    session: Mutex<Option<Arc<Session>>>,
}

impl GoogleSheetsClient {
    pub fn new(config: SheetsConfig) -> Self {
        let http = reqwest::Client::new();
        let tokens = TokenProvider::new(config.credentials_path.clone(), http.clone());
        Self {
            config,
            http,
            tokens,
            session: Mutex::new(None),
        }
    }

    async fn session(&self) -> Result<Arc<Session>, SheetsError> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_ref() {
            return Ok(session.clone());
        }
        let session = Arc::new(self.open_session().await?);
        *guard = Some(session.clone());
        Ok(session)
    }

    async fn open_session(&self) -> Result<Session, SheetsError> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/{}", self.config.api_base, self.config.spreadsheet_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .send()
            .await?;
        let meta: SpreadsheetMeta = match check_status(response).await {
            Ok(response) => response.json().await?,
            Err(SheetsError::Api { status, message }) => {
                return Err(SheetsError::Connection(format!(
                    "failed to open spreadsheet {} ({}): {}",
                    self.config.spreadsheet_id, status, message
                )));
            }
            Err(e) => return Err(e),
        };

        let tabs: HashMap<String, i64> = meta
            .sheets
            .into_iter()
            .map(|s| (s.properties.title, s.properties.sheet_id))
            .collect();
        for title in &self.config.tabs {
            if !tabs.contains_key(title) {
                tracing::warn!(tab = %title, "configured tab not present in spreadsheet");
            }
        }
        tracing::info!(
            spreadsheet_id = %self.config.spreadsheet_id,
            tabs = tabs.len(),
            "spreadsheet session opened"
        );
        Ok(Session { tabs })
    }

    /// Resolve `tab` against the session and return a bearer token for the call.
    async fn prepare(&self, tab: &str) -> Result<String, SheetsError> {
        let session = self.session().await?;
        if !session.tabs.contains_key(tab) {
            return Err(SheetsError::TabNotFound(tab.to_string()));
        }
        self.tokens.access_token().await
    }

    fn values_url(&self, range_and_verb: &str) -> Result<reqwest::Url, SheetsError> {
        let mut url = reqwest::Url::parse(&self.config.api_base)
            .map_err(|e| SheetsError::Connection(format!("invalid API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Connection("API base URL cannot be a base".to_string()))?
            .push(&self.config.spreadsheet_id)
            .push("values")
            .push(range_and_verb);
        Ok(url)
    }

    async fn fetch_values(
        &self,
        token: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError> {
        let response = self
            .http
            .get(self.values_url(range)?)
            .bearer_auth(token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await?;
        let body: ValueRange = check_status(response).await?.json().await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Read `range` and split off its first line as the header row.
    async fn read_rows(&self, tab: &str, range: &str) -> Result<Vec<Row>, SheetsError> {
        let token = self.prepare(tab).await?;
        let mut values = self.fetch_values(&token, range).await?.into_iter();
        let headers = values.next().unwrap_or_default();
        let rows: Vec<Row> = values
            .enumerate()
            .map(|(i, cells)| Row::new(RowRef::new(tab, i + 2), &headers, &cells))
            .collect();
        tracing::debug!(tab, rows = rows.len(), "loaded rows");
        Ok(rows)
    }

    async fn fetch_headers(&self, token: &str, tab: &str) -> Result<Vec<String>, SheetsError> {
        let mut rows = self
            .fetch_values(token, &format!("{}!1:1", quote_tab(tab)))
            .await?;
        Ok(if rows.is_empty() {
            Vec::new()
        } else {
            rows.swap_remove(0)
        })
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn load_rows(&self, tab: &str, limit: usize) -> Result<Vec<Row>, SheetsError> {
        // Header row plus `limit` data rows.
        let range = format!("{}!1:{}", quote_tab(tab), limit.saturating_add(1));
        self.read_rows(tab, &range).await
    }

    async fn load_all_rows(&self, tab: &str) -> Result<Vec<Row>, SheetsError> {
        // A bare tab title selects the whole used range.
        self.read_rows(tab, &quote_tab(tab)).await
    }

    async fn append_row(&self, tab: &str, fields: &[(&str, String)]) -> Result<Row, SheetsError> {
        let token = self.prepare(tab).await?;
        let headers = self.fetch_headers(&token, tab).await?;
        let mut row = Row::new(RowRef::new(tab, 0), &headers, &[]);
        for (column, value) in fields {
            if !row.set(column, value.clone()) {
                tracing::debug!(tab, column, "ignoring field with no matching column");
            }
        }

        let range = format!("{}!A1", quote_tab(tab));
        let response = self
            .http
            .post(self.values_url(&format!("{}:append", range))?)
            .bearer_auth(&token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "majorDimension": "ROWS", "values": [row.values()] }))
            .send()
            .await?;
        let body: AppendResponse = check_status(response).await?.json().await?;
        let row_index = parse_first_row(&body.updates.updated_range).ok_or_else(|| {
            SheetsError::Decode(format!(
                "unexpected updatedRange '{}'",
                body.updates.updated_range
            ))
        })?;
        tracing::info!(tab, row_index, "row appended");
        Ok(Row::new(RowRef::new(tab, row_index), &headers, &row.values()))
    }

    async fn save_row(&self, row: &Row) -> Result<(), SheetsError> {
        let reference = row.reference();
        let token = self.prepare(&reference.tab).await?;
        let values = row.values();
        let range = format!(
            "{}!A{n}:{col}{n}",
            quote_tab(&reference.tab),
            n = reference.row_index,
            col = column_letter(values.len().max(1)),
        );
        let response = self
            .http
            .put(self.values_url(&range)?)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": [values] }))
            .send()
            .await?;
        check_status(response).await?;
        tracing::info!(tab = %reference.tab, row_index = reference.row_index, "row saved");
        Ok(())
    }

    async fn shutdown(&self) {
        *self.session.lock().await = None;
        self.tokens.clear().await;
        tracing::info!("spreadsheet session closed");
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(SheetsError::Connection(format!("credentials rejected: {}", message)));
    }
    Err(SheetsError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Quote a tab title for A1 notation: `Lead Gen Tracker` → `'Lead Gen Tracker'`.
fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

/// 1-based column number to A1 letters: 1 → A, 26 → Z, 27 → AA.
fn column_letter(mut n: usize) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// First row number of an A1 range such as `'Lead Gen Tracker'!A5:K5`.
fn parse_first_row(range: &str) -> Option<usize> {
    let cells = range.rsplit('!').next()?;
    let first = cells.split(':').next()?;
    first
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .ok()
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
