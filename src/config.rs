//! Configuration for Pipeline Control.
//!
//! Settings are read from `.pipeline/pipeline.toml` and layered
//! file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [sheets]
//! spreadsheet_id = "12O-wtCg4Tew-GejLCp3W2yxlxgLt2rDbEqZMUHvUEFE"
//! credentials_path = "~/Documents/innmotion-bot-credentials.json"
//! store = "google"            # or "memory" for the seeded demo store
//! leads_tab = "Lead Gen Tracker"
//! pipeline_tab = "Pipeline Master"
//!
//! [limits]
//! overview_leads = 1000
//! projects = 100
//! list_leads = 500
//!
//! [server]
//! port = 3000
//! dev_mode = false
//!
//! [refresh]
//! interval_secs = 30
//!
//! [logging]
//! level = "info"
//! json = false
//! # directory = ".pipeline/logs"
//! ```
//!
//! Environment overrides: `PIPELINE_SPREADSHEET_ID`, `PIPELINE_CREDENTIALS`,
//! `PIPELINE_PORT`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dashboard::ServiceConfig;
use crate::server::ServerConfig;
use crate::sheets::client::SheetsConfig;

pub const CONFIG_DIR: &str = ".pipeline";
pub const CONFIG_FILE: &str = "pipeline.toml";

pub const ENV_SPREADSHEET_ID: &str = "PIPELINE_SPREADSHEET_ID";
pub const ENV_CREDENTIALS: &str = "PIPELINE_CREDENTIALS";
pub const ENV_PORT: &str = "PIPELINE_PORT";

pub const DEFAULT_SPREADSHEET_ID: &str = "12O-wtCg4Tew-GejLCp3W2yxlxgLt2rDbEqZMUHvUEFE";
pub const DEFAULT_CREDENTIALS: &str = "~/Documents/innmotion-bot-credentials.json";

/// Tabs the spreadsheet is expected to contain. Only the lead and pipeline
/// tabs are read; the rest are resolved at connect time and otherwise unused.
pub const RESERVED_TABS: [&str; 5] = [
    "Client Detail Input",
    "Website Bot Input",
    "SEO Bot Input",
    "Chatbot Bot Input",
    "Pricing Reference",
];

/// Which [`SheetStore`](crate::sheets::SheetStore) backs the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Google Sheets over the v4 REST API
    #[default]
    Google,
    /// In-process store seeded with sample data
    Memory,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::Google => write!(f, "google"),
            StoreKind::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsSection {
    #[serde(default = "default_spreadsheet_id")]
    pub spreadsheet_id: String,
    /// Service-account key; `~/` expands to the home directory.
    #[serde(default = "default_credentials")]
    pub credentials_path: String,
    #[serde(default)]
    pub store: StoreKind,
    #[serde(default = "default_leads_tab")]
    pub leads_tab: String,
    #[serde(default = "default_pipeline_tab")]
    pub pipeline_tab: String,
}

fn default_spreadsheet_id() -> String {
    DEFAULT_SPREADSHEET_ID.to_string()
}

fn default_credentials() -> String {
    DEFAULT_CREDENTIALS.to_string()
}

fn default_leads_tab() -> String {
    "Lead Gen Tracker".to_string()
}

fn default_pipeline_tab() -> String {
    "Pipeline Master".to_string()
}

impl Default for SheetsSection {
    fn default() -> Self {
        Self {
            spreadsheet_id: default_spreadsheet_id(),
            credentials_path: default_credentials(),
            store: StoreKind::default(),
            leads_tab: default_leads_tab(),
            pipeline_tab: default_pipeline_tab(),
        }
    }
}

/// Row bounds for each read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsSection {
    #[serde(default = "default_overview_leads")]
    pub overview_leads: usize,
    #[serde(default = "default_projects")]
    pub projects: usize,
    #[serde(default = "default_list_leads")]
    pub list_leads: usize,
}

fn default_overview_leads() -> usize {
    1000
}

fn default_projects() -> usize {
    100
}

fn default_list_leads() -> usize {
    500
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            overview_leads: default_overview_leads(),
            projects: default_projects(),
            list_leads: default_list_leads(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub dev_mode: bool,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            dev_mode: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSection {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    30
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    /// Also write daily-rolling log files here.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            directory: None,
        }
    }
}

/// Contents of `pipeline.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineToml {
    #[serde(default)]
    pub sheets: SheetsSection,
    #[serde(default)]
    pub limits: LimitsSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub refresh: RefreshSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl PipelineToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse pipeline.toml")
    }

    /// Load `pipeline.toml` from `config_dir`, or defaults if it doesn't exist.
    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize pipeline.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.sheets.spreadsheet_id.trim().is_empty() {
            warnings.push("sheets.spreadsheet_id is empty".to_string());
        }
        if self.sheets.leads_tab == self.sheets.pipeline_tab {
            warnings.push(format!(
                "sheets.leads_tab and sheets.pipeline_tab are both '{}'",
                self.sheets.leads_tab
            ));
        }
        for (name, value) in [
            ("overview_leads", self.limits.overview_leads),
            ("projects", self.limits.projects),
            ("list_leads", self.limits.list_leads),
        ] {
            if value == 0 {
                warnings.push(format!("limits.{} is 0; no rows will be read", name));
            }
        }
        if self.server.port == 0 {
            warnings.push("server.port is 0; an ephemeral port will be used".to_string());
        }
        if self.refresh.interval_secs == 0 {
            warnings.push("refresh.interval_secs must be at least 1".to_string());
        }
        if self
            .logging
            .level
            .parse::<tracing_subscriber::EnvFilter>()
            .is_err()
        {
            warnings.push(format!("Invalid logging.level '{}'", self.logging.level));
        }

        warnings
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Resolved configuration: `pipeline.toml`, then environment, then CLI.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path of the config file (may not exist).
    pub config_path: PathBuf,
    pub toml: PipelineToml,
    pub spreadsheet_id: String,
    pub credentials_path: PathBuf,
    pub port: u16,
    pub store: StoreKind,
    pub verbose: bool,
    pub log_json: bool,
}

impl PipelineConfig {
    /// Load from `config_path`, or `.pipeline/pipeline.toml` under
    /// `project_dir` when none is given, and apply environment overrides.
    pub fn load(project_dir: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| project_dir.join(CONFIG_DIR).join(CONFIG_FILE));
        let toml = if config_path.exists() {
            PipelineToml::load(&config_path)?
        } else {
            PipelineToml::default()
        };

        let mut config = Self::from_toml(config_path, toml);
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_toml(config_path: PathBuf, toml: PipelineToml) -> Self {
        Self {
            spreadsheet_id: toml.sheets.spreadsheet_id.clone(),
            credentials_path: expand_home(&toml.sheets.credentials_path),
            port: toml.server.port,
            store: toml.sheets.store,
            verbose: false,
            log_json: toml.logging.json,
            config_path,
            toml,
        }
    }

    /// Apply `PIPELINE_*` overrides from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(id) = lookup(ENV_SPREADSHEET_ID).filter(|v| !v.is_empty()) {
            self.spreadsheet_id = id;
        }
        if let Some(path) = lookup(ENV_CREDENTIALS).filter(|v| !v.is_empty()) {
            self.credentials_path = expand_home(&path);
        }
        if let Some(port) = lookup(ENV_PORT).filter(|v| !v.is_empty()) {
            self.port = port
                .parse()
                .with_context(|| format!("Invalid {}: '{}'", ENV_PORT, port))?;
        }
        Ok(())
    }

    /// Apply CLI overrides.
    pub fn with_cli_args(
        mut self,
        store: Option<StoreKind>,
        port: Option<u16>,
        verbose: bool,
        log_json: bool,
    ) -> Self {
        if let Some(store) = store {
            self.store = store;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self.verbose = verbose;
        self.log_json = self.log_json || log_json;
        self
    }

    pub fn config_dir(&self) -> PathBuf {
        self.config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.toml.refresh.interval_secs.max(1))
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            leads_tab: self.toml.sheets.leads_tab.clone(),
            pipeline_tab: self.toml.sheets.pipeline_tab.clone(),
            overview_lead_limit: self.toml.limits.overview_leads,
            project_limit: self.toml.limits.projects,
            list_lead_limit: self.toml.limits.list_leads,
        }
    }

    pub fn sheets_config(&self) -> SheetsConfig {
        let mut config = SheetsConfig::new(&self.spreadsheet_id, self.credentials_path.clone());
        config.tabs = [
            self.toml.sheets.leads_tab.as_str(),
            self.toml.sheets.pipeline_tab.as_str(),
        ]
        .into_iter()
        .chain(RESERVED_TABS)
        .map(str::to_string)
        .collect();
        config
    }

    pub fn server_config(&self, dev_mode: bool) -> ServerConfig {
        ServerConfig {
            port: self.port,
            dev_mode: dev_mode || self.toml.server.dev_mode,
            refresh_interval: self.refresh_interval(),
        }
    }

    /// Validate configuration and return warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.toml.validate();
        if self.store == StoreKind::Google && !self.credentials_path.exists() {
            warnings.push(format!(
                "Credentials file not found: {}",
                self.credentials_path.display()
            ));
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_pipeline_toml_parse_empty() {
        let toml = PipelineToml::parse("").unwrap();
        assert_eq!(toml.sheets.spreadsheet_id, DEFAULT_SPREADSHEET_ID);
        assert_eq!(toml.sheets.leads_tab, "Lead Gen Tracker");
        assert_eq!(toml.sheets.store, StoreKind::Google);
        assert_eq!(toml.limits.overview_leads, 1000);
        assert_eq!(toml.limits.projects, 100);
        assert_eq!(toml.limits.list_leads, 500);
        assert_eq!(toml.server.port, 3000);
        assert_eq!(toml.refresh.interval_secs, 30);
        assert!(toml.validate().is_empty());
    }

    #[test]
    fn test_pipeline_toml_parse_sections() {
        let toml = PipelineToml::parse(
            r#"
[sheets]
spreadsheet_id = "abc123"
store = "memory"

[limits]
list_leads = 50

[server]
port = 8080
dev_mode = true

[logging]
level = "debug"
json = true
"#,
        )
        .unwrap();
        assert_eq!(toml.sheets.spreadsheet_id, "abc123");
        assert_eq!(toml.sheets.store, StoreKind::Memory);
        assert_eq!(toml.limits.list_leads, 50);
        assert_eq!(toml.limits.projects, 100);
        assert_eq!(toml.server.port, 8080);
        assert!(toml.server.dev_mode);
        assert!(toml.logging.json);
    }

    #[test]
    fn test_pipeline_toml_parse_invalid() {
        assert!(PipelineToml::parse("[server]\nport = \"not a number\"").is_err());
        assert!(PipelineToml::parse("[sheets]\nstore = \"excel\"").is_err());
    }

    #[test]
    fn test_validate_warnings() {
        let mut toml = PipelineToml::default();
        toml.sheets.spreadsheet_id = String::new();
        toml.sheets.pipeline_tab = toml.sheets.leads_tab.clone();
        toml.limits.projects = 0;
        toml.refresh.interval_secs = 0;
        let warnings = toml.validate();
        assert_eq!(warnings.len(), 4, "{:?}", warnings);
        assert!(warnings.iter().any(|w| w.contains("spreadsheet_id")));
        assert!(warnings.iter().any(|w| w.contains("limits.projects")));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_DIR).join(CONFIG_FILE);
        let mut toml = PipelineToml::default();
        toml.server.port = 4321;
        toml.save(&path).unwrap();

        let loaded = PipelineToml::load_or_default(&dir.path().join(CONFIG_DIR)).unwrap();
        assert_eq!(loaded.server.port, 4321);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let toml = PipelineToml::load_or_default(dir.path()).unwrap();
        assert_eq!(toml.server.port, 3000);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = PipelineConfig::from_toml(PathBuf::from("pipeline.toml"), PipelineToml::default());
        config
            .apply_env(env(&[
                (ENV_SPREADSHEET_ID, "from-env"),
                (ENV_CREDENTIALS, "/etc/creds.json"),
                (ENV_PORT, "9000"),
            ]))
            .unwrap();
        assert_eq!(config.spreadsheet_id, "from-env");
        assert_eq!(config.credentials_path, PathBuf::from("/etc/creds.json"));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_env_invalid_port_is_error() {
        let mut config = PipelineConfig::from_toml(PathBuf::from("pipeline.toml"), PipelineToml::default());
        let err = config.apply_env(env(&[(ENV_PORT, "http")])).unwrap_err();
        assert!(err.to_string().contains(ENV_PORT));
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = PipelineConfig::from_toml(PathBuf::from("pipeline.toml"), PipelineToml::default());
        config.apply_env(env(&[(ENV_PORT, "9000")])).unwrap();
        let config = config.with_cli_args(Some(StoreKind::Memory), Some(7000), true, false);
        assert_eq!(config.port, 7000);
        assert_eq!(config.store, StoreKind::Memory);
        assert!(config.verbose);
    }

    #[test]
    fn test_service_and_sheets_config() {
        let mut toml = PipelineToml::default();
        toml.limits.list_leads = 250;
        let config = PipelineConfig::from_toml(PathBuf::from(".pipeline/pipeline.toml"), toml);

        let service = config.service_config();
        assert_eq!(service.list_lead_limit, 250);
        assert_eq!(service.pipeline_tab, "Pipeline Master");

        let sheets = config.sheets_config();
        assert_eq!(sheets.spreadsheet_id, DEFAULT_SPREADSHEET_ID);
        assert_eq!(sheets.tabs.len(), 7);
        assert_eq!(sheets.tabs[0], "Lead Gen Tracker");
        assert!(sheets.tabs.iter().any(|t| t == "Pricing Reference"));

        assert_eq!(config.config_dir(), PathBuf::from(".pipeline"));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path.json"), PathBuf::from("/abs/path.json"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/creds.json"), home.join("creds.json"));
        }
    }

    #[test]
    fn test_validate_reports_missing_credentials_for_google_only() {
        let mut config = PipelineConfig::from_toml(PathBuf::from("pipeline.toml"), PipelineToml::default());
        config.credentials_path = PathBuf::from("/definitely/not/here.json");
        assert!(config.validate().iter().any(|w| w.contains("Credentials")));

        config.store = StoreKind::Memory;
        assert!(config.validate().is_empty());
    }
}
