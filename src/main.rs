use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pipeline_control::config::{PipelineConfig, StoreKind};
use pipeline_control::dashboard::NewLead;
use pipeline_control::logging::{self, LogSettings};

mod cmd;

#[derive(Parser)]
#[command(name = "pipeline-control")]
#[command(version, about = "InnMotion Pipeline Control - leads, projects and bots from Google Sheets")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Path to pipeline.toml (default: .pipeline/pipeline.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backing store; `memory` serves sample data without credentials
    #[arg(long, global = true, value_enum)]
    pub store: Option<StoreKind>,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the dashboard API and WebSocket
    Serve {
        /// Port to serve on (overrides config and PIPELINE_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable dev mode (bind all interfaces, permissive CORS)
        #[arg(long)]
        dev: bool,

        /// Open the dashboard in a browser after the server starts
        #[arg(long)]
        open: bool,
    },
    /// Show lead counts, active projects, pipeline value and conversion rate
    Overview {
        #[arg(long)]
        json: bool,
    },
    /// List leads
    Leads {
        /// Group leads into status columns
        #[arg(long)]
        board: bool,

        #[arg(long)]
        json: bool,
    },
    /// List projects
    Projects {
        /// Filter: all, active, paused, completed, on-hold
        #[arg(long, default_value = "all")]
        status: String,

        /// Print totals after the list
        #[arg(long)]
        summary: bool,

        #[arg(long)]
        json: bool,
    },
    /// Show bot status
    Bots {
        #[arg(long)]
        json: bool,
    },
    /// Append a new lead with status NEW
    AddLead {
        /// Business name
        #[arg(long)]
        name: String,

        #[arg(long)]
        trade: String,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Lead source (default: DASHBOARD)
        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// Set a lead's status (NEW, QUALIFIED, CONTACTED, CONVERTED)
    SetStatus {
        lead_id: String,
        status: String,

        #[arg(long)]
        json: bool,
    },
    /// Replace a lead's notes
    SetNotes {
        lead_id: String,
        notes: String,

        #[arg(long)]
        json: bool,
    },
    /// Redraw the overview periodically until Ctrl+C
    Watch {
        /// Seconds between refreshes (default: refresh.interval_secs)
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// View, validate or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default pipeline.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let port = match &cli.command {
        Commands::Serve { port, .. } => *port,
        _ => None,
    };
    let config = PipelineConfig::load(&project_dir, cli.config.as_deref())?.with_cli_args(
        cli.store,
        port,
        cli.verbose,
        cli.log_json,
    );

    logging::init(&LogSettings {
        level: config.toml.logging.level.clone(),
        json: config.log_json,
        verbose: config.verbose,
        directory: config.toml.logging.directory.clone(),
    })?;

    match cli.command {
        Commands::Serve { dev, open, .. } => cmd::cmd_serve(&config, dev, open).await?,
        Commands::Overview { json } => cmd::cmd_overview(&config, json).await?,
        Commands::Leads { board, json } => cmd::cmd_leads(&config, board, json).await?,
        Commands::Projects {
            status,
            summary,
            json,
        } => cmd::cmd_projects(&config, &status, summary, json).await?,
        Commands::Bots { json } => cmd::cmd_bots(&config, json)?,
        Commands::AddLead {
            name,
            trade,
            location,
            phone,
            email,
            source,
            notes,
            json,
        } => {
            let input = NewLead {
                business_name: name,
                trade,
                location,
                phone,
                email,
                source,
                notes,
            };
            cmd::cmd_add_lead(&config, input, json).await?
        }
        Commands::SetStatus {
            lead_id,
            status,
            json,
        } => cmd::cmd_set_status(&config, &lead_id, &status, json).await?,
        Commands::SetNotes {
            lead_id,
            notes,
            json,
        } => cmd::cmd_set_notes(&config, &lead_id, &notes, json).await?,
        Commands::Watch { interval } => cmd::cmd_watch(&config, interval).await?,
        Commands::Config { command } => cmd::cmd_config(&config, command)?,
    }

    Ok(())
}
