//! Configuration view and validation commands (`pipeline-control config`).

use anyhow::Result;

use pipeline_control::config::{PipelineConfig, PipelineToml};
use pipeline_control::ui::icons::{CHECK, CROSS, SPARKLE};

use super::super::ConfigCommands;

pub fn cmd_config(config: &PipelineConfig, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = &config.config_path;

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Pipeline Control Configuration");
            println!("==============================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No pipeline.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let toml = &config.toml;
            println!("[sheets]");
            println!("  spreadsheet_id = \"{}\"", toml.sheets.spreadsheet_id);
            println!("  credentials_path = \"{}\"", toml.sheets.credentials_path);
            println!("  store = \"{}\"", toml.sheets.store);
            println!("  leads_tab = \"{}\"", toml.sheets.leads_tab);
            println!("  pipeline_tab = \"{}\"", toml.sheets.pipeline_tab);
            println!();
            println!("[limits]");
            println!("  overview_leads = {}", toml.limits.overview_leads);
            println!("  projects = {}", toml.limits.projects);
            println!("  list_leads = {}", toml.limits.list_leads);
            println!();
            println!("[server]");
            println!("  port = {}", toml.server.port);
            println!("  dev_mode = {}", toml.server.dev_mode);
            println!();
            println!("[refresh]");
            println!("  interval_secs = {}", toml.refresh.interval_secs);
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  spreadsheet_id = \"{}\"", config.spreadsheet_id);
            println!("  credentials_path = \"{}\"", config.credentials_path.display());
            println!("  store = \"{}\"", config.store);
            println!("  port = {}", config.port);
            println!();

            if !config_path.exists() {
                println!("Run 'pipeline-control config init' to create a pipeline.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("{}Configuration is valid.", CHECK);
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  {}{}", CROSS, warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("pipeline.toml already exists at {}", config_path.display());
                println!("Edit it directly or remove it to reinitialize.");
                return Ok(());
            }

            PipelineToml::default().save(config_path)?;
            println!("{}Created {}", SPARKLE, config_path.display());
            println!();
            println!("Set [sheets] credentials_path to your service-account key,");
            println!("or run commands with --store memory to use sample data.");
        }
    }

    Ok(())
}
