//! Lead write commands (`add-lead`, `set-status`, `set-notes`).

use anyhow::Result;
use console::style;

use pipeline_control::config::PipelineConfig;
use pipeline_control::dashboard::NewLead;
use pipeline_control::ui::icons::CHECK;

use super::{build_service, print_json};

pub async fn cmd_add_lead(config: &PipelineConfig, input: NewLead, json: bool) -> Result<()> {
    let service = build_service(config);
    let result = service.add_lead(input).await?;
    if json {
        print_json(&result)?;
    } else {
        println!(
            "{}Added {} ({}) at row {}",
            CHECK,
            style(&result.lead_id).bold(),
            result.lead.business_name,
            result.row_index
        );
    }
    service.shutdown().await;
    Ok(())
}

pub async fn cmd_set_status(
    config: &PipelineConfig,
    lead_id: &str,
    status: &str,
    json: bool,
) -> Result<()> {
    let service = build_service(config);
    let result = service.update_lead_status(lead_id, status).await?;
    if json {
        print_json(&result)?;
    } else {
        println!(
            "{}{} is now {}",
            CHECK,
            style(&result.lead_id).bold(),
            style(&result.new_status).cyan()
        );
    }
    service.shutdown().await;
    Ok(())
}

pub async fn cmd_set_notes(
    config: &PipelineConfig,
    lead_id: &str,
    notes: &str,
    json: bool,
) -> Result<()> {
    let service = build_service(config);
    let result = service.update_lead_notes(lead_id, notes).await?;
    if json {
        print_json(&result)?;
    } else {
        println!("{}Updated notes for {}", CHECK, style(&result.lead_id).bold());
    }
    service.shutdown().await;
    Ok(())
}
