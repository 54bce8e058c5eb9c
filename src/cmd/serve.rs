//! Dashboard server command (`pipeline-control serve`).

use anyhow::Result;

use pipeline_control::config::PipelineConfig;
use pipeline_control::server::start_server;

use super::build_service;

pub async fn cmd_serve(config: &PipelineConfig, dev: bool, open: bool) -> Result<()> {
    let server_config = config.server_config(dev);

    // Skip in dev mode (no browser inside containers)
    if open && !server_config.dev_mode {
        let url = format!("http://localhost:{}/api/dashboard", server_config.port);
        tokio::spawn(async move {
            // Let the server bind first
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url) {
                tracing::warn!(error = %e, "failed to open browser");
            }
        });
    }

    let service = build_service(config);
    start_server(server_config, service).await
}
