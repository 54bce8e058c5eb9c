//! Integration tests for Pipeline Control
//!
//! These run the binary against the seeded in-memory store, so no
//! credentials or network are needed.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a pipeline-control Command isolated from the host environment
fn pipeline() -> Command {
    let mut cmd = cargo_bin_cmd!("pipeline-control");
    cmd.env_remove("PIPELINE_SPREADSHEET_ID")
        .env_remove("PIPELINE_CREDENTIALS")
        .env_remove("PIPELINE_PORT")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper running a command in an empty project dir with the memory store
fn memory(dir: &TempDir) -> Command {
    let mut cmd = pipeline();
    cmd.current_dir(dir.path()).args(["--store", "memory"]);
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        pipeline()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("serve"))
            .stdout(predicate::str::contains("set-status"));
    }

    #[test]
    fn test_version() {
        pipeline().arg("--version").assert().success();
    }

    #[test]
    fn test_unknown_store_rejected() {
        pipeline()
            .args(["--store", "excel", "overview"])
            .assert()
            .failure();
    }
}

// =============================================================================
// Dashboard views
// =============================================================================

mod views {
    use super::*;

    #[test]
    fn test_overview_json() {
        let dir = TempDir::new().unwrap();
        let json = stdout_json(memory(&dir).args(["overview", "--json"]));
        assert_eq!(json["totalLeads"], 6);
        assert_eq!(json["leads"]["new"], 2);
        assert_eq!(json["leads"]["converted"], 1);
        assert_eq!(json["activeProjects"], 3);
        assert_eq!(json["pipelineValue"], 7900.0);
    }

    #[test]
    fn test_overview_text() {
        let dir = TempDir::new().unwrap();
        memory(&dir)
            .arg("overview")
            .assert()
            .success()
            .stdout(predicate::str::contains("Pipeline Value"))
            .stdout(predicate::str::contains("$7,900"));
    }

    #[test]
    fn test_leads_list_and_board() {
        let dir = TempDir::new().unwrap();
        let leads = stdout_json(memory(&dir).args(["leads", "--json"]));
        assert_eq!(leads.as_array().unwrap().len(), 6);
        assert_eq!(leads[0]["businessName"], "Sydney Plumbing Co");

        memory(&dir)
            .args(["leads", "--board"])
            .assert()
            .success()
            .stdout(predicate::str::contains("New Leads"))
            .stdout(predicate::str::contains("Dream Kitchens"));
    }

    #[test]
    fn test_projects_filter() {
        let dir = TempDir::new().unwrap();
        let paused = stdout_json(memory(&dir).args(["projects", "--status", "paused", "--json"]));
        assert_eq!(paused.as_array().unwrap().len(), 1);
        assert_eq!(paused[0]["clientName"], "Pro Electricians");

        memory(&dir)
            .args(["projects", "--summary"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Total value $14,200"));
    }

    #[test]
    fn test_projects_invalid_filter() {
        let dir = TempDir::new().unwrap();
        memory(&dir)
            .args(["projects", "--status", "archived"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid project status"));
    }

    #[test]
    fn test_bots() {
        let dir = TempDir::new().unwrap();
        let grid = stdout_json(memory(&dir).args(["bots", "--json"]));
        assert_eq!(grid["bots"].as_array().unwrap().len(), 5);
        assert_eq!(grid["summary"]["activeBots"], 4);
    }
}

// =============================================================================
// Lead writes
// =============================================================================

mod writes {
    use super::*;

    #[test]
    fn test_add_lead() {
        let dir = TempDir::new().unwrap();
        let result = stdout_json(memory(&dir).args([
            "add-lead", "--name", "Acme", "--trade", "Plumber", "--json",
        ]));
        assert_eq!(result["success"], true);
        assert_eq!(result["leadId"], "LM-007");
        assert_eq!(result["lead"]["status"], "NEW");
        assert_eq!(result["lead"]["source"], "DASHBOARD");
    }

    #[test]
    fn test_add_lead_requires_trade() {
        let dir = TempDir::new().unwrap();
        memory(&dir)
            .args(["add-lead", "--name", "Acme"])
            .assert()
            .failure();
    }

    #[test]
    fn test_set_status() {
        let dir = TempDir::new().unwrap();
        let result = stdout_json(memory(&dir).args(["set-status", "LM-001", "qualified", "--json"]));
        assert_eq!(result["leadId"], "LM-001");
        assert_eq!(result["newStatus"], "QUALIFIED");
    }

    #[test]
    fn test_set_status_unknown_lead() {
        let dir = TempDir::new().unwrap();
        memory(&dir)
            .args(["set-status", "LM-999", "NEW"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Lead LM-999 not found"));
    }

    #[test]
    fn test_set_status_invalid_value() {
        let dir = TempDir::new().unwrap();
        memory(&dir)
            .args(["set-status", "LM-001", "ARCHIVED"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid lead status"));
    }

    #[test]
    fn test_set_notes() {
        let dir = TempDir::new().unwrap();
        memory(&dir)
            .args(["set-notes", "LM-002", "Quote sent"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Updated notes for LM-002"));
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config {
    use super::*;

    #[test]
    fn test_config_show_defaults() {
        let dir = TempDir::new().unwrap();
        pipeline()
            .current_dir(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No pipeline.toml found"))
            .stdout(predicate::str::contains("Lead Gen Tracker"));
    }

    #[test]
    fn test_config_init_creates_file() {
        let dir = TempDir::new().unwrap();
        pipeline()
            .current_dir(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created"));

        let path = dir.path().join(".pipeline/pipeline.toml");
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[sheets]"));
        assert!(content.contains("spreadsheet_id"));

        // Second init leaves the file alone
        pipeline()
            .current_dir(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_config_file_selects_memory_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[sheets]\nstore = \"memory\"\n").unwrap();

        let json = stdout_json(
            pipeline()
                .current_dir(dir.path())
                .arg("--config")
                .arg(&path)
                .args(["overview", "--json"]),
        );
        assert_eq!(json["totalLeads"], 6);
    }

    #[test]
    fn test_env_port_override_shown() {
        let dir = TempDir::new().unwrap();
        pipeline()
            .current_dir(dir.path())
            .env("PIPELINE_PORT", "4567")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("port = 4567"));
    }

    #[test]
    fn test_config_validate_reports_missing_credentials() {
        let dir = TempDir::new().unwrap();
        pipeline()
            .current_dir(dir.path())
            .env("PIPELINE_CREDENTIALS", "/nonexistent/creds.json")
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Credentials file not found"));
    }

    #[test]
    fn test_missing_credentials_fail_as_connection_error() {
        let dir = TempDir::new().unwrap();
        pipeline()
            .current_dir(dir.path())
            .env("PIPELINE_CREDENTIALS", "/nonexistent/creds.json")
            .args(["overview"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Spreadsheet connection failed"));
    }
}
