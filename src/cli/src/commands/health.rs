//! Health check command.
//!
//! Queries `/health` and, with `--detailed`, the `/api` service description.

use anyhow::Result;
use clap::Args;

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct HealthArgs {
    /// Include the service description and feature list
    #[arg(short, long)]
    detailed: bool,
}

pub async fn execute(args: HealthArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health: serde_json::Value = client.get_raw("/health").await?;
    let info = if args.detailed {
        Some(client.get_raw("/api").await?)
    } else {
        None
    };

    match format {
        OutputFormat::Table => {
            let status = health
                .get("status")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");

            output::print_header("System Health");
            output::print_detail("Status", status);
            output::print_detail("API URL", client.base_url());

            for (label, key) in [
                ("Version", "version"),
                ("Environment", "environment"),
                ("Timestamp", "timestamp"),
            ] {
                if let Some(value) = health.get(key).and_then(|v| v.as_str()) {
                    output::print_detail(label, value);
                }
            }

            if let Some(info) = &info {
                output::print_header("Service");
                if let Some(description) = info.get("description").and_then(|v| v.as_str()) {
                    output::print_detail("Description", description);
                }
                if let Some(features) = info.get("features").and_then(|v| v.as_array()) {
                    let names: Vec<&str> = features.iter().filter_map(|f| f.as_str()).collect();
                    output::print_detail("Features", &names.join(", "));
                }
            }

            if status == "ok" {
                output::print_success("All systems operational");
            } else {
                output::print_error(&format!("System status: {}", status));
            }
        }
        _ => {
            let report = match info {
                Some(info) => serde_json::json!({ "health": health, "service": info }),
                None => health,
            };
            output::print_item(&report, format)?;
        }
    }

    Ok(())
}
