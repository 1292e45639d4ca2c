//! Interaction history commands. All of them need a user id.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};
use crate::wire::{
    IntentCategory, InteractionMetadata, LogHistoryRequest, StoredInteraction, UsageAnalytics,
};

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// Record an interaction
    Log {
        #[arg(short, long)]
        model: String,

        #[arg(short, long)]
        prompt: String,

        #[arg(short, long)]
        result: String,

        /// Intent category to store with the interaction
        #[arg(short, long, value_enum)]
        intent: Option<IntentCategory>,
    },

    /// Show recent interactions, newest first
    List {
        /// Maximum number of results (1-100)
        #[arg(short, long, default_value = "50")]
        limit: u32,
    },

    /// Show usage analytics
    Analytics,
}

#[derive(Debug, Serialize, Tabled)]
struct InteractionRow {
    #[tabled(rename = "When")]
    timestamp: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Intent")]
    intent: String,
    #[tabled(rename = "Prompt")]
    prompt: String,
}

impl From<StoredInteraction> for InteractionRow {
    fn from(record: StoredInteraction) -> Self {
        let intent = record
            .metadata
            .and_then(|m| m.intent_category)
            .map(|c| super::intent::enum_label(&c))
            .unwrap_or_else(|| "-".to_string());
        Self {
            timestamp: record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            model: record.model,
            intent,
            prompt: output::truncate(&record.prompt, 48),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct CountRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Count")]
    count: u64,
}

pub async fn log(client: &ApiClient, request: &LogHistoryRequest<'_>) -> Result<()> {
    client.post_as_user("/api/v1/history", request).await
}

pub async fn analytics(client: &ApiClient) -> Result<UsageAnalytics> {
    client.get_as_user("/api/v1/history/analytics").await
}

pub fn print_analytics(analytics: &UsageAnalytics, format: OutputFormat) -> Result<()> {
    output::print_detail("Total Interactions", &analytics.total_interactions.to_string());
    output::print_detail(
        "Last Interaction",
        &analytics
            .last_interaction
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string()),
    );

    for (title, counts) in [
        ("Model Usage", &analytics.model_usage),
        ("Intent Distribution", &analytics.intent_distribution),
    ] {
        output::print_header(title);
        let rows: Vec<CountRow> = counts
            .iter()
            .map(|(name, count)| CountRow {
                name: name.clone(),
                count: *count,
            })
            .collect();
        output::print_list(&rows, format)?;
    }
    Ok(())
}

pub async fn execute(cmd: HistoryCommands, client: &ApiClient, format: OutputFormat) -> Result<()> {
    match cmd {
        HistoryCommands::Log {
            model,
            prompt,
            result,
            intent,
        } => {
            let request = LogHistoryRequest {
                model: &model,
                prompt: &prompt,
                result: &result,
                metadata: intent.map(|c| InteractionMetadata {
                    intent_category: Some(c),
                    ..Default::default()
                }),
            };
            log(client, &request).await?;
            output::print_success("Interaction logged");
        }

        HistoryCommands::List { limit } => {
            let records: Vec<StoredInteraction> = client
                .get_as_user(&format!("/api/v1/history?limit={}", limit))
                .await?;

            match format {
                OutputFormat::Table => {
                    let rows: Vec<InteractionRow> =
                        records.into_iter().map(InteractionRow::from).collect();
                    output::print_list(&rows, format)?;
                }
                _ => output::print_item(&records, format)?,
            }
        }

        HistoryCommands::Analytics => {
            let analytics = analytics(client).await?;
            match format {
                OutputFormat::Table => {
                    output::print_header("Usage Analytics");
                    print_analytics(&analytics, format)?;
                }
                _ => output::print_item(&analytics, format)?,
            }
        }
    }

    Ok(())
}
