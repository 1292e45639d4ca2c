//! Model recommendation commands.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};
use crate::wire::{IntentCategory, ModelRecommendation, RecommendModelRequest, Speed, KNOWN_MODELS};

#[derive(Subcommand)]
pub enum ModelCommands {
    /// Recommend a model for an intent category
    Recommend {
        /// Intent category
        #[arg(short, long, value_enum)]
        intent: IntentCategory,

        /// Maximum cost per request in dollars
        #[arg(short, long)]
        budget: Option<f64>,

        /// Latency preference
        #[arg(short, long, value_enum)]
        speed: Option<Speed>,
    },

    /// List the models the server accepts
    List,
}

#[derive(Debug, Serialize, Tabled)]
struct ModelRow {
    #[tabled(rename = "Model")]
    model: &'static str,
    #[tabled(rename = "Provider")]
    provider: &'static str,
}

pub async fn recommend(
    client: &ApiClient,
    intent: IntentCategory,
    budget: Option<f64>,
    speed: Option<Speed>,
) -> Result<ModelRecommendation> {
    let body = RecommendModelRequest {
        intent_category: intent,
        budget,
        speed,
    };
    client.post("/api/v1/model/recommend", &body).await
}

pub fn print_recommendation(rec: &ModelRecommendation) {
    output::print_detail("Model", &rec.model_name);
    output::print_detail("Provider", &rec.provider);
    output::print_detail("Reasoning", &rec.reasoning);
    if let Some(cost) = rec.estimated_cost {
        output::print_detail("Est. Cost", &format!("${:.4}", cost));
    }
    output::print_detail("Score", &format!("{:.2}", rec.performance_score));
}

pub async fn execute(cmd: ModelCommands, client: &ApiClient, format: OutputFormat) -> Result<()> {
    match cmd {
        ModelCommands::Recommend {
            intent,
            budget,
            speed,
        } => {
            let rec = recommend(client, intent, budget, speed).await?;
            match format {
                OutputFormat::Table => {
                    output::print_header("Model Recommendation");
                    print_recommendation(&rec);
                }
                _ => output::print_item(&rec, format)?,
            }
        }

        ModelCommands::List => {
            let rows: Vec<ModelRow> = KNOWN_MODELS
                .iter()
                .map(|&(model, provider)| ModelRow { model, provider })
                .collect();
            output::print_list(&rows, format)?;
        }
    }

    Ok(())
}
