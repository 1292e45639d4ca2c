//! End-to-end workflow: every pipeline stage in order for one input.
//!
//! intent -> model -> prompt -> refine -> run, then log and report
//! analytics when a user id is configured.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::{history, intent, model, prompt, run};
use crate::client::ApiClient;
use crate::output::{self, OutputFormat};
use crate::wire::{
    Complexity, IntentAnalysis, InteractionMetadata, LlmRequest, LlmResponse, LogHistoryRequest,
    ModelRecommendation, PromptGeneration, Speed, Tone, UsageAnalytics,
};

#[derive(Args)]
pub struct WorkflowArgs {
    /// The user's request
    input: String,

    #[arg(short, long, value_enum, default_value = "professional")]
    tone: Tone,

    #[arg(short, long, value_enum, default_value = "detailed")]
    complexity: Complexity,

    /// Maximum cost per request in dollars
    #[arg(short, long)]
    budget: Option<f64>,

    #[arg(short, long, value_enum)]
    speed: Option<Speed>,

    /// Skip logging the interaction
    #[arg(long)]
    no_log: bool,
}

/// Every stage's output, for JSON and YAML rendering.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowReport {
    intent: IntentAnalysis,
    recommendation: ModelRecommendation,
    generated: PromptGeneration,
    refined: PromptGeneration,
    response: LlmResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    analytics: Option<UsageAnalytics>,
}

pub async fn execute(args: WorkflowArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    let table = matches!(format, OutputFormat::Table);

    let analysis = intent::analyze(client, &args.input).await?;
    if table {
        output::print_header("1. Intent");
        intent::print_analysis(&analysis);
    }

    let recommendation =
        model::recommend(client, analysis.intent_category, args.budget, args.speed).await?;
    if table {
        output::print_header("2. Model");
        model::print_recommendation(&recommendation);
    }

    let generated = prompt::generate(
        client,
        &recommendation.model_name,
        analysis.intent_category,
        &args.input,
    )
    .await?;
    if table {
        output::print_header("3. Prompt");
        prompt::print_generation(&generated);
    }

    let refined =
        prompt::refine(client, &generated.optimized_prompt, args.tone, args.complexity).await?;
    if table {
        output::print_header("4. Refined Prompt");
        prompt::print_generation(&refined);
    }

    let request = LlmRequest {
        model: recommendation.model_name.clone(),
        prompt: refined.optimized_prompt.clone(),
        max_tokens: None,
        temperature: None,
    };
    let response = run::exec(client, &request).await?;
    if table {
        output::print_header("5. Response");
        run::print_response(&response);
    }

    let analytics = if args.no_log {
        None
    } else if client.user_id().is_none() {
        if table {
            output::print_info("No user id configured; skipping history. Use --user-id to log.");
        }
        None
    } else {
        let log = LogHistoryRequest {
            model: &response.model,
            prompt: &refined.optimized_prompt,
            result: &response.output,
            metadata: Some(InteractionMetadata {
                intent_category: Some(analysis.intent_category),
                tags: Some(analysis.tags.clone()),
                tone: Some(args.tone),
                complexity: Some(args.complexity),
                model_provider: Some(recommendation.provider.clone()),
            }),
        };
        history::log(client, &log).await?;
        let analytics = history::analytics(client).await?;
        if table {
            output::print_header("6. Usage");
            history::print_analytics(&analytics, format)?;
        }
        Some(analytics)
    };

    if table {
        println!();
        output::print_success("Workflow complete");
        return Ok(());
    }

    let report = WorkflowReport {
        intent: analysis,
        recommendation,
        generated,
        refined,
        response,
        analytics,
    };
    output::print_item(&report, format)
}
