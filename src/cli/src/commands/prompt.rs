//! Prompt generation and refinement commands.

use anyhow::Result;
use clap::Subcommand;

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};
use crate::wire::{
    Complexity, GeneratePromptRequest, IntentCategory, PromptGeneration, RefinePromptRequest, Tone,
};

#[derive(Subcommand)]
pub enum PromptCommands {
    /// Build a prompt for a model from user input
    Generate {
        /// Target model (e.g. gpt-4o)
        #[arg(short, long)]
        model: String,

        /// Intent category
        #[arg(short, long, value_enum)]
        intent: IntentCategory,

        /// The user's request
        input: String,
    },

    /// Append tone and complexity instructions to a prompt
    Refine {
        #[arg(short, long, value_enum, default_value = "professional")]
        tone: Tone,

        #[arg(short, long, value_enum, default_value = "simple")]
        complexity: Complexity,

        /// Prompt to refine
        prompt: String,
    },
}

pub async fn generate(
    client: &ApiClient,
    model: &str,
    intent: IntentCategory,
    user_input: &str,
) -> Result<PromptGeneration> {
    let body = GeneratePromptRequest {
        model,
        intent,
        user_input,
    };
    client.post("/api/v1/prompt/generate", &body).await
}

pub async fn refine(
    client: &ApiClient,
    prompt: &str,
    tone: Tone,
    complexity: Complexity,
) -> Result<PromptGeneration> {
    let body = RefinePromptRequest {
        prompt,
        tone,
        complexity,
    };
    client.post("/api/v1/prompt/refine", &body).await
}

pub fn print_generation(generation: &PromptGeneration) {
    output::print_detail("Estimated Tokens", &generation.estimated_tokens.to_string());
    output::print_detail("Improvements", &generation.improvements.join("; "));
    println!();
    output::print_block(&generation.optimized_prompt);
}

pub async fn execute(cmd: PromptCommands, client: &ApiClient, format: OutputFormat) -> Result<()> {
    let (title, generation) = match cmd {
        PromptCommands::Generate {
            model,
            intent,
            input,
        } => ("Generated Prompt", generate(client, &model, intent, &input).await?),
        PromptCommands::Refine {
            tone,
            complexity,
            prompt,
        } => ("Refined Prompt", refine(client, &prompt, tone, complexity).await?),
    };

    match format {
        OutputFormat::Table => {
            output::print_header(title);
            print_generation(&generation);
        }
        _ => output::print_item(&generation, format)?,
    }

    Ok(())
}
