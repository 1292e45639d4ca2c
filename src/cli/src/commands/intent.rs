//! Intent analysis command.

use anyhow::Result;
use clap::Subcommand;

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};
use crate::wire::{AnalyzeIntentRequest, IntentAnalysis};

#[derive(Subcommand)]
pub enum IntentCommands {
    /// Classify free text into an intent category
    Analyze {
        /// Text to classify
        text: String,
    },
}

pub async fn analyze(client: &ApiClient, text: &str) -> Result<IntentAnalysis> {
    client
        .post("/api/v1/intent/analyze", &AnalyzeIntentRequest { text })
        .await
}

pub fn print_analysis(analysis: &IntentAnalysis) {
    output::print_detail("Intent", &enum_label(&analysis.intent_category));
    output::print_detail("Confidence", &format!("{:.2}", analysis.confidence));
    output::print_detail("Tags", &analysis.tags.join(", "));
}

/// Wire name of a serializable enum value.
pub fn enum_label<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

pub async fn execute(cmd: IntentCommands, client: &ApiClient, format: OutputFormat) -> Result<()> {
    match cmd {
        IntentCommands::Analyze { text } => {
            let analysis = analyze(client, &text).await?;
            match format {
                OutputFormat::Table => {
                    output::print_header("Intent Analysis");
                    print_analysis(&analysis);
                }
                _ => output::print_item(&analysis, format)?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{IntentCategory, Tone};

    #[test]
    fn test_enum_label() {
        assert_eq!(enum_label(&IntentCategory::CodeGeneration), "code_generation");
        assert_eq!(enum_label(&Tone::Technical), "technical");
    }
}
