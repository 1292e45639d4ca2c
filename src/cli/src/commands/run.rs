//! Model execution commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};
use crate::wire::{LlmRequest, LlmResponse};

#[derive(Subcommand)]
pub enum RunCommands {
    /// Execute a single prompt
    Exec {
        /// Model to run (e.g. claude-3-haiku)
        #[arg(short, long)]
        model: String,

        #[arg(long)]
        max_tokens: Option<u32>,

        /// Sampling temperature, 0 to 2
        #[arg(short, long)]
        temperature: Option<f64>,

        /// Prompt text
        prompt: String,
    },

    /// Execute every request in a YAML or JSON file concurrently
    Batch {
        /// File holding a list of requests, or a `requests:` key with one
        file: String,
    },
}

/// Batch file layout.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BatchFile {
    List(Vec<LlmRequest>),
    Keyed { requests: Vec<LlmRequest> },
}

impl BatchFile {
    fn into_requests(self) -> Vec<LlmRequest> {
        match self {
            Self::List(requests) | Self::Keyed { requests } => requests,
        }
    }
}

/// Parse a batch file; YAML is a superset of JSON so one parser covers both.
fn parse_batch(content: &str) -> Result<Vec<LlmRequest>> {
    let file: BatchFile =
        serde_yaml::from_str(content).context("Failed to parse batch file")?;
    Ok(file.into_requests())
}

#[derive(Debug, Serialize, Tabled)]
struct ResponseRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Latency (ms)")]
    latency: u64,
    #[tabled(rename = "Tokens")]
    tokens: String,
    #[tabled(rename = "Output")]
    output: String,
}

pub async fn exec(client: &ApiClient, request: &LlmRequest) -> Result<LlmResponse> {
    client.post("/api/v1/run", request).await
}

pub fn print_response(response: &LlmResponse) {
    output::print_detail("Model", &response.model);
    output::print_detail("Latency", &format!("{} ms", response.latency));
    if let Some(usage) = &response.usage {
        output::print_detail(
            "Tokens",
            &format!(
                "{} prompt + {} completion = {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            ),
        );
    }
    println!();
    output::print_block(&response.output);
}

pub async fn execute(cmd: RunCommands, client: &ApiClient, format: OutputFormat) -> Result<()> {
    match cmd {
        RunCommands::Exec {
            model,
            max_tokens,
            temperature,
            prompt,
        } => {
            let request = LlmRequest {
                model,
                prompt,
                max_tokens,
                temperature,
            };
            let response = exec(client, &request).await?;
            match format {
                OutputFormat::Table => {
                    output::print_header("LLM Response");
                    print_response(&response);
                }
                _ => output::print_item(&response, format)?,
            }
        }

        RunCommands::Batch { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read batch file: {}", file))?;
            let requests = parse_batch(&content)?;
            if requests.is_empty() {
                output::print_info("Batch file contains no requests.");
                return Ok(());
            }

            let responses: Vec<LlmResponse> = client.post("/api/v1/run/batch", &requests).await?;

            match format {
                OutputFormat::Table => {
                    let rows: Vec<ResponseRow> = responses
                        .into_iter()
                        .enumerate()
                        .map(|(index, r)| ResponseRow {
                            index,
                            model: r.model,
                            latency: r.latency,
                            tokens: r
                                .usage
                                .map(|u| u.total_tokens.to_string())
                                .unwrap_or_else(|| "-".to_string()),
                            output: output::truncate(&r.output, 60),
                        })
                        .collect();
                    output::print_list(&rows, format)?;
                }
                _ => output::print_item(&responses, format)?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_list() {
        let content = "- model: gpt-4o\n  prompt: hello\n- model: gemini-pro\n  prompt: hi\n  maxTokens: 64\n";
        let requests = parse_batch(content).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].max_tokens, Some(64));
    }

    #[test]
    fn test_parse_keyed_json() {
        let content = r#"{"requests": [{"model": "claude-3-haiku", "prompt": "x", "temperature": 0.3}]}"#;
        let requests = parse_batch(content).unwrap();
        assert_eq!(requests[0].model, "claude-3-haiku");
        assert_eq!(requests[0].temperature, Some(0.3));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_batch("model: [").is_err());
    }
}
