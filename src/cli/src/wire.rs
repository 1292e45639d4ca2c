//! Request and response shapes exchanged with the server.
//!
//! Model names travel as plain strings; the server owns the set of valid
//! models and rejects unknown ones.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum IntentCategory {
    CreativeWriting,
    CodeGeneration,
    DataAnalysis,
    ContentSummarization,
    Translation,
    QuestionAnswering,
    Brainstorming,
    ProblemSolving,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Casual,
    Creative,
    Technical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Fast,
    Balanced,
    Quality,
}

/// Models the server accepts, with their providers.
pub const KNOWN_MODELS: [(&str, &str); 10] = [
    ("gpt-4o", "openai"),
    ("gpt-4o-mini", "openai"),
    ("gpt-3.5-turbo", "openai"),
    ("claude-3-opus", "anthropic"),
    ("claude-3-sonnet", "anthropic"),
    ("claude-3-haiku", "anthropic"),
    ("gemini-pro", "google"),
    ("gemini-flash", "google"),
    ("llama-3.1-8b", "local"),
    ("llama-3.1-70b", "local"),
];

// ── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalyzeIntentRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendModelRequest {
    pub intent_category: IntentCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<Speed>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePromptRequest<'a> {
    pub model: &'a str,
    pub intent: IntentCategory,
    pub user_input: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefinePromptRequest<'a> {
    pub prompt: &'a str,
    pub tone: Tone,
    pub complexity: Complexity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_category: Option<IntentCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_provider: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogHistoryRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub result: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InteractionMetadata>,
}

// ── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentAnalysis {
    pub intent_category: IntentCategory,
    pub tags: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecommendation {
    pub model_name: String,
    pub provider: String,
    pub reasoning: String,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    pub performance_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptGeneration {
    pub raw_prompt: String,
    pub optimized_prompt: String,
    pub improvements: Vec<String>,
    pub estimated_tokens: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    pub output: String,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
    pub model: String,
    pub latency: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredInteraction {
    pub id: Uuid,
    pub user_id: String,
    pub model: String,
    pub prompt: String,
    pub result: String,
    #[serde(default)]
    pub metadata: Option<InteractionMetadata>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageAnalytics {
    pub total_interactions: usize,
    pub model_usage: BTreeMap<String, u64>,
    pub intent_distribution: BTreeMap<String, u64>,
    pub last_interaction: Option<DateTime<Utc>>,
}
