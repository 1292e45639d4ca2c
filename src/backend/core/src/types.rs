//! Shared data model for the pipeline stages.
//!
//! Every enum here is closed: the wire strings are fixed and deserialization
//! of anything else is rejected before a stage runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// ═══════════════════════════════════════════════════════════════════════════════
// Closed Enumerations
// ═══════════════════════════════════════════════════════════════════════════════

/// Purpose of a user's natural-language request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
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

impl IntentCategory {
    /// All categories, in declaration order.
    pub const ALL: [IntentCategory; 9] = [
        Self::CreativeWriting,
        Self::CodeGeneration,
        Self::DataAnalysis,
        Self::ContentSummarization,
        Self::Translation,
        Self::QuestionAnswering,
        Self::Brainstorming,
        Self::ProblemSolving,
        Self::Other,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreativeWriting => "creative_writing",
            Self::CodeGeneration => "code_generation",
            Self::DataAnalysis => "data_analysis",
            Self::ContentSummarization => "content_summarization",
            Self::Translation => "translation",
            Self::QuestionAnswering => "question_answering",
            Self::Brainstorming => "brainstorming",
            Self::ProblemSolving => "problem_solving",
            Self::Other => "other",
        }
    }

    /// Position of this category in [`IntentCategory::ALL`].
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External LLM vendor or local model host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
    Local,
}

impl Provider {
    pub const ALL: [Provider; 4] = [Self::OpenAi, Self::Anthropic, Self::Google, Self::Local];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete model identifiers accepted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelName {
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "claude-3-opus")]
    Claude3Opus,
    #[serde(rename = "claude-3-sonnet")]
    Claude3Sonnet,
    #[serde(rename = "claude-3-haiku")]
    Claude3Haiku,
    #[serde(rename = "gemini-pro")]
    GeminiPro,
    #[serde(rename = "gemini-flash")]
    GeminiFlash,
    #[serde(rename = "llama-3.1-8b")]
    Llama31_8b,
    #[serde(rename = "llama-3.1-70b")]
    Llama31_70b,
}

impl ModelName {
    pub const ALL: [ModelName; 10] = [
        Self::Gpt4o,
        Self::Gpt4oMini,
        Self::Gpt35Turbo,
        Self::Claude3Opus,
        Self::Claude3Sonnet,
        Self::Claude3Haiku,
        Self::GeminiPro,
        Self::GeminiFlash,
        Self::Llama31_8b,
        Self::Llama31_70b,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gpt4o => "gpt-4o",
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Gpt35Turbo => "gpt-3.5-turbo",
            Self::Claude3Opus => "claude-3-opus",
            Self::Claude3Sonnet => "claude-3-sonnet",
            Self::Claude3Haiku => "claude-3-haiku",
            Self::GeminiPro => "gemini-pro",
            Self::GeminiFlash => "gemini-flash",
            Self::Llama31_8b => "llama-3.1-8b",
            Self::Llama31_70b => "llama-3.1-70b",
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested tone of the model's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Casual,
    Creative,
    Technical,
}

impl Tone {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Casual => "casual",
            Self::Creative => "creative",
            Self::Technical => "technical",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested depth of the model's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Detailed,
}

impl Complexity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Detailed => "detailed",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latency preference for model recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Fast,
    #[default]
    Balanced,
    Quality,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Stage Outputs
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of intent classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentAnalysis {
    pub intent_category: IntentCategory,
    pub tags: Vec<String>,
    pub confidence: f64,
}

/// A concrete model choice with its justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecommendation {
    pub model_name: ModelName,
    pub provider: Provider,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    pub performance_score: f64,
}

/// A prompt together with the transformations that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptGeneration {
    pub raw_prompt: String,
    pub optimized_prompt: String,
    pub improvements: Vec<String>,
    pub estimated_tokens: usize,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Execution
// ═══════════════════════════════════════════════════════════════════════════════

/// A single model invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmRequest {
    pub model: ModelName,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl LlmRequest {
    pub fn new(model: ModelName, prompt: impl Into<String>) -> Self {
        Self {
            model,
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
        }
    }
}

/// Estimated token accounting for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Output of a model invocation. `latency` is in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    pub model: ModelName,
    pub latency: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Interaction History
// ═══════════════════════════════════════════════════════════════════════════════

/// Optional context recorded alongside an interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
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
    pub model_provider: Option<Provider>,
}

/// A completed interaction to be appended to the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionLog {
    pub user_id: String,
    pub model: ModelName,
    pub prompt: String,
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InteractionMetadata>,
}

/// An interaction as returned by the history store.
///
/// `model` is kept as the stored string so that aggregation counts exactly
/// what the store holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredInteraction {
    pub id: Uuid,
    pub user_id: String,
    pub model: String,
    pub prompt: String,
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InteractionMetadata>,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate usage for a single user, recomputed on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageAnalytics {
    pub total_interactions: usize,
    pub model_usage: BTreeMap<String, u64>,
    pub intent_distribution: BTreeMap<String, u64>,
    pub last_interaction: Option<DateTime<Utc>>,
}

/// Rough token estimate: one token per four characters, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_category_index_matches_all() {
        for (i, category) in IntentCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_value(IntentCategory::QuestionAnswering).unwrap(),
            "question_answering"
        );
        assert_eq!(serde_json::to_value(ModelName::Llama31_70b).unwrap(), "llama-3.1-70b");
        assert_eq!(serde_json::to_value(Provider::OpenAi).unwrap(), "openai");

        for model in ModelName::ALL {
            let json = serde_json::to_value(model).unwrap();
            assert_eq!(json, model.as_str());
        }
    }

    #[test]
    fn test_unknown_model_rejected() {
        let parsed: Result<ModelName, _> = serde_json::from_str("\"gpt-5\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("héllo"), 2);
    }

    #[test]
    fn test_recommendation_omits_missing_cost() {
        let rec = ModelRecommendation {
            model_name: ModelName::Gpt4o,
            provider: Provider::OpenAi,
            reasoning: "r".into(),
            estimated_cost: None,
            performance_score: 0.9,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("estimatedCost").is_none());
        assert_eq!(json["modelName"], "gpt-4o");
    }

    #[test]
    fn test_empty_analytics_serializes_null_last_interaction() {
        let json = serde_json::to_value(UsageAnalytics::default()).unwrap();
        assert_eq!(json["totalInteractions"], 0);
        assert!(json["lastInteraction"].is_null());
        assert_eq!(json["modelUsage"], serde_json::json!({}));
    }
}
