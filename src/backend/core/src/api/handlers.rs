//! API request handlers.
//!
//! Every pipeline stage is a separate procedure. Handlers return
//! `Result<impl IntoResponse, CheatoError>`; request bodies are decoded and
//! validated by [`ValidatedJson`] before a handler body runs.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::auth::AuthenticatedUser;
use super::{ApiResponse, AppState};
use crate::error::CheatoError;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::types::{
    Complexity, IntentCategory, InteractionLog, InteractionMetadata, LlmRequest, ModelName, Speed,
    Tone,
};
use crate::validation::{
    validate_field, validate_request, Min, Range, Validate, ValidatedJson, ValidatedQuery,
    ValidationResult, MAX_TEXT_CHARS, TEXT_LENGTH,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Request Types
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeIntentRequest {
    pub text: String,
}

impl Validate for AnalyzeIntentRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(validate_field("text", &self.text).rule(TEXT_LENGTH))
            .result()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendModelRequest {
    pub intent_category: IntentCategory,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub speed: Option<Speed>,
}

impl Validate for RecommendModelRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(validate_field("budget", &self.budget).rule(Min(0.0_f64)))
            .result()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePromptRequest {
    pub model: ModelName,
    pub intent: IntentCategory,
    pub user_input: String,
}

impl Validate for GeneratePromptRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(validate_field("userInput", &self.user_input).rule(TEXT_LENGTH))
            .result()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefinePromptRequest {
    pub prompt: String,
    pub tone: Tone,
    pub complexity: Complexity,
}

impl Validate for RefinePromptRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(validate_field("prompt", &self.prompt).rule(TEXT_LENGTH))
            .result()
    }
}

impl Validate for LlmRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(validate_field("temperature", &self.temperature).rule(Range::new(0.0_f64, 2.0)))
            .result()
    }
}

/// An interaction to log; the owner comes from the `x-user-id` header.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogHistoryRequest {
    pub model: ModelName,
    pub prompt: String,
    pub result: String,
    #[serde(default)]
    pub metadata: Option<InteractionMetadata>,
}

impl LogHistoryRequest {
    fn into_log(self, user_id: String) -> InteractionLog {
        InteractionLog {
            user_id,
            model: self.model,
            prompt: self.prompt,
            result: self.result,
            metadata: self.metadata,
        }
    }
}

impl Validate for LogHistoryRequest {
    fn validate(&self) -> ValidationResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

impl HistoryQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_HISTORY_LIMIT)
    }
}

impl Validate for HistoryQuery {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(
                validate_field("limit", &self.limit)
                    .rule(Range::new(1, crate::history::MAX_HISTORY_LIMIT)),
            )
            .result()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Service Endpoints
// ═══════════════════════════════════════════════════════════════════════════════

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": state.version,
        "environment": state.environment.as_str(),
    }))
}

pub async fn api_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "Cheato API",
        "version": state.version,
        "description": "Modern AI workflow automation API for prompt engineering and model selection",
        "endpoints": {
            "health": "/health",
            "metrics": "/metrics",
            "intent": "/api/v1/intent/analyze",
            "model": "/api/v1/model/recommend",
            "prompt": ["/api/v1/prompt/generate", "/api/v1/prompt/refine"],
            "run": ["/api/v1/run", "/api/v1/run/batch"],
            "history": ["/api/v1/history", "/api/v1/history/analytics"],
        },
        "features": [
            "Intent Analysis",
            "Model Recommendation",
            "Prompt Generation & Refinement",
            "LLM Execution",
            "Interaction History",
        ],
        "limits": {
            "maxTextChars": MAX_TEXT_CHARS,
        },
    }))
}

pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub async fn route_not_found(uri: axum::http::Uri) -> CheatoError {
    CheatoError::route_not_found(uri.path())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Pipeline Stages
// ═══════════════════════════════════════════════════════════════════════════════

pub async fn analyze_intent(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AnalyzeIntentRequest>,
) -> Result<impl IntoResponse, CheatoError> {
    let analysis = state.classifier.classify(&req.text);
    Ok(Json(ApiResponse::success(analysis)))
}

pub async fn recommend_model(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RecommendModelRequest>,
) -> Result<impl IntoResponse, CheatoError> {
    let recommendation = state
        .recommender
        .recommend(req.intent_category, req.budget, req.speed);
    Ok(Json(ApiResponse::success(recommendation)))
}

pub async fn generate_prompt(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<GeneratePromptRequest>,
) -> Result<impl IntoResponse, CheatoError> {
    let generation = state
        .prompt_engineer
        .generate(req.model, req.intent, &req.user_input);
    Ok(Json(ApiResponse::success(generation)))
}

pub async fn refine_prompt(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefinePromptRequest>,
) -> Result<impl IntoResponse, CheatoError> {
    let refinement = state
        .prompt_engineer
        .refine(&req.prompt, req.tone, req.complexity);
    Ok(Json(ApiResponse::success(refinement)))
}

pub async fn run_llm(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LlmRequest>,
) -> Result<impl IntoResponse, CheatoError> {
    let response = state.dispatcher.execute(&req).await?;
    Ok(Json(ApiResponse::success(response)))
}

pub async fn run_llm_batch(
    State(state): State<AppState>,
    ValidatedJson(requests): ValidatedJson<Vec<LlmRequest>>,
) -> Result<impl IntoResponse, CheatoError> {
    let responses = state.dispatcher.execute_batch(&requests).await?;
    Ok(Json(ApiResponse::success(responses)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// History
// ═══════════════════════════════════════════════════════════════════════════════

#[instrument(skip(state, user, req), fields(user_id = %user.id()))]
pub async fn log_history(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(req): ValidatedJson<LogHistoryRequest>,
) -> Result<impl IntoResponse, CheatoError> {
    state.history.record(req.into_log(user.0)).await?;
    info!("Interaction accepted");
    Ok((StatusCode::CREATED, Json(ApiResponse::<()>::ok())))
}

pub async fn get_user_history(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedQuery(query): ValidatedQuery<HistoryQuery>,
) -> Result<impl IntoResponse, CheatoError> {
    let records = state.history.history(user.id(), query.limit()).await?;
    Ok(Json(ApiResponse::success(records)))
}

pub async fn get_analytics(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, CheatoError> {
    let analytics = state.history.analytics(user.id()).await?;
    Ok(Json(ApiResponse::success(analytics)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommend_request_rejects_negative_budget() {
        let req: RecommendModelRequest = serde_json::from_str(
            r#"{"intentCategory":"translation","budget":-0.5}"#,
        )
        .unwrap();
        assert!(!req.is_valid());

        let req: RecommendModelRequest =
            serde_json::from_str(r#"{"intentCategory":"translation","budget":0}"#).unwrap();
        assert!(req.is_valid());
    }

    #[test]
    fn test_generate_request_uses_camel_case() {
        let req: GeneratePromptRequest = serde_json::from_str(
            r#"{"model":"gpt-4o","intent":"code_generation","userInput":"sort a list"}"#,
        )
        .unwrap();
        assert_eq!(req.model, ModelName::Gpt4o);
        assert!(req.is_valid());
    }

    #[test]
    fn test_text_limits_are_char_based() {
        let at_limit = AnalyzeIntentRequest {
            text: "ü".repeat(MAX_TEXT_CHARS),
        };
        assert!(at_limit.is_valid());

        let over = RefinePromptRequest {
            prompt: "a".repeat(MAX_TEXT_CHARS + 1),
            tone: Tone::Casual,
            complexity: Complexity::Simple,
        };
        assert!(!over.is_valid());

        let empty = AnalyzeIntentRequest { text: String::new() };
        assert!(!empty.is_valid());
    }

    #[test]
    fn test_llm_request_temperature_range() {
        let mut req = LlmRequest::new(ModelName::GeminiPro, "hi");
        req.temperature = Some(2.5);
        assert!(!req.is_valid());
        req.temperature = Some(0.7);
        assert!(req.is_valid());
    }

    #[test]
    fn test_history_query_limit() {
        assert_eq!(HistoryQuery::default().limit(), DEFAULT_HISTORY_LIMIT);
        assert!(HistoryQuery { limit: Some(100) }.is_valid());
        assert!(!HistoryQuery { limit: Some(0) }.is_valid());
        assert!(!HistoryQuery { limit: Some(101) }.is_valid());
    }

    #[test]
    fn test_batch_errors_are_indexed() {
        let mut bad = LlmRequest::new(ModelName::Gpt4o, "x");
        bad.temperature = Some(-1.0);
        let batch = vec![LlmRequest::new(ModelName::Gpt4o, "ok"), bad];

        let errors = batch.validate().unwrap_err();
        assert!(errors.has_errors("[1].temperature"));
    }
}
