//! V1 API routes.

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::{handlers, AppState};

/// V1 API prefix.
pub const V1_PREFIX: &str = "/api/v1";

/// Build the V1 API router.
///
/// # Endpoints
///
/// ## Pipeline stages
/// - `POST /api/v1/intent/analyze` - Classify free text
/// - `POST /api/v1/model/recommend` - Recommend a model for an intent
/// - `POST /api/v1/prompt/generate` - Build a model-ready prompt
/// - `POST /api/v1/prompt/refine` - Apply tone and complexity refinements
/// - `POST /api/v1/run` - Execute one request
/// - `POST /api/v1/run/batch` - Execute requests concurrently
///
/// ## History (requires `x-user-id`)
/// - `POST /api/v1/history` - Log an interaction
/// - `GET /api/v1/history?limit=N` - Recent interactions, newest first
/// - `GET /api/v1/history/analytics` - Usage summary
pub fn v1_router() -> Router<AppState> {
    Router::new()
        .route("/intent/analyze", post(handlers::analyze_intent))
        .route("/model/recommend", post(handlers::recommend_model))
        .route("/prompt/generate", post(handlers::generate_prompt))
        .route("/prompt/refine", post(handlers::refine_prompt))
        .route("/run", post(handlers::run_llm))
        .route("/run/batch", post(handlers::run_llm_batch))
        .route(
            "/history",
            post(handlers::log_history).get(handlers::get_user_history),
        )
        .route("/history/analytics", get(handlers::get_analytics))
}

/// V1 API route constants for use in clients and documentation.
pub mod paths {
    pub const INTENT_ANALYZE: &str = "/api/v1/intent/analyze";
    pub const MODEL_RECOMMEND: &str = "/api/v1/model/recommend";
    pub const PROMPT_GENERATE: &str = "/api/v1/prompt/generate";
    pub const PROMPT_REFINE: &str = "/api/v1/prompt/refine";
    pub const RUN: &str = "/api/v1/run";
    pub const RUN_BATCH: &str = "/api/v1/run/batch";
    pub const HISTORY: &str = "/api/v1/history";
    pub const HISTORY_ANALYTICS: &str = "/api/v1/history/analytics";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_constants() {
        for path in [
            paths::INTENT_ANALYZE,
            paths::MODEL_RECOMMEND,
            paths::PROMPT_GENERATE,
            paths::PROMPT_REFINE,
            paths::RUN,
            paths::RUN_BATCH,
            paths::HISTORY,
            paths::HISTORY_ANALYTICS,
        ] {
            assert!(path.starts_with(V1_PREFIX));
        }
    }
}
