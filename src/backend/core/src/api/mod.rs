//! HTTP API for the Cheato pipeline.
//!
//! Every stage of the pipeline is exposed as its own procedure under
//! `/api/v1`. The caller drives the order; nothing here chains stages.
//!
//! Unversioned endpoints:
//! - `GET /health` - liveness and build info
//! - `GET /api` - service description
//! - `GET /metrics` - Prometheus exposition

pub mod auth;
mod handlers;
pub mod v1;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::config::{Config, Environment};
use crate::execution::Dispatcher;
use crate::history::HistoryRecorder;
use crate::intent::IntentClassifier;
use crate::middleware::{
    RequestSizeConfig, RequestSizeLayer, SecurityHeadersConfig, SecurityHeadersLayer,
};
use crate::prompt::PromptEngineer;
use crate::routing::ModelRecommender;

pub use auth::{AuthenticatedUser, USER_ID_HEADER};
pub use handlers::{
    AnalyzeIntentRequest, GeneratePromptRequest, HistoryQuery, LogHistoryRequest,
    RecommendModelRequest, RefinePromptRequest,
};

/// Origins allowed outside production.
pub const DEV_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:3001"];

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub classifier: IntentClassifier,
    pub recommender: ModelRecommender,
    pub prompt_engineer: PromptEngineer,
    pub dispatcher: Dispatcher,
    pub history: HistoryRecorder,
    pub metrics: PrometheusHandle,
    pub environment: Environment,
    pub version: &'static str,
}

impl AppState {
    pub fn new(
        dispatcher: Dispatcher,
        history: HistoryRecorder,
        metrics: PrometheusHandle,
        environment: Environment,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            recommender: ModelRecommender::new(),
            prompt_engineer: PromptEngineer::new(),
            dispatcher,
            history,
            metrics,
            environment,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Build the API router.
pub fn create_router(state: AppState, config: &Config) -> Router {
    let body_limit = config.server.body_limit_bytes;

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api", get(handlers::api_info))
        .route("/metrics", get(handlers::prometheus_metrics))
        .nest(v1::V1_PREFIX, v1::v1_router())
        .fallback(handlers::route_not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestSizeLayer::new(RequestSizeConfig::with_limit(body_limit)))
        .layer(SecurityHeadersLayer::new(SecurityHeadersConfig::default()))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer(config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = match config.environment {
        Environment::Production => config
            .server
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect(),
        Environment::Development | Environment::Test => DEV_ORIGINS
            .into_iter()
            .map(HeaderValue::from_static)
            .collect(),
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .allow_credentials(true)
}

/// API response wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }

    /// Success with no payload.
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success("test data");
        assert!(response.success);
        assert_eq!(response.data, Some("test data"));
    }

    #[test]
    fn test_api_response_ok_has_no_data() {
        let json = serde_json::to_value(ApiResponse::<()>::ok()).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true }));
    }
}
