//! Error handling for Cheato Core.
//!
//! This module provides:
//! - A single error type carrying a machine-readable code
//! - HTTP status code mapping for API responses
//! - User-facing messages kept apart from internal detail
//! - Severity-based logging and an error counter metric
//!
//! # Usage
//!
//! ```rust,ignore
//! use cheato_core::error::{CheatoError, Result, ErrorContext};
//!
//! fn load() -> Result<String> {
//!     std::fs::read_to_string("prompt.txt").context("Failed to read prompt")
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{error, warn};

/// A specialized Result type for Cheato operations.
pub type Result<T> = std::result::Result<T, CheatoError>;

/// Whether internal error detail is returned to API callers.
///
/// Off unless the server runs in development mode.
static EXPOSE_INTERNAL_DETAILS: AtomicBool = AtomicBool::new(false);

/// Enable or disable internal error detail in API responses.
pub fn expose_internal_details(enabled: bool) {
    EXPOSE_INTERNAL_DETAILS.store(enabled, Ordering::Relaxed);
}

fn internal_details_exposed() -> bool {
    EXPOSE_INTERNAL_DETAILS.load(Ordering::Relaxed)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Request Errors (4000-4099)
    ValidationError,
    Unauthorized,
    NotFound,
    PayloadTooLarge,

    // Execution Errors (3000-3099)
    UnknownModel,
    ProviderExecutionFailed,
    BatchExecutionFailed,

    // Persistence Errors (2000-2099)
    StoreError,
    SerializationError,

    // Configuration Errors (5000-5099)
    ConfigurationError,

    // Internal Errors (9000-9099)
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub const fn numeric_code(&self) -> u32 {
        match self {
            Self::ValidationError => 4000,
            Self::Unauthorized => 4001,
            Self::NotFound => 4004,
            Self::PayloadTooLarge => 4013,

            Self::UnknownModel => 3000,
            Self::ProviderExecutionFailed => 3001,
            Self::BatchExecutionFailed => 3002,

            Self::StoreError => 2000,
            Self::SerializationError => 2001,

            Self::ConfigurationError => 5000,

            Self::InternalError => 9000,
        }
    }

    /// Get the HTTP status code for this error.
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::ValidationError | Self::UnknownModel => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ProviderExecutionFailed | Self::BatchExecutionFailed => StatusCode::BAD_GATEWAY,
            Self::StoreError
            | Self::SerializationError
            | Self::ConfigurationError
            | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire name, as serialized in responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::UnknownModel => "UNKNOWN_MODEL",
            Self::ProviderExecutionFailed => "PROVIDER_EXECUTION_FAILED",
            Self::BatchExecutionFailed => "BATCH_EXECUTION_FAILED",
            Self::StoreError => "STORE_ERROR",
            Self::SerializationError => "SERIALIZATION_ERROR",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Codes whose message and details are withheld from callers in production.
    pub const fn is_confidential(&self) -> bool {
        matches!(
            self,
            Self::StoreError
                | Self::SerializationError
                | Self::ConfigurationError
                | Self::InternalError
        )
    }

    /// Get the error category for grouping.
    pub const fn category(&self) -> &'static str {
        match self.numeric_code() {
            2000..=2099 => "persistence",
            3000..=3099 => "execution",
            4000..=4099 => "request",
            5000..=5099 => "configuration",
            _ => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Severity
// ═══════════════════════════════════════════════════════════════════════════════

/// Severity level for errors (affects logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Caller errors (bad input, missing identity)
    Low,
    /// Upstream failures (provider errors)
    Medium,
    /// System errors (store failures, bugs)
    High,
}

impl ErrorSeverity {
    pub const fn from_code(code: &ErrorCode) -> Self {
        match code {
            ErrorCode::ValidationError
            | ErrorCode::Unauthorized
            | ErrorCode::NotFound
            | ErrorCode::PayloadTooLarge
            | ErrorCode::UnknownModel => Self::Low,

            ErrorCode::ProviderExecutionFailed | ErrorCode::BatchExecutionFailed => Self::Medium,

            ErrorCode::StoreError
            | ErrorCode::SerializationError
            | ErrorCode::ConfigurationError
            | ErrorCode::InternalError => Self::High,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Details
// ═══════════════════════════════════════════════════════════════════════════════

/// Additional structured details about an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl ErrorDetails {
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main Error Type
// ═══════════════════════════════════════════════════════════════════════════════

/// The main error type for Cheato Core.
#[derive(Error, Debug)]
pub struct CheatoError {
    /// Machine-readable error code
    code: ErrorCode,

    /// User-friendly error message (safe to expose to clients)
    user_message: Cow<'static, str>,

    /// Detailed internal message (development responses and logs only)
    internal_message: Option<String>,

    details: ErrorDetails,

    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl fmt::Display for CheatoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.user_message)?;
        if let Some(ref internal) = self.internal_message {
            write!(f, " (internal: {})", internal)?;
        }
        Ok(())
    }
}

impl CheatoError {
    // ─────────────────────────────────────────────────────────────────────────
    // Constructors
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new error with code and user message.
    pub fn new(code: ErrorCode, user_message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            user_message: user_message.into(),
            internal_message: None,
            details: ErrorDetails::default(),
            source: None,
        }
    }

    /// Create an error with both user and internal messages.
    pub fn with_internal(
        code: ErrorCode,
        user_message: impl Into<Cow<'static, str>>,
        internal_message: impl Into<String>,
    ) -> Self {
        let mut error = Self::new(code, user_message);
        error.internal_message = Some(internal_message.into());
        error
    }

    /// Create an internal error (500).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_internal(ErrorCode::InternalError, "An internal error occurred", message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create a route-not-found error.
    pub fn route_not_found(path: impl fmt::Display) -> Self {
        Self::new(ErrorCode::NotFound, format!("Route {} not found", path))
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigurationError, message.into())
    }

    /// A model that has no entry in the provider table.
    pub fn unknown_model(model: impl fmt::Display) -> Self {
        let model = model.to_string();
        Self::new(ErrorCode::UnknownModel, format!("Unknown model: {}", model))
            .with_context("model", &model)
    }

    /// A provider call failed; `latency_ms` is the time spent before failing.
    pub fn provider_execution_failed(latency_ms: u64, cause: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ProviderExecutionFailed,
            format!("LLM execution failed after {}ms: {}", latency_ms, cause),
        )
        .with_context("latency_ms", latency_ms)
    }

    /// A batch member failed, failing the whole batch. The member's latency,
    /// when known, is carried over.
    pub fn batch_execution_failed(index: usize, cause: &CheatoError) -> Self {
        let mut error = Self::new(
            ErrorCode::BatchExecutionFailed,
            format!("Batch request {} failed: {}", index, cause.user_message()),
        )
        .with_context("index", index);
        if let Some(latency) = cause.details.context.get("latency_ms") {
            error.details.context.insert("latency_ms".to_string(), latency.clone());
        }
        error
    }

    /// A store operation failed. `operation` is the generic, caller-visible
    /// message; the underlying cause is kept internal.
    pub fn store(operation: &'static str, cause: impl fmt::Display) -> Self {
        Self::with_internal(ErrorCode::StoreError, operation, cause.to_string())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Add context to details.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.details.context.insert(key.into(), v);
        }
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn internal_message(&self) -> Option<&str> {
        self.internal_message.as_deref()
    }

    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::from_code(&self.code)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    /// Log this error with appropriate severity and count it.
    pub fn log(&self) {
        self.record_metrics();

        let code = self.code.as_str();
        let category = self.code.category();
        let status = self.http_status().as_u16();

        match self.severity() {
            ErrorSeverity::High => {
                error!(
                    error_code = %code,
                    category = category,
                    http_status = status,
                    user_message = %self.user_message,
                    internal_message = ?self.internal_message,
                    source = ?self.source,
                    "High severity error"
                );
            }
            ErrorSeverity::Medium => {
                warn!(
                    error_code = %code,
                    category = category,
                    http_status = status,
                    user_message = %self.user_message,
                    "Medium severity error"
                );
            }
            ErrorSeverity::Low => {
                tracing::debug!(
                    error_code = %code,
                    category = category,
                    http_status = status,
                    user_message = %self.user_message,
                    "Low severity error"
                );
            }
        }
    }

    fn record_metrics(&self) {
        counter!(
            "cheato_errors_total",
            "code" => self.code.as_str(),
            "category" => self.code.category().to_string(),
        )
        .increment(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// API Response
// ═══════════════════════════════════════════════════════════════════════════════

/// Error response for API clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false for errors
    pub success: bool,
    pub error: ErrorInfo,
}

/// Detailed error information for API responses.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub numeric_code: u32,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,

    /// Internal detail, only populated in development mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal: Option<String>,

    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorResponse {
    /// Build the response body. With `expose_internal` off, confidential
    /// failures are reduced to a generic message without details.
    pub fn build(error: &CheatoError, expose_internal: bool) -> Self {
        let redact = error.code.is_confidential() && !expose_internal;
        let message = if redact {
            "Something went wrong".to_string()
        } else {
            error.user_message.to_string()
        };

        Self {
            success: false,
            error: ErrorInfo {
                code: error.code,
                numeric_code: error.code.numeric_code(),
                message,
                details: if error.details.is_empty() || redact {
                    None
                } else {
                    Some(error.details.clone())
                },
                internal: if expose_internal {
                    error.internal_message.clone()
                } else {
                    None
                },
                timestamp: chrono::Utc::now(),
            },
        }
    }
}

impl From<&CheatoError> for ErrorResponse {
    fn from(error: &CheatoError) -> Self {
        Self::build(error, internal_details_exposed())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Axum Integration
// ═══════════════════════════════════════════════════════════════════════════════

impl IntoResponse for CheatoError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.http_status();
        let response = ErrorResponse::from(&self);

        (status, Json(response)).into_response()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Context Extension Trait
// ═══════════════════════════════════════════════════════════════════════════════

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Wrap the error as an internal error with the given message.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Wrap the error with a specific code.
    fn with_error_code(self, code: ErrorCode) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| CheatoError::internal(message.into()).with_source(e))
    }

    fn with_error_code(self, code: ErrorCode) -> Result<T> {
        self.map_err(|e| CheatoError::new(code, e.to_string()).with_source(e))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// From Implementations for Common Error Types
// ═══════════════════════════════════════════════════════════════════════════════

impl From<sqlx::Error> for CheatoError {
    fn from(error: sqlx::Error) -> Self {
        Self::with_internal(ErrorCode::StoreError, "A database error occurred", error.to_string())
            .with_source(error)
    }
}

impl From<serde_json::Error> for CheatoError {
    fn from(error: serde_json::Error) -> Self {
        Self::with_internal(
            ErrorCode::SerializationError,
            "Failed to process JSON data",
            error.to_string(),
        )
        .with_source(error)
    }
}

impl From<std::io::Error> for CheatoError {
    fn from(error: std::io::Error) -> Self {
        Self::with_internal(ErrorCode::InternalError, "An I/O error occurred", error.to_string())
            .with_source(error)
    }
}

impl From<anyhow::Error> for CheatoError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<CheatoError>() {
            Ok(cheato_error) => cheato_error,
            Err(error) => Self::with_internal(
                ErrorCode::InternalError,
                "An internal error occurred",
                error.to_string(),
            ),
        }
    }
}

impl From<config::ConfigError> for CheatoError {
    fn from(error: config::ConfigError) -> Self {
        let user_msg = match &error {
            config::ConfigError::NotFound(_) => "Required configuration not found",
            config::ConfigError::PathParse(_) | config::ConfigError::FileParse { .. } => {
                "Configuration file is invalid"
            }
            _ => "Configuration error occurred",
        };

        Self::with_internal(ErrorCode::ConfigurationError, user_msg, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(
            ErrorCode::ValidationError.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorCode::Unauthorized.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::ProviderExecutionFailed.http_status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorCode::StoreError.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_provider_failure_keeps_latency() {
        let error = CheatoError::provider_execution_failed(1234, "connection reset");
        assert_eq!(error.code(), ErrorCode::ProviderExecutionFailed);
        assert_eq!(
            error.user_message(),
            "LLM execution failed after 1234ms: connection reset"
        );
        assert_eq!(error.details().context["latency_ms"], 1234);
    }

    #[test]
    fn test_batch_failure_message() {
        let cause = CheatoError::provider_execution_failed(5, "boom");
        let error = CheatoError::batch_execution_failed(2, &cause);
        assert_eq!(
            error.user_message(),
            "Batch request 2 failed: LLM execution failed after 5ms: boom"
        );
    }

    #[test]
    fn test_production_response_hides_internal_detail() {
        let error = CheatoError::store("Failed to log interaction", "relation does not exist");

        let prod = ErrorResponse::build(&error, false);
        assert_eq!(prod.error.message, "Something went wrong");
        assert!(prod.error.internal.is_none());

        let dev = ErrorResponse::build(&error, true);
        assert_eq!(dev.error.message, "Failed to log interaction");
        assert_eq!(dev.error.internal.as_deref(), Some("relation does not exist"));
    }

    #[test]
    fn test_upstream_failures_keep_latency_and_index_in_production() {
        let cause = CheatoError::provider_execution_failed(812, "upstream 503");
        let error = CheatoError::batch_execution_failed(1, &cause);

        let prod = ErrorResponse::build(&error, false);
        assert_eq!(
            prod.error.message,
            "Batch request 1 failed: LLM execution failed after 812ms: upstream 503"
        );
        let details = prod.error.details.unwrap();
        assert_eq!(details.context["index"], 1);
        assert_eq!(details.context["latency_ms"], 812);

        let prod = ErrorResponse::build(&cause, false);
        assert_eq!(prod.error.details.unwrap().context["latency_ms"], 812);
    }

    #[test]
    fn test_wrapped_error_counted_once_when_logged() {
        use metrics_exporter_prometheus::PrometheusBuilder;

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            let cause = CheatoError::provider_execution_failed(3, "boom");
            let error = CheatoError::batch_execution_failed(0, &cause);
            error.log();
        });

        let rendered = handle.render();
        let counted: Vec<&str> = rendered
            .lines()
            .filter(|line| line.starts_with("cheato_errors_total{"))
            .collect();
        assert_eq!(counted.len(), 1, "{}", rendered);
        assert!(counted[0].contains(r#"code="BATCH_EXECUTION_FAILED""#));
        assert!(counted[0].ends_with(" 1"));
    }

    #[test]
    fn test_code_display_uses_wire_name() {
        for code in [
            ErrorCode::ValidationError,
            ErrorCode::BatchExecutionFailed,
            ErrorCode::InternalError,
        ] {
            let wire = serde_json::to_value(code).unwrap();
            assert_eq!(wire, code.to_string());
        }
    }

    #[test]
    fn test_client_errors_keep_message_in_production() {
        let error = CheatoError::unauthorized("User ID required");
        let prod = ErrorResponse::build(&error, false);
        assert_eq!(prod.error.message, "User ID required");
        assert_eq!(prod.error.numeric_code, 4001);
    }

    #[test]
    fn test_error_response_serialization() {
        let error = CheatoError::validation("text must be at most 10000 characters");
        let json = serde_json::to_string(&ErrorResponse::build(&error, false)).unwrap();
        assert!(json.contains("VALIDATION_ERROR"));
        assert!(json.contains("numericCode"));
    }

    #[test]
    fn test_error_display() {
        let error = CheatoError::with_internal(
            ErrorCode::StoreError,
            "Failed to fetch analytics",
            "Connection refused: localhost:5432",
        );

        let display = format!("{}", error);
        assert!(display.contains("[STORE_ERROR]"));
        assert!(display.contains("Failed to fetch analytics"));
        assert!(display.contains("Connection refused"));
    }

    #[test]
    fn test_severity() {
        assert_eq!(ErrorSeverity::from_code(&ErrorCode::ValidationError), ErrorSeverity::Low);
        assert_eq!(
            ErrorSeverity::from_code(&ErrorCode::BatchExecutionFailed),
            ErrorSeverity::Medium
        );
        assert_eq!(ErrorSeverity::from_code(&ErrorCode::StoreError), ErrorSeverity::High);
    }
}
