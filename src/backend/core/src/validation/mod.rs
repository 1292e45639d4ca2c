//! Request validation for the pipeline API.
//!
//! This module provides:
//!
//! - **Rules**: string length (counted in chars), numeric minimum and range
//! - **Validators**: the `Validate` trait plus field and request builders
//! - **Errors**: field-level errors keyed by path (`requests[0].prompt`)
//! - **Extractors**: `ValidatedJson` and `ValidatedQuery`, which decode and
//!   validate before a handler runs, so rejected input never reaches a stage
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cheato_core::validation::{validate_field, validate_request, LengthRange, Validate, ValidationResult};
//!
//! struct AnalyzeRequest {
//!     text: String,
//! }
//!
//! impl Validate for AnalyzeRequest {
//!     fn validate(&self) -> ValidationResult<()> {
//!         validate_request()
//!             .field(validate_field("text", &self.text).rule(LengthRange::new(1, 10_000)))
//!             .result()
//!     }
//! }
//! ```

pub mod error;
pub mod rules;
pub mod validator;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::{CheatoError, ErrorCode};

// ═══════════════════════════════════════════════════════════════════════════════
// Re-exports
// ═══════════════════════════════════════════════════════════════════════════════

pub use error::{FieldError, ValidationErrorKind, ValidationErrors, ValidationResult};
pub use rules::{LengthRange, Min, Range, ValidationRule};
pub use validator::{validate_field, validate_request, FieldValidator, RequestValidator, Validate};

/// Maximum accepted length, in chars, for free-text inputs.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Length rule shared by every free-text input.
pub const TEXT_LENGTH: LengthRange = LengthRange::new(1, MAX_TEXT_CHARS);

// ═══════════════════════════════════════════════════════════════════════════════
// Integration with Cheato Error System
// ═══════════════════════════════════════════════════════════════════════════════

impl From<ValidationErrors> for CheatoError {
    fn from(errors: ValidationErrors) -> Self {
        let message = if let Some((field, error)) = errors.first_error() {
            format!("Validation failed: {} - {}", field, error.message)
        } else {
            "Validation failed".to_string()
        };

        CheatoError::validation(message).with_context("field_errors", errors.to_message_map())
    }
}

fn json_rejection(rejection: JsonRejection) -> CheatoError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return CheatoError::new(ErrorCode::PayloadTooLarge, "Request body too large");
    }
    let mut errors = ValidationErrors::new();
    errors.add(
        "body",
        FieldError::with_message(ValidationErrorKind::MalformedBody, rejection.body_text()),
    );
    errors.into()
}

fn query_rejection(rejection: QueryRejection) -> CheatoError {
    let mut errors = ValidationErrors::new();
    errors.add(
        "query",
        FieldError::with_message(ValidationErrorKind::MalformedBody, rejection.body_text()),
    );
    errors.into()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Extractors
// ═══════════════════════════════════════════════════════════════════════════════

/// JSON body extractor that runs [`Validate`] before the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = CheatoError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string extractor that runs [`Validate`] before the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = CheatoError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(query_rejection)?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_to_cheato_error() {
        let mut errors = ValidationErrors::new();
        errors.add_error("text", ValidationErrorKind::MaxLength { max: 10_000, actual: 10_001 });

        let error: CheatoError = errors.into();
        assert_eq!(error.code(), ErrorCode::ValidationError);
        assert!(error.user_message().contains("text"));
        assert!(error.details().context.contains_key("field_errors"));
    }

    #[test]
    fn test_text_length_bounds() {
        assert!(TEXT_LENGTH.validate(&"a".repeat(MAX_TEXT_CHARS)).is_none());
        assert!(TEXT_LENGTH.validate(&"a".repeat(MAX_TEXT_CHARS + 1)).is_some());
        assert!(TEXT_LENGTH.validate(&String::new()).is_some());
    }
}
