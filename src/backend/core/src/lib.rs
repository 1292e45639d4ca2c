#![allow(clippy::result_large_err)]
//! # Cheato Core
//!
//! An LLM workflow pipeline exposed as independent HTTP procedures.
//!
//! ## Architecture
//!
//! - **Intent Classifier**: ordered keyword rules over free text
//! - **Model Recommender**: static per-intent table with budget and speed overrides
//! - **Prompt Engineer**: intent templates plus tone and complexity refinements
//! - **Execution Dispatcher**: provider resolution, single and concurrent batch execution
//! - **History Recorder**: append-only interaction log and per-user analytics
//! - **Observability**: structured logging, optional OTLP export, Prometheus metrics
//! - **Validation**: request validation run by extractors before any stage

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod execution;
pub mod history;
pub mod intent;
pub mod middleware;
pub mod observability;
pub mod prompt;
pub mod routing;
pub mod types;
pub mod validation;

pub use error::{CheatoError, ErrorCode, ErrorContext, ErrorDetails, ErrorSeverity, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{create_router, AppState, AuthenticatedUser};
    pub use crate::error::{CheatoError, ErrorCode, ErrorContext, Result};
    pub use crate::execution::{Dispatcher, MockGenerator, TextGenerator};
    pub use crate::history::{HistoryRecorder, InMemoryStore, InteractionStore};
    pub use crate::intent::IntentClassifier;
    pub use crate::prompt::PromptEngineer;
    pub use crate::routing::ModelRecommender;
    pub use crate::types::*;
    pub use crate::validation::{Validate, ValidatedJson, ValidationErrors};
}
