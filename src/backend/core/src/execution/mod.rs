//! Model execution.
//!
//! The [`Dispatcher`] resolves a model to its provider, calls a
//! [`TextGenerator`] for that provider, times the call and estimates token
//! usage. Batches fan out concurrently and fail as a whole if any member
//! fails.

use async_trait::async_trait;
use futures::future::join_all;
use metrics::{counter, histogram};
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::{CheatoError, Result};
use crate::routing::provider_for;
use crate::types::{estimate_tokens, LlmRequest, LlmResponse, Provider, TokenUsage};

// ═══════════════════════════════════════════════════════════════════════════════
// Provider Capability
// ═══════════════════════════════════════════════════════════════════════════════

/// Optional generation parameters forwarded to a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl From<&LlmRequest> for GenerationOptions {
    fn from(request: &LlmRequest) -> Self {
        Self {
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

/// Failure reported by a provider.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Provider(String),

    #[error("provider {0} is not available")]
    Unavailable(Provider),
}

/// Produces text for a prompt on a given provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        provider: Provider,
        prompt: &str,
        options: &GenerationOptions,
    ) -> std::result::Result<String, GenerationError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Mock Generator
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-provider mock behavior: (min delay ms, jitter ms, label, body).
const fn mock_profile(provider: Provider) -> (u64, u64, &'static str, &'static str) {
    match provider {
        Provider::OpenAi => (
            500,
            1000,
            "[OpenAI Response]",
            "This is a mock response from OpenAI. The actual implementation would call the OpenAI API with proper authentication and parameters.",
        ),
        Provider::Anthropic => (
            400,
            800,
            "[Claude Response]",
            "This is a mock response from Anthropic's Claude. The actual implementation would call the Claude API with proper authentication and parameters.",
        ),
        Provider::Google => (
            300,
            600,
            "[Gemini Response]",
            "This is a mock response from Google's Gemini. The actual implementation would call the Gemini API with proper authentication and parameters.",
        ),
        Provider::Local => (
            200,
            400,
            "[Local Model Response]",
            "This is a mock response from a local model. The actual implementation would call a local LLM instance.",
        ),
    }
}

/// Number of prompt chars echoed back by the mock.
const ECHO_CHARS: usize = 100;

/// Canned responses after an artificial, provider-specific delay.
#[derive(Debug, Clone, Copy)]
pub struct MockGenerator {
    latency_scale: f64,
}

impl MockGenerator {
    /// `latency_scale` multiplies every delay; 0 disables sleeping.
    pub fn new(latency_scale: f64) -> Self {
        Self {
            latency_scale: latency_scale.max(0.0),
        }
    }

    fn delay(&self, provider: Provider) -> Duration {
        let (base, jitter, ..) = mock_profile(provider);
        let roll: f64 = rand::thread_rng().gen();
        let millis = (base as f64 + roll * jitter as f64) * self.latency_scale;
        Duration::from_secs_f64(millis / 1000.0)
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        provider: Provider,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> std::result::Result<String, GenerationError> {
        let delay = self.delay(provider);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let (_, _, label, body) = mock_profile(provider);
        let echo: String = prompt.chars().take(ECHO_CHARS).collect();
        Ok(format!("{} {}... {}", label, echo, body))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Dispatcher
// ═══════════════════════════════════════════════════════════════════════════════

/// Executes model requests against a [`TextGenerator`].
#[derive(Clone)]
pub struct Dispatcher {
    generator: Arc<dyn TextGenerator>,
}

impl Dispatcher {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Execute a single request.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn execute(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let started = Instant::now();

        let provider = provider_for(request.model).ok_or_else(|| CheatoError::unknown_model(request.model))?;
        let options = GenerationOptions::from(request);

        let outcome = self
            .generator
            .generate(provider, &request.prompt, &options)
            .await;
        let elapsed = started.elapsed();
        let latency = elapsed.as_millis() as u64;

        histogram!("cheato_llm_latency_seconds", "provider" => provider.as_str())
            .record(elapsed.as_secs_f64());

        match outcome {
            Ok(output) => {
                counter!(
                    "cheato_llm_requests_total",
                    "provider" => provider.as_str(),
                    "model" => request.model.as_str(),
                    "status" => "ok",
                )
                .increment(1);
                debug!(provider = %provider, latency_ms = latency, "LLM request completed");

                let usage = TokenUsage {
                    prompt_tokens: estimate_tokens(&request.prompt),
                    completion_tokens: estimate_tokens(&output),
                    total_tokens: estimate_tokens(&format!("{}{}", request.prompt, output)),
                };

                Ok(LlmResponse {
                    output,
                    usage: Some(usage),
                    model: request.model,
                    latency,
                })
            }
            Err(cause) => {
                counter!(
                    "cheato_llm_requests_total",
                    "provider" => provider.as_str(),
                    "model" => request.model.as_str(),
                    "status" => "error",
                )
                .increment(1);
                warn!(provider = %provider, latency_ms = latency, error = %cause, "LLM request failed");

                Err(CheatoError::provider_execution_failed(latency, &cause).with_source(cause))
            }
        }
    }

    /// Execute every request concurrently.
    ///
    /// All members run to completion. If any failed, the lowest failing index
    /// is reported and successful results are discarded.
    #[instrument(skip(self, requests), fields(batch_size = requests.len()))]
    pub async fn execute_batch(&self, requests: &[LlmRequest]) -> Result<Vec<LlmResponse>> {
        histogram!("cheato_batch_size").record(requests.len() as f64);

        let settled = join_all(requests.iter().map(|request| self.execute(request))).await;

        settled
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| {
                outcome.map_err(|cause| CheatoError::batch_execution_failed(index, &cause))
            })
            .collect()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Arc::new(MockGenerator::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::ModelName;

    /// Fails any prompt containing "fail".
    struct FlakyGenerator;

    #[async_trait]
    impl TextGenerator for FlakyGenerator {
        async fn generate(
            &self,
            _provider: Provider,
            prompt: &str,
            _options: &GenerationOptions,
        ) -> std::result::Result<String, GenerationError> {
            if prompt.contains("fail") {
                Err(GenerationError::Provider(format!("rejected: {}", prompt)))
            } else {
                Ok(format!("echo {}", prompt))
            }
        }
    }

    fn instant_dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(MockGenerator::new(0.0)))
    }

    #[tokio::test]
    async fn test_execute_mock_output_and_usage() {
        let request = LlmRequest::new(ModelName::Claude3Haiku, "Summarize the plot of Hamlet");
        let response = instant_dispatcher().execute(&request).await.unwrap();

        assert!(response.output.starts_with("[Claude Response] Summarize the plot of Hamlet..."));
        assert_eq!(response.model, ModelName::Claude3Haiku);

        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, estimate_tokens(&request.prompt));
        assert_eq!(usage.completion_tokens, estimate_tokens(&response.output));
        assert_eq!(
            usage.total_tokens,
            estimate_tokens(&format!("{}{}", request.prompt, response.output))
        );
    }

    #[tokio::test]
    async fn test_mock_echo_is_truncated() {
        let prompt = "é".repeat(250);
        let request = LlmRequest::new(ModelName::Llama31_8b, prompt);
        let response = instant_dispatcher().execute(&request).await.unwrap();

        let expected = format!("[Local Model Response] {}...", "é".repeat(100));
        assert!(response.output.starts_with(&expected));
    }

    #[tokio::test]
    async fn test_each_provider_label() {
        let dispatcher = instant_dispatcher();
        let cases = [
            (ModelName::Gpt4o, "[OpenAI Response]"),
            (ModelName::Claude3Opus, "[Claude Response]"),
            (ModelName::GeminiFlash, "[Gemini Response]"),
            (ModelName::Llama31_70b, "[Local Model Response]"),
        ];
        for (model, label) in cases {
            let response = dispatcher.execute(&LlmRequest::new(model, "hi")).await.unwrap();
            assert!(response.output.starts_with(label), "{}", model);
        }
    }

    #[tokio::test]
    async fn test_mock_delay_is_applied() {
        let dispatcher = Dispatcher::new(Arc::new(MockGenerator::new(0.01)));
        let response = dispatcher
            .execute(&LlmRequest::new(ModelName::Llama31_8b, "hi"))
            .await
            .unwrap();
        // local: at least 200ms * 0.01
        assert!(response.latency >= 2);
    }

    #[tokio::test]
    async fn test_provider_failure_is_wrapped_with_latency() {
        let dispatcher = Dispatcher::new(Arc::new(FlakyGenerator));
        let error = dispatcher
            .execute(&LlmRequest::new(ModelName::Gpt4o, "please fail"))
            .await
            .unwrap_err();

        assert_eq!(error.code(), ErrorCode::ProviderExecutionFailed);
        assert!(error.user_message().starts_with("LLM execution failed after "));
        assert!(error.user_message().ends_with("ms: rejected: please fail"));
        assert!(error.details().context.contains_key("latency_ms"));
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let dispatcher = Dispatcher::new(Arc::new(FlakyGenerator));
        let requests: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|p| LlmRequest::new(ModelName::GeminiPro, *p))
            .collect();

        let responses = dispatcher.execute_batch(&requests).await.unwrap();
        let outputs: Vec<_> = responses.iter().map(|r| r.output.as_str()).collect();
        assert_eq!(outputs, vec!["echo a", "echo b", "echo c"]);
    }

    #[tokio::test]
    async fn test_batch_fails_as_a_whole_with_lowest_index() {
        let dispatcher = Dispatcher::new(Arc::new(FlakyGenerator));
        let requests = vec![
            LlmRequest::new(ModelName::Gpt4o, "ok"),
            LlmRequest::new(ModelName::Gpt4o, "fail one"),
            LlmRequest::new(ModelName::Gpt4o, "fail two"),
        ];

        let error = dispatcher.execute_batch(&requests).await.unwrap_err();
        assert_eq!(error.code(), ErrorCode::BatchExecutionFailed);
        assert!(error.user_message().starts_with("Batch request 1 failed: LLM execution failed after "));
        assert!(error.user_message().ends_with("rejected: fail one"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let responses = instant_dispatcher().execute_batch(&[]).await.unwrap();
        assert!(responses.is_empty());
    }
}
