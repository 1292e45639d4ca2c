//! Observability: structured logging, optional OTLP tracing, Prometheus metrics.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use opentelemetry_otlp::WithExportConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Latency buckets in seconds, sized around the mock providers' delays.
const LLM_LATENCY_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 5.0];

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` overrides the configured level. Spans are exported over OTLP
/// when an endpoint is configured.
pub fn init(service_name: &str, config: &ObservabilityConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let telemetry_layer = match config.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(
                    opentelemetry_otlp::new_exporter()
                        .tonic()
                        .with_endpoint(endpoint),
                )
                .with_trace_config(
                    opentelemetry_sdk::trace::config()
                        .with_resource(opentelemetry_sdk::Resource::new(vec![
                            opentelemetry::KeyValue::new("service.name", service_name.to_string()),
                        ])),
                )
                .install_batch(opentelemetry_sdk::runtime::Tokio)?;
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    let json_layer = config
        .json_logging
        .then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!config.json_logging).then(|| tracing_subscriber::fmt::layer());

    tracing_subscriber::registry()
        .with(filter)
        .with(telemetry_layer)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    Ok(())
}

/// Shutdown OpenTelemetry.
pub fn shutdown() {
    opentelemetry::global::shutdown_tracer_provider();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Metrics
// ═══════════════════════════════════════════════════════════════════════════════

/// Install the global Prometheus recorder and describe every metric.
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("cheato_llm_latency_seconds".to_string()),
            LLM_LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    register_metric_descriptions();
    Ok(handle)
}

/// A handle backed by a recorder that is not installed globally.
///
/// Renders an empty exposition; used where no global recorder exists.
pub fn detached_metrics_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

/// Register all metric descriptions.
fn register_metric_descriptions() {
    describe_counter!("cheato_errors_total", "Errors raised, by code and category");
    describe_counter!("cheato_intent_total", "Intent classifications, by category");
    describe_counter!(
        "cheato_recommendations_total",
        "Model recommendations, by category and chosen model"
    );
    describe_counter!(
        "cheato_llm_requests_total",
        "LLM executions, by provider, model and status"
    );
    describe_histogram!(
        "cheato_llm_latency_seconds",
        "LLM execution latency in seconds"
    );
    describe_histogram!("cheato_batch_size", "Number of requests per batch execution");
    describe_counter!(
        "cheato_interactions_logged_total",
        "Interactions written to history, by model"
    );
}
