// Telemetry module for structured logging and metrics

use anyhow::Result;
use metrics::{counter, describe_counter};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize structured logging with JSON formatting
///
/// Log levels come from the environment (`RUST_LOG`) or fall back to the
/// configured level.
pub fn init_logging(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_target(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::info!(log_level = log_level, "Structured logging initialized");
    Ok(())
}

/// Register metric descriptions with whichever recorder the embedding
/// application installs
pub fn describe_metrics() {
    describe_counter!(
        "notification_schedule_success_total",
        "Reminders whose notification pair was fully queued"
    );
    describe_counter!(
        "notification_schedule_failed_total",
        "Reminders whose notification pair could not be queued"
    );
    describe_counter!(
        "document_saved_total",
        "Records persisted to the document store"
    );
}

/// Record a fully queued notification pair
#[inline]
pub fn record_schedule_success() {
    counter!("notification_schedule_success_total").increment(1);
}

/// Record a scheduling failure with its cause
#[inline]
pub fn record_schedule_failure(reason: &'static str) {
    counter!("notification_schedule_failed_total", "reason" => reason).increment(1);
}

/// Record a persisted document
#[inline]
pub fn record_document_saved(collection: &'static str) {
    counter!("document_saved_total", "collection" => collection).increment(1);
}
