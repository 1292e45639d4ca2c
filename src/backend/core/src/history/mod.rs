//! Interaction history.
//!
//! [`HistoryRecorder`] appends completed interactions to an
//! [`InteractionStore`] and derives per-user analytics from what the store
//! returns. Analytics are recomputed on every call.

use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::error::{CheatoError, Result};
use crate::types::{InteractionLog, StoredInteraction, UsageAnalytics};

/// Default number of records returned by a history query.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Largest accepted history limit.
pub const MAX_HISTORY_LIMIT: usize = 100;

/// Intent key used when a record carries no intent category.
pub const UNKNOWN_INTENT: &str = "unknown";

// ═══════════════════════════════════════════════════════════════════════════════
// Store Abstraction
// ═══════════════════════════════════════════════════════════════════════════════

/// Append-only storage for interactions.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Persist `log`, assigning its id and timestamp.
    async fn insert(&self, log: &InteractionLog) -> Result<StoredInteraction>;

    /// Records for `user_id`, newest first, at most `limit` when given.
    async fn list_for_user(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<StoredInteraction>>;
}

/// Process-local store used in tests and when no database is configured.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<StoredInteraction>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl InteractionStore for InMemoryStore {
    async fn insert(&self, log: &InteractionLog) -> Result<StoredInteraction> {
        let stored = StoredInteraction {
            id: Uuid::new_v4(),
            user_id: log.user_id.clone(),
            model: log.model.as_str().to_string(),
            prompt: log.prompt.clone(),
            result: log.result.clone(),
            metadata: log.metadata.clone(),
            timestamp: Utc::now(),
        };
        self.records.write().push(stored.clone());
        Ok(stored)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<StoredInteraction>> {
        let records = self.records.read();
        // Later appends first, then a stable sort so equal timestamps keep that order
        let mut matching: Vec<StoredInteraction> = records
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        drop(records);

        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Recorder
// ═══════════════════════════════════════════════════════════════════════════════

/// Records interactions and reports usage.
#[derive(Clone)]
pub struct HistoryRecorder {
    store: Arc<dyn InteractionStore>,
}

impl HistoryRecorder {
    pub fn new(store: Arc<dyn InteractionStore>) -> Self {
        Self { store }
    }

    /// Append one interaction.
    #[instrument(skip(self, log), fields(user_id = %log.user_id, model = %log.model))]
    pub async fn record(&self, log: InteractionLog) -> Result<()> {
        let stored = self.store.insert(&log).await.map_err(|e| {
            error!(error = %e, "Failed to log interaction");
            CheatoError::store("Failed to log interaction", e)
        })?;

        counter!("cheato_interactions_logged_total", "model" => log.model.as_str()).increment(1);
        info!(interaction_id = %stored.id, "Interaction logged");
        Ok(())
    }

    /// A user's most recent interactions, newest first.
    #[instrument(skip(self))]
    pub async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<StoredInteraction>> {
        self.store
            .list_for_user(user_id, Some(limit))
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch user history");
                CheatoError::store("Failed to fetch user history", e)
            })
    }

    /// Usage summary over all of a user's interactions.
    #[instrument(skip(self))]
    pub async fn analytics(&self, user_id: &str) -> Result<UsageAnalytics> {
        let records = self.store.list_for_user(user_id, None).await.map_err(|e| {
            error!(error = %e, "Failed to fetch analytics");
            CheatoError::store("Failed to fetch analytics", e)
        })?;

        Ok(summarize(&records))
    }
}

/// Aggregate records into usage analytics.
pub fn summarize(records: &[StoredInteraction]) -> UsageAnalytics {
    let mut model_usage: BTreeMap<String, u64> = BTreeMap::new();
    let mut intent_distribution: BTreeMap<String, u64> = BTreeMap::new();

    for record in records {
        *model_usage.entry(record.model.clone()).or_default() += 1;

        let intent = record
            .metadata
            .as_ref()
            .and_then(|m| m.intent_category)
            .map(|c| c.as_str())
            .unwrap_or(UNKNOWN_INTENT);
        *intent_distribution.entry(intent.to_string()).or_default() += 1;
    }

    UsageAnalytics {
        total_interactions: records.len(),
        model_usage,
        intent_distribution,
        last_interaction: records.iter().map(|r| r.timestamp).max(),
    }
}
