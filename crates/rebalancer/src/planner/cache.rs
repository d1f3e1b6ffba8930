//! Keyed Plan Cache
//!
//! Explicit store owned by the planner instance, keyed by target-model
//! identity. The outer map lock is held only while looking up or
//! inserting a slot; each slot has its own mutex which the planner holds
//! across generation, giving at most one in-flight generation per key
//! while different keys proceed fully in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::model::{RebalancingAnalysis, RecommendationPlan};

/// Cache key: model name plus the exact target triple
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PlanKey(String);

impl PlanKey {
    /// Derive the key from an analysis. Custom models with different
    /// triples hash to different keys even though they share a name.
    pub(crate) fn from_analysis(analysis: &RebalancingAnalysis) -> Self {
        let mut key = analysis.model_name.clone();
        for line in &analysis.lines {
            key.push(':');
            key.push_str(&line.target_percentage.normalize().to_string());
        }
        Self(key)
    }
}

impl std::fmt::Display for PlanKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A completed generation with its timestamp
#[derive(Clone, Debug)]
pub(crate) struct CachedPlan {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) plan: RecommendationPlan,
}

pub(crate) type PlanSlot = Arc<Mutex<Option<CachedPlan>>>;

/// Keyed plan cache with TTL expiry
pub struct PlanCache {
    ttl: Duration,
    slots: Mutex<HashMap<PlanKey, PlanSlot>>,
}

impl Default for PlanCache {
    fn default() -> Self {
        Self::new(Duration::minutes(5))
    }
}

impl PlanCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch or create the slot for a key. Only the map lock is taken;
    /// the returned slot is locked by the caller.
    pub(crate) async fn slot(&self, key: &PlanKey) -> PlanSlot {
        let mut slots = self.slots.lock().await;
        slots.entry(key.clone()).or_default().clone()
    }

    pub(crate) fn is_fresh(&self, entry: &CachedPlan) -> bool {
        Utc::now().signed_duration_since(entry.generated_at) < self.ttl
    }

    /// Drop every cached entry
    pub async fn clear(&self) {
        self.slots.lock().await.clear();
    }
}
