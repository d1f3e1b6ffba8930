//! Recommendation Generator Strategy Pattern
//!
//! Defines a common interface for all recommendation backends (HTTP
//! service, local model, deterministic mock) so the planner can work
//! with any of them without code changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use advisor_core::RecommendationGenerator;
//!
//! let generator = HttpGenerator::from_env();
//! let generation = generator.generate(&request).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::request::{DraftPlan, GeneratorRequest};

/// Resource usage reported by a generator invocation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl UsageStats {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// A draft plan plus the resources spent producing it
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Generation {
    pub draft: DraftPlan,
    pub usage: UsageStats,
}

/// Generator metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratorInfo {
    /// Backend name (e.g., "HttpGenerator", "MockGenerator")
    pub name: String,

    /// Underlying model identifier, if the backend exposes one
    pub model: Option<String>,

    /// Backend version, if known
    pub version: Option<String>,
}

/// Strategy trait for recommendation generators
///
/// Implement this trait to add a new backend. The planner works
/// exclusively through this interface and validates every draft it
/// receives; implementations are free to be as smart or as dumb as they
/// like.
#[async_trait]
pub trait RecommendationGenerator: Send + Sync {
    /// Get backend metadata
    async fn info(&self) -> Result<GeneratorInfo>;

    /// Check if the backend is reachable and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Produce a draft rebalancing plan for the given request
    async fn generate(&self, request: &GeneratorRequest) -> Result<Generation>;

    /// Estimate token count for a request payload (backend-specific)
    fn estimate_tokens(&self, request: &GeneratorRequest) -> u32 {
        // Default: rough estimate of ~4 chars per token over the JSON form
        serde_json::to_string(request)
            .map(|s| (s.len() / 4) as u32)
            .unwrap_or(0)
    }
}
