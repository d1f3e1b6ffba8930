//! # advisor-core
//!
//! Wire contract between the rebalancing core and the external
//! recommendation generator.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Rebalancing Planner                      │
//! │  ┌───────────────────┐       ┌───────────────────────────┐   │
//! │  │  GeneratorRequest │──────▶│  RecommendationGenerator  │   │
//! │  │  (analysis lines, │       │  (capability trait)       │   │
//! │  │   holdings)       │◀──────│  → DraftPlan + UsageStats │   │
//! │  └───────────────────┘       └───────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `RecommendationGenerator` trait enables swapping between an HTTP
//! backend, a local model, or a deterministic mock without changing
//! planner logic. The planner never trusts a draft verbatim — it
//! validates every action against its own analysis before accepting it.

pub mod error;
pub mod generator;
pub mod request;
pub mod types;

pub use error::{GeneratorError, Result};
pub use generator::{Generation, GeneratorInfo, RecommendationGenerator, UsageStats};
pub use request::{DraftAction, DraftPlan, GeneratorRequest, HoldingLine, RequestLine};
pub use types::{AssetClass, TradeDirection};
