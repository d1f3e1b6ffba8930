//! # rebalancer
//!
//! Allocation analysis and trade planning against target allocation
//! models, across the three asset classes STOCK, CRYPTO, and METAL.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  HoldingsSnapshot + AllocationModel                              │
//! │        │                                                         │
//! │        ▼                                                         │
//! │  ┌───────────────────┐   rebalancing_required                    │
//! │  │ AllocationAnalyzer│ ───────────────┐                          │
//! │  │ (pure, no state)  │                ▼                          │
//! │  └───────────────────┘   ┌────────────────────────┐   ┌───────┐  │
//! │                          │ RecommendationPlanner  │──▶│ cache │  │
//! │                          │ validate / rank /      │   └───────┘  │
//! │                          │ project                │              │
//! │                          └───────────┬────────────┘              │
//! │                                      ▼                           │
//! │                        RecommendationGenerator (external)        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The analyzer is a pure function of its inputs. The planner owns the
//! only mutable state (the keyed plan cache) and never trusts the
//! external generator: every draft is validated against the analyzer's
//! own numbers before it becomes a plan.
//!
//! ## Example: drifted moderate portfolio
//!
//! ```text
//! Allocation vs 'moderate' (total $10000.00)
//!   STOCK   50.00% ->  60.00% (dev  -10.00%, Underweight)
//!   CRYPTO  35.00% ->  25.00% (dev  +10.00%, Overweight)
//!   METAL   15.00% ->  15.00% (dev   +0.00%, Balanced)
//! Rebalancing required: 2 trade(s), est. costs $9.90
//! ```

pub mod analyzer;
pub mod error;
pub mod model;
pub mod planner;
pub mod policy;

pub use advisor_core::{AssetClass, TradeDirection, UsageStats};
pub use analyzer::AllocationAnalyzer;
pub use error::{RebalanceError, Result};
pub use model::{
    AllocationModel, AllocationStatus, AssetAllocationLine, ExpectedAllocation, HoldingDetail,
    HoldingsSnapshot, PlanPriority, RebalancingAnalysis, RecommendationAction,
    RecommendationPlan, TransactionDraft,
};
pub use planner::{PlanCache, RecommendationPlanner};
pub use policy::{FeeSchedule, FlatFeeSchedule, ProportionalFeeSchedule, ThresholdPolicy};

/// Directive framing every request sent to the recommendation generator
pub const PLANNER_DIRECTIVE: &str = r#"You are a portfolio rebalancing advisor. A portfolio has drifted from its target allocation model across three asset classes: STOCK, CRYPTO, and METAL.

## Task

Propose the smallest set of trades that brings the portfolio back toward its target percentages.

1. Only touch asset classes marked as needing rebalancing
2. SELL overweight classes, BUY underweight classes - never the reverse
3. Size each trade to the class's delta value; do not overshoot the target
4. Prefer instruments already held; quantity x unit price must equal the trade value
5. Explain each trade's rationale and suggest execution timing

Respond with a draft plan: a summary, one action per corrective trade, an improvement estimate, a risk assessment, and implementation notes."#;
