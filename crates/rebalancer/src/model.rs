//! Domain Models
//!
//! Core data types for allocation analysis and rebalancing plans.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use advisor_core::{AssetClass, TradeDirection, UsageStats};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RebalanceError, Result};

/// Tolerance for the model-percentage sum invariant
fn model_sum_epsilon() -> Decimal {
    dec!(0.000001)
}

/// Tolerance for holdings class values vs the portfolio total
fn holdings_epsilon() -> Decimal {
    dec!(0.01)
}

/// A target allocation across the three asset classes
///
/// Invariant: each percentage is in `[0, 100]` and the triple sums to
/// exactly 100 within a small epsilon. Built-in models are process-wide
/// constants; custom models must pass [`AllocationModel::validate`]
/// before use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationModel {
    /// Model name ("moderate", "aggressive", "conservative", "custom")
    pub name: String,

    /// Target stock percentage, 0-100
    pub stocks_pct: Decimal,

    /// Target crypto percentage, 0-100
    pub crypto_pct: Decimal,

    /// Target metals percentage, 0-100
    pub metals_pct: Decimal,
}

impl AllocationModel {
    /// Balanced growth: 60% stocks, 25% crypto, 15% metals
    pub fn moderate() -> Self {
        Self {
            name: "moderate".into(),
            stocks_pct: dec!(60),
            crypto_pct: dec!(25),
            metals_pct: dec!(15),
        }
    }

    /// Higher risk for higher potential returns: 40/50/10
    pub fn aggressive() -> Self {
        Self {
            name: "aggressive".into(),
            stocks_pct: dec!(40),
            crypto_pct: dec!(50),
            metals_pct: dec!(10),
        }
    }

    /// Capital preservation: 50/10/40
    pub fn conservative() -> Self {
        Self {
            name: "conservative".into(),
            stocks_pct: dec!(50),
            crypto_pct: dec!(10),
            metals_pct: dec!(40),
        }
    }

    /// Resolve a built-in model by registry name
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "moderate" => Some(Self::moderate()),
            "aggressive" => Some(Self::aggressive()),
            "conservative" => Some(Self::conservative()),
            _ => None,
        }
    }

    /// Build a caller-supplied custom model, enforcing the invariant
    pub fn custom(stocks_pct: Decimal, crypto_pct: Decimal, metals_pct: Decimal) -> Result<Self> {
        let model = Self {
            name: "custom".into(),
            stocks_pct,
            crypto_pct,
            metals_pct,
        };
        model.validate()?;
        Ok(model)
    }

    /// Check the model invariant; violation is a caller error
    pub fn validate(&self) -> Result<()> {
        for (class, pct) in AssetClass::ALL.iter().zip([
            self.stocks_pct,
            self.crypto_pct,
            self.metals_pct,
        ]) {
            if pct < Decimal::ZERO || pct > dec!(100) {
                return Err(RebalanceError::InvalidModel(format!(
                    "{class} target {pct}% is outside [0, 100]"
                )));
            }
        }

        let sum = self.stocks_pct + self.crypto_pct + self.metals_pct;
        if (sum - dec!(100)).abs() > model_sum_epsilon() {
            return Err(RebalanceError::InvalidModel(format!(
                "targets sum to {sum}%, expected 100%"
            )));
        }
        Ok(())
    }

    /// Target percentage for one asset class
    pub fn target_for(&self, class: AssetClass) -> Decimal {
        match class {
            AssetClass::Stock => self.stocks_pct,
            AssetClass::Crypto => self.crypto_pct,
            AssetClass::Metal => self.metals_pct,
        }
    }

    /// Stable identity including the triple, for cache keying
    pub fn identity(&self) -> String {
        format!(
            "{}:{}/{}/{}",
            self.name,
            self.stocks_pct.normalize(),
            self.crypto_pct.normalize(),
            self.metals_pct.normalize()
        )
    }
}

/// Caller-supplied snapshot of current holdings, valued in base currency
///
/// Class values may sum to less than the total (cash remainder) but
/// never more, beyond rounding tolerance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    /// Total portfolio value, non-negative
    pub total_value: Decimal,

    /// Current market value held in stocks
    pub stocks_value: Decimal,

    /// Current market value held in crypto
    pub crypto_value: Decimal,

    /// Current market value held in metals
    pub metals_value: Decimal,
}

impl HoldingsSnapshot {
    pub fn new(
        total_value: Decimal,
        stocks_value: Decimal,
        crypto_value: Decimal,
        metals_value: Decimal,
    ) -> Self {
        Self {
            total_value,
            stocks_value,
            crypto_value,
            metals_value,
        }
    }

    /// Current market value of one asset class
    pub fn value_of(&self, class: AssetClass) -> Decimal {
        match class {
            AssetClass::Stock => self.stocks_value,
            AssetClass::Crypto => self.crypto_value,
            AssetClass::Metal => self.metals_value,
        }
    }

    /// Sum of the per-class values
    pub fn class_sum(&self) -> Decimal {
        self.stocks_value + self.crypto_value + self.metals_value
    }

    /// Check non-negativity and consistency with the total
    pub fn validate(&self) -> Result<()> {
        if self.total_value < Decimal::ZERO {
            return Err(RebalanceError::InvalidHoldings(format!(
                "total value {} is negative",
                self.total_value
            )));
        }
        for class in AssetClass::ALL {
            let value = self.value_of(class);
            if value < Decimal::ZERO {
                return Err(RebalanceError::InvalidHoldings(format!(
                    "{class} value {value} is negative"
                )));
            }
        }
        let sum = self.class_sum();
        if sum > self.total_value + holdings_epsilon() {
            return Err(RebalanceError::InvalidHoldings(format!(
                "class values sum to {sum}, exceeding total {}",
                self.total_value
            )));
        }
        Ok(())
    }
}

/// Per-symbol holding detail, supplied to the planner
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HoldingDetail {
    pub asset_class: AssetClass,

    /// Instrument symbol (e.g., "VTI", "BTC", "GLD")
    pub symbol: String,

    /// Quantity held, in asset-native units
    pub quantity: Decimal,

    /// Current price per unit
    pub unit_price: Decimal,

    /// Current market value (quantity * unit price)
    pub market_value: Decimal,
}

impl HoldingDetail {
    pub fn new(
        asset_class: AssetClass,
        symbol: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            asset_class,
            symbol: symbol.into().to_uppercase(),
            quantity,
            unit_price,
            market_value: quantity * unit_price,
        }
    }
}

/// Classification of one class's deviation from target
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationStatus {
    Balanced,
    SlightlyOverweight,
    SlightlyUnderweight,
    Overweight,
    Underweight,
}

impl AllocationStatus {
    pub fn is_overweight(self) -> bool {
        matches!(
            self,
            AllocationStatus::Overweight | AllocationStatus::SlightlyOverweight
        )
    }

    pub fn is_underweight(self) -> bool {
        matches!(
            self,
            AllocationStatus::Underweight | AllocationStatus::SlightlyUnderweight
        )
    }
}

/// One row of analysis output per asset class
///
/// Sign conventions: `deviation` and `delta_percentage` are positive
/// when the class is overweight; `delta_value` is positive when buying
/// is required (underweight). A caller can derive the trade direction
/// purely from sign.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetAllocationLine {
    pub asset_class: AssetClass,

    /// Current market value of the class
    pub current_value: Decimal,

    /// Current share of the portfolio, 0-100 (0 when the total is 0)
    pub current_percentage: Decimal,

    /// Target share from the model, 0-100
    pub target_percentage: Decimal,

    /// `current_percentage - target_percentage`, positive = overweight
    pub deviation: Decimal,

    pub status: AllocationStatus,

    /// True iff the deviation crossed the trigger band and the
    /// corrective trade clears the minimum trade floor
    pub rebalancing_needed: bool,

    /// Currency amount to buy (positive) or sell (negative) to reach target
    pub delta_value: Decimal,

    /// Same sign convention as `deviation`: positive = overweight
    pub delta_percentage: Decimal,
}

/// Aggregate allocation analysis for a portfolio
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RebalancingAnalysis {
    /// Total portfolio value in base currency
    pub total_value: Decimal,

    /// One line per asset class, in fixed order: STOCK, CRYPTO, METAL
    pub lines: Vec<AssetAllocationLine>,

    /// Name of the target model analyzed against
    pub model_name: String,

    /// True if any line needs rebalancing
    pub rebalancing_required: bool,

    /// Count of lines needing rebalancing
    pub total_trades_needed: usize,

    /// Policy-driven fee estimate for the corrective trades
    pub estimated_transaction_costs: Decimal,

    /// Maximum absolute deviation across lines
    pub largest_deviation: Decimal,

    /// Class with the largest positive deviation, if any line is overweight
    pub most_overweight: Option<AssetClass>,

    /// Class with the most negative deviation, if any line is underweight
    pub most_underweight: Option<AssetClass>,

    pub generated_at: DateTime<Utc>,
}

impl RebalancingAnalysis {
    /// The analysis line for one asset class
    pub fn line_for(&self, class: AssetClass) -> Option<&AssetAllocationLine> {
        self.lines.iter().find(|l| l.asset_class == class)
    }

    /// Render a compact text summary
    pub fn summary(&self) -> String {
        let mut s = format!(
            "Allocation vs '{}' (total ${:.2})\n",
            self.model_name, self.total_value
        );
        for line in &self.lines {
            s.push_str(&format!(
                "  {:<6} {:>6.2}% -> {:>6.2}% (dev {:>+7.2}%, {:?})\n",
                line.asset_class.label(),
                line.current_percentage,
                line.target_percentage,
                line.deviation,
                line.status,
            ));
        }
        if self.rebalancing_required {
            s.push_str(&format!(
                "Rebalancing required: {} trade(s), est. costs ${:.2}\n",
                self.total_trades_needed, self.estimated_transaction_costs
            ));
        } else {
            s.push_str("Portfolio is within tolerance\n");
        }
        s
    }
}

/// Plan urgency tier, derived from the largest deviation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanPriority {
    High,
    Medium,
    Low,
}

/// Downstream transaction payload attached to a recommended trade
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub direction: TradeDirection,
    pub symbol: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_value: Decimal,

    /// Base currency code
    pub currency: String,

    /// Free-text note for the created transaction
    pub note: String,
}

/// One concrete, validated trade recommendation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecommendationAction {
    pub direction: TradeDirection,
    pub asset_class: AssetClass,
    pub symbol: String,

    /// Quantity in asset-native units, non-negative
    pub quantity: Decimal,

    /// Price per unit assumed by the recommendation
    pub unit_price: Decimal,

    /// Expected total trade value
    pub estimated_value: Decimal,

    /// Rank, 1 = most urgent; contiguous across the plan
    pub priority: u32,

    pub rationale: String,
    pub timing_hint: String,

    /// Payload for downstream transaction creation
    pub transaction: TransactionDraft,
}

/// Expected post-trade share for one asset class
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpectedAllocation {
    pub asset_class: AssetClass,

    /// Projected share of the portfolio after all actions, 0-100
    pub percentage: Decimal,
}

/// Validated, ranked rebalancing plan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecommendationPlan {
    pub id: Uuid,

    /// Free-text summary of the plan
    pub summary: String,

    /// Overall urgency tier
    pub priority: PlanPriority,

    /// Actions ordered by priority rank ascending
    pub actions: Vec<RecommendationAction>,

    /// Projected post-trade percentages, in fixed class order
    pub expected_allocation: Vec<ExpectedAllocation>,

    /// Number of trades in the plan
    pub total_trades: usize,

    /// Policy-driven fee estimate for executing the plan
    pub estimated_cost: Decimal,

    pub improvement_estimate: String,
    pub risk_assessment: String,
    pub implementation_notes: String,

    pub generated_at: DateTime<Utc>,

    /// True when served from the plan cache
    pub cached: bool,

    /// Resource usage reported by the generator
    pub usage: UsageStats,
}
