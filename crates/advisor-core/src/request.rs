//! Generator Request & Draft Types
//!
//! Structured payloads exchanged with the recommendation generator. The
//! request carries the planner's own analysis plus per-symbol holding
//! detail; the draft that comes back is advisory only and is validated
//! by the planner before anything reaches a caller.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{AssetClass, TradeDirection};

/// Request sent to the recommendation generator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratorRequest {
    /// Unique request identifier, for correlation in backend logs
    pub request_id: Uuid,

    /// Instruction text framing the generator's task
    pub directive: String,

    /// Name of the target allocation model being rebalanced toward
    pub model_name: String,

    /// Total portfolio value in the base currency
    pub total_value: Decimal,

    /// Base currency code (e.g., "USD")
    pub currency: String,

    /// One analysis line per asset class, in fixed class order
    pub lines: Vec<RequestLine>,

    /// Per-symbol holding detail the generator may pick instruments from
    pub holdings: Vec<HoldingLine>,

    /// When the underlying analysis was generated
    pub analyzed_at: DateTime<Utc>,
}

impl GeneratorRequest {
    /// Lines that actually require a corrective trade.
    pub fn actionable_lines(&self) -> impl Iterator<Item = &RequestLine> {
        self.lines.iter().filter(|l| l.rebalancing_needed)
    }

    /// Holdings belonging to one asset class.
    pub fn holdings_of(&self, class: AssetClass) -> impl Iterator<Item = &HoldingLine> {
        self.holdings.iter().filter(move |h| h.asset_class == class)
    }
}

/// One asset-class row of the analysis, as shared with the generator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestLine {
    pub asset_class: AssetClass,

    /// Current market value of the class
    pub current_value: Decimal,

    /// Current share of the portfolio, 0-100
    pub current_percentage: Decimal,

    /// Target share of the portfolio, 0-100
    pub target_percentage: Decimal,

    /// Signed deviation, positive = overweight
    pub deviation: Decimal,

    /// Currency amount to buy (positive) or sell (negative) to reach target
    pub delta_value: Decimal,

    /// Whether this class crossed the rebalancing trigger
    pub rebalancing_needed: bool,
}

/// One held instrument
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HoldingLine {
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

/// Draft plan produced by the generator, pre-validation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DraftPlan {
    /// Free-text summary of the proposed rebalancing
    pub summary: String,

    /// Proposed trades, in no particular order
    pub actions: Vec<DraftAction>,

    /// Textual estimate of how much the plan improves the allocation
    pub improvement_estimate: String,

    /// Risk assessment prose
    pub risk_assessment: String,

    /// Execution guidance (ordering, timing, caveats)
    pub implementation_notes: String,
}

/// One proposed trade from the generator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DraftAction {
    pub direction: TradeDirection,
    pub asset_class: AssetClass,

    /// Instrument symbol to trade
    pub symbol: String,

    /// Quantity in asset-native units, non-negative
    pub quantity: Decimal,

    /// Assumed price per unit
    pub unit_price: Decimal,

    /// Expected total trade value; must reconcile with quantity * price
    pub estimated_value: Decimal,

    /// Why this trade
    pub rationale: String,

    /// When/how to execute (e.g., "limit order over the next session")
    pub timing_hint: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_request() -> GeneratorRequest {
        GeneratorRequest {
            request_id: Uuid::new_v4(),
            directive: "rebalance".into(),
            model_name: "moderate".into(),
            total_value: dec!(10000),
            currency: "USD".into(),
            lines: vec![
                RequestLine {
                    asset_class: AssetClass::Stock,
                    current_value: dec!(5000),
                    current_percentage: dec!(50),
                    target_percentage: dec!(60),
                    deviation: dec!(-10),
                    delta_value: dec!(1000),
                    rebalancing_needed: true,
                },
                RequestLine {
                    asset_class: AssetClass::Metal,
                    current_value: dec!(1500),
                    current_percentage: dec!(15),
                    target_percentage: dec!(15),
                    deviation: dec!(0),
                    delta_value: dec!(0),
                    rebalancing_needed: false,
                },
            ],
            holdings: vec![
                HoldingLine {
                    asset_class: AssetClass::Stock,
                    symbol: "VTI".into(),
                    quantity: dec!(17.8),
                    unit_price: dec!(280),
                    market_value: dec!(4984),
                },
                HoldingLine {
                    asset_class: AssetClass::Metal,
                    symbol: "GLD".into(),
                    quantity: dec!(6.1),
                    unit_price: dec!(245),
                    market_value: dec!(1494.5),
                },
            ],
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn test_actionable_lines() {
        let request = sample_request();
        let actionable: Vec<_> = request.actionable_lines().collect();
        assert_eq!(actionable.len(), 1);
        assert_eq!(actionable[0].asset_class, AssetClass::Stock);
    }

    #[test]
    fn test_holdings_of_class() {
        let request = sample_request();
        let metals: Vec<_> = request.holdings_of(AssetClass::Metal).collect();
        assert_eq!(metals.len(), 1);
        assert_eq!(metals[0].symbol, "GLD");
    }
}
