//! Mock Recommendation Generator
//!
//! For testing and demo purposes. Derives one corrective trade per
//! actionable analysis line, deterministically: the instrument is the
//! largest existing holding of the class (falling back to a static
//! table), the trade amount is the line's delta value, and the direction
//! follows the deviation sign.

use std::sync::atomic::{AtomicUsize, Ordering};

use advisor_core::{
    error::{GeneratorError, Result},
    generator::{Generation, GeneratorInfo, RecommendationGenerator, UsageStats},
    request::{DraftAction, DraftPlan, GeneratorRequest},
    types::{AssetClass, TradeDirection},
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Mock generator with deterministic output
pub struct MockGenerator {
    /// Fail every call (for exercising transport-failure paths)
    fail: bool,

    /// Number of `generate` invocations served
    calls: AtomicUsize,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a generator that fails every call
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of successful `generate` invocations so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Default instrument per class when the portfolio holds nothing in it
    fn fallback_instrument(class: AssetClass) -> (&'static str, Decimal) {
        match class {
            AssetClass::Stock => ("VTI", dec!(280)),
            AssetClass::Crypto => ("BTC", dec!(97500)),
            AssetClass::Metal => ("GLD", dec!(245)),
        }
    }

    fn action_for(request: &GeneratorRequest, class: AssetClass) -> Option<DraftAction> {
        let line = request
            .lines
            .iter()
            .find(|l| l.asset_class == class && l.rebalancing_needed)?;

        let direction = if line.deviation > Decimal::ZERO {
            TradeDirection::Sell
        } else {
            TradeDirection::Buy
        };
        let amount = line.delta_value.abs();

        let held = request
            .holdings_of(class)
            .filter(|h| h.unit_price > Decimal::ZERO)
            .max_by_key(|h| h.market_value);
        let (symbol, unit_price) = match held {
            Some(h) => (h.symbol.clone(), h.unit_price),
            None => {
                let (symbol, price) = Self::fallback_instrument(class);
                (symbol.to_string(), price)
            }
        };

        let quantity = (amount / unit_price).round_dp(8);
        // Recompute after rounding so quantity * price reconciles exactly
        let estimated_value = quantity * unit_price;

        let rationale = format!(
            "{} ${:.2} of {} to move {} from {:.1}% toward the {:.1}% target",
            direction, amount, symbol, class, line.current_percentage, line.target_percentage,
        );
        let timing_hint = match direction {
            TradeDirection::Sell => "Execute first to free up cash for the buys".to_string(),
            TradeDirection::Buy => "Execute after sell proceeds settle".to_string(),
        };

        Some(DraftAction {
            direction,
            asset_class: class,
            symbol,
            quantity,
            unit_price,
            estimated_value,
            rationale,
            timing_hint,
        })
    }
}

#[async_trait]
impl RecommendationGenerator for MockGenerator {
    async fn info(&self) -> Result<GeneratorInfo> {
        Ok(GeneratorInfo {
            name: "MockGenerator".into(),
            model: None,
            version: Some(env!("CARGO_PKG_VERSION").into()),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail)
    }

    async fn generate(&self, request: &GeneratorRequest) -> Result<Generation> {
        if self.fail {
            return Err(GeneratorError::Unavailable(
                "mock generator configured to fail".into(),
            ));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);

        let actions: Vec<DraftAction> = AssetClass::ALL
            .iter()
            .filter_map(|&class| Self::action_for(request, class))
            .collect();

        let largest_deviation = request
            .actionable_lines()
            .map(|l| l.deviation.abs())
            .max()
            .unwrap_or(Decimal::ZERO);

        let summary = format!(
            "Rebalance {} asset class(es) toward the {} model with {} trade(s)",
            actions.len(),
            request.model_name,
            actions.len(),
        );
        let improvement_estimate = format!(
            "Largest class deviation shrinks from {largest_deviation:.1}% to near zero",
        );
        let risk_assessment = if largest_deviation >= dec!(10) {
            "Material drift from target; correcting it reduces concentration risk".to_string()
        } else {
            "Moderate drift from target; correction is low-risk at current sizes".to_string()
        };
        let implementation_notes =
            "Sells free up cash before buys; review each transaction draft before creating it"
                .to_string();

        let usage = UsageStats::new(self.estimate_tokens(request), actions.len() as u32 * 48);

        Ok(Generation {
            draft: DraftPlan {
                summary,
                actions,
                improvement_estimate,
                risk_assessment,
                implementation_notes,
            },
            usage,
        })
    }
}
