//! Allocation Analyzer
//!
//! Computes per-class deviation from a target model and the
//! portfolio-level rebalancing verdict. Pure function of its inputs: no
//! external calls, no shared state, safe to run from any number of
//! concurrent callers.

use std::sync::Arc;

use advisor_core::AssetClass;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::Result;
use crate::model::{AllocationModel, AssetAllocationLine, HoldingsSnapshot, RebalancingAnalysis};
use crate::policy::{FeeSchedule, FlatFeeSchedule, ThresholdPolicy};

/// Analyzer over injected threshold and fee policies
pub struct AllocationAnalyzer {
    thresholds: ThresholdPolicy,
    fees: Arc<dyn FeeSchedule>,
}

impl AllocationAnalyzer {
    pub fn new(thresholds: ThresholdPolicy, fees: Arc<dyn FeeSchedule>) -> Self {
        Self { thresholds, fees }
    }

    /// Analyzer with default thresholds and a flat fee schedule
    pub fn with_defaults() -> Self {
        Self::new(
            ThresholdPolicy::default(),
            Arc::new(FlatFeeSchedule::default()),
        )
    }

    pub fn thresholds(&self) -> &ThresholdPolicy {
        &self.thresholds
    }

    /// Compare current holdings against a target model.
    ///
    /// Fails with `InvalidModel` or `InvalidHoldings` on precondition
    /// violations; never clamps or renormalizes inputs.
    pub fn analyze(
        &self,
        holdings: &HoldingsSnapshot,
        model: &AllocationModel,
    ) -> Result<RebalancingAnalysis> {
        model.validate()?;
        holdings.validate()?;

        let total = holdings.total_value;
        let mut lines = Vec::with_capacity(AssetClass::ALL.len());

        for class in AssetClass::ALL {
            let current_value = holdings.value_of(class);
            // Explicit zero guard: an empty portfolio has 0% everywhere
            let current_percentage = if total > Decimal::ZERO {
                current_value / total * dec!(100)
            } else {
                Decimal::ZERO
            };
            let target_percentage = model.target_for(class);
            let deviation = current_percentage - target_percentage;
            let delta_value = target_percentage / dec!(100) * total - current_value;

            let rebalancing_needed = deviation.abs() >= self.thresholds.trigger_band
                && delta_value.abs() >= self.thresholds.min_trade_value;

            lines.push(AssetAllocationLine {
                asset_class: class,
                current_value,
                current_percentage,
                target_percentage,
                deviation,
                status: self.thresholds.classify(deviation),
                rebalancing_needed,
                delta_value,
                delta_percentage: deviation,
            });
        }

        let total_trades_needed = lines.iter().filter(|l| l.rebalancing_needed).count();
        let rebalancing_required = total_trades_needed > 0;

        let largest_deviation = lines
            .iter()
            .map(|l| l.deviation.abs())
            .max()
            .unwrap_or(Decimal::ZERO);

        let most_overweight = lines
            .iter()
            .filter(|l| l.deviation > Decimal::ZERO)
            .max_by_key(|l| l.deviation)
            .map(|l| l.asset_class);
        let most_underweight = lines
            .iter()
            .filter(|l| l.deviation < Decimal::ZERO)
            .min_by_key(|l| l.deviation)
            .map(|l| l.asset_class);

        let corrective_volume: Decimal = lines
            .iter()
            .filter(|l| l.rebalancing_needed)
            .map(|l| l.delta_value.abs())
            .sum();
        let estimated_transaction_costs = if rebalancing_required {
            self.fees.estimate(corrective_volume, total_trades_needed)
        } else {
            Decimal::ZERO
        };

        tracing::debug!(
            model = %model.name,
            required = rebalancing_required,
            trades = total_trades_needed,
            "analyzed allocation"
        );

        Ok(RebalancingAnalysis {
            total_value: total,
            lines,
            model_name: model.name.clone(),
            rebalancing_required,
            total_trades_needed,
            estimated_transaction_costs,
            largest_deviation,
            most_overweight,
            most_underweight,
            generated_at: Utc::now(),
        })
    }
}
