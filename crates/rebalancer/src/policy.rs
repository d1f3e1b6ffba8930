//! Threshold & Fee Policies
//!
//! Injected policy objects for deviation bands, minimum trade size, plan
//! urgency, and broker fee schedules. Nothing in the analyzer or planner
//! hardcodes these numbers, so callers can swap broker schedules and
//! tests can exercise boundary behavior precisely.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{AllocationStatus, PlanPriority};

/// Symmetric deviation bands and trade floors
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    /// Below this absolute deviation a class is balanced (percentage points)
    pub balanced_band: Decimal,

    /// At or above this absolute deviation rebalancing triggers
    pub trigger_band: Decimal,

    /// Trades below this absolute currency amount are not worth executing
    pub min_trade_value: Decimal,

    /// Largest deviation at or above this maps to HIGH plan priority
    pub high_priority_deviation: Decimal,

    /// Largest deviation at or above this maps to MEDIUM plan priority
    pub medium_priority_deviation: Decimal,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            balanced_band: dec!(1),
            trigger_band: dec!(5),
            min_trade_value: dec!(100),
            high_priority_deviation: dec!(10),
            medium_priority_deviation: dec!(5),
        }
    }
}

impl ThresholdPolicy {
    /// Classify a signed deviation into a status band
    pub fn classify(&self, deviation: Decimal) -> AllocationStatus {
        let magnitude = deviation.abs();
        if magnitude < self.balanced_band {
            AllocationStatus::Balanced
        } else if magnitude < self.trigger_band {
            if deviation > Decimal::ZERO {
                AllocationStatus::SlightlyOverweight
            } else {
                AllocationStatus::SlightlyUnderweight
            }
        } else if deviation > Decimal::ZERO {
            AllocationStatus::Overweight
        } else {
            AllocationStatus::Underweight
        }
    }

    /// Map a portfolio's largest deviation to a plan urgency tier
    pub fn plan_priority(&self, largest_deviation: Decimal) -> PlanPriority {
        let magnitude = largest_deviation.abs();
        if magnitude >= self.high_priority_deviation {
            PlanPriority::High
        } else if magnitude >= self.medium_priority_deviation {
            PlanPriority::Medium
        } else {
            PlanPriority::Low
        }
    }
}

/// Broker fee schedule (Strategy pattern)
///
/// Implement this for each broker: flat per-trade commissions,
/// proportional fees, tiered schedules, etc.
pub trait FeeSchedule: Send + Sync {
    /// Estimate total fees for trading `traded_value` across `trades` orders
    fn estimate(&self, traded_value: Decimal, trades: usize) -> Decimal;
}

/// Fixed commission per trade
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlatFeeSchedule {
    pub per_trade: Decimal,
}

impl Default for FlatFeeSchedule {
    fn default() -> Self {
        Self {
            per_trade: dec!(4.95),
        }
    }
}

impl FlatFeeSchedule {
    pub fn new(per_trade: Decimal) -> Self {
        Self { per_trade }
    }
}

impl FeeSchedule for FlatFeeSchedule {
    fn estimate(&self, _traded_value: Decimal, trades: usize) -> Decimal {
        self.per_trade * Decimal::from(trades)
    }
}

/// Percentage of traded value, with a per-trade minimum
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProportionalFeeSchedule {
    /// Fee rate (e.g., 0.0025 = 0.25%)
    pub rate: Decimal,

    /// Minimum fee per trade
    pub minimum: Decimal,
}

impl Default for ProportionalFeeSchedule {
    fn default() -> Self {
        Self {
            rate: dec!(0.0025),
            minimum: dec!(1),
        }
    }
}

impl ProportionalFeeSchedule {
    pub fn new(rate: Decimal, minimum: Decimal) -> Self {
        Self { rate, minimum }
    }
}

impl FeeSchedule for ProportionalFeeSchedule {
    fn estimate(&self, traded_value: Decimal, trades: usize) -> Decimal {
        let proportional = traded_value.abs() * self.rate;
        let floor = self.minimum * Decimal::from(trades);
        proportional.max(floor)
    }
}
