//! Shared Asset Vocabulary
//!
//! The closed set of asset classes the advisor allocates across, and the
//! trade directions a recommendation can carry. Both appear verbatim in
//! the generator wire format and in planner output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset class tag. Fixed, closed set; no dynamic extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    Stock,
    Crypto,
    Metal,
}

impl AssetClass {
    /// Fixed reporting order: STOCK, CRYPTO, METAL.
    pub const ALL: [AssetClass; 3] = [AssetClass::Stock, AssetClass::Crypto, AssetClass::Metal];

    /// Position within the fixed order, used as a stable tie-breaker.
    pub fn order(self) -> usize {
        match self {
            AssetClass::Stock => 0,
            AssetClass::Crypto => 1,
            AssetClass::Metal => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssetClass::Stock => "STOCK",
            AssetClass::Crypto => "CRYPTO",
            AssetClass::Metal => "METAL",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction of a recommended trade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl TradeDirection {
    pub fn label(self) -> &'static str {
        match self {
            TradeDirection::Buy => "BUY",
            TradeDirection::Sell => "SELL",
        }
    }

    /// The opposite direction.
    pub fn inverse(self) -> Self {
        match self {
            TradeDirection::Buy => TradeDirection::Sell,
            TradeDirection::Sell => TradeDirection::Buy,
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
