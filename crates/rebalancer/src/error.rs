//! Error Types for the Rebalancing Core

use advisor_core::GeneratorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RebalanceError>;

#[derive(Error, Debug)]
pub enum RebalanceError {
    /// Model percentages out of range or not summing to 100
    #[error("Invalid allocation model: {0}")]
    InvalidModel(String),

    /// Negative values or class values exceeding the portfolio total
    #[error("Invalid holdings: {0}")]
    InvalidHoldings(String),

    /// Planner invoked on an analysis that needs no rebalancing
    #[error("Rebalancing is not required for this analysis")]
    NotRequired,

    /// Generator draft failed validation against the analysis
    #[error("Invalid recommendation: {0}")]
    InvalidRecommendation(String),

    /// Transport or timeout failure talking to the generator
    #[error("Recommendation generator unavailable: {0}")]
    GeneratorUnavailable(#[from] GeneratorError),
}
