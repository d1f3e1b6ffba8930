//! Recommendation Planner
//!
//! Turns an analysis that requires rebalancing into a validated, ranked
//! plan of trade actions. Action derivation is delegated to the external
//! recommendation generator; everything it returns is validated against
//! the analysis, re-ranked, and re-projected here before a caller sees
//! it. The planner owns the only mutable state in the core: the keyed
//! plan cache.

mod cache;

pub use cache::PlanCache;

use std::sync::Arc;

use advisor_core::{
    AssetClass, DraftAction, DraftPlan, Generation, GeneratorRequest, HoldingLine,
    RecommendationGenerator, RequestLine, TradeDirection,
};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::error::{RebalanceError, Result};
use crate::model::{
    ExpectedAllocation, HoldingDetail, RebalancingAnalysis, RecommendationAction,
    RecommendationPlan, TransactionDraft,
};
use crate::planner::cache::{CachedPlan, PlanKey};
use crate::policy::{FeeSchedule, FlatFeeSchedule, ThresholdPolicy};

/// Planner over an injected generator, cache, and policies
pub struct RecommendationPlanner {
    generator: Arc<dyn RecommendationGenerator>,
    cache: Arc<PlanCache>,
    thresholds: ThresholdPolicy,
    fees: Arc<dyn FeeSchedule>,
    currency: String,
}

impl RecommendationPlanner {
    pub fn new(generator: Arc<dyn RecommendationGenerator>) -> Self {
        Self {
            generator,
            cache: Arc::new(PlanCache::default()),
            thresholds: ThresholdPolicy::default(),
            fees: Arc::new(FlatFeeSchedule::default()),
            currency: "USD".into(),
        }
    }

    /// Inject a shared cache (construct once per process)
    pub fn with_cache(mut self, cache: Arc<PlanCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdPolicy) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_fee_schedule(mut self, fees: Arc<dyn FeeSchedule>) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Produce a plan for an analysis that requires rebalancing.
    ///
    /// Serves a fresh cached plan unless `force_refresh` is set;
    /// otherwise invokes the generator, validates its draft, ranks the
    /// actions, and stores the result. At most one generation is in
    /// flight per cache key; a cancelled call leaves no partial entry.
    pub async fn plan(
        &self,
        analysis: &RebalancingAnalysis,
        holdings: &[HoldingDetail],
        force_refresh: bool,
    ) -> Result<RecommendationPlan> {
        if !analysis.rebalancing_required {
            return Err(RebalanceError::NotRequired);
        }

        let key = PlanKey::from_analysis(analysis);
        let slot = self.cache.slot(&key).await;
        let mut guard = slot.lock().await;

        if !force_refresh {
            if let Some(entry) = guard.as_ref() {
                if self.cache.is_fresh(entry) {
                    tracing::debug!(%key, "serving cached rebalancing plan");
                    let mut plan = entry.plan.clone();
                    plan.cached = true;
                    return Ok(plan);
                }
            }
        }

        let request = self.build_request(analysis, holdings);
        tracing::info!(
            model = %analysis.model_name,
            request_id = %request.request_id,
            "requesting draft plan from generator"
        );
        let generation = self.generator.generate(&request).await?;
        self.validate_draft(analysis, &generation.draft)?;

        let Generation { draft, usage } = generation;
        let DraftPlan {
            summary,
            actions,
            improvement_estimate,
            risk_assessment,
            implementation_notes,
        } = draft;

        let actions = self.rank_actions(&analysis.model_name, actions);
        let expected_allocation = project_allocation(analysis, &actions);
        let traded: Decimal = actions.iter().map(|a| a.estimated_value.abs()).sum();
        let estimated_cost = self.fees.estimate(traded, actions.len());

        let plan = RecommendationPlan {
            id: Uuid::new_v4(),
            summary,
            priority: self.thresholds.plan_priority(analysis.largest_deviation),
            total_trades: actions.len(),
            actions,
            expected_allocation,
            estimated_cost,
            improvement_estimate,
            risk_assessment,
            implementation_notes,
            generated_at: Utc::now(),
            cached: false,
            usage,
        };

        // Written only after validation succeeds, so cancellation
        // anywhere above leaves the slot untouched
        *guard = Some(CachedPlan {
            generated_at: plan.generated_at,
            plan: plan.clone(),
        });

        Ok(plan)
    }

    fn build_request(
        &self,
        analysis: &RebalancingAnalysis,
        holdings: &[HoldingDetail],
    ) -> GeneratorRequest {
        GeneratorRequest {
            request_id: Uuid::new_v4(),
            directive: crate::PLANNER_DIRECTIVE.to_string(),
            model_name: analysis.model_name.clone(),
            total_value: analysis.total_value,
            currency: self.currency.clone(),
            lines: analysis
                .lines
                .iter()
                .map(|l| RequestLine {
                    asset_class: l.asset_class,
                    current_value: l.current_value,
                    current_percentage: l.current_percentage,
                    target_percentage: l.target_percentage,
                    deviation: l.deviation,
                    delta_value: l.delta_value,
                    rebalancing_needed: l.rebalancing_needed,
                })
                .collect(),
            holdings: holdings
                .iter()
                .map(|h| HoldingLine {
                    asset_class: h.asset_class,
                    symbol: h.symbol.clone(),
                    quantity: h.quantity,
                    unit_price: h.unit_price,
                    market_value: h.market_value,
                })
                .collect(),
            analyzed_at: analysis.generated_at,
        }
    }

    /// Reject any draft that contradicts the analysis. Violations are
    /// surfaced, never repaired.
    fn validate_draft(&self, analysis: &RebalancingAnalysis, draft: &DraftPlan) -> Result<()> {
        if draft.actions.is_empty() {
            return Err(RebalanceError::InvalidRecommendation(
                "draft contains no actions".into(),
            ));
        }

        for action in &draft.actions {
            let line = analysis.line_for(action.asset_class).ok_or_else(|| {
                RebalanceError::InvalidRecommendation(format!(
                    "no analysis line for {}",
                    action.asset_class
                ))
            })?;

            if !line.rebalancing_needed {
                return Err(RebalanceError::InvalidRecommendation(format!(
                    "{} does not need rebalancing",
                    action.asset_class
                )));
            }

            let expected = if line.deviation > Decimal::ZERO {
                TradeDirection::Sell
            } else {
                TradeDirection::Buy
            };
            if action.direction != expected {
                return Err(RebalanceError::InvalidRecommendation(format!(
                    "{} on {} contradicts deviation {:+}%",
                    action.direction, action.asset_class, line.deviation
                )));
            }

            if action.quantity < Decimal::ZERO {
                return Err(RebalanceError::InvalidRecommendation(format!(
                    "negative quantity for {}",
                    action.symbol
                )));
            }

            let product = action.quantity * action.unit_price;
            let tolerance = (action.estimated_value.abs() * dec!(0.01)).max(dec!(0.01));
            if (product - action.estimated_value).abs() > tolerance {
                return Err(RebalanceError::InvalidRecommendation(format!(
                    "{} x {} = {} does not reconcile with estimated value {}",
                    action.quantity, action.unit_price, product, action.estimated_value
                )));
            }
        }

        Ok(())
    }

    /// Larger corrective trades rank first; ties break on the fixed
    /// class order. Ranks are re-numbered 1..N contiguously.
    fn rank_actions(
        &self,
        model_name: &str,
        mut drafts: Vec<DraftAction>,
    ) -> Vec<RecommendationAction> {
        drafts.sort_by(|a, b| {
            b.estimated_value
                .cmp(&a.estimated_value)
                .then_with(|| a.asset_class.order().cmp(&b.asset_class.order()))
        });

        drafts
            .into_iter()
            .enumerate()
            .map(|(rank, d)| {
                let transaction = TransactionDraft {
                    direction: d.direction,
                    symbol: d.symbol.clone(),
                    quantity: d.quantity,
                    unit_price: d.unit_price,
                    total_value: d.estimated_value,
                    currency: self.currency.clone(),
                    note: format!("Rebalancing toward the {model_name} model"),
                };
                RecommendationAction {
                    direction: d.direction,
                    asset_class: d.asset_class,
                    symbol: d.symbol,
                    quantity: d.quantity,
                    unit_price: d.unit_price,
                    estimated_value: d.estimated_value,
                    priority: (rank + 1) as u32,
                    rationale: d.rationale,
                    timing_hint: d.timing_hint,
                    transaction,
                }
            })
            .collect()
    }
}

/// Deterministic projection of the post-trade allocation. Buys add to a
/// class, sells subtract; percentages are re-derived against the
/// unchanged total, so tests can verify the outcome independently of
/// the generator's prose.
fn project_allocation(
    analysis: &RebalancingAnalysis,
    actions: &[RecommendationAction],
) -> Vec<ExpectedAllocation> {
    AssetClass::ALL
        .iter()
        .map(|&class| {
            let current = analysis
                .line_for(class)
                .map(|l| l.current_value)
                .unwrap_or(Decimal::ZERO);
            let applied: Decimal = actions
                .iter()
                .filter(|a| a.asset_class == class)
                .map(|a| match a.direction {
                    TradeDirection::Buy => a.estimated_value,
                    TradeDirection::Sell => -a.estimated_value,
                })
                .sum();
            let value = current + applied;
            let percentage = if analysis.total_value > Decimal::ZERO {
                (value / analysis.total_value * dec!(100)).round_dp(4)
            } else {
                Decimal::ZERO
            };
            ExpectedAllocation {
                asset_class: class,
                percentage,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AllocationAnalyzer;
    use crate::model::{AllocationModel, HoldingsSnapshot, PlanPriority};
    use advisor_core::{GeneratorInfo, UsageStats};
    use advisor_runtime::MockGenerator;
    use async_trait::async_trait;

    fn drifted_analysis() -> RebalancingAnalysis {
        AllocationAnalyzer::with_defaults()
            .analyze(
                &HoldingsSnapshot::new(dec!(10000), dec!(5000), dec!(3500), dec!(1500)),
                &AllocationModel::moderate(),
            )
            .unwrap()
    }

    fn balanced_analysis() -> RebalancingAnalysis {
        AllocationAnalyzer::with_defaults()
            .analyze(
                &HoldingsSnapshot::new(dec!(10000), dec!(6000), dec!(2500), dec!(1500)),
                &AllocationModel::moderate(),
            )
            .unwrap()
    }

    fn holdings_detail() -> Vec<HoldingDetail> {
        vec![
            HoldingDetail::new(AssetClass::Stock, "VTI", dec!(17.85), dec!(280)),
            HoldingDetail::new(AssetClass::Crypto, "BTC", dec!(0.0359), dec!(97500)),
            HoldingDetail::new(AssetClass::Metal, "GLD", dec!(6.12), dec!(245)),
        ]
    }

    /// Generator that replays a fixed draft, for exercising validation
    struct StaticDraftGenerator {
        draft: DraftPlan,
    }

    #[async_trait]
    impl RecommendationGenerator for StaticDraftGenerator {
        async fn info(&self) -> advisor_core::Result<GeneratorInfo> {
            Ok(GeneratorInfo {
                name: "StaticDraft".into(),
                model: None,
                version: None,
            })
        }

        async fn health_check(&self) -> advisor_core::Result<bool> {
            Ok(true)
        }

        async fn generate(
            &self,
            _request: &GeneratorRequest,
        ) -> advisor_core::Result<Generation> {
            Ok(Generation {
                draft: self.draft.clone(),
                usage: UsageStats::new(10, 10),
            })
        }
    }

    fn draft_action(
        direction: TradeDirection,
        asset_class: AssetClass,
        symbol: &str,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> DraftAction {
        DraftAction {
            direction,
            asset_class,
            symbol: symbol.into(),
            quantity,
            unit_price,
            estimated_value: quantity * unit_price,
            rationale: "test".into(),
            timing_hint: "whenever".into(),
        }
    }

    fn static_planner(actions: Vec<DraftAction>) -> RecommendationPlanner {
        RecommendationPlanner::new(Arc::new(StaticDraftGenerator {
            draft: DraftPlan {
                summary: "static".into(),
                actions,
                improvement_estimate: String::new(),
                risk_assessment: String::new(),
                implementation_notes: String::new(),
            },
        }))
    }

    #[tokio::test]
    async fn test_not_required_is_a_caller_error() {
        let planner = RecommendationPlanner::new(Arc::new(MockGenerator::new()));
        let err = planner
            .plan(&balanced_analysis(), &holdings_detail(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, RebalanceError::NotRequired));
    }

    #[tokio::test]
    async fn test_plan_ranks_and_projects() {
        let generator = Arc::new(MockGenerator::new());
        let planner = RecommendationPlanner::new(generator.clone());
        let analysis = drifted_analysis();

        let plan = planner
            .plan(&analysis, &holdings_detail(), false)
            .await
            .unwrap();

        assert!(!plan.cached);
        assert_eq!(plan.total_trades, 2);
        assert_eq!(plan.priority, PlanPriority::High);
        assert_eq!(plan.estimated_cost, dec!(9.90));
        assert!(plan.usage.total_tokens > 0);

        // ranks are contiguous from 1 and ordered
        let ranks: Vec<u32> = plan.actions.iter().map(|a| a.priority).collect();
        assert_eq!(ranks, vec![1, 2]);

        // the underweight class is bought, the overweight one sold
        let stock = plan
            .actions
            .iter()
            .find(|a| a.asset_class == AssetClass::Stock)
            .unwrap();
        assert_eq!(stock.direction, TradeDirection::Buy);
        let crypto = plan
            .actions
            .iter()
            .find(|a| a.asset_class == AssetClass::Crypto)
            .unwrap();
        assert_eq!(crypto.direction, TradeDirection::Sell);
        assert_eq!(crypto.symbol, "BTC");

        // transaction drafts mirror the actions
        assert_eq!(stock.transaction.direction, TradeDirection::Buy);
        assert_eq!(stock.transaction.currency, "USD");
        assert_eq!(stock.transaction.total_value, stock.estimated_value);

        // projection lands on the targets
        for expected in &plan.expected_allocation {
            let target = analysis
                .line_for(expected.asset_class)
                .unwrap()
                .target_percentage;
            assert!(
                (expected.percentage - target).abs() < dec!(0.01),
                "{} projected {} vs target {}",
                expected.asset_class,
                expected.percentage,
                target
            );
        }
    }

    #[tokio::test]
    async fn test_cache_serves_second_call() {
        let generator = Arc::new(MockGenerator::new());
        let planner = RecommendationPlanner::new(generator.clone());
        let analysis = drifted_analysis();
        let holdings = holdings_detail();

        let first = planner.plan(&analysis, &holdings, false).await.unwrap();
        let second = planner.plan(&analysis, &holdings, false).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.id, first.id);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let generator = Arc::new(MockGenerator::new());
        let planner = RecommendationPlanner::new(generator.clone());
        let analysis = drifted_analysis();
        let holdings = holdings_detail();

        planner.plan(&analysis, &holdings, false).await.unwrap();
        let refreshed = planner.plan(&analysis, &holdings, true).await.unwrap();

        assert!(!refreshed.cached);
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_regenerates() {
        let generator = Arc::new(MockGenerator::new());
        let planner = RecommendationPlanner::new(generator.clone())
            .with_cache(Arc::new(PlanCache::new(chrono::Duration::zero())));
        let analysis = drifted_analysis();
        let holdings = holdings_detail();

        planner.plan(&analysis, &holdings, false).await.unwrap();
        let second = planner.plan(&analysis, &holdings, false).await.unwrap();

        assert!(!second.cached);
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_one_generation() {
        let generator = Arc::new(MockGenerator::new());
        let planner = RecommendationPlanner::new(generator.clone());
        let analysis = drifted_analysis();
        let holdings = holdings_detail();

        let (a, b) = tokio::join!(
            planner.plan(&analysis, &holdings, false),
            planner.plan(&analysis, &holdings, false),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(generator.call_count(), 1);
        // exactly one of the two generated; the other read its result
        assert!(a.cached != b.cached);
        assert_eq!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_different_models_do_not_share_cache() {
        let generator = Arc::new(MockGenerator::new());
        let planner = RecommendationPlanner::new(generator.clone());
        let holdings = holdings_detail();

        let moderate = drifted_analysis();
        let aggressive = AllocationAnalyzer::with_defaults()
            .analyze(
                &HoldingsSnapshot::new(dec!(10000), dec!(5000), dec!(3500), dec!(1500)),
                &AllocationModel::aggressive(),
            )
            .unwrap();

        planner.plan(&moderate, &holdings, false).await.unwrap();
        planner.plan(&aggressive, &holdings, false).await.unwrap();
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_buy_on_overweight_class_is_rejected() {
        // crypto is overweight in the drifted analysis; a BUY contradicts it
        let planner = static_planner(vec![draft_action(
            TradeDirection::Buy,
            AssetClass::Crypto,
            "BTC",
            dec!(0.01),
            dec!(97500),
        )]);

        let err = planner
            .plan(&drifted_analysis(), &holdings_detail(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, RebalanceError::InvalidRecommendation(_)));
    }

    #[tokio::test]
    async fn test_action_on_balanced_class_is_rejected() {
        let planner = static_planner(vec![draft_action(
            TradeDirection::Buy,
            AssetClass::Metal,
            "GLD",
            dec!(1),
            dec!(245),
        )]);

        let err = planner
            .plan(&drifted_analysis(), &holdings_detail(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, RebalanceError::InvalidRecommendation(_)));
    }

    #[tokio::test]
    async fn test_unreconciled_value_is_rejected() {
        let mut action = draft_action(
            TradeDirection::Buy,
            AssetClass::Stock,
            "VTI",
            dec!(3.5),
            dec!(280),
        );
        action.estimated_value = dec!(1234.56);
        let planner = static_planner(vec![action]);

        let err = planner
            .plan(&drifted_analysis(), &holdings_detail(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, RebalanceError::InvalidRecommendation(_)));
    }

    #[tokio::test]
    async fn test_empty_draft_is_rejected() {
        let planner = static_planner(Vec::new());
        let err = planner
            .plan(&drifted_analysis(), &holdings_detail(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, RebalanceError::InvalidRecommendation(_)));
    }

    #[tokio::test]
    async fn test_generator_failure_surfaces_and_caches_nothing() {
        let cache = Arc::new(PlanCache::default());
        let failing = Arc::new(MockGenerator::failing());
        let planner = RecommendationPlanner::new(failing).with_cache(cache.clone());
        let analysis = drifted_analysis();
        let holdings = holdings_detail();

        let err = planner.plan(&analysis, &holdings, false).await.unwrap_err();
        assert!(matches!(err, RebalanceError::GeneratorUnavailable(_)));

        // a healthy generator behind the same cache still has to
        // generate: the failed call left no entry
        let generator = Arc::new(MockGenerator::new());
        let planner = RecommendationPlanner::new(generator.clone()).with_cache(cache);
        let plan = planner.plan(&analysis, &holdings, false).await.unwrap();
        assert!(!plan.cached);
        assert_eq!(generator.call_count(), 1);
    }
}
