//! Recommendation engine

use super::scoring::{ScoreCalculator, ScoringWeights};
use super::types::{Budget, Recommendation, RecommendationRequest};
use crate::domain::appliance::Appliance;

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    calculator: ScoreCalculator,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self { calculator: ScoreCalculator::new() }
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { calculator: ScoreCalculator::with_weights(weights) }
    }

    /// Scores every in-budget, available appliance and returns the best first.
    /// Ties keep catalog order. An empty result is not an error.
    pub fn recommend(
        &self,
        request: &RecommendationRequest,
        catalog: &[Appliance],
    ) -> Vec<Recommendation> {
        let budget = request.budget;
        let mut scored: Vec<Recommendation> = catalog
            .iter()
            .filter(|appliance| self.calculator.is_candidate(appliance, budget))
            .map(|appliance| self.score(appliance, budget))
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(request.max_results);
        scored
    }

    fn score(&self, appliance: &Appliance, budget: Budget) -> Recommendation {
        let band = self.calculator.band(appliance.price, budget);
        let component_scores = self.calculator.component_scores(appliance, budget);
        let reasoning = self.calculator.generate_reasoning(appliance, band, &component_scores);

        Recommendation {
            appliance: appliance.clone(),
            score: component_scores.total(),
            band,
            component_scores,
            reasoning,
        }
    }
}

/// Runs the default engine with the default result cap.
pub fn recommend(budget: Budget, catalog: &[Appliance]) -> Vec<Recommendation> {
    RecommendationEngine::new().recommend(&RecommendationRequest::new(budget), catalog)
}
