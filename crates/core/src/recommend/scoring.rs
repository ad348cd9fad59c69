//! Scoring rules for budget recommendations

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::types::{Budget, BudgetBand, ComponentScores};
use crate::domain::appliance::Appliance;

/// Names containing any of these are household essentials.
pub const ESSENTIAL_KEYWORDS: &[&str] =
    &["refrigerator", "fridge", "washing", "microwave", "oven", "stove"];

/// Names containing any of these are commonly rented.
pub const POPULAR_KEYWORDS: &[&str] =
    &["vacuum", "cleaner", "dishwasher", "dryer", "air", "fan", "heater"];

/// Points awarded per scoring component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub essential: f64,
    pub popular: f64,
    pub premium_band: f64,
    pub value_band: f64,
    pub economy_band: f64,
    /// Multiplier on `1 - |budget - price| / budget`.
    pub proximity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    weights: ScoringWeights,
}

impl ScoreCalculator {
    pub fn new() -> Self {
        Self { weights: ScoringWeights::default() }
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// In-budget and available. Callers must filter before scoring.
    pub fn is_candidate(&self, appliance: &Appliance, budget: Budget) -> bool {
        appliance.available && appliance.price <= budget.amount()
    }

    /// Negative prices count as free. A ratio too large to represent is Economy.
    pub fn band(&self, price: Decimal, budget: Budget) -> BudgetBand {
        let ratio = price.max(Decimal::ZERO).checked_div(budget.amount()).unwrap_or(Decimal::MAX);
        if ratio > Decimal::new(7, 1) && ratio <= Decimal::ONE {
            BudgetBand::Premium
        } else if ratio > Decimal::new(3, 1) && ratio <= Decimal::new(7, 1) {
            BudgetBand::Value
        } else {
            BudgetBand::Economy
        }
    }

    pub fn component_scores(&self, appliance: &Appliance, budget: Budget) -> ComponentScores {
        let name = appliance.search_key();
        let band = self.band(appliance.price, budget);

        ComponentScores {
            essential: if contains_any(&name, ESSENTIAL_KEYWORDS) { self.weights.essential } else { 0.0 },
            popular: if contains_any(&name, POPULAR_KEYWORDS) { self.weights.popular } else { 0.0 },
            band: match band {
                BudgetBand::Premium => self.weights.premium_band,
                BudgetBand::Value => self.weights.value_band,
                BudgetBand::Economy => self.weights.economy_band,
            },
            distance: self.weights.proximity * proximity(appliance.price, budget),
        }
    }

    pub fn generate_reasoning(
        &self,
        appliance: &Appliance,
        band: BudgetBand,
        scores: &ComponentScores,
    ) -> Vec<String> {
        let mut reasons = Vec::new();
        let name = appliance.search_key();

        if scores.essential > 0.0 {
            if let Some(keyword) = first_match(&name, ESSENTIAL_KEYWORDS) {
                reasons.push(format!("Essential household appliance ({keyword})"));
            }
        }
        if scores.popular > 0.0 {
            if let Some(keyword) = first_match(&name, POPULAR_KEYWORDS) {
                reasons.push(format!("Popular rental choice ({keyword})"));
            }
        }
        reasons.push(band.description().to_string());

        reasons
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// `1 - |budget - price| / budget`, computed exactly and converted once.
/// Negative prices are clamped to zero first.
pub fn proximity(price: Decimal, budget: Budget) -> f64 {
    let distance = (budget.amount() - price.max(Decimal::ZERO)).abs();
    let ratio = distance.checked_div(budget.amount()).unwrap_or(Decimal::MAX);
    (Decimal::ONE - ratio).to_f64().unwrap_or_default()
}

fn contains_any(name: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| name.contains(keyword))
}

fn first_match<'a>(name: &str, keywords: &[&'a str]) -> Option<&'a str> {
    keywords.iter().copied().find(|keyword| name.contains(keyword))
}
