//! Types for the budget recommender

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::amount;
use crate::domain::appliance::Appliance;

/// A validated, strictly positive rental budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Budget(Decimal);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BudgetError {
    #[error("budget is empty")]
    Empty,
    #[error("budget is not a number")]
    NotNumeric,
    #[error("budget must be greater than zero")]
    NotPositive,
}

impl BudgetError {
    pub fn user_message(&self) -> &'static str {
        "Please enter a valid budget greater than 0"
    }
}

impl Budget {
    pub fn new(amount: Decimal) -> Result<Self, BudgetError> {
        if amount <= Decimal::ZERO {
            return Err(BudgetError::NotPositive);
        }
        Ok(Self(amount))
    }

    /// Parses form input. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, BudgetError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BudgetError::Empty);
        }
        let amount = amount::parse_decimal(trimmed).ok_or(BudgetError::NotNumeric)?;
        Self::new(amount)
    }

    pub fn amount(self) -> Decimal {
        self.0
    }
}

/// Where an appliance's price sits relative to the budget. Exactly one band
/// applies to any in-budget candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetBand {
    /// `0.7 < price/budget <= 1.0`
    Premium,
    /// `0.3 < price/budget <= 0.7`
    Value,
    /// `price/budget <= 0.3`
    Economy,
}

impl BudgetBand {
    pub fn description(&self) -> &'static str {
        match self {
            BudgetBand::Premium => "Makes the most of your budget",
            BudgetBand::Value => "Good value for your budget",
            BudgetBand::Economy => "Budget-friendly choice",
        }
    }
}

/// Individual scoring components, already weighted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScores {
    pub essential: f64,
    pub popular: f64,
    pub band: f64,
    pub distance: f64,
}

impl ComponentScores {
    pub fn total(&self) -> f64 {
        self.essential + self.popular + self.band + self.distance
    }
}

/// A catalog entry that fits the budget, with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(flatten)]
    pub appliance: Appliance,
    pub score: f64,
    pub band: BudgetBand,
    pub component_scores: ComponentScores,
    pub reasoning: Vec<String>,
}

/// Request for budget recommendations
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub budget: Budget,
    pub max_results: usize,
}

impl RecommendationRequest {
    pub fn new(budget: Budget) -> Self {
        Self { budget, max_results: super::DEFAULT_MAX_RECOMMENDATIONS }
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}
