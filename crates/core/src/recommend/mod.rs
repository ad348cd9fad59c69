//! Budget-driven appliance recommendations.
//!
//! Candidates are the available appliances priced within the budget. Each one
//! is scored on keyword relevance, how much of the budget it uses, and how close
//! its price sits to the budget; the best twelve are returned.

mod engine;
mod scoring;
mod types;

pub use engine::{recommend, RecommendationEngine};
pub use scoring::{proximity, ScoreCalculator, ScoringWeights, ESSENTIAL_KEYWORDS, POPULAR_KEYWORDS};
pub use types::*;

pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    essential: 3.0,
    popular: 2.0,
    premium_band: 2.0,
    value_band: 1.5,
    economy_band: 1.0,
    proximity: 0.5,
};

pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 12;
