use homerent_core::pricing::format_amount;
use homerent_core::recommend::{Budget, RecommendationEngine, RecommendationRequest};
use homerent_db::{connect_with_config, migrations, ApplianceRepository, SqlApplianceRepository};
use serde_json::json;

use crate::commands::{load_config, runtime, CommandResult};

pub fn run(budget: &str, limit: Option<usize>) -> CommandResult {
    let config = match load_config("recommend") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let budget = match Budget::parse(budget) {
        Ok(budget) => budget,
        Err(error) => {
            return CommandResult::failure("recommend", "invalid_budget", error.user_message(), 2);
        }
    };
    let runtime = match runtime("recommend") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let catalog = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        let appliances = SqlApplianceRepository::new(pool.clone())
            .list()
            .await
            .map_err(|error| ("catalog_read", error.to_string(), 4u8))?;
        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(appliances)
    });

    let catalog = match catalog {
        Ok(catalog) => catalog,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("recommend", error_class, message, exit_code);
        }
    };

    let max_results = limit.unwrap_or(config.catalog.recommendation_limit).max(1);
    let request = RecommendationRequest::new(budget).with_max_results(max_results);
    let recommendations = RecommendationEngine::new().recommend(&request, &catalog);

    let message = if recommendations.is_empty() {
        format!(
            "no available appliances fit a budget of {}",
            format_amount(budget.amount(), &config.display.currency)
        )
    } else {
        format!(
            "{} recommendation(s) for a budget of {}",
            recommendations.len(),
            format_amount(budget.amount(), &config.display.currency)
        )
    };

    CommandResult::success_with(
        "recommend",
        message,
        Some(json!({ "budget": budget.amount(), "recommendations": recommendations })),
    )
}
