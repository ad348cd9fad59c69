use homerent_core::domain::amount::parse_decimal;
use homerent_core::pricing::{format_amount, DeterministicPricingEngine, PricingEngine, RentalDays};
use rust_decimal::Decimal;
use serde_json::json;

use crate::commands::{load_config, CommandResult};

pub fn run(price: &str, days: &str) -> CommandResult {
    let config = match load_config("quote") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let price_per_day = match parse_decimal(price.trim()) {
        Some(price) if price >= Decimal::ZERO => price,
        _ => {
            return CommandResult::failure(
                "quote",
                "invalid_input",
                format!("price must be a non-negative number, got `{price}`"),
                2,
            );
        }
    };
    let days = RentalDays::parse(days);
    let currency = &config.display.currency;

    let quote = match DeterministicPricingEngine.quote(price_per_day, days, currency) {
        Ok(quote) => quote,
        Err(error) => return CommandResult::failure("quote", "invalid_input", error.to_string(), 2),
    };
    let message = format!(
        "{} day(s) at {}: rental {}, insurance deposit {}, final {}",
        days.get(),
        format_amount(price_per_day, currency),
        format_amount(quote.totals.rental_amount, currency),
        format_amount(quote.totals.insurance_deposit, currency),
        format_amount(quote.totals.final_amount, currency),
    );

    CommandResult::success_with(
        "quote",
        message,
        Some(json!({ "currency": currency, "days": days, "totals": quote.totals })),
    )
}
