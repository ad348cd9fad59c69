//! Rental totals: `price_per_day * days`, plus the fixed insurance deposit.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::amount;

/// Refundable deposit added to every rental.
pub const INSURANCE_DEPOSIT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Rental length in days, never below one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Value", into = "u32")]
pub struct RentalDays(u32);

impl RentalDays {
    pub const MIN: RentalDays = RentalDays(1);

    pub fn new(days: i64) -> Self {
        Self(u32::try_from(days.max(1)).unwrap_or(u32::MAX))
    }

    /// Reads form input using its leading integer: `"3.7"` is 3, and empty,
    /// non-numeric, zero or negative input becomes 1.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        let (sign, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let leading: String = digits.chars().take_while(char::is_ascii_digit).collect();
        match leading.parse::<i64>() {
            Ok(value) => Self::new(sign * value),
            Err(_) if leading.is_empty() => Self::MIN,
            Err(_) => Self(u32::MAX),
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl Default for RentalDays {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<Value> for RentalDays {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(number) => match number.as_i64() {
                Some(days) => Self::new(days),
                None => Self::new(number.as_f64().map(|days| days.trunc() as i64).unwrap_or(1)),
            },
            Value::String(text) => Self::parse(&text),
            _ => Self::MIN,
        }
    }
}

impl From<RentalDays> for u32 {
    fn from(days: RentalDays) -> Self {
        days.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalTotals {
    #[serde(with = "amount")]
    pub rental_amount: Decimal,
    #[serde(with = "amount")]
    pub insurance_deposit: Decimal,
    #[serde(with = "amount")]
    pub final_amount: Decimal,
}

impl RentalTotals {
    /// Totals shown when a checkout step is opened without an upstream order.
    pub const fn empty() -> Self {
        Self { rental_amount: Decimal::ZERO, insurance_deposit: Decimal::ZERO, final_amount: Decimal::ZERO }
    }

    /// Rebuilds totals from a rental amount, deriving the final amount.
    pub fn from_rental_amount(rental_amount: Decimal) -> Result<Self, PricingError> {
        let final_amount =
            rental_amount.checked_add(INSURANCE_DEPOSIT).ok_or(PricingError::AmountOutOfRange)?;
        Ok(Self { rental_amount, insurance_deposit: INSURANCE_DEPOSIT, final_amount })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("rental amount is out of range")]
    AmountOutOfRange,
}

/// Negative prices are treated as free.
pub fn compute_totals(price_per_day: Decimal, days: RentalDays) -> Result<RentalTotals, PricingError> {
    let price_per_day = price_per_day.max(Decimal::ZERO);
    let rental_amount =
        price_per_day.checked_mul(days.as_decimal()).ok_or(PricingError::AmountOutOfRange)?;
    RentalTotals::from_rental_amount(rental_amount)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTrace {
    pub currency: String,
    pub steps: Vec<PricingTraceStep>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalQuote {
    pub price_per_day: Decimal,
    pub days: RentalDays,
    pub totals: RentalTotals,
    pub trace: PricingTrace,
}

pub trait PricingEngine: Send + Sync {
    fn quote(
        &self,
        price_per_day: Decimal,
        days: RentalDays,
        currency: &str,
    ) -> Result<RentalQuote, PricingError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn quote(
        &self,
        price_per_day: Decimal,
        days: RentalDays,
        currency: &str,
    ) -> Result<RentalQuote, PricingError> {
        quote_with_trace(price_per_day, days, currency)
    }
}

pub fn quote_with_trace(
    price_per_day: Decimal,
    days: RentalDays,
    currency: &str,
) -> Result<RentalQuote, PricingError> {
    let totals = compute_totals(price_per_day, days)?;

    Ok(RentalQuote {
        price_per_day,
        days,
        totals,
        trace: PricingTrace {
            currency: currency.to_string(),
            steps: vec![
                PricingTraceStep {
                    stage: "rental".to_string(),
                    detail: format!("price_per_day * {} days", days.get()),
                    amount: totals.rental_amount,
                },
                PricingTraceStep {
                    stage: "insurance_deposit".to_string(),
                    detail: "fixed refundable deposit".to_string(),
                    amount: totals.insurance_deposit,
                },
                PricingTraceStep {
                    stage: "final".to_string(),
                    detail: "rental + insurance_deposit".to_string(),
                    amount: totals.final_amount,
                },
            ],
        },
    })
}

/// Renders `30 OMR`.
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    format!("{} {}", amount.normalize(), currency)
}

/// Catalog price label: whole units with the currency appended. Text that
/// already carries the label is returned as-is; a zero price has no label.
pub fn price_label(raw: &str, currency: &str) -> String {
    let trimmed = raw.trim();
    if !currency.is_empty() && trimmed.to_uppercase().contains(&currency.to_uppercase()) {
        return trimmed.to_string();
    }
    let whole = amount::parse_decimal(trimmed).map(|price| price.trunc()).unwrap_or_default();
    if whole.is_zero() {
        return String::new();
    }
    match whole.to_i64() {
        Some(units) => format!("{units} {currency}"),
        None => format_amount(whole, currency),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{
        compute_totals, format_amount, price_label, DeterministicPricingEngine, PricingEngine,
        PricingError, RentalDays, RentalTotals, INSURANCE_DEPOSIT,
    };

    #[test]
    fn final_amount_is_rental_plus_deposit() {
        for (price, days) in [(0, 1), (15, 2), (40, 7), (999, 30)] {
            let totals =
                compute_totals(Decimal::from(price), RentalDays::new(days)).expect("in range");
            assert_eq!(totals.rental_amount, Decimal::from(price * days));
            assert_eq!(totals.final_amount, Decimal::from(price * days) + Decimal::from(20));
            assert_eq!(totals.insurance_deposit, INSURANCE_DEPOSIT);
        }

        let fractional = compute_totals(Decimal::new(105, 1), RentalDays::new(2)).expect("in range");
        assert_eq!(fractional.rental_amount, Decimal::from(21));
        assert_eq!(fractional.final_amount, Decimal::from(41));
    }

    #[test]
    fn days_below_one_are_clamped() {
        let price = Decimal::from(10);
        assert_eq!(compute_totals(price, RentalDays::new(0)), compute_totals(price, RentalDays::new(1)));
        let clamped = compute_totals(price, RentalDays::new(-4)).expect("in range");
        assert_eq!(clamped.final_amount, Decimal::from(30));
    }

    #[test]
    fn amounts_beyond_decimal_range_are_rejected() {
        assert_eq!(
            compute_totals(Decimal::MAX, RentalDays::new(2)),
            Err(PricingError::AmountOutOfRange)
        );
        assert_eq!(
            compute_totals(Decimal::MAX, RentalDays::MIN),
            Err(PricingError::AmountOutOfRange)
        );
        assert_eq!(
            RentalTotals::from_rental_amount(Decimal::MAX),
            Err(PricingError::AmountOutOfRange)
        );
        assert_eq!(
            DeterministicPricingEngine.quote(Decimal::from(15), RentalDays::parse("99999999999"), "OMR")
                .map(|quote| quote.totals.rental_amount),
            Ok(Decimal::from(15) * Decimal::from(u32::MAX))
        );
    }

    #[test]
    fn form_text_uses_leading_integer() {
        assert_eq!(RentalDays::parse("3").get(), 3);
        assert_eq!(RentalDays::parse("3.7").get(), 3);
        assert_eq!(RentalDays::parse(" 12abc").get(), 12);
        assert_eq!(RentalDays::parse("").get(), 1);
        assert_eq!(RentalDays::parse("abc").get(), 1);
        assert_eq!(RentalDays::parse("-2").get(), 1);
        assert_eq!(RentalDays::parse("0").get(), 1);
    }

    #[test]
    fn days_deserialize_leniently() {
        let days: Vec<RentalDays> =
            serde_json::from_value(json!([2, "4", 0, null, 2.9])).expect("deserialize");
        let values: Vec<u32> = days.into_iter().map(RentalDays::get).collect();
        assert_eq!(values, vec![2, 4, 1, 1, 2]);
        assert_eq!(serde_json::to_value(RentalDays::new(3)).expect("serialize"), json!(3));
    }

    #[test]
    fn engine_trace_lists_each_step() {
        let quote = DeterministicPricingEngine
            .quote(Decimal::from(15), RentalDays::new(2), "OMR")
            .expect("in range");

        let stages: Vec<&str> = quote.trace.steps.iter().map(|step| step.stage.as_str()).collect();
        assert_eq!(stages, vec!["rental", "insurance_deposit", "final"]);
        assert_eq!(quote.totals.final_amount, Decimal::from(50));
        assert_eq!(quote.trace.currency, "OMR");
    }

    #[test]
    fn totals_serialize_with_camel_case_numbers() {
        let totals = compute_totals(Decimal::from(15), RentalDays::new(2)).expect("in range");
        let value = serde_json::to_value(totals).expect("serialize");
        assert_eq!(value, json!({ "rentalAmount": 30, "insuranceDeposit": 20, "finalAmount": 50 }));
        assert!(RentalTotals::empty().is_empty());
    }

    #[test]
    fn amounts_render_with_currency_label() {
        assert_eq!(format_amount(Decimal::new(3000, 2), "OMR"), "30 OMR");
        assert_eq!(format_amount(Decimal::new(125, 1), "OMR"), "12.5 OMR");
        assert_eq!(price_label("40.9", "OMR"), "40 OMR");
        assert_eq!(price_label("25 omr", "OMR"), "25 omr");
        assert_eq!(price_label("0", "OMR"), "");
        assert_eq!(price_label("n/a", "OMR"), "");
    }
}
