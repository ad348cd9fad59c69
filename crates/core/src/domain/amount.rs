//! Serde adapters for money fields.
//!
//! Amounts are `Decimal` in memory but travel as plain JSON numbers. Incoming
//! values are read leniently: numbers and numeric strings are accepted, and
//! anything else (missing, `null`, `"n/a"`) reads as zero.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

pub fn serialize<S>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let normalized = amount.normalize();
    if normalized.scale() == 0 {
        if let Some(whole) = normalized.to_i64() {
            return serializer.serialize_i64(whole);
        }
    }
    serializer.serialize_f64(normalized.to_f64().unwrap_or_default())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient(&value))
}

/// Reads a JSON value as an amount, treating non-numeric input as zero.
pub fn lenient(value: &Value) -> Decimal {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()).unwrap_or_default(),
        Value::String(text) => parse_decimal(text.trim()).unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

/// Parses plain (`"12.5"`) and scientific (`"1e3"`) notation.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text).ok().or_else(|| Decimal::from_scientific(text).ok())
}

pub mod option {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S>(amount: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match amount {
            Some(amount) => super::serialize(amount, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.filter(|value| !value.is_null()).map(|value| super::lenient(&value)))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Deserialize, Serialize)]
    struct Priced {
        #[serde(default, with = "super")]
        price: Decimal,
    }

    #[test]
    fn numeric_strings_and_numbers_are_accepted() {
        let from_number: Priced = serde_json::from_value(json!({ "price": 12.5 })).expect("number");
        let from_text: Priced = serde_json::from_value(json!({ "price": " 40 " })).expect("text");

        assert_eq!(from_number.price, Decimal::new(125, 1));
        assert_eq!(from_text.price, Decimal::from(40));
    }

    #[test]
    fn non_numeric_price_reads_as_zero() {
        let garbage: Priced = serde_json::from_value(json!({ "price": "call us" })).expect("text");
        let missing: Priced = serde_json::from_value(json!({})).expect("missing");
        let null: Priced = serde_json::from_value(json!({ "price": null })).expect("null");

        assert_eq!(garbage.price, Decimal::ZERO);
        assert_eq!(missing.price, Decimal::ZERO);
        assert_eq!(null.price, Decimal::ZERO);
    }

    #[test]
    fn whole_amounts_serialize_as_integers() {
        let whole = serde_json::to_value(Priced { price: Decimal::new(3000, 2) }).expect("json");
        let fractional = serde_json::to_value(Priced { price: Decimal::new(125, 1) }).expect("json");

        assert_eq!(whole, json!({ "price": 30 }));
        assert_eq!(fractional, json!({ "price": 12.5 }));
    }
}
