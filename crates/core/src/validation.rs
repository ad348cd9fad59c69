//! Field-level form rules and input formatters.
//!
//! Every rule returns a user-facing message rather than an error type so the
//! caller can render it inline next to the offending field. Failures are
//! collected into [`ValidationErrors`] and block submission.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

static NAME_PATTERN: OnceLock<Regex> = OnceLock::new();
static HOUSE_NUMBER_PATTERN: OnceLock<Regex> = OnceLock::new();
static ZIP_PATTERN: OnceLock<Regex> = OnceLock::new();
static PHONE_PATTERN: OnceLock<Regex> = OnceLock::new();
static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static validation pattern must compile"))
}

/// Field name -> message for every rule that failed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Error)]
#[error("validation failed: {}", summarize(.fields))]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

fn summarize(fields: &BTreeMap<String, String>) -> String {
    fields.iter().map(|(field, message)| format!("{field}: {message}")).collect::<Vec<_>>().join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a failure. The first message recorded for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Records the outcome of a rule, ignoring passes.
    pub fn check(&mut self, field: &str, outcome: Result<(), String>) {
        if let Err(message) = outcome {
            self.add(field, message);
        }
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, message) in other.fields {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Message to show when only one line fits, e.g. an alert.
    pub fn first_message(&self) -> Option<&str> {
        self.fields.values().next().map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn required(value: &str, message: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

pub fn validate_area(value: &str) -> Result<(), String> {
    required(value, "Area is required")?;
    if !pattern(&NAME_PATTERN, r"^[a-zA-Z\s\-']+$").is_match(value) {
        return Err("Area should contain only letters and spaces".to_string());
    }
    Ok(())
}

pub fn validate_city(value: &str) -> Result<(), String> {
    required(value, "City is required")?;
    if !pattern(&NAME_PATTERN, r"^[a-zA-Z\s\-']+$").is_match(value) {
        return Err("City should contain only letters and spaces".to_string());
    }
    Ok(())
}

pub fn validate_street(value: &str) -> Result<(), String> {
    required(value, "Street address is required")
}

pub fn validate_house_number(value: &str) -> Result<(), String> {
    required(value, "House number is required")?;
    if !pattern(&HOUSE_NUMBER_PATTERN, r"^[0-9a-zA-Z\-/]+$").is_match(value) {
        return Err("Enter a valid house/apartment number".to_string());
    }
    Ok(())
}

pub fn validate_zip_code(value: &str) -> Result<(), String> {
    required(value, "Zip code is required")?;
    if !pattern(&ZIP_PATTERN, r"^[0-9a-zA-Z\-\s]+$").is_match(value) {
        return Err("Enter a valid zip code".to_string());
    }
    Ok(())
}

pub fn validate_phone(value: &str) -> Result<(), String> {
    required(value, "Phone number is required")?;
    if !pattern(&PHONE_PATTERN, r"^\+?[0-9\s\-()]{8,}$").is_match(value) {
        return Err("Enter a valid phone number".to_string());
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), String> {
    if value.trim().is_empty() || !is_email(value) {
        return Err("Please enter a valid email address".to_string());
    }
    Ok(())
}

pub fn is_email(value: &str) -> bool {
    pattern(&EMAIL_PATTERN, r"^[^\s@]+@[^\s@]+\.[^\s@]+$").is_match(value)
}

pub fn validate_username(value: &str) -> Result<(), String> {
    if value.trim().chars().count() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }
    Ok(())
}

pub fn validate_password(value: &str) -> Result<(), String> {
    required(value, "Password is required")
}

/// Card number must be sixteen digits once grouping spaces are removed.
pub fn validate_card_number(value: &str) -> Result<(), String> {
    required(value, "Card number is required")?;
    let digits = value.chars().filter(|ch| !ch.is_whitespace()).collect::<String>();
    if digits.len() != 16 || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err("Enter a valid 16-digit card number".to_string());
    }
    Ok(())
}

/// Expiry must read `MM/YY` with a real month.
pub fn validate_expiry_date(value: &str) -> Result<(), String> {
    required(value, "Expiry date is required")?;
    let Some((month, year)) = value.split_once('/') else {
        return Err("Enter the expiry date as MM/YY".to_string());
    };
    let month_ok = month.len() == 2 && matches!(month.parse::<u8>(), Ok(1..=12));
    let year_ok = year.len() == 2 && year.chars().all(|ch| ch.is_ascii_digit());
    if !month_ok || !year_ok {
        return Err("Enter the expiry date as MM/YY".to_string());
    }
    Ok(())
}

pub fn validate_cvv(value: &str) -> Result<(), String> {
    required(value, "CVV is required")?;
    let len = value.len();
    if !(3..=4).contains(&len) || !value.chars().all(|ch| ch.is_ascii_digit()) {
        return Err("CVV must be 3 or 4 digits".to_string());
    }
    Ok(())
}

fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Groups card digits by four: `4111111111111111` -> `4111 1111 1111 1111`.
pub fn format_card_number(raw: &str) -> String {
    let digits = digits_only(raw);
    let digits = &digits[..digits.len().min(16)];
    digits
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Inserts the slash once two digits are typed: `1226` -> `12/26`.
pub fn format_expiry_date(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.len() < 2 {
        return digits;
    }
    let year_end = digits.len().min(4);
    format!("{}/{}", &digits[..2], &digits[2..year_end])
}

/// Groups the first nine digits as `XXX XXX XXX`; shorter input is left as typed digits.
pub fn format_phone(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.len() < 9 {
        return digits;
    }
    format!("{} {} {}{}", &digits[..3], &digits[3..6], &digits[6..9], &digits[9..])
}

/// Upper-cases and strips anything that is not `0-9A-Z`.
pub fn format_zip_code(raw: &str) -> String {
    raw.to_uppercase().chars().filter(|ch| ch.is_ascii_digit() || ch.is_ascii_uppercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_rules_report_required_before_shape() {
        assert_eq!(validate_area("  "), Err("Area is required".to_string()));
        assert_eq!(
            validate_city("Muscat 7"),
            Err("City should contain only letters and spaces".to_string())
        );
        assert!(validate_area("Al Khuwair").is_ok());
        assert!(validate_city("Sur-Al 'Hadd").is_ok());
        assert!(validate_house_number("12B/4").is_ok());
        assert!(validate_house_number("12 B").is_err());
        assert!(validate_zip_code("PC 112").is_ok());
        assert!(validate_zip_code("112#").is_err());
    }

    #[test]
    fn phone_rule_requires_eight_allowed_characters() {
        assert!(validate_phone("912 345 678").is_ok());
        assert!(validate_phone("+968 (91) 234-567").is_ok());
        assert_eq!(validate_phone("1234567"), Err("Enter a valid phone number".to_string()));
        assert_eq!(validate_phone(""), Err("Phone number is required".to_string()));
    }

    #[test]
    fn email_rule_matches_profile_form() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user@example").is_err());
        assert!(validate_email("us er@example.com").is_err());
    }

    #[test]
    fn card_number_is_grouped_by_four() {
        assert_eq!(format_card_number("4111111111111111"), "4111 1111 1111 1111");
        assert_eq!(format_card_number("4111-1111 11"), "4111 1111 11");
        assert_eq!(format_card_number("41111111111111119999"), "4111 1111 1111 1111");
        assert!(validate_card_number("4111 1111 1111 1111").is_ok());
        assert!(validate_card_number("4111 1111").is_err());
    }

    #[test]
    fn expiry_inserts_slash_after_month() {
        assert_eq!(format_expiry_date("1"), "1");
        assert_eq!(format_expiry_date("12"), "12/");
        assert_eq!(format_expiry_date("1226"), "12/26");
        assert_eq!(format_expiry_date("12/2699"), "12/26");
        assert!(validate_expiry_date("12/26").is_ok());
        assert!(validate_expiry_date("13/26").is_err());
        assert!(validate_cvv("123").is_ok());
        assert!(validate_cvv("12a").is_err());
    }

    #[test]
    fn phone_and_zip_formatters_follow_input_masks() {
        assert_eq!(format_phone("912345678"), "912 345 678");
        assert_eq!(format_phone("+968-9123"), "9689123");
        assert_eq!(format_phone("91234567890"), "912 345 67890");
        assert_eq!(format_zip_code("pc-112 a"), "PC112A");
    }

    #[test]
    fn errors_keep_first_message_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("phone", "Phone number is required");
        errors.add("phone", "Enter a valid phone number");
        errors.check("area", Ok(()));
        errors.check("city", Err("City is required".to_string()));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("phone"), Some("Phone number is required"));
        assert_eq!(errors.first_message(), Some("City is required"));
        assert!(errors.to_string().contains("phone: Phone number is required"));
        assert!(errors.into_result().is_err());
    }
}
