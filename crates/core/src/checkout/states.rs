use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::amount;
use crate::pricing::RentalDays;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    Booking,
    Payment,
    Delivery,
    Confirmed,
}

impl CheckoutStage {
    pub fn label(self) -> &'static str {
        match self {
            CheckoutStage::Booking => "booking",
            CheckoutStage::Payment => "payment",
            CheckoutStage::Delivery => "delivery",
            CheckoutStage::Confirmed => "confirmed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutAction {
    Pay,
    Deliver,
    Confirm,
}

impl CheckoutAction {
    /// Verb used in user-facing messages.
    pub fn verb(self) -> &'static str {
        match self {
            CheckoutAction::Pay => "pay for",
            CheckoutAction::Deliver => "schedule delivery for",
            CheckoutAction::Confirm => "confirm",
        }
    }

    /// Stage an order must be in before this action applies.
    pub fn requires(self) -> CheckoutStage {
        match self {
            CheckoutAction::Pay => CheckoutStage::Booking,
            CheckoutAction::Deliver => CheckoutStage::Payment,
            CheckoutAction::Confirm => CheckoutStage::Delivery,
        }
    }

    pub fn produces(self) -> CheckoutStage {
        match self {
            CheckoutAction::Pay => CheckoutStage::Payment,
            CheckoutAction::Deliver => CheckoutStage::Delivery,
            CheckoutAction::Confirm => CheckoutStage::Confirmed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Credit,
    Debit,
    Bank,
}

impl PaymentMethod {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "credit" => Some(Self::Credit),
            "debit" => Some(Self::Debit),
            "bank" => Some(Self::Bank),
            _ => None,
        }
    }

    pub fn uses_card(self) -> bool {
        matches!(self, Self::Credit | Self::Debit)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredTime {
    #[default]
    Morning,
    Afternoon,
    Evening,
}

impl PreferredTime {
    pub fn window(self) -> &'static str {
        match self {
            PreferredTime::Morning => "9 AM - 12 PM",
            PreferredTime::Afternoon => "12 PM - 5 PM",
            PreferredTime::Evening => "5 PM - 8 PM",
        }
    }
}

/// Account a bank transfer is paid into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransferDetails {
    pub bank_name: &'static str,
    pub account_number: &'static str,
    pub iban: &'static str,
    pub reference_note: &'static str,
}

pub const BANK_TRANSFER_DETAILS: BankTransferDetails = BankTransferDetails {
    bank_name: "AppliRent Services",
    account_number: "1234 5678 9012",
    iban: "OM12 1234 5678 9012 3456",
    reference_note: "Please include your full name as reference. Rental will be confirmed once payment is received.",
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplianceSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub details: String,
}

/// Booking form as submitted from a catalog or recommendation card.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    #[serde(default)]
    pub appliance: Option<ApplianceSummary>,
    /// Price per day.
    #[serde(default, with = "amount")]
    pub price: Decimal,
    #[serde(default)]
    pub days: RentalDays,
    #[serde(default)]
    pub agreed_to_terms: bool,
}

/// Payment form fields exactly as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentForm {
    pub email: String,
    pub payment_method: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub start_date: String,
}

impl PaymentForm {
    /// Applies the card-number and expiry input masks.
    pub fn apply_input_masks(&mut self) {
        self.card_number = crate::validation::format_card_number(&self.card_number);
        self.expiry_date = crate::validation::format_expiry_date(&self.expiry_date);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryForm {
    pub area: String,
    pub city: String,
    pub street: String,
    pub number: String,
    pub zip_code: String,
    pub phone: String,
    pub preferred_time: Option<PreferredTime>,
    pub message: String,
}

impl DeliveryForm {
    /// Applies the zip-code and phone input masks.
    pub fn apply_input_masks(&mut self) {
        self.zip_code = crate::validation::format_zip_code(&self.zip_code);
        self.phone = crate::validation::format_phone(&self.phone);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    pub area: String,
    pub city: String,
    pub street: String,
    pub number: String,
    pub zip_code: String,
    pub phone: String,
    pub preferred_time: PreferredTime,
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalPeriod {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// State handed from the booking step to the payment step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingHandoff {
    #[serde(with = "amount::option")]
    pub total_amount: Option<Decimal>,
    #[serde(with = "amount::option")]
    pub final_amount: Option<Decimal>,
    pub appliance: Option<ApplianceSummary>,
    pub days: Option<RentalDays>,
}

/// State handed from the payment step to the delivery step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentHandoff {
    #[serde(flatten)]
    pub booking: BookingHandoff,
    pub email: String,
    pub payment_method: Option<PaymentMethod>,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub rental_period: RentalPeriod,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{BookingForm, BookingHandoff, DeliveryForm, PaymentForm, PaymentMethod, PreferredTime};

    #[test]
    fn payment_method_parses_known_values() {
        assert_eq!(PaymentMethod::parse(" Credit "), Some(PaymentMethod::Credit));
        assert_eq!(PaymentMethod::parse("bank"), Some(PaymentMethod::Bank));
        assert_eq!(PaymentMethod::parse("cash"), None);
        assert!(!PaymentMethod::Bank.uses_card());
    }

    #[test]
    fn forms_deserialize_with_defaults() {
        let booking: BookingForm =
            serde_json::from_value(json!({ "price": "15", "days": "2" })).expect("booking");
        assert_eq!(booking.days.get(), 2);
        assert!(!booking.agreed_to_terms);
        assert!(booking.appliance.is_none());

        let delivery: DeliveryForm = serde_json::from_value(json!({ "area": "Seeb" })).expect("delivery");
        assert_eq!(delivery.preferred_time.unwrap_or_default(), PreferredTime::Morning);

        let handoff: BookingHandoff = serde_json::from_value(json!({})).expect("handoff");
        assert_eq!(handoff, BookingHandoff::default());
    }

    #[test]
    fn input_masks_format_card_expiry_and_zip() {
        let mut payment = PaymentForm {
            card_number: "4111111111111111".to_string(),
            expiry_date: "1227".to_string(),
            ..PaymentForm::default()
        };
        payment.apply_input_masks();
        assert_eq!(payment.card_number, "4111 1111 1111 1111");
        assert_eq!(payment.expiry_date, "12/27");

        let mut delivery = DeliveryForm { zip_code: "pc-112".to_string(), ..DeliveryForm::default() };
        delivery.apply_input_masks();
        assert_eq!(delivery.zip_code, "PC112");
    }
}
