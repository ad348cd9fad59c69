use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use super::order::{PaymentDetails, RentalOrder, RentalSchedule};
use super::states::{
    BookingForm, CardDetails, CheckoutAction, CheckoutStage, DeliveryDetails, DeliveryForm,
    PaymentForm, PaymentMethod,
};
use super::timeline::DeliveryTimeline;
use crate::pricing::{DeterministicPricingEngine, PricingEngine, PricingError, RentalQuote};
use crate::validation::{self, ValidationErrors};

pub const CONFIRMATION_MESSAGE: &str = "Your order's on its way! We'll have it at your door soon.";

/// Side effect run when a delivery is confirmed.
#[async_trait]
pub trait ConfirmationSink: Send + Sync {
    async fn process(&self, order: &RentalOrder) -> Result<(), String>;
}

/// Confirms immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateConfirmation;

#[async_trait]
impl ConfirmationSink for ImmediateConfirmation {
    async fn process(&self, _order: &RentalOrder) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryConfirmation {
    pub order: RentalOrder,
    pub message: String,
    pub timeline: DeliveryTimeline,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CheckoutTransitionError {
    #[error("cannot {} an order at the {} stage", .action.verb(), .stage.label())]
    OutOfOrder { stage: CheckoutStage, action: CheckoutAction },
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error("order processing failed: {0}")]
    Processing(String),
}

/// Moves a rental order through Booking, Payment, Delivery and confirmation.
/// Every step but `confirm` is a pure function of the order and the form.
pub struct CheckoutPipeline<P = DeterministicPricingEngine> {
    pricing: P,
    currency: String,
}

impl Default for CheckoutPipeline<DeterministicPricingEngine> {
    fn default() -> Self {
        Self::new(DeterministicPricingEngine, "OMR")
    }
}

impl<P> CheckoutPipeline<P>
where
    P: PricingEngine,
{
    pub fn new(pricing: P, currency: impl Into<String>) -> Self {
        Self { pricing, currency: currency.into() }
    }

    /// Prices a booking form. Amounts beyond the representable range are a
    /// validation error on the price field.
    pub fn quote(&self, form: &BookingForm) -> Result<RentalQuote, CheckoutTransitionError> {
        self.pricing.quote(form.price, form.days, &self.currency).map_err(|error| match error {
            PricingError::AmountOutOfRange => {
                ValidationErrors::single("price", "Price or rental days are out of range").into()
            }
        })
    }

    pub fn book(&self, form: BookingForm) -> Result<RentalOrder, CheckoutTransitionError> {
        if !form.agreed_to_terms {
            return Err(ValidationErrors::single(
                "agreedToTerms",
                "Please agree to the insurance deposit terms",
            )
            .into());
        }

        let quote = self.quote(&form)?;
        Ok(RentalOrder {
            stage: CheckoutStage::Booking,
            appliance: form.appliance,
            price_per_day: Some(quote.price_per_day),
            days: Some(quote.days),
            totals: quote.totals,
            payment: None,
            delivery: None,
        })
    }

    pub fn pay(
        &self,
        order: RentalOrder,
        mut form: PaymentForm,
        today: NaiveDate,
    ) -> Result<RentalOrder, CheckoutTransitionError> {
        require_stage(&order, CheckoutAction::Pay)?;
        form.apply_input_masks();

        let mut errors = ValidationErrors::new();
        errors.check("email", validation::validate_email(&form.email));
        let method = PaymentMethod::parse(&form.payment_method);
        if method.is_none() {
            errors.add("paymentMethod", "Please select a payment method");
        }
        if method.is_some_and(PaymentMethod::uses_card) {
            errors.check("cardNumber", validation::validate_card_number(&form.card_number));
            errors.check("expiryDate", validation::validate_expiry_date(&form.expiry_date));
            errors.check("cvv", validation::validate_cvv(&form.cvv));
        }
        let start = match validate_start_date(&form.start_date, today) {
            Ok(start) => Some(start),
            Err(message) => {
                errors.add("startDate", message);
                None
            }
        };
        let days = order.days.unwrap_or_default();
        let schedule = start.and_then(|start| RentalSchedule::new(start, days));
        if start.is_some() && schedule.is_none() {
            errors.add("startDate", "Rental end date is out of range");
        }
        errors.into_result()?;

        let (Some(method), Some(schedule)) = (method, schedule) else {
            return Err(ValidationErrors::single("paymentMethod", "Please select a payment method").into());
        };

        let card = method.uses_card().then(|| CardDetails {
            number: form.card_number,
            expiry: form.expiry_date,
            cvv: form.cvv,
        });

        Ok(RentalOrder {
            stage: CheckoutAction::Pay.produces(),
            days: Some(days),
            payment: Some(PaymentDetails {
                email: form.email.trim().to_string(),
                method,
                card,
                schedule: Some(schedule),
            }),
            ..order
        })
    }

    pub fn deliver(
        &self,
        order: RentalOrder,
        mut form: DeliveryForm,
    ) -> Result<RentalOrder, CheckoutTransitionError> {
        require_stage(&order, CheckoutAction::Deliver)?;
        form.apply_input_masks();

        let mut errors = ValidationErrors::new();
        errors.check("area", validation::validate_area(&form.area));
        errors.check("city", validation::validate_city(&form.city));
        errors.check("street", validation::validate_street(&form.street));
        errors.check("number", validation::validate_house_number(&form.number));
        errors.check("zipCode", validation::validate_zip_code(&form.zip_code));
        errors.check("phone", validation::validate_phone(&form.phone));
        errors.into_result()?;

        let message = Some(form.message.trim().to_string()).filter(|message| !message.is_empty());
        Ok(RentalOrder {
            stage: CheckoutAction::Deliver.produces(),
            delivery: Some(DeliveryDetails {
                area: form.area.trim().to_string(),
                city: form.city.trim().to_string(),
                street: form.street.trim().to_string(),
                number: form.number.trim().to_string(),
                zip_code: form.zip_code,
                phone: form.phone,
                preferred_time: form.preferred_time.unwrap_or_default(),
                message,
            }),
            ..order
        })
    }

    /// The only step with a side effect. On success the order is final and
    /// can be discarded by the caller.
    pub async fn confirm(
        &self,
        order: RentalOrder,
        sink: &dyn ConfirmationSink,
    ) -> Result<DeliveryConfirmation, CheckoutTransitionError> {
        require_stage(&order, CheckoutAction::Confirm)?;
        sink.process(&order).await.map_err(CheckoutTransitionError::Processing)?;

        Ok(DeliveryConfirmation {
            order: RentalOrder { stage: CheckoutAction::Confirm.produces(), ..order },
            message: CONFIRMATION_MESSAGE.to_string(),
            timeline: DeliveryTimeline::started(),
        })
    }
}

fn require_stage(order: &RentalOrder, action: CheckoutAction) -> Result<(), CheckoutTransitionError> {
    if order.stage == action.requires() {
        Ok(())
    } else {
        Err(CheckoutTransitionError::OutOfOrder { stage: order.stage, action })
    }
}

/// Start date must be a `YYYY-MM-DD` date from today up to one year ahead.
pub fn validate_start_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Please select a rental start date".to_string());
    }
    let start = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| "Enter the start date as YYYY-MM-DD".to_string())?;
    if start < today {
        return Err("Start date cannot be in the past".to_string());
    }
    let latest = today.checked_add_months(Months::new(12)).unwrap_or(NaiveDate::MAX);
    if start > latest {
        return Err("Start date must be within one year".to_string());
    }
    Ok(start)
}
