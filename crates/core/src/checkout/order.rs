use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::states::{
    ApplianceSummary, BookingHandoff, CardDetails, CheckoutStage, DeliveryDetails,
    PaymentHandoff, PaymentMethod, RentalPeriod,
};
use crate::pricing::{RentalDays, RentalTotals};

/// Each rental day unit spans a week of calendar time.
pub const CALENDAR_DAYS_PER_RENTAL_DAY: u64 = 7;

/// Start and end of a rental. The end date is derived and recomputed whenever
/// the start or the length changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalSchedule {
    start: NaiveDate,
    days: RentalDays,
    end: NaiveDate,
}

impl RentalSchedule {
    /// `None` when the end date falls outside the calendar.
    pub fn new(start: NaiveDate, days: RentalDays) -> Option<Self> {
        let end = end_date(start, days)?;
        Some(Self { start, days, end })
    }

    pub fn with_start(self, start: NaiveDate) -> Option<Self> {
        Self::new(start, self.days)
    }

    pub fn with_days(self, days: RentalDays) -> Option<Self> {
        Self::new(self.start, days)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn days(&self) -> RentalDays {
        self.days
    }

    pub fn period(&self) -> RentalPeriod {
        RentalPeriod { start: Some(self.start), end: Some(self.end) }
    }
}

/// `start + days * 7` calendar days.
pub fn end_date(start: NaiveDate, days: RentalDays) -> Option<NaiveDate> {
    let span = u64::from(days.get()).checked_mul(CALENDAR_DAYS_PER_RENTAL_DAY)?;
    start.checked_add_days(Days::new(span))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub email: String,
    pub method: PaymentMethod,
    /// Present for card payments only.
    pub card: Option<CardDetails>,
    pub schedule: Option<RentalSchedule>,
}

/// A rental being checked out. Lives only for the duration of a checkout and
/// is never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalOrder {
    pub stage: CheckoutStage,
    pub appliance: Option<ApplianceSummary>,
    pub price_per_day: Option<Decimal>,
    pub days: Option<RentalDays>,
    pub totals: RentalTotals,
    pub payment: Option<PaymentDetails>,
    pub delivery: Option<DeliveryDetails>,
}

impl RentalOrder {
    /// Rebuilds a booked order from the booking handoff. Missing amounts give
    /// empty totals; a present rental amount always re-derives the final amount.
    pub fn from_booking_handoff(handoff: BookingHandoff) -> Self {
        Self {
            stage: CheckoutStage::Booking,
            totals: handoff_totals(&handoff),
            appliance: handoff.appliance,
            price_per_day: None,
            days: handoff.days,
            payment: None,
            delivery: None,
        }
    }

    /// Rebuilds a paid order from the payment handoff.
    pub fn from_payment_handoff(handoff: PaymentHandoff) -> Self {
        let mut order = Self::from_booking_handoff(handoff.booking);
        order.stage = CheckoutStage::Payment;
        let start = handoff.start_date.or(handoff.rental_period.start);
        let schedule = match (start, order.days) {
            (Some(start), Some(days)) => RentalSchedule::new(start, days),
            _ => None,
        };
        order.payment = handoff.payment_method.map(|method| PaymentDetails {
            email: handoff.email,
            method,
            card: method.uses_card().then(|| CardDetails {
                number: handoff.card_number,
                expiry: handoff.expiry_date,
                cvv: handoff.cvv,
            }),
            schedule,
        });
        order
    }

    pub fn booking_handoff(&self) -> BookingHandoff {
        let has_totals = !self.totals.is_empty();
        BookingHandoff {
            total_amount: has_totals.then_some(self.totals.rental_amount),
            final_amount: has_totals.then_some(self.totals.final_amount),
            appliance: self.appliance.clone(),
            days: self.days,
        }
    }

    pub fn payment_handoff(&self) -> PaymentHandoff {
        let mut handoff =
            PaymentHandoff { booking: self.booking_handoff(), ..PaymentHandoff::default() };
        if let Some(payment) = &self.payment {
            handoff.email = payment.email.clone();
            handoff.payment_method = Some(payment.method);
            if let Some(card) = &payment.card {
                handoff.card_number = card.number.clone();
                handoff.expiry_date = card.expiry.clone();
                handoff.cvv = card.cvv.clone();
            }
            if let Some(schedule) = &payment.schedule {
                handoff.start_date = Some(schedule.start());
                handoff.end_date = Some(schedule.end());
                handoff.rental_period = schedule.period();
            }
        }
        handoff
    }
}

/// A rental amount too large to carry the deposit is treated like a missing one.
fn handoff_totals(handoff: &BookingHandoff) -> RentalTotals {
    handoff
        .total_amount
        .and_then(|rental_amount| RentalTotals::from_rental_amount(rental_amount).ok())
        .unwrap_or_else(RentalTotals::empty)
}

/// True when the handoff carries a final amount that disagrees with its rental amount.
pub fn final_amount_mismatch(handoff: &BookingHandoff) -> bool {
    match (handoff.total_amount, handoff.final_amount) {
        (Some(_), Some(final_amount)) => final_amount != handoff_totals(handoff).final_amount,
        _ => false,
    }
}
