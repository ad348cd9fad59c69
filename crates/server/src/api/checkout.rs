//! Stateless checkout steps. Each request carries the handoff record produced
//! by the previous step and gets the next one back.

use axum::{extract::State, Json};
use chrono::Utc;
use homerent_core::checkout::{
    final_amount_mismatch, BankTransferDetails, BookingForm, BookingHandoff, DeliveryConfirmation,
    DeliveryForm, PaymentForm, PaymentHandoff, PaymentMethod, RentalOrder, TimelineStep,
    BANK_TRANSFER_DETAILS,
};
use homerent_core::pricing::RentalQuote;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub handoff: BookingHandoff,
    pub quote: RentalQuote,
    pub order: RentalOrder,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PaymentRequest {
    pub handoff: BookingHandoff,
    pub form: PaymentForm,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub handoff: PaymentHandoff,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankTransferDetails>,
    pub order: RentalOrder,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeliveryRequest {
    pub handoff: PaymentHandoff,
    pub form: DeliveryForm,
}

#[derive(Debug, Serialize)]
pub struct DeliveryResponse {
    #[serde(flatten)]
    pub confirmation: DeliveryConfirmation,
    pub steps: Vec<TimelineStep>,
}

pub async fn booking(
    State(state): State<AppState>,
    Json(form): Json<BookingForm>,
) -> Result<Json<BookingResponse>, ApiError> {
    let order = state.checkout.book(form.clone())?;
    let quote = state.checkout.quote(&form)?;

    info!(
        event_name = "checkout.booking.accepted",
        correlation_id = "checkout",
        final_amount = %order.totals.final_amount,
        "booking step completed"
    );
    Ok(Json(BookingResponse { handoff: order.booking_handoff(), quote, order }))
}

pub async fn payment(
    State(state): State<AppState>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    if final_amount_mismatch(&request.handoff) {
        warn!(
            event_name = "checkout.payment.amount_mismatch",
            correlation_id = "checkout",
            total_amount = ?request.handoff.total_amount,
            final_amount = ?request.handoff.final_amount,
            "handoff final amount disagrees with its rental amount; using the derived value"
        );
    }

    let order = RentalOrder::from_booking_handoff(request.handoff);
    let paid = state.checkout.pay(order, request.form, Utc::now().date_naive())?;
    let bank_details = paid
        .payment
        .as_ref()
        .filter(|payment| payment.method == PaymentMethod::Bank)
        .map(|_| BANK_TRANSFER_DETAILS);

    info!(event_name = "checkout.payment.accepted", correlation_id = "checkout", "payment step completed");
    Ok(Json(PaymentResponse { handoff: paid.payment_handoff(), bank_details, order: paid }))
}

pub async fn delivery(
    State(state): State<AppState>,
    Json(request): Json<DeliveryRequest>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let order = RentalOrder::from_payment_handoff(request.handoff);
    let delivered = state.checkout.deliver(order, request.form)?;
    let confirmation = state.checkout.confirm(delivered, state.confirmation.as_ref()).await?;

    info!(
        event_name = "checkout.order.confirmed",
        correlation_id = "checkout",
        final_amount = %confirmation.order.totals.final_amount,
        "rental order confirmed"
    );
    let steps = confirmation.timeline.steps();
    Ok(Json(DeliveryResponse { confirmation, steps }))
}
