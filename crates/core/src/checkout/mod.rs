//! Rental checkout: Booking -> Payment -> Delivery -> confirmation.
//!
//! The order travels between steps by value. Each step also has a handoff
//! record with the camelCase field names the next step reads.

pub mod engine;
pub mod order;
pub mod states;
pub mod timeline;

pub use engine::{
    validate_start_date, CheckoutPipeline, CheckoutTransitionError, ConfirmationSink,
    DeliveryConfirmation, ImmediateConfirmation, CONFIRMATION_MESSAGE,
};
pub use order::{end_date, final_amount_mismatch, PaymentDetails, RentalOrder, RentalSchedule};
pub use states::{
    ApplianceSummary, BankTransferDetails, BookingForm, BookingHandoff, CardDetails,
    CheckoutAction, CheckoutStage, DeliveryDetails, DeliveryForm, PaymentForm, PaymentHandoff,
    PaymentMethod, PreferredTime, RentalPeriod, BANK_TRANSFER_DETAILS,
};
pub use timeline::{DeliveryTimeline, StepStatus, TimelineStep};
