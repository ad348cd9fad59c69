pub mod catalog;
pub mod checkout;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod errors;
pub mod pricing;
pub mod recommend;
pub mod validation;

pub use catalog::{Catalog, RefreshSequencer, RefreshTicket};
pub use checkout::{
    CheckoutPipeline, CheckoutStage, CheckoutTransitionError, ConfirmationSink,
    DeliveryConfirmation, RentalOrder,
};
pub use domain::appliance::{Appliance, ApplianceId, AppliancePatch, NewAppliance};
pub use domain::feedback::{Feedback, FeedbackId, NewFeedback};
pub use domain::user::{User, UserId, UserProfile, UserSummary};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use pricing::{
    compute_totals, DeterministicPricingEngine, PricingEngine, PricingError, RentalDays, RentalQuote,
    RentalTotals, INSURANCE_DEPOSIT,
};
pub use recommend::{recommend, Budget, BudgetError, Recommendation, RecommendationEngine};
pub use validation::ValidationErrors;
