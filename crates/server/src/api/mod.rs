//! JSON API consumed by the storefront and the admin dashboard.
//!
//! Catalog:
//! - `GET    /getSpecificAppliance`         full catalog
//! - `GET    /api/suggestions?keyword=`     name prefix suggestions
//! - `POST   /inserAppliance`               create (admin)
//! - `PUT    /updateAppliance/{id}`         partial update (admin)
//! - `DELETE /appliances/{id}`              delete (admin)
//! - `POST   /api/recommendations`          budget recommendations
//!
//! Accounts:
//! - `POST   /addUser`, `POST /getUser`, `PUT /updateUser/{user}`
//! - `GET    /verifyUserUpdate/{username}`, `GET /getUserProfile/{username}`
//! - `GET    /getUsers`, `DELETE /deleteUser/{id}` (admin)
//! - `POST   /request-otp`, `POST /verify-otp`, `POST /reset-password`
//!
//! Feedback: `POST /addFeedback`, `GET /getFeedback`.
//!
//! Checkout: `POST /api/checkout/{booking,payment,delivery}`.

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod feedback;
pub mod users;

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Json, Router,
};
use homerent_core::checkout::{CheckoutPipeline, ConfirmationSink};
use homerent_core::config::{AppConfig, CatalogConfig, DisplayConfig};
use homerent_core::pricing::DeterministicPricingEngine;
use homerent_core::recommend::RecommendationEngine;
use homerent_db::repositories::{
    ApplianceRepository, FeedbackRepository, SqlApplianceRepository, SqlFeedbackRepository,
    SqlUserRepository, UserRepository,
};
use homerent_db::DbPool;
use serde::Serialize;

use crate::confirmation::SimulatedConfirmation;
use crate::mailer::{LoggingMailer, OtpMailer};

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub appliances: Arc<dyn ApplianceRepository>,
    pub users: Arc<dyn UserRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub mailer: Arc<dyn OtpMailer>,
    pub confirmation: Arc<dyn ConfirmationSink>,
    pub checkout: Arc<CheckoutPipeline>,
    pub recommender: Arc<RecommendationEngine>,
    pub catalog: CatalogConfig,
    pub display: DisplayConfig,
}

impl AppState {
    pub fn from_pool(pool: DbPool, config: &AppConfig) -> Self {
        Self {
            appliances: Arc::new(SqlApplianceRepository::new(pool.clone())),
            users: Arc::new(SqlUserRepository::new(pool.clone())),
            feedback: Arc::new(SqlFeedbackRepository::new(pool)),
            mailer: Arc::new(LoggingMailer::from_config(&config.mail)),
            confirmation: Arc::new(SimulatedConfirmation::new(config.checkout.processing_delay_ms)),
            checkout: Arc::new(CheckoutPipeline::new(
                DeterministicPricingEngine,
                config.display.currency.clone(),
            )),
            recommender: Arc::new(RecommendationEngine::new()),
            catalog: config.catalog.clone(),
            display: config.display.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    pub dark_mode: bool,
    pub currency: String,
}

/// Presentation settings shared with every client.
pub async fn display_settings(State(state): State<AppState>) -> Json<DisplaySettings> {
    Json(DisplaySettings {
        dark_mode: state.display.dark_mode,
        currency: state.display.currency.clone(),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/getSpecificAppliance", get(catalog::list_appliances))
        .route("/api/suggestions", get(catalog::suggestions))
        .route("/inserAppliance", post(catalog::insert_appliance))
        .route("/updateAppliance/{id}", put(catalog::update_appliance))
        .route("/appliances/{id}", delete(catalog::delete_appliance))
        .route("/api/recommendations", post(catalog::recommendations))
        .route("/addUser", post(users::add_user))
        .route("/getUser", post(users::login))
        .route("/updateUser/{user}", put(users::update_user))
        .route("/verifyUserUpdate/{username}", get(users::verify_user_update))
        .route("/getUsers", get(users::list_users))
        .route("/deleteUser/{id}", delete(users::delete_user))
        .route("/getUserProfile/{username}", get(users::user_profile))
        .route("/request-otp", post(users::request_otp))
        .route("/verify-otp", post(users::verify_otp))
        .route("/reset-password", post(users::reset_password))
        .route("/addFeedback", post(feedback::add_feedback))
        .route("/getFeedback", get(feedback::list_feedback))
        .route("/api/checkout/booking", post(checkout::booking))
        .route("/api/checkout/payment", post(checkout::payment))
        .route("/api/checkout/delivery", post(checkout::delivery))
        .route("/api/settings/display", get(display_settings))
        .with_state(state)
}
