use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use homerent_core::credentials::{OtpError, PasswordHashError};
use homerent_core::errors::{ApplicationError, InterfaceError};
use homerent_core::{BudgetError, CheckoutTransitionError, ValidationErrors};
use homerent_db::RepositoryError;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

/// Body of every non-2xx response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self { status: StatusCode::UNAUTHORIZED, message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[cfg(test)]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<InterfaceError> for ApiError {
    fn from(value: InterfaceError) -> Self {
        let status = match &value {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: value.user_message().to_string() }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = Uuid::new_v4().to_string();
        match &value {
            ApplicationError::Persistence(_)
            | ApplicationError::Integration(_)
            | ApplicationError::Configuration(_) => error!(
                event_name = "api.request.failed",
                correlation_id = %correlation_id,
                error = %value,
                "request failed on the server side"
            ),
            _ => warn!(
                event_name = "api.request.rejected",
                correlation_id = %correlation_id,
                error = %value,
                "request rejected"
            ),
        }
        value.into_interface(correlation_id).into()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::from(value).into()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        ApplicationError::from(value).into()
    }
}

impl From<OtpError> for ApiError {
    fn from(value: OtpError) -> Self {
        ApplicationError::from(value).into()
    }
}

impl From<PasswordHashError> for ApiError {
    fn from(value: PasswordHashError) -> Self {
        let correlation_id = Uuid::new_v4().to_string();
        error!(
            event_name = "api.password.hash_failed",
            correlation_id = %correlation_id,
            error = %value,
            "password could not be hashed"
        );
        Self::internal(format!("Could not store the password (reference {correlation_id})."))
    }
}

impl From<BudgetError> for ApiError {
    fn from(value: BudgetError) -> Self {
        ApplicationError::from(value).into()
    }
}

impl From<CheckoutTransitionError> for ApiError {
    fn from(value: CheckoutTransitionError) -> Self {
        match value {
            CheckoutTransitionError::Processing(message) => {
                ApplicationError::Integration(message).into()
            }
            other => ApplicationError::from(other).into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { message: self.message })).into_response()
    }
}
