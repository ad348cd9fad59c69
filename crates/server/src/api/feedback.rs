use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use homerent_core::domain::feedback::{Feedback, FeedbackId, NewFeedback};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct FeedbackReceipt {
    pub message: &'static str,
    pub feedback: Feedback,
}

pub async fn add_feedback(
    State(state): State<AppState>,
    Json(body): Json<NewFeedback>,
) -> Result<(StatusCode, Json<FeedbackReceipt>), ApiError> {
    body.validate()?;
    let feedback = body.into_feedback(FeedbackId(Uuid::new_v4().to_string()), Utc::now());
    state.feedback.save(feedback.clone()).await?;

    info!(
        event_name = "feedback.received",
        correlation_id = %feedback.id.0,
        rating = feedback.rating,
        "feedback stored"
    );
    Ok((
        StatusCode::CREATED,
        Json(FeedbackReceipt { message: "Feedback submitted successfully.", feedback }),
    ))
}

pub async fn list_feedback(State(state): State<AppState>) -> Result<Json<Vec<Feedback>>, ApiError> {
    Ok(Json(state.feedback.list().await?))
}
