use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationErrors;

pub const ANONYMOUS_USER: &str = "Anonymous";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(rename = "_id", alias = "id")]
    pub id: FeedbackId,
    pub user: String,
    pub email: String,
    pub message: String,
    pub rating: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: String,
    /// Zero means no star was selected.
    #[serde(default)]
    pub rating: u8,
}

impl NewFeedback {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.message.trim().is_empty() {
            errors.add("message", "Please enter your feedback message.");
        }
        if self.rating == 0 {
            errors.add("rating", "Please select a rating.");
        } else if self.rating > 5 {
            errors.add("rating", "Rating must be between 1 and 5.");
        }
        errors.into_result()
    }

    /// Missing or blank authors are recorded as anonymous.
    pub fn into_feedback(self, id: FeedbackId, now: DateTime<Utc>) -> Feedback {
        let user = self
            .user
            .map(|user| user.trim().to_string())
            .filter(|user| !user.is_empty())
            .unwrap_or_else(|| ANONYMOUS_USER.to_string());
        Feedback {
            id,
            user,
            email: self.email.unwrap_or_default().trim().to_string(),
            message: self.message.trim().to_string(),
            rating: self.rating,
            created_at: now,
        }
    }
}
