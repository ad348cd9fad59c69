use async_trait::async_trait;
use thiserror::Error;

use homerent_core::domain::appliance::{Appliance, ApplianceId};
use homerent_core::domain::feedback::Feedback;
use homerent_core::domain::user::{User, UserId};
use homerent_core::errors::ApplicationError;

pub mod appliance;
pub mod feedback;
pub mod memory;
pub mod user;

pub use appliance::SqlApplianceRepository;
pub use feedback::SqlFeedbackRepository;
pub use memory::{
    InMemoryApplianceRepository, InMemoryFeedbackRepository, InMemoryUserRepository,
};
pub use user::SqlUserRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("duplicate {field}")]
    Duplicate { field: &'static str },
}

impl RepositoryError {
    pub(crate) fn decode(error: impl std::fmt::Display) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Duplicate { field: "email" } => {
                Self::Conflict("Email already exists.".to_string())
            }
            RepositoryError::Duplicate { .. } => Self::Conflict("User already exists.".to_string()),
            other => Self::Persistence(other.to_string()),
        }
    }
}

#[async_trait]
pub trait ApplianceRepository: Send + Sync {
    /// Every appliance in insertion order.
    async fn list(&self) -> Result<Vec<Appliance>, RepositoryError>;
    async fn find_by_id(&self, id: &ApplianceId) -> Result<Option<Appliance>, RepositoryError>;
    /// Inserts or replaces by id.
    async fn save(&self, appliance: Appliance) -> Result<(), RepositoryError>;
    /// Returns the removed appliance.
    async fn delete(&self, id: &ApplianceId) -> Result<Option<Appliance>, RepositoryError>;
    /// Names starting with `prefix`, catalog order. Case folding covers ASCII
    /// letters only, so `"é"` and `"É"` are distinct.
    async fn suggest_names(&self, prefix: &str, limit: usize)
        -> Result<Vec<String>, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    /// Case-insensitive.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    /// Inserts or replaces by id. Fails with [`RepositoryError::Duplicate`]
    /// when another account holds the username or email.
    async fn save(&self, user: User) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
}

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Newest first.
    async fn list(&self) -> Result<Vec<Feedback>, RepositoryError>;
    async fn save(&self, feedback: Feedback) -> Result<(), RepositoryError>;
}

/// Escapes `LIKE` wildcards so user input matches literally under `ESCAPE '\'`.
pub(crate) fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
