use chrono::{DateTime, Utc};
use sqlx::Row;

use homerent_core::domain::feedback::{Feedback, FeedbackId};

use super::{FeedbackRepository, RepositoryError};
use crate::DbPool;

pub struct SqlFeedbackRepository {
    pool: DbPool,
}

impl SqlFeedbackRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_feedback(row: &sqlx::sqlite::SqliteRow) -> Result<Feedback, RepositoryError> {
    let id: String = row.try_get("id").map_err(RepositoryError::decode)?;
    let user: String = row.try_get("user_name").map_err(RepositoryError::decode)?;
    let email: String = row.try_get("email").map_err(RepositoryError::decode)?;
    let message: String = row.try_get("message").map_err(RepositoryError::decode)?;
    let rating: i64 = row.try_get("rating").map_err(RepositoryError::decode)?;
    let created_at: String = row.try_get("created_at").map_err(RepositoryError::decode)?;

    Ok(Feedback {
        id: FeedbackId(id),
        user,
        email,
        message,
        rating: u8::try_from(rating).map_err(RepositoryError::decode)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(RepositoryError::decode)?,
    })
}

#[async_trait::async_trait]
impl FeedbackRepository for SqlFeedbackRepository {
    async fn list(&self) -> Result<Vec<Feedback>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, user_name, email, message, rating, created_at
             FROM feedback
             ORDER BY created_at DESC, id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_feedback).collect()
    }

    async fn save(&self, feedback: Feedback) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO feedback (id, user_name, email, message, rating, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&feedback.id.0)
        .bind(&feedback.user)
        .bind(&feedback.email)
        .bind(&feedback.message)
        .bind(i64::from(feedback.rating))
        .bind(feedback.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use homerent_core::domain::feedback::{Feedback, FeedbackId};

    use super::SqlFeedbackRepository;
    use crate::repositories::FeedbackRepository;
    use crate::{connect_with_settings, migrations};

    fn feedback(id: &str, minutes: i64, rating: u8) -> Feedback {
        let base = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).single().expect("timestamp");
        Feedback {
            id: FeedbackId(id.to_string()),
            user: "Anonymous".to_string(),
            email: String::new(),
            message: format!("feedback {id}"),
            rating,
            created_at: base + Duration::minutes(minutes),
        }
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlFeedbackRepository::new(pool);

        repo.save(feedback("f-1", 0, 4)).await.expect("save");
        repo.save(feedback("f-2", 5, 5)).await.expect("save");

        let ids: Vec<String> =
            repo.list().await.expect("list").into_iter().map(|entry| entry.id.0).collect();
        assert_eq!(ids, vec!["f-2", "f-1"]);
    }

    #[tokio::test]
    async fn rating_outside_range_is_rejected_by_schema() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlFeedbackRepository::new(pool);

        assert!(repo.save(feedback("f-1", 0, 6)).await.is_err());
    }
}
