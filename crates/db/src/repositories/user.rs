use chrono::{DateTime, Utc};
use sqlx::Row;

use homerent_core::credentials::OtpChallenge;
use homerent_core::domain::user::{normalize_username, User, UserId};

use super::{RepositoryError, UserRepository};
use crate::DbPool;

pub struct SqlUserRepository {
    pool: DbPool,
}

impl SqlUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE {column} = ?"))
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }
}

const SELECT_USER: &str = "SELECT id, username, email, password_hash, gender, img_url, is_admin,
        otp_code, otp_expires_at, created_at, updated_at
     FROM app_user";

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(RepositoryError::decode)
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, RepositoryError> {
    let id: String = row.try_get("id").map_err(RepositoryError::decode)?;
    let username: String = row.try_get("username").map_err(RepositoryError::decode)?;
    let email: String = row.try_get("email").map_err(RepositoryError::decode)?;
    let password_hash: String = row.try_get("password_hash").map_err(RepositoryError::decode)?;
    let gender: String = row.try_get("gender").map_err(RepositoryError::decode)?;
    let img_url: Option<String> = row.try_get("img_url").map_err(RepositoryError::decode)?;
    let is_admin: bool = row.try_get("is_admin").map_err(RepositoryError::decode)?;
    let otp_code: Option<String> = row.try_get("otp_code").map_err(RepositoryError::decode)?;
    let otp_expires_at: Option<String> =
        row.try_get("otp_expires_at").map_err(RepositoryError::decode)?;
    let created_at: String = row.try_get("created_at").map_err(RepositoryError::decode)?;
    let updated_at: String = row.try_get("updated_at").map_err(RepositoryError::decode)?;

    let otp = match (otp_code, otp_expires_at) {
        (Some(code), Some(expires_at)) => {
            Some(OtpChallenge { code, expires_at: parse_timestamp(&expires_at)? })
        }
        _ => None,
    };

    Ok(User {
        id: UserId(id),
        user: username,
        email,
        password_hash,
        gender,
        img_url,
        is_admin,
        otp,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn map_unique_violation(error: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            let field = if db_error.message().contains("app_user.email") { "email" } else { "user" };
            return RepositoryError::Duplicate { field };
        }
    }
    RepositoryError::Database(error)
}

#[async_trait::async_trait]
impl UserRepository for SqlUserRepository {
    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_USER} ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_user).collect()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.find_one("id", &id.0).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one("username", &normalize_username(username)).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one("email", email.trim()).await
    }

    async fn save(&self, user: User) -> Result<(), RepositoryError> {
        let (otp_code, otp_expires_at) = match &user.otp {
            Some(challenge) => (Some(challenge.code.clone()), Some(challenge.expires_at.to_rfc3339())),
            None => (None, None),
        };

        sqlx::query(
            "INSERT INTO app_user
                (id, username, email, password_hash, gender, img_url, is_admin,
                 otp_code, otp_expires_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                email = excluded.email,
                password_hash = excluded.password_hash,
                gender = excluded.gender,
                img_url = excluded.img_url,
                is_admin = excluded.is_admin,
                otp_code = excluded.otp_code,
                otp_expires_at = excluded.otp_expires_at,
                updated_at = excluded.updated_at",
        )
        .bind(&user.id.0)
        .bind(&user.user)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.gender)
        .bind(&user.img_url)
        .bind(user.is_admin)
        .bind(otp_code)
        .bind(otp_expires_at)
        .bind(user.created_at.to_rfc3339())
        .bind(user.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        sqlx::query("DELETE FROM app_user WHERE id = ?").bind(&id.0).execute(&self.pool).await?;
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use homerent_core::credentials::OtpChallenge;
    use homerent_core::domain::user::{User, UserId};

    use super::SqlUserRepository;
    use crate::repositories::{RepositoryError, UserRepository};
    use crate::{connect_with_settings, migrations};

    async fn repo() -> SqlUserRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlUserRepository::new(pool)
    }

    fn user(id: &str, name: &str, email: &str) -> User {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).single().expect("timestamp");
        User {
            id: UserId(id.to_string()),
            user: name.to_string(),
            email: email.to_string(),
            password_hash: "$2b$10$placeholder".to_string(),
            gender: "female".to_string(),
            img_url: None,
            is_admin: false,
            otp: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn lookups_by_username_are_case_insensitive() {
        let repo = repo().await;
        let stored = user("u-1", "maryam", "maryam@example.com");
        repo.save(stored.clone()).await.expect("save");

        assert_eq!(repo.find_by_username(" Maryam ").await.expect("find"), Some(stored.clone()));
        assert_eq!(repo.find_by_email("maryam@example.com").await.expect("find"), Some(stored));
        assert_eq!(repo.find_by_username("other").await.expect("find"), None);
    }

    #[tokio::test]
    async fn otp_challenge_survives_a_round_trip() {
        let repo = repo().await;
        let mut stored = user("u-1", "salim", "salim@example.com");
        let issued = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).single().expect("timestamp");
        stored.otp = Some(OtpChallenge::with_code("123456", issued));
        repo.save(stored.clone()).await.expect("save");

        let found = repo.find_by_id(&stored.id).await.expect("find").expect("present");
        assert_eq!(found.otp, stored.otp);

        stored.otp = None;
        repo.save(stored.clone()).await.expect("clear otp");
        let found = repo.find_by_id(&stored.id).await.expect("find").expect("present");
        assert!(found.otp.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_reported() {
        let repo = repo().await;
        repo.save(user("u-1", "salim", "shared@example.com")).await.expect("save");

        let error = repo.save(user("u-2", "amal", "shared@example.com")).await.expect_err("duplicate");
        assert!(matches!(error, RepositoryError::Duplicate { field: "email" }));

        let error = repo.save(user("u-3", "salim", "other@example.com")).await.expect_err("duplicate");
        assert!(matches!(error, RepositoryError::Duplicate { field: "user" }));
    }

    #[tokio::test]
    async fn delete_returns_removed_user() {
        let repo = repo().await;
        let stored = user("u-1", "salim", "salim@example.com");
        repo.save(stored.clone()).await.expect("save");

        assert_eq!(repo.delete(&stored.id).await.expect("delete"), Some(stored.clone()));
        assert!(repo.list().await.expect("list").is_empty());
        assert_eq!(repo.delete(&stored.id).await.expect("delete"), None);
    }
}
