use std::collections::HashMap;

use tokio::sync::RwLock;

use homerent_core::domain::appliance::{Appliance, ApplianceId};
use homerent_core::domain::feedback::Feedback;
use homerent_core::domain::user::{normalize_username, User, UserId};

use super::{ApplianceRepository, FeedbackRepository, RepositoryError, UserRepository};

/// Keeps insertion order so listings match the SQL repository.
#[derive(Default)]
pub struct InMemoryApplianceRepository {
    appliances: RwLock<Vec<Appliance>>,
}

impl InMemoryApplianceRepository {
    pub fn with_appliances(appliances: Vec<Appliance>) -> Self {
        Self { appliances: RwLock::new(appliances) }
    }
}

#[async_trait::async_trait]
impl ApplianceRepository for InMemoryApplianceRepository {
    async fn list(&self) -> Result<Vec<Appliance>, RepositoryError> {
        Ok(self.appliances.read().await.clone())
    }

    async fn find_by_id(&self, id: &ApplianceId) -> Result<Option<Appliance>, RepositoryError> {
        let appliances = self.appliances.read().await;
        Ok(appliances.iter().find(|appliance| &appliance.id == id).cloned())
    }

    async fn save(&self, appliance: Appliance) -> Result<(), RepositoryError> {
        let mut appliances = self.appliances.write().await;
        match appliances.iter_mut().find(|existing| existing.id == appliance.id) {
            Some(existing) => *existing = appliance,
            None => appliances.push(appliance),
        }
        Ok(())
    }

    async fn delete(&self, id: &ApplianceId) -> Result<Option<Appliance>, RepositoryError> {
        let mut appliances = self.appliances.write().await;
        let position = appliances.iter().position(|appliance| &appliance.id == id);
        Ok(position.map(|idx| appliances.remove(idx)))
    }

    async fn suggest_names(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<String>, RepositoryError> {
        let appliances = self.appliances.read().await;
        Ok(appliances
            .iter()
            .filter(|appliance| appliance.name_starts_with(prefix))
            .take(limit)
            .map(|appliance| appliance.name.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(all)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id.0).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let username = normalize_username(username);
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.user == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let email = email.trim();
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn save(&self, user: User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        for other in users.values().filter(|other| other.id != user.id) {
            if other.user == user.user {
                return Err(RepositoryError::Duplicate { field: "user" });
            }
            if other.email == user.email {
                return Err(RepositoryError::Duplicate { field: "email" });
            }
        }
        users.insert(user.id.0.clone(), user);
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.write().await.remove(&id.0))
    }
}

#[derive(Default)]
pub struct InMemoryFeedbackRepository {
    entries: RwLock<Vec<Feedback>>,
}

#[async_trait::async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn list(&self) -> Result<Vec<Feedback>, RepositoryError> {
        let mut entries = self.entries.read().await.clone();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(entries)
    }

    async fn save(&self, feedback: Feedback) -> Result<(), RepositoryError> {
        self.entries.write().await.push(feedback);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use homerent_core::domain::appliance::{Appliance, ApplianceId};
    use homerent_core::domain::user::{User, UserId};

    use crate::repositories::{
        ApplianceRepository, InMemoryApplianceRepository, InMemoryUserRepository, RepositoryError,
        UserRepository,
    };

    fn appliance(id: &str, name: &str) -> Appliance {
        Appliance {
            id: ApplianceId(id.to_string()),
            name: name.to_string(),
            price: Decimal::from(10),
            details: String::new(),
            available: true,
            img_url: None,
        }
    }

    fn user(id: &str, name: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId(id.to_string()),
            user: name.to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            gender: String::new(),
            img_url: None,
            is_admin: false,
            otp: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn in_memory_appliance_repo_keeps_order_and_replaces_in_place() {
        let repo = InMemoryApplianceRepository::default();
        repo.save(appliance("a", "Fridge")).await.expect("save");
        repo.save(appliance("b", "Fan")).await.expect("save");
        repo.save(appliance("a", "Freezer")).await.expect("replace");

        let names: Vec<String> =
            repo.list().await.expect("list").into_iter().map(|appliance| appliance.name).collect();
        assert_eq!(names, vec!["Freezer", "Fan"]);
        assert_eq!(repo.suggest_names("FR", 5).await.expect("suggest"), vec!["Freezer"]);

        let removed = repo.delete(&ApplianceId("a".to_string())).await.expect("delete");
        assert_eq!(removed.map(|appliance| appliance.name), Some("Freezer".to_string()));
    }

    #[tokio::test]
    async fn in_memory_user_repo_enforces_uniqueness() {
        let repo = InMemoryUserRepository::default();
        repo.save(user("u-1", "salim", "salim@example.com")).await.expect("save");

        let error = repo.save(user("u-2", "salim", "other@example.com")).await.expect_err("dup");
        assert!(matches!(error, RepositoryError::Duplicate { field: "user" }));

        let found = repo.find_by_username("SALIM").await.expect("find");
        assert_eq!(found.map(|user| user.id), Some(UserId("u-1".to_string())));
    }
}
