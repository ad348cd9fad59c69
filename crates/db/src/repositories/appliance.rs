use rust_decimal::Decimal;
use sqlx::Row;

use homerent_core::domain::amount;
use homerent_core::domain::appliance::{Appliance, ApplianceId};

use super::{like_prefix, ApplianceRepository, RepositoryError};
use crate::DbPool;

pub struct SqlApplianceRepository {
    pool: DbPool,
}

impl SqlApplianceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const SELECT_APPLIANCE: &str =
    "SELECT id, name, price, details, available, img_url FROM appliance";

fn row_to_appliance(row: &sqlx::sqlite::SqliteRow) -> Result<Appliance, RepositoryError> {
    let id: String = row.try_get("id").map_err(RepositoryError::decode)?;
    let name: String = row.try_get("name").map_err(RepositoryError::decode)?;
    let price: String = row.try_get("price").map_err(RepositoryError::decode)?;
    let details: String = row.try_get("details").map_err(RepositoryError::decode)?;
    let available: bool = row.try_get("available").map_err(RepositoryError::decode)?;
    let img_url: Option<String> = row.try_get("img_url").map_err(RepositoryError::decode)?;

    Ok(Appliance {
        id: ApplianceId(id),
        name,
        price: amount::parse_decimal(&price).unwrap_or(Decimal::ZERO),
        details,
        available,
        img_url,
    })
}

#[async_trait::async_trait]
impl ApplianceRepository for SqlApplianceRepository {
    async fn list(&self) -> Result<Vec<Appliance>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_APPLIANCE} ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_appliance).collect()
    }

    async fn find_by_id(&self, id: &ApplianceId) -> Result<Option<Appliance>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_APPLIANCE} WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_appliance).transpose()
    }

    async fn save(&self, appliance: Appliance) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO appliance (id, name, price, details, available, img_url)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                price = excluded.price,
                details = excluded.details,
                available = excluded.available,
                img_url = excluded.img_url",
        )
        .bind(appliance.id.as_str())
        .bind(&appliance.name)
        .bind(appliance.price.normalize().to_string())
        .bind(&appliance.details)
        .bind(appliance.available)
        .bind(&appliance.img_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &ApplianceId) -> Result<Option<Appliance>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!("{SELECT_APPLIANCE} WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let appliance = row_to_appliance(&row)?;
        sqlx::query("DELETE FROM appliance WHERE id = ?").bind(id.as_str()).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(Some(appliance))
    }

    async fn suggest_names(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<String>, RepositoryError> {
        // LIKE folds ASCII case only; the in-memory repository matches that.
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM appliance
             WHERE name LIKE ? ESCAPE '\\'
             ORDER BY rowid
             LIMIT ?",
        )
        .bind(like_prefix(prefix))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use homerent_core::domain::appliance::{Appliance, ApplianceId};

    use super::SqlApplianceRepository;
    use crate::repositories::ApplianceRepository;
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn appliance(id: &str, name: &str, price: i64) -> Appliance {
        Appliance {
            id: ApplianceId(id.to_string()),
            name: name.to_string(),
            price: Decimal::from(price),
            details: format!("{name} details"),
            available: true,
            img_url: None,
        }
    }

    #[tokio::test]
    async fn save_find_update_and_delete() {
        let repo = SqlApplianceRepository::new(setup().await);
        let mut fridge = appliance("a-1", "Fridge X", 40);
        fridge.price = Decimal::new(125, 1);

        repo.save(fridge.clone()).await.expect("save");
        assert_eq!(repo.find_by_id(&fridge.id).await.expect("find"), Some(fridge.clone()));

        fridge.available = false;
        fridge.img_url = Some("https://img.example/fridge.png".to_string());
        repo.save(fridge.clone()).await.expect("update");
        assert_eq!(repo.list().await.expect("list"), vec![fridge.clone()]);

        assert_eq!(repo.delete(&fridge.id).await.expect("delete"), Some(fridge.clone()));
        assert_eq!(repo.delete(&fridge.id).await.expect("delete again"), None);
        assert!(repo.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn suggestions_match_prefix_case_insensitively() {
        let repo = SqlApplianceRepository::new(setup().await);
        for (idx, name) in ["Fridge X", "fan", "Air Fryer", "Freezer", "Food Processor", "Fondue Set", "Fire Pit"]
            .iter()
            .enumerate()
        {
            repo.save(appliance(&format!("a-{idx}"), name, 10)).await.expect("save");
        }

        let names = repo.suggest_names("F", 5).await.expect("suggest");
        assert_eq!(names.len(), 5);
        assert!(names.iter().all(|name| name.to_lowercase().starts_with('f')));

        assert_eq!(repo.suggest_names("fr", 5).await.expect("suggest"), vec!["Fridge X", "Freezer"]);
        assert!(repo.suggest_names("%", 5).await.expect("suggest").is_empty());
    }
}
