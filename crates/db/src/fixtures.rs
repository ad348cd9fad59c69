use serde::Serialize;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Appliance ids inserted by the demo fixture, in catalog order.
pub const DEMO_APPLIANCE_IDS: &[&str] = &[
    "demo-fridge-x",
    "demo-washing-machine",
    "demo-microwave",
    "demo-vacuum",
    "demo-dishwasher",
    "demo-air-cooler",
    "demo-heater",
    "demo-lamp",
];

pub const DEMO_FEEDBACK_IDS: &[&str] = &["demo-feedback-1"];

/// Deterministic demo catalog for local runs and end-to-end checks.
pub struct DemoCatalog;

impl DemoCatalog {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_catalog.sql");

    /// Loads the fixture. Re-running replaces the demo rows in place.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        sqlx::raw_sql(Self::SQL).execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(SeedResult {
            appliances_seeded: DEMO_APPLIANCE_IDS.len(),
            feedback_seeded: DEMO_FEEDBACK_IDS.len(),
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let appliance_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM appliance WHERE id IN {}",
            sql_array_from_ids(DEMO_APPLIANCE_IDS)
        ))
        .fetch_one(pool)
        .await?;
        let feedback_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM feedback WHERE id IN {}",
            sql_array_from_ids(DEMO_FEEDBACK_IDS)
        ))
        .fetch_one(pool)
        .await?;

        let checks = vec![
            ("appliances", appliance_count == DEMO_APPLIANCE_IDS.len() as i64),
            ("feedback", feedback_count == DEMO_FEEDBACK_IDS.len() as i64),
        ];
        Ok(VerificationResult { all_present: checks.iter().all(|(_, ok)| *ok), checks })
    }

    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;
        sqlx::query(&format!(
            "DELETE FROM appliance WHERE id IN {}",
            sql_array_from_ids(DEMO_APPLIANCE_IDS)
        ))
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!(
            "DELETE FROM feedback WHERE id IN {}",
            sql_array_from_ids(DEMO_FEEDBACK_IDS)
        ))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }
}

fn sql_array_from_ids(ids: &[&str]) -> String {
    let quoted =
        ids.iter().map(|id| format!("'{}'", id.replace('\'', "''"))).collect::<Vec<_>>().join(", ");
    format!("({quoted})")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub appliances_seeded: usize,
    pub feedback_seeded: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{ApplianceRepository, SqlApplianceRepository};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    #[test]
    fn fixture_mentions_every_seeded_id() {
        for id in DEMO_APPLIANCE_IDS.iter().chain(DEMO_FEEDBACK_IDS) {
            assert!(DemoCatalog::SQL.contains(id), "fixture is missing {id}");
        }
    }

    #[tokio::test]
    async fn load_verify_and_clean() {
        let pool = setup().await;

        let seeded = DemoCatalog::load(&pool).await.expect("load");
        assert_eq!(seeded.appliances_seeded, DEMO_APPLIANCE_IDS.len());
        assert!(DemoCatalog::verify(&pool).await.expect("verify").all_present);

        DemoCatalog::load(&pool).await.expect("reload is idempotent");
        let appliances = SqlApplianceRepository::new(pool.clone()).list().await.expect("list");
        let ids: Vec<&str> = appliances.iter().map(|appliance| appliance.id.as_str()).collect();
        assert_eq!(ids, DEMO_APPLIANCE_IDS);

        DemoCatalog::clean(&pool).await.expect("clean");
        assert!(!DemoCatalog::verify(&pool).await.expect("verify").all_present);
    }
}
