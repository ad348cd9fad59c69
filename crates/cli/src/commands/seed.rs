use crate::commands::{load_config, runtime, CommandResult};
use homerent_db::{connect_with_config, migrations, DemoCatalog, SeedResult};
use serde_json::json;

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let seeded = DemoCatalog::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = DemoCatalog::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let outcome = if verification.all_present {
            Ok(seeded)
        } else {
            let failed = verification
                .checks
                .iter()
                .filter_map(|(check, passed)| (!passed).then_some(*check))
                .collect::<Vec<_>>();
            Err(("seed_verification", verification_message(&failed), 6u8))
        };

        pool.close().await;
        outcome
    });

    match result {
        Ok(seeded) => CommandResult::success_with("seed", seed_message(&seeded), Some(json!(seeded))),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn seed_message(seeded: &SeedResult) -> String {
    format!(
        "demo catalog loaded: {} appliances, {} feedback entries",
        seeded.appliances_seeded, seeded.feedback_seeded
    )
}

fn verification_message(failed_checks: &[&str]) -> String {
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::{seed_message, verification_message};
    use homerent_db::SeedResult;

    #[test]
    fn verification_message_names_failed_checks() {
        assert_eq!(
            verification_message(&["appliances", "feedback"]),
            "Seed verification failed for checks: appliances, feedback"
        );
        assert_eq!(verification_message(&[]), "Some seed data failed to load");
    }

    #[test]
    fn seed_message_counts_rows() {
        let seeded = SeedResult { appliances_seeded: 8, feedback_seeded: 1 };
        assert_eq!(seed_message(&seeded), "demo catalog loaded: 8 appliances, 1 feedback entries");
    }
}
