use std::env;
use std::sync::{Mutex, OnceLock};

use homerent_cli::commands::{doctor, migrate, quote, recommend, seed};
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("HOMERENT_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_urls() {
    with_env(&[("HOMERENT_DATABASE_URL", "postgres://localhost/homerent")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = file_database_url(&dir);

    with_env(&[("HOMERENT_DATABASE_URL", &url)], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);
        assert_eq!(first_payload["command"], "seed");
        assert_eq!(first_payload["status"], "ok");
        assert_eq!(first_payload["data"]["appliances_seeded"], 8);

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        let second_payload = parse_payload(&second.output);
        assert_eq!(first_payload["message"], second_payload["message"]);
    });
}

#[test]
fn recommend_ranks_the_seeded_catalog_within_budget() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = file_database_url(&dir);

    with_env(&[("HOMERENT_DATABASE_URL", &url)], || {
        assert_eq!(seed::run().exit_code, 0);

        let result = recommend::run("50", None);
        assert_eq!(result.exit_code, 0, "expected recommendations: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "recommend");
        let recommendations = payload["data"]["recommendations"].as_array().expect("array");
        assert_eq!(recommendations.len(), 7);
        assert!(recommendations.iter().all(|item| item["name"] != "Oil Heater"));
        assert!(recommendations.iter().all(|item| item["price"].as_f64().unwrap_or(0.0) <= 50.0));

        let limited = parse_payload(&recommend::run("50", Some(2)).output);
        assert_eq!(limited["data"]["recommendations"].as_array().map(Vec::len), Some(2));
    });
}

#[test]
fn recommend_rejects_invalid_budgets() {
    with_env(&[("HOMERENT_DATABASE_URL", "sqlite::memory:")], || {
        for budget in ["", "abc", "0", "-5"] {
            let result = recommend::run(budget, None);
            assert_eq!(result.exit_code, 2, "budget `{budget}` should be rejected");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["error_class"], "invalid_budget");
            assert_eq!(payload["message"], "Please enter a valid budget greater than 0");
        }
    });
}

#[test]
fn quote_adds_the_insurance_deposit() {
    with_env(&[], || {
        let result = quote::run("15", "2");
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["totals"]["rentalAmount"], 30);
        assert_eq!(payload["data"]["totals"]["insuranceDeposit"], 20);
        assert_eq!(payload["data"]["totals"]["finalAmount"], 50);
        assert_eq!(payload["data"]["currency"], "OMR");

        let clamped = parse_payload(&quote::run("15", "0").output);
        assert_eq!(clamped["data"]["days"], 1);
        assert_eq!(clamped["data"]["totals"]["finalAmount"], 35);

        let rejected = quote::run("free", "2");
        assert_eq!(rejected.exit_code, 2);
        assert_eq!(parse_payload(&rejected.output)["error_class"], "invalid_input");

        let overflowing = quote::run("79228162514264337593543950335", "2");
        assert_eq!(overflowing.exit_code, 2);
        let payload = parse_payload(&overflowing.output);
        assert_eq!(payload["error_class"], "invalid_input");
        assert_eq!(payload["message"], "rental amount is out of range");
    });
}

#[test]
fn doctor_reports_missing_schema_until_migrated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = file_database_url(&dir);

    with_env(&[("HOMERENT_DATABASE_URL", &url)], || {
        let before = doctor::run(true);
        assert_eq!(before.exit_code, 6);
        let report = parse_payload(&before.output);
        assert_eq!(report["overall_status"], "fail");
        assert_eq!(report["checks"][1]["status"], "pass");
        assert_eq!(report["checks"][2]["name"], "catalog_schema");
        assert_eq!(report["checks"][2]["status"], "fail");

        assert_eq!(migrate::run().exit_code, 0);

        let after = doctor::run(true);
        assert_eq!(after.exit_code, 0, "expected readiness: {}", after.output);
        assert_eq!(parse_payload(&after.output)["overall_status"], "pass");
    });
}

#[test]
fn doctor_skips_database_checks_when_config_is_invalid() {
    with_env(&[("HOMERENT_CATALOG_SUGGESTION_LIMIT", "0")], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 6);
        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [fail] config_validation"));
        assert!(result.output.contains("- [skip] database_connectivity"));
    });
}

fn file_database_url(dir: &tempfile::TempDir) -> String {
    format!("sqlite://{}", dir.path().join("homerent.db").display())
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let keys = [
        "HOMERENT_DATABASE_URL",
        "HOMERENT_DATABASE_MAX_CONNECTIONS",
        "HOMERENT_DATABASE_TIMEOUT_SECS",
        "HOMERENT_SERVER_BIND_ADDRESS",
        "HOMERENT_SERVER_PORT",
        "HOMERENT_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "HOMERENT_CATALOG_API_BASE_URL",
        "HOMERENT_CATALOG_REFRESH_INTERVAL_SECS",
        "HOMERENT_CATALOG_SUGGESTION_LIMIT",
        "HOMERENT_CATALOG_RECOMMENDATION_LIMIT",
        "HOMERENT_CHECKOUT_PROCESSING_DELAY_MS",
        "HOMERENT_MAIL_ENABLED",
        "HOMERENT_MAIL_SENDER",
        "HOMERENT_MAIL_SMTP_PASSWORD",
        "HOMERENT_DISPLAY_DARK_MODE",
        "HOMERENT_DISPLAY_CURRENCY",
        "HOMERENT_LOGGING_LEVEL",
        "HOMERENT_LOGGING_FORMAT",
        "HOMERENT_LOG_LEVEL",
        "HOMERENT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
