use std::env;
use std::sync::{Mutex, OnceLock};

use salit_cli::commands::{analyze, doctor, migrate, recommend};
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("SALIT_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_connectivity_failure_with_unreachable_database() {
    with_env(
        &[("SALIT_DATABASE_URL", "sqlite:///definitely/not/here/salit.db")],
        || {
            let result = migrate::run();
            assert_eq!(result.exit_code, 4, "expected db connectivity failure code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["status"], "error");
            assert_eq!(payload["error_class"], "db_connectivity");
        },
    );
}

#[test]
fn analyze_reports_zero_counts_for_empty_history() {
    with_env(&[("SALIT_DATABASE_URL", "sqlite::memory:")], || {
        let result = analyze::run("user-1");
        assert_eq!(result.exit_code, 0, "expected successful analyze run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "analyze");
        assert_eq!(payload["status"], "ok");
        assert_eq!(
            payload["message"],
            "processed 0 products, generated 0 predictions"
        );
    });
}

#[test]
fn analyze_rejects_blank_user() {
    with_env(&[("SALIT_DATABASE_URL", "sqlite::memory:")], || {
        let result = analyze::run("   ");
        assert_eq!(result.exit_code, 6, "expected missing user failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "missing_user");
    });
}

#[test]
fn recommend_falls_back_to_static_table() {
    let state_dir = tempfile::tempdir().expect("tempdir");
    let state_path = state_dir.path().join("state.json");

    with_env(
        &[
            ("SALIT_DATABASE_URL", "sqlite::memory:"),
            ("SALIT_RECOMMENDER_STATE_PATH", state_path.to_str().expect("utf-8 path")),
        ],
        || {
            let result = recommend::run("פסטה");
            assert_eq!(result.exit_code, 0, "expected successful recommend run");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "recommend");
            assert_eq!(payload["message"], "רוטב עגבניות, גבינה צהובה");
        },
    );
}

#[test]
fn doctor_json_reports_pass_with_valid_env() {
    with_env(&[("SALIT_DATABASE_URL", "sqlite::memory:")], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0, "expected passing doctor exit code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        let checks = payload["checks"].as_array().expect("checks array");
        assert_eq!(checks.len(), 3);
    });
}

#[test]
fn doctor_exits_nonzero_when_database_is_unreachable() {
    with_env(
        &[("SALIT_DATABASE_URL", "sqlite:///definitely/not/here/salit.db")],
        || {
            let result = doctor::run(true);
            assert_eq!(result.exit_code, 6, "expected failing doctor exit code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["overall_status"], "fail");
            let checks = payload["checks"].as_array().expect("checks array");
            assert!(checks
                .iter()
                .any(|check| check["name"] == "database_connectivity"
                    && check["status"] == "fail"));
        },
    );
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "SALIT_DATABASE_URL",
        "SALIT_LOG_LEVEL",
        "SALIT_LOG_FORMAT",
        "SALIT_RECOMMENDER_STATE_PATH",
        "SALIT_BIND_ADDRESS",
        "SALIT_PORT",
        "SALIT_HEALTH_PORT",
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
