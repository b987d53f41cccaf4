use std::env;
use std::net::SocketAddr;
use std::sync::{mpsc, Mutex, OnceLock};

use axum::{routing::post, Json, Router};
use intent_relay_cli::commands::{detect, doctor};
use serde_json::{json, Value};

#[test]
fn doctor_passes_with_configured_access_token() {
    with_env(
        &[
            ("INTENT_RELAY_NLU_PROJECT_ID", "relay-test"),
            ("INTENT_RELAY_NLU_ACCESS_TOKEN", "ya29.test"),
        ],
        || {
            let result = doctor::run(true);
            assert_eq!(result.exit_code, 0, "expected all doctor checks to pass");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["overall_status"], "pass");
            assert_eq!(payload["checks"][1]["name"], "nlu_credentials");
            assert_eq!(payload["checks"][1]["status"], "pass");
        },
    );
}

#[test]
fn doctor_skips_dependent_checks_when_config_invalid() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "skipped");
        assert_eq!(payload["checks"][2]["status"], "skipped");
    });
}

#[test]
fn doctor_reports_missing_credentials_file() {
    with_env(
        &[
            ("INTENT_RELAY_NLU_PROJECT_ID", "relay-test"),
            ("INTENT_RELAY_NLU_CREDENTIALS_PATH", "/nonexistent/credentials.json"),
        ],
        || {
            let result = doctor::run(false);
            assert_eq!(result.exit_code, 2);
            assert!(result.output.contains("- [fail] nlu_credentials"));
            assert!(result.output.contains("/nonexistent/credentials.json"));
        },
    );
}

#[test]
fn detect_returns_config_failure_without_project() {
    with_env(&[], || {
        let result = detect::run("hello", None);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "detect");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn detect_rejects_unsafe_session_id() {
    with_env(
        &[
            ("INTENT_RELAY_NLU_PROJECT_ID", "relay-test"),
            ("INTENT_RELAY_NLU_ACCESS_TOKEN", "ya29.test"),
        ],
        || {
            let result = detect::run("hello", Some("../other"));
            assert_eq!(result.exit_code, 5);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["error_class"], "invalid_input");
        },
    );
}

#[test]
fn detect_reports_unreachable_provider() {
    let closed = closed_port_url();
    with_env(
        &[
            ("INTENT_RELAY_NLU_PROJECT_ID", "relay-test"),
            ("INTENT_RELAY_NLU_ACCESS_TOKEN", "ya29.test"),
            ("INTENT_RELAY_NLU_BASE_URL", closed.as_str()),
        ],
        || {
            let result = detect::run("hello", None);
            assert_eq!(result.exit_code, 4, "expected remote failure code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["error_class"], "remote_unavailable");
        },
    );
}

#[test]
fn detect_prints_flattened_detection() {
    let base_url = spawn_provider_stub();
    with_env(
        &[
            ("INTENT_RELAY_NLU_PROJECT_ID", "relay-test"),
            ("INTENT_RELAY_NLU_ACCESS_TOKEN", "ya29.test"),
            ("INTENT_RELAY_NLU_BASE_URL", base_url.as_str()),
        ],
        || {
            let result = detect::run("two kilos of apples", Some("cli-user"));
            assert_eq!(result.exit_code, 0, "expected successful detection: {}", result.output);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["status"], "ok");
            assert_eq!(payload["data"]["intent"], "order.fruit");
            assert_eq!(payload["data"]["entities"]["weight"], "2.000000kg");
            assert_eq!(payload["data"]["entities"]["fruit"], "apple");
        },
    );
}

fn spawn_provider_stub() -> String {
    let (tx, rx) = mpsc::channel::<SocketAddr>();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("stub runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
            tx.send(listener.local_addr().expect("stub address")).expect("publish address");

            let router = Router::new().route(
                "/v2/{*path}",
                post(|| async {
                    Json(json!({
                        "queryResult": {
                            "parameters": {
                                "weight": { "amount": 2, "unit": "kg" },
                                "fruit": ["apple", "pear"]
                            },
                            "intent": { "displayName": "order.fruit" },
                            "intentDetectionConfidence": 0.9
                        }
                    }))
                }),
            );
            let _ = axum::serve(listener, router).await;
        });
    });

    format!("http://{}", rx.recv().expect("stub should report its address"))
}

fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let address = listener.local_addr().expect("address");
    drop(listener);
    format!("http://{address}")
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "INTENT_RELAY_NLU_PROJECT_ID",
        "INTENT_RELAY_NLU_CREDENTIALS_PATH",
        "INTENT_RELAY_NLU_ACCESS_TOKEN",
        "INTENT_RELAY_NLU_LANGUAGE_CODE",
        "INTENT_RELAY_NLU_TIME_ZONE",
        "INTENT_RELAY_NLU_BASE_URL",
        "INTENT_RELAY_NLU_TIMEOUT_SECS",
        "INTENT_RELAY_NLU_DEFAULT_SESSION_ID",
        "INTENT_RELAY_SERVER_BIND_ADDRESS",
        "INTENT_RELAY_SERVER_PORT",
        "INTENT_RELAY_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "INTENT_RELAY_WEBHOOK_FULFILLMENT_TEXT",
        "INTENT_RELAY_LOGGING_LEVEL",
        "INTENT_RELAY_LOGGING_FORMAT",
        "INTENT_RELAY_LOG_LEVEL",
        "INTENT_RELAY_LOG_FORMAT",
        "PORT",
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
