use intent_relay_core::config::{AppConfig, LoadOptions};
use intent_relay_core::SessionId;
use intent_relay_nlu::Credentials;
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CONFIG};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_CONFIG };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_credentials(&config));
            checks.push(check_default_session(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["nlu_credentials", "default_session"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_credentials(config: &AppConfig) -> DoctorCheck {
    match Credentials::resolve(&config.nlu) {
        Ok(credentials) => {
            let source = if config.nlu.configured_access_token().is_some() {
                "configured access token".to_string()
            } else {
                format!("`{}`", config.nlu.credentials_path.display())
            };
            DoctorCheck {
                name: "nlu_credentials",
                status: CheckStatus::Pass,
                details: format!("{} loaded from {source}", credentials.kind()),
            }
        }
        Err(error) => DoctorCheck {
            name: "nlu_credentials",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_default_session(config: &AppConfig) -> DoctorCheck {
    match SessionId::parse(&config.nlu.default_session_id) {
        Ok(session) => DoctorCheck {
            name: "default_session",
            status: CheckStatus::Pass,
            details: format!("unidentified callers share session `{session}`"),
        },
        Err(error) => DoctorCheck {
            name: "default_session",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use intent_relay_core::config::AppConfig;
    use tempfile::TempDir;

    use super::{check_credentials, CheckStatus};

    fn config_with_key_file(dir: &TempDir) -> AppConfig {
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"api_key":"AIza-test"}"#).expect("write credentials");

        let mut config = AppConfig::default();
        config.nlu.project_id = "relay-test".to_string();
        config.nlu.credentials_path = path;
        config
    }

    #[test]
    fn blank_configured_token_reports_credentials_file_as_source() {
        let dir = TempDir::new().expect("tempdir");
        let mut config = config_with_key_file(&dir);
        config.nlu.access_token = Some(String::new().into());

        let check = check_credentials(&config);

        assert_eq!(check.status, CheckStatus::Pass);
        assert!(check.details.starts_with("api_key loaded from `"), "details = {}", check.details);
        assert!(check.details.contains("credentials.json"));
    }

    #[test]
    fn configured_token_is_reported_as_source() {
        let dir = TempDir::new().expect("tempdir");
        let mut config = config_with_key_file(&dir);
        config.nlu.access_token = Some("ya29.test".to_string().into());

        let check = check_credentials(&config);

        assert_eq!(check.status, CheckStatus::Pass);
        assert_eq!(check.details, "access_token loaded from configured access token");
    }
}
