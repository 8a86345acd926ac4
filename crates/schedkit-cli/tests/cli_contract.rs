use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde_json::{Value, json};
use tempfile::{Builder, TempDir};

const EXPECTED_ROOT_HELP: &str = "schedkit - billing schedule normalization and reconciliation

Usage:
  schedkit <command>

Start here:
  schedkit normalize <path>
  schedkit project --help
";

struct CliOutput {
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

fn temp_home(prefix: &str) -> Option<TempDir> {
    let temp = Builder::new().prefix(prefix).tempdir_in("/tmp");
    assert!(temp.is_ok());
    temp.ok()
}

fn run_cli_with_input(home: &Path, args: &[&str], input: Option<&str>) -> CliOutput {
    let mut command = Command::new(env!("CARGO_BIN_EXE_schedkit"));
    command.args(args);
    command.env("SCHEDKIT_HOME", home);
    command.env_remove("SCHEDKIT_LOG");
    command.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let spawned = command.spawn();
    assert!(spawned.is_ok());
    if let Ok(mut child) = spawned {
        if let Some(body) = input
            && let Some(mut pipe) = child.stdin.take()
        {
            assert!(pipe.write_all(body.as_bytes()).is_ok());
        }

        let output = child.wait_with_output();
        assert!(output.is_ok());
        if let Ok(result) = output {
            return CliOutput {
                code: result.status.code(),
                stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            };
        }
    }

    CliOutput {
        code: None,
        stdout: String::new(),
        stderr: String::new(),
    }
}

fn run_cli(home: &Path, args: &[&str]) -> CliOutput {
    run_cli_with_input(home, args, None)
}

fn write_file(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    assert!(fs::write(&path, body).is_ok());
    path
}

fn parse_json(body: &str) -> Value {
    let parsed = serde_json::from_str::<Value>(body);
    assert!(parsed.is_ok(), "stdout was not JSON: {body}");
    parsed.unwrap_or(Value::Null)
}

fn payload_text() -> String {
    json!({
        "schedules": [
            {
                "item_name": "Platform Support Plan",
                "billing_type": "Flat price",
                "total_price": "$12,000.00",
                "start_date": "2026-01-01",
                "frequency_unit": "Month(s)",
                "frequency_every": 3,
                "months_of_service": 12
            },
            {
                "item_name": "Onboarding",
                "description": "Complimentary onboarding",
                "frequency_unit": "None"
            }
        ]
    })
    .to_string()
}

fn assert_json_error_contract(body: &str, code: &str) -> Value {
    let payload = parse_json(body);
    assert_eq!(payload["error"]["code"], Value::String(code.to_string()));
    assert!(payload["error"]["message"].is_string());
    assert!(payload["error"]["recovery_steps"].is_array());
    payload
}

#[test]
fn bare_invocation_prints_root_help() {
    let Some(home) = temp_home("schedkit-cli-help") else {
        return;
    };
    let output = run_cli(home.path(), &[]);
    assert_eq!(output.code, Some(0));
    assert_eq!(output.stdout, EXPECTED_ROOT_HELP);

    let top = run_cli(home.path(), &["--help"]);
    assert_eq!(top.code, Some(0));
    assert!(top.stdout.contains("schedkit reconcile <run1> <run2>"));
}

#[test]
fn normalize_json_emits_versioned_envelope() {
    let Some(home) = temp_home("schedkit-cli-normalize") else {
        return;
    };
    let path = write_file(home.path(), "run1.json", &payload_text());
    let path = path.display().to_string();

    let output = run_cli(home.path(), &["normalize", &path, "--json"]);
    assert_eq!(output.code, Some(0));
    let payload = parse_json(&output.stdout);
    assert_eq!(payload["ok"], json!(true));
    assert_eq!(payload["version"], json!("v1"));
    assert_eq!(payload["command"], json!("normalize"));
    assert_eq!(payload["data"]["schedule_count"], json!(2));
    assert_eq!(payload["data"]["schedules"][0]["periods"], json!(4));
    assert_eq!(payload["data"]["schedules"][1]["total_price"], json!(0.0));
}

#[test]
fn normalize_text_reads_stdin() {
    let Some(home) = temp_home("schedkit-cli-stdin") else {
        return;
    };
    let output = run_cli_with_input(home.path(), &["normalize", "-"], Some(&payload_text()));
    assert_eq!(output.code, Some(0));
    assert!(output.stdout.starts_with("Normalized 2 schedules from stdin (normalize/v1)."));
    assert!(output.stdout.contains("Platform Support Plan"));
    assert!(output.stdout.contains("Corrections:"));
}

#[test]
fn logging_goes_to_stderr_only() {
    let Some(home) = temp_home("schedkit-cli-log") else {
        return;
    };
    let path = write_file(home.path(), "run1.json", &payload_text());
    let path = path.display().to_string();

    let mut command = Command::new(env!("CARGO_BIN_EXE_schedkit"));
    command
        .args(["normalize", &path, "--json"])
        .env("SCHEDKIT_HOME", home.path())
        .env("SCHEDKIT_LOG", "debug");
    let output = command.output();
    assert!(output.is_ok());
    if let Ok(result) = output {
        assert!(result.status.success());
        let stdout = String::from_utf8_lossy(&result.stdout);
        let stderr = String::from_utf8_lossy(&result.stderr);
        assert_eq!(parse_json(&stdout)["command"], json!("normalize"));
        assert!(stderr.contains("parsed extraction payload"));
    }
}

#[test]
fn reconcile_identical_runs_reports_no_flags() {
    let Some(home) = temp_home("schedkit-cli-reconcile") else {
        return;
    };
    let path = write_file(home.path(), "run1.json", &payload_text());
    let path = path.display().to_string();

    let output = run_cli(home.path(), &["reconcile", &path, &path, "--json"]);
    assert_eq!(output.code, Some(0));
    let summary = &parse_json(&output.stdout)["data"]["summary"];
    assert_eq!(summary["flagged"], json!(0));
    assert_eq!(summary["unmatched_in_run2"], json!(0));
    assert_eq!(summary["policy_version"], json!("agreement/v1"));

    let text = run_cli(home.path(), &["reconcile", &path, &path]);
    assert_eq!(text.code, Some(0));
    assert!(text.stdout.contains("Summary:"));
}

#[test]
fn project_with_merchant_profile_applies_mapping_and_guidance() {
    let Some(home) = temp_home("schedkit-cli-project") else {
        return;
    };
    let merchant_dir = home.path().join("merchants").join("acme");
    assert!(fs::create_dir_all(&merchant_dir).is_ok());
    write_file(
        &merchant_dir,
        "mapping.csv",
        "name,code\nPlatform Support Plan,SKU-SUPPORT\n",
    );
    write_file(
        &merchant_dir,
        "guidance.json",
        r#"{"default_overrides": {"net_terms": 60}, "excluded_fields": ["discounts"]}"#,
    );
    let path = write_file(home.path(), "run1.json", &payload_text());
    let path = path.display().to_string();

    let output = run_cli(
        home.path(),
        &["project", &path, "--merchant", "acme", "--json"],
    );
    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    let data = &parse_json(&output.stdout)["data"];
    assert_eq!(data["merchant_id"], json!("acme"));
    assert_eq!(data["agreement_summary"], Value::Null);
    let support = &data["garage_revenue_schedules"][0];
    assert_eq!(support["integration_item"], json!("SKU-SUPPORT"));
    assert_eq!(support["frequency_unit"], json!("QUARTER"));
    assert_eq!(support["net_terms"], json!(60));
    assert!(support.get("discounts").is_none());

    let text = run_cli(home.path(), &["project", &path, "--merchant", "acme"]);
    assert_eq!(text.code, Some(0));
    assert!(text.stdout.contains("Revenue schedules:"));
    assert!(text.stdout.contains("SKU-SUPPORT"));
}

#[test]
fn match_reports_high_confidence_for_exact_name() {
    let Some(home) = temp_home("schedkit-cli-match") else {
        return;
    };
    let mapping = write_file(
        home.path(),
        "mapping.json",
        r#"[["Platform Support Plan", "SKU-SUPPORT"], ["API Calls", "SKU-API"]]"#,
    );
    let mapping = mapping.display().to_string();

    let output = run_cli(
        home.path(),
        &["match", "Platform Support Plan", "--mapping", &mapping, "--json"],
    );
    assert_eq!(output.code, Some(0));
    let data = &parse_json(&output.stdout)["data"];
    assert_eq!(data["integration_item"], json!("SKU-SUPPORT"));
    assert_eq!(data["match_confidence"], json!("high"));

    let text = run_cli(
        home.path(),
        &["match", "Platform Support Plan", "--mapping", &mapping],
    );
    assert_eq!(text.code, Some(0));
    assert!(text.stdout.starts_with("Matched `Platform Support Plan` to SKU-SUPPORT."));
}

#[test]
fn user_errors_exit_one_with_error_contract() {
    let Some(home) = temp_home("schedkit-cli-errors") else {
        return;
    };
    let garbage = write_file(home.path(), "garbage.json", "model timed out");
    let garbage = garbage.display().to_string();

    let invalid = run_cli(home.path(), &["normalize", &garbage, "--json"]);
    assert_eq!(invalid.code, Some(1));
    let payload = assert_json_error_contract(&invalid.stdout, "invalid_payload");
    assert_eq!(payload["error"]["data"]["source"], json!(garbage));

    let missing_profile = run_cli(home.path(), &["match", "Support", "--merchant", "ghost"]);
    assert_eq!(missing_profile.code, Some(1));
    assert!(missing_profile.stdout.contains("  Error:    profile_not_found"));
    assert!(missing_profile.stdout.contains("What to do next:"));

    let no_table = run_cli(home.path(), &["match", "Support", "--json"]);
    assert_eq!(no_table.code, Some(1));
    assert_json_error_contract(&no_table.stdout, "invalid_argument");
}

#[test]
fn parse_errors_render_invalid_argument_with_command_hint() {
    let Some(home) = temp_home("schedkit-cli-parse") else {
        return;
    };
    let output = run_cli(home.path(), &["reconcile", "run1.json", "--json"]);
    assert_eq!(output.code, Some(1));
    let payload = assert_json_error_contract(&output.stdout, "invalid_argument");
    assert_eq!(
        payload["error"]["recovery_steps"][0],
        json!("Run `schedkit reconcile --help` for usage.")
    );
    assert!(
        !payload["error"]["message"]
            .as_str()
            .unwrap_or_default()
            .contains("For more information")
    );

    let unknown = run_cli(home.path(), &["extract", "doc.pdf"]);
    assert_eq!(unknown.code, Some(1));
    assert!(unknown.stdout.contains("  Error:    invalid_argument"));
}
