use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Value, json};

const DAY: &str = "2026-10-12";
const MONTH: &str = "2026-10";

static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

fn unique_test_home() -> PathBuf {
    let mut path = std::env::temp_dir();
    let stamp = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(value) => value.as_nanos(),
        Err(_) => 0,
    };
    let sequence = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!(
        "cardwise-cli-test-{}-{stamp}-{sequence}",
        std::process::id()
    ));
    path
}

fn base_command(home: &Path, args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_cardwise"));
    command.args(args);
    command.env("CARDWISE_HOME", home);
    for name in [
        "CARDWISE_RULES",
        "CARDWISE_MERCHANT_MAP",
        "CARDWISE_DEFAULT_REGION",
        "CARDWISE_LOG",
    ] {
        command.env_remove(name);
    }
    command
}

/// Exit code (or -1 when killed) and stdout.
fn run_cli_in_home(home: &Path, args: &[&str]) -> (i32, String) {
    let output = base_command(home, args).output();
    assert!(output.is_ok());
    if let Ok(result) = output {
        let stdout = String::from_utf8(result.stdout);
        assert!(stdout.is_ok());
        if let Ok(stdout_text) = stdout {
            return (result.status.code().unwrap_or(-1), stdout_text);
        }
    }
    (-1, String::new())
}

fn write_catalog(home: &Path, rules: &Value, merchant_map: &Value) {
    assert!(fs::create_dir_all(home).is_ok());
    assert!(fs::write(home.join("rules.json"), rules.to_string()).is_ok());
    assert!(fs::write(home.join("merchantmap.json"), merchant_map.to_string()).is_ok());
}

fn catalog_home() -> PathBuf {
    let home = unique_test_home();
    write_catalog(
        &home,
        &json!([
            {
                "rule_id": "x_dining", "card": "Sapphire", "rule_name": "Dining 5%",
                "regions": ["domestic"], "rate": 0.05, "priority": 10,
                "cap_spend": 10000, "cap_reward": 500
            },
            {
                "rule_id": "y_base", "card": "Flat", "rule_name": "Everything 1%",
                "regions": ["domestic", "foreign"], "rate": 0.01, "priority": 1,
                "cap_spend": 5000, "cap_reward": 200
            },
            {
                "rule_id": "z_coffee", "card": "Barista", "rule_name": "Coffee 10%",
                "regions": ["domestic"], "requires_map": true, "rate": 0.10,
                "priority": 50, "cap_spend": 1000, "cap_reward": 100
            }
        ]),
        &json!([
            { "keyword": "coffee", "default_region": "domestic", "rule_id": "z_coffee" }
        ]),
    );
    home
}

fn parse_json(body: &str) -> Value {
    let parsed = serde_json::from_str::<Value>(body);
    assert!(parsed.is_ok(), "not json: {body}");
    parsed.unwrap_or(Value::Null)
}

fn assert_text_error_contract(body: &str, code: &str) {
    assert!(body.contains("  Error:    "));
    assert!(body.contains(&format!("  Error:    {code}")));
    assert!(body.contains("  Details:"));
    assert!(body.contains("What to do next:"));
    assert!(body.contains("  1. "));
}

fn assert_json_error_contract(body: &str, code: &str) -> Value {
    let payload = parse_json(body);
    assert_eq!(payload["ok"], false);
    assert_eq!(payload["error"]["code"], Value::String(code.to_string()));
    assert!(payload["error"]["message"].is_string());
    assert!(payload["error"]["recovery_steps"].is_array());
    payload
}

#[test]
fn no_args_prints_short_orientation() {
    let home = unique_test_home();
    let (code, body) = run_cli_in_home(&home, &[]);
    assert_eq!(code, 0);
    assert!(body.starts_with("cardwise - pick the best card reward rule"));
    assert!(body.contains("cardwise rules"));
}

#[test]
fn top_level_help_lists_every_command() {
    let home = unique_test_home();
    let (code, body) = run_cli_in_home(&home, &["--help"]);
    assert_eq!(code, 0);
    for command in [
        "cardwise recommend",
        "cardwise record",
        "cardwise usage",
        "cardwise history",
        "cardwise reset --month",
        "cardwise rules",
        "cardwise hint",
    ] {
        assert!(body.contains(command), "help is missing {command}");
    }
}

#[test]
fn subcommand_help_includes_selection_guide() {
    let home = unique_test_home();
    let (code, body) = run_cli_in_home(&home, &["recommend", "--help"]);
    assert_eq!(code, 0);
    assert!(body.contains("How a rule is picked:"));
    assert!(body.contains("--region"));
}

#[test]
fn recommend_record_usage_round_trip_in_json() {
    let home = catalog_home();

    let (code, body) = run_cli_in_home(
        &home,
        &["recommend", "Corner Bistro", "1000", "--region", "domestic", "--date", DAY, "--json"],
    );
    assert_eq!(code, 0);
    let payload = parse_json(&body);
    assert_eq!(payload["ok"], true);
    assert!(payload["version"].is_string());
    assert_eq!(payload["data"]["recommendation"]["rule"]["rule_id"], "x_dining");
    assert_eq!(payload["data"]["recommendation"]["est_reward"], 50.0);
    let rec_id = payload["data"]["rec_id"].as_str().unwrap_or_default().to_string();
    assert!(rec_id.starts_with("rec_"));

    let (code, body) = run_cli_in_home(&home, &["record", "--json"]);
    assert_eq!(code, 0);
    let recorded = parse_json(&body);
    assert_eq!(recorded["data"]["rec_id"], Value::String(rec_id.clone()));
    assert_eq!(recorded["data"]["usage_after"]["used_spend"], 1000.0);

    let (code, body) = run_cli_in_home(&home, &["usage", "--month", MONTH, "--json"]);
    assert_eq!(code, 0);
    let usage = parse_json(&body);
    let row = usage["data"]["rows"]
        .as_array()
        .and_then(|rows| rows.iter().find(|row| row["rule_id"] == "x_dining").cloned())
        .unwrap_or(Value::Null);
    assert_eq!(row["used_spend"], 1000.0);
    assert_eq!(row["used_reward"], 50.0);
    assert_eq!(row["remain_spend"], 9000.0);

    let (code, body) = run_cli_in_home(&home, &["record", &rec_id, "--json"]);
    assert_eq!(code, 1);
    assert_json_error_contract(&body, "recommendation_already_recorded");
}

#[test]
fn text_output_names_card_and_next_step() {
    let home = catalog_home();

    let (code, body) = run_cli_in_home(
        &home,
        &["recommend", "Blue Bottle Coffee", "6.50", "--date", DAY],
    );
    assert_eq!(code, 0);
    assert!(body.starts_with("Use Barista / Coffee 10%"));
    assert!(body.contains("domestic (hint)"));
    assert!(body.contains("cardwise record rec_"));

    let (code, body) = run_cli_in_home(&home, &["record"]);
    assert_eq!(code, 0);
    assert!(body.starts_with("Recorded 6.50 at Blue Bottle Coffee on Barista / Coffee 10%."));

    let (code, body) = run_cli_in_home(&home, &["history", "--month", MONTH]);
    assert_eq!(code, 0);
    assert!(body.contains("Purchases for 2026-10"));
    assert!(body.contains("Blue Bottle Coffee"));

    let (code, body) = run_cli_in_home(&home, &["reset", "--month", MONTH]);
    assert_eq!(code, 0);
    assert!(body.starts_with("Cleared 2026-10."));

    let (code, body) = run_cli_in_home(&home, &["history", "--month", MONTH]);
    assert_eq!(code, 0);
    assert!(body.contains("No purchases recorded for 2026-10."));
}

#[test]
fn rules_and_hint_read_catalog_from_flags() {
    let home = unique_test_home();
    let catalog_dir = unique_test_home();
    assert!(fs::create_dir_all(&catalog_dir).is_ok());
    let rules_path = catalog_dir.join("cards.json");
    let map_path = catalog_dir.join("keywords.csv");
    let rules = json!([{ "rule_id": "only", "card": "Solo", "rate": 0.02, "cap_spend": 100, "cap_reward": 2 }]);
    assert!(fs::write(&rules_path, rules.to_string()).is_ok());
    assert!(fs::write(&map_path, "keyword,default_region,rule_id\nshell,foreign,only\n").is_ok());

    let rules_arg = rules_path.display().to_string();
    let map_arg = map_path.display().to_string();

    let (code, body) = run_cli_in_home(
        &home,
        &["rules", "--rules", &rules_arg, "--merchant-map", &map_arg, "--json"],
    );
    assert_eq!(code, 0);
    let payload = parse_json(&body);
    assert_eq!(payload["data"]["rule_count"], 1);
    assert_eq!(payload["data"]["keyword_count"], 1);

    let (code, body) = run_cli_in_home(
        &home,
        &["--rules", &rules_arg, "--merchant-map", &map_arg, "hint", "SHELL Station 42"],
    );
    assert_eq!(code, 0);
    assert!(body.contains("Hinted rules:    only"));
    assert!(body.contains("Default region:  foreign"));
}

#[test]
fn user_errors_exit_with_one() {
    let home = catalog_home();

    let (code, body) = run_cli_in_home(&home, &["recommend", "Cafe", "-4", "--json"]);
    assert_eq!(code, 1);
    assert_json_error_contract(&body, "invalid_argument");

    let (code, body) = run_cli_in_home(&home, &["reset"]);
    assert_eq!(code, 1);
    assert_text_error_contract(&body, "invalid_argument");
    assert!(body.contains("cardwise reset --month"));

    let (code, body) = run_cli_in_home(
        &home,
        &["recommend", "Cafe", "5", "--region", "lunar", "--json"],
    );
    assert_eq!(code, 1);
    let payload = assert_json_error_contract(&body, "no_usable_rule");
    assert_eq!(payload["data"]["reason"], "no_region_match");

    let (code, body) = run_cli_in_home(&home, &["record"]);
    assert_eq!(code, 1);
    assert_text_error_contract(&body, "no_pending_recommendation");

    let empty = unique_test_home();
    let (code, body) = run_cli_in_home(&empty, &["rules"]);
    assert_eq!(code, 1);
    assert_text_error_contract(&body, "catalog_not_found");
}

#[test]
fn unreadable_ledger_exits_with_two() {
    let home = catalog_home();
    assert!(fs::write(home.join("ledger.db"), "not-a-sqlite-database").is_ok());

    let (code, body) = run_cli_in_home(&home, &["usage", "--json"]);
    assert_eq!(code, 2);
    assert_json_error_contract(&body, "ledger_corrupt");
}

#[test]
fn bad_log_filter_does_not_block_the_command() {
    let home = catalog_home();
    let output = base_command(&home, &["rules", "--json"])
        .env("CARDWISE_LOG", "cardwise=loud")
        .output();
    assert!(output.is_ok());
    if let Ok(result) = output {
        assert!(result.status.success());
        let stderr = String::from_utf8_lossy(&result.stderr);
        assert!(stderr.contains("CARDWISE_LOG"));
        let stdout = String::from_utf8_lossy(&result.stdout);
        assert_eq!(parse_json(&stdout)["ok"], true);
    }
}

#[test]
fn closed_stdout_pipe_does_not_panic() {
    let home = catalog_home();
    let mut producer = base_command(&home, &["rules", "--json"]);
    producer.stdout(Stdio::piped());
    producer.stderr(Stdio::piped());

    let spawned = producer.spawn();
    assert!(spawned.is_ok());
    if let Ok(mut child) = spawned {
        if let Some(stdout_pipe) = child.stdout.take() {
            let mut reader = BufReader::new(stdout_pipe);
            let mut first_line = String::new();
            assert!(reader.read_line(&mut first_line).is_ok());
            assert!(!first_line.is_empty());
            drop(reader);
        }

        let status = child.wait();
        assert!(status.is_ok());

        if let Some(mut stderr_pipe) = child.stderr.take() {
            let mut stderr_text = String::new();
            assert!(stderr_pipe.read_to_string(&mut stderr_text).is_ok());
            assert!(!stderr_text.contains("panicked"));
            assert!(!stderr_text.contains("failed printing to stdout"));
        }
    }
}
