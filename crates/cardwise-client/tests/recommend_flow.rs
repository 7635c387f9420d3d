mod support;

use cardwise_client::commands::{hint, rules};
use serde_json::{Value, json};
use support::testkit::{Workspace, coffee_map, rule_x, rule_y, rule_z};

const DAY: &str = "2026-10-12";
const MONTH: &str = "2026-10";

fn workspace(rules: Value, merchant_map: Value) -> Option<Workspace> {
    let created = Workspace::new(&rules, &merchant_map);
    assert!(created.is_ok());
    created.ok()
}

fn usage_row(workspace: &Workspace, rule_id: &str) -> Value {
    let usage = workspace.usage(MONTH);
    assert!(usage.is_ok());
    usage
        .unwrap_or(Value::Null)["rows"]
        .as_array()
        .and_then(|rows| rows.iter().find(|row| row["rule_id"] == rule_id).cloned())
        .unwrap_or(Value::Null)
}

#[test]
fn fresh_rule_earns_full_rate_without_note() {
    let Some(ws) = workspace(json!([rule_x()]), json!([])) else {
        return;
    };

    let result = ws.recommend("Corner Bistro", 1000.0, Some("domestic"), Some(DAY));
    assert!(result.is_ok());
    if let Ok(data) = result {
        assert_eq!(data["recommendation"]["rule"]["rule_id"], "x_dining");
        assert_eq!(data["recommendation"]["eff_spend"], 1000.0);
        assert_eq!(data["recommendation"]["est_reward"], 50.0);
        assert!(data.get("note").is_none());
        assert_eq!(data["month"], MONTH);
        assert_eq!(data["region_source"], "explicit");
        assert!(data["rec_id"].as_str().is_some_and(|id| id.starts_with("rec_")));
    }
}

#[test]
fn remaining_spend_caps_the_eligible_amount() {
    let Some(ws) = workspace(json!([rule_x()]), json!([])) else {
        return;
    };

    ws.spend("Caterer", 9500.0, Some("domestic"), DAY);
    let row = usage_row(&ws, "x_dining");
    assert_eq!(row["used_spend"], 9500.0);
    assert_eq!(row["used_reward"], 475.0);

    let result = ws.recommend("Corner Bistro", 1000.0, Some("domestic"), Some(DAY));
    assert!(result.is_ok());
    if let Ok(data) = result {
        assert_eq!(data["recommendation"]["eff_spend"], 500.0);
        assert_eq!(data["recommendation"]["est_reward"], 25.0);
        assert_eq!(data["recommendation"]["remain_spend"], 0.0);
        assert_eq!(data["recommendation"]["remain_reward"], 0.0);
    }
}

#[test]
fn exhausted_favourite_falls_back_to_next_rule() {
    let Some(ws) = workspace(json!([rule_x(), rule_y()]), json!([])) else {
        return;
    };

    let first = ws.spend("Wedding venue", 10000.0, Some("domestic"), DAY);
    assert_eq!(first["recommendation"]["rule"]["rule_id"], "x_dining");
    assert_eq!(first["recommendation"]["est_reward"], 500.0);

    let result = ws.recommend("Corner Bistro", 1000.0, Some("domestic"), Some(DAY));
    assert!(result.is_ok());
    if let Ok(data) = result {
        assert_eq!(data["recommendation"]["rule"]["rule_id"], "y_base");
        assert_eq!(data["recommendation"]["est_reward"], 10.0);
        assert_eq!(data["note"]["code"], "fallback");
        assert!(
            data["note"]["message"]
                .as_str()
                .is_some_and(|message| message.contains("Sapphire"))
        );
    }
}

#[test]
fn channel_rule_requires_a_matching_keyword() {
    let Some(ws) = workspace(json!([rule_x(), rule_z()]), coffee_map()) else {
        return;
    };

    let unmatched = ws.recommend("Grocery Mart", 100.0, Some("domestic"), Some(DAY));
    assert!(unmatched.is_ok());
    if let Ok(data) = unmatched {
        assert_eq!(data["recommendation"]["rule"]["rule_id"], "x_dining");
        assert_eq!(data["note"]["code"], "fallback");
        assert_eq!(data["hinted_rule_ids"], json!([]));
        assert_eq!(data["ranking"][1]["rule_id"], "z_coffee");
        assert_eq!(data["ranking"][1]["eligible"], false);
    }

    let matched = ws.recommend("Blue Bottle Coffee", 100.0, None, Some(DAY));
    assert!(matched.is_ok());
    if let Ok(data) = matched {
        assert_eq!(data["recommendation"]["rule"]["rule_id"], "z_coffee");
        assert_eq!(data["recommendation"]["est_reward"], 10.0);
        assert_eq!(data["region"], "domestic");
        assert_eq!(data["region_source"], "hint");
        assert_eq!(data["hinted_rule_ids"], json!(["z_coffee"]));
    }
}

#[test]
fn recording_is_exactly_once() {
    let Some(ws) = workspace(json!([rule_x()]), json!([])) else {
        return;
    };

    let recommended = ws.recommend("Corner Bistro", 80.0, Some("domestic"), Some(DAY));
    assert!(recommended.is_ok());
    let rec_id = recommended.unwrap_or(Value::Null)["rec_id"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    let first = ws.record(Some(&rec_id));
    assert!(first.is_ok());
    if let Ok(data) = first {
        assert_eq!(data["usage_after"]["used_spend"], 80.0);
        assert_eq!(data["usage_after"]["used_reward"], 4.0);
        assert!(data["txn_id"].as_str().is_some_and(|id| id.starts_with("txn_")));
    }

    let again = ws.record(Some(&rec_id));
    assert!(again.is_err());
    if let Err(error) = again {
        assert_eq!(error.code, "recommendation_already_recorded");
    }

    let latest = ws.record(None);
    assert!(latest.is_err());
    if let Err(error) = latest {
        assert_eq!(error.code, "no_pending_recommendation");
    }

    assert_eq!(usage_row(&ws, "x_dining")["used_spend"], 80.0);
}

#[test]
fn quotes_from_the_same_month_cannot_overrun_the_reward_cap() {
    let Some(ws) = workspace(json!([rule_x()]), json!([])) else {
        return;
    };

    let mut rec_ids = Vec::new();
    for merchant in ["Wedding venue", "Rehearsal dinner"] {
        let quoted = ws.recommend(merchant, 10000.0, Some("domestic"), Some(DAY));
        assert!(quoted.is_ok());
        let data = quoted.unwrap_or(Value::Null);
        assert_eq!(data["recommendation"]["est_reward"], 500.0);
        rec_ids.push(data["rec_id"].as_str().unwrap_or_default().to_string());
    }

    let first = ws.record(Some(&rec_ids[0]));
    assert!(matches!(first, Ok(ref data) if data["est_reward"] == 500.0));

    let second = ws.record(Some(&rec_ids[1]));
    assert!(second.is_ok());
    if let Ok(data) = second {
        assert_eq!(data["quoted_reward"], 500.0);
        assert_eq!(data["est_reward"], 0.0);
        assert_eq!(data["usage_after"]["used_reward"], 500.0);
    }

    let row = usage_row(&ws, "x_dining");
    assert_eq!(row["used_reward"], 500.0);
    assert_eq!(row["remain_reward"], 0.0);
    assert_eq!(row["exhausted"], true);

    let history = ws.history(MONTH);
    assert!(matches!(history, Ok(ref data) if data["total_reward"] == 500.0));
}

#[test]
fn history_and_reset_are_scoped_to_a_month() {
    let Some(ws) = workspace(json!([rule_x(), rule_y()]), json!([])) else {
        return;
    };

    ws.spend("September dinner", 40.0, Some("domestic"), "2026-09-30");
    ws.spend("October lunch", 20.0, Some("domestic"), "2026-10-01");
    ws.spend("October dinner", 60.0, Some("domestic"), "2026-10-02");

    let history = ws.history(MONTH);
    assert!(history.is_ok());
    if let Ok(data) = history {
        assert_eq!(data["transaction_count"], 2);
        assert_eq!(data["total_amount"], 80.0);
        assert_eq!(data["rows"][0]["merchant"], "October dinner");
    }

    let reset = ws.reset(MONTH);
    assert!(reset.is_ok());
    if let Ok(data) = reset {
        assert_eq!(data["transactions_deleted"], 2);
        assert_eq!(data["usage_rows_deleted"], 1);
    }

    assert_eq!(usage_row(&ws, "x_dining")["used_spend"], 0.0);
    let september = ws.history("2026-09");
    assert!(matches!(september, Ok(ref data) if data["transaction_count"] == 1));
}

#[test]
fn unknown_region_and_bad_amount_are_rejected() {
    let Some(ws) = workspace(json!([rule_x()]), json!([])) else {
        return;
    };

    let region = ws.recommend("Bistro", 10.0, Some("lunar"), Some(DAY));
    assert!(region.is_err());
    if let Err(error) = region {
        assert_eq!(error.code, "no_usable_rule");
        assert!(error.data.is_some_and(|data| data["reason"] == "no_region_match"));
    }

    let amount = ws.recommend("Bistro", -5.0, None, Some(DAY));
    assert!(amount.is_err());
    if let Err(error) = amount {
        assert_eq!(error.code, "invalid_argument");
    }

    let date = ws.recommend("Bistro", 5.0, None, Some("2026-02-30"));
    assert!(matches!(date, Err(ref error) if error.code == "invalid_argument"));
}

#[test]
fn rules_and_hint_commands_read_the_catalog() {
    let Some(ws) = workspace(json!([rule_x(), rule_z()]), coffee_map()) else {
        return;
    };

    let listed = rules::run_with_options(rules::RulesOptions {
        config: ws.overrides(),
    });
    assert!(listed.is_ok());
    if let Ok(envelope) = listed {
        assert_eq!(envelope.command, "rules");
        assert_eq!(envelope.data["rule_count"], 2);
        assert_eq!(envelope.data["keyword_count"], 2);
        assert_eq!(envelope.data["warnings"], json!([]));
    }

    let hinted = hint::run_with_options(hint::HintOptions {
        merchant: "  Paris COFFEE House ",
        config: ws.overrides(),
    });
    assert!(hinted.is_ok());
    if let Ok(envelope) = hinted {
        assert_eq!(envelope.data["normalized"], "paris coffee house");
        assert_eq!(envelope.data["rule_ids"], json!(["z_coffee"]));
        assert_eq!(envelope.data["default_region"], "domestic");
    }
}

#[test]
fn missing_rules_file_is_reported_with_path() {
    let Some(ws) = workspace(json!([rule_x()]), json!([])) else {
        return;
    };
    assert!(std::fs::remove_file(&ws.rules_path).is_ok());

    let result = ws.recommend("Bistro", 10.0, None, Some(DAY));
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "catalog_not_found");
        assert!(error.data.is_some_and(|data| data["kind"] == "rules"));
    }
}
