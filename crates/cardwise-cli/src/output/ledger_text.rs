use std::io;

use serde_json::Value;

use super::format::{
    Align, Column, field_f64, field_money, field_str, key_value_rows, money, render_table, rows,
};

pub fn render_record(data: &Value) -> io::Result<String> {
    let rule = data
        .get("rule")
        .ok_or_else(|| io::Error::other("record output requires a rule"))?;
    let usage = data.get("usage_after").unwrap_or(&Value::Null);

    let mut lines = vec![
        format!(
            "Recorded {} at {} on {} / {}.",
            field_money(data, "amount"),
            field_str(data, "merchant"),
            field_str(rule, "card"),
            field_str(rule, "rule_name")
        ),
        String::new(),
    ];
    let mut entries = vec![
        ("Purchase id:", field_str(data, "txn_id").to_string()),
        ("Recommendation:", field_str(data, "rec_id").to_string()),
        ("Date:", field_str(data, "posted_on").to_string()),
        ("Reward:", field_money(data, "est_reward")),
    ];
    let trimmed = field_f64(data, "quoted_reward") > field_f64(data, "est_reward");
    if trimmed {
        entries.push(("Quoted reward:", field_money(data, "quoted_reward")));
    }
    entries.push((
        "Month to date:",
        format!(
            "{} spend / {} reward ({})",
            field_money(usage, "used_spend"),
            field_money(usage, "used_reward"),
            field_str(data, "month")
        ),
    ));
    lines.extend(key_value_rows(&entries, 2));

    if trimmed {
        lines.push(String::new());
        lines.push(
            "Other purchases used up this rule's cap after the recommendation; only the remaining reward was counted."
                .to_string(),
        );
    }
    Ok(lines.join("\n"))
}

const HISTORY_COLUMNS: [Column<'static>; 5] = [
    Column {
        name: "Date",
        align: Align::Left,
    },
    Column {
        name: "Merchant",
        align: Align::Left,
    },
    Column {
        name: "Amount",
        align: Align::Right,
    },
    Column {
        name: "Card",
        align: Align::Left,
    },
    Column {
        name: "Reward",
        align: Align::Right,
    },
];

pub fn render_history(data: &Value) -> io::Result<String> {
    let month = field_str(data, "month");
    let transactions = rows(data, "rows");
    if transactions.is_empty() {
        return Ok(format!(
            "No purchases recorded for {month}.\n\nRun `cardwise recommend <merchant> <amount>` to get started."
        ));
    }

    let body = transactions
        .iter()
        .map(|row| {
            vec![
                field_str(row, "posted_on").to_string(),
                field_str(row, "merchant").to_string(),
                field_money(row, "amount"),
                field_str(row, "card").to_string(),
                field_money(row, "est_reward"),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![format!("Purchases for {month}"), String::new()];
    lines.extend(render_table(&HISTORY_COLUMNS, &body));
    lines.push(String::new());
    lines.push(format!(
        "{} purchases, {} spent, {} earned.",
        transactions.len(),
        field_money(data, "total_amount"),
        field_money(data, "total_reward")
    ));
    Ok(lines.join("\n"))
}

const USAGE_COLUMNS: [Column<'static>; 5] = [
    Column {
        name: "Rule",
        align: Align::Left,
    },
    Column {
        name: "Card",
        align: Align::Left,
    },
    Column {
        name: "Spend used/cap",
        align: Align::Right,
    },
    Column {
        name: "Reward used/cap",
        align: Align::Right,
    },
    Column {
        name: "Status",
        align: Align::Left,
    },
];

pub fn render_usage(data: &Value) -> io::Result<String> {
    let body = rows(data, "rows")
        .iter()
        .map(|row| {
            let exhausted = row.get("exhausted").and_then(Value::as_bool).unwrap_or(false);
            vec![
                field_str(row, "rule_id").to_string(),
                field_str(row, "card").to_string(),
                format!(
                    "{} / {}",
                    field_money(row, "used_spend"),
                    money(field_f64(row, "cap_spend"))
                ),
                format!(
                    "{} / {}",
                    field_money(row, "used_reward"),
                    money(field_f64(row, "cap_reward"))
                ),
                if exhausted { "capped" } else { "open" }.to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![
        format!("Monthly usage for {}", field_str(data, "month")),
        String::new(),
    ];
    if body.is_empty() {
        lines.push("  The catalog has no rules.".to_string());
    } else {
        lines.extend(render_table(&USAGE_COLUMNS, &body));
    }

    let orphaned = rows(data, "orphaned_rule_ids")
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<&str>>();
    if !orphaned.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Usage also exists for rules no longer in the catalog: {}",
            orphaned.join(", ")
        ));
    }
    Ok(lines.join("\n"))
}

pub fn render_reset(data: &Value) -> io::Result<String> {
    let count = |key: &str| data.get(key).and_then(Value::as_i64).unwrap_or(0).to_string();
    let mut lines = vec![
        format!("Cleared {}.", field_str(data, "month")),
        String::new(),
    ];
    lines.extend(key_value_rows(
        &[
            ("Usage rows:", count("usage_rows_deleted")),
            ("Purchases:", count("transactions_deleted")),
            ("Recommendations:", count("recommendations_deleted")),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}
