use std::io;

use serde_json::Value;

use super::format::{Align, Column, field_f64, field_str, money, render_table, rows};

const RULE_COLUMNS: [Column<'static>; 7] = [
    Column {
        name: "Rule",
        align: Align::Left,
    },
    Column {
        name: "Card",
        align: Align::Left,
    },
    Column {
        name: "Regions",
        align: Align::Left,
    },
    Column {
        name: "Rate",
        align: Align::Right,
    },
    Column {
        name: "Priority",
        align: Align::Right,
    },
    Column {
        name: "Caps (spend/reward)",
        align: Align::Right,
    },
    Column {
        name: "Channel",
        align: Align::Left,
    },
];

pub fn render_rules(data: &Value) -> io::Result<String> {
    let body = rows(data, "rules")
        .iter()
        .map(|rule| {
            let regions = rows(rule, "regions")
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<&str>>();
            let requires_map = rule
                .get("requires_map")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            vec![
                field_str(rule, "rule_id").to_string(),
                field_str(rule, "card").to_string(),
                if regions.is_empty() {
                    "any".to_string()
                } else {
                    regions.join(",")
                },
                format!("{:.2}%", field_f64(rule, "rate") * 100.0),
                rule.get("priority")
                    .and_then(Value::as_i64)
                    .unwrap_or(0)
                    .to_string(),
                format!(
                    "{} / {}",
                    money(field_f64(rule, "cap_spend")),
                    money(field_f64(rule, "cap_reward"))
                ),
                if requires_map { "keyword" } else { "" }.to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let count = |key: &str| data.get(key).and_then(Value::as_u64).unwrap_or(0);
    let mut lines = vec![
        format!(
            "{} rules, {} merchant keywords",
            count("rule_count"),
            count("keyword_count")
        ),
        format!("  Rules:         {}", field_str(data, "rules_path")),
        format!("  Merchant map:  {}", field_str(data, "merchant_map_path")),
        String::new(),
    ];
    if body.is_empty() {
        lines.push("  The rules file is empty.".to_string());
    } else {
        lines.extend(render_table(&RULE_COLUMNS, &body));
    }

    let warnings = rows(data, "warnings");
    if !warnings.is_empty() {
        lines.push(String::new());
        lines.push("Warnings:".to_string());
        lines.extend(
            warnings
                .iter()
                .map(|warning| format!("  - {}", field_str(warning, "message"))),
        );
    }
    Ok(lines.join("\n"))
}

pub fn render_hint(data: &Value) -> io::Result<String> {
    let rule_ids = rows(data, "rule_ids")
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<&str>>();
    let region = match field_str(data, "default_region") {
        "" => "none".to_string(),
        value => value.to_string(),
    };

    let lines = [
        format!("Merchant text: {}", field_str(data, "normalized")),
        format!(
            "  Hinted rules:    {}",
            if rule_ids.is_empty() {
                "none".to_string()
            } else {
                rule_ids.join(", ")
            }
        ),
        format!("  Default region:  {region}"),
    ];
    Ok(lines.join("\n"))
}
