use std::io;

use serde_json::Value;

use super::format::{
    Align, Column, field_money, field_str, key_value_rows, money, render_table, rows,
};

pub fn render_recommend(data: &Value) -> io::Result<String> {
    let recommendation = data
        .get("recommendation")
        .ok_or_else(|| io::Error::other("recommend output requires a recommendation"))?;
    let rule = recommendation.get("rule").unwrap_or(&Value::Null);

    let region = match field_str(data, "region") {
        "" => "any".to_string(),
        value => format!("{value} ({})", field_str(data, "region_source")),
    };

    let mut lines = vec![
        format!(
            "Use {} / {}",
            field_str(rule, "card"),
            field_str(rule, "rule_name")
        ),
        String::new(),
    ];
    lines.extend(key_value_rows(
        &[
            ("Merchant:", field_str(data, "merchant").to_string()),
            ("Amount:", field_money(data, "amount")),
            ("Date:", field_str(data, "posted_on").to_string()),
            ("Region:", region),
            ("Rule:", field_str(rule, "rule_id").to_string()),
            ("Est. reward:", field_money(recommendation, "est_reward")),
            ("Eligible spend:", field_money(recommendation, "eff_spend")),
            (
                "Left after this:",
                format!(
                    "{} spend / {} reward",
                    field_money(recommendation, "remain_spend"),
                    field_money(recommendation, "remain_reward")
                ),
            ),
        ],
        2,
    ));

    if let Some(note) = data.get("note") {
        lines.push(String::new());
        lines.push(format!("Note: {}", field_str(note, "message")));
    }

    let ranking = rows(data, "ranking");
    if ranking.len() > 1 {
        lines.push(String::new());
        lines.push("Ranking:".to_string());
        lines.extend(render_table(&RANKING_COLUMNS, &ranking_rows(ranking)));
    }

    for warning in rows(data, "warnings") {
        lines.push(format!("Warning: {}", field_str(warning, "message")));
    }

    let next_step = data.get("next_step").unwrap_or(&Value::Null);
    lines.push(String::new());
    lines.push(format!("Recommendation id: {}", field_str(data, "rec_id")));
    lines.push(format!(
        "{}: {}",
        field_str(next_step, "label"),
        field_str(next_step, "command")
    ));

    Ok(lines.join("\n"))
}

const RANKING_COLUMNS: [Column<'static>; 5] = [
    Column {
        name: "#",
        align: Align::Right,
    },
    Column {
        name: "Rule",
        align: Align::Left,
    },
    Column {
        name: "Card",
        align: Align::Left,
    },
    Column {
        name: "Reward",
        align: Align::Right,
    },
    Column {
        name: "Status",
        align: Align::Left,
    },
];

fn ranking_rows(ranking: &[Value]) -> Vec<Vec<String>> {
    ranking
        .iter()
        .map(|candidate| {
            let flag = |key: &str| candidate.get(key).and_then(Value::as_bool).unwrap_or(false);
            let status = if !flag("eligible") {
                "needs keyword"
            } else if flag("exhausted") {
                "capped"
            } else if flag("hinted") {
                "hinted"
            } else {
                "ok"
            };
            vec![
                candidate
                    .get("rank")
                    .and_then(Value::as_u64)
                    .unwrap_or(0)
                    .to_string(),
                field_str(candidate, "rule_id").to_string(),
                field_str(candidate, "card").to_string(),
                money(candidate.get("est_reward").and_then(Value::as_f64).unwrap_or(0.0)),
                status.to_string(),
            ]
        })
        .collect()
}
