use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_reconcile(data: &Value) -> io::Result<String> {
    let items = data
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("reconcile output requires items"))?;
    let summary = data
        .get("summary")
        .ok_or_else(|| io::Error::other("reconcile output requires summary"))?;

    let run1 = data.get("run1_source").and_then(Value::as_str).unwrap_or("run 1");
    let run2 = data.get("run2_source").and_then(Value::as_str).unwrap_or("run 2");
    let mut lines = vec![format!("Reconciled {run1} against {run2}.")];

    if !items.is_empty() {
        lines.push(String::new());
        lines.push("Items:".to_string());

        let columns = [
            Column {
                name: "Run 1",
                align: Align::Right,
            },
            Column {
                name: "Run 2",
                align: Align::Right,
            },
            Column {
                name: "Similarity",
                align: Align::Right,
            },
            Column {
                name: "Confidence",
                align: Align::Right,
            },
            Column {
                name: "Review",
                align: Align::Left,
            },
        ];
        let rows = items
            .iter()
            .map(|item| {
                let agreement = item.get("agreement");
                vec![
                    index_label(item.get("run1_index")),
                    index_label(agreement.and_then(|value| value.get("matched_index_in_run2"))),
                    score(agreement.and_then(|value| value.get("similarity"))),
                    score(item.get("confidence")),
                    match item.get("flag_for_review").and_then(Value::as_bool) {
                        Some(true) => "flagged".to_string(),
                        _ => "ok".to_string(),
                    },
                ]
            })
            .collect::<Vec<Vec<String>>>();
        lines.extend(format::render_table_or_blocks(
            &columns,
            &rows,
            format::terminal_width(),
            "Item",
        ));
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    lines.extend(summary_rows(summary));
    Ok(lines.join("\n"))
}

pub fn summary_rows(summary: &Value) -> Vec<String> {
    let count = |key: &str| {
        summary
            .get(key)
            .and_then(Value::as_u64)
            .unwrap_or(0)
            .to_string()
    };
    format::key_value_rows(
        &[
            (
                "Policy:",
                summary
                    .get("policy_version")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
            ),
            ("Avg confidence:", score(summary.get("avg_confidence"))),
            ("Min confidence:", score(summary.get("min_confidence"))),
            (
                "Items:",
                format!(
                    "{} in run 1, {} in run 2",
                    count("total_items_run1"),
                    count("total_items_run2")
                ),
            ),
            ("Flagged:", count("flagged")),
            (
                "Unmatched:",
                format!(
                    "{} in run 1, {} in run 2",
                    count("unmatched_in_run1"),
                    count("unmatched_in_run2")
                ),
            ),
        ],
        2,
    )
}

fn index_label(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_u64)
        .map_or_else(|| "-".to_string(), |index| (index + 1).to_string())
}

fn score(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_f64)
        .map_or_else(|| "-".to_string(), |number| format!("{number:.2}"))
}
