use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_normalize(data: &Value) -> io::Result<String> {
    let schedules = data
        .get("schedules")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("normalize output requires schedules"))?;

    let source = text_or(data, "source", "unknown");
    let policy = text_or(data, "policy_version", "unknown");
    let mut lines = vec![format!(
        "Normalized {} from {source} ({policy}).",
        pluralize(schedules.len(), "schedule")
    )];

    if schedules.is_empty() {
        lines.push(String::new());
        lines.push("The payload contained no schedules.".to_string());
    } else {
        lines.push(String::new());
        lines.push("Schedules:".to_string());
        lines.extend(canonical_table(schedules));
    }

    lines.extend(correction_lines(schedules));
    lines.extend(side_channel_lines(data));
    Ok(lines.join("\n"))
}

pub fn render_project(data: &Value) -> io::Result<String> {
    let schedules = data
        .get("schedules")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("project output requires schedules"))?;
    let garage = data
        .get("garage_revenue_schedules")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("project output requires garage_revenue_schedules"))?;

    let source = text_or(data, "source", "unknown");
    let mut lines = vec![format!(
        "Projected {} from {source}.",
        pluralize(garage.len(), "revenue schedule")
    )];

    let mut context = vec![("Policy:", text_or(data, "policy_version", "unknown"))];
    if let Some(merchant) = data.get("merchant_id").and_then(Value::as_str) {
        context.push(("Merchant:", merchant.to_string()));
    }
    if let Some(second) = data.get("second_run_source").and_then(Value::as_str) {
        context.push(("Second run:", second.to_string()));
    }
    let mapping_count = data
        .get("integration_mappings_used")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if let Some(mapping) = data.get("mapping_source").and_then(Value::as_str) {
        context.push(("Mapping:", format!("{mapping} ({mapping_count} pairs)")));
    }
    lines.push(String::new());
    lines.extend(format::key_value_rows(&context, 2));

    if !garage.is_empty() {
        lines.push(String::new());
        lines.push("Revenue schedules:".to_string());
        lines.extend(garage_table(garage, schedules));
    }

    if let Some(summary) = data.get("agreement_summary").filter(|value| !value.is_null()) {
        lines.push(String::new());
        lines.push("Agreement:".to_string());
        lines.extend(super::agreement_text::summary_rows(summary));
    }

    if let Some(applied) = data.get("guidance_applied").filter(|value| !value.is_null()) {
        lines.push(String::new());
        lines.push("Guidance:".to_string());
        lines.extend(format::key_value_rows(
            &[
                ("Overridden:", joined_or_none(applied.get("overridden_fields"))),
                ("Excluded:", joined_or_none(applied.get("excluded_fields"))),
                ("Ignored:", joined_or_none(applied.get("ignored_overrides"))),
            ],
            2,
        ));
    }

    lines.extend(correction_lines(schedules));
    lines.extend(side_channel_lines(data));
    Ok(lines.join("\n"))
}

fn canonical_table(schedules: &[Value]) -> Vec<String> {
    let columns = [
        Column {
            name: "Item",
            align: Align::Left,
        },
        Column {
            name: "Billing",
            align: Align::Left,
        },
        Column {
            name: "Total",
            align: Align::Right,
        },
        Column {
            name: "Frequency",
            align: Align::Left,
        },
        Column {
            name: "Periods",
            align: Align::Right,
        },
        Column {
            name: "Start",
            align: Align::Left,
        },
    ];

    let rows = schedules
        .iter()
        .map(|schedule| {
            vec![
                item_label(schedule),
                text_or(schedule, "billing_type", "unknown"),
                money(schedule.get("total_price")),
                frequency_label(schedule),
                number_label(schedule.get("periods")),
                text_or(schedule, "start_date", "-"),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    format::render_table_or_blocks(&columns, &rows, format::terminal_width(), "Schedule")
}

fn garage_table(garage: &[Value], schedules: &[Value]) -> Vec<String> {
    let columns = [
        Column {
            name: "Item",
            align: Align::Left,
        },
        Column {
            name: "Type",
            align: Align::Left,
        },
        Column {
            name: "Total",
            align: Align::Right,
        },
        Column {
            name: "Cadence",
            align: Align::Left,
        },
        Column {
            name: "Term",
            align: Align::Right,
        },
        Column {
            name: "Integration",
            align: Align::Left,
        },
        Column {
            name: "Review",
            align: Align::Left,
        },
    ];

    let rows = garage
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let canonical = schedules.get(index);
            let cadence = match (
                record.get("frequency_unit").and_then(Value::as_str),
                record.get("period").and_then(Value::as_u64),
                record.get("number_of_periods").and_then(Value::as_u64),
            ) {
                (Some("NONE"), _, _) => "one-time".to_string(),
                (Some(unit), Some(period), Some(count)) => format!("{count} x {period} {unit}"),
                (Some(unit), _, _) => unit.to_string(),
                _ => "-".to_string(),
            };
            vec![
                text_or(record, "item_name", "-"),
                text_or(record, "billing_type", "-"),
                money(record.get("total_price")),
                cadence,
                record
                    .get("service_term")
                    .and_then(Value::as_f64)
                    .map_or_else(|| "-".to_string(), |months| format!("{}mo", trim_number(months))),
                text_or(record, "integration_item", "-"),
                review_label(canonical),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    format::render_table_or_blocks(&columns, &rows, format::terminal_width(), "Schedule")
}

fn correction_lines(schedules: &[Value]) -> Vec<String> {
    let mut lines = Vec::new();
    for schedule in schedules {
        let issues = schedule
            .get("issues")
            .and_then(Value::as_array)
            .map(|issues| issues.iter().filter_map(Value::as_str).collect::<Vec<&str>>())
            .unwrap_or_default();
        for issue in issues {
            lines.push(format!("  - {}: {issue}", item_label(schedule)));
        }
    }
    if lines.is_empty() {
        return lines;
    }
    let mut section = vec![String::new(), "Corrections:".to_string()];
    section.extend(lines);
    section
}

fn side_channel_lines(data: &Value) -> Vec<String> {
    let mut lines = Vec::new();

    let issues = data
        .get("issues")
        .and_then(Value::as_array)
        .map(|issues| issues.iter().filter_map(Value::as_str).collect::<Vec<&str>>())
        .unwrap_or_default();
    if !issues.is_empty() {
        lines.push(String::new());
        lines.push("Extraction issues:".to_string());
        lines.extend(issues.iter().map(|issue| format!("  - {issue}")));
    }

    let rerun = data.get("rerun");
    let should_rerun = rerun
        .and_then(|value| value.get("should_rerun"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if should_rerun {
        lines.push(String::new());
        lines.push("Rerun recommended:".to_string());
        lines.push(format!(
            "  Reasons:  {}",
            joined_or_none(rerun.and_then(|value| value.get("reasons")))
        ));
        if let Some(hint) = rerun
            .and_then(|value| value.get("focus_hint"))
            .and_then(Value::as_str)
        {
            lines.push(format!("  Focus:    {hint}"));
        }
    }

    lines
}

fn item_label(schedule: &Value) -> String {
    schedule
        .get("item_name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("(unnamed)")
        .to_string()
}

fn frequency_label(schedule: &Value) -> String {
    let unit = schedule
        .get("frequency_unit")
        .and_then(Value::as_str)
        .unwrap_or("None");
    if unit == "None" {
        return "one-time".to_string();
    }
    match schedule.get("frequency_every").and_then(Value::as_u64) {
        Some(every) if every > 1 => format!("every {every} {unit}"),
        _ => format!("every {unit}"),
    }
}

fn review_label(schedule: Option<&Value>) -> String {
    let Some(schedule) = schedule else {
        return "-".to_string();
    };
    let confidence = schedule.get("confidence").and_then(Value::as_f64);
    let flagged = schedule.get("flag_for_review").and_then(Value::as_bool);
    match (flagged, confidence) {
        (Some(true), Some(value)) => format!("yes ({value:.2})"),
        (Some(false), Some(value)) => format!("no ({value:.2})"),
        _ => "-".to_string(),
    }
}

fn money(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_f64)
        .map_or_else(|| "-".to_string(), |amount| format!("{amount:.2}"))
}

fn number_label(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_f64)
        .map_or_else(|| "-".to_string(), trim_number)
}

fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn text_or(value: &Value, key: &str, fallback: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

fn joined_or_none(value: Option<&Value>) -> String {
    let parts = value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect::<Vec<&str>>())
        .unwrap_or_default();
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    }
}

fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
