use std::io;

use serde_json::Value;

use super::format;

pub fn render_match(data: &Value) -> io::Result<String> {
    let item_name = data
        .get("item_name")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("match output requires item_name"))?;
    let confidence = data
        .get("match_confidence")
        .and_then(Value::as_str)
        .unwrap_or("none");
    let source = data
        .get("mapping_source")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let pairs = data.get("mapping_pairs").and_then(Value::as_u64).unwrap_or(0);

    let Some(integration_item) = data.get("integration_item").and_then(Value::as_str) else {
        return Ok([
            format!("No integration item matched `{item_name}`."),
            String::new(),
            format!("  Searched {pairs} pairs from {source}."),
            "  Add the contract name to the mapping table to pin it.".to_string(),
        ]
        .join("\n"));
    };

    let mut lines = vec![format!("Matched `{item_name}` to {integration_item}."), String::new()];
    lines.extend(format::key_value_rows(
        &[
            (
                "Contract name:",
                data.get("matched_contract_name")
                    .and_then(Value::as_str)
                    .unwrap_or("-")
                    .to_string(),
            ),
            ("Confidence:", confidence.to_string()),
            (
                "Score:",
                data.get("match_score")
                    .and_then(Value::as_f64)
                    .map_or_else(|| "-".to_string(), |score| format!("{score:.0}")),
            ),
            ("Mapping:", format!("{source} ({pairs} pairs)")),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}
