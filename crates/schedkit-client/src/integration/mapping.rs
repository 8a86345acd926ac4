use serde_json::Value;

use crate::integration::matcher::MappingPair;
use crate::schedule::loose::read_optional_string;
use crate::{ClientError, ClientResult};

/// Parses a mapping table from JSON or CSV text.
///
/// JSON must be a top-level array of `[contract_name, integration_item]`
/// pairs or `{ "contract_name", "integration_item" }` objects. Anything else
/// is read as CSV with a header row, taking the first two columns.
pub fn parse_mapping(content: &str, source: &str) -> ClientResult<Vec<MappingPair>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ClientError::invalid_mapping(
            &format!("Mapping table `{source}` is empty."),
            source,
        ));
    }

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return parse_json_pairs(trimmed, source);
    }

    parse_csv_pairs(trimmed, source)
}

fn parse_json_pairs(content: &str, source: &str) -> ClientResult<Vec<MappingPair>> {
    let parsed = serde_json::from_str::<Value>(content).map_err(|_| {
        ClientError::invalid_mapping(
            &format!("Mapping table `{source}` is not valid JSON."),
            source,
        )
    })?;

    let Some(items) = parsed.as_array() else {
        return Err(ClientError::invalid_mapping(
            &format!("Mapping table `{source}` must be a top-level JSON array."),
            source,
        ));
    };

    let mut pairs = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let (name, code) = match item {
            Value::Array(columns) => (
                read_optional_string(columns.first()),
                read_optional_string(columns.get(1)),
            ),
            Value::Object(object) => (
                read_optional_string(object.get("contract_name")),
                read_optional_string(object.get("integration_item")),
            ),
            Value::Null => continue,
            _ => {
                return Err(ClientError::invalid_mapping(
                    &format!(
                        "Mapping entry {} in `{source}` must be a [name, code] pair or an object.",
                        index + 1
                    ),
                    source,
                ));
            }
        };

        push_pair(&mut pairs, name, code);
    }

    Ok(pairs)
}

fn parse_csv_pairs(content: &str, source: &str) -> ClientResult<Vec<MappingPair>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let header_count = reader
        .headers()
        .map_err(|_| {
            ClientError::invalid_mapping(
                &format!("Mapping table `{source}` has a missing or unreadable header row."),
                source,
            )
        })?
        .len();
    if header_count < 2 {
        return Err(ClientError::invalid_mapping(
            &format!("Mapping table `{source}` needs at least two columns: name and code."),
            source,
        ));
    }

    let mut pairs = Vec::new();
    for row in reader.records() {
        let record = row.map_err(|_| {
            ClientError::invalid_mapping(
                &format!("Mapping table `{source}` has malformed or non-UTF-8 rows."),
                source,
            )
        })?;
        push_pair(
            &mut pairs,
            record.get(0).map(str::to_string),
            record.get(1).map(str::to_string),
        );
    }

    Ok(pairs)
}

fn push_pair(pairs: &mut Vec<MappingPair>, name: Option<String>, code: Option<String>) {
    let name = name.map(|value| value.trim().to_string()).unwrap_or_default();
    let code = code.map(|value| value.trim().to_string()).unwrap_or_default();
    if name.is_empty() || code.is_empty() {
        return;
    }
    pairs.push(MappingPair::new(name, code));
}
