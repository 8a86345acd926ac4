use serde::Serialize;
use serde_json::Value;

use crate::schedule::candidate::CandidateSchedule;
use crate::{ClientError, ClientResult};

/// Parsed extraction-service response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionPayload {
    pub schedules: Vec<CandidateSchedule>,
    pub issues: Vec<String>,
    pub totals_check: Option<Value>,
    pub model_recommendations: Option<Value>,
}

/// Reads a payload that is an object with `schedules`, a bare array, or JSON
/// surrounded by prose.
///
/// `source` names the input in error messages.
pub fn parse_payload(content: &str, source: &str) -> ClientResult<ExtractionPayload> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ClientError::invalid_payload(
            &format!("Payload `{source}` is empty."),
            source,
        ));
    }

    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(_) => recover_embedded_object(trimmed).ok_or_else(|| {
            ClientError::invalid_payload(
                &format!("Payload `{source}` is not valid JSON."),
                source,
            )
        })?,
    };

    match value {
        Value::Array(items) => Ok(payload_from_items(items, Vec::new(), None, None)),
        Value::Object(mut object) => {
            let issues = object
                .remove("issues")
                .and_then(|value| match value {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .unwrap_or_default()
                .into_iter()
                .filter_map(|item| item.as_str().map(std::string::ToString::to_string))
                .collect::<Vec<String>>();
            let totals_check = object.remove("totals_check").filter(|value| !value.is_null());
            let model_recommendations = object
                .remove("model_recommendations")
                .filter(|value| !value.is_null());

            match object.remove("schedules") {
                Some(Value::Array(items)) => Ok(payload_from_items(
                    items,
                    issues,
                    totals_check,
                    model_recommendations,
                )),
                Some(_) => Err(ClientError::invalid_payload(
                    &format!("Payload `{source}` has a `schedules` field that is not an array."),
                    source,
                )),
                None => Err(ClientError::invalid_payload(
                    &format!("Payload `{source}` is a JSON object without a `schedules` array."),
                    source,
                )),
            }
        }
        _ => Err(ClientError::invalid_payload(
            &format!("Payload `{source}` must be a JSON object or array."),
            source,
        )),
    }
}

fn recover_embedded_object(content: &str) -> Option<Value> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&content[start..=end]).ok()
}

fn payload_from_items(
    items: Vec<Value>,
    mut issues: Vec<String>,
    totals_check: Option<Value>,
    model_recommendations: Option<Value>,
) -> ExtractionPayload {
    let mut schedules = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match CandidateSchedule::from_value(item) {
            Some(candidate) => schedules.push(candidate),
            None => {
                tracing::warn!(index, "skipping non-object schedule entry");
                issues.push(format!(
                    "Skipped schedule entry {} because it is not an object.",
                    index + 1
                ));
            }
        }
    }

    ExtractionPayload {
        schedules,
        issues,
        totals_check,
        model_recommendations,
    }
}
