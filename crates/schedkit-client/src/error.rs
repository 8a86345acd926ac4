use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `schedkit {cmd} --help` for usage."),
            None => "Run `schedkit --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn source_read_failed(source: &str, detail: &str) -> Self {
        Self::new(
            "source_read_failed",
            &format!("Could not read `{source}`: {detail}"),
            vec![
                "Verify the path exists and is readable.".to_string(),
                "Use `-` as the path to read the payload from stdin.".to_string(),
            ],
        )
        .with_data(json!({
            "source": source,
        }))
    }

    pub fn invalid_payload(message: &str, source: &str) -> Self {
        Self::new(
            "invalid_payload",
            message,
            vec![
                "Provide a JSON object with a `schedules` array, or a bare JSON array of schedule objects."
                    .to_string(),
                "Rerun the extraction if the payload was truncated.".to_string(),
            ],
        )
        .with_data(json!({
            "source": source,
            "supported_shapes": ["object_with_schedules", "json_array"],
        }))
    }

    pub fn invalid_mapping(message: &str, source: &str) -> Self {
        Self::new(
            "invalid_mapping",
            message,
            vec![
                "Provide a JSON array of [contract_name, integration_item] pairs.".to_string(),
                "Or provide a CSV with a header row whose first two columns are name and code."
                    .to_string(),
            ],
        )
        .with_data(json!({
            "source": source,
            "supported_formats": ["json_pairs", "json_objects", "csv"],
        }))
    }

    pub fn invalid_guidance(message: &str, source: &str) -> Self {
        Self::new(
            "invalid_guidance",
            message,
            vec![
                "Guidance must be a JSON object with optional `system_additions`, `field_specific`, `default_overrides` and `excluded_fields` keys."
                    .to_string(),
            ],
        )
        .with_data(json!({
            "source": source,
        }))
    }

    pub fn profile_not_found(merchant_id: &str, path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "profile_not_found",
            &format!("No merchant profile for `{merchant_id}` at `{location}`."),
            vec![
                format!("Create `{location}` with guidance.json and mapping.json or mapping.csv."),
                "Set `SCHEDKIT_HOME` if your profiles live somewhere else.".to_string(),
            ],
        )
        .with_data(json!({
            "merchant_id": merchant_id,
            "profile_path": location,
        }))
    }

    pub fn profile_home_unavailable() -> Self {
        Self::new(
            "profile_not_found",
            "Could not resolve a home directory for merchant profiles.",
            vec!["Set `SCHEDKIT_HOME` to the directory that holds `merchants/`.".to_string()],
        )
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
