use std::io;

use schedkit_client::{ClientError, SuccessEnvelope};
use serde::Serialize;
use serde_json::{Value, json};

const JSON_VERSION: &str = "v1";

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    let value = match success.command.as_str() {
        "normalize" | "reconcile" | "project" | "match" => json!({
            "ok": true,
            "version": JSON_VERSION,
            "command": success.command,
            "data": success.data.clone(),
        }),
        _ => {
            return Err(io::Error::other(format!(
                "JSON output is not supported for command `{}`",
                success.command
            )));
        }
    };

    serialize_json_pretty(&value)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    let mut payload = json!({
        "error": {
            "code": error.code,
            "message": error.message,
            "recovery_steps": error.recovery_steps,
        }
    });
    if let Some(data) = &error.data
        && let Some(body) = payload.get_mut("error").and_then(Value::as_object_mut)
    {
        body.insert("data".to_string(), data.clone());
    }
    serialize_json_pretty(&payload)
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use schedkit_client::{ClientError, SuccessEnvelope};
    use serde_json::{Value, json};

    use super::{render_error_json, render_success_json};

    fn success(command: &str, data: Value) -> SuccessEnvelope {
        SuccessEnvelope {
            ok: true,
            command: command.to_string(),
            version: "0.1.0".to_string(),
            data,
        }
    }

    #[test]
    fn success_json_wraps_data_in_versioned_envelope() {
        let payload = success("normalize", json!({"schedule_count": 2}));

        let rendered = render_success_json(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["ok"], Value::Bool(true));
                assert_eq!(value["version"], json!("v1"));
                assert_eq!(value["command"], json!("normalize"));
                assert_eq!(value["data"]["schedule_count"], json!(2));
            }
        }
    }

    #[test]
    fn unknown_command_is_an_output_error() {
        let rendered = render_success_json(&success("extract", json!({})));
        assert!(rendered.is_err());
    }

    #[test]
    fn error_json_uses_universal_shape() {
        let error = ClientError::invalid_mapping("Mapping table `m.csv` is empty.", "m.csv");
        let rendered = render_error_json(&error);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["error"]["code"], json!("invalid_mapping"));
                assert_eq!(value["error"]["data"]["source"], json!("m.csv"));
                assert!(value.get("ok").is_none());
            }
        }
    }
}
