use std::fs;
use std::path::{Path, PathBuf};

use schedkit_client::{ClientResult, SuccessEnvelope};
use serde_json::{Value, json};
use tempfile::{Builder, TempDir};

pub fn temp_dir_in_tmp(prefix: &str) -> std::io::Result<TempDir> {
    Builder::new().prefix(prefix).tempdir_in("/tmp")
}

pub fn write_fixture_json(base: &Path, name: &str, value: &Value) -> std::io::Result<PathBuf> {
    let path = base.join(name);
    let body = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    fs::write(&path, body)?;
    Ok(path)
}

pub fn write_fixture_text(base: &Path, name: &str, body: &str) -> std::io::Result<PathBuf> {
    let path = base.join(name);
    fs::write(&path, body)?;
    Ok(path)
}

/// Creates `<home>/merchants/<merchant_id>/` with optional guidance and CSV mapping.
pub fn write_merchant_profile(
    home: &Path,
    merchant_id: &str,
    guidance: Option<&Value>,
    mapping_csv: Option<&str>,
) -> std::io::Result<PathBuf> {
    let dir = home.join("merchants").join(merchant_id);
    fs::create_dir_all(&dir)?;
    if let Some(guidance) = guidance {
        write_fixture_json(&dir, "guidance.json", guidance)?;
    }
    if let Some(mapping) = mapping_csv {
        write_fixture_text(&dir, "mapping.csv", mapping)?;
    }
    Ok(dir)
}

pub fn envelope_value(result: ClientResult<SuccessEnvelope>) -> Value {
    assert!(result.is_ok(), "{:?}", result.as_ref().err());
    if let Ok(success) = result {
        let payload = serde_json::to_value(success);
        assert!(payload.is_ok());
        if let Ok(value) = payload {
            return value;
        }
    }
    Value::Null
}

pub fn sample_payload() -> Value {
    json!({
        "schedules": [
            {
                "item_name": "Platform Support Plan",
                "description": "Annual support for the platform",
                "billing_type": "Flat price",
                "total_price": "$12,000.00",
                "start_date": "2026-01-01",
                "frequency_unit": "Month(s)",
                "frequency_every": 3,
                "months_of_service": 12,
                "net_terms": 30
            },
            {
                "item_name": "Onboarding",
                "description": "Complimentary onboarding for new admins",
                "start_date": "2026-01-01",
                "frequency_unit": "None"
            },
            {
                "item_name": "API Calls",
                "billing_type": "Unit price",
                "unit_label": "per 1,000 API calls",
                "price_per_unit": 2.5,
                "total_price": 250,
                "start_date": "2026-01-01",
                "frequency_unit": "Month(s)",
                "months_of_service": 12
            }
        ],
        "issues": ["Second page was partially illegible."],
        "totals_check": {"stated_total": 12250}
    })
}

pub fn second_run_payload() -> Value {
    json!([
        {
            "item_name": "Platform Support Plan",
            "total_price": 12000,
            "start_date": "2026-01-01",
            "frequency_unit": "Month(s)",
            "frequency_every": 3,
            "months_of_service": 12
        },
        {
            "item_name": "Onboarding",
            "description": "Complimentary onboarding for new admins",
            "start_date": "2026-01-01",
            "frequency_unit": "None"
        }
    ])
}
