use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

// Grouped thousands must carry at least one `,ddd` group, otherwise "12000"
// would stop after the first three digits.
static FIRST_NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"-?\d{1,3}(?:,\d{3})+(?:\.\d+)?|-?\d+(?:\.\d+)?").ok()
});

/// Coerces a JSON value into a finite number.
///
/// Strings yield their first numeric group with thousands separators removed,
/// so `"$1,200.00"` reads as `1200.0` and `"USD 3000"` as `3000.0`.
pub fn number_loose(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64().filter(|parsed| parsed.is_finite()),
        Value::String(text) => number_from_text(text),
        _ => None,
    }
}

pub fn number_from_text(text: &str) -> Option<f64> {
    let pattern = FIRST_NUMBER.as_ref()?;
    let found = pattern.find(text)?;
    let parsed = found.as_str().replace(',', "").parse::<f64>().ok()?;
    parsed.is_finite().then_some(parsed)
}

pub fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|parsed| parsed.is_finite() && *parsed > 0.0)
}

/// Non-empty trimmed text. Numbers are rendered so ids like `42` survive.
pub fn read_optional_string(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    Some(text)
}

pub fn read_optional_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Renders whole numbers without a trailing `.0`.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    format!("{value}")
}

pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

pub(crate) fn regex_matches(pattern: &LazyLock<Option<Regex>>, text: &str) -> bool {
    pattern
        .as_ref()
        .is_some_and(|compiled| compiled.is_match(text))
}
