use schedkit_client::ClientError;
use serde_json::Value;

const CONTEXT_KEYS: [(&str, &str); 4] = [
    ("source", "Source:"),
    ("merchant_id", "Merchant:"),
    ("profile_path", "Profile:"),
    ("command_hint", "Command:"),
];

pub fn render_error(error: &ClientError) -> String {
    let mut lines = vec![
        "schedkit could not finish this command.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];
    lines.extend(context_lines(error.data.as_ref()));
    lines.push(String::new());
    lines.push("What to do next:".to_string());

    if error.recovery_steps.is_empty() {
        lines.push("  1. Retry the command.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}

fn context_lines(data: Option<&Value>) -> Vec<String> {
    let Some(data) = data else {
        return Vec::new();
    };
    CONTEXT_KEYS
        .iter()
        .filter_map(|(key, label)| {
            data.get(*key)
                .and_then(Value::as_str)
                .map(|value| format!("  {label:<9} {value}"))
        })
        .collect()
}
