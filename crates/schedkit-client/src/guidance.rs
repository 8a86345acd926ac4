use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::garage::types::GarageSchedule;
use crate::{ClientError, ClientResult};

/// Per-field extraction hints, rendered into prompt lines in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldGuidance {
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub total_price: Option<String>,
    pub billing_type: Option<String>,
    pub quantity: Option<String>,
    pub start_date: Option<String>,
    pub frequency_unit: Option<String>,
    pub periods: Option<String>,
    pub months_of_service: Option<String>,
    pub net_terms: Option<String>,
    pub billing_timing: Option<String>,
    pub event_to_track: Option<String>,
    pub general: Option<String>,
}

impl FieldGuidance {
    fn named_entries(&self) -> [(&'static str, Option<&str>); 12] {
        [
            ("item_name", self.item_name.as_deref()),
            ("description", self.description.as_deref()),
            ("total_price", self.total_price.as_deref()),
            ("billing_type", self.billing_type.as_deref()),
            ("quantity", self.quantity.as_deref()),
            ("start_date", self.start_date.as_deref()),
            ("frequency_unit", self.frequency_unit.as_deref()),
            ("periods", self.periods.as_deref()),
            ("months_of_service", self.months_of_service.as_deref()),
            ("net_terms", self.net_terms.as_deref()),
            ("billing_timing", self.billing_timing.as_deref()),
            ("event_to_track", self.event_to_track.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantGuidance {
    pub system_additions: Option<String>,
    pub field_specific: FieldGuidance,
    pub default_overrides: Map<String, Value>,
    pub excluded_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GuidanceReport {
    pub overridden_fields: Vec<String>,
    pub ignored_overrides: Vec<String>,
    pub excluded_fields: Vec<String>,
}

impl GuidanceReport {
    pub fn is_empty(&self) -> bool {
        self.overridden_fields.is_empty()
            && self.ignored_overrides.is_empty()
            && self.excluded_fields.is_empty()
    }
}

pub fn parse_guidance(content: &str, source: &str) -> ClientResult<MerchantGuidance> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(MerchantGuidance::default());
    }
    serde_json::from_str::<MerchantGuidance>(trimmed).map_err(|error| {
        ClientError::invalid_guidance(
            &format!("Guidance `{source}` could not be parsed: {error}"),
            source,
        )
    })
}

impl MerchantGuidance {
    /// Lines for the extraction prompt: system additions first, then one line
    /// per non-blank field hint, then the general hint.
    pub fn prompt_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(additions) = non_blank(self.system_additions.as_deref()) {
            lines.push(additions.to_string());
        }
        for (field, hint) in self.field_specific.named_entries() {
            if let Some(hint) = non_blank(hint) {
                lines.push(format!("For {field} field: {hint}"));
            }
        }
        if let Some(general) = non_blank(self.field_specific.general.as_deref()) {
            lines.push(format!("General guidance: {general}"));
        }
        lines
    }

    pub fn prompt_section(&self) -> Option<String> {
        let lines = self.prompt_lines();
        if lines.is_empty() {
            return None;
        }
        Some(format!("MERCHANT-SPECIFIC GUIDANCE:\n{}", lines.join("\n")))
    }

    /// Serializes Garage records and applies overrides, then exclusions.
    pub fn apply_to_garage(
        &self,
        schedules: &[GarageSchedule],
    ) -> ClientResult<(Vec<Value>, GuidanceReport)> {
        let mut report = GuidanceReport::default();
        for field in self.default_overrides.keys() {
            if GarageSchedule::has_field(field) {
                report.overridden_fields.push(field.clone());
            } else {
                tracing::warn!(field = %field, "ignoring default override for unknown Garage field");
                report.ignored_overrides.push(field.clone());
            }
        }
        report.excluded_fields = self
            .excluded_fields
            .iter()
            .filter(|field| GarageSchedule::has_field(field))
            .cloned()
            .collect();

        let mut records = Vec::with_capacity(schedules.len());
        for schedule in schedules {
            let mut value = serde_json::to_value(schedule).map_err(|error| {
                ClientError::internal_serialization(&format!(
                    "Failed to serialize Garage schedule: {error}"
                ))
            })?;
            if let Value::Object(object) = &mut value {
                for field in &report.overridden_fields {
                    if let Some(replacement) = self.default_overrides.get(field) {
                        object.insert(field.clone(), replacement.clone());
                    }
                }
                for field in &report.excluded_fields {
                    object.remove(field);
                }
            }
            records.push(value);
        }

        Ok((records, report))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{MerchantGuidance, parse_guidance};
    use crate::garage::project::project_schedules;
    use crate::schedule::candidate::CandidateSchedule;
    use crate::schedule::normalize::normalize_schedules;

    fn guidance(content: &str) -> MerchantGuidance {
        let parsed = parse_guidance(content, "guidance.json");
        assert!(parsed.is_ok());
        parsed.unwrap_or_default()
    }

    #[test]
    fn every_key_is_optional() {
        assert_eq!(guidance("{}"), MerchantGuidance::default());
        assert_eq!(guidance(""), MerchantGuidance::default());
        let partial = guidance(r#"{"excluded_fields": ["discounts"]}"#);
        assert_eq!(partial.excluded_fields, vec!["discounts".to_string()]);
        assert!(partial.default_overrides.is_empty());
    }

    #[test]
    fn malformed_guidance_is_rejected() {
        for content in ["not json", r#"{"excluded_fields": "discounts"}"#] {
            let parsed = parse_guidance(content, "guidance.json");
            assert!(parsed.is_err());
            if let Err(error) = parsed {
                assert_eq!(error.code, "invalid_guidance");
            }
        }
    }

    #[test]
    fn prompt_lines_follow_field_order() {
        let parsed = guidance(
            r#"{
                "system_additions": "Invoices are in EUR.",
                "field_specific": {
                    "start_date": "Use the effective date.",
                    "item_name": "Prefer SKU names.",
                    "quantity": "  ",
                    "general": "Ignore renewal tables."
                }
            }"#,
        );
        assert_eq!(
            parsed.prompt_lines(),
            vec![
                "Invoices are in EUR.".to_string(),
                "For item_name field: Prefer SKU names.".to_string(),
                "For start_date field: Use the effective date.".to_string(),
                "General guidance: Ignore renewal tables.".to_string(),
            ]
        );
        assert!(
            parsed
                .prompt_section()
                .is_some_and(|section| section.starts_with("MERCHANT-SPECIFIC GUIDANCE:\n"))
        );
        assert!(MerchantGuidance::default().prompt_section().is_none());
    }

    #[test]
    fn overrides_replace_known_fields_and_exclusions_remove_them() {
        let candidate = CandidateSchedule::from_value(json!({
            "item_name": "Support",
            "total_price": 100,
            "frequency_unit": "Month(s)",
            "net_terms": 30
        }))
        .unwrap_or_default();
        let garage = project_schedules(&normalize_schedules(&[candidate]));

        let parsed = guidance(
            r#"{
                "default_overrides": {"net_terms": 60, "currency": "EUR"},
                "excluded_fields": ["discounts", "revenue_category", "not_a_field"]
            }"#,
        );
        let applied = parsed.apply_to_garage(&garage);
        assert!(applied.is_ok());
        if let Ok((records, report)) = applied {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0]["net_terms"], json!(60));
            assert!(records[0].get("currency").is_none());
            assert!(records[0].get("discounts").is_none());
            assert!(records[0].get("revenue_category").is_none());
            assert_eq!(records[0]["item_name"], json!("Support"));

            assert_eq!(report.overridden_fields, vec!["net_terms".to_string()]);
            assert_eq!(report.ignored_overrides, vec!["currency".to_string()]);
            assert_eq!(
                report.excluded_fields,
                vec!["discounts".to_string(), "revenue_category".to_string()]
            );
        }
    }
}
