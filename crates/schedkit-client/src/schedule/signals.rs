use crate::schedule::candidate::CandidateSchedule;
use crate::schedule::canonical::{BillingType, CanonicalSchedule, FrequencyUnit};
use crate::schedule::enums::resolve_billing_type;

/// Read-only view of the text and numeric signals the heuristics inspect.
///
/// Implemented by the raw candidate and by the canonical record so price and
/// evidence detection can run against either one.
pub trait ScheduleSignals {
    fn item_name(&self) -> Option<String>;
    fn description(&self) -> Option<String>;
    fn unit_label(&self) -> Option<String>;
    fn price_per_unit(&self) -> Option<f64>;
    fn tier_count(&self) -> usize;
    fn evidence_snippets(&self) -> Vec<String>;
    fn billing_type_hint(&self) -> Option<String>;
    fn frequency_unit(&self) -> Option<FrequencyUnit>;
    fn price_field(&self, name: &str) -> Option<f64>;
    fn resolved_billing_type(&self) -> BillingType;

    /// Evidence snippets, then description, then item name.
    fn search_texts(&self) -> Vec<String> {
        let mut texts = self.evidence_snippets();
        texts.extend(self.description());
        texts.extend(self.item_name());
        texts
    }
}

impl ScheduleSignals for CandidateSchedule {
    fn item_name(&self) -> Option<String> {
        self.text("item_name")
    }

    fn description(&self) -> Option<String> {
        self.text("description")
    }

    fn unit_label(&self) -> Option<String> {
        self.text("unit_label")
    }

    fn price_per_unit(&self) -> Option<f64> {
        self.number("price_per_unit")
    }

    fn tier_count(&self) -> usize {
        self.tiers().len()
    }

    fn evidence_snippets(&self) -> Vec<String> {
        self.evidence()
            .into_iter()
            .filter_map(|entry| entry.snippet)
            .collect()
    }

    fn billing_type_hint(&self) -> Option<String> {
        self.text("billing_type")
    }

    fn frequency_unit(&self) -> Option<FrequencyUnit> {
        self.text("frequency_unit")
            .and_then(|value| FrequencyUnit::from_label(&value))
    }

    fn price_field(&self, name: &str) -> Option<f64> {
        self.number(name)
    }

    fn resolved_billing_type(&self) -> BillingType {
        resolve_billing_type(self)
    }
}

impl ScheduleSignals for CanonicalSchedule {
    fn item_name(&self) -> Option<String> {
        let trimmed = self.item_name.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    fn description(&self) -> Option<String> {
        self.description.clone()
    }

    fn unit_label(&self) -> Option<String> {
        self.unit_label.clone()
    }

    fn price_per_unit(&self) -> Option<f64> {
        self.price_per_unit
    }

    fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    fn evidence_snippets(&self) -> Vec<String> {
        self.evidence
            .iter()
            .filter_map(|entry| entry.snippet.clone())
            .collect()
    }

    fn billing_type_hint(&self) -> Option<String> {
        Some(self.billing_type.as_str().to_string())
    }

    fn frequency_unit(&self) -> Option<FrequencyUnit> {
        Some(self.frequency_unit)
    }

    fn price_field(&self, name: &str) -> Option<f64> {
        match name {
            "total_price" => self.total_price,
            _ => None,
        }
    }

    fn resolved_billing_type(&self) -> BillingType {
        self.billing_type
    }
}
