use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::schedule::canonical::{BillingType, FrequencyUnit};
use crate::schedule::loose::{format_number, regex_matches};
use crate::schedule::signals::ScheduleSignals;

// No time nouns: month/year/week/day describe cadence, not units.
static PER_UNIT_PHRASE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?:\bper|\beach|/)\s*(?:seat|user|impression|click|lead|unit|order|transaction|visit|listing|ad|sku|gb|hour|minute|api call|api|sms|email|message|device|location)s?\b",
    )
    .ok()
});

static USAGE_KEYWORD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b(?:overage|usage|metered|consumption|rate\s*card|per[-\s]*use)\b").ok()
});

/// Which per-unit signals a record carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnitEvidence {
    pub per_unit_phrase: bool,
    pub usage_keyword: bool,
    pub priced_unit_label: bool,
    pub has_tiers: bool,
}

impl UnitEvidence {
    pub fn detect<S>(record: &S) -> Self
    where
        S: ScheduleSignals + ?Sized,
    {
        let mut parts = Vec::new();
        parts.extend(record.item_name());
        parts.extend(record.description());
        parts.extend(record.unit_label());
        parts.extend(record.evidence_snippets());
        let haystack = parts.join(" ").to_lowercase();

        let has_unit_label = record
            .unit_label()
            .is_some_and(|label| !label.trim().is_empty());

        Self {
            per_unit_phrase: regex_matches(&PER_UNIT_PHRASE, &haystack),
            usage_keyword: regex_matches(&USAGE_KEYWORD, &haystack),
            priced_unit_label: record.price_per_unit().is_some() && has_unit_label,
            has_tiers: record.tier_count() > 0,
        }
    }

    pub fn is_strong(self) -> bool {
        self.per_unit_phrase || self.usage_keyword || self.priced_unit_label || self.has_tiers
    }

    /// Textual usage language only, ignoring structured fields.
    pub fn has_usage_signal(self) -> bool {
        self.per_unit_phrase || self.usage_keyword
    }
}

/// Resolves the billing type: tiers, then unit evidence, then the textual
/// hint, then flat.
///
/// A hint that names "unit" without evidence still resolves to `UnitPrice` so
/// the demotion policy records why it was downgraded.
pub fn resolve_billing_type<S>(record: &S) -> BillingType
where
    S: ScheduleSignals + ?Sized,
{
    if record.tier_count() > 0 {
        return BillingType::TierUnitPrice;
    }
    if UnitEvidence::detect(record).is_strong() {
        return BillingType::UnitPrice;
    }

    let hint = record.billing_type_hint().unwrap_or_default().to_lowercase();
    if hint.contains("tier") && hint.contains("unit") {
        return BillingType::TierUnitPrice;
    }
    if hint.contains("tier") && hint.contains("flat") {
        return BillingType::TierFlatPrice;
    }
    if hint.contains("unit") {
        return BillingType::UnitPrice;
    }
    BillingType::FlatPrice
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencySource {
    ExplicitUnit,
    FrequencyText,
    Fallback,
}

impl FrequencySource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExplicitUnit => "explicit_unit",
            Self::FrequencyText => "frequency_text",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFrequency {
    pub every: u32,
    pub unit: FrequencyUnit,
    pub source: FrequencySource,
    pub issues: Vec<String>,
}

pub fn resolve_frequency(
    text: Option<&str>,
    raw_every: Option<f64>,
    raw_unit: Option<&str>,
    fallback: FrequencyUnit,
) -> ResolvedFrequency {
    let mut issues = Vec::new();
    let explicit = raw_unit.and_then(FrequencyUnit::from_label);

    if let Some(label) = raw_unit
        && explicit.is_none()
        && !label.trim().is_empty()
    {
        let inferred = infer_unit_from_text(text).unwrap_or(fallback);
        issues.push(format!(
            "Unrecognized frequency unit `{}`; using {}.",
            label.trim(),
            inferred.as_str()
        ));
    }

    let (unit, mut every, source) = match explicit {
        Some(unit) => (unit, explicit_every(raw_every, &mut issues), FrequencySource::ExplicitUnit),
        None => {
            let (unit, source) = match infer_unit_from_text(text) {
                Some(unit) => (unit, FrequencySource::FrequencyText),
                None => (fallback, FrequencySource::Fallback),
            };
            (unit, inferred_every(raw_every, unit, &mut issues), source)
        }
    };

    if !unit.is_recurring() && every != 1 {
        issues.push(format!(
            "Reset frequency_every from {every} to 1 because the schedule does not recur."
        ));
        every = 1;
    }

    ResolvedFrequency {
        every,
        unit,
        source,
        issues,
    }
}

fn explicit_every(raw_every: Option<f64>, issues: &mut Vec<String>) -> u32 {
    let Some(value) = raw_every else {
        return 1;
    };
    let rounded = value.round();
    if rounded < 1.0 {
        issues.push(format!(
            "Replaced non-positive frequency_every {value} with 1."
        ));
        return 1;
    }
    u32::try_from(rounded as i64).unwrap_or(u32::MAX)
}

/// An inferred unit always carries a multiplier of 1; a supplied multiplier
/// that disagrees is reported once.
fn inferred_every(raw_every: Option<f64>, unit: FrequencyUnit, issues: &mut Vec<String>) -> u32 {
    let Some(value) = raw_every else {
        return 1;
    };
    let rounded = value.round();
    if rounded != 1.0 {
        issues.push(format!(
            "Reset frequency_every from {} to 1 because the unit {} was inferred from frequency text.",
            format_number(rounded),
            unit.as_str()
        ));
    }
    1
}

fn infer_unit_from_text(text: Option<&str>) -> Option<FrequencyUnit> {
    let lowered = text.unwrap_or("").trim().to_lowercase();
    if lowered.is_empty() || lowered == "none" || lowered.contains("one-time") {
        return Some(FrequencyUnit::None);
    }
    if lowered.contains("annual") {
        return Some(FrequencyUnit::Years);
    }
    if lowered.contains("month") {
        return Some(FrequencyUnit::Months);
    }
    if lowered.contains("year") {
        return Some(FrequencyUnit::Years);
    }
    if lowered.contains("week") {
        return Some(FrequencyUnit::Weeks);
    }
    if lowered.contains("semi") {
        return Some(FrequencyUnit::SemiMonths);
    }
    if lowered.contains("day") {
        return Some(FrequencyUnit::Days);
    }
    None
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        FrequencySource, PER_UNIT_PHRASE, USAGE_KEYWORD, UnitEvidence, resolve_billing_type,
        resolve_frequency,
    };
    use crate::schedule::candidate::CandidateSchedule;
    use crate::schedule::canonical::{BillingType, FrequencyUnit};

    fn candidate(value: serde_json::Value) -> CandidateSchedule {
        CandidateSchedule::from_value(value).unwrap_or_default()
    }

    #[test]
    fn patterns_compile() {
        assert!(PER_UNIT_PHRASE.is_some());
        assert!(USAGE_KEYWORD.is_some());
    }

    #[test]
    fn time_nouns_are_not_unit_evidence() {
        let record = candidate(json!({
            "item_name": "Support",
            "description": "$500 per month, billed monthly"
        }));
        assert!(!UnitEvidence::detect(&record).is_strong());
    }

    #[test]
    fn per_seat_and_usage_language_are_unit_evidence() {
        let seats = candidate(json!({"description": "$12 per seat"}));
        assert!(UnitEvidence::detect(&seats).per_unit_phrase);

        let slash = candidate(json!({"evidence": [{"snippet": "$0.01/API call"}]}));
        assert!(UnitEvidence::detect(&slash).per_unit_phrase);

        let overage = candidate(json!({"item_name": "Overage charges"}));
        assert!(UnitEvidence::detect(&overage).usage_keyword);

        let priced = candidate(json!({"price_per_unit": "0.50", "unit_label": "lead"}));
        let evidence = UnitEvidence::detect(&priced);
        assert!(evidence.priced_unit_label);
        assert!(!evidence.has_usage_signal());
    }

    #[test]
    fn billing_type_order_prefers_tiers_then_evidence() {
        let tiered = candidate(json!({
            "billing_type": "Flat price",
            "tiers": [{"tier_name": "1-10", "price": 5}]
        }));
        assert_eq!(resolve_billing_type(&tiered), BillingType::TierUnitPrice);

        let metered = candidate(json!({"billing_type": "flat", "item_name": "Metered API usage"}));
        assert_eq!(resolve_billing_type(&metered), BillingType::UnitPrice);

        let tier_flat = candidate(json!({"billing_type": "Tier flat price"}));
        assert_eq!(resolve_billing_type(&tier_flat), BillingType::TierFlatPrice);

        let bare = candidate(json!({"billing_type": "something else"}));
        assert_eq!(resolve_billing_type(&bare), BillingType::FlatPrice);
    }

    #[test]
    fn unit_hint_without_evidence_is_kept_for_policy_review() {
        let record = candidate(json!({"billing_type": "Unit price", "item_name": "Platform"}));
        assert_eq!(resolve_billing_type(&record), BillingType::UnitPrice);
    }

    #[test]
    fn explicit_unit_keeps_multiplier() {
        let resolved = resolve_frequency(Some("quarterly"), Some(3.0), Some("month(s)"), FrequencyUnit::None);
        assert_eq!(resolved.unit, FrequencyUnit::Months);
        assert_eq!(resolved.every, 3);
        assert_eq!(resolved.source, FrequencySource::ExplicitUnit);
        assert!(resolved.issues.is_empty());
    }

    #[test]
    fn text_inference_resets_multiplier() {
        let resolved = resolve_frequency(Some("Billed Annually"), Some(4.0), None, FrequencyUnit::None);
        assert_eq!(resolved.unit, FrequencyUnit::Years);
        assert_eq!(resolved.every, 1);
        assert_eq!(
            resolved.issues,
            vec!["Reset frequency_every from 4 to 1 because the unit Year(s) was inferred from frequency text.".to_string()]
        );

        let agreeing = resolve_frequency(Some("monthly"), Some(1.0), None, FrequencyUnit::None);
        assert!(agreeing.issues.is_empty());

        let fallback = resolve_frequency(Some("whenever"), Some(2.0), None, FrequencyUnit::Months);
        assert_eq!(fallback.source, FrequencySource::Fallback);
        assert_eq!(fallback.every, 1);
        assert_eq!(fallback.issues.len(), 1);

        let one_time = resolve_frequency(Some("one-time"), None, None, FrequencyUnit::Months);
        assert_eq!(one_time.unit, FrequencyUnit::None);

        let unknown = resolve_frequency(Some("whenever"), None, None, FrequencyUnit::Months);
        assert_eq!(unknown.unit, FrequencyUnit::Months);
        assert_eq!(unknown.source, FrequencySource::Fallback);
    }

    #[test]
    fn month_language_wins_over_a_mentioned_year() {
        let resolved = resolve_frequency(Some("billed monthly for one year"), None, None, FrequencyUnit::None);
        assert_eq!(resolved.unit, FrequencyUnit::Months);

        let yearly = resolve_frequency(Some("yearly"), None, None, FrequencyUnit::None);
        assert_eq!(yearly.unit, FrequencyUnit::Years);
    }

    #[test]
    fn none_unit_forces_single_multiplier_with_issue() {
        let resolved = resolve_frequency(None, Some(6.0), Some("None"), FrequencyUnit::None);
        assert_eq!(resolved.unit, FrequencyUnit::None);
        assert_eq!(resolved.every, 1);
        assert_eq!(resolved.issues.len(), 1);
    }

    #[test]
    fn unknown_explicit_unit_is_reported() {
        let resolved = resolve_frequency(Some("monthly"), None, Some("fortnights"), FrequencyUnit::None);
        assert_eq!(resolved.unit, FrequencyUnit::Months);
        assert_eq!(resolved.issues.len(), 1);
        assert!(resolved.issues[0].contains("fortnights"));
    }
}
