use std::sync::LazyLock;

use regex::Regex;

use crate::schedule::canonical::{BillingType, CanonicalSchedule};
use crate::schedule::enums::UnitEvidence;
use crate::schedule::loose::regex_matches;

/// Normalization policy identifier, emitted with normalized output so rule
/// changes stay visible in diffs.
pub const NORMALIZATION_POLICY_VERSION: &str = "normalize/v1";

pub const MAX_EVIDENCE_ENTRIES: usize = 8;

pub const UNIT_WITHOUT_EVIDENCE_ISSUE: &str =
    "Demoted Unit → Flat: missing explicit per-unit/usage evidence.";
pub const TIME_BASED_UNIT_ISSUE: &str = "Demoted Unit → Flat: time-based price detected (e.g., $/month). Frequency is not a usage unit.";
pub const TIER_WITHOUT_TIERS_ISSUE: &str = "Demoted Tier → Flat: no tiers found.";

static TIME_WORD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:month|year|week|day|period)s?\b").ok());

/// Inputs a rule may consult besides the record it rewrites.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    /// Evidence detected on the raw candidate.
    pub evidence: UnitEvidence,
}

/// Rewrites the record when its condition holds and returns the issue text.
pub type DemotionRule = fn(&mut CanonicalSchedule, &RuleContext) -> Option<String>;

/// Ordered demotion policy. Later rules see the effect of earlier ones.
pub const DEMOTION_RULES: [(&str, DemotionRule); 3] = [
    ("unit_requires_evidence", demote_unit_without_evidence),
    ("unit_is_not_a_time_period", demote_time_based_unit),
    ("tier_requires_tiers", demote_tier_without_tiers),
];

/// Runs every rule in order, appending one issue per firing rule.
///
/// Returns the names of the rules that fired.
pub fn apply_demotion_policy(
    record: &mut CanonicalSchedule,
    context: &RuleContext,
) -> Vec<&'static str> {
    let mut fired = Vec::new();
    for (name, rule) in DEMOTION_RULES {
        if let Some(issue) = rule(record, context) {
            tracing::debug!(rule = name, item = %record.item_name, "demotion rule fired");
            record.push_issue(issue);
            fired.push(name);
        }
    }
    fired
}

pub fn demote_unit_without_evidence(
    record: &mut CanonicalSchedule,
    context: &RuleContext,
) -> Option<String> {
    if record.billing_type != BillingType::UnitPrice || context.evidence.is_strong() {
        return None;
    }
    record.demote_to_flat();
    Some(UNIT_WITHOUT_EVIDENCE_ISSUE.to_string())
}

pub fn demote_time_based_unit(
    record: &mut CanonicalSchedule,
    context: &RuleContext,
) -> Option<String> {
    if record.billing_type != BillingType::UnitPrice
        || !record.frequency_unit.is_recurring()
        || record.event_to_track.is_some()
        || context.evidence.has_usage_signal()
    {
        return None;
    }
    let label_is_time_word = match record.unit_label.as_deref() {
        None => true,
        Some(label) => regex_matches(&TIME_WORD, label),
    };
    if !label_is_time_word {
        return None;
    }
    record.demote_to_flat();
    Some(TIME_BASED_UNIT_ISSUE.to_string())
}

pub fn demote_tier_without_tiers(
    record: &mut CanonicalSchedule,
    _context: &RuleContext,
) -> Option<String> {
    if !record.billing_type.is_tier() || !record.tiers.is_empty() {
        return None;
    }
    record.billing_type = BillingType::FlatPrice;
    record.quantity = Some(1.0);
    Some(TIER_WITHOUT_TIERS_ISSUE.to_string())
}
