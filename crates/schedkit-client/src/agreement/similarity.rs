use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::agreement::policy::AgreementPolicy;
use crate::schedule::canonical::{CanonicalSchedule, Tier};
use crate::schedule::date::{days_apart, parse_loose_date};
use crate::schedule::loose::clamp01;

const TIER_NAME_WEIGHT: f64 = 0.3;
const TIER_PRICE_WEIGHT: f64 = 0.5;
const TIER_MIN_QUANTITY_WEIGHT: f64 = 0.2;

/// Lower-cased alphanumeric tokens of at least two characters.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    let cleaned = text
        .to_lowercase()
        .chars()
        .map(|ch| {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch.is_whitespace() {
                ch
            } else {
                ' '
            }
        })
        .collect::<String>();
    cleaned
        .split_whitespace()
        .filter(|token| token.len() > 1)
        .map(std::string::ToString::to_string)
        .collect()
}

pub fn jaccard_tokens(left: Option<&str>, right: Option<&str>) -> f64 {
    let left_tokens = tokenize(left.unwrap_or(""));
    let right_tokens = tokenize(right.unwrap_or(""));
    if left_tokens.is_empty() && right_tokens.is_empty() {
        return 1.0;
    }
    let shared = left_tokens.intersection(&right_tokens).count();
    let union = left_tokens.union(&right_tokens).count();
    if union == 0 {
        return 0.0;
    }
    shared as f64 / union as f64
}

pub fn numeric_similarity(left: Option<f64>, right: Option<f64>) -> f64 {
    match (left, right) {
        (None, None) => 1.0,
        (Some(left), Some(right)) if left.is_finite() && right.is_finite() => {
            let denominator = 1.0_f64.max(left.abs()).max(right.abs());
            clamp01(1.0 - (left - right).abs() / denominator)
        }
        _ => 0.0,
    }
}

pub fn date_similarity(left: Option<&str>, right: Option<&str>) -> f64 {
    match (left, right) {
        (None, None) => 1.0,
        (Some(left), Some(right)) => match (parse_loose_date(left), parse_loose_date(right)) {
            (Some(left), Some(right)) => {
                clamp01((-(days_apart(&left, &right) as f64) / 30.0).exp())
            }
            _ => 0.0,
        },
        _ => 0.0,
    }
}

pub fn enum_similarity<T>(left: Option<T>, right: Option<T>) -> f64
where
    T: PartialEq,
{
    match (left, right) {
        (None, None) => 1.0,
        (Some(left), Some(right)) if left == right => 1.0,
        _ => 0.0,
    }
}

/// Position-wise tier comparison averaged over the longer list.
pub fn tiers_similarity(left: &[Tier], right: &[Tier]) -> f64 {
    let length = left.len().max(right.len());
    if length == 0 {
        return 1.0;
    }

    let empty = Tier::default();
    let total = (0..length)
        .map(|index| {
            let left_tier = left.get(index).unwrap_or(&empty);
            let right_tier = right.get(index).unwrap_or(&empty);
            TIER_NAME_WEIGHT
                * jaccard_tokens(left_tier.tier_name.as_deref(), right_tier.tier_name.as_deref())
                + TIER_PRICE_WEIGHT * numeric_similarity(left_tier.price, right_tier.price)
                + TIER_MIN_QUANTITY_WEIGHT
                    * numeric_similarity(left_tier.min_quantity, right_tier.min_quantity)
        })
        .sum::<f64>();
    clamp01(total / length as f64)
}

/// Per-field similarity between two schedules, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSimilarity {
    pub item_name: f64,
    pub total_price: f64,
    pub start_date: f64,
    pub frequency_unit: f64,
    pub frequency_every: f64,
    pub unit_label: f64,
    pub event_to_track: f64,
    pub tiers: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduleSimilarity {
    pub similarity: f64,
    pub fields: FieldSimilarity,
}

pub fn field_similarity(left: &CanonicalSchedule, right: &CanonicalSchedule) -> FieldSimilarity {
    FieldSimilarity {
        item_name: jaccard_tokens(Some(&left.item_name), Some(&right.item_name)),
        total_price: numeric_similarity(left.total_price, right.total_price),
        start_date: date_similarity(left.start_date.as_deref(), right.start_date.as_deref()),
        frequency_unit: enum_similarity(Some(left.frequency_unit), Some(right.frequency_unit)),
        frequency_every: numeric_similarity(
            Some(f64::from(left.frequency_every)),
            Some(f64::from(right.frequency_every)),
        ),
        unit_label: jaccard_tokens(left.unit_label.as_deref(), right.unit_label.as_deref()),
        event_to_track: jaccard_tokens(
            left.event_to_track.as_deref(),
            right.event_to_track.as_deref(),
        ),
        tiers: tiers_similarity(&left.tiers, &right.tiers),
    }
}

pub fn schedule_similarity(
    left: &CanonicalSchedule,
    right: &CanonicalSchedule,
    policy: &AgreementPolicy,
) -> ScheduleSimilarity {
    let fields = field_similarity(left, right);
    ScheduleSimilarity {
        similarity: clamp01(policy.weighted_similarity(&fields)),
        fields,
    }
}
