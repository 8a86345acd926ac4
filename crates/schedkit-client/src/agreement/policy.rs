use crate::agreement::similarity::FieldSimilarity;
use crate::schedule::loose::clamp01;

/// Agreement policy identifier reported with every reconciliation summary.
pub const AGREEMENT_POLICY_VERSION: &str = "agreement/v1";

/// v1 cross-run agreement policy.
///
/// Notes:
/// - Field weights sum to one, so a perfect field match scores `1.0`.
/// - A run-1 schedule only counts as matched when its best run-2 candidate
///   scores strictly above zero.
#[derive(Debug, Clone, Copy)]
pub struct AgreementPolicy {
    pub item_name_weight: f64,
    pub total_price_weight: f64,
    pub start_date_weight: f64,
    pub frequency_unit_weight: f64,
    pub frequency_every_weight: f64,
    pub unit_label_weight: f64,
    pub event_to_track_weight: f64,
    pub tiers_weight: f64,
    pub confidence_floor: f64,
    pub confidence_scale: f64,
    pub max_completeness_penalty: f64,
    pub min_confidence: f64,
    pub min_similarity: f64,
}

impl AgreementPolicy {
    pub fn weighted_similarity(self, fields: &FieldSimilarity) -> f64 {
        (self.item_name_weight * fields.item_name)
            + (self.total_price_weight * fields.total_price)
            + (self.start_date_weight * fields.start_date)
            + (self.frequency_unit_weight * fields.frequency_unit)
            + (self.frequency_every_weight * fields.frequency_every)
            + (self.unit_label_weight * fields.unit_label)
            + (self.event_to_track_weight * fields.event_to_track)
            + (self.tiers_weight * fields.tiers)
    }

    /// Multiplier in `[1 - max_completeness_penalty, 1]` that shrinks as key
    /// fields go missing.
    pub fn completeness_factor(self, missing: usize, total: usize) -> f64 {
        if total == 0 {
            return 1.0;
        }
        clamp01(1.0 - self.max_completeness_penalty * (missing as f64 / total as f64))
    }

    pub fn confidence(self, similarity: f64, completeness_factor: f64) -> f64 {
        clamp01(self.confidence_floor + self.confidence_scale * similarity * completeness_factor)
    }

    pub fn needs_review(self, confidence: f64, similarity: f64) -> bool {
        confidence < self.min_confidence || similarity < self.min_similarity
    }
}

pub const AGREEMENT_POLICY_V1: AgreementPolicy = AgreementPolicy {
    item_name_weight: 0.35,
    total_price_weight: 0.25,
    start_date_weight: 0.10,
    frequency_unit_weight: 0.10,
    frequency_every_weight: 0.05,
    unit_label_weight: 0.05,
    event_to_track_weight: 0.05,
    tiers_weight: 0.05,
    confidence_floor: 0.2,
    confidence_scale: 0.8,
    max_completeness_penalty: 0.5,
    min_confidence: 0.75,
    min_similarity: 0.70,
};
