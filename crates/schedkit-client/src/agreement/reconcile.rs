use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::agreement::policy::{AGREEMENT_POLICY_V1, AGREEMENT_POLICY_VERSION, AgreementPolicy};
use crate::agreement::similarity::{FieldSimilarity, schedule_similarity};
use crate::schedule::canonical::CanonicalSchedule;

const KEY_FIELD_COUNT: usize = 5;

/// Best run-2 counterpart for one run-1 schedule.
///
/// `matched_index_in_run2` is `None` and `fields` is empty when no unclaimed
/// run-2 schedule scored above zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreementDetail {
    pub matched_index_in_run2: Option<usize>,
    pub similarity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldSimilarity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgreementItem {
    pub run1_index: usize,
    pub confidence: f64,
    pub flag_for_review: bool,
    pub agreement: AgreementDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgreementSummary {
    pub policy_version: &'static str,
    pub avg_confidence: Option<f64>,
    pub min_confidence: Option<f64>,
    pub total_items_run1: usize,
    pub total_items_run2: usize,
    pub flagged: usize,
    pub unmatched_in_run1: usize,
    pub unmatched_in_run2: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgreementReport {
    pub items: Vec<AgreementItem>,
    pub summary: AgreementSummary,
}

pub fn reconcile(run1: &[CanonicalSchedule], run2: &[CanonicalSchedule]) -> AgreementReport {
    reconcile_with_policy(run1, run2, AGREEMENT_POLICY_V1)
}

/// Greedy pairing in run-1 order. A claimed run-2 schedule is never offered to
/// a later run-1 schedule, and ties keep the earliest run-2 index.
pub fn reconcile_with_policy(
    run1: &[CanonicalSchedule],
    run2: &[CanonicalSchedule],
    policy: AgreementPolicy,
) -> AgreementReport {
    let mut claimed = BTreeSet::new();
    let mut items = Vec::with_capacity(run1.len());

    for (run1_index, schedule) in run1.iter().enumerate() {
        let mut best: Option<(usize, FieldSimilarity)> = None;
        let mut best_similarity = 0.0;

        for (run2_index, candidate) in run2.iter().enumerate() {
            if claimed.contains(&run2_index) {
                continue;
            }
            let scored = schedule_similarity(schedule, candidate, &policy);
            if scored.similarity > best_similarity {
                best_similarity = scored.similarity;
                best = Some((run2_index, scored.fields));
            }
        }

        if let Some((run2_index, _)) = best {
            claimed.insert(run2_index);
        }

        let factor = policy.completeness_factor(missing_key_fields(schedule), KEY_FIELD_COUNT);
        let confidence = policy.confidence(best_similarity, factor);
        let flag_for_review = policy.needs_review(confidence, best_similarity);

        let matched_index_in_run2 = best.as_ref().map(|(index, _)| *index);
        tracing::debug!(
            run1_index,
            matched = ?matched_index_in_run2,
            similarity = best_similarity,
            confidence,
            flag_for_review,
            "reconciled schedule"
        );

        items.push(AgreementItem {
            run1_index,
            confidence,
            flag_for_review,
            agreement: AgreementDetail {
                matched_index_in_run2,
                similarity: best_similarity,
                fields: best.map(|(_, fields)| fields),
            },
        });
    }

    let summary = summarize(&items, run1.len(), run2.len(), claimed.len());
    AgreementReport { items, summary }
}

/// Copies confidence, review flag, and agreement detail onto run-1 records.
pub fn attach_agreement(records: &mut [CanonicalSchedule], report: &AgreementReport) {
    for item in &report.items {
        if let Some(record) = records.get_mut(item.run1_index) {
            record.confidence = Some(item.confidence);
            record.flag_for_review = Some(item.flag_for_review);
            record.agreement = Some(item.agreement.clone());
        }
    }
}

fn missing_key_fields(schedule: &CanonicalSchedule) -> usize {
    // Frequency unit and periods are always populated on canonical records.
    [
        schedule.item_name.trim().is_empty(),
        schedule.total_price.is_none(),
        schedule
            .start_date
            .as_deref()
            .is_none_or(|date| date.trim().is_empty()),
    ]
    .into_iter()
    .filter(|missing| *missing)
    .count()
}

fn summarize(
    items: &[AgreementItem],
    total_items_run1: usize,
    total_items_run2: usize,
    claimed: usize,
) -> AgreementSummary {
    let avg_confidence = (!items.is_empty()).then(|| {
        items.iter().map(|item| item.confidence).sum::<f64>() / items.len() as f64
    });
    let min_confidence = items
        .iter()
        .map(|item| item.confidence)
        .reduce(f64::min);

    AgreementSummary {
        policy_version: AGREEMENT_POLICY_VERSION,
        avg_confidence,
        min_confidence,
        total_items_run1,
        total_items_run2,
        flagged: items.iter().filter(|item| item.flag_for_review).count(),
        unmatched_in_run1: items
            .iter()
            .filter(|item| item.agreement.matched_index_in_run2.is_none())
            .count(),
        unmatched_in_run2: total_items_run2.saturating_sub(claimed),
    }
}
