use serde::{Deserialize, Serialize};

use crate::schedule::canonical::CanonicalSchedule;

const HIGH_CONFIDENCE_FLOOR: f64 = -1000.0;
const MEDIUM_CONFIDENCE_FLOOR: f64 = -5000.0;
const LOW_CONFIDENCE_FLOOR: f64 = -10000.0;

const SUBSTRING_OFFSET_COST: f64 = 10.0;
const GAP_RUN_COST: f64 = 200.0;
const GAP_CHAR_COST: f64 = 20.0;
const SUBSEQUENCE_LENGTH_COST: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchConfidence {
    High,
    Medium,
    Low,
    None,
}

impl MatchConfidence {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::None => "none",
        }
    }

    pub fn from_score(score: f64) -> Self {
        if score > HIGH_CONFIDENCE_FLOOR {
            Self::High
        } else if score > MEDIUM_CONFIDENCE_FLOOR {
            Self::Medium
        } else if score > LOW_CONFIDENCE_FLOOR {
            Self::Low
        } else {
            Self::None
        }
    }
}

/// One row of a merchant's contract-name to integration-code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingPair {
    pub contract_name: String,
    pub integration_item: String,
}

impl MappingPair {
    pub fn new(contract_name: impl Into<String>, integration_item: impl Into<String>) -> Self {
        Self {
            contract_name: contract_name.into(),
            integration_item: integration_item.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationMatch {
    pub integration_item: Option<String>,
    pub match_score: f64,
    pub match_confidence: MatchConfidence,
    pub matched_contract_name: Option<String>,
}

impl IntegrationMatch {
    pub fn none() -> Self {
        Self {
            integration_item: None,
            match_score: 0.0,
            match_confidence: MatchConfidence::None,
            matched_contract_name: None,
        }
    }
}

/// Scores `target` against `query`, case-insensitively.
///
/// A multi-word query is also scored word by word, each word matched on its
/// own and the scores summed; the better of the two readings wins. Returns
/// `None` when neither reading matches. Scores are never positive and an
/// exact match scores `0`.
pub fn fuzzy_score(query: &str, target: &str) -> Option<f64> {
    let target = target.trim().to_lowercase().chars().collect::<Vec<char>>();
    let whole = score_chars(query.trim(), &target);

    let words = query.split_whitespace().collect::<Vec<&str>>();
    if words.len() < 2 {
        return whole;
    }
    let by_word = words
        .iter()
        .map(|word| score_chars(word, &target))
        .sum::<Option<f64>>();

    match (whole, by_word) {
        (Some(whole), Some(by_word)) => Some(whole.max(by_word)),
        (whole, by_word) => whole.or(by_word),
    }
}

fn score_chars(query: &str, target: &[char]) -> Option<f64> {
    let query = query.to_lowercase().chars().collect::<Vec<char>>();
    if query.is_empty() || target.len() < query.len() {
        return None;
    }
    if query == target {
        return Some(0.0);
    }

    let extra_length = (target.len() - query.len()) as f64;
    if let Some(offset) = target
        .windows(query.len())
        .position(|window| window == query.as_slice())
    {
        return Some(-(SUBSTRING_OFFSET_COST * offset as f64 + extra_length));
    }

    let mut gap_runs = 0_usize;
    let mut gap_chars = 0_usize;
    let mut previous: Option<usize> = None;
    let mut cursor = 0_usize;
    for wanted in &query {
        let found = target[cursor..].iter().position(|ch| ch == wanted)? + cursor;
        if let Some(previous) = previous
            && found > previous + 1
        {
            gap_runs += 1;
            gap_chars += found - previous - 1;
        }
        previous = Some(found);
        cursor = found + 1;
    }

    Some(
        -(GAP_RUN_COST * gap_runs as f64
            + GAP_CHAR_COST * gap_chars as f64
            + SUBSEQUENCE_LENGTH_COST * extra_length),
    )
}

/// Best mapping row for `item_name`. Ties keep table order.
pub fn match_integration_item(item_name: &str, pairs: &[MappingPair]) -> IntegrationMatch {
    if item_name.trim().is_empty() || pairs.is_empty() {
        return IntegrationMatch::none();
    }

    let mut best: Option<(f64, &MappingPair)> = None;
    for pair in pairs {
        let Some(score) = fuzzy_score(item_name, &pair.contract_name) else {
            continue;
        };
        if best.is_none_or(|(best_score, _)| score > best_score) {
            best = Some((score, pair));
        }
    }

    let Some((score, pair)) = best else {
        return IntegrationMatch::none();
    };
    let confidence = MatchConfidence::from_score(score);
    if confidence == MatchConfidence::None {
        return IntegrationMatch::none();
    }

    IntegrationMatch {
        integration_item: Some(pair.integration_item.clone()),
        match_score: score,
        match_confidence: confidence,
        matched_contract_name: Some(pair.contract_name.clone()),
    }
}

/// Annotates records with their integration code. Records with an empty item
/// name and empty tables are left untouched.
pub fn annotate_integration_items(records: &mut [CanonicalSchedule], pairs: &[MappingPair]) {
    if pairs.is_empty() {
        return;
    }
    for record in records {
        if record.item_name.trim().is_empty() {
            continue;
        }
        let matched = match_integration_item(&record.item_name, pairs);
        tracing::debug!(
            item_name = %record.item_name,
            confidence = matched.match_confidence.as_str(),
            score = matched.match_score,
            "matched integration item"
        );
        record.integration_item = matched.integration_item;
        record.integration_match_confidence = Some(matched.match_confidence);
        record.integration_match_score = Some(matched.match_score);
        record.integration_matched_name = matched.matched_contract_name;
    }
}
