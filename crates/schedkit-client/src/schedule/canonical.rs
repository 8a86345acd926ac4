use serde::{Deserialize, Serialize};

use crate::agreement::reconcile::AgreementDetail;
use crate::integration::matcher::MatchConfidence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingType {
    #[serde(rename = "Flat price")]
    FlatPrice,
    #[serde(rename = "Unit price")]
    UnitPrice,
    #[serde(rename = "Tier flat price")]
    TierFlatPrice,
    #[serde(rename = "Tier unit price")]
    TierUnitPrice,
}

impl BillingType {
    pub const ALL: [Self; 4] = [
        Self::FlatPrice,
        Self::UnitPrice,
        Self::TierFlatPrice,
        Self::TierUnitPrice,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FlatPrice => "Flat price",
            Self::UnitPrice => "Unit price",
            Self::TierFlatPrice => "Tier flat price",
            Self::TierUnitPrice => "Tier unit price",
        }
    }

    pub const fn is_unit(self) -> bool {
        matches!(self, Self::UnitPrice | Self::TierUnitPrice)
    }

    pub const fn is_tier(self) -> bool {
        matches!(self, Self::TierFlatPrice | Self::TierUnitPrice)
    }

    /// Case-insensitive match against the exact enum labels.
    pub fn from_label(value: &str) -> Option<Self> {
        let lowered = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().to_lowercase() == lowered)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrequencyUnit {
    None,
    #[serde(rename = "Day(s)")]
    Days,
    #[serde(rename = "Week(s)")]
    Weeks,
    #[serde(rename = "Semi_month(s)")]
    SemiMonths,
    #[serde(rename = "Month(s)")]
    Months,
    #[serde(rename = "Year(s)")]
    Years,
}

impl FrequencyUnit {
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Days,
        Self::Weeks,
        Self::SemiMonths,
        Self::Months,
        Self::Years,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Days => "Day(s)",
            Self::Weeks => "Week(s)",
            Self::SemiMonths => "Semi_month(s)",
            Self::Months => "Month(s)",
            Self::Years => "Year(s)",
        }
    }

    pub const fn is_recurring(self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let lowered = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().to_lowercase() == lowered)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingTiming {
    #[default]
    First,
    Last,
    NextPeriod,
}

impl BillingTiming {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::NextPeriod => "next_period",
        }
    }

    pub const fn is_arrears(self) -> bool {
        matches!(self, Self::Last)
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "first" => Some(Self::First),
            "last" => Some(Self::Last),
            "next_period" => Some(Self::NextPeriod),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub tier_name: Option<String>,
    pub price: Option<f64>,
    pub applied_when: Option<String>,
    pub min_quantity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub page: Option<i64>,
    pub snippet: Option<String>,
    pub field_supported: Option<String>,
}

/// Policy-compliant schedule produced by the normalizer.
///
/// Invariants held after normalization:
/// - `total_price` is `None` or non-negative.
/// - `quantity == Some(1.0)` whenever `billing_type` is `FlatPrice`.
/// - `tiers` is empty unless `billing_type.is_tier()`.
/// - `frequency_every == 1` and `periods == 0` whenever the unit is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSchedule {
    pub schedule_label: Option<String>,
    pub item_name: String,
    pub description: Option<String>,
    pub billing_type: BillingType,
    pub total_price: Option<f64>,
    pub quantity: Option<f64>,
    pub start_date: Option<String>,
    pub frequency_every: u32,
    pub frequency_unit: FrequencyUnit,
    pub months_of_service: Option<f64>,
    pub periods: u32,
    pub calculated_end_date: Option<String>,
    pub net_terms: i64,
    pub rev_rec_category: Option<String>,
    pub billing_timing: BillingTiming,
    pub arrears: bool,
    pub event_to_track: Option<String>,
    pub unit_label: Option<String>,
    pub price_per_unit: Option<f64>,
    pub volume_based: Option<bool>,
    pub tiers: Vec<Tier>,
    pub evidence: Vec<Evidence>,
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_for_review: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement: Option<AgreementDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_match_confidence: Option<MatchConfidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_match_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_matched_name: Option<String>,
}

impl CanonicalSchedule {
    pub fn push_issue(&mut self, issue: impl Into<String>) {
        self.issues.push(issue.into());
    }

    /// Clears every usage-pricing attribute and falls back to a flat price.
    pub(crate) fn demote_to_flat(&mut self) {
        self.billing_type = BillingType::FlatPrice;
        self.quantity = Some(1.0);
        self.event_to_track = None;
        self.unit_label = None;
        self.price_per_unit = None;
        self.volume_based = None;
        self.tiers.clear();
    }
}
