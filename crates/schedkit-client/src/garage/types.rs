use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schedule::canonical::BillingType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GarageBillingType {
    FlatPrice,
    UnitPrice,
    TierFlatPrice,
    TierUnitPrice,
}

impl GarageBillingType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FlatPrice => "FLAT_PRICE",
            Self::UnitPrice => "UNIT_PRICE",
            Self::TierFlatPrice => "TIER_FLAT_PRICE",
            Self::TierUnitPrice => "TIER_UNIT_PRICE",
        }
    }
}

impl From<BillingType> for GarageBillingType {
    fn from(value: BillingType) -> Self {
        match value {
            BillingType::FlatPrice => Self::FlatPrice,
            BillingType::UnitPrice => Self::UnitPrice,
            BillingType::TierFlatPrice => Self::TierFlatPrice,
            BillingType::TierUnitPrice => Self::TierUnitPrice,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GarageFrequencyUnit {
    None,
    Days,
    Month,
    Quarter,
    SemiMonth,
    Year,
}

impl GarageFrequencyUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Days => "DAYS",
            Self::Month => "MONTH",
            Self::Quarter => "QUARTER",
            Self::SemiMonth => "SEMI_MONTH",
            Self::Year => "YEAR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOperator {
    GreaterThanEqual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    pub tier: u32,
    pub mantissa: Option<String>,
    pub exponent: String,
    pub condition_value: Option<f64>,
    pub condition_operator: Option<ConditionOperator>,
    pub name: Option<String>,
}

/// Revenue schedule in the downstream billing system's wire schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarageSchedule {
    pub service_start_date: String,
    pub service_term: f64,
    pub revenue_category: Option<String>,
    pub item_name: String,
    pub item_description: Option<String>,
    pub start_date: String,
    pub frequency_unit: GarageFrequencyUnit,
    pub period: u32,
    pub number_of_periods: u32,
    pub arrears: bool,
    pub billing_type: GarageBillingType,
    pub event_to_track: Option<String>,
    pub integration_item: Option<String>,
    pub discounts: Vec<Value>,
    pub net_terms: i64,
    pub quantity: f64,
    pub total_price: f64,
    pub pricing_tiers: Vec<PricingTier>,
}

impl GarageSchedule {
    /// Top-level keys of the wire schema, in serialization order.
    pub const FIELD_NAMES: [&'static str; 18] = [
        "service_start_date",
        "service_term",
        "revenue_category",
        "item_name",
        "item_description",
        "start_date",
        "frequency_unit",
        "period",
        "number_of_periods",
        "arrears",
        "billing_type",
        "event_to_track",
        "integration_item",
        "discounts",
        "net_terms",
        "quantity",
        "total_price",
        "pricing_tiers",
    ];

    pub fn has_field(name: &str) -> bool {
        Self::FIELD_NAMES.contains(&name)
    }
}
