use std::sync::LazyLock;

use regex::Regex;

use crate::garage::types::{
    ConditionOperator, GarageBillingType, GarageFrequencyUnit, GarageSchedule, PricingTier,
};
use crate::schedule::canonical::{CanonicalSchedule, FrequencyUnit, Tier};
use crate::schedule::loose::{format_number, positive, regex_matches};
use crate::schedule::periods::{
    DurationInputs, MonthsPrecedence, periods_from_months, resolve_months,
};
use crate::schedule::price::{PriceResolver, explicit_zero_signal};

pub const ONE_TIME_ITEM_NAME: &str = "Implementation & One-Time Services";
pub const ONE_TIME_DESCRIPTION: &str = "Total one-time fees listed on order form";

static ONE_TIME_TEXT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)one[-\s]?time|setup|implementation|professional services").ok()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GarageFrequency {
    pub frequency_unit: GarageFrequencyUnit,
    pub period: u32,
    pub number_of_periods: u32,
}

/// Maps canonical schedules onto the Garage wire schema.
pub struct SchemaProjector<'a> {
    prices: PriceResolver<'a>,
}

impl Default for SchemaProjector<'static> {
    fn default() -> Self {
        Self {
            prices: PriceResolver::default(),
        }
    }
}

impl<'a> SchemaProjector<'a> {
    pub fn with_price_resolver(prices: PriceResolver<'a>) -> Self {
        Self { prices }
    }

    pub fn project_all(&self, records: &[CanonicalSchedule]) -> Vec<GarageSchedule> {
        records.iter().map(|record| self.project(record)).collect()
    }

    pub fn project(&self, record: &CanonicalSchedule) -> GarageSchedule {
        let service_term = service_term(record);
        let frequency = garage_frequency(record.frequency_unit, record.frequency_every, service_term);
        let billing_type = GarageBillingType::from(record.billing_type);
        let quantity = match billing_type {
            GarageBillingType::FlatPrice => 1.0,
            _ => record
                .quantity
                .filter(|value| value.is_finite())
                .unwrap_or(1.0),
        };
        let start_date = record.start_date.clone().unwrap_or_default();

        let mut projected = GarageSchedule {
            service_start_date: start_date.clone(),
            service_term,
            revenue_category: None,
            item_name: record.item_name.clone(),
            item_description: record.description.clone(),
            start_date,
            frequency_unit: frequency.frequency_unit,
            period: frequency.period,
            number_of_periods: frequency.number_of_periods,
            arrears: record.arrears,
            billing_type,
            event_to_track: record.event_to_track.clone(),
            integration_item: record.integration_item.clone(),
            discounts: Vec::new(),
            net_terms: record.net_terms,
            quantity,
            total_price: self.final_price(record),
            pricing_tiers: pricing_tiers(&record.tiers),
        };
        polish_one_time(record, &mut projected);
        projected
    }

    fn final_price(&self, record: &CanonicalSchedule) -> f64 {
        if let Some(amount) = positive(record.total_price) {
            return amount;
        }
        if record.total_price == Some(0.0) && explicit_zero_signal(record).is_some() {
            return 0.0;
        }
        self.prices
            .resolve(record)
            .map(|resolution| resolution.amount)
            .unwrap_or(0.0)
    }
}

pub fn project_schedules(records: &[CanonicalSchedule]) -> Vec<GarageSchedule> {
    SchemaProjector::default().project_all(records)
}

/// Months of service, preferring the date range over stated months.
pub fn service_term(record: &CanonicalSchedule) -> f64 {
    let supplied_periods = (record.periods > 0).then_some(f64::from(record.periods));
    resolve_months(
        &DurationInputs {
            unit: Some(record.frequency_unit),
            every: record.frequency_every,
            explicit_months: record.months_of_service,
            start_date: record.start_date.as_deref(),
            end_date: record.calculated_end_date.as_deref(),
            supplied_periods,
        },
        MonthsPrecedence::DatesFirst,
    )
    .months
}

pub fn garage_frequency(unit: FrequencyUnit, every: u32, months: f64) -> GarageFrequency {
    let every = every.max(1);
    let number_of_periods = periods_from_months(unit, every, Some(months));
    let (frequency_unit, period) = match unit {
        FrequencyUnit::None => {
            return GarageFrequency {
                frequency_unit: GarageFrequencyUnit::None,
                period: 1,
                number_of_periods: 0,
            };
        }
        FrequencyUnit::Months if every == 3 => (GarageFrequencyUnit::Quarter, 1),
        FrequencyUnit::Months => (GarageFrequencyUnit::Month, every),
        FrequencyUnit::Years => (GarageFrequencyUnit::Year, every),
        FrequencyUnit::Days => (GarageFrequencyUnit::Days, every),
        FrequencyUnit::SemiMonths => (GarageFrequencyUnit::SemiMonth, every),
        FrequencyUnit::Weeks => (GarageFrequencyUnit::Days, every.saturating_mul(7)),
    };

    GarageFrequency {
        frequency_unit,
        period,
        number_of_periods,
    }
}

fn pricing_tiers(tiers: &[Tier]) -> Vec<PricingTier> {
    tiers
        .iter()
        .zip(1_u32..)
        .map(|(tier, ordinal)| PricingTier {
            tier: ordinal,
            mantissa: tier.price.map(format_number),
            exponent: "0".to_string(),
            condition_value: tier.min_quantity,
            condition_operator: tier
                .min_quantity
                .map(|_| ConditionOperator::GreaterThanEqual),
            name: tier
                .tier_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .or_else(|| tier.applied_when.clone()),
        })
        .collect()
}

fn polish_one_time(record: &CanonicalSchedule, projected: &mut GarageSchedule) {
    let text = [
        record.schedule_label.as_deref(),
        Some(record.item_name.as_str()),
        record.description.as_deref(),
        record.rev_rec_category.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<&str>>()
    .join(" ");

    let one_time = projected.frequency_unit == GarageFrequencyUnit::None
        || regex_matches(&ONE_TIME_TEXT, &text);
    if !one_time {
        return;
    }
    if projected.item_name.trim().is_empty() {
        projected.item_name = ONE_TIME_ITEM_NAME.to_string();
    }
    if projected
        .item_description
        .as_deref()
        .is_none_or(|description| description.trim().is_empty())
    {
        projected.item_description = Some(ONE_TIME_DESCRIPTION.to_string());
    }
}
