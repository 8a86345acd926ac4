use crate::schedule::candidate::CandidateSchedule;
use crate::schedule::canonical::{BillingTiming, BillingType, CanonicalSchedule, FrequencyUnit};
use crate::schedule::enums::{UnitEvidence, resolve_billing_type, resolve_frequency};
use crate::schedule::loose::format_number;
use crate::schedule::periods::{
    DurationInputs, MonthsPrecedence, MonthsSource, periods_from_months, resolve_months,
};
use crate::schedule::policy::{MAX_EVIDENCE_ENTRIES, RuleContext, apply_demotion_policy};
use crate::schedule::price::{EXPLICIT_ZERO_ISSUE, MISSING_PRICE_ISSUE, PriceResolver};

/// Turns raw candidates into canonical schedules.
///
/// Never fails: malformed fields fall back to defaults and each correction
/// is recorded on the record's `issues`.
pub struct ScheduleNormalizer<'a> {
    prices: PriceResolver<'a>,
}

impl Default for ScheduleNormalizer<'static> {
    fn default() -> Self {
        Self {
            prices: PriceResolver::default(),
        }
    }
}

impl<'a> ScheduleNormalizer<'a> {
    pub fn with_price_resolver(prices: PriceResolver<'a>) -> Self {
        Self { prices }
    }

    pub fn normalize_all(&self, candidates: &[CandidateSchedule]) -> Vec<CanonicalSchedule> {
        candidates
            .iter()
            .map(|candidate| self.normalize(candidate))
            .collect()
    }

    pub fn normalize(&self, candidate: &CandidateSchedule) -> CanonicalSchedule {
        let mut issues = candidate.issues();

        let billing_type = resolve_billing_type(candidate);
        let frequency_text = candidate.text("frequency");
        let unit_text = candidate.text("frequency_unit");
        let frequency = resolve_frequency(
            frequency_text.as_deref(),
            candidate.number("frequency_every"),
            unit_text.as_deref(),
            FrequencyUnit::None,
        );
        issues.extend(frequency.issues);
        let unit = frequency.unit;
        let every = frequency.every;

        let quantity = resolve_quantity(candidate, billing_type, &mut issues);
        let (billing_timing, arrears) = resolve_timing(candidate, &mut issues);

        let end_date = candidate
            .text("calculated_end_date")
            .or_else(|| candidate.text("end_date"));
        let start_date = candidate.text("start_date");
        let supplied_periods = candidate.number("periods");
        let months = resolve_months(
            &DurationInputs {
                unit: Some(unit),
                every,
                explicit_months: candidate.number("months_of_service"),
                start_date: start_date.as_deref(),
                end_date: end_date.as_deref(),
                supplied_periods,
            },
            MonthsPrecedence::ExplicitFirst,
        );
        let periods = resolve_periods(unit, every, months.months, months.source, supplied_periods, &mut issues);
        let months_of_service = match months.source {
            MonthsSource::Default => None,
            _ => Some(months.months),
        };

        let net_terms = resolve_net_terms(candidate, &mut issues);

        let mut evidence = candidate.evidence();
        evidence.truncate(MAX_EVIDENCE_ENTRIES);

        let mut record = CanonicalSchedule {
            schedule_label: candidate.text("schedule_label"),
            item_name: candidate.text("item_name").unwrap_or_default(),
            description: candidate.text("description"),
            billing_type,
            total_price: None,
            quantity,
            start_date,
            frequency_every: every,
            frequency_unit: unit,
            months_of_service,
            periods,
            calculated_end_date: end_date,
            net_terms,
            rev_rec_category: candidate.text("rev_rec_category"),
            billing_timing,
            arrears,
            event_to_track: candidate.text("event_to_track"),
            unit_label: candidate.text("unit_label"),
            price_per_unit: candidate.number("price_per_unit"),
            volume_based: candidate.flag("volume_based"),
            tiers: candidate.tiers(),
            evidence,
            issues,
            confidence: None,
            flag_for_review: None,
            agreement: None,
            integration_item: None,
            integration_match_confidence: None,
            integration_match_score: None,
            integration_matched_name: None,
        };

        let context = RuleContext {
            evidence: UnitEvidence::detect(candidate),
        };
        apply_demotion_policy(&mut record, &context);

        let resolved = self
            .prices
            .resolve(candidate)
            .or_else(|| self.prices.resolve(&record));
        match resolved {
            Some(price) => {
                tracing::debug!(item = %record.item_name, source = %price.source, amount = price.amount, "price resolved");
                record.total_price = Some(price.amount);
                if price.is_explicit_zero() {
                    record.push_issue(EXPLICIT_ZERO_ISSUE);
                }
            }
            None => {
                tracing::debug!(item = %record.item_name, "price unresolved");
                record.push_issue(MISSING_PRICE_ISSUE);
            }
        }

        record
    }
}

/// Normalizes with the default price scorer.
pub fn normalize_schedules(candidates: &[CandidateSchedule]) -> Vec<CanonicalSchedule> {
    ScheduleNormalizer::default().normalize_all(candidates)
}

fn resolve_quantity(
    candidate: &CandidateSchedule,
    billing_type: BillingType,
    issues: &mut Vec<String>,
) -> Option<f64> {
    let supplied = candidate.number("quantity");
    if billing_type != BillingType::FlatPrice {
        return supplied;
    }
    if let Some(value) = supplied
        && value != 1.0
    {
        issues.push(format!(
            "Set quantity from {} to 1 because flat pricing bills a single unit.",
            format_number(value)
        ));
    }
    Some(1.0)
}

fn resolve_timing(candidate: &CandidateSchedule, issues: &mut Vec<String>) -> (BillingTiming, bool) {
    let timing_text = candidate.text("billing_timing");
    let parsed_timing = timing_text.as_deref().and_then(BillingTiming::from_label);

    if let Some(arrears) = candidate.flag("arrears") {
        let timing = if arrears {
            BillingTiming::Last
        } else {
            BillingTiming::First
        };
        if let Some(stated) = parsed_timing
            && stated != timing
        {
            issues.push(format!(
                "Billing timing set to {} from the explicit arrears flag (was {}).",
                timing.as_str(),
                stated.as_str()
            ));
        }
        return (timing, arrears);
    }

    let timing = match (parsed_timing, timing_text) {
        (Some(timing), _) => timing,
        (None, Some(raw)) => {
            issues.push(format!("Unrecognized billing timing `{raw}`; using first."));
            BillingTiming::First
        }
        (None, None) => BillingTiming::First,
    };
    (timing, timing.is_arrears())
}

fn resolve_periods(
    unit: FrequencyUnit,
    every: u32,
    months: f64,
    source: MonthsSource,
    supplied: Option<f64>,
    issues: &mut Vec<String>,
) -> u32 {
    let computed = periods_from_months(unit, every, Some(months));
    let Some(supplied) = supplied else {
        return computed;
    };

    // Months derived from the supplied count would only reproduce it.
    if source == MonthsSource::Periods && supplied.round() >= 1.0 {
        return supplied.round() as u32;
    }

    if supplied != f64::from(computed) {
        issues.push(format!(
            "Auto-corrected periods from {} to {} based on {} months with {} every {}",
            format_number(supplied),
            computed,
            format_number(months),
            unit.as_str(),
            every
        ));
    }
    computed
}

fn resolve_net_terms(candidate: &CandidateSchedule, issues: &mut Vec<String>) -> i64 {
    let Some(raw) = candidate.number("net_terms") else {
        return 0;
    };
    let rounded = raw.round() as i64;
    if rounded < 0 {
        issues.push(format!("Clamped negative net_terms {rounded} to 0."));
        return 0;
    }
    rounded
}
