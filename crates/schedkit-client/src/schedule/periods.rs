use serde::Serialize;

use crate::schedule::canonical::FrequencyUnit;
use crate::schedule::date::months_between;

/// Billing periods covering `months` at the given cadence.
///
/// Months are treated as 30 days for week, day and semi-month cadences. Any
/// recurring unit yields at least one period.
pub fn periods_from_months(unit: FrequencyUnit, every: u32, months: Option<f64>) -> u32 {
    if !unit.is_recurring() {
        return 0;
    }
    let Some(months) = months.filter(|value| value.is_finite() && *value > 0.0) else {
        return 1;
    };
    let every = f64::from(every.max(1));

    let raw = match unit {
        FrequencyUnit::None => 0.0,
        FrequencyUnit::Months => months / every,
        FrequencyUnit::Years => months / (12.0 * every),
        FrequencyUnit::Weeks => (months * 30.0) / (7.0 * every),
        FrequencyUnit::Days => months / 30.0,
        FrequencyUnit::SemiMonths => (months * 30.0) / (15.0 * every),
    };
    to_period_count(raw)
}

/// Inverse of [`periods_from_months`] for a supplied period count.
pub fn months_from_periods(unit: FrequencyUnit, every: u32, periods: f64) -> Option<f64> {
    if !periods.is_finite() || periods <= 0.0 {
        return None;
    }
    let every = f64::from(every.max(1));
    let months = match unit {
        FrequencyUnit::None => return None,
        FrequencyUnit::Months => every * periods,
        FrequencyUnit::Years => 12.0 * every * periods,
        FrequencyUnit::Weeks => ((7.0 * every * periods) / 30.0).round(),
        FrequencyUnit::Days => ((every * periods) / 30.0).round(),
        FrequencyUnit::SemiMonths => ((15.0 * every * periods) / 30.0).round(),
    };
    (months > 0.0).then_some(months)
}

fn to_period_count(raw: f64) -> u32 {
    let rounded = raw.round().max(1.0);
    if rounded >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    rounded as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthsSource {
    Explicit,
    DateRange,
    Periods,
    Default,
}

impl MonthsSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::DateRange => "date_range",
            Self::Periods => "periods",
            Self::Default => "default",
        }
    }
}

/// Which signal wins when several describe the service length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthsPrecedence {
    /// Normalizer order: explicit duration, dates, periods.
    ExplicitFirst,
    /// Projector order: dates, explicit duration, periods.
    DatesFirst,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DurationInputs<'a> {
    pub unit: Option<FrequencyUnit>,
    pub every: u32,
    pub explicit_months: Option<f64>,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
    pub supplied_periods: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMonths {
    pub months: f64,
    pub source: MonthsSource,
}

pub fn resolve_months(inputs: &DurationInputs<'_>, precedence: MonthsPrecedence) -> ResolvedMonths {
    let unit = inputs.unit.unwrap_or(FrequencyUnit::None);
    let explicit = inputs
        .explicit_months
        .filter(|value| value.is_finite() && *value > 0.0)
        .map(|value| ResolvedMonths {
            months: value,
            source: MonthsSource::Explicit,
        });
    let dated = match (inputs.start_date, inputs.end_date) {
        (Some(start), Some(end)) => months_between(start, end).map(|months| ResolvedMonths {
            months,
            source: MonthsSource::DateRange,
        }),
        _ => None,
    };
    let from_periods = inputs
        .supplied_periods
        .and_then(|periods| months_from_periods(unit, inputs.every, periods))
        .map(|months| ResolvedMonths {
            months,
            source: MonthsSource::Periods,
        });

    let ordered = match precedence {
        MonthsPrecedence::ExplicitFirst => [explicit, dated, from_periods],
        MonthsPrecedence::DatesFirst => [dated, explicit, from_periods],
    };

    ordered.into_iter().flatten().next().unwrap_or(ResolvedMonths {
        months: if unit.is_recurring() { 1.0 } else { 0.0 },
        source: MonthsSource::Default,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        DurationInputs, MonthsPrecedence, MonthsSource, months_from_periods, periods_from_months,
        resolve_months,
    };
    use crate::schedule::canonical::FrequencyUnit;

    #[test]
    fn documented_period_examples() {
        assert_eq!(periods_from_months(FrequencyUnit::Months, 3, Some(12.0)), 4);
        assert_eq!(periods_from_months(FrequencyUnit::Months, 6, Some(24.0)), 4);
        assert_eq!(periods_from_months(FrequencyUnit::Years, 1, Some(36.0)), 3);
    }

    #[test]
    fn sub_month_cadences_use_thirty_day_months() {
        assert_eq!(periods_from_months(FrequencyUnit::Weeks, 1, Some(12.0)), 51);
        assert_eq!(periods_from_months(FrequencyUnit::Weeks, 2, Some(12.0)), 26);
        assert_eq!(periods_from_months(FrequencyUnit::SemiMonths, 1, Some(12.0)), 24);
        assert_eq!(periods_from_months(FrequencyUnit::Days, 7, Some(60.0)), 2);
    }

    #[test]
    fn floors_and_none_unit() {
        assert_eq!(periods_from_months(FrequencyUnit::None, 1, Some(12.0)), 0);
        assert_eq!(periods_from_months(FrequencyUnit::Years, 1, Some(3.0)), 1);
        assert_eq!(periods_from_months(FrequencyUnit::Months, 1, None), 1);
        assert_eq!(periods_from_months(FrequencyUnit::Months, 1, Some(-4.0)), 1);
    }

    #[test]
    fn periods_back_calculate_months() {
        assert_eq!(months_from_periods(FrequencyUnit::Months, 3, 4.0), Some(12.0));
        assert_eq!(months_from_periods(FrequencyUnit::Years, 1, 2.0), Some(24.0));
        assert_eq!(months_from_periods(FrequencyUnit::Weeks, 1, 52.0), Some(12.0));
        assert_eq!(months_from_periods(FrequencyUnit::None, 1, 4.0), None);
        assert_eq!(months_from_periods(FrequencyUnit::Months, 1, 0.0), None);
    }

    #[test]
    fn precedence_orders_signals() {
        let inputs = DurationInputs {
            unit: Some(FrequencyUnit::Months),
            every: 1,
            explicit_months: Some(6.0),
            start_date: Some("2026-01-01"),
            end_date: Some("2026-12-31"),
            supplied_periods: Some(3.0),
        };

        let normalizer = resolve_months(&inputs, MonthsPrecedence::ExplicitFirst);
        assert_eq!(normalizer.months, 6.0);
        assert_eq!(normalizer.source, MonthsSource::Explicit);

        let projector = resolve_months(&inputs, MonthsPrecedence::DatesFirst);
        assert_eq!(projector.months, 12.0);
        assert_eq!(projector.source, MonthsSource::DateRange);
    }

    #[test]
    fn falls_back_to_periods_then_default() {
        let from_periods = resolve_months(
            &DurationInputs {
                unit: Some(FrequencyUnit::Months),
                every: 1,
                supplied_periods: Some(9.0),
                ..DurationInputs::default()
            },
            MonthsPrecedence::ExplicitFirst,
        );
        assert_eq!(from_periods.months, 9.0);
        assert_eq!(from_periods.source, MonthsSource::Periods);

        let recurring_default = resolve_months(
            &DurationInputs {
                unit: Some(FrequencyUnit::Years),
                every: 1,
                ..DurationInputs::default()
            },
            MonthsPrecedence::DatesFirst,
        );
        assert_eq!(recurring_default.months, 1.0);
        assert_eq!(recurring_default.source, MonthsSource::Default);

        let one_time_default = resolve_months(&DurationInputs::default(), MonthsPrecedence::DatesFirst);
        assert_eq!(one_time_default.months, 0.0);
    }
}
