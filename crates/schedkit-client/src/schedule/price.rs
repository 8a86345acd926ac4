use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::schedule::canonical::{BillingType, FrequencyUnit};
use crate::schedule::loose::{positive, regex_matches};
use crate::schedule::signals::ScheduleSignals;

pub const PRIMARY_PRICE_FIELDS: [&str; 7] = [
    "total_price",
    "price",
    "amount",
    "per_period_price",
    "per_period",
    "annual_price",
    "monthly_price",
];

pub const SECONDARY_PRICE_FIELDS: [&str; 6] = [
    "setup_fee",
    "one_time_fee",
    "upfront",
    "down_payment",
    "line_total",
    "subtotal",
];

pub const CONTEXT_WINDOW_CHARS: usize = 48;

pub const EXPLICIT_ZERO_ISSUE: &str = "Explicit zero price accepted (waived/free/included).";
pub const MISSING_PRICE_ISSUE: &str = "Price missing after all fallbacks; verify contract line.";

static CURRENCY_AMOUNT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:US\$|USD|\$)\s*(\d{1,3}(?:,\d{3})+(?:\.\d{2})?|\d+(?:\.\d{2})?)").ok()
});

// `$0.50` must not count as zero, hence the explicit tail instead of `\b`.
static ZERO_CURRENCY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:US\$|USD|\$)\s*0(?:\.00)?(?:$|[^\d.]|\.(?:$|\D))").ok()
});

static ZERO_TERMS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:no\s*charge|free|complimentary|waived|included\s+at\s+no\s+extra\s+cost|n/c|zero)\b",
    )
    .ok()
});

static FULL_DISCOUNT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b100%\s*(?:discount|off)\b").ok());

static MONTHLY_LANGUAGE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(?:monthly|per\s*month|per\s*mo)\b").ok());
static ANNUAL_LANGUAGE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(?:annual|annually|yearly|per\s*year)\b").ok());
static ONE_TIME_LANGUAGE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(?:one[-\s]?time|setup|implementation)\b").ok());
static TOTAL_LANGUAGE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(?:line\s*total|total)\b").ok());
static ADJUSTMENT_LANGUAGE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b(?:discount|credit|rebate|tax|deposit|retainer|balance\s*due)\b").ok()
});
static PER_UNIT_LANGUAGE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b(?:each|per\s*(?:seat|user|lead|click|impression|unit|gb|api|sms|email))\b")
        .ok()
});

/// What the surrounding schedule says about cadence and pricing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceContext {
    pub frequency_unit: Option<FrequencyUnit>,
    pub billing_type: BillingType,
}

/// One currency amount found in free text, with its lower-cased surroundings.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceOccurrence {
    pub amount: f64,
    pub ordinal: usize,
    pub before: String,
    pub after: String,
}

impl PriceOccurrence {
    pub fn window(&self) -> String {
        format!("{} {}", self.before, self.after)
    }
}

/// Ranks a free-text price occurrence; the highest score wins.
pub trait PriceScorer {
    fn score(&self, occurrence: &PriceOccurrence, context: &PriceContext) -> f64;
}

/// Keyword scoring over the text around each amount.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextWindowScorer;

impl PriceScorer for ContextWindowScorer {
    fn score(&self, occurrence: &PriceOccurrence, context: &PriceContext) -> f64 {
        let window = occurrence.window();
        let mut score = 0.0;

        if regex_matches(&MONTHLY_LANGUAGE, &window) {
            score += cadence_bonus(context, FrequencyUnit::Months);
        }
        if regex_matches(&ANNUAL_LANGUAGE, &window) {
            score += cadence_bonus(context, FrequencyUnit::Years);
        }
        if regex_matches(&ONE_TIME_LANGUAGE, &window) {
            score += cadence_bonus(context, FrequencyUnit::None);
        }
        if regex_matches(&TOTAL_LANGUAGE, &window) {
            score += 2.0;
        }
        if regex_matches(&ADJUSTMENT_LANGUAGE, &window) {
            score -= 4.0;
        }
        if regex_matches(&PER_UNIT_LANGUAGE, &window) && !context.billing_type.is_unit() {
            score -= 2.0;
        }

        // Earlier occurrences win ties.
        score - 0.01 * occurrence.ordinal as f64
    }
}

fn cadence_bonus(context: &PriceContext, expected: FrequencyUnit) -> f64 {
    if context.frequency_unit == Some(expected) {
        3.0
    } else {
        -1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroSignal {
    Field(&'static str),
    CurrencyText,
    KeywordText,
    FullDiscount,
}

impl fmt::Display for ZeroSignal {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(formatter, "field:{name}"),
            Self::CurrencyText => formatter.write_str("currency_text"),
            Self::KeywordText => formatter.write_str("keyword_text"),
            Self::FullDiscount => formatter.write_str("discount_100"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Field(&'static str),
    Evidence,
    ExplicitZero(ZeroSignal),
}

impl fmt::Display for PriceSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(formatter, "field:{name}"),
            Self::Evidence => formatter.write_str("evidence"),
            Self::ExplicitZero(signal) => write!(formatter, "zero:{signal}"),
        }
    }
}

impl Serialize for PriceSource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceResolution {
    pub amount: f64,
    pub source: PriceSource,
}

impl PriceResolution {
    pub fn is_explicit_zero(&self) -> bool {
        matches!(self.source, PriceSource::ExplicitZero(_))
    }
}

/// Fallback chain: structured fields, scored free text, explicit zero.
pub struct PriceResolver<'a> {
    scorer: &'a dyn PriceScorer,
}

impl Default for PriceResolver<'static> {
    fn default() -> Self {
        Self {
            scorer: &ContextWindowScorer,
        }
    }
}

impl<'a> PriceResolver<'a> {
    pub fn with_scorer(scorer: &'a dyn PriceScorer) -> Self {
        Self { scorer }
    }

    pub fn resolve<S>(&self, record: &S) -> Option<PriceResolution>
    where
        S: ScheduleSignals + ?Sized,
    {
        if let Some((amount, field)) = price_from_fields(record) {
            return Some(PriceResolution {
                amount,
                source: PriceSource::Field(field),
            });
        }
        if let Some(amount) = self.price_from_evidence(record) {
            return Some(PriceResolution {
                amount,
                source: PriceSource::Evidence,
            });
        }
        explicit_zero_signal(record).map(|signal| PriceResolution {
            amount: 0.0,
            source: PriceSource::ExplicitZero(signal),
        })
    }

    pub fn price_from_evidence<S>(&self, record: &S) -> Option<f64>
    where
        S: ScheduleSignals + ?Sized,
    {
        let context = PriceContext {
            frequency_unit: record.frequency_unit(),
            billing_type: record.resolved_billing_type(),
        };

        let mut best: Option<(f64, f64)> = None;
        for occurrence in find_price_occurrences(&record.search_texts()) {
            let score = self.scorer.score(&occurrence, &context);
            let better = match best {
                Some((_, best_score)) => score > best_score,
                None => true,
            };
            if better {
                best = Some((occurrence.amount, score));
            }
        }
        positive(best.map(|(amount, _)| amount))
    }
}

/// First strictly positive value across the primary then secondary aliases.
pub fn price_from_fields<S>(record: &S) -> Option<(f64, &'static str)>
where
    S: ScheduleSignals + ?Sized,
{
    PRIMARY_PRICE_FIELDS
        .iter()
        .chain(SECONDARY_PRICE_FIELDS.iter())
        .find_map(|field| positive(record.price_field(field)).map(|amount| (amount, *field)))
}

pub fn explicit_zero_signal<S>(record: &S) -> Option<ZeroSignal>
where
    S: ScheduleSignals + ?Sized,
{
    let zero_field = PRIMARY_PRICE_FIELDS
        .iter()
        .chain(SECONDARY_PRICE_FIELDS.iter())
        .find(|field| record.price_field(field) == Some(0.0));
    if let Some(field) = zero_field {
        return Some(ZeroSignal::Field(field));
    }

    let haystack = record.search_texts().join(" ");
    if regex_matches(&ZERO_CURRENCY, &haystack) {
        return Some(ZeroSignal::CurrencyText);
    }
    if regex_matches(&ZERO_TERMS, &haystack) {
        return Some(ZeroSignal::KeywordText);
    }
    if regex_matches(&FULL_DISCOUNT, &haystack) {
        return Some(ZeroSignal::FullDiscount);
    }
    None
}

/// Every positive currency amount across `texts`, numbered in reading order.
pub fn find_price_occurrences(texts: &[String]) -> Vec<PriceOccurrence> {
    let Some(pattern) = CURRENCY_AMOUNT.as_ref() else {
        return Vec::new();
    };

    let mut occurrences = Vec::new();
    for text in texts {
        for captures in pattern.captures_iter(text) {
            let (Some(whole), Some(number)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let Ok(amount) = number.as_str().replace(',', "").parse::<f64>() else {
                continue;
            };
            if !amount.is_finite() || amount <= 0.0 {
                continue;
            }
            occurrences.push(PriceOccurrence {
                amount,
                ordinal: occurrences.len(),
                before: tail_chars(&text[..whole.start()], CONTEXT_WINDOW_CHARS).to_lowercase(),
                after: head_chars(&text[whole.end()..], CONTEXT_WINDOW_CHARS).to_lowercase(),
            });
        }
    }
    occurrences
}

fn tail_chars(text: &str, count: usize) -> &str {
    let total = text.chars().count();
    if total <= count {
        return text;
    }
    match text.char_indices().nth(total - count) {
        Some((index, _)) => &text[index..],
        None => text,
    }
}

fn head_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
