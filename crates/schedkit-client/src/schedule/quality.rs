use serde::Serialize;

use crate::schedule::canonical::CanonicalSchedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RerunReason {
    MissingItemName,
    AllTotalsZero,
    MissingStartDate,
}

impl RerunReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingItemName => "missing_item_name",
            Self::AllTotalsZero => "all_totals_zero",
            Self::MissingStartDate => "missing_start_date",
        }
    }

    const fn focus_line(self) -> &'static str {
        match self {
            Self::MissingItemName => "- A non-empty item_name",
            Self::AllTotalsZero => "- A non-zero total_price (unless explicitly free/waived)",
            Self::MissingStartDate => {
                "- A valid start_date in YYYY-MM-DD format (search the contract thoroughly for any date references including effective date, service start date, contract date, signature date, or any other date that could serve as the start date)"
            }
        }
    }
}

/// Whether a normalized run is weak enough to request another extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RerunAssessment {
    pub should_rerun: bool,
    pub reasons: Vec<RerunReason>,
    pub focus_hint: Option<String>,
}

pub fn assess_rerun(schedules: &[CanonicalSchedule]) -> RerunAssessment {
    let mut reasons = Vec::new();

    if schedules
        .iter()
        .any(|schedule| schedule.item_name.trim().is_empty())
    {
        reasons.push(RerunReason::MissingItemName);
    }
    // A missing price counts as zero.
    if !schedules.is_empty()
        && schedules
            .iter()
            .all(|schedule| schedule.total_price.unwrap_or(0.0) == 0.0)
    {
        reasons.push(RerunReason::AllTotalsZero);
    }
    if schedules.iter().any(|schedule| {
        schedule
            .start_date
            .as_deref()
            .is_none_or(|date| date.trim().is_empty())
    }) {
        reasons.push(RerunReason::MissingStartDate);
    }

    if reasons.is_empty() {
        return RerunAssessment {
            should_rerun: false,
            reasons,
            focus_hint: None,
        };
    }

    let mut hint = String::from("RETRY FOCUS: Ensure every schedule has:\n");
    for reason in &reasons {
        hint.push_str(reason.focus_line());
        hint.push('\n');
    }
    hint.push_str("\nPrefer amounts matching schedule frequency or a clearly labeled line total.");

    RerunAssessment {
        should_rerun: true,
        reasons,
        focus_hint: Some(hint),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{RerunReason, assess_rerun};
    use crate::schedule::candidate::CandidateSchedule;
    use crate::schedule::normalize::normalize_schedules;

    fn normalized(values: Vec<serde_json::Value>) -> Vec<crate::schedule::canonical::CanonicalSchedule> {
        let candidates = values
            .into_iter()
            .filter_map(CandidateSchedule::from_value)
            .collect::<Vec<_>>();
        normalize_schedules(&candidates)
    }

    #[test]
    fn complete_run_needs_no_rerun() {
        let run = normalized(vec![json!({
            "item_name": "Platform", "total_price": 100, "start_date": "2026-01-01"
        })]);
        let assessment = assess_rerun(&run);
        assert!(!assessment.should_rerun);
        assert!(assessment.focus_hint.is_none());
    }

    #[test]
    fn weak_run_lists_every_reason() {
        let run = normalized(vec![
            json!({"item_name": "", "total_price": 0}),
            json!({"item_name": "Support", "price": "$0", "start_date": "2026-01-01"}),
        ]);
        let assessment = assess_rerun(&run);
        assert!(assessment.should_rerun);
        assert_eq!(
            assessment.reasons,
            vec![
                RerunReason::MissingItemName,
                RerunReason::AllTotalsZero,
                RerunReason::MissingStartDate
            ]
        );
        assert!(assessment.focus_hint.is_some());
        if let Some(hint) = assessment.focus_hint {
            assert!(hint.starts_with("RETRY FOCUS: Ensure every schedule has:\n- A non-empty item_name"));
            assert!(hint.ends_with("clearly labeled line total."));
        }
    }

    #[test]
    fn run_without_any_prices_counts_as_all_zero() {
        let run = normalized(vec![
            json!({"item_name": "Platform", "start_date": "2026-01-01"}),
            json!({"item_name": "Support", "start_date": "2026-01-01"}),
        ]);
        assert!(run.iter().all(|schedule| schedule.total_price.is_none()));

        let assessment = assess_rerun(&run);
        assert!(assessment.should_rerun);
        assert_eq!(assessment.reasons, vec![RerunReason::AllTotalsZero]);
    }

    #[test]
    fn empty_run_is_not_all_zero() {
        let assessment = assess_rerun(&[]);
        assert!(!assessment.should_rerun);
    }
}
