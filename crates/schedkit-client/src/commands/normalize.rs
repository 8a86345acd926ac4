use crate::ClientResult;
use crate::commands::common::load_payload;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::NormalizeData;
use crate::schedule::normalize::normalize_schedules;
use crate::schedule::policy::NORMALIZATION_POLICY_VERSION;
use crate::schedule::quality::assess_rerun;

#[derive(Debug, Default)]
pub struct NormalizeRunOptions<'a> {
    pub path: String,
    pub stdin_override: Option<&'a str>,
}

pub fn run(path: &str) -> ClientResult<SuccessEnvelope> {
    run_with_options(NormalizeRunOptions {
        path: path.to_string(),
        stdin_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: NormalizeRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let (source, payload) = load_payload(&options.path, options.stdin_override, "normalize")?;
    let schedules = normalize_schedules(&payload.schedules);
    let rerun = assess_rerun(&schedules);

    tracing::info!(
        source = %source,
        schedules = schedules.len(),
        should_rerun = rerun.should_rerun,
        "normalized payload"
    );

    success(
        "normalize",
        NormalizeData {
            source,
            policy_version: NORMALIZATION_POLICY_VERSION.to_string(),
            schedule_count: schedules.len(),
            schedules,
            issues: payload.issues,
            totals_check: payload.totals_check,
            model_recommendations: payload.model_recommendations,
            rerun,
        },
    )
}
