use std::path::Path;

use serde_json::Value;

use crate::agreement::reconcile::{attach_agreement, reconcile};
use crate::commands::common::{load_payload, load_profile, resolve_guidance, resolve_mapping};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ProjectData;
use crate::garage::project::project_schedules;
use crate::garage::types::GarageSchedule;
use crate::integration::matcher::annotate_integration_items;
use crate::schedule::normalize::normalize_schedules;
use crate::schedule::policy::NORMALIZATION_POLICY_VERSION;
use crate::schedule::quality::assess_rerun;
use crate::{ClientError, ClientResult};

/// Inputs for the full normalize, reconcile, match and project pipeline.
#[derive(Debug, Clone, Default)]
pub struct ProjectRequest {
    pub path: String,
    pub second_run: Option<String>,
    pub mapping: Option<String>,
    pub guidance: Option<String>,
    pub merchant: Option<String>,
}

#[derive(Debug, Default)]
pub struct ProjectRunOptions<'a> {
    pub request: ProjectRequest,
    pub home_override: Option<&'a Path>,
    pub stdin_override: Option<&'a str>,
}

pub fn run(request: ProjectRequest) -> ClientResult<SuccessEnvelope> {
    run_with_options(ProjectRunOptions {
        request,
        home_override: None,
        stdin_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: ProjectRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let request = options.request;
    if request.path.trim() == "-" && request.second_run.as_deref().map(str::trim) == Some("-") {
        return Err(ClientError::invalid_argument_for_command(
            "Only one of the two runs can be read from stdin.",
            Some("project"),
        ));
    }

    let profile = load_profile(request.merchant.as_deref(), options.home_override)?;
    let mapping = resolve_mapping(request.mapping.as_deref(), profile.as_ref(), "project")?;
    let guidance = resolve_guidance(request.guidance.as_deref(), profile.as_ref(), "project")?;

    let (source, payload) = load_payload(&request.path, options.stdin_override, "project")?;
    let mut schedules = normalize_schedules(&payload.schedules);

    let (second_run_source, agreement_summary) = match request.second_run.as_deref() {
        Some(path) => {
            let (second_source, second_payload) =
                load_payload(path, options.stdin_override, "project")?;
            let second = normalize_schedules(&second_payload.schedules);
            let report = reconcile(&schedules, &second);
            attach_agreement(&mut schedules, &report);
            (Some(second_source), Some(report.summary))
        }
        None => (None, None),
    };

    let (mapping_source, pairs) = match mapping {
        Some((mapping_source, pairs)) => (Some(mapping_source), pairs),
        None => (None, Vec::new()),
    };
    annotate_integration_items(&mut schedules, &pairs);

    let garage = project_schedules(&schedules);
    let (garage_revenue_schedules, guidance_applied) = match guidance.as_ref() {
        Some(guidance) => {
            let (records, report) = guidance.apply_to_garage(&garage)?;
            (records, Some(report))
        }
        None => (serialize_garage(&garage)?, None),
    };
    let rerun = assess_rerun(&schedules);

    tracing::info!(
        source = %source,
        schedules = schedules.len(),
        reconciled = agreement_summary.is_some(),
        mapping_pairs = pairs.len(),
        guidance = guidance.is_some(),
        "projected schedules"
    );

    success(
        "project",
        ProjectData {
            source,
            second_run_source,
            merchant_id: profile.map(|profile| profile.merchant_id),
            policy_version: NORMALIZATION_POLICY_VERSION.to_string(),
            schedules,
            garage_revenue_schedules,
            agreement_summary,
            integration_mappings_used: pairs.len(),
            mapping_source,
            guidance_applied,
            guidance_prompt: guidance.and_then(|guidance| guidance.prompt_section()),
            issues: payload.issues,
            totals_check: payload.totals_check,
            model_recommendations: payload.model_recommendations,
            rerun,
        },
    )
}

fn serialize_garage(records: &[GarageSchedule]) -> ClientResult<Vec<Value>> {
    records
        .iter()
        .map(|record| {
            serde_json::to_value(record).map_err(|error| {
                ClientError::internal_serialization(&format!(
                    "Failed to serialize Garage schedule: {error}"
                ))
            })
        })
        .collect()
}
