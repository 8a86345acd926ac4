use crate::agreement::reconcile::reconcile;
use crate::commands::common::load_payload;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ReconcileData;
use crate::schedule::normalize::normalize_schedules;
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct ReconcileRunOptions<'a> {
    pub run1_path: String,
    pub run2_path: String,
    pub stdin_override: Option<&'a str>,
}

pub fn run(run1_path: &str, run2_path: &str) -> ClientResult<SuccessEnvelope> {
    run_with_options(ReconcileRunOptions {
        run1_path: run1_path.to_string(),
        run2_path: run2_path.to_string(),
        stdin_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: ReconcileRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    if options.run1_path.trim() == "-" && options.run2_path.trim() == "-" {
        return Err(ClientError::invalid_argument_for_command(
            "Only one of the two runs can be read from stdin.",
            Some("reconcile"),
        ));
    }

    let (run1_source, run1_payload) =
        load_payload(&options.run1_path, options.stdin_override, "reconcile")?;
    let (run2_source, run2_payload) =
        load_payload(&options.run2_path, options.stdin_override, "reconcile")?;

    let run1 = normalize_schedules(&run1_payload.schedules);
    let run2 = normalize_schedules(&run2_payload.schedules);
    let report = reconcile(&run1, &run2);

    tracing::info!(
        run1 = run1.len(),
        run2 = run2.len(),
        flagged = report.summary.flagged,
        "reconciled runs"
    );

    success(
        "reconcile",
        ReconcileData {
            run1_source,
            run2_source,
            items: report.items,
            summary: report.summary,
        },
    )
}
