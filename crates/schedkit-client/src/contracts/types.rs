use serde::Serialize;
use serde_json::Value;

use crate::agreement::reconcile::{AgreementItem, AgreementSummary};
use crate::guidance::GuidanceReport;
use crate::integration::matcher::IntegrationMatch;
use crate::schedule::canonical::CanonicalSchedule;
use crate::schedule::quality::RerunAssessment;

#[derive(Debug, Clone, Serialize)]
pub struct NormalizeData {
    pub source: String,
    pub policy_version: String,
    pub schedule_count: usize,
    pub schedules: Vec<CanonicalSchedule>,
    pub issues: Vec<String>,
    pub totals_check: Option<Value>,
    pub model_recommendations: Option<Value>,
    pub rerun: RerunAssessment,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileData {
    pub run1_source: String,
    pub run2_source: String,
    pub items: Vec<AgreementItem>,
    pub summary: AgreementSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectData {
    pub source: String,
    pub second_run_source: Option<String>,
    pub merchant_id: Option<String>,
    pub policy_version: String,
    pub schedules: Vec<CanonicalSchedule>,
    pub garage_revenue_schedules: Vec<Value>,
    pub agreement_summary: Option<AgreementSummary>,
    pub integration_mappings_used: usize,
    pub mapping_source: Option<String>,
    pub guidance_applied: Option<GuidanceReport>,
    pub guidance_prompt: Option<String>,
    pub issues: Vec<String>,
    pub totals_check: Option<Value>,
    pub model_recommendations: Option<Value>,
    pub rerun: RerunAssessment,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchData {
    pub item_name: String,
    pub mapping_source: String,
    pub mapping_pairs: usize,
    #[serde(flatten)]
    pub result: IntegrationMatch,
}
