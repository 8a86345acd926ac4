pub mod policy;
pub mod reconcile;
pub mod similarity;

pub use policy::{AGREEMENT_POLICY_V1, AGREEMENT_POLICY_VERSION, AgreementPolicy};
pub use reconcile::{
    AgreementDetail, AgreementItem, AgreementReport, AgreementSummary, attach_agreement,
    reconcile, reconcile_with_policy,
};
pub use similarity::FieldSimilarity;
