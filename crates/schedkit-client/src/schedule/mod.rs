pub mod candidate;
pub mod canonical;
pub mod date;
pub mod enums;
pub mod loose;
pub mod normalize;
pub mod payload;
pub mod periods;
pub mod policy;
pub mod price;
pub mod quality;
pub mod signals;

pub use candidate::CandidateSchedule;
pub use canonical::{
    BillingTiming, BillingType, CanonicalSchedule, Evidence, FrequencyUnit, Tier,
};
pub use normalize::{ScheduleNormalizer, normalize_schedules};
pub use payload::{ExtractionPayload, parse_payload};
