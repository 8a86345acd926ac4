pub mod project;
pub mod types;

pub use project::{SchemaProjector, project_schedules};
pub use types::{
    ConditionOperator, GarageBillingType, GarageFrequencyUnit, GarageSchedule, PricingTier,
};
