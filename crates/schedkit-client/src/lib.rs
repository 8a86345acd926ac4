//! Normalization and reconciliation engine for extracted billing schedules.
//!
//! The engine modules (`schedule`, `agreement`, `integration`, `garage`) are
//! pure and never fail on malformed fields. The `commands` layer reads files,
//! merchant profiles and guidance, and wraps results in [`SuccessEnvelope`].

pub mod agreement;
pub mod commands;
pub mod contracts;
pub mod error;
pub mod garage;
pub mod guidance;
pub mod integration;
pub mod profile;
pub mod schedule;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{ClientError, ClientResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
