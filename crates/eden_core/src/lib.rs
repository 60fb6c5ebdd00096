//! Environment registry domain primitives.
//!
//! This crate owns profile resolution, the environment lifecycle state machine,
//! and the response envelope shared by every transport. It intentionally
//! excludes AWS SDK and Lambda runtime concerns; those live in `eden_lambda`.

pub mod contract;
pub mod envelope;
pub mod error;
pub mod lifecycle;
pub mod profile;
pub mod provisioning;
pub mod registry;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
