//! AWS-oriented adapters and transport handlers for the environment registry.
//!
//! This crate owns runtime integration details (DynamoDB and Lambda clients,
//! the API Gateway event handler, and the axum router). Validation, profile
//! resolution and response shaping all live in `eden_core`; handlers here only
//! translate between a transport and `LifecycleManager::handle`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod telemetry;
