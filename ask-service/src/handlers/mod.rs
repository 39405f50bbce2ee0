//! HTTP handlers for the ask service.

pub mod ask;
pub mod health;

pub use ask::{ask, not_found, NO_RESPONSE_PLACEHOLDER};
pub use health::{health_check, readiness_check, HEALTH_MESSAGE};
