//! Shared helpers for backend tests: idempotent logging setup, problem+json
//! assertions and unique test identities.

pub mod logging;
pub mod problem_details;
pub mod unique_helpers;
