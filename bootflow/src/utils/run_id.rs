//! Run identifier generation.

use uuid::Uuid;

/// Generates a unique identifier for one boot run.
#[must_use]
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}
