//! Small shared utilities: timestamps and run identifiers.

mod timestamps;
mod run_id;

pub use run_id::generate_run_id;
pub use timestamps::{iso_timestamp, now_utc, Timestamp};
