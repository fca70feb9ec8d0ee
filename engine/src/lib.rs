pub mod activity;
pub mod engine;
pub mod ledger;
pub mod prizes;
pub mod projector;
pub mod registry;

pub use engine::Economy;
pub use projector::project;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in seconds. Clamped to zero on a pre-epoch clock
/// rather than failing.
pub(crate) fn now_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
