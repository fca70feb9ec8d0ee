pub mod api;
pub mod economy;

pub use economy::{ActivityEntry, LedgerEntry, Participant, Prize, Role};

use thiserror::Error;

/// Maximum number of retained activity-log entries.
pub const ACTIVITY_LOG_CAP: usize = 300;

/// Maximum number of retained ledger entries per participant.
pub const LEDGER_CAP: usize = 1500;

/// Maximum number of ledger entries included in a snapshot.
pub const HISTORY_VIEW_CAP: usize = 250;

/// Length of a participant id in bytes of randomness (rendered as hex).
pub const ID_BYTES: usize = 8;

/// Title carried in every snapshot.
pub const APP_TITLE: &str = "Tombola";

/// Default cashier PIN (overridable at startup).
pub const DEFAULT_CASHIER_PIN: &str = "4321";

/// Error type for engine transactions.
///
/// Every failure aborts the attempted transaction with zero side effects
/// and is surfaced verbatim to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("prize already paid")]
    AlreadyPaid,
    #[error("amount {requested} exceeds available balance {available}")]
    InsufficientBalance { requested: i64, available: i64 },
    #[error("unpaid prizes exceed the pot: {unpaid}+{requested} > {pot}")]
    PotExceeded {
        unpaid: i64,
        requested: i64,
        pot: i64,
    },
    #[error("pot {pot} cannot cover {requested}")]
    InsufficientPot { requested: i64, pot: i64 },
}

/// Result type for engine transactions.
pub type Result<T> = std::result::Result<T, EngineError>;
