use serde::{Deserialize, Serialize};

/// Participant role, dispatched by pattern match rather than string
/// comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player,
    Cashier,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Player => write!(f, "player"),
            Role::Cashier => write!(f, "cashier"),
        }
    }
}

/// A connected participant. At most one participant holds
/// [`Role::Cashier`] at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    /// Opaque unguessable id, also the bearer token for requests.
    pub id: String,
    pub name: String,
    pub role: Role,
    /// Players never go negative through engine operations; the cashier
    /// is the value source and may.
    pub balance: i64,
}

impl Participant {
    pub fn new(id: String, name: String, role: Role) -> Self {
        Self {
            id,
            name,
            role,
            balance: 0,
        }
    }
}

/// One signed balance movement. Immutable once created; only appended,
/// newest first, capped per participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub delta: i64,
    pub note: String,
    pub ts: u64,
}

/// A named claim against the pot, unpaid until assigned to a winner.
/// The assign transition is the only mutation; prizes are never deleted
/// except by full reset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Prize {
    pub name: String,
    pub amount: i64,
    pub winner_id: Option<String>,
    pub paid: bool,
    pub ts: u64,
}

impl Prize {
    pub fn new(name: String, amount: i64, ts: u64) -> Self {
        Self {
            name,
            amount,
            winner_id: None,
            paid: false,
            ts,
        }
    }
}

/// One human-readable activity-log line, visible identically to every
/// viewer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub ts: u64,
    pub msg: String,
}
