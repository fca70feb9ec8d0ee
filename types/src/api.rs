//! Wire types for the HTTP adapter and the snapshot push channel.
//!
//! Every snapshot delivered on a channel is a complete replacement of
//! the previous one; there are no incremental diffs.

use crate::economy::{ActivityEntry, LedgerEntry, Prize, Role};
use serde::{Deserialize, Serialize};

/// Body of `POST /join`.
#[derive(Clone, Debug, Deserialize)]
pub struct JoinRequest {
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub pin: Option<String>,
}

/// Successful join result. The caller persists this to reconnect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinReply {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// Body of `POST /player/play`.
#[derive(Clone, Debug, Deserialize)]
pub struct WagerRequest {
    pub amount: i64,
}

/// Body of `POST /cashier/credit`.
#[derive(Clone, Debug, Deserialize)]
pub struct CreditRequest {
    pub player_id: String,
    pub amount: i64,
}

/// Body of `POST /cashier/add_prize`.
#[derive(Clone, Debug, Deserialize)]
pub struct AddPrizeRequest {
    pub name: String,
    pub amount: i64,
}

/// Body of `POST /cashier/assign_prize`. Prizes are addressed by index
/// into the creation-ordered list the cashier sees.
#[derive(Clone, Debug, Deserialize)]
pub struct AssignPrizeRequest {
    pub index: usize,
    pub winner_id: String,
}

/// The one control message accepted on a push channel: binds the
/// channel to a viewer identity. Anything else inbound is ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthMessage {
    pub auth: String,
}

/// One participant as exposed to a given viewer. `balance` is `None`
/// whenever the viewer is not entitled to see it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub balance: Option<i64>,
}

/// Pot figures. The aggregate fields are present only for the cashier
/// viewer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PotView {
    pub pot: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unpaid_total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pot_remaining: Option<i64>,
}

impl PotView {
    /// The view everyone but the cashier gets.
    pub fn public(pot: i64) -> Self {
        Self {
            pot,
            unpaid_total: None,
            paid_total: None,
            pot_remaining: None,
        }
    }
}

/// Role-filtered snapshot of the whole economy for one viewer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub title: &'static str,
    pub players: Vec<PlayerView>,
    pub my_history: Vec<LedgerEntry>,
    pub prizes: Vec<Prize>,
    pub pot: PotView,
    pub log: Vec<ActivityEntry>,
}
