//! The economy engine: the only externally invoked transactions.
//!
//! Each transaction validates every precondition before touching any
//! store, so a failure commits nothing: no balance movement, no ledger
//! entry, no activity-log line.

use crate::activity::ActivityLog;
use crate::ledger::LedgerStore;
use crate::prizes::PrizePool;
use crate::registry::Registry;
use tombola_types::api::JoinReply;
use tombola_types::{EngineError, Participant, Result, Role};
use tracing::debug;

pub struct Economy {
    pin: String,
    pub(crate) registry: Registry,
    pub(crate) ledger: LedgerStore,
    pub(crate) prizes: PrizePool,
    pub(crate) log: ActivityLog,
}

impl Economy {
    pub fn new(pin: impl Into<String>) -> Self {
        Self {
            pin: pin.into(),
            registry: Registry::default(),
            ledger: LedgerStore::default(),
            prizes: PrizePool::default(),
            log: ActivityLog::default(),
        }
    }

    fn require_cashier(&self, id: &str) -> Result<&Participant> {
        match self.registry.get(id) {
            Some(p) if p.role == Role::Cashier => Ok(p),
            Some(_) => Err(EngineError::Forbidden("cashier only".into())),
            None => Err(EngineError::Forbidden("unknown participant".into())),
        }
    }

    fn require_player(&self, id: &str) -> Result<&Participant> {
        match self.registry.get(id) {
            Some(p) if p.role == Role::Player => Ok(p),
            Some(_) => Err(EngineError::Forbidden("players only".into())),
            None => Err(EngineError::Forbidden("unknown participant".into())),
        }
    }

    /// Registers a participant. A player join always creates a fresh
    /// participant. A cashier join requires the shared PIN and, when a
    /// cashier already exists, renames it in place instead of creating
    /// a second one: balance and ledger survive (re-entry semantics).
    pub fn join(&mut self, name: &str, role: Role, pin: Option<&str>) -> Result<JoinReply> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput("name must not be empty".into()));
        }

        if role == Role::Cashier {
            if pin != Some(self.pin.as_str()) {
                debug!(name, "cashier join rejected: wrong PIN");
                return Err(EngineError::Forbidden("wrong cashier PIN".into()));
            }
            if let Some(existing) = self.registry.cashier_id() {
                self.registry.rename(&existing, name)?;
                self.log.push(format!("Cashier returned: {name}"));
                return Ok(JoinReply {
                    id: existing,
                    name: name.to_string(),
                    role,
                });
            }
        }

        let participant = self.registry.register(name, role)?;
        let reply = JoinReply {
            id: participant.id.clone(),
            name: participant.name.clone(),
            role,
        };
        self.log.push(format!("{name} joined ({role})"));
        Ok(reply)
    }

    /// Moves value from a player's balance into the pot.
    pub fn wager(&mut self, player_id: &str, amount: i64) -> Result<()> {
        let player = self.require_player(player_id)?;
        if amount <= 0 {
            return Err(EngineError::InvalidInput("amount must be positive".into()));
        }
        if amount > player.balance {
            return Err(EngineError::InsufficientBalance {
                requested: amount,
                available: player.balance,
            });
        }
        let name = player.name.clone();
        // 0 < amount <= balance, so the subtraction cannot wrap.
        let player_balance = player.balance - amount;
        if self.prizes.pot().checked_add(amount).is_none() {
            return Err(EngineError::InvalidInput(
                "amount would overflow the pot".into(),
            ));
        }

        self.registry.set_balance(player_id, player_balance);
        self.ledger.append(player_id, -amount, "wager");
        self.prizes.add_to_pot(amount);
        self.log.push(format!("Pot +{amount} (from {name})"));
        Ok(())
    }

    /// Transfers value from the cashier to a player. The cashier is the
    /// value source and may go negative; a transfer that would push
    /// either side out of `i64` range is rejected whole.
    pub fn credit(&mut self, cashier_id: &str, player_id: &str, amount: i64) -> Result<()> {
        let source = self.require_cashier(cashier_id)?.balance;
        let target = match self.registry.get(player_id) {
            Some(p) if p.role == Role::Player => p,
            Some(_) => {
                return Err(EngineError::InvalidInput("target must be a player".into()))
            }
            None => return Err(EngineError::NotFound(format!("unknown player {player_id}"))),
        };
        if amount <= 0 {
            return Err(EngineError::InvalidInput("amount must be positive".into()));
        }
        let player_balance = target.balance.checked_add(amount).ok_or_else(|| {
            EngineError::InvalidInput("amount would overflow the player balance".into())
        })?;
        let cashier_balance = source.checked_sub(amount).ok_or_else(|| {
            EngineError::InvalidInput("amount would overflow the cashier balance".into())
        })?;
        let player_name = target.name.clone();

        self.registry.set_balance(player_id, player_balance);
        self.ledger.append(player_id, amount, "credit");
        self.registry.set_balance(cashier_id, cashier_balance);
        self.ledger
            .append(cashier_id, -amount, &format!("credit to {player_name}"));
        self.log
            .push(format!("Credit: {player_name} +{amount} · Cashier -{amount}"));
        Ok(())
    }

    /// Records a new unpaid prize, enforcing escrow sufficiency against
    /// the pot at creation time: committed unpaid prizes never exceed
    /// the pot.
    pub fn define_prize(&mut self, cashier_id: &str, name: &str, amount: i64) -> Result<()> {
        self.require_cashier(cashier_id)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput("prize name must not be empty".into()));
        }
        if amount <= 0 {
            return Err(EngineError::InvalidInput("amount must be positive".into()));
        }

        let unpaid = self.prizes.unpaid_total();
        let pot = self.prizes.pot();
        match unpaid.checked_add(amount) {
            Some(committed) if committed <= pot => {}
            // Overflowing totals exceed any pot a priori.
            _ => {
                debug!(unpaid, amount, pot, "prize definition rejected");
                return Err(EngineError::PotExceeded {
                    unpaid,
                    requested: amount,
                    pot,
                });
            }
        }

        self.prizes.define(name, amount)?;
        self.log.push(format!("Prize defined: {name} = {amount}"));
        Ok(())
    }

    /// Pays a prize out of the pot to a player. A paid prize can never
    /// be assigned again.
    pub fn assign_prize(&mut self, cashier_id: &str, index: usize, winner_id: &str) -> Result<()> {
        self.require_cashier(cashier_id)?;
        let prize = self
            .prizes
            .get(index)
            .ok_or_else(|| EngineError::NotFound(format!("no prize at index {index}")))?;
        if prize.paid {
            return Err(EngineError::AlreadyPaid);
        }
        let amount = prize.amount;
        let prize_name = prize.name.clone();

        let winner = match self.registry.get(winner_id) {
            Some(p) if p.role == Role::Player => p,
            Some(_) => {
                return Err(EngineError::InvalidInput("winner must be a player".into()))
            }
            None => return Err(EngineError::NotFound(format!("unknown winner {winner_id}"))),
        };
        let winner_name = winner.name.clone();
        let winner_balance = winner.balance.checked_add(amount).ok_or_else(|| {
            EngineError::InvalidInput("amount would overflow the winner balance".into())
        })?;

        // Escrow sufficiency guarantees this holds; re-checked because
        // remove_from_pot is the defensive gate on the pot.
        self.prizes.remove_from_pot(amount)?;
        self.prizes.assign(index, winner_id)?;
        self.registry.set_balance(winner_id, winner_balance);
        self.ledger
            .append(winner_id, amount, &format!("prize: {prize_name}"));
        self.log.push(format!(
            "Prize assigned: {prize_name} -> {winner_name} ({amount})"
        ));
        Ok(())
    }

    /// Removes every player and its ledger, clears prizes, zeroes the
    /// pot and the cashier's balance. The cashier itself stays
    /// registered.
    pub fn reset_players(&mut self, cashier_id: &str) -> Result<()> {
        self.require_cashier(cashier_id)?;

        let players: Vec<String> = self
            .registry
            .iter()
            .filter(|p| p.role == Role::Player)
            .map(|p| p.id.clone())
            .collect();
        for id in &players {
            self.registry.remove(id);
            self.ledger.purge(id);
        }

        self.prizes.reset();

        if let Some(cashier) = self.registry.get_mut(cashier_id) {
            cashier.balance = 0;
        }
        self.ledger.purge(cashier_id);

        self.log.push(
            "Reset: players invalidated, prizes and pot cleared, cashier balance zeroed.".into(),
        );
        Ok(())
    }

    /// Removes the cashier and its ledger, freeing the cashier slot for
    /// a future join.
    pub fn cashier_logout(&mut self, cashier_id: &str) -> Result<()> {
        let name = self.require_cashier(cashier_id)?.name.clone();
        self.registry.remove(cashier_id);
        self.ledger.purge(cashier_id);
        self.log
            .push(format!("Cashier left: {name} (session invalidated)"));
        Ok(())
    }

    pub fn pot(&self) -> i64 {
        self.prizes.pot()
    }

    pub fn balance(&self, id: &str) -> Option<i64> {
        self.registry.get(id).map(|p| p.balance)
    }

    /// Sum of all balances plus the pot; the conservation figure that
    /// only `credit` may move.
    pub fn total_value(&self) -> i64 {
        self.registry.iter().map(|p| p.balance).sum::<i64>() + self.prizes.pot()
    }
}
