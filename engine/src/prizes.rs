//! Prize pool: the shared pot and the creation-ordered prize list.

use crate::now_ts;
use tombola_types::{EngineError, Prize, Result};

#[derive(Default)]
pub struct PrizePool {
    pot: i64,
    prizes: Vec<Prize>,
}

impl PrizePool {
    pub fn pot(&self) -> i64 {
        self.pot
    }

    /// Adds to the pot. The engine checks the sum stays in range before
    /// committing.
    pub fn add_to_pot(&mut self, amount: i64) {
        self.pot += amount;
    }

    /// Deducts from the pot. The engine validates sufficiency before
    /// committing; this check is defensive.
    pub fn remove_from_pot(&mut self, amount: i64) -> Result<()> {
        if amount > self.pot {
            return Err(EngineError::InsufficientPot {
                requested: amount,
                pot: self.pot,
            });
        }
        self.pot -= amount;
        Ok(())
    }

    /// Records a new unpaid prize. Escrow sufficiency against the pot
    /// is the engine's invariant check, not ours.
    pub fn define(&mut self, name: &str, amount: i64) -> Result<&Prize> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput("prize name must not be empty".into()));
        }
        if amount <= 0 {
            return Err(EngineError::InvalidInput("amount must be positive".into()));
        }
        self.prizes.push(Prize::new(name.to_string(), amount, now_ts()));
        Ok(&self.prizes[self.prizes.len() - 1])
    }

    /// Sum of all unpaid prize amounts.
    pub fn unpaid_total(&self) -> i64 {
        self.prizes
            .iter()
            .filter(|p| !p.paid)
            .map(|p| p.amount)
            .sum()
    }

    /// Sum of all paid prize amounts.
    pub fn paid_total(&self) -> i64 {
        self.prizes
            .iter()
            .filter(|p| p.paid)
            .map(|p| p.amount)
            .sum()
    }

    pub fn get(&self, index: usize) -> Option<&Prize> {
        self.prizes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prize> {
        self.prizes.iter()
    }

    /// The one permitted prize mutation: marks the prize paid with its
    /// winner. The prize is untouched on failure.
    pub fn assign(&mut self, index: usize, winner_id: &str) -> Result<&Prize> {
        let prize = self
            .prizes
            .get_mut(index)
            .ok_or_else(|| EngineError::NotFound(format!("no prize at index {index}")))?;
        if prize.paid {
            return Err(EngineError::AlreadyPaid);
        }
        prize.paid = true;
        prize.winner_id = Some(winner_id.to_string());
        Ok(prize)
    }

    /// Clears the prize list and zeroes the pot (full reset only).
    pub fn reset(&mut self) {
        self.prizes.clear();
        self.pot = 0;
    }
}
