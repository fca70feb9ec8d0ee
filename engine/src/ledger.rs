//! Ledger store: per-participant append-only history of balance deltas.
//!
//! A dumb log by design: it never validates economic invariants (that
//! is the engine's responsibility) and no operation here fails.

use crate::now_ts;
use std::collections::{HashMap, VecDeque};
use tombola_types::{LedgerEntry, LEDGER_CAP};

#[derive(Default)]
pub struct LedgerStore {
    entries: HashMap<String, VecDeque<LedgerEntry>>,
}

impl LedgerStore {
    /// Prepends a new entry and truncates to the cap, dropping the
    /// oldest.
    pub fn append(&mut self, id: &str, delta: i64, note: &str) {
        let history = self.entries.entry(id.to_string()).or_default();
        history.push_front(LedgerEntry {
            delta,
            note: note.to_string(),
            ts: now_ts(),
        });
        history.truncate(LEDGER_CAP);
    }

    /// Newest-first history for `id`. Empty for unknown ids.
    pub fn history(&self, id: &str) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.get(id).into_iter().flatten()
    }

    /// Drops all history for `id` (participant removal).
    pub fn purge(&mut self, id: &str) {
        self.entries.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_is_newest_first() {
        let mut ledger = LedgerStore::default();
        ledger.append("a", 10, "credit");
        ledger.append("a", -4, "wager");

        let notes: Vec<_> = ledger.history("a").map(|e| e.note.as_str()).collect();
        assert_eq!(notes, vec!["wager", "credit"]);
        assert_eq!(ledger.history("b").count(), 0);
    }

    #[test]
    fn test_history_is_capped_dropping_oldest() {
        let mut ledger = LedgerStore::default();
        for i in 0..(LEDGER_CAP as i64 + 10) {
            ledger.append("a", i, &format!("entry {i}"));
        }

        let entries: Vec<_> = ledger.history("a").collect();
        assert_eq!(entries.len(), LEDGER_CAP);
        // Newest entry survives, the 10 oldest were dropped.
        assert_eq!(entries[0].delta, LEDGER_CAP as i64 + 9);
        assert_eq!(entries.last().unwrap().delta, 10);
    }

    #[test]
    fn test_purge_drops_everything() {
        let mut ledger = LedgerStore::default();
        ledger.append("a", 1, "credit");
        ledger.append("b", 2, "credit");
        ledger.purge("a");
        assert_eq!(ledger.history("a").count(), 0);
        assert_eq!(ledger.history("b").count(), 1);
    }
}
