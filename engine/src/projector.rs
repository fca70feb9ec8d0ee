//! View projector: the role-filtered, privacy-respecting snapshot.

use crate::Economy;
use tombola_types::api::{PlayerView, PotView, Snapshot};
use tombola_types::{Role, APP_TITLE, HISTORY_VIEW_CAP};

/// Computes the snapshot for one viewer (anonymous when `viewer_id` is
/// `None` or unknown). Pure read; never mutates the economy.
pub fn project(economy: &Economy, viewer_id: Option<&str>) -> Snapshot {
    let viewer = viewer_id.and_then(|id| economy.registry.get(id));
    let viewer_role = viewer.map(|p| p.role);
    let viewer_id = viewer.map(|p| p.id.as_str());

    let mut players: Vec<PlayerView> = economy
        .registry
        .iter()
        .map(|p| {
            let balance_visible = match viewer_role {
                Some(Role::Cashier) => true,
                Some(Role::Player) => viewer_id == Some(p.id.as_str()),
                None => false,
            };
            PlayerView {
                id: p.id.clone(),
                name: p.name.clone(),
                role: p.role,
                balance: balance_visible.then_some(p.balance),
            }
        })
        .collect();
    players.sort_by_key(|p| p.name.to_lowercase());

    let my_history = match (viewer_role, viewer_id) {
        (Some(Role::Player), Some(id)) => economy
            .ledger
            .history(id)
            .take(HISTORY_VIEW_CAP)
            .cloned()
            .collect(),
        _ => Vec::new(),
    };

    let prizes = match viewer_role {
        Some(Role::Cashier) => economy.prizes.iter().cloned().collect(),
        Some(Role::Player) => economy.prizes.iter().filter(|p| !p.paid).cloned().collect(),
        None => Vec::new(),
    };

    let pot = economy.prizes.pot();
    let pot = if viewer_role == Some(Role::Cashier) {
        let unpaid = economy.prizes.unpaid_total();
        PotView {
            pot,
            unpaid_total: Some(unpaid),
            paid_total: Some(economy.prizes.paid_total()),
            pot_remaining: Some((pot - unpaid).max(0)),
        }
    } else {
        PotView::public(pot)
    };

    Snapshot {
        title: APP_TITLE,
        players,
        my_history,
        prizes,
        pot,
        log: economy.log.entries().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIN: &str = "4321";

    fn session() -> (Economy, String, String, String) {
        let mut economy = Economy::new(PIN);
        let cashier = economy.join("Zoe", Role::Cashier, Some(PIN)).unwrap().id;
        let lucia = economy.join("lucia", Role::Player, None).unwrap().id;
        let marco = economy.join("Marco", Role::Player, None).unwrap().id;
        economy.credit(&cashier, &lucia, 50).unwrap();
        economy.credit(&cashier, &marco, 40).unwrap();
        economy.wager(&lucia, 30).unwrap();
        economy.define_prize(&cashier, "Tombola", 20).unwrap();
        economy.define_prize(&cashier, "Cinquina", 10).unwrap();
        economy.assign_prize(&cashier, 1, &marco).unwrap();
        (economy, cashier, lucia, marco)
    }

    #[test]
    fn test_players_sorted_case_insensitively_for_all_viewers() {
        let (economy, cashier, ..) = session();
        for viewer in [None, Some(cashier.as_str())] {
            let names: Vec<_> = project(&economy, viewer)
                .players
                .iter()
                .map(|p| p.name.clone())
                .collect();
            assert_eq!(names, vec!["lucia", "Marco", "Zoe"]);
        }
    }

    #[test]
    fn test_player_sees_only_own_balance_and_unpaid_prizes() {
        let (economy, _, lucia, _) = session();
        let snapshot = project(&economy, Some(&lucia));

        for p in &snapshot.players {
            if p.id == lucia {
                assert_eq!(p.balance, Some(20));
            } else {
                assert_eq!(p.balance, None);
            }
        }

        // Paid prizes are invisible to players.
        assert_eq!(snapshot.prizes.len(), 1);
        assert_eq!(snapshot.prizes[0].name, "Tombola");
        assert!(!snapshot.prizes[0].paid);

        // Only the raw pot figure.
        assert_eq!(snapshot.pot, PotView::public(20));

        // Own history only, newest first.
        assert_eq!(snapshot.my_history.len(), 2);
        assert_eq!(snapshot.my_history[0].note, "wager");
        assert_eq!(snapshot.my_history[1].note, "credit");
    }

    #[test]
    fn test_cashier_sees_everything() {
        let (economy, cashier, ..) = session();
        let snapshot = project(&economy, Some(&cashier));

        assert!(snapshot.players.iter().all(|p| p.balance.is_some()));
        assert_eq!(snapshot.prizes.len(), 2);
        assert_eq!(snapshot.pot.pot, 20);
        assert_eq!(snapshot.pot.unpaid_total, Some(20));
        assert_eq!(snapshot.pot.paid_total, Some(10));
        assert_eq!(snapshot.pot.pot_remaining, Some(0));
        // The cashier has no personal history view.
        assert!(snapshot.my_history.is_empty());
    }

    #[test]
    fn test_anonymous_and_unknown_viewers_see_the_public_view() {
        let (economy, ..) = session();
        for viewer in [None, Some("not-a-real-id")] {
            let snapshot = project(&economy, viewer);
            assert!(snapshot.players.iter().all(|p| p.balance.is_none()));
            assert!(snapshot.prizes.is_empty());
            assert!(snapshot.my_history.is_empty());
            assert_eq!(snapshot.pot, PotView::public(20));
        }
    }

    #[test]
    fn test_activity_log_identical_for_all_viewers() {
        let (economy, cashier, lucia, _) = session();
        let anon = project(&economy, None);
        assert!(!anon.log.is_empty());
        assert_eq!(project(&economy, Some(&cashier)).log, anon.log);
        assert_eq!(project(&economy, Some(&lucia)).log, anon.log);
    }
}
