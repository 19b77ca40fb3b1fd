//! Occupant tracking shared by every area controller.

use std::collections::HashSet;

use townsync_domain::{Player, PlayerId};

/// True iff the two player lists hold different members.
///
/// Lists are compared by player id; order is ignored.
pub fn members_differ(old: &[Player], new: &[Player]) -> bool {
    if old.len() != new.len() {
        return true;
    }
    let old: HashSet<PlayerId> = old.iter().map(|p| p.id).collect();
    let new: HashSet<PlayerId> = new.iter().map(|p| p.id).collect();
    old.symmetric_difference(&new).next().is_some()
}

/// Snapshot of the players currently inside one area.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccupantSet {
    players: Vec<Player>,
}

impl OccupantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot.
    ///
    /// The new list is always stored. Returns it when the membership changed,
    /// `None` when it is the same set of players (possibly reordered).
    pub fn apply(&mut self, players: Vec<Player>) -> Option<Vec<Player>> {
        let changed = members_differ(&self.players, &players);
        self.players = players;
        changed.then(|| self.players.clone())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use townsync_domain::PlayerLocation;

    fn player(name: &str) -> Player {
        Player::new(PlayerId::new(), name)
    }

    #[test]
    fn first_occupant_is_a_change() {
        let mut set = OccupantSet::new();
        let alice = player("alice");

        let changed = set.apply(vec![alice.clone()]);

        assert_eq!(changed, Some(vec![alice]));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn reordering_same_members_is_silent() {
        let mut set = OccupantSet::new();
        let (a, b, c) = (player("a"), player("b"), player("c"));
        set.apply(vec![a.clone(), b.clone(), c.clone()]);

        assert_eq!(set.apply(vec![c.clone(), a.clone(), b.clone()]), None);
        // still stored in the new order
        assert_eq!(set.ids(), vec![c.id, a.id, b.id]);
    }

    #[test]
    fn fresh_player_objects_with_same_ids_are_silent() {
        let mut set = OccupantSet::new();
        let a = player("a");
        set.apply(vec![a.clone()]);

        let moved = a.with_location(PlayerLocation {
            x: 10.0,
            ..PlayerLocation::default()
        });
        assert_eq!(set.apply(vec![moved]), None);
    }

    #[test]
    fn swapping_one_member_is_a_change() {
        let mut set = OccupantSet::new();
        let (a, b, c) = (player("a"), player("b"), player("c"));
        set.apply(vec![a.clone(), b]);

        assert!(set.apply(vec![a, c.clone()]).is_some());
        assert!(set.contains(c.id));
    }

    #[test]
    fn emptying_the_area_is_a_change() {
        let mut set = OccupantSet::new();
        set.apply(vec![player("a")]);

        assert_eq!(set.apply(Vec::new()), Some(Vec::new()));
        assert!(set.is_empty());
    }
}
