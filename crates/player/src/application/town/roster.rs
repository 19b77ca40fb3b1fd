//! The town's player list.

use townsync_domain::{Player, PlayerId};

/// Every player currently in the town, in arrival order.
///
/// Joins and leaves swap in a new list; movement edits one entry in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRoster {
    players: Vec<Player>,
}

impl PlayerRoster {
    pub fn new(players: Vec<Player>) -> Self {
        Self { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Players for `ids`, in the order given. Unknown ids are skipped.
    pub fn players_in(&self, ids: &[PlayerId]) -> Vec<Player> {
        ids.iter().filter_map(|id| self.get(*id).cloned()).collect()
    }

    /// Add a player, replacing any entry with the same id.
    pub fn join(&mut self, player: Player) {
        let mut players: Vec<Player> = self
            .players
            .iter()
            .filter(|p| p.id != player.id)
            .cloned()
            .collect();
        players.push(player);
        self.players = players;
    }

    /// Remove a player. Returns false if they were not listed.
    pub fn leave(&mut self, id: PlayerId) -> bool {
        let before = self.players.len();
        self.players = self
            .players
            .iter()
            .filter(|p| p.id != id)
            .cloned()
            .collect();
        self.players.len() != before
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
