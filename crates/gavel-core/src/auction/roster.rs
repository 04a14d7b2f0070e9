// Team squads, derived from player ownership on every read.

use serde::Serialize;

use crate::model::{Player, PlayerCategory, Team};

/// Default cap on squad size.
pub const MAX_SQUAD_SIZE: usize = 13;

/// A team's squad as seen through the player collection.
///
/// Borrowed from the session, so it can never disagree with the players'
/// `team_id` fields.
#[derive(Debug, Clone)]
pub struct Roster<'a> {
    pub team: &'a Team,
    pub players: Vec<&'a Player>,
}

impl<'a> Roster<'a> {
    pub(crate) fn collect(team: &'a Team, players: &'a [Player]) -> Self {
        let players = players
            .iter()
            .filter(|p| p.team_id.as_deref() == Some(team.id.as_str()))
            .collect();
        Roster { team, players }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Whether the squad has reached `max_size` players.
    pub fn is_full(&self, max_size: usize) -> bool {
        self.players.len() >= max_size
    }

    /// Total paid for the squad.
    pub fn spent(&self) -> u64 {
        self.players.iter().map(|p| p.current_price).sum()
    }

    pub fn average_price(&self) -> Option<u64> {
        if self.players.is_empty() {
            None
        } else {
            Some(self.spent() / self.players.len() as u64)
        }
    }

    pub fn by_category(
        &self,
        category: PlayerCategory,
    ) -> impl Iterator<Item = &'a Player> + '_ {
        self.players
            .iter()
            .copied()
            .filter(move |p| p.category == category)
    }

    pub fn summary(&self, max_size: usize) -> RosterSummary {
        let count = |c| self.by_category(c).count();
        RosterSummary {
            team_id: self.team.id.clone(),
            team_name: self.team.name.clone(),
            size: self.len(),
            max_size,
            budget_remaining: self.team.budget,
            spent: self.spent(),
            average_price: self.average_price(),
            batsmen: count(PlayerCategory::Batsman),
            bowlers: count(PlayerCategory::Bowler),
            all_rounders: count(PlayerCategory::AllRounder),
            wicket_keepers: count(PlayerCategory::WicketKeeper),
        }
    }
}

/// Owned per-team totals for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSummary {
    pub team_id: String,
    pub team_name: String,
    pub size: usize,
    pub max_size: usize,
    pub budget_remaining: u64,
    pub spent: u64,
    pub average_price: Option<u64>,
    pub batsmen: usize,
    pub bowlers: usize,
    pub all_rounders: usize,
    pub wicket_keepers: usize,
}
