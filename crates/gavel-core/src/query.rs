// Player browsing: name search plus category/country/status filters, and the
// pool counts shown on the admin board.

use serde::Serialize;

use crate::model::{Player, PlayerCategory, PlayerStatus};

/// Criteria for narrowing the player list. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerFilter {
    /// Case-insensitive substring of the player's name.
    pub search: String,
    pub category: Option<PlayerCategory>,
    /// Exact country name.
    pub country: Option<String>,
    pub status: Option<PlayerStatus>,
}

impl PlayerFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.category.is_none()
            && self.country.is_none()
            && self.status.is_none()
    }

    pub fn matches(&self, player: &Player) -> bool {
        if let Some(category) = self.category {
            if player.category != category {
                return false;
            }
        }
        if let Some(country) = &self.country {
            if &player.country != country {
                return false;
            }
        }
        if let Some(status) = self.status {
            if player.status != status {
                return false;
            }
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty() || player.name.to_lowercase().contains(&needle)
    }
}

/// Players matching `filter`, in pool order.
pub fn filter_players<'a>(players: &'a [Player], filter: &PlayerFilter) -> Vec<&'a Player> {
    if filter.is_empty() {
        return players.iter().collect();
    }
    players.iter().filter(|p| filter.matches(p)).collect()
}

/// Distinct countries in first-seen order, for populating a country picker.
pub fn countries(players: &[Player]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for p in players {
        if !seen.contains(&p.country.as_str()) {
            seen.push(&p.country);
        }
    }
    seen
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub available: usize,
    pub sold: usize,
    pub unsold: usize,
}

impl StatusCounts {
    pub fn tally(players: &[Player]) -> Self {
        players.iter().fold(StatusCounts::default(), |mut acc, p| {
            match p.status {
                PlayerStatus::Available => acc.available += 1,
                PlayerStatus::Sold => acc.sold += 1,
                PlayerStatus::Unsold => acc.unsold += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.available + self.sold + self.unsold
    }
}
