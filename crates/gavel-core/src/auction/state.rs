// The live-bidding record: which player is up, the high bid, and the clock.

use serde::{Deserialize, Serialize};

/// Seconds on the clock when a round opens and after every accepted bid.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    /// Waiting for the next player to be put up.
    Upcoming,
    /// A player is under bid.
    Live,
    /// No further rounds will be opened.
    Completed,
}

/// The state of the current bidding round.
///
/// `status == Live` exactly when `current_player_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionState {
    pub status: AuctionStatus,
    pub current_player_id: Option<String>,
    /// Highest bid so far; the base price until someone bids.
    pub current_bid: u64,
    /// Team holding the highest bid, if anyone has bid.
    pub current_bidder: Option<String>,
    pub time_remaining: u32,
}

impl AuctionState {
    /// The idle shape the record starts in and returns to after every round.
    pub fn idle(countdown_secs: u32) -> Self {
        AuctionState {
            status: AuctionStatus::Upcoming,
            current_player_id: None,
            current_bid: 0,
            current_bidder: None,
            time_remaining: countdown_secs,
        }
    }

    /// A freshly opened round for a player at their base price.
    pub fn opened(player_id: &str, base_price: u64, countdown_secs: u32) -> Self {
        AuctionState {
            status: AuctionStatus::Live,
            current_player_id: Some(player_id.to_string()),
            current_bid: base_price,
            current_bidder: None,
            time_remaining: countdown_secs,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == AuctionStatus::Live
    }
}

impl Default for AuctionState {
    fn default() -> Self {
        AuctionState::idle(DEFAULT_COUNTDOWN_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle_with_full_clock() {
        let s = AuctionState::default();
        assert_eq!(s.status, AuctionStatus::Upcoming);
        assert!(s.current_player_id.is_none());
        assert_eq!(s.current_bid, 0);
        assert!(s.current_bidder.is_none());
        assert_eq!(s.time_remaining, 30);
        assert!(!s.is_live());
    }

    #[test]
    fn opened_round_starts_at_base_price() {
        let s = AuctionState::opened("player-1", 2_000_000, 30);
        assert!(s.is_live());
        assert_eq!(s.current_player_id.as_deref(), Some("player-1"));
        assert_eq!(s.current_bid, 2_000_000);
        assert!(s.current_bidder.is_none());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(AuctionState::default()).unwrap();
        assert_eq!(json["status"], "upcoming");
        assert_eq!(json["timeRemaining"], 30);
        assert!(json["currentPlayerId"].is_null());
    }
}
