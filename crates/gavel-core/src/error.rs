// Error taxonomy for session operations.

use thiserror::Error;

/// Why the session refused an operation. A refused operation leaves the
/// session untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    #[error("player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("player {player_id} is not available for bidding")]
    PlayerNotAvailable { player_id: String },

    #[error("player {player_id} has already been sold")]
    PlayerAlreadySold { player_id: String },

    #[error("player {player_id} is currently under bid")]
    PlayerUnderBid { player_id: String },

    #[error("team not found: {team_id}")]
    TeamNotFound { team_id: String },

    #[error("team {team_id} cannot afford {amount} (budget {budget})")]
    InsufficientBudget {
        team_id: String,
        amount: u64,
        budget: u64,
    },

    #[error("no bidding round is live")]
    NoActiveBid,

    #[error("bid of {amount} is below the base price of {base_price}")]
    BidBelowBasePrice { amount: u64, base_price: u64 },

    #[error("the auction has been completed")]
    AuctionCompleted,

    #[error("auction cannot be completed: {reason}")]
    AuctionStillOpen { reason: String },
}

pub type Result<T> = std::result::Result<T, AuctionError>;
