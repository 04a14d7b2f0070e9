// Caller-side checks run before an operation reaches the session.
//
// The session itself only protects its own invariants. The rules a person at
// the auction table expects (who may do what, bids must go up, squads are
// capped) live here, so a front end can explain a refusal before calling in.

use thiserror::Error;

use crate::auction::AuctionSession;
use crate::error::AuctionError;
use crate::model::Role;
use crate::money::format_amount;

/// Rules applied on top of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardRules {
    /// A new bid must beat the current one by at least this much.
    pub min_increment: u64,
    pub max_squad_size: usize,
}

impl Default for GuardRules {
    fn default() -> Self {
        GuardRules {
            min_increment: crate::money::LAKH,
            max_squad_size: crate::auction::MAX_SQUAD_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("please login to participate in the auction")]
    NotLoggedIn,

    #[error("only {required} accounts can {action}")]
    PermissionDenied { required: Role, action: &'static str },

    #[error("bid must be at least {}, the current bid is {}", rupees(.minimum), rupees(.current))]
    BidTooLow { current: u64, minimum: u64 },

    #[error("{team_name} already has {max} players, the maximum allowed")]
    TeamFull { team_name: String, max: usize },

    #[error("please enter a valid amount")]
    InvalidAmount,

    #[error("bidding on {player_id} is still live, finalize it first")]
    RoundInProgress { player_id: String },

    #[error(transparent)]
    Auction(#[from] AuctionError),
}

fn rupees(amount: &u64) -> String {
    format_amount(*amount)
}

fn require_role(
    session: &AuctionSession,
    role: Role,
    action: &'static str,
) -> Result<(), GuardError> {
    let user = session.current_user().ok_or(GuardError::NotLoggedIn)?;
    if user.role != role {
        return Err(GuardError::PermissionDenied {
            required: role,
            action,
        });
    }
    Ok(())
}

fn require_open_squad(
    session: &AuctionSession,
    team_id: &str,
    rules: &GuardRules,
) -> Result<(), GuardError> {
    let roster = session
        .roster(team_id)
        .ok_or_else(|| AuctionError::TeamNotFound {
            team_id: team_id.to_string(),
        })?;
    if roster.is_full(rules.max_squad_size) {
        return Err(GuardError::TeamFull {
            team_name: roster.team.name.clone(),
            max: rules.max_squad_size,
        });
    }
    Ok(())
}

fn require_budget(session: &AuctionSession, team_id: &str, amount: u64) -> Result<(), GuardError> {
    let team = session
        .team(team_id)
        .ok_or_else(|| AuctionError::TeamNotFound {
            team_id: team_id.to_string(),
        })?;
    if !team.can_afford(amount) {
        return Err(AuctionError::InsufficientBudget {
            team_id: team_id.to_string(),
            amount,
            budget: team.budget,
        }
        .into());
    }
    Ok(())
}

/// Only admins open rounds, one at a time, and only on players still in the
/// pool.
pub fn can_start_bidding(session: &AuctionSession, player_id: &str) -> Result<(), GuardError> {
    require_role(session, Role::Admin, "start the bidding process")?;
    let auction = session.auction();
    if auction.is_live() {
        return Err(GuardError::RoundInProgress {
            player_id: auction.current_player_id.clone().unwrap_or_default(),
        });
    }
    let player = session
        .player(player_id)
        .ok_or_else(|| AuctionError::PlayerNotFound {
            player_id: player_id.to_string(),
        })?;
    if !player.is_available() {
        return Err(AuctionError::PlayerNotAvailable {
            player_id: player_id.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Team owners bid on the live lot, above the current bid, within budget,
/// while their squad has room.
pub fn can_place_bid(
    session: &AuctionSession,
    team_id: &str,
    amount: u64,
    rules: &GuardRules,
) -> Result<(), GuardError> {
    require_role(session, Role::User, "place bids")?;

    let auction = session.auction();
    if !auction.is_live() {
        return Err(AuctionError::NoActiveBid.into());
    }

    let minimum = auction
        .current_bid
        .saturating_add(rules.min_increment.max(1));
    if amount < minimum {
        return Err(GuardError::BidTooLow {
            current: auction.current_bid,
            minimum,
        });
    }

    require_open_squad(session, team_id, rules)?;
    require_budget(session, team_id, amount)
}

/// Admins may hand a player straight to a team with room and budget.
pub fn can_assign(
    session: &AuctionSession,
    player_id: &str,
    team_id: &str,
    amount: u64,
    rules: &GuardRules,
) -> Result<(), GuardError> {
    require_role(session, Role::Admin, "assign players")?;
    if amount == 0 {
        return Err(GuardError::InvalidAmount);
    }
    if session.player(player_id).is_none() {
        return Err(AuctionError::PlayerNotFound {
            player_id: player_id.to_string(),
        }
        .into());
    }
    require_open_squad(session, team_id, rules)?;
    require_budget(session, team_id, amount)
}

/// Closing a round early is an admin action.
pub fn can_finalize(session: &AuctionSession) -> Result<(), GuardError> {
    require_role(session, Role::Admin, "close a bidding round")?;
    if !session.auction().is_live() {
        return Err(AuctionError::NoActiveBid.into());
    }
    Ok(())
}

pub fn can_complete(session: &AuctionSession) -> Result<(), GuardError> {
    require_role(session, Role::Admin, "complete the auction")
}
