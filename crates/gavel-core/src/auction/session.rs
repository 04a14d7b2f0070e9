// Auction session manager: owns players, teams and the bidding state machine.
//
// Every mutating operation either succeeds completely or returns an
// `AuctionError` without touching anything, so callers that ignore the
// result get "safe to call with bad input" behaviour for free.

use chrono::Utc;
use tracing::{debug, info, warn};

use super::lot::{FinalizeOutcome, LotOutcome, LotResult};
use super::roster::Roster;
use super::state::{AuctionState, AuctionStatus, DEFAULT_COUNTDOWN_SECS};
use crate::error::{AuctionError, Result};
use crate::model::{Player, PlayerStatus, Role, Team, User};

/// The complete state of one auction.
#[derive(Debug, Clone)]
pub struct AuctionSession {
    players: Vec<Player>,
    teams: Vec<Team>,
    auction: AuctionState,
    current_user: Option<User>,
    history: Vec<LotResult>,
    countdown_secs: u32,
}

impl AuctionSession {
    /// Create a session with the default 30-second countdown.
    pub fn new(players: Vec<Player>, teams: Vec<Team>) -> Self {
        Self::with_countdown(players, teams, DEFAULT_COUNTDOWN_SECS)
    }

    /// Create a session whose rounds run for `countdown_secs` seconds.
    pub fn with_countdown(players: Vec<Player>, teams: Vec<Team>, countdown_secs: u32) -> Self {
        debug!(
            "Session created: {} players, {} teams, {}s countdown",
            players.len(),
            teams.len(),
            countdown_secs
        );
        AuctionSession {
            players,
            teams,
            auction: AuctionState::idle(countdown_secs),
            current_user: None,
            history: Vec::new(),
            countdown_secs,
        }
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn auction(&self) -> &AuctionState {
        &self.auction
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Closed lots in the order they were resolved.
    pub fn history(&self) -> &[LotResult] {
        &self.history
    }

    pub fn countdown_secs(&self) -> u32 {
        self.countdown_secs
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    /// The player currently under bid.
    pub fn current_player(&self) -> Option<&Player> {
        self.auction
            .current_player_id
            .as_deref()
            .and_then(|id| self.player(id))
    }

    pub fn available_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_available())
    }

    /// The squad of a team, recomputed from player ownership.
    pub fn roster(&self, team_id: &str) -> Option<Roster<'_>> {
        self.team(team_id).map(|team| Roster::collect(team, &self.players))
    }

    /// Squads for every team, in team order.
    pub fn rosters(&self) -> Vec<Roster<'_>> {
        self.teams
            .iter()
            .map(|team| Roster::collect(team, &self.players))
            .collect()
    }

    fn player_idx(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    fn team_idx(&self, team_id: &str) -> Option<usize> {
        self.teams.iter().position(|t| t.id == team_id)
    }

    // -----------------------------------------------------------------------
    // Bidding state machine
    // -----------------------------------------------------------------------

    /// Put an available player up for bidding at their base price.
    ///
    /// Opening a round while another is live abandons the earlier round; that
    /// player stays available. Whoever owns the countdown must re-arm it.
    pub fn start_bidding(&mut self, player_id: &str) -> Result<()> {
        if self.auction.status == AuctionStatus::Completed {
            return Err(AuctionError::AuctionCompleted);
        }

        let player = self
            .player(player_id)
            .ok_or_else(|| AuctionError::PlayerNotFound {
                player_id: player_id.to_string(),
            })?;
        if !player.is_available() {
            return Err(AuctionError::PlayerNotAvailable {
                player_id: player_id.to_string(),
            });
        }
        let base_price = player.base_price;

        if let Some(previous) = self.auction.current_player_id.as_deref() {
            warn!(
                "Abandoning live round for {} to start bidding on {}",
                previous, player_id
            );
        }

        self.auction = AuctionState::opened(player_id, base_price, self.countdown_secs);
        info!("Bidding opened for {} at {}", player_id, base_price);
        Ok(())
    }

    /// Record a bid from a team and put the full countdown back on the clock.
    ///
    /// Whether `amount` beats the current bid is left to the caller.
    pub fn place_bid(&mut self, team_id: &str, amount: u64) -> Result<()> {
        let team = self
            .team(team_id)
            .ok_or_else(|| AuctionError::TeamNotFound {
                team_id: team_id.to_string(),
            })?;
        if !team.can_afford(amount) {
            return Err(AuctionError::InsufficientBudget {
                team_id: team_id.to_string(),
                amount,
                budget: team.budget,
            });
        }

        let base_price = self
            .current_player()
            .map(|p| p.base_price)
            .ok_or(AuctionError::NoActiveBid)?;
        if amount < base_price {
            return Err(AuctionError::BidBelowBasePrice { amount, base_price });
        }

        self.auction.current_bid = amount;
        self.auction.current_bidder = Some(team_id.to_string());
        self.auction.time_remaining = self.countdown_secs;
        info!("Bid of {} from {}", amount, team_id);
        Ok(())
    }

    /// Close the current round.
    ///
    /// Sells to the high bidder if there is one, otherwise marks the player
    /// unsold. The auction record returns to its idle shape either way. With
    /// no round live this is a no-op.
    pub fn finalize_bid(&mut self) -> FinalizeOutcome {
        if !self.auction.is_live() {
            return FinalizeOutcome::Idle;
        }

        let round = std::mem::replace(&mut self.auction, AuctionState::idle(self.countdown_secs));
        let Some(player_id) = round.current_player_id else {
            return FinalizeOutcome::Idle;
        };
        let Some(player_idx) = self.player_idx(&player_id) else {
            warn!("Player {} vanished while under bid", player_id);
            return FinalizeOutcome::Idle;
        };

        let sale = round.current_bidder.and_then(|team_id| {
            match self.team_idx(&team_id) {
                Some(idx) if self.teams[idx].can_afford(round.current_bid) => Some(idx),
                Some(idx) => {
                    warn!(
                        "{} can no longer cover {} (budget {}), closing lot unsold",
                        team_id, round.current_bid, self.teams[idx].budget
                    );
                    None
                }
                None => {
                    warn!("High bidder {} is not a known team", team_id);
                    None
                }
            }
        });

        let outcome = match sale {
            Some(team_idx) => {
                self.transfer(player_idx, team_idx, round.current_bid);
                FinalizeOutcome::Sold {
                    player_id,
                    team_id: self.teams[team_idx].id.clone(),
                    price: round.current_bid,
                }
            }
            None => {
                self.players[player_idx].status = PlayerStatus::Unsold;
                FinalizeOutcome::Unsold { player_id }
            }
        };

        match &outcome {
            FinalizeOutcome::Sold {
                player_id,
                team_id,
                price,
            } => {
                info!("{} sold to {} for {}", player_id, team_id, price);
                self.log_lot(
                    player_id.clone(),
                    LotOutcome::Sold {
                        team_id: team_id.clone(),
                        price: *price,
                    },
                    false,
                );
            }
            FinalizeOutcome::Unsold { player_id } => {
                info!("{} went unsold", player_id);
                self.log_lot(player_id.clone(), LotOutcome::Unsold, false);
            }
            FinalizeOutcome::Idle => {}
        }

        outcome
    }

    /// One second of countdown.
    ///
    /// When the clock reaches zero the round is finalized and the outcome is
    /// returned. Outside a live round this does nothing.
    pub fn tick(&mut self) -> Option<FinalizeOutcome> {
        if !self.auction.is_live() {
            return None;
        }
        self.auction.time_remaining = self.auction.time_remaining.saturating_sub(1);
        if self.auction.time_remaining > 0 {
            return None;
        }
        debug!("Countdown expired, finalizing");
        Some(self.finalize_bid())
    }

    /// Sell a player directly, bypassing live bidding.
    ///
    /// Squad size is not checked here.
    pub fn assign_player_to_team(
        &mut self,
        player_id: &str,
        team_id: &str,
        amount: u64,
    ) -> Result<()> {
        let player_idx = self
            .player_idx(player_id)
            .ok_or_else(|| AuctionError::PlayerNotFound {
                player_id: player_id.to_string(),
            })?;
        let team_idx = self
            .team_idx(team_id)
            .ok_or_else(|| AuctionError::TeamNotFound {
                team_id: team_id.to_string(),
            })?;

        if self.players[player_idx].status == PlayerStatus::Sold {
            return Err(AuctionError::PlayerAlreadySold {
                player_id: player_id.to_string(),
            });
        }
        if self.auction.current_player_id.as_deref() == Some(player_id) {
            return Err(AuctionError::PlayerUnderBid {
                player_id: player_id.to_string(),
            });
        }
        let team = &self.teams[team_idx];
        if !team.can_afford(amount) {
            return Err(AuctionError::InsufficientBudget {
                team_id: team_id.to_string(),
                amount,
                budget: team.budget,
            });
        }

        self.transfer(player_idx, team_idx, amount);
        info!("{} assigned to {} for {}", player_id, team_id, amount);
        self.log_lot(
            player_id.to_string(),
            LotOutcome::Sold {
                team_id: team_id.to_string(),
                price: amount,
            },
            true,
        );
        Ok(())
    }

    /// Close the auction for good once nobody is left to bid on.
    pub fn complete_auction(&mut self) -> Result<()> {
        match self.auction.status {
            AuctionStatus::Completed => return Ok(()),
            AuctionStatus::Live => {
                return Err(AuctionError::AuctionStillOpen {
                    reason: "a bidding round is live".into(),
                })
            }
            AuctionStatus::Upcoming => {}
        }

        let remaining = self.available_players().count();
        if remaining > 0 {
            return Err(AuctionError::AuctionStillOpen {
                reason: format!("{remaining} players are still available"),
            });
        }

        self.auction.status = AuctionStatus::Completed;
        info!("Auction completed after {} lots", self.history.len());
        Ok(())
    }

    // Caller has checked that the team can afford `price`.
    fn transfer(&mut self, player_idx: usize, team_idx: usize, price: u64) {
        let team = &mut self.teams[team_idx];
        team.budget -= price;

        let player = &mut self.players[player_idx];
        player.team_id = Some(team.id.clone());
        player.current_price = price;
        player.status = PlayerStatus::Sold;
    }

    fn log_lot(&mut self, player_id: String, outcome: LotOutcome, assigned: bool) {
        let lot_number = (self.history.len() + 1) as u32;
        self.history.push(LotResult {
            lot_number,
            player_id,
            outcome,
            assigned,
            closed_at: Utc::now(),
        });
    }

    // -----------------------------------------------------------------------
    // Session identity
    // -----------------------------------------------------------------------

    /// Set the local user. Nothing is authenticated.
    pub fn login(&mut self, email: &str, role: Role) -> &User {
        info!("Logged in {} as {}", email, role);
        self.current_user.insert(User::mock(email, role))
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.current_user.take() {
            info!("Logged out {}", user.email);
        }
    }
}
