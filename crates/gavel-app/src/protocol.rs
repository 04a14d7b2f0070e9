// Messages between the event loop and whatever front end drives it.
//
// Front ends send `UserCommand`s in and receive `UiUpdate`s back. Neither side
// touches the session directly.

use serde::Serialize;

use gavel_core::auction::{AuctionSession, AuctionState, FinalizeOutcome, LotResult, RosterSummary};
use gavel_core::guard::GuardRules;
use gavel_core::model::{Player, Role, User};
use gavel_core::query::{PlayerFilter, StatusCounts};

/// Commands from the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Login { email: String, role: Role },
    Logout,
    StartBidding { player_id: String },
    PlaceBid { team_id: String, amount: u64 },
    /// Close the live round now instead of waiting for the clock.
    Finalize,
    Assign {
        player_id: String,
        team_id: String,
        amount: u64,
    },
    Complete,
    Show(View),
    Quit,
}

/// Read-only views a front end can ask for.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Players(PlayerFilter),
    Teams,
    Roster { team_id: String },
    State,
    History,
    /// Distinct countries in the pool, for narrowing `Players`.
    Countries,
}

/// Updates pushed to the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    /// Full state after any accepted mutation.
    Snapshot(Box<SessionSnapshot>),
    /// One second elapsed on the live round.
    Tick { player_id: String, remaining: u32 },
    /// A round closed, by the clock or by an admin.
    LotClosed(FinalizeOutcome),
    /// A command was refused; nothing changed.
    Rejected(String),
    Players(Vec<Player>),
    Teams(Vec<RosterSummary>),
    Roster {
        summary: RosterSummary,
        players: Vec<Player>,
    },
    History(Vec<LotResult>),
    Countries(Vec<String>),
}

/// Everything a board needs to redraw itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub auction: AuctionState,
    pub current_player: Option<Player>,
    pub current_user: Option<User>,
    pub counts: StatusCounts,
    pub teams: Vec<RosterSummary>,
    pub lots_closed: usize,
}

impl SessionSnapshot {
    pub fn capture(session: &AuctionSession, rules: &GuardRules) -> Self {
        SessionSnapshot {
            auction: session.auction().clone(),
            current_player: session.current_player().cloned(),
            current_user: session.current_user().cloned(),
            counts: StatusCounts::tally(session.players()),
            teams: session
                .rosters()
                .iter()
                .map(|r| r.summary(rules.max_squad_size))
                .collect(),
            lots_closed: session.history().len(),
        }
    }
}
