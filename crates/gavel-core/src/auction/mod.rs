pub mod lot;
pub mod roster;
pub mod session;
pub mod state;

pub use lot::{FinalizeOutcome, LotOutcome, LotResult};
pub use roster::{Roster, RosterSummary, MAX_SQUAD_SIZE};
pub use session::AuctionSession;
pub use state::{AuctionState, AuctionStatus, DEFAULT_COUNTDOWN_SECS};
