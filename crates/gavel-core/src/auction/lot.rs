// Results of closed bidding rounds and administrative assignments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a lot was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LotOutcome {
    Sold { team_id: String, price: u64 },
    Unsold,
}

/// One entry in the session's auction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotResult {
    /// 1-based position in the log.
    pub lot_number: u32,
    pub player_id: String,
    pub outcome: LotOutcome,
    /// True when the sale came from a direct assignment rather than a round.
    pub assigned: bool,
    pub closed_at: DateTime<Utc>,
}

/// What `finalize_bid` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FinalizeOutcome {
    /// No player was under bid.
    Idle,
    Sold {
        player_id: String,
        team_id: String,
        price: u64,
    },
    Unsold { player_id: String },
}

impl FinalizeOutcome {
    pub fn player_id(&self) -> Option<&str> {
        match self {
            FinalizeOutcome::Idle => None,
            FinalizeOutcome::Sold { player_id, .. } | FinalizeOutcome::Unsold { player_id } => {
                Some(player_id)
            }
        }
    }
}
