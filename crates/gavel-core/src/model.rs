// Entities owned by an auction session: players, teams and the logged-in user.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Playing role of a cricketer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerCategory {
    Batsman,
    Bowler,
    #[serde(rename = "All-Rounder")]
    AllRounder,
    #[serde(rename = "Wicket-Keeper")]
    WicketKeeper,
}

impl PlayerCategory {
    pub const ALL: [PlayerCategory; 4] = [
        PlayerCategory::Batsman,
        PlayerCategory::Bowler,
        PlayerCategory::AllRounder,
        PlayerCategory::WicketKeeper,
    ];

    /// Parse a category label.
    ///
    /// Accepts the display form ("All-Rounder") as well as loose variants
    /// ("allrounder", "all rounder", "wk").
    pub fn from_label(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "batsman" | "batter" => Some(PlayerCategory::Batsman),
            "bowler" => Some(PlayerCategory::Bowler),
            "allrounder" => Some(PlayerCategory::AllRounder),
            "wicketkeeper" | "wk" | "keeper" => Some(PlayerCategory::WicketKeeper),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlayerCategory::Batsman => "Batsman",
            PlayerCategory::Bowler => "Bowler",
            PlayerCategory::AllRounder => "All-Rounder",
            PlayerCategory::WicketKeeper => "Wicket-Keeper",
        }
    }

    /// Whether batting numbers (runs, average, strike rate) apply.
    pub fn bats(&self) -> bool {
        !matches!(self, PlayerCategory::Bowler)
    }

    /// Whether bowling numbers (wickets, economy) apply.
    pub fn bowls(&self) -> bool {
        !matches!(self, PlayerCategory::Batsman)
    }
}

impl fmt::Display for PlayerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Lifecycle of a player within the auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Available,
    Sold,
    Unsold,
}

impl PlayerStatus {
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Some(PlayerStatus::Available),
            "sold" => Some(PlayerStatus::Sold),
            "unsold" => Some(PlayerStatus::Unsold),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlayerStatus::Available => "available",
            PlayerStatus::Sold => "sold",
            PlayerStatus::Unsold => "unsold",
        }
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Career numbers. Which fields are present depends on the category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wickets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economy_rate: Option<f64>,
}

/// A player in the auction pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Unique identifier (e.g., "player-1").
    pub id: String,
    pub name: String,
    pub category: PlayerCategory,
    pub country: String,
    /// Opening price in the smallest currency unit.
    pub base_price: u64,
    /// Equals `base_price` until the player is sold.
    pub current_price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub stats: PlayerStats,
    /// Owning team, set only when `status == Sold`.
    pub team_id: Option<String>,
    pub status: PlayerStatus,
}

impl Player {
    /// A fresh, unowned player available for bidding.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: PlayerCategory,
        country: impl Into<String>,
        base_price: u64,
    ) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            category,
            country: country.into(),
            base_price,
            current_price: base_price,
            image: None,
            stats: PlayerStats::default(),
            team_id: None,
            status: PlayerStatus::Available,
        }
    }

    pub fn with_stats(mut self, stats: PlayerStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn is_available(&self) -> bool {
        self.status == PlayerStatus::Available
    }
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// A franchise bidding in the auction.
///
/// The squad is not stored here; see `AuctionSession::roster`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    /// Remaining purse. Only ever decreases.
    pub budget: u64,
}

impl Team {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        primary_color: impl Into<String>,
        secondary_color: impl Into<String>,
        budget: u64,
    ) -> Self {
        Team {
            id: id.into(),
            name: name.into(),
            logo: None,
            primary_color: primary_color.into(),
            secondary_color: secondary_color.into(),
            budget,
        }
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        self.budget >= amount
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "user" | "owner" => Some(Role::User),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// The locally held identity. No credentials are checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub logged_in_at: DateTime<Utc>,
}

impl User {
    /// Build the mock user for a login with the given role.
    pub fn mock(email: impl Into<String>, role: Role) -> Self {
        let name = match role {
            Role::Admin => "Admin User",
            Role::User => "Team Owner",
        };
        User {
            id: "1".to_string(),
            name: name.to_string(),
            email: email.into(),
            role,
            logged_in_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
