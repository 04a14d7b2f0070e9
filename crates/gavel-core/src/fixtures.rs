// Initial players and teams: the eight franchises, a seeded player generator,
// and a CSV loader for fixed player pools.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auction::AuctionSession;
use crate::config::Config;
use crate::model::{Player, PlayerCategory, PlayerStats, Team};
use crate::money::LAKH;

/// Starting purse for every franchise (85 crore).
pub const DEFAULT_STARTING_BUDGET: u64 = 850_000_000;

/// Size of the generated pool when nothing else is configured.
pub const DEFAULT_PLAYER_COUNT: usize = 120;

const FIRST_NAMES: &[&str] = &[
    "Virat", "Rohit", "David", "Steve", "Joe", "Babar", "Kane", "Ben", "Kagiso", "Shakib",
    "Rashid", "Jasprit", "Mitchell", "Jos", "Quinton", "Kieron", "Angelo", "Faf", "Trent",
    "Bhuvneshwar",
];

const LAST_NAMES: &[&str] = &[
    "Kohli", "Sharma", "Warner", "Smith", "Root", "Azam", "Williamson", "Stokes", "Rabada",
    "Al Hasan", "Khan", "Bumrah", "Starc", "Buttler", "de Kock", "Pollard", "Mathews",
    "du Plessis", "Boult", "Kumar",
];

const COUNTRIES: &[&str] = &[
    "India",
    "Australia",
    "England",
    "South Africa",
    "New Zealand",
    "West Indies",
    "Sri Lanka",
    "Pakistan",
    "Bangladesh",
    "Afghanistan",
];

/// Base prices on offer, in lakhs.
const BASE_PRICE_LAKHS: &[u64] = &[20, 30, 40, 50, 75, 100, 150, 200];

/// Number of distinct player portraits cycled through.
const PORTRAIT_COUNT: usize = 15;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// The eight franchises, each starting with `starting_budget`.
pub fn default_teams(starting_budget: u64) -> Vec<Team> {
    let franchises = [
        ("Mumbai Indians", "#004BA0", "#D1AB3E"),
        ("Chennai Super Kings", "#F9CD05", "#0081E9"),
        ("Royal Challengers Bangalore", "#EC1C24", "#000000"),
        ("Kolkata Knight Riders", "#3A225D", "#B3A123"),
        ("Delhi Capitals", "#17479E", "#EF1B23"),
        ("Punjab Kings", "#ED1B24", "#A7A9AC"),
        ("Rajasthan Royals", "#2D3E8B", "#EA1A85"),
        ("Sunrisers Hyderabad", "#F7A721", "#E95E0B"),
    ];

    franchises
        .iter()
        .enumerate()
        .map(|(i, (name, primary, secondary))| {
            let mut team = Team::new(
                format!("team-{}", i + 1),
                *name,
                *primary,
                *secondary,
                starting_budget,
            );
            team.logo = Some(format!("/team-{}.png", i + 1));
            team
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Generated players
// ---------------------------------------------------------------------------

/// Generate `count` players with ids `player-1..=player-count`.
///
/// The same seed always yields the same pool.
pub fn generate_players(count: usize, seed: u64) -> Vec<Player> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|i| generate_player(&mut rng, i)).collect()
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

fn generate_player(rng: &mut StdRng, index: usize) -> Player {
    let name = format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES));
    let category = PlayerCategory::ALL[rng.gen_range(0..PlayerCategory::ALL.len())];
    let country = pick(rng, COUNTRIES);
    let lakhs = BASE_PRICE_LAKHS[rng.gen_range(0..BASE_PRICE_LAKHS.len())];

    let stats = generate_stats(rng, category);
    let mut player = Player::new(
        format!("player-{}", index + 1),
        name,
        category,
        country,
        lakhs * LAKH,
    )
    .with_stats(stats);
    player.image = Some(format!("/player-{}.jpg", index % PORTRAIT_COUNT + 1));
    player
}

fn generate_stats(rng: &mut StdRng, category: PlayerCategory) -> PlayerStats {
    let mut stats = PlayerStats {
        matches: Some(rng.gen_range(10..110)),
        ..PlayerStats::default()
    };
    if category.bats() {
        stats.runs = Some(rng.gen_range(200..3200));
        stats.average = Some(rng.gen_range(20u32..70) as f64);
        stats.strike_rate = Some(rng.gen_range(70u32..220) as f64);
    }
    if category.bowls() {
        stats.wickets = Some(rng.gen_range(5..155));
        let economy: f64 = rng.gen_range(4.0..8.0);
        stats.economy_rate = Some((economy * 100.0).round() / 100.0);
    }
    stats
}

// ---------------------------------------------------------------------------
// CSV players
// ---------------------------------------------------------------------------

/// One row of a player pool CSV. Stat columns may be blank.
#[derive(Debug, Deserialize)]
struct RawPlayerRow {
    id: String,
    name: String,
    category: String,
    country: String,
    base_price: u64,
    #[serde(default)]
    matches: Option<u32>,
    #[serde(default)]
    runs: Option<u32>,
    #[serde(default)]
    wickets: Option<u32>,
    #[serde(default)]
    average: Option<f64>,
    #[serde(default)]
    strike_rate: Option<f64>,
    #[serde(default)]
    economy_rate: Option<f64>,
}

fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut players = Vec::new();
    let mut seen = HashSet::new();

    for result in reader.deserialize::<RawPlayerRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
                continue;
            }
        };

        let Some(category) = PlayerCategory::from_label(&raw.category) else {
            warn!("skipping player '{}': unknown category '{}'", raw.name, raw.category);
            continue;
        };
        if raw.base_price == 0 {
            warn!("skipping player '{}': base price must be positive", raw.name);
            continue;
        }
        if !seen.insert(raw.id.clone()) {
            warn!("skipping duplicate player id '{}'", raw.id);
            continue;
        }

        let stats = PlayerStats {
            matches: raw.matches,
            runs: raw.runs,
            wickets: raw.wickets,
            average: raw.average,
            strike_rate: raw.strike_rate,
            economy_rate: raw.economy_rate,
        };
        players.push(
            Player::new(raw.id, raw.name, category, raw.country, raw.base_price).with_stats(stats),
        );
    }
    Ok(players)
}

/// Load a fixed player pool from a CSV file.
///
/// Expected header: `id,name,category,country,base_price` followed by the
/// optional stat columns `matches,runs,wickets,average,strike_rate,economy_rate`.
/// Bad rows are skipped with a warning; an empty result is an error.
pub fn load_players_csv(path: &Path) -> Result<Vec<Player>, FixtureError> {
    let file = std::fs::File::open(path).map_err(|e| FixtureError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let players = load_players_from_reader(file).map_err(|e| FixtureError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if players.is_empty() {
        return Err(FixtureError::Validation(format!(
            "no usable players in {}",
            path.display()
        )));
    }
    Ok(players)
}

// ---------------------------------------------------------------------------
// Session bootstrap
// ---------------------------------------------------------------------------

/// Build the starting session from config: a CSV pool when one is configured
/// (resolved against `base_dir`), otherwise a generated pool.
pub fn build_session(config: &Config, base_dir: &Path) -> Result<AuctionSession, FixtureError> {
    let players = match config.players.csv.as_deref() {
        Some(csv) => load_players_csv(&base_dir.join(csv))?,
        None => generate_players(config.players.count, config.players.seed),
    };
    let teams = default_teams(config.teams.starting_budget);
    info!(
        "Fixtures ready: {} players, {} teams",
        players.len(),
        teams.len()
    );
    Ok(AuctionSession::with_countdown(
        players,
        teams,
        config.auction.countdown_secs,
    ))
}
