// Line-oriented front end: turns typed lines into `UserCommand`s and
// `UiUpdate`s into printable text.

use thiserror::Error;

use gavel_core::auction::{AuctionStatus, FinalizeOutcome, LotOutcome, LotResult, RosterSummary};
use gavel_core::model::{Player, PlayerCategory, PlayerStatus, Role};
use gavel_core::money::{format_amount, parse_amount, AmountError};
use gavel_core::query::PlayerFilter;

use crate::protocol::{SessionSnapshot, UiUpdate, UserCommand, View};

pub const HELP: &str = "\
commands:
  login <email> <admin|user>       set the local user
  logout
  start <player-id>                put a player up for bidding (admin)
  bid <team-id> <amount>           bid on the live player (user)
  finalize                         close the live round now (admin)
  assign <player-id> <team-id> <amount>
                                   sell a player directly (admin)
  complete                         close the auction once the pool is empty (admin)
  players [status=.. category=.. country=..] [name]
  countries                        countries in the pool, for country=..
  teams
  roster <team-id>
  history
  state
  help
  quit
amounts: 2500000, 25L, 25 lakh, 2.5cr, 2.5 crore";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}`, type `help` for a list")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown role `{0}`, expected admin or user")]
    Role(String),

    #[error("unknown {key} `{value}`")]
    Filter { key: &'static str, value: String },

    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Parse one console line.
///
/// `help` is not a command; callers check for it before parsing.
pub fn parse_command(line: &str) -> Result<UserCommand, ParseError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(ParseError::Empty);
    };
    let args: Vec<&str> = words.collect();

    let cmd = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("login", [email, role]) => UserCommand::Login {
            email: email.to_string(),
            role: Role::from_label(role).ok_or_else(|| ParseError::Role(role.to_string()))?,
        },
        ("login", _) => return Err(ParseError::Usage("login <email> <admin|user>")),
        ("logout", []) => UserCommand::Logout,
        ("start", [player_id]) => UserCommand::StartBidding {
            player_id: player_id.to_string(),
        },
        ("start", _) => return Err(ParseError::Usage("start <player-id>")),
        ("bid", [team_id, amount @ ..]) if !amount.is_empty() => UserCommand::PlaceBid {
            team_id: team_id.to_string(),
            amount: parse_amount(&amount.join(" "))?,
        },
        ("bid", _) => return Err(ParseError::Usage("bid <team-id> <amount>")),
        ("finalize", []) => UserCommand::Finalize,
        ("assign", [player_id, team_id, amount @ ..]) if !amount.is_empty() => {
            UserCommand::Assign {
                player_id: player_id.to_string(),
                team_id: team_id.to_string(),
                amount: parse_amount(&amount.join(" "))?,
            }
        }
        ("assign", _) => {
            return Err(ParseError::Usage("assign <player-id> <team-id> <amount>"))
        }
        ("complete", []) => UserCommand::Complete,
        ("players", filters) => UserCommand::Show(View::Players(parse_filter(filters)?)),
        ("teams", []) => UserCommand::Show(View::Teams),
        ("roster", [team_id]) => UserCommand::Show(View::Roster {
            team_id: team_id.to_string(),
        }),
        ("roster", _) => return Err(ParseError::Usage("roster <team-id>")),
        ("history", []) => UserCommand::Show(View::History),
        ("countries", []) => UserCommand::Show(View::Countries),
        ("state", []) => UserCommand::Show(View::State),
        ("quit" | "exit", []) => UserCommand::Quit,
        (
            "logout" | "finalize" | "complete" | "teams" | "history" | "countries" | "state"
            | "quit" | "exit",
            _,
        ) => return Err(ParseError::Usage("this command takes no arguments")),
        (other, _) => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(cmd)
}

/// `key=value` words narrow by status, category or country (underscores in a
/// country stand for spaces); any other words form the name search.
fn parse_filter(words: &[&str]) -> Result<PlayerFilter, ParseError> {
    let mut filter = PlayerFilter::default();
    let mut search = Vec::new();

    for word in words {
        match word.split_once('=') {
            Some(("status", value)) => {
                filter.status = Some(PlayerStatus::from_label(value).ok_or_else(|| {
                    ParseError::Filter {
                        key: "status",
                        value: value.to_string(),
                    }
                })?);
            }
            Some(("category" | "type", value)) => {
                filter.category = Some(PlayerCategory::from_label(value).ok_or_else(|| {
                    ParseError::Filter {
                        key: "category",
                        value: value.to_string(),
                    }
                })?);
            }
            Some(("country", value)) => filter.country = Some(value.replace('_', " ")),
            _ => search.push(*word),
        }
    }
    filter.search = search.join(" ");
    Ok(filter)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(update: &UiUpdate) -> String {
    match update {
        UiUpdate::Snapshot(snapshot) => render_snapshot(snapshot),
        UiUpdate::Tick {
            player_id,
            remaining,
        } => format!("  {player_id}: {remaining}s left"),
        UiUpdate::LotClosed(outcome) => render_outcome(outcome),
        UiUpdate::Rejected(reason) => format!("rejected: {reason}"),
        UiUpdate::Players(players) => render_players(players),
        UiUpdate::Teams(teams) => teams
            .iter()
            .map(render_team_line)
            .collect::<Vec<_>>()
            .join("\n"),
        UiUpdate::Roster { summary, players } => {
            let mut out = render_team_line(summary);
            out.push_str(&format!(
                "\n  {} batsmen, {} bowlers, {} all-rounders, {} wicket-keepers",
                summary.batsmen, summary.bowlers, summary.all_rounders, summary.wicket_keepers
            ));
            if let Some(average) = summary.average_price {
                out.push_str(&format!("\n  average price {}", format_amount(average)));
            }
            for p in players {
                out.push_str(&format!(
                    "\n  {:<12} {:<28} {:<14} {:>12}",
                    p.id,
                    p.name,
                    p.category.label(),
                    format_amount(p.current_price)
                ));
            }
            out
        }
        UiUpdate::Countries(names) => names
            .iter()
            .map(|name| format!("{name}  (country={})", name.replace(' ', "_")))
            .collect::<Vec<_>>()
            .join("\n"),
        UiUpdate::History(lots) => {
            if lots.is_empty() {
                "no lots closed yet".to_string()
            } else {
                lots.iter().map(render_lot).collect::<Vec<_>>().join("\n")
            }
        }
    }
}

fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let auction = &snapshot.auction;
    let mut lines = Vec::new();

    match &snapshot.current_player {
        Some(player) if auction.is_live() => {
            let bidder = auction.current_bidder.as_deref().unwrap_or("no bids yet");
            lines.push(format!(
                "[LIVE] {} {} ({}, {}): {} by {}, {}s left",
                player.id,
                player.name,
                player.category,
                player.country,
                format_amount(auction.current_bid),
                bidder,
                auction.time_remaining
            ));
        }
        _ => lines.push(
            match auction.status {
                AuctionStatus::Completed => "[COMPLETED] the auction is closed",
                _ => "[UPCOMING] waiting for the next player",
            }
            .to_string(),
        ),
    }

    let c = &snapshot.counts;
    lines.push(format!(
        "pool: {} available, {} sold, {} unsold | lots closed: {}",
        c.available, c.sold, c.unsold, snapshot.lots_closed
    ));
    match &snapshot.current_user {
        Some(user) => lines.push(format!(
            "logged in: {} <{}> ({})",
            user.name, user.email, user.role
        )),
        None => lines.push("not logged in".to_string()),
    }
    lines.join("\n")
}

fn render_outcome(outcome: &FinalizeOutcome) -> String {
    match outcome {
        FinalizeOutcome::Idle => "no round was live".to_string(),
        FinalizeOutcome::Sold {
            player_id,
            team_id,
            price,
        } => format!("SOLD: {player_id} to {team_id} for {}", format_amount(*price)),
        FinalizeOutcome::Unsold { player_id } => format!("UNSOLD: {player_id}"),
    }
}

fn render_players(players: &[Player]) -> String {
    if players.is_empty() {
        return "no players match".to_string();
    }
    players
        .iter()
        .map(|p| {
            format!(
                "{:<12} {:<28} {:<14} {:<14} {:>12}  {}{}",
                p.id,
                p.name,
                p.category.label(),
                p.country,
                format_amount(p.current_price),
                p.status,
                p.team_id
                    .as_deref()
                    .map(|t| format!(" ({t})"))
                    .unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_team_line(t: &RosterSummary) -> String {
    format!(
        "{:<8} {:<30} {:>2}/{} players  purse {}  spent {}",
        t.team_id,
        t.team_name,
        t.size,
        t.max_size,
        format_amount(t.budget_remaining),
        format_amount(t.spent)
    )
}

fn render_lot(lot: &LotResult) -> String {
    let how = if lot.assigned { " (assigned)" } else { "" };
    match &lot.outcome {
        LotOutcome::Sold { team_id, price } => format!(
            "#{:<3} {} to {} for {}{}",
            lot.lot_number,
            lot.player_id,
            team_id,
            format_amount(*price),
            how
        ),
        LotOutcome::Unsold => format!("#{:<3} {} unsold", lot.lot_number, lot.player_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_commands() {
        assert_eq!(
            parse_command("login admin@league.test admin"),
            Ok(UserCommand::Login {
                email: "admin@league.test".into(),
                role: Role::Admin,
            })
        );
        assert_eq!(
            parse_command("  START player-7 "),
            Ok(UserCommand::StartBidding {
                player_id: "player-7".into()
            })
        );
        assert_eq!(parse_command("finalize"), Ok(UserCommand::Finalize));
        assert_eq!(parse_command("exit"), Ok(UserCommand::Quit));
    }

    #[test]
    fn parses_amounts_with_units() {
        assert_eq!(
            parse_command("bid team-3 2.5 cr"),
            Ok(UserCommand::PlaceBid {
                team_id: "team-3".into(),
                amount: 25_000_000,
            })
        );
        assert_eq!(
            parse_command("assign player-1 team-2 45L"),
            Ok(UserCommand::Assign {
                player_id: "player-1".into(),
                team_id: "team-2".into(),
                amount: 4_500_000,
            })
        );
        assert!(matches!(
            parse_command("bid team-3 lots"),
            Err(ParseError::Amount(_))
        ));
    }

    #[test]
    fn reports_usage_and_unknowns() {
        assert_eq!(parse_command("   "), Err(ParseError::Empty));
        assert_eq!(
            parse_command("bid team-1"),
            Err(ParseError::Usage("bid <team-id> <amount>"))
        );
        assert_eq!(
            parse_command("login someone@x.test superuser"),
            Err(ParseError::Role("superuser".into()))
        );
        assert_eq!(
            parse_command("dance"),
            Err(ParseError::UnknownCommand("dance".into()))
        );
        assert!(matches!(
            parse_command("finalize now"),
            Err(ParseError::Usage(_))
        ));
    }

    #[test]
    fn parses_player_filters() {
        let line = "players status=available category=all-rounder country=South_Africa de kock";
        let cmd = parse_command(line).unwrap();
        assert_eq!(
            cmd,
            UserCommand::Show(View::Players(PlayerFilter {
                search: "de kock".into(),
                category: Some(PlayerCategory::AllRounder),
                country: Some("South Africa".into()),
                status: Some(PlayerStatus::Available),
            }))
        );
        assert_eq!(
            parse_command("players"),
            Ok(UserCommand::Show(View::Players(PlayerFilter::default())))
        );
        assert!(matches!(
            parse_command("players status=retired"),
            Err(ParseError::Filter { key: "status", .. })
        ));
    }

    #[test]
    fn lists_countries_as_filter_values() {
        assert_eq!(
            parse_command("countries"),
            Ok(UserCommand::Show(View::Countries))
        );
        assert!(matches!(
            parse_command("countries india"),
            Err(ParseError::Usage(_))
        ));
        assert_eq!(
            render(&UiUpdate::Countries(vec![
                "India".into(),
                "South Africa".into()
            ])),
            "India  (country=India)\nSouth Africa  (country=South_Africa)"
        );
    }

    #[test]
    fn renders_lot_outcomes() {
        assert_eq!(
            render(&UiUpdate::LotClosed(FinalizeOutcome::Sold {
                player_id: "player-1".into(),
                team_id: "team-3".into(),
                price: 25_000_000,
            })),
            "SOLD: player-1 to team-3 for ₹2.50 Cr"
        );
        assert_eq!(
            render(&UiUpdate::LotClosed(FinalizeOutcome::Unsold {
                player_id: "player-2".into()
            })),
            "UNSOLD: player-2"
        );
        assert_eq!(
            render(&UiUpdate::Tick {
                player_id: "player-1".into(),
                remaining: 9
            }),
            "  player-1: 9s left"
        );
    }

    #[test]
    fn renders_empty_views() {
        assert_eq!(render(&UiUpdate::Players(vec![])), "no players match");
        assert_eq!(render(&UiUpdate::History(vec![])), "no lots closed yet");
    }
}
