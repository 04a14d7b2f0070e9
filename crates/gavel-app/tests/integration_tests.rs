// Integration tests for the gavel event loop.
//
// These drive `app::run` through its channels the way the console does, with
// tokio's clock paused so countdowns expire instantly and deterministically.

use std::path::Path;
use std::time::Duration;

use gavel_app::app::{self, AppState};
use gavel_app::console;
use gavel_app::protocol::*;
use gavel_core::auction::{AuctionSession, AuctionStatus, FinalizeOutcome, LotOutcome};
use gavel_core::config::{self, Config};
use gavel_core::fixtures;
use gavel_core::guard::GuardRules;
use gavel_core::model::{Player, PlayerCategory, PlayerStatus};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ===========================================================================
// Test helpers
// ===========================================================================

struct Harness {
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    async fn start(session: AuctionSession) -> Harness {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (tick_tx, tick_rx) = mpsc::channel(16);
        let (ui_tx, mut ui_rx) = mpsc::channel(256);

        let state = AppState::new(session, GuardRules::default(), tick_tx);
        let handle = tokio::spawn(app::run(cmd_rx, tick_rx, ui_tx, state));

        // The loop announces itself with a snapshot.
        match ui_rx.recv().await {
            Some(UiUpdate::Snapshot(_)) => {}
            other => panic!("expected initial snapshot, got {other:?}"),
        }
        Harness {
            cmd_tx,
            ui_rx,
            handle,
        }
    }

    /// Send a console line and return the first update that is not a tick.
    async fn line(&mut self, line: &str) -> UiUpdate {
        let cmd = console::parse_command(line).expect("test command should parse");
        self.cmd_tx.send(cmd).await.unwrap();
        self.next_non_tick().await
    }

    async fn next_non_tick(&mut self) -> UiUpdate {
        loop {
            match self.ui_rx.recv().await.expect("event loop ended early") {
                UiUpdate::Tick { .. } => continue,
                other => return other,
            }
        }
    }

    /// Collect tick values until the lot closes.
    async fn run_out_clock(&mut self) -> (Vec<(String, u32)>, FinalizeOutcome) {
        let mut ticks = Vec::new();
        loop {
            match self.ui_rx.recv().await.expect("event loop ended early") {
                UiUpdate::Tick {
                    player_id,
                    remaining,
                } => ticks.push((player_id, remaining)),
                UiUpdate::LotClosed(outcome) => return (ticks, outcome),
                other => panic!("unexpected update while counting down: {other:?}"),
            }
        }
    }

    async fn snapshot(&mut self) -> SessionSnapshot {
        match self.line("state").await {
            UiUpdate::Snapshot(s) => *s,
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    async fn quit(self) {
        self.cmd_tx.send(UserCommand::Quit).await.unwrap();
        let result = self.handle.await.unwrap();
        assert!(result.is_ok());
    }
}

fn small_session(countdown_secs: u32) -> AuctionSession {
    let players = vec![
        Player::new("player-1", "Virat Kohli", PlayerCategory::Batsman, "India", 2_000_000),
        Player::new("player-2", "Rashid Khan", PlayerCategory::Bowler, "Afghanistan", 5_000_000),
        Player::new("player-3", "Ben Stokes", PlayerCategory::AllRounder, "England", 20_000_000),
    ];
    AuctionSession::with_countdown(players, fixtures::default_teams(850_000_000), countdown_secs)
}

fn expect_snapshot(update: UiUpdate) -> SessionSnapshot {
    match update {
        UiUpdate::Snapshot(s) => *s,
        other => panic!("expected snapshot, got {other:?}"),
    }
}

// ===========================================================================
// Countdown
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn countdown_expiry_sells_to_high_bidder() {
    let mut h = Harness::start(small_session(3)).await;

    h.line("login admin@league.test admin").await;
    let snap = expect_snapshot(h.line("start player-1").await);
    assert_eq!(snap.auction.status, AuctionStatus::Live);
    assert_eq!(snap.auction.time_remaining, 3);

    h.line("login owner@league.test user").await;
    let snap = expect_snapshot(h.line("bid team-3 21L").await);
    assert_eq!(snap.auction.current_bid, 2_100_000);
    assert_eq!(snap.auction.current_bidder.as_deref(), Some("team-3"));

    let (ticks, outcome) = h.run_out_clock().await;
    assert_eq!(
        ticks,
        vec![("player-1".to_string(), 2), ("player-1".to_string(), 1)]
    );
    assert_eq!(
        outcome,
        FinalizeOutcome::Sold {
            player_id: "player-1".into(),
            team_id: "team-3".into(),
            price: 2_100_000,
        }
    );

    let snap = expect_snapshot(h.next_non_tick().await);
    assert!(!snap.auction.is_live());
    assert_eq!(snap.auction.time_remaining, 3);
    assert_eq!(snap.counts.sold, 1);
    let team3 = snap.teams.iter().find(|t| t.team_id == "team-3").unwrap();
    assert_eq!(team3.budget_remaining, 850_000_000 - 2_100_000);
    assert_eq!(team3.size, 1);

    h.quit().await;
}

#[tokio::test(start_paused = true)]
async fn countdown_without_bids_goes_unsold() {
    let mut h = Harness::start(small_session(2)).await;
    h.line("login admin@league.test admin").await;
    h.line("start player-2").await;

    let (ticks, outcome) = h.run_out_clock().await;
    assert_eq!(ticks.len(), 1);
    assert_eq!(
        outcome,
        FinalizeOutcome::Unsold {
            player_id: "player-2".into()
        }
    );
    h.next_non_tick().await;

    match h.line("countries").await {
        UiUpdate::Countries(names) => assert_eq!(names, vec!["India", "Afghanistan", "England"]),
        other => panic!("expected countries, got {other:?}"),
    }

    match h.line("players status=unsold").await {
        UiUpdate::Players(players) => {
            assert_eq!(players.len(), 1);
            assert_eq!(players[0].id, "player-2");
        }
        other => panic!("expected players, got {other:?}"),
    }

    // Unsold players cannot be put up again.
    assert!(matches!(h.line("start player-2").await, UiUpdate::Rejected(_)));
    h.quit().await;
}

#[tokio::test(start_paused = true)]
async fn bid_puts_full_time_back_on_the_clock() {
    let mut h = Harness::start(small_session(5)).await;
    h.line("login admin@league.test admin").await;
    h.line("start player-1").await;

    // Let three seconds run off.
    for expected in [4, 3, 2] {
        match h.ui_rx.recv().await.unwrap() {
            UiUpdate::Tick { remaining, .. } => assert_eq!(remaining, expected),
            other => panic!("expected tick, got {other:?}"),
        }
    }

    h.line("login owner@league.test user").await;
    let snap = expect_snapshot(h.line("bid team-1 2100000").await);
    assert_eq!(snap.auction.time_remaining, 5);

    let (ticks, outcome) = h.run_out_clock().await;
    let remaining: Vec<u32> = ticks.iter().map(|(_, r)| *r).collect();
    assert_eq!(remaining, vec![4, 3, 2, 1]);
    assert!(matches!(outcome, FinalizeOutcome::Sold { .. }));
    h.quit().await;
}

#[tokio::test(start_paused = true)]
async fn starting_mid_round_is_refused_and_the_bid_stands() {
    let mut h = Harness::start(small_session(30)).await;
    h.line("login admin@league.test admin").await;
    h.line("start player-1").await;
    h.line("login owner@league.test user").await;
    h.line("bid team-2 21L").await;

    h.line("login admin@league.test admin").await;
    match h.line("start player-3").await {
        UiUpdate::Rejected(msg) => assert!(msg.contains("player-1"), "{msg}"),
        other => panic!("expected rejection, got {other:?}"),
    }

    let snap = h.snapshot().await;
    assert_eq!(snap.auction.current_player_id.as_deref(), Some("player-1"));
    assert_eq!(snap.auction.current_bid, 2_100_000);
    assert_eq!(snap.auction.current_bidder.as_deref(), Some("team-2"));

    match h.line("finalize").await {
        UiUpdate::LotClosed(outcome) => assert_eq!(
            outcome,
            FinalizeOutcome::Sold {
                player_id: "player-1".into(),
                team_id: "team-2".into(),
                price: 2_100_000,
            }
        ),
        other => panic!("expected lot closed, got {other:?}"),
    }
    expect_snapshot(h.next_non_tick().await);

    // With the floor clear the next round opens on a fresh clock.
    let snap = expect_snapshot(h.line("start player-3").await);
    assert_eq!(snap.auction.time_remaining, 30);
    let (ticks, outcome) = h.run_out_clock().await;
    assert!(ticks.iter().all(|(id, _)| id == "player-3"), "{ticks:?}");
    assert_eq!(ticks.len(), 29);
    assert_eq!(outcome.player_id(), Some("player-3"));
    h.quit().await;
}

#[tokio::test(start_paused = true)]
async fn manual_finalize_silences_the_clock() {
    let mut h = Harness::start(small_session(30)).await;
    h.line("login admin@league.test admin").await;
    h.line("start player-1").await;

    match h.line("finalize").await {
        UiUpdate::LotClosed(FinalizeOutcome::Unsold { player_id }) => {
            assert_eq!(player_id, "player-1")
        }
        other => panic!("expected lot closed, got {other:?}"),
    }
    expect_snapshot(h.next_non_tick().await);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(h.ui_rx.try_recv().is_err(), "no ticks after finalize");

    // Finalizing again is refused, not repeated.
    assert!(matches!(h.line("finalize").await, UiUpdate::Rejected(_)));
    h.quit().await;
}

// ===========================================================================
// Guarded commands
// ===========================================================================

#[tokio::test]
async fn guard_refusals_leave_session_untouched() {
    let mut h = Harness::start(small_session(30)).await;

    assert_eq!(
        h.line("start player-1").await,
        UiUpdate::Rejected("please login to participate in the auction".into())
    );

    h.line("login owner@league.test user").await;
    match h.line("start player-1").await {
        UiUpdate::Rejected(msg) => assert!(msg.contains("admin"), "{msg}"),
        other => panic!("expected rejection, got {other:?}"),
    }

    h.line("login admin@league.test admin").await;
    h.line("start player-1").await;
    h.line("login owner@league.test user").await;
    let before = h.snapshot().await;

    // Not above the current bid plus increment.
    match h.line("bid team-1 20L").await {
        UiUpdate::Rejected(msg) => assert_eq!(
            msg,
            "bid must be at least ₹21.0 L, the current bid is ₹20.0 L"
        ),
        other => panic!("expected rejection, got {other:?}"),
    }
    // Beyond the purse.
    assert!(matches!(h.line("bid team-1 90cr").await, UiUpdate::Rejected(_)));
    // No such team.
    assert!(matches!(h.line("bid team-99 1cr").await, UiUpdate::Rejected(_)));

    let after = h.snapshot().await;
    assert_eq!(after.auction.current_bid, before.auction.current_bid);
    assert_eq!(after.auction.current_bidder, None);
    assert_eq!(after.teams, before.teams);

    h.quit().await;
}

#[tokio::test]
async fn assign_and_complete_the_auction() {
    let mut h = Harness::start(small_session(30)).await;
    h.line("login admin@league.test admin").await;

    assert!(matches!(h.line("complete").await, UiUpdate::Rejected(_)));

    h.line("assign player-1 team-1 2cr").await;
    h.line("assign player-2 team-1 50L").await;
    h.line("assign player-3 team-2 2.25cr").await;
    assert!(matches!(
        h.line("assign player-3 team-1 3cr").await,
        UiUpdate::Rejected(_)
    ));

    match h.line("roster team-1").await {
        UiUpdate::Roster { summary, players } => {
            assert_eq!(summary.size, 2);
            assert_eq!(summary.spent, 25_000_000);
            assert_eq!(summary.budget_remaining, 825_000_000);
            assert_eq!(summary.batsmen, 1);
            assert_eq!(summary.bowlers, 1);
            assert_eq!(summary.average_price, Some(12_500_000));
            assert_eq!(players.len(), 2);
        }
        other => panic!("expected roster, got {other:?}"),
    }

    match h.line("history").await {
        UiUpdate::History(lots) => {
            assert_eq!(lots.len(), 3);
            assert!(lots.iter().all(|l| l.assigned));
            assert_eq!(
                lots[2].outcome,
                LotOutcome::Sold {
                    team_id: "team-2".into(),
                    price: 22_500_000
                }
            );
        }
        other => panic!("expected history, got {other:?}"),
    }

    let snap = expect_snapshot(h.line("complete").await);
    assert_eq!(snap.auction.status, AuctionStatus::Completed);
    h.quit().await;
}

#[tokio::test]
async fn closing_the_command_channel_stops_the_loop() {
    let h = Harness::start(small_session(30)).await;
    drop(h.cmd_tx);
    let result = h.handle.await.unwrap();
    assert!(result.is_ok());
}

// ===========================================================================
// Startup plumbing
// ===========================================================================

#[test]
fn bundled_defaults_load_and_validate() {
    let tmp = std::env::temp_dir().join("gavel_app_bundled_defaults");
    let _ = std::fs::remove_dir_all(&tmp);
    std::fs::create_dir_all(tmp.join("defaults")).unwrap();
    std::fs::copy(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("defaults/auction.toml"),
        tmp.join("defaults/auction.toml"),
    )
    .unwrap();

    let config = config::load_config(&tmp).expect("bundled defaults should load");
    assert_eq!(config.auction.countdown_secs, 30);
    assert_eq!(config.rules(), GuardRules::default());
    assert_eq!(config.teams.starting_budget, 850_000_000);
    assert!(tmp.join("config/auction.toml").exists());

    let _ = std::fs::remove_dir_all(&tmp);
}

#[tokio::test(start_paused = true)]
async fn csv_pool_runs_a_full_round() {
    let mut config = Config::default();
    config.players.csv = Some("tests/fixtures/players.csv".into());
    config.auction.countdown_secs = 2;
    let session =
        fixtures::build_session(&config, Path::new(env!("CARGO_MANIFEST_DIR"))).unwrap();
    let first = session.players()[0].clone();

    let mut h = Harness::start(session).await;
    h.line("login admin@league.test admin").await;
    h.line(&format!("start {}", first.id)).await;
    h.line("login owner@league.test user").await;
    h.line(&format!("bid team-5 {}", first.base_price + 500_000)).await;

    let (_, outcome) = h.run_out_clock().await;
    assert_eq!(
        outcome,
        FinalizeOutcome::Sold {
            player_id: first.id.clone(),
            team_id: "team-5".into(),
            price: first.base_price + 500_000,
        }
    );
    h.next_non_tick().await;

    match h.line(&format!("players status=sold {}", first.name)).await {
        UiUpdate::Players(players) => {
            assert_eq!(players.len(), 1);
            assert_eq!(players[0].status, PlayerStatus::Sold);
            assert_eq!(players[0].team_id.as_deref(), Some("team-5"));
        }
        other => panic!("expected players, got {other:?}"),
    }
    h.quit().await;
}
