// Application state and the main event loop.
//
// The loop owns the session and is the only thing that mutates it. Commands
// arrive from the front end, countdown ticks arrive from a spawned timer task,
// and every outcome is pushed back as a `UiUpdate`.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use gavel_core::auction::{AuctionSession, FinalizeOutcome};
use gavel_core::guard::{self, GuardError, GuardRules};
use gavel_core::query::{countries, filter_players};

use crate::protocol::{SessionSnapshot, UiUpdate, UserCommand, View};

/// Length of one countdown step.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A countdown step from the timer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownEvent {
    pub generation: u64,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub session: AuctionSession,
    pub rules: GuardRules,
    pub countdown_task: Option<JoinHandle<()>>,
    /// Identifies the countdown currently armed. Bumped on every arm and
    /// cancel; ticks carrying any other value are discarded in `handle_tick`.
    pub countdown_generation: u64,
    /// Cloned into each countdown task.
    pub tick_tx: mpsc::Sender<CountdownEvent>,
}

impl AppState {
    pub fn new(
        session: AuctionSession,
        rules: GuardRules,
        tick_tx: mpsc::Sender<CountdownEvent>,
    ) -> Self {
        AppState {
            session,
            rules,
            countdown_task: None,
            countdown_generation: 0,
            tick_tx,
        }
    }

    pub fn build_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.session, &self.rules)
    }

    /// Start a fresh one-second ticker, replacing any pending one.
    pub fn arm_countdown(&mut self) {
        self.cancel_countdown();
        let generation = self.countdown_generation;
        let tx = self.tick_tx.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(CountdownEvent { generation }).await.is_err() {
                    break;
                }
            }
        });

        self.countdown_task = Some(handle);
        debug!("Countdown armed (gen: {})", generation);
    }

    /// Stop the ticker. Ticks it already queued become stale.
    pub fn cancel_countdown(&mut self) {
        if let Some(handle) = self.countdown_task.take() {
            handle.abort();
            debug!("Countdown cancelled (gen: {})", self.countdown_generation);
        }
        self.countdown_generation += 1;
    }

    pub fn countdown_armed(&self) -> bool {
        self.countdown_task.is_some()
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on the command channel and the countdown channel with
/// `tokio::select!` until `Quit` arrives or the command channel closes.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut tick_rx: mpsc::Receiver<CountdownEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    send_snapshot(&state, &ui_tx).await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // AppState keeps a sender alive, so this never yields None.
            Some(event) = tick_rx.recv() => {
                handle_tick(&mut state, event, &ui_tx).await;
            }
        }
    }

    state.cancel_countdown();
    info!("Application event loop exiting");
    Ok(())
}

/// Apply one countdown step.
///
/// Ticks from a cancelled or replaced countdown are discarded, so a tick that
/// was already queued when a round closed can never reach the next round.
async fn handle_tick(
    state: &mut AppState,
    event: CountdownEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if event.generation != state.countdown_generation {
        debug!(
            "Discarding stale countdown tick (event gen: {}, current gen: {})",
            event.generation, state.countdown_generation
        );
        return;
    }

    match state.session.tick() {
        Some(outcome) => {
            state.cancel_countdown();
            send_lot_closed(state, outcome, ui_tx).await;
        }
        None => match state.session.auction().current_player_id.clone() {
            Some(player_id) => {
                let remaining = state.session.auction().time_remaining;
                let _ = ui_tx.send(UiUpdate::Tick { player_id, remaining }).await;
            }
            None => {
                // Armed with nothing live; nothing left to count.
                state.cancel_countdown();
            }
        },
    }
}

async fn send_lot_closed(
    state: &AppState,
    outcome: FinalizeOutcome,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let _ = ui_tx.send(UiUpdate::LotClosed(outcome)).await;
    send_snapshot(state, ui_tx).await;
}

async fn reject(ui_tx: &mpsc::Sender<UiUpdate>, err: GuardError) {
    warn!("Command rejected: {}", err);
    let _ = ui_tx.send(UiUpdate::Rejected(err.to_string())).await;
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let _ = ui_tx
        .send(UiUpdate::Snapshot(Box::new(state.build_snapshot())))
        .await;
}

/// Handle a command from the front end.
///
/// Every mutation goes through the entry guard first and the session second;
/// either refusal is reported as `UiUpdate::Rejected` with nothing changed.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::Login { email, role } => {
            state.session.login(&email, role);
            send_snapshot(state, ui_tx).await;
        }
        UserCommand::Logout => {
            state.session.logout();
            send_snapshot(state, ui_tx).await;
        }
        UserCommand::StartBidding { player_id } => {
            let result = guard::can_start_bidding(&state.session, &player_id)
                .and_then(|()| state.session.start_bidding(&player_id).map_err(GuardError::from));
            match result {
                Ok(()) => {
                    state.arm_countdown();
                    send_snapshot(state, ui_tx).await;
                }
                Err(e) => reject(ui_tx, e).await,
            }
        }
        UserCommand::PlaceBid { team_id, amount } => {
            let result = guard::can_place_bid(&state.session, &team_id, amount, &state.rules)
                .and_then(|()| state.session.place_bid(&team_id, amount).map_err(GuardError::from));
            match result {
                Ok(()) => {
                    // The clock went back to full; restart the ticker so the
                    // next step is a whole second away.
                    state.arm_countdown();
                    send_snapshot(state, ui_tx).await;
                }
                Err(e) => reject(ui_tx, e).await,
            }
        }
        UserCommand::Finalize => {
            if let Err(e) = guard::can_finalize(&state.session) {
                reject(ui_tx, e).await;
                return;
            }
            state.cancel_countdown();
            let outcome = state.session.finalize_bid();
            send_lot_closed(state, outcome, ui_tx).await;
        }
        UserCommand::Assign {
            player_id,
            team_id,
            amount,
        } => {
            let result =
                guard::can_assign(&state.session, &player_id, &team_id, amount, &state.rules)
                    .and_then(|()| {
                        state
                            .session
                            .assign_player_to_team(&player_id, &team_id, amount)
                            .map_err(GuardError::from)
                    });
            match result {
                Ok(()) => send_snapshot(state, ui_tx).await,
                Err(e) => reject(ui_tx, e).await,
            }
        }
        UserCommand::Complete => {
            let result = guard::can_complete(&state.session)
                .and_then(|()| state.session.complete_auction().map_err(GuardError::from));
            match result {
                Ok(()) => send_snapshot(state, ui_tx).await,
                Err(e) => reject(ui_tx, e).await,
            }
        }
        UserCommand::Show(view) => show(state, view, ui_tx).await,
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

async fn show(state: &AppState, view: View, ui_tx: &mpsc::Sender<UiUpdate>) {
    let session = &state.session;
    let update = match view {
        View::Players(filter) => UiUpdate::Players(
            filter_players(session.players(), &filter)
                .into_iter()
                .cloned()
                .collect(),
        ),
        View::Teams => UiUpdate::Teams(
            session
                .rosters()
                .iter()
                .map(|r| r.summary(state.rules.max_squad_size))
                .collect(),
        ),
        View::Roster { team_id } => match session.roster(&team_id) {
            Some(roster) => UiUpdate::Roster {
                summary: roster.summary(state.rules.max_squad_size),
                players: roster.players.iter().map(|p| (*p).clone()).collect(),
            },
            None => UiUpdate::Rejected(format!("team not found: {team_id}")),
        },
        View::State => UiUpdate::Snapshot(Box::new(state.build_snapshot())),
        View::History => UiUpdate::History(session.history().to_vec()),
        View::Countries => UiUpdate::Countries(
            countries(session.players())
                .into_iter()
                .map(str::to_string)
                .collect(),
        ),
    };
    let _ = ui_tx.send(update).await;
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
