// Gavel entry point.
//
// Startup sequence:
// 1. Resolve the base directory and load config (seeded from defaults/)
// 2. Initialize tracing (log to file, not the terminal, which is the console)
// 3. Build the session from fixtures
// 4. Create mpsc channels
// 5. Spawn the app logic task and the output printer
// 6. Read console lines until `quit` or EOF
// 7. Cleanup on exit

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

use gavel_app::app::{self, AppState};
use gavel_app::console::{self, ParseError};
use gavel_app::protocol::{UiUpdate, UserCommand};
use gavel_core::config::{self, LoggingConfig};
use gavel_core::fixtures;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let json = std::env::args().skip(1).any(|a| a == "--json");

    // 1. Load config
    let base_dir = resolve_base_dir()?;
    let config = config::load_config(&base_dir).context("failed to load configuration")?;

    // 2. Initialize tracing
    init_tracing(&base_dir, &config.logging)?;
    info!("Gavel starting up in {}", base_dir.display());
    info!(
        "Config loaded: {}s countdown, min increment {}, squads of {}",
        config.auction.countdown_secs, config.auction.min_increment, config.auction.max_squad_size
    );

    // 3. Build the session
    let session =
        fixtures::build_session(&config, &base_dir).context("failed to load players")?;

    // 4. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (tick_tx, tick_rx) = mpsc::channel(64);
    let (ui_tx, mut ui_rx) = mpsc::channel::<UiUpdate>(256);

    let state = AppState::new(session, config.rules(), tick_tx);

    // 5. Spawn app logic and output tasks
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, tick_rx, ui_tx, state).await {
            error!("Application loop error: {}", e);
        }
    });

    let printer_handle = tokio::spawn(async move {
        while let Some(update) = ui_rx.recv().await {
            match (&update, json) {
                (UiUpdate::Snapshot(snapshot), true) => match serde_json::to_string(snapshot) {
                    Ok(text) => println!("{text}"),
                    Err(e) => error!("Failed to serialize snapshot: {}", e),
                },
                _ => println!("{}", console::render(&update)),
            }
        }
    });

    println!("gavel: type `help` for commands");

    // 6. Console loop
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().eq_ignore_ascii_case("help") {
            println!("{}", console::HELP);
            continue;
        }
        match console::parse_command(&line) {
            Ok(cmd) => {
                let quit = cmd == UserCommand::Quit;
                if cmd_tx.send(cmd).await.is_err() || quit {
                    break;
                }
            }
            Err(ParseError::Empty) => {}
            Err(e) => println!("{e}"),
        }
    }

    // 7. Cleanup: stop the app task (no-op if it already quit) and drain output
    let _ = cmd_tx.send(UserCommand::Quit).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = app_handle.await;
        let _ = printer_handle.await;
    })
    .await;

    info!("Gavel shut down cleanly");
    Ok(())
}

/// The working directory if it holds `config/` or `defaults/`, otherwise the
/// package directory this binary was built from.
fn resolve_base_dir() -> anyhow::Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    if cwd.join("config").is_dir() || cwd.join("defaults").is_dir() {
        return Ok(cwd);
    }
    Ok(PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}

/// Initialize tracing to log to a file (not the terminal, which is used by the console).
fn init_tracing(base_dir: &Path, logging: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join(&logging.dir);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_file = std::fs::File::create(log_dir.join("gavel.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
