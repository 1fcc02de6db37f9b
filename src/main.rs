use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyEventKind};
use tokio::sync::{mpsc, watch};

use digit_oracle::config::Config;
use digit_oracle::controller::{Controller, ControllerSettings};
use digit_oracle::deriv::ws::FeedDriver;
use digit_oracle::input::{parse_main_command, UiCommand};
use digit_oracle::runtime::{now_ms, run_controller};
use digit_oracle::snapshot::{BellNotifier, Snapshot, WatchRenderer};
use digit_oracle::stats_store::{KeyValueStore, MemoryStore, SqliteStore, StatsStore};
use digit_oracle::stream_client::StreamEvent;
use digit_oracle::ui;

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required by rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Set DIGIT_ORACLE_CONFIG or create config/default.toml");
            std::process::exit(1);
        }
    };

    // Log to file so it doesn't interfere with the TUI
    let log_file = std::fs::File::create("digit-oracle.log")?;
    let fallback_level = config.logging.level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&fallback_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    let endpoint = config.feed.endpoint_url()?;
    tracing::info!(
        symbol = %config.feed.symbol,
        ws_url = %endpoint,
        "Starting digit-oracle"
    );

    let backend: Box<dyn KeyValueStore> = match SqliteStore::open(&config.storage.path) {
        Ok(store) => {
            tracing::info!(path = %store.path().display(), "Stats database opened");
            Box::new(store)
        }
        Err(e) => {
            tracing::warn!(
                path = %config.storage.path.display(),
                error = %e,
                "Stats database unavailable, keeping stats in memory"
            );
            Box::new(MemoryStore::new())
        }
    };
    let store = StatsStore::new(backend, &config.storage.key);

    let settings = ControllerSettings::from(&config);
    let (stream_tx, stream_rx) = mpsc::channel::<StreamEvent>(256);
    let (command_tx, command_rx) = mpsc::channel::<UiCommand>(16);
    let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::empty(&settings.symbol));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let controller = Controller::new(
        settings,
        store,
        Box::new(WatchRenderer::new(snapshot_tx)),
        Box::new(BellNotifier),
        now_ms(),
    );
    let driver = FeedDriver::new(endpoint, stream_tx);
    let controller_task = tokio::spawn(run_controller(
        controller,
        driver,
        stream_rx,
        command_rx,
        config.predictor.interval_ms,
        shutdown_rx.clone(),
    ));

    // Ctrl+C handler
    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    // TUI main loop
    let mut terminal = ratatui::init();
    let ui_result = run_ui(
        &mut terminal,
        &config,
        &snapshot_rx,
        &command_tx,
        &shutdown_tx,
        &shutdown_rx,
    );
    ratatui::restore();

    let _ = shutdown_tx.send(true);
    match controller_task.await {
        Ok(Err(e)) => tracing::warn!(error = %e, "Controller task failed"),
        Err(e) => tracing::warn!(error = %e, "Controller task panicked"),
        Ok(Ok(())) => {}
    }

    ui_result?;
    tracing::info!("Shutdown complete");
    println!("Goodbye! Check digit-oracle.log for details.");
    Ok(())
}

fn run_ui(
    terminal: &mut ratatui::DefaultTerminal,
    config: &Config,
    snapshot_rx: &watch::Receiver<Snapshot>,
    command_tx: &mpsc::Sender<UiCommand>,
    shutdown_tx: &watch::Sender<bool>,
    shutdown_rx: &watch::Receiver<bool>,
) -> Result<()> {
    loop {
        let snapshot = snapshot_rx.borrow().clone();
        terminal.draw(|frame| ui::render(frame, &snapshot))?;

        // Handle input (non-blocking with timeout)
        if crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms))? {
            if let Event::Key(key) = crossterm::event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match parse_main_command(&key.code) {
                    Some(UiCommand::Quit) => {
                        tracing::info!("User quit");
                        let _ = shutdown_tx.send(true);
                        break;
                    }
                    Some(command) => {
                        if command_tx.try_send(command).is_err() {
                            tracing::warn!("Command queue full, key press dropped");
                        }
                    }
                    None => {}
                }
            }
        }

        if *shutdown_rx.borrow() {
            break;
        }
    }
    Ok(())
}
