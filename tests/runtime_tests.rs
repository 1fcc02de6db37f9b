use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use url::Url;

use digit_oracle::controller::{Controller, ControllerSettings};
use digit_oracle::deriv::ws::FeedDriver;
use digit_oracle::input::UiCommand;
use digit_oracle::runtime::{now_ms, run_controller};
use digit_oracle::snapshot::{NoopNotifier, Snapshot, WatchRenderer};
use digit_oracle::stats_store::{MemoryStore, StatsStore};

#[tokio::test]
/// The controller task applies UI commands, publishes snapshots and exits
/// cleanly on shutdown even while the feed is unreachable.
async fn controller_task_applies_commands_until_shutdown() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let url = Url::parse(&format!("ws://{}", addr)).unwrap();

    let settings = ControllerSettings::default();
    let (snapshot_tx, mut snapshot_rx) = watch::channel(Snapshot::empty(&settings.symbol));
    let controller = Controller::new(
        settings,
        StatsStore::new(Box::new(MemoryStore::new()), "stats"),
        Box::new(WatchRenderer::new(snapshot_tx)),
        Box::new(NoopNotifier),
        now_ms(),
    );
    let (stream_tx, stream_rx) = mpsc::channel(64);
    let (command_tx, command_rx) = mpsc::channel(8);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let driver = FeedDriver::new(url, stream_tx);

    let task = tokio::spawn(run_controller(
        controller,
        driver,
        stream_rx,
        command_rx,
        15_000,
        shutdown_rx,
    ));

    command_tx
        .send(UiCommand::SwitchSymbol("R_25".to_string()))
        .await
        .unwrap();
    command_tx.send(UiCommand::SetLive(false)).await.unwrap();

    let published = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            snapshot_rx.changed().await.unwrap();
            let snapshot = snapshot_rx.borrow_and_update().clone();
            if snapshot.symbol == "R_25" && !snapshot.live {
                return snapshot;
            }
        }
    })
    .await
    .expect("snapshot with applied commands");
    assert_eq!(published.history_len, 0);

    shutdown_tx.send(true).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("controller task should stop")
        .expect("controller task should not panic");
    assert!(result.is_ok());
}
