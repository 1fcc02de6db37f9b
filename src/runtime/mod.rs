use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};

use crate::controller::Controller;
use crate::deriv::ws::FeedDriver;
use crate::event::ControllerEvent;
use crate::input::UiCommand;
use crate::stream_client::StreamEvent;

const COUNTDOWN_TICK_MS: u64 = 1_000;

pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Drive the controller from a single task. Every suspension point (feed
/// event, prediction timer, countdown timer, UI command) yields one
/// [`ControllerEvent`] that is handled to completion before the next
/// `select!`.
pub async fn run_controller(
    mut controller: Controller,
    mut driver: FeedDriver,
    mut stream_rx: mpsc::Receiver<StreamEvent>,
    mut command_rx: mpsc::Receiver<UiCommand>,
    prediction_interval_ms: u64,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    driver.execute_all(controller.start(now_ms()));

    let period = Duration::from_millis(prediction_interval_ms.max(1));
    let mut prediction_timer = tokio::time::interval_at(Instant::now() + period, period);
    prediction_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut countdown_timer = tokio::time::interval(Duration::from_millis(COUNTDOWN_TICK_MS));
    countdown_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let event = tokio::select! {
            Some(stream_event) = stream_rx.recv() => ControllerEvent::Stream(stream_event),
            _ = prediction_timer.tick() => ControllerEvent::PredictionDue,
            _ = countdown_timer.tick() => ControllerEvent::CountdownTick,
            Some(command) = command_rx.recv() => ControllerEvent::Command(command),
            _ = shutdown.changed() => {
                tracing::info!("Controller task shutting down");
                break;
            }
        };
        let commands = controller.handle(event, now_ms());
        driver.execute_all(commands);
    }

    driver.shutdown();
    Ok(())
}
