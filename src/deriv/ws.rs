use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite;
use url::Url;

use crate::stream_client::{ConnId, StreamCommand, StreamEvent, TimerId};

#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

struct ConnectionHandle {
    conn: ConnId,
    outbound: mpsc::Sender<Outbound>,
}

/// Executes [`StreamCommand`]s: one WebSocket task per connection id and one
/// sleep task per reconnect timer. Results come back as [`StreamEvent`]s.
pub struct FeedDriver {
    url: Url,
    events: mpsc::Sender<StreamEvent>,
    current: Option<ConnectionHandle>,
    timers: HashMap<TimerId, JoinHandle<()>>,
}

impl FeedDriver {
    pub fn new(url: Url, events: mpsc::Sender<StreamEvent>) -> Self {
        Self {
            url,
            events,
            current: None,
            timers: HashMap::new(),
        }
    }

    pub fn execute_all(&mut self, commands: Vec<StreamCommand>) {
        for command in commands {
            self.execute(command);
        }
    }

    pub fn execute(&mut self, command: StreamCommand) {
        match command {
            StreamCommand::Open { conn } => {
                self.close_current();
                self.current = Some(spawn_connection(self.url.clone(), conn, self.events.clone()));
            }
            StreamCommand::Subscribe { conn, request } => {
                let Some(handle) = self.current.as_ref().filter(|h| h.conn == conn) else {
                    tracing::debug!(conn_id = conn, "Subscribe for a connection that is gone");
                    return;
                };
                match serde_json::to_string(&request) {
                    Ok(text) => {
                        if handle.outbound.try_send(Outbound::Text(text)).is_err() {
                            tracing::warn!(conn_id = conn, "Outbound queue full, subscribe dropped");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to encode subscribe request"),
                }
            }
            StreamCommand::Close { conn } => {
                if self.current.as_ref().is_some_and(|h| h.conn == conn) {
                    self.close_current();
                }
            }
            StreamCommand::ScheduleReconnect { timer, delay_ms } => {
                self.timers.retain(|_, handle| !handle.is_finished());
                let events = self.events.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    let _ = events.send(StreamEvent::ReconnectDue { timer }).await;
                });
                if let Some(previous) = self.timers.insert(timer, handle) {
                    previous.abort();
                }
            }
            StreamCommand::CancelReconnect { timer } => {
                if let Some(handle) = self.timers.remove(&timer) {
                    handle.abort();
                }
            }
        }
    }

    /// Pending reconnect timers that have not fired or been cancelled.
    pub fn pending_timers(&self) -> usize {
        self.timers.values().filter(|h| !h.is_finished()).count()
    }

    pub fn shutdown(&mut self) {
        self.close_current();
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }

    fn close_current(&mut self) {
        if let Some(handle) = self.current.take() {
            let _ = handle.outbound.try_send(Outbound::Close);
        }
    }
}

fn spawn_connection(url: Url, conn: ConnId, events: mpsc::Sender<StreamEvent>) -> ConnectionHandle {
    let (outbound_tx, outbound_rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let reason = match connect_once(&url, conn, outbound_rx, &events).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(conn_id = conn, error = %e, "WS connection ended with error");
                Some(format!("{:#}", e))
            }
        };
        let _ = events.send(StreamEvent::Closed { conn, reason }).await;
    });
    ConnectionHandle {
        conn,
        outbound: outbound_tx,
    }
}

async fn connect_once(
    url: &Url,
    conn: ConnId,
    mut outbound: mpsc::Receiver<Outbound>,
    events: &mpsc::Sender<StreamEvent>,
) -> Result<()> {
    tracing::debug!(conn_id = conn, url = %url, "Opening WebSocket");
    let (ws_stream, _resp) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .context("WebSocket connect failed")?;

    events
        .send(StreamEvent::Opened { conn })
        .await
        .context("controller is gone")?;

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        events
                            .send(StreamEvent::MessageReceived { conn, text })
                            .await
                            .context("controller is gone")?;
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        tracing::info!(conn_id = conn, frame = ?frame, "Server closed WebSocket");
                        return Ok(());
                    }
                    Some(Ok(_)) => {
                        // Ping/pong are answered by tungstenite; binary frames are not used.
                    }
                    Some(Err(e)) => {
                        return Err(anyhow::anyhow!("WebSocket read error: {}", e));
                    }
                    None => {
                        return Err(anyhow::anyhow!("WebSocket stream ended"));
                    }
                }
            }
            out = outbound.recv() => {
                match out {
                    Some(Outbound::Text(text)) => {
                        write
                            .send(tungstenite::Message::Text(text))
                            .await
                            .context("WebSocket send failed")?;
                    }
                    Some(Outbound::Close) | None => {
                        let _ = write.send(tungstenite::Message::Close(None)).await;
                        return Ok(());
                    }
                }
            }
        }
    }
}
