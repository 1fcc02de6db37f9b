//! Feed subscription state machine.
//!
//! The client performs no I/O. It consumes [`StreamEvent`]s reported by the
//! WebSocket driver and queues [`StreamCommand`]s for the driver to execute.
//!
//! | state          | input                      | next state     | commands                    |
//! |----------------|----------------------------|----------------|-----------------------------|
//! | Disconnected   | connect                    | Connecting     | Open                        |
//! | RetryPending   | connect / ReconnectDue     | Connecting     | CancelReconnect?, Open      |
//! | Connecting     | Opened                     | Subscribed     | Subscribe                   |
//! | Connecting     | Closed (live)              | RetryPending   | ScheduleReconnect           |
//! | Subscribed     | Closed (live)              | RetryPending   | ScheduleReconnect           |
//! | Connecting/Sub | Closed (not live)          | Disconnected   |                             |
//! | any            | set_live(false)            | Disconnected   | CancelReconnect?, Close?    |
//! | any            | switch_symbol (live)       | Connecting     | CancelReconnect?, Close?, Open |
//!
//! Events carrying a connection or timer id other than the current one are
//! stale and ignored.

use crate::deriv::types::SubscribeRequest;
use crate::symbol_catalog::normalize_symbol;

pub const RECONNECT_DELAY_MS: u64 = 3_000;

pub type ConnId = u64;
pub type TimerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Subscribed,
    RetryPending { due_at_ms: u64 },
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Subscribed => "Connected",
            Self::RetryPending { .. } => "Reconnecting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Opened { conn: ConnId },
    Closed { conn: ConnId, reason: Option<String> },
    MessageReceived { conn: ConnId, text: String },
    ReconnectDue { timer: TimerId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamCommand {
    Open { conn: ConnId },
    Subscribe { conn: ConnId, request: SubscribeRequest },
    Close { conn: ConnId },
    ScheduleReconnect { timer: TimerId, delay_ms: u64 },
    CancelReconnect { timer: TimerId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingReconnect {
    timer: TimerId,
    due_at_ms: u64,
}

#[derive(Debug)]
pub struct StreamClient {
    symbol: String,
    live: bool,
    state: ConnectionState,
    conn: Option<ConnId>,
    reconnect: Option<PendingReconnect>,
    reconnect_delay_ms: u64,
    reconnect_count: u32,
    next_id: u64,
    outbox: Vec<StreamCommand>,
}

impl StreamClient {
    pub fn new(symbol: &str, reconnect_delay_ms: u64) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            live: true,
            state: ConnectionState::Disconnected,
            conn: None,
            reconnect: None,
            reconnect_delay_ms,
            reconnect_count: 0,
            next_id: 1,
            outbox: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn connection_id(&self) -> Option<ConnId> {
        self.conn
    }

    pub fn reconnect_due_at_ms(&self) -> Option<u64> {
        self.reconnect.map(|r| r.due_at_ms)
    }

    /// Reconnects scheduled since start.
    pub fn reconnect_count(&self) -> u32 {
        self.reconnect_count
    }

    /// Drain the commands queued since the last call, in issue order.
    pub fn take_commands(&mut self) -> Vec<StreamCommand> {
        std::mem::take(&mut self.outbox)
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Open a connection for the current symbol. No-op while one is open or opening.
    pub fn connect(&mut self) {
        if self.conn.is_some() {
            return;
        }
        self.cancel_reconnect();
        let conn = self.alloc_id();
        self.conn = Some(conn);
        self.state = ConnectionState::Connecting;
        tracing::info!(symbol = %self.symbol, conn_id = conn, "Connecting to tick feed");
        self.outbox.push(StreamCommand::Open { conn });
    }

    /// Move the subscription to `symbol`. The caller clears its tick history.
    /// While live mode is off only the symbol changes.
    pub fn switch_symbol(&mut self, symbol: &str) {
        self.cancel_reconnect();
        self.close_current();
        self.symbol = normalize_symbol(symbol);
        self.state = ConnectionState::Disconnected;
        tracing::info!(symbol = %self.symbol, live = self.live, "Switched feed symbol");
        if self.live {
            self.connect();
        }
    }

    pub fn set_live(&mut self, enabled: bool) {
        self.live = enabled;
        if enabled {
            self.connect();
        } else {
            self.cancel_reconnect();
            self.close_current();
            self.state = ConnectionState::Disconnected;
            tracing::info!(symbol = %self.symbol, "Live mode disabled");
        }
    }

    /// Apply a driver event. Returns the frame text when it belongs to the
    /// current subscription.
    pub fn on_event(&mut self, event: StreamEvent, now_ms: u64) -> Option<String> {
        match event {
            StreamEvent::Opened { conn } => {
                if self.conn != Some(conn) || self.state != ConnectionState::Connecting {
                    tracing::debug!(conn_id = conn, "Ignoring open from stale connection");
                    if self.conn != Some(conn) {
                        self.outbox.push(StreamCommand::Close { conn });
                    }
                    return None;
                }
                self.outbox.push(StreamCommand::Subscribe {
                    conn,
                    request: SubscribeRequest::new(&self.symbol),
                });
                self.state = ConnectionState::Subscribed;
                tracing::info!(symbol = %self.symbol, conn_id = conn, "Subscribed to tick feed");
                None
            }
            StreamEvent::Closed { conn, reason } => {
                if self.conn != Some(conn) {
                    tracing::debug!(conn_id = conn, "Ignoring close from stale connection");
                    return None;
                }
                self.conn = None;
                tracing::warn!(
                    symbol = %self.symbol,
                    conn_id = conn,
                    reason = reason.as_deref().unwrap_or("closed"),
                    "Tick feed disconnected"
                );
                if self.live {
                    self.schedule_reconnect(now_ms);
                } else {
                    self.state = ConnectionState::Disconnected;
                }
                None
            }
            StreamEvent::MessageReceived { conn, text } => {
                if self.conn == Some(conn) && self.state == ConnectionState::Subscribed {
                    Some(text)
                } else {
                    None
                }
            }
            StreamEvent::ReconnectDue { timer } => {
                match self.reconnect {
                    Some(pending) if pending.timer == timer => {
                        self.reconnect = None;
                        if self.live {
                            self.connect();
                        } else {
                            self.state = ConnectionState::Disconnected;
                        }
                    }
                    _ => tracing::debug!(timer_id = timer, "Ignoring stale reconnect timer"),
                }
                None
            }
        }
    }

    fn schedule_reconnect(&mut self, now_ms: u64) {
        self.cancel_reconnect();
        let timer = self.alloc_id();
        let due_at_ms = now_ms.saturating_add(self.reconnect_delay_ms);
        self.reconnect = Some(PendingReconnect { timer, due_at_ms });
        self.reconnect_count = self.reconnect_count.saturating_add(1);
        self.state = ConnectionState::RetryPending { due_at_ms };
        tracing::info!(
            timer_id = timer,
            delay_ms = self.reconnect_delay_ms,
            "Reconnect scheduled"
        );
        self.outbox.push(StreamCommand::ScheduleReconnect {
            timer,
            delay_ms: self.reconnect_delay_ms,
        });
    }

    fn cancel_reconnect(&mut self) {
        if let Some(pending) = self.reconnect.take() {
            self.outbox
                .push(StreamCommand::CancelReconnect { timer: pending.timer });
        }
    }

    fn close_current(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.outbox.push(StreamCommand::Close { conn });
        }
    }
}
