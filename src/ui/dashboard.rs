use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::error::PredictError;
use crate::model::ledger::SettlementRecord;
use crate::model::prediction::Prediction;
use crate::model::tick::Tick;
use crate::stream_client::ConnectionState;

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

pub struct StatusBar<'a> {
    pub symbol_label: &'a str,
    pub connection_state: ConnectionState,
    pub live: bool,
    pub history_len: usize,
    pub dropped_messages: u64,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let conn_color = match self.connection_state {
            ConnectionState::Subscribed => Color::Green,
            ConnectionState::Connecting | ConnectionState::RetryPending { .. } => Color::Yellow,
            ConnectionState::Disconnected => Color::Red,
        };
        let live_status = if self.live {
            Span::styled(" LIVE ", Style::default().fg(Color::Green))
        } else {
            Span::styled(
                " PAUSED ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        };

        let line = Line::from(vec![
            Span::styled(
                " digit-oracle ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.symbol_label, Style::default().fg(Color::Cyan)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                self.connection_state.label().to_ascii_uppercase(),
                Style::default().fg(conn_color),
            ),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            live_status,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("history: {}  dropped: {}", self.history_len, self.dropped_messages),
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct LiveQuotePanel<'a> {
    last_tick: Option<&'a Tick>,
}

impl<'a> LiveQuotePanel<'a> {
    pub fn new(last_tick: Option<&'a Tick>) -> Self {
        Self { last_tick }
    }
}

impl Widget for LiveQuotePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (quote, digit, time) = match self.last_tick {
            Some(t) => (
                t.raw_quote.clone(),
                t.digit.to_string(),
                format_time(t.epoch.saturating_mul(1000)),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };
        let lines = vec![
            Line::from(vec![
                Span::styled("Quote: ", Style::default().fg(Color::DarkGray)),
                Span::styled(quote, Style::default().fg(Color::White)),
            ]),
            Line::from(vec![
                Span::styled("Digit: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    digit,
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Time:  ", Style::default().fg(Color::DarkGray)),
                Span::styled(time, Style::default().fg(Color::Gray)),
            ]),
        ];
        Paragraph::new(lines)
            .block(panel(" Live Tick "))
            .render(area, buf);
    }
}

pub struct PredictionPanel<'a> {
    last_prediction: Option<&'a Prediction>,
    pending: bool,
    forecast_error: Option<PredictError>,
    countdown_secs: u64,
}

impl<'a> PredictionPanel<'a> {
    pub fn new(
        last_prediction: Option<&'a Prediction>,
        pending: bool,
        forecast_error: Option<PredictError>,
        countdown_secs: u64,
    ) -> Self {
        Self {
            last_prediction,
            pending,
            forecast_error,
            countdown_secs,
        }
    }
}

impl Widget for PredictionPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (digit, confidence) = match (self.forecast_error, self.last_prediction) {
            (Some(_), _) | (None, None) => ("-".to_string(), "-%".to_string()),
            (None, Some(p)) => (p.digit.to_string(), format!("{}%", p.confidence)),
        };
        let status = match (self.forecast_error, self.pending) {
            (Some(PredictError::InsufficientData { have, need }), _) => {
                Span::styled(
                    format!("warming up {}/{}", have, need),
                    Style::default().fg(Color::Yellow),
                )
            }
            (None, true) => Span::styled("awaiting settlement", Style::default().fg(Color::Cyan)),
            (None, false) => Span::styled("idle", Style::default().fg(Color::DarkGray)),
        };
        let lines = vec![
            Line::from(vec![
                Span::styled("Next digit: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    digit,
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Confidence: ", Style::default().fg(Color::DarkGray)),
                Span::styled(confidence, Style::default().fg(Color::White)),
            ]),
            Line::from(vec![
                Span::styled("Next cycle: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{}s", self.countdown_secs),
                    Style::default().fg(Color::White),
                ),
            ]),
            Line::from(vec![
                Span::styled("Status:     ", Style::default().fg(Color::DarkGray)),
                status,
            ]),
        ];
        Paragraph::new(lines)
            .block(panel(" Prediction "))
            .render(area, buf);
    }
}

pub struct WinRatePanel {
    pub wins: u32,
    pub total: u32,
    pub losses: u32,
    pub win_rate_percent: u32,
}

impl Widget for WinRatePanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(vec![
                Span::styled("Wins:  ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{} / {}", self.wins, self.total),
                    Style::default().fg(Color::White),
                ),
            ]),
            Line::from(vec![
                Span::styled("Losses: ", Style::default().fg(Color::DarkGray)),
                Span::styled(self.losses.to_string(), Style::default().fg(Color::Red)),
            ]),
            Line::from(vec![
                Span::styled("Rate:  ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{}%", self.win_rate_percent),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];
        Paragraph::new(lines)
            .block(panel(" Win Rate "))
            .render(area, buf);
    }
}

/// Digit heat map: occurrence count over the buffer next to the latest
/// forecast probability.
pub struct DigitTablePanel<'a> {
    frequency: &'a [usize; 10],
    prediction: Option<&'a Prediction>,
}

impl<'a> DigitTablePanel<'a> {
    pub fn new(frequency: &'a [usize; 10], prediction: Option<&'a Prediction>) -> Self {
        Self {
            frequency,
            prediction,
        }
    }
}

impl Widget for DigitTablePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let max_freq = self.frequency.iter().copied().max().unwrap_or(0).max(1);
        let bar_width = 10usize;
        let lines: Vec<Line> = (0..10u8)
            .map(|d| {
                let count = self.frequency[usize::from(d)];
                let filled = (count * bar_width).div_ceil(max_freq).min(bar_width);
                let heat = 20 + ((count * 180) / max_freq) as u8;
                let prob = self
                    .prediction
                    .map(|p| format!("{:5.1}%", p.probability(d) * 100.0))
                    .unwrap_or_else(|| "    - ".to_string());
                let is_pick = self.prediction.is_some_and(|p| p.digit == d);
                let digit_style = if is_pick {
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(vec![
                    Span::styled(format!(" {} ", d), digit_style),
                    Span::styled(
                        format!("{:<width$}", "█".repeat(filled), width = bar_width),
                        Style::default().fg(Color::Rgb(0, heat, 0)),
                    ),
                    Span::styled(format!(" {:>3} ", count), Style::default().fg(Color::DarkGray)),
                    Span::styled(prob, Style::default().fg(Color::Cyan)),
                ])
            })
            .collect();
        Paragraph::new(lines)
            .block(panel(" Digits "))
            .render(area, buf);
    }
}

/// Last digits, newest first.
pub struct DigitStrip<'a> {
    ticks: &'a [Tick],
}

impl<'a> DigitStrip<'a> {
    pub fn new(ticks: &'a [Tick]) -> Self {
        Self { ticks }
    }
}

impl Widget for DigitStrip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spans: Vec<Span> = self
            .ticks
            .iter()
            .rev()
            .map(|t| Span::styled(format!("{} ", t.digit), Style::default().fg(Color::Green)))
            .collect();
        Paragraph::new(Line::from(spans))
            .block(panel(" Recent Digits "))
            .render(area, buf);
    }
}

pub struct PredictionLogPanel<'a> {
    records: &'a [SettlementRecord],
}

impl<'a> PredictionLogPanel<'a> {
    pub fn new(records: &'a [SettlementRecord]) -> Self {
        Self { records }
    }
}

fn format_time(timestamp_ms: u64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms as i64)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "--:--:--".to_string())
}

impl Widget for PredictionLogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_height = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = self
            .records
            .iter()
            .take(inner_height)
            .map(|r| {
                let (label, color) = if r.win {
                    ("WIN", Color::Green)
                } else {
                    ("LOSS", Color::Red)
                };
                Line::from(vec![
                    Span::styled(format_time(r.timestamp_ms), Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        format!(" pred={} actual={} ", r.predicted_digit, r.actual_digit),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(label, Style::default().fg(color)),
                ])
            })
            .collect();
        Paragraph::new(lines)
            .block(panel(" Predictions "))
            .render(area, buf);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(" [Q]", Style::default().fg(Color::Yellow)),
            Span::styled("uit  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[←/→]", Style::default().fg(Color::Yellow)),
            Span::styled(" symbol  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[A]", Style::default().fg(Color::Yellow)),
            Span::styled("uto-play  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[R]", Style::default().fg(Color::Yellow)),
            Span::styled("eset stats  ", Style::default().fg(Color::DarkGray)),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
