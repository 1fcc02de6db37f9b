pub mod chart;
pub mod dashboard;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::snapshot::Snapshot;

use chart::TickChart;
use dashboard::{
    DigitStrip, DigitTablePanel, KeybindBar, LiveQuotePanel, PredictionLogPanel, PredictionPanel,
    StatusBar, WinRatePanel,
};

pub fn render(frame: &mut Frame, snapshot: &Snapshot) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // status bar
            Constraint::Length(6),  // quote, prediction, win rate
            Constraint::Length(12), // chart + digit table
            Constraint::Length(3),  // digit strip
            Constraint::Min(4),     // prediction log
            Constraint::Length(1),  // keybinds
        ])
        .split(frame.area());

    frame.render_widget(
        StatusBar {
            symbol_label: &snapshot.symbol_label,
            connection_state: snapshot.connection_state,
            live: snapshot.live,
            history_len: snapshot.history_len,
            dropped_messages: snapshot.dropped_messages,
        },
        outer[0],
    );

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(outer[1]);

    frame.render_widget(LiveQuotePanel::new(snapshot.last_tick()), top[0]);
    frame.render_widget(
        PredictionPanel::new(
            snapshot.last_prediction.as_ref(),
            snapshot.current_prediction.is_some(),
            snapshot.forecast_error,
            snapshot.countdown_secs,
        ),
        top[1],
    );
    frame.render_widget(
        WinRatePanel {
            wins: snapshot.wins,
            total: snapshot.total,
            losses: snapshot.losses,
            win_rate_percent: snapshot.win_rate_percent,
        },
        top[2],
    );

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(32)])
        .split(outer[2]);

    frame.render_widget(
        TickChart::new(&snapshot.recent_ticks, &snapshot.symbol),
        middle[0],
    );
    frame.render_widget(
        DigitTablePanel::new(&snapshot.digit_frequency, snapshot.last_prediction.as_ref()),
        middle[1],
    );

    frame.render_widget(DigitStrip::new(&snapshot.recent_ticks), outer[3]);
    frame.render_widget(
        PredictionLogPanel::new(&snapshot.recent_settlements),
        outer[4],
    );
    frame.render_widget(KeybindBar, outer[5]);
}
