use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Widget},
};

use crate::model::tick::Tick;

/// Scatter of recent quotes, scaled to the panel height.
pub struct TickChart<'a> {
    ticks: &'a [Tick],
    symbol: &'a str,
}

impl<'a> TickChart<'a> {
    pub fn new(ticks: &'a [Tick], symbol: &'a str) -> Self {
        Self { ticks, symbol }
    }
}

impl Widget for TickChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(" Ticks ({}) ", self.symbol);
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.ticks.is_empty() || inner.height < 2 || inner.width < 4 {
            return;
        }

        let chart_height = inner.height as usize;
        let chart_width = inner.width as usize;

        let visible = if self.ticks.len() > chart_width {
            &self.ticks[self.ticks.len() - chart_width..]
        } else {
            self.ticks
        };

        let min_quote = visible.iter().map(|t| t.quote).fold(f64::INFINITY, f64::min);
        let max_quote = visible
            .iter()
            .map(|t| t.quote)
            .fold(f64::NEG_INFINITY, f64::max);
        let range = max_quote - min_quote;
        let range = if range <= f64::EPSILON { 1.0 } else { range };

        let last_index = visible.len() - 1;
        for (i, tick) in visible.iter().enumerate() {
            let x = inner.x + i as u16;
            let normalized = (tick.quote - min_quote) / range;
            let row = ((normalized * (chart_height - 1) as f64) as usize).min(chart_height - 1);
            let y = inner.y + (chart_height - 1 - row) as u16;
            let color = if i == last_index {
                Color::Yellow
            } else {
                Color::Cyan
            };
            buf.set_string(x, y, tick.digit.to_string(), Style::default().fg(color));
        }

        let max_label = format!("{:.2}", max_quote);
        let min_label = format!("{:.2}", min_quote);
        let label_x = inner.x + inner.width.saturating_sub(max_label.len() as u16);
        buf.set_string(
            label_x,
            inner.y,
            &max_label,
            Style::default().fg(Color::DarkGray),
        );
        let label_x = inner.x + inner.width.saturating_sub(min_label.len() as u16);
        buf.set_string(
            label_x,
            inner.y + inner.height - 1,
            &min_label,
            Style::default().fg(Color::DarkGray),
        );
    }
}
