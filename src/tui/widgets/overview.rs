//! Overview layout widget

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::tabs::{Tab, TabBar};
use crate::format::{format_cost, format_sparkline};
use crate::tui::theme::{classify_day, Theme};
use crate::types::{DailyTotal, DateRange};

/// Data for the overview display (references to avoid cloning)
#[derive(Debug)]
pub struct OverviewData<'a> {
    pub daily: &'a [DailyTotal],
    pub total_cost: f64,
    pub service_count: usize,
    pub recommendation_count: usize,
    pub rejected: usize,
    pub source: &'a str,
    /// Shown only when the source applied it
    pub range: Option<DateRange>,
    pub threshold: f64,
}

/// Maximum content width (keeps layout clean on wide terminals)
const MAX_CONTENT_WIDTH: u16 = 120;
const SPARKLINE_WIDTH: usize = 40;

pub struct Overview<'a> {
    data: OverviewData<'a>,
    theme: Theme,
}

impl<'a> Overview<'a> {
    pub fn new(data: OverviewData<'a>, theme: Theme) -> Self {
        Self { data, theme }
    }
}

impl Widget for Overview<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width.min(MAX_CONTENT_WIDTH);
        let x_offset = (area.width.saturating_sub(content_width)) / 2;
        let centered_area = Rect {
            x: area.x + x_offset,
            y: area.y,
            width: content_width,
            height: area.height,
        };

        let chunks = Layout::vertical([
            Constraint::Length(1), // TabBar
            Constraint::Length(1), // Separator
            Constraint::Length(3), // Hero stat
            Constraint::Length(1), // Sub-stats
            Constraint::Length(1), // Range + source
            Constraint::Length(1), // Blank
            Constraint::Fill(1),   // Daily trend
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Keybindings
        ])
        .split(centered_area);

        TabBar::new(Tab::Overview, self.theme).render(chunks[0], buf);
        self.render_separator(chunks[1], buf);
        self.render_hero_stat(chunks[2], buf);
        self.render_sub_stats(chunks[3], buf);
        self.render_provenance(chunks[4], buf);
        self.render_daily_trend(chunks[6], buf);
        self.render_separator(chunks[7], buf);
        self.render_keybindings(chunks[8], buf);
    }
}

impl Overview<'_> {
    fn render_separator(&self, area: Rect, buf: &mut Buffer) {
        let line = "─".repeat(area.width as usize);
        buf.set_string(
            area.x,
            area.y,
            &line,
            Style::default().fg(self.theme.muted()),
        );
    }

    fn render_hero_stat(&self, area: Rect, buf: &mut Buffer) {
        let hero = Paragraph::new(vec![
            Line::from(Span::styled(
                format_cost(self.data.total_cost),
                Style::default()
                    .fg(self.theme.cost())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "total spend",
                Style::default().fg(self.theme.muted()),
            )),
        ])
        .alignment(Alignment::Center);

        hero.render(area, buf);
    }

    fn render_sub_stats(&self, area: Rect, buf: &mut Buffer) {
        let rec_style = if self.data.recommendation_count > 0 {
            Style::default().fg(self.theme.alert())
        } else {
            Style::default().fg(self.theme.bar())
        };
        let mut spans = vec![
            Span::styled(
                format!("{} days", self.data.daily.len()),
                Style::default().fg(self.theme.text()),
            ),
            Span::styled("  ·  ", Style::default().fg(self.theme.muted())),
            Span::styled(
                format!("{} services", self.data.service_count),
                Style::default().fg(self.theme.text()),
            ),
            Span::styled("  ·  ", Style::default().fg(self.theme.muted())),
            Span::styled(
                format!(
                    "{} over {:.2}",
                    self.data.recommendation_count, self.data.threshold
                ),
                rec_style,
            ),
        ];
        if self.data.rejected > 0 {
            spans.push(Span::styled("  ·  ", Style::default().fg(self.theme.muted())));
            spans.push(Span::styled(
                format!("{} skipped", self.data.rejected),
                Style::default().fg(self.theme.warn()),
            ));
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_provenance(&self, area: Rect, buf: &mut Buffer) {
        let text = match self.data.range {
            Some(range) => format!("{} from {}", range, self.data.source),
            None => format!("from {}", self.data.source),
        };
        Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(self.theme.muted()),
        )))
        .alignment(Alignment::Center)
        .render(area, buf);
    }

    /// Most recent days that fit, oldest at the top
    fn render_daily_trend(&self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || self.data.daily.is_empty() {
            return;
        }

        let max = self
            .data
            .daily
            .iter()
            .map(|d| d.total_cost)
            .fold(0.0_f64, f64::max);
        let avg = self.data.total_cost / self.data.daily.len() as f64;

        // date(10) + 2 + bar + 2 + cost(12)
        let line_width = 10 + 2 + SPARKLINE_WIDTH + 2 + 12;
        let x = area.x + area.width.saturating_sub(line_width as u16) / 2;

        let visible = usize::from(area.height).min(self.data.daily.len());
        let start = self.data.daily.len() - visible;

        for (row, day) in self.data.daily[start..].iter().enumerate() {
            let level = classify_day(day.total_cost, avg);
            let line = Line::from(vec![
                Span::styled(
                    day.date.format("%Y-%m-%d").to_string(),
                    Style::default().fg(self.theme.date()),
                ),
                Span::raw("  "),
                Span::styled(
                    format_sparkline(day.total_cost, max, SPARKLINE_WIDTH),
                    Style::default().fg(self.theme.bar()),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("{:>12}", format_cost(day.total_cost)),
                    Style::default().fg(self.theme.day_color(level)),
                ),
            ]);
            buf.set_line(x, area.y + row as u16, &line, area.width);
        }
    }

    fn render_keybindings(&self, area: Rect, buf: &mut Buffer) {
        let bindings = Paragraph::new(Line::from(vec![
            Span::styled("Tab", Style::default().fg(self.theme.accent())),
            Span::styled(": Switch view", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("+/-", Style::default().fg(self.theme.accent())),
            Span::styled(": Threshold", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("?", Style::default().fg(self.theme.accent())),
            Span::styled(": Help", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("q", Style::default().fg(self.theme.accent())),
            Span::styled(": Quit", Style::default().fg(self.theme.muted())),
        ]))
        .alignment(Alignment::Center);

        bindings.render(area, buf);
    }
}
