//! Recommendations view widget

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::format::format_cost;
use super::tabs::{Tab, TabBar};
use crate::cli::printer::NO_RECOMMENDATIONS;
use crate::tui::theme::Theme;
use crate::types::Recommendation;

const MAX_CONTENT_WIDTH: u16 = 120;

pub struct RecommendationsView<'a> {
    recommendations: &'a [Recommendation],
    threshold: f64,
    scroll: usize,
    theme: Theme,
}

impl<'a> RecommendationsView<'a> {
    pub fn new(
        recommendations: &'a [Recommendation],
        threshold: f64,
        scroll: usize,
        theme: Theme,
    ) -> Self {
        Self {
            recommendations,
            threshold,
            scroll,
            theme,
        }
    }
}

impl Widget for RecommendationsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width.min(MAX_CONTENT_WIDTH);
        let centered_area = Rect {
            x: area.x + (area.width.saturating_sub(content_width)) / 2,
            width: content_width,
            ..area
        };

        let chunks = Layout::vertical([
            Constraint::Length(1), // Tabs
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Threshold line
            Constraint::Length(1), // Blank
            Constraint::Fill(1),   // List
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Keybindings
        ])
        .split(centered_area);

        TabBar::new(Tab::Recommendations, self.theme).render(chunks[0], buf);
        self.render_separator(chunks[1], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("Threshold ", Style::default().fg(self.theme.muted())),
            Span::styled(
                format!("{:.2}", self.threshold),
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ·  {} flagged", self.recommendations.len()),
                Style::default().fg(self.theme.muted()),
            ),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        self.render_list(chunks[4], buf);
        self.render_separator(chunks[5], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("↑↓", Style::default().fg(self.theme.accent())),
            Span::styled(": Scroll", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("+/-", Style::default().fg(self.theme.accent())),
            Span::styled(": Threshold", Style::default().fg(self.theme.muted())),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);
    }
}

impl RecommendationsView<'_> {
    fn render_separator(&self, area: Rect, buf: &mut Buffer) {
        buf.set_string(
            area.x,
            area.y,
            "─".repeat(area.width as usize),
            Style::default().fg(self.theme.muted()),
        );
    }

    fn render_list(&self, area: Rect, buf: &mut Buffer) {
        if self.recommendations.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                NO_RECOMMENDATIONS,
                Style::default().fg(self.theme.bar()),
            )))
            .alignment(Alignment::Center)
            .render(area, buf);
            return;
        }

        for (row, rec) in self
            .recommendations
            .iter()
            .skip(self.scroll)
            .take(usize::from(area.height))
            .enumerate()
        {
            let line = Line::from(vec![
                Span::styled(
                    rec.date.format("%Y-%m-%d").to_string(),
                    Style::default().fg(self.theme.date()),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("{:>12} {:<4}", format_cost(rec.cost), rec.unit),
                    Style::default().fg(self.theme.threshold_color(rec.cost, self.threshold)),
                ),
                Span::raw("  "),
                Span::styled(rec.message.as_str(), Style::default().fg(self.theme.text())),
            ]);
            buf.set_line(area.x + 1, area.y + row as u16, &line, area.width.saturating_sub(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::recommend;
    use crate::types::DayServiceTotal;
    use chrono::NaiveDate;

    fn render_text(view: RecommendationsView<'_>) -> String {
        let area = Rect::new(0, 0, 120, 12);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);
        (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn test_empty_shows_under_control() {
        let text = render_text(RecommendationsView::new(&[], 10.0, 0, Theme::Dark));
        assert!(text.contains("Costs appear to be under control"));
        assert!(text.contains("0 flagged"));
    }

    #[test]
    fn test_lists_recommendations() {
        let totals = vec![DayServiceTotal {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            service: "EC2".into(),
            cost: 11.0,
            unit: "USD".into(),
        }];
        let recs = recommend(&totals, 10.0);

        let text = render_text(RecommendationsView::new(&recs, 10.0, 0, Theme::Dark));
        assert!(text.contains("Threshold 10.00"));
        assert!(text.contains("1 flagged"));
        assert!(text.contains("'EC2' cost 11.00 USD"));
    }
}
