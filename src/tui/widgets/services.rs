//! Services view widget - per-service spend and share of total

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use super::tabs::{Tab, TabBar};
use crate::format::{format_cost, format_percentage_bar, share};
use crate::tui::theme::Theme;
use crate::types::ServiceTotal;

const MAX_CONTENT_WIDTH: u16 = 120;
const NAME_WIDTH: usize = 32;
const BAR_WIDTH: usize = 20;
/// Service(32) + Cost(14) + 2 + Bar(20) + Share(8)
const TABLE_WIDTH: u16 = (NAME_WIDTH + 14 + 2 + BAR_WIDTH + 8) as u16;

pub struct ServicesView<'a> {
    services: &'a [ServiceTotal],
    scroll: usize,
    theme: Theme,
}

impl<'a> ServicesView<'a> {
    /// `services` is expected in report order (cost descending)
    pub fn new(services: &'a [ServiceTotal], scroll: usize, theme: Theme) -> Self {
        Self {
            services,
            scroll,
            theme,
        }
    }
}

impl Widget for ServicesView<'_> {
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
            Constraint::Length(1), // Header
            Constraint::Fill(1),   // Rows
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Keybindings
        ])
        .split(centered_area);

        TabBar::new(Tab::Services, self.theme).render(chunks[0], buf);
        self.render_separator(chunks[1], buf);
        self.render_header(chunks[2], buf);
        self.render_rows(chunks[3], buf);
        self.render_separator(chunks[4], buf);

        let hint = Line::from(vec![
            Span::styled("↑↓", Style::default().fg(self.theme.accent())),
            Span::styled(": Scroll", Style::default().fg(self.theme.muted())),
            Span::raw("  "),
            Span::styled("?", Style::default().fg(self.theme.accent())),
            Span::styled(": Help", Style::default().fg(self.theme.muted())),
        ]);
        let x = chunks[5].x + chunks[5].width.saturating_sub(hint.width() as u16) / 2;
        buf.set_line(x, chunks[5].y, &hint, chunks[5].width);
    }
}

impl ServicesView<'_> {
    fn table_x(&self, area: Rect) -> u16 {
        area.x + area.width.saturating_sub(TABLE_WIDTH) / 2
    }

    fn render_separator(&self, area: Rect, buf: &mut Buffer) {
        buf.set_string(
            area.x,
            area.y,
            "─".repeat(area.width as usize),
            Style::default().fg(self.theme.muted()),
        );
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let bold = Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD);
        let header = Line::from(vec![
            Span::styled(format!("{:<NAME_WIDTH$}", "Service"), bold),
            Span::styled(format!("{:>14}", "Cost"), bold),
            Span::raw("  "),
            Span::styled(format!("{:<BAR_WIDTH$}", "Share"), bold),
        ]);
        buf.set_line(self.table_x(area), area.y, &header, area.width);
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer) {
        if self.services.is_empty() {
            buf.set_string(
                self.table_x(area),
                area.y,
                "No services",
                Style::default().fg(self.theme.muted()),
            );
            return;
        }

        let total: f64 = self.services.iter().map(|s| s.total_cost).sum();
        let x = self.table_x(area);

        for (row, service) in self
            .services
            .iter()
            .skip(self.scroll)
            .take(usize::from(area.height))
            .enumerate()
        {
            let percent = share(service.total_cost, total);
            let name: String = if service.service.chars().count() > NAME_WIDTH - 1 {
                let head: String = service.service.chars().take(NAME_WIDTH - 2).collect();
                format!("{}…", head)
            } else {
                service.service.clone()
            };

            let line = Line::from(vec![
                Span::styled(
                    format!("{:<NAME_WIDTH$}", name),
                    Style::default().fg(self.theme.text()),
                ),
                Span::styled(
                    format!("{:>14}", format_cost(service.total_cost)),
                    Style::default().fg(self.theme.cost()),
                ),
                Span::raw("  "),
                Span::styled(
                    format_percentage_bar(percent, BAR_WIDTH),
                    Style::default().fg(self.theme.bar()),
                ),
                Span::styled(
                    format!("{:>7.1}%", percent),
                    Style::default().fg(self.theme.muted()),
                ),
            ]);
            buf.set_line(x, area.y + row as u16, &line, area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_view_scroll_skips_rows() {
        let services: Vec<ServiceTotal> = ["EC2", "RDS", "S3"]
            .iter()
            .enumerate()
            .map(|(i, name)| ServiceTotal {
                service: name.to_string(),
                total_cost: 30.0 - i as f64 * 10.0,
            })
            .collect();

        let area = Rect::new(0, 0, 100, 12);
        let mut buf = Buffer::empty(area);
        ServicesView::new(&services, 1, Theme::Dark).render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect();
        assert!(!text.contains("EC2"));
        assert!(text.contains("RDS"));
        assert!(text.contains("S3"));
        assert!(text.contains("33.3%"));
    }
}
