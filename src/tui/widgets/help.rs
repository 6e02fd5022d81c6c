//! Help popup widget - displays keyboard shortcuts

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::tui::theme::Theme;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const POPUP_WIDTH: u16 = 46;
const POPUP_HEIGHT: u16 = 18;

const NAVIGATION: &[(&str, &str)] = &[
    ("Tab / Shift+Tab", "Switch view"),
    ("1-3", "Jump to view"),
    ("Up/Down or j/k", "Scroll list"),
];

const GENERAL: &[(&str, &str)] = &[
    ("+ / -", "Raise/lower threshold"),
    ("q / Esc", "Quit"),
    ("?", "Toggle help"),
];

/// Help popup widget showing keyboard shortcuts
pub struct HelpPopup {
    theme: Theme,
}

impl HelpPopup {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Calculate centered popup area
    pub fn centered_area(area: Rect) -> Rect {
        let x = area.x + (area.width.saturating_sub(POPUP_WIDTH)) / 2;
        let y = area.y + (area.height.saturating_sub(POPUP_HEIGHT)) / 2;
        Rect {
            x,
            y,
            width: POPUP_WIDTH.min(area.width),
            height: POPUP_HEIGHT.min(area.height),
        }
    }

    fn render_section(
        &self,
        title: &str,
        bindings: &[(&str, &str)],
        rows: &[Rect],
        buf: &mut Buffer,
    ) {
        let Some((header, rest)) = rows.split_first() else {
            return;
        };
        Paragraph::new(Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(self.theme.date())
                .add_modifier(Modifier::BOLD),
        )))
        .render(*header, buf);

        let Some((sep, rest)) = rest.split_first() else {
            return;
        };
        buf.set_string(
            sep.x,
            sep.y,
            "─".repeat(sep.width as usize),
            Style::default().fg(self.theme.muted()),
        );

        for ((key, desc), row) in bindings.iter().zip(rest) {
            render_keybinding(*row, buf, key, desc, self.theme);
        }
    }
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl Widget for HelpPopup {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let title = format!(" costwatch v{} ", VERSION);
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent()));

        let inner = block.inner(area);
        block.render(area, buf);

        // padding, 2 sections of header + separator + bindings, padding, hint
        let section_rows = |n: usize| 2 + n;
        let mut constraints = vec![Constraint::Length(1)];
        constraints.extend((0..section_rows(NAVIGATION.len())).map(|_| Constraint::Length(1)));
        constraints.push(Constraint::Length(1));
        constraints.extend((0..section_rows(GENERAL.len())).map(|_| Constraint::Length(1)));
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Min(0));
        let rows = Layout::vertical(constraints).split(inner);

        let nav_start = 1;
        let nav_end = nav_start + section_rows(NAVIGATION.len());
        let gen_start = nav_end + 1;
        let gen_end = gen_start + section_rows(GENERAL.len());

        self.render_section("Navigation", NAVIGATION, &rows[nav_start..nav_end], buf);
        self.render_section("General", GENERAL, &rows[gen_start..gen_end], buf);

        Paragraph::new(Line::from(Span::styled(
            "Press ? to close",
            Style::default().fg(self.theme.muted()),
        )))
        .alignment(Alignment::Center)
        .render(rows[gen_end + 1], buf);
    }
}

fn render_keybinding(area: Rect, buf: &mut Buffer, key: &str, desc: &str, theme: Theme) {
    let line = Line::from(vec![
        Span::styled(
            format!("  {:<18}", key),
            Style::default().fg(theme.accent()),
        ),
        Span::styled(desc.to_string(), Style::default().fg(theme.text())),
    ]);
    Paragraph::new(line).render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_popup_centered_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup_area = HelpPopup::centered_area(area);

        assert_eq!(popup_area.width, POPUP_WIDTH);
        assert_eq!(popup_area.height, POPUP_HEIGHT);
        assert_eq!(popup_area.x, (100 - POPUP_WIDTH) / 2);
        assert_eq!(popup_area.y, (50 - POPUP_HEIGHT) / 2);
    }

    #[test]
    fn test_help_popup_small_terminal() {
        let area = Rect::new(0, 0, 30, 10);
        let popup_area = HelpPopup::centered_area(area);

        assert_eq!(popup_area.width, 30);
        assert_eq!(popup_area.height, 10);
    }

    #[test]
    fn test_help_popup_lists_threshold_keys() {
        let area = HelpPopup::centered_area(Rect::new(0, 0, 80, 30));
        let mut buf = Buffer::empty(Rect::new(0, 0, 80, 30));
        HelpPopup::default().render(area, &mut buf);

        let text: String = (0..30)
            .flat_map(|y| (0..80).map(move |x| (x, y)))
            .map(|(x, y)| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect();
        assert!(text.contains("Raise/lower threshold"));
        assert!(text.contains("Press ? to close"));
    }
}
