//! Tab bar widget for view navigation

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::tui::theme::Theme;

/// Dashboard views, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Services,
    Recommendations,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Services => "Services",
            Self::Recommendations => "Recommendations",
        }
    }

    pub fn all() -> &'static [Tab] {
        &[Tab::Overview, Tab::Services, Tab::Recommendations]
    }

    /// Next tab (wrapping)
    pub fn next(self) -> Self {
        match self {
            Self::Overview => Self::Services,
            Self::Services => Self::Recommendations,
            Self::Recommendations => Self::Overview,
        }
    }

    /// Previous tab (wrapping)
    pub fn prev(self) -> Self {
        match self {
            Self::Overview => Self::Recommendations,
            Self::Services => Self::Overview,
            Self::Recommendations => Self::Services,
        }
    }

    /// Tab for number key 1-3
    pub fn from_number(n: u8) -> Option<Self> {
        Self::all().get(usize::from(n).checked_sub(1)?).copied()
    }
}

/// Tab bar widget showing available views
pub struct TabBar {
    selected: Tab,
    theme: Theme,
}

impl TabBar {
    pub fn new(selected: Tab, theme: Theme) -> Self {
        Self { selected, theme }
    }

    /// Rendered label: the selected tab is bracketed
    fn display(&self, tab: Tab) -> String {
        if tab == self.selected {
            format!("[{}]", tab.label())
        } else {
            tab.label().to_string()
        }
    }
}

impl Widget for TabBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        const GAP: u16 = 2;
        let total_width: u16 = Tab::all()
            .iter()
            .map(|tab| self.display(*tab).len() as u16 + GAP)
            .sum::<u16>()
            .saturating_sub(GAP);

        let mut x = area.x + (area.width.saturating_sub(total_width)) / 2;

        for tab in Tab::all() {
            let display = self.display(*tab);
            let display_len = display.len() as u16;
            if x + display_len > area.x + area.width {
                break;
            }

            let style = if *tab == self.selected {
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted())
            };

            buf.set_string(x, area.y, &display, style);
            x += display_len + GAP;
        }
    }
}
