//! Loading spinner widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::tui::theme::Theme;

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const APP_NAME: &str = "costwatch";
const TAGLINE: &str = "Daily cloud spend at a glance";

/// What the background loader is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingStage {
    Fetching,
    Analyzing,
}

impl LoadingStage {
    pub fn message(self) -> &'static str {
        match self {
            Self::Fetching => "Fetching billing data...",
            Self::Analyzing => "Aggregating costs...",
        }
    }
}

pub struct Spinner {
    frame: usize,
    stage: LoadingStage,
    theme: Theme,
}

impl Spinner {
    pub fn new(frame: usize, stage: LoadingStage, theme: Theme) -> Self {
        Self {
            frame,
            stage,
            theme,
        }
    }

    pub fn current_char(&self) -> char {
        SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()]
    }

    /// Advance to next frame, returning the new frame index
    pub fn next_frame(frame: usize) -> usize {
        (frame + 1) % SPINNER_FRAMES.len()
    }
}

impl Widget for Spinner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 5 || area.width < 35 {
            return;
        }

        let center_x = |len: usize| area.x + (area.width.saturating_sub(len as u16)) / 2;
        let name_y = (area.y + area.height / 2).saturating_sub(2);

        buf.set_string(
            center_x(APP_NAME.len()),
            name_y,
            APP_NAME,
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        );
        buf.set_string(
            center_x(TAGLINE.len()),
            name_y + 1,
            TAGLINE,
            Style::default().fg(self.theme.muted()),
        );

        let status = format!("{} {}", self.current_char(), self.stage.message());
        buf.set_string(
            center_x(status.chars().count()),
            name_y + 3,
            &status,
            Style::default().fg(self.theme.accent()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_current_char_wraps() {
        assert_eq!(Spinner::new(0, LoadingStage::Fetching, Theme::Dark).current_char(), '⠋');
        assert_eq!(Spinner::new(5, LoadingStage::Fetching, Theme::Dark).current_char(), '⠴');
        assert_eq!(Spinner::new(10, LoadingStage::Fetching, Theme::Dark).current_char(), '⠋');
    }

    #[test]
    fn test_next_frame() {
        assert_eq!(Spinner::next_frame(0), 1);
        assert_eq!(Spinner::next_frame(SPINNER_FRAMES.len() - 1), 0);
    }

    #[test]
    fn test_loading_stage_message() {
        assert_eq!(LoadingStage::Fetching.message(), "Fetching billing data...");
        assert_eq!(LoadingStage::Analyzing.message(), "Aggregating costs...");
    }

    #[test]
    fn test_spinner_skips_tiny_area() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        Spinner::new(0, LoadingStage::Fetching, Theme::Dark).render(area, &mut buf);
        assert_eq!(buf, Buffer::empty(area));
    }
}
