//! Dashboard palettes and background detection

use ratatui::style::Color;

/// How a day's spend compares with the mean day in the loaded range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySpend {
    Typical,
    /// At least 1.5x the mean
    Elevated,
    /// At least 2x the mean
    Spike,
}

/// Classify a day's spend. With no spend at all (`mean_cost` 0) every day is typical.
pub fn classify_day(cost: f64, mean_cost: f64) -> DaySpend {
    if mean_cost <= 0.0 {
        return DaySpend::Typical;
    }
    let ratio = cost / mean_cost;
    if ratio >= 2.0 {
        DaySpend::Spike
    } else if ratio >= 1.5 {
        DaySpend::Elevated
    } else {
        DaySpend::Typical
    }
}

struct Palette {
    text: Color,
    accent: Color,
    muted: Color,
    date: Color,
    cost: Color,
    bar: Color,
    alert: Color,
    warn: Color,
    spike: Color,
}

const DARK: Palette = Palette {
    text: Color::White,
    accent: Color::Cyan,
    muted: Color::DarkGray,
    date: Color::Yellow,
    cost: Color::Magenta,
    bar: Color::Green,
    alert: Color::Red,
    warn: Color::Indexed(208),
    spike: Color::Indexed(196),
};

// ANSI 256 shades dark enough to read on a light background
const LIGHT: Palette = Palette {
    text: Color::Black,
    accent: Color::Indexed(25),
    muted: Color::Gray,
    date: Color::Indexed(130),
    cost: Color::Indexed(90),
    bar: Color::Indexed(22),
    alert: Color::Indexed(124),
    warn: Color::Indexed(166),
    spike: Color::Indexed(160),
};

/// Terminal color scheme (dark or light background)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Pick a theme from the terminal background luminance, Dark when unknown.
    /// Must run before `ratatui::init` puts the terminal in raw mode.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => Self::Light,
            _ => Self::Dark,
        }
    }

    fn palette(self) -> &'static Palette {
        match self {
            Self::Dark => &DARK,
            Self::Light => &LIGHT,
        }
    }

    pub fn text(self) -> Color {
        self.palette().text
    }

    /// Selected tab, key names
    pub fn accent(self) -> Color {
        self.palette().accent
    }

    /// Separators, hints, inactive tabs
    pub fn muted(self) -> Color {
        self.palette().muted
    }

    pub fn date(self) -> Color {
        self.palette().date
    }

    pub fn cost(self) -> Color {
        self.palette().cost
    }

    pub fn bar(self) -> Color {
        self.palette().bar
    }

    /// Load errors and over-threshold amounts
    pub fn alert(self) -> Color {
        self.palette().alert
    }

    /// Skipped entries and elevated days
    pub fn warn(self) -> Color {
        self.palette().warn
    }

    pub fn day_color(self, level: DaySpend) -> Color {
        match level {
            DaySpend::Typical => self.text(),
            DaySpend::Elevated => self.warn(),
            DaySpend::Spike => self.palette().spike,
        }
    }

    /// Alert color once `cost` is strictly over `threshold`, cost color otherwise
    pub fn threshold_color(self, cost: f64, threshold: f64) -> Color {
        if cost > threshold {
            self.alert()
        } else {
            self.cost()
        }
    }
}
