//! Application state and event loop

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget, DefaultTerminal, Frame};

use crate::cli::{analyze_load, fetch_entries, LoadRequest};
use crate::services::{recommend, Analysis};
use crate::tui::theme::Theme;
use crate::types::{CostwatchError, DateRange, Recommendation};

use super::widgets::{
    help::HelpPopup,
    overview::{Overview, OverviewData},
    recommendations::RecommendationsView,
    services::ServicesView,
    spinner::{LoadingStage, Spinner},
    tabs::Tab,
};

/// Amount `+`/`-` moves the threshold by
const THRESHOLD_STEP: f64 = 1.0;

/// Application state
pub enum AppState {
    /// Loading data with spinner animation
    Loading {
        spinner_frame: usize,
        stage: LoadingStage,
    },
    /// Ready with loaded data
    Ready { data: Box<AppData> },
    /// Load failed; returned from [`run`] once the user quits
    Error { error: CostwatchError },
}

/// Loaded application data
pub struct AppData {
    pub source: String,
    /// `None` when the source ignores the query window
    pub range: Option<DateRange>,
    pub analysis: Analysis,
    /// Recommendations at the app's current threshold
    pub recommendations: Vec<Recommendation>,
}

/// Progress from the background loader
enum LoadEvent {
    Stage(LoadingStage),
    Done(Result<Box<AppData>, CostwatchError>),
}

/// Main application
pub struct App {
    state: AppState,
    should_quit: bool,
    current_tab: Tab,
    services_scroll: usize,
    recommendations_scroll: usize,
    show_help: bool,
    threshold: f64,
    theme: Theme,
}

impl App {
    /// Create a new app in loading state
    pub fn new(threshold: f64, theme: Theme) -> Self {
        Self {
            state: AppState::Loading {
                spinner_frame: 0,
                stage: LoadingStage::Fetching,
            },
            should_quit: false,
            current_tab: Tab::default(),
            services_scroll: 0,
            recommendations_scroll: 0,
            show_help: false,
            threshold,
            theme,
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.current_tab = self.current_tab.next();
            }
            KeyCode::BackTab => {
                self.current_tab = self.current_tab.prev();
            }
            KeyCode::Char(c @ '1'..='3') => {
                if let Some(tab) = Tab::from_number(c as u8 - b'0') {
                    self.current_tab = tab;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.set_threshold(self.threshold + THRESHOLD_STEP);
            }
            KeyCode::Char('-') => {
                self.set_threshold((self.threshold - THRESHOLD_STEP).max(0.0));
            }
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
            }
            _ => {}
        }
    }

    /// Change the threshold and recompute recommendations from the existing
    /// (date, service) totals. Nothing is re-fetched or re-aggregated.
    fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
        if let AppState::Ready { data } = &mut self.state {
            data.recommendations = recommend(data.analysis.report.by_day_service(), threshold);
            self.recommendations_scroll = self
                .recommendations_scroll
                .min(data.recommendations.len().saturating_sub(1));
        }
    }

    /// Length of the scrollable list on the current tab
    fn list_len(&self) -> usize {
        let AppState::Ready { data } = &self.state else {
            return 0;
        };
        match self.current_tab {
            Tab::Services => data.analysis.report.by_service().len(),
            Tab::Recommendations => data.recommendations.len(),
            Tab::Overview => 0,
        }
    }

    fn active_scroll_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Services => Some(&mut self.services_scroll),
            Tab::Recommendations => Some(&mut self.recommendations_scroll),
            Tab::Overview => None,
        }
    }

    fn scroll_up(&mut self) {
        if let Some(scroll) = self.active_scroll_mut() {
            *scroll = scroll.saturating_sub(1);
        }
    }

    fn scroll_down(&mut self) {
        let max = self.list_len().saturating_sub(1);
        if let Some(scroll) = self.active_scroll_mut() {
            *scroll = (*scroll + 1).min(max);
        }
    }

    fn apply_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Stage(stage) => {
                if let AppState::Loading { spinner_frame, .. } = self.state {
                    self.state = AppState::Loading {
                        spinner_frame,
                        stage,
                    };
                }
            }
            LoadEvent::Done(Ok(data)) => {
                self.state = AppState::Ready { data };
                // the loader analyzed at the initial threshold; re-sync in case +/- was pressed
                self.set_threshold(self.threshold);
            }
            LoadEvent::Done(Err(error)) => self.state = AppState::Error { error },
        }
    }

    /// Update spinner animation
    pub fn tick(&mut self) {
        if let AppState::Loading {
            spinner_frame,
            stage,
        } = &self.state
        {
            self.state = AppState::Loading {
                spinner_frame: Spinner::next_frame(*spinner_frame),
                stage: *stage,
            };
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    /// Outcome of the session: the load error if the dashboard never got data
    pub fn finish(self) -> Result<(), CostwatchError> {
        match self.state {
            AppState::Error { error } => Err(error),
            _ => Ok(()),
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.state {
            AppState::Loading {
                spinner_frame,
                stage,
            } => {
                Spinner::new(*spinner_frame, *stage, self.theme).render(area, buf);
            }
            AppState::Ready { data } => {
                let report = &data.analysis.report;
                match self.current_tab {
                    Tab::Overview => Overview::new(
                        OverviewData {
                            daily: report.daily(),
                            total_cost: data.analysis.total_cost,
                            service_count: report.by_service().len(),
                            recommendation_count: data.recommendations.len(),
                            rejected: data.analysis.rejected.len(),
                            source: &data.source,
                            range: data.range,
                            threshold: self.threshold,
                        },
                        self.theme,
                    )
                    .render(area, buf),
                    Tab::Services => {
                        ServicesView::new(report.by_service(), self.services_scroll, self.theme)
                            .render(area, buf)
                    }
                    Tab::Recommendations => RecommendationsView::new(
                        &data.recommendations,
                        self.threshold,
                        self.recommendations_scroll,
                        self.theme,
                    )
                    .render(area, buf),
                }

                if self.show_help {
                    let popup_area = HelpPopup::centered_area(area);
                    HelpPopup::new(self.theme).render(popup_area, buf);
                }
            }
            AppState::Error { error } => {
                let y = area.y + area.height / 2;
                let text = format!("Error: {}", error);
                let x = area.x + (area.width.saturating_sub(text.chars().count() as u16)) / 2;
                buf.set_string(x, y, &text, Style::default().fg(self.theme.alert()));

                let hint = "Press q to quit";
                let x = area.x + (area.width.saturating_sub(hint.len() as u16)) / 2;
                buf.set_string(
                    x,
                    y.saturating_add(2),
                    hint,
                    Style::default().fg(self.theme.muted()),
                );
            }
        }
    }
}

/// Run the dashboard until the user quits
pub fn run(request: LoadRequest) -> anyhow::Result<()> {
    // Theme detection must happen before raw mode
    let theme = Theme::detect();
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, request, theme);
    ratatui::restore();
    result
}

/// Fetch and analyze on the calling thread, reporting stages through `progress`
fn load_data_sync(
    request: &LoadRequest,
    progress: &mpsc::Sender<LoadEvent>,
) -> Result<Box<AppData>, CostwatchError> {
    let load = fetch_entries(request)?;
    let _ = progress.send(LoadEvent::Stage(LoadingStage::Analyzing));
    let loaded = analyze_load(load, request)?;

    let recommendations = loaded.analysis.report.recommendations().to_vec();
    Ok(Box::new(AppData {
        source: loaded.source,
        range: loaded.range,
        analysis: loaded.analysis,
        recommendations,
    }))
}

fn run_app(
    terminal: &mut DefaultTerminal,
    request: LoadRequest,
    theme: Theme,
) -> anyhow::Result<()> {
    let mut app = App::new(request.threshold, theme);

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = load_data_sync(&request, &tx);
        let _ = tx.send(LoadEvent::Done(result));
    });

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        while let Ok(load_event) = rx.try_recv() {
            app.apply_load_event(load_event);
        }

        // Poll for events with 100ms timeout for spinner animation
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(app.finish()?)
}
