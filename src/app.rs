use std::time::Instant;

use crate::config::Config;
use crate::error::Result;
use crate::geo::{self, GeoLocateClient, GeoSearchClient};
use crate::models::{catalog, Article, GenerationRequest, ReadingLength};
use crate::selection::{
    step_reading, FieldState, FieldUpdate, GenerationCoordinator, LocationResolver,
    TimeRangePicker, TopicPicker, TriggerOutcome,
};
use crate::services::NewsClient;
use crate::tui::{AppAction, Theme};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Location,
    Topics,
    TimeRange,
    Reading,
    Results,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::Location,
        Focus::Topics,
        Focus::TimeRange,
        Focus::Reading,
        Focus::Results,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

pub struct App {
    // UI State
    pub focus: Focus,
    pub show_help: bool,
    pub dark_mode: bool,
    pub theme: Theme,
    pub selected_article: usize,
    pub expanded_article: Option<usize>,
    spinner_frame: usize,

    // Selectors
    pub resolver: LocationResolver,
    pub topics: TopicPicker,
    pub time_range: TimeRangePicker,
    pub reading: ReadingLength,

    // Generation
    pub generation: GenerationCoordinator,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let client = geo::http_client(config)?;

        let search = GeoSearchClient::new(client.clone(), &config.geocoder_url)?;
        let locate = GeoLocateClient::new(
            client.clone(),
            &config.geocoder_url,
            geo::position_provider(config),
        )?;
        let news = NewsClient::new(client, &config.backend_url)?;

        Ok(Self {
            focus: Focus::default(),
            show_help: false,
            dark_mode: config.dark_mode,
            theme: Theme::from_dark_mode(config.dark_mode),
            selected_article: 0,
            expanded_article: None,
            spinner_frame: 0,
            resolver: LocationResolver::new(search, locate, config.search_debounce()),
            topics: TopicPicker::new(catalog()),
            time_range: TimeRangePicker::default(),
            reading: ReadingLength::default(),
            generation: GenerationCoordinator::new(news, config.missing_fields_timeout()),
        })
    }

    /// Recomputed from the selectors on every call; nothing is cached.
    pub fn field_state(&self) -> FieldState {
        FieldState::from_updates([
            FieldUpdate::Location(self.resolver.is_committed()),
            FieldUpdate::Topics(!self.topics.selection().is_empty()),
            FieldUpdate::TimeRange(self.time_range.range().is_complete()),
            FieldUpdate::Reading(true),
        ])
    }

    pub fn generation_request(&self) -> GenerationRequest {
        build_request(&self.resolver, &self.topics, &self.time_range)
    }

    pub fn articles(&self) -> &[Article] {
        self.generation
            .result()
            .map(|r| r.articles.as_slice())
            .unwrap_or_default()
    }

    pub fn selected(&self) -> Option<&Article> {
        self.articles().get(self.selected_article)
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn tick_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    /// Timer-driven work: debounce expiry and notice expiry.
    pub fn tick(&mut self, now: Instant) {
        self.resolver.poll_debounce(now);
        self.generation.tick(now);
    }

    /// Drain finished background requests (non-blocking).
    pub fn poll_background(&mut self) {
        self.resolver.poll_search();
        self.resolver.poll_locate();
        self.generation.poll();
    }

    /// Returns true when the app should quit.
    pub fn handle_action(&mut self, action: AppAction, now: Instant) -> bool {
        match action {
            AppAction::Quit => return true,

            AppAction::ShowHelp => self.show_help = true,
            AppAction::ToggleTheme => {
                self.dark_mode = !self.dark_mode;
                self.theme = Theme::from_dark_mode(self.dark_mode);
            }
            AppAction::HideHelp => self.show_help = false,

            AppAction::NextFocus => self.focus = self.focus.next(),
            AppAction::PrevFocus => self.focus = self.focus.prev(),

            AppAction::GenerateNews => self.generate(now),

            AppAction::UseCurrentLocation => {
                self.resolver.locate();
            }

            AppAction::OpenInBrowser => {
                if let Some(article) = self.selected() {
                    if !article.url.is_empty() {
                        if let Err(e) = open::that(&article.url) {
                            tracing::warn!("Failed to open {}: {}", article.url, e);
                        }
                    }
                }
            }

            other => self.handle_focused(other, now),
        }

        false
    }

    fn handle_focused(&mut self, action: AppAction, now: Instant) {
        match self.focus {
            Focus::Location => match action {
                AppAction::InputChar(c) => self.resolver.push_char(c, now),
                AppAction::Backspace => self.resolver.pop_char(now),
                AppAction::MoveUp => self.resolver.move_highlight(-1),
                AppAction::MoveDown => self.resolver.move_highlight(1),
                AppAction::Confirm => {
                    self.resolver.select_highlighted();
                }
                AppAction::Cancel => self.resolver.close_dropdown(),
                _ => {}
            },

            Focus::Topics => match action {
                AppAction::InputChar(c) => self.topics.push_char(c),
                AppAction::Backspace => self.topics.backspace(),
                AppAction::Delete => {
                    self.topics.remove_highlighted();
                }
                AppAction::MoveUp => self.topics.move_highlight(-1),
                AppAction::MoveDown => self.topics.move_highlight(1),
                AppAction::Confirm => {
                    self.topics.add_highlighted();
                }
                _ => {}
            },

            Focus::TimeRange => match action {
                AppAction::InputChar(c) => self.time_range.push_char(c),
                AppAction::Backspace => self.time_range.backspace(),
                AppAction::MoveUp => self.time_range.move_selection(-1),
                AppAction::MoveDown => self.time_range.move_selection(1),
                AppAction::Confirm => {
                    let today = chrono::Local::now().date_naive();
                    self.time_range.confirm_date(today);
                }
                _ => {}
            },

            Focus::Reading => match action {
                AppAction::MoveUp => self.reading = step_reading(self.reading, -1),
                AppAction::MoveDown => self.reading = step_reading(self.reading, 1),
                _ => {}
            },

            Focus::Results => {
                let len = self.articles().len();
                match action {
                    AppAction::MoveUp => {
                        self.selected_article = self.selected_article.saturating_sub(1);
                    }
                    AppAction::MoveDown => {
                        if len > 0 && self.selected_article < len - 1 {
                            self.selected_article += 1;
                        }
                    }
                    AppAction::Confirm if len > 0 => {
                        self.expanded_article = match self.expanded_article {
                            Some(i) if i == self.selected_article => None,
                            _ => Some(self.selected_article),
                        };
                    }
                    _ => {}
                }
            }
        }
    }

    fn generate(&mut self, now: Instant) {
        let fields = self.field_state();
        let (resolver, topics, time_range) = (&self.resolver, &self.topics, &self.time_range);
        let build = || build_request(resolver, topics, time_range);
        match self.generation.trigger(&fields, build, now) {
            TriggerOutcome::Started => {
                self.selected_article = 0;
                self.expanded_article = None;
                self.focus = Focus::Results;
            }
            TriggerOutcome::MissingFields(_) => {}
            TriggerOutcome::AlreadyInFlight => {
                tracing::debug!("Generation already running, trigger ignored");
            }
        }
    }
}

fn build_request(
    resolver: &LocationResolver,
    topics: &TopicPicker,
    time_range: &TimeRangePicker,
) -> GenerationRequest {
    GenerationRequest {
        location: resolver.committed().cloned(),
        topics: topics.selection().as_slice().to_vec(),
        time_range: Some(time_range.range().clone()),
    }
}
