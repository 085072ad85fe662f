use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{info, warn};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::config::AppConfig;
use crate::db::repository::ReminderRepo;
use crate::models::{Coordinates, PrayerName};
use crate::prayer_times::{qibla_for, resolve_place, Snapshot, TimingsService};
use crate::providers::{LocationSearch, OpenMeteoGeocoder};
use crate::schedule::{tick, Clock, CountdownState, ScheduleSlot, SystemClock, Ticker};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{header, next_prayer, prayers, qibla, statusbar, timeline};
use crate::utils::hijri::hijri_label;

/// Lower bound for the countdown period so a bad config can't spin the CPU.
const MIN_TICK_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    LocationSearch,
}

pub struct App {
    pub config: AppConfig,
    config_path: PathBuf,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub input_error: Option<String>,

    pub snapshot: Option<Snapshot>,
    pub countdown: Option<CountdownState>,
    pub hijri_str: String,
    pub qibla: Option<(Coordinates, f64)>,
    pub reminders: Vec<PrayerName>,
    /// Why the last refresh failed. While set, no schedule is shown.
    pub error: Option<String>,
    /// One-off message in the status bar, cleared by the next key press.
    pub notice: Option<String>,

    slot: ScheduleSlot,
    ticker: Option<Ticker>,
    clock: fn() -> DateTime<FixedOffset>,
}

fn system_now() -> DateTime<FixedOffset> {
    SystemClock.now()
}

impl App {
    pub fn new(config: AppConfig, config_path: PathBuf) -> Self {
        App {
            config,
            config_path,
            should_quit: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            input_error: None,
            snapshot: None,
            countdown: None,
            hijri_str: String::new(),
            qibla: None,
            reminders: Vec::new(),
            error: None,
            notice: None,
            slot: ScheduleSlot::new(),
            ticker: None,
            clock: system_now,
        }
    }

    /// Read "now" from `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: fn() -> DateTime<FixedOffset>) -> Self {
        self.clock = clock;
        self
    }

    /// Start publishing countdown states into `tx`. Replaces any running ticker.
    pub fn start_ticker(&mut self, tx: Sender<Event>) {
        let period = Duration::from_millis(self.config.display.tick_ms.max(MIN_TICK_MS));
        self.ticker = Some(Ticker::spawn(
            self.slot.clone(),
            self.clock,
            period,
            move |state| tx.send(Event::Countdown(state)).is_ok(),
        ));
    }

    /// Resolve the location, load today's timings and swap in a new schedule.
    pub fn refresh(&mut self, conn: &Connection) {
        let now = (self.clock)();
        let resolved = resolve_place(&self.config);
        let result = TimingsService::from_config(&self.config)
            .and_then(|service| service.snapshot(conn, resolved, &now));

        match result {
            Ok(snapshot) => {
                let coords = snapshot.place.coords;
                if self.qibla.map(|(at, _)| at) != Some(coords) {
                    self.qibla = Some((coords, qibla_for(&self.config, coords)));
                }
                self.hijri_str = snapshot
                    .daily
                    .hijri
                    .clone()
                    .or_else(|| {
                        hijri_label(snapshot.schedule.date(), self.config.timings.hijri_offset).ok()
                    })
                    .unwrap_or_default();
                self.countdown = Some(tick(&snapshot.schedule, &now));
                self.slot.replace(snapshot.schedule.clone());
                self.snapshot = Some(snapshot);
                self.error = None;
            }
            Err(e) => {
                warn!("Refresh failed: {:#}", e);
                self.slot.clear();
                self.snapshot = None;
                self.countdown = None;
                self.error = Some(format!("{:#}", e));
            }
        }

        match ReminderRepo::enabled(conn) {
            Ok(enabled) => self.reminders = enabled,
            Err(e) => warn!("Failed to load reminders: {}", e),
        }
    }

    /// Take a state from the ticker. Arrival of the prayer on display
    /// triggers a rebuild, and a notice when its reminder is on.
    pub fn on_countdown(&mut self, state: CountdownState, conn: &Connection) {
        let current = self.snapshot.as_ref().map(|s| s.schedule.next_instant());
        if current != Some(state.next_instant) {
            // published against a schedule that has since been replaced
            return;
        }

        let arrived = state.is_arrived();
        let prayer = state.next;
        self.countdown = Some(state);

        if arrived {
            info!("{} has arrived", prayer);
            if self.reminders.contains(&prayer) {
                self.notice = Some(format!("🔔 It's time for {}", prayer));
            }
            self.refresh(conn);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        // Only handle actual key presses, some terminals also report release/repeat
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.notice = None;
        match self.input_mode {
            InputMode::LocationSearch => self.handle_search_input(key, conn),
            InputMode::Normal => self.handle_normal_key(key, conn),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => {
                self.refresh(conn);
            }
            KeyCode::Char('l') => {
                self.input_mode = InputMode::LocationSearch;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.toggle_reminder(conn, PrayerName::ALL[idx]);
            }
            _ => {}
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Enter => {
                let query = self.input_buffer.trim().to_string();
                if query.is_empty() {
                    self.input_error = Some("Type a city or place name first".to_string());
                    return;
                }
                match self.search_location(&query) {
                    Ok(()) => {
                        self.input_mode = InputMode::Normal;
                        self.input_buffer.clear();
                        self.input_error = None;
                        self.refresh(conn);
                    }
                    Err(e) => {
                        self.input_error = Some(format!("{:#}", e));
                    }
                }
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                self.input_error = None;
            }
            _ => {}
        }
    }

    fn search_location(&mut self, query: &str) -> Result<()> {
        let geocoder = OpenMeteoGeocoder::new(&self.config.endpoints.geocoding)?;
        let place = geocoder.search(query)?;
        info!("Location set to {}", place.name);
        self.config.location.set_place(&place);
        self.config.save_to(&self.config_path)?;
        self.notice = Some(format!("Location set to {}", place.name));
        Ok(())
    }

    fn toggle_reminder(&mut self, conn: &Connection, prayer: PrayerName) {
        match ReminderRepo::toggle(conn, prayer) {
            Ok(on) => {
                self.reminders.retain(|p| *p != prayer);
                if on {
                    self.reminders.push(prayer);
                    self.reminders.sort();
                }
                self.notice = Some(format!(
                    "Reminder {} for {}",
                    if on { "on" } else { "off" },
                    prayer
                ));
            }
            Err(e) => {
                warn!("Failed to toggle reminder: {}", e);
                self.notice = Some(format!("Could not save reminder: {}", e));
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        // Clear background
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let location = self.snapshot.as_ref().map(|s| s.location_label());
        header::render(
            frame,
            outer_chunks[0],
            location.as_deref(),
            &self.hijri_str,
            self.snapshot.as_ref().and_then(|s| s.fallback_reason.as_deref()),
        );
        statusbar::render(frame, outer_chunks[2], self.notice.as_deref());

        match (&self.snapshot, &self.error) {
            (Some(snapshot), _) => self.draw_dashboard(frame, outer_chunks[1], snapshot),
            (None, Some(error)) => self.draw_error(frame, outer_chunks[1], error),
            (None, None) => {}
        }

        if self.input_mode == InputMode::LocationSearch {
            self.draw_search_input(frame);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame, body: Rect, snapshot: &Snapshot) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Length(4), Constraint::Min(0)])
            .split(body);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[0]);

        let twelve_hour = self.config.display.twelve_hour;
        let now = (self.clock)();
        prayers::render(
            frame,
            columns[0],
            &snapshot.schedule,
            &self.reminders,
            twelve_hour,
            now.with_timezone(&Utc),
        );

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(4)])
            .split(columns[1]);
        next_prayer::render(
            frame,
            right[0],
            &snapshot.schedule,
            self.countdown.as_ref(),
            twelve_hour,
        );
        qibla::render(frame, right[1], self.qibla.map(|(_, bearing)| bearing));

        timeline::render(
            frame,
            rows[1],
            &snapshot.schedule,
            *now.offset(),
            self.countdown.as_ref().map(|c| c.day_position),
        );
    }

    fn draw_error(&self, frame: &mut Frame, body: Rect, error: &str) {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Could not load prayer times",
                theme::red().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(format!("  ✗ {}", error), theme::red())),
            Line::from(""),
            Line::from(vec![
                Span::styled("  [r]", theme::gold()),
                Span::styled(" retry  ", theme::dim()),
                Span::styled("[l]", theme::gold()),
                Span::styled(" choose another location", theme::dim()),
            ]),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::red())
            .style(theme::surface());

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, body);
    }

    fn draw_search_input(&self, frame: &mut Frame) {
        let area = frame.area();
        let height = if self.input_error.is_some() { 7 } else { 5 };

        let popup_area = Rect {
            x: area.width / 6,
            y: (area.height / 2).saturating_sub(3),
            width: area.width * 2 / 3,
            height: height.min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Place: ", theme::dim()),
                Span::styled(
                    self.input_buffer.as_str(),
                    theme::gold().add_modifier(Modifier::BOLD),
                ),
                Span::styled("█", theme::amber()), // block cursor
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "  Type a city, then [Enter]  ·  [Esc] cancel",
                theme::dim(),
            )),
        ];

        if let Some(err) = &self.input_error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let border_style = if self.input_error.is_some() {
            theme::red()
        } else {
            theme::amber()
        };

        let block = Block::default()
            .title(Span::styled(" Search Location ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }
}

/// Run the live dashboard until the user quits.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let mut app = App::new(config, AppConfig::config_path()?);
    app.refresh(&conn);

    let events = EventHandler::new();
    app.start_ticker(events.sender());

    let mut terminal = ratatui::init();
    let result = event_loop(&mut app, &mut terminal, &events, &conn);
    ratatui::restore();
    result
}

fn event_loop(
    app: &mut App,
    terminal: &mut ratatui::DefaultTerminal,
    events: &EventHandler,
    conn: &Connection,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        match events.next()? {
            Event::Key(key) => {
                app.handle_key(key, conn);
                if app.should_quit {
                    return Ok(());
                }
            }
            Event::Countdown(state) => app.on_countdown(state, conn),
        }
    }
}
