//! Interactive directory view.
//!
//! [`DirectoryApp`] owns a [`DirectoryStore`] and translates key presses into
//! store operations. Name input is forwarded to the store on every keystroke;
//! the store's debounce decides when the table actually changes.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
};
use roster_core::clock::{Clock, SystemClock};
use roster_core::model::person::format_birth_date;
use roster_core::{DataAccessError, DirectoryStore, DirectoryView, PersonRecord, StoreError};
use std::time::Duration;
use tracing::debug;

/// Upper bound on how long the event loop waits for input between ticks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

const ALL_CITIES_LABEL: &str = "All cities";
const NO_CITY_LABEL: &str = "(no city)";
const EMPTY_RESULT_MESSAGE: &str = "No users found matching your criteria";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the name filter.
    Name,
    /// City picker popup is open.
    CityPicker,
}

pub struct DirectoryApp<C: Clock = SystemClock> {
    store: DirectoryStore<C>,
    input_mode: InputMode,
    /// Text of the name input box; forwarded to the store as typed.
    name_buf: String,
    /// Picker row: 0 is "All cities", `n` is `cities()[n - 1]`.
    city_cursor: usize,
    table_state: TableState,
    should_quit: bool,
}

impl<C: Clock> DirectoryApp<C> {
    pub fn new(store: DirectoryStore<C>) -> Self {
        Self {
            store,
            input_mode: InputMode::Normal,
            name_buf: String::new(),
            city_cursor: 0,
            table_state: TableState::default(),
            should_quit: false,
        }
    }

    pub const fn store(&self) -> &DirectoryStore<C> {
        &self.store
    }

    #[cfg(test)]
    pub const fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[cfg(test)]
    pub const fn selected(&self) -> Option<usize> {
        self.table_state.selected()
    }

    /// Mark the fetch as started.
    pub fn begin_load(&mut self) -> Result<(), StoreError> {
        self.store.begin_load()
    }

    /// Hand the fetch result to the store.
    pub fn finish_load(
        &mut self,
        result: Result<Vec<PersonRecord>, DataAccessError>,
    ) -> Result<(), StoreError> {
        self.store.finish_load(result)?;
        self.clamp_selection();
        Ok(())
    }

    /// Advance the store's timer. Returns `true` if the table changed.
    pub fn tick(&mut self) -> bool {
        let recomputed = self.store.tick();
        if recomputed {
            self.clamp_selection();
        }
        recomputed
    }

    /// How long the event loop may block before the next tick is due.
    pub fn poll_timeout(&self) -> Duration {
        self.store
            .time_until_recompute()
            .map_or(POLL_INTERVAL, |remaining| remaining.min(POLL_INTERVAL))
    }

    /// Cancel any pending recompute; called once the loop exits.
    pub fn shutdown(&mut self) {
        self.store.teardown();
    }

    // -----------------------------------------------------------------------
    // Keys
    // -----------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Name => self.handle_name_key(key),
            InputMode::CityPicker => self.handle_picker_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('/') => self.input_mode = InputMode::Name,
            KeyCode::Char('c') => self.open_city_picker(),
            KeyCode::Char('h') => self.store.toggle_highlight_oldest(),
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Char('g') | KeyCode::Home => self.select_first(),
            KeyCode::Char('G') | KeyCode::End => self.select_last(),
            _ => {}
        }
    }

    fn handle_name_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Backspace => {
                self.name_buf.pop();
                self.store.search_by_name(self.name_buf.as_str());
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.name_buf.clear();
                self.store.search_by_name("");
            }
            KeyCode::Char(c) => {
                self.name_buf.push(c);
                self.store.search_by_name(self.name_buf.as_str());
            }
            _ => {}
        }
    }

    fn open_city_picker(&mut self) {
        let current = self.store.pending_criteria().city.as_str();
        self.city_cursor = if current.is_empty() {
            0
        } else {
            self.store
                .cities()
                .iter()
                .position(|city| city == current)
                .map_or(0, |idx| idx + 1)
        };
        self.input_mode = InputMode::CityPicker;
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let options = self.store.cities().len() + 1;
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Char('j') | KeyCode::Down => {
                self.city_cursor = (self.city_cursor + 1).min(options - 1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.city_cursor = self.city_cursor.saturating_sub(1);
            }
            KeyCode::Enter => {
                let city = self
                    .city_cursor
                    .checked_sub(1)
                    .and_then(|idx| self.store.cities().get(idx))
                    .cloned()
                    .unwrap_or_default();
                debug!(city = %city, "city picked");
                self.store.filter_by_city(city);
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    fn row_count(&self) -> usize {
        self.store.filtered_records().len()
    }

    fn clamp_selection(&mut self) {
        let count = self.row_count();
        let next = match self.table_state.selected() {
            _ if count == 0 => None,
            None => Some(0),
            Some(idx) => Some(idx.min(count - 1)),
        };
        self.table_state.select(next);
    }

    fn select_next(&mut self) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        let next = self.table_state.selected().map_or(0, |idx| (idx + 1).min(count - 1));
        self.table_state.select(Some(next));
    }

    fn select_prev(&mut self) {
        if self.row_count() == 0 {
            return;
        }
        let prev = self.table_state.selected().map_or(0, |idx| idx.saturating_sub(1));
        self.table_state.select(Some(prev));
    }

    fn select_first(&mut self) {
        if self.row_count() > 0 {
            self.table_state.select(Some(0));
        }
    }

    fn select_last(&mut self) {
        let count = self.row_count();
        if count > 0 {
            self.table_state.select(Some(count - 1));
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        frame.render_widget(self.filter_bar(), chunks[0]);
        self.render_body(frame, chunks[1]);
        frame.render_widget(Paragraph::new(self.status_bar()), chunks[2]);

        if self.input_mode == InputMode::CityPicker {
            self.render_city_picker(frame, area);
        }
    }

    fn filter_bar(&self) -> Paragraph<'static> {
        let label = Style::default().fg(Color::DarkGray);
        let value = Style::default().fg(Color::Cyan);

        let name = if self.input_mode == InputMode::Name {
            format!("{}_", self.name_buf)
        } else {
            self.name_buf.clone()
        };
        let city = match self.store.pending_criteria().city.as_str() {
            "" => ALL_CITIES_LABEL.to_string(),
            other => other.to_string(),
        };
        let highlight = if self.store.highlight_enabled() {
            "on"
        } else {
            "off"
        };

        let line = Line::from(vec![
            Span::styled("Name: ", label),
            Span::styled(name, value),
            Span::styled("   City: ", label),
            Span::styled(city, value),
            Span::styled("   Highlight oldest: ", label),
            Span::styled(highlight, value),
        ]);
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" roster "))
    }

    fn render_body(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(" users ");
        match self.store.view() {
            DirectoryView::Loading => {
                let text = Paragraph::new("Loading users…")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block);
                frame.render_widget(text, area);
            }
            DirectoryView::Error(message) => {
                let text = Paragraph::new(format!("Error: {message}"))
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true })
                    .block(block);
                frame.render_widget(text, area);
            }
            DirectoryView::Empty => {
                let text = Paragraph::new(EMPTY_RESULT_MESSAGE)
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block);
                frame.render_widget(text, area);
            }
            DirectoryView::Rows(records) => {
                let rows: Vec<Row<'static>> = records
                    .iter()
                    .map(|record| build_row(record, self.store.is_oldest_in_city(record)))
                    .collect();
                let header = Row::new(["Name", "City", "Birthday", ""])
                    .style(Style::default().add_modifier(Modifier::BOLD));
                let widths = [
                    Constraint::Min(20),
                    Constraint::Length(20),
                    Constraint::Length(10),
                    Constraint::Length(6),
                ];
                let table = Table::new(rows, widths)
                    .header(header)
                    .block(block)
                    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
                frame.render_stateful_widget(table, area, &mut self.table_state);
            }
        }
    }

    fn status_bar(&self) -> Line<'static> {
        let key = Style::default().fg(Color::Cyan);
        let dim = Style::default().fg(Color::DarkGray);

        let mut spans: Vec<Span<'static>> = match self.input_mode {
            InputMode::Name => vec![
                Span::styled("TYPE", key),
                Span::styled(" filter  ", dim),
                Span::styled("ENTER/ESC", key),
                Span::styled(" done  ", dim),
            ],
            InputMode::CityPicker => vec![
                Span::styled("j/k", key),
                Span::styled(" move  ", dim),
                Span::styled("ENTER", key),
                Span::styled(" pick  ", dim),
                Span::styled("ESC", key),
                Span::styled(" close  ", dim),
            ],
            InputMode::Normal => vec![
                Span::styled("/", key),
                Span::styled(" name  ", dim),
                Span::styled("c", key),
                Span::styled(" city  ", dim),
                Span::styled("h", key),
                Span::styled(" oldest  ", dim),
                Span::styled("q", key),
                Span::styled(" quit  ", dim),
            ],
        };

        if self.store.load_state().is_ready() {
            spans.push(Span::styled(
                format!(
                    "{}/{} users",
                    self.store.filtered_records().len(),
                    self.store.all_records().len()
                ),
                dim,
            ));
        }
        if self.store.is_recompute_pending() {
            spans.push(Span::styled("  debouncing…", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    }

    fn render_city_picker(&self, frame: &mut Frame<'_>, area: Rect) {
        let mut items = vec![ListItem::new(ALL_CITIES_LABEL)];
        items.extend(
            self.store
                .cities()
                .iter()
                .map(|city| ListItem::new(city_label(city).to_string())),
        );

        let popup = centered_rect(area, 40, 60);
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" city "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default().with_selected(Some(self.city_cursor));

        frame.render_widget(Clear, popup);
        frame.render_stateful_widget(list, popup, &mut state);
    }
}

const fn city_label(city: &str) -> &str {
    if city.is_empty() { NO_CITY_LABEL } else { city }
}

fn build_row(record: &PersonRecord, oldest: bool) -> Row<'static> {
    let cells = [
        Cell::from(record.full_name()),
        Cell::from(city_label(&record.city).to_string()),
        Cell::from(format_birth_date(record.birth_date)),
        Cell::from(if oldest { "oldest" } else { "" }),
    ];
    let row = Row::new(cells);
    if oldest {
        row.style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        row
    }
}

/// Rect of `percent_x` × `percent_y` centered in `area`.
fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
