//! Application state and logic for the interactive UI

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use tui_input::Input;

use crate::controller::{Action, Dashboard, LocalController};
use crate::geocode::Geocoder;
use crate::location::{Geo, Location, MAX_RATE};
use crate::messages::Message;
use crate::render::LocationRecord;
use crate::utils::now_ms;
use crate::view_state::{FilterUpdate, SortField, SortSpec};

use super::form::{input_request, LocationForm, PlaceInput};

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Browsing the list
    Normal,
    /// Filling the add-location form
    AddLocation,
    /// Waiting for a 1-5 key for the location under the cursor
    EditRate,
    /// Confirming removal
    ConfirmRemove,
    /// Typing the name filter
    Filter,
    /// Help screen
    Help,
}

/// Main application state
pub struct App {
    pub ctrl: LocalController,
    geocoder: Box<dyn Geocoder>,
    pub share_base_url: String,
    pub mode: AppMode,
    /// Row under the cursor in the visible list
    pub cursor: usize,
    /// Derived view of the controller state, refreshed after every action
    pub dashboard: Dashboard,
    /// Messages to display
    pub messages: Vec<Message>,
    pub form: Option<LocationForm>,
    pub filter_input: Input,
    /// Filter text to restore when filter editing is cancelled
    filter_backup: String,
    /// Location targeted by the rate editor or the removal confirmation
    pub target_id: Option<String>,
}

impl App {
    pub fn new(mut ctrl: LocalController, geocoder: Box<dyn Geocoder>, share_base_url: String) -> Self {
        let mut messages = ctrl.take_messages();
        if messages.is_empty() {
            messages.push(Message::info(format!(
                "{} locations loaded. Press ? for help",
                ctrl.locations().len()
            )));
        }
        let dashboard = ctrl.dashboard(now_ms());

        App {
            ctrl,
            geocoder,
            share_base_url,
            mode: AppMode::Normal,
            cursor: 0,
            dashboard,
            messages,
            form: None,
            filter_input: Input::default(),
            filter_backup: String::new(),
            target_id: None,
        }
    }

    /// Pull new messages and recompute the dashboard
    fn refresh(&mut self) {
        self.messages.extend(self.ctrl.take_messages());
        self.dashboard = self.ctrl.dashboard(now_ms());
        self.cursor = self
            .cursor
            .min(self.dashboard.records.len().saturating_sub(1));
    }

    async fn dispatch(&mut self, action: Action) -> bool {
        let ok = self.ctrl.dispatch(action).await;
        self.refresh();
        ok
    }

    /// Drop expired messages; the removal prompt stays while it is pending
    pub fn on_tick(&mut self) {
        if self.mode != AppMode::ConfirmRemove {
            self.messages.retain(|m| !m.is_expired());
        }
        // Ages such as "3 minutes ago" move with the clock
        self.dashboard = self.ctrl.dashboard(now_ms());
    }

    /// Handle keyboard events; returns false when the app should exit
    pub async fn handle_event(&mut self, event: KeyEvent) -> Result<bool> {
        match self.mode {
            AppMode::Normal => self.handle_normal_mode(event).await,
            AppMode::Help => self.handle_help_mode(event),
            AppMode::AddLocation => self.handle_add_mode(event).await,
            AppMode::EditRate => self.handle_edit_rate_mode(event).await,
            AppMode::ConfirmRemove => self.handle_remove_mode(event).await,
            AppMode::Filter => self.handle_filter_mode(event).await,
        }
    }

    async fn handle_normal_mode(&mut self, event: KeyEvent) -> Result<bool> {
        match event.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                return Ok(false);
            }
            KeyCode::Char('?') => {
                self.mode = AppMode::Help;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.dashboard.records.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.cursor_id() {
                    self.dispatch(Action::Select { id: Some(id) }).await;
                }
            }
            KeyCode::Esc => {
                self.dispatch(Action::Select { id: None }).await;
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.start_add_mode();
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(record) = self.cursor_record() {
                    let prompt = format!("Rate '{}': press 1-5, Esc to cancel", record.name);
                    self.target_id = Some(record.id.clone());
                    self.mode = AppMode::EditRate;
                    self.messages.push(Message::info(prompt));
                }
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                if let Some(record) = self.cursor_record() {
                    let prompt = format!(
                        "Remove '{}'? Press 'y' to confirm, any other key to cancel",
                        record.name
                    );
                    self.target_id = Some(record.id.clone());
                    self.mode = AppMode::ConfirmRemove;
                    self.messages.clear();
                    self.messages.push(Message::warning(prompt));
                }
            }
            KeyCode::Char('/') => {
                self.filter_backup = self.dashboard.filter_by.txt.clone();
                self.filter_input = Input::new(self.filter_backup.clone());
                self.mode = AppMode::Filter;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.shift_min_rate(1.0).await;
            }
            KeyCode::Char('-') => {
                self.shift_min_rate(-1.0).await;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                let next = next_sort(self.ctrl.view().sort_by().copied());
                self.dispatch(Action::SetSort(next)).await;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if let Some(spec) = self.ctrl.view().sort_by().copied() {
                    let reversed = SortSpec {
                        field: spec.field,
                        direction: spec.direction.reversed(),
                    };
                    self.dispatch(Action::SetSort(Some(reversed))).await;
                }
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.locate().await;
            }
            KeyCode::Char('t') | KeyCode::Char('T') => {
                let next = self.ctrl.theme().next();
                self.dispatch(Action::ChooseTheme(next)).await;
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.copy_share_link();
            }
            _ => {}
        }
        Ok(true)
    }

    fn handle_help_mode(&mut self, _event: KeyEvent) -> Result<bool> {
        self.mode = AppMode::Normal;
        Ok(true)
    }

    async fn handle_add_mode(&mut self, event: KeyEvent) -> Result<bool> {
        let Some(form) = &mut self.form else {
            self.mode = AppMode::Normal;
            return Ok(true);
        };

        match event.code {
            KeyCode::Esc => {
                self.form = None;
                self.mode = AppMode::Normal;
                self.messages.push(Message::info("Add cancelled"));
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Enter => {
                self.submit_form().await;
            }
            _ => {
                form.handle_key(event);
            }
        }
        Ok(true)
    }

    async fn handle_edit_rate_mode(&mut self, event: KeyEvent) -> Result<bool> {
        match event.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.mode = AppMode::Normal;
                if let Some(id) = self.target_id.take() {
                    let rate = i64::from(c.to_digit(10).unwrap_or(0));
                    self.dispatch(Action::UpdateRate { id, rate }).await;
                }
            }
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.target_id = None;
                self.messages.push(Message::info("Rate unchanged"));
            }
            _ => {}
        }
        Ok(true)
    }

    async fn handle_remove_mode(&mut self, event: KeyEvent) -> Result<bool> {
        self.mode = AppMode::Normal;
        self.messages.clear();
        let id = self.target_id.take();

        match (event.code, id) {
            (KeyCode::Char('y') | KeyCode::Char('Y'), Some(id)) => {
                self.dispatch(Action::RemoveLocation { id }).await;
            }
            _ => {
                self.messages.push(Message::info("Removal cancelled"));
            }
        }
        Ok(true)
    }

    async fn handle_filter_mode(&mut self, event: KeyEvent) -> Result<bool> {
        match event.code {
            KeyCode::Enter => {
                self.mode = AppMode::Normal;
            }
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                let restore = FilterUpdate::txt(self.filter_backup.clone());
                self.dispatch(Action::SetFilter(restore)).await;
            }
            _ => {
                if let Some(request) = input_request(&event) {
                    if self.filter_input.handle(request).is_some() {
                        let update = FilterUpdate::txt(self.filter_input.value());
                        self.dispatch(Action::SetFilter(update)).await;
                    }
                }
            }
        }
        Ok(true)
    }

    fn start_add_mode(&mut self) {
        self.form = Some(LocationForm::new());
        self.mode = AppMode::AddLocation;
        self.messages.push(Message::info(
            "Add mode - Tab to navigate fields, Enter to save, Esc to cancel",
        ));
    }

    async fn submit_form(&mut self) {
        let submission = match self.form.as_ref().map(LocationForm::validate) {
            Some(Ok(submission)) => submission,
            Some(Err(err)) => {
                self.messages
                    .push(Message::error(format!("Validation error: {}", err)));
                return;
            }
            None => return,
        };

        let geo = match submission.place {
            PlaceInput::Coordinates(pos) => Geo::new(pos.lat, pos.lng, pos.format_coordinates()),
            PlaceInput::Address(text) => match self.geocoder.lookup_address(&text).await {
                Ok(geo) => geo,
                Err(e) => {
                    tracing::error!(query = %text, error = %e, "Address lookup failed");
                    self.messages
                        .push(Message::error(format!("Address lookup failed: {}", e)));
                    return;
                }
            },
        };

        let action = Action::AddLocation {
            name: submission.name,
            rate: submission.rate,
            geo,
        };
        // The form stays open when the controller rejects it
        if self.dispatch(action).await {
            self.form = None;
            self.mode = AppMode::Normal;
            self.focus_active();
        }
    }

    async fn shift_min_rate(&mut self, delta: f64) {
        let current = self.dashboard.filter_by.min_rate.floor();
        let min_rate = (current + delta).clamp(0.0, f64::from(MAX_RATE));
        if min_rate != self.dashboard.filter_by.min_rate {
            self.dispatch(Action::SetFilter(FilterUpdate::min_rate(min_rate)))
                .await;
        }
    }

    async fn locate(&mut self) {
        // A known position is final; let the controller report it without a lookup
        let pos = match self.ctrl.view().user_position() {
            Some(pos) => pos,
            None => match self.geocoder.user_position().await {
                Ok(pos) => pos,
                Err(e) => {
                    tracing::error!(error = %e, "Position lookup failed");
                    self.messages
                        .push(Message::error(format!("Could not find your position: {}", e)));
                    return;
                }
            },
        };
        self.dispatch(Action::Locate(pos)).await;
    }

    fn copy_share_link(&mut self) {
        let url = match self.ctrl.share_url(&self.share_base_url) {
            Ok(url) => url.to_string(),
            Err(e) => {
                self.messages.push(Message::error(e.to_string()));
                return;
            }
        };

        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(url.clone()));
        match copied {
            Ok(()) => self.messages.push(Message::success(format!("Link copied: {}", url))),
            Err(e) => {
                tracing::warn!(error = %e, "Clipboard unavailable");
                self.messages.push(Message::warning(format!("Link: {}", url)));
            }
        }
    }

    /// Move the cursor onto the active record, if it is visible
    fn focus_active(&mut self) {
        if let Some(idx) = self.dashboard.records.iter().position(|r| r.active) {
            self.cursor = idx;
        }
    }

    pub fn cursor_record(&self) -> Option<&LocationRecord> {
        self.dashboard.records.get(self.cursor)
    }

    fn cursor_id(&self) -> Option<String> {
        self.cursor_record().map(|r| r.id.clone())
    }

    /// The selected location and its list record, when it is visible
    pub fn selected(&self) -> Option<(&Location, Option<&LocationRecord>)> {
        let loc = self.ctrl.selected_location()?;
        let record = self.dashboard.records.iter().find(|r| r.id == loc.id);
        Some((loc, record))
    }
}

/// Sort cycle: unsorted, then each field ascending-or-current-direction, then unsorted again
fn next_sort(current: Option<SortSpec>) -> Option<SortSpec> {
    let last = SortField::ALL[SortField::ALL.len() - 1];
    match current {
        None => Some(SortSpec::new(SortField::ALL[0], false)),
        Some(spec) if spec.field == last => None,
        Some(spec) => Some(SortSpec {
            field: spec.field.next(),
            direction: spec.direction,
        }),
    }
}
