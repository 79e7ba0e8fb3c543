//! Typed action dispatch over the collaborators
//!
//! A [`Controller`] owns the view state and the latest location snapshot.
//! Every user intent arrives as an [`Action`]; [`Controller::dispatch`] awaits
//! the collaborator call, reloads the snapshot and turns any failure into a
//! single [`Message`]. Nothing a collaborator returns as an error escapes it.

use serde::Serialize;
use std::path::Path;

use crate::distance::DistanceUnit;
use crate::error::{LocbookError, StoreError, ValidationError};
use crate::location::{validate_rate, Geo, LatLng, Location, LocationDraft};
use crate::messages::Message;
use crate::render::{render_records, LocationRecord, RenderContext};
use crate::segments::{to_segments, PieChart};
use crate::stats::{aggregate_by_rate, aggregate_by_recency, StatBucketMap};
use crate::store::{JsonFileStore, JsonPreferenceStore, LocationStore, PreferenceStore};
use crate::theme::{self, Theme};
use crate::view_state::{FilterSpec, FilterUpdate, SortSpec, ViewState};

/// Everything a user can ask the application to do
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// `rate` is raw input and is validated before the store is touched
    AddLocation { name: String, rate: i64, geo: Geo },
    UpdateRate { id: String, rate: i64 },
    RemoveLocation { id: String },
    /// `None` clears the selection
    Select { id: Option<String> },
    SetSort(Option<SortSpec>),
    SetFilter(FilterUpdate),
    Locate(LatLng),
    ChooseTheme(Theme),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddLocation { .. } => "add location",
            Action::UpdateRate { .. } => "update rate",
            Action::RemoveLocation { .. } => "remove location",
            Action::Select { .. } => "select location",
            Action::SetSort(_) => "sort",
            Action::SetFilter(_) => "filter",
            Action::Locate(_) => "locate",
            Action::ChooseTheme(_) => "choose theme",
        }
    }
}

/// Derived output of one render pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub records: Vec<LocationRecord>,
    pub rate_chart: PieChart,
    pub recency_chart: PieChart,
    pub rate_stats: StatBucketMap,
    pub recency_stats: StatBucketMap,
    pub filter_by: FilterSpec,
    pub share_params: Vec<(&'static str, String)>,
}

pub struct Controller<S, P> {
    store: S,
    prefs: P,
    view: ViewState,
    locations: Vec<Location>,
    theme: Theme,
    unit: DistanceUnit,
    messages: Vec<Message>,
}

impl<S: LocationStore, P: PreferenceStore> Controller<S, P> {
    pub fn new(store: S, prefs: P, unit: DistanceUnit) -> Self {
        Self {
            store,
            prefs,
            view: ViewState::new(),
            locations: Vec::new(),
            theme: Theme::default(),
            unit,
            messages: Vec::new(),
        }
    }

    /// Load the stored theme and the first snapshot
    pub async fn init(&mut self) {
        match theme::load_theme(&self.prefs).await {
            Ok(Some(theme)) => self.theme = theme,
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to load theme");
                self.messages.push(Message::error(format!("Failed to load theme: {}", e)));
            }
        }
        if let Err(e) = self.reload().await {
            tracing::error!(error = %e, "Failed to load locations");
            self.messages
                .push(Message::error(format!("Failed to load locations: {}", e)));
        }
    }

    /// Apply `action`; returns whether it succeeded
    ///
    /// Failures never propagate: each one is logged and becomes one message,
    /// and the previous snapshot and view stay in place.
    pub async fn dispatch(&mut self, action: Action) -> bool {
        let name = action.name();
        tracing::debug!(action = ?action, "Dispatching");

        match self.apply(action).await {
            Ok(message) => {
                if let Some(message) = message {
                    self.messages.push(message);
                }
                true
            }
            Err(LocbookError::Store(e)) if e.is_not_found() => {
                tracing::warn!(action = name, error = %e, "Missing location");
                self.messages.push(Message::warning(e.to_string()));
                false
            }
            Err(LocbookError::Validation(e)) => {
                tracing::warn!(action = name, error = %e, "Rejected input");
                self.messages.push(Message::warning(e.to_string()));
                false
            }
            Err(e) => {
                tracing::error!(action = name, error = %e, "Action failed");
                self.messages
                    .push(Message::error(format!("Failed to {}: {}", name, e)));
                false
            }
        }
    }

    async fn apply(&mut self, action: Action) -> Result<Option<Message>, LocbookError> {
        match action {
            Action::AddLocation { name, rate, geo } => {
                let rate = validate_rate(rate)?;
                geo.lat_lng().validate()?;
                let saved = self.store.save(LocationDraft::new(&name, rate, geo)).await?;
                tracing::info!(id = %saved.id, name = %saved.name, "Location added");
                self.view.select(Some(saved.id.clone()));
                self.reload().await?;
                Ok(Some(Message::success(format!("Added '{}'", saved.name))))
            }
            Action::UpdateRate { id, rate } => {
                let rate = validate_rate(rate)?;
                let current = self.store.get_by_id(&id).await?;
                if current.rate == rate {
                    return Ok(None);
                }
                let mut draft = LocationDraft::from(current);
                draft.rate = rate;
                let saved = self.store.save(draft).await?;
                tracing::info!(id = %saved.id, rate, "Rate updated");
                self.reload().await?;
                Ok(Some(Message::success(format!(
                    "'{}' is now {}",
                    saved.name,
                    saved.stars()
                ))))
            }
            Action::RemoveLocation { id } => {
                self.store.remove(&id).await?;
                tracing::info!(id = %id, "Location removed");
                if self.view.selected_id() == Some(id.as_str()) {
                    self.view.select(None);
                }
                self.reload().await?;
                Ok(Some(Message::success("Location removed")))
            }
            Action::Select { id: None } => {
                self.view.select(None);
                Ok(None)
            }
            Action::Select { id: Some(id) } => {
                let loc = self.store.get_by_id(&id).await?;
                self.view.select(Some(loc.id));
                Ok(None)
            }
            Action::SetSort(sort_by) => {
                self.view.set_sort_by(sort_by);
                self.reload().await?;
                Ok(None)
            }
            Action::SetFilter(update) => {
                let spec = self.view.set_filter_by(update);
                tracing::debug!(txt = %spec.txt, min_rate = spec.min_rate, "Filter set");
                self.reload().await?;
                Ok(None)
            }
            Action::Locate(pos) => {
                pos.validate()?;
                if !self.view.set_user_position(pos) {
                    return Ok(Some(Message::info("Your position is already known")));
                }
                self.view.select(None);
                Ok(Some(Message::success(format!(
                    "Your position: {}",
                    pos.format_coordinates()
                ))))
            }
            Action::ChooseTheme(theme) => {
                theme::save_theme(&self.prefs, theme).await?;
                self.theme = theme;
                Ok(Some(Message::success(format!("Theme set to {}", theme))))
            }
        }
    }

    /// Replace the snapshot with the store's current contents
    ///
    /// The snapshot is only replaced on success.
    pub async fn reload(&mut self) -> Result<(), StoreError> {
        self.locations = self.store.query(None, None).await?;
        tracing::debug!(count = self.locations.len(), "Snapshot reloaded");
        Ok(())
    }

    /// Visible records, stats and charts for the current snapshot
    ///
    /// Stats cover every stored location, not just the visible ones.
    pub fn dashboard(&self, now_ms: i64) -> Dashboard {
        let visible = self.view.derive_visible_list(&self.locations);
        let ctx = RenderContext {
            user_pos: self.view.user_position(),
            selected_id: self.view.active_id(&visible),
            unit: self.unit,
            now_ms,
        };
        let rate_stats = aggregate_by_rate(&self.locations);
        let recency_stats = aggregate_by_recency(&self.locations, now_ms);

        Dashboard {
            records: render_records(&visible, &ctx),
            rate_chart: to_segments(&rate_stats),
            recency_chart: to_segments(&recency_stats),
            rate_stats,
            recency_stats,
            filter_by: self.view.filter_by().clone(),
            share_params: self.view.query_params(),
        }
    }

    pub fn share_url(&self, base: &str) -> Result<reqwest::Url, ValidationError> {
        self.view.share_url(base)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// The selected location, if it is still in the snapshot
    pub fn selected_location(&self) -> Option<&Location> {
        let id = self.view.selected_id()?;
        self.locations.iter().find(|loc| loc.id == id)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn take_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }
}

/// Controller over the JSON file stores of one data directory
pub type LocalController = Controller<JsonFileStore, JsonPreferenceStore>;

impl LocalController {
    /// Open the stores in `data_dir` and load the first snapshot
    pub async fn open(data_dir: &Path, unit: DistanceUnit) -> Self {
        let mut ctrl = Controller::new(
            JsonFileStore::in_dir(data_dir),
            JsonPreferenceStore::in_dir(data_dir),
            unit,
        );
        ctrl.init().await;
        ctrl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::MessageType;
    use crate::utils::now_ms;
    use crate::view_state::SortField;
    use async_trait::async_trait;
    use serde_json::Value;
    use tempfile::TempDir;

    async fn controller(dir: &TempDir) -> LocalController {
        crate::logging::init_test();
        LocalController::open(dir.path(), DistanceUnit::Kilometers).await
    }

    fn add(name: &str, rate: i64) -> Action {
        Action::AddLocation {
            name: name.to_string(),
            rate,
            geo: Geo::new(32.08, 34.78, "Tel Aviv"),
        }
    }

    fn last_message<S: LocationStore, P: PreferenceStore>(
        ctrl: &Controller<S, P>,
    ) -> (MessageType, String) {
        let m = ctrl.messages().last().expect("a message");
        (m.message_type, m.text.clone())
    }

    #[tokio::test]
    async fn test_add_selects_and_reloads() {
        let dir = TempDir::new().unwrap();
        let mut ctrl = controller(&dir).await;

        assert!(ctrl.dispatch(add("", 4)).await);
        assert_eq!(ctrl.locations().len(), 1);
        let loc = &ctrl.locations()[0];
        assert_eq!(loc.name, crate::location::DEFAULT_NAME);
        assert_eq!(ctrl.view().selected_id(), Some(loc.id.as_str()));

        let dashboard = ctrl.dashboard(now_ms());
        assert_eq!(dashboard.records.len(), 1);
        assert!(dashboard.records[0].active);
    }

    #[tokio::test]
    async fn test_invalid_rate_never_reaches_store() {
        let dir = TempDir::new().unwrap();
        let mut ctrl = controller(&dir).await;

        assert!(!ctrl.dispatch(add("Bad", 9)).await);
        assert!(ctrl.locations().is_empty());
        assert!(!ctrl.store().path().exists());
        assert_eq!(last_message(&ctrl).0, MessageType::Warning);
    }

    #[tokio::test]
    async fn test_update_rate_and_noop() {
        let dir = TempDir::new().unwrap();
        let mut ctrl = controller(&dir).await;
        ctrl.dispatch(add("Cafe", 2)).await;
        let id = ctrl.locations()[0].id.clone();
        let before = ctrl.locations()[0].clone();

        let count = ctrl.messages().len();
        assert!(ctrl.dispatch(Action::UpdateRate { id: id.clone(), rate: 2 }).await);
        assert_eq!(ctrl.messages().len(), count);
        assert_eq!(ctrl.locations()[0], before);

        assert!(ctrl.dispatch(Action::UpdateRate { id, rate: 5 }).await);
        let after = &ctrl.locations()[0];
        assert_eq!(after.rate, 5);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn test_missing_ids_warn() {
        let dir = TempDir::new().unwrap();
        let mut ctrl = controller(&dir).await;

        for action in [
            Action::UpdateRate {
                id: "ghost".to_string(),
                rate: 3,
            },
            Action::RemoveLocation {
                id: "ghost".to_string(),
            },
            Action::Select {
                id: Some("ghost".to_string()),
            },
        ] {
            assert!(!ctrl.dispatch(action).await);
            let (kind, text) = last_message(&ctrl);
            assert_eq!(kind, MessageType::Warning);
            assert!(text.contains("ghost"));
        }
        assert_eq!(ctrl.view().selected_id(), None);
    }

    #[tokio::test]
    async fn test_remove_clears_selection() {
        let dir = TempDir::new().unwrap();
        let mut ctrl = controller(&dir).await;
        ctrl.dispatch(add("Gone soon", 3)).await;
        let id = ctrl.locations()[0].id.clone();

        assert!(ctrl.dispatch(Action::RemoveLocation { id }).await);
        assert!(ctrl.locations().is_empty());
        assert_eq!(ctrl.view().selected_id(), None);
    }

    #[tokio::test]
    async fn test_sort_filter_and_share() {
        let dir = TempDir::new().unwrap();
        let mut ctrl = controller(&dir).await;
        ctrl.dispatch(add("Park A", 4)).await;
        ctrl.dispatch(add("Park B", 2)).await;
        ctrl.dispatch(add("Lake", 5)).await;

        ctrl.dispatch(Action::SetSort(Some(SortSpec::new(SortField::Rate, true))))
            .await;
        let names: Vec<String> = ctrl
            .dashboard(now_ms())
            .records
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Lake", "Park A", "Park B"]);

        ctrl.dispatch(Action::SetFilter(FilterUpdate::from_raw(Some("park"), Some("3"))))
            .await;
        let dashboard = ctrl.dashboard(now_ms());
        assert_eq!(dashboard.records.len(), 1);
        assert_eq!(dashboard.records[0].name, "Park A");
        // Stats still cover everything
        assert_eq!(dashboard.rate_stats.total(), 3);
        // The last added location is still selected but filtered out
        assert!(dashboard.records.iter().all(|r| !r.active));

        let url = ctrl.share_url("https://example.com/").unwrap();
        assert!(url.as_str().contains("txt=park"));
        assert!(url.as_str().contains("minRate=3"));
    }

    #[tokio::test]
    async fn test_locate_once() {
        let dir = TempDir::new().unwrap();
        let mut ctrl = controller(&dir).await;
        ctrl.dispatch(add("Here", 3)).await;

        assert!(ctrl.dispatch(Action::Locate(LatLng::new(32.08, 34.78))).await);
        assert_eq!(ctrl.view().selected_id(), None);
        let record = &ctrl.dashboard(now_ms()).records[0];
        assert_eq!(record.distance.map(|d| d.value), Some(0.0));

        assert!(ctrl.dispatch(Action::Locate(LatLng::new(0.0, 0.0))).await);
        assert_eq!(last_message(&ctrl).0, MessageType::Info);
        assert_eq!(ctrl.view().user_position(), Some(LatLng::new(32.08, 34.78)));

        assert!(!ctrl.dispatch(Action::Locate(LatLng::new(120.0, 0.0))).await);
    }

    #[tokio::test]
    async fn test_theme_persists() {
        let dir = TempDir::new().unwrap();
        let mut ctrl = controller(&dir).await;
        assert_eq!(ctrl.theme(), Theme::Blue);

        assert!(ctrl.dispatch(Action::ChooseTheme(Theme::Pink)).await);
        let ctrl = controller(&dir).await;
        assert_eq!(ctrl.theme(), Theme::Pink);
    }

    struct BrokenPrefs;

    #[async_trait]
    impl PreferenceStore for BrokenPrefs {
        async fn query(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Err(StoreError::Corrupt("preferences".to_string()))
        }

        async fn post_value(&self, _key: &str, _value: Value) -> Result<(), StoreError> {
            Err(StoreError::WriteFailed {
                path: "preferences.json".to_string(),
                reason: "read-only".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_collaborator_failure_keeps_state() {
        let dir = TempDir::new().unwrap();
        let mut ctrl = Controller::new(
            JsonFileStore::in_dir(dir.path()),
            BrokenPrefs,
            DistanceUnit::Miles,
        );
        ctrl.init().await;
        assert_eq!(last_message(&ctrl).0, MessageType::Error);

        assert!(!ctrl.dispatch(Action::ChooseTheme(Theme::Green)).await);
        let (kind, text) = last_message(&ctrl);
        assert_eq!(kind, MessageType::Error);
        assert!(text.contains("read-only"));
        assert_eq!(ctrl.theme(), Theme::Blue);

        assert_eq!(ctrl.take_messages().len(), 2);
        assert!(ctrl.messages().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_store_keeps_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut ctrl = controller(&dir).await;
        ctrl.dispatch(add("Keep me", 4)).await;

        std::fs::write(ctrl.store().path(), "{broken").unwrap();
        assert!(!ctrl.dispatch(Action::SetFilter(FilterUpdate::txt("keep"))).await);
        assert_eq!(last_message(&ctrl).0, MessageType::Error);
        assert_eq!(ctrl.locations().len(), 1);
    }
}
