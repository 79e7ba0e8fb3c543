//! Persistence collaborators
//!
//! The core only sees the async [`LocationStore`] and [`PreferenceStore`]
//! traits. The JSON file implementations below keep one document per store
//! under the data directory.

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::StoreError;
use crate::location::{Geo, Location, LocationDraft};
use crate::utils::now_ms;
use crate::view_state::{FilterSpec, SortSpec};

const ID_LENGTH: usize = 5;

#[async_trait]
pub trait LocationStore: Send + Sync {
    /// All locations, optionally filtered and sorted
    async fn query(
        &self,
        filter_by: Option<&FilterSpec>,
        sort_by: Option<&SortSpec>,
    ) -> Result<Vec<Location>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Location, StoreError>;

    /// Insert when `draft.id` is `None`, otherwise update; always stamps `updated_at`
    async fn save(&self, draft: LocationDraft) -> Result<Location, StoreError>;

    async fn remove(&self, id: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn query(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn post_value(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

pub fn make_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

async fn read_json<T: serde::de::DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    let data = match fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => {
            return Err(StoreError::ReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    };
    if data.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&data)
        .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let write_failed = |reason: String| StoreError::WriteFailed {
        path: path.display().to_string(),
        reason,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| write_failed(e.to_string()))?;
    }
    let data = serde_json::to_string_pretty(value).map_err(|e| write_failed(e.to_string()))?;
    fs::write(path, data)
        .await
        .map_err(|e| write_failed(e.to_string()))
}

/// Locations stored as a JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub const FILE_NAME: &'static str = "locations.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Location>, StoreError> {
        read_json(&self.path).await
    }

    async fn persist(&self, locations: &[Location]) -> Result<(), StoreError> {
        write_json(&self.path, &locations).await
    }

    /// Populate an empty store with a few sample places; returns how many were added
    pub async fn seed_if_empty(&self) -> Result<usize, StoreError> {
        if !self.load().await?.is_empty() {
            return Ok(0);
        }
        let demo = demo_locations();
        let count = demo.len();
        self.persist(&demo).await?;
        tracing::info!(count, path = %self.path.display(), "Seeded demo locations");
        Ok(count)
    }
}

#[async_trait]
impl LocationStore for JsonFileStore {
    async fn query(
        &self,
        filter_by: Option<&FilterSpec>,
        sort_by: Option<&SortSpec>,
    ) -> Result<Vec<Location>, StoreError> {
        let mut locations = self.load().await?;
        if let Some(filter_by) = filter_by {
            locations.retain(|loc| filter_by.matches(loc));
        }
        if let Some(sort_by) = sort_by {
            locations.sort_by(|a, b| sort_by.compare(a, b));
        }
        Ok(locations)
    }

    async fn get_by_id(&self, id: &str) -> Result<Location, StoreError> {
        self.load()
            .await?
            .into_iter()
            .find(|loc| loc.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn save(&self, draft: LocationDraft) -> Result<Location, StoreError> {
        let mut locations = self.load().await?;
        let now = now_ms();

        let saved = match draft.id {
            Some(id) => {
                let existing = locations
                    .iter_mut()
                    .find(|loc| loc.id == id)
                    .ok_or_else(|| StoreError::NotFound(id.clone()))?;
                existing.name = draft.name;
                existing.rate = draft.rate;
                // Strictly later, so an update in the creation millisecond still counts
                existing.updated_at = now.max(existing.updated_at + 1);
                existing.clone()
            }
            None => {
                let mut id = make_id();
                while locations.iter().any(|loc| loc.id == id) {
                    id = make_id();
                }
                let loc = Location {
                    id,
                    name: draft.name,
                    rate: draft.rate,
                    geo: draft.geo,
                    created_at: now,
                    updated_at: now,
                };
                locations.push(loc.clone());
                loc
            }
        };

        self.persist(&locations).await?;
        Ok(saved)
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut locations = self.load().await?;
        let before = locations.len();
        locations.retain(|loc| loc.id != id);
        if locations.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.persist(&locations).await
    }
}

/// Key-value preferences stored as one JSON object
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    path: PathBuf,
}

impl JsonPreferenceStore {
    pub const FILE_NAME: &'static str = "preferences.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(Self::FILE_NAME))
    }
}

#[async_trait]
impl PreferenceStore for JsonPreferenceStore {
    async fn query(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let prefs: Map<String, Value> = read_json(&self.path).await?;
        Ok(prefs.get(key).cloned())
    }

    async fn post_value(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut prefs: Map<String, Value> = read_json(&self.path).await?;
        prefs.insert(key.to_string(), value);
        write_json(&self.path, &prefs).await
    }
}

fn demo_locations() -> Vec<Location> {
    let now = now_ms();
    let hour = 60 * 60 * 1000;
    let demo = [
        ("Greatplace", 5, Geo::new(32.047104, 34.832384, "Niflaot St 17, Holon, Israel")),
        ("Neveragain", 2, Geo::new(32.047201, 34.832581, "Zeev Jabotinsky St, Holon, Israel")),
        ("Seaside", 4, Geo::new(32.0853, 34.7818, "Tel Aviv-Yafo, Israel")),
    ];
    demo.into_iter()
        .enumerate()
        .map(|(i, (name, rate, geo))| {
            let created_at = now - (i as i64 + 1) * 24 * hour;
            Location {
                id: make_id(),
                name: name.to_string(),
                rate,
                geo,
                created_at,
                updated_at: if i == 0 { now - hour } else { created_at },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_state::SortField;
    use tempfile::TempDir;

    fn draft(name: &str, rate: u8) -> LocationDraft {
        LocationDraft::new(name, rate, Geo::new(32.0, 34.0, "Somewhere"))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert!(store.query(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_then_update() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());

        let created = store.save(draft("Park", 3)).await.unwrap();
        assert_eq!(created.id.len(), ID_LENGTH);
        assert_eq!(created.created_at, created.updated_at);

        let mut update = LocationDraft::from(created.clone());
        update.rate = 5;
        update.geo = Geo::new(0.0, 0.0, "Elsewhere");
        let updated = store.save(update).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.rate, 5);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
        // Geo is fixed at creation
        assert_eq!(updated.geo, created.geo);

        let fetched = store.get_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());

        assert!(store.get_by_id("nope").await.unwrap_err().is_not_found());
        assert!(store.remove("nope").await.unwrap_err().is_not_found());

        let mut update = draft("Ghost", 2);
        update.id = Some("nope".to_string());
        assert!(store.save(update).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        let a = store.save(draft("A", 1)).await.unwrap();
        let b = store.save(draft("B", 2)).await.unwrap();

        store.remove(&a.id).await.unwrap();
        let ids: Vec<String> = store
            .query(None, None)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![b.id]);
    }

    #[tokio::test]
    async fn test_query_filter_and_sort() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        store.save(draft("Park A", 4)).await.unwrap();
        store.save(draft("Park B", 2)).await.unwrap();
        store.save(draft("Park C", 5)).await.unwrap();

        let filter = FilterSpec {
            txt: "park".to_string(),
            min_rate: 3.0,
        };
        let sort = SortSpec::new(SortField::Rate, true);
        let names: Vec<String> = store
            .query(Some(&filter), Some(&sort))
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Park C", "Park A"]);
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(
            store.query(None, None).await,
            Err(StoreError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert_eq!(store.seed_if_empty().await.unwrap(), 3);
        assert_eq!(store.seed_if_empty().await.unwrap(), 0);
        assert_eq!(store.query(None, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_preferences_round_trip() {
        let dir = TempDir::new().unwrap();
        let prefs = JsonPreferenceStore::in_dir(dir.path());
        assert_eq!(prefs.query("theme").await.unwrap(), None);

        prefs.post_value("theme", Value::from("Green")).await.unwrap();
        prefs.post_value("other", Value::from(3)).await.unwrap();
        assert_eq!(prefs.query("theme").await.unwrap(), Some(Value::from("Green")));
    }
}
