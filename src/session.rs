use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::catalog::{Course, Season, WalkDuration, WeatherStyle};
use crate::recommend::SelectionCriteria;

pub const HISTORY_LIMIT: usize = 10;

const KEY_SEASON: &str = "season";
const KEY_TEMPERATURE: &str = "temperature";
const KEY_WEATHER_STYLE: &str = "weatherStyle";
const KEY_DURATION: &str = "duration";
const KEY_HISTORY: &str = "history";
const KEY_FAVORITES: &str = "favorites";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session storage failed: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("Session serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable string key/value storage for one device.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Writes every entry or none of them.
    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError>;
}

const UPSERT_SESSION_VALUE: &str = r#"
    INSERT INTO session_state (device_id, key, value, updated_at)
    VALUES (?, ?, ?, ?)
    ON CONFLICT (device_id, key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

/// Rows in `session_state`, namespaced by device.
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
    device_id: Uuid,
}

impl SqliteKeyValueStore {
    pub fn new(pool: SqlitePool, device_id: Uuid) -> Self {
        Self { pool, device_id }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM session_state WHERE device_id = ? AND key = ?",
        )
        .bind(self.device_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(UPSERT_SESSION_VALUE)
            .bind(self.device_id)
            .bind(key)
            .bind(value)
            .bind(chrono::Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let now = chrono::Utc::now();
        let mut tx = self.pool.begin().await?;

        // Dropping `tx` on an early return rolls the whole batch back.
        for (key, value) in entries {
            sqlx::query(UPSERT_SESSION_VALUE)
                .bind(self.device_id)
                .bind(*key)
                .bind(*value)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut map = self.entries.write().await;
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub last_criteria: Option<SelectionCriteria>,
    #[schema(value_type = Vec<u32>)]
    pub favorites: BTreeSet<u32>,
    /// Most recent first
    pub history: Vec<Course>,
}

/// Criteria, favorites and draw history for one device.
///
/// Every mutation is written straight through to the store. The three
/// sub-states are decoded independently: a corrupt entry resets only
/// itself and never surfaces as an error.
pub struct SessionStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<SessionState, StoreError> {
        Ok(SessionState {
            last_criteria: self.load_criteria().await?,
            favorites: self.load_favorites().await?,
            history: self.load_history().await?,
        })
    }

    /// Saves all four criteria keys together; a failure leaves the previous criteria intact.
    pub async fn save_criteria(&self, criteria: &SelectionCriteria) -> Result<(), StoreError> {
        let temperature = criteria.temperature.to_string();
        let duration = criteria.duration.to_string();

        self.store
            .set_many(&[
                (KEY_SEASON, criteria.season.as_str()),
                (KEY_TEMPERATURE, temperature.as_str()),
                (KEY_WEATHER_STYLE, criteria.weather_style.as_str()),
                (KEY_DURATION, duration.as_str()),
            ])
            .await
    }

    /// Moves `course` to the front of the history, returning the new history.
    pub async fn record_draw(&self, course: &Course) -> Result<Vec<Course>, StoreError> {
        let mut history = self.load_history().await?;

        history.retain(|entry| entry.id != course.id);
        history.insert(0, course.clone());
        history.truncate(HISTORY_LIMIT);

        self.save_json(KEY_HISTORY, &history).await?;
        Ok(history)
    }

    /// Flips membership of `course_id`; returns whether it is now a favorite.
    pub async fn toggle_favorite(&self, course_id: u32) -> Result<bool, StoreError> {
        let mut favorites = self.load_favorites().await?;

        let now_favorite = if favorites.remove(&course_id) {
            false
        } else {
            favorites.insert(course_id);
            true
        };

        let ids: Vec<u32> = favorites.into_iter().collect();
        self.save_json(KEY_FAVORITES, &ids).await?;
        Ok(now_favorite)
    }

    async fn load_criteria(&self) -> Result<Option<SelectionCriteria>, StoreError> {
        let season = self.store.get(KEY_SEASON).await?;
        let temperature = self.store.get(KEY_TEMPERATURE).await?;
        let weather_style = self.store.get(KEY_WEATHER_STYLE).await?;
        let duration = self.store.get(KEY_DURATION).await?;

        let (Some(season), Some(temperature), Some(weather_style), Some(duration)) =
            (season, temperature, weather_style, duration)
        else {
            return Ok(None);
        };

        match parse_criteria(&season, &temperature, &weather_style, &duration) {
            Ok(criteria) => Ok(Some(criteria)),
            Err(e) => {
                tracing::warn!("Discarding unreadable saved criteria: {}", e);
                Ok(None)
            }
        }
    }

    async fn load_favorites(&self) -> Result<BTreeSet<u32>, StoreError> {
        self.load_json(KEY_FAVORITES).await
    }

    async fn load_history(&self) -> Result<Vec<Course>, StoreError> {
        let mut history: Vec<Course> = self.load_json(KEY_HISTORY).await?;

        let mut seen = BTreeSet::new();
        history.retain(|course| seen.insert(course.id));
        history.truncate(HISTORY_LIMIT);

        Ok(history)
    }

    async fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(T::default());
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!("Discarding unreadable '{}' session entry: {}", key, e);
                Ok(T::default())
            }
        }
    }

    async fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw).await
    }
}

fn parse_criteria(
    season: &str,
    temperature: &str,
    weather_style: &str,
    duration: &str,
) -> Result<SelectionCriteria, String> {
    let criteria = SelectionCriteria {
        season: season.parse::<Season>().map_err(|e| e.to_string())?,
        temperature: temperature
            .trim()
            .parse()
            .map_err(|_| format!("Invalid temperature: {}", temperature))?,
        weather_style: weather_style
            .parse::<WeatherStyle>()
            .map_err(|e| e.to_string())?,
        duration: duration.parse::<WalkDuration>().map_err(|e| e.to_string())?,
    };
    criteria.validate()?;
    Ok(criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_course;
    use crate::database::tests::memory_database;

    fn course(id: u32) -> Course {
        sample_course(id, &[Season::Spring], &[WeatherStyle::Clear], WalkDuration::Sixty)
    }

    fn spring_walk() -> SelectionCriteria {
        SelectionCriteria {
            season: Season::Spring,
            temperature: 18,
            weather_style: WeatherStyle::Clear,
            duration: WalkDuration::Sixty,
        }
    }

    #[tokio::test]
    async fn test_empty_store_loads_defaults() {
        let session = SessionStore::new(MemoryKeyValueStore::new());
        assert_eq!(session.load().await.unwrap(), SessionState::default());
    }

    #[tokio::test]
    async fn test_criteria_round_trip_as_plain_strings() {
        let store = MemoryKeyValueStore::new();
        let session = SessionStore::new(store);

        session.save_criteria(&spring_walk()).await.unwrap();

        assert_eq!(session.store.get("season").await.unwrap().as_deref(), Some("spring"));
        assert_eq!(session.store.get("temperature").await.unwrap().as_deref(), Some("18"));
        assert_eq!(session.store.get("weatherStyle").await.unwrap().as_deref(), Some("clear"));
        assert_eq!(session.store.get("duration").await.unwrap().as_deref(), Some("60"));
        assert_eq!(session.load().await.unwrap().last_criteria, Some(spring_walk()));
    }

    #[tokio::test]
    async fn test_history_is_bounded_and_most_recent_first() {
        let session = SessionStore::new(MemoryKeyValueStore::new());

        for id in 1..=15 {
            session.record_draw(&course(id)).await.unwrap();
        }

        let history = session.load().await.unwrap().history;
        let ids: Vec<u32> = history.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![15, 14, 13, 12, 11, 10, 9, 8, 7, 6]);
    }

    #[tokio::test]
    async fn test_redraw_moves_course_to_front() {
        let session = SessionStore::new(MemoryKeyValueStore::new());
        for id in 1..=5 {
            session.record_draw(&course(id)).await.unwrap();
        }

        let history = session.record_draw(&course(3)).await.unwrap();
        let ids: Vec<u32> = history.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 5, 4, 2, 1]);

        let history = session.record_draw(&course(3)).await.unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].id, 3);
    }

    #[tokio::test]
    async fn test_history_stores_full_snapshots() {
        let session = SessionStore::new(MemoryKeyValueStore::new());
        let mut drawn = course(4);
        drawn.highlights = vec!["Riverside".to_string()];

        session.record_draw(&drawn).await.unwrap();

        assert_eq!(session.load().await.unwrap().history, vec![drawn]);
    }

    #[tokio::test]
    async fn test_toggle_favorite_twice_restores_set() {
        let session = SessionStore::new(MemoryKeyValueStore::new());
        session.toggle_favorite(2).await.unwrap();
        let before = session.load().await.unwrap().favorites;

        assert!(session.toggle_favorite(7).await.unwrap());
        assert!(!session.toggle_favorite(7).await.unwrap());

        assert_eq!(session.load().await.unwrap().favorites, before);
        assert_eq!(before, BTreeSet::from([2]));
    }

    #[tokio::test]
    async fn test_corrupt_history_does_not_affect_favorites() {
        let store = MemoryKeyValueStore::new();
        store.set("history", "[{not json").await.unwrap();
        store.set("favorites", "[1, 5]").await.unwrap();
        let session = SessionStore::new(store);

        let state = session.load().await.unwrap();
        assert!(state.history.is_empty());
        assert_eq!(state.favorites, BTreeSet::from([1, 5]));

        // The next draw overwrites the unreadable entry.
        session.record_draw(&course(9)).await.unwrap();
        assert_eq!(session.load().await.unwrap().history.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_favorites_and_criteria_reset_independently() {
        let store = MemoryKeyValueStore::new();
        store.set("favorites", "\"oops\"").await.unwrap();
        store.set("season", "monsoon").await.unwrap();
        store.set("temperature", "18").await.unwrap();
        store.set("weatherStyle", "clear").await.unwrap();
        store.set("duration", "60").await.unwrap();
        store
            .set("history", &serde_json::to_string(&vec![course(3)]).unwrap())
            .await
            .unwrap();
        let session = SessionStore::new(store);

        let state = session.load().await.unwrap();
        assert!(state.last_criteria.is_none());
        assert!(state.favorites.is_empty());
        assert_eq!(state.history.len(), 1);
    }

    #[tokio::test]
    async fn test_partial_criteria_is_no_prior_state() {
        let store = MemoryKeyValueStore::new();
        store.set("season", "winter").await.unwrap();
        store.set("weatherStyle", "rainy").await.unwrap();
        let session = SessionStore::new(store);

        assert!(session.load().await.unwrap().last_criteria.is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_saved_temperature_is_discarded() {
        let store = MemoryKeyValueStore::new();
        store.set("season", "summer").await.unwrap();
        store.set("temperature", "99").await.unwrap();
        store.set("weatherStyle", "clear").await.unwrap();
        store.set("duration", "30").await.unwrap();
        let session = SessionStore::new(store);

        assert!(session.load().await.unwrap().last_criteria.is_none());
    }

    #[tokio::test]
    async fn test_sqlite_store_survives_reopen_and_isolates_devices() {
        let database = memory_database().await;
        let device = Uuid::new_v4();
        let other = Uuid::new_v4();

        {
            let session = SessionStore::new(SqliteKeyValueStore::new(database.pool().clone(), device));
            session.save_criteria(&spring_walk()).await.unwrap();
            session.record_draw(&course(1)).await.unwrap();
            session.toggle_favorite(1).await.unwrap();
        }

        let reopened = SessionStore::new(SqliteKeyValueStore::new(database.pool().clone(), device));
        let state = reopened.load().await.unwrap();
        assert_eq!(state.last_criteria, Some(spring_walk()));
        assert_eq!(state.favorites, BTreeSet::from([1]));
        assert_eq!(state.history[0].id, 1);

        let stranger = SessionStore::new(SqliteKeyValueStore::new(database.pool().clone(), other));
        assert_eq!(stranger.load().await.unwrap(), SessionState::default());
    }

    #[tokio::test]
    async fn test_sqlite_set_overwrites_existing_key() {
        let database = memory_database().await;
        let store = SqliteKeyValueStore::new(database.pool().clone(), Uuid::new_v4());

        store.set("season", "spring").await.unwrap();
        store.set("season", "autumn").await.unwrap();

        assert_eq!(store.get("season").await.unwrap().as_deref(), Some("autumn"));
        assert!(store.get("duration").await.unwrap().is_none());
    }

    fn winter_walk() -> SelectionCriteria {
        SelectionCriteria {
            season: Season::Winter,
            temperature: 8,
            weather_style: WeatherStyle::Rainy,
            duration: WalkDuration::Thirty,
        }
    }

    #[tokio::test]
    async fn test_failed_criteria_save_keeps_previous_criteria() {
        let database = memory_database().await;
        let session = SessionStore::new(SqliteKeyValueStore::new(database.pool().clone(), Uuid::new_v4()));
        session.save_criteria(&spring_walk()).await.unwrap();

        // Duration is the last key written, so the other three are already applied when it fails.
        for event in ["INSERT", "UPDATE"] {
            sqlx::query(&format!(
                "CREATE TRIGGER reject_short_walk_{event} BEFORE {event} ON session_state \
                 WHEN NEW.key = 'duration' AND NEW.value = '30' \
                 BEGIN SELECT RAISE(ABORT, 'duration rejected'); END"
            ))
            .execute(database.pool())
            .await
            .unwrap();
        }

        assert!(matches!(
            session.save_criteria(&winter_walk()).await,
            Err(StoreError::Storage(_))
        ));
        assert_eq!(session.load().await.unwrap().last_criteria, Some(spring_walk()));
    }

    /// Rejects single-key writes after the first `allowed` calls.
    struct CountingStore {
        inner: MemoryKeyValueStore,
        allowed: usize,
        sets: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl KeyValueStore for CountingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            let calls = self.sets.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if calls >= self.allowed {
                return Err(StoreError::Storage(sqlx::Error::PoolClosed));
            }
            self.inner.set(key, value).await
        }

        async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
            self.inner.set_many(entries).await
        }
    }

    #[tokio::test]
    async fn test_criteria_are_written_as_one_batch() {
        let session = SessionStore::new(CountingStore {
            inner: MemoryKeyValueStore::new(),
            allowed: 0,
            sets: std::sync::atomic::AtomicUsize::new(0),
        });

        session.save_criteria(&spring_walk()).await.unwrap();
        session.save_criteria(&winter_walk()).await.unwrap();

        assert_eq!(session.load().await.unwrap().last_criteria, Some(winter_walk()));
        assert_eq!(session.store.sets.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
