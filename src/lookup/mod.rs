pub mod openweather;
pub mod types;
pub mod unsplash;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use openweather::OpenWeatherClient;
use unsplash::UnsplashClient;

pub type ImageCache = ReadThroughCache<UnsplashClient>;
pub type WeatherCache = ReadThroughCache<OpenWeatherClient>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("{0} is not configured")]
    Configuration(&'static str),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::Upstream(err.to_string())
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// An external request/response call that can sit behind a [`ReadThroughCache`].
#[async_trait]
pub trait Lookup: Send + Sync {
    type Output: Clone + Send + Sync + 'static;

    async fn fetch(&self, key: &str) -> Result<Self::Output, LookupError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    Fresh,
}

#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    pub source: FetchSource,
    pub elapsed_ms: u64,
}

impl<T> Fetched<T> {
    pub fn is_cached(&self) -> bool {
        self.source == FetchSource::Cache
    }
}

#[derive(Clone)]
struct CachedEntry<T> {
    value: T,
    inserted_at: DateTime<Utc>,
}

/// Time-bounded memoization in front of a [`Lookup`].
///
/// Entries are never evicted by count. An entry older than the TTL is
/// treated as absent on read and replaced only after a successful fetch;
/// failed fetches leave the cache untouched. Concurrent misses on the
/// same key may each call the lookup.
pub struct ReadThroughCache<L: Lookup> {
    name: &'static str,
    lookup: L,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    entries: Cache<String, CachedEntry<L::Output>>,
}

impl<L: Lookup> ReadThroughCache<L> {
    pub fn new(name: &'static str, lookup: L, ttl: chrono::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            lookup,
            ttl,
            clock,
            entries: Cache::builder().name(name).build(),
        }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub async fn get(&self, key: &str) -> Result<Fetched<L::Output>, LookupError> {
        let started = Instant::now();

        if let Some(entry) = self.entries.get(key).await {
            let age = self.clock.now() - entry.inserted_at;
            if age < self.ttl {
                tracing::debug!("{} cache hit for '{}' ({}s old)", self.name, key, age.num_seconds());
                return Ok(Fetched {
                    value: entry.value,
                    source: FetchSource::Cache,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                });
            }
            tracing::debug!("{} cache entry for '{}' is stale", self.name, key);
        }

        let value = match self.lookup.fetch(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("{} lookup for '{}' failed: {}", self.name, key, e);
                return Err(e);
            }
        };

        self.entries
            .insert(
                key.to_string(),
                CachedEntry {
                    value: value.clone(),
                    inserted_at: self.clock.now(),
                },
            )
            .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!("{} fetched '{}' in {}ms", self.name, key, elapsed_ms);

        Ok(Fetched {
            value,
            source: FetchSource::Fresh,
            elapsed_ms,
        })
    }
}
