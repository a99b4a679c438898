//! Time-bounded cache of panel results
//!
//! Keys carry the panel name and the request as asked for (a `LastHours`
//! window is keyed by its length, not its resolved bounds), so a cached
//! panel is at most one TTL stale.

use super::types::{FunctionCount, MinuteBucket, PerformanceReport};
use crate::config::StatsSettings;
use crate::connection::ResultRow;
use crate::errors::Result;
use moka::sync::Cache;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

const MAX_ENTRIES: u64 = 256;

/// Cached panel payload
#[derive(Debug, Clone)]
pub enum PanelData {
    Entries(Vec<MinuteBucket>),
    Operations(Vec<FunctionCount>),
    Errors(Vec<ResultRow>),
    Performance(PerformanceReport),
}

/// Panel payloads that can live in the cache
pub trait CachedPanel: Sized {
    fn into_data(self) -> PanelData;
    fn from_data(data: PanelData) -> Option<Self>;
}

macro_rules! cached_panel {
    ($ty:ty, $variant:ident) => {
        impl CachedPanel for $ty {
            fn into_data(self) -> PanelData {
                PanelData::$variant(self)
            }

            fn from_data(data: PanelData) -> Option<Self> {
                match data {
                    PanelData::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

cached_panel!(Vec<MinuteBucket>, Entries);
cached_panel!(Vec<FunctionCount>, Operations);
cached_panel!(Vec<ResultRow>, Errors);
cached_panel!(PerformanceReport, Performance);

pub struct StatsCache {
    cache: Cache<String, PanelData>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl StatsCache {
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(ttl)
            .build();

        Self {
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cache from settings; `None` when `cache_ttl_secs` is 0.
    pub fn from_settings(settings: &StatsSettings) -> Option<Self> {
        (settings.cache_ttl_secs > 0)
            .then(|| Self::new(Duration::from_secs(settings.cache_ttl_secs)))
    }

    /// Cached value for `key`, or the result of `load` (cached only on success).
    pub fn get_or_load<T, F>(&self, key: String, load: F) -> Result<T>
    where
        T: CachedPanel + Clone,
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.cache.get(&key).and_then(T::from_data) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "stats cache hit");
            return Ok(value);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = load()?;
        self.cache.insert(key, value.clone().into_data());
        Ok(value)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}
