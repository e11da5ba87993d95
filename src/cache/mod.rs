//! Кеш ответов TMDb в памяти процесса.
//!
//! У записи два срока: пока не прошёл `stale_time`, она свежая и отдаётся без
//! запроса; после этого, но до `cache_time`, она устаревшая: её можно показать,
//! если обновление не удалось. После `cache_time` запись удаляется.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::query_keys::QueryKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub stale_time: Duration,
    pub cache_time: Duration,
}

impl CachePolicy {
    /// Списки фильмов: 5 минут свежести, 10 минут хранения.
    pub const MOVIES: CachePolicy = CachePolicy {
        stale_time: Duration::from_secs(5 * 60),
        cache_time: Duration::from_secs(10 * 60),
    };
    pub const SEARCH: CachePolicy = CachePolicy {
        stale_time: Duration::from_secs(10 * 60),
        cache_time: Duration::from_secs(15 * 60),
    };
    /// Детали, видео, картинки и жанры меняются редко.
    pub const DETAILS: CachePolicy = CachePolicy {
        stale_time: Duration::from_secs(10 * 60),
        cache_time: Duration::from_secs(30 * 60),
    };
}

struct Entry {
    data: String,
    stored_at: Instant,
    policy: CachePolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Fresh(T),
    Stale(T),
    Miss,
}

#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lookup<T: DeserializeOwned>(&self, key: &QueryKey) -> Lookup<T> {
        let cache_key = key.to_string();
        let guard = self.entries.read().await;
        let Some(entry) = guard.get(&cache_key) else {
            return Lookup::Miss;
        };

        let age = entry.stored_at.elapsed();
        if age >= entry.policy.cache_time {
            return Lookup::Miss;
        }

        match serde_json::from_str::<T>(&entry.data) {
            Ok(value) if age < entry.policy.stale_time => Lookup::Fresh(value),
            Ok(value) => Lookup::Stale(value),
            Err(e) => {
                warn!("Cache entry {} is unreadable: {}", cache_key, e);
                Lookup::Miss
            }
        }
    }

    pub async fn store<T: Serialize>(&self, key: &QueryKey, value: &T, policy: CachePolicy) {
        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to cache {}: {}", key, e);
                return;
            }
        };
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                data,
                stored_at: Instant::now(),
                policy,
            },
        );
    }

    /// Удаляет все записи под префиксом, например всё под `movies`.
    pub async fn invalidate_prefix(&self, prefix: &QueryKey) -> usize {
        let prefix = prefix.to_string();
        let mut guard = self.entries.write().await;
        let before = guard.len();
        guard.retain(|key, _| key != &prefix && !key.starts_with(&format!("{}:", prefix)));
        let removed = before - guard.len();
        debug!("Invalidated {} cache entries under {}", removed, prefix);
        removed
    }

    pub async fn evict_expired(&self) -> usize {
        let mut guard = self.entries.write().await;
        let before = guard.len();
        guard.retain(|_, entry| entry.stored_at.elapsed() < entry.policy.cache_time);
        before - guard.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
