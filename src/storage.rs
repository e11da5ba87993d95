//! Локальное key-value хранилище для состояния, которое должно пережить
//! перезапуск процесса: бронирование, избранное, настройки.
//!
//! Значения хранятся как JSON-строки. Бэкенд - Redis, либо карта в памяти,
//! если `REDIS_URL` не задан (и в тестах).

use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct RedisClient {
    pub conn: MultiplexedConnection,
}

impl RedisClient {
    pub async fn new(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(RedisClient { conn })
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Clone)]
pub enum Storage {
    Redis(RedisClient),
    Memory(Arc<RwLock<HashMap<String, String>>>),
}

impl Storage {
    pub async fn connect(redis_url: Option<&str>) -> Result<Self, StorageError> {
        match redis_url {
            Some(url) => {
                let client = RedisClient::new(url).await?;
                info!("Storage: redis connected");
                Ok(Storage::Redis(client))
            }
            None => {
                info!("Storage: REDIS_URL not set, using in-memory storage");
                Ok(Storage::in_memory())
            }
        }
    }

    pub fn in_memory() -> Self {
        Storage::Memory(Arc::new(RwLock::new(HashMap::new())))
    }

    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Storage::Redis(client) => {
                let mut conn = client.conn.clone();
                let value: Option<String> = conn.get(key).await?;
                Ok(value)
            }
            Storage::Memory(map) => Ok(map.read().await.get(key).cloned()),
        }
    }

    pub async fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError> {
        match self {
            Storage::Redis(client) => {
                let mut conn = client.conn.clone();
                let _: () = conn.set(key, value).await?;
                Ok(())
            }
            Storage::Memory(map) => {
                map.write().await.insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Storage::Redis(client) => {
                let mut conn = client.conn.clone();
                let _: () = conn.del(key).await?;
                Ok(())
            }
            Storage::Memory(map) => {
                map.write().await.remove(key);
                Ok(())
            }
        }
    }

    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get_raw(key).await? {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let data = serde_json::to_string(value)?;
        self.set_raw(key, data).await
    }

    /// Missing or unreadable entries fall back to `T::default()`.
    pub async fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.load(key).await {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                warn!("Storage: failed to restore '{}', starting from defaults: {}", key, e);
                T::default()
            }
        }
    }
}

/// Значение в памяти, зеркалируемое в хранилище после каждого изменения.
///
/// Запись в хранилище выполняется под тем же локом, что и мутация, поэтому
/// порядок сохранений совпадает с порядком изменений.
#[derive(Clone)]
pub struct Persisted<T> {
    key: &'static str,
    value: Arc<RwLock<T>>,
    storage: Storage,
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + Default + Clone + Send + Sync,
{
    pub async fn load(storage: Storage, key: &'static str) -> Self {
        let value: T = storage.load_or_default(key).await;
        Self {
            key,
            value: Arc::new(RwLock::new(value)),
            storage,
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.value.read().await;
        f(&guard)
    }

    pub async fn get(&self) -> T {
        self.value.read().await.clone()
    }

    pub async fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.value.write().await;
        let result = f(&mut guard);
        // Ошибка сохранения не откатывает изменение: состояние в памяти главнее
        if let Err(e) = self.storage.save(self.key, &*guard).await {
            error!("Storage: failed to persist '{}': {}", self.key, e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        hits: u32,
    }

    #[tokio::test]
    async fn memory_roundtrip_and_delete() {
        let storage = Storage::in_memory();
        storage.save("counter", &Counter { hits: 3 }).await.unwrap();
        let loaded: Option<Counter> = storage.load("counter").await.unwrap();
        assert_eq!(loaded, Some(Counter { hits: 3 }));

        storage.delete("counter").await.unwrap();
        let gone: Option<Counter> = storage.load("counter").await.unwrap();
        assert_eq!(gone, None);
    }

    #[tokio::test]
    async fn corrupt_entry_falls_back_to_default() {
        let storage = Storage::in_memory();
        storage.set_raw("counter", "{not json".to_string()).await.unwrap();
        let value: Counter = storage.load_or_default("counter").await;
        assert_eq!(value, Counter::default());
    }

    #[tokio::test]
    async fn persisted_survives_reload() {
        let storage = Storage::in_memory();
        let counter: Persisted<Counter> = Persisted::load(storage.clone(), "counter").await;
        counter.update(|c| c.hits += 2).await;

        let reloaded: Persisted<Counter> = Persisted::load(storage, "counter").await;
        assert_eq!(reloaded.get().await.hits, 2);
    }
}
