//! Повтор запросов к TMDb с экспоненциальной задержкой.

use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::RetryConfig;
use crate::tmdb_client::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Списки и детали фильмов: до 3 повторов, min(1s * 2^n, 30s).
    pub fn movies(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }

    /// Поиск повторяется реже и быстрее: до 2 повторов, min(500ms * 2^n, 5s).
    pub fn search(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.search_max_retries,
            base_delay: Duration::from_millis(config.search_base_delay_ms),
            max_delay: Duration::from_millis(config.search_max_delay_ms),
        }
    }

    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Задержка перед повтором номер `attempt` (с нуля).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Выполняет `operation`, повторяя только ошибки с `is_retryable()`.
    pub async fn run<T, F, Fut>(&self, what: &str, mut operation: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!("{} succeeded after {} retries", what, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    warn!("{} failed ({}), retry {} in {:?}", what, e, attempt + 1, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
