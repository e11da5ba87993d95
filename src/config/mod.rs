use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub tmdb: TmdbConfig,
    pub storage: StorageConfig,
    pub booking: BookingConfig,
    pub retry: RetryConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки TMDb API
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbConfig {
    pub base_url: String,
    pub api_key: String,
    pub image_base_url: String,
    pub timeout_seconds: u64,
}

// Настройки локального хранилища
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// `None` - хранилище в памяти, состояние не переживает перезапуск.
    pub redis_url: Option<String>,
}

// Настройки схемы зала и подтверждения брони
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    pub rows: Vec<char>,
    pub seats_per_row: u32,
    pub occupancy_rate: f64,
    pub confirm_delay_ms: u64,
}

// Настройки повторных запросов к TMDb
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub search_max_retries: u32,
    pub search_base_delay_ms: u64,
    pub search_max_delay_ms: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(name: &'static str, default: &str, expected: &'static str) -> Result<T, ConfigError> {
    let value = var_or(name, default);
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value,
    })
}

fn parse_rows(value: &str) -> Result<Vec<char>, ConfigError> {
    let rows: Vec<char> = value.trim().chars().collect();
    let valid = !rows.is_empty()
        && rows.iter().all(|c| c.is_ascii_uppercase())
        && rows.iter().enumerate().all(|(i, c)| !rows[..i].contains(c));
    if !valid {
        return Err(ConfigError::Invalid {
            name: "SEAT_ROWS",
            expected: "string of distinct uppercase letters",
            value: value.to_string(),
        });
    }
    Ok(rows)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let occupancy_rate: f64 = parse_var("SEAT_OCCUPANCY_RATE", "0.3", "number")?;
        if !(0.0..=1.0).contains(&occupancy_rate) {
            return Err(ConfigError::Invalid {
                name: "SEAT_OCCUPANCY_RATE",
                expected: "number between 0 and 1",
                value: occupancy_rate.to_string(),
            });
        }

        Ok(Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parse_var("PORT", "8000", "port number")?,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "cinema_booking=debug,tower_http=debug"),
            },
            tmdb: TmdbConfig {
                base_url: var_or("TMDB_BASE_URL", "https://api.themoviedb.org/3"),
                api_key: var_or("TMDB_API_KEY", ""),
                image_base_url: var_or("TMDB_IMAGE_BASE_URL", "https://image.tmdb.org/t/p/w500"),
                timeout_seconds: parse_var("TMDB_TIMEOUT_SECONDS", "10", "number of seconds")?,
            },
            storage: StorageConfig {
                redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            },
            booking: BookingConfig {
                rows: parse_rows(&var_or("SEAT_ROWS", "ABCDEFGH"))?,
                seats_per_row: parse_var("SEATS_PER_ROW", "10", "positive number")?,
                occupancy_rate,
                confirm_delay_ms: parse_var("BOOKING_CONFIRM_DELAY_MS", "2000", "number of milliseconds")?,
            },
            retry: RetryConfig {
                max_retries: parse_var("RETRY_MAX_ATTEMPTS", "3", "number")?,
                base_delay_ms: parse_var("RETRY_BASE_DELAY_MS", "1000", "number of milliseconds")?,
                max_delay_ms: parse_var("RETRY_MAX_DELAY_MS", "30000", "number of milliseconds")?,
                search_max_retries: parse_var("SEARCH_RETRY_MAX_ATTEMPTS", "2", "number")?,
                search_base_delay_ms: parse_var("SEARCH_RETRY_BASE_DELAY_MS", "500", "number of milliseconds")?,
                search_max_delay_ms: parse_var("SEARCH_RETRY_MAX_DELAY_MS", "5000", "number of milliseconds")?,
            },
        })
    }

    /// Конфигурация для тестов: без Redis, без задержек, TMDb по указанному адресу.
    pub fn for_tests(tmdb_base_url: &str) -> Self {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: "test".to_string(),
                rust_log: "cinema_booking=debug".to_string(),
            },
            tmdb: TmdbConfig {
                base_url: tmdb_base_url.to_string(),
                api_key: "test-key".to_string(),
                image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
                timeout_seconds: 5,
            },
            storage: StorageConfig { redis_url: None },
            booking: BookingConfig {
                rows: "ABCDEFGH".chars().collect(),
                seats_per_row: 10,
                occupancy_rate: 0.3,
                confirm_delay_ms: 20,
            },
            retry: RetryConfig {
                max_retries: 0,
                base_delay_ms: 1,
                max_delay_ms: 5,
                search_max_retries: 0,
                search_base_delay_ms: 1,
                search_max_delay_ms: 5,
            },
        }
    }
}
