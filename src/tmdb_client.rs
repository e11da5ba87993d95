//! tmdb_client.rs
//!
//! HTTP-клиент TMDb API и классификация ошибок.
//!
//! Ошибки делятся на категории (сеть, таймаут, 401, 404, 429, 5xx), у каждой
//! есть признак `retryable` и дружелюбный текст для экрана
//! ([`ApiError::user_message`]).

use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::TmdbConfig;
use crate::helpers::primary_trailer;
use crate::models::{GenreResponse, ImageResponse, Movie, MovieDetail, Page, VideoResponse};

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Категория ошибки в том виде, в каком её видит UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorKind {
    NetworkError,
    TimeoutError,
    ServerError,
    NotFound,
    Unauthorized,
    RateLimited,
    InvalidResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Network error. Please check your internet connection.")]
    Network,
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("{message}")]
    Unauthorized { message: String },
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}")]
    RateLimited { message: String },
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Классификация по HTTP-статусу. `server_message` - `status_message`
    /// или `message` из тела ответа, если сервер его прислал.
    pub fn from_status(status: u16, server_message: Option<String>) -> Self {
        let message = |default: &str| server_message.clone().unwrap_or_else(|| default.to_string());
        match status {
            401 => ApiError::Unauthorized {
                message: message("Invalid API key. Please check your configuration."),
            },
            404 => ApiError::NotFound {
                message: message("The requested resource was not found."),
            },
            429 => ApiError::RateLimited {
                message: message("Too many requests. Please try again later."),
            },
            500 | 502 | 503 | 504 => ApiError::Server {
                status,
                message: message("Server error. Please try again later."),
            },
            _ => ApiError::Server {
                status,
                message: message("An unexpected error occurred."),
            },
        }
    }

    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16(), None)
        } else {
            ApiError::Network
        }
    }

    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Network => ApiErrorKind::NetworkError,
            ApiError::Timeout => ApiErrorKind::TimeoutError,
            ApiError::Unauthorized { .. } => ApiErrorKind::Unauthorized,
            ApiError::NotFound { .. } => ApiErrorKind::NotFound,
            ApiError::RateLimited { .. } => ApiErrorKind::RateLimited,
            ApiError::Server { .. } => ApiErrorKind::ServerError,
            ApiError::InvalidResponse(_) => ApiErrorKind::InvalidResponse,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::NotFound { .. } => Some(404),
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Сеть, таймаут, 429 и 5xx стоит повторить; остальные 4xx - нет.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network | ApiError::Timeout | ApiError::RateLimited { .. } => true,
            ApiError::Server { status, .. } => *status >= 500,
            ApiError::Unauthorized { .. } | ApiError::NotFound { .. } | ApiError::InvalidResponse(_) => false,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network => "Please check your internet connection and try again.",
            ApiError::Timeout => "Request timed out. Please try again.",
            ApiError::Unauthorized { .. } => "API key is invalid. Please check configuration.",
            ApiError::NotFound { .. } => "The requested content was not found.",
            ApiError::RateLimited { .. } => "Too many requests. Please wait a moment and try again.",
            ApiError::Server { .. } => "Server error. Please try again later.",
            ApiError::InvalidResponse(_) => GENERIC_ERROR_MESSAGE,
        }
        .to_string()
    }
}

/// Текст ошибки для экрана. Известные ошибки API получают дружелюбный текст,
/// остальные - собственное сообщение или общий запасной вариант.
pub fn format_error_message(error: &(dyn std::error::Error + 'static)) -> String {
    if let Some(api_error) = error.downcast_ref::<ApiError>() {
        return api_error.user_message();
    }
    let message = error.to_string();
    if message.trim().is_empty() {
        GENERIC_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("status_message")
        .or_else(|| value.get("message"))
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Клиент TMDb API.
#[derive(Clone)]
pub struct TmdbClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    image_base_url: String,
}

impl TmdbClient {
    pub fn from_config(config: &TmdbConfig) -> Result<Self, reqwest::Error> {
        if config.api_key.is_empty() {
            warn!("TMDb API key not found. Please set TMDB_API_KEY");
        }

        Ok(Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("API Request: GET {}", path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!("API Error: GET {} failed: {}", path, e);
                ApiError::from_reqwest(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let api_error = ApiError::from_status(status.as_u16(), server_message(&body));
            error!("API Error: GET {} -> {}: {}", path, status, api_error);
            return Err(api_error);
        }

        debug!("API Response: {} {}", status, path);
        response.json::<T>().await.map_err(ApiError::from_reqwest)
    }

    pub async fn get_upcoming_movies(&self, page: u32) -> Result<Page<Movie>, ApiError> {
        self.get_json("/movie/upcoming", &[("page", page.to_string())]).await
    }

    pub async fn get_movie_details(&self, movie_id: i64) -> Result<MovieDetail, ApiError> {
        self.get_json(&format!("/movie/{}", movie_id), &[]).await
    }

    pub async fn get_movie_videos(&self, movie_id: i64) -> Result<VideoResponse, ApiError> {
        self.get_json(&format!("/movie/{}/videos", movie_id), &[]).await
    }

    pub async fn get_movie_images(&self, movie_id: i64) -> Result<ImageResponse, ApiError> {
        self.get_json(&format!("/movie/{}/images", movie_id), &[]).await
    }

    /// Пустой запрос в API не уходит.
    pub async fn search_movies(&self, query: &str, page: u32) -> Result<Page<Movie>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Page::empty());
        }
        self.get_json(
            "/search/multi",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    pub async fn get_genres(&self) -> Result<GenreResponse, ApiError> {
        self.get_json("/genre/movie/list", &[]).await
    }

    /// Ключ YouTube-трейлера; ошибки API превращаются в `None`.
    pub async fn get_movie_trailer(&self, movie_id: i64) -> Option<String> {
        match self.get_movie_videos(movie_id).await {
            Ok(videos) => primary_trailer(&videos.results).map(str::to_string),
            Err(e) => {
                warn!("Error getting trailer for movie ID {}: {}", movie_id, e);
                None
            }
        }
    }

    pub fn image_url(&self, path: Option<&str>) -> Option<String> {
        let path = path?.trim_start_matches('/');
        if path.is_empty() {
            return None;
        }
        Some(format!("{}/{}", self.image_base_url, path))
    }
}

pub fn youtube_url(video_key: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_key)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThumbnailQuality {
    Default,
    #[default]
    Medium,
    High,
    MaxRes,
}

pub fn youtube_thumbnail(video_key: &str, quality: ThumbnailQuality) -> String {
    // имена файлов YouTube: default.jpg, mqdefault.jpg, hqdefault.jpg, maxresdefault.jpg
    let prefix = match quality {
        ThumbnailQuality::Default => "",
        ThumbnailQuality::Medium => "mq",
        ThumbnailQuality::High => "hq",
        ThumbnailQuality::MaxRes => "maxres",
    };
    format!("https://img.youtube.com/vi/{}/{}default.jpg", video_key, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(ApiError::from_status(401, None).kind(), ApiErrorKind::Unauthorized);
        assert_eq!(ApiError::from_status(404, None).kind(), ApiErrorKind::NotFound);
        assert_eq!(ApiError::from_status(429, None).kind(), ApiErrorKind::RateLimited);
        assert_eq!(ApiError::from_status(503, None).kind(), ApiErrorKind::ServerError);
        assert_eq!(ApiError::from_status(418, None).kind(), ApiErrorKind::ServerError);
    }

    #[test]
    fn retryable_categories() {
        assert!(ApiError::Network.is_retryable());
        assert!(ApiError::Timeout.is_retryable());
        assert!(ApiError::from_status(429, None).is_retryable());
        assert!(ApiError::from_status(500, None).is_retryable());
        assert!(ApiError::from_status(507, None).is_retryable());
        assert!(!ApiError::from_status(401, None).is_retryable());
        assert!(!ApiError::from_status(404, None).is_retryable());
        assert!(!ApiError::from_status(418, None).is_retryable());
    }

    #[test]
    fn server_message_wins_over_default() {
        let err = ApiError::from_status(401, Some("Invalid API key: You must be granted a valid key.".into()));
        assert_eq!(err.to_string(), "Invalid API key: You must be granted a valid key.");
        assert_eq!(err.user_message(), "API key is invalid. Please check configuration.");
        assert_eq!(
            ApiError::from_status(404, None).to_string(),
            "The requested resource was not found."
        );
    }

    #[test]
    fn body_message_extraction() {
        assert_eq!(
            server_message(r#"{"status_code":7,"status_message":"Invalid API key"}"#).as_deref(),
            Some("Invalid API key")
        );
        assert_eq!(server_message(r#"{"message":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(server_message("<html>"), None);
    }

    #[test]
    fn formatting_falls_back_for_unknown_errors() {
        let api = ApiError::Network;
        assert_eq!(
            format_error_message(&api),
            "Please check your internet connection and try again."
        );

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        assert_eq!(format_error_message(&io), "disk on fire");

        let empty = std::io::Error::new(std::io::ErrorKind::Other, "");
        assert_eq!(format_error_message(&empty), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn youtube_links() {
        assert_eq!(youtube_url("abc"), "https://www.youtube.com/watch?v=abc");
        assert_eq!(
            youtube_thumbnail("abc", ThumbnailQuality::High),
            "https://img.youtube.com/vi/abc/hqdefault.jpg"
        );
        assert_eq!(
            youtube_thumbnail("abc", ThumbnailQuality::Default),
            "https://img.youtube.com/vi/abc/default.jpg"
        );
    }
}
