pub mod booking;
pub mod favorites;
pub mod movies;
pub mod preferences;

use axum::{http::StatusCode, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

use crate::models::BookingError;
use crate::services::seat_selection::ScreenError;
use crate::tmdb_client::{ApiError, ApiErrorKind};

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(movies::routes())
        .merge(booking::routes())
        .merge(favorites::routes())
        .merge(preferences::routes())
}

// --- Общий формат ошибок ---
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ApiErrorKind>,
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

pub fn to_api_error(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            success: false,
            message: message.to_string(),
            error: None,
        }),
    )
}

pub fn validated<T: Validate>(req: T) -> ApiResult<T> {
    req.validate()
        .map_err(|e| to_api_error(StatusCode::BAD_REQUEST, &e.to_string()))?;
    Ok(req)
}

pub fn from_tmdb_error(err: ApiError) -> (StatusCode, Json<ErrorBody>) {
    let status = match &err {
        ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ApiError::Network | ApiError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        other => other
            .status_code()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY),
    };
    tracing::error!("TMDb request failed: {}", err);
    (
        status,
        Json(ErrorBody {
            success: false,
            message: err.user_message(),
            error: Some(err.kind()),
        }),
    )
}

pub fn from_booking_error(err: BookingError) -> (StatusCode, Json<ErrorBody>) {
    let status = match err {
        BookingError::IllegalTransition { .. }
        | BookingError::NoSeatsSelected
        | BookingError::AlreadyConfirmed => StatusCode::CONFLICT,
        // 499: клиент ушёл с экрана до завершения
        BookingError::Cancelled => StatusCode::from_u16(499).unwrap_or(StatusCode::CONFLICT),
    };
    to_api_error(status, &err.to_string())
}

pub fn from_screen_error(err: ScreenError) -> (StatusCode, Json<ErrorBody>) {
    let status = match err {
        ScreenError::NotOpen => StatusCode::NOT_FOUND,
        ScreenError::AlreadySubmitting => StatusCode::CONFLICT,
    };
    to_api_error(status, &err.to_string())
}
