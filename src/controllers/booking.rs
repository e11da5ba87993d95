use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::{
    from_booking_error, from_screen_error, from_tmdb_error, to_api_error, validated, ApiResult,
};
use crate::models::{BookingStep, BookingSummary, Seat};
use crate::services::confirmation::Receipt;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/booking", get(get_booking))
        .route("/booking/visit", post(open_visit).delete(close_visit))
        .route("/booking/seats", get(get_seats).delete(clear_seats))
        .route("/booking/seats/{seat_id}", post(select_seat).delete(deselect_seat))
        .route("/booking/seats/{seat_id}/toggle", post(toggle_seat))
        .route("/booking/step", put(set_step))
        .route("/booking/reset", post(reset_booking))
        .route("/booking/submit", post(submit_booking))
        .route("/booking/confirmation", get(get_confirmation))
        .route("/booking/done", post(done))
        .route("/booking/book-another", post(book_another))
}

#[derive(Debug, Serialize)]
pub struct SeatMapResponse {
    pub movie_id: i64,
    pub seats: Vec<Seat>,
    pub booking: BookingSummary,
}

async fn seat_map(state: &AppState) -> ApiResult<SeatMapResponse> {
    let movie_id = state
        .screen
        .movie_id()
        .await
        .ok_or_else(|| to_api_error(StatusCode::NOT_FOUND, "Экран выбора мест не открыт"))?;
    let seats = state.screen.seats().await.unwrap_or_default();
    Ok(SeatMapResponse {
        movie_id,
        seats: state.booking.overlay(&seats).await,
        booking: state.booking.summary().await,
    })
}

/* ---------- STATE ---------- */

// GET /api/booking
async fn get_booking(State(state): State<Arc<AppState>>) -> Json<BookingSummary> {
    Json(state.booking.summary().await)
}

#[derive(Debug, Deserialize)]
pub struct StepRequest {
    pub step: BookingStep,
}

// PUT /api/booking/step
async fn set_step(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepRequest>,
) -> ApiResult<Json<BookingSummary>> {
    state
        .booking
        .set_booking_step(req.step)
        .await
        .map_err(from_booking_error)?;
    Ok(Json(state.booking.summary().await))
}

// POST /api/booking/reset
async fn reset_booking(State(state): State<Arc<AppState>>) -> Json<BookingSummary> {
    state.booking.reset_booking().await;
    Json(state.booking.summary().await)
}

/* ---------- VISIT ---------- */

#[derive(Debug, Deserialize, Validate)]
pub struct OpenVisitRequest {
    #[validate(range(min = 1))]
    pub movie_id: i64,
}

// POST /api/booking/visit - вход на экран выбора мест
async fn open_visit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenVisitRequest>,
) -> ApiResult<(StatusCode, Json<SeatMapResponse>)> {
    let req = validated(req)?;
    let movie = state
        .movies
        .movie_details(req.movie_id)
        .await
        .map_err(from_tmdb_error)?;

    state
        .booking
        .enter_seat_selection(movie)
        .await
        .map_err(from_booking_error)?;
    let seats = state.generate_seats().await;
    state.screen.open(req.movie_id, seats).await;

    Ok((StatusCode::CREATED, Json(seat_map(&state).await?)))
}

// DELETE /api/booking/visit - уход с экрана, отменяет незавершённую отправку
async fn close_visit(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let closed = state.screen.close().await;
    Json(json!({ "success": true, "closed": closed }))
}

/* ---------- SEATS ---------- */

// GET /api/booking/seats
async fn get_seats(State(state): State<Arc<AppState>>) -> ApiResult<Json<SeatMapResponse>> {
    Ok(Json(seat_map(&state).await?))
}

async fn find_seat(state: &AppState, seat_id: &str) -> ApiResult<Seat> {
    state
        .screen
        .find_seat(seat_id)
        .await
        .map_err(from_screen_error)?
        .ok_or_else(|| to_api_error(StatusCode::NOT_FOUND, "Место не найдено"))
}

// POST /api/booking/seats/{seat_id}
async fn select_seat(
    State(state): State<Arc<AppState>>,
    Path(seat_id): Path<String>,
) -> ApiResult<Json<SeatMapResponse>> {
    let seat = find_seat(&state, &seat_id).await?;
    // занятое или уже выбранное место - молча игнорируется
    state.booking.select_seat(&seat).await;
    Ok(Json(seat_map(&state).await?))
}

// POST /api/booking/seats/{seat_id}/toggle - тап по месту на схеме
async fn toggle_seat(
    State(state): State<Arc<AppState>>,
    Path(seat_id): Path<String>,
) -> ApiResult<Json<SeatMapResponse>> {
    let seat = find_seat(&state, &seat_id).await?;
    // тап по занятому месту игнорируется
    state.booking.toggle_seat(&seat).await;
    Ok(Json(seat_map(&state).await?))
}

// DELETE /api/booking/seats/{seat_id}
async fn deselect_seat(
    State(state): State<Arc<AppState>>,
    Path(seat_id): Path<String>,
) -> Json<BookingSummary> {
    state.booking.deselect_seat(&seat_id).await;
    Json(state.booking.summary().await)
}

// DELETE /api/booking/seats
async fn clear_seats(State(state): State<Arc<AppState>>) -> Json<BookingSummary> {
    state.booking.clear_selected_seats().await;
    Json(state.booking.summary().await)
}

/* ---------- CONFIRMATION ---------- */

// POST /api/booking/submit
async fn submit_booking(State(state): State<Arc<AppState>>) -> ApiResult<Json<Receipt>> {
    let token = state.screen.begin_submit().await.map_err(from_screen_error)?;
    let result = state.confirmation.submit_booking(&token, None).await;

    match result {
        Ok(confirmation) => {
            let receipt = confirmation.receipt();
            state.screen.finish_submit(&token, Some(confirmation)).await;
            Ok(Json(receipt))
        }
        Err(e) => {
            state.screen.finish_submit(&token, None).await;
            Err(from_booking_error(e))
        }
    }
}

// GET /api/booking/confirmation
async fn get_confirmation(State(state): State<Arc<AppState>>) -> ApiResult<Json<Receipt>> {
    let confirmation = state
        .screen
        .confirmation()
        .await
        .ok_or_else(|| to_api_error(StatusCode::NOT_FOUND, "Бронирование ещё не подтверждено"))?;
    Ok(Json(confirmation.receipt()))
}

// POST /api/booking/done
async fn done(State(state): State<Arc<AppState>>) -> Json<BookingSummary> {
    state.confirmation.done().await;
    state.screen.close().await;
    Json(state.booking.summary().await)
}

// POST /api/booking/book-another
async fn book_another(State(state): State<Arc<AppState>>) -> Json<BookingSummary> {
    state.confirmation.book_another().await;
    state.screen.close().await;
    Json(state.booking.summary().await)
}
