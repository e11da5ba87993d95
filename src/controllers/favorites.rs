use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use super::{to_api_error, ApiResult};
use crate::models::Movie;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/favorites", get(list_favorites).post(add_favorite).delete(clear_favorites))
        .route("/favorites/{movie_id}", delete(remove_favorite))
        .route("/favorites/toggle", post(toggle_favorite))
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub movie_id: i64,
    pub is_favorite: bool,
}

async fn list_favorites(State(state): State<Arc<AppState>>) -> Json<Vec<Movie>> {
    Json(state.favorites.list().await)
}

// POST /api/favorites - тело: фильм целиком, как его отдаёт TMDb
async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Json(movie): Json<Movie>,
) -> ApiResult<(StatusCode, Json<FavoriteResponse>)> {
    if movie.id <= 0 {
        return Err(to_api_error(StatusCode::BAD_REQUEST, "ID фильма должен быть > 0"));
    }
    let movie_id = movie.id;
    let added = state.favorites.add(movie).await;
    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(FavoriteResponse { movie_id, is_favorite: true })))
}

async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Json(movie): Json<Movie>,
) -> ApiResult<Json<FavoriteResponse>> {
    if movie.id <= 0 {
        return Err(to_api_error(StatusCode::BAD_REQUEST, "ID фильма должен быть > 0"));
    }
    let movie_id = movie.id;
    let is_favorite = state.favorites.toggle(movie).await;
    Ok(Json(FavoriteResponse { movie_id, is_favorite }))
}

async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i64>,
) -> ApiResult<Json<FavoriteResponse>> {
    if !state.favorites.remove(movie_id).await {
        return Err(to_api_error(StatusCode::NOT_FOUND, "Фильма нет в избранном"));
    }
    Ok(Json(FavoriteResponse { movie_id, is_favorite: false }))
}

async fn clear_favorites(State(state): State<Arc<AppState>>) -> StatusCode {
    state.favorites.clear().await;
    StatusCode::NO_CONTENT
}
