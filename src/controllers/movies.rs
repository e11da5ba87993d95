use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::{from_tmdb_error, to_api_error, validated, ApiResult};
use crate::models::{Genre, ImageResponse, Movie, MovieDetail, Page, VideoResponse};
use crate::tmdb_client::{youtube_thumbnail, youtube_url, ThumbnailQuality};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies/upcoming", get(upcoming_movies))
        .route("/movies/search", get(search_movies))
        .route("/movies/genres", get(genres))
        .route("/movies/refresh", post(refresh_movies))
        .route("/movies/{id}", get(movie_details))
        .route("/movies/{id}/videos", get(movie_videos))
        .route("/movies/{id}/images", get(movie_images))
        .route("/movies/{id}/trailer", get(movie_trailer))
        .route("/movies/{id}/overview", get(movie_overview))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PageQuery {
    // TMDb не отдаёт страницы дальше 500
    #[validate(range(min = 1, max = 500))]
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(max = 100))]
    pub query: String,
    #[validate(range(min = 1, max = 500))]
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct TrailerResponse {
    pub key: String,
    pub url: String,
    pub thumbnail: String,
}

/// Всё, что нужно экрану фильма, одним ответом.
#[derive(Debug, Serialize)]
pub struct MovieOverview {
    pub movie: MovieDetail,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub trailer: Option<TrailerResponse>,
    pub is_favorite: bool,
}

fn trailer_response(key: String) -> TrailerResponse {
    TrailerResponse {
        url: youtube_url(&key),
        thumbnail: youtube_thumbnail(&key, ThumbnailQuality::default()),
        key,
    }
}

fn movie_id(raw: &str) -> ApiResult<i64> {
    if !crate::helpers::is_valid_movie_id(raw) {
        return Err(to_api_error(
            axum::http::StatusCode::BAD_REQUEST,
            "ID фильма должен быть положительным числом",
        ));
    }
    raw.trim()
        .parse()
        .map_err(|_| to_api_error(axum::http::StatusCode::BAD_REQUEST, "Некорректный ID фильма"))
}

// GET /api/movies/upcoming?page=1
async fn upcoming_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageQuery>,
) -> ApiResult<Json<Page<Movie>>> {
    let params = validated(params)?;
    let page = state
        .movies
        .upcoming_movies(params.page.unwrap_or(1))
        .await
        .map_err(from_tmdb_error)?;
    Ok(Json(page))
}

// GET /api/movies/search?query=dune&page=1
async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<Page<Movie>>> {
    let params = validated(params)?;
    let page = state
        .movies
        .search_movies(&params.query, params.page.unwrap_or(1))
        .await
        .map_err(from_tmdb_error)?;
    Ok(Json(page))
}

async fn genres(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Genre>>> {
    let genres = state.movies.genres().await.map_err(from_tmdb_error)?;
    Ok(Json(genres))
}

// POST /api/movies/refresh - pull-to-refresh, сбрасывает кеш фильмов
async fn refresh_movies(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let invalidated = state.movies.refresh_movies().await;
    Json(json!({ "success": true, "invalidated": invalidated }))
}

async fn movie_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MovieDetail>> {
    let id = movie_id(&id)?;
    let movie = state.movies.movie_details(id).await.map_err(from_tmdb_error)?;
    Ok(Json(movie))
}

async fn movie_videos(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<VideoResponse>> {
    let id = movie_id(&id)?;
    let videos = state.movies.movie_videos(id).await.map_err(from_tmdb_error)?;
    Ok(Json(videos))
}

async fn movie_images(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ImageResponse>> {
    let id = movie_id(&id)?;
    let images = state.movies.movie_images(id).await.map_err(from_tmdb_error)?;
    Ok(Json(images))
}

async fn movie_trailer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TrailerResponse>> {
    let id = movie_id(&id)?;
    let key = state
        .movies
        .movie_trailer(id)
        .await
        .ok_or_else(|| to_api_error(axum::http::StatusCode::NOT_FOUND, "Трейлер не найден"))?;
    Ok(Json(trailer_response(key)))
}

// GET /api/movies/{id}/overview - детали, трейлер и избранное параллельно
async fn movie_overview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MovieOverview>> {
    let id = movie_id(&id)?;
    let (details, trailer, is_favorite) = futures::join!(
        state.movies.movie_details(id),
        state.movies.movie_trailer(id),
        state.favorites.is_favorite(id),
    );
    let movie = details.map_err(from_tmdb_error)?;

    let client = state.movies.client();
    Ok(Json(MovieOverview {
        poster_url: client.image_url(movie.poster_path.as_deref()),
        backdrop_url: client.image_url(movie.backdrop_path.as_deref()),
        trailer: trailer.map(trailer_response),
        is_favorite,
        movie,
    }))
}
