use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::{validated, ApiResult};
use crate::services::preferences::{AppPreferences, Theme};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/preferences", get(get_preferences))
        .route("/preferences/theme", put(set_theme))
        .route(
            "/preferences/search-history",
            get(get_search_history)
                .post(add_search)
                .delete(clear_search_history),
        )
        .route("/preferences/search-history/remove", post(remove_search))
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 100))]
    pub query: String,
}

async fn get_preferences(State(state): State<Arc<AppState>>) -> Json<AppPreferences> {
    Json(state.preferences.get().await)
}

async fn set_theme(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ThemeRequest>,
) -> Json<AppPreferences> {
    state.preferences.set_theme(req.theme).await;
    Json(state.preferences.get().await)
}

async fn get_search_history(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.preferences.search_history().await)
}

// POST /api/preferences/search-history - запрос, который пользователь отправил из поиска
async fn add_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> ApiResult<Json<Vec<String>>> {
    let req = validated(req)?;
    state.preferences.add_to_search_history(&req.query).await;
    Ok(Json(state.preferences.search_history().await))
}

async fn remove_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> ApiResult<Json<Vec<String>>> {
    let req = validated(req)?;
    state.preferences.remove_from_search_history(&req.query).await;
    Ok(Json(state.preferences.search_history().await))
}

async fn clear_search_history(State(state): State<Arc<AppState>>) -> StatusCode {
    state.preferences.clear_search_history().await;
    StatusCode::NO_CONTENT
}
