#![allow(dead_code)]

use cinema_booking::config::Config;
use cinema_booking::storage::Storage;
use cinema_booking::AppState;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SEED: u64 = 42;

pub fn movie_detail_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "overview": "A test movie",
        "release_date": "2024-03-01",
        "runtime": 166,
        "genres": [{ "id": 878, "name": "Science Fiction" }],
        "vote_average": 8.1
    })
}

pub async fn mount_movie_detail(server: &MockServer, id: i64, title: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/movie/{}", id)))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movie_detail_json(id, title)))
        .mount(server)
        .await;
}

pub async fn test_state(server: &MockServer) -> Arc<AppState> {
    test_state_with_storage(server, Storage::in_memory()).await
}

pub async fn test_state_with_storage(server: &MockServer, storage: Storage) -> Arc<AppState> {
    AppState::with_storage(Config::for_tests(&server.uri()), storage, StdRng::seed_from_u64(SEED))
        .await
        .expect("app state")
}
