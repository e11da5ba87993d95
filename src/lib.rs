pub mod cache;
pub mod cancellation;
pub mod config;
pub mod controllers;
pub mod helpers;
pub mod models;
pub mod query_keys;
pub mod services;
pub mod storage;
pub mod tmdb_client;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::Seat;
use crate::services::seat_generator::{self, SeatLayout};

// Shared state для всего приложения
pub struct AppState {
    pub config: config::Config,
    pub storage: storage::Storage,
    pub movies: services::movies::MovieService,
    pub booking: services::booking::BookingStore,
    pub confirmation: services::confirmation::ConfirmationFlow,
    pub favorites: services::favorites::FavoritesStore,
    pub preferences: services::preferences::PreferencesStore,
    pub screen: services::seat_selection::SeatSelectionScreen,
    pub seat_layout: SeatLayout,
    seat_rng: Mutex<StdRng>,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let storage = storage::Storage::connect(config.storage.redis_url.as_deref()).await?;
        Self::with_storage(config, storage, StdRng::from_entropy()).await
    }

    /// Состояние поверх готового хранилища и генератора случайных чисел.
    /// Тесты передают `Storage::in_memory()` и `StdRng::seed_from_u64`.
    pub async fn with_storage(
        config: config::Config,
        storage: storage::Storage,
        seat_rng: StdRng,
    ) -> anyhow::Result<Arc<Self>> {
        let client = tmdb_client::TmdbClient::from_config(&config.tmdb)?;
        let movies = services::movies::MovieService::new(client, cache::QueryCache::new(), &config.retry);

        let booking = services::booking::BookingStore::load(storage.clone()).await;
        let confirmation = services::confirmation::ConfirmationFlow::new(
            booking.clone(),
            Duration::from_millis(config.booking.confirm_delay_ms),
        );
        let favorites = services::favorites::FavoritesStore::load(storage.clone()).await;
        let preferences = services::preferences::PreferencesStore::load(storage.clone()).await;
        let seat_layout = SeatLayout::from_config(&config.booking);

        info!(
            "App state ready: {} seats per show, confirmation delay {:?}",
            seat_layout.capacity(),
            confirmation.delay()
        );

        Ok(Arc::new(Self {
            config,
            storage,
            movies,
            booking,
            confirmation,
            favorites,
            preferences,
            screen: services::seat_selection::SeatSelectionScreen::new(),
            seat_layout,
            seat_rng: Mutex::new(seat_rng),
        }))
    }

    /// Новая схема зала для сеанса.
    pub async fn generate_seats(&self) -> Vec<Seat> {
        let mut rng = self.seat_rng.lock().await;
        seat_generator::generate_seats(&self.seat_layout, &mut *rng)
    }
}
