//! Хранилище текущего бронирования.
//!
//! Единственная точка изменения [`BookingState`]: экраны получают
//! [`BookingStore`] из общего состояния приложения и вызывают операции ниже.
//! Каждая мутация выполняется под одним локом (чтение выборки и запись
//! пересчитанной суммы не перемежаются) и сразу сохраняется в хранилище.

use tracing::{debug, info, warn};

use crate::models::{BookingError, BookingState, BookingStep, BookingSummary, MovieDetail, Seat};
use crate::storage::{Persisted, Storage};

pub const BOOKING_STORAGE_KEY: &str = "booking-storage";

#[derive(Clone)]
pub struct BookingStore {
    state: Persisted<BookingState>,
}

impl BookingStore {
    /// Восстанавливает бронирование, сохранённое до перезапуска.
    pub async fn load(storage: Storage) -> Self {
        let state: Persisted<BookingState> = Persisted::load(storage, BOOKING_STORAGE_KEY).await;
        let restored = state.read(|s| (s.booking_step(), s.selected_seat_count())).await;
        info!("Booking restored: step={}, {} seats selected", restored.0, restored.1);
        Self { state }
    }

    pub async fn snapshot(&self) -> BookingState {
        self.state.get().await
    }

    pub async fn summary(&self) -> BookingSummary {
        self.state.read(BookingState::summary).await
    }

    pub async fn total_price(&self) -> u32 {
        self.state.read(BookingState::total_price).await
    }

    pub async fn selected_seat_count(&self) -> usize {
        self.state.read(BookingState::selected_seat_count).await
    }

    pub async fn can_proceed_to_payment(&self) -> bool {
        self.state.read(BookingState::can_proceed_to_payment).await
    }

    /// Накладывает выборку на схему зала для отрисовки.
    pub async fn overlay(&self, seats: &[Seat]) -> Vec<Seat> {
        self.state.read(|s| s.overlay(seats)).await
    }

    pub async fn set_current_movie(&self, movie: Option<MovieDetail>) {
        let movie_id = movie.as_ref().map(|m| m.id);
        self.state.update(|s| s.set_current_movie(movie)).await;
        debug!("Booking: current movie set to {:?}", movie_id);
    }

    pub async fn select_seat(&self, seat: &Seat) -> bool {
        let changed = self.state.update(|s| s.select_seat(seat)).await;
        if changed {
            debug!("Booking: seat {} selected", seat.id());
        }
        changed
    }

    pub async fn deselect_seat(&self, seat_id: &str) -> bool {
        let changed = self.state.update(|s| s.deselect_seat(seat_id)).await;
        if changed {
            debug!("Booking: seat {} deselected", seat_id);
        }
        changed
    }

    pub async fn toggle_seat(&self, seat: &Seat) -> bool {
        self.state.update(|s| s.toggle_seat(seat)).await
    }

    pub async fn clear_selected_seats(&self) {
        self.state.update(BookingState::clear_selected_seats).await;
    }

    pub async fn set_booking_step(&self, step: BookingStep) -> Result<(), BookingError> {
        let result = self.state.update(|s| s.set_booking_step(step)).await;
        if let Err(e) = &result {
            warn!("Booking: step change rejected: {}", e);
        }
        result
    }

    /// Вход на экран выбора мест. Схема зала генерируется заново, поэтому
    /// прежняя выборка к ней не относится и сбрасывается.
    pub async fn enter_seat_selection(&self, movie: MovieDetail) -> Result<(), BookingError> {
        let movie_id = movie.id;
        let result = self
            .state
            .update(|s| {
                if !s.booking_step().can_transition_to(BookingStep::SeatSelection) {
                    s.set_booking_step(BookingStep::MovieSelection)?;
                }
                s.set_current_movie(Some(movie));
                s.clear_selected_seats();
                s.set_booking_step(BookingStep::SeatSelection)
            })
            .await;
        info!("Booking: entered seat selection for movie {}", movie_id);
        result
    }

    /// Переводит бронирование в confirmation и возвращает то, что было подтверждено.
    pub async fn confirm(&self) -> Result<BookingState, BookingError> {
        self.state
            .update(|s| {
                s.confirm()?;
                Ok(s.clone())
            })
            .await
    }

    pub async fn check_confirmable(&self) -> Result<(), BookingError> {
        self.state.read(BookingState::check_confirmable).await
    }

    pub async fn reset_booking(&self) {
        self.state.update(BookingState::reset).await;
        info!("Booking: reset");
    }
}
