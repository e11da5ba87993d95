//! Имитация асинхронного подтверждения брони.
//!
//! Реального платежа нет: после фиксированной задержки подтверждение всегда
//! успешно. Единственный отказ - отмена через [`CancellationToken`], когда
//! пользователь уходит с экрана; токен проверяется до любого изменения
//! состояния, так что отменённая отправка хранилище не трогает.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

use crate::cancellation::CancellationToken;
use crate::models::{BookingError, MovieDetail, Seat, SeatType};
use crate::services::booking::BookingStore;

pub const DEFAULT_CONFIRM_DELAY: Duration = Duration::from_millis(2000);
pub const TAX_RATE_PERCENT: u32 = 10;

/// "BK" + последние 6 цифр текущего времени в миллисекундах.
/// Практически уникален в пределах сессии, но глобальной уникальности не гарантирует.
pub fn generate_booking_id(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(6)..];
    format!("BK{}", tail)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub movie: Option<MovieDetail>,
    pub seats: Vec<Seat>,
    pub subtotal: u32,
}

impl BookingConfirmation {
    pub fn tax(&self) -> f64 {
        f64::from(self.subtotal) * f64::from(TAX_RATE_PERCENT) / 100.0
    }

    /// Итог с налогом; считается при отображении и нигде не хранится.
    pub fn final_total(&self) -> f64 {
        f64::from(self.subtotal) + self.tax()
    }

    pub fn seat_labels(&self) -> Vec<String> {
        self.seats.iter().map(|s| format!("{}{}", s.row(), s.number())).collect()
    }

    pub fn seats_by_type(&self) -> BTreeMap<SeatType, usize> {
        let mut counts = BTreeMap::new();
        for seat in &self.seats {
            *counts.entry(seat.seat_type()).or_insert(0) += 1;
        }
        counts
    }

    pub fn receipt(&self) -> Receipt {
        Receipt {
            booking_id: self.booking_id.clone(),
            movie_title: self.movie.as_ref().map(|m| m.title.clone()),
            release_date: self.movie.as_ref().map(|m| m.release_date.clone()),
            runtime: self.movie.as_ref().and_then(MovieDetail::formatted_runtime),
            genre: self
                .movie
                .as_ref()
                .and_then(|m| m.primary_genre().map(str::to_string)),
            seats: self.seat_labels(),
            seat_count: self.seats.len(),
            seats_by_type: self
                .seats_by_type()
                .into_iter()
                .map(|(t, n)| (t.to_string(), n))
                .collect(),
            subtotal: format!("{:.2}", f64::from(self.subtotal)),
            tax: format!("{:.2}", self.tax()),
            total: format!("{:.2}", self.final_total()),
        }
    }
}

/// Представление подтверждения для экрана: суммы уже отформатированы.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub booking_id: String,
    pub movie_title: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub seats: Vec<String>,
    pub seat_count: usize,
    pub seats_by_type: BTreeMap<String, usize>,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

#[derive(Clone)]
pub struct ConfirmationFlow {
    store: BookingStore,
    delay: Duration,
}

impl ConfirmationFlow {
    pub fn new(store: BookingStore, delay: Duration) -> Self {
        Self { store, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits out the simulated submission, then moves the booking to
    /// `confirmation`. `booking_id` overrides the timestamp-derived id.
    pub async fn submit_booking(
        &self,
        token: &CancellationToken,
        booking_id: Option<String>,
    ) -> Result<BookingConfirmation, BookingError> {
        // Нечего подтверждать - не заставляем пользователя ждать задержку
        self.store.check_confirmable().await?;

        info!("Submitting booking, confirmation in {:?}", self.delay);
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Booking submission cancelled during the delay");
                return Err(BookingError::Cancelled);
            }
            _ = tokio::time::sleep(self.delay) => {}
        }

        if token.is_cancelled() {
            return Err(BookingError::Cancelled);
        }

        let confirmed = self.store.confirm().await?;
        let confirmation = BookingConfirmation {
            booking_id: booking_id.unwrap_or_else(|| generate_booking_id(Utc::now())),
            movie: confirmed.current_movie().cloned(),
            seats: confirmed.selected_seats().to_vec(),
            subtotal: confirmed.total_price(),
        };
        info!(
            "Booking {} confirmed: {} seats, subtotal {}",
            confirmation.booking_id,
            confirmation.seats.len(),
            confirmation.subtotal
        );
        Ok(confirmation)
    }

    /// Кнопка "Done": сброс брони и возврат к списку фильмов.
    pub async fn done(&self) {
        self.store.reset_booking().await;
    }

    /// Кнопка "Book Another Movie". Сейчас ведёт себя так же, как [`Self::done`].
    pub async fn book_another(&self) {
        self.store.reset_booking().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn booking_id_uses_last_six_digits() {
        let now = Utc.timestamp_millis_opt(1_700_000_123_456).unwrap();
        assert_eq!(generate_booking_id(now), "BK123456");
    }

    #[test]
    fn tax_and_total_are_derived() {
        let confirmation = BookingConfirmation {
            booking_id: "BK1".to_string(),
            movie: None,
            seats: vec![],
            subtotal: 15,
        };
        assert_eq!(confirmation.tax(), 1.5);
        assert_eq!(confirmation.final_total(), 16.5);
        let receipt = confirmation.receipt();
        assert_eq!(receipt.tax, "1.50");
        assert_eq!(receipt.total, "16.50");
    }
}
