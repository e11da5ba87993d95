//! Экран выбора мест: схема зала текущего визита, флаг отправки и
//! источник отмены, живущий столько же, сколько экран.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cancellation::{CancellationSource, CancellationToken};
use crate::models::Seat;
use crate::services::confirmation::BookingConfirmation;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenError {
    #[error("seat selection screen is not open")]
    NotOpen,
    #[error("booking is already being submitted")]
    AlreadySubmitting,
}

struct Visit {
    movie_id: i64,
    seats: Vec<Seat>,
    cancel: CancellationSource,
    submitting: bool,
    confirmation: Option<BookingConfirmation>,
}

#[derive(Clone, Default)]
pub struct SeatSelectionScreen {
    visit: Arc<RwLock<Option<Visit>>>,
}

impl SeatSelectionScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Новый визит. Предыдущий визит, если был, отменяется.
    pub async fn open(&self, movie_id: i64, seats: Vec<Seat>) {
        let previous = self.visit.write().await.replace(Visit {
            movie_id,
            seats,
            cancel: CancellationSource::new(),
            submitting: false,
            confirmation: None,
        });
        if let Some(previous) = previous {
            previous.cancel.cancel();
            debug!("Seat selection: replaced visit for movie {}", previous.movie_id);
        }
    }

    /// Уход с экрана: отменяет незавершённую отправку.
    pub async fn close(&self) -> bool {
        match self.visit.write().await.take() {
            Some(visit) => {
                visit.cancel.cancel();
                debug!("Seat selection: closed visit for movie {}", visit.movie_id);
                true
            }
            None => false,
        }
    }

    pub async fn movie_id(&self) -> Option<i64> {
        self.visit.read().await.as_ref().map(|v| v.movie_id)
    }

    pub async fn seats(&self) -> Option<Vec<Seat>> {
        self.visit.read().await.as_ref().map(|v| v.seats.clone())
    }

    pub async fn find_seat(&self, seat_id: &str) -> Result<Option<Seat>, ScreenError> {
        let guard = self.visit.read().await;
        let visit = guard.as_ref().ok_or(ScreenError::NotOpen)?;
        Ok(visit.seats.iter().find(|s| s.id() == seat_id).cloned())
    }

    pub async fn is_submitting(&self) -> bool {
        self.visit.read().await.as_ref().is_some_and(|v| v.submitting)
    }

    /// Помечает визит как отправляющийся и выдаёт токен отмены визита.
    pub async fn begin_submit(&self) -> Result<CancellationToken, ScreenError> {
        let mut guard = self.visit.write().await;
        let visit = guard.as_mut().ok_or(ScreenError::NotOpen)?;
        if visit.submitting {
            return Err(ScreenError::AlreadySubmitting);
        }
        visit.submitting = true;
        Ok(visit.cancel.token())
    }

    /// Завершение отправки. Если визит за это время сменился или закрылся,
    /// результат относится к старому экрану и игнорируется.
    pub async fn finish_submit(&self, token: &CancellationToken, confirmation: Option<BookingConfirmation>) {
        let mut guard = self.visit.write().await;
        if let Some(visit) = guard.as_mut().filter(|v| token.is_from(&v.cancel)) {
            visit.submitting = false;
            if confirmation.is_some() {
                visit.confirmation = confirmation;
            }
        }
    }

    pub async fn confirmation(&self) -> Option<BookingConfirmation> {
        self.visit.read().await.as_ref().and_then(|v| v.confirmation.clone())
    }
}
