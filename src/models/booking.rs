//! booking.rs
//!
//! Состояние текущего бронирования: выбранный фильм, выбранные места, шаг
//! бронирования и производная сумма.
//!
//! Инварианты, которые держит [`BookingState`]:
//! - `total_price` всегда равен сумме цен выбранных мест (пересчитывается при
//!   каждой мутации и при загрузке из хранилища);
//! - место с одним и тем же id попадает в выборку не больше одного раза;
//! - занятое место (`occupied`) никогда не попадает в выборку;
//! - шаг меняется только по разрешённым переходам, см. [`BookingStep::can_transition_to`];
//! - в payment и confirmation выборка не пуста и заморожена: мутации мест там
//!   ничего не делают.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::movie::MovieDetail;
use super::seat::{Seat, SeatStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStep {
    #[default]
    MovieSelection,
    SeatSelection,
    Payment,
    Confirmation,
}

impl BookingStep {
    /// Разрешённые переходы:
    /// movie-selection → seat-selection → payment → confirmation,
    /// возврат в movie-selection из любого шага и повторный вход в текущий шаг.
    pub fn can_transition_to(self, next: BookingStep) -> bool {
        use BookingStep::*;

        if self == next || next == MovieSelection {
            return true;
        }
        matches!(
            (self, next),
            (MovieSelection, SeatSelection) | (SeatSelection, Payment) | (Payment, Confirmation)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStep::MovieSelection => "movie-selection",
            BookingStep::SeatSelection => "seat-selection",
            BookingStep::Payment => "payment",
            BookingStep::Confirmation => "confirmation",
        }
    }
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("illegal booking step transition: {from} -> {to}")]
    IllegalTransition { from: BookingStep, to: BookingStep },
    #[error("no seats selected")]
    NoSeatsSelected,
    #[error("booking is already confirmed")]
    AlreadyConfirmed,
    #[error("booking submission was cancelled")]
    Cancelled,
}

/// The in-progress booking. Fields are private: every change goes through the
/// operations below so the derived values cannot drift.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "PersistedBooking", into = "PersistedBooking")]
pub struct BookingState {
    current_movie: Option<MovieDetail>,
    selected_seats: Vec<Seat>,
    booking_step: BookingStep,
    total_price: u32,
}

impl BookingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_movie(&self) -> Option<&MovieDetail> {
        self.current_movie.as_ref()
    }

    pub fn selected_seats(&self) -> &[Seat] {
        &self.selected_seats
    }

    pub fn booking_step(&self) -> BookingStep {
        self.booking_step
    }

    pub fn total_price(&self) -> u32 {
        self.total_price
    }

    pub fn selected_seat_count(&self) -> usize {
        self.selected_seats.len()
    }

    pub fn can_proceed_to_payment(&self) -> bool {
        !self.selected_seats.is_empty()
    }

    pub fn is_selected(&self, seat_id: &str) -> bool {
        self.selected_seats.iter().any(|s| s.id() == seat_id)
    }

    /// Выборку можно менять только до оплаты.
    pub fn seats_editable(&self) -> bool {
        matches!(
            self.booking_step,
            BookingStep::MovieSelection | BookingStep::SeatSelection
        )
    }

    pub fn set_current_movie(&mut self, movie: Option<MovieDetail>) {
        self.current_movie = movie;
    }

    /// Добавляет место, если его ещё нет в выборке и оно свободно.
    /// Иначе ничего не делает. Возвращает `true`, если выборка изменилась.
    pub fn select_seat(&mut self, seat: &Seat) -> bool {
        if !self.seats_editable() || self.is_selected(seat.id()) || !seat.is_available() {
            return false;
        }
        self.selected_seats.push(seat.with_status(SeatStatus::Selected));
        self.recalculate();
        true
    }

    pub fn deselect_seat(&mut self, seat_id: &str) -> bool {
        if !self.seats_editable() {
            return false;
        }
        let before = self.selected_seats.len();
        self.selected_seats.retain(|s| s.id() != seat_id);
        let changed = self.selected_seats.len() != before;
        self.recalculate();
        changed
    }

    /// Тап по месту на схеме: выбранное снимается, свободное выбирается.
    pub fn toggle_seat(&mut self, seat: &Seat) -> bool {
        if self.is_selected(seat.id()) {
            self.deselect_seat(seat.id())
        } else {
            self.select_seat(seat)
        }
    }

    pub fn clear_selected_seats(&mut self) {
        if !self.seats_editable() {
            return;
        }
        self.selected_seats.clear();
        self.recalculate();
    }

    pub fn set_booking_step(&mut self, step: BookingStep) -> Result<(), BookingError> {
        let from = self.booking_step;
        if !from.can_transition_to(step) {
            return Err(BookingError::IllegalTransition { from, to: step });
        }
        let needs_seats = matches!(step, BookingStep::Payment | BookingStep::Confirmation);
        if needs_seats && step != from && !self.can_proceed_to_payment() {
            return Err(BookingError::NoSeatsSelected);
        }
        self.booking_step = step;
        Ok(())
    }

    /// Проверяет, что бронирование можно довести до подтверждения, ничего не меняя.
    pub fn check_confirmable(&self) -> Result<(), BookingError> {
        match self.booking_step {
            BookingStep::MovieSelection => Err(BookingError::IllegalTransition {
                from: BookingStep::MovieSelection,
                to: BookingStep::Confirmation,
            }),
            BookingStep::Confirmation => Err(BookingError::AlreadyConfirmed),
            _ if !self.can_proceed_to_payment() => Err(BookingError::NoSeatsSelected),
            _ => Ok(()),
        }
    }

    /// seat-selection → payment → confirmation одним шагом.
    pub fn confirm(&mut self) -> Result<(), BookingError> {
        self.check_confirmable()?;
        if self.booking_step == BookingStep::SeatSelection {
            self.set_booking_step(BookingStep::Payment)?;
        }
        self.set_booking_step(BookingStep::Confirmation)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Накладывает текущую выборку на сгенерированную схему зала.
    pub fn overlay(&self, seats: &[Seat]) -> Vec<Seat> {
        seats
            .iter()
            .map(|seat| {
                if seat.status() != SeatStatus::Occupied && self.is_selected(seat.id()) {
                    seat.with_status(SeatStatus::Selected)
                } else {
                    seat.clone()
                }
            })
            .collect()
    }

    pub fn summary(&self) -> BookingSummary {
        BookingSummary {
            current_movie: self.current_movie.clone(),
            selected_seats: self.selected_seats.clone(),
            booking_step: self.booking_step,
            total_price: self.total_price,
            selected_seat_count: self.selected_seat_count(),
            can_proceed_to_payment: self.can_proceed_to_payment(),
        }
    }

    fn recalculate(&mut self) {
        self.total_price = self.selected_seats.iter().map(Seat::price).sum();
    }
}

/// Read-only view handed to the UI layer, derived values included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingSummary {
    pub current_movie: Option<MovieDetail>,
    pub selected_seats: Vec<Seat>,
    pub booking_step: BookingStep,
    pub total_price: u32,
    pub selected_seat_count: usize,
    pub can_proceed_to_payment: bool,
}

// Формат хранения: только существенные поля, производные пересчитываются при загрузке
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PersistedBooking {
    selected_seats: Vec<Seat>,
    current_movie: Option<MovieDetail>,
    booking_step: BookingStep,
    total_price: u32,
}

impl From<PersistedBooking> for BookingState {
    fn from(persisted: PersistedBooking) -> Self {
        let mut selected_seats: Vec<Seat> = Vec::with_capacity(persisted.selected_seats.len());
        for seat in persisted.selected_seats {
            if seat.status() == SeatStatus::Occupied || selected_seats.iter().any(|s| s.id() == seat.id()) {
                continue;
            }
            selected_seats.push(seat.with_status(SeatStatus::Selected));
        }

        // оплата без мест не восстанавливается
        let booking_step = match persisted.booking_step {
            BookingStep::Payment | BookingStep::Confirmation if selected_seats.is_empty() => {
                BookingStep::SeatSelection
            }
            step => step,
        };

        let mut state = BookingState {
            current_movie: persisted.current_movie,
            selected_seats,
            booking_step,
            total_price: 0,
        };
        state.recalculate();
        state
    }
}

impl From<BookingState> for PersistedBooking {
    fn from(state: BookingState) -> Self {
        PersistedBooking {
            selected_seats: state.selected_seats,
            current_movie: state.current_movie,
            booking_step: state.booking_step,
            total_price: state.total_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(row: char, row_index: usize, number: u32) -> Seat {
        Seat::new(row, row_index, number, SeatStatus::Available)
    }

    #[test]
    fn select_and_deselect_keep_total_in_sync() {
        let mut state = BookingState::new();
        assert!(state.select_seat(&seat('C', 2, 7)));
        assert!(state.select_seat(&seat('A', 0, 1)));
        assert_eq!(state.total_price(), 45);
        assert_eq!(state.selected_seat_count(), 2);

        assert!(state.deselect_seat("C7"));
        assert_eq!(state.total_price(), 25);
        assert_eq!(state.selected_seat_count(), 1);
    }

    #[test]
    fn stored_copy_is_marked_selected() {
        let mut state = BookingState::new();
        state.select_seat(&seat('B', 1, 3));
        assert_eq!(state.selected_seats()[0].status(), SeatStatus::Selected);
    }

    #[test]
    fn duplicate_and_occupied_selects_are_ignored() {
        let mut state = BookingState::new();
        let a1 = seat('A', 0, 1);
        assert!(state.select_seat(&a1));
        let before = state.clone();

        assert!(!state.select_seat(&a1));
        assert!(!state.select_seat(&Seat::new('D', 3, 4, SeatStatus::Occupied)));
        // место, уже помеченное selected, тоже не добавляется повторно
        assert!(!state.select_seat(&a1.with_status(SeatStatus::Selected)));
        assert_eq!(state, before);
    }

    #[test]
    fn deselect_unknown_id_is_noop() {
        let mut state = BookingState::new();
        state.select_seat(&seat('A', 0, 2));
        let before = state.clone();
        assert!(!state.deselect_seat("Z99"));
        assert_eq!(state, before);
    }

    #[test]
    fn toggle_follows_tap_semantics() {
        let mut state = BookingState::new();
        let e5 = seat('E', 4, 5);
        assert!(state.toggle_seat(&e5));
        assert!(state.is_selected("E5"));
        assert!(state.toggle_seat(&e5));
        assert!(!state.is_selected("E5"));
        assert_eq!(state.total_price(), 0);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = BookingState::new();
        state.set_current_movie(Some(MovieDetail {
            id: 1,
            ..Default::default()
        }));
        state.set_booking_step(BookingStep::SeatSelection).unwrap();
        state.select_seat(&seat('F', 5, 1));
        state.reset();

        assert_eq!(state.current_movie(), None);
        assert!(state.selected_seats().is_empty());
        assert_eq!(state.booking_step(), BookingStep::MovieSelection);
        assert_eq!(state.total_price(), 0);
    }

    #[test]
    fn transition_table() {
        use BookingStep::*;
        assert!(MovieSelection.can_transition_to(SeatSelection));
        assert!(SeatSelection.can_transition_to(Payment));
        assert!(Payment.can_transition_to(Confirmation));
        assert!(Confirmation.can_transition_to(MovieSelection));
        assert!(Payment.can_transition_to(Payment));

        assert!(!MovieSelection.can_transition_to(Payment));
        assert!(!MovieSelection.can_transition_to(Confirmation));
        assert!(!SeatSelection.can_transition_to(Confirmation));
        assert!(!Confirmation.can_transition_to(Payment));
        assert!(!Payment.can_transition_to(SeatSelection));
    }

    #[test]
    fn illegal_transition_leaves_state_unchanged() {
        let mut state = BookingState::new();
        let err = state.set_booking_step(BookingStep::Confirmation).unwrap_err();
        assert_eq!(
            err,
            BookingError::IllegalTransition {
                from: BookingStep::MovieSelection,
                to: BookingStep::Confirmation
            }
        );
        assert_eq!(state.booking_step(), BookingStep::MovieSelection);
    }

    #[test]
    fn payment_requires_selected_seats() {
        let mut state = BookingState::new();
        state.set_booking_step(BookingStep::SeatSelection).unwrap();
        assert_eq!(
            state.set_booking_step(BookingStep::Payment),
            Err(BookingError::NoSeatsSelected)
        );
        state.select_seat(&seat('G', 6, 2));
        assert!(state.set_booking_step(BookingStep::Payment).is_ok());
    }

    #[test]
    fn confirm_walks_through_payment() {
        let mut state = BookingState::new();
        state.set_booking_step(BookingStep::SeatSelection).unwrap();
        state.select_seat(&seat('H', 7, 9));
        state.confirm().unwrap();
        assert_eq!(state.booking_step(), BookingStep::Confirmation);
    }

    #[test]
    fn confirmed_booking_cannot_be_confirmed_again() {
        let mut state = BookingState::new();
        state.set_booking_step(BookingStep::SeatSelection).unwrap();
        state.select_seat(&seat('D', 3, 5));
        state.confirm().unwrap();

        assert_eq!(state.check_confirmable(), Err(BookingError::AlreadyConfirmed));
        assert_eq!(state.confirm(), Err(BookingError::AlreadyConfirmed));
        assert_eq!(state.booking_step(), BookingStep::Confirmation);
    }

    #[test]
    fn seats_are_frozen_after_payment_starts() {
        let mut state = BookingState::new();
        state.set_booking_step(BookingStep::SeatSelection).unwrap();
        let d5 = seat('D', 3, 5);
        state.select_seat(&d5);

        for step in [BookingStep::Payment, BookingStep::Confirmation] {
            state.set_booking_step(step).unwrap();
            let before = state.clone();

            assert!(!state.deselect_seat("D5"));
            assert!(!state.toggle_seat(&d5));
            assert!(!state.select_seat(&seat('E', 4, 1)));
            state.clear_selected_seats();

            assert_eq!(state, before);
            assert!(state.can_proceed_to_payment());
        }
    }

    #[test]
    fn empty_payment_is_not_confirmable() {
        let json = r#"{"selectedSeats":[],"bookingStep":"payment"}"#;
        let state: BookingState = serde_json::from_str(json).unwrap();
        assert_eq!(state.booking_step(), BookingStep::SeatSelection);
        assert_eq!(state.check_confirmable(), Err(BookingError::NoSeatsSelected));
    }

    #[test]
    fn overlay_marks_only_selected_free_seats() {
        let mut state = BookingState::new();
        let free = seat('A', 0, 1);
        let taken = Seat::new('A', 0, 2, SeatStatus::Occupied);
        state.select_seat(&free);

        let shown = state.overlay(&[free.clone(), taken.clone(), seat('A', 0, 3)]);
        assert_eq!(shown[0].status(), SeatStatus::Selected);
        assert_eq!(shown[1].status(), SeatStatus::Occupied);
        assert_eq!(shown[2].status(), SeatStatus::Available);
    }

    #[test]
    fn persisted_form_recomputes_derived_values() {
        let json = r#"{
            "selectedSeats": [
                {"id":"A1","row":"A","number":1,"status":"selected","type":"vip","price":25},
                {"id":"A1","row":"A","number":1,"status":"selected","type":"vip","price":25},
                {"id":"C2","row":"C","number":2,"status":"occupied","type":"premium","price":20}
            ],
            "currentMovie": null,
            "bookingStep": "seat-selection",
            "totalPrice": 999
        }"#;
        let state: BookingState = serde_json::from_str(json).unwrap();
        assert_eq!(state.selected_seat_count(), 1);
        assert_eq!(state.total_price(), 25);
        assert_eq!(state.booking_step(), BookingStep::SeatSelection);

        let back = serde_json::to_value(&state).unwrap();
        assert_eq!(back["totalPrice"], 25);
        assert_eq!(back["bookingStep"], "seat-selection");
    }
}
