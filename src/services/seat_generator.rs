//! Генерация схемы зала для одного сеанса.
//!
//! Структура детерминирована (ряды × места, категории по полосам рядов),
//! занятость случайна. Источник случайности передаётся явно, поэтому тесты
//! могут использовать `StdRng::seed_from_u64`.
//!
//! Это заглушка: настоящая занятость мест должна приходить с сервера, и
//! результат генерации нельзя считать инвентарём, защищённым от гонок.

use rand::Rng;

use crate::config::BookingConfig;
use crate::models::{Seat, SeatStatus};

pub const DEFAULT_ROWS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];
pub const DEFAULT_SEATS_PER_ROW: u32 = 10;
pub const DEFAULT_OCCUPANCY_RATE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct SeatLayout {
    pub rows: Vec<char>,
    pub seats_per_row: u32,
    /// Вероятность того, что место окажется занятым.
    pub occupancy_rate: f64,
}

impl Default for SeatLayout {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS.to_vec(),
            seats_per_row: DEFAULT_SEATS_PER_ROW,
            occupancy_rate: DEFAULT_OCCUPANCY_RATE,
        }
    }
}

impl SeatLayout {
    pub fn from_config(config: &BookingConfig) -> Self {
        Self {
            rows: config.rows.clone(),
            seats_per_row: config.seats_per_row,
            occupancy_rate: config.occupancy_rate,
        }
    }

    pub fn capacity(&self) -> usize {
        self.rows.len() * self.seats_per_row as usize
    }
}

/// Row-major seat list: all of row A, then row B, and so on; seat numbers
/// run 1..=seats_per_row. Each seat is independently occupied with
/// probability `occupancy_rate`.
pub fn generate_seats<R: Rng>(layout: &SeatLayout, rng: &mut R) -> Vec<Seat> {
    let mut seats = Vec::with_capacity(layout.capacity());

    for (row_index, &row) in layout.rows.iter().enumerate() {
        for number in 1..=layout.seats_per_row {
            let status = if rng.gen::<f64>() < layout.occupancy_rate {
                SeatStatus::Occupied
            } else {
                SeatStatus::Available
            };
            seats.push(Seat::new(row, row_index, number, status));
        }
    }

    seats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeatType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn default_layout_has_eighty_unique_seats() {
        let mut rng = StdRng::seed_from_u64(7);
        let seats = generate_seats(&SeatLayout::default(), &mut rng);

        assert_eq!(seats.len(), 80);
        let ids: HashSet<&str> = seats.iter().map(|s| s.id()).collect();
        assert_eq!(ids.len(), 80);
    }

    #[test]
    fn seats_are_row_major_and_numbered_from_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let seats = generate_seats(&SeatLayout::default(), &mut rng);

        assert_eq!(seats[0].id(), "A1");
        assert_eq!(seats[9].id(), "A10");
        assert_eq!(seats[10].id(), "B1");
        assert_eq!(seats[79].id(), "H10");
    }

    #[test]
    fn bands_follow_row_index() {
        let mut rng = StdRng::seed_from_u64(3);
        for seat in generate_seats(&SeatLayout::default(), &mut rng) {
            let expected = match seat.row() {
                'A' | 'B' => (SeatType::Vip, 25),
                'C' | 'D' | 'E' => (SeatType::Premium, 20),
                _ => (SeatType::Regular, 15),
            };
            assert_eq!((seat.seat_type(), seat.price()), expected, "seat {}", seat.id());
        }
    }

    #[test]
    fn generated_seats_are_never_selected() {
        let mut rng = StdRng::seed_from_u64(11);
        assert!(generate_seats(&SeatLayout::default(), &mut rng)
            .iter()
            .all(|s| s.status() != SeatStatus::Selected));
    }

    #[test]
    fn occupancy_extremes() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut layout = SeatLayout {
            occupancy_rate: 0.0,
            ..SeatLayout::default()
        };
        assert!(generate_seats(&layout, &mut rng).iter().all(Seat::is_available));

        layout.occupancy_rate = 1.0;
        assert!(generate_seats(&layout, &mut rng)
            .iter()
            .all(|s| s.status() == SeatStatus::Occupied));
    }

    #[test]
    fn same_seed_same_layout() {
        let layout = SeatLayout::default();
        let a = generate_seats(&layout, &mut StdRng::seed_from_u64(42));
        let b = generate_seats(&layout, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
