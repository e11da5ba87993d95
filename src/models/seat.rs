use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Occupied,
    Selected,
}

/// Ценовая категория места. Определяется рядом при генерации и больше не меняется.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    Regular,
    Premium,
    Vip,
}

impl SeatType {
    // Полосы рядов (индекс с нуля): 0-1 vip, 2-4 premium, остальные regular
    pub fn for_row_index(row_index: usize) -> Self {
        match row_index {
            0..=1 => SeatType::Vip,
            2..=4 => SeatType::Premium,
            _ => SeatType::Regular,
        }
    }

    pub fn price(self) -> u32 {
        match self {
            SeatType::Vip => 25,
            SeatType::Premium => 20,
            SeatType::Regular => 15,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeatType::Regular => "regular",
            SeatType::Premium => "premium",
            SeatType::Vip => "vip",
        }
    }
}

impl fmt::Display for SeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One seat of a screening. Only `status` may change after the seat is built;
/// the id, band and price are read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredSeat")]
pub struct Seat {
    id: String,
    row: char,
    number: u32,
    status: SeatStatus,
    #[serde(rename = "type")]
    seat_type: SeatType,
    price: u32,
}

// Сохранённое место: id и цена не читаются, а выводятся заново
#[derive(Deserialize)]
struct StoredSeat {
    row: char,
    number: u32,
    status: SeatStatus,
    #[serde(rename = "type")]
    seat_type: SeatType,
}

impl From<StoredSeat> for Seat {
    fn from(stored: StoredSeat) -> Self {
        Seat::from_parts(stored.row, stored.number, stored.status, stored.seat_type)
    }
}

impl Seat {
    pub fn new(row: char, row_index: usize, number: u32, status: SeatStatus) -> Self {
        Self::from_parts(row, number, status, SeatType::for_row_index(row_index))
    }

    // категория из хранилища берётся как есть
    fn from_parts(row: char, number: u32, status: SeatStatus, seat_type: SeatType) -> Self {
        Self {
            id: format!("{}{}", row, number),
            row,
            number,
            status,
            seat_type,
            price: seat_type.price(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn row(&self) -> char {
        self.row
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn status(&self) -> SeatStatus {
        self.status
    }

    pub fn seat_type(&self) -> SeatType {
        self.seat_type
    }

    pub fn price(&self) -> u32 {
        self.price
    }

    pub fn is_available(&self) -> bool {
        self.status == SeatStatus::Available
    }

    /// Копия места с другим статусом.
    pub fn with_status(&self, status: SeatStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}
