pub mod booking;
pub mod confirmation;
pub mod favorites;
pub mod movies;
pub mod preferences;
pub mod retry;
pub mod seat_generator;
pub mod seat_selection;
