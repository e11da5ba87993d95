pub mod seat;
pub mod movie;
pub mod booking;

pub use seat::{Seat, SeatStatus, SeatType};
pub use movie::{Genre, GenreResponse, ImageResponse, Movie, MovieDetail, MovieImage, Page, Video, VideoResponse};
pub use booking::{BookingError, BookingState, BookingStep, BookingSummary};
