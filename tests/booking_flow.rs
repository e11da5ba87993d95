//! End-to-end booking scenarios on the service layer.

use cinema_booking::cancellation::CancellationSource;
use cinema_booking::models::{BookingError, BookingStep, MovieDetail, Seat, SeatStatus};
use cinema_booking::services::booking::BookingStore;
use cinema_booking::services::confirmation::ConfirmationFlow;
use cinema_booking::services::seat_generator::{generate_seats, SeatLayout};
use cinema_booking::services::seat_selection::SeatSelectionScreen;
use cinema_booking::storage::Storage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

fn movie(id: i64) -> MovieDetail {
    MovieDetail {
        id,
        title: format!("Movie {}", id),
        ..Default::default()
    }
}

async fn store_in_seat_selection() -> BookingStore {
    let store = BookingStore::load(Storage::in_memory()).await;
    store.enter_seat_selection(movie(1)).await.unwrap();
    store
}

#[tokio::test]
async fn regular_seat_confirms_with_tax() {
    let store = store_in_seat_selection().await;
    store.select_seat(&Seat::new('F', 5, 3, SeatStatus::Available)).await;

    let flow = ConfirmationFlow::new(store.clone(), Duration::from_millis(10));
    let source = CancellationSource::new();
    let confirmation = flow
        .submit_booking(&source.token(), Some("BK000001".to_string()))
        .await
        .unwrap();

    assert_eq!(confirmation.booking_id, "BK000001");
    assert_eq!(confirmation.subtotal, 15);
    assert_eq!(confirmation.final_total(), 16.5);
    assert_eq!(confirmation.receipt().total, "16.50");
    assert_eq!(store.summary().await.booking_step, BookingStep::Confirmation);
}

#[tokio::test]
async fn generated_id_has_bk_prefix_and_six_digits() {
    let store = store_in_seat_selection().await;
    store.select_seat(&Seat::new('A', 0, 1, SeatStatus::Available)).await;
    let flow = ConfirmationFlow::new(store, Duration::from_millis(1));

    let confirmation = flow
        .submit_booking(&CancellationSource::new().token(), None)
        .await
        .unwrap();
    let id = confirmation.booking_id;
    assert!(id.starts_with("BK"));
    assert_eq!(id.len(), 8);
    assert!(id[2..].chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn cancelled_submit_leaves_booking_untouched() {
    let store = store_in_seat_selection().await;
    store.select_seat(&Seat::new('C', 2, 4, SeatStatus::Available)).await;
    let before = store.snapshot().await;

    let flow = ConfirmationFlow::new(store.clone(), Duration::from_secs(30));
    let source = CancellationSource::new();
    let token = source.token();
    let submit = tokio::spawn(async move { flow.submit_booking(&token, None).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    source.cancel();

    let result = tokio::time::timeout(Duration::from_secs(1), submit)
        .await
        .expect("cancellation wakes the submit")
        .unwrap();
    assert_eq!(result.unwrap_err(), BookingError::Cancelled);
    assert_eq!(store.snapshot().await, before);
}

#[tokio::test]
async fn leaving_the_screen_cancels_submit() {
    let store = store_in_seat_selection().await;
    let screen = SeatSelectionScreen::new();
    let mut rng = StdRng::seed_from_u64(7);
    let seats = generate_seats(&SeatLayout::default(), &mut rng);
    let free = seats.iter().find(|s| s.is_available()).cloned().unwrap();
    screen.open(1, seats).await;
    store.select_seat(&free).await;

    let flow = ConfirmationFlow::new(store.clone(), Duration::from_secs(30));
    let token = screen.begin_submit().await.unwrap();
    let submit = {
        let token = token.clone();
        tokio::spawn(async move { flow.submit_booking(&token, None).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(screen.close().await);

    let result = submit.await.unwrap();
    assert_eq!(result.unwrap_err(), BookingError::Cancelled);
    assert_eq!(store.summary().await.booking_step, BookingStep::SeatSelection);
    assert_eq!(store.selected_seat_count().await, 1);
}

#[tokio::test]
async fn submit_without_seats_fails_fast() {
    let store = store_in_seat_selection().await;
    let flow = ConfirmationFlow::new(store, Duration::from_secs(30));

    let result = tokio::time::timeout(
        Duration::from_secs(1),
        flow.submit_booking(&CancellationSource::new().token(), None),
    )
    .await
    .expect("no delay without seats");
    assert_eq!(result.unwrap_err(), BookingError::NoSeatsSelected);
}

#[tokio::test]
async fn submit_from_movie_selection_is_rejected() {
    let store = BookingStore::load(Storage::in_memory()).await;
    let flow = ConfirmationFlow::new(store, Duration::from_millis(1));
    let err = flow
        .submit_booking(&CancellationSource::new().token(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::IllegalTransition { .. }));
}

#[tokio::test]
async fn confirmed_booking_keeps_its_seats_and_is_not_resubmitted() {
    let store = store_in_seat_selection().await;
    store.select_seat(&Seat::new('B', 1, 6, SeatStatus::Available)).await;
    let flow = ConfirmationFlow::new(store.clone(), Duration::from_millis(1));
    let token = CancellationSource::new().token();
    flow.submit_booking(&token, Some("BK000001".to_string()))
        .await
        .unwrap();

    assert!(!store.deselect_seat("B6").await);
    store.clear_selected_seats().await;
    let summary = store.summary().await;
    assert_eq!(summary.booking_step, BookingStep::Confirmation);
    assert_eq!(summary.selected_seat_count, 1);
    assert_eq!(summary.total_price, 20);

    let err = flow
        .submit_booking(&token, Some("BK000002".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::AlreadyConfirmed);
}

#[tokio::test]
async fn done_and_book_another_both_reset() {
    for book_another in [false, true] {
        let store = store_in_seat_selection().await;
        store.select_seat(&Seat::new('A', 0, 2, SeatStatus::Available)).await;
        let flow = ConfirmationFlow::new(store.clone(), Duration::from_millis(1));
        flow.submit_booking(&CancellationSource::new().token(), None)
            .await
            .unwrap();

        if book_another {
            flow.book_another().await;
        } else {
            flow.done().await;
        }

        let summary = store.summary().await;
        assert_eq!(summary.booking_step, BookingStep::MovieSelection);
        assert_eq!(summary.total_price, 0);
        assert!(summary.current_movie.is_none());
    }
}

#[tokio::test]
async fn selection_from_generated_map_prices_by_row_band() {
    let store = store_in_seat_selection().await;
    let mut rng = StdRng::seed_from_u64(11);
    let seats = generate_seats(&SeatLayout::default(), &mut rng);

    let mut expected = 0;
    for seat in seats.iter().filter(|s| s.number() == 1) {
        let changed = store.toggle_seat(seat).await;
        assert_eq!(changed, seat.is_available());
        if seat.is_available() {
            expected += seat.price();
        }
    }
    assert_eq!(store.total_price().await, expected);

    let overlay = store.overlay(&seats).await;
    let selected = overlay.iter().filter(|s| s.status() == SeatStatus::Selected).count();
    assert_eq!(selected, store.selected_seat_count().await);
}
