mod common;

use std::sync::Arc;

use engine::{
    Actor, BookingStatus, Discount, EngineError, MoneyCents, NewCouponCmd, NewDailyOfferCmd,
    PaymentMethod, PaymentResultCmd, PaymentStatus, Percent, QuoteCmd, ReserveCmd, UnitRef, Window,
};

use common::{CUSTOMER, at, fixture, hour_on_monday, local, monday};

#[tokio::test]
async fn reserve_rejects_what_does_not_fit() {
    let fx = fixture(5).await;
    let window = Window::hourly(monday(), at(10), 120);

    fx.reserve(window, 2, PaymentMethod::Online).await;
    fx.reserve(Window::hourly(monday(), at(11), 60), 2, PaymentMethod::Cash)
        .await;

    let err = fx
        .engine
        .reserve(ReserveCmd::new(
            CUSTOMER,
            fx.board,
            Window::hourly(monday(), at(11), 60),
            2,
            PaymentMethod::Online,
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Overbooked {
            available: 1,
            capacity: 5
        }
    );

    // The last free item is still bookable.
    fx.reserve(Window::hourly(monday(), at(11), 60), 1, PaymentMethod::Online)
        .await;
    assert_eq!(
        fx.engine
            .occupancy(fx.board, &hour_on_monday(11))
            .await
            .unwrap(),
        5
    );
    assert_eq!(fx.engine.capacity(fx.board).await.unwrap(), 5);
}

#[tokio::test]
async fn touching_windows_do_not_overlap() {
    let fx = fixture(1).await;
    fx.reserve(hour_on_monday(12), 1, PaymentMethod::Cash).await;
    fx.reserve(hour_on_monday(13), 1, PaymentMethod::Cash).await;
    fx.reserve(hour_on_monday(11), 1, PaymentMethod::Cash).await;

    let err = fx
        .engine
        .reserve(ReserveCmd::new(
            CUSTOMER,
            fx.board,
            Window::hourly(monday(), at(12), 30),
            1,
            PaymentMethod::Cash,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Overbooked { available: 0, .. }));
}

#[tokio::test]
async fn invalid_quantity_and_hours_are_rejected() {
    let fx = fixture(3).await;

    let err = fx
        .engine
        .reserve(ReserveCmd::new(
            CUSTOMER,
            fx.board,
            hour_on_monday(12),
            0,
            PaymentMethod::Online,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidQuantity(_)));

    for window in [
        Window::hourly(monday(), at(7), 60),
        Window::hourly(monday(), at(21), 120),
    ] {
        let err = fx
            .engine
            .reserve(ReserveCmd::new(
                CUSTOMER,
                fx.board,
                window,
                1,
                PaymentMethod::Online,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::OutsideHours(_)), "{window:?}");
    }

    assert!(
        fx.engine
            .bookings_for_user(CUSTOMER)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn canceled_and_completed_bookings_free_capacity() {
    let fx = fixture(1).await;
    let first = fx.reserve(hour_on_monday(12), 1, PaymentMethod::Online).await;
    fx.engine
        .cancel_booking(first, Actor::Owner(CUSTOMER))
        .await
        .unwrap();

    let second = fx.active_paid_booking(hour_on_monday(12)).await;
    fx.engine
        .complete_booking(second, Actor::Partner(fx.partner_id))
        .await
        .unwrap();

    fx.reserve(hour_on_monday(12), 1, PaymentMethod::Online).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reservations_never_exceed_capacity() {
    const CAPACITY: i64 = 3;
    const ATTEMPTS: usize = 12;

    let fx = fixture(CAPACITY).await;
    let engine = Arc::new(fx.engine);

    let mut tasks = tokio::task::JoinSet::new();
    for n in 0..ATTEMPTS {
        let engine = Arc::clone(&engine);
        let board = fx.board;
        tasks.spawn(async move {
            engine
                .reserve(ReserveCmd::new(
                    CUSTOMER + n as i64,
                    board,
                    hour_on_monday(14),
                    1,
                    PaymentMethod::Online,
                ))
                .await
        });
    }

    let mut accepted = 0;
    let mut overbooked = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => accepted += 1,
            Err(EngineError::Overbooked { available, .. }) => {
                assert_eq!(available, 0);
                overbooked += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(accepted, CAPACITY as usize);
    assert_eq!(overbooked, ATTEMPTS - CAPACITY as usize);
    assert_eq!(
        engine
            .occupancy(fx.board, &hour_on_monday(14))
            .await
            .unwrap(),
        CAPACITY
    );
}

#[tokio::test]
async fn entry_status_and_deadline_follow_payment_method() {
    let fx = fixture(10).await;

    let online = fx.reserve(hour_on_monday(12), 1, PaymentMethod::Online).await;
    let card = fx
        .reserve(hour_on_monday(12), 1, PaymentMethod::CardTransfer)
        .await;
    let cash = fx.reserve(hour_on_monday(12), 1, PaymentMethod::Cash).await;

    let online = fx.engine.booking(online).await.unwrap();
    assert_eq!(online.status, BookingStatus::WaitingPartner);
    assert_eq!(online.payment_status, PaymentStatus::Pending);
    assert_eq!(online.amount, MoneyCents::new(1000_00));
    assert_eq!(
        online.payment_deadline,
        Some(monday().and_hms_opt(9, 30, 0).unwrap())
    );

    let card = fx.engine.booking(card).await.unwrap();
    assert_eq!(card.status, BookingStatus::WaitingCard);
    assert_eq!(card.payment_status, PaymentStatus::Unpaid);
    assert_eq!(card.payment_deadline, None);

    let cash = fx.engine.booking(cash).await.unwrap();
    assert_eq!(cash.status, BookingStatus::WaitingCash);
}

#[tokio::test]
async fn daily_offers_book_whole_days() {
    let fx = fixture(1).await;
    let offer_id = fx
        .engine
        .new_daily_offer(NewDailyOfferCmd::new(
            fx.partner_id,
            "Camping kit",
            2,
            MoneyCents::new(1500_00),
        ))
        .await
        .unwrap();
    let offer = UnitRef::Daily { offer_id };

    let booking_id = fx
        .engine
        .reserve(ReserveCmd::new(
            CUSTOMER,
            offer,
            Window::daily(monday(), 3),
            2,
            PaymentMethod::Online,
        ))
        .await
        .unwrap();
    let booking = fx.engine.booking(booking_id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::WaitingDaily);
    assert_eq!(booking.amount, MoneyCents::new(9000_00));

    // Ranges overlap on the 21st; the 22nd is free again.
    let err = fx
        .engine
        .reserve(ReserveCmd::new(
            CUSTOMER,
            offer,
            Window::daily(monday().succ_opt().unwrap().succ_opt().unwrap(), 1),
            1,
            PaymentMethod::Online,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Overbooked { available: 0, capacity: 2 }));
    fx.engine
        .reserve(ReserveCmd::new(
            CUSTOMER,
            offer,
            Window::daily(monday() + chrono::Duration::days(3), 1),
            1,
            PaymentMethod::Online,
        ))
        .await
        .unwrap();

    // An hourly window cannot target a daily offer.
    assert!(
        fx.engine
            .reserve(ReserveCmd::new(
                CUSTOMER,
                offer,
                hour_on_monday(12),
                1,
                PaymentMethod::Online,
            ))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn quote_applies_valid_coupons_only() {
    let fx = fixture(5).await;
    fx.engine
        .new_coupon(NewCouponCmd::new(
            "AUTUMN",
            Discount::Percent(Percent::whole(10).unwrap()),
        ))
        .await
        .unwrap();
    fx.engine
        .new_coupon(
            NewCouponCmd::new("EXPIRED", Discount::Fixed(MoneyCents::new(100_00)))
                .valid_between(None, monday().pred_opt()),
        )
        .await
        .unwrap();

    let plain = QuoteCmd::new(fx.board, hour_on_monday(12), 1);
    let quote = fx.engine.quote(&plain.clone().coupon("autumn ")).await.unwrap();
    assert_eq!(quote.coupon, None, "codes are case sensitive");

    let quote = fx.engine.quote(&plain.clone().coupon(" AUTUMN")).await.unwrap();
    assert_eq!(quote.base_amount, MoneyCents::new(1000_00));
    assert_eq!(quote.amount, MoneyCents::new(900_00));
    assert_eq!(quote.coupon.as_deref(), Some("AUTUMN"));

    let quote = fx.engine.quote(&plain.coupon("EXPIRED")).await.unwrap();
    assert_eq!(quote.amount, MoneyCents::new(1000_00));
    assert_eq!(quote.coupon, None);

    let err = fx
        .engine
        .new_coupon(NewCouponCmd::new(
            "AUTUMN",
            Discount::Fixed(MoneyCents::new(1_00)),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("AUTUMN".to_string()));
}

#[tokio::test]
async fn coupon_use_is_counted_once_on_payment() {
    let fx = fixture(5).await;
    fx.engine
        .new_coupon(
            NewCouponCmd::new("ONCE", Discount::Fixed(MoneyCents::new(200_00))).max_uses(1),
        )
        .await
        .unwrap();

    let booking_id = fx
        .engine
        .reserve(
            ReserveCmd::new(
                CUSTOMER,
                fx.board,
                hour_on_monday(12),
                1,
                PaymentMethod::Online,
            )
            .coupon("ONCE"),
        )
        .await
        .unwrap();
    let booking = fx.engine.booking(booking_id).await.unwrap();
    assert_eq!(booking.amount, MoneyCents::new(800_00));
    assert_eq!(fx.engine.coupon("ONCE").await.unwrap().used, 0);

    let paid = PaymentResultCmd::succeeded(booking_id, "pay-1", booking.amount, booking.currency);
    fx.engine.record_payment_result(paid.clone()).await.unwrap();
    fx.engine.record_payment_result(paid).await.unwrap();
    assert_eq!(fx.engine.coupon("ONCE").await.unwrap().used, 1);

    // Exhausted: the next quote ignores it.
    let quote = fx
        .engine
        .quote(&QuoteCmd::new(fx.board, hour_on_monday(13), 1).coupon("ONCE"))
        .await
        .unwrap();
    assert_eq!(quote.coupon, None);
}

#[tokio::test]
async fn available_slots_skip_full_and_past_hours() {
    let fx = fixture(2).await;
    fx.clock.set(local(monday(), 10, 30));
    fx.reserve(hour_on_monday(12), 2, PaymentMethod::Cash).await;
    fx.reserve(hour_on_monday(13), 1, PaymentMethod::Cash).await;

    let board_id = fx.board.id();
    let slots = fx
        .engine
        .available_slots(board_id, monday())
        .await
        .unwrap();
    let starts: Vec<_> = slots.iter().map(|s| s.start).collect();

    assert_eq!(starts.first(), Some(&at(11)));
    assert!(!starts.contains(&at(10)));
    assert!(!starts.contains(&at(12)));
    let one_pm = slots.iter().find(|s| s.start == at(13)).unwrap();
    assert_eq!(one_pm.available, 1);
    assert_eq!(starts.last(), Some(&at(21)));
}

#[tokio::test]
async fn inactive_units_cannot_be_booked() {
    let fx = fixture(2).await;
    fx.engine.set_unit_active(fx.board, false).await.unwrap();

    let err = fx
        .engine
        .reserve(ReserveCmd::new(
            CUSTOMER,
            fx.board,
            hour_on_monday(12),
            1,
            PaymentMethod::Cash,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert!(
        fx.engine
            .list_active_units(&Default::default())
            .await
            .unwrap()
            .is_empty()
    );
}
