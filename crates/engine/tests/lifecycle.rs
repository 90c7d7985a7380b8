mod common;

use engine::{
    Actor, BookingStatus, EngineError, MoneyCents, PaymentMethod, PaymentResultCmd, PaymentStatus,
    WalletOwner,
};

use common::{CUSTOMER, fixture, hour_on_monday};

#[tokio::test]
async fn partner_confirms_and_completes() {
    let fx = fixture(3).await;
    let booking_id = fx
        .reserve(hour_on_monday(12), 1, PaymentMethod::CardTransfer)
        .await;
    let partner = Actor::Partner(fx.partner_id);

    fx.engine.confirm_booking(booking_id, partner).await.unwrap();
    let booking = fx.engine.booking(booking_id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Active);
    assert_eq!(booking.payment_status, PaymentStatus::Paid);
    assert!(booking.started_at.is_some());

    let completion = fx.engine.complete_booking(booking_id, partner).await.unwrap();
    assert!(completion.partner_credit.is_some());
    assert!(completion.staff_credit.is_none());
    let booking = fx.engine.booking(booking_id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Completed);
    assert!(booking.ended_at.is_some());
}

#[tokio::test]
async fn customers_and_strangers_are_forbidden() {
    let fx = fixture(3).await;
    let booking_id = fx.reserve(hour_on_monday(12), 1, PaymentMethod::Cash).await;
    let other_partner = fx.engine.new_partner("Other", None).await.unwrap();

    let err = fx
        .engine
        .confirm_booking(booking_id, Actor::Owner(CUSTOMER))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = fx
        .engine
        .confirm_booking(booking_id, Actor::Partner(other_partner))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = fx
        .engine
        .cancel_booking(booking_id, Actor::Owner(CUSTOMER + 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let outsider = fx.engine.new_staff(other_partner, "Ivan", None).await.unwrap();
    let err = fx
        .engine
        .confirm_booking(booking_id, Actor::Staff(outsider))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let booking = fx.engine.booking(booking_id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::WaitingCash);
}

#[tokio::test]
async fn closed_bookings_reject_every_action() {
    let fx = fixture(3).await;
    let booking_id = fx.reserve(hour_on_monday(12), 1, PaymentMethod::Cash).await;
    fx.engine
        .cancel_booking(booking_id, Actor::Owner(CUSTOMER))
        .await
        .unwrap();

    for result in [
        fx.engine.confirm_booking(booking_id, Actor::Admin).await,
        fx.engine.cancel_booking(booking_id, Actor::Admin).await,
        fx.engine
            .complete_booking(booking_id, Actor::Admin)
            .await
            .map(|_| ()),
    ] {
        let err = result.unwrap_err();
        assert!(matches!(err, EngineError::IllegalTransition(_)), "{err}");
        assert!(err.to_string().starts_with("Already processed"));
    }
}

#[tokio::test]
async fn paid_and_active_bookings_cannot_be_canceled() {
    let fx = fixture(3).await;

    let active = fx.active_paid_booking(hour_on_monday(12)).await;
    let err = fx
        .engine
        .cancel_booking(active, Actor::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::IllegalTransition(_)));

    // Paying online activates the booking, which closes cancellation.
    let waiting = fx.reserve(hour_on_monday(13), 1, PaymentMethod::Online).await;
    let booking = fx.engine.booking(waiting).await.unwrap();
    fx.engine
        .record_payment_result(PaymentResultCmd::succeeded(
            waiting,
            "pay-1",
            booking.amount,
            booking.currency,
        ))
        .await
        .unwrap();
    let err = fx
        .engine
        .cancel_booking(waiting, Actor::Owner(CUSTOMER))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::IllegalTransition(_)));
}

#[tokio::test]
async fn completing_requires_an_active_booking() {
    let fx = fixture(3).await;
    let booking_id = fx.reserve(hour_on_monday(12), 1, PaymentMethod::Cash).await;

    let err = fx
        .engine
        .complete_booking(booking_id, Actor::Partner(fx.partner_id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::IllegalTransition(_)));

    let err = fx
        .engine
        .complete_booking(booking_id, Actor::Owner(CUSTOMER))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn staff_confirmation_assigns_the_booking() {
    let fx = fixture(3).await;
    let staff_id = fx
        .engine
        .new_staff(fx.partner_id, "Olga", None)
        .await
        .unwrap();
    let booking_id = fx.reserve(hour_on_monday(12), 1, PaymentMethod::Cash).await;

    fx.engine
        .confirm_booking(booking_id, Actor::Staff(staff_id))
        .await
        .unwrap();
    let booking = fx.engine.booking(booking_id).await.unwrap();
    assert_eq!(booking.staff_id, Some(staff_id));
    assert_eq!(booking.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn online_payment_activates_and_credits_immediately() {
    let fx = fixture(3).await;
    let booking_id = fx.reserve(hour_on_monday(12), 1, PaymentMethod::Online).await;
    let booking = fx.engine.booking(booking_id).await.unwrap();

    fx.engine
        .record_payment_result(PaymentResultCmd::succeeded(
            booking_id,
            "pay-1",
            booking.amount,
            booking.currency,
        ))
        .await
        .unwrap();

    let booking = fx.engine.booking(booking_id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Active);
    assert_eq!(booking.payment_status, PaymentStatus::Paid);
    assert!(booking.partner_credited);
    assert_eq!(
        fx.engine
            .balance(WalletOwner::partner(fx.partner_id))
            .await
            .unwrap(),
        MoneyCents::new(900_00)
    );

    // Completion does not pay the partner twice.
    let completion = fx
        .engine
        .complete_booking(booking_id, Actor::System)
        .await
        .unwrap();
    assert_eq!(completion.partner_credit, None);
    assert_eq!(
        fx.engine
            .balance(WalletOwner::partner(fx.partner_id))
            .await
            .unwrap(),
        MoneyCents::new(900_00)
    );
}

#[tokio::test]
async fn mismatched_payment_is_rejected_without_side_effects() {
    let fx = fixture(3).await;
    let booking_id = fx.reserve(hour_on_monday(12), 1, PaymentMethod::Online).await;
    let booking = fx.engine.booking(booking_id).await.unwrap();

    let err = fx
        .engine
        .record_payment_result(PaymentResultCmd::succeeded(
            booking_id,
            "spoofed",
            MoneyCents::new(1_00),
            booking.currency,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AmountMismatch(_)));
    assert_eq!(err.to_string(), "Payment rejected");

    let after = fx.engine.booking(booking_id).await.unwrap();
    assert_eq!(after.status, BookingStatus::WaitingPartner);
    assert_eq!(after.payment_status, PaymentStatus::Pending);
    assert_eq!(
        fx.engine
            .balance(WalletOwner::partner(fx.partner_id))
            .await
            .unwrap(),
        MoneyCents::ZERO
    );
}

#[tokio::test]
async fn failed_payment_only_flags_the_payment() {
    let fx = fixture(3).await;
    let booking_id = fx.reserve(hour_on_monday(12), 1, PaymentMethod::Online).await;
    let booking = fx.engine.booking(booking_id).await.unwrap();

    fx.engine
        .record_payment_result(PaymentResultCmd::failed(
            booking_id,
            "pay-1",
            booking.amount,
            booking.currency,
        ))
        .await
        .unwrap();

    let after = fx.engine.booking(booking_id).await.unwrap();
    assert_eq!(after.status, BookingStatus::WaitingPartner);
    assert_eq!(after.payment_status, PaymentStatus::Failed);

    // The customer can still walk away.
    fx.engine
        .cancel_booking(booking_id, Actor::Owner(CUSTOMER))
        .await
        .unwrap();
}
