mod common;

use std::sync::Arc;

use engine::{
    Actor, BookingStatus, EngineError, MoneyCents, OpKind, PaymentMethod, PaymentResultCmd,
    Percent, WalletOwner, source,
};

use common::{fixture, hour_on_monday};

#[tokio::test]
async fn completion_credits_partner_share() {
    let fx = fixture(3).await;
    let booking_id = fx.active_paid_booking(hour_on_monday(12)).await;

    fx.engine
        .complete_booking(booking_id, Actor::Partner(fx.partner_id))
        .await
        .unwrap();

    let owner = WalletOwner::partner(fx.partner_id);
    assert_eq!(fx.engine.balance(owner).await.unwrap(), MoneyCents::new(900_00));

    let ops = fx.engine.wallet_ops(owner).await.unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].kind, OpKind::Credit);
    assert_eq!(ops[0].booking_id, Some(booking_id));
    assert_eq!(ops[0].source, source::BOOKING_COMPLETED);
    assert_eq!(ops[0].amount.to_string(), "900.00₽");
}

#[tokio::test]
async fn crediting_is_idempotent() {
    let fx = fixture(3).await;
    let booking_id = fx.active_paid_booking(hour_on_monday(12)).await;

    let first = fx.engine.credit_for_booking(booking_id).await.unwrap();
    assert!(first.is_some());
    for _ in 0..3 {
        assert_eq!(fx.engine.credit_for_booking(booking_id).await.unwrap(), None);
    }
    let completion = fx
        .engine
        .complete_booking(booking_id, Actor::System)
        .await
        .unwrap();
    assert_eq!(completion.partner_credit, None);

    let owner = WalletOwner::partner(fx.partner_id);
    assert_eq!(fx.engine.wallet_ops(owner).await.unwrap().len(), 1);
    assert_eq!(fx.engine.balance(owner).await.unwrap(), MoneyCents::new(900_00));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_payment_completion_and_credit_pay_out_once() {
    const BOOKINGS: usize = 5;

    // Roomy enough that occupancy never lifts the price.
    let fx = fixture(10).await;
    let mut booking_ids = Vec::with_capacity(BOOKINGS);
    for _ in 0..BOOKINGS {
        let booking_id = fx.reserve(hour_on_monday(12), 1, PaymentMethod::Online).await;
        fx.engine
            .confirm_booking(booking_id, Actor::Partner(fx.partner_id))
            .await
            .unwrap();
        booking_ids.push(booking_id);
    }

    let engine = Arc::new(fx.engine);
    let mut tasks = tokio::task::JoinSet::new();
    for (n, &booking_id) in booking_ids.iter().enumerate() {
        let booking = engine.booking(booking_id).await.unwrap();
        let (amount, currency) = (booking.amount, booking.currency);

        let e = Arc::clone(&engine);
        tasks.spawn(async move {
            e.record_payment_result(PaymentResultCmd::succeeded(
                booking_id,
                format!("pay-{n}"),
                amount,
                currency,
            ))
            .await
        });
        let e = Arc::clone(&engine);
        tasks.spawn(async move { e.complete_booking(booking_id, Actor::System).await.map(|_| ()) });
        let e = Arc::clone(&engine);
        tasks.spawn(async move { e.credit_for_booking(booking_id).await.map(|_| ()) });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    let owner = WalletOwner::partner(fx.partner_id);
    let ops = engine.wallet_ops(owner).await.unwrap();
    assert_eq!(ops.len(), BOOKINGS);
    for booking_id in &booking_ids {
        assert_eq!(
            ops.iter()
                .filter(|op| op.booking_id == Some(*booking_id))
                .count(),
            1
        );
        let booking = engine.booking(*booking_id).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
        assert!(booking.partner_credited);
    }
    assert_eq!(
        engine.balance(owner).await.unwrap(),
        MoneyCents::new(900_00 * BOOKINGS as i64)
    );
}

#[tokio::test]
async fn unpaid_bookings_are_not_credited() {
    let fx = fixture(3).await;
    let booking_id = fx.reserve(hour_on_monday(12), 1, PaymentMethod::Online).await;

    assert_eq!(fx.engine.credit_for_booking(booking_id).await.unwrap(), None);
    let booking = fx.engine.booking(booking_id).await.unwrap();
    assert!(!booking.partner_credited);
}

#[tokio::test]
async fn commission_resolution_order() {
    let fx = fixture(5).await;
    let ten = Percent::whole(10).unwrap();
    let twenty = Percent::whole(20).unwrap();
    let fifteen = Percent::whole(15).unwrap();

    assert_eq!(fx.engine.effective_commission(fx.partner_id).await.unwrap(), ten);

    fx.engine.set_platform_commission(Some(twenty)).await.unwrap();
    assert_eq!(
        fx.engine.effective_commission(fx.partner_id).await.unwrap(),
        twenty
    );

    fx.engine
        .set_partner_commission(fx.partner_id, Some(fifteen))
        .await
        .unwrap();
    assert_eq!(
        fx.engine.effective_commission(fx.partner_id).await.unwrap(),
        fifteen
    );

    let booking_id = fx.active_paid_booking(hour_on_monday(12)).await;
    let op = fx.engine.credit_for_booking(booking_id).await.unwrap().unwrap();
    assert_eq!(op.amount, MoneyCents::new(850_00));

    fx.engine
        .set_partner_commission(fx.partner_id, None)
        .await
        .unwrap();
    fx.engine.set_platform_commission(None).await.unwrap();
    assert_eq!(fx.engine.effective_commission(fx.partner_id).await.unwrap(), ten);
}

#[tokio::test]
async fn staff_reward_is_separate_from_partner_share() {
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

    let completion = fx
        .engine
        .complete_booking(booking_id, Actor::Staff(staff_id))
        .await
        .unwrap();
    let staff_op = completion.staff_credit.unwrap();
    assert_eq!(staff_op.amount, MoneyCents::new(300_00));
    assert_eq!(staff_op.source, source::STAFF_COMMISSION);
    assert_eq!(
        completion.partner_credit.unwrap().amount,
        MoneyCents::new(900_00)
    );

    assert_eq!(
        fx.engine
            .credit_staff_for_booking(booking_id)
            .await
            .unwrap(),
        None
    );
    assert_eq!(
        fx.engine.balance(WalletOwner::staff(staff_id)).await.unwrap(),
        MoneyCents::new(300_00)
    );
}

#[tokio::test]
async fn staff_commission_can_be_changed() {
    let fx = fixture(3).await;
    let staff_id = fx
        .engine
        .new_staff(fx.partner_id, "Olga", Some(Percent::whole(5).unwrap()))
        .await
        .unwrap();
    fx.engine
        .set_staff_commission(staff_id, Percent::whole(50).unwrap())
        .await
        .unwrap();
    let member = fx.engine.staff_member(staff_id).await.unwrap();
    assert_eq!(member.commission, Percent::whole(50).unwrap());
}

#[tokio::test]
async fn manual_entries_and_overdraft_guard() {
    let fx = fixture(3).await;
    let owner = WalletOwner::partner(fx.partner_id);

    fx.engine
        .credit(owner, None, MoneyCents::new(100_00), source::MANUAL)
        .await
        .unwrap();
    fx.engine
        .debit(owner, MoneyCents::new(40_00), source::MANUAL)
        .await
        .unwrap();
    assert_eq!(fx.engine.balance(owner).await.unwrap(), MoneyCents::new(60_00));

    let err = fx
        .engine
        .debit(owner, MoneyCents::new(60_01), source::MANUAL)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance(_)));

    let err = fx
        .engine
        .credit(owner, None, MoneyCents::ZERO, source::MANUAL)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = fx
        .engine
        .balance(WalletOwner::partner(uuid::Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
