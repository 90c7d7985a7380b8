mod common;

use chrono::Duration;
use engine::{
    EngineError, MoneyCents, OpKind, WalletOwner, WithdrawFilter, WithdrawStatus, source,
};

use common::{Fixture, fixture};

async fn funded(balance: MoneyCents) -> Fixture {
    let fx = fixture(1).await;
    fx.engine
        .credit(
            WalletOwner::partner(fx.partner_id),
            None,
            balance,
            source::MANUAL,
        )
        .await
        .unwrap();
    fx
}

#[tokio::test]
async fn approval_debits_the_partner() {
    let fx = funded(MoneyCents::new(1200_00)).await;
    let owner = WalletOwner::partner(fx.partner_id);

    let request_id = fx
        .engine
        .request_withdrawal(fx.partner_id, MoneyCents::new(700_00))
        .await
        .unwrap();
    // Nothing moves until approval.
    assert_eq!(fx.engine.balance(owner).await.unwrap(), MoneyCents::new(1200_00));

    let op = fx.engine.approve_withdrawal(request_id).await.unwrap();
    assert_eq!(op.kind, OpKind::Debit);
    assert_eq!(op.source, source::WITHDRAW);
    assert_eq!(fx.engine.balance(owner).await.unwrap(), MoneyCents::new(500_00));

    let request = fx.engine.withdrawal(request_id).await.unwrap();
    assert_eq!(request.status, WithdrawStatus::Approved);
    assert!(request.resolved_at.is_some());

    let err = fx.engine.approve_withdrawal(request_id).await.unwrap_err();
    assert!(matches!(err, EngineError::IllegalTransition(_)));
    let err = fx.engine.reject_withdrawal(request_id).await.unwrap_err();
    assert!(matches!(err, EngineError::IllegalTransition(_)));
    assert_eq!(fx.engine.balance(owner).await.unwrap(), MoneyCents::new(500_00));
}

#[tokio::test]
async fn rejection_leaves_the_ledger_alone() {
    let fx = funded(MoneyCents::new(800_00)).await;
    let owner = WalletOwner::partner(fx.partner_id);

    let request_id = fx
        .engine
        .request_withdrawal(fx.partner_id, MoneyCents::new(800_00))
        .await
        .unwrap();
    fx.engine.reject_withdrawal(request_id).await.unwrap();

    assert_eq!(fx.engine.balance(owner).await.unwrap(), MoneyCents::new(800_00));
    assert_eq!(fx.engine.wallet_ops(owner).await.unwrap().len(), 1);
    let request = fx.engine.withdrawal(request_id).await.unwrap();
    assert_eq!(request.status, WithdrawStatus::Rejected);

    // A resolved request does not hold back the next one.
    fx.engine
        .request_withdrawal(fx.partner_id, MoneyCents::new(600_00))
        .await
        .unwrap();
}

#[tokio::test]
async fn pending_request_rate_limits_the_next() {
    let fx = funded(MoneyCents::new(600_00)).await;

    fx.engine
        .request_withdrawal(fx.partner_id, MoneyCents::new(450_00))
        .await
        .unwrap();
    let err = fx
        .engine
        .request_withdrawal(fx.partner_id, MoneyCents::new(100_00))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::RateLimited(_)));

    // Checked before the balance.
    let err = fx
        .engine
        .request_withdrawal(fx.partner_id, MoneyCents::new(10_000_00))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::RateLimited(_)));

    fx.clock.advance(Duration::hours(25));
    fx.engine
        .request_withdrawal(fx.partner_id, MoneyCents::new(100_00))
        .await
        .unwrap();
}

#[tokio::test]
async fn threshold_and_balance_are_enforced() {
    let fx = funded(MoneyCents::new(499_99)).await;
    let err = fx
        .engine
        .request_withdrawal(fx.partner_id, MoneyCents::new(100_00))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BelowMinimum(_)));

    let fx = funded(MoneyCents::new(700_00)).await;
    let err = fx
        .engine
        .request_withdrawal(fx.partner_id, MoneyCents::new(700_01))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance(_)));

    let err = fx
        .engine
        .request_withdrawal(fx.partner_id, MoneyCents::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    assert!(
        fx.engine
            .withdrawals(&WithdrawFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn listing_filters_by_partner_and_status() {
    let fx = funded(MoneyCents::new(2000_00)).await;
    let first = fx
        .engine
        .request_withdrawal(fx.partner_id, MoneyCents::new(500_00))
        .await
        .unwrap();
    fx.engine.approve_withdrawal(first).await.unwrap();
    let second = fx
        .engine
        .request_withdrawal(fx.partner_id, MoneyCents::new(600_00))
        .await
        .unwrap();

    let pending = fx
        .engine
        .withdrawals(&WithdrawFilter {
            partner_id: Some(fx.partner_id),
            status: Some(WithdrawStatus::Pending),
        })
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second);

    let other = fx.engine.new_partner("Other", None).await.unwrap();
    assert!(
        fx.engine
            .withdrawals(&WithdrawFilter {
                partner_id: Some(other),
                status: None,
            })
            .await
            .unwrap()
            .is_empty()
    );
}
