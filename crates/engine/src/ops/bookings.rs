use chrono::NaiveDateTime;
use sea_orm::{
    Condition, ConnectionTrait, QueryFilter, QueryOrder, Select, TransactionTrait, UpdateMany,
    prelude::*, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Actor, Booking, BookingAction, BookingStatus, EngineError, PaymentResultCmd, PaymentStatus,
    ResultEngine, WalletOp, bookings, coupons,
    payments::{self, PaymentOutcome, PaymentRecord},
    state::transition,
};

use super::{Engine, with_tx};

/// Ledger entries produced by completing a booking.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub partner_credit: Option<WalletOp>,
    pub staff_credit: Option<WalletOp>,
}

impl Engine {
    pub async fn booking(&self, booking_id: Uuid) -> ResultEngine<Booking> {
        self.require_booking(&self.database, booking_id).await
    }

    /// Bookings made by a customer, newest first.
    pub async fn bookings_for_user(&self, user_id: i64) -> ResultEngine<Vec<Booking>> {
        bookings::Entity::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .order_by_desc(bookings::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Booking::try_from)
            .collect()
    }

    /// Moves a waiting booking to `active`.
    ///
    /// For card-transfer and cash bookings the confirmation also records the
    /// money as received.
    pub async fn confirm_booking(&self, booking_id: Uuid, actor: Actor) -> ResultEngine<()> {
        let now = self.now();
        with_tx!(self, |db_tx| {
            let booking = self.require_booking(&db_tx, booking_id).await?;
            self.authorize(&db_tx, &booking, &actor).await?;
            let next = transition(
                booking.status,
                booking.payment_status,
                BookingAction::Confirm,
                &actor,
            )?;

            let mut update = bookings::Entity::update_many()
                .col_expr(bookings::Column::Status, Expr::value(next.as_str()))
                .col_expr(bookings::Column::StartedAt, Expr::value(now));
            if let Actor::Staff(staff_id) = actor
                && booking.staff_id.is_none()
            {
                update = update.col_expr(
                    bookings::Column::StaffId,
                    Expr::value(Some(staff_id.to_string())),
                );
            }
            self.swap_status(&db_tx, update, &booking).await?;

            if booking.payment_method.confirmation_collects_payment() {
                self.mark_paid(&db_tx, &booking).await?;
            }
            tracing::info!(%booking_id, ?actor, "booking confirmed");
            Ok(())
        })
    }

    /// Cancels a waiting booking that has not been paid.
    pub async fn cancel_booking(&self, booking_id: Uuid, actor: Actor) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let booking = self.require_booking(&db_tx, booking_id).await?;
            self.authorize(&db_tx, &booking, &actor).await?;
            let next = transition(
                booking.status,
                booking.payment_status,
                BookingAction::Cancel,
                &actor,
            )?;

            // The payment guard is repeated in SQL so a racing payment wins.
            let update = bookings::Entity::update_many()
                .col_expr(bookings::Column::Status, Expr::value(next.as_str()))
                .filter(bookings::Column::PaymentStatus.ne(PaymentStatus::Paid.as_str()));
            self.swap_status(&db_tx, update, &booking).await?;
            tracing::info!(%booking_id, ?actor, "booking canceled");
            Ok(())
        })
    }

    /// Completes an active booking and credits the partner and staff ledgers.
    ///
    /// Crediting is a no-op unless the booking is paid, and never happens twice.
    pub async fn complete_booking(
        &self,
        booking_id: Uuid,
        actor: Actor,
    ) -> ResultEngine<Completion> {
        let now = self.now();
        with_tx!(self, |db_tx| {
            let booking = self.require_booking(&db_tx, booking_id).await?;
            self.authorize(&db_tx, &booking, &actor).await?;
            let next = transition(
                booking.status,
                booking.payment_status,
                BookingAction::Complete,
                &actor,
            )?;

            let mut update = bookings::Entity::update_many()
                .col_expr(bookings::Column::Status, Expr::value(next.as_str()))
                .col_expr(bookings::Column::EndedAt, Expr::value(now));
            if let Actor::Staff(staff_id) = actor
                && booking.staff_id.is_none()
            {
                update = update.col_expr(
                    bookings::Column::StaffId,
                    Expr::value(Some(staff_id.to_string())),
                );
            }
            self.swap_status(&db_tx, update, &booking).await?;

            let completion = Completion {
                partner_credit: self.credit_partner_in(&db_tx, booking_id).await?,
                staff_credit: self.credit_staff_in(&db_tx, booking_id).await?,
            };
            tracing::info!(
                %booking_id,
                ?actor,
                partner_credited = completion.partner_credit.is_some(),
                staff_credited = completion.staff_credit.is_some(),
                "booking completed"
            );
            Ok(completion)
        })
    }

    /// Applies a payment provider notification.
    ///
    /// Amount and currency must match the booking exactly; anything else is
    /// rejected with `AmountMismatch` and logged. Success marks the booking
    /// paid (once), activates a waiting booking and, for online payments,
    /// credits the partner right away. Failure only flags the payment.
    pub async fn record_payment_result(&self, cmd: PaymentResultCmd) -> ResultEngine<()> {
        let now = self.now();
        with_tx!(self, |db_tx| {
            let booking = self.require_booking(&db_tx, cmd.booking_id).await?;
            if cmd.currency != booking.currency || cmd.amount != booking.amount {
                tracing::warn!(
                    booking_id = %booking.id,
                    provider_ref = %cmd.provider_ref,
                    expected_amount = %booking.amount,
                    expected_currency = %booking.currency,
                    got_amount = %cmd.amount,
                    got_currency = %cmd.currency,
                    "payment notification does not match booking; possible spoofing"
                );
                return Err(EngineError::AmountMismatch(format!(
                    "booking {} expects {} {}",
                    booking.id, booking.amount, booking.currency
                )));
            }

            let record = PaymentRecord {
                id: Uuid::new_v4(),
                booking_id: booking.id,
                provider_ref: cmd.provider_ref.clone(),
                amount: cmd.amount,
                currency: cmd.currency,
                outcome: if cmd.succeeded {
                    PaymentOutcome::Succeeded
                } else {
                    PaymentOutcome::Failed
                },
                created_at: now,
            };
            payments::ActiveModel::from(&record).insert(&db_tx).await?;

            if !cmd.succeeded {
                bookings::Entity::update_many()
                    .col_expr(
                        bookings::Column::PaymentStatus,
                        Expr::value(PaymentStatus::Failed.as_str()),
                    )
                    .filter(bookings::Column::Id.eq(booking.id.to_string()))
                    .exec(&db_tx)
                    .await?;
                tracing::info!(booking_id = %booking.id, "payment failed");
                return Ok(());
            }

            let newly_paid = self.mark_paid(&db_tx, &booking).await?;
            if booking.status.is_waiting() {
                let update = bookings::Entity::update_many()
                    .col_expr(
                        bookings::Column::Status,
                        Expr::value(BookingStatus::Active.as_str()),
                    )
                    .col_expr(bookings::Column::StartedAt, Expr::value(now));
                self.swap_status(&db_tx, update, &booking).await?;
            } else if booking.status.is_terminal() {
                tracing::warn!(
                    booking_id = %booking.id,
                    status = booking.status.as_str(),
                    "payment received for a closed booking"
                );
            }
            if booking.payment_method.credits_on_payment() {
                self.credit_partner_in(&db_tx, booking.id).await?;
            }
            tracing::info!(booking_id = %booking.id, newly_paid, "payment succeeded");
            Ok(())
        })
    }

    /// Active bookings whose window ended at or before `now`.
    pub(crate) async fn overdue_active_bookings(
        &self,
        now: NaiveDateTime,
    ) -> ResultEngine<Vec<Uuid>> {
        self.booking_ids(
            bookings::Entity::find()
                .filter(bookings::Column::Status.eq(BookingStatus::Active.as_str()))
                .filter(bookings::Column::WindowEnd.lte(now)),
        )
        .await
    }

    /// Waiting, unpaid bookings whose payment deadline passed.
    pub(crate) async fn expired_unpaid_bookings(
        &self,
        now: NaiveDateTime,
    ) -> ResultEngine<Vec<Uuid>> {
        let waiting: Vec<&str> = BookingStatus::WAITING.iter().map(|s| s.as_str()).collect();
        self.booking_ids(
            bookings::Entity::find()
                .filter(bookings::Column::Status.is_in(waiting))
                .filter(bookings::Column::PaymentStatus.ne(PaymentStatus::Paid.as_str()))
                .filter(bookings::Column::PaymentDeadline.is_not_null())
                .filter(bookings::Column::PaymentDeadline.lt(now)),
        )
        .await
    }

    /// Completed, paid bookings with a ledger credit still owed.
    pub(crate) async fn uncredited_completed_bookings(&self) -> ResultEngine<Vec<Uuid>> {
        self.booking_ids(
            bookings::Entity::find()
                .filter(bookings::Column::Status.eq(BookingStatus::Completed.as_str()))
                .filter(bookings::Column::PaymentStatus.eq(PaymentStatus::Paid.as_str()))
                .filter(
                    Condition::any()
                        .add(bookings::Column::PartnerCredited.eq(false))
                        .add(
                            Condition::all()
                                .add(bookings::Column::StaffId.is_not_null())
                                .add(bookings::Column::StaffCredited.eq(false)),
                        ),
                ),
        )
        .await
    }

    async fn booking_ids(&self, query: Select<bookings::Entity>) -> ResultEngine<Vec<Uuid>> {
        query
            .order_by_asc(bookings::Column::WindowEnd)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| crate::util::parse_uuid(&model.id, "booking"))
            .collect()
    }

    /// Applies `update` only if the booking still has the status it was read with.
    async fn swap_status<C: ConnectionTrait>(
        &self,
        db: &C,
        update: UpdateMany<bookings::Entity>,
        booking: &Booking,
    ) -> ResultEngine<()> {
        let result = update
            .filter(bookings::Column::Id.eq(booking.id.to_string()))
            .filter(bookings::Column::Status.eq(booking.status.as_str()))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::IllegalTransition(format!(
                "booking {} changed concurrently",
                booking.id
            )));
        }
        Ok(())
    }

    /// Flips `payment_status` to paid. Returns `false` when it already was.
    ///
    /// The coupon use is counted only on the flip.
    async fn mark_paid<C: ConnectionTrait>(&self, db: &C, booking: &Booking) -> ResultEngine<bool> {
        let result = bookings::Entity::update_many()
            .col_expr(
                bookings::Column::PaymentStatus,
                Expr::value(PaymentStatus::Paid.as_str()),
            )
            .filter(bookings::Column::Id.eq(booking.id.to_string()))
            .filter(bookings::Column::PaymentStatus.ne(PaymentStatus::Paid.as_str()))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Ok(false);
        }

        if let Some(code) = &booking.coupon_code {
            coupons::Entity::update_many()
                .col_expr(
                    coupons::Column::Used,
                    Expr::col(coupons::Column::Used).add(1),
                )
                .filter(coupons::Column::Code.eq(code.as_str()))
                .exec(db)
                .await?;
        }
        Ok(true)
    }
}
