use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, Statement, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, OpKind, PaymentStatus, Percent, ResultEngine, WalletOp, WalletOwner,
    bookings, partners, platform_settings, source, staff, wallet_ops,
};

use super::{Engine, with_tx};

impl Engine {
    /// Appends a credit to an owner's ledger.
    pub async fn credit(
        &self,
        owner: WalletOwner,
        booking_id: Option<Uuid>,
        amount: MoneyCents,
        source: &str,
    ) -> ResultEngine<WalletOp> {
        let mut op = WalletOp::new(owner, OpKind::Credit, amount, source, self.now())?;
        op.booking_id = booking_id;
        with_tx!(self, |db_tx| {
            self.require_owner(&db_tx, owner).await?;
            wallet_ops::ActiveModel::from(&op).insert(&db_tx).await?;
            Ok(op)
        })
    }

    /// Appends a debit. The balance may not go below zero.
    pub async fn debit(
        &self,
        owner: WalletOwner,
        amount: MoneyCents,
        source: &str,
    ) -> ResultEngine<WalletOp> {
        let op = WalletOp::new(owner, OpKind::Debit, amount, source, self.now())?;
        with_tx!(self, |db_tx| {
            self.require_owner(&db_tx, owner).await?;
            let balance = self.balance_in(&db_tx, owner).await?;
            if balance < amount {
                return Err(EngineError::InsufficientBalance(format!(
                    "balance {balance}, requested {amount}"
                )));
            }
            wallet_ops::ActiveModel::from(&op).insert(&db_tx).await?;
            Ok(op)
        })
    }

    /// Sum of credits minus sum of debits.
    pub async fn balance(&self, owner: WalletOwner) -> ResultEngine<MoneyCents> {
        self.require_owner(&self.database, owner).await?;
        self.balance_in(&self.database, owner).await
    }

    /// Ledger entries of an owner, oldest first.
    pub async fn wallet_ops(&self, owner: WalletOwner) -> ResultEngine<Vec<WalletOp>> {
        wallet_ops::Entity::find()
            .filter(wallet_ops::Column::OwnerKind.eq(owner.kind().as_str()))
            .filter(wallet_ops::Column::OwnerId.eq(owner.id().to_string()))
            .order_by_asc(wallet_ops::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(WalletOp::try_from)
            .collect()
    }

    /// Credits the partner's share of a paid booking.
    ///
    /// Returns `None` when the booking is unpaid or was already credited; any
    /// number of calls produce at most one entry.
    pub async fn credit_for_booking(&self, booking_id: Uuid) -> ResultEngine<Option<WalletOp>> {
        with_tx!(self, |db_tx| self.credit_partner_in(&db_tx, booking_id).await)
    }

    /// Credits the staff reward of a paid booking handled by staff.
    pub async fn credit_staff_for_booking(
        &self,
        booking_id: Uuid,
    ) -> ResultEngine<Option<WalletOp>> {
        with_tx!(self, |db_tx| self.credit_staff_in(&db_tx, booking_id).await)
    }

    /// Commission retained by the platform on a partner's bookings.
    pub async fn effective_commission(&self, partner_id: Uuid) -> ResultEngine<Percent> {
        self.effective_commission_in(&self.database, partner_id).await
    }

    /// Sets or clears the partner override.
    pub async fn set_partner_commission(
        &self,
        partner_id: Uuid,
        commission: Option<Percent>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_partner(&db_tx, partner_id).await?;
            partners::ActiveModel {
                id: ActiveValue::Set(partner_id.to_string()),
                commission_bps: ActiveValue::Set(commission.map(i32::from)),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Stores the platform-wide commission. `None` falls back to the configured default.
    pub async fn set_platform_commission(&self, commission: Option<Percent>) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            platform_settings::Entity::delete_by_id(platform_settings::PLATFORM_COMMISSION_BPS)
                .exec(&db_tx)
                .await?;
            if let Some(commission) = commission {
                platform_settings::ActiveModel {
                    key: ActiveValue::Set(platform_settings::PLATFORM_COMMISSION_BPS.to_string()),
                    value: ActiveValue::Set(commission.bps().to_string()),
                }
                .insert(&db_tx)
                .await?;
            }
            Ok(())
        })
    }

    pub async fn set_staff_commission(
        &self,
        staff_id: Uuid,
        commission: Percent,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_staff(&db_tx, staff_id).await?;
            staff::ActiveModel {
                id: ActiveValue::Set(staff_id.to_string()),
                commission_bps: ActiveValue::Set(i32::from(commission)),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    async fn require_owner<C: ConnectionTrait>(
        &self,
        db: &C,
        owner: WalletOwner,
    ) -> ResultEngine<()> {
        match owner {
            WalletOwner::Partner { partner_id } => {
                self.require_partner(db, partner_id).await?;
            }
            WalletOwner::Staff { staff_id } => {
                self.require_staff(db, staff_id).await?;
            }
        }
        Ok(())
    }

    pub(super) async fn balance_in<C: ConnectionTrait>(
        &self,
        db: &C,
        owner: WalletOwner,
    ) -> ResultEngine<MoneyCents> {
        let row = db
            .query_one(Statement::from_sql_and_values(
                db.get_database_backend(),
                "SELECT COALESCE(SUM(CASE WHEN kind = 'credit' THEN amount_minor \
                 ELSE -amount_minor END), 0) AS balance \
                 FROM wallet_ops WHERE owner_kind = ? AND owner_id = ?",
                vec![
                    owner.kind().as_str().into(),
                    owner.id().to_string().into(),
                ],
            ))
            .await?;
        Ok(MoneyCents::new(match row {
            Some(row) => row.try_get::<i64>("", "balance")?,
            None => 0,
        }))
    }

    async fn effective_commission_in<C: ConnectionTrait>(
        &self,
        db: &C,
        partner_id: Uuid,
    ) -> ResultEngine<Percent> {
        let partner = self.require_partner(db, partner_id).await?;
        if let Some(bps) = partner.commission_bps {
            return Percent::try_from(bps);
        }
        let stored = platform_settings::Entity::find_by_id(platform_settings::PLATFORM_COMMISSION_BPS)
            .one(db)
            .await?;
        match stored {
            Some(row) => {
                let bps = row.value.parse::<u32>().map_err(|_| {
                    EngineError::InvalidAmount(format!(
                        "invalid stored platform commission: {}",
                        row.value
                    ))
                })?;
                Percent::from_bps(bps)
            }
            None => Ok(self.settings.platform_commission),
        }
    }

    /// Claims a booking's credit flag. `true` means this caller must write the entry.
    async fn claim_credit<C: ConnectionTrait>(
        &self,
        db: &C,
        booking_id: Uuid,
        flag: bookings::Column,
    ) -> ResultEngine<bool> {
        let result = bookings::Entity::update_many()
            .col_expr(flag, Expr::value(true))
            .filter(bookings::Column::Id.eq(booking_id.to_string()))
            .filter(bookings::Column::PaymentStatus.eq(PaymentStatus::Paid.as_str()))
            .filter(flag.eq(false))
            .exec(db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    pub(super) async fn credit_partner_in<C: ConnectionTrait>(
        &self,
        db: &C,
        booking_id: Uuid,
    ) -> ResultEngine<Option<WalletOp>> {
        let booking = self.require_booking(db, booking_id).await?;
        if !self
            .claim_credit(db, booking_id, bookings::Column::PartnerCredited)
            .await?
        {
            return Ok(None);
        }

        let unit = self.require_unit(db, booking.unit).await?;
        let commission = self.effective_commission_in(db, unit.partner_id).await?;
        let share = commission.complement_of(booking.amount)?;
        if !share.is_positive() {
            return Ok(None);
        }

        let op = WalletOp::new(
            WalletOwner::partner(unit.partner_id),
            OpKind::Credit,
            share,
            source::BOOKING_COMPLETED,
            self.now(),
        )?
        .for_booking(booking_id);
        wallet_ops::ActiveModel::from(&op).insert(db).await?;
        tracing::info!(
            %booking_id,
            partner_id = %unit.partner_id,
            amount = %share,
            %commission,
            "partner credited"
        );
        Ok(Some(op))
    }

    pub(super) async fn credit_staff_in<C: ConnectionTrait>(
        &self,
        db: &C,
        booking_id: Uuid,
    ) -> ResultEngine<Option<WalletOp>> {
        let booking = self.require_booking(db, booking_id).await?;
        let Some(staff_id) = booking.staff_id else {
            return Ok(None);
        };
        if !self
            .claim_credit(db, booking_id, bookings::Column::StaffCredited)
            .await?
        {
            return Ok(None);
        }

        let member = crate::StaffMember::try_from(self.require_staff(db, staff_id).await?)?;
        let reward = member.commission.share_of(booking.amount)?;
        if !reward.is_positive() {
            return Ok(None);
        }

        let op = WalletOp::new(
            WalletOwner::staff(staff_id),
            OpKind::Credit,
            reward,
            source::STAFF_COMMISSION,
            self.now(),
        )?
        .for_booking(booking_id);
        wallet_ops::ActiveModel::from(&op).insert(db).await?;
        tracing::info!(%booking_id, %staff_id, amount = %reward, "staff credited");
        Ok(Some(op))
    }
}
