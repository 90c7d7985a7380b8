use sea_orm::{
    ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, OpKind, ResultEngine, WalletOp, WalletOwner, WithdrawFilter,
    WithdrawRequest, WithdrawStatus, source, wallet_ops, withdrawals,
};

use super::{Engine, with_tx};

impl Engine {
    /// Files a payout request for a partner.
    ///
    /// Checked in order: a pending request younger than the cooldown
    /// (`RateLimited`), a balance under the payout threshold (`BelowMinimum`)
    /// and an amount above the balance (`InsufficientBalance`). Nothing is
    /// debited until approval.
    pub async fn request_withdrawal(
        &self,
        partner_id: Uuid,
        amount: MoneyCents,
    ) -> ResultEngine<Uuid> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "withdrawal amount must be > 0".to_string(),
            ));
        }
        let now = self.now();
        let cutoff = now - self.settings.withdrawal_cooldown;
        with_tx!(self, |db_tx| {
            self.require_partner(&db_tx, partner_id).await?;

            let recent = withdrawals::Entity::find()
                .filter(withdrawals::Column::PartnerId.eq(partner_id.to_string()))
                .filter(withdrawals::Column::Status.eq(WithdrawStatus::Pending.as_str()))
                .filter(withdrawals::Column::CreatedAt.gt(cutoff))
                .one(&db_tx)
                .await?;
            if recent.is_some() {
                return Err(EngineError::RateLimited(
                    "a withdrawal request is already pending".to_string(),
                ));
            }

            let balance = self
                .balance_in(&db_tx, WalletOwner::partner(partner_id))
                .await?;
            if balance < self.settings.min_withdrawal {
                return Err(EngineError::BelowMinimum(format!(
                    "payouts start at {}, balance {balance}",
                    self.settings.min_withdrawal
                )));
            }
            if balance < amount {
                return Err(EngineError::InsufficientBalance(format!(
                    "balance {balance}, requested {amount}"
                )));
            }

            let request = WithdrawRequest::new(partner_id, amount, now);
            withdrawals::ActiveModel::from(&request)
                .insert(&db_tx)
                .await?;
            tracing::info!(
                request_id = %request.id,
                %partner_id,
                %amount,
                "withdrawal requested"
            );
            Ok(request.id)
        })
    }

    /// Approves a pending request and debits the partner ledger.
    pub async fn approve_withdrawal(&self, request_id: Uuid) -> ResultEngine<WalletOp> {
        let now = self.now();
        with_tx!(self, |db_tx| {
            let request = self.require_withdrawal(&db_tx, request_id).await?;
            let owner = WalletOwner::partner(request.partner_id);
            let balance = self.balance_in(&db_tx, owner).await?;
            if request.status == WithdrawStatus::Pending && balance < request.amount {
                return Err(EngineError::InsufficientBalance(format!(
                    "balance {balance}, requested {}",
                    request.amount
                )));
            }
            self.resolve_withdrawal(&db_tx, &request, WithdrawStatus::Approved, now)
                .await?;

            let op = WalletOp::new(owner, OpKind::Debit, request.amount, source::WITHDRAW, now)?;
            wallet_ops::ActiveModel::from(&op).insert(&db_tx).await?;
            tracing::info!(
                %request_id,
                partner_id = %request.partner_id,
                amount = %request.amount,
                "withdrawal approved"
            );
            Ok(op)
        })
    }

    /// Rejects a pending request. The ledger is untouched.
    pub async fn reject_withdrawal(&self, request_id: Uuid) -> ResultEngine<()> {
        let now = self.now();
        with_tx!(self, |db_tx| {
            let request = self.require_withdrawal(&db_tx, request_id).await?;
            self.resolve_withdrawal(&db_tx, &request, WithdrawStatus::Rejected, now)
                .await?;
            tracing::info!(%request_id, partner_id = %request.partner_id, "withdrawal rejected");
            Ok(())
        })
    }

    pub async fn withdrawal(&self, request_id: Uuid) -> ResultEngine<WithdrawRequest> {
        self.require_withdrawal(&self.database, request_id).await
    }

    /// Requests matching `filter`, newest first.
    pub async fn withdrawals(&self, filter: &WithdrawFilter) -> ResultEngine<Vec<WithdrawRequest>> {
        let mut query = withdrawals::Entity::find();
        if let Some(partner_id) = filter.partner_id {
            query = query.filter(withdrawals::Column::PartnerId.eq(partner_id.to_string()));
        }
        if let Some(status) = filter.status {
            query = query.filter(withdrawals::Column::Status.eq(status.as_str()));
        }
        query
            .order_by_desc(withdrawals::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(WithdrawRequest::try_from)
            .collect()
    }

    async fn require_withdrawal<C: ConnectionTrait>(
        &self,
        db: &C,
        request_id: Uuid,
    ) -> ResultEngine<WithdrawRequest> {
        let model = withdrawals::Entity::find_by_id(request_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("withdraw request not exists".to_string()))?;
        WithdrawRequest::try_from(model)
    }

    /// Moves a request out of `pending`, failing if it already left it.
    async fn resolve_withdrawal<C: ConnectionTrait>(
        &self,
        db: &C,
        request: &WithdrawRequest,
        status: WithdrawStatus,
        now: DateTimeUtc,
    ) -> ResultEngine<()> {
        let result = withdrawals::Entity::update_many()
            .col_expr(withdrawals::Column::Status, Expr::value(status.as_str()))
            .col_expr(withdrawals::Column::ResolvedAt, Expr::value(Some(now)))
            .filter(withdrawals::Column::Id.eq(request.id.to_string()))
            .filter(withdrawals::Column::Status.eq(WithdrawStatus::Pending.as_str()))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::IllegalTransition(format!(
                "withdraw request {} is {}",
                request.id,
                request.status.as_str()
            )));
        }
        Ok(())
    }
}
