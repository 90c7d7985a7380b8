use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Coupon, Discount, EngineError, NewCouponCmd, Quote, QuoteCmd, ResultEngine, Unit, coupons,
    pricing::window_amount,
};

use super::{Engine, with_tx};

fn normalize_code(code: &str) -> Option<String> {
    let trimmed = code.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Engine {
    /// Prices a window, applying the coupon when it is currently valid.
    ///
    /// Invalid coupons are ignored rather than rejected; `Quote::coupon` tells
    /// whether one was applied.
    pub async fn quote(&self, cmd: &QuoteCmd) -> ResultEngine<Quote> {
        let (_, quote) = self.quote_with(&self.database, cmd).await?;
        Ok(quote)
    }

    pub(super) fn validate_quote_cmd(&self, cmd: &QuoteCmd) -> ResultEngine<()> {
        if cmd.quantity <= 0 {
            return Err(EngineError::InvalidQuantity(format!(
                "quantity must be > 0, got {}",
                cmd.quantity
            )));
        }
        if cmd.window.kind() != cmd.unit.kind() {
            return Err(EngineError::InvalidAmount(format!(
                "{} window cannot be booked on a {} unit",
                cmd.window.kind().as_str(),
                cmd.unit.kind().as_str()
            )));
        }
        cmd.window.bounds()?;
        cmd.window
            .ensure_within_hours(self.settings.work_hours_start, self.settings.work_hours_end)
    }

    pub(super) async fn quote_with<C: ConnectionTrait>(
        &self,
        db: &C,
        cmd: &QuoteCmd,
    ) -> ResultEngine<(Unit, Quote)> {
        self.validate_quote_cmd(cmd)?;
        let unit = self.require_active_unit(db, cmd.unit).await?;
        let (start, end) = cmd.window.bounds()?;
        let used = self.overlap_sum(db, cmd.unit, start, end).await?;
        let base_amount = window_amount(unit.price, &cmd.window, used, unit.capacity, cmd.quantity)?;

        let mut quote = Quote {
            base_amount,
            amount: base_amount,
            coupon: None,
        };
        if let Some(code) = cmd.coupon.as_deref().and_then(normalize_code)
            && let Some(coupon) = self.find_coupon(db, &code).await?
            && coupon.is_applicable(self.local_now().date())
        {
            quote.amount = coupon.discount.apply(base_amount)?;
            quote.coupon = Some(coupon.code);
        }
        Ok((unit, quote))
    }

    async fn find_coupon<C: ConnectionTrait>(
        &self,
        db: &C,
        code: &str,
    ) -> ResultEngine<Option<Coupon>> {
        coupons::Entity::find()
            .filter(coupons::Column::Code.eq(code))
            .one(db)
            .await?
            .map(Coupon::try_from)
            .transpose()
    }

    pub async fn new_coupon(&self, cmd: NewCouponCmd) -> ResultEngine<Uuid> {
        let code = normalize_code(&cmd.code)
            .ok_or_else(|| EngineError::InvalidAmount("coupon code must not be empty".to_string()))?;
        if let Discount::Fixed(amount) = cmd.discount
            && !amount.is_positive()
        {
            return Err(EngineError::InvalidAmount(
                "fixed discount must be > 0".to_string(),
            ));
        }
        if let (Some(from), Some(to)) = (cmd.valid_from, cmd.valid_to)
            && from > to
        {
            return Err(EngineError::InvalidAmount(
                "coupon validity ends before it starts".to_string(),
            ));
        }

        let coupon = Coupon {
            id: Uuid::new_v4(),
            code,
            discount: cmd.discount,
            max_uses: cmd.max_uses.filter(|cap| *cap > 0),
            used: 0,
            valid_from: cmd.valid_from,
            valid_to: cmd.valid_to,
            active: true,
            created_at: self.now(),
        };
        with_tx!(self, |db_tx| {
            if self.find_coupon(&db_tx, &coupon.code).await?.is_some() {
                return Err(EngineError::ExistingKey(coupon.code));
            }
            coupons::ActiveModel::from(&coupon).insert(&db_tx).await?;
            Ok(coupon.id)
        })
    }

    pub async fn coupon(&self, code: &str) -> ResultEngine<Coupon> {
        self.find_coupon(&self.database, code.trim())
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("coupon {code}")))
    }

    pub async fn set_coupon_active(&self, code: &str, active: bool) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let coupon = self
                .find_coupon(&db_tx, code.trim())
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("coupon {code}")))?;
            coupons::ActiveModel {
                id: ActiveValue::Set(coupon.id.to_string()),
                active: ActiveValue::Set(active),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }
}
