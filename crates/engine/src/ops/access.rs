use sea_orm::{ConnectionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Actor, Booking, EngineError, ResultEngine, Unit, UnitRef, boards, bookings, daily_offers,
    partners, staff,
};

use super::Engine;

/// Generates a `require_*` lookup returning the raw model or `KeyNotFound`.
macro_rules! impl_require_by_id {
    ($require_fn:ident, $entity:path, $model:path, $err_msg:literal) => {
        pub(super) async fn $require_fn<C: ConnectionTrait>(
            &self,
            db: &C,
            id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id.to_string())
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_by_id!(
        require_partner,
        partners::Entity,
        partners::Model,
        "partner not exists"
    );

    impl_require_by_id!(
        require_staff,
        staff::Entity,
        staff::Model,
        "staff not exists"
    );

    impl_require_by_id!(
        require_booking_model,
        bookings::Entity,
        bookings::Model,
        "booking not exists"
    );

    pub(super) async fn require_booking<C: ConnectionTrait>(
        &self,
        db: &C,
        booking_id: Uuid,
    ) -> ResultEngine<Booking> {
        Booking::try_from(self.require_booking_model(db, booking_id).await?)
    }

    /// Loads a unit whatever its active flag.
    pub(super) async fn require_unit<C: ConnectionTrait>(
        &self,
        db: &C,
        unit: UnitRef,
    ) -> ResultEngine<Unit> {
        match unit {
            UnitRef::Board { board_id } => {
                let model = boards::Entity::find_by_id(board_id.to_string())
                    .one(db)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound("board not exists".to_string()))?;
                Unit::try_from(model)
            }
            UnitRef::Daily { offer_id } => {
                let model = daily_offers::Entity::find_by_id(offer_id.to_string())
                    .one(db)
                    .await?
                    .ok_or_else(|| {
                        EngineError::KeyNotFound("daily offer not exists".to_string())
                    })?;
                Unit::try_from(model)
            }
        }
    }

    pub(super) async fn require_active_unit<C: ConnectionTrait>(
        &self,
        db: &C,
        unit: UnitRef,
    ) -> ResultEngine<Unit> {
        let unit = self.require_unit(db, unit).await?;
        if !unit.active {
            return Err(EngineError::KeyNotFound(format!("{} not active", unit.unit)));
        }
        Ok(unit)
    }

    /// Checks that `actor` is related to `booking`: the customer who made it,
    /// the partner owning the unit, or one of that partner's active staff.
    pub(super) async fn authorize<C: ConnectionTrait>(
        &self,
        db: &C,
        booking: &Booking,
        actor: &Actor,
    ) -> ResultEngine<()> {
        match *actor {
            Actor::Admin | Actor::System => Ok(()),
            Actor::Owner(user_id) => {
                if booking.user_id != user_id {
                    return Err(EngineError::Forbidden(
                        "booking belongs to another user".to_string(),
                    ));
                }
                Ok(())
            }
            Actor::Partner(partner_id) => {
                let unit = self.require_unit(db, booking.unit).await?;
                if unit.partner_id != partner_id {
                    return Err(EngineError::Forbidden(
                        "unit belongs to another partner".to_string(),
                    ));
                }
                Ok(())
            }
            Actor::Staff(staff_id) => {
                let member = self.require_staff(db, staff_id).await?;
                let unit = self.require_unit(db, booking.unit).await?;
                if !member.active || member.partner_id != unit.partner_id.to_string() {
                    return Err(EngineError::Forbidden(
                        "staff member does not work for this partner".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}
