use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, Statement, TransactionTrait,
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BookingStatus, EngineError, MoneyCents, NewBoardCmd, NewDailyOfferCmd, Partner, Percent,
    ResultEngine, StaffMember, Unit, UnitFilter, UnitKind, UnitRef, Window, boards, daily_offers,
    partners, staff,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

/// A bookable one-hour start time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: NaiveTime,
    pub available: i64,
}

fn ensure_positive_capacity(capacity: i64) -> ResultEngine<i32> {
    if capacity <= 0 {
        return Err(EngineError::InvalidQuantity(format!(
            "capacity must be > 0, got {capacity}"
        )));
    }
    i32::try_from(capacity)
        .map_err(|_| EngineError::InvalidQuantity(format!("capacity too large: {capacity}")))
}

fn ensure_positive_price(price: MoneyCents) -> ResultEngine<i64> {
    if !price.is_positive() {
        return Err(EngineError::InvalidAmount("price must be > 0".to_string()));
    }
    Ok(price.cents())
}

impl Engine {
    /// Registers a partner. `commission` overrides the platform default.
    pub async fn new_partner(&self, name: &str, commission: Option<Percent>) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "partner")?;
        let partner = Partner::new(name, commission, self.now());
        partners::ActiveModel::from(&partner)
            .insert(&self.database)
            .await?;
        tracing::info!(partner_id = %partner.id, "partner created");
        Ok(partner.id)
    }

    pub async fn partner(&self, partner_id: Uuid) -> ResultEngine<Partner> {
        Partner::try_from(self.require_partner(&self.database, partner_id).await?)
    }

    /// Adds a staff member to a partner. Without an explicit commission the
    /// configured staff default applies.
    pub async fn new_staff(
        &self,
        partner_id: Uuid,
        name: &str,
        commission: Option<Percent>,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "staff")?;
        let commission = commission.unwrap_or(self.settings.staff_commission);
        let created_at = self.now();
        with_tx!(self, |db_tx| {
            self.require_partner(&db_tx, partner_id).await?;
            let member = StaffMember::new(partner_id, name, commission, created_at);
            staff::ActiveModel::from(&member).insert(&db_tx).await?;
            Ok(member.id)
        })
    }

    pub async fn staff_member(&self, staff_id: Uuid) -> ResultEngine<StaffMember> {
        StaffMember::try_from(self.require_staff(&self.database, staff_id).await?)
    }

    pub async fn new_board(&self, cmd: NewBoardCmd) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "board")?;
        let capacity = ensure_positive_capacity(cmd.capacity)?;
        let price_minor = ensure_positive_price(cmd.hourly_price)?;
        let board_id = Uuid::new_v4();
        let created_at = self.now();
        with_tx!(self, |db_tx| {
            self.require_partner(&db_tx, cmd.partner_id).await?;
            boards::ActiveModel {
                id: ActiveValue::Set(board_id.to_string()),
                partner_id: ActiveValue::Set(cmd.partner_id.to_string()),
                location_id: ActiveValue::Set(normalize_optional_text(cmd.location_id.as_deref())),
                name: ActiveValue::Set(name),
                capacity: ActiveValue::Set(capacity),
                price_minor: ActiveValue::Set(price_minor),
                active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(created_at),
            }
            .insert(&db_tx)
            .await?;
            Ok(board_id)
        })
    }

    pub async fn new_daily_offer(&self, cmd: NewDailyOfferCmd) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "daily offer")?;
        let quantity = ensure_positive_capacity(cmd.quantity)?;
        let price_minor = ensure_positive_price(cmd.daily_price)?;
        let offer_id = Uuid::new_v4();
        let created_at = self.now();
        with_tx!(self, |db_tx| {
            self.require_partner(&db_tx, cmd.partner_id).await?;
            daily_offers::ActiveModel {
                id: ActiveValue::Set(offer_id.to_string()),
                partner_id: ActiveValue::Set(cmd.partner_id.to_string()),
                name: ActiveValue::Set(name),
                address: ActiveValue::Set(normalize_optional_text(cmd.address.as_deref())),
                price_minor: ActiveValue::Set(price_minor),
                quantity: ActiveValue::Set(quantity),
                active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(created_at),
            }
            .insert(&db_tx)
            .await?;
            Ok(offer_id)
        })
    }

    /// Lists or unlists a unit. Existing bookings are untouched.
    pub async fn set_unit_active(&self, unit: UnitRef, active: bool) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_unit(&db_tx, unit).await?;
            match unit {
                UnitRef::Board { board_id } => {
                    boards::ActiveModel {
                        id: ActiveValue::Set(board_id.to_string()),
                        active: ActiveValue::Set(active),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;
                }
                UnitRef::Daily { offer_id } => {
                    daily_offers::ActiveModel {
                        id: ActiveValue::Set(offer_id.to_string()),
                        active: ActiveValue::Set(active),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;
                }
            }
            Ok(())
        })
    }

    pub async fn unit(&self, unit: UnitRef) -> ResultEngine<Unit> {
        self.require_unit(&self.database, unit).await
    }

    /// Static ceiling of a unit. Never decremented by bookings.
    pub async fn capacity(&self, unit: UnitRef) -> ResultEngine<i64> {
        Ok(self.require_unit(&self.database, unit).await?.capacity)
    }

    /// Base price: per hour for boards, per day for daily offers.
    pub async fn price(&self, unit: UnitRef) -> ResultEngine<MoneyCents> {
        Ok(self.require_unit(&self.database, unit).await?.price)
    }

    pub async fn list_active_units(&self, filter: &UnitFilter) -> ResultEngine<Vec<Unit>> {
        let mut units = Vec::new();

        if filter.includes(UnitKind::Board) {
            let mut query = boards::Entity::find().filter(boards::Column::Active.eq(true));
            if let Some(partner_id) = filter.partner_id {
                query = query.filter(boards::Column::PartnerId.eq(partner_id.to_string()));
            }
            if let Some(location_id) = &filter.location_id {
                query = query.filter(boards::Column::LocationId.eq(location_id.clone()));
            }
            for model in query
                .order_by_asc(boards::Column::Name)
                .all(&self.database)
                .await?
            {
                units.push(Unit::try_from(model)?);
            }
        }

        // Daily offers have no location; a location filter excludes them.
        if filter.includes(UnitKind::Daily) && filter.location_id.is_none() {
            let mut query =
                daily_offers::Entity::find().filter(daily_offers::Column::Active.eq(true));
            if let Some(partner_id) = filter.partner_id {
                query = query.filter(daily_offers::Column::PartnerId.eq(partner_id.to_string()));
            }
            for model in query
                .order_by_asc(daily_offers::Column::Name)
                .all(&self.database)
                .await?
            {
                units.push(Unit::try_from(model)?);
            }
        }

        Ok(units)
    }

    /// Quantity already reserved on `unit` by bookings overlapping `window`.
    pub async fn occupancy(&self, unit: UnitRef, window: &Window) -> ResultEngine<i64> {
        let (start, end) = window.bounds()?;
        self.overlap_sum(&self.database, unit, start, end).await
    }

    /// Hourly start times on `date` with at least one free item for an hour.
    ///
    /// On the current day, hours that already started are skipped.
    pub async fn available_slots(&self, board_id: Uuid, date: NaiveDate) -> ResultEngine<Vec<Slot>> {
        let unit = UnitRef::Board { board_id };
        let board = self.require_active_unit(&self.database, unit).await?;
        let now = self.local_now();

        let mut slots = Vec::new();
        for hour in self.settings.work_hours_start..self.settings.work_hours_end {
            let Some(start) = NaiveTime::from_hms_opt(hour, 0, 0) else {
                continue;
            };
            if date.and_time(start) < now {
                continue;
            }
            let (from, to) = Window::hourly(date, start, 60).bounds()?;
            let used = self.overlap_sum(&self.database, unit, from, to).await?;
            let available = (board.capacity - used).max(0);
            if available > 0 {
                slots.push(Slot { start, available });
            }
        }
        Ok(slots)
    }

    /// Overlap sum: total quantity of occupying bookings on `unit` intersecting `[start, end)`.
    pub(super) async fn overlap_sum<C: ConnectionTrait>(
        &self,
        db: &C,
        unit: UnitRef,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> ResultEngine<i64> {
        let sql = format!(
            "SELECT COALESCE(SUM(quantity), 0) AS used FROM bookings \
             WHERE {col} = ? AND status IN ({statuses}) \
             AND window_start < ? AND window_end > ?",
            col = unit.booking_column(),
            statuses = BookingStatus::sql_list(&BookingStatus::OCCUPYING),
        );
        let row = db
            .query_one(Statement::from_sql_and_values(
                db.get_database_backend(),
                sql,
                vec![unit.id().to_string().into(), end.into(), start.into()],
            ))
            .await?;
        Ok(match row {
            Some(row) => row.try_get::<i64>("", "used")?,
            None => 0,
        })
    }
}
