use sea_orm::{ConnectionTrait, Statement, Value};
use uuid::Uuid;

use crate::{BookingStatus, EngineError, ResultEngine, ReserveCmd, UnitRef};

use super::Engine;

/// Inserts the booking only if the requested quantity still fits.
///
/// Capacity check and insert are a single statement, so SQLite serializes
/// concurrent reservations on the same unit and at most `capacity` items are
/// ever held for any instant.
fn conditional_insert_sql(unit: UnitRef) -> String {
    format!(
        "INSERT INTO bookings (\
            id, user_id, board_id, daily_offer_id, date, start_time, duration, \
            window_start, window_end, quantity, amount_minor, currency, status, \
            payment_method, payment_status, coupon_code, partner_credited, staff_credited, \
            payment_deadline, created_at) \
         SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ? \
         WHERE ? <= ({capacity}) - (\
            SELECT COALESCE(SUM(quantity), 0) FROM bookings \
            WHERE {col} = ? AND status IN ({statuses}) \
            AND window_start < ? AND window_end > ?)",
        capacity = unit.capacity_subquery(),
        col = unit.booking_column(),
        statuses = BookingStatus::sql_list(&BookingStatus::OCCUPYING),
    )
}

impl Engine {
    /// Reserves a window on a unit and returns the new booking id.
    ///
    /// Fails with `InvalidQuantity`, `OutsideHours` or `Overbooked` (with the
    /// remaining availability) before anything is written.
    pub async fn reserve(&self, cmd: ReserveCmd) -> ResultEngine<Uuid> {
        let (unit, quote) = self.quote_with(&self.database, &cmd.quote).await?;
        let window = cmd.quote.window;
        let (start, end) = window.bounds()?;
        let quantity = cmd.quote.quantity;

        let status = cmd.payment_method.entry_status(unit.unit.kind());
        let payment_status = cmd.payment_method.initial_payment_status();
        let payment_deadline = self
            .settings
            .payment_timeout
            .filter(|_| cmd.payment_method.has_payment_deadline())
            .map(|timeout| self.local_now() + timeout);

        let booking_id = Uuid::new_v4();
        let unit_id = unit.unit.id().to_string();
        let (board_id, daily_offer_id): (Option<String>, Option<String>) = match unit.unit {
            UnitRef::Board { .. } => (Some(unit_id.clone()), None),
            UnitRef::Daily { .. } => (None, Some(unit_id.clone())),
        };

        let values: Vec<Value> = vec![
            booking_id.to_string().into(),
            cmd.user_id.into(),
            board_id.into(),
            daily_offer_id.into(),
            window.date().into(),
            window.start_time().into(),
            window.duration().into(),
            start.into(),
            end.into(),
            quantity.into(),
            quote.amount.cents().into(),
            self.settings.currency.code().into(),
            status.as_str().into(),
            cmd.payment_method.as_str().into(),
            payment_status.as_str().into(),
            quote.coupon.clone().into(),
            payment_deadline.into(),
            self.now().into(),
            // capacity guard
            quantity.into(),
            unit_id.clone().into(),
            unit_id.into(),
            end.into(),
            start.into(),
        ];

        let backend = self.database.get_database_backend();
        let result = self
            .database
            .execute(Statement::from_sql_and_values(
                backend,
                conditional_insert_sql(unit.unit),
                values,
            ))
            .await?;

        if result.rows_affected() == 0 {
            let unit = self.require_active_unit(&self.database, unit.unit).await?;
            let used = self
                .overlap_sum(&self.database, unit.unit, start, end)
                .await?;
            let available = (unit.capacity - used).max(0);
            tracing::info!(
                unit = %unit.unit,
                requested = quantity,
                available,
                capacity = unit.capacity,
                "reservation rejected: overbooked"
            );
            return Err(EngineError::Overbooked {
                available,
                capacity: unit.capacity,
            });
        }

        tracing::info!(
            %booking_id,
            unit = %unit.unit,
            quantity,
            amount = %quote.amount,
            status = status.as_str(),
            "booking reserved"
        );
        Ok(booking_id)
    }
}
