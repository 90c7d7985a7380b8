#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Europe::Moscow;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    Actor, Engine, FixedClock, MoneyCents, NewBoardCmd, PaymentMethod, ReserveCmd, UnitRef, Window,
};
use migration::MigratorTrait;

pub const CUSTOMER: i64 = 4242;
pub const HOURLY_RATE: MoneyCents = MoneyCents::new(1000_00);

/// 2026-10-19 is a Monday; noon carries no time-of-day adjustment.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

pub fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

pub fn hour_on_monday(hour: u32) -> Window {
    Window::hourly(monday(), at(hour), 60)
}

/// Instant of a Moscow wall-clock time.
pub fn local(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    let naive = date.and_hms_opt(hour, minute, 0).unwrap();
    Moscow
        .from_local_datetime(&naive)
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

pub struct Fixture {
    pub engine: Engine,
    pub db: DatabaseConnection,
    pub clock: FixedClock,
    pub partner_id: Uuid,
    pub board: UnitRef,
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection, FixedClock) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let clock = FixedClock::new(local(monday(), 9, 0));
    let engine = Engine::builder()
        .database(db.clone())
        .clock(clock.clone())
        .build()
        .await
        .unwrap();
    (engine, db, clock)
}

/// A partner at the default commission with one board of `capacity` items.
pub async fn fixture(capacity: i64) -> Fixture {
    let (engine, db, clock) = engine_with_db().await;
    let partner_id = engine.new_partner("Wave Riders", None).await.unwrap();
    let board_id = engine
        .new_board(NewBoardCmd::new(partner_id, "SUP", capacity, HOURLY_RATE))
        .await
        .unwrap();
    Fixture {
        engine,
        db,
        clock,
        partner_id,
        board: UnitRef::Board { board_id },
    }
}

impl Fixture {
    pub async fn reserve(&self, window: Window, quantity: i64, method: PaymentMethod) -> Uuid {
        self.engine
            .reserve(ReserveCmd::new(CUSTOMER, self.board, window, quantity, method))
            .await
            .unwrap()
    }

    /// A cash booking the partner confirmed, so it is active and paid.
    pub async fn active_paid_booking(&self, window: Window) -> Uuid {
        let booking_id = self.reserve(window, 1, PaymentMethod::Cash).await;
        self.engine
            .confirm_booking(booking_id, Actor::Partner(self.partner_id))
            .await
            .unwrap();
        booking_id
    }
}
