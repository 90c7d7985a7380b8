pub use sea_orm_migration::prelude::*;

mod m20260901_000001_inventory;
mod m20260901_000002_coupons;
mod m20260901_000003_bookings;
mod m20260901_000004_ledger;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260901_000001_inventory::Migration),
            Box::new(m20260901_000002_coupons::Migration),
            Box::new(m20260901_000003_bookings::Migration),
            Box::new(m20260901_000004_ledger::Migration),
        ]
    }
}
