use sea_orm_migration::prelude::*;

use crate::m20260901_000001_inventory::{Boards, DailyOffers, Staff};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Bookings {
    Table,
    Id,
    UserId,
    BoardId,
    DailyOfferId,
    StaffId,
    Date,
    StartTime,
    Duration,
    WindowStart,
    WindowEnd,
    Quantity,
    AmountMinor,
    Currency,
    Status,
    PaymentMethod,
    PaymentStatus,
    CouponCode,
    PartnerCredited,
    StaffCredited,
    PaymentDeadline,
    CreatedAt,
    StartedAt,
    EndedAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    BookingId,
    ProviderRef,
    AmountMinor,
    Currency,
    Status,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookings::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Bookings::BoardId).string())
                    .col(ColumnDef::new(Bookings::DailyOfferId).string())
                    .col(ColumnDef::new(Bookings::StaffId).string())
                    .col(ColumnDef::new(Bookings::Date).date().not_null())
                    .col(ColumnDef::new(Bookings::StartTime).time())
                    .col(ColumnDef::new(Bookings::Duration).integer().not_null())
                    .col(ColumnDef::new(Bookings::WindowStart).date_time().not_null())
                    .col(ColumnDef::new(Bookings::WindowEnd).date_time().not_null())
                    .col(ColumnDef::new(Bookings::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(Bookings::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::Currency).string().not_null())
                    .col(ColumnDef::new(Bookings::Status).string().not_null())
                    .col(ColumnDef::new(Bookings::PaymentMethod).string().not_null())
                    .col(ColumnDef::new(Bookings::PaymentStatus).string().not_null())
                    .col(ColumnDef::new(Bookings::CouponCode).string())
                    .col(
                        ColumnDef::new(Bookings::PartnerCredited)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Bookings::StaffCredited)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Bookings::PaymentDeadline).date_time())
                    .col(ColumnDef::new(Bookings::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Bookings::StartedAt).timestamp())
                    .col(ColumnDef::new(Bookings::EndedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bookings-board_id")
                            .from(Bookings::Table, Bookings::BoardId)
                            .to(Boards::Table, Boards::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bookings-daily_offer_id")
                            .from(Bookings::Table, Bookings::DailyOfferId)
                            .to(DailyOffers::Table, DailyOffers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bookings-staff_id")
                            .from(Bookings::Table, Bookings::StaffId)
                            .to(Staff::Table, Staff::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bookings-board_id-window_start")
                    .table(Bookings::Table)
                    .col(Bookings::BoardId)
                    .col(Bookings::WindowStart)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bookings-daily_offer_id-window_start")
                    .table(Bookings::Table)
                    .col(Bookings::DailyOfferId)
                    .col(Bookings::WindowStart)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bookings-status-window_end")
                    .table(Bookings::Table)
                    .col(Bookings::Status)
                    .col(Bookings::WindowEnd)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bookings-user_id")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::BookingId).string().not_null())
                    .col(ColumnDef::new(Payments::ProviderRef).string().not_null())
                    .col(
                        ColumnDef::new(Payments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::Currency).string().not_null())
                    .col(ColumnDef::new(Payments::Status).string().not_null())
                    .col(ColumnDef::new(Payments::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-booking_id")
                            .from(Payments::Table, Payments::BookingId)
                            .to(Bookings::Table, Bookings::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-booking_id")
                    .table(Payments::Table)
                    .col(Payments::BookingId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await?;
        Ok(())
    }
}
