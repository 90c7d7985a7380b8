use sea_orm_migration::prelude::*;

use crate::m20260901_000001_inventory::Partners;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum WalletOps {
    Table,
    Id,
    OwnerKind,
    OwnerId,
    BookingId,
    Kind,
    AmountMinor,
    Source,
    CreatedAt,
}

#[derive(Iden)]
enum WithdrawRequests {
    Table,
    Id,
    PartnerId,
    AmountMinor,
    Status,
    CreatedAt,
    ResolvedAt,
}

#[derive(Iden)]
enum PlatformSettings {
    Table,
    Key,
    Value,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WalletOps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletOps::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WalletOps::OwnerKind).string().not_null())
                    .col(ColumnDef::new(WalletOps::OwnerId).string().not_null())
                    .col(ColumnDef::new(WalletOps::BookingId).string())
                    .col(ColumnDef::new(WalletOps::Kind).string().not_null())
                    .col(
                        ColumnDef::new(WalletOps::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WalletOps::Source).string().not_null())
                    .col(ColumnDef::new(WalletOps::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wallet_ops-owner")
                    .table(WalletOps::Table)
                    .col(WalletOps::OwnerKind)
                    .col(WalletOps::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Manual ops carry a NULL booking_id and are not constrained.
        manager
            .create_index(
                Index::create()
                    .name("uidx-wallet_ops-owner-booking_id-kind")
                    .table(WalletOps::Table)
                    .col(WalletOps::OwnerKind)
                    .col(WalletOps::OwnerId)
                    .col(WalletOps::BookingId)
                    .col(WalletOps::Kind)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WithdrawRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WithdrawRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WithdrawRequests::PartnerId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawRequests::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WithdrawRequests::Status).string().not_null())
                    .col(
                        ColumnDef::new(WithdrawRequests::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WithdrawRequests::ResolvedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-withdraw_requests-partner_id")
                            .from(WithdrawRequests::Table, WithdrawRequests::PartnerId)
                            .to(Partners::Table, Partners::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-withdraw_requests-partner_id-created_at")
                    .table(WithdrawRequests::Table)
                    .col(WithdrawRequests::PartnerId)
                    .col(WithdrawRequests::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlatformSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlatformSettings::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlatformSettings::Value).string().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlatformSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WithdrawRequests::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("uidx-wallet_ops-owner-booking_id-kind")
                    .table(WalletOps::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(WalletOps::Table).to_owned())
            .await?;
        Ok(())
    }
}
