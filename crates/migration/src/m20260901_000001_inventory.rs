use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Partners {
    Table,
    Id,
    Name,
    CommissionBps,
    Active,
    CreatedAt,
}

#[derive(Iden)]
pub enum Staff {
    Table,
    Id,
    PartnerId,
    Name,
    CommissionBps,
    Active,
    CreatedAt,
}

#[derive(Iden)]
pub enum Boards {
    Table,
    Id,
    PartnerId,
    LocationId,
    Name,
    Capacity,
    PriceMinor,
    Active,
    CreatedAt,
}

#[derive(Iden)]
pub enum DailyOffers {
    Table,
    Id,
    PartnerId,
    Name,
    Address,
    PriceMinor,
    Quantity,
    Active,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Partners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Partners::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Partners::Name).string().not_null())
                    .col(ColumnDef::new(Partners::CommissionBps).integer())
                    .col(
                        ColumnDef::new(Partners::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Partners::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Staff::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Staff::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Staff::PartnerId).string().not_null())
                    .col(ColumnDef::new(Staff::Name).string().not_null())
                    .col(ColumnDef::new(Staff::CommissionBps).integer().not_null())
                    .col(
                        ColumnDef::new(Staff::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Staff::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-staff-partner_id")
                            .from(Staff::Table, Staff::PartnerId)
                            .to(Partners::Table, Partners::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Boards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Boards::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Boards::PartnerId).string().not_null())
                    .col(ColumnDef::new(Boards::LocationId).string())
                    .col(ColumnDef::new(Boards::Name).string().not_null())
                    .col(ColumnDef::new(Boards::Capacity).integer().not_null())
                    .col(ColumnDef::new(Boards::PriceMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Boards::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Boards::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-boards-partner_id")
                            .from(Boards::Table, Boards::PartnerId)
                            .to(Partners::Table, Partners::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-boards-partner_id")
                    .table(Boards::Table)
                    .col(Boards::PartnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DailyOffers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyOffers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyOffers::PartnerId).string().not_null())
                    .col(ColumnDef::new(DailyOffers::Name).string().not_null())
                    .col(ColumnDef::new(DailyOffers::Address).string())
                    .col(
                        ColumnDef::new(DailyOffers::PriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyOffers::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(DailyOffers::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(DailyOffers::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-daily_offers-partner_id")
                            .from(DailyOffers::Table, DailyOffers::PartnerId)
                            .to(Partners::Table, Partners::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyOffers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Boards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Staff::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Partners::Table).to_owned())
            .await?;
        Ok(())
    }
}
