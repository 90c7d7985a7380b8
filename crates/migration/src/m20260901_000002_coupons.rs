use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Coupons {
    Table,
    Id,
    Code,
    Kind,
    Value,
    MaxUses,
    Used,
    ValidFrom,
    ValidTo,
    Active,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Coupons::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Coupons::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Coupons::Code).string().not_null())
                    .col(ColumnDef::new(Coupons::Kind).string().not_null())
                    .col(ColumnDef::new(Coupons::Value).big_integer().not_null())
                    .col(ColumnDef::new(Coupons::MaxUses).integer())
                    .col(
                        ColumnDef::new(Coupons::Used)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Coupons::ValidFrom).date())
                    .col(ColumnDef::new(Coupons::ValidTo).date())
                    .col(
                        ColumnDef::new(Coupons::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Coupons::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-coupons-code")
                    .table(Coupons::Table)
                    .col(Coupons::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uidx-coupons-code")
                    .table(Coupons::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Coupons::Table).to_owned())
            .await?;
        Ok(())
    }
}
