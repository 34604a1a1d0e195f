//! create iou_states table migration (IOUSchema v1).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IouStates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IouStates::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IouStates::Lender).string())
                    .col(ColumnDef::new(IouStates::Borrower).string())
                    .col(
                        ColumnDef::new(IouStates::Value)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(IouStates::LinearId).uuid())
                    .col(ColumnDef::new(IouStates::PublicKey).blob())
                    .col(ColumnDef::new(IouStates::SignedMessage).blob())
                    .to_owned(),
            )
            .await?;

        // history lookups join all versions of one obligation
        manager
            .create_index(
                Index::create()
                    .name("idx_iou_states_linear_id")
                    .table(IouStates::Table)
                    .col(IouStates::LinearId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_iou_states_lender")
                    .table(IouStates::Table)
                    .col(IouStates::Lender)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_iou_states_borrower")
                    .table(IouStates::Table)
                    .col(IouStates::Borrower)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IouStates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum IouStates {
    #[sea_orm(iden = "iou_states")]
    Table,
    Id,
    Lender,
    Borrower,
    Value,
    LinearId,
    PublicKey,
    SignedMessage,
}
