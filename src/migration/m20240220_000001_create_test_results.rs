//! Create test_results table and its operator index.

use sea_orm_migration::prelude::*;

/// Name of the secondary index used by operator-filtered statistics.
pub const OPERATOR_INDEX: &str = "test_results_operator_idx";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // INTEGER PRIMARY KEY AUTOINCREMENT: ids are never reused after deletion
        manager
            .create_table(
                Table::create()
                    .table(TestResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestResults::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestResults::DevType).string().not_null())
                    .col(ColumnDef::new(TestResults::Operator).string().not_null())
                    .col(ColumnDef::new(TestResults::Dt).string().not_null())
                    .col(ColumnDef::new(TestResults::Success).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(OPERATOR_INDEX)
                    .table(TestResults::Table)
                    .col(TestResults::Operator)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestResults::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TestResults {
    Table,
    Id,
    DevType,
    Operator,
    Dt,
    Success,
}
