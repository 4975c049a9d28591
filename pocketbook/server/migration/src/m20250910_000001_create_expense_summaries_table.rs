use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

use crate::m20250901_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ExpenseSummaries {
    Table,
    Id,
    UserId,
    CategoryId,
    PaymentModeId,
    Type,
    Status,
    Month,
    Year,
    TotalAmount,
    CreatedAt,
}

const FK_EXPENSE_SUMMARIES_TO_USERS: &str = "fk-expense_summaries-user_id";
const IDX_EXPENSE_SUMMARIES_USER_ID: &str = "idx-expense_summaries-user_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExpenseSummaries::Table)
                    .if_not_exists()
                    .col(pk_auto(ExpenseSummaries::Id))
                    .col(integer(ExpenseSummaries::UserId))
                    .col(integer(ExpenseSummaries::CategoryId))
                    .col(integer(ExpenseSummaries::PaymentModeId))
                    .col(string_len(ExpenseSummaries::Type, 16))
                    .col(string_len(ExpenseSummaries::Status, 16))
                    .col(integer(ExpenseSummaries::Month))
                    .col(integer(ExpenseSummaries::Year))
                    .col(double(ExpenseSummaries::TotalAmount))
                    .col(
                        timestamp_with_time_zone(ExpenseSummaries::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_EXPENSE_SUMMARIES_TO_USERS)
                            .from(ExpenseSummaries::Table, ExpenseSummaries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_EXPENSE_SUMMARIES_USER_ID)
                    .table(ExpenseSummaries::Table)
                    .col(ExpenseSummaries::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExpenseSummaries::Table).to_owned())
            .await
    }
}
