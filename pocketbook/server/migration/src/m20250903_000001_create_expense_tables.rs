use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

use crate::m20250901_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    UserId,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PaymentModes {
    Table,
    Id,
    UserId,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Expenses {
    Table,
    Id,
    UserId,
    Amount,
    Description,
    CategoryId,
    PaymentModeId,
    Type,
    Status,
    CreatedAt,
    UpdatedAt,
}

const FK_CATEGORIES_TO_USERS: &str = "fk-categories-user_id";
const FK_PAYMENT_MODES_TO_USERS: &str = "fk-payment_modes-user_id";
const FK_EXPENSES_TO_USERS: &str = "fk-expenses-user_id";
const IDX_CATEGORIES_USER_ID: &str = "idx-categories-user_id";
const IDX_PAYMENT_MODES_USER_ID: &str = "idx-payment_modes-user_id";
const IDX_EXPENSES_USER_ID: &str = "idx-expenses-user_id";

// Expenses keep plain integer references to categories and payment modes.
// Deleting either must leave existing expenses untouched.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(integer(Categories::UserId))
                    .col(string(Categories::Name))
                    .col(
                        timestamp_with_time_zone(Categories::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Categories::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_CATEGORIES_TO_USERS)
                            .from(Categories::Table, Categories::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PaymentModes::Table)
                    .if_not_exists()
                    .col(pk_auto(PaymentModes::Id))
                    .col(integer(PaymentModes::UserId))
                    .col(string(PaymentModes::Name))
                    .col(
                        timestamp_with_time_zone(PaymentModes::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(PaymentModes::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_PAYMENT_MODES_TO_USERS)
                            .from(PaymentModes::Table, PaymentModes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(pk_auto(Expenses::Id))
                    .col(integer(Expenses::UserId))
                    .col(double(Expenses::Amount))
                    .col(text(Expenses::Description))
                    .col(integer(Expenses::CategoryId))
                    .col(integer(Expenses::PaymentModeId))
                    .col(string_len(Expenses::Type, 16))
                    .col(string_len(Expenses::Status, 16).default("paid"))
                    .col(
                        timestamp_with_time_zone(Expenses::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Expenses::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_EXPENSES_TO_USERS)
                            .from(Expenses::Table, Expenses::UserId)
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
                    .name(IDX_CATEGORIES_USER_ID)
                    .table(Categories::Table)
                    .col(Categories::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_PAYMENT_MODES_USER_ID)
                    .table(PaymentModes::Table)
                    .col(PaymentModes::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_EXPENSES_USER_ID)
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentModes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}
