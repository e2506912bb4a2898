//! Migration: Create users, accounts, transactions, rules, budgets and goals.
//!
//! Every child table cascades deletes from `users`; transactions also cascade
//! from `accounts`.

use domain::VALID_PERIODS;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(
                        ColumnDef::new(Users::SyncStatus)
                            .string()
                            .not_null()
                            .default(domain::SYNC_NEVER_SYNCED),
                    )
                    .col(ColumnDef::new(Users::PlaidItemId).string().null())
                    .col(ColumnDef::new(Users::LastSyncedAt).timestamp_with_time_zone().null())
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::UserId).uuid().not_null())
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::AccountType).string().not_null())
                    .col(money(Accounts::CurrentBalance).null())
                    .col(money(Accounts::AvailableBalance).null())
                    .col(money(Accounts::CreditLimit).null())
                    .col(flag(Accounts::IsActive, true))
                    .col(timestamp(Accounts::CreatedAt))
                    .col(timestamp(Accounts::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accounts_user_id")
                            .from(Accounts::Table, Accounts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Transactions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Transactions::UserId).uuid().not_null())
                    .col(ColumnDef::new(Transactions::AccountId).uuid().not_null())
                    .col(money(Transactions::Amount).not_null())
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .col(ColumnDef::new(Transactions::Name).string().not_null())
                    .col(ColumnDef::new(Transactions::MerchantName).string().null())
                    .col(flag(Transactions::Pending, false))
                    .col(ColumnDef::new(Transactions::PrimaryCategory).string().null())
                    .col(ColumnDef::new(Transactions::DetailedCategory).string().null())
                    .col(
                        ColumnDef::new(Transactions::Categories)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Transactions::Notes).text().null())
                    .col(timestamp(Transactions::CreatedAt))
                    .col(timestamp(Transactions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_user_id")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_account_id")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_user_date")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_user_category")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::PrimaryCategory)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserCategoryRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserCategoryRules::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserCategoryRules::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserCategoryRules::Merchant).string().not_null())
                    .col(ColumnDef::new(UserCategoryRules::Category).string().not_null())
                    .col(flag(UserCategoryRules::IsRegex, false))
                    .col(
                        ColumnDef::new(UserCategoryRules::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(UserCategoryRules::CreatedAt))
                    .col(timestamp(UserCategoryRules::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_category_rules_user_id")
                            .from(UserCategoryRules::Table, UserCategoryRules::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_category_rules_user_priority")
                    .table(UserCategoryRules::Table)
                    .col(UserCategoryRules::UserId)
                    .col(UserCategoryRules::Priority)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Budgets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Budgets::UserId).uuid().not_null())
                    .col(ColumnDef::new(Budgets::Category).string().not_null())
                    .col(money(Budgets::Amount).not_null())
                    .col(
                        ColumnDef::new(Budgets::Period)
                            .string()
                            .not_null()
                            .check(Expr::col(Budgets::Period).is_in(VALID_PERIODS.iter().copied())),
                    )
                    .col(ColumnDef::new(Budgets::StartDate).date().null())
                    .col(ColumnDef::new(Budgets::EndDate).date().null())
                    .col(flag(Budgets::IsActive, true))
                    .col(timestamp(Budgets::CreatedAt))
                    .col(timestamp(Budgets::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budgets_user_id")
                            .from(Budgets::Table, Budgets::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SavingsGoals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SavingsGoals::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SavingsGoals::UserId).uuid().not_null())
                    .col(ColumnDef::new(SavingsGoals::Name).string().not_null())
                    .col(money(SavingsGoals::TargetAmount).not_null())
                    .col(money(SavingsGoals::CurrentAmount).not_null().default(0))
                    .col(ColumnDef::new(SavingsGoals::TargetDate).date().null())
                    .col(flag(SavingsGoals::IsActive, true))
                    .col(flag(SavingsGoals::IsCompleted, false))
                    .col(timestamp(SavingsGoals::CreatedAt))
                    .col(timestamp(SavingsGoals::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_savings_goals_user_id")
                            .from(SavingsGoals::Table, SavingsGoals::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first
        manager
            .drop_table(Table::drop().table(SavingsGoals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserCategoryRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

fn money<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).decimal_len(14, 2).to_owned()
}

fn flag<T: IntoIden>(col: T, default: bool) -> ColumnDef {
    ColumnDef::new(col).boolean().not_null().default(default).to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    SyncStatus,
    PlaidItemId,
    LastSyncedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    UserId,
    Name,
    AccountType,
    CurrentBalance,
    AvailableBalance,
    CreditLimit,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    UserId,
    AccountId,
    Amount,
    Date,
    Name,
    MerchantName,
    Pending,
    PrimaryCategory,
    DetailedCategory,
    Categories,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserCategoryRules {
    Table,
    Id,
    UserId,
    Merchant,
    Category,
    IsRegex,
    Priority,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    UserId,
    Category,
    Amount,
    Period,
    StartDate,
    EndDate,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SavingsGoals {
    Table,
    Id,
    UserId,
    Name,
    TargetAmount,
    CurrentAmount,
    TargetDate,
    IsActive,
    IsCompleted,
    CreatedAt,
    UpdatedAt,
}
