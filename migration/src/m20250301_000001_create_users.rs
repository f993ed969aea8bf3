//! Migration to create the users table
//!
//! Landlords, tenants and admins share one table; `role` tells them apart.

use sea_orm_migration::{prelude::*, schema::*};

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
                    .col(pk_auto(Users::Id))
                    .col(string_len_uniq(Users::Username, 50))
                    .col(string_uniq(Users::Email))
                    .col(string(Users::PasswordHash))
                    .col(string_null(Users::FirstName))
                    .col(string_null(Users::LastName))
                    .col(string(Users::Role).default("USER"))
                    .col(string_null(Users::Phone))
                    .col(string_null(Users::Address))
                    .col(string_null(Users::City))
                    .col(string_null(Users::State))
                    .col(string_null(Users::ZipCode))
                    .col(string_null(Users::ProfileImage))
                    .col(text_null(Users::Bio))
                    .col(boolean(Users::EmailVerified).default(false))
                    .col(boolean(Users::PhoneVerified).default(false))
                    .col(boolean(Users::IdentityVerified).default(false))
                    .col(string_null(Users::CompanyName))
                    .col(string_null(Users::LicenseNumber))
                    .col(string_null(Users::TaxId))
                    .col(boolean(Users::LandlordBackgroundCheckPassed).default(false))
                    .col(string_null(Users::EmploymentStatus))
                    .col(string_null(Users::EmployerName))
                    .col(string_null(Users::EmployerPhone))
                    .col(decimal_len_null(Users::MonthlyIncome, 12, 2))
                    .col(integer_null(Users::CreditScore))
                    .col(text_null(Users::RentalHistory))
                    .col(boolean(Users::TenantBackgroundCheckPassed).default(false))
                    .col(timestamp_with_time_zone(Users::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Users::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    Role,
    Phone,
    Address,
    City,
    State,
    ZipCode,
    ProfileImage,
    Bio,
    EmailVerified,
    PhoneVerified,
    IdentityVerified,
    CompanyName,
    LicenseNumber,
    TaxId,
    LandlordBackgroundCheckPassed,
    EmploymentStatus,
    EmployerName,
    EmployerPhone,
    MonthlyIncome,
    CreditScore,
    RentalHistory,
    TenantBackgroundCheckPassed,
    CreatedAt,
    UpdatedAt,
}
