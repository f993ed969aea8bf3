//! Migration to create the payments table
//!
//! `version` backs optimistic concurrency control on payment updates.

use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_users::Users;
use super::m20250301_000002_create_properties::Properties;
use super::m20250302_000002_create_agreements::Agreements;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(pk_auto(Payments::Id))
                    .col(integer(Payments::TenantId))
                    .col(integer(Payments::LandlordId))
                    .col(integer(Payments::PropertyId))
                    .col(integer_null(Payments::AgreementId))
                    .col(string(Payments::PaymentType))
                    .col(string(Payments::Status).default("PENDING"))
                    .col(string_uniq(Payments::PaymentReference))
                    .col(decimal_len(Payments::Amount, 12, 2))
                    .col(timestamp_with_time_zone(Payments::PaymentDate))
                    .col(timestamp_with_time_zone(Payments::DueDate))
                    .col(timestamp_with_time_zone_null(Payments::ProcessedAt))
                    .col(string_null(Payments::Method))
                    .col(string_null(Payments::TransactionId))
                    .col(string_len_null(Payments::CardLastFour, 4))
                    .col(string_len_null(Payments::BankAccountLastFour, 4))
                    .col(text_null(Payments::PaymentDescription))
                    .col(decimal_len(Payments::LateFee, 12, 2).default(0))
                    .col(decimal_len(Payments::ProcessingFee, 12, 2).default(0))
                    .col(decimal_len(Payments::TotalAmount, 12, 2))
                    .col(text_null(Payments::FailureReason))
                    .col(integer(Payments::RetryCount).default(0))
                    .col(timestamp_with_time_zone_null(Payments::NextRetryAt))
                    .col(big_integer(Payments::Version).default(0))
                    .col(timestamp_with_time_zone(Payments::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Payments::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_tenant")
                            .from(Payments::Table, Payments::TenantId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_landlord")
                            .from(Payments::Table, Payments::LandlordId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_property")
                            .from(Payments::Table, Payments::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_agreement")
                            .from(Payments::Table, Payments::AgreementId)
                            .to(Agreements::Table, Agreements::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_status_due_date")
                    .table(Payments::Table)
                    .col(Payments::Status)
                    .col(Payments::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_tenant")
                    .table(Payments::Table)
                    .col(Payments::TenantId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    TenantId,
    LandlordId,
    PropertyId,
    AgreementId,
    PaymentType,
    Status,
    PaymentReference,
    Amount,
    PaymentDate,
    DueDate,
    ProcessedAt,
    Method,
    TransactionId,
    CardLastFour,
    BankAccountLastFour,
    PaymentDescription,
    LateFee,
    ProcessingFee,
    TotalAmount,
    FailureReason,
    RetryCount,
    NextRetryAt,
    Version,
    CreatedAt,
    UpdatedAt,
}
