//! Migration to create the agreements (lease contracts) table

use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_users::Users;
use super::m20250301_000002_create_properties::Properties;
use super::m20250302_000001_create_applications::Applications;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Agreements::Table)
                    .if_not_exists()
                    .col(pk_auto(Agreements::Id))
                    .col(integer(Agreements::TenantId))
                    .col(integer(Agreements::LandlordId))
                    .col(integer(Agreements::PropertyId))
                    .col(integer(Agreements::ApplicationId))
                    .col(string(Agreements::Status).default("DRAFT"))
                    .col(string_uniq(Agreements::AgreementNumber))
                    .col(timestamp_with_time_zone(Agreements::StartDate))
                    .col(timestamp_with_time_zone(Agreements::EndDate))
                    .col(decimal_len(Agreements::RentAmount, 12, 2))
                    .col(decimal_len(Agreements::SecurityDeposit, 12, 2))
                    .col(integer(Agreements::LeaseTermMonths))
                    .col(integer(Agreements::PaymentDueDay))
                    .col(decimal_len(Agreements::LateFee, 12, 2))
                    .col(decimal_len(Agreements::PetDeposit, 12, 2))
                    .col(boolean(Agreements::UtilitiesIncluded))
                    .col(text_null(Agreements::UtilitiesDetails))
                    .col(text(Agreements::MaintenanceResponsibility))
                    .col(text(Agreements::PetPolicy))
                    .col(text(Agreements::SmokingPolicy))
                    .col(text(Agreements::GuestPolicy))
                    .col(timestamp_with_time_zone_null(Agreements::SignedAt))
                    .col(boolean(Agreements::SignedByTenant).default(false))
                    .col(boolean(Agreements::SignedByLandlord).default(false))
                    .col(text_null(Agreements::TenantSignature))
                    .col(text_null(Agreements::LandlordSignature))
                    .col(timestamp_with_time_zone_null(Agreements::EffectiveDate))
                    .col(timestamp_with_time_zone_null(Agreements::TerminationDate))
                    .col(text_null(Agreements::TerminationReason))
                    .col(timestamp_with_time_zone(Agreements::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Agreements::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_agreements_tenant")
                            .from(Agreements::Table, Agreements::TenantId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_agreements_landlord")
                            .from(Agreements::Table, Agreements::LandlordId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_agreements_property")
                            .from(Agreements::Table, Agreements::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_agreements_application")
                            .from(Agreements::Table, Agreements::ApplicationId)
                            .to(Applications::Table, Applications::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Expiry and renewal lookups scan ACTIVE agreements by end date
        manager
            .create_index(
                Index::create()
                    .name("idx_agreements_status_end_date")
                    .table(Agreements::Table)
                    .col(Agreements::Status)
                    .col(Agreements::EndDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Agreements::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Agreements {
    Table,
    Id,
    TenantId,
    LandlordId,
    PropertyId,
    ApplicationId,
    Status,
    AgreementNumber,
    StartDate,
    EndDate,
    RentAmount,
    SecurityDeposit,
    LeaseTermMonths,
    PaymentDueDay,
    LateFee,
    PetDeposit,
    UtilitiesIncluded,
    UtilitiesDetails,
    MaintenanceResponsibility,
    PetPolicy,
    SmokingPolicy,
    GuestPolicy,
    SignedAt,
    SignedByTenant,
    SignedByLandlord,
    TenantSignature,
    LandlordSignature,
    EffectiveDate,
    TerminationDate,
    TerminationReason,
    CreatedAt,
    UpdatedAt,
}
