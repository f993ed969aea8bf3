//! Migration to create the applications table

use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_users::Users;
use super::m20250301_000002_create_properties::Properties;
use super::m20250301_000003_create_listings::Listings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Applications::Table)
                    .if_not_exists()
                    .col(pk_auto(Applications::Id))
                    .col(integer(Applications::TenantId))
                    .col(integer(Applications::PropertyId))
                    .col(integer(Applications::ListingId))
                    .col(string(Applications::Status).default("PENDING"))
                    .col(text(Applications::CoverLetter))
                    .col(decimal_len(Applications::MonthlyIncome, 12, 2))
                    .col(string(Applications::EmploymentStatus))
                    .col(string(Applications::EmployerName))
                    .col(string(Applications::EmployerPhone))
                    .col(text(Applications::RentalHistory))
                    .col(integer(Applications::CreditScore))
                    .col(integer(Applications::PetsCount).default(0))
                    .col(string_null(Applications::PetTypes))
                    .col(integer(Applications::OccupantsCount))
                    .col(timestamp_with_time_zone(Applications::MoveInDate))
                    .col(integer(Applications::LeaseTermPreference))
                    .col(timestamp_with_time_zone_null(Applications::ReviewedAt))
                    .col(integer_null(Applications::ReviewedBy))
                    .col(text_null(Applications::RejectionReason))
                    .col(decimal_len_null(Applications::ApplicationFee, 12, 2))
                    .col(boolean(Applications::FeePaid).default(false))
                    .col(timestamp_with_time_zone(Applications::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Applications::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_applications_tenant")
                            .from(Applications::Table, Applications::TenantId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_applications_property")
                            .from(Applications::Table, Applications::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_applications_listing")
                            .from(Applications::Table, Applications::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_applications_tenant")
                    .table(Applications::Table)
                    .col(Applications::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_applications_property_status")
                    .table(Applications::Table)
                    .col(Applications::PropertyId)
                    .col(Applications::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Applications::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Applications {
    Table,
    Id,
    TenantId,
    PropertyId,
    ListingId,
    Status,
    CoverLetter,
    MonthlyIncome,
    EmploymentStatus,
    EmployerName,
    EmployerPhone,
    RentalHistory,
    CreditScore,
    PetsCount,
    PetTypes,
    OccupantsCount,
    MoveInDate,
    LeaseTermPreference,
    ReviewedAt,
    ReviewedBy,
    RejectionReason,
    ApplicationFee,
    FeePaid,
    CreatedAt,
    UpdatedAt,
}
