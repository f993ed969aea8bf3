//! Migration to create the listings table

use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_users::Users;
use super::m20250301_000002_create_properties::Properties;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(pk_auto(Listings::Id))
                    .col(string(Listings::Title))
                    .col(text(Listings::Description))
                    .col(decimal_len(Listings::RentAmount, 12, 2))
                    .col(decimal_len(Listings::SecurityDeposit, 12, 2))
                    .col(timestamp_with_time_zone(Listings::AvailableDate))
                    .col(integer(Listings::LeaseTermMonths))
                    .col(string(Listings::Status).default("ACTIVE"))
                    .col(string(Listings::ListingType).default("RENT"))
                    .col(integer(Listings::PropertyId))
                    .col(integer(Listings::LandlordId))
                    .col(timestamp_with_time_zone_null(Listings::ExpiresAt))
                    .col(timestamp_with_time_zone_null(Listings::FeaturedUntil))
                    .col(boolean(Listings::IsFeatured).default(false))
                    .col(integer(Listings::ViewCount).default(0))
                    .col(timestamp_with_time_zone(Listings::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Listings::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listings_property")
                            .from(Listings::Table, Listings::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listings_landlord")
                            .from(Listings::Table, Listings::LandlordId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_status_rent")
                    .table(Listings::Table)
                    .col(Listings::Status)
                    .col(Listings::RentAmount)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_property")
                    .table(Listings::Table)
                    .col(Listings::PropertyId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Listings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Listings {
    Table,
    Id,
    Title,
    Description,
    RentAmount,
    SecurityDeposit,
    AvailableDate,
    LeaseTermMonths,
    Status,
    ListingType,
    PropertyId,
    LandlordId,
    ExpiresAt,
    FeaturedUntil,
    IsFeatured,
    ViewCount,
    CreatedAt,
    UpdatedAt,
}
