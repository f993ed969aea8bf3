//! Migration to create the properties and property_amenities tables
//!
//! Amenities live in their own table so "has any of these amenities"
//! stays a relational query instead of a JSON scan.

use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(pk_auto(Properties::Id))
                    .col(string(Properties::Title))
                    .col(text(Properties::Description))
                    .col(string(Properties::Address))
                    .col(string(Properties::City))
                    .col(string(Properties::State))
                    .col(string(Properties::ZipCode))
                    .col(decimal_len(Properties::RentAmount, 12, 2))
                    .col(decimal_len(Properties::SecurityDeposit, 12, 2))
                    .col(integer(Properties::Bedrooms))
                    .col(integer(Properties::Bathrooms))
                    .col(integer(Properties::SquareFootage))
                    .col(string(Properties::PropertyType))
                    .col(string(Properties::FurnishingStatus))
                    .col(json(Properties::ImageUrls))
                    .col(timestamp_with_time_zone(Properties::AvailableDate))
                    .col(integer(Properties::LeaseTermMonths))
                    .col(boolean(Properties::PetsAllowed))
                    .col(boolean(Properties::SmokingAllowed))
                    .col(string(Properties::Status).default("AVAILABLE"))
                    .col(integer(Properties::LandlordId))
                    .col(double_null(Properties::Latitude))
                    .col(double_null(Properties::Longitude))
                    .col(timestamp_with_time_zone(Properties::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Properties::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_properties_landlord")
                            .from(Properties::Table, Properties::LandlordId)
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
                    .name("idx_properties_landlord")
                    .table(Properties::Table)
                    .col(Properties::LandlordId)
                    .to_owned(),
            )
            .await?;

        // Search filters always hit status first
        manager
            .create_index(
                Index::create()
                    .name("idx_properties_status_city")
                    .table(Properties::Table)
                    .col(Properties::Status)
                    .col(Properties::City)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PropertyAmenities::Table)
                    .if_not_exists()
                    .col(pk_auto(PropertyAmenities::Id))
                    .col(integer(PropertyAmenities::PropertyId))
                    .col(string(PropertyAmenities::Amenity))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_property_amenities_property")
                            .from(PropertyAmenities::Table, PropertyAmenities::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_property_amenities_amenity")
                    .table(PropertyAmenities::Table)
                    .col(PropertyAmenities::Amenity)
                    .col(PropertyAmenities::PropertyId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PropertyAmenities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Properties {
    Table,
    Id,
    Title,
    Description,
    Address,
    City,
    State,
    ZipCode,
    RentAmount,
    SecurityDeposit,
    Bedrooms,
    Bathrooms,
    SquareFootage,
    PropertyType,
    FurnishingStatus,
    ImageUrls,
    AvailableDate,
    LeaseTermMonths,
    PetsAllowed,
    SmokingAllowed,
    Status,
    LandlordId,
    Latitude,
    Longitude,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PropertyAmenities {
    Table,
    Id,
    PropertyId,
    Amenity,
}
