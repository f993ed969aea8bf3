//! SeaORM Entity for rental properties
//!
//! Amenities are stored in `property_amenities`; image URLs are a JSON
//! array on the row itself.

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    #[sea_orm(string_value = "AVAILABLE")]
    Available,
    #[sea_orm(string_value = "RENTED")]
    Rented,
    #[sea_orm(string_value = "UNDER_MAINTENANCE")]
    UnderMaintenance,
    #[sea_orm(string_value = "OFF_MARKET")]
    OffMarket,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "properties")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub rent_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub security_deposit: Decimal,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub square_footage: i32,
    /// APARTMENT, HOUSE, CONDO, ...
    pub property_type: String,
    /// FURNISHED, UNFURNISHED, PARTIALLY_FURNISHED
    pub furnishing_status: String,
    /// Image URLs as JSON array
    pub image_urls: Json,
    pub available_date: DateTimeWithTimeZone,
    pub lease_term_months: i32,
    pub pets_allowed: bool,
    pub smoking_allowed: bool,
    pub status: PropertyStatus,
    pub landlord_id: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::LandlordId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Landlord,
    #[sea_orm(has_many = "super::property_amenities::Entity")]
    Amenities,
    #[sea_orm(has_many = "super::listings::Entity")]
    Listings,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Landlord.def()
    }
}

impl Related<super::property_amenities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Amenities.def()
    }
}

impl Related<super::listings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listings.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().fixed_offset();
        if insert {
            self.created_at = Set(now);
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
