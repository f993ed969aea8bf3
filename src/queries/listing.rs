//! Listing filters
//!
//! Property attributes (city, bedrooms, amenities, ...) are matched through a
//! subquery on `properties`, so a listing row is never duplicated by a join.

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, QueryTrait,
    prelude::{DateTimeWithTimeZone, Decimal},
};
use serde::Deserialize;

use crate::entities::listings::{self, ListingStatus, ListingType};
use crate::entities::{prelude::*, properties};
use crate::queries::params::comma_separated;
use crate::queries::property::PropertyFilter;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFilter {
    pub landlord_id: Option<i32>,
    pub property_id: Option<i32>,
    pub status: Option<ListingStatus>,
    #[serde(rename = "type")]
    pub listing_type: Option<ListingType>,
    pub featured: Option<bool>,
    pub min_rent: Option<Decimal>,
    pub max_rent: Option<Decimal>,
    pub lease_term_months: Option<i32>,
    pub expires_before: Option<DateTimeWithTimeZone>,

    // Matched on the listed property
    pub city: Option<String>,
    pub state: Option<String>,
    pub property_type: Option<String>,
    pub furnishing_status: Option<String>,
    pub bedrooms: Option<i32>,
    pub min_bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub min_bathrooms: Option<i32>,
    pub pets_allowed: Option<bool>,
    pub smoking_allowed: Option<bool>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub amenities: Option<Vec<String>>,
}

impl ListingFilter {
    /// Public searches only see ACTIVE listings unless a status is asked for.
    pub fn active_by_default(self) -> Self {
        Self {
            status: self.status.or(Some(ListingStatus::Active)),
            ..self
        }
    }

    pub fn condition(&self) -> Condition {
        use listings::Column;

        Condition::all()
            .add_option(self.landlord_id.map(|v| Column::LandlordId.eq(v)))
            .add_option(self.property_id.map(|v| Column::PropertyId.eq(v)))
            .add_option(self.status.map(|v| Column::Status.eq(v)))
            .add_option(self.listing_type.map(|v| Column::ListingType.eq(v)))
            .add_option(self.featured.map(|v| Column::IsFeatured.eq(v)))
            .add_option(self.min_rent.map(|v| Column::RentAmount.gte(v)))
            .add_option(self.max_rent.map(|v| Column::RentAmount.lte(v)))
            .add_option(self.lease_term_months.map(|v| Column::LeaseTermMonths.eq(v)))
            .add_option(self.expires_before.map(|v| Column::ExpiresAt.lte(v)))
            .add_option(self.property_condition())
    }

    fn property_filter(&self) -> PropertyFilter {
        PropertyFilter {
            city: self.city.clone(),
            state: self.state.clone(),
            property_type: self.property_type.clone(),
            furnishing_status: self.furnishing_status.clone(),
            bedrooms: self.bedrooms,
            min_bedrooms: self.min_bedrooms,
            bathrooms: self.bathrooms,
            min_bathrooms: self.min_bathrooms,
            pets_allowed: self.pets_allowed,
            smoking_allowed: self.smoking_allowed,
            amenities: self.amenities.clone(),
            ..Default::default()
        }
    }

    fn property_condition(&self) -> Option<Condition> {
        let property = self.property_filter();
        if property.is_empty() {
            return None;
        }

        let subquery = Properties::find()
            .select_only()
            .column(properties::Column::Id)
            .filter(property.condition())
            .into_query();

        Some(Condition::all().add(listings::Column::PropertyId.in_subquery(subquery)))
    }
}

pub async fn count(db: &DatabaseConnection, filter: &ListingFilter) -> Result<u64, sea_orm::DbErr> {
    Listings::find().filter(filter.condition()).count(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbBackend;

    #[test]
    fn test_own_fields_do_not_touch_properties() {
        let filter = ListingFilter {
            status: Some(ListingStatus::Active),
            ..Default::default()
        };
        let sql = Listings::find()
            .filter(filter.condition())
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#""status" = 'ACTIVE'"#), "{sql}");
        assert!(!sql.contains("properties"), "{sql}");
    }

    #[test]
    fn test_active_by_default_keeps_explicit_status() {
        let defaulted = ListingFilter::default().active_by_default();
        assert_eq!(defaulted.status, Some(ListingStatus::Active));

        let explicit = ListingFilter {
            status: Some(ListingStatus::Expired),
            ..Default::default()
        }
        .active_by_default();
        assert_eq!(explicit.status, Some(ListingStatus::Expired));
    }

    #[test]
    fn test_property_fields_become_subquery() {
        let filter = ListingFilter {
            city: Some("Austin".into()),
            min_bedrooms: Some(2),
            ..Default::default()
        };
        let sql = Listings::find()
            .filter(filter.condition())
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#""property_id" IN (SELECT "properties"."id" FROM "properties""#), "{sql}");
        assert!(sql.contains("'Austin'"), "{sql}");
    }
}
