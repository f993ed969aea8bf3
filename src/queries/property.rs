//! Property filters

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, QueryTrait,
    prelude::{DateTimeWithTimeZone, Decimal},
};
use serde::Deserialize;

use crate::entities::properties::{self, PropertyStatus};
use crate::entities::{prelude::*, property_amenities};
use crate::queries::params::comma_separated;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilter {
    pub landlord_id: Option<i32>,
    pub status: Option<PropertyStatus>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub property_type: Option<String>,
    pub furnishing_status: Option<String>,
    pub min_rent: Option<Decimal>,
    pub max_rent: Option<Decimal>,
    /// Exact bedroom count
    pub bedrooms: Option<i32>,
    pub min_bedrooms: Option<i32>,
    /// Exact bathroom count
    pub bathrooms: Option<i32>,
    pub min_bathrooms: Option<i32>,
    pub pets_allowed: Option<bool>,
    pub smoking_allowed: Option<bool>,
    pub lease_term_months: Option<i32>,
    /// Available on or before this instant
    pub available_before: Option<DateTimeWithTimeZone>,
    /// Match properties having any of these amenities
    #[serde(default, deserialize_with = "comma_separated")]
    pub amenities: Option<Vec<String>>,
}

impl PropertyFilter {
    pub fn condition(&self) -> Condition {
        use properties::Column;

        Condition::all()
            .add_option(self.landlord_id.map(|v| Column::LandlordId.eq(v)))
            .add_option(self.status.map(|v| Column::Status.eq(v)))
            .add_option(self.city.clone().map(|v| Column::City.eq(v)))
            .add_option(self.state.clone().map(|v| Column::State.eq(v)))
            .add_option(self.property_type.clone().map(|v| Column::PropertyType.eq(v)))
            .add_option(self.furnishing_status.clone().map(|v| Column::FurnishingStatus.eq(v)))
            .add_option(self.min_rent.map(|v| Column::RentAmount.gte(v)))
            .add_option(self.max_rent.map(|v| Column::RentAmount.lte(v)))
            .add_option(self.bedrooms.map(|v| Column::Bedrooms.eq(v)))
            .add_option(self.min_bedrooms.map(|v| Column::Bedrooms.gte(v)))
            .add_option(self.bathrooms.map(|v| Column::Bathrooms.eq(v)))
            .add_option(self.min_bathrooms.map(|v| Column::Bathrooms.gte(v)))
            .add_option(self.pets_allowed.map(|v| Column::PetsAllowed.eq(v)))
            .add_option(self.smoking_allowed.map(|v| Column::SmokingAllowed.eq(v)))
            .add_option(self.lease_term_months.map(|v| Column::LeaseTermMonths.eq(v)))
            .add_option(self.available_before.map(|v| Column::AvailableDate.lte(v)))
            .add_option(self.amenities.as_deref().map(with_any_amenity))
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.condition().is_empty()
    }
}

/// `properties.id IN (SELECT property_id FROM property_amenities WHERE amenity IN (..))`
pub fn with_any_amenity(amenities: &[String]) -> Condition {
    let subquery = PropertyAmenities::find()
        .select_only()
        .column(property_amenities::Column::PropertyId)
        .filter(property_amenities::Column::Amenity.is_in(amenities.iter().cloned()))
        .into_query();

    Condition::all().add(properties::Column::Id.in_subquery(subquery))
}

pub async fn count(db: &DatabaseConnection, filter: &PropertyFilter) -> Result<u64, sea_orm::DbErr> {
    Properties::find().filter(filter.condition()).count(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::DbBackend;

    fn sql(filter: &PropertyFilter) -> String {
        Properties::find()
            .filter(filter.condition())
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_empty_filter_adds_no_predicate() {
        let filter = PropertyFilter::default();
        assert!(filter.is_empty());

        let sql = sql(&filter);
        let tail = sql.split(r#"FROM "properties""#).nth(1).unwrap_or_default();
        for column in ["landlord_id", "status", "city", "rent_amount", "bedrooms", "property_amenities"] {
            assert!(!tail.contains(column), "{sql}");
        }
    }

    #[test]
    fn test_rent_range_is_inclusive() {
        let filter = PropertyFilter {
            min_rent: Some(dec!(1000)),
            max_rent: Some(dec!(2000)),
            ..Default::default()
        };
        let sql = sql(&filter);
        assert!(sql.contains(r#""rent_amount" >= 1000"#), "{sql}");
        assert!(sql.contains(r#""rent_amount" <= 2000"#), "{sql}");
    }

    #[test]
    fn test_amenities_use_subquery() {
        let filter = PropertyFilter {
            amenities: Some(vec!["pool".into(), "gym".into()]),
            ..Default::default()
        };
        let sql = sql(&filter);
        assert!(sql.contains("IN (SELECT"), "{sql}");
        assert!(sql.contains("property_amenities"), "{sql}");
    }
}
