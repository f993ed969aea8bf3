//! Lookups shared by the services.

use chrono::{Duration, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, prelude::DateTimeWithTimeZone};

use crate::entities::{prelude::*, properties, users};
use crate::error::ApiError;

pub fn now() -> DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

pub fn days_from_now(days: i64) -> DateTimeWithTimeZone {
    now() + Duration::days(days)
}

/// A user referenced by another record. Missing is a validation failure,
/// not a 404: the request itself is malformed.
pub async fn referenced_user(db: &DatabaseConnection, id: i32) -> Result<users::Model, ApiError> {
    Users::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::Validation(format!("User {id} does not exist")))
}

pub async fn referenced_property(db: &DatabaseConnection, id: i32) -> Result<properties::Model, ApiError> {
    Properties::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::Validation(format!("Property {id} does not exist")))
}

/// Generate a unique-looking business reference such as `AGR-3F9C1A7B2D4E`.
pub fn business_reference(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{prefix}-{}", &id[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_reference_shape() {
        let reference = business_reference("PAY");
        assert!(reference.starts_with("PAY-"));
        assert_eq!(reference.len(), 16);
        assert_ne!(reference, business_reference("PAY"));
    }

    #[test]
    fn test_now_is_utc() {
        assert_eq!(now().offset().local_minus_utc(), 0);
    }
}
