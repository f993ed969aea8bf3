//! Property request/response models

use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::entities::properties::{self, PropertyStatus};
use crate::models::patch::Patch;

pub(crate) fn ensure_positive(field: &str, value: Decimal) -> Result<(), String> {
    if value > Decimal::ZERO {
        Ok(())
    } else {
        Err(format!("{field} must be positive"))
    }
}

pub(crate) fn ensure_positive_int(field: &str, value: i32) -> Result<(), String> {
    if value > 0 {
        Ok(())
    } else {
        Err(format!("{field} must be positive"))
    }
}

pub(crate) fn ensure_not_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be blank"))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub rent_amount: Decimal,
    pub security_deposit: Decimal,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub square_footage: i32,
    pub property_type: String,
    pub furnishing_status: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub available_date: DateTimeWithTimeZone,
    pub lease_term_months: i32,
    #[serde(default)]
    pub pets_allowed: bool,
    #[serde(default)]
    pub smoking_allowed: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Defaults to AVAILABLE
    pub status: Option<PropertyStatus>,
    /// Admins may create on behalf of a landlord
    pub landlord_id: Option<i32>,
}

impl CreatePropertyRequest {
    pub fn validate(&self) -> Result<(), String> {
        ensure_not_blank("title", &self.title)?;
        ensure_not_blank("address", &self.address)?;
        ensure_not_blank("city", &self.city)?;
        ensure_positive("rentAmount", self.rent_amount)?;
        ensure_positive("securityDeposit", self.security_deposit)?;
        ensure_positive_int("bedrooms", self.bedrooms)?;
        ensure_positive_int("bathrooms", self.bathrooms)?;
        ensure_positive_int("squareFootage", self.square_footage)?;
        ensure_positive_int("leaseTermMonths", self.lease_term_months)?;
        validate_coordinates(self.latitude, self.longitude)
    }
}

fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), String> {
    if let Some(lat) = latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err("latitude must be within -90..90".to_string());
        }
    }
    if let Some(lon) = longitude {
        if !(-180.0..=180.0).contains(&lon) {
            return Err("longitude must be within -180..180".to_string());
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePropertyRequest {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub address: Patch<String>,
    pub city: Patch<String>,
    pub state: Patch<String>,
    pub zip_code: Patch<String>,
    pub rent_amount: Patch<Decimal>,
    pub security_deposit: Patch<Decimal>,
    pub bedrooms: Patch<i32>,
    pub bathrooms: Patch<i32>,
    pub square_footage: Patch<i32>,
    pub property_type: Patch<String>,
    pub furnishing_status: Patch<String>,
    pub image_urls: Patch<Vec<String>>,
    /// Replaces the whole amenity set
    pub amenities: Patch<Vec<String>>,
    pub available_date: Patch<DateTimeWithTimeZone>,
    pub lease_term_months: Patch<i32>,
    pub pets_allowed: Patch<bool>,
    pub smoking_allowed: Patch<bool>,
    pub latitude: Patch<f64>,
    pub longitude: Patch<f64>,
    pub status: Patch<PropertyStatus>,
}

impl UpdatePropertyRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(v) = self.rent_amount.value() {
            ensure_positive("rentAmount", *v)?;
        }
        if let Some(v) = self.security_deposit.value() {
            ensure_positive("securityDeposit", *v)?;
        }
        if let Some(v) = self.bedrooms.value() {
            ensure_positive_int("bedrooms", *v)?;
        }
        if let Some(v) = self.bathrooms.value() {
            ensure_positive_int("bathrooms", *v)?;
        }
        if let Some(v) = self.square_footage.value() {
            ensure_positive_int("squareFootage", *v)?;
        }
        if let Some(v) = self.lease_term_months.value() {
            ensure_positive_int("leaseTermMonths", *v)?;
        }
        validate_coordinates(self.latitude.value().copied(), self.longitude.value().copied())
    }
}

/// Property row plus its amenities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    #[serde(flatten)]
    pub property: properties::Model,
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyStatusQuery {
    pub status: PropertyStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringQuery {
    /// Window in days; each endpoint has its own default
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAnalytics {
    pub total: u64,
    pub available: u64,
    pub rented: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> serde_json::Value {
        json!({
            "title": "Sunny loft",
            "description": "Top floor",
            "address": "1 Main St",
            "city": "Austin",
            "state": "TX",
            "zipCode": "78701",
            "rentAmount": "1500",
            "securityDeposit": "1500",
            "bedrooms": 2,
            "bathrooms": 1,
            "squareFootage": 900,
            "propertyType": "APARTMENT",
            "furnishingStatus": "UNFURNISHED",
            "availableDate": "2026-03-01T00:00:00Z",
            "leaseTermMonths": 12
        })
    }

    #[test]
    fn test_create_defaults() {
        let req: CreatePropertyRequest = serde_json::from_value(valid_body()).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.amenities.is_empty());
        assert!(!req.pets_allowed);
        assert!(req.status.is_none());
    }

    #[test]
    fn test_create_rejects_non_positive_rent() {
        let mut body = valid_body();
        body["rentAmount"] = json!("0");
        let req: CreatePropertyRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.validate().unwrap_err(), "rentAmount must be positive");
    }

    #[test]
    fn test_unknown_status_fails_to_parse() {
        let mut body = valid_body();
        body["status"] = json!("DEMOLISHED");
        assert!(serde_json::from_value::<CreatePropertyRequest>(body).is_err());
    }

    #[test]
    fn test_patch_validation() {
        let req: UpdatePropertyRequest = serde_json::from_str(r#"{"bedrooms": 0}"#).unwrap();
        assert!(req.validate().is_err());
        let req: UpdatePropertyRequest = serde_json::from_str(r#"{"latitude": null}"#).unwrap();
        assert!(req.validate().is_ok());
    }
}
