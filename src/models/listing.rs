//! Listing request/response models

use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::entities::listings::{ListingStatus, ListingType};
use crate::models::patch::Patch;
use crate::models::property::{ensure_not_blank, ensure_positive, ensure_positive_int};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub property_id: i32,
    pub title: String,
    pub description: String,
    pub rent_amount: Decimal,
    pub security_deposit: Decimal,
    pub available_date: DateTimeWithTimeZone,
    pub lease_term_months: i32,
    /// Defaults to RENT
    #[serde(rename = "type")]
    pub listing_type: Option<ListingType>,
    pub expires_at: Option<DateTimeWithTimeZone>,
    pub featured_until: Option<DateTimeWithTimeZone>,
    #[serde(default)]
    pub is_featured: bool,
}

impl CreateListingRequest {
    pub fn validate(&self) -> Result<(), String> {
        ensure_not_blank("title", &self.title)?;
        ensure_positive("rentAmount", self.rent_amount)?;
        ensure_positive("securityDeposit", self.security_deposit)?;
        ensure_positive_int("leaseTermMonths", self.lease_term_months)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateListingRequest {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub rent_amount: Patch<Decimal>,
    pub security_deposit: Patch<Decimal>,
    pub available_date: Patch<DateTimeWithTimeZone>,
    pub lease_term_months: Patch<i32>,
    pub status: Patch<ListingStatus>,
    #[serde(rename = "type")]
    pub listing_type: Patch<ListingType>,
    pub expires_at: Patch<DateTimeWithTimeZone>,
    pub featured_until: Patch<DateTimeWithTimeZone>,
    pub is_featured: Patch<bool>,
}

impl UpdateListingRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(v) = self.rent_amount.value() {
            ensure_positive("rentAmount", *v)?;
        }
        if let Some(v) = self.security_deposit.value() {
            ensure_positive("securityDeposit", *v)?;
        }
        if let Some(v) = self.lease_term_months.value() {
            ensure_positive_int("leaseTermMonths", *v)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingStatusRequest {
    pub status: ListingStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedRequest {
    pub featured: bool,
    /// Only meaningful when `featured` is true
    pub featured_until: Option<DateTimeWithTimeZone>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingAnalyticsQuery {
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingAnalytics {
    pub total: u64,
    pub active: u64,
    pub featured: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_in_city: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_field_name() {
        let req: CreateListingRequest = serde_json::from_str(
            r#"{
                "propertyId": 1, "title": "Loft", "description": "", "rentAmount": 1500,
                "securityDeposit": 1500, "availableDate": "2026-03-01T00:00:00Z",
                "leaseTermMonths": 12, "type": "SUBLET"
            }"#,
        )
        .unwrap();
        assert_eq!(req.listing_type, Some(ListingType::Sublet));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_rejects_zero_deposit() {
        let req: UpdateListingRequest = serde_json::from_str(r#"{"securityDeposit": "0.00"}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
