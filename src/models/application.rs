//! Application request/response models

use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::entities::applications::ApplicationStatus;
use crate::models::patch::Patch;
use crate::models::property::{ensure_positive, ensure_positive_int};
use crate::models::user::validate_credit_score;

fn validate_household(pets_count: i32, occupants_count: i32) -> Result<(), String> {
    if pets_count < 0 {
        return Err("petsCount cannot be negative".to_string());
    }
    if occupants_count < 1 {
        return Err("occupantsCount must be at least 1".to_string());
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub listing_id: i32,
    /// Taken from the listing when omitted; must match it otherwise
    pub property_id: Option<i32>,
    /// Admins may file on behalf of a tenant
    pub tenant_id: Option<i32>,
    pub cover_letter: String,
    pub monthly_income: Decimal,
    pub employment_status: String,
    pub employer_name: String,
    pub employer_phone: String,
    pub rental_history: String,
    pub credit_score: i32,
    #[serde(default)]
    pub pets_count: i32,
    pub pet_types: Option<String>,
    #[serde(default = "one")]
    pub occupants_count: i32,
    pub move_in_date: DateTimeWithTimeZone,
    pub lease_term_preference: i32,
    pub application_fee: Option<Decimal>,
}

fn one() -> i32 {
    1
}

impl CreateApplicationRequest {
    pub fn validate(&self) -> Result<(), String> {
        ensure_positive("monthlyIncome", self.monthly_income)?;
        validate_credit_score(self.credit_score)?;
        validate_household(self.pets_count, self.occupants_count)?;
        ensure_positive_int("leaseTermPreference", self.lease_term_preference)?;
        if let Some(fee) = self.application_fee {
            if fee < Decimal::ZERO {
                return Err("applicationFee cannot be negative".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateApplicationRequest {
    pub cover_letter: Patch<String>,
    pub monthly_income: Patch<Decimal>,
    pub employment_status: Patch<String>,
    pub employer_name: Patch<String>,
    pub employer_phone: Patch<String>,
    pub rental_history: Patch<String>,
    pub credit_score: Patch<i32>,
    pub pets_count: Patch<i32>,
    pub pet_types: Patch<String>,
    pub occupants_count: Patch<i32>,
    pub move_in_date: Patch<DateTimeWithTimeZone>,
    pub lease_term_preference: Patch<i32>,
    pub application_fee: Patch<Decimal>,
}

impl UpdateApplicationRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(v) = self.monthly_income.value() {
            ensure_positive("monthlyIncome", *v)?;
        }
        if let Some(v) = self.credit_score.value() {
            validate_credit_score(*v)?;
        }
        validate_household(
            self.pets_count.value().copied().unwrap_or(0),
            self.occupants_count.value().copied().unwrap_or(1),
        )?;
        if let Some(v) = self.lease_term_preference.value() {
            ensure_positive_int("leaseTermPreference", *v)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationStatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub status: ApplicationStatus,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditScoreRangeQuery {
    pub min_score: i32,
    pub max_score: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRangeQuery {
    pub min_income: Decimal,
    pub max_income: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithPetsQuery {
    /// Defaults to 1
    pub min_pets_count: Option<i32>,
}

/// Outcome of the pre-review checks on a stored application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationValidation {
    pub valid: bool,
    pub problems: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationAnalytics {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub overdue: u64,
    pub with_pets: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> CreateApplicationRequest {
        CreateApplicationRequest {
            listing_id: 1,
            property_id: None,
            tenant_id: None,
            cover_letter: "Quiet tenant".into(),
            monthly_income: dec!(5000),
            employment_status: "EMPLOYED".into(),
            employer_name: "Acme".into(),
            employer_phone: "555-0100".into(),
            rental_history: "None".into(),
            credit_score: 700,
            pets_count: 0,
            pet_types: None,
            occupants_count: 1,
            move_in_date: "2026-03-01T00:00:00Z".parse().unwrap(),
            lease_term_preference: 12,
            application_fee: None,
        }
    }

    #[test]
    fn test_credit_score_bounds() {
        let mut req = request();
        req.credit_score = 300;
        assert!(req.validate().is_ok());
        req.credit_score = 850;
        assert!(req.validate().is_ok());
        req.credit_score = 299;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_household_rules() {
        let mut req = request();
        req.occupants_count = 0;
        assert!(req.validate().is_err());
        req.occupants_count = 2;
        req.pets_count = -1;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_occupants_default_to_one() {
        let req: CreateApplicationRequest = serde_json::from_str(
            r#"{
                "listingId": 3, "coverLetter": "", "monthlyIncome": "4000",
                "employmentStatus": "EMPLOYED", "employerName": "Acme", "employerPhone": "1",
                "rentalHistory": "", "creditScore": 680,
                "moveInDate": "2026-03-01T00:00:00Z", "leaseTermPreference": 12
            }"#,
        )
        .unwrap();
        assert_eq!(req.occupants_count, 1);
        assert_eq!(req.pets_count, 0);
    }
}
