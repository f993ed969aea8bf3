//! Agreement request models

use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Deserialize;

use crate::entities::agreements::AgreementStatus;
use crate::models::patch::Patch;
use crate::models::property::{ensure_positive, ensure_positive_int};

fn validate_due_day(day: i32) -> Result<(), String> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err("paymentDueDay must be between 1 and 31".to_string())
    }
}

fn validate_non_negative(field: &str, value: Decimal) -> Result<(), String> {
    if value < Decimal::ZERO {
        Err(format!("{field} cannot be negative"))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgreementRequest {
    /// Tenant and property are taken from the application
    pub application_id: i32,
    /// Generated when omitted
    pub agreement_number: Option<String>,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub rent_amount: Decimal,
    pub security_deposit: Decimal,
    pub lease_term_months: i32,
    pub payment_due_day: i32,
    #[serde(default)]
    pub late_fee: Decimal,
    #[serde(default)]
    pub pet_deposit: Decimal,
    #[serde(default)]
    pub utilities_included: bool,
    pub utilities_details: Option<String>,
    #[serde(default)]
    pub maintenance_responsibility: String,
    #[serde(default)]
    pub pet_policy: String,
    #[serde(default)]
    pub smoking_policy: String,
    #[serde(default)]
    pub guest_policy: String,
}

impl CreateAgreementRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.end_date <= self.start_date {
            return Err("endDate must be after startDate".to_string());
        }
        ensure_positive("rentAmount", self.rent_amount)?;
        ensure_positive("securityDeposit", self.security_deposit)?;
        ensure_positive_int("leaseTermMonths", self.lease_term_months)?;
        validate_due_day(self.payment_due_day)?;
        validate_non_negative("lateFee", self.late_fee)?;
        validate_non_negative("petDeposit", self.pet_deposit)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateAgreementRequest {
    pub start_date: Patch<DateTimeWithTimeZone>,
    pub end_date: Patch<DateTimeWithTimeZone>,
    pub rent_amount: Patch<Decimal>,
    pub security_deposit: Patch<Decimal>,
    pub lease_term_months: Patch<i32>,
    pub payment_due_day: Patch<i32>,
    pub late_fee: Patch<Decimal>,
    pub pet_deposit: Patch<Decimal>,
    pub utilities_included: Patch<bool>,
    pub utilities_details: Patch<String>,
    pub maintenance_responsibility: Patch<String>,
    pub pet_policy: Patch<String>,
    pub smoking_policy: Patch<String>,
    pub guest_policy: Patch<String>,
}

impl UpdateAgreementRequest {
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
        if let Some(v) = self.payment_due_day.value() {
            validate_due_day(*v)?;
        }
        if let Some(v) = self.late_fee.value() {
            validate_non_negative("lateFee", *v)?;
        }
        if let Some(v) = self.pet_deposit.value() {
            validate_non_negative("petDeposit", *v)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgreementStatusRequest {
    pub status: AgreementStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignRequest {
    /// Free-form signature text (typed name, image reference, ...)
    pub signature: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminateRequest {
    pub reason: String,
    /// Defaults to now
    pub termination_date: Option<DateTimeWithTimeZone>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringAgreementsQuery {
    /// Active agreements ending on or before this instant; default 30 days out
    pub before: Option<DateTimeWithTimeZone>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> serde_json::Value {
        json!({
            "applicationId": 1,
            "startDate": "2026-03-01T00:00:00Z",
            "endDate": "2027-02-28T00:00:00Z",
            "rentAmount": "1500",
            "securityDeposit": "1500",
            "leaseTermMonths": 12,
            "paymentDueDay": 1
        })
    }

    #[test]
    fn test_defaults_and_validation() {
        let req: CreateAgreementRequest = serde_json::from_value(body()).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.late_fee, Decimal::ZERO);
        assert!(req.agreement_number.is_none());
    }

    #[test]
    fn test_end_must_follow_start() {
        let mut b = body();
        b["endDate"] = json!("2026-03-01T00:00:00Z");
        let req: CreateAgreementRequest = serde_json::from_value(b).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_due_day_range() {
        let mut b = body();
        b["paymentDueDay"] = json!(32);
        let req: CreateAgreementRequest = serde_json::from_value(b).unwrap();
        assert!(req.validate().is_err());
    }
}
