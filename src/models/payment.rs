//! Payment request/response models

use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::entities::payments::{PaymentMethod, PaymentStatus, PaymentType};
use crate::models::patch::Patch;
use crate::models::property::ensure_positive;

fn validate_last_four(field: &str, value: &str) -> Result<(), String> {
    if value.len() == 4 && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(format!("{field} must be exactly 4 digits"))
    }
}

fn validate_fee(field: &str, value: Decimal) -> Result<(), String> {
    if value < Decimal::ZERO {
        Err(format!("{field} cannot be negative"))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub property_id: i32,
    /// Defaults to the caller for tenants
    pub tenant_id: Option<i32>,
    pub agreement_id: Option<i32>,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    /// Generated when omitted
    pub payment_reference: Option<String>,
    pub amount: Decimal,
    pub payment_date: DateTimeWithTimeZone,
    pub due_date: DateTimeWithTimeZone,
    pub method: Option<PaymentMethod>,
    pub transaction_id: Option<String>,
    pub card_last_four: Option<String>,
    pub bank_account_last_four: Option<String>,
    pub payment_description: Option<String>,
    #[serde(default)]
    pub late_fee: Decimal,
    #[serde(default)]
    pub processing_fee: Decimal,
    /// Defaults to amount + lateFee + processingFee
    pub total_amount: Option<Decimal>,
}

impl CreatePaymentRequest {
    pub fn validate(&self) -> Result<(), String> {
        ensure_positive("amount", self.amount)?;
        validate_fee("lateFee", self.late_fee)?;
        validate_fee("processingFee", self.processing_fee)?;
        if let Some(total) = self.total_amount {
            ensure_positive("totalAmount", total)?;
        }
        if let Some(v) = &self.card_last_four {
            validate_last_four("cardLastFour", v)?;
        }
        if let Some(v) = &self.bank_account_last_four {
            validate_last_four("bankAccountLastFour", v)?;
        }
        Ok(())
    }

    pub fn total(&self) -> Decimal {
        self.total_amount
            .unwrap_or(self.amount + self.late_fee + self.processing_fee)
    }
}

/// Versioned update: `version` must be the value last read and is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    pub version: i64,
    #[serde(rename = "type", default)]
    pub payment_type: Patch<PaymentType>,
    #[serde(default)]
    pub amount: Patch<Decimal>,
    #[serde(default)]
    pub payment_date: Patch<DateTimeWithTimeZone>,
    #[serde(default)]
    pub due_date: Patch<DateTimeWithTimeZone>,
    #[serde(default)]
    pub method: Patch<PaymentMethod>,
    #[serde(default)]
    pub transaction_id: Patch<String>,
    #[serde(default)]
    pub card_last_four: Patch<String>,
    #[serde(default)]
    pub bank_account_last_four: Patch<String>,
    #[serde(default)]
    pub payment_description: Patch<String>,
    #[serde(default)]
    pub late_fee: Patch<Decimal>,
    #[serde(default)]
    pub processing_fee: Patch<Decimal>,
    #[serde(default)]
    pub total_amount: Patch<Decimal>,
    #[serde(default)]
    pub agreement_id: Patch<i32>,
}

impl UpdatePaymentRequest {
    /// New total when amount or a fee changes and no explicit total is sent.
    /// Components missing from the patch keep their stored values.
    pub fn recomputed_total(
        &self,
        amount: Decimal,
        late_fee: Decimal,
        processing_fee: Decimal,
    ) -> Option<Decimal> {
        if !self.total_amount.is_absent() {
            return None;
        }
        if self.amount.is_absent() && self.late_fee.is_absent() && self.processing_fee.is_absent() {
            return None;
        }
        Some(
            self.amount.value().copied().unwrap_or(amount)
                + self.late_fee.value().copied().unwrap_or(late_fee)
                + self.processing_fee.value().copied().unwrap_or(processing_fee),
        )
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(v) = self.amount.value() {
            ensure_positive("amount", *v)?;
        }
        if let Some(v) = self.total_amount.value() {
            ensure_positive("totalAmount", *v)?;
        }
        if let Some(v) = self.late_fee.value() {
            validate_fee("lateFee", *v)?;
        }
        if let Some(v) = self.processing_fee.value() {
            validate_fee("processingFee", *v)?;
        }
        if let Some(v) = self.card_last_four.value() {
            validate_last_four("cardLastFour", v)?;
        }
        if let Some(v) = self.bank_account_last_four.value() {
            validate_last_four("bankAccountLastFour", v)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    pub status: PaymentStatus,
    pub version: i64,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailureRequest {
    pub version: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsQuery {
    pub tenant_id: Option<i32>,
    pub landlord_id: Option<i32>,
    pub property_id: Option<i32>,
    /// Defaults to COMPLETED
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTotals {
    pub status: PaymentStatus,
    pub count: u64,
    pub total_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_total_defaults_to_amount_plus_fees() {
        let req: CreatePaymentRequest = serde_json::from_value(json!({
            "propertyId": 1,
            "type": "RENT",
            "amount": "1500.00",
            "lateFee": "50.00",
            "processingFee": "2.50",
            "paymentDate": "2026-03-01T00:00:00Z",
            "dueDate": "2026-03-01T00:00:00Z"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.total(), dec!(1552.50));
    }

    #[test]
    fn test_last_four_must_be_digits() {
        let req: UpdatePaymentRequest =
            serde_json::from_value(json!({"version": 0, "cardLastFour": "12a4"})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_version_is_required() {
        let missing = serde_json::from_value::<UpdatePaymentRequest>(json!({"amount": "10"}));
        assert!(missing.is_err());

        let req: UpdatePaymentRequest = serde_json::from_value(json!({"version": 3})).unwrap();
        assert_eq!(req.version, 3);
        assert!(req.amount.is_absent());
    }

    #[test]
    fn test_total_follows_changed_components() {
        let req: UpdatePaymentRequest =
            serde_json::from_value(json!({"version": 0, "amount": "1600"})).unwrap();
        assert_eq!(
            req.recomputed_total(dec!(1500), dec!(50), dec!(2.50)),
            Some(dec!(1652.50))
        );

        let explicit: UpdatePaymentRequest =
            serde_json::from_value(json!({"version": 0, "amount": "1600", "totalAmount": "1600"}))
                .unwrap();
        assert_eq!(explicit.recomputed_total(dec!(1500), dec!(0), dec!(0)), None);

        let untouched: UpdatePaymentRequest =
            serde_json::from_value(json!({"version": 0, "method": "CASH"})).unwrap();
        assert_eq!(untouched.recomputed_total(dec!(1500), dec!(0), dec!(0)), None);
    }
}
