//! Payment filters and amount aggregates

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    prelude::{DateTimeWithTimeZone, Decimal},
};
use serde::Deserialize;

use crate::entities::payments::{self, PaymentMethod, PaymentStatus, PaymentType};
use crate::entities::prelude::*;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFilter {
    pub tenant_id: Option<i32>,
    pub landlord_id: Option<i32>,
    pub property_id: Option<i32>,
    pub agreement_id: Option<i32>,
    pub status: Option<PaymentStatus>,
    #[serde(rename = "type")]
    pub payment_type: Option<PaymentType>,
    pub method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    pub transaction_id: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub payment_from: Option<DateTimeWithTimeZone>,
    pub payment_to: Option<DateTimeWithTimeZone>,
    pub due_from: Option<DateTimeWithTimeZone>,
    pub due_to: Option<DateTimeWithTimeZone>,
    /// Strictly before
    pub due_before: Option<DateTimeWithTimeZone>,
    /// Strictly greater than
    pub min_retry_count: Option<i32>,
    pub next_retry_before: Option<DateTimeWithTimeZone>,
}

impl PaymentFilter {
    pub fn condition(&self) -> Condition {
        use payments::Column;

        Condition::all()
            .add_option(self.tenant_id.map(|v| Column::TenantId.eq(v)))
            .add_option(self.landlord_id.map(|v| Column::LandlordId.eq(v)))
            .add_option(self.property_id.map(|v| Column::PropertyId.eq(v)))
            .add_option(self.agreement_id.map(|v| Column::AgreementId.eq(v)))
            .add_option(self.status.map(|v| Column::Status.eq(v)))
            .add_option(self.payment_type.map(|v| Column::PaymentType.eq(v)))
            .add_option(self.method.map(|v| Column::Method.eq(v)))
            .add_option(self.payment_reference.clone().map(|v| Column::PaymentReference.eq(v)))
            .add_option(self.transaction_id.clone().map(|v| Column::TransactionId.eq(v)))
            .add_option(self.min_amount.map(|v| Column::Amount.gte(v)))
            .add_option(self.max_amount.map(|v| Column::Amount.lte(v)))
            .add_option(self.payment_from.map(|v| Column::PaymentDate.gte(v)))
            .add_option(self.payment_to.map(|v| Column::PaymentDate.lte(v)))
            .add_option(self.due_from.map(|v| Column::DueDate.gte(v)))
            .add_option(self.due_to.map(|v| Column::DueDate.lte(v)))
            .add_option(self.due_before.map(|v| Column::DueDate.lt(v)))
            .add_option(self.min_retry_count.map(|v| Column::RetryCount.gt(v)))
            .add_option(self.next_retry_before.map(|v| Column::NextRetryAt.lte(v)))
    }
}

pub async fn count(db: &DatabaseConnection, filter: &PaymentFilter) -> Result<u64, sea_orm::DbErr> {
    Payments::find().filter(filter.condition()).count(db).await
}

/// Sum of `amount` over the matching payments; zero when none match.
pub async fn sum_amount(db: &DatabaseConnection, filter: &PaymentFilter) -> Result<Decimal, sea_orm::DbErr> {
    let total: Option<Option<Decimal>> = Payments::find()
        .select_only()
        .column_as(payments::Column::Amount.sum(), "total")
        .filter(filter.condition())
        .into_tuple::<Option<Decimal>>()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_strict_bounds() {
        let sql = Payments::find()
            .filter(
                PaymentFilter {
                    min_retry_count: Some(2),
                    due_before: Some("2026-01-01T00:00:00Z".parse().unwrap()),
                    ..Default::default()
                }
                .condition(),
            )
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#""retry_count" > 2"#), "{sql}");
        assert!(sql.contains(r#""due_date" < "#), "{sql}");
    }
}
