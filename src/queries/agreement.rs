//! Agreement filters

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    prelude::{DateTimeWithTimeZone, Decimal},
};
use serde::Deserialize;

use crate::entities::agreements::{self, AgreementStatus};
use crate::entities::prelude::*;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementFilter {
    pub tenant_id: Option<i32>,
    pub landlord_id: Option<i32>,
    pub property_id: Option<i32>,
    pub application_id: Option<i32>,
    pub status: Option<AgreementStatus>,
    pub agreement_number: Option<String>,
    pub start_from: Option<DateTimeWithTimeZone>,
    pub start_to: Option<DateTimeWithTimeZone>,
    pub end_from: Option<DateTimeWithTimeZone>,
    pub end_to: Option<DateTimeWithTimeZone>,
    pub min_rent: Option<Decimal>,
    pub max_rent: Option<Decimal>,
    pub min_deposit: Option<Decimal>,
    pub max_deposit: Option<Decimal>,
    pub lease_term_months: Option<i32>,
    pub payment_due_day: Option<i32>,
    pub signed_by_tenant: Option<bool>,
    pub signed_by_landlord: Option<bool>,
    pub utilities_included: Option<bool>,
    /// Strictly before
    pub created_before: Option<DateTimeWithTimeZone>,
}

impl AgreementFilter {
    pub fn condition(&self) -> Condition {
        use agreements::Column;

        Condition::all()
            .add_option(self.tenant_id.map(|v| Column::TenantId.eq(v)))
            .add_option(self.landlord_id.map(|v| Column::LandlordId.eq(v)))
            .add_option(self.property_id.map(|v| Column::PropertyId.eq(v)))
            .add_option(self.application_id.map(|v| Column::ApplicationId.eq(v)))
            .add_option(self.status.map(|v| Column::Status.eq(v)))
            .add_option(self.agreement_number.clone().map(|v| Column::AgreementNumber.eq(v)))
            .add_option(self.start_from.map(|v| Column::StartDate.gte(v)))
            .add_option(self.start_to.map(|v| Column::StartDate.lte(v)))
            .add_option(self.end_from.map(|v| Column::EndDate.gte(v)))
            .add_option(self.end_to.map(|v| Column::EndDate.lte(v)))
            .add_option(self.min_rent.map(|v| Column::RentAmount.gte(v)))
            .add_option(self.max_rent.map(|v| Column::RentAmount.lte(v)))
            .add_option(self.min_deposit.map(|v| Column::SecurityDeposit.gte(v)))
            .add_option(self.max_deposit.map(|v| Column::SecurityDeposit.lte(v)))
            .add_option(self.lease_term_months.map(|v| Column::LeaseTermMonths.eq(v)))
            .add_option(self.payment_due_day.map(|v| Column::PaymentDueDay.eq(v)))
            .add_option(self.signed_by_tenant.map(|v| Column::SignedByTenant.eq(v)))
            .add_option(self.signed_by_landlord.map(|v| Column::SignedByLandlord.eq(v)))
            .add_option(self.utilities_included.map(|v| Column::UtilitiesIncluded.eq(v)))
            .add_option(self.created_before.map(|v| Column::CreatedAt.lt(v)))
    }
}

pub async fn count(db: &DatabaseConnection, filter: &AgreementFilter) -> Result<u64, sea_orm::DbErr> {
    Agreements::find().filter(filter.condition()).count(db).await
}
