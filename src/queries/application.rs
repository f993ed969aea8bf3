//! Application filters

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, QueryTrait,
    prelude::{DateTimeWithTimeZone, Decimal},
};
use serde::Deserialize;

use crate::entities::applications::{self, ApplicationStatus};
use crate::entities::{prelude::*, properties};
use crate::queries::params::comma_separated;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationFilter {
    pub tenant_id: Option<i32>,
    /// Landlord of the property applied for
    pub landlord_id: Option<i32>,
    pub property_id: Option<i32>,
    pub listing_id: Option<i32>,
    /// Any of these statuses
    #[serde(default, deserialize_with = "comma_separated")]
    pub statuses: Option<Vec<ApplicationStatus>>,
    pub created_from: Option<DateTimeWithTimeZone>,
    pub created_to: Option<DateTimeWithTimeZone>,
    /// Strictly before
    pub created_before: Option<DateTimeWithTimeZone>,
    pub move_in_date: Option<DateTimeWithTimeZone>,
    pub lease_term: Option<i32>,
    pub min_income: Option<Decimal>,
    pub max_income: Option<Decimal>,
    pub min_credit_score: Option<i32>,
    pub max_credit_score: Option<i32>,
    pub min_pets: Option<i32>,
    pub occupants_count: Option<i32>,
    pub employment_status: Option<String>,
    pub employer_name: Option<String>,
    pub fee_paid: Option<bool>,
    pub reviewed_from: Option<DateTimeWithTimeZone>,
    pub reviewed_to: Option<DateTimeWithTimeZone>,
    pub reviewed_by: Option<i32>,
}

impl ApplicationFilter {
    pub fn with_statuses(statuses: &[ApplicationStatus]) -> Self {
        Self {
            statuses: Some(statuses.to_vec()),
            ..Default::default()
        }
    }

    pub fn condition(&self) -> Condition {
        use applications::Column;

        Condition::all()
            .add_option(self.tenant_id.map(|v| Column::TenantId.eq(v)))
            .add_option(self.landlord_id.map(owned_by_landlord))
            .add_option(self.property_id.map(|v| Column::PropertyId.eq(v)))
            .add_option(self.listing_id.map(|v| Column::ListingId.eq(v)))
            .add_option(self.statuses.clone().map(|v| Column::Status.is_in(v)))
            .add_option(self.created_from.map(|v| Column::CreatedAt.gte(v)))
            .add_option(self.created_to.map(|v| Column::CreatedAt.lte(v)))
            .add_option(self.created_before.map(|v| Column::CreatedAt.lt(v)))
            .add_option(self.move_in_date.map(|v| Column::MoveInDate.eq(v)))
            .add_option(self.lease_term.map(|v| Column::LeaseTermPreference.eq(v)))
            .add_option(self.min_income.map(|v| Column::MonthlyIncome.gte(v)))
            .add_option(self.max_income.map(|v| Column::MonthlyIncome.lte(v)))
            .add_option(self.min_credit_score.map(|v| Column::CreditScore.gte(v)))
            .add_option(self.max_credit_score.map(|v| Column::CreditScore.lte(v)))
            .add_option(self.min_pets.map(|v| Column::PetsCount.gte(v)))
            .add_option(self.occupants_count.map(|v| Column::OccupantsCount.eq(v)))
            .add_option(self.employment_status.clone().map(|v| Column::EmploymentStatus.eq(v)))
            .add_option(self.employer_name.clone().map(|v| Column::EmployerName.eq(v)))
            .add_option(self.fee_paid.map(|v| Column::FeePaid.eq(v)))
            .add_option(self.reviewed_from.map(|v| Column::ReviewedAt.gte(v)))
            .add_option(self.reviewed_to.map(|v| Column::ReviewedAt.lte(v)))
            .add_option(self.reviewed_by.map(|v| Column::ReviewedBy.eq(v)))
    }
}

fn owned_by_landlord(landlord_id: i32) -> Condition {
    let subquery = Properties::find()
        .select_only()
        .column(properties::Column::Id)
        .filter(properties::Column::LandlordId.eq(landlord_id))
        .into_query();

    Condition::all().add(applications::Column::PropertyId.in_subquery(subquery))
}

pub async fn count(db: &DatabaseConnection, filter: &ApplicationFilter) -> Result<u64, sea_orm::DbErr> {
    Applications::find().filter(filter.condition()).count(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbBackend;

    fn sql(filter: &ApplicationFilter) -> String {
        Applications::find()
            .filter(filter.condition())
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_credit_score_bounds() {
        let sql = sql(&ApplicationFilter {
            min_credit_score: Some(650),
            max_credit_score: Some(750),
            ..Default::default()
        });
        assert!(sql.contains(r#""credit_score" >= 650"#), "{sql}");
        assert!(sql.contains(r#""credit_score" <= 750"#), "{sql}");
    }

    #[test]
    fn test_statuses_any_of() {
        let sql = sql(&ApplicationFilter::with_statuses(&[
            ApplicationStatus::Pending,
            ApplicationStatus::UnderReview,
        ]));
        assert!(sql.contains("IN ('PENDING', 'UNDER_REVIEW')"), "{sql}");
    }

    #[test]
    fn test_landlord_goes_through_property() {
        let sql = sql(&ApplicationFilter {
            landlord_id: Some(4),
            ..Default::default()
        });
        assert!(sql.contains(r#""landlord_id" = 4"#), "{sql}");
        assert!(sql.contains("IN (SELECT"), "{sql}");
    }
}
