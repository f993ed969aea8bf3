//! SeaORM Entity for lease agreements
//!
//! An agreement is created from an approved application and becomes
//! ACTIVE once both parties have signed.

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgreementStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "PENDING_SIGNATURE")]
    PendingSignature,
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "EXPIRED")]
    Expired,
    #[sea_orm(string_value = "TERMINATED")]
    Terminated,
    #[sea_orm(string_value = "RENEWED")]
    Renewed,
}

impl AgreementStatus {
    pub fn can_transition_to(self, next: AgreementStatus) -> bool {
        use AgreementStatus::*;
        if self == next {
            return true;
        }
        match self {
            Draft => matches!(next, PendingSignature | Terminated),
            PendingSignature => matches!(next, Draft | Active | Terminated),
            Active => matches!(next, Expired | Terminated | Renewed),
            Expired => matches!(next, Renewed),
            Terminated | Renewed => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "agreements")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tenant_id: i32,
    pub landlord_id: i32,
    pub property_id: i32,
    pub application_id: i32,
    pub status: AgreementStatus,
    #[sea_orm(unique)]
    pub agreement_number: String,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub rent_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub security_deposit: Decimal,
    pub lease_term_months: i32,
    /// Day of month when rent is due
    pub payment_due_day: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub late_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub pet_deposit: Decimal,
    pub utilities_included: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub utilities_details: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub maintenance_responsibility: String,
    #[sea_orm(column_type = "Text")]
    pub pet_policy: String,
    #[sea_orm(column_type = "Text")]
    pub smoking_policy: String,
    #[sea_orm(column_type = "Text")]
    pub guest_policy: String,
    pub signed_at: Option<DateTimeWithTimeZone>,
    pub signed_by_tenant: bool,
    pub signed_by_landlord: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub tenant_signature: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub landlord_signature: Option<String>,
    pub effective_date: Option<DateTimeWithTimeZone>,
    pub termination_date: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub termination_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::properties::Entity",
        from = "Column::PropertyId",
        to = "super::properties::Column::Id",
        on_delete = "Cascade"
    )]
    Property,
    #[sea_orm(
        belongs_to = "super::applications::Entity",
        from = "Column::ApplicationId",
        to = "super::applications::Column::Id",
        on_delete = "Cascade"
    )]
    Application,
}

impl Related<super::properties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().fixed_offset();
        if insert {
            self.created_at = Set(now);
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::AgreementStatus::*;

    #[test]
    fn test_signature_flow_transitions() {
        assert!(Draft.can_transition_to(PendingSignature));
        assert!(PendingSignature.can_transition_to(Active));
        assert!(Active.can_transition_to(Renewed));
    }

    #[test]
    fn test_closed_agreements_are_final() {
        assert!(!Terminated.can_transition_to(Active));
        assert!(!Renewed.can_transition_to(Draft));
        assert!(!Draft.can_transition_to(Active));
    }
}
