//! Agreement Service
//!
//! An agreement is drawn up by the landlord from an approved application,
//! signed by both parties, and closes by expiry, renewal or termination.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    ActiveValue::Set,
};
use tracing::{debug, info};

use crate::auth::access::{Capability, Principal, authorize, ensure_owner};
use crate::entities::agreements::{self, AgreementStatus};
use crate::entities::applications::ApplicationStatus;
use crate::entities::prelude::*;
use crate::entities::users::Role;
use crate::error::ApiError;
use crate::models::agreement::{CreateAgreementRequest, SignRequest, TerminateRequest, UpdateAgreementRequest};
use crate::queries::agreement::{self as agreement_query, AgreementFilter};
use crate::queries::pagination::{Page, PageRequest, fetch_all, fetch_page};
use crate::services::support::{business_reference, days_from_now, now, referenced_property};

pub const RENEWAL_WINDOW_DAYS: i64 = 30;
pub const SIGNATURE_OVERDUE_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AgreementService {
    db: DatabaseConnection,
}

impl AgreementService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self, id: i32) -> Result<agreements::Model, ApiError> {
        Agreements::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::not_found("Agreement", id))
    }

    fn ensure_party(actor: &Principal, agreement: &agreements::Model) -> Result<(), ApiError> {
        if actor.user_id == agreement.tenant_id {
            return Ok(());
        }
        ensure_owner(actor, agreement.landlord_id)
    }

    fn ensure_landlord(actor: &Principal, agreement: &agreements::Model) -> Result<(), ApiError> {
        authorize(actor, Capability::ManageAgreements)?;
        ensure_owner(actor, agreement.landlord_id)
    }

    fn scoped(actor: &Principal, mut filter: AgreementFilter) -> Result<AgreementFilter, ApiError> {
        match actor.role {
            Role::Admin => {}
            Role::Landlord => filter.landlord_id = Some(actor.user_id),
            Role::Tenant => filter.tenant_id = Some(actor.user_id),
            Role::User => {
                return Err(ApiError::Forbidden("Role USER cannot view agreements".into()));
            }
        }
        Ok(filter)
    }

    fn with_status(status: AgreementStatus) -> AgreementFilter {
        AgreementFilter {
            status: Some(status),
            ..Default::default()
        }
    }

    pub async fn get(&self, actor: &Principal, id: i32) -> Result<agreements::Model, ApiError> {
        let agreement = self.find(id).await?;
        Self::ensure_party(actor, &agreement)?;
        Ok(agreement)
    }

    pub async fn by_number(&self, actor: &Principal, number: &str) -> Result<agreements::Model, ApiError> {
        let agreement = Agreements::find()
            .filter(agreements::Column::AgreementNumber.eq(number))
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Agreement {number}")))?;
        Self::ensure_party(actor, &agreement)?;
        Ok(agreement)
    }

    pub async fn list(&self, actor: &Principal, page: &PageRequest) -> Result<Page<agreements::Model>, ApiError> {
        self.search(actor, AgreementFilter::default(), page).await
    }

    pub async fn search(
        &self,
        actor: &Principal,
        filter: AgreementFilter,
        page: &PageRequest,
    ) -> Result<Page<agreements::Model>, ApiError> {
        let filter = Self::scoped(actor, filter)?;
        debug!(?filter, "Searching agreements");
        fetch_page(&self.db, Agreements::find().filter(filter.condition()), page).await
    }

    pub async fn count(&self, actor: &Principal, filter: AgreementFilter) -> Result<u64, ApiError> {
        let filter = Self::scoped(actor, filter)?;
        Ok(agreement_query::count(&self.db, &filter).await?)
    }

    pub async fn create(
        &self,
        actor: &Principal,
        request: CreateAgreementRequest,
    ) -> Result<agreements::Model, ApiError> {
        authorize(actor, Capability::ManageAgreements)?;
        request.validate().map_err(ApiError::Validation)?;

        let application = Applications::find_by_id(request.application_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                ApiError::Validation(format!("Application {} does not exist", request.application_id))
            })?;
        if application.status != ApplicationStatus::Approved {
            return Err(ApiError::Validation(format!(
                "Application {} is not approved",
                application.id
            )));
        }

        let property = referenced_property(&self.db, application.property_id).await?;
        ensure_owner(actor, property.landlord_id)?;

        let agreement_number = request
            .agreement_number
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| business_reference("AGR"));

        let agreement = agreements::ActiveModel {
            tenant_id: Set(application.tenant_id),
            landlord_id: Set(property.landlord_id),
            property_id: Set(property.id),
            application_id: Set(application.id),
            status: Set(AgreementStatus::Draft),
            agreement_number: Set(agreement_number),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            rent_amount: Set(request.rent_amount),
            security_deposit: Set(request.security_deposit),
            lease_term_months: Set(request.lease_term_months),
            payment_due_day: Set(request.payment_due_day),
            late_fee: Set(request.late_fee),
            pet_deposit: Set(request.pet_deposit),
            utilities_included: Set(request.utilities_included),
            utilities_details: Set(request.utilities_details),
            maintenance_responsibility: Set(request.maintenance_responsibility),
            pet_policy: Set(request.pet_policy),
            smoking_policy: Set(request.smoking_policy),
            guest_policy: Set(request.guest_policy),
            signed_by_tenant: Set(false),
            signed_by_landlord: Set(false),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(
            id = agreement.id,
            number = %agreement.agreement_number,
            application_id = application.id,
            "Agreement created"
        );
        Ok(agreement)
    }

    /// Terms can change only before the agreement is signed by both parties.
    pub async fn update(
        &self,
        actor: &Principal,
        id: i32,
        patch: UpdateAgreementRequest,
    ) -> Result<agreements::Model, ApiError> {
        patch.validate().map_err(ApiError::Validation)?;

        let existing = self.find(id).await?;
        Self::ensure_landlord(actor, &existing)?;
        if !matches!(existing.status, AgreementStatus::Draft | AgreementStatus::PendingSignature) {
            return Err(ApiError::Conflict(format!(
                "Agreement {id} is {:?} and its terms are fixed",
                existing.status
            )));
        }

        let start = patch.start_date.value().copied().unwrap_or(existing.start_date);
        let end = patch.end_date.value().copied().unwrap_or(existing.end_date);
        if end <= start {
            return Err(ApiError::Validation("endDate must be after startDate".into()));
        }

        let mut model = existing.into_active_model();
        patch.start_date.apply_required("startDate", &mut model.start_date)?;
        patch.end_date.apply_required("endDate", &mut model.end_date)?;
        patch.rent_amount.apply_required("rentAmount", &mut model.rent_amount)?;
        patch.security_deposit.apply_required("securityDeposit", &mut model.security_deposit)?;
        patch.lease_term_months.apply_required("leaseTermMonths", &mut model.lease_term_months)?;
        patch.payment_due_day.apply_required("paymentDueDay", &mut model.payment_due_day)?;
        patch.late_fee.apply_required("lateFee", &mut model.late_fee)?;
        patch.pet_deposit.apply_required("petDeposit", &mut model.pet_deposit)?;
        patch.utilities_included.apply_required("utilitiesIncluded", &mut model.utilities_included)?;
        patch.maintenance_responsibility
            .apply_required("maintenanceResponsibility", &mut model.maintenance_responsibility)?;
        patch.pet_policy.apply_required("petPolicy", &mut model.pet_policy)?;
        patch.smoking_policy.apply_required("smokingPolicy", &mut model.smoking_policy)?;
        patch.guest_policy.apply_required("guestPolicy", &mut model.guest_policy)?;
        patch.utilities_details.apply_nullable(&mut model.utilities_details);

        let agreement = model.update(&self.db).await?;
        info!(id, "Agreement updated");
        Ok(agreement)
    }

    pub async fn update_status(
        &self,
        actor: &Principal,
        id: i32,
        status: AgreementStatus,
    ) -> Result<agreements::Model, ApiError> {
        let existing = self.find(id).await?;
        Self::ensure_landlord(actor, &existing)?;
        check_transition(&existing, status)?;

        if status == AgreementStatus::Active && !(existing.signed_by_tenant && existing.signed_by_landlord) {
            return Err(ApiError::Validation(format!(
                "Agreement {id} needs both signatures before it becomes ACTIVE"
            )));
        }

        let mut model = existing.into_active_model();
        model.status = Set(status);
        let agreement = model.update(&self.db).await?;

        info!(id, status = ?status, "Agreement status updated");
        Ok(agreement)
    }

    /// Record the caller's signature. The second signature activates the
    /// agreement.
    pub async fn sign(&self, actor: &Principal, id: i32, request: SignRequest) -> Result<agreements::Model, ApiError> {
        if request.signature.trim().is_empty() {
            return Err(ApiError::Validation("signature must not be blank".into()));
        }

        let existing = self.find(id).await?;
        let as_tenant = actor.user_id == existing.tenant_id;
        let as_landlord = actor.user_id == existing.landlord_id;
        if !as_tenant && !as_landlord {
            return Err(ApiError::Forbidden("Only the parties may sign an agreement".into()));
        }
        if !matches!(existing.status, AgreementStatus::Draft | AgreementStatus::PendingSignature) {
            return Err(ApiError::Conflict(format!(
                "Agreement {id} is {:?} and cannot be signed",
                existing.status
            )));
        }

        let tenant_signed = existing.signed_by_tenant || as_tenant;
        let landlord_signed = existing.signed_by_landlord || as_landlord;
        let start_date = existing.start_date;

        let mut model = existing.into_active_model();
        if as_tenant {
            model.signed_by_tenant = Set(true);
            model.tenant_signature = Set(Some(request.signature.clone()));
        }
        if as_landlord {
            model.signed_by_landlord = Set(true);
            model.landlord_signature = Set(Some(request.signature));
        }

        if tenant_signed && landlord_signed {
            let signed_at = now();
            model.status = Set(AgreementStatus::Active);
            model.signed_at = Set(Some(signed_at));
            model.effective_date = Set(Some(start_date.max(signed_at)));
        } else {
            model.status = Set(AgreementStatus::PendingSignature);
        }

        let agreement = model.update(&self.db).await?;
        info!(id, tenant = as_tenant, landlord = as_landlord, status = ?agreement.status, "Agreement signed");
        Ok(agreement)
    }

    pub async fn terminate(
        &self,
        actor: &Principal,
        id: i32,
        request: TerminateRequest,
    ) -> Result<agreements::Model, ApiError> {
        if request.reason.trim().is_empty() {
            return Err(ApiError::Validation("reason must not be blank".into()));
        }

        let existing = self.find(id).await?;
        Self::ensure_landlord(actor, &existing)?;
        check_transition(&existing, AgreementStatus::Terminated)?;

        let mut model = existing.into_active_model();
        model.status = Set(AgreementStatus::Terminated);
        model.termination_date = Set(Some(request.termination_date.unwrap_or_else(now)));
        model.termination_reason = Set(Some(request.reason));
        let agreement = model.update(&self.db).await?;

        info!(id, "Agreement terminated");
        Ok(agreement)
    }

    pub async fn delete(&self, actor: &Principal, id: i32) -> Result<(), ApiError> {
        let existing = self.find(id).await?;
        Self::ensure_landlord(actor, &existing)?;

        Agreements::delete_by_id(id).exec(&self.db).await?;
        info!(id, "Agreement deleted");
        Ok(())
    }

    pub async fn active(&self, actor: &Principal, page: &PageRequest) -> Result<Page<agreements::Model>, ApiError> {
        self.search(actor, Self::with_status(AgreementStatus::Active), page).await
    }

    /// Active agreements ending on or before `before` (default: 30 days out).
    pub async fn expiring(
        &self,
        actor: &Principal,
        before: Option<sea_orm::prelude::DateTimeWithTimeZone>,
    ) -> Result<Vec<agreements::Model>, ApiError> {
        let filter = Self::scoped(
            actor,
            AgreementFilter {
                end_to: Some(before.unwrap_or_else(|| days_from_now(RENEWAL_WINDOW_DAYS))),
                ..Self::with_status(AgreementStatus::Active)
            },
        )?;
        fetch_all(&self.db, Agreements::find().filter(filter.condition())).await
    }

    /// Active agreements ending between now and `days` from now.
    pub async fn needing_renewal(
        &self,
        actor: &Principal,
        days: Option<i64>,
    ) -> Result<Vec<agreements::Model>, ApiError> {
        let days = days.unwrap_or(RENEWAL_WINDOW_DAYS);
        if days < 0 {
            return Err(ApiError::Validation("days cannot be negative".into()));
        }
        let filter = Self::scoped(
            actor,
            AgreementFilter {
                end_from: Some(now()),
                end_to: Some(days_from_now(days)),
                ..Self::with_status(AgreementStatus::Active)
            },
        )?;
        fetch_all(&self.db, Agreements::find().filter(filter.condition())).await
    }

    pub async fn pending_signatures(
        &self,
        actor: &Principal,
        page: &PageRequest,
    ) -> Result<Page<agreements::Model>, ApiError> {
        self.search(actor, Self::with_status(AgreementStatus::PendingSignature), page).await
    }

    /// Awaiting signatures for longer than a week.
    pub async fn overdue_signatures(
        &self,
        actor: &Principal,
        page: &PageRequest,
    ) -> Result<Page<agreements::Model>, ApiError> {
        let filter = AgreementFilter {
            created_before: Some(days_from_now(-SIGNATURE_OVERDUE_DAYS)),
            ..Self::with_status(AgreementStatus::PendingSignature)
        };
        self.search(actor, filter, page).await
    }
}

fn check_transition(agreement: &agreements::Model, next: AgreementStatus) -> Result<(), ApiError> {
    if agreement.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(ApiError::Conflict(format!(
            "Agreement {} cannot move from {:?} to {:?}",
            agreement.id, agreement.status, next
        )))
    }
}
