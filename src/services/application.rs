//! Application Service
//!
//! Tenants file and withdraw applications; the landlord of the property
//! reviews them. Read access follows the same split: tenants see their own
//! applications, landlords see the ones filed on their properties.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter, ActiveValue::Set};
use tracing::{debug, info, warn};

use crate::auth::access::{Capability, Principal, authorize, ensure_owner};
use crate::entities::applications::{self, ApplicationStatus};
use crate::entities::prelude::*;
use crate::entities::users::Role;
use crate::error::ApiError;
use crate::models::application::{
    ApplicationAnalytics, ApplicationValidation, CreateApplicationRequest, ReviewRequest,
    UpdateApplicationRequest,
};
use crate::models::user::validate_credit_score;
use crate::queries::application::{self as application_query, ApplicationFilter};
use crate::queries::pagination::{Page, PageRequest, fetch_page};
use crate::services::support::{days_from_now, now, referenced_property, referenced_user};

/// Pending applications older than this are overdue for review
pub const REVIEW_OVERDUE_DAYS: i64 = 7;

#[derive(Clone)]
pub struct ApplicationService {
    db: DatabaseConnection,
}

impl ApplicationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self, id: i32) -> Result<applications::Model, ApiError> {
        Applications::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::not_found("Application", id))
    }

    async fn landlord_of(&self, application: &applications::Model) -> Result<i32, ApiError> {
        Ok(referenced_property(&self.db, application.property_id).await?.landlord_id)
    }

    /// Tenant, landlord of the property, or admin.
    async fn ensure_party(&self, actor: &Principal, application: &applications::Model) -> Result<(), ApiError> {
        if actor.is_admin() || actor.user_id == application.tenant_id {
            return Ok(());
        }
        ensure_owner(actor, self.landlord_of(application).await?)
    }

    async fn ensure_reviewer(&self, actor: &Principal, application: &applications::Model) -> Result<(), ApiError> {
        authorize(actor, Capability::ReviewApplications)?;
        ensure_owner(actor, self.landlord_of(application).await?)
    }

    /// Restrict a filter to what the caller may see.
    fn scoped(actor: &Principal, mut filter: ApplicationFilter) -> Result<ApplicationFilter, ApiError> {
        match actor.role {
            Role::Admin => {}
            Role::Landlord => filter.landlord_id = Some(actor.user_id),
            Role::Tenant => filter.tenant_id = Some(actor.user_id),
            Role::User => {
                return Err(ApiError::Forbidden("Role USER cannot view applications".into()));
            }
        }
        Ok(filter)
    }

    fn overdue_filter() -> ApplicationFilter {
        ApplicationFilter {
            created_before: Some(days_from_now(-REVIEW_OVERDUE_DAYS)),
            ..ApplicationFilter::with_statuses(&[ApplicationStatus::Pending])
        }
    }

    pub async fn get(&self, actor: &Principal, id: i32) -> Result<applications::Model, ApiError> {
        let application = self.find(id).await?;
        self.ensure_party(actor, &application).await?;
        Ok(application)
    }

    pub async fn list(&self, actor: &Principal, page: &PageRequest) -> Result<Page<applications::Model>, ApiError> {
        self.search(actor, ApplicationFilter::default(), page).await
    }

    pub async fn search(
        &self,
        actor: &Principal,
        filter: ApplicationFilter,
        page: &PageRequest,
    ) -> Result<Page<applications::Model>, ApiError> {
        let filter = Self::scoped(actor, filter)?;
        debug!(?filter, "Searching applications");
        fetch_page(&self.db, Applications::find().filter(filter.condition()), page).await
    }

    pub async fn count(&self, actor: &Principal, filter: ApplicationFilter) -> Result<u64, ApiError> {
        let filter = Self::scoped(actor, filter)?;
        Ok(application_query::count(&self.db, &filter).await?)
    }

    pub async fn create(
        &self,
        actor: &Principal,
        request: CreateApplicationRequest,
    ) -> Result<applications::Model, ApiError> {
        authorize(actor, Capability::SubmitApplications)?;
        request.validate().map_err(ApiError::Validation)?;

        let tenant_id = match request.tenant_id {
            Some(id) if id != actor.user_id && !actor.is_admin() => {
                return Err(ApiError::Forbidden("Cannot apply on behalf of another tenant".into()));
            }
            Some(id) => id,
            None => actor.user_id,
        };
        referenced_user(&self.db, tenant_id).await?;

        let listing = Listings::find_by_id(request.listing_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::Validation(format!("Listing {} does not exist", request.listing_id)))?;

        if let Some(property_id) = request.property_id {
            if property_id != listing.property_id {
                return Err(ApiError::Validation(format!(
                    "Listing {} is not for property {property_id}",
                    listing.id
                )));
            }
        }

        let application = applications::ActiveModel {
            tenant_id: Set(tenant_id),
            property_id: Set(listing.property_id),
            listing_id: Set(listing.id),
            status: Set(ApplicationStatus::Pending),
            cover_letter: Set(request.cover_letter),
            monthly_income: Set(request.monthly_income),
            employment_status: Set(request.employment_status),
            employer_name: Set(request.employer_name),
            employer_phone: Set(request.employer_phone),
            rental_history: Set(request.rental_history),
            credit_score: Set(request.credit_score),
            pets_count: Set(request.pets_count),
            pet_types: Set(request.pet_types),
            occupants_count: Set(request.occupants_count),
            move_in_date: Set(request.move_in_date),
            lease_term_preference: Set(request.lease_term_preference),
            application_fee: Set(request.application_fee),
            fee_paid: Set(false),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(id = application.id, tenant_id, listing_id = listing.id, "Application submitted");
        Ok(application)
    }

    /// Tenants may edit an application until it is decided.
    pub async fn update(
        &self,
        actor: &Principal,
        id: i32,
        patch: UpdateApplicationRequest,
    ) -> Result<applications::Model, ApiError> {
        patch.validate().map_err(ApiError::Validation)?;

        let existing = self.find(id).await?;
        ensure_owner(actor, existing.tenant_id)?;
        if !matches!(existing.status, ApplicationStatus::Pending | ApplicationStatus::UnderReview) {
            return Err(ApiError::Conflict(format!(
                "Application {id} has been decided and can no longer be edited"
            )));
        }

        let mut model = existing.into_active_model();
        patch.cover_letter.apply_required("coverLetter", &mut model.cover_letter)?;
        patch.monthly_income.apply_required("monthlyIncome", &mut model.monthly_income)?;
        patch.employment_status.apply_required("employmentStatus", &mut model.employment_status)?;
        patch.employer_name.apply_required("employerName", &mut model.employer_name)?;
        patch.employer_phone.apply_required("employerPhone", &mut model.employer_phone)?;
        patch.rental_history.apply_required("rentalHistory", &mut model.rental_history)?;
        patch.credit_score.apply_required("creditScore", &mut model.credit_score)?;
        patch.pets_count.apply_required("petsCount", &mut model.pets_count)?;
        patch.occupants_count.apply_required("occupantsCount", &mut model.occupants_count)?;
        patch.move_in_date.apply_required("moveInDate", &mut model.move_in_date)?;
        patch.lease_term_preference.apply_required("leaseTermPreference", &mut model.lease_term_preference)?;
        patch.pet_types.apply_nullable(&mut model.pet_types);
        patch.application_fee.apply_nullable(&mut model.application_fee);

        let application = model.update(&self.db).await?;
        info!(id, "Application updated");
        Ok(application)
    }

    /// Tenants may only withdraw; every other move is a landlord decision.
    pub async fn update_status(
        &self,
        actor: &Principal,
        id: i32,
        status: ApplicationStatus,
    ) -> Result<applications::Model, ApiError> {
        let existing = self.find(id).await?;

        if status == ApplicationStatus::Withdrawn && actor.user_id == existing.tenant_id {
            authorize(actor, Capability::SubmitApplications)?;
        } else {
            self.ensure_reviewer(actor, &existing).await?;
        }
        check_transition(&existing, status)?;

        let mut model = existing.into_active_model();
        model.status = Set(status);
        let application = model.update(&self.db).await?;

        info!(id, status = ?status, "Application status updated");
        Ok(application)
    }

    /// Record a review decision: status, reviewer, review time and, for
    /// rejections, the reason.
    pub async fn review(
        &self,
        actor: &Principal,
        id: i32,
        request: ReviewRequest,
    ) -> Result<applications::Model, ApiError> {
        let existing = self.find(id).await?;
        self.ensure_reviewer(actor, &existing).await?;

        if !matches!(
            request.status,
            ApplicationStatus::UnderReview | ApplicationStatus::Approved | ApplicationStatus::Rejected
        ) {
            return Err(ApiError::Validation(
                "A review must set UNDER_REVIEW, APPROVED or REJECTED".into(),
            ));
        }
        check_transition(&existing, request.status)?;

        let mut model = existing.into_active_model();
        model.status = Set(request.status);
        model.reviewed_at = Set(Some(now()));
        model.reviewed_by = Set(Some(actor.user_id));
        model.rejection_reason = Set(match request.status {
            ApplicationStatus::Rejected => request.rejection_reason,
            _ => None,
        });
        let application = model.update(&self.db).await?;

        info!(id, reviewer = actor.user_id, status = ?request.status, "Application reviewed");
        Ok(application)
    }

    pub async fn mark_fee_paid(&self, actor: &Principal, id: i32) -> Result<applications::Model, ApiError> {
        let existing = self.find(id).await?;
        self.ensure_party(actor, &existing).await?;

        let mut model = existing.into_active_model();
        model.fee_paid = Set(true);
        let application = model.update(&self.db).await?;

        info!(id, "Application fee marked paid");
        Ok(application)
    }

    pub async fn delete(&self, actor: &Principal, id: i32) -> Result<(), ApiError> {
        let existing = self.find(id).await?;
        ensure_owner(actor, existing.tenant_id)?;

        Applications::delete_by_id(id).exec(&self.db).await?;
        info!(id, "Application deleted");
        Ok(())
    }

    pub async fn by_tenant(
        &self,
        actor: &Principal,
        tenant_id: i32,
        page: &PageRequest,
    ) -> Result<Page<applications::Model>, ApiError> {
        authorize(actor, Capability::ViewTenantApplications)?;
        ensure_owner(actor, tenant_id)?;
        let filter = ApplicationFilter {
            tenant_id: Some(tenant_id),
            ..Default::default()
        };
        fetch_page(&self.db, Applications::find().filter(filter.condition()), page).await
    }

    pub async fn by_landlord(
        &self,
        actor: &Principal,
        landlord_id: i32,
        page: &PageRequest,
    ) -> Result<Page<applications::Model>, ApiError> {
        authorize(actor, Capability::ReviewApplications)?;
        ensure_owner(actor, landlord_id)?;
        let filter = ApplicationFilter {
            landlord_id: Some(landlord_id),
            ..Default::default()
        };
        fetch_page(&self.db, Applications::find().filter(filter.condition()), page).await
    }

    pub async fn by_property(
        &self,
        actor: &Principal,
        property_id: i32,
        page: &PageRequest,
    ) -> Result<Page<applications::Model>, ApiError> {
        authorize(actor, Capability::ReviewApplications)?;
        let property = Properties::find_by_id(property_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::not_found("Property", property_id))?;
        ensure_owner(actor, property.landlord_id)?;

        let filter = ApplicationFilter {
            property_id: Some(property_id),
            ..Default::default()
        };
        fetch_page(&self.db, Applications::find().filter(filter.condition()), page).await
    }

    pub async fn by_listing(
        &self,
        actor: &Principal,
        listing_id: i32,
        page: &PageRequest,
    ) -> Result<Page<applications::Model>, ApiError> {
        authorize(actor, Capability::ReviewApplications)?;
        let listing = Listings::find_by_id(listing_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::not_found("Listing", listing_id))?;
        ensure_owner(actor, listing.landlord_id)?;

        let filter = ApplicationFilter {
            listing_id: Some(listing_id),
            ..Default::default()
        };
        fetch_page(&self.db, Applications::find().filter(filter.condition()), page).await
    }

    pub async fn by_status(
        &self,
        actor: &Principal,
        status: ApplicationStatus,
        page: &PageRequest,
    ) -> Result<Page<applications::Model>, ApiError> {
        self.search(actor, ApplicationFilter::with_statuses(&[status]), page).await
    }

    pub async fn pending(&self, actor: &Principal, page: &PageRequest) -> Result<Page<applications::Model>, ApiError> {
        self.by_status(actor, ApplicationStatus::Pending, page).await
    }

    pub async fn pending_by_landlord(
        &self,
        actor: &Principal,
        landlord_id: i32,
        page: &PageRequest,
    ) -> Result<Page<applications::Model>, ApiError> {
        authorize(actor, Capability::ReviewApplications)?;
        ensure_owner(actor, landlord_id)?;
        let filter = ApplicationFilter {
            landlord_id: Some(landlord_id),
            ..ApplicationFilter::with_statuses(&[ApplicationStatus::Pending])
        };
        fetch_page(&self.db, Applications::find().filter(filter.condition()), page).await
    }

    pub async fn count_pending_by_landlord(&self, actor: &Principal, landlord_id: i32) -> Result<u64, ApiError> {
        authorize(actor, Capability::ReviewApplications)?;
        ensure_owner(actor, landlord_id)?;
        let filter = ApplicationFilter {
            landlord_id: Some(landlord_id),
            ..ApplicationFilter::with_statuses(&[ApplicationStatus::Pending])
        };
        Ok(application_query::count(&self.db, &filter).await?)
    }

    /// PENDING or UNDER_REVIEW
    pub async fn needing_review(
        &self,
        actor: &Principal,
        page: &PageRequest,
    ) -> Result<Page<applications::Model>, ApiError> {
        let filter =
            ApplicationFilter::with_statuses(&[ApplicationStatus::Pending, ApplicationStatus::UnderReview]);
        self.search(actor, filter, page).await
    }

    pub async fn overdue(&self, actor: &Principal, page: &PageRequest) -> Result<Page<applications::Model>, ApiError> {
        self.search(actor, Self::overdue_filter(), page).await
    }

    pub async fn by_credit_score(
        &self,
        actor: &Principal,
        min: i32,
        max: i32,
        page: &PageRequest,
    ) -> Result<Page<applications::Model>, ApiError> {
        if min > max {
            return Err(ApiError::Validation("minScore cannot exceed maxScore".into()));
        }
        let filter = ApplicationFilter {
            min_credit_score: Some(min),
            max_credit_score: Some(max),
            ..Default::default()
        };
        self.search(actor, filter, page).await
    }

    pub async fn by_income(
        &self,
        actor: &Principal,
        min: Decimal,
        max: Decimal,
        page: &PageRequest,
    ) -> Result<Page<applications::Model>, ApiError> {
        if min > max {
            return Err(ApiError::Validation("minIncome cannot exceed maxIncome".into()));
        }
        let filter = ApplicationFilter {
            min_income: Some(min),
            max_income: Some(max),
            ..Default::default()
        };
        self.search(actor, filter, page).await
    }

    /// Re-check a stored application before a decision is made.
    pub async fn validate(&self, actor: &Principal, id: i32) -> Result<ApplicationValidation, ApiError> {
        let application = self.find(id).await?;
        self.ensure_reviewer(actor, &application).await?;

        let mut problems = Vec::new();
        if Users::find_by_id(application.tenant_id).one(&self.db).await?.is_none() {
            problems.push(format!("Tenant {} does not exist", application.tenant_id));
        }
        if Properties::find_by_id(application.property_id).one(&self.db).await?.is_none() {
            problems.push(format!("Property {} does not exist", application.property_id));
        }
        if application.monthly_income <= Decimal::ZERO {
            problems.push("monthlyIncome must be positive".to_string());
        }
        if let Err(e) = validate_credit_score(application.credit_score) {
            problems.push(e);
        }

        if !problems.is_empty() {
            warn!(id, ?problems, "Application failed validation");
        }
        Ok(ApplicationValidation {
            valid: problems.is_empty(),
            problems,
        })
    }

    pub async fn analytics(&self, actor: &Principal) -> Result<ApplicationAnalytics, ApiError> {
        let with = |status: ApplicationStatus| ApplicationFilter::with_statuses(&[status]);

        Ok(ApplicationAnalytics {
            total: self.count(actor, ApplicationFilter::default()).await?,
            pending: self.count(actor, with(ApplicationStatus::Pending)).await?,
            approved: self.count(actor, with(ApplicationStatus::Approved)).await?,
            rejected: self.count(actor, with(ApplicationStatus::Rejected)).await?,
            overdue: self.count(actor, Self::overdue_filter()).await?,
            with_pets: self
                .count(
                    actor,
                    ApplicationFilter {
                        min_pets: Some(1),
                        ..Default::default()
                    },
                )
                .await?,
        })
    }
}

fn check_transition(application: &applications::Model, next: ApplicationStatus) -> Result<(), ApiError> {
    if application.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(ApiError::Conflict(format!(
            "Application {} cannot move from {:?} to {:?}",
            application.id, application.status, next
        )))
    }
}
