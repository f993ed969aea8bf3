//! Dashboard Service
//!
//! Counts and sums across entities. Admins get global numbers; landlords
//! and tenants get numbers for their own records.

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use tracing::debug;

use crate::auth::access::{Capability, Principal, authorize};
use crate::entities::agreements::AgreementStatus;
use crate::entities::applications::ApplicationStatus;
use crate::entities::listings::ListingStatus;
use crate::entities::payments::PaymentStatus;
use crate::entities::prelude::*;
use crate::entities::properties::PropertyStatus;
use crate::entities::users::Role;
use crate::error::ApiError;
use crate::models::dashboard::DashboardSummary;
use crate::queries::agreement::{self as agreement_query, AgreementFilter};
use crate::queries::application::{self as application_query, ApplicationFilter};
use crate::queries::listing::{self as listing_query, ListingFilter};
use crate::queries::payment::{self as payment_query, PaymentFilter};
use crate::queries::property::{self as property_query, PropertyFilter};
use crate::services::support::now;

/// Owner columns used to scope every count
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    landlord_id: Option<i32>,
    tenant_id: Option<i32>,
}

impl Scope {
    fn for_actor(actor: &Principal) -> Self {
        match actor.role {
            Role::Admin => Scope::default(),
            Role::Landlord => Scope {
                landlord_id: Some(actor.user_id),
                ..Default::default()
            },
            // A plain user has no tenant records, so every count is zero
            Role::Tenant | Role::User => Scope {
                tenant_id: Some(actor.user_id),
                ..Default::default()
            },
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    db: DatabaseConnection,
}

impl DashboardService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn summary(&self, actor: &Principal) -> Result<DashboardSummary, ApiError> {
        authorize(actor, Capability::ViewDashboard)?;
        let scope = Scope::for_actor(actor);
        debug!(?scope, user_id = actor.user_id, "Building dashboard");

        // Tenants do not own properties or listings
        let owns_properties = scope.tenant_id.is_none();

        let (total_properties, available_properties, active_listings) = if owns_properties {
            let all = PropertyFilter {
                landlord_id: scope.landlord_id,
                ..Default::default()
            };
            let available = PropertyFilter {
                status: Some(PropertyStatus::Available),
                ..all.clone()
            };
            let listings = ListingFilter {
                landlord_id: scope.landlord_id,
                status: Some(ListingStatus::Active),
                ..Default::default()
            };
            (
                property_query::count(&self.db, &all).await?,
                property_query::count(&self.db, &available).await?,
                listing_query::count(&self.db, &listings).await?,
            )
        } else {
            (0, 0, 0)
        };

        let pending_applications = application_query::count(
            &self.db,
            &ApplicationFilter {
                landlord_id: scope.landlord_id,
                tenant_id: scope.tenant_id,
                ..ApplicationFilter::with_statuses(&[ApplicationStatus::Pending])
            },
        )
        .await?;

        let active_agreements = agreement_query::count(
            &self.db,
            &AgreementFilter {
                landlord_id: scope.landlord_id,
                tenant_id: scope.tenant_id,
                status: Some(AgreementStatus::Active),
                ..Default::default()
            },
        )
        .await?;

        let completed = PaymentFilter {
            landlord_id: scope.landlord_id,
            tenant_id: scope.tenant_id,
            status: Some(PaymentStatus::Completed),
            ..Default::default()
        };
        let overdue = PaymentFilter {
            landlord_id: scope.landlord_id,
            tenant_id: scope.tenant_id,
            status: Some(PaymentStatus::Pending),
            due_before: Some(now()),
            ..Default::default()
        };

        let total_users = if actor.is_admin() {
            Some(Users::find().count(&self.db).await?)
        } else {
            None
        };

        Ok(DashboardSummary {
            scope: actor.role,
            total_users,
            total_properties,
            available_properties,
            active_listings,
            pending_applications,
            active_agreements,
            completed_payments: payment_query::count(&self.db, &completed).await?,
            overdue_payments: payment_query::count(&self.db, &overdue).await?,
            total_revenue: payment_query::sum_amount(&self.db, &completed).await?,
        })
    }
}
