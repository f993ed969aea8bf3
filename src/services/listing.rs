//! Listing Service

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    ActiveValue::Set,
    sea_query::Expr,
};
use tracing::{debug, info};

use crate::auth::access::{Capability, Principal, authorize, ensure_owner};
use crate::entities::listings::{self, ListingStatus, ListingType};
use crate::entities::{prelude::*, properties};
use crate::error::ApiError;
use crate::models::listing::{CreateListingRequest, FeaturedRequest, ListingAnalytics, UpdateListingRequest};
use crate::queries::geo::NearQuery;
use crate::queries::listing::{self as listing_query, ListingFilter};
use crate::queries::pagination::{Page, PageRequest, SortDir, fetch_all, fetch_page};
use crate::services::support::{days_from_now, now, referenced_property};

pub const EXPIRING_WITHIN_DAYS: i64 = 7;

#[derive(Clone)]
pub struct ListingService {
    db: DatabaseConnection,
}

impl ListingService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self, id: i32) -> Result<listings::Model, ApiError> {
        Listings::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::not_found("Listing", id))
    }

    fn active_filter() -> ListingFilter {
        ListingFilter {
            status: Some(ListingStatus::Active),
            ..Default::default()
        }
    }

    pub async fn get(&self, id: i32) -> Result<listings::Model, ApiError> {
        self.find(id).await
    }

    pub async fn list(&self, page: &PageRequest) -> Result<Page<listings::Model>, ApiError> {
        fetch_page(&self.db, Listings::find(), page).await
    }

    pub async fn search(&self, filter: &ListingFilter, page: &PageRequest) -> Result<Page<listings::Model>, ApiError> {
        debug!(?filter, "Searching listings");
        fetch_page(&self.db, Listings::find().filter(filter.condition()), page).await
    }

    pub async fn search_all(&self, filter: &ListingFilter) -> Result<Vec<listings::Model>, ApiError> {
        fetch_all(&self.db, Listings::find().filter(filter.condition())).await
    }

    pub async fn count(&self, filter: &ListingFilter) -> Result<u64, ApiError> {
        Ok(listing_query::count(&self.db, filter).await?)
    }

    /// The listing's landlord is always the landlord of its property.
    pub async fn create(&self, actor: &Principal, request: CreateListingRequest) -> Result<listings::Model, ApiError> {
        authorize(actor, Capability::ManageListings)?;
        request.validate().map_err(ApiError::Validation)?;

        let property = referenced_property(&self.db, request.property_id).await?;
        ensure_owner(actor, property.landlord_id)?;

        let listing = listings::ActiveModel {
            title: Set(request.title),
            description: Set(request.description),
            rent_amount: Set(request.rent_amount),
            security_deposit: Set(request.security_deposit),
            available_date: Set(request.available_date),
            lease_term_months: Set(request.lease_term_months),
            status: Set(ListingStatus::Active),
            listing_type: Set(request.listing_type.unwrap_or(ListingType::Rent)),
            property_id: Set(property.id),
            landlord_id: Set(property.landlord_id),
            expires_at: Set(request.expires_at),
            featured_until: Set(request.featured_until),
            is_featured: Set(request.is_featured),
            view_count: Set(0),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(id = listing.id, property_id = property.id, "Listing created");
        Ok(listing)
    }

    pub async fn update(
        &self,
        actor: &Principal,
        id: i32,
        patch: UpdateListingRequest,
    ) -> Result<listings::Model, ApiError> {
        authorize(actor, Capability::ManageListings)?;
        patch.validate().map_err(ApiError::Validation)?;

        let existing = self.find(id).await?;
        ensure_owner(actor, existing.landlord_id)?;

        let mut model = existing.into_active_model();
        patch.title.apply_required("title", &mut model.title)?;
        patch.description.apply_required("description", &mut model.description)?;
        patch.rent_amount.apply_required("rentAmount", &mut model.rent_amount)?;
        patch.security_deposit.apply_required("securityDeposit", &mut model.security_deposit)?;
        patch.available_date.apply_required("availableDate", &mut model.available_date)?;
        patch.lease_term_months.apply_required("leaseTermMonths", &mut model.lease_term_months)?;
        patch.status.apply_required("status", &mut model.status)?;
        patch.listing_type.apply_required("type", &mut model.listing_type)?;
        patch.is_featured.apply_required("isFeatured", &mut model.is_featured)?;
        patch.expires_at.apply_nullable(&mut model.expires_at);
        patch.featured_until.apply_nullable(&mut model.featured_until);

        let listing = model.update(&self.db).await?;
        info!(id, "Listing updated");
        Ok(listing)
    }

    pub async fn update_status(
        &self,
        actor: &Principal,
        id: i32,
        status: ListingStatus,
    ) -> Result<listings::Model, ApiError> {
        authorize(actor, Capability::ManageListings)?;
        let existing = self.find(id).await?;
        ensure_owner(actor, existing.landlord_id)?;

        let mut model = existing.into_active_model();
        model.status = Set(status);
        let listing = model.update(&self.db).await?;

        info!(id, status = ?status, "Listing status updated");
        Ok(listing)
    }

    pub async fn delete(&self, actor: &Principal, id: i32) -> Result<(), ApiError> {
        authorize(actor, Capability::ManageListings)?;
        let existing = self.find(id).await?;
        ensure_owner(actor, existing.landlord_id)?;

        Listings::delete_by_id(id).exec(&self.db).await?;
        info!(id, "Listing deleted");
        Ok(())
    }

    /// Increment the view counter in the database, not in memory, so
    /// concurrent views are never lost.
    pub async fn record_view(&self, id: i32) -> Result<listings::Model, ApiError> {
        let result = Listings::update_many()
            .col_expr(listings::Column::ViewCount, Expr::col(listings::Column::ViewCount).add(1))
            .col_expr(listings::Column::UpdatedAt, Expr::value(now()))
            .filter(listings::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ApiError::not_found("Listing", id));
        }
        self.find(id).await
    }

    pub async fn set_featured(
        &self,
        actor: &Principal,
        id: i32,
        request: FeaturedRequest,
    ) -> Result<listings::Model, ApiError> {
        authorize(actor, Capability::ManageListings)?;
        let existing = self.find(id).await?;
        ensure_owner(actor, existing.landlord_id)?;

        let mut model = existing.into_active_model();
        model.is_featured = Set(request.featured);
        model.featured_until = Set(if request.featured { request.featured_until } else { None });
        let listing = model.update(&self.db).await?;

        info!(id, featured = request.featured, "Listing featured flag updated");
        Ok(listing)
    }

    pub async fn active(&self, page: &PageRequest) -> Result<Page<listings::Model>, ApiError> {
        self.search(&Self::active_filter(), page).await
    }

    pub async fn featured(&self, page: &PageRequest) -> Result<Page<listings::Model>, ApiError> {
        let filter = ListingFilter {
            featured: Some(true),
            ..Self::active_filter()
        };
        self.search(&filter, page).await
    }

    /// Active listings, most viewed first.
    pub async fn popular(&self, page: &PageRequest) -> Result<Page<listings::Model>, ApiError> {
        let page = page.clone().sorted("viewCount", SortDir::Desc);
        self.search(&Self::active_filter(), &page).await
    }

    /// Active listings whose expiry falls between now and `days` from now.
    pub async fn expiring(&self, days: Option<i64>) -> Result<Vec<listings::Model>, ApiError> {
        let days = days.unwrap_or(EXPIRING_WITHIN_DAYS);
        if days < 0 {
            return Err(ApiError::Validation("days cannot be negative".into()));
        }

        let select = Listings::find()
            .filter(Self::active_filter().condition())
            .filter(listings::Column::ExpiresAt.gte(now()))
            .filter(listings::Column::ExpiresAt.lte(days_from_now(days)));
        fetch_all(&self.db, select).await
    }

    /// Active listings on properties within `radius` degrees.
    pub async fn near(&self, near: &NearQuery) -> Result<Vec<listings::Model>, ApiError> {
        near.validate()?;

        let property_ids: Vec<i32> = Properties::find()
            .filter(near.bounding_box())
            .all(&self.db)
            .await?
            .into_iter()
            .filter(|p: &properties::Model| near.contains(p.latitude, p.longitude))
            .map(|p| p.id)
            .collect();

        if property_ids.is_empty() {
            return Ok(Vec::new());
        }

        let select = Listings::find()
            .filter(Self::active_filter().condition())
            .filter(listings::Column::PropertyId.is_in(property_ids));
        fetch_all(&self.db, select).await
    }

    pub async fn by_landlord(&self, landlord_id: i32, page: &PageRequest) -> Result<Page<listings::Model>, ApiError> {
        let filter = ListingFilter {
            landlord_id: Some(landlord_id),
            ..Default::default()
        };
        self.search(&filter, page).await
    }

    pub async fn by_property(&self, property_id: i32, page: &PageRequest) -> Result<Page<listings::Model>, ApiError> {
        let filter = ListingFilter {
            property_id: Some(property_id),
            ..Default::default()
        };
        self.search(&filter, page).await
    }

    /// Landlords see their own listings; admins see everything.
    pub async fn analytics(&self, actor: &Principal, city: Option<&str>) -> Result<ListingAnalytics, ApiError> {
        authorize(actor, Capability::ManageListings)?;
        let landlord_id = (!actor.is_admin()).then_some(actor.user_id);

        let all = ListingFilter {
            landlord_id,
            ..Default::default()
        };
        let active = ListingFilter {
            landlord_id,
            ..Self::active_filter()
        };
        let featured = ListingFilter {
            featured: Some(true),
            ..active.clone()
        };
        let active_in_city = match city {
            Some(city) => Some(
                self.count(&ListingFilter {
                    city: Some(city.to_string()),
                    ..active.clone()
                })
                .await?,
            ),
            None => None,
        };

        Ok(ListingAnalytics {
            total: self.count(&all).await?,
            active: self.count(&active).await?,
            featured: self.count(&featured).await?,
            active_in_city,
        })
    }
}
