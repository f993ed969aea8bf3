//! Property Service
//!
//! Properties and their amenity rows. Amenities are always written in the
//! same transaction as the property row.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, TransactionTrait,
    ActiveValue::Set,
};
use tracing::{debug, info};

use crate::auth::access::{Capability, Principal, authorize, ensure_owner};
use crate::entities::properties::{self, PropertyStatus};
use crate::entities::{prelude::*, property_amenities};
use crate::error::ApiError;
use crate::models::property::{
    CreatePropertyRequest, PropertyAnalytics, PropertyResponse, UpdatePropertyRequest,
};
use crate::queries::geo::NearQuery;
use crate::queries::pagination::{Page, PageRequest, SortDir, fetch_all, fetch_page};
use crate::queries::property::{self as property_query, PropertyFilter};
use crate::services::support::{days_from_now, referenced_user};

pub const EXPIRING_SOON_DAYS: i64 = 30;

/// Trimmed, de-duplicated amenity names in first-seen order
fn normalize_amenities(amenities: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(amenities.len());
    for amenity in amenities {
        let amenity = amenity.trim().to_string();
        if !amenity.is_empty() && !seen.contains(&amenity) {
            seen.push(amenity);
        }
    }
    seen
}

async fn replace_amenities<C: ConnectionTrait>(
    conn: &C,
    property_id: i32,
    amenities: Vec<String>,
) -> Result<Vec<String>, ApiError> {
    PropertyAmenities::delete_many()
        .filter(property_amenities::Column::PropertyId.eq(property_id))
        .exec(conn)
        .await?;

    let amenities = normalize_amenities(amenities);
    if !amenities.is_empty() {
        let rows = amenities.iter().map(|amenity| property_amenities::ActiveModel {
            property_id: Set(property_id),
            amenity: Set(amenity.clone()),
            ..Default::default()
        });
        PropertyAmenities::insert_many(rows).exec(conn).await?;
    }
    Ok(amenities)
}

#[derive(Clone)]
pub struct PropertyService {
    db: DatabaseConnection,
}

impl PropertyService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub(crate) async fn find(&self, id: i32) -> Result<properties::Model, ApiError> {
        Properties::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::not_found("Property", id))
    }

    async fn amenities_by_property(&self, ids: &[i32]) -> Result<HashMap<i32, Vec<String>>, ApiError> {
        let mut by_property: HashMap<i32, Vec<String>> = HashMap::new();
        if ids.is_empty() {
            return Ok(by_property);
        }

        let rows = PropertyAmenities::find()
            .filter(property_amenities::Column::PropertyId.is_in(ids.iter().copied()))
            .order_by_asc(property_amenities::Column::Id)
            .all(&self.db)
            .await?;

        for row in rows {
            by_property.entry(row.property_id).or_default().push(row.amenity);
        }
        Ok(by_property)
    }

    async fn with_amenities(&self, properties: Vec<properties::Model>) -> Result<Vec<PropertyResponse>, ApiError> {
        let ids: Vec<i32> = properties.iter().map(|p| p.id).collect();
        let mut amenities = self.amenities_by_property(&ids).await?;

        Ok(properties
            .into_iter()
            .map(|property| PropertyResponse {
                amenities: amenities.remove(&property.id).unwrap_or_default(),
                property,
            })
            .collect())
    }

    async fn page_with_amenities(&self, page: Page<properties::Model>) -> Result<Page<PropertyResponse>, ApiError> {
        let Page { content, page, size, total_elements, total_pages } = page;
        Ok(Page {
            content: self.with_amenities(content).await?,
            page,
            size,
            total_elements,
            total_pages,
        })
    }

    pub async fn get(&self, id: i32) -> Result<PropertyResponse, ApiError> {
        let property = self.find(id).await?;
        let mut responses = self.with_amenities(vec![property]).await?;
        responses.pop().ok_or_else(|| ApiError::not_found("Property", id))
    }

    pub async fn list(&self, page: &PageRequest) -> Result<Page<PropertyResponse>, ApiError> {
        self.search(&PropertyFilter::default(), page).await
    }

    pub async fn search(
        &self,
        filter: &PropertyFilter,
        page: &PageRequest,
    ) -> Result<Page<PropertyResponse>, ApiError> {
        debug!(?filter, "Searching properties");
        let found = fetch_page(&self.db, Properties::find().filter(filter.condition()), page).await?;
        self.page_with_amenities(found).await
    }

    pub async fn search_all(&self, filter: &PropertyFilter) -> Result<Vec<PropertyResponse>, ApiError> {
        let found = fetch_all(&self.db, Properties::find().filter(filter.condition())).await?;
        self.with_amenities(found).await
    }

    pub async fn count(&self, filter: &PropertyFilter) -> Result<u64, ApiError> {
        Ok(property_query::count(&self.db, filter).await?)
    }

    pub async fn create(
        &self,
        actor: &Principal,
        request: CreatePropertyRequest,
    ) -> Result<PropertyResponse, ApiError> {
        authorize(actor, Capability::ManageProperties)?;
        request.validate().map_err(ApiError::Validation)?;

        // Only admins may create on behalf of someone else
        let landlord_id = match request.landlord_id {
            Some(id) if id != actor.user_id => {
                if !actor.is_admin() {
                    return Err(ApiError::Forbidden("Cannot create properties for another landlord".into()));
                }
                id
            }
            _ => actor.user_id,
        };
        referenced_user(&self.db, landlord_id).await?;

        let txn = self.db.begin().await?;

        let property = properties::ActiveModel {
            title: Set(request.title),
            description: Set(request.description),
            address: Set(request.address),
            city: Set(request.city),
            state: Set(request.state),
            zip_code: Set(request.zip_code),
            rent_amount: Set(request.rent_amount),
            security_deposit: Set(request.security_deposit),
            bedrooms: Set(request.bedrooms),
            bathrooms: Set(request.bathrooms),
            square_footage: Set(request.square_footage),
            property_type: Set(request.property_type),
            furnishing_status: Set(request.furnishing_status),
            image_urls: Set(serde_json::Value::from(request.image_urls)),
            available_date: Set(request.available_date),
            lease_term_months: Set(request.lease_term_months),
            pets_allowed: Set(request.pets_allowed),
            smoking_allowed: Set(request.smoking_allowed),
            status: Set(request.status.unwrap_or(PropertyStatus::Available)),
            landlord_id: Set(landlord_id),
            latitude: Set(request.latitude),
            longitude: Set(request.longitude),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let amenities = replace_amenities(&txn, property.id, request.amenities).await?;
        txn.commit().await?;

        info!(id = property.id, landlord_id, "Property created");
        Ok(PropertyResponse { property, amenities })
    }

    pub async fn update(
        &self,
        actor: &Principal,
        id: i32,
        patch: UpdatePropertyRequest,
    ) -> Result<PropertyResponse, ApiError> {
        authorize(actor, Capability::ManageProperties)?;
        patch.validate().map_err(ApiError::Validation)?;

        let existing = self.find(id).await?;
        ensure_owner(actor, existing.landlord_id)?;

        let mut model = existing.into_active_model();
        patch.title.apply_required("title", &mut model.title)?;
        patch.description.apply_required("description", &mut model.description)?;
        patch.address.apply_required("address", &mut model.address)?;
        patch.city.apply_required("city", &mut model.city)?;
        patch.state.apply_required("state", &mut model.state)?;
        patch.zip_code.apply_required("zipCode", &mut model.zip_code)?;
        patch.rent_amount.apply_required("rentAmount", &mut model.rent_amount)?;
        patch.security_deposit.apply_required("securityDeposit", &mut model.security_deposit)?;
        patch.bedrooms.apply_required("bedrooms", &mut model.bedrooms)?;
        patch.bathrooms.apply_required("bathrooms", &mut model.bathrooms)?;
        patch.square_footage.apply_required("squareFootage", &mut model.square_footage)?;
        patch.property_type.apply_required("propertyType", &mut model.property_type)?;
        patch.furnishing_status.apply_required("furnishingStatus", &mut model.furnishing_status)?;
        patch.available_date.apply_required("availableDate", &mut model.available_date)?;
        patch.lease_term_months.apply_required("leaseTermMonths", &mut model.lease_term_months)?;
        patch.pets_allowed.apply_required("petsAllowed", &mut model.pets_allowed)?;
        patch.smoking_allowed.apply_required("smokingAllowed", &mut model.smoking_allowed)?;
        patch.status.apply_required("status", &mut model.status)?;
        patch.latitude.apply_nullable(&mut model.latitude);
        patch.longitude.apply_nullable(&mut model.longitude);
        if let Some(urls) = patch.image_urls.into_nullable() {
            model.image_urls = Set(serde_json::Value::from(urls.unwrap_or_default()));
        }

        let txn = self.db.begin().await?;
        let property = model.update(&txn).await?;
        let amenities = match patch.amenities.into_nullable() {
            Some(amenities) => Some(replace_amenities(&txn, id, amenities.unwrap_or_default()).await?),
            None => None,
        };
        txn.commit().await?;

        info!(id, "Property updated");
        match amenities {
            Some(amenities) => Ok(PropertyResponse { property, amenities }),
            None => self.get(id).await,
        }
    }

    /// Status moves freely between the operational states.
    pub async fn update_status(
        &self,
        actor: &Principal,
        id: i32,
        status: PropertyStatus,
    ) -> Result<PropertyResponse, ApiError> {
        authorize(actor, Capability::ManageProperties)?;
        let existing = self.find(id).await?;
        ensure_owner(actor, existing.landlord_id)?;

        let mut model = existing.into_active_model();
        model.status = Set(status);
        model.update(&self.db).await?;

        info!(id, status = ?status, "Property status updated");
        self.get(id).await
    }

    pub async fn delete(&self, actor: &Principal, id: i32) -> Result<(), ApiError> {
        authorize(actor, Capability::ManageProperties)?;
        let existing = self.find(id).await?;
        ensure_owner(actor, existing.landlord_id)?;

        Properties::delete_by_id(id).exec(&self.db).await?;
        info!(id, "Property deleted");
        Ok(())
    }

    pub async fn by_landlord(&self, landlord_id: i32) -> Result<Vec<PropertyResponse>, ApiError> {
        self.search_all(&PropertyFilter {
            landlord_id: Some(landlord_id),
            ..Default::default()
        })
        .await
    }

    pub async fn by_landlord_page(
        &self,
        landlord_id: i32,
        page: &PageRequest,
    ) -> Result<Page<PropertyResponse>, ApiError> {
        let filter = PropertyFilter {
            landlord_id: Some(landlord_id),
            ..Default::default()
        };
        self.search(&filter, page).await
    }

    pub async fn count_by_landlord(&self, landlord_id: i32) -> Result<u64, ApiError> {
        self.count(&PropertyFilter {
            landlord_id: Some(landlord_id),
            ..Default::default()
        })
        .await
    }

    pub async fn by_status(&self, status: PropertyStatus) -> Result<Vec<PropertyResponse>, ApiError> {
        self.search_all(&PropertyFilter {
            status: Some(status),
            ..Default::default()
        })
        .await
    }

    /// Available properties within `radius` degrees of a point.
    pub async fn near(&self, near: &NearQuery) -> Result<Vec<PropertyResponse>, ApiError> {
        near.validate()?;

        let candidates = Properties::find()
            .filter(near.bounding_box())
            .filter(properties::Column::Status.eq(PropertyStatus::Available))
            .all(&self.db)
            .await?;

        let found: Vec<_> = candidates
            .into_iter()
            .filter(|p| near.contains(p.latitude, p.longitude))
            .collect();

        debug!(count = found.len(), "Properties near location");
        self.with_amenities(found).await
    }

    /// Available properties, newest first.
    pub async fn featured(&self, page: &PageRequest) -> Result<Page<PropertyResponse>, ApiError> {
        let page = page.clone().sorted("createdAt", SortDir::Desc);
        self.search(
            &PropertyFilter {
                status: Some(PropertyStatus::Available),
                ..Default::default()
            },
            &page,
        )
        .await
    }

    /// Available properties whose available date falls within `days`.
    pub async fn expiring_soon(&self, days: Option<i64>) -> Result<Vec<PropertyResponse>, ApiError> {
        let days = days.unwrap_or(EXPIRING_SOON_DAYS);
        if days < 0 {
            return Err(ApiError::Validation("days cannot be negative".into()));
        }
        self.search_all(&PropertyFilter {
            status: Some(PropertyStatus::Available),
            available_before: Some(days_from_now(days)),
            ..Default::default()
        })
        .await
    }

    pub async fn by_amenities(&self, amenities: Vec<String>) -> Result<Vec<PropertyResponse>, ApiError> {
        let amenities = normalize_amenities(amenities);
        if amenities.is_empty() {
            return Err(ApiError::Validation("at least one amenity is required".into()));
        }
        self.search_all(&PropertyFilter {
            amenities: Some(amenities),
            ..Default::default()
        })
        .await
    }

    /// Landlords see their own portfolio; admins see everything.
    pub async fn analytics(&self, actor: &Principal) -> Result<PropertyAnalytics, ApiError> {
        authorize(actor, Capability::ManageProperties)?;
        let landlord_id = (!actor.is_admin()).then_some(actor.user_id);

        let scoped = |status: Option<PropertyStatus>| PropertyFilter {
            landlord_id,
            status,
            ..Default::default()
        };

        Ok(PropertyAnalytics {
            total: self.count(&scoped(None)).await?,
            available: self.count(&scoped(Some(PropertyStatus::Available))).await?,
            rented: self.count(&scoped(Some(PropertyStatus::Rented))).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_amenities() {
        let normalized = normalize_amenities(vec![
            " pool".into(),
            "gym".into(),
            "pool".into(),
            "".into(),
        ]);
        assert_eq!(normalized, vec!["pool", "gym"]);
    }
}
