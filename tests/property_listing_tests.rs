mod common;

use rental_backend::entities::{listings::ListingStatus, properties::PropertyStatus, users::Role};
use rental_backend::error::ApiError;
use rental_backend::models::property::UpdatePropertyRequest;
use rental_backend::queries::listing::ListingFilter;
use rental_backend::queries::pagination::PageRequest;
use rental_backend::queries::property::PropertyFilter;
use rust_decimal_macros::dec;
use std::time::Duration;
use serde_json::json;

use crate::common::{principal, seed_listing, seed_property, seed_user, test_state};

#[tokio::test]
async fn test_rent_range_finds_listing_on_new_property() {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;

    let property = seed_property(&state, &landlord, dec!(1500)).await;
    assert_eq!(property.status, PropertyStatus::Available);

    let listing = seed_listing(&state, &landlord, &property).await;
    let page = PageRequest::default();

    let in_range = ListingFilter {
        min_rent: Some(dec!(1000)),
        max_rent: Some(dec!(2000)),
        ..Default::default()
    };
    let found = state.listings.search(&in_range, &page).await.unwrap();
    assert_eq!(found.total_elements, 1);
    assert_eq!(found.content[0].id, listing.id);

    let above = ListingFilter {
        min_rent: Some(dec!(1600)),
        ..Default::default()
    };
    let found = state.listings.search(&above, &page).await.unwrap();
    assert!(found.content.is_empty());
}

#[tokio::test]
async fn test_rent_range_bounds_are_inclusive() {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;
    seed_property(&state, &landlord, dec!(1000)).await;
    seed_property(&state, &landlord, dec!(2000)).await;
    seed_property(&state, &landlord, dec!(2500)).await;

    let filter = PropertyFilter {
        min_rent: Some(dec!(1000)),
        max_rent: Some(dec!(2000)),
        ..Default::default()
    };
    let found = state.properties.search_all(&filter).await.unwrap();
    let mut rents: Vec<_> = found.iter().map(|p| p.property.rent_amount).collect();
    rents.sort();
    assert_eq!(rents, vec![dec!(1000), dec!(2000)]);
}

#[tokio::test]
async fn test_create_then_get_round_trips() {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;
    let created = seed_property(&state, &landlord, dec!(1200)).await;

    let fetched = state.properties.get(created.id).await.unwrap();
    assert_eq!(fetched.property, created);
    let mut amenities = fetched.amenities.clone();
    amenities.sort();
    assert_eq!(amenities, vec!["laundry".to_string(), "parking".to_string()]);
}

#[tokio::test]
async fn test_partial_update_keeps_absent_fields() {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;
    let property = seed_property(&state, &landlord, dec!(1500)).await;

    let patch: UpdatePropertyRequest = serde_json::from_value(json!({ "rentAmount": "1750" })).unwrap();
    let updated = state
        .properties
        .update(&principal(&landlord), property.id, patch)
        .await
        .unwrap()
        .property;

    assert_eq!(updated.rent_amount, dec!(1750));
    assert_eq!(updated.title, property.title);
    assert_eq!(updated.city, property.city);
    assert_eq!(updated.latitude, property.latitude);
    assert_eq!(updated.status, property.status);
}

#[tokio::test]
async fn test_clearing_required_field_is_rejected() {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;
    let property = seed_property(&state, &landlord, dec!(1500)).await;

    let patch: UpdatePropertyRequest = serde_json::from_value(json!({ "title": null })).unwrap();
    let result = state.properties.update(&principal(&landlord), property.id, patch).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn test_status_filter_returns_exact_matches() {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;
    let first = seed_property(&state, &landlord, dec!(1100)).await;
    seed_property(&state, &landlord, dec!(1200)).await;

    state
        .properties
        .update_status(&principal(&landlord), first.id, PropertyStatus::Rented)
        .await
        .unwrap();

    let rented = state.properties.by_status(PropertyStatus::Rented).await.unwrap();
    assert_eq!(rented.len(), 1);
    assert_eq!(rented[0].property.id, first.id);

    let available = state.properties.by_status(PropertyStatus::Available).await.unwrap();
    assert!(available.iter().all(|p| p.property.status == PropertyStatus::Available));
    assert_eq!(available.len(), 1);

    let off_market = state.properties.by_status(PropertyStatus::OffMarket).await.unwrap();
    assert!(off_market.is_empty());
}

#[tokio::test]
async fn test_amenity_search_matches_any() {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;
    let property = seed_property(&state, &landlord, dec!(1500)).await;

    let found = state
        .properties
        .by_amenities(vec!["pool".to_string(), "parking".to_string()])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].property.id, property.id);

    let none = state.properties.by_amenities(vec!["pool".to_string()]).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_delete_unknown_property_is_not_found() {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;

    let result = state.properties.delete(&principal(&landlord), 9999).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_other_landlord_cannot_update_property() {
    let state = test_state().await;
    let owner = seed_user(&state.db, "owner", Role::Landlord).await;
    let other = seed_user(&state.db, "other", Role::Landlord).await;
    let property = seed_property(&state, &owner, dec!(1500)).await;

    let patch: UpdatePropertyRequest = serde_json::from_value(json!({ "rentAmount": "1" })).unwrap();
    let result = state.properties.update(&principal(&other), property.id, patch).await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[tokio::test]
async fn test_tenant_cannot_create_property() {
    let state = test_state().await;
    let tenant = seed_user(&state.db, "tenant1", Role::Tenant).await;
    let request = serde_json::from_value(common::property_payload(dec!(1500))).unwrap();

    let result = state.properties.create(&principal(&tenant), request).await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[tokio::test]
async fn test_record_view_increments_count() {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;
    let property = seed_property(&state, &landlord, dec!(1500)).await;
    let listing = seed_listing(&state, &landlord, &property).await;

    state.listings.record_view(listing.id).await.unwrap();
    let viewed = state.listings.record_view(listing.id).await.unwrap();
    assert_eq!(viewed.view_count, 2);
}

#[tokio::test]
async fn test_record_view_refreshes_updated_at() {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;
    let property = seed_property(&state, &landlord, dec!(1500)).await;
    let listing = seed_listing(&state, &landlord, &property).await;

    tokio::time::sleep(Duration::from_millis(1100)).await;
    let viewed = state.listings.record_view(listing.id).await.unwrap();
    assert_eq!(viewed.view_count, 1);
    assert!(viewed.updated_at > listing.updated_at);
}

#[tokio::test]
async fn test_listing_create_then_get_round_trips() {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;
    let property = seed_property(&state, &landlord, dec!(1500)).await;
    let created = seed_listing(&state, &landlord, &property).await;

    let fetched = state.listings.get(created.id).await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.property_id, property.id);
    assert_eq!(fetched.landlord_id, landlord.id);
    assert_eq!(fetched.status, ListingStatus::Active);
}

#[tokio::test]
async fn test_listing_status_and_active_lookup() {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;
    let property = seed_property(&state, &landlord, dec!(1500)).await;
    let kept = seed_listing(&state, &landlord, &property).await;
    let paused = seed_listing(&state, &landlord, &property).await;

    state
        .listings
        .update_status(&principal(&landlord), paused.id, ListingStatus::Inactive)
        .await
        .unwrap();

    let active = state.listings.active(&PageRequest::default()).await.unwrap();
    assert_eq!(active.total_elements, 1);
    assert_eq!(active.content[0].id, kept.id);
}

#[tokio::test]
async fn test_listing_filter_by_property_city() {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;
    let property = seed_property(&state, &landlord, dec!(1500)).await;
    seed_listing(&state, &landlord, &property).await;

    let page = PageRequest::default();
    let springfield = ListingFilter {
        city: Some("Springfield".to_string()),
        ..Default::default()
    };
    assert_eq!(state.listings.count(&springfield).await.unwrap(), 1);

    let elsewhere = ListingFilter {
        city: Some("Shelbyville".to_string()),
        ..Default::default()
    };
    assert!(state.listings.search(&elsewhere, &page).await.unwrap().content.is_empty());
}
