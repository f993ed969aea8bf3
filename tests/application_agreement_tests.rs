mod common;

use chrono::Duration;
use rental_backend::entities::{
    agreements::AgreementStatus, applications::ApplicationStatus, listings, properties, users,
    users::Role,
};
use rental_backend::error::ApiError;
use rental_backend::models::agreement::{CreateAgreementRequest, SignRequest};
use rental_backend::models::application::ReviewRequest;
use rental_backend::queries::application::ApplicationFilter;
use rental_backend::queries::pagination::PageRequest;
use rental_backend::AppState;
use rust_decimal_macros::dec;
use serde_json::json;

use crate::common::{
    application_payload, at, principal, seed_listing, seed_property, seed_user, test_state,
};

struct Fixture {
    state: AppState,
    landlord: users::Model,
    tenant: users::Model,
    property: properties::Model,
    listing: listings::Model,
}

async fn fixture() -> Fixture {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;
    let tenant = seed_user(&state.db, "tenant1", Role::Tenant).await;
    let property = seed_property(&state, &landlord, dec!(1500)).await;
    let listing = seed_listing(&state, &landlord, &property).await;
    Fixture {
        state,
        landlord,
        tenant,
        property,
        listing,
    }
}

async fn apply(
    fx: &Fixture,
    tenant: &users::Model,
    credit_score: i32,
) -> rental_backend::entities::applications::Model {
    let request = serde_json::from_value(application_payload(fx.listing.id, credit_score, dec!(5000))).unwrap();
    fx.state
        .applications
        .create(&principal(tenant), request)
        .await
        .unwrap()
}

fn agreement_request(application_id: i32) -> CreateAgreementRequest {
    serde_json::from_value(json!({
        "applicationId": application_id,
        "startDate": at(Duration::days(30)),
        "endDate": at(Duration::days(395)),
        "rentAmount": "1500",
        "securityDeposit": "1500",
        "leaseTermMonths": 12,
        "paymentDueDay": 1
    }))
    .unwrap()
}

#[tokio::test]
async fn test_application_defaults_from_listing() {
    let fx = fixture().await;
    let application = apply(&fx, &fx.tenant, 700).await;

    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.property_id, fx.property.id);
    assert_eq!(application.tenant_id, fx.tenant.id);
    assert_eq!(application.occupants_count, 1);
    assert!(!application.fee_paid);
}

#[tokio::test]
async fn test_credit_score_range() {
    let fx = fixture().await;
    let application = apply(&fx, &fx.tenant, 700).await;
    let admin = seed_user(&fx.state.db, "admin", Role::Admin).await;
    let page = PageRequest::default();

    let found = fx
        .state
        .applications
        .by_credit_score(&principal(&admin), 650, 750, &page)
        .await
        .unwrap();
    assert_eq!(found.total_elements, 1);
    assert_eq!(found.content[0].id, application.id);

    let missed = fx
        .state
        .applications
        .by_credit_score(&principal(&admin), 710, 800, &page)
        .await
        .unwrap();
    assert!(missed.content.is_empty());

    let edge = fx
        .state
        .applications
        .by_credit_score(&principal(&admin), 700, 700, &page)
        .await
        .unwrap();
    assert_eq!(edge.total_elements, 1);
}

#[tokio::test]
async fn test_income_range_is_inclusive() {
    let fx = fixture().await;
    let application = apply(&fx, &fx.tenant, 700).await;
    let admin = principal(&seed_user(&fx.state.db, "admin", Role::Admin).await);
    let page = PageRequest::default();

    let exact = fx
        .state
        .applications
        .by_income(&admin, dec!(5000), dec!(5000), &page)
        .await
        .unwrap();
    assert_eq!(exact.total_elements, 1);
    assert_eq!(exact.content[0].id, application.id);

    let above = fx
        .state
        .applications
        .by_income(&admin, dec!(5000.01), dec!(9000), &page)
        .await
        .unwrap();
    assert!(above.content.is_empty());
}

#[tokio::test]
async fn test_application_create_then_get_round_trips() {
    let fx = fixture().await;
    let created = apply(&fx, &fx.tenant, 700).await;

    let fetched = fx
        .state
        .applications
        .get(&principal(&fx.tenant), created.id)
        .await
        .unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.listing_id, fx.listing.id);
}

#[tokio::test]
async fn test_invalid_credit_score_rejected() {
    let fx = fixture().await;
    let request = serde_json::from_value(application_payload(fx.listing.id, 900, dec!(5000))).unwrap();

    let result = fx.state.applications.create(&principal(&fx.tenant), request).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn test_reads_are_scoped_to_the_caller() {
    let fx = fixture().await;
    let other_tenant = seed_user(&fx.state.db, "tenant2", Role::Tenant).await;
    apply(&fx, &fx.tenant, 700).await;
    apply(&fx, &other_tenant, 720).await;
    let page = PageRequest::default();

    let mine = fx.state.applications.list(&principal(&fx.tenant), &page).await.unwrap();
    assert_eq!(mine.total_elements, 1);
    assert_eq!(mine.content[0].tenant_id, fx.tenant.id);

    let landlord_view = fx
        .state
        .applications
        .list(&principal(&fx.landlord), &page)
        .await
        .unwrap();
    assert_eq!(landlord_view.total_elements, 2);

    let stranger = seed_user(&fx.state.db, "someone", Role::User).await;
    let result = fx.state.applications.list(&principal(&stranger), &page).await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[tokio::test]
async fn test_status_filter_any_of() {
    let fx = fixture().await;
    let admin = seed_user(&fx.state.db, "admin", Role::Admin).await;
    let first = apply(&fx, &fx.tenant, 700).await;
    apply(&fx, &fx.tenant, 710).await;

    fx.state
        .applications
        .update_status(&principal(&fx.tenant), first.id, ApplicationStatus::Withdrawn)
        .await
        .unwrap();

    let page = PageRequest::default();
    let withdrawn = fx
        .state
        .applications
        .search(
            &principal(&admin),
            ApplicationFilter::with_statuses(&[ApplicationStatus::Withdrawn]),
            &page,
        )
        .await
        .unwrap();
    assert_eq!(withdrawn.total_elements, 1);
    assert_eq!(withdrawn.content[0].id, first.id);

    let both = ApplicationFilter::with_statuses(&[ApplicationStatus::Withdrawn, ApplicationStatus::Pending]);
    assert_eq!(fx.state.applications.count(&principal(&admin), both).await.unwrap(), 2);

    let none = ApplicationFilter::with_statuses(&[ApplicationStatus::Approved]);
    assert_eq!(fx.state.applications.count(&principal(&admin), none).await.unwrap(), 0);
}

#[tokio::test]
async fn test_review_records_reviewer_and_blocks_reopening() {
    let fx = fixture().await;
    let application = apply(&fx, &fx.tenant, 700).await;

    let reviewed = fx
        .state
        .applications
        .review(
            &principal(&fx.landlord),
            application.id,
            ReviewRequest {
                status: ApplicationStatus::Rejected,
                rejection_reason: Some("Incomplete references".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(reviewed.status, ApplicationStatus::Rejected);
    assert_eq!(reviewed.reviewed_by, Some(fx.landlord.id));
    assert!(reviewed.reviewed_at.is_some());
    assert_eq!(reviewed.rejection_reason.as_deref(), Some("Incomplete references"));

    let reopen = fx
        .state
        .applications
        .update_status(&principal(&fx.landlord), application.id, ApplicationStatus::Pending)
        .await;
    assert!(matches!(reopen, Err(ApiError::Conflict(_))));
}

#[tokio::test]
async fn test_tenant_cannot_review() {
    let fx = fixture().await;
    let application = apply(&fx, &fx.tenant, 700).await;

    let result = fx
        .state
        .applications
        .review(
            &principal(&fx.tenant),
            application.id,
            ReviewRequest {
                status: ApplicationStatus::Approved,
                rejection_reason: None,
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[tokio::test]
async fn test_analytics_counts() {
    let fx = fixture().await;
    let first = apply(&fx, &fx.tenant, 700).await;
    apply(&fx, &fx.tenant, 720).await;

    fx.state
        .applications
        .review(
            &principal(&fx.landlord),
            first.id,
            ReviewRequest {
                status: ApplicationStatus::Approved,
                rejection_reason: None,
            },
        )
        .await
        .unwrap();

    let analytics = fx.state.applications.analytics(&principal(&fx.landlord)).await.unwrap();
    assert_eq!(analytics.total, 2);
    assert_eq!(analytics.pending, 1);
    assert_eq!(analytics.approved, 1);
    assert_eq!(analytics.rejected, 0);
    assert_eq!(analytics.overdue, 0);
    assert_eq!(analytics.with_pets, 0);
}

#[tokio::test]
async fn test_agreement_requires_approved_application() {
    let fx = fixture().await;
    let application = apply(&fx, &fx.tenant, 700).await;

    let result = fx
        .state
        .agreements
        .create(&principal(&fx.landlord), agreement_request(application.id))
        .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn test_both_signatures_activate_agreement() {
    let fx = fixture().await;
    let application = apply(&fx, &fx.tenant, 700).await;
    fx.state
        .applications
        .review(
            &principal(&fx.landlord),
            application.id,
            ReviewRequest {
                status: ApplicationStatus::Approved,
                rejection_reason: None,
            },
        )
        .await
        .unwrap();

    let agreement = fx
        .state
        .agreements
        .create(&principal(&fx.landlord), agreement_request(application.id))
        .await
        .unwrap();
    assert_eq!(agreement.status, AgreementStatus::Draft);
    assert!(agreement.agreement_number.starts_with("AGR-"));
    assert_eq!(agreement.tenant_id, fx.tenant.id);

    let half = fx
        .state
        .agreements
        .sign(
            &principal(&fx.tenant),
            agreement.id,
            SignRequest {
                signature: "T. Tenant".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(half.status, AgreementStatus::PendingSignature);
    assert!(half.signed_at.is_none());

    let signed = fx
        .state
        .agreements
        .sign(
            &principal(&fx.landlord),
            agreement.id,
            SignRequest {
                signature: "L. Landlord".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(signed.status, AgreementStatus::Active);
    assert!(signed.signed_by_tenant && signed.signed_by_landlord);
    assert!(signed.signed_at.is_some());
    assert_eq!(signed.effective_date, Some(agreement.start_date));

    let fetched = fx
        .state
        .agreements
        .get(&principal(&fx.landlord), agreement.id)
        .await
        .unwrap();
    assert_eq!(fetched, signed);

    let by_number = fx
        .state
        .agreements
        .by_number(&principal(&fx.tenant), &agreement.agreement_number)
        .await
        .unwrap();
    assert_eq!(by_number.id, agreement.id);
}

#[tokio::test]
async fn test_stranger_cannot_sign() {
    let fx = fixture().await;
    let application = apply(&fx, &fx.tenant, 700).await;
    fx.state
        .applications
        .review(
            &principal(&fx.landlord),
            application.id,
            ReviewRequest {
                status: ApplicationStatus::Approved,
                rejection_reason: None,
            },
        )
        .await
        .unwrap();
    let agreement = fx
        .state
        .agreements
        .create(&principal(&fx.landlord), agreement_request(application.id))
        .await
        .unwrap();

    let stranger = seed_user(&fx.state.db, "tenant2", Role::Tenant).await;
    let result = fx
        .state
        .agreements
        .sign(
            &principal(&stranger),
            agreement.id,
            SignRequest {
                signature: "Nobody".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}
