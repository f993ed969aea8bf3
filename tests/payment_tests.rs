mod common;

use rental_backend::entities::{
    payments::{self, PaymentStatus},
    users,
    users::Role,
};
use rental_backend::error::ApiError;
use rental_backend::models::payment::{
    PaymentFailureRequest, PaymentStatusRequest, TotalsQuery, UpdatePaymentRequest,
};
use rental_backend::queries::pagination::PageRequest;
use rental_backend::queries::payment::PaymentFilter;
use rental_backend::AppState;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use crate::common::{payment_payload, principal, seed_property, seed_user, test_state};

struct Fixture {
    state: AppState,
    landlord: users::Model,
    tenant: users::Model,
    property_id: i32,
}

async fn fixture() -> Fixture {
    let state = test_state().await;
    let landlord = seed_user(&state.db, "landlord1", Role::Landlord).await;
    let tenant = seed_user(&state.db, "tenant1", Role::Tenant).await;
    let property_id = seed_property(&state, &landlord, dec!(1500)).await.id;
    Fixture {
        state,
        landlord,
        tenant,
        property_id,
    }
}

async fn pay(fx: &Fixture, amount: Decimal) -> payments::Model {
    let request = serde_json::from_value(payment_payload(fx.property_id, fx.tenant.id, amount)).unwrap();
    fx.state
        .payments
        .create(&principal(&fx.tenant), request)
        .await
        .unwrap()
}

fn amount_patch(version: i64, amount: &str) -> UpdatePaymentRequest {
    serde_json::from_value(json!({ "version": version, "amount": amount })).unwrap()
}

#[tokio::test]
async fn test_create_defaults() {
    let fx = fixture().await;
    let payment = pay(&fx, dec!(1500)).await;

    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.version, 0);
    assert_eq!(payment.retry_count, 0);
    assert_eq!(payment.landlord_id, fx.landlord.id);
    assert_eq!(payment.total_amount, dec!(1500));
    assert!(payment.payment_reference.starts_with("PAY-"));
}

#[tokio::test]
async fn test_update_bumps_version() {
    let fx = fixture().await;
    let payment = pay(&fx, dec!(1500)).await;

    let updated = fx
        .state
        .payments
        .update(&principal(&fx.landlord), payment.id, amount_patch(0, "1450"))
        .await
        .unwrap();
    assert_eq!(updated.amount, dec!(1450));
    assert_eq!(updated.version, 1);
    assert_eq!(updated.payment_reference, payment.payment_reference);
}

#[tokio::test]
async fn test_amount_change_recomputes_total() {
    let fx = fixture().await;
    let payment = pay(&fx, dec!(1500)).await;
    let actor = principal(&fx.landlord);

    let updated = fx
        .state
        .payments
        .update(&actor, payment.id, amount_patch(0, "1600"))
        .await
        .unwrap();
    assert_eq!(updated.amount, dec!(1600));
    assert_eq!(updated.total_amount, dec!(1600));

    let explicit = serde_json::from_value(json!({
        "version": updated.version,
        "lateFee": "25",
        "totalAmount": "1700"
    }))
    .unwrap();
    let overridden = fx.state.payments.update(&actor, payment.id, explicit).await.unwrap();
    assert_eq!(overridden.late_fee, dec!(25));
    assert_eq!(overridden.total_amount, dec!(1700));
}

#[tokio::test]
async fn test_create_then_get_round_trips() {
    let fx = fixture().await;
    let created = pay(&fx, dec!(1500)).await;

    let fetched = fx.state.payments.get(&principal(&fx.tenant), created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_due_date_range_is_inclusive() {
    let fx = fixture().await;
    let payment = pay(&fx, dec!(1500)).await;
    let actor = principal(&fx.landlord);

    let exact = PaymentFilter {
        due_from: Some(payment.due_date),
        due_to: Some(payment.due_date),
        ..Default::default()
    };
    assert_eq!(fx.state.payments.count(&actor, exact).await.unwrap(), 1);

    let later = PaymentFilter {
        due_from: Some(payment.due_date + chrono::Duration::seconds(1)),
        ..Default::default()
    };
    assert_eq!(fx.state.payments.count(&actor, later).await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_updates_from_same_version_conflict() {
    let fx = fixture().await;
    let payment = pay(&fx, dec!(1500)).await;
    let actor = principal(&fx.landlord);

    let (first, second) = tokio::join!(
        fx.state.payments.update(&actor, payment.id, amount_patch(0, "1400")),
        fx.state.payments.update(&actor, payment.id, amount_patch(0, "1300")),
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    let conflicts = [&first, &second]
        .iter()
        .filter(|r| matches!(r, Err(ApiError::Conflict(_))))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);

    let stored = fx.state.payments.get(&actor, payment.id).await.unwrap();
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn test_stale_version_is_conflict() {
    let fx = fixture().await;
    let payment = pay(&fx, dec!(1500)).await;

    let result = fx
        .state
        .payments
        .update(&principal(&fx.landlord), payment.id, amount_patch(7, "1400"))
        .await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));
}

#[tokio::test]
async fn test_complete_sets_processed_at_and_blocks_reopening() {
    let fx = fixture().await;
    let payment = pay(&fx, dec!(1500)).await;
    let actor = principal(&fx.landlord);

    let completed = fx
        .state
        .payments
        .update_status(
            &actor,
            payment.id,
            PaymentStatusRequest {
                status: PaymentStatus::Completed,
                version: 0,
                transaction_id: Some("txn-123".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(completed.status, PaymentStatus::Completed);
    assert!(completed.processed_at.is_some());
    assert_eq!(completed.transaction_id.as_deref(), Some("txn-123"));

    let reopen = fx
        .state
        .payments
        .update_status(
            &actor,
            payment.id,
            PaymentStatusRequest {
                status: PaymentStatus::Pending,
                version: completed.version,
                transaction_id: None,
            },
        )
        .await;
    assert!(matches!(reopen, Err(ApiError::Conflict(_))));
}

#[tokio::test]
async fn test_record_failure_schedules_retry() {
    let fx = fixture().await;
    let payment = pay(&fx, dec!(1500)).await;
    let actor = principal(&fx.landlord);

    let failed = fx
        .state
        .payments
        .record_failure(
            &actor,
            payment.id,
            PaymentFailureRequest {
                version: 0,
                reason: "Card declined".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(failed.status, PaymentStatus::Failed);
    assert_eq!(failed.retry_count, 1);
    assert_eq!(failed.failure_reason.as_deref(), Some("Card declined"));
    let next_retry = failed.next_retry_at.unwrap();
    assert!(next_retry > failed.updated_at);

    // Two minutes out, so nothing is due yet
    let due = fx.state.payments.retry_due(&actor, &PageRequest::default()).await.unwrap();
    assert!(due.content.is_empty());

    let strict = PaymentFilter {
        min_retry_count: Some(0),
        ..Default::default()
    };
    assert_eq!(fx.state.payments.count(&actor, strict).await.unwrap(), 1);
}

#[tokio::test]
async fn test_totals_sum_completed_amounts() {
    let fx = fixture().await;
    let actor = principal(&fx.landlord);
    let first = pay(&fx, dec!(1500)).await;
    let second = pay(&fx, dec!(1500)).await;
    pay(&fx, dec!(200)).await;

    for payment in [&first, &second] {
        fx.state
            .payments
            .update_status(
                &actor,
                payment.id,
                PaymentStatusRequest {
                    status: PaymentStatus::Completed,
                    version: payment.version,
                    transaction_id: None,
                },
            )
            .await
            .unwrap();
    }

    let totals = fx.state.payments.totals(&actor, TotalsQuery::default()).await.unwrap();
    assert_eq!(totals.status, PaymentStatus::Completed);
    assert_eq!(totals.count, 2);
    assert_eq!(totals.total_amount, dec!(3000));

    let refunded = fx
        .state
        .payments
        .totals(
            &actor,
            TotalsQuery {
                status: Some(PaymentStatus::Refunded),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(refunded.count, 0);
    assert_eq!(refunded.total_amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_tenant_sees_only_own_payments() {
    let fx = fixture().await;
    pay(&fx, dec!(1500)).await;
    let other = seed_user(&fx.state.db, "tenant2", Role::Tenant).await;

    let page = PageRequest::default();
    let mine = fx.state.payments.list(&principal(&fx.tenant), &page).await.unwrap();
    assert_eq!(mine.total_elements, 1);

    let theirs = fx.state.payments.list(&principal(&other), &page).await.unwrap();
    assert_eq!(theirs.total_elements, 0);
}

#[tokio::test]
async fn test_delete_unknown_payment_is_not_found() {
    let fx = fixture().await;
    let result = fx.state.payments.delete(&principal(&fx.landlord), 4242).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}
