#![allow(dead_code)]

use axum::Router;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};

use rental_backend::auth::access::Principal;
use rental_backend::auth::token::TokenService;
use rental_backend::entities::{listings, properties, users, users::Role};
use rental_backend::{AppState, build_router};

pub const TEST_JWT_SECRET: &str = "integration-test-secret-integration-test-secret";

/// Fresh in-memory SQLite database with the schema applied.
///
/// One connection only: every new SQLite `:memory:` connection is a separate
/// empty database.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn test_tokens() -> TokenService {
    TokenService::new(TEST_JWT_SECRET, 3600)
}

pub async fn test_state() -> AppState {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    AppState::new(db, test_tokens())
}

pub fn test_router(state: AppState) -> Router {
    build_router(state, None)
}

/// Whole seconds in UTC; SQLite compares timestamps as text.
pub fn at(offset: Duration) -> DateTime<chrono::FixedOffset> {
    (Utc::now() + offset).trunc_subsecs(0).fixed_offset()
}

pub fn principal(user: &users::Model) -> Principal {
    Principal::new(user.id, &user.username, user.role)
}

pub fn bearer(state: &AppState, user: &users::Model) -> String {
    let token = state
        .tokens
        .issue(user.id, &user.username, user.role)
        .expect("Failed to issue token");
    format!("Bearer {token}")
}

/// Insert a user directly; the password hash is a placeholder.
pub async fn seed_user(db: &DatabaseConnection, username: &str, role: Role) -> users::Model {
    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        password_hash: Set("not-a-real-hash".to_string()),
        first_name: Set(Some("Test".to_string())),
        last_name: Set(Some(username.to_string())),
        role: Set(role),
        email_verified: Set(false),
        phone_verified: Set(false),
        identity_verified: Set(false),
        landlord_background_check_passed: Set(false),
        tenant_background_check_passed: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed user")
}

pub fn property_payload(rent: Decimal) -> Value {
    json!({
        "title": "Sunny two bedroom",
        "description": "Close to the park",
        "address": "12 Elm Street",
        "city": "Springfield",
        "state": "IL",
        "zipCode": "62701",
        "rentAmount": rent,
        "securityDeposit": rent,
        "bedrooms": 2,
        "bathrooms": 1,
        "squareFootage": 850,
        "propertyType": "APARTMENT",
        "furnishingStatus": "UNFURNISHED",
        "amenities": ["parking", "laundry"],
        "availableDate": at(Duration::days(10)),
        "leaseTermMonths": 12,
        "petsAllowed": true,
        "latitude": 39.78,
        "longitude": -89.65
    })
}

pub async fn seed_property(state: &AppState, landlord: &users::Model, rent: Decimal) -> properties::Model {
    let request = serde_json::from_value(property_payload(rent)).expect("Invalid property payload");
    state
        .properties
        .create(&principal(landlord), request)
        .await
        .expect("Failed to seed property")
        .property
}

pub async fn seed_listing(state: &AppState, landlord: &users::Model, property: &properties::Model) -> listings::Model {
    let request = serde_json::from_value(json!({
        "propertyId": property.id,
        "title": property.title,
        "description": "Now leasing",
        "rentAmount": property.rent_amount,
        "securityDeposit": property.security_deposit,
        "availableDate": property.available_date,
        "leaseTermMonths": property.lease_term_months,
        "expiresAt": at(Duration::days(60))
    }))
    .expect("Invalid listing payload");

    state
        .listings
        .create(&principal(landlord), request)
        .await
        .expect("Failed to seed listing")
}

pub fn application_payload(listing_id: i32, credit_score: i32, income: Decimal) -> Value {
    json!({
        "listingId": listing_id,
        "coverLetter": "I would love to live here",
        "monthlyIncome": income,
        "employmentStatus": "EMPLOYED",
        "employerName": "Acme",
        "employerPhone": "555-0100",
        "rentalHistory": "Five years, no incidents",
        "creditScore": credit_score,
        "moveInDate": at(Duration::days(20)),
        "leaseTermPreference": 12
    })
}

pub fn payment_payload(property_id: i32, tenant_id: i32, amount: Decimal) -> Value {
    json!({
        "propertyId": property_id,
        "tenantId": tenant_id,
        "type": "RENT",
        "amount": amount,
        "paymentDate": at(Duration::zero()),
        "dueDate": at(Duration::days(5)),
        "method": "BANK_TRANSFER"
    })
}
