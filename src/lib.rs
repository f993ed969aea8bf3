// src/lib.rs

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, patch, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use auth::token::TokenService;
use services::{
    agreement::AgreementService, application::ApplicationService, auth::AuthService,
    dashboard::DashboardService, listing::ListingService, payment::PaymentService,
    property::PropertyService, user::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: TokenService,
    pub properties: PropertyService,
    pub listings: ListingService,
    pub applications: ApplicationService,
    pub agreements: AgreementService,
    pub payments: PaymentService,
    pub users: UserService,
    pub auth: AuthService,
    pub dashboard: DashboardService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, tokens: TokenService) -> Self {
        Self {
            properties: PropertyService::new(db.clone()),
            listings: ListingService::new(db.clone()),
            applications: ApplicationService::new(db.clone()),
            agreements: AgreementService::new(db.clone()),
            payments: PaymentService::new(db.clone()),
            users: UserService::new(db.clone()),
            auth: AuthService::new(db.clone(), tokens.clone()),
            dashboard: DashboardService::new(db.clone()),
            tokens,
            db,
        }
    }
}

pub mod config;
pub mod error;

pub mod entities {
    pub mod prelude;
    pub mod agreements;
    pub mod applications;
    pub mod listings;
    pub mod payments;
    pub mod properties;
    pub mod property_amenities;
    pub mod users;
}

pub mod auth {
    pub mod access;
    pub mod extract;
    pub mod password;
    pub mod token;
}

pub mod models {
    pub mod agreement;
    pub mod application;
    pub mod dashboard;
    pub mod listing;
    pub mod patch;
    pub mod payment;
    pub mod property;
    pub mod user;
}

pub mod queries {
    pub mod agreement;
    pub mod application;
    pub mod geo;
    pub mod listing;
    pub mod pagination;
    pub mod params;
    pub mod payment;
    pub mod property;
}

pub mod services {
    pub mod agreement;
    pub mod application;
    pub mod auth;
    pub mod dashboard;
    pub mod listing;
    pub mod payment;
    pub mod property;
    pub mod support;
    pub mod user;
}

pub mod handlers {
    pub mod agreement;
    pub mod application;
    pub mod auth;
    pub mod dashboard;
    pub mod extract;
    pub mod health;
    pub mod listing;
    pub mod payment;
    pub mod property;
    pub mod user;
}

/// Build the `/api` router.
///
/// `cors_origin` of `None` or `*` allows any origin.
pub fn build_router(state: AppState, cors_origin: Option<&str>) -> Router {
    use handlers::{
        agreement::*, application::*, auth::*, dashboard::*, health::*, listing::*, payment::*,
        property::*, user::*,
    };

    let properties = Router::new()
        .route("/", get(list_properties).post(create_property))
        .route("/search", get(search_properties))
        .route("/search/paginated", get(search_properties_paginated))
        .route("/count", get(count_properties))
        .route("/landlord/{id}", get(properties_by_landlord))
        .route("/landlord/{id}/paginated", get(properties_by_landlord_paginated))
        .route("/landlord/{id}/count", get(count_properties_by_landlord))
        .route("/status/{status}", get(properties_by_status))
        .route("/near-location", get(properties_near_location))
        .route("/featured", get(featured_properties))
        .route("/expiring-soon", get(properties_expiring_soon))
        .route("/amenities", get(properties_by_amenities))
        .route("/analytics", get(property_analytics))
        .route(
            "/{id}",
            get(get_property).put(update_property).delete(delete_property),
        )
        .route("/{id}/status", patch(update_property_status));

    let listings = Router::new()
        .route("/", get(list_listings).post(create_listing))
        .route("/search", get(search_listings))
        .route("/count", get(count_listings))
        .route("/active", get(active_listings))
        .route("/featured", get(featured_listings))
        .route("/popular", get(popular_listings))
        .route("/expiring", get(expiring_listings))
        .route("/near-location", get(listings_near_location))
        .route("/landlord/{id}", get(listings_by_landlord))
        .route("/property/{id}", get(listings_by_property))
        .route("/analytics", get(listing_analytics))
        .route(
            "/{id}",
            get(get_listing).put(update_listing).delete(delete_listing),
        )
        .route("/{id}/status", patch(update_listing_status))
        .route("/{id}/view", post(record_listing_view))
        .route("/{id}/featured", patch(set_listing_featured));

    let applications = Router::new()
        .route("/", get(list_applications).post(create_application))
        .route("/search", get(search_applications))
        .route("/count", get(count_applications))
        .route("/pending", get(pending_applications))
        .route("/needing-review", get(applications_needing_review))
        .route("/overdue", get(overdue_applications))
        .route("/tenant/{id}", get(applications_by_tenant))
        .route("/landlord/{id}", get(applications_by_landlord))
        .route("/landlord/{id}/pending", get(pending_applications_by_landlord))
        .route(
            "/landlord/{id}/pending/count",
            get(count_pending_applications_by_landlord),
        )
        .route("/property/{id}", get(applications_by_property))
        .route("/listing/{id}", get(applications_by_listing))
        .route("/status/{status}", get(applications_by_status))
        .route("/credit-score-range", get(applications_by_credit_score))
        .route("/income-range", get(applications_by_income))
        .route("/analytics", get(application_analytics))
        .route(
            "/{id}",
            get(get_application)
                .put(update_application)
                .delete(delete_application),
        )
        .route("/{id}/status", patch(update_application_status))
        .route("/{id}/review", patch(review_application))
        .route("/{id}/fee-paid", patch(mark_application_fee_paid))
        .route("/{id}/validate", get(validate_application));

    let agreements = Router::new()
        .route("/", get(list_agreements).post(create_agreement))
        .route("/search", get(search_agreements))
        .route("/count", get(count_agreements))
        .route("/active", get(active_agreements))
        .route("/expiring", get(expiring_agreements))
        .route("/needing-renewal", get(agreements_needing_renewal))
        .route("/pending-signatures", get(pending_signature_agreements))
        .route("/overdue-signatures", get(overdue_signature_agreements))
        .route("/number/{number}", get(get_agreement_by_number))
        .route(
            "/{id}",
            get(get_agreement).put(update_agreement).delete(delete_agreement),
        )
        .route("/{id}/status", patch(update_agreement_status))
        .route("/{id}/sign", post(sign_agreement))
        .route("/{id}/terminate", post(terminate_agreement));

    let payments = Router::new()
        .route("/", get(list_payments).post(create_payment))
        .route("/search", get(search_payments))
        .route("/count", get(count_payments))
        .route("/overdue", get(overdue_payments))
        .route("/due-soon", get(payments_due_soon))
        .route("/retry-due", get(payments_retry_due))
        .route("/totals", get(payment_totals))
        .route(
            "/{id}",
            get(get_payment).put(update_payment).delete(delete_payment),
        )
        .route("/{id}/status", patch(update_payment_status))
        .route("/{id}/failure", post(record_payment_failure));

    let users = Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user));

    let auth = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/me", get(me));

    let api = Router::new()
        .route("/health", get(health))
        .route("/dashboard", get(get_dashboard))
        .nest("/auth", auth)
        .nest("/users", users)
        .nest("/properties", properties)
        .nest("/listings", listings)
        .nest("/applications", applications)
        .nest("/agreements", agreements)
        .nest("/payments", payments);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin))
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin.filter(|o| *o != "*").map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(_)) => {
            tracing::warn!("Invalid CORS origin, allowing any");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}
