//! Auth Service: registration and login.

use sea_orm::{ActiveModelTrait, DatabaseConnection, ActiveValue::Set};
use tracing::{info, warn};

use crate::auth::access::Principal;
use crate::auth::password::{hash_password, verify_dummy, verify_password};
use crate::auth::token::TokenService;
use crate::entities::users;
use crate::error::ApiError;
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest};
use crate::services::user::UserService;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    users: UserService,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, tokens: TokenService) -> Self {
        Self {
            users: UserService::new(db.clone()),
            db,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<users::Model, ApiError> {
        request.validate().map_err(ApiError::Validation)?;

        if self.users.exists_by_username(&request.username).await? {
            return Err(ApiError::Conflict("Username is already taken".into()));
        }
        if self.users.exists_by_email(&request.email).await? {
            return Err(ApiError::Conflict("Email is already in use".into()));
        }

        let role = request.role();
        let password_hash = hash_password(&request.password)?;

        let user = users::ActiveModel {
            username: Set(request.username),
            email: Set(request.email),
            password_hash: Set(password_hash),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            phone: Set(request.phone),
            role: Set(role),
            email_verified: Set(false),
            phone_verified: Set(false),
            identity_verified: Set(false),
            landlord_background_check_passed: Set(false),
            tenant_background_check_passed: Set(false),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(id = user.id, username = %user.username, role = role.as_str(), "User registered");
        Ok(user)
    }

    /// Unknown user and wrong password fail the same way.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ApiError> {
        let Some(user) = self.users.find_by_username(&request.username).await? else {
            verify_dummy(&request.password);
            warn!(username = %request.username, "Login for unknown user");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
        };

        if !verify_password(&request.password, &user.password_hash)? {
            warn!(user_id = user.id, "Login with wrong password");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let token = self.tokens.issue(user.id, &user.username, user.role)?;
        info!(user_id = user.id, "User logged in");

        Ok(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.lifetime_secs(),
            user,
        })
    }

    pub async fn me(&self, principal: &Principal) -> Result<users::Model, ApiError> {
        self.users.find(principal.user_id).await
    }
}
