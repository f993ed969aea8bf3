//! Auth and user profile request/response models

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::users::{self, Role};
use crate::models::patch::Patch;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex");
}

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn validate_email(email: &str) -> Result<(), String> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(format!("Invalid email address: {email}"))
    }
}

pub fn validate_credit_score(score: i32) -> Result<(), String> {
    if (300..=850).contains(&score) {
        Ok(())
    } else {
        Err("creditScore must be between 300 and 850".to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// TENANT or LANDLORD; anything omitted registers a plain USER
    pub user_type: Option<Role>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), String> {
        let len = self.username.chars().count();
        if !(3..=50).contains(&len) {
            return Err("username must be between 3 and 50 characters".to_string());
        }
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!("password must be at least {MIN_PASSWORD_LEN} characters"));
        }
        if self.user_type == Some(Role::Admin) {
            return Err("ADMIN cannot be self-assigned".to_string());
        }
        Ok(())
    }

    pub fn role(&self) -> Role {
        self.user_type.unwrap_or(Role::User)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: users::Model,
}

/// Profile update. Verification flags and role are honoured for admins only.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserRequest {
    pub email: Patch<String>,
    pub first_name: Patch<String>,
    pub last_name: Patch<String>,
    pub phone: Patch<String>,
    pub address: Patch<String>,
    pub city: Patch<String>,
    pub state: Patch<String>,
    pub zip_code: Patch<String>,
    pub profile_image: Patch<String>,
    pub bio: Patch<String>,
    pub company_name: Patch<String>,
    pub license_number: Patch<String>,
    pub tax_id: Patch<String>,
    pub employment_status: Patch<String>,
    pub employer_name: Patch<String>,
    pub employer_phone: Patch<String>,
    pub monthly_income: Patch<Decimal>,
    pub credit_score: Patch<i32>,
    pub rental_history: Patch<String>,

    // Admin only
    pub role: Patch<Role>,
    pub email_verified: Patch<bool>,
    pub phone_verified: Patch<bool>,
    pub identity_verified: Patch<bool>,
    pub landlord_background_check_passed: Patch<bool>,
    pub tenant_background_check_passed: Patch<bool>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(email) = self.email.value() {
            validate_email(email)?;
        }
        if let Some(income) = self.monthly_income.value() {
            if *income <= Decimal::ZERO {
                return Err("monthlyIncome must be positive".to_string());
            }
        }
        if let Some(score) = self.credit_score.value() {
            validate_credit_score(*score)?;
        }
        Ok(())
    }

    pub fn touches_admin_fields(&self) -> bool {
        !(self.role.is_absent()
            && self.email_verified.is_absent()
            && self.phone_verified.is_absent()
            && self.identity_verified.is_absent()
            && self.landlord_background_check_passed.is_absent()
            && self.tenant_background_check_passed.is_absent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
            phone: None,
            user_type: None,
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(register("alice", "alice@example.com", "secret1").validate().is_ok());
        assert!(register("al", "alice@example.com", "secret1").validate().is_err());
        assert!(register("alice", "not-an-email", "secret1").validate().is_err());
        assert!(register("alice", "alice@example.com", "12345").validate().is_err());
    }

    #[test]
    fn test_register_role() {
        let mut req = register("alice", "alice@example.com", "secret1");
        assert_eq!(req.role(), Role::User);
        req.user_type = Some(Role::Landlord);
        assert_eq!(req.role(), Role::Landlord);
        req.user_type = Some(Role::Admin);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_flags_admin_fields() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"bio": "hi"}"#).unwrap();
        assert!(!req.touches_admin_fields());
        let req: UpdateUserRequest = serde_json::from_str(r#"{"emailVerified": true}"#).unwrap();
        assert!(req.touches_admin_fields());
    }

    #[test]
    fn test_update_rejects_bad_credit_score() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"creditScore": 900}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
