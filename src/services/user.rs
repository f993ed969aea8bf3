//! User Service

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter,
};
use tracing::info;

use crate::auth::access::{Capability, Principal, authorize, ensure_owner};
use crate::entities::{prelude::*, users};
use crate::error::ApiError;
use crate::models::user::UpdateUserRequest;
use crate::queries::pagination::{Page, PageRequest, fetch_page};

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub(crate) async fn find(&self, id: i32) -> Result<users::Model, ApiError> {
        Users::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::not_found("User", id))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, ApiError> {
        Ok(Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    pub async fn exists_by_username(&self, username: &str) -> Result<bool, ApiError> {
        Ok(Users::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.db)
            .await?
            > 0)
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool, ApiError> {
        Ok(Users::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await?
            > 0)
    }

    /// Own profile, or any profile for admins.
    pub async fn get(&self, actor: &Principal, id: i32) -> Result<users::Model, ApiError> {
        ensure_owner(actor, id)?;
        self.find(id).await
    }

    pub async fn list(&self, actor: &Principal, page: &PageRequest) -> Result<Page<users::Model>, ApiError> {
        authorize(actor, Capability::ManageUsers)?;
        fetch_page(&self.db, Users::find(), page).await
    }

    pub async fn update(&self, actor: &Principal, id: i32, patch: UpdateUserRequest) -> Result<users::Model, ApiError> {
        ensure_owner(actor, id)?;
        if patch.touches_admin_fields() {
            authorize(actor, Capability::ManageUsers)?;
        }
        patch.validate().map_err(ApiError::Validation)?;

        let existing = self.find(id).await?;
        if let Some(email) = patch.email.value() {
            if *email != existing.email && self.exists_by_email(email).await? {
                return Err(ApiError::Conflict("Email is already in use".into()));
            }
        }

        let mut model = existing.into_active_model();
        patch.email.apply_required("email", &mut model.email)?;
        patch.first_name.apply_nullable(&mut model.first_name);
        patch.last_name.apply_nullable(&mut model.last_name);
        patch.phone.apply_nullable(&mut model.phone);
        patch.address.apply_nullable(&mut model.address);
        patch.city.apply_nullable(&mut model.city);
        patch.state.apply_nullable(&mut model.state);
        patch.zip_code.apply_nullable(&mut model.zip_code);
        patch.profile_image.apply_nullable(&mut model.profile_image);
        patch.bio.apply_nullable(&mut model.bio);
        patch.company_name.apply_nullable(&mut model.company_name);
        patch.license_number.apply_nullable(&mut model.license_number);
        patch.tax_id.apply_nullable(&mut model.tax_id);
        patch.employment_status.apply_nullable(&mut model.employment_status);
        patch.employer_name.apply_nullable(&mut model.employer_name);
        patch.employer_phone.apply_nullable(&mut model.employer_phone);
        patch.monthly_income.apply_nullable(&mut model.monthly_income);
        patch.credit_score.apply_nullable(&mut model.credit_score);
        patch.rental_history.apply_nullable(&mut model.rental_history);
        patch.role.apply_required("role", &mut model.role)?;
        patch.email_verified.apply_required("emailVerified", &mut model.email_verified)?;
        patch.phone_verified.apply_required("phoneVerified", &mut model.phone_verified)?;
        patch.identity_verified.apply_required("identityVerified", &mut model.identity_verified)?;
        patch
            .landlord_background_check_passed
            .apply_required("landlordBackgroundCheckPassed", &mut model.landlord_background_check_passed)?;
        patch
            .tenant_background_check_passed
            .apply_required("tenantBackgroundCheckPassed", &mut model.tenant_background_check_passed)?;

        let user = model.update(&self.db).await?;
        info!(id, "User updated");
        Ok(user)
    }

    pub async fn delete(&self, actor: &Principal, id: i32) -> Result<(), ApiError> {
        authorize(actor, Capability::ManageUsers)?;
        self.find(id).await?;

        Users::delete_by_id(id).exec(&self.db).await?;
        info!(id, "User deleted");
        Ok(())
    }
}
