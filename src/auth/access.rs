//! Capability checks invoked by services.
//!
//! Handlers only extract the caller; whether the caller may perform an
//! operation is decided here, so the rules hold for any transport.

use crate::entities::users::Role;
use crate::error::ApiError;

/// The authenticated caller of a service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: i32, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageProperties,
    ManageListings,
    ManageAgreements,
    ReviewApplications,
    SubmitApplications,
    ViewTenantApplications,
    MakePayments,
    ManagePayments,
    ViewAnalytics,
    ManageUsers,
    AuditReviews,
    ViewDashboard,
}

impl Capability {
    /// Roles granted this capability. Admin is implied for all of them.
    fn roles(self) -> &'static [Role] {
        use Capability::*;
        match self {
            ManageProperties | ManageListings | ManageAgreements | ReviewApplications
            | ManagePayments => &[Role::Landlord],
            SubmitApplications | ViewTenantApplications => &[Role::Tenant],
            MakePayments => &[Role::Tenant, Role::Landlord],
            ViewAnalytics | ManageUsers | AuditReviews => &[],
            ViewDashboard => &[Role::User, Role::Tenant, Role::Landlord],
        }
    }
}

pub fn has_capability(principal: &Principal, capability: Capability) -> bool {
    principal.is_admin() || capability.roles().contains(&principal.role)
}

pub fn authorize(principal: &Principal, capability: Capability) -> Result<(), ApiError> {
    if has_capability(principal, capability) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = principal.user_id,
            role = principal.role.as_str(),
            ?capability,
            "Capability denied"
        );
        Err(ApiError::Forbidden(format!(
            "Role {} may not perform this operation",
            principal.role.as_str()
        )))
    }
}

/// Passes for the owning user or an admin.
pub fn ensure_owner(principal: &Principal, owner_id: i32) -> Result<(), ApiError> {
    if principal.is_admin() || principal.user_id == owner_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only the owner may modify this record".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_every_capability() {
        let admin = Principal::new(1, "root", Role::Admin);
        assert!(authorize(&admin, Capability::ManageProperties).is_ok());
        assert!(authorize(&admin, Capability::SubmitApplications).is_ok());
        assert!(authorize(&admin, Capability::ViewAnalytics).is_ok());
    }

    #[test]
    fn test_tenant_cannot_manage_properties() {
        let tenant = Principal::new(2, "tina", Role::Tenant);
        assert!(matches!(
            authorize(&tenant, Capability::ManageProperties),
            Err(ApiError::Forbidden(_))
        ));
        assert!(authorize(&tenant, Capability::SubmitApplications).is_ok());
    }

    #[test]
    fn test_generic_user_only_sees_dashboard() {
        let user = Principal::new(3, "uma", Role::User);
        assert!(authorize(&user, Capability::ViewDashboard).is_ok());
        assert!(authorize(&user, Capability::MakePayments).is_err());
    }

    #[test]
    fn test_ownership() {
        let landlord = Principal::new(5, "lee", Role::Landlord);
        assert!(ensure_owner(&landlord, 5).is_ok());
        assert!(ensure_owner(&landlord, 6).is_err());
        assert!(ensure_owner(&Principal::new(1, "root", Role::Admin), 6).is_ok());
    }
}
