//! `SeaORM` entity re-exports

pub use super::agreements::Entity as Agreements;
pub use super::applications::Entity as Applications;
pub use super::listings::Entity as Listings;
pub use super::payments::Entity as Payments;
pub use super::properties::Entity as Properties;
pub use super::property_amenities::Entity as PropertyAmenities;
pub use super::users::Entity as Users;
