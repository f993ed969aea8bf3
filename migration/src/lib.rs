pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_properties;
mod m20250301_000003_create_listings;
mod m20250302_000001_create_applications;
mod m20250302_000002_create_agreements;
mod m20250303_000001_create_payments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_properties::Migration),
            Box::new(m20250301_000003_create_listings::Migration),
            Box::new(m20250302_000001_create_applications::Migration),
            Box::new(m20250302_000002_create_agreements::Migration),
            Box::new(m20250303_000001_create_payments::Migration),
        ]
    }
}
