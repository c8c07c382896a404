//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_user;
mod m20240601_000002_create_category;
mod m20240601_000003_create_business;
mod m20240601_000004_create_business_like;
mod m20240601_000005_create_business_comment;
mod m20240601_000006_create_subscription;
mod m20240601_000007_create_message;
mod m20240601_000008_create_notification;
mod m20240601_000009_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_user::Migration),
            Box::new(m20240601_000002_create_category::Migration),
            Box::new(m20240601_000003_create_business::Migration),
            Box::new(m20240601_000004_create_business_like::Migration),
            Box::new(m20240601_000005_create_business_comment::Migration),
            Box::new(m20240601_000006_create_subscription::Migration),
            Box::new(m20240601_000007_create_message::Migration),
            Box::new(m20240601_000008_create_notification::Migration),
            // Indexes should always be applied last
            Box::new(m20240601_000009_add_indexes::Migration),
        ]
    }
}
