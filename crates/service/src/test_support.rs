#![cfg(test)]
use std::sync::Arc;

use migration::MigratorTrait;

use crate::domain::{Category, CreateBusinessInput, NewCategory, NewUser, User};
use crate::storage::{MemStorage, SeaOrmStorage, Storage};

pub fn memory_store() -> Arc<dyn Storage> {
    Arc::new(MemStorage::new())
}

/// Fresh, migrated in-memory SQLite database. One connection keeps the
/// database alive for the lifetime of the pool.
pub async fn sqlite_store() -> anyhow::Result<Arc<dyn Storage>> {
    let cfg = configs::DatabaseConfig::sqlite_memory();
    let db = models::db::connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Arc::new(SeaOrmStorage::new(db)))
}

/// A user named `name` and a category of their own.
pub async fn seed_user_and_category(store: &Arc<dyn Storage>, name: &str) -> anyhow::Result<(User, Category)> {
    let user = store
        .create_user(NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password: "not-a-real-hash".to_string(),
            name: Some(name.to_string()),
            avatar: None,
        })
        .await?;
    let category = store.create_category(NewCategory::new(&format!("{name} picks"), "star")).await?;
    Ok((user, category))
}

pub fn sample_business_input(category_id: i32, name: &str) -> CreateBusinessInput {
    CreateBusinessInput {
        name: name.to_string(),
        description: format!("{name} serves the neighbourhood"),
        category_id: Some(category_id),
        address: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip_code: "62701".to_string(),
        phone: Some("555-0100".to_string()),
        email: None,
        website: None,
        image: None,
    }
}
