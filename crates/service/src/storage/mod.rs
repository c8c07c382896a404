//! Persistence contract shared by the in-memory and SeaORM backends.
//!
//! Expected absence is reported as `None` / `false`; `Err` is reserved for
//! failures of the storage medium. Every mutation keeps the derived counters
//! (category business count, like/comment counts, rating, paid state) in step
//! with the rows it touches before returning.

use std::sync::Arc;

use async_trait::async_trait;
use migration::MigratorTrait;
use tracing::info;

use configs::{StorageBackend, StorageConfig};

use crate::domain::*;
use crate::errors::ServiceResult;

pub mod derived;
pub mod memory;
pub mod seaorm;

#[cfg(test)]
mod contract;

pub use memory::MemStorage;
pub use seaorm::SeaOrmStorage;

pub const DEFAULT_LISTING_LIMIT: u64 = 4;

#[async_trait]
pub trait Storage: Send + Sync {
    // users
    async fn get_user(&self, id: i32) -> ServiceResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> ServiceResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>>;
    async fn create_user(&self, input: NewUser) -> ServiceResult<User>;
    async fn update_user(&self, id: i32, patch: UserPatch) -> ServiceResult<Option<User>>;

    // categories
    async fn get_categories(&self) -> ServiceResult<Vec<Category>>;
    async fn get_category(&self, id: i32) -> ServiceResult<Option<Category>>;
    async fn create_category(&self, input: NewCategory) -> ServiceResult<Category>;
    /// Overwrites the cached count.
    async fn update_category_count(&self, id: i32, count: i32) -> ServiceResult<Option<Category>>;

    // businesses
    async fn get_businesses(&self, filter: &BusinessFilter) -> ServiceResult<Vec<Business>>;
    async fn get_business(&self, id: i32) -> ServiceResult<Option<Business>>;
    async fn get_businesses_by_owner(&self, owner_id: i32) -> ServiceResult<Vec<Business>>;
    /// Paid and active. Order is unspecified.
    async fn get_featured_businesses(&self, limit: u64) -> ServiceResult<Vec<Business>>;
    /// Active, most liked first; ties keep insertion order.
    async fn get_trending_businesses(&self, limit: u64) -> ServiceResult<Vec<Business>>;
    /// Active, newest first.
    async fn get_recent_businesses(&self, limit: u64) -> ServiceResult<Vec<Business>>;
    async fn get_businesses_by_category(&self, category_id: i32) -> ServiceResult<Vec<Business>>;
    /// Case-insensitive (Unicode lowercase) substring match on name, description,
    /// city or state; active only. Both backends fold case the same way.
    async fn search_businesses(&self, query: &str) -> ServiceResult<Vec<Business>>;
    async fn create_business(&self, input: NewBusiness) -> ServiceResult<Business>;
    async fn update_business(&self, id: i32, patch: BusinessPatch) -> ServiceResult<Option<Business>>;
    /// Soft delete.
    async fn delete_business(&self, id: i32) -> ServiceResult<bool>;

    // likes
    async fn get_likes_by_business(&self, business_id: i32) -> ServiceResult<Vec<BusinessLike>>;
    async fn get_likes_by_user(&self, user_id: i32) -> ServiceResult<Vec<BusinessLike>>;
    async fn get_like(&self, user_id: i32, business_id: i32) -> ServiceResult<Option<BusinessLike>>;
    /// Does not check for an existing like of the same pair.
    async fn create_business_like(&self, input: NewBusinessLike) -> ServiceResult<BusinessLike>;
    async fn delete_business_like(&self, user_id: i32, business_id: i32) -> ServiceResult<bool>;

    // comments
    /// Newest first.
    async fn get_comments_by_business(&self, business_id: i32) -> ServiceResult<Vec<BusinessComment>>;
    async fn create_business_comment(&self, input: NewBusinessComment) -> ServiceResult<BusinessComment>;

    // subscriptions
    async fn get_subscription(&self, id: i32) -> ServiceResult<Option<Subscription>>;
    /// Most recently created subscription of the business.
    async fn get_subscription_by_business(&self, business_id: i32) -> ServiceResult<Option<Subscription>>;
    /// Every subscription of the business, oldest first.
    async fn get_subscriptions_by_business(&self, business_id: i32) -> ServiceResult<Vec<Subscription>>;
    async fn get_subscriptions_by_external_order_id(&self, order_id: &str) -> ServiceResult<Vec<Subscription>>;
    async fn create_subscription(&self, input: NewSubscription) -> ServiceResult<Subscription>;
    async fn update_subscription(&self, id: i32, patch: SubscriptionPatch) -> ServiceResult<Option<Subscription>>;

    // messages
    async fn get_message(&self, id: i32) -> ServiceResult<Option<Message>>;
    async fn get_messages_by_business(&self, business_id: i32) -> ServiceResult<Vec<Message>>;
    /// Sent or received by the user.
    async fn get_messages_by_user(&self, user_id: i32) -> ServiceResult<Vec<Message>>;
    /// Both directions within one business, oldest first.
    async fn get_messages_between(&self, user_a: i32, user_b: i32, business_id: i32) -> ServiceResult<Vec<Message>>;
    /// Also creates the receiver's notification.
    async fn create_message(&self, input: NewMessage) -> ServiceResult<Message>;
    async fn mark_message_as_read(&self, id: i32) -> ServiceResult<Option<Message>>;

    // notifications
    async fn get_notification(&self, id: i32) -> ServiceResult<Option<Notification>>;
    /// Newest first.
    async fn get_notifications_by_user(&self, user_id: i32) -> ServiceResult<Vec<Notification>>;
    async fn get_unread_notifications_count(&self, user_id: i32) -> ServiceResult<u64>;
    async fn create_notification(&self, input: NewNotification) -> ServiceResult<Notification>;
    async fn mark_notification_as_read(&self, id: i32) -> ServiceResult<Option<Notification>>;
    async fn mark_all_notifications_as_read(&self, user_id: i32) -> ServiceResult<bool>;
}

/// Builds the backend selected by `[storage].backend`. The database backend is
/// migrated before it is handed out.
pub async fn open(storage: &StorageConfig, database: &configs::DatabaseConfig) -> anyhow::Result<Arc<dyn Storage>> {
    match storage.backend {
        StorageBackend::Memory => {
            info!(backend = "memory", "storage ready");
            Ok(Arc::new(MemStorage::new()))
        }
        StorageBackend::Database => {
            let db = models::db::connect_with_config(database).await?;
            migration::Migrator::up(&db, None).await?;
            info!(backend = "database", "storage ready; migrations applied");
            Ok(Arc::new(SeaOrmStorage::new(db)))
        }
    }
}
