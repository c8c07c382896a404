use std::sync::Arc;

use super::Actor;
use crate::domain::Notification;
use crate::errors::{ServiceError, ServiceResult};
use crate::storage::Storage;

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn Storage>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    pub async fn list(&self, actor: Actor) -> ServiceResult<Vec<Notification>> {
        self.store.get_notifications_by_user(actor.user_id).await
    }

    pub async fn unread_count(&self, actor: Actor) -> ServiceResult<u64> {
        self.store.get_unread_notifications_count(actor.user_id).await
    }

    pub async fn mark_read(&self, actor: Actor, id: i32) -> ServiceResult<Notification> {
        let n = self.store.get_notification(id).await?.ok_or_else(|| ServiceError::not_found("Notification"))?;
        if n.user_id != actor.user_id {
            return Err(ServiceError::Forbidden);
        }
        self.store.mark_notification_as_read(id).await?.ok_or_else(|| ServiceError::not_found("Notification"))
    }

    pub async fn mark_all_read(&self, actor: Actor) -> ServiceResult<()> {
        self.store.mark_all_notifications_as_read(actor.user_id).await?;
        Ok(())
    }
}
