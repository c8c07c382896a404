use std::sync::Arc;

use tracing::{info, instrument};

use super::Actor;
use crate::domain::{Business, BusinessFilter, CreateBusinessInput, UpdateBusinessInput};
use crate::errors::{ServiceError, ServiceResult};
use crate::storage::{Storage, DEFAULT_LISTING_LIMIT};

/// Upper bound for `limit` on the listing queries.
pub const MAX_LISTING_LIMIT: u64 = 100;

#[derive(Clone)]
pub struct BusinessService {
    store: Arc<dyn Storage>,
}

fn listing_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_LISTING_LIMIT).min(MAX_LISTING_LIMIT)
}

impl BusinessService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    /// Exact-match listing query; callers pin `is_active` for public views.
    pub async fn list(&self, filter: &BusinessFilter) -> ServiceResult<Vec<Business>> {
        self.store.get_businesses(filter).await
    }

    pub async fn get(&self, id: i32) -> ServiceResult<Business> {
        self.store.get_business(id).await?.ok_or_else(|| ServiceError::not_found("Business"))
    }

    pub async fn featured(&self, limit: Option<u64>) -> ServiceResult<Vec<Business>> {
        self.store.get_featured_businesses(listing_limit(limit)).await
    }

    pub async fn trending(&self, limit: Option<u64>) -> ServiceResult<Vec<Business>> {
        self.store.get_trending_businesses(listing_limit(limit)).await
    }

    pub async fn recent(&self, limit: Option<u64>) -> ServiceResult<Vec<Business>> {
        self.store.get_recent_businesses(listing_limit(limit)).await
    }

    pub async fn by_category(&self, category_id: i32) -> ServiceResult<Vec<Business>> {
        self.store.get_businesses_by_category(category_id).await
    }

    pub async fn search(&self, query: &str) -> ServiceResult<Vec<Business>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServiceError::Validation("q: search query is required".into()));
        }
        self.store.search_businesses(query).await
    }

    /// Businesses of `user_id`, visible to that user only.
    pub async fn owned_by(&self, actor: Actor, user_id: i32) -> ServiceResult<Vec<Business>> {
        actor.require_self(user_id)?;
        self.store.get_businesses_by_owner(user_id).await
    }

    #[instrument(skip(self, input), fields(owner_id = actor.user_id))]
    pub async fn create(&self, actor: Actor, input: CreateBusinessInput) -> ServiceResult<Business> {
        let new = input.into_new(actor.user_id)?;
        self.ensure_category(new.category_id).await?;
        let b = self.store.create_business(new).await?;
        info!(business_id = b.id, category_id = b.category_id, "business_created");
        Ok(b)
    }

    #[instrument(skip(self, input), fields(user_id = actor.user_id))]
    pub async fn update(&self, actor: Actor, id: i32, input: UpdateBusinessInput) -> ServiceResult<Business> {
        let current = self.owned(actor, id).await?;
        let patch = input.into_patch()?;
        if let Some(category_id) = patch.category_id {
            if category_id != current.category_id {
                self.ensure_category(category_id).await?;
            }
        }
        let b = self.store.update_business(id, patch).await?.ok_or_else(|| ServiceError::not_found("Business"))?;
        info!(business_id = b.id, "business_updated");
        Ok(b)
    }

    #[instrument(skip(self), fields(user_id = actor.user_id))]
    pub async fn delete(&self, actor: Actor, id: i32) -> ServiceResult<()> {
        self.owned(actor, id).await?;
        if !self.store.delete_business(id).await? {
            return Err(ServiceError::not_found("Business"));
        }
        info!(business_id = id, "business_deleted");
        Ok(())
    }

    /// Loads a business the actor owns: 404 when absent, 403 when someone else's.
    pub(crate) async fn owned(&self, actor: Actor, id: i32) -> ServiceResult<Business> {
        let b = self.get(id).await?;
        if b.owner_id != actor.user_id {
            return Err(ServiceError::Forbidden);
        }
        Ok(b)
    }

    async fn ensure_category(&self, category_id: i32) -> ServiceResult<()> {
        match self.store.get_category(category_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::Validation("categoryId: unknown category".into())),
        }
    }
}
