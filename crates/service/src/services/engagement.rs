use std::sync::Arc;

use tracing::{info, instrument};

use super::Actor;
use crate::domain::{Business, BusinessComment, BusinessLike, CommentInput, NewBusinessLike};
use crate::errors::{ServiceError, ServiceResult};
use crate::storage::Storage;

/// Likes and comments.
#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn Storage>,
}

impl EngagementService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    async fn existing_business(&self, business_id: i32) -> ServiceResult<Business> {
        self.store.get_business(business_id).await?.ok_or_else(|| ServiceError::not_found("Business"))
    }

    /// A second like of the same pair is rejected, not ignored.
    #[instrument(skip(self), fields(user_id = actor.user_id))]
    pub async fn like(&self, actor: Actor, business_id: i32) -> ServiceResult<BusinessLike> {
        self.existing_business(business_id).await?;
        if self.store.get_like(actor.user_id, business_id).await?.is_some() {
            return Err(ServiceError::Conflict("Business already liked by user".into()));
        }
        let like = self
            .store
            .create_business_like(NewBusinessLike { business_id, user_id: actor.user_id })
            .await?;
        info!(business_id, like_id = like.id, "like_added");
        Ok(like)
    }

    #[instrument(skip(self), fields(user_id = actor.user_id))]
    pub async fn unlike(&self, actor: Actor, business_id: i32) -> ServiceResult<()> {
        self.existing_business(business_id).await?;
        if !self.store.delete_business_like(actor.user_id, business_id).await? {
            return Err(ServiceError::not_found("Like"));
        }
        info!(business_id, "like_removed");
        Ok(())
    }

    pub async fn likes_of(&self, business_id: i32) -> ServiceResult<Vec<BusinessLike>> {
        self.existing_business(business_id).await?;
        self.store.get_likes_by_business(business_id).await
    }

    /// Businesses liked by `user_id`, in like order. Visible to that user only.
    pub async fn liked_businesses(&self, actor: Actor, user_id: i32) -> ServiceResult<Vec<Business>> {
        actor.require_self(user_id)?;
        let likes = self.store.get_likes_by_user(user_id).await?;
        let mut out = Vec::with_capacity(likes.len());
        for like in likes {
            if let Some(b) = self.store.get_business(like.business_id).await? {
                out.push(b);
            }
        }
        Ok(out)
    }

    pub async fn comments_of(&self, business_id: i32) -> ServiceResult<Vec<BusinessComment>> {
        self.existing_business(business_id).await?;
        self.store.get_comments_by_business(business_id).await
    }

    #[instrument(skip(self, input), fields(user_id = actor.user_id))]
    pub async fn comment(&self, actor: Actor, business_id: i32, input: CommentInput) -> ServiceResult<BusinessComment> {
        self.existing_business(business_id).await?;
        let new = input.into_new(business_id, actor.user_id)?;
        let comment = self.store.create_business_comment(new).await?;
        info!(business_id, comment_id = comment.id, rated = comment.rating.is_some(), "comment_added");
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CreateBusinessInput;
    use crate::services::BusinessService;
    use crate::test_support::{memory_store, sample_business_input, seed_user_and_category};

    async fn fixture() -> anyhow::Result<(EngagementService, Actor, Actor, i32)> {
        let store = memory_store();
        let (owner, cat) = seed_user_and_category(&store, "owner").await?;
        let (fan, _) = seed_user_and_category(&store, "fan").await?;
        let input: CreateBusinessInput = sample_business_input(cat.id, "Cafe");
        let b = BusinessService::new(store.clone()).create(Actor::new(owner.id), input).await?;
        Ok((EngagementService::new(store), Actor::new(owner.id), Actor::new(fan.id), b.id))
    }

    #[tokio::test]
    async fn duplicate_like_is_conflict() -> anyhow::Result<()> {
        let (svc, _, fan, bid) = fixture().await?;
        svc.like(fan, bid).await?;
        let err = svc.like(fan, bid).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(svc.likes_of(bid).await?.len(), 1);

        svc.unlike(fan, bid).await?;
        assert!(matches!(svc.unlike(fan, bid).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.like(fan, 999).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn liked_businesses_are_private() -> anyhow::Result<()> {
        let (svc, owner, fan, bid) = fixture().await?;
        svc.like(fan, bid).await?;
        let liked = svc.liked_businesses(fan, fan.user_id).await?;
        assert_eq!(liked.iter().map(|b| b.id).collect::<Vec<_>>(), vec![bid]);
        assert!(matches!(svc.liked_businesses(owner, fan.user_id).await, Err(ServiceError::Forbidden)));
        Ok(())
    }

    #[tokio::test]
    async fn comment_rating_bounds() -> anyhow::Result<()> {
        let (svc, _, fan, bid) = fixture().await?;
        let bad = CommentInput { content: "meh".into(), rating: Some(6) };
        assert!(svc.comment(fan, bid, bad).await.is_err());
        let empty = CommentInput { content: " ".into(), rating: None };
        assert!(svc.comment(fan, bid, empty).await.is_err());
        svc.comment(fan, bid, CommentInput { content: "lovely".into(), rating: Some(4) }).await?;
        assert_eq!(svc.comments_of(bid).await?.len(), 1);
        Ok(())
    }
}
