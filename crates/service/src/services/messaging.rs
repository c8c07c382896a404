use std::sync::Arc;

use tracing::{info, instrument};

use super::Actor;
use crate::domain::{validate_message, Business, Message, NewMessage, SendMessageInput};
use crate::errors::{ServiceError, ServiceResult};
use crate::storage::Storage;

/// Direct messages scoped to a business. Customers may only write to the
/// owner; the owner may write to anyone.
#[derive(Clone)]
pub struct MessagingService {
    store: Arc<dyn Storage>,
}

impl MessagingService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    async fn existing_business(&self, business_id: i32) -> ServiceResult<Business> {
        self.store.get_business(business_id).await?.ok_or_else(|| ServiceError::not_found("Business"))
    }

    /// Everything the actor sent or received.
    pub async fn inbox(&self, actor: Actor) -> ServiceResult<Vec<Message>> {
        self.store.get_messages_by_user(actor.user_id).await
    }

    /// All messages about a business; owner only.
    pub async fn business_messages(&self, actor: Actor, business_id: i32) -> ServiceResult<Vec<Message>> {
        let b = self.existing_business(business_id).await?;
        if b.owner_id != actor.user_id {
            return Err(ServiceError::Forbidden);
        }
        self.store.get_messages_by_business(business_id).await
    }

    /// Thread between the actor and `other_user_id` about one business, oldest first.
    pub async fn conversation(&self, actor: Actor, business_id: i32, other_user_id: i32) -> ServiceResult<Vec<Message>> {
        let b = self.existing_business(business_id).await?;
        if b.owner_id != actor.user_id && other_user_id != b.owner_id {
            return Err(ServiceError::Forbidden);
        }
        self.store.get_messages_between(actor.user_id, other_user_id, business_id).await
    }

    #[instrument(skip(self, input), fields(sender_id = actor.user_id))]
    pub async fn send(&self, actor: Actor, input: SendMessageInput) -> ServiceResult<Message> {
        let (Some(receiver_id), Some(business_id)) = (input.receiver_id, input.business_id) else {
            return Err(ServiceError::Validation("receiverId, businessId: required".into()));
        };
        validate_message(&input.content)?;
        if receiver_id == actor.user_id {
            return Err(ServiceError::Validation("receiverId: cannot message yourself".into()));
        }
        let b = self.existing_business(business_id).await?;
        if b.owner_id != actor.user_id && receiver_id != b.owner_id {
            return Err(ServiceError::Validation("receiverId: invalid recipient".into()));
        }
        if self.store.get_user(receiver_id).await?.is_none() {
            return Err(ServiceError::not_found("Receiver"));
        }
        let msg = self
            .store
            .create_message(NewMessage { sender_id: actor.user_id, receiver_id, business_id, content: input.content })
            .await?;
        info!(message_id = msg.id, receiver_id, business_id, "message_sent");
        Ok(msg)
    }

    /// Receiver only.
    pub async fn mark_read(&self, actor: Actor, message_id: i32) -> ServiceResult<Message> {
        let msg = self.store.get_message(message_id).await?.ok_or_else(|| ServiceError::not_found("Message"))?;
        if msg.receiver_id != actor.user_id {
            return Err(ServiceError::Forbidden);
        }
        self.store.mark_message_as_read(message_id).await?.ok_or_else(|| ServiceError::not_found("Message"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::BusinessService;
    use crate::test_support::{memory_store, sample_business_input, seed_user_and_category};

    struct Fixture {
        svc: MessagingService,
        store: Arc<dyn Storage>,
        owner: Actor,
        alice: Actor,
        bob: Actor,
        business_id: i32,
    }

    async fn fixture() -> anyhow::Result<Fixture> {
        let store = memory_store();
        let (owner, cat) = seed_user_and_category(&store, "owner").await?;
        let (alice, _) = seed_user_and_category(&store, "alice").await?;
        let (bob, _) = seed_user_and_category(&store, "bob").await?;
        let b = BusinessService::new(store.clone())
            .create(Actor::new(owner.id), sample_business_input(cat.id, "Bakery"))
            .await?;
        Ok(Fixture {
            svc: MessagingService::new(store.clone()),
            store,
            owner: Actor::new(owner.id),
            alice: Actor::new(alice.id),
            bob: Actor::new(bob.id),
            business_id: b.id,
        })
    }

    fn to(receiver: Actor, business_id: i32, content: &str) -> SendMessageInput {
        SendMessageInput { receiver_id: Some(receiver.user_id), business_id: Some(business_id), content: content.into() }
    }

    #[tokio::test]
    async fn customers_only_reach_the_owner() -> anyhow::Result<()> {
        let f = fixture().await?;
        let err = f.svc.send(f.alice, to(f.bob, f.business_id, "hi bob")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m.contains("receiverId")));

        let m = f.svc.send(f.alice, to(f.owner, f.business_id, "open sundays?")).await?;
        assert_eq!(m.receiver_id, f.owner.user_id);
        assert!(!m.is_read);

        // owner replies to any participant
        f.svc.send(f.owner, to(f.alice, f.business_id, "yes")).await?;
        let thread = f.svc.conversation(f.alice, f.business_id, f.owner.user_id).await?;
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].content, "open sundays?");
        Ok(())
    }

    #[tokio::test]
    async fn message_creates_notification_and_read_is_receiver_only() -> anyhow::Result<()> {
        let f = fixture().await?;
        let m = f.svc.send(f.alice, to(f.owner, f.business_id, "hello")).await?;
        let notes = f.store.get_notifications_by_user(f.owner.user_id).await?;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].related_id, Some(m.id));

        assert!(matches!(f.svc.mark_read(f.alice, m.id).await, Err(ServiceError::Forbidden)));
        assert!(f.svc.mark_read(f.owner, m.id).await?.is_read);
        Ok(())
    }

    #[tokio::test]
    async fn business_inbox_is_owner_only() -> anyhow::Result<()> {
        let f = fixture().await?;
        f.svc.send(f.alice, to(f.owner, f.business_id, "hello")).await?;
        assert_eq!(f.svc.business_messages(f.owner, f.business_id).await?.len(), 1);
        assert!(matches!(f.svc.business_messages(f.alice, f.business_id).await, Err(ServiceError::Forbidden)));
        assert!(matches!(
            f.svc.conversation(f.alice, f.business_id, f.bob.user_id).await,
            Err(ServiceError::Forbidden)
        ));
        assert_eq!(f.svc.inbox(f.alice).await?.len(), 1);
        Ok(())
    }
}
