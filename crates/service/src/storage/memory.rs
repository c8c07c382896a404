//! Map-backed store. Each operation runs under one write (or read) guard, so
//! a child row and the parent counters it affects change together.
use std::collections::BTreeMap;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use super::derived;
use super::Storage;
use crate::domain::*;
use crate::errors::ServiceResult;

#[derive(Default)]
struct Sequences {
    user: i32,
    category: i32,
    business: i32,
    like: i32,
    comment: i32,
    subscription: i32,
    message: i32,
    notification: i32,
}

fn next(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct Tables {
    seq: Sequences,
    users: BTreeMap<i32, User>,
    categories: BTreeMap<i32, Category>,
    businesses: BTreeMap<i32, Business>,
    likes: BTreeMap<i32, BusinessLike>,
    comments: BTreeMap<i32, BusinessComment>,
    subscriptions: BTreeMap<i32, Subscription>,
    messages: BTreeMap<i32, Message>,
    notifications: BTreeMap<i32, Notification>,
}

impl Tables {
    fn adjust_category(&mut self, category_id: i32, delta: i32) {
        if let Some(c) = self.categories.get_mut(&category_id) {
            c.business_count = derived::floored(c.business_count, delta);
        }
    }

    fn insert_notification(&mut self, input: NewNotification) -> Notification {
        let n = Notification {
            id: next(&mut self.seq.notification),
            user_id: input.user_id,
            kind: input.kind,
            content: input.content,
            related_id: input.related_id,
            is_read: false,
            created_at: now(),
        };
        self.notifications.insert(n.id, n.clone());
        n
    }

    fn active_businesses(&self) -> impl Iterator<Item = &Business> {
        self.businesses.values().filter(|b| b.is_active)
    }
}

/// In-process storage; ids start at 1 per entity kind.
#[derive(Default)]
pub struct MemStorage {
    inner: RwLock<Tables>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (Timestamp, i32)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl Storage for MemStorage {
    async fn get_user(&self, id: i32) -> ServiceResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        Ok(self.inner.read().await.users.values().find(|u| u.username == username).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        Ok(self.inner.read().await.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, input: NewUser) -> ServiceResult<User> {
        let mut t = self.inner.write().await;
        let user = User {
            id: next(&mut t.seq.user),
            username: input.username,
            email: input.email,
            password: input.password,
            name: input.name,
            avatar: input.avatar,
            created_at: now(),
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i32, patch: UserPatch) -> ServiceResult<Option<User>> {
        let mut t = self.inner.write().await;
        Ok(t.users.get_mut(&id).map(|u| {
            patch.apply(u);
            u.clone()
        }))
    }

    async fn get_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.inner.read().await.categories.values().cloned().collect())
    }

    async fn get_category(&self, id: i32) -> ServiceResult<Option<Category>> {
        Ok(self.inner.read().await.categories.get(&id).cloned())
    }

    async fn create_category(&self, input: NewCategory) -> ServiceResult<Category> {
        let mut t = self.inner.write().await;
        let c = Category { id: next(&mut t.seq.category), name: input.name, icon: input.icon, business_count: 0 };
        t.categories.insert(c.id, c.clone());
        Ok(c)
    }

    async fn update_category_count(&self, id: i32, count: i32) -> ServiceResult<Option<Category>> {
        let mut t = self.inner.write().await;
        Ok(t.categories.get_mut(&id).map(|c| {
            c.business_count = count.max(0);
            c.clone()
        }))
    }

    async fn get_businesses(&self, filter: &BusinessFilter) -> ServiceResult<Vec<Business>> {
        let t = self.inner.read().await;
        Ok(t.businesses.values().filter(|b| filter.matches(b)).cloned().collect())
    }

    async fn get_business(&self, id: i32) -> ServiceResult<Option<Business>> {
        Ok(self.inner.read().await.businesses.get(&id).cloned())
    }

    async fn get_businesses_by_owner(&self, owner_id: i32) -> ServiceResult<Vec<Business>> {
        let t = self.inner.read().await;
        Ok(t.businesses.values().filter(|b| b.owner_id == owner_id).cloned().collect())
    }

    async fn get_featured_businesses(&self, limit: u64) -> ServiceResult<Vec<Business>> {
        let mut out: Vec<Business> = {
            let t = self.inner.read().await;
            t.active_businesses().filter(|b| b.is_paid).cloned().collect()
        };
        out.shuffle(&mut rand::thread_rng());
        out.truncate(limit as usize);
        Ok(out)
    }

    async fn get_trending_businesses(&self, limit: u64) -> ServiceResult<Vec<Business>> {
        let t = self.inner.read().await;
        let mut out: Vec<Business> = t.active_businesses().cloned().collect();
        // stable sort keeps id order among equal counts
        out.sort_by(|a, b| b.like_count.cmp(&a.like_count));
        out.truncate(limit as usize);
        Ok(out)
    }

    async fn get_recent_businesses(&self, limit: u64) -> ServiceResult<Vec<Business>> {
        let t = self.inner.read().await;
        let mut out: Vec<Business> = t.active_businesses().cloned().collect();
        newest_first(&mut out, |b| (b.created_at, b.id));
        out.truncate(limit as usize);
        Ok(out)
    }

    async fn get_businesses_by_category(&self, category_id: i32) -> ServiceResult<Vec<Business>> {
        let t = self.inner.read().await;
        Ok(t.active_businesses().filter(|b| b.category_id == category_id).cloned().collect())
    }

    async fn search_businesses(&self, query: &str) -> ServiceResult<Vec<Business>> {
        let needle = query.to_lowercase();
        let t = self.inner.read().await;
        Ok(t.active_businesses().filter(|b| b.matches_search(&needle)).cloned().collect())
    }

    async fn create_business(&self, input: NewBusiness) -> ServiceResult<Business> {
        let mut t = self.inner.write().await;
        let at = now();
        let b = Business {
            id: next(&mut t.seq.business),
            name: input.name,
            description: input.description,
            owner_id: input.owner_id,
            category_id: input.category_id,
            address: input.address,
            city: input.city,
            state: input.state,
            zip_code: input.zip_code,
            phone: input.phone,
            email: input.email,
            website: input.website,
            image: input.image,
            like_count: 0,
            comment_count: 0,
            rating: 0,
            is_verified: false,
            is_active: true,
            is_paid: false,
            status: BusinessStatus::Pending,
            created_at: at,
            updated_at: at,
            subscription_id: None,
            subscription_expires_at: None,
        };
        t.businesses.insert(b.id, b.clone());
        t.adjust_category(b.category_id, 1);
        Ok(b)
    }

    async fn update_business(&self, id: i32, patch: BusinessPatch) -> ServiceResult<Option<Business>> {
        let mut t = self.inner.write().await;
        let Some(current) = t.businesses.get(&id).cloned() else {
            return Ok(None);
        };
        let mut updated = current.clone();
        patch.apply(&mut updated, now());
        for (category_id, delta) in derived::category_moves(&current, &updated) {
            t.adjust_category(category_id, delta);
        }
        t.businesses.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_business(&self, id: i32) -> ServiceResult<bool> {
        let mut t = self.inner.write().await;
        let Some(b) = t.businesses.get_mut(&id) else {
            return Ok(false);
        };
        if !b.is_active {
            return Ok(true);
        }
        b.is_active = false;
        b.updated_at = now();
        let category_id = b.category_id;
        t.adjust_category(category_id, -1);
        Ok(true)
    }

    async fn get_likes_by_business(&self, business_id: i32) -> ServiceResult<Vec<BusinessLike>> {
        let t = self.inner.read().await;
        Ok(t.likes.values().filter(|l| l.business_id == business_id).cloned().collect())
    }

    async fn get_likes_by_user(&self, user_id: i32) -> ServiceResult<Vec<BusinessLike>> {
        let t = self.inner.read().await;
        Ok(t.likes.values().filter(|l| l.user_id == user_id).cloned().collect())
    }

    async fn get_like(&self, user_id: i32, business_id: i32) -> ServiceResult<Option<BusinessLike>> {
        let t = self.inner.read().await;
        Ok(t.likes.values().find(|l| l.user_id == user_id && l.business_id == business_id).cloned())
    }

    async fn create_business_like(&self, input: NewBusinessLike) -> ServiceResult<BusinessLike> {
        let mut t = self.inner.write().await;
        let like = BusinessLike {
            id: next(&mut t.seq.like),
            business_id: input.business_id,
            user_id: input.user_id,
            created_at: now(),
        };
        t.likes.insert(like.id, like.clone());
        if let Some(b) = t.businesses.get_mut(&like.business_id) {
            b.like_count += 1;
        }
        Ok(like)
    }

    async fn delete_business_like(&self, user_id: i32, business_id: i32) -> ServiceResult<bool> {
        let mut t = self.inner.write().await;
        let Some(like_id) = t
            .likes
            .values()
            .find(|l| l.user_id == user_id && l.business_id == business_id)
            .map(|l| l.id)
        else {
            return Ok(false);
        };
        t.likes.remove(&like_id);
        if let Some(b) = t.businesses.get_mut(&business_id) {
            b.like_count = derived::floored(b.like_count, -1);
        }
        Ok(true)
    }

    async fn get_comments_by_business(&self, business_id: i32) -> ServiceResult<Vec<BusinessComment>> {
        let t = self.inner.read().await;
        let mut out: Vec<BusinessComment> = t.comments.values().filter(|c| c.business_id == business_id).cloned().collect();
        newest_first(&mut out, |c| (c.created_at, c.id));
        Ok(out)
    }

    async fn create_business_comment(&self, input: NewBusinessComment) -> ServiceResult<BusinessComment> {
        let mut t = self.inner.write().await;
        let comment = BusinessComment {
            id: next(&mut t.seq.comment),
            business_id: input.business_id,
            user_id: input.user_id,
            content: input.content,
            rating: input.rating,
            created_at: now(),
        };
        t.comments.insert(comment.id, comment.clone());
        let rating = if comment.rating.is_some() {
            let ratings: Vec<i32> = t
                .comments
                .values()
                .filter(|c| c.business_id == comment.business_id)
                .filter_map(|c| c.rating)
                .collect();
            derived::average_rating(&ratings)
        } else {
            None
        };
        if let Some(b) = t.businesses.get_mut(&comment.business_id) {
            b.comment_count += 1;
            if let Some(r) = rating {
                b.rating = r;
            }
        }
        Ok(comment)
    }

    async fn get_subscription(&self, id: i32) -> ServiceResult<Option<Subscription>> {
        Ok(self.inner.read().await.subscriptions.get(&id).cloned())
    }

    async fn get_subscription_by_business(&self, business_id: i32) -> ServiceResult<Option<Subscription>> {
        let t = self.inner.read().await;
        Ok(t.subscriptions.values().rev().find(|s| s.business_id == business_id).cloned())
    }

    async fn get_subscriptions_by_business(&self, business_id: i32) -> ServiceResult<Vec<Subscription>> {
        let t = self.inner.read().await;
        Ok(t.subscriptions.values().filter(|s| s.business_id == business_id).cloned().collect())
    }

    async fn get_subscriptions_by_external_order_id(&self, order_id: &str) -> ServiceResult<Vec<Subscription>> {
        let t = self.inner.read().await;
        Ok(t.subscriptions
            .values()
            .filter(|s| s.external_order_id.as_deref() == Some(order_id))
            .cloned()
            .collect())
    }

    async fn create_subscription(&self, input: NewSubscription) -> ServiceResult<Subscription> {
        let mut t = self.inner.write().await;
        let at = now();
        let sub = Subscription {
            id: next(&mut t.seq.subscription),
            business_id: input.business_id,
            user_id: input.user_id,
            external_order_id: input.external_order_id,
            status: input.status,
            price_id: input.price_id,
            current_period_start: input.current_period_start,
            current_period_end: input.current_period_end,
            created_at: at,
        };
        t.subscriptions.insert(sub.id, sub.clone());
        if let Some(b) = t.businesses.get_mut(&sub.business_id) {
            derived::on_subscription_created(b, &sub, at);
        }
        Ok(sub)
    }

    async fn update_subscription(&self, id: i32, patch: SubscriptionPatch) -> ServiceResult<Option<Subscription>> {
        let mut t = self.inner.write().await;
        let Some(sub) = t.subscriptions.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(sub);
        let sub = sub.clone();
        if let Some(b) = t.businesses.get_mut(&sub.business_id) {
            derived::on_subscription_updated(b, &sub, &patch, now());
        }
        Ok(Some(sub))
    }

    async fn get_message(&self, id: i32) -> ServiceResult<Option<Message>> {
        Ok(self.inner.read().await.messages.get(&id).cloned())
    }

    async fn get_messages_by_business(&self, business_id: i32) -> ServiceResult<Vec<Message>> {
        let t = self.inner.read().await;
        Ok(t.messages.values().filter(|m| m.business_id == business_id).cloned().collect())
    }

    async fn get_messages_by_user(&self, user_id: i32) -> ServiceResult<Vec<Message>> {
        let t = self.inner.read().await;
        Ok(t.messages
            .values()
            .filter(|m| m.sender_id == user_id || m.receiver_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_messages_between(&self, user_a: i32, user_b: i32, business_id: i32) -> ServiceResult<Vec<Message>> {
        let t = self.inner.read().await;
        let mut out: Vec<Message> = t
            .messages
            .values()
            .filter(|m| m.business_id == business_id && m.is_between(user_a, user_b))
            .cloned()
            .collect();
        out.sort_by_key(|m| (m.created_at, m.id));
        Ok(out)
    }

    async fn create_message(&self, input: NewMessage) -> ServiceResult<Message> {
        let mut t = self.inner.write().await;
        let msg = Message {
            id: next(&mut t.seq.message),
            sender_id: input.sender_id,
            receiver_id: input.receiver_id,
            business_id: input.business_id,
            content: input.content,
            is_read: false,
            created_at: now(),
        };
        t.messages.insert(msg.id, msg.clone());
        t.insert_notification(NewNotification::for_message(msg.receiver_id, msg.id));
        Ok(msg)
    }

    async fn mark_message_as_read(&self, id: i32) -> ServiceResult<Option<Message>> {
        let mut t = self.inner.write().await;
        Ok(t.messages.get_mut(&id).map(|m| {
            m.is_read = true;
            m.clone()
        }))
    }

    async fn get_notification(&self, id: i32) -> ServiceResult<Option<Notification>> {
        Ok(self.inner.read().await.notifications.get(&id).cloned())
    }

    async fn get_notifications_by_user(&self, user_id: i32) -> ServiceResult<Vec<Notification>> {
        let t = self.inner.read().await;
        let mut out: Vec<Notification> = t.notifications.values().filter(|n| n.user_id == user_id).cloned().collect();
        newest_first(&mut out, |n| (n.created_at, n.id));
        Ok(out)
    }

    async fn get_unread_notifications_count(&self, user_id: i32) -> ServiceResult<u64> {
        let t = self.inner.read().await;
        Ok(t.notifications.values().filter(|n| n.user_id == user_id && !n.is_read).count() as u64)
    }

    async fn create_notification(&self, input: NewNotification) -> ServiceResult<Notification> {
        Ok(self.inner.write().await.insert_notification(input))
    }

    async fn mark_notification_as_read(&self, id: i32) -> ServiceResult<Option<Notification>> {
        let mut t = self.inner.write().await;
        Ok(t.notifications.get_mut(&id).map(|n| {
            n.is_read = true;
            n.clone()
        }))
    }

    async fn mark_all_notifications_as_read(&self, user_id: i32) -> ServiceResult<bool> {
        let mut t = self.inner.write().await;
        t.notifications
            .values_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .for_each(|n| n.is_read = true);
        Ok(true)
    }
}
