//! Relational store on SeaORM. Multi-row mutations (child row plus parent
//! counters) run inside one database transaction.
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::instrument;

use models::{business, business_comment, business_like, category, message, notification, subscription, user};

use super::derived;
use super::Storage;
use crate::domain::*;
use crate::errors::ServiceResult;

pub struct SeaOrmStorage {
    pub db: DatabaseConnection,
}

impl SeaOrmStorage {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Every column except the engagement counters, which only move through `bump`.
fn business_update(b: Business) -> business::ActiveModel {
    let mut am = business::ActiveModel::from(b).reset_all();
    am.like_count = NotSet;
    am.comment_count = NotSet;
    am.rating = NotSet;
    am
}

/// Loads a business, lets `f` mutate it, writes it back without the counters.
async fn modify_business<C, F>(conn: &C, id: i32, f: F) -> Result<Option<Business>, DbErr>
where
    C: ConnectionTrait,
    F: FnOnce(&mut Business) + Send,
{
    let Some(mut b) = business::Entity::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };
    f(&mut b);
    Ok(Some(business_update(b).update(conn).await?))
}

/// Moves a counter column by `delta` in place (`SET col = col + n`). A
/// decrement that would go below zero leaves the row untouched.
async fn bump<E, C>(conn: &C, id_col: E::Column, col: E::Column, id: i32, delta: i32) -> Result<(), DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let query = E::update_many().filter(id_col.eq(id));
    let query = if delta >= 0 {
        query.col_expr(col, Expr::col(col).add(delta))
    } else {
        query.col_expr(col, Expr::col(col).sub(-delta)).filter(col.gte(-delta))
    };
    query.exec(conn).await?;
    Ok(())
}

async fn adjust_category<C: ConnectionTrait>(conn: &C, category_id: i32, delta: i32) -> Result<(), DbErr> {
    bump::<category::Entity, _>(conn, category::Column::Id, category::Column::BusinessCount, category_id, delta).await
}

async fn bump_business<C: ConnectionTrait>(conn: &C, id: i32, col: business::Column, delta: i32) -> Result<(), DbErr> {
    bump::<business::Entity, _>(conn, business::Column::Id, col, id, delta).await
}

async fn insert_notification<C: ConnectionTrait>(conn: &C, input: NewNotification) -> Result<Notification, DbErr> {
    notification::ActiveModel {
        user_id: Set(input.user_id),
        kind: Set(input.kind),
        content: Set(input.content),
        related_id: Set(input.related_id),
        is_read: Set(false),
        created_at: Set(now()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

fn business_condition(filter: &BusinessFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(v) = filter.owner_id {
        cond = cond.add(business::Column::OwnerId.eq(v));
    }
    if let Some(v) = filter.category_id {
        cond = cond.add(business::Column::CategoryId.eq(v));
    }
    if let Some(v) = &filter.city {
        cond = cond.add(business::Column::City.eq(v.clone()));
    }
    if let Some(v) = &filter.state {
        cond = cond.add(business::Column::State.eq(v.clone()));
    }
    if let Some(v) = filter.is_verified {
        cond = cond.add(business::Column::IsVerified.eq(v));
    }
    if let Some(v) = filter.is_active {
        cond = cond.add(business::Column::IsActive.eq(v));
    }
    if let Some(v) = filter.is_paid {
        cond = cond.add(business::Column::IsPaid.eq(v));
    }
    if let Some(v) = filter.status {
        cond = cond.add(business::Column::Status.eq(v));
    }
    cond
}

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn get_user(&self, id: i32) -> ServiceResult<Option<User>> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn get_user_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        Ok(user::Entity::find().filter(user::Column::Username.eq(username)).one(&self.db).await?)
    }

    async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        Ok(user::Entity::find().filter(user::Column::Email.eq(email)).one(&self.db).await?)
    }

    async fn create_user(&self, input: NewUser) -> ServiceResult<User> {
        let am = user::ActiveModel {
            username: Set(input.username),
            email: Set(input.email),
            password: Set(input.password),
            name: Set(input.name),
            avatar: Set(input.avatar),
            created_at: Set(now()),
            ..Default::default()
        };
        Ok(am.insert(&self.db).await?)
    }

    async fn update_user(&self, id: i32, patch: UserPatch) -> ServiceResult<Option<User>> {
        let Some(mut u) = user::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        patch.apply(&mut u);
        Ok(Some(user::ActiveModel::from(u).reset_all().update(&self.db).await?))
    }

    async fn get_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(category::Entity::find().order_by_asc(category::Column::Id).all(&self.db).await?)
    }

    async fn get_category(&self, id: i32) -> ServiceResult<Option<Category>> {
        Ok(category::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn create_category(&self, input: NewCategory) -> ServiceResult<Category> {
        let am = category::ActiveModel {
            name: Set(input.name),
            icon: Set(input.icon),
            business_count: Set(0),
            ..Default::default()
        };
        Ok(am.insert(&self.db).await?)
    }

    async fn update_category_count(&self, id: i32, count: i32) -> ServiceResult<Option<Category>> {
        let Some(c) = category::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut am: category::ActiveModel = c.into();
        am.business_count = Set(count.max(0));
        Ok(Some(am.update(&self.db).await?))
    }

    async fn get_businesses(&self, filter: &BusinessFilter) -> ServiceResult<Vec<Business>> {
        Ok(business::Entity::find()
            .filter(business_condition(filter))
            .order_by_asc(business::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn get_business(&self, id: i32) -> ServiceResult<Option<Business>> {
        Ok(business::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn get_businesses_by_owner(&self, owner_id: i32) -> ServiceResult<Vec<Business>> {
        Ok(business::Entity::find()
            .filter(business::Column::OwnerId.eq(owner_id))
            .order_by_asc(business::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn get_featured_businesses(&self, limit: u64) -> ServiceResult<Vec<Business>> {
        Ok(business::Entity::find()
            .filter(business::Column::IsPaid.eq(true))
            .filter(business::Column::IsActive.eq(true))
            .order_by_asc(business::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    async fn get_trending_businesses(&self, limit: u64) -> ServiceResult<Vec<Business>> {
        Ok(business::Entity::find()
            .filter(business::Column::IsActive.eq(true))
            .order_by_desc(business::Column::LikeCount)
            .order_by_asc(business::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    async fn get_recent_businesses(&self, limit: u64) -> ServiceResult<Vec<Business>> {
        Ok(business::Entity::find()
            .filter(business::Column::IsActive.eq(true))
            .order_by_desc(business::Column::CreatedAt)
            .order_by_desc(business::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    async fn get_businesses_by_category(&self, category_id: i32) -> ServiceResult<Vec<Business>> {
        Ok(business::Entity::find()
            .filter(business::Column::IsActive.eq(true))
            .filter(business::Column::CategoryId.eq(category_id))
            .order_by_asc(business::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn search_businesses(&self, query: &str) -> ServiceResult<Vec<Business>> {
        // SQL LOWER folds case differently per engine, so matching happens here.
        let needle = query.to_lowercase();
        let active = business::Entity::find()
            .filter(business::Column::IsActive.eq(true))
            .order_by_asc(business::Column::Id)
            .all(&self.db)
            .await?;
        Ok(active.into_iter().filter(|b| b.matches_search(&needle)).collect())
    }

    #[instrument(skip(self, input), fields(owner_id = input.owner_id, category_id = input.category_id))]
    async fn create_business(&self, input: NewBusiness) -> ServiceResult<Business> {
        let at = now();
        let txn = self.db.begin().await?;
        let b = business::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            owner_id: Set(input.owner_id),
            category_id: Set(input.category_id),
            address: Set(input.address),
            city: Set(input.city),
            state: Set(input.state),
            zip_code: Set(input.zip_code),
            phone: Set(input.phone),
            email: Set(input.email),
            website: Set(input.website),
            image: Set(input.image),
            like_count: Set(0),
            comment_count: Set(0),
            rating: Set(0),
            is_verified: Set(false),
            is_active: Set(true),
            is_paid: Set(false),
            status: Set(BusinessStatus::Pending),
            created_at: Set(at),
            updated_at: Set(at),
            subscription_id: Set(None),
            subscription_expires_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        adjust_category(&txn, b.category_id, 1).await?;
        txn.commit().await?;
        Ok(b)
    }

    async fn update_business(&self, id: i32, patch: BusinessPatch) -> ServiceResult<Option<Business>> {
        let txn = self.db.begin().await?;
        let Some(current) = business::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        let mut updated = current.clone();
        patch.apply(&mut updated, now());
        for (category_id, delta) in derived::category_moves(&current, &updated) {
            adjust_category(&txn, category_id, delta).await?;
        }
        let saved = business_update(updated).update(&txn).await?;
        txn.commit().await?;
        Ok(Some(saved))
    }

    async fn delete_business(&self, id: i32) -> ServiceResult<bool> {
        let txn = self.db.begin().await?;
        let Some(b) = business::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(false);
        };
        if !b.is_active {
            return Ok(true);
        }
        let category_id = b.category_id;
        let mut am: business::ActiveModel = b.into();
        am.is_active = Set(false);
        am.updated_at = Set(now());
        am.update(&txn).await?;
        adjust_category(&txn, category_id, -1).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn get_likes_by_business(&self, business_id: i32) -> ServiceResult<Vec<BusinessLike>> {
        Ok(business_like::Entity::find()
            .filter(business_like::Column::BusinessId.eq(business_id))
            .order_by_asc(business_like::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn get_likes_by_user(&self, user_id: i32) -> ServiceResult<Vec<BusinessLike>> {
        Ok(business_like::Entity::find()
            .filter(business_like::Column::UserId.eq(user_id))
            .order_by_asc(business_like::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn get_like(&self, user_id: i32, business_id: i32) -> ServiceResult<Option<BusinessLike>> {
        Ok(business_like::Entity::find()
            .filter(business_like::Column::UserId.eq(user_id))
            .filter(business_like::Column::BusinessId.eq(business_id))
            .one(&self.db)
            .await?)
    }

    async fn create_business_like(&self, input: NewBusinessLike) -> ServiceResult<BusinessLike> {
        let txn = self.db.begin().await?;
        let like = business_like::ActiveModel {
            business_id: Set(input.business_id),
            user_id: Set(input.user_id),
            created_at: Set(now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        bump_business(&txn, like.business_id, business::Column::LikeCount, 1).await?;
        txn.commit().await?;
        Ok(like)
    }

    async fn delete_business_like(&self, user_id: i32, business_id: i32) -> ServiceResult<bool> {
        let txn = self.db.begin().await?;
        let Some(like) = business_like::Entity::find()
            .filter(business_like::Column::UserId.eq(user_id))
            .filter(business_like::Column::BusinessId.eq(business_id))
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };
        business_like::Entity::delete_by_id(like.id).exec(&txn).await?;
        bump_business(&txn, business_id, business::Column::LikeCount, -1).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn get_comments_by_business(&self, business_id: i32) -> ServiceResult<Vec<BusinessComment>> {
        Ok(business_comment::Entity::find()
            .filter(business_comment::Column::BusinessId.eq(business_id))
            .order_by_desc(business_comment::Column::CreatedAt)
            .order_by_desc(business_comment::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn create_business_comment(&self, input: NewBusinessComment) -> ServiceResult<BusinessComment> {
        let txn = self.db.begin().await?;
        let comment = business_comment::ActiveModel {
            business_id: Set(input.business_id),
            user_id: Set(input.user_id),
            content: Set(input.content),
            rating: Set(input.rating),
            created_at: Set(now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        let rating = if comment.rating.is_some() {
            let ratings: Vec<i32> = business_comment::Entity::find()
                .filter(business_comment::Column::BusinessId.eq(comment.business_id))
                .filter(business_comment::Column::Rating.is_not_null())
                .all(&txn)
                .await?
                .into_iter()
                .filter_map(|c| c.rating)
                .collect();
            derived::average_rating(&ratings)
        } else {
            None
        };
        bump_business(&txn, comment.business_id, business::Column::CommentCount, 1).await?;
        if let Some(r) = rating {
            business::Entity::update_many()
                .col_expr(business::Column::Rating, Expr::value(r))
                .filter(business::Column::Id.eq(comment.business_id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(comment)
    }

    async fn get_subscription(&self, id: i32) -> ServiceResult<Option<Subscription>> {
        Ok(subscription::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn get_subscription_by_business(&self, business_id: i32) -> ServiceResult<Option<Subscription>> {
        Ok(subscription::Entity::find()
            .filter(subscription::Column::BusinessId.eq(business_id))
            .order_by_desc(subscription::Column::Id)
            .one(&self.db)
            .await?)
    }

    async fn get_subscriptions_by_business(&self, business_id: i32) -> ServiceResult<Vec<Subscription>> {
        Ok(subscription::Entity::find()
            .filter(subscription::Column::BusinessId.eq(business_id))
            .order_by_asc(subscription::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn get_subscriptions_by_external_order_id(&self, order_id: &str) -> ServiceResult<Vec<Subscription>> {
        Ok(subscription::Entity::find()
            .filter(subscription::Column::ExternalOrderId.eq(order_id))
            .order_by_asc(subscription::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn create_subscription(&self, input: NewSubscription) -> ServiceResult<Subscription> {
        let at = now();
        let txn = self.db.begin().await?;
        let sub = subscription::ActiveModel {
            business_id: Set(input.business_id),
            user_id: Set(input.user_id),
            external_order_id: Set(input.external_order_id),
            status: Set(input.status),
            price_id: Set(input.price_id),
            current_period_start: Set(input.current_period_start),
            current_period_end: Set(input.current_period_end),
            created_at: Set(at),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        let snapshot = sub.clone();
        modify_business(&txn, sub.business_id, move |b| derived::on_subscription_created(b, &snapshot, at)).await?;
        txn.commit().await?;
        Ok(sub)
    }

    async fn update_subscription(&self, id: i32, patch: SubscriptionPatch) -> ServiceResult<Option<Subscription>> {
        let txn = self.db.begin().await?;
        let Some(mut sub) = subscription::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        patch.apply(&mut sub);
        let sub = subscription::ActiveModel::from(sub).reset_all().update(&txn).await?;
        let at = now();
        modify_business(&txn, sub.business_id, |b| {
            derived::on_subscription_updated(b, &sub, &patch, at);
        })
        .await?;
        txn.commit().await?;
        Ok(Some(sub))
    }

    async fn get_message(&self, id: i32) -> ServiceResult<Option<Message>> {
        Ok(message::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn get_messages_by_business(&self, business_id: i32) -> ServiceResult<Vec<Message>> {
        Ok(message::Entity::find()
            .filter(message::Column::BusinessId.eq(business_id))
            .order_by_asc(message::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn get_messages_by_user(&self, user_id: i32) -> ServiceResult<Vec<Message>> {
        Ok(message::Entity::find()
            .filter(
                Condition::any()
                    .add(message::Column::SenderId.eq(user_id))
                    .add(message::Column::ReceiverId.eq(user_id)),
            )
            .order_by_asc(message::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn get_messages_between(&self, user_a: i32, user_b: i32, business_id: i32) -> ServiceResult<Vec<Message>> {
        let pair = Condition::any()
            .add(
                Condition::all()
                    .add(message::Column::SenderId.eq(user_a))
                    .add(message::Column::ReceiverId.eq(user_b)),
            )
            .add(
                Condition::all()
                    .add(message::Column::SenderId.eq(user_b))
                    .add(message::Column::ReceiverId.eq(user_a)),
            );
        Ok(message::Entity::find()
            .filter(message::Column::BusinessId.eq(business_id))
            .filter(pair)
            .order_by_asc(message::Column::CreatedAt)
            .order_by_asc(message::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn create_message(&self, input: NewMessage) -> ServiceResult<Message> {
        let txn = self.db.begin().await?;
        let msg = message::ActiveModel {
            sender_id: Set(input.sender_id),
            receiver_id: Set(input.receiver_id),
            business_id: Set(input.business_id),
            content: Set(input.content),
            is_read: Set(false),
            created_at: Set(now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        insert_notification(&txn, NewNotification::for_message(msg.receiver_id, msg.id)).await?;
        txn.commit().await?;
        Ok(msg)
    }

    async fn mark_message_as_read(&self, id: i32) -> ServiceResult<Option<Message>> {
        let Some(m) = message::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut am: message::ActiveModel = m.into();
        am.is_read = Set(true);
        Ok(Some(am.update(&self.db).await?))
    }

    async fn get_notification(&self, id: i32) -> ServiceResult<Option<Notification>> {
        Ok(notification::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn get_notifications_by_user(&self, user_id: i32) -> ServiceResult<Vec<Notification>> {
        Ok(notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn get_unread_notifications_count(&self, user_id: i32) -> ServiceResult<u64> {
        Ok(notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(&self.db)
            .await?)
    }

    async fn create_notification(&self, input: NewNotification) -> ServiceResult<Notification> {
        Ok(insert_notification(&self.db, input).await?)
    }

    async fn mark_notification_as_read(&self, id: i32) -> ServiceResult<Option<Notification>> {
        let Some(n) = notification::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut am: notification::ActiveModel = n.into();
        am.is_read = Set(true);
        Ok(Some(am.update(&self.db).await?))
    }

    async fn mark_all_notifications_as_read(&self, user_id: i32) -> ServiceResult<bool> {
        notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(&self.db)
            .await?;
        Ok(true)
    }
}
