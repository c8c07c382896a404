//! Behaviour both backends must share. Every case runs once against
//! `MemStorage` and once against `SeaOrmStorage` on in-memory SQLite.
use std::sync::Arc;

use super::Storage;
use crate::domain::*;
use crate::services::{Actor, BusinessService};
use crate::test_support::{sample_business_input, seed_user_and_category};

type Store = Arc<dyn Storage>;

async fn listing(store: &Store, owner: &User, category_id: i32, name: &str) -> anyhow::Result<Business> {
    Ok(BusinessService::new(store.clone())
        .create(Actor::new(owner.id), sample_business_input(category_id, name))
        .await?)
}

async fn category_count(store: &Store, id: i32) -> anyhow::Result<i32> {
    Ok(store.get_category(id).await?.map(|c| c.business_count).unwrap_or(-1))
}

async fn new_business_defaults(store: Store) -> anyhow::Result<()> {
    let (owner, cat) = seed_user_and_category(&store, "owner").await?;
    let b = listing(&store, &owner, cat.id, "Bakery").await?;
    assert_eq!((b.like_count, b.comment_count, b.rating), (0, 0, 0));
    assert!(b.is_active && !b.is_paid && !b.is_verified);
    assert_eq!(b.status, BusinessStatus::Pending);
    assert_eq!(b.subscription_id, None);
    assert_eq!(b.owner_id, owner.id);
    assert_eq!(category_count(&store, cat.id).await?, 1);
    assert!(store.get_business(b.id + 100).await?.is_none());
    Ok(())
}

async fn like_counters(store: Store) -> anyhow::Result<()> {
    let (owner, cat) = seed_user_and_category(&store, "owner").await?;
    let (fan, _) = seed_user_and_category(&store, "fan").await?;
    let b = listing(&store, &owner, cat.id, "Bakery").await?;

    store.create_business_like(NewBusinessLike { business_id: b.id, user_id: fan.id }).await?;
    store.create_business_like(NewBusinessLike { business_id: b.id, user_id: owner.id }).await?;
    assert_eq!(store.get_business(b.id).await?.unwrap().like_count, 2);
    assert!(store.get_like(fan.id, b.id).await?.is_some());
    assert_eq!(store.get_likes_by_user(fan.id).await?.len(), 1);

    assert!(store.delete_business_like(fan.id, b.id).await?);
    assert!(!store.delete_business_like(fan.id, b.id).await?);
    let b = store.get_business(b.id).await?.unwrap();
    assert_eq!(b.like_count, store.get_likes_by_business(b.id).await?.len() as i32);
    assert_eq!(b.like_count, 1);
    Ok(())
}

async fn soft_delete(store: Store) -> anyhow::Result<()> {
    let (owner, cat) = seed_user_and_category(&store, "owner").await?;
    let kept = listing(&store, &owner, cat.id, "Kept").await?;
    let gone = listing(&store, &owner, cat.id, "Gone").await?;
    assert_eq!(category_count(&store, cat.id).await?, 2);

    assert!(store.delete_business(gone.id).await?);
    assert!(store.delete_business(gone.id).await?);
    assert!(!store.delete_business(9_999).await?);
    assert_eq!(category_count(&store, cat.id).await?, 1);

    let row = store.get_business(gone.id).await?.unwrap();
    assert!(!row.is_active);
    let listed: Vec<i32> = store.get_businesses_by_category(cat.id).await?.iter().map(|b| b.id).collect();
    assert_eq!(listed, vec![kept.id]);
    assert_eq!(store.get_businesses(&BusinessFilter::default()).await?.len(), 2);
    assert_eq!(store.get_businesses(&BusinessFilter::active()).await?.len(), 1);
    Ok(())
}

async fn category_moves(store: Store) -> anyhow::Result<()> {
    let (owner, from) = seed_user_and_category(&store, "owner").await?;
    let to = store.create_category(NewCategory::new("Elsewhere", "map")).await?;
    let b = listing(&store, &owner, from.id, "Mover").await?;

    let moved = store
        .update_business(b.id, BusinessPatch { category_id: Some(to.id), ..Default::default() })
        .await?
        .unwrap();
    assert_eq!(moved.category_id, to.id);
    assert!(moved.updated_at >= b.updated_at);
    assert_eq!(category_count(&store, from.id).await?, 0);
    assert_eq!(category_count(&store, to.id).await?, 1);

    store.update_business(b.id, BusinessPatch { is_active: Some(false), ..Default::default() }).await?;
    assert_eq!(category_count(&store, to.id).await?, 0);
    store.update_business(b.id, BusinessPatch { is_active: Some(true), ..Default::default() }).await?;
    assert_eq!(category_count(&store, to.id).await?, 1);

    assert!(store.update_business(9_999, BusinessPatch::default()).await?.is_none());
    Ok(())
}

async fn rating_recompute(store: Store) -> anyhow::Result<()> {
    let (owner, cat) = seed_user_and_category(&store, "owner").await?;
    let b = listing(&store, &owner, cat.id, "Diner").await?;
    for rating in [Some(5), Some(4), Some(5)] {
        store
            .create_business_comment(NewBusinessComment {
                business_id: b.id,
                user_id: owner.id,
                content: "good".into(),
                rating,
            })
            .await?;
    }
    assert_eq!(store.get_business(b.id).await?.unwrap().rating, 5);

    store
        .create_business_comment(NewBusinessComment { business_id: b.id, user_id: owner.id, content: "meh".into(), rating: None })
        .await?;
    let b = store.get_business(b.id).await?.unwrap();
    assert_eq!(b.rating, 5);
    assert_eq!(b.comment_count, 4);

    let comments = store.get_comments_by_business(b.id).await?;
    assert_eq!(comments.len(), 4);
    assert_eq!(comments[0].content, "meh");
    Ok(())
}

async fn subscription_lifecycle(store: Store) -> anyhow::Result<()> {
    let (owner, cat) = seed_user_and_category(&store, "owner").await?;
    let b = listing(&store, &owner, cat.id, "Shop").await?;
    let end = now() + chrono::Duration::days(30);

    let pending = store
        .create_subscription(NewSubscription {
            business_id: b.id,
            user_id: owner.id,
            external_order_id: Some("ORDER-1".into()),
            status: SubscriptionStatus::Pending,
            price_id: "monthly".into(),
            current_period_start: Some(now()),
            current_period_end: Some(end),
        })
        .await?;
    // the insert alone marks the listing paid, whatever the row's status
    let row = store.get_business(b.id).await?.unwrap();
    assert_eq!(row.subscription_id, Some(pending.id));
    assert!(row.subscription_expires_at.is_some());
    assert!(row.is_paid);
    assert_eq!(row.status, BusinessStatus::Active);
    assert_eq!(store.get_subscriptions_by_external_order_id("ORDER-1").await?.len(), 1);

    let newer = store
        .create_subscription(NewSubscription {
            business_id: b.id,
            user_id: owner.id,
            external_order_id: Some("ORDER-2".into()),
            status: SubscriptionStatus::Pending,
            price_id: "monthly".into(),
            current_period_start: Some(now()),
            current_period_end: Some(end),
        })
        .await?;
    assert_eq!(store.get_business(b.id).await?.unwrap().subscription_id, Some(newer.id));
    assert_eq!(store.get_subscription_by_business(b.id).await?.map(|s| s.id), Some(newer.id));
    let all: Vec<i32> = store.get_subscriptions_by_business(b.id).await?.iter().map(|s| s.id).collect();
    assert_eq!(all, vec![pending.id, newer.id]);

    // activation points the listing back at the activated row
    store
        .update_subscription(pending.id, SubscriptionPatch { status: Some(SubscriptionStatus::Active), ..Default::default() })
        .await?;
    let row = store.get_business(b.id).await?.unwrap();
    assert!(row.is_paid);
    assert_eq!(row.status, BusinessStatus::Active);
    assert_eq!(row.subscription_id, Some(pending.id));
    assert!(store.get_featured_businesses(4).await?.iter().any(|x| x.id == b.id));

    let later = end + chrono::Duration::days(30);
    store
        .update_subscription(
            pending.id,
            SubscriptionPatch {
                status: Some(SubscriptionStatus::Canceled),
                current_period_end: Some(later),
                ..Default::default()
            },
        )
        .await?;
    let row = store.get_business(b.id).await?.unwrap();
    assert!(!row.is_paid);
    assert_eq!(row.status, BusinessStatus::Inactive);
    assert_eq!(
        row.subscription_expires_at.map(|t| t.timestamp()),
        Some(later.timestamp())
    );
    assert!(store.get_featured_businesses(4).await?.is_empty());
    assert!(store.update_subscription(9_999, SubscriptionPatch::default()).await?.is_none());
    Ok(())
}

async fn messages_notify(store: Store) -> anyhow::Result<()> {
    let (owner, cat) = seed_user_and_category(&store, "owner").await?;
    let (guest, _) = seed_user_and_category(&store, "guest").await?;
    let b = listing(&store, &owner, cat.id, "Shop").await?;

    let first = store
        .create_message(NewMessage { sender_id: guest.id, receiver_id: owner.id, business_id: b.id, content: "hi".into() })
        .await?;
    let second = store
        .create_message(NewMessage { sender_id: owner.id, receiver_id: guest.id, business_id: b.id, content: "hello".into() })
        .await?;
    assert!(!first.is_read);

    let inbox = store.get_notifications_by_user(owner.id).await?;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, "message");
    assert_eq!(inbox[0].related_id, Some(first.id));
    assert_eq!(store.get_unread_notifications_count(guest.id).await?, 1);

    let thread: Vec<i32> = store.get_messages_between(owner.id, guest.id, b.id).await?.iter().map(|m| m.id).collect();
    assert_eq!(thread, vec![first.id, second.id]);
    assert_eq!(store.get_messages_by_user(guest.id).await?.len(), 2);
    assert_eq!(store.get_messages_by_business(b.id).await?.len(), 2);

    assert!(store.mark_message_as_read(first.id).await?.unwrap().is_read);
    assert!(store.mark_message_as_read(9_999).await?.is_none());

    assert!(store.mark_all_notifications_as_read(owner.id).await?);
    assert!(store.mark_all_notifications_as_read(owner.id).await?);
    assert_eq!(store.get_unread_notifications_count(owner.id).await?, 0);
    assert_eq!(store.get_unread_notifications_count(guest.id).await?, 1);
    Ok(())
}

async fn listings_order_and_search(store: Store) -> anyhow::Result<()> {
    let (owner, cat) = seed_user_and_category(&store, "owner").await?;
    let (fan, _) = seed_user_and_category(&store, "fan").await?;
    let a = listing(&store, &owner, cat.id, "Alpha Books").await?;
    let b = listing(&store, &owner, cat.id, "Beta 100% Coffee").await?;
    let c = listing(&store, &owner, cat.id, "Gamma Gym").await?;
    store.create_business_like(NewBusinessLike { business_id: b.id, user_id: fan.id }).await?;

    let trending: Vec<i32> = store.get_trending_businesses(4).await?.iter().map(|x| x.id).collect();
    assert_eq!(trending, vec![b.id, a.id, c.id]);
    let recent: Vec<i32> = store.get_recent_businesses(2).await?.iter().map(|x| x.id).collect();
    assert_eq!(recent, vec![c.id, b.id]);

    let hits: Vec<i32> = store.search_businesses("COFFEE").await?.iter().map(|x| x.id).collect();
    assert_eq!(hits, vec![b.id]);
    assert_eq!(store.search_businesses("springfield").await?.len(), 3);
    assert_eq!(store.search_businesses("100%").await?.len(), 1);
    assert!(store.search_businesses("50%").await?.is_empty());

    store.delete_business(b.id).await?;
    assert!(store.search_businesses("coffee").await?.is_empty());
    assert_eq!(store.get_trending_businesses(4).await?.len(), 2);

    let by_city = BusinessFilter { city: Some("Springfield".into()), is_active: Some(true), ..Default::default() };
    assert_eq!(store.get_businesses(&by_city).await?.len(), 2);
    assert_eq!(store.get_businesses_by_owner(owner.id).await?.len(), 3);

    // case folding is the same on every backend, accented letters included
    let d = listing(&store, &owner, cat.id, "CAFÉ ÉCLAIR").await?;
    let hits: Vec<i32> = store.search_businesses("café").await?.iter().map(|x| x.id).collect();
    assert_eq!(hits, vec![d.id]);
    assert_eq!(store.search_businesses("Éclair").await?.len(), 1);
    assert!(store.search_businesses("cafe").await?.is_empty());
    Ok(())
}

async fn concurrent_likes(store: Store) -> anyhow::Result<()> {
    let (owner, cat) = seed_user_and_category(&store, "owner").await?;
    let b = listing(&store, &owner, cat.id, "Busy Bakery").await?;
    let mut fans = Vec::new();
    for i in 0..8 {
        fans.push(seed_user_and_category(&store, &format!("fan{i}")).await?.0);
    }

    let mut likes = Vec::new();
    for fan in &fans {
        let store = store.clone();
        let like = NewBusinessLike { business_id: b.id, user_id: fan.id };
        likes.push(tokio::spawn(async move { store.create_business_like(like).await }));
    }
    let editor = store.clone();
    let rename = BusinessPatch { name: Some("Busier Bakery".into()), ..Default::default() };
    let id = b.id;
    let edit = tokio::spawn(async move { editor.update_business(id, rename).await });
    for like in likes {
        like.await??;
    }
    edit.await??;

    let row = store.get_business(b.id).await?.unwrap();
    assert_eq!(row.like_count, 8);
    assert_eq!(row.name, "Busier Bakery");
    Ok(())
}

async fn users_and_categories(store: Store) -> anyhow::Result<()> {
    let (u, c) = seed_user_and_category(&store, "carol").await?;
    assert_eq!(store.get_user_by_username("carol").await?.map(|x| x.id), Some(u.id));
    assert_eq!(store.get_user_by_email("carol@example.com").await?.map(|x| x.id), Some(u.id));
    assert!(store.get_user_by_username("nobody").await?.is_none());

    let patched = store
        .update_user(u.id, UserPatch { name: Some("Carol C".into()), ..Default::default() })
        .await?
        .unwrap();
    assert_eq!(patched.name.as_deref(), Some("Carol C"));
    assert_eq!(patched.username, "carol");

    assert_eq!(store.update_category_count(c.id, 7).await?.map(|x| x.business_count), Some(7));
    assert!(store.update_category_count(9_999, 1).await?.is_none());
    assert_eq!(store.get_categories().await?.len(), 1);
    Ok(())
}

macro_rules! contract {
    ($($case:ident),* $(,)?) => {
        mod memory {
            $(
                #[tokio::test]
                async fn $case() -> anyhow::Result<()> {
                    super::$case(crate::test_support::memory_store()).await
                }
            )*
        }

        mod sqlite {
            $(
                #[tokio::test]
                async fn $case() -> anyhow::Result<()> {
                    super::$case(crate::test_support::sqlite_store().await?).await
                }
            )*
        }
    };
}

contract!(
    new_business_defaults,
    like_counters,
    soft_delete,
    category_moves,
    rating_recompute,
    subscription_lifecycle,
    messages_notify,
    listings_order_and_search,
    concurrent_likes,
    users_and_categories,
);
