//! Counter and status rules applied by both backends inside each mutation.
use crate::domain::{Business, BusinessStatus, Subscription, SubscriptionPatch, SubscriptionStatus, Timestamp};

/// Round-half-up mean of the given ratings; `None` when there are none.
pub fn average_rating(ratings: &[i32]) -> Option<i32> {
    if ratings.is_empty() {
        return None;
    }
    let n = ratings.len() as i64;
    let sum: i64 = ratings.iter().map(|r| *r as i64).sum();
    Some(((2 * sum + n) / (2 * n)) as i32)
}

/// `(category_id, delta)` adjustments needed when a business changes from
/// `before` to `after`. Only active businesses are counted.
pub fn category_moves(before: &Business, after: &Business) -> Vec<(i32, i32)> {
    if before.is_active == after.is_active && before.category_id == after.category_id {
        return Vec::new();
    }
    let mut moves = Vec::with_capacity(2);
    if before.is_active {
        moves.push((before.category_id, -1));
    }
    if after.is_active {
        moves.push((after.category_id, 1));
    }
    moves
}

pub fn floored(count: i32, delta: i32) -> i32 {
    (count + delta).max(0)
}

/// A new subscription becomes the business's back-reference and marks it paid
/// and active, whatever status the row was inserted with.
pub fn on_subscription_created(business: &mut Business, sub: &Subscription, at: Timestamp) {
    business.subscription_id = Some(sub.id);
    business.subscription_expires_at = sub.current_period_end;
    business.is_paid = true;
    business.status = BusinessStatus::Active;
    business.updated_at = at;
}

/// `sub` is the row after the patch. Activation repoints the back-reference at
/// it. Returns `false` when the patch has no effect on the business.
pub fn on_subscription_updated(business: &mut Business, sub: &Subscription, patch: &SubscriptionPatch, at: Timestamp) -> bool {
    let mut touched = false;
    match patch.status {
        Some(SubscriptionStatus::Canceled) => {
            business.is_paid = false;
            business.status = BusinessStatus::Inactive;
            touched = true;
        }
        Some(SubscriptionStatus::Active) => {
            business.is_paid = true;
            business.status = BusinessStatus::Active;
            business.subscription_id = Some(sub.id);
            business.subscription_expires_at = sub.current_period_end;
            touched = true;
        }
        _ => {}
    }
    if let Some(end) = patch.current_period_end {
        business.subscription_expires_at = Some(end);
        touched = true;
    }
    if touched {
        business.updated_at = at;
    }
    touched
}
