use std::sync::Arc;

use chrono::Months;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::{Actor, BusinessService};
use crate::domain::{now, BusinessPatch, NewSubscription, Subscription, SubscriptionPatch, SubscriptionStatus, Timestamp};
use crate::errors::{ServiceError, ServiceResult};
use crate::payment::{OrderStatus, PaymentGateway};
use crate::storage::Storage;

/// Price of the monthly listing.
#[derive(Debug, Clone)]
pub struct BillingPlan {
    pub amount: String,
    pub currency: String,
    pub price_id: String,
}

impl From<&configs::PaymentConfig> for BillingPlan {
    fn from(c: &configs::PaymentConfig) -> Self {
        Self { amount: c.amount.clone(), currency: c.currency.clone(), price_id: c.price_id.clone() }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    pub subscription: Subscription,
    pub approval_url: String,
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verified {
    pub message: String,
    pub business_id: i32,
}

/// One billing period starting at `start`.
fn period_end(start: Timestamp) -> Timestamp {
    start
        .checked_add_months(Months::new(1))
        .unwrap_or_else(|| start + chrono::Duration::days(30))
}

#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn Storage>,
    gateway: Arc<dyn PaymentGateway>,
    plan: BillingPlan,
    businesses: BusinessService,
}

fn active_of(subs: &[Subscription]) -> Option<&Subscription> {
    subs.iter().rev().find(|s| s.status == SubscriptionStatus::Active)
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn Storage>, gateway: Arc<dyn PaymentGateway>, plan: BillingPlan) -> Self {
        Self { businesses: BusinessService::new(store.clone()), store, gateway, plan }
    }

    /// The active subscription of a business the actor owns, else its latest one.
    pub async fn current(&self, actor: Actor, business_id: i32) -> ServiceResult<Option<Subscription>> {
        self.businesses.owned(actor, business_id).await?;
        let subs = self.store.get_subscriptions_by_business(business_id).await?;
        Ok(active_of(&subs).or(subs.last()).cloned())
    }

    /// Opens a provider order and records a pending subscription for it. The
    /// listing keeps its paid state until the order is verified.
    #[instrument(skip(self), fields(user_id = actor.user_id))]
    pub async fn checkout(&self, actor: Actor, business_id: i32) -> ServiceResult<Checkout> {
        let before = self.businesses.owned(actor, business_id).await?;
        let subs = self.store.get_subscriptions_by_business(business_id).await?;
        if active_of(&subs).is_some() {
            return Err(ServiceError::Conflict("Business already has an active subscription".into()));
        }
        let order = self.gateway.create_order(&self.plan.amount, &self.plan.currency).await?;
        let start = now();
        let subscription = self
            .store
            .create_subscription(NewSubscription {
                business_id,
                user_id: actor.user_id,
                external_order_id: Some(order.order_id.clone()),
                status: SubscriptionStatus::Pending,
                price_id: self.plan.price_id.clone(),
                current_period_start: Some(start),
                current_period_end: Some(period_end(start)),
            })
            .await?;
        // inserting marks the listing paid; undo that until the order is verified
        self.store
            .update_business(
                business_id,
                BusinessPatch { is_paid: Some(before.is_paid), status: Some(before.status), ..Default::default() },
            )
            .await?;
        info!(business_id, subscription_id = subscription.id, order_id = %order.order_id, "checkout_started");
        Ok(Checkout { subscription, approval_url: order.approval_url, order_id: order.order_id })
    }

    /// Confirms the provider order (capturing it when only approved) and activates
    /// the matching subscription, which marks the business paid and active.
    #[instrument(skip(self), fields(user_id = actor.user_id))]
    pub async fn verify(&self, actor: Actor, order_id: &str) -> ServiceResult<Verified> {
        if order_id.trim().is_empty() {
            return Err(ServiceError::Validation("orderId: required".into()));
        }
        let status = self.gateway.get_order(order_id).await?;
        if !matches!(status, OrderStatus::Approved | OrderStatus::Completed) {
            return Err(ServiceError::Validation(format!("orderId: payment not completed, status {}", status.as_str())));
        }
        let subs = self.store.get_subscriptions_by_external_order_id(order_id).await?;
        if subs.is_empty() {
            return Err(ServiceError::not_found("Subscription"));
        }
        let Some(sub) = subs.into_iter().find(|s| s.user_id == actor.user_id) else {
            return Err(ServiceError::Forbidden);
        };
        self.businesses.owned(actor, sub.business_id).await?;
        let verified = Verified { message: "Payment verified and subscription activated".into(), business_id: sub.business_id };
        if sub.status == SubscriptionStatus::Active {
            return Ok(verified);
        }
        let siblings = self.store.get_subscriptions_by_business(sub.business_id).await?;
        if active_of(&siblings).is_some() {
            warn!(order_id, business_id = sub.business_id, "second order for an already paid listing");
            return Err(ServiceError::Conflict("Business already has an active subscription".into()));
        }

        if status == OrderStatus::Approved {
            let captured = self.gateway.capture_order(order_id).await?;
            if captured != OrderStatus::Completed {
                warn!(order_id, status = captured.as_str(), "capture did not complete");
                return Err(ServiceError::Validation(format!(
                    "orderId: capture failed, status {}",
                    captured.as_str()
                )));
            }
        }
        self.store
            .update_subscription(sub.id, SubscriptionPatch { status: Some(SubscriptionStatus::Active), ..Default::default() })
            .await?
            .ok_or_else(|| ServiceError::not_found("Subscription"))?;
        info!(business_id = sub.business_id, subscription_id = sub.id, "subscription_activated");
        Ok(verified)
    }

    /// Activates a listing without a provider: renews the active subscription
    /// (else the latest one) or creates an active one, and restores a deleted listing.
    #[instrument(skip(self), fields(user_id = actor.user_id))]
    pub async fn activate_demo(&self, actor: Actor, business_id: i32) -> ServiceResult<Subscription> {
        self.businesses.owned(actor, business_id).await?;
        let start = now();
        let end = period_end(start);
        let order_id = format!("demo-{}", start.timestamp_millis());
        let subs = self.store.get_subscriptions_by_business(business_id).await?;
        let subscription = match active_of(&subs).or(subs.last()) {
            Some(existing) => self
                .store
                .update_subscription(
                    existing.id,
                    SubscriptionPatch {
                        status: Some(SubscriptionStatus::Active),
                        external_order_id: Some(order_id),
                        current_period_start: Some(start),
                        current_period_end: Some(end),
                    },
                )
                .await?
                .ok_or_else(|| ServiceError::not_found("Subscription"))?,
            None => {
                self.store
                    .create_subscription(NewSubscription {
                        business_id,
                        user_id: actor.user_id,
                        external_order_id: Some(order_id),
                        status: SubscriptionStatus::Active,
                        price_id: self.plan.price_id.clone(),
                        current_period_start: Some(start),
                        current_period_end: Some(end),
                    })
                    .await?
            }
        };
        self.store
            .update_business(business_id, BusinessPatch { is_active: Some(true), is_paid: Some(true), ..Default::default() })
            .await?;
        info!(business_id, subscription_id = subscription.id, "subscription_activated_demo");
        Ok(subscription)
    }

    /// Cancels the business's active subscription; pending checkouts are left alone.
    #[instrument(skip(self), fields(user_id = actor.user_id))]
    pub async fn cancel(&self, actor: Actor, business_id: i32) -> ServiceResult<Subscription> {
        self.businesses.owned(actor, business_id).await?;
        let subs = self.store.get_subscriptions_by_business(business_id).await?;
        let active = active_of(&subs).ok_or_else(|| ServiceError::not_found("Active subscription"))?;
        let sub = self
            .store
            .update_subscription(active.id, SubscriptionPatch { status: Some(SubscriptionStatus::Canceled), ..Default::default() })
            .await?
            .ok_or_else(|| ServiceError::not_found("Subscription"))?;
        info!(business_id, subscription_id = sub.id, "subscription_canceled");
        Ok(sub)
    }
}
