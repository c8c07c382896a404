//! Request orchestration: authorization and validation in front of `Storage`.
//!
//! Every method takes the acting user explicitly; transport concerns (tokens,
//! cookies) stay in the server crate.
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{AuthService, CredentialHasher, TokenConfig};
use crate::errors::{ServiceError, ServiceResult};
use crate::payment::PaymentGateway;
use crate::storage::Storage;

pub mod businesses;
pub mod categories;
pub mod engagement;
pub mod messaging;
pub mod notifications;
pub mod subscriptions;

pub use businesses::BusinessService;
pub use categories::CategoryService;
pub use engagement::EngagementService;
pub use messaging::MessagingService;
pub use notifications::NotificationService;
pub use subscriptions::{BillingPlan, SubscriptionService};

/// The authenticated user a request acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: i32,
}

impl Actor {
    pub fn new(user_id: i32) -> Self {
        Self { user_id }
    }

    /// Self-access only; no admin override.
    pub fn require_self(&self, user_id: i32) -> ServiceResult<()> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}

/// Unwraps the optional actor of a request or fails as unauthenticated.
pub fn require_actor(actor: Option<Actor>) -> ServiceResult<Actor> {
    actor.ok_or(ServiceError::Unauthenticated)
}

/// Every service wired to one storage backend.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn Storage>,
    pub auth: Arc<AuthService>,
    pub categories: CategoryService,
    pub businesses: BusinessService,
    pub engagement: EngagementService,
    pub messaging: MessagingService,
    pub notifications: NotificationService,
    pub subscriptions: SubscriptionService,
}

impl Services {
    pub fn new(
        store: Arc<dyn Storage>,
        hasher: Arc<dyn CredentialHasher>,
        gateway: Arc<dyn PaymentGateway>,
        tokens: TokenConfig,
        plan: BillingPlan,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(store.clone(), hasher, tokens)),
            categories: CategoryService::new(store.clone()),
            businesses: BusinessService::new(store.clone()),
            engagement: EngagementService::new(store.clone()),
            messaging: MessagingService::new(store.clone()),
            notifications: NotificationService::new(store.clone()),
            subscriptions: SubscriptionService::new(store.clone(), gateway, plan),
            store,
        }
    }
}
