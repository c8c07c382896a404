//! Domain records and the input/patch types the storage layer accepts.
//!
//! Records are the SeaORM models themselves, so both storage backends hand out
//! identical shapes. Client-facing inputs (`*Input`) are deserialized from
//! camelCase JSON and validated into store inputs (`New*`, `*Patch`).
use chrono::Utc;
use serde::{Deserialize, Serialize};

use models::errors::ModelError;
use models::{business as business_model, business_comment, category as category_model, message as message_model, user as user_model};

pub use models::business::Model as Business;
pub use models::business_comment::Model as BusinessComment;
pub use models::business_like::Model as BusinessLike;
pub use models::category::Model as Category;
pub use models::message::Model as Message;
pub use models::notification::Model as Notification;
pub use models::subscription::Model as Subscription;
pub use models::user::Model as User;
pub use models::{BusinessStatus, SubscriptionStatus};

pub type Timestamp = sea_orm::prelude::DateTimeWithTimeZone;

pub fn now() -> Timestamp {
    Utc::now().into()
}

/// Collects field errors so a single 400 can name every offending field.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn check(&mut self, result: Result<(), ModelError>) {
        if let Err(ModelError::Validation(msg)) = result {
            self.0.push(msg);
        }
    }

    pub fn push(&mut self, msg: impl Into<String>) {
        self.0.push(msg.into());
    }

    pub fn into_result(self) -> Result<(), ModelError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ModelError::Validation(self.0.join(", ")))
        }
    }
}

// ---- users ----

/// `password` is already hashed when it reaches the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = Some(name.clone());
        }
        if let Some(avatar) = &self.avatar {
            user.avatar = Some(avatar.clone());
        }
    }
}

// ---- categories ----

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
}

impl NewCategory {
    pub fn new(name: &str, icon: &str) -> Self {
        Self { name: name.to_string(), icon: icon.to_string() }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        category_model::validate(&self.name, &self.icon)
    }
}

// ---- businesses ----

#[derive(Debug, Clone)]
pub struct NewBusiness {
    pub name: String,
    pub description: String,
    pub owner_id: i32,
    pub category_id: i32,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub image: Option<String>,
}

/// Listing payload as sent by a client. The owner is never taken from here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusinessInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<i32>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub image: Option<String>,
}

impl CreateBusinessInput {
    pub fn into_new(self, owner_id: i32) -> Result<NewBusiness, ModelError> {
        let mut v = Violations::default();
        v.check(business_model::validate_required("name", &self.name));
        v.check(business_model::validate_required("description", &self.description));
        v.check(business_model::validate_required("address", &self.address));
        v.check(business_model::validate_required("city", &self.city));
        v.check(business_model::validate_required("state", &self.state));
        v.check(business_model::validate_required("zipCode", &self.zip_code));
        v.check(business_model::validate_optional_email(self.email.as_deref()));
        v.check(business_model::validate_optional_url("website", self.website.as_deref()));
        if self.category_id.is_none() {
            v.push("categoryId: required");
        }
        v.into_result()?;
        Ok(NewBusiness {
            name: self.name.trim().to_string(),
            description: self.description,
            owner_id,
            category_id: self.category_id.unwrap_or_default(),
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            phone: self.phone,
            email: self.email,
            website: self.website,
            image: self.image,
        })
    }
}

/// Partial update merged over a stored business. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct BusinessPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub image: Option<String>,
    pub is_verified: Option<bool>,
    pub is_active: Option<bool>,
    pub is_paid: Option<bool>,
    pub status: Option<BusinessStatus>,
    pub subscription_id: Option<i32>,
    pub subscription_expires_at: Option<Timestamp>,
}

impl BusinessPatch {
    /// Merges over `b` and refreshes `updated_at`.
    pub fn apply(&self, b: &mut Business, at: Timestamp) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(v) = &self.$field { b.$field = v.clone(); })*
            };
        }
        macro_rules! merge_opt {
            ($($field:ident),*) => {
                $(if let Some(v) = &self.$field { b.$field = Some(v.clone()); })*
            };
        }
        merge!(name, description, category_id, address, city, state, zip_code, is_verified, is_active, is_paid, status);
        merge_opt!(phone, email, website, image, subscription_id, subscription_expires_at);
        b.updated_at = at;
    }
}

/// Owner-editable fields. Counters, payment state and the owner stay server-controlled.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBusinessInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub image: Option<String>,
}

impl UpdateBusinessInput {
    pub fn into_patch(self) -> Result<BusinessPatch, ModelError> {
        let mut v = Violations::default();
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zipCode", &self.zip_code),
        ] {
            if let Some(value) = value {
                v.check(business_model::validate_required(field, value));
            }
        }
        v.check(business_model::validate_optional_email(self.email.as_deref()));
        v.check(business_model::validate_optional_url("website", self.website.as_deref()));
        v.into_result()?;
        Ok(BusinessPatch {
            name: self.name,
            description: self.description,
            category_id: self.category_id,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            phone: self.phone,
            email: self.email,
            website: self.website,
            image: self.image,
            ..Default::default()
        })
    }
}

/// Exact-match conjunction; an empty filter matches every business, inactive ones included.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessFilter {
    pub owner_id: Option<i32>,
    pub category_id: Option<i32>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub is_verified: Option<bool>,
    pub is_active: Option<bool>,
    pub is_paid: Option<bool>,
    pub status: Option<BusinessStatus>,
}

impl BusinessFilter {
    pub fn active() -> Self {
        Self { is_active: Some(true), ..Default::default() }
    }

    pub fn matches(&self, b: &Business) -> bool {
        self.owner_id.map_or(true, |v| b.owner_id == v)
            && self.category_id.map_or(true, |v| b.category_id == v)
            && self.city.as_ref().map_or(true, |v| &b.city == v)
            && self.state.as_ref().map_or(true, |v| &b.state == v)
            && self.is_verified.map_or(true, |v| b.is_verified == v)
            && self.is_active.map_or(true, |v| b.is_active == v)
            && self.is_paid.map_or(true, |v| b.is_paid == v)
            && self.status.map_or(true, |v| b.status == v)
    }
}

// ---- engagement ----

#[derive(Debug, Clone, Copy)]
pub struct NewBusinessLike {
    pub business_id: i32,
    pub user_id: i32,
}

#[derive(Debug, Clone)]
pub struct NewBusinessComment {
    pub business_id: i32,
    pub user_id: i32,
    pub content: String,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommentInput {
    #[serde(default)]
    pub content: String,
    pub rating: Option<i32>,
}

impl CommentInput {
    pub fn into_new(self, business_id: i32, user_id: i32) -> Result<NewBusinessComment, ModelError> {
        business_comment::validate(&self.content, self.rating)?;
        Ok(NewBusinessComment { business_id, user_id, content: self.content, rating: self.rating })
    }
}

// ---- subscriptions ----

#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub business_id: i32,
    pub user_id: i32,
    pub external_order_id: Option<String>,
    pub status: SubscriptionStatus,
    pub price_id: String,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
}

#[derive(Debug, Clone, Default)]
pub struct SubscriptionPatch {
    pub status: Option<SubscriptionStatus>,
    pub external_order_id: Option<String>,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
}

impl SubscriptionPatch {
    pub fn apply(&self, s: &mut Subscription) {
        if let Some(status) = self.status {
            s.status = status;
        }
        if let Some(order) = &self.external_order_id {
            s.external_order_id = Some(order.clone());
        }
        if let Some(start) = self.current_period_start {
            s.current_period_start = Some(start);
        }
        if let Some(end) = self.current_period_end {
            s.current_period_end = Some(end);
        }
    }
}

// ---- messaging ----

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: i32,
    pub receiver_id: i32,
    pub business_id: i32,
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageInput {
    pub receiver_id: Option<i32>,
    pub business_id: Option<i32>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i32,
    pub kind: String,
    pub content: String,
    pub related_id: Option<i32>,
}

impl NewNotification {
    /// The notification a receiver gets for message `message_id`.
    pub fn for_message(receiver_id: i32, message_id: i32) -> Self {
        Self {
            user_id: receiver_id,
            kind: models::notification::KIND_MESSAGE.to_string(),
            content: "You have a new message regarding a business".to_string(),
            related_id: Some(message_id),
        }
    }
}

pub fn validate_message(content: &str) -> Result<(), ModelError> {
    message_model::validate(content)
}

pub fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), ModelError> {
    let mut v = Violations::default();
    v.check(user_model::validate_username(username));
    v.check(user_model::validate_email(email));
    v.check(user_model::validate_password(password));
    v.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_business() -> Business {
        let t = now();
        Business {
            id: 1,
            name: "Shop".into(),
            description: "d".into(),
            owner_id: 1,
            category_id: 1,
            address: "a".into(),
            city: "Austin".into(),
            state: "TX".into(),
            zip_code: "z".into(),
            phone: None,
            email: None,
            website: None,
            image: None,
            like_count: 0,
            comment_count: 0,
            rating: 0,
            is_verified: false,
            is_active: true,
            is_paid: false,
            status: BusinessStatus::Pending,
            created_at: t,
            updated_at: t,
            subscription_id: None,
            subscription_expires_at: None,
        }
    }

    #[test]
    fn create_input_reports_every_missing_field() {
        let err = CreateBusinessInput::default().into_new(1).unwrap_err();
        let ModelError::Validation(msg) = err else { panic!("expected validation error") };
        for field in ["name", "description", "address", "city", "state", "zipCode", "categoryId"] {
            assert!(msg.contains(field), "{field} missing from {msg}");
        }
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut b = sample_business();
        let before = b.updated_at;
        let patch = BusinessPatch { city: Some("Dallas".into()), phone: Some("555".into()), ..Default::default() };
        let later = before + chrono::Duration::seconds(5);
        patch.apply(&mut b, later);
        assert_eq!(b.city, "Dallas");
        assert_eq!(b.phone.as_deref(), Some("555"));
        assert_eq!(b.name, "Shop");
        assert_eq!(b.updated_at, later);
    }

    #[test]
    fn filter_is_exact_match_conjunction() {
        let b = sample_business();
        assert!(BusinessFilter::default().matches(&b));
        assert!(BusinessFilter::active().matches(&b));
        let f = BusinessFilter { city: Some("Austin".into()), is_paid: Some(true), ..Default::default() };
        assert!(!f.matches(&b));
        let f = BusinessFilter { city: Some("austin".into()), ..Default::default() };
        assert!(!f.matches(&b));
    }

    #[test]
    fn registration_rules() {
        assert!(validate_registration("alice", "a@x.io", "password1").is_ok());
        let ModelError::Validation(msg) = validate_registration("al", "bad", "short").unwrap_err() else {
            panic!("expected validation error")
        };
        assert!(msg.contains("username") && msg.contains("email") && msg.contains("password"));
    }
}
