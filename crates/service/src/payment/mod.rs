//! Payment provider seam: order creation, lookup and capture.
//!
//! Only the sandbox gateway lives in-tree; a real provider client implements
//! the same trait.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod sandbox;

pub use sandbox::SandboxGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Approved,
    Completed,
    Voided,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Approved => "APPROVED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Voided => "VOIDED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order_id: String,
    pub approval_url: String,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("unknown order: {0}")]
    UnknownOrder(String),
    #[error("provider error: {0}")]
    Provider(String),
}

impl From<PaymentError> for crate::errors::ServiceError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::UnknownOrder(_) => crate::errors::ServiceError::not_found("Order"),
            PaymentError::Provider(m) => crate::errors::ServiceError::Payment(m),
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// `amount` is a decimal string such as `"5.00"`.
    async fn create_order(&self, amount: &str, currency: &str) -> Result<CreatedOrder, PaymentError>;
    async fn get_order(&self, order_id: &str) -> Result<OrderStatus, PaymentError>;
    async fn capture_order(&self, order_id: &str) -> Result<OrderStatus, PaymentError>;
}
