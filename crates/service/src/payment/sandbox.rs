use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::{CreatedOrder, OrderStatus, PaymentError, PaymentGateway};

#[derive(Debug, Clone)]
struct SandboxOrder {
    amount: String,
    currency: String,
    status: OrderStatus,
}

/// In-process gateway with deterministic state transitions:
/// `CREATED -> APPROVED -> COMPLETED`. With `auto_approve` orders start approved,
/// as if the buyer had already gone through the approval page.
pub struct SandboxGateway {
    orders: Mutex<HashMap<String, SandboxOrder>>,
    approval_base_url: String,
    auto_approve: bool,
}

impl SandboxGateway {
    pub fn new(approval_base_url: impl Into<String>, auto_approve: bool) -> Self {
        Self { orders: Mutex::new(HashMap::new()), approval_base_url: approval_base_url.into(), auto_approve }
    }

    pub fn from_config(cfg: &configs::PaymentConfig) -> Self {
        Self::new(cfg.approval_base_url.clone(), cfg.sandbox_auto_approve)
    }

    /// Buyer approval step.
    pub async fn approve(&self, order_id: &str) -> Result<(), PaymentError> {
        let mut orders = self.orders.lock().await;
        let order = orders.get_mut(order_id).ok_or_else(|| PaymentError::UnknownOrder(order_id.to_string()))?;
        if order.status == OrderStatus::Created {
            order.status = OrderStatus::Approved;
        }
        Ok(())
    }

    pub async fn void(&self, order_id: &str) -> Result<(), PaymentError> {
        let mut orders = self.orders.lock().await;
        let order = orders.get_mut(order_id).ok_or_else(|| PaymentError::UnknownOrder(order_id.to_string()))?;
        if order.status != OrderStatus::Completed {
            order.status = OrderStatus::Voided;
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_order(&self, amount: &str, currency: &str) -> Result<CreatedOrder, PaymentError> {
        if amount.parse::<f64>().map(|a| a <= 0.0).unwrap_or(true) {
            return Err(PaymentError::Provider(format!("invalid amount {amount}")));
        }
        let order_id = format!("SANDBOX-{}", Uuid::new_v4().simple());
        let status = if self.auto_approve { OrderStatus::Approved } else { OrderStatus::Created };
        self.orders.lock().await.insert(
            order_id.clone(),
            SandboxOrder { amount: amount.to_string(), currency: currency.to_string(), status },
        );
        info!(%order_id, amount, currency, "sandbox order created");
        let approval_url = format!("{}?token={}", self.approval_base_url, order_id);
        Ok(CreatedOrder { order_id, approval_url })
    }

    async fn get_order(&self, order_id: &str) -> Result<OrderStatus, PaymentError> {
        let orders = self.orders.lock().await;
        orders
            .get(order_id)
            .map(|o| o.status)
            .ok_or_else(|| PaymentError::UnknownOrder(order_id.to_string()))
    }

    async fn capture_order(&self, order_id: &str) -> Result<OrderStatus, PaymentError> {
        let mut orders = self.orders.lock().await;
        let order = orders.get_mut(order_id).ok_or_else(|| PaymentError::UnknownOrder(order_id.to_string()))?;
        if order.status == OrderStatus::Approved {
            order.status = OrderStatus::Completed;
            debug!(%order_id, amount = %order.amount, currency = %order.currency, "sandbox order captured");
        }
        Ok(order.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn order_lifecycle() {
        let gw = SandboxGateway::new("https://pay.test/approve", false);
        let order = gw.create_order("5.00", "USD").await.unwrap();
        assert!(order.approval_url.ends_with(&order.order_id));
        assert_eq!(gw.get_order(&order.order_id).await.unwrap(), OrderStatus::Created);

        // capture before approval leaves the order untouched
        assert_eq!(gw.capture_order(&order.order_id).await.unwrap(), OrderStatus::Created);

        gw.approve(&order.order_id).await.unwrap();
        assert_eq!(gw.capture_order(&order.order_id).await.unwrap(), OrderStatus::Completed);
        assert_eq!(gw.get_order(&order.order_id).await.unwrap(), OrderStatus::Completed);
    }

    #[tokio::test]
    async fn unknown_order_and_bad_amount() {
        let gw = SandboxGateway::new("https://pay.test/approve", true);
        assert!(matches!(gw.get_order("missing").await, Err(PaymentError::UnknownOrder(_))));
        assert!(matches!(gw.create_order("0", "USD").await, Err(PaymentError::Provider(_))));
        let order = gw.create_order("5.00", "USD").await.unwrap();
        assert_eq!(gw.get_order(&order.order_id).await.unwrap(), OrderStatus::Approved);
        gw.void(&order.order_id).await.unwrap();
        assert_eq!(gw.capture_order(&order.order_id).await.unwrap(), OrderStatus::Voided);
    }
}
