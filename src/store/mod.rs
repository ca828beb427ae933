//! Narrow repository surface over the Order aggregate. Only the
//! tracking-relevant operations exist here; the store never retries and
//! never swallows backend failures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;

use crate::error::AppError;
use crate::models::order::{Order, ShippingStatus, TrackingFields};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("order {0} not found")]
    NotFound(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(format!("order {id} not found")),
            StoreError::Backend(msg) => AppError::Storage(msg),
        }
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get(&self, order_id: &str) -> Result<Order, StoreError>;

    /// Orders with a tracking number whose status is not terminal.
    async fn sync_eligible(&self) -> Result<Vec<Order>, StoreError>;

    async fn all(&self) -> Result<Vec<Order>, StoreError>;

    async fn insert(&self, order: Order) -> Result<(), StoreError>;

    /// Merge `fields` into the order, set the new status and `updated_at`.
    async fn apply_status_update(
        &self,
        order_id: &str,
        new_status: ShippingStatus,
        fields: TrackingFields,
    ) -> Result<(), StoreError>;

    async fn set_tracking(
        &self,
        order_id: &str,
        tracking_number: String,
        carrier: Option<String>,
        tracking_url: Option<String>,
    ) -> Result<(), StoreError>;

    async fn has_notified(&self, order_id: &str, status: ShippingStatus)
    -> Result<bool, StoreError>;

    /// Append-only merge into the `emails_sent` ledger.
    async fn mark_notified(
        &self,
        order_id: &str,
        status: ShippingStatus,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Remove one ledger entry so a forced resend is recorded fresh.
    async fn clear_notified(
        &self,
        order_id: &str,
        status: ShippingStatus,
    ) -> Result<(), StoreError>;
}

/// DashMap-backed store keyed by order id.
#[derive(Default)]
pub struct MemoryStore {
    orders: DashMap<String, Order>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
        }
    }

    fn with_order<T>(
        &self,
        order_id: &str,
        f: impl FnOnce(&mut Order) -> T,
    ) -> Result<T, StoreError> {
        let mut entry = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
        Ok(f(entry.value_mut()))
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn get(&self, order_id: &str) -> Result<Order, StoreError> {
        self.orders
            .get(order_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))
    }

    async fn sync_eligible(&self) -> Result<Vec<Order>, StoreError> {
        let mut eligible: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.value().sync_eligible())
            .map(|entry| entry.value().clone())
            .collect();

        // Stable sweep order keeps bulk-sync logs diffable between runs.
        eligible.sort_by(|a, b| a.order_id.cmp(&b.order_id));
        Ok(eligible)
    }

    async fn all(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn insert(&self, order: Order) -> Result<(), StoreError> {
        self.orders.insert(order.order_id.clone(), order);
        Ok(())
    }

    async fn apply_status_update(
        &self,
        order_id: &str,
        new_status: ShippingStatus,
        fields: TrackingFields,
    ) -> Result<(), StoreError> {
        self.with_order(order_id, |order| {
            order.shipping_status = new_status;
            if let Some(url) = fields.tracking_url {
                order.tracking_url = Some(url);
            }
            if let Some(estimated) = fields.estimated_delivery {
                order.estimated_delivery = Some(estimated);
            }
            if let Some(actual) = fields.actual_delivery {
                order.actual_delivery = Some(actual);
            }
            if let Some(attempted) = fields.attempted_delivery {
                order.attempted_delivery = Some(attempted);
            }
            if let Some(next) = fields.next_attempt {
                order.next_attempt = Some(next);
            }
            if let Some(reason) = fields.reason {
                order.reason = Some(reason);
            }
            order.updated_at = Utc::now();
        })
    }

    async fn set_tracking(
        &self,
        order_id: &str,
        tracking_number: String,
        carrier: Option<String>,
        tracking_url: Option<String>,
    ) -> Result<(), StoreError> {
        self.with_order(order_id, |order| {
            order.tracking_number = Some(tracking_number);
            if carrier.is_some() {
                order.carrier = carrier;
            }
            if tracking_url.is_some() {
                order.tracking_url = tracking_url;
            }
            order.updated_at = Utc::now();
        })
    }

    async fn has_notified(
        &self,
        order_id: &str,
        status: ShippingStatus,
    ) -> Result<bool, StoreError> {
        let order = self.get(order_id).await?;
        Ok(order.emails_sent.contains_key(&status))
    }

    async fn mark_notified(
        &self,
        order_id: &str,
        status: ShippingStatus,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.with_order(order_id, |order| {
            order.emails_sent.insert(status, at);
            order.last_notification = Some(at);
        })
    }

    async fn clear_notified(
        &self,
        order_id: &str,
        status: ShippingStatus,
    ) -> Result<(), StoreError> {
        self.with_order(order_id, |order| {
            order.emails_sent.remove(&status);
        })
    }
}
