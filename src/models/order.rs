use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Internal shipping status of an order. The carrier's event stream is
/// mapped onto this closed set; `Delivered` and `Returned` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingStatus {
    Pending,
    Processing,
    Shipped,
    InTransit,
    OutForDelivery,
    Delivered,
    FailedDelivery,
    Returned,
}

impl ShippingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShippingStatus::Delivered | ShippingStatus::Returned)
    }

    /// Progress rank used by the regression guard. `FailedDelivery` sits
    /// alongside `OutForDelivery` since a failed attempt can be retried,
    /// and `Returned` outranks everything because it ends the shipment.
    pub fn rank(&self) -> u8 {
        match self {
            ShippingStatus::Pending => 0,
            ShippingStatus::Processing => 1,
            ShippingStatus::Shipped => 2,
            ShippingStatus::InTransit => 3,
            ShippingStatus::OutForDelivery => 4,
            ShippingStatus::FailedDelivery => 4,
            ShippingStatus::Delivered => 5,
            ShippingStatus::Returned => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingStatus::Pending => "PENDING",
            ShippingStatus::Processing => "PROCESSING",
            ShippingStatus::Shipped => "SHIPPED",
            ShippingStatus::InTransit => "IN_TRANSIT",
            ShippingStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            ShippingStatus::Delivered => "DELIVERED",
            ShippingStatus::FailedDelivery => "FAILED_DELIVERY",
            ShippingStatus::Returned => "RETURNED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    #[serde(default)]
    pub country: Option<String>,
}

/// Pickup-point info supplied by the carrier when a parcel waits at a
/// service point. Consumed by notification templates, never mutated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupLocation {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub email: String,
    pub customer_name: String,
    pub shipping_status: ShippingStatus,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub carrier: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub attempted_delivery: Option<DateTime<Utc>>,
    pub next_attempt: Option<NaiveDate>,
    pub reason: Option<String>,
    pub shipping_address: Option<Address>,
    pub shipping_method: Option<String>,
    pub shipping_location: Option<PickupLocation>,
    /// Idempotency ledger: one outbound email per status unless forced.
    #[serde(default)]
    pub emails_sent: BTreeMap<ShippingStatus, DateTime<Utc>>,
    pub last_notification: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn sync_eligible(&self) -> bool {
        self.tracking_number.is_some() && !self.shipping_status.is_terminal()
    }
}

/// Optional tracking fields merged into an order by a status update.
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct TrackingFields {
    pub tracking_url: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub attempted_delivery: Option<DateTime<Utc>>,
    pub next_attempt: Option<NaiveDate>,
    pub reason: Option<String>,
}

/// Order ids are human-facing `YYYYMMDD-NNN` strings assigned at checkout.
pub fn valid_order_id(id: &str) -> bool {
    let Some((date, seq)) = id.split_once('-') else {
        return false;
    };

    date.len() == 8
        && date.chars().all(|c| c.is_ascii_digit())
        && seq.len() == 3
        && seq.chars().all(|c| c.is_ascii_digit())
}
