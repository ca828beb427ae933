use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::order::ShippingStatus;

/// Outcome of a single-order sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResult {
    pub success: bool,
    pub message: String,
    pub status_changed: bool,
}

impl SyncResult {
    pub fn changed(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            status_changed: true,
        }
    }

    pub fn unchanged(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            status_changed: false,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            status_changed: false,
        }
    }
}

/// Aggregate outcome of a bulk sweep. Per-order failures are only
/// counted here; the detail goes to the log.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SyncSummary {
    pub updated: u32,
    pub errors: u32,
}

impl SyncSummary {
    pub fn orders_processed(&self) -> u32 {
        self.updated + self.errors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastSync {
    pub order_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: ShippingStatus,
}

/// Read-only dashboard view over the tracked order population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub orders_with_tracking: u32,
    pub pending_terminal: u32,
    pub by_status: BTreeMap<String, u32>,
    pub last_sync: Option<LastSync>,
}
