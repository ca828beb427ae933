use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse status tag the carrier attaches to every event, independent of
/// the finer-grained event code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoarseStatus {
    InProgress,
    Delivered,
    Exception,
    AtPickup,
    PickedUp,
}

/// One normalized tracking event from the carrier, newest first in the
/// list returned by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub event_time: DateTime<Utc>,
    pub event_code: String,
    pub event_description: String,
    pub location: Option<String>,
    pub status: CoarseStatus,
}

/// Normalized tracking lookup result for one tracking number.
#[derive(Debug, Clone)]
pub struct TrackingInfo {
    pub events: Vec<TrackingEvent>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub tracking_url: Option<String>,
}

impl TrackingInfo {
    pub fn latest_event(&self) -> Option<&TrackingEvent> {
        self.events.first()
    }
}
