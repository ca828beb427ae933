//! Carrier tracking lookup. One outbound HTTP call per tracking number;
//! every transport or parse failure degrades to "no information now"
//! (`None`) so a flaky carrier never fails an order.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::models::tracking::{CoarseStatus, TrackingEvent, TrackingInfo};

#[async_trait]
pub trait TrackingApi: Send + Sync {
    async fn fetch(&self, tracking_number: &str) -> Option<TrackingInfo>;
}

/// Wire shape of the carrier's tracking response. Parsed strictly into
/// typed structs; anything that does not fit is treated as no data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    #[serde(default)]
    consignment_set: Vec<WireConsignment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireConsignment {
    #[serde(default)]
    expected_delivery_date: Option<DateTime<Utc>>,
    #[serde(default)]
    tracking_url: Option<String>,
    #[serde(default)]
    event_set: Vec<WireEvent>,
    #[serde(default)]
    package_set: Vec<WirePackage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePackage {
    #[serde(default)]
    event_set: Vec<WireEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent {
    date_iso: DateTime<Utc>,
    #[serde(default)]
    status_code: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

fn parse_coarse(raw: &str) -> Option<CoarseStatus> {
    match raw {
        "IN_PROGRESS" => Some(CoarseStatus::InProgress),
        "DELIVERED" => Some(CoarseStatus::Delivered),
        "EXCEPTION" => Some(CoarseStatus::Exception),
        "AT_PICKUP" | "READY_FOR_PICKUP" => Some(CoarseStatus::AtPickup),
        "PICKED_UP" | "HANDED_IN" => Some(CoarseStatus::PickedUp),
        _ => None,
    }
}

impl WireEvent {
    fn into_event(self) -> TrackingEvent {
        TrackingEvent {
            event_time: self.date_iso,
            event_code: self.status_code,
            event_description: self.description,
            location: self.city,
            status: self
                .status
                .as_deref()
                .and_then(parse_coarse)
                .unwrap_or(CoarseStatus::InProgress),
        }
    }
}

impl WireResponse {
    /// Normalize to one event list, newest first. Consignment-level
    /// events are the primary source; package-level events are the
    /// fallback when the consignment carries none.
    fn into_info(mut self) -> Option<TrackingInfo> {
        if self.consignment_set.is_empty() {
            return None;
        }
        let consignment = self.consignment_set.remove(0);

        let raw_events = if consignment.event_set.is_empty() {
            consignment
                .package_set
                .into_iter()
                .flat_map(|p| p.event_set)
                .collect()
        } else {
            consignment.event_set
        };

        if raw_events.is_empty() {
            return None;
        }

        let mut events: Vec<TrackingEvent> =
            raw_events.into_iter().map(WireEvent::into_event).collect();
        events.sort_by(|a, b| b.event_time.cmp(&a.event_time));

        Some(TrackingInfo {
            events,
            estimated_delivery: consignment.expected_delivery_date,
            tracking_url: consignment.tracking_url,
        })
    }
}

/// HTTP client against the carrier tracking endpoint.
pub struct BringClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BringClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl TrackingApi for BringClient {
    async fn fetch(&self, tracking_number: &str) -> Option<TrackingInfo> {
        let url = format!("{}/tracking/{}", self.base_url, tracking_number);

        let response = match self
            .http
            .get(&url)
            .header("X-Mybring-API-Key", &self.api_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(tracking_number, error = %err, "carrier fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                tracking_number,
                status = %response.status(),
                "carrier returned non-success status"
            );
            return None;
        }

        let wire: WireResponse = match response.json().await {
            Ok(wire) => wire,
            Err(err) => {
                warn!(tracking_number, error = %err, "carrier response parse failed");
                return None;
            }
        };

        wire.into_info()
    }
}

#[cfg(test)]
mod tests {
    use super::WireResponse;
    use crate::models::tracking::CoarseStatus;

    #[test]
    fn parses_consignment_level_events_newest_first() {
        let wire: WireResponse = serde_json::from_str(
            r#"{
                "consignmentSet": [{
                    "expectedDeliveryDate": "2025-01-05T12:00:00Z",
                    "trackingUrl": "https://sporing.example.no/ABC123",
                    "eventSet": [
                        {"dateIso": "2025-01-02T08:00:00Z", "statusCode": "102", "description": "Under transport", "status": "IN_PROGRESS"},
                        {"dateIso": "2025-01-03T10:00:00Z", "statusCode": "107", "description": "Mottaker ikke tilstede", "status": "EXCEPTION"}
                    ]
                }]
            }"#,
        )
        .unwrap();

        let info = wire.into_info().unwrap();
        assert_eq!(info.events.len(), 2);
        assert_eq!(info.events[0].event_code, "107");
        assert_eq!(info.events[0].status, CoarseStatus::Exception);
        assert!(info.estimated_delivery.is_some());
        assert_eq!(
            info.tracking_url.as_deref(),
            Some("https://sporing.example.no/ABC123")
        );
    }

    #[test]
    fn falls_back_to_package_level_events() {
        let wire: WireResponse = serde_json::from_str(
            r#"{
                "consignmentSet": [{
                    "packageSet": [{
                        "eventSet": [
                            {"dateIso": "2025-01-01T09:00:00Z", "statusCode": "101", "description": "Innlevert", "status": "IN_PROGRESS"}
                        ]
                    }]
                }]
            }"#,
        )
        .unwrap();

        let info = wire.into_info().unwrap();
        assert_eq!(info.events.len(), 1);
        assert_eq!(info.events[0].event_code, "101");
    }

    #[test]
    fn empty_or_eventless_response_is_no_data() {
        let wire: WireResponse = serde_json::from_str(r#"{"consignmentSet": []}"#).unwrap();
        assert!(wire.into_info().is_none());

        let wire: WireResponse =
            serde_json::from_str(r#"{"consignmentSet": [{"eventSet": [], "packageSet": []}]}"#)
                .unwrap();
        assert!(wire.into_info().is_none());
    }

    #[test]
    fn unknown_coarse_status_defaults_to_in_progress() {
        let wire: WireResponse = serde_json::from_str(
            r#"{
                "consignmentSet": [{
                    "eventSet": [
                        {"dateIso": "2025-01-01T09:00:00Z", "statusCode": "", "description": "", "status": "SOMETHING_NEW"}
                    ]
                }]
            }"#,
        )
        .unwrap();

        let info = wire.into_info().unwrap();
        assert_eq!(info.events[0].status, CoarseStatus::InProgress);
    }
}
