//! Maps carrier tracking events onto the internal shipping status.
//!
//! Resolution order, first match wins: exact event code, exact coarse
//! status, keyword match against the free-text description, then the
//! `Processing` fallback. The tables are data so new carrier codes can
//! be added without touching call sites.

use crate::models::order::ShippingStatus;
use crate::models::tracking::CoarseStatus;

/// Carrier event codes (Bring/Posten numeric codes) to internal status.
const CODE_TABLE: &[(&str, ShippingStatus, &str)] = &[
    ("101", ShippingStatus::Shipped, "Sendingen er mottatt av transportør"),
    ("102", ShippingStatus::InTransit, "Sendingen er under transport"),
    ("103", ShippingStatus::InTransit, "Sendingen har ankommet terminal"),
    ("104", ShippingStatus::OutForDelivery, "Sendingen er ute til levering"),
    ("105", ShippingStatus::Delivered, "Sendingen er levert"),
    ("106", ShippingStatus::Delivered, "Sendingen er hentet på utleveringssted"),
    ("107", ShippingStatus::FailedDelivery, "Leveringsforsøk mislyktes"),
    ("108", ShippingStatus::OutForDelivery, "Sendingen er klar for henting"),
    ("109", ShippingStatus::Returned, "Sendingen er returnert til avsender"),
    ("110", ShippingStatus::InTransit, "Sendingen er fortollet"),
];

/// Coarse carrier status strings, checked when the event code is unknown.
const COARSE_TABLE: &[(CoarseStatus, ShippingStatus, &str)] = &[
    (CoarseStatus::Delivered, ShippingStatus::Delivered, "Sendingen er levert"),
    (CoarseStatus::AtPickup, ShippingStatus::OutForDelivery, "Sendingen er klar for henting"),
    (CoarseStatus::PickedUp, ShippingStatus::Delivered, "Sendingen er hentet"),
    (CoarseStatus::Exception, ShippingStatus::FailedDelivery, "Avvik under levering"),
    (CoarseStatus::InProgress, ShippingStatus::InTransit, "Sendingen er under transport"),
];

/// Ordered keyword groups matched case-insensitively against the event
/// description. Order matters: "levert" must be checked before the
/// in-transit variants so a delivered event is never downgraded.
const KEYWORD_TABLE: &[(&[&str], ShippingStatus, &str)] = &[
    (
        &["levert", "utlevert", "delivered"],
        ShippingStatus::Delivered,
        "Sendingen er levert",
    ),
    (
        &["hentes", "klar for henting", "ready for pickup", "pickup point"],
        ShippingStatus::OutForDelivery,
        "Sendingen er klar for henting",
    ),
    (
        &["ute til levering", "ut for levering", "out for delivery"],
        ShippingStatus::OutForDelivery,
        "Sendingen er ute til levering",
    ),
    (
        &["ikke tilstede", "mislykket", "failed", "avvik", "not present"],
        ShippingStatus::FailedDelivery,
        "Leveringsforsøk mislyktes",
    ),
    (
        &["underveis", "transport", "terminal", "in transit", "sortert"],
        ShippingStatus::InTransit,
        "Sendingen er under transport",
    ),
    (
        &["mottatt", "innlevert", "registrert", "shipped"],
        ShippingStatus::Shipped,
        "Sendingen er sendt",
    ),
];

const FALLBACK: (ShippingStatus, &str) = (ShippingStatus::Processing, "Ordren behandles");

/// Resolve one carrier event to an internal status plus a human-readable
/// (Norwegian) description. Total: always returns a status.
pub fn map_event(
    event_code: &str,
    event_description: &str,
    coarse_status: Option<CoarseStatus>,
) -> (ShippingStatus, String) {
    for (code, status, text) in CODE_TABLE {
        if *code == event_code {
            return (*status, (*text).to_string());
        }
    }

    if let Some(coarse) = coarse_status {
        for (tag, status, text) in COARSE_TABLE {
            if *tag == coarse {
                return (*status, (*text).to_string());
            }
        }
    }

    let description = event_description.to_lowercase();
    for (keywords, status, text) in KEYWORD_TABLE {
        if keywords.iter().any(|kw| description.contains(kw)) {
            return (*status, (*text).to_string());
        }
    }

    (FALLBACK.0, FALLBACK.1.to_string())
}
