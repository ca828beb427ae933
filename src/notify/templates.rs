//! Email templates per shipping status. Only `Shipped`, `Delivered` and
//! `FailedDelivery` carry a customer-facing email; every other status is
//! a deliberate no-op.

use crate::models::order::{Order, ShippingStatus};
use crate::notify::NotifyContext;

pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

pub fn has_template(status: ShippingStatus) -> bool {
    matches!(
        status,
        ShippingStatus::Shipped | ShippingStatus::Delivered | ShippingStatus::FailedDelivery
    )
}

/// Statuses whose template renders the delivery address.
pub fn needs_address(status: ShippingStatus) -> bool {
    matches!(status, ShippingStatus::Shipped | ShippingStatus::Delivered)
}

pub fn render(order: &Order, status: ShippingStatus, ctx: &NotifyContext) -> Option<RenderedEmail> {
    match status {
        ShippingStatus::Shipped => Some(shipped(order)),
        ShippingStatus::Delivered => Some(delivered(order)),
        ShippingStatus::FailedDelivery => Some(failed_delivery(order, ctx)),
        _ => None,
    }
}

fn address_block(order: &Order) -> String {
    match &order.shipping_address {
        Some(addr) => format!(
            "<p>{}<br>{}<br>{} {}</p>",
            addr.name, addr.street, addr.postal_code, addr.city
        ),
        None => String::new(),
    }
}

fn tracking_block(order: &Order) -> String {
    match (&order.tracking_number, &order.tracking_url) {
        (Some(number), Some(url)) => format!(
            "<p>Sporingsnummer: <a href=\"{url}\">{number}</a></p>"
        ),
        (Some(number), None) => format!("<p>Sporingsnummer: {number}</p>"),
        _ => String::new(),
    }
}

fn shipped(order: &Order) -> RenderedEmail {
    let estimated = order
        .estimated_delivery
        .map(|d| format!("<p>Forventet levering: {}</p>", d.format("%d.%m.%Y")))
        .unwrap_or_default();

    RenderedEmail {
        subject: format!("Ordre {} er sendt", order.order_id),
        html: format!(
            "<h1>Pakken din er på vei!</h1>\
             <p>Hei {},</p>\
             <p>Ordre {} er sendt og er nå hos transportøren.</p>\
             {}{}{}",
            order.customer_name,
            order.order_id,
            tracking_block(order),
            estimated,
            address_block(order),
        ),
    }
}

fn delivered(order: &Order) -> RenderedEmail {
    let pickup = order
        .shipping_location
        .as_ref()
        .map(|loc| format!("<p>Utleveringssted: {}</p>", loc.name))
        .unwrap_or_default();

    RenderedEmail {
        subject: format!("Ordre {} er levert", order.order_id),
        html: format!(
            "<h1>Pakken din er levert</h1>\
             <p>Hei {},</p>\
             <p>Ordre {} er levert.</p>\
             {}{}",
            order.customer_name,
            order.order_id,
            pickup,
            address_block(order),
        ),
    }
}

fn failed_delivery(order: &Order, ctx: &NotifyContext) -> RenderedEmail {
    let reason = ctx
        .reason
        .as_deref()
        .or(order.reason.as_deref())
        .unwrap_or("Levering mislyktes");

    let next = ctx
        .next_attempt
        .or(order.next_attempt)
        .map(|d| format!("<p>Nytt leveringsforsøk: {}</p>", d.format("%d.%m.%Y")))
        .unwrap_or_default();

    RenderedEmail {
        subject: format!("Leveringsforsøk mislyktes for ordre {}", order.order_id),
        html: format!(
            "<h1>Vi fikk ikke levert pakken din</h1>\
             <p>Hei {},</p>\
             <p>Årsak: {}</p>\
             {}{}",
            order.customer_name,
            reason,
            next,
            tracking_block(order),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::models::order::{Address, Order, ShippingStatus};

    fn order() -> Order {
        Order {
            order_id: "20250101-001".to_string(),
            email: "kunde@example.no".to_string(),
            customer_name: "Kari Nordmann".to_string(),
            shipping_status: ShippingStatus::Shipped,
            tracking_number: Some("ABC123".to_string()),
            tracking_url: Some("https://sporing.example.no/ABC123".to_string()),
            carrier: Some("bring".to_string()),
            estimated_delivery: None,
            actual_delivery: None,
            attempted_delivery: None,
            next_attempt: None,
            reason: None,
            shipping_address: Some(Address {
                name: "Kari Nordmann".to_string(),
                street: "Storgata 1".to_string(),
                postal_code: "0155".to_string(),
                city: "Oslo".to_string(),
                country: None,
            }),
            shipping_method: None,
            shipping_location: None,
            emails_sent: BTreeMap::new(),
            last_notification: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_three_statuses_have_templates() {
        assert!(has_template(ShippingStatus::Shipped));
        assert!(has_template(ShippingStatus::Delivered));
        assert!(has_template(ShippingStatus::FailedDelivery));
        assert!(!has_template(ShippingStatus::InTransit));
        assert!(!has_template(ShippingStatus::OutForDelivery));
        assert!(!has_template(ShippingStatus::Returned));
        assert!(!has_template(ShippingStatus::Pending));
        assert!(!has_template(ShippingStatus::Processing));
    }

    #[test]
    fn shipped_renders_tracking_link() {
        let email = render(&order(), ShippingStatus::Shipped, &NotifyContext::default()).unwrap();
        assert!(email.subject.contains("20250101-001"));
        assert!(email.html.contains("ABC123"));
        assert!(email.html.contains("Storgata 1"));
    }

    #[test]
    fn failed_delivery_renders_reason_and_next_attempt() {
        let ctx = NotifyContext {
            reason: Some("Mottaker ikke tilstede".to_string()),
            next_attempt: NaiveDate::from_ymd_opt(2025, 1, 6),
        };
        let email = render(&order(), ShippingStatus::FailedDelivery, &ctx).unwrap();
        assert!(email.html.contains("Mottaker ikke tilstede"));
        assert!(email.html.contains("06.01.2025"));
    }

    #[test]
    fn statuses_without_template_render_nothing() {
        assert!(render(&order(), ShippingStatus::InTransit, &NotifyContext::default()).is_none());
    }
}
