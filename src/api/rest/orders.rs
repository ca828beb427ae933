use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::order::{Address, Order, PickupLocation, ShippingStatus, valid_order_id};
use crate::notify::{NotifyContext, NotifyOutcome};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(register_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/tracking", put(set_tracking))
        .route("/orders/:id/notify", post(notify_order))
}

/// Order registration stands in for checkout, which lives outside this
/// service.
#[derive(Deserialize)]
pub struct RegisterOrderRequest {
    pub order_id: String,
    pub email: String,
    pub customer_name: String,
    #[serde(default)]
    pub shipping_status: Option<ShippingStatus>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub shipping_method: Option<String>,
    #[serde(default)]
    pub shipping_location: Option<PickupLocation>,
}

#[derive(Deserialize)]
pub struct SetTrackingRequest {
    pub tracking_number: String,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub tracking_url: Option<String>,
    /// Optional manual status override, e.g. an admin marking the order
    /// shipped when the label is printed.
    #[serde(default)]
    pub status: Option<ShippingStatus>,
    /// Set to false to suppress the notification for the override.
    #[serde(default = "default_true")]
    pub notify: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
pub struct NotifyRequest {
    pub status: ShippingStatus,
    #[serde(default)]
    pub force: bool,
}

async fn register_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    if !valid_order_id(&payload.order_id) {
        return Err(AppError::BadRequest(format!(
            "order id {} is not on the form YYYYMMDD-NNN",
            payload.order_id
        )));
    }

    if payload.email.trim().is_empty() {
        return Err(AppError::BadRequest("email cannot be empty".to_string()));
    }

    if state.store.get(&payload.order_id).await.is_ok() {
        return Err(AppError::Conflict(format!(
            "order {} already exists",
            payload.order_id
        )));
    }

    let now = Utc::now();
    let order = Order {
        order_id: payload.order_id,
        email: payload.email,
        customer_name: payload.customer_name,
        shipping_status: payload.shipping_status.unwrap_or(ShippingStatus::Pending),
        tracking_number: None,
        tracking_url: None,
        carrier: None,
        estimated_delivery: None,
        actual_delivery: None,
        attempted_delivery: None,
        next_attempt: None,
        reason: None,
        shipping_address: payload.shipping_address,
        shipping_method: payload.shipping_method,
        shipping_location: payload.shipping_location,
        emails_sent: BTreeMap::new(),
        last_notification: None,
        created_at: now,
        updated_at: now,
    };

    state.store.insert(order.clone()).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let order = state.store.get(&id).await?;
    Ok(Json(order))
}

async fn set_tracking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<SetTrackingRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.tracking_number.trim().is_empty() {
        return Err(AppError::BadRequest(
            "tracking number cannot be empty".to_string(),
        ));
    }

    state
        .store
        .set_tracking(
            &id,
            payload.tracking_number,
            payload.carrier,
            payload.tracking_url,
        )
        .await?;

    if let Some(status) = payload.status {
        state
            .store
            .apply_status_update(&id, status, Default::default())
            .await?;

        if payload.notify {
            state
                .dispatcher
                .notify(&id, status, NotifyContext::default(), false)
                .await?;
        }
    }

    let order = state.store.get(&id).await?;
    Ok(Json(order))
}

async fn notify_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<NotifyRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = state
        .dispatcher
        .notify(&id, payload.status, NotifyContext::default(), payload.force)
        .await?;

    let sent = matches!(outcome, NotifyOutcome::Sent);
    let detail = match outcome {
        NotifyOutcome::Sent => "sent",
        NotifyOutcome::AlreadySent => "already_sent",
        NotifyOutcome::NoTemplate => "no_template",
    };

    Ok(Json(serde_json::json!({
        "sent": sent,
        "outcome": detail,
    })))
}
