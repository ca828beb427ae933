use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::sync::{SyncReport, SyncResult};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync", post(sync_all))
        .route("/sync/orders/:id", post(sync_order))
        .route("/sync/report", get(report))
}

#[derive(Serialize)]
struct SyncAllResponse {
    updated: u32,
    errors: u32,
    orders_processed: u32,
    message: String,
}

async fn sync_all(State(state): State<Arc<AppState>>) -> Result<Json<SyncAllResponse>, AppError> {
    let summary = state.orchestrator.sync_all().await?;

    Ok(Json(SyncAllResponse {
        updated: summary.updated,
        errors: summary.errors,
        orders_processed: summary.orders_processed(),
        message: format!(
            "Synkronisering fullført: {} oppdatert, {} feilet",
            summary.updated, summary.errors
        ),
    }))
}

#[derive(Deserialize, Default)]
struct SyncOrderRequest {
    /// Defaults to the tracking number stored on the order.
    #[serde(default)]
    tracking_number: Option<String>,
}

async fn sync_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Option<Json<SyncOrderRequest>>,
) -> Result<Json<SyncResult>, AppError> {
    let requested = payload.and_then(|Json(body)| body.tracking_number);

    let tracking_number = match requested {
        Some(number) => number,
        None => {
            let order = state.store.get(&id).await?;
            order.tracking_number.ok_or_else(|| {
                AppError::BadRequest(format!("order {id} has no tracking number"))
            })?
        }
    };

    let result = state.orchestrator.sync_order(&id, &tracking_number).await?;
    Ok(Json(result))
}

async fn report(State(state): State<Arc<AppState>>) -> Result<Json<SyncReport>, AppError> {
    let orders = state.store.all().await?;

    let mut by_status: BTreeMap<String, u32> = BTreeMap::new();
    let mut orders_with_tracking = 0;
    let mut pending_terminal = 0;

    for order in &orders {
        *by_status
            .entry(order.shipping_status.as_str().to_string())
            .or_insert(0) += 1;

        if order.tracking_number.is_some() {
            orders_with_tracking += 1;
            if !order.shipping_status.is_terminal() {
                pending_terminal += 1;
            }
        }
    }

    Ok(Json(SyncReport {
        orders_with_tracking,
        pending_terminal,
        by_status,
        last_sync: state.orchestrator.last_sync(),
    }))
}
