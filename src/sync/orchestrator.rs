use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::carrier::TrackingApi;
use crate::error::AppError;
use crate::mapper::map_event;
use crate::models::order::{Order, ShippingStatus, TrackingFields};
use crate::models::sync::{LastSync, SyncResult, SyncSummary};
use crate::models::tracking::TrackingEvent;
use crate::notify::{Dispatcher, NotifyContext};
use crate::observability::metrics::Metrics;
use crate::store::{OrderStore, StoreError};
use crate::sync::schedule::next_business_day;
use crate::sync::throttle::Throttle;

/// Drives per-order tracking updates and the bulk reconciliation sweep.
/// A single lease serializes all sync entry points so a manual resync
/// cannot interleave with a scheduled sweep.
pub struct Orchestrator {
    carrier: Arc<dyn TrackingApi>,
    store: Arc<dyn OrderStore>,
    dispatcher: Arc<Dispatcher>,
    metrics: Arc<Metrics>,
    allow_status_regression: bool,
    inter_order_delay: Duration,
    lease: Mutex<()>,
    last_sync: RwLock<Option<LastSync>>,
}

impl Orchestrator {
    pub fn new(
        carrier: Arc<dyn TrackingApi>,
        store: Arc<dyn OrderStore>,
        dispatcher: Arc<Dispatcher>,
        metrics: Arc<Metrics>,
        allow_status_regression: bool,
        inter_order_delay: Duration,
    ) -> Self {
        Self {
            carrier,
            store,
            dispatcher,
            metrics,
            allow_status_regression,
            inter_order_delay,
            lease: Mutex::new(()),
            last_sync: RwLock::new(None),
        }
    }

    pub fn last_sync(&self) -> Option<LastSync> {
        self.last_sync.read().ok().and_then(|guard| guard.clone())
    }

    /// Single-order sync, admin-triggered. Holds the sync lease for the
    /// duration of the update.
    pub async fn sync_order(
        &self,
        order_id: &str,
        tracking_number: &str,
    ) -> Result<SyncResult, AppError> {
        let _guard = self.lease.try_lock().map_err(|_| AppError::SyncInProgress)?;
        self.sync_order_locked(order_id, tracking_number).await
    }

    /// Bulk reconciliation over all sync-eligible orders. Strictly
    /// sequential, throttled between orders; one order's failure never
    /// aborts the sweep.
    pub async fn sync_all(&self) -> Result<SyncSummary, AppError> {
        let _guard = self.lease.try_lock().map_err(|_| AppError::SyncInProgress)?;

        let eligible = self.store.sync_eligible().await.map_err(AppError::from)?;
        self.metrics.sync_eligible_orders.set(eligible.len() as i64);
        info!(orders = eligible.len(), "bulk sync started");

        let mut throttle = Throttle::new(self.inter_order_delay);
        let mut summary = SyncSummary::default();

        for order in eligible {
            throttle.wait().await;

            // Eligibility guarantees a tracking number.
            let Some(tracking_number) = order.tracking_number.clone() else {
                continue;
            };

            match self.sync_order_locked(&order.order_id, &tracking_number).await {
                Ok(result) if result.status_changed => summary.updated += 1,
                Ok(result) if result.success => {
                    // No new information for this order; neither an
                    // update nor an error.
                }
                Ok(result) => {
                    warn!(
                        order_id = %order.order_id,
                        message = %result.message,
                        "order sync reported failure"
                    );
                    summary.errors += 1;
                }
                Err(err) => {
                    warn!(order_id = %order.order_id, error = %err, "order sync failed");
                    summary.errors += 1;
                }
            }
        }

        self.metrics
            .sync_runs_total
            .with_label_values(&["completed"])
            .inc();
        info!(
            updated = summary.updated,
            errors = summary.errors,
            "bulk sync finished"
        );

        Ok(summary)
    }

    async fn sync_order_locked(
        &self,
        order_id: &str,
        tracking_number: &str,
    ) -> Result<SyncResult, AppError> {
        let started = Instant::now();
        let info = self.carrier.fetch(tracking_number).await;
        let outcome = if info.is_some() { "hit" } else { "miss" };
        self.metrics
            .carrier_fetch_seconds
            .with_label_values(&[outcome])
            .observe(started.elapsed().as_secs_f64());

        let Some(info) = info else {
            self.metrics
                .orders_synced_total
                .with_label_values(&["no_data"])
                .inc();
            return Ok(SyncResult::failed(format!(
                "Ingen sporingsdata tilgjengelig for {tracking_number}"
            )));
        };

        let Some(event) = info.latest_event().cloned() else {
            self.metrics
                .orders_synced_total
                .with_label_values(&["no_data"])
                .inc();
            return Ok(SyncResult::failed(format!(
                "Ingen sporingshendelser funnet for {tracking_number}"
            )));
        };

        let (new_status, description) = map_event(
            &event.event_code,
            &event.event_description,
            Some(event.status),
        );

        let order = match self.store.get(order_id).await {
            Ok(order) => order,
            Err(StoreError::NotFound(_)) => {
                self.metrics
                    .orders_synced_total
                    .with_label_values(&["not_found"])
                    .inc();
                return Err(AppError::NotFound(format!("order {order_id} not found")));
            }
            Err(err) => return Err(err.into()),
        };

        if new_status.rank() < order.shipping_status.rank() {
            warn!(
                order_id,
                current = order.shipping_status.as_str(),
                mapped = new_status.as_str(),
                allowed = self.allow_status_regression,
                "carrier event maps to an earlier status"
            );

            if !self.allow_status_regression {
                self.metrics
                    .orders_synced_total
                    .with_label_values(&["stale"])
                    .inc();
                return Ok(SyncResult::unchanged(
                    "Sporingshendelsen er eldre enn gjeldende status, ingen endring",
                ));
            }
        }

        let (fields, ctx) = derive_update(&order, new_status, &event, &info.tracking_url, info.estimated_delivery);

        self.store
            .apply_status_update(order_id, new_status, fields)
            .await
            .map_err(AppError::from)?;

        // A status write always attempts its matching notification; a
        // transport failure is the overriding error for this order.
        self.dispatcher
            .notify(order_id, new_status, ctx, false)
            .await
            .map_err(AppError::from)?;

        if let Ok(mut guard) = self.last_sync.write() {
            *guard = Some(LastSync {
                order_id: order_id.to_string(),
                timestamp: Utc::now(),
                status: new_status,
            });
        }

        self.metrics
            .orders_synced_total
            .with_label_values(&["updated"])
            .inc();
        info!(order_id, status = new_status.as_str(), "shipping status updated");

        Ok(SyncResult::changed(format!(
            "Status oppdatert til {}: {}",
            new_status.as_str(),
            description
        )))
    }
}

fn derive_update(
    order: &Order,
    new_status: ShippingStatus,
    event: &TrackingEvent,
    carrier_url: &Option<String>,
    estimated_delivery: Option<chrono::DateTime<Utc>>,
) -> (TrackingFields, NotifyContext) {
    let mut fields = TrackingFields {
        tracking_url: carrier_url.clone().or_else(|| order.tracking_url.clone()),
        estimated_delivery,
        ..Default::default()
    };
    let mut ctx = NotifyContext::default();

    match new_status {
        ShippingStatus::Delivered => {
            fields.actual_delivery = Some(event.event_time);
        }
        ShippingStatus::FailedDelivery => {
            let next = next_business_day(event.event_time.date_naive());
            fields.attempted_delivery = Some(event.event_time);
            fields.reason = Some(event.event_description.clone());
            fields.next_attempt = Some(next);
            ctx.reason = Some(event.event_description.clone());
            ctx.next_attempt = Some(next);
        }
        _ => {}
    }

    (fields, ctx)
}
