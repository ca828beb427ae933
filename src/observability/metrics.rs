use prometheus::{Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub sync_runs_total: IntCounterVec,
    pub orders_synced_total: IntCounterVec,
    pub notifications_sent_total: IntCounterVec,
    pub sync_eligible_orders: IntGauge,
    pub carrier_fetch_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let sync_runs_total = IntCounterVec::new(
            Opts::new("sync_runs_total", "Bulk sync sweeps by outcome"),
            &["outcome"],
        )
        .expect("valid sync_runs_total metric");

        let orders_synced_total = IntCounterVec::new(
            Opts::new("orders_synced_total", "Per-order sync attempts by result"),
            &["result"],
        )
        .expect("valid orders_synced_total metric");

        let notifications_sent_total = IntCounterVec::new(
            Opts::new("notifications_sent_total", "Notification emails by status"),
            &["status"],
        )
        .expect("valid notifications_sent_total metric");

        let sync_eligible_orders = IntGauge::new(
            "sync_eligible_orders",
            "Orders eligible for sync at the last sweep",
        )
        .expect("valid sync_eligible_orders metric");

        let carrier_fetch_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "carrier_fetch_seconds",
                "Latency of carrier tracking lookups in seconds",
            ),
            &["outcome"],
        )
        .expect("valid carrier_fetch_seconds metric");

        registry
            .register(Box::new(sync_runs_total.clone()))
            .expect("register sync_runs_total");
        registry
            .register(Box::new(orders_synced_total.clone()))
            .expect("register orders_synced_total");
        registry
            .register(Box::new(notifications_sent_total.clone()))
            .expect("register notifications_sent_total");
        registry
            .register(Box::new(sync_eligible_orders.clone()))
            .expect("register sync_eligible_orders");
        registry
            .register(Box::new(carrier_fetch_seconds.clone()))
            .expect("register carrier_fetch_seconds");

        Self {
            registry,
            sync_runs_total,
            orders_synced_total,
            notifications_sent_total,
            sync_eligible_orders,
            carrier_fetch_seconds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
