use std::sync::Arc;
use std::time::Duration;

use crate::carrier::TrackingApi;
use crate::notify::Dispatcher;
use crate::notify::transport::MailTransport;
use crate::observability::metrics::Metrics;
use crate::store::OrderStore;
use crate::sync::orchestrator::Orchestrator;

pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub dispatcher: Arc<Dispatcher>,
    pub orchestrator: Arc<Orchestrator>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wire the service from its external collaborators. The carrier
    /// client and mail transport are constructed once at process start
    /// and injected here, so tests swap in doubles.
    pub fn new(
        store: Arc<dyn OrderStore>,
        carrier: Arc<dyn TrackingApi>,
        mailer: Arc<dyn MailTransport>,
        allow_status_regression: bool,
        sync_delay: Duration,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        let dispatcher = Arc::new(Dispatcher::new(
            store.clone(),
            mailer,
            metrics.clone(),
        ));
        let orchestrator = Arc::new(Orchestrator::new(
            carrier,
            store.clone(),
            dispatcher.clone(),
            metrics.clone(),
            allow_status_regression,
            sync_delay,
        ));

        Self {
            store,
            dispatcher,
            orchestrator,
            metrics,
        }
    }
}
